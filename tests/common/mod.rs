//! Shared fixtures for the HTTP integration tests.
//!
//! Every test gets its own in-memory SQLite database and a local fake
//! upstream standing in for the social platform and the upload API.
#![allow(dead_code)]

use actix_web::http::header::{AUTHORIZATION, HeaderMap};
use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, web};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::TcpListener;
use std::time::Duration;
use uuid::Uuid;

use showcase_backend::auth::jwt::{Claims, TokenVerifier, UserMetadata};
use showcase_backend::cache::ProfileCache;
use showcase_backend::config::{AppConfig, AuthConfig, SocialConfig, UploadConfig};
use showcase_backend::db::{profiles as profile_db, users as user_db};
use showcase_backend::models::profiles::{CreateProfile, UserType};
use showcase_backend::models::users::CreateUserFromAuth;
use showcase_backend::social::{OAuthStates, SocialClient};
use showcase_backend::uploads::UploadProxy;

pub const SECRET: &str = "integration-test-secret-long-enough-for-hs256-signing";
pub const FRONTEND: &str = "http://frontend.test";
pub const UPLOAD_KEY: &str = "upload-key";
pub const GOOD_CODE: &str = "good-code";
/// Accepted by the fake token endpoint, which answers with an absurd lifetime.
pub const HUGE_EXPIRY_CODE: &str = "huge-expiry-code";
pub const SOCIAL_TOKEN: &str = "social-token";

/// Build the app under test from a [`TestContext`].
macro_rules! test_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.db.clone())
                .app_data($ctx.cache.clone())
                .app_data($ctx.verifier.clone())
                .app_data($ctx.social.clone())
                .app_data($ctx.states.clone())
                .app_data($ctx.uploads.clone())
                .app_data($ctx.config.clone())
                .service(
                    actix_web::web::scope("/api")
                        .configure(showcase_backend::handlers::init_routes),
                ),
        )
        .await
    };
}

/// Send a request and collect status, headers and JSON body (`Null` when
/// the body is empty or not JSON).
macro_rules! call {
    ($app:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $req.to_request()).await;
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = actix_web::test::read_body(resp).await;
        common::Reply {
            status,
            headers,
            body: serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null),
        }
    }};
}

#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Reply {
    pub fn error(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    pub fn location(&self) -> &str {
        self.headers
            .get(actix_web::http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
    }
}

pub struct TestContext {
    pub db: web::Data<DatabaseConnection>,
    pub cache: web::Data<ProfileCache>,
    pub verifier: web::Data<TokenVerifier>,
    pub social: web::Data<SocialClient>,
    pub states: web::Data<OAuthStates>,
    pub uploads: web::Data<UploadProxy>,
    pub config: web::Data<AppConfig>,
}

impl TestContext {
    pub async fn new() -> Self {
        let upstream = spawn_upstream();
        Self::with_config(config_for(&upstream)).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let db = setup_db().await;
        Self {
            db: web::Data::new(db),
            cache: web::Data::new(ProfileCache::disabled()),
            verifier: web::Data::new(TokenVerifier::from_config(&config.auth)),
            social: web::Data::new(SocialClient::new(config.social.clone())),
            states: web::Data::new(OAuthStates::default()),
            uploads: web::Data::new(UploadProxy::new(config.uploads.clone())),
            config: web::Data::new(config),
        }
    }

    /// A signed-in user with a business profile. Returns (user id, token).
    pub async fn business(&self, name: &str) -> (Uuid, String) {
        self.user_with_profile(CreateProfile {
            user_type: UserType::Business,
            bio: None,
            avatar_url: None,
            business_name: Some(name.to_string()),
            description: Some("Hand-built furniture".to_string()),
            location: Some("Portland".to_string()),
            website: None,
            phone: None,
            services: Some("tables,chairs".to_string()),
        })
        .await
    }

    /// A signed-in user with a client profile. Returns (user id, token).
    pub async fn client(&self) -> (Uuid, String) {
        self.user_with_profile(CreateProfile {
            user_type: UserType::Client,
            bio: Some("Looking for a new desk".to_string()),
            avatar_url: None,
            business_name: None,
            description: None,
            location: None,
            website: None,
            phone: None,
            services: None,
        })
        .await
    }

    async fn user_with_profile(&self, profile: CreateProfile) -> (Uuid, String) {
        let id = Uuid::new_v4();
        user_db::find_or_create_from_auth(
            self.db.get_ref(),
            CreateUserFromAuth {
                id,
                email: format!("{id}@example.com"),
                display_name: Some("Test User".to_string()),
                avatar_url: None,
                auth_provider: "email".to_string(),
            },
        )
        .await
        .unwrap();
        profile_db::insert_profile(self.db.get_ref(), id, profile)
            .await
            .unwrap();
        (id, token_for(id))
    }
}

pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(opts)
        .await
        .expect("Failed to open in-memory SQLite");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    db
}

/// Mint an HS256 token for `user_id`, the way the auth provider would.
pub fn token_for(user_id: Uuid) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 3600,
        iat: Some(now),
        iss: None,
        email: Some(format!("{user_id}@example.com")),
        role: Some("authenticated".to_string()),
        user_metadata: Some(UserMetadata {
            full_name: Some("Test User".to_string()),
            name: None,
            avatar_url: None,
            picture: None,
            email: None,
            email_verified: Some(true),
        }),
        app_metadata: None,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("Failed to encode test JWT")
}

pub fn config_for(upstream: &str) -> AppConfig {
    AppConfig {
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        redis_url: None,
        auth: AuthConfig::Secret(SECRET.to_string()),
        uploads: UploadConfig {
            api_url: Some(format!("{upstream}/files")),
            api_key: UPLOAD_KEY.to_string(),
            api_key_header: "x-api-key".to_string(),
        },
        social: SocialConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: "http://localhost/api/social/callback".to_string(),
            authorize_url: format!("{upstream}/oauth/authorize"),
            token_url: format!("{upstream}/oauth/access_token"),
            api_url: upstream.to_string(),
        },
        frontend_url: FRONTEND.to_string(),
        sync_interval: Duration::from_secs(3600),
        profile_cache_ttl: Duration::from_secs(60),
    }
}

// ── Request builders ──

fn bearer(req: TestRequest, token: &str) -> TestRequest {
    req.insert_header((AUTHORIZATION, format!("Bearer {token}")))
}

pub fn get(uri: &str, token: &str) -> TestRequest {
    bearer(TestRequest::get().uri(uri), token)
}

pub fn delete(uri: &str, token: &str) -> TestRequest {
    bearer(TestRequest::delete().uri(uri), token)
}

pub fn post(uri: &str, token: &str, body: Value) -> TestRequest {
    bearer(TestRequest::post().uri(uri), token).set_json(body)
}

pub fn post_empty(uri: &str, token: &str) -> TestRequest {
    bearer(TestRequest::post().uri(uri), token)
}

pub fn patch(uri: &str, token: &str, body: Value) -> TestRequest {
    bearer(TestRequest::patch().uri(uri), token).set_json(body)
}

// ── Fake upstream ──

/// Start the fake social platform + upload API on an ephemeral port and
/// return its base URL.
pub fn spawn_upstream() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind fake upstream");
    let addr = listener.local_addr().expect("fake upstream addr");

    let server = HttpServer::new(|| {
        App::new()
            .route("/oauth/access_token", web::post().to(fake_token))
            .route("/me/media", web::get().to(fake_media))
            .route("/files", web::post().to(fake_upload_post))
            .route("/files", web::get().to(fake_upload_get))
    })
    .workers(1)
    .disable_signals()
    .listen(listener)
    .expect("listen fake upstream")
    .run();
    actix_web::rt::spawn(server);

    format!("http://{addr}")
}

async fn fake_token(form: web::Form<HashMap<String, String>>) -> HttpResponse {
    let code = form.get("code").map(String::as_str);
    let valid = matches!(code, Some(GOOD_CODE) | Some(HUGE_EXPIRY_CODE))
        && form.get("client_secret").map(String::as_str) == Some("test-secret")
        && form.get("grant_type").map(String::as_str) == Some("authorization_code");

    if !valid {
        return HttpResponse::BadRequest().json(json!({
            "error_type": "OAuthException",
            "error_message": "Invalid authorization code",
        }));
    }

    let expires_in = if code == Some(HUGE_EXPIRY_CODE) {
        i64::MAX
    } else {
        3600
    };

    HttpResponse::Ok().json(json!({
        "access_token": SOCIAL_TOKEN,
        "user_id": 17841400000000000u64,
        "expires_in": expires_in,
    }))
}

async fn fake_media(query: web::Query<HashMap<String, String>>) -> HttpResponse {
    if query.get("access_token").map(String::as_str) != Some(SOCIAL_TOKEN) {
        return HttpResponse::Unauthorized().json(json!({ "error": "bad token" }));
    }

    HttpResponse::Ok().json(json!({
        "data": [
            {
                "id": "media-1",
                "caption": "Walnut dining table",
                "media_type": "IMAGE",
                "media_url": "https://cdn.example.com/1.jpg",
                "permalink": "https://social.example.com/p/1",
                "timestamp": "2024-05-01T10:00:00+0000"
            },
            {
                "id": "media-2",
                "caption": null,
                "media_type": "VIDEO",
                "media_url": "https://cdn.example.com/2.mp4",
                "permalink": "https://social.example.com/p/2",
                "timestamp": "2024-05-03T10:00:00+0000"
            }
        ]
    }))
}

async fn fake_upload_post(req: HttpRequest, body: web::Bytes) -> HttpResponse {
    let key = req.headers().get("x-api-key").and_then(|v| v.to_str().ok());
    if key != Some(UPLOAD_KEY) {
        return HttpResponse::Unauthorized().json(json!({ "error": "missing api key" }));
    }

    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    HttpResponse::Created().json(json!({
        "size": body.len(),
        "query": req.query_string(),
        "content_type": content_type,
        "url": "https://files.example.com/abc.png",
    }))
}

async fn fake_upload_get(req: HttpRequest) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "query": req.query_string() }))
}
