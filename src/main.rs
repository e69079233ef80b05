use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use migration::{Migrator, MigratorTrait};
use showcase_backend::auth::jwt::TokenVerifier;
use showcase_backend::cache::ProfileCache;
use showcase_backend::config::{AppConfig, AuthConfig};
use showcase_backend::create_pool;
use showcase_backend::handlers;
use showcase_backend::social::{OAuthStates, SocialClient, sync};
use showcase_backend::uploads::UploadProxy;
use tracing_subscriber::EnvFilter;

const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;

    let db = create_pool(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    Migrator::up(&db, None)
        .await
        .map_err(std::io::Error::other)?;
    tracing::info!("Database ready");

    let profile_cache = match ProfileCache::connect(
        config.redis_url.as_deref(),
        config.profile_cache_ttl,
    )
    .await
    {
        Ok(cache) => {
            if cache.is_enabled() {
                tracing::info!("Connected to Redis");
            }
            cache
        }
        Err(e) => {
            tracing::warn!(error = %e, "Redis unavailable, profile cache disabled");
            ProfileCache::disabled()
        }
    };

    match &config.auth {
        AuthConfig::Jwks { project_ref, .. } => {
            tracing::info!(%project_ref, "Verifying tokens against JWKS")
        }
        AuthConfig::Secret(_) => tracing::info!("Verifying tokens with shared HS256 secret"),
    }
    let verifier = TokenVerifier::from_config(&config.auth);

    let social_client = SocialClient::new(config.social.clone());
    if social_client.is_configured() {
        sync::spawn(db.clone(), social_client.clone(), config.sync_interval);
        tracing::info!(every = ?config.sync_interval, "Social sync scheduled");
    } else {
        tracing::warn!("SOCIAL_CLIENT_ID not set, social integration disabled");
    }

    let upload_proxy = UploadProxy::new(config.uploads.clone());

    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Server running at http://{bind_addr}");

    let db_data = web::Data::new(db);
    let cache_data = web::Data::new(profile_cache);
    let verifier_data = web::Data::new(verifier);
    let social_data = web::Data::new(social_client);
    let states_data = web::Data::new(OAuthStates::default());
    let uploads_data = web::Data::new(upload_proxy);
    let config_data = web::Data::new(config);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(db_data.clone())
            .app_data(cache_data.clone())
            .app_data(verifier_data.clone())
            .app_data(social_data.clone())
            .app_data(states_data.clone())
            .app_data(uploads_data.clone())
            .app_data(config_data.clone())
            .app_data(web::PayloadConfig::new(MAX_UPLOAD_BYTES))
            .service(web::scope("/api").configure(handlers::init_routes))
    })
    .bind(&bind_addr)?
    .run()
    .await
}
