//! OAuth callback, social sync and upload proxy, exercised against a local
//! fake upstream.
//!
//! Run with: `cargo test --test social_test`
#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::test::TestRequest;
use chrono::{Duration, Utc};
use reqwest::Url;
use uuid::Uuid;

use common::{FRONTEND, GOOD_CODE, HUGE_EXPIRY_CODE, SOCIAL_TOKEN, TestContext, config_for, delete, get, post_empty};
use showcase_backend::db::social as social_db;
use showcase_backend::models::social_accounts::ConnectAccount;
use showcase_backend::social::sync;

fn state_from(url: &str) -> String {
    Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .expect("authorize URL carries a state")
}

fn callback(query: &str) -> TestRequest {
    TestRequest::get().uri(&format!("/api/social/callback?{query}"))
}

// ── OAuth ──

#[actix_web::test]
async fn connect_requires_a_business_profile() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let (_, client_token) = ctx.client().await;

    let reply = call!(app, get("/api/social/connect", &client_token));
    assert_eq!(reply.status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn callback_connects_the_account_and_redirects() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let (business, token) = ctx.business("Oak & Iron").await;

    let reply = call!(app, get("/api/social/connect", &token));
    assert_eq!(reply.status, StatusCode::OK);
    let url = reply.body["url"].as_str().unwrap();
    assert!(url.contains("client_id=test-client"));
    let state = state_from(url);

    let reply = call!(app, callback(&format!("code={GOOD_CODE}&state={state}")));
    assert_eq!(reply.status, StatusCode::FOUND);
    assert_eq!(
        reply.location(),
        format!("{FRONTEND}/settings?social=connected")
    );

    let reply = call!(app, get("/api/social/account", &token));
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["connected"], true);
    assert_eq!(reply.body["external_user_id"], "17841400000000000");
    assert!(reply.body["token_expires_at"].is_string());
    assert!(reply.body.get("access_token").is_none());

    let stored = social_db::get_account_by_user(ctx.db.get_ref(), business)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.access_token, SOCIAL_TOKEN);

    // States are single use.
    let reply = call!(app, callback(&format!("code={GOOD_CODE}&state={state}")));
    assert_eq!(
        reply.location(),
        format!("{FRONTEND}/settings?social=error")
    );
}

#[actix_web::test]
async fn callback_tolerates_an_out_of_range_token_lifetime() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let (business, token) = ctx.business("Oak & Iron").await;

    let state = ctx.states.issue(business).await;
    let reply = call!(app, callback(&format!("code={HUGE_EXPIRY_CODE}&state={state}")));
    assert_eq!(reply.status, StatusCode::FOUND);
    assert_eq!(
        reply.location(),
        format!("{FRONTEND}/settings?social=connected")
    );

    let reply = call!(app, get("/api/social/account", &token));
    assert_eq!(reply.body["connected"], true);
    assert!(reply.body["token_expires_at"].is_null());
}

#[actix_web::test]
async fn callback_failures_redirect_with_error_flag() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let (business, _) = ctx.business("Oak & Iron").await;
    let error_location = format!("{FRONTEND}/settings?social=error");

    let reply = call!(app, callback(&format!("code={GOOD_CODE}&state=never-issued")));
    assert_eq!(reply.status, StatusCode::FOUND);
    assert_eq!(reply.location(), error_location);

    let state = ctx.states.issue(business).await;
    let reply = call!(app, callback(&format!("state={state}")));
    assert_eq!(reply.location(), error_location);

    let state = ctx.states.issue(business).await;
    let reply = call!(
        app,
        callback(&format!("error=access_denied&error_description=nope&state={state}"))
    );
    assert_eq!(reply.location(), error_location);

    let state = ctx.states.issue(business).await;
    let reply = call!(app, callback(&format!("code=wrong-code&state={state}")));
    assert_eq!(reply.location(), error_location);

    let account = social_db::get_account_by_user(ctx.db.get_ref(), business)
        .await
        .unwrap();
    assert!(account.is_none());
}

#[actix_web::test]
async fn callback_preflight_is_open() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let reply = call!(
        app,
        TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/api/social/callback")
    );
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    assert_eq!(
        reply.headers.get("access-control-allow-origin").unwrap(),
        "*"
    );
}

// ── Sync ──

async fn connect(ctx: &TestContext, user_id: Uuid, expires_in: Duration) {
    social_db::upsert_account(
        ctx.db.get_ref(),
        ConnectAccount {
            user_id,
            external_user_id: "17841400000000000".to_string(),
            access_token: SOCIAL_TOKEN.to_string(),
            token_expires_at: Some(Utc::now() + expires_in),
        },
    )
    .await
    .unwrap();
}

#[actix_web::test]
async fn manual_sync_mirrors_posts_without_duplicates() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let (business, token) = ctx.business("Oak & Iron").await;
    let (_, viewer_token) = ctx.client().await;
    connect(&ctx, business, Duration::days(30)).await;

    for _ in 0..2 {
        let reply = call!(app, post_empty("/api/social/sync", &token));
        assert_eq!(reply.status, StatusCode::OK);
        assert_eq!(reply.body["synced"], 2);
    }

    let reply = call!(app, get(&format!("/api/social/posts/{business}"), &viewer_token));
    assert_eq!(reply.status, StatusCode::OK);
    let posts = reply.body.as_array().unwrap();
    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0]["external_id"], "media-2");
    assert_eq!(posts[1]["caption"], "Walnut dining table");

    let reply = call!(
        app,
        get(&format!("/api/social/posts/{business}?limit=1"), &viewer_token)
    );
    assert_eq!(reply.body.as_array().unwrap().len(), 1);

    let reply = call!(app, get("/api/social/account", &token));
    assert!(reply.body["last_synced_at"].is_string());
}

#[actix_web::test]
async fn sync_without_account_or_with_expired_token() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let (business, token) = ctx.business("Oak & Iron").await;

    let reply = call!(app, post_empty("/api/social/sync", &token));
    assert_eq!(reply.status, StatusCode::NOT_FOUND);

    connect(&ctx, business, Duration::hours(-1)).await;
    let reply = call!(app, post_empty("/api/social/sync", &token));
    assert_eq!(reply.status, StatusCode::CONFLICT);
    assert!(reply.error().contains("reconnect"));
}

#[actix_web::test]
async fn scheduled_pass_skips_expired_accounts() {
    let ctx = TestContext::new().await;
    let (fresh, _) = ctx.business("Oak & Iron").await;
    let (stale, _) = ctx.business("Rival Works").await;
    connect(&ctx, fresh, Duration::days(30)).await;
    connect(&ctx, stale, Duration::hours(-1)).await;

    let summary = sync::run_once(ctx.db.get_ref(), ctx.social.get_ref())
        .await
        .unwrap();
    assert_eq!(summary.synced, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed, 0);

    let posts = social_db::get_posts_by_user(ctx.db.get_ref(), fresh, 25)
        .await
        .unwrap();
    assert_eq!(posts.len(), 2);
    let posts = social_db::get_posts_by_user(ctx.db.get_ref(), stale, 25)
        .await
        .unwrap();
    assert!(posts.is_empty());
}

#[actix_web::test]
async fn disconnect_removes_account_and_posts() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let (business, token) = ctx.business("Oak & Iron").await;
    connect(&ctx, business, Duration::days(30)).await;
    call!(app, post_empty("/api/social/sync", &token));

    let reply = call!(app, delete("/api/social/account", &token));
    assert_eq!(reply.status, StatusCode::OK);

    let reply = call!(app, get("/api/social/account", &token));
    assert_eq!(reply.body["connected"], false);

    let reply = call!(app, get(&format!("/api/social/posts/{business}"), &token));
    assert!(reply.body.as_array().unwrap().is_empty());

    let reply = call!(app, delete("/api/social/account", &token));
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
}

// ── Upload proxy ──

#[actix_web::test]
async fn upload_post_is_relayed_with_the_server_key() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);
    let (_, token) = ctx.client().await;

    let reply = call!(
        app,
        TestRequest::post()
            .uri("/api/uploads?slug=avatar")
            .insert_header(("Authorization", format!("Bearer {token}")))
            .insert_header((CONTENT_TYPE, "image/png"))
            .set_payload(vec![0u8; 512])
    );
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.body["size"], 512);
    assert_eq!(reply.body["query"], "slug=avatar");
    assert_eq!(reply.body["content_type"], "image/png");
    assert_eq!(
        reply.headers.get("access-control-allow-origin").unwrap(),
        "*"
    );

    let reply = call!(app, get("/api/uploads?id=abc", &token));
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body["query"], "id=abc");
}

#[actix_web::test]
async fn upload_proxy_requires_auth_but_preflight_does_not() {
    let ctx = TestContext::new().await;
    let app = test_app!(ctx);

    let reply = call!(app, TestRequest::post().uri("/api/uploads").set_payload("x"));
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);

    let reply = call!(
        app,
        TestRequest::default()
            .method(actix_web::http::Method::OPTIONS)
            .uri("/api/uploads")
    );
    assert_eq!(reply.status, StatusCode::NO_CONTENT);
    let allowed = reply
        .headers
        .get("access-control-allow-methods")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(allowed.contains("POST"));
}

#[actix_web::test]
async fn upstream_errors_and_missing_config() {
    let upstream = common::spawn_upstream();

    // Upstream rejects a bad key; the status is relayed as-is.
    let mut config = config_for(&upstream);
    config.uploads.api_key = "wrong".to_string();
    let ctx = TestContext::with_config(config).await;
    let app = test_app!(ctx);
    let (_, token) = ctx.client().await;
    let reply = call!(app, post_empty("/api/uploads", &token).set_payload("x"));
    assert_eq!(reply.status, StatusCode::UNAUTHORIZED);
    assert_eq!(reply.error(), "missing api key");

    let mut config = config_for(&upstream);
    config.uploads.api_url = None;
    let ctx = TestContext::with_config(config).await;
    let app = test_app!(ctx);
    let (_, token) = ctx.client().await;
    let reply = call!(app, post_empty("/api/uploads", &token).set_payload("x"));
    assert_eq!(reply.status, StatusCode::SERVICE_UNAVAILABLE);

    let mut config = config_for(&upstream);
    config.uploads.api_url = Some("http://127.0.0.1:1/files".to_string());
    let ctx = TestContext::with_config(config).await;
    let app = test_app!(ctx);
    let (_, token) = ctx.client().await;
    let reply = call!(app, get("/api/uploads", &token));
    assert_eq!(reply.status, StatusCode::BAD_GATEWAY);
}
