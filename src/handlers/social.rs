use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use uuid::Uuid;

use super::preflight;
use crate::auth::authorization::require_business;
use crate::auth::middleware::AuthenticatedUser;
use crate::config::AppConfig;
use crate::db::social as social_db;
use crate::errors::{ApiError, ApiResult};
use crate::models::social_accounts::{AccountStatus, ConnectAccount};
use crate::social::sync::{self, SyncError};
use crate::social::{OAuthStates, SocialClient};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PostListQuery {
    pub limit: Option<u64>,
}

impl PostListQuery {
    pub fn limit(&self) -> u64 {
        self.limit.unwrap_or(25).clamp(1, 100)
    }
}

/// GET /api/social/connect — start the OAuth flow for the caller's business.
pub async fn connect(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    client: web::Data<SocialClient>,
    states: web::Data<OAuthStates>,
) -> ApiResult<HttpResponse> {
    require_business(db.get_ref(), user.id()).await?;

    if !client.is_configured() {
        return Err(ApiError::Unavailable(
            "Social integration is not configured".to_string(),
        ));
    }

    let state = states.issue(user.id()).await;
    let url = client
        .authorize_url(&state)
        .map_err(|e| ApiError::Unavailable(e.to_string()))?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "url": url })))
}

/// Everything the callback does before redirecting. Returns the user the
/// account was connected for.
async fn complete_oauth(
    query: CallbackQuery,
    db: &DatabaseConnection,
    client: &SocialClient,
    states: &OAuthStates,
) -> Result<Uuid, String> {
    if let Some(error) = query.error {
        return Err(format!(
            "provider denied authorization: {error} {}",
            query.error_description.unwrap_or_default()
        ));
    }

    let state = query.state.ok_or("missing state")?;
    let code = query.code.ok_or("missing code")?;
    let user_id = states
        .take(&state)
        .await
        .ok_or("unknown or expired state")?;

    let grant = client
        .exchange_code(&code)
        .await
        .map_err(|e| format!("code exchange failed: {e}"))?;

    social_db::upsert_account(
        db,
        ConnectAccount {
            user_id,
            external_user_id: grant.external_user_id(),
            token_expires_at: grant.expires_at(chrono::Utc::now()),
            access_token: grant.access_token,
        },
    )
    .await
    .map_err(|e| format!("could not store account: {e}"))?;

    Ok(user_id)
}

/// GET /api/social/callback — the platform redirects the browser here.
///
/// Never answers with JSON: success and failure both redirect back to the
/// frontend with a `social=` flag.
pub async fn callback(
    query: web::Query<CallbackQuery>,
    db: web::Data<DatabaseConnection>,
    client: web::Data<SocialClient>,
    states: web::Data<OAuthStates>,
    config: web::Data<AppConfig>,
) -> HttpResponse {
    let outcome = complete_oauth(
        query.into_inner(),
        db.get_ref(),
        client.get_ref(),
        states.get_ref(),
    )
    .await;

    let flag = match outcome {
        Ok(user_id) => {
            tracing::info!(%user_id, "social account connected");
            "connected"
        }
        Err(reason) => {
            tracing::warn!(%reason, "social OAuth callback failed");
            "error"
        }
    };

    HttpResponse::Found()
        .insert_header((
            LOCATION,
            format!("{}/settings?social={flag}", config.frontend_url),
        ))
        .insert_header(("Access-Control-Allow-Origin", "*"))
        .finish()
}

/// OPTIONS /api/social/callback
pub async fn callback_options() -> HttpResponse {
    preflight("GET, OPTIONS")
}

/// GET /api/social/account — connection status, never the token.
pub async fn get_account(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let account = social_db::get_account_by_user(db.get_ref(), user.id()).await?;
    Ok(HttpResponse::Ok().json(AccountStatus::from(account)))
}

/// DELETE /api/social/account — disconnect and drop mirrored posts.
pub async fn disconnect(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let removed = social_db::delete_account(db.get_ref(), user.id()).await?;
    if removed == 0 {
        return Err(ApiError::NotFound(
            "No social account is connected".to_string(),
        ));
    }

    tracing::info!(user_id = %user.id(), "social account disconnected");
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Social account disconnected",
    })))
}

/// POST /api/social/sync — pull the caller's latest posts right now.
pub async fn sync_now(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    client: web::Data<SocialClient>,
) -> ApiResult<HttpResponse> {
    let account = social_db::get_account_by_user(db.get_ref(), user.id())
        .await?
        .ok_or_else(|| ApiError::NotFound("No social account is connected".to_string()))?;

    let synced = sync::sync_account(db.get_ref(), client.get_ref(), account)
        .await
        .map_err(|e| match e {
            SyncError::TokenExpired => ApiError::Conflict(
                "The social account token has expired; reconnect the account".to_string(),
            ),
            SyncError::Social(e) => ApiError::Upstream(e.to_string()),
            SyncError::Database(e) => ApiError::from(e),
        })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "synced": synced })))
}

/// GET /api/social/posts/{user_id}?limit=
pub async fn get_posts(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    query: web::Query<PostListQuery>,
) -> ApiResult<HttpResponse> {
    let posts = social_db::get_posts_by_user(db.get_ref(), path.into_inner(), query.limit()).await?;
    Ok(HttpResponse::Ok().json(posts))
}
