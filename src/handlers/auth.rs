use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;

use crate::auth::middleware::AuthenticatedUser;
use crate::db::profiles as profile_db;
use crate::errors::ApiResult;
use crate::models::users::UserResponse;

/// GET /api/auth/me — the caller's user row plus their profile, if any.
pub async fn me(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let profile = profile_db::get_profile_by_user_id(db.get_ref(), user.id()).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "user": UserResponse::from(user.0),
        "profile": profile,
    })))
}
