use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::auth::middleware::AuthenticatedUser;
use crate::cache::ProfileCache;
use crate::db::profiles as profile_db;
use crate::errors::{ApiError, ApiResult};
use crate::models::profiles::{CreateProfile, ProfileResponse, UpdateProfile};

/// POST /api/profiles — create the caller's profile. One per user.
pub async fn create_profile(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateProfile>,
) -> ApiResult<HttpResponse> {
    let input = body.into_inner();
    input.validate().map_err(ApiError::BadRequest)?;

    if profile_db::profile_exists_for_user(db.get_ref(), user.id()).await? {
        return Err(ApiError::Conflict(
            "A profile already exists for this user".to_string(),
        ));
    }

    let profile = profile_db::insert_profile(db.get_ref(), user.id(), input).await?;
    tracing::info!(user_id = %user.id(), user_type = ?profile.user_type, "profile created");

    let response = ProfileResponse {
        profile,
        user: user.0.into(),
    };
    Ok(HttpResponse::Created().json(response))
}

/// GET /api/profiles/me
pub async fn get_my_profile(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let profile = profile_db::get_profile_by_user_id(db.get_ref(), user.id())
        .await?
        .ok_or_else(|| ApiError::NotFound("You have not created a profile yet".to_string()))?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        profile,
        user: user.0.into(),
    }))
}

/// PATCH /api/profiles/me — partial update of the caller's own profile.
pub async fn update_my_profile(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<ProfileCache>,
    body: web::Json<UpdateProfile>,
) -> ApiResult<HttpResponse> {
    let profile = profile_db::get_profile_by_user_id(db.get_ref(), user.id())
        .await?
        .ok_or_else(|| ApiError::NotFound("You have not created a profile yet".to_string()))?;

    let input = body.into_inner();
    input
        .validate_for(profile.user_type)
        .map_err(ApiError::BadRequest)?;

    let updated = profile_db::update_profile(db.get_ref(), profile, input).await?;
    cache.invalidate(user.id()).await;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        profile: updated,
        user: user.0.into(),
    }))
}

/// GET /api/profiles/{user_id} — enriched profile for any user.
pub async fn get_profile(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    cache: web::Data<ProfileCache>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = path.into_inner();

    if let Some(cached) = cache.get(user_id).await {
        return Ok(HttpResponse::Ok().json(cached));
    }

    let profile = profile_db::get_profile_by_user_id(db.get_ref(), user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Profile for user {user_id} not found")))?;

    let response = profile_db::enrich_profile(db.get_ref(), profile).await?;
    if response.profile.is_business() {
        cache.put(&response).await;
    }

    Ok(HttpResponse::Ok().json(response))
}

/// GET /api/profiles/businesses — every business profile, newest first.
pub async fn get_business_profiles(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let profiles = profile_db::get_business_profiles(db.get_ref()).await?;
    let order: Vec<Uuid> = profiles.iter().map(|p| p.user_id).collect();

    let mut enriched = profile_db::get_enriched_profiles(db.get_ref(), order.clone()).await?;
    let response: Vec<ProfileResponse> = order
        .into_iter()
        .filter_map(|id| enriched.remove(&id))
        .collect();

    Ok(HttpResponse::Ok().json(response))
}
