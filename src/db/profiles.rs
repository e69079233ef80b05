use sea_orm::*;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::users as user_db;
use crate::models::profiles::{self, CreateProfile, ProfileResponse, UpdateProfile, UserType};
use crate::models::users::UserResponse;

/// Insert a profile for `user_id`. Uniqueness is checked by the caller.
pub async fn insert_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
    input: CreateProfile,
) -> Result<profiles::Model, DbErr> {
    let new_profile = profiles::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        user_type: Set(input.user_type),
        bio: Set(input.bio),
        avatar_url: Set(input.avatar_url),
        business_name: Set(input.business_name),
        description: Set(input.description),
        location: Set(input.location),
        website: Set(input.website),
        phone: Set(input.phone),
        services: Set(input.services),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_profile.insert(db).await
}

/// Look up a profile through the `user_id` index.
pub async fn get_profile_by_user_id(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Option<profiles::Model>, DbErr> {
    profiles::Entity::find()
        .filter(profiles::Column::UserId.eq(user_id))
        .one(db)
        .await
}

pub async fn profile_exists_for_user(db: &DatabaseConnection, user_id: Uuid) -> Result<bool, DbErr> {
    let count = profiles::Entity::find()
        .filter(profiles::Column::UserId.eq(user_id))
        .count(db)
        .await?;
    Ok(count > 0)
}

/// Fetch all business profiles, newest first.
pub async fn get_business_profiles(
    db: &DatabaseConnection,
) -> Result<Vec<profiles::Model>, DbErr> {
    profiles::Entity::find()
        .filter(profiles::Column::UserType.eq(UserType::Business))
        .order_by_desc(profiles::Column::CreatedAt)
        .all(db)
        .await
}

/// Apply a partial update. Ownership and type never change.
pub async fn update_profile(
    db: &DatabaseConnection,
    profile: profiles::Model,
    input: UpdateProfile,
) -> Result<profiles::Model, DbErr> {
    let mut active: profiles::ActiveModel = profile.into();

    if let Some(bio) = input.bio {
        active.bio = Set(Some(bio));
    }
    if let Some(avatar_url) = input.avatar_url {
        active.avatar_url = Set(Some(avatar_url));
    }
    if let Some(business_name) = input.business_name {
        active.business_name = Set(Some(business_name));
    }
    if let Some(description) = input.description {
        active.description = Set(Some(description));
    }
    if let Some(location) = input.location {
        active.location = Set(Some(location));
    }
    if let Some(website) = input.website {
        active.website = Set(Some(website));
    }
    if let Some(phone) = input.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(services) = input.services {
        active.services = Set(Some(services));
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}

/// Join a profile with its user row.
pub async fn enrich_profile(
    db: &DatabaseConnection,
    profile: profiles::Model,
) -> Result<ProfileResponse, DbErr> {
    let user = user_db::get_user_by_id(db, profile.user_id)
        .await?
        .ok_or(DbErr::RecordNotFound(format!(
            "User {} not found",
            profile.user_id
        )))?;

    Ok(ProfileResponse {
        profile,
        user: UserResponse::from(user),
    })
}

/// Enriched profiles for a set of users, keyed by user id. Users without a
/// profile are simply absent from the map.
pub async fn get_enriched_profiles(
    db: &DatabaseConnection,
    user_ids: Vec<Uuid>,
) -> Result<HashMap<Uuid, ProfileResponse>, DbErr> {
    if user_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = profiles::Entity::find()
        .filter(profiles::Column::UserId.is_in(user_ids.clone()))
        .all(db)
        .await?;
    let mut users = user_db::get_users_by_ids(db, user_ids).await?;

    Ok(rows
        .into_iter()
        .filter_map(|profile| {
            let user = users.remove(&profile.user_id)?;
            Some((
                profile.user_id,
                ProfileResponse {
                    profile,
                    user: UserResponse::from(user),
                },
            ))
        })
        .collect())
}
