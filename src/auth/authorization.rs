use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::db::profiles as profile_db;
use crate::errors::{ApiError, ApiResult};
use crate::models::{appointments, profiles, projects, testimonials};

/// Look up the caller's profile by the `user_id` index.
pub async fn require_profile(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> ApiResult<profiles::Model> {
    profile_db::get_profile_by_user_id(db, user_id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("Create a profile first".to_string()))
}

pub async fn require_business(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> ApiResult<profiles::Model> {
    let profile = require_profile(db, user_id).await?;
    if !profile.is_business() {
        return Err(ApiError::Forbidden(
            "Only business accounts can do this".to_string(),
        ));
    }
    Ok(profile)
}

pub async fn require_client(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> ApiResult<profiles::Model> {
    let profile = require_profile(db, user_id).await?;
    if !profile.is_client() {
        return Err(ApiError::Forbidden(
            "Only client accounts can do this".to_string(),
        ));
    }
    Ok(profile)
}

pub fn ensure_appointment_owner(appt: &appointments::Model, user_id: Uuid) -> ApiResult<()> {
    if appt.business_id != user_id {
        return Err(ApiError::Forbidden(
            "Only the owning business can change this appointment".to_string(),
        ));
    }
    Ok(())
}

pub fn ensure_project_owner(project: &projects::Model, user_id: Uuid) -> ApiResult<()> {
    if project.business_id != user_id {
        return Err(ApiError::Forbidden(
            "Only the owning business can change this project".to_string(),
        ));
    }
    Ok(())
}

pub fn ensure_project_party(project: &projects::Model, user_id: Uuid) -> ApiResult<()> {
    if !project.is_party(user_id) {
        return Err(ApiError::Forbidden(
            "You can only view projects you are involved in".to_string(),
        ));
    }
    Ok(())
}

pub fn ensure_testimonial_author(t: &testimonials::Model, user_id: Uuid) -> ApiResult<()> {
    if t.client_id != user_id {
        return Err(ApiError::Forbidden(
            "You can only edit your own testimonials".to_string(),
        ));
    }
    Ok(())
}

pub fn ensure_testimonial_business(t: &testimonials::Model, user_id: Uuid) -> ApiResult<()> {
    if t.business_id != user_id {
        return Err(ApiError::Forbidden(
            "Only the business this testimonial is about can highlight it".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn project(business_id: Uuid, client_id: Uuid) -> projects::Model {
        projects::Model {
            id: Uuid::new_v4(),
            business_id,
            client_id,
            title: "Brand refresh".to_string(),
            description: None,
            status: projects::Status::Planned,
            estimated_start: None,
            estimated_end: None,
            actual_start: None,
            actual_end: None,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    #[test]
    fn only_owner_mutates_project() {
        let (biz, client) = (Uuid::new_v4(), Uuid::new_v4());
        let p = project(biz, client);

        assert!(ensure_project_owner(&p, biz).is_ok());
        assert!(matches!(
            ensure_project_owner(&p, client),
            Err(ApiError::Forbidden(_))
        ));
    }

    #[test]
    fn both_parties_can_view_project() {
        let (biz, client) = (Uuid::new_v4(), Uuid::new_v4());
        let p = project(biz, client);

        assert!(ensure_project_party(&p, biz).is_ok());
        assert!(ensure_project_party(&p, client).is_ok());
        assert!(ensure_project_party(&p, Uuid::new_v4()).is_err());
    }

    #[test]
    fn testimonial_roles_are_split() {
        let (biz, client) = (Uuid::new_v4(), Uuid::new_v4());
        let t = testimonials::Model {
            id: Uuid::new_v4(),
            client_id: client,
            business_id: biz,
            project_id: None,
            content: "Great work".to_string(),
            rating: Some(5),
            is_highlighted: false,
            created_at: Utc::now(),
            updated_at: None,
        };

        assert!(ensure_testimonial_author(&t, client).is_ok());
        assert!(ensure_testimonial_author(&t, biz).is_err());
        assert!(ensure_testimonial_business(&t, biz).is_ok());
        assert!(ensure_testimonial_business(&t, client).is_err());
    }
}
