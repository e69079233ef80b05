use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::require_text;
use crate::auth::authorization::{
    ensure_project_owner, ensure_project_party, require_business, require_profile,
};
use crate::auth::middleware::AuthenticatedUser;
use crate::db::profiles as profile_db;
use crate::db::projects as project_db;
use crate::errors::{ApiError, ApiResult};
use crate::models::profiles::UserType;
use crate::models::projects::{self, CreateProject, ProjectResponse, UpdateProject};
use crate::models::validate_range;

async fn enrich(
    db: &DatabaseConnection,
    items: Vec<projects::Model>,
) -> ApiResult<Vec<ProjectResponse>> {
    let mut ids: Vec<Uuid> = items
        .iter()
        .flat_map(|p| [p.business_id, p.client_id])
        .collect();
    ids.sort();
    ids.dedup();

    let profiles = profile_db::get_enriched_profiles(db, ids).await?;

    Ok(items
        .into_iter()
        .map(|project| ProjectResponse {
            business: profiles.get(&project.business_id).cloned(),
            client: profiles.get(&project.client_id).cloned(),
            project,
        })
        .collect())
}

async fn enrich_one(db: &DatabaseConnection, item: projects::Model) -> ApiResult<ProjectResponse> {
    enrich(db, vec![item])
        .await?
        .pop()
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))
}

async fn find(db: &DatabaseConnection, id: Uuid) -> ApiResult<projects::Model> {
    project_db::get_project_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project {id} not found")))
}

/// POST /api/projects — a business opens a project with one of its clients.
pub async fn create_project(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateProject>,
) -> ApiResult<HttpResponse> {
    require_business(db.get_ref(), user.id()).await?;

    let input = body.into_inner();
    require_text(&input.title, "title")?;
    validate_range(input.estimated_start, input.estimated_end, "Estimated")
        .map_err(ApiError::BadRequest)?;

    match profile_db::get_profile_by_user_id(db.get_ref(), input.client_id).await? {
        Some(profile) if profile.is_client() => {}
        Some(_) => {
            return Err(ApiError::BadRequest(
                "client_id must refer to a client account".to_string(),
            ));
        }
        None => {
            return Err(ApiError::BadRequest(format!(
                "No client profile for user {}",
                input.client_id
            )));
        }
    }

    let created = project_db::insert_project(db.get_ref(), user.id(), input).await?;
    tracing::info!(
        project_id = %created.id,
        business_id = %created.business_id,
        client_id = %created.client_id,
        "project created"
    );

    Ok(HttpResponse::Created().json(enrich_one(db.get_ref(), created).await?))
}

/// GET /api/projects/mine
pub async fn get_my_projects(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let profile = require_profile(db.get_ref(), user.id()).await?;

    let items = match profile.user_type {
        UserType::Business => project_db::get_projects_by_business(db.get_ref(), user.id()).await?,
        UserType::Client => project_db::get_projects_by_client(db.get_ref(), user.id()).await?,
    };

    Ok(HttpResponse::Ok().json(enrich(db.get_ref(), items).await?))
}

/// GET /api/projects/{id} — either party can read it.
pub async fn get_project(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let project = find(db.get_ref(), path.into_inner()).await?;
    ensure_project_party(&project, user.id())?;

    Ok(HttpResponse::Ok().json(enrich_one(db.get_ref(), project).await?))
}

/// PATCH /api/projects/{id} — only the owning business.
pub async fn update_project(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateProject>,
) -> ApiResult<HttpResponse> {
    let project = find(db.get_ref(), path.into_inner()).await?;
    ensure_project_owner(&project, user.id())?;

    if project.status.is_terminal() {
        return Err(ApiError::Conflict(format!(
            "Project is already {:?} and can no longer change",
            project.status
        )));
    }

    let input = body.into_inner();
    if let Some(next) = input.status {
        if next != project.status && !project.status.can_transition_to(next) {
            return Err(ApiError::Conflict(format!(
                "Cannot move project from {:?} to {next:?}",
                project.status
            )));
        }
    }
    if let Some(title) = &input.title {
        require_text(title, "title")?;
    }

    let input = input.with_lifecycle_stamps(&project, chrono::Utc::now());

    validate_range(
        input.estimated_start.or(project.estimated_start),
        input.estimated_end.or(project.estimated_end),
        "Estimated",
    )
    .map_err(ApiError::BadRequest)?;
    validate_range(
        input.actual_start.or(project.actual_start),
        input.actual_end.or(project.actual_end),
        "Actual",
    )
    .map_err(ApiError::BadRequest)?;

    let updated = project_db::update_project(db.get_ref(), project, input).await?;
    tracing::debug!(project_id = %updated.id, status = ?updated.status, "project updated");

    Ok(HttpResponse::Ok().json(enrich_one(db.get_ref(), updated).await?))
}
