use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::require_text;
use crate::auth::authorization::{
    ensure_testimonial_author, ensure_testimonial_business, require_client,
};
use crate::auth::middleware::AuthenticatedUser;
use crate::db::profiles as profile_db;
use crate::db::projects as project_db;
use crate::db::testimonials as testimonial_db;
use crate::db::users as user_db;
use crate::errors::{ApiError, ApiResult};
use crate::models::testimonials::{
    self, CreateTestimonial, TestimonialListQuery, TestimonialResponse, UpdateTestimonial,
    validate_rating,
};
use crate::models::users::UserResponse;

async fn enrich(
    db: &DatabaseConnection,
    items: Vec<testimonials::Model>,
) -> ApiResult<Vec<TestimonialResponse>> {
    let client_ids: Vec<Uuid> = items.iter().map(|t| t.client_id).collect();
    let clients = user_db::get_users_by_ids(db, client_ids).await?;

    Ok(items
        .into_iter()
        .map(|testimonial| TestimonialResponse {
            client: clients
                .get(&testimonial.client_id)
                .cloned()
                .map(UserResponse::from),
            testimonial,
        })
        .collect())
}

async fn enrich_one(
    db: &DatabaseConnection,
    item: testimonials::Model,
) -> ApiResult<TestimonialResponse> {
    enrich(db, vec![item])
        .await?
        .pop()
        .ok_or_else(|| ApiError::NotFound("Testimonial not found".to_string()))
}

async fn find(db: &DatabaseConnection, id: Uuid) -> ApiResult<testimonials::Model> {
    testimonial_db::get_testimonial_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Testimonial {id} not found")))
}

/// POST /api/testimonials — a client writes about a business.
///
/// When tied to a project, the project must be between this client and that business.
pub async fn create_testimonial(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateTestimonial>,
) -> ApiResult<HttpResponse> {
    require_client(db.get_ref(), user.id()).await?;

    let input = body.into_inner();
    require_text(&input.content, "content")?;
    validate_rating(input.rating).map_err(ApiError::BadRequest)?;

    match profile_db::get_profile_by_user_id(db.get_ref(), input.business_id).await? {
        Some(profile) if profile.is_business() => {}
        Some(_) => {
            return Err(ApiError::BadRequest(
                "Testimonials can only be written about businesses".to_string(),
            ));
        }
        None => {
            return Err(ApiError::NotFound(format!(
                "Business {} not found",
                input.business_id
            )));
        }
    }

    if let Some(project_id) = input.project_id {
        let project = project_db::get_project_by_id(db.get_ref(), project_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Project {project_id} not found")))?;

        if project.client_id != user.id() || project.business_id != input.business_id {
            return Err(ApiError::Forbidden(
                "You can only review projects you took part in with this business".to_string(),
            ));
        }
    }

    let created = testimonial_db::insert_testimonial(db.get_ref(), user.id(), input).await?;
    tracing::info!(
        testimonial_id = %created.id,
        business_id = %created.business_id,
        "testimonial created"
    );

    Ok(HttpResponse::Created().json(enrich_one(db.get_ref(), created).await?))
}

/// GET /api/testimonials/business/{business_id}?highlighted=
pub async fn get_business_testimonials(
    _user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    query: web::Query<TestimonialListQuery>,
) -> ApiResult<HttpResponse> {
    let items =
        testimonial_db::get_testimonials_by_business(db.get_ref(), path.into_inner(), query.highlighted)
            .await?;

    Ok(HttpResponse::Ok().json(enrich(db.get_ref(), items).await?))
}

/// PATCH /api/testimonials/{id} — the author edits content or rating.
pub async fn update_testimonial(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateTestimonial>,
) -> ApiResult<HttpResponse> {
    let testimonial = find(db.get_ref(), path.into_inner()).await?;
    ensure_testimonial_author(&testimonial, user.id())?;

    let input = body.into_inner();
    if let Some(content) = &input.content {
        require_text(content, "content")?;
    }
    validate_rating(input.rating).map_err(ApiError::BadRequest)?;

    let updated = testimonial_db::update_testimonial(db.get_ref(), testimonial, input).await?;
    Ok(HttpResponse::Ok().json(enrich_one(db.get_ref(), updated).await?))
}

/// POST /api/testimonials/{id}/highlight — the business flips the featured flag.
pub async fn toggle_highlight(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let testimonial = find(db.get_ref(), path.into_inner()).await?;
    ensure_testimonial_business(&testimonial, user.id())?;

    let updated = testimonial_db::toggle_highlight(db.get_ref(), testimonial).await?;
    tracing::info!(
        testimonial_id = %updated.id,
        highlighted = updated.is_highlighted,
        "testimonial highlight toggled"
    );

    Ok(HttpResponse::Ok().json(enrich_one(db.get_ref(), updated).await?))
}
