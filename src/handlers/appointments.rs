use actix_web::{HttpResponse, web};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use super::require_text;
use crate::auth::authorization::{ensure_appointment_owner, require_business, require_client, require_profile};
use crate::auth::middleware::AuthenticatedUser;
use crate::db::appointments as appointment_db;
use crate::db::profiles as profile_db;
use crate::db::users as user_db;
use crate::errors::{ApiError, ApiResult};
use crate::models::appointments::{
    self, AppointmentListQuery, AppointmentResponse, CreateAppointment, Status, UpdateAppointment,
};
use crate::models::profiles::UserType;
use crate::models::users::UserResponse;
use crate::models::validate_range;

/// Join business profiles and booked clients onto a batch of appointments.
async fn enrich(
    db: &DatabaseConnection,
    items: Vec<appointments::Model>,
) -> ApiResult<Vec<AppointmentResponse>> {
    let business_ids: Vec<Uuid> = items.iter().map(|a| a.business_id).collect();
    let client_ids: Vec<Uuid> = items.iter().filter_map(|a| a.client_id).collect();

    let businesses = profile_db::get_enriched_profiles(db, business_ids).await?;
    let clients = user_db::get_users_by_ids(db, client_ids).await?;

    Ok(items
        .into_iter()
        .map(|appointment| AppointmentResponse {
            business: businesses.get(&appointment.business_id).cloned(),
            client: appointment
                .client_id
                .and_then(|id| clients.get(&id).cloned())
                .map(UserResponse::from),
            appointment,
        })
        .collect())
}

async fn enrich_one(
    db: &DatabaseConnection,
    item: appointments::Model,
) -> ApiResult<AppointmentResponse> {
    enrich(db, vec![item])
        .await?
        .pop()
        .ok_or_else(|| ApiError::NotFound("Appointment not found".to_string()))
}

async fn find(db: &DatabaseConnection, id: Uuid) -> ApiResult<appointments::Model> {
    appointment_db::get_appointment_by_id(db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Appointment {id} not found")))
}

/// POST /api/appointments — a business publishes an open slot.
pub async fn create_appointment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    body: web::Json<CreateAppointment>,
) -> ApiResult<HttpResponse> {
    require_business(db.get_ref(), user.id()).await?;

    let input = body.into_inner();
    require_text(&input.title, "title")?;
    validate_range(Some(input.start_time), Some(input.end_time), "Appointment")
        .map_err(ApiError::BadRequest)?;

    let created = appointment_db::insert_appointment(db.get_ref(), user.id(), input).await?;
    tracing::info!(appointment_id = %created.id, business_id = %user.id(), "appointment created");

    Ok(HttpResponse::Created().json(enrich_one(db.get_ref(), created).await?))
}

/// GET /api/appointments/mine — owned slots for a business, bookings for a client.
pub async fn get_my_appointments(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
) -> ApiResult<HttpResponse> {
    let profile = require_profile(db.get_ref(), user.id()).await?;

    let items = match profile.user_type {
        UserType::Business => {
            appointment_db::get_appointments_by_business(db.get_ref(), user.id(), None).await?
        }
        UserType::Client => appointment_db::get_appointments_by_client(db.get_ref(), user.id()).await?,
    };

    Ok(HttpResponse::Ok().json(enrich(db.get_ref(), items).await?))
}

/// GET /api/appointments/business/{business_id}?status=
///
/// The owner sees everything; anyone else sees open slots and their own bookings.
pub async fn get_business_appointments(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    query: web::Query<AppointmentListQuery>,
) -> ApiResult<HttpResponse> {
    let business_id = path.into_inner();
    let caller = user.id();

    let items: Vec<_> =
        appointment_db::get_appointments_by_business(db.get_ref(), business_id, query.status)
            .await?
            .into_iter()
            .filter(|a| a.is_visible_to(caller))
            .collect();

    Ok(HttpResponse::Ok().json(enrich(db.get_ref(), items).await?))
}

/// GET /api/appointments/{id}
pub async fn get_appointment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let appointment = find(db.get_ref(), path.into_inner()).await?;

    if !appointment.is_visible_to(user.id()) {
        return Err(ApiError::Forbidden(
            "You can only view appointments you are involved in".to_string(),
        ));
    }

    Ok(HttpResponse::Ok().json(enrich_one(db.get_ref(), appointment).await?))
}

/// POST /api/appointments/{id}/book — a client claims an open slot.
///
/// Slots belong to businesses, so the client-only check also keeps owners
/// from booking their own.
pub async fn book_appointment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    require_client(db.get_ref(), user.id()).await?;

    let id = path.into_inner();
    let appointment = find(db.get_ref(), id).await?;

    if appointment.status != Status::Available {
        return Err(ApiError::Conflict(
            "This appointment is no longer available".to_string(),
        ));
    }

    let booked = appointment_db::book_appointment(db.get_ref(), id, user.id())
        .await?
        .ok_or_else(|| {
            ApiError::Conflict("This appointment is no longer available".to_string())
        })?;
    tracing::info!(appointment_id = %id, client_id = %user.id(), "appointment booked");

    Ok(HttpResponse::Ok().json(enrich_one(db.get_ref(), booked).await?))
}

/// PATCH /api/appointments/{id} — the owning business edits or moves the status.
pub async fn update_appointment(
    user: AuthenticatedUser,
    db: web::Data<DatabaseConnection>,
    path: web::Path<Uuid>,
    body: web::Json<UpdateAppointment>,
) -> ApiResult<HttpResponse> {
    let appointment = find(db.get_ref(), path.into_inner()).await?;
    ensure_appointment_owner(&appointment, user.id())?;

    let input = body.into_inner();
    if appointment.status.is_terminal() {
        return Err(ApiError::Conflict(format!(
            "Appointment is already {:?} and can no longer change",
            appointment.status
        )));
    }

    match input.status {
        Some(Status::Booked) if appointment.status != Status::Booked => {
            return Err(ApiError::BadRequest(
                "Appointments are booked by clients, not by patch".to_string(),
            ));
        }
        Some(next) if next != appointment.status && !appointment.status.can_transition_to(next) => {
            return Err(ApiError::Conflict(format!(
                "Cannot move appointment from {:?} to {next:?}",
                appointment.status
            )));
        }
        _ => {}
    }

    if let Some(title) = &input.title {
        require_text(title, "title")?;
    }
    validate_range(
        Some(input.start_time.unwrap_or(appointment.start_time)),
        Some(input.end_time.unwrap_or(appointment.end_time)),
        "Appointment",
    )
    .map_err(ApiError::BadRequest)?;

    let updated = appointment_db::update_appointment(db.get_ref(), appointment, input).await?;
    Ok(HttpResponse::Ok().json(enrich_one(db.get_ref(), updated).await?))
}
