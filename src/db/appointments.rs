use sea_orm::prelude::Expr;
use sea_orm::*;
use uuid::Uuid;

use crate::models::appointments::{self, CreateAppointment, Status, UpdateAppointment};

/// Insert a new open slot for `business_id`.
pub async fn insert_appointment(
    db: &DatabaseConnection,
    business_id: Uuid,
    input: CreateAppointment,
) -> Result<appointments::Model, DbErr> {
    let new_appointment = appointments::ActiveModel {
        id: Set(Uuid::new_v4()),
        business_id: Set(business_id),
        client_id: Set(None),
        title: Set(input.title),
        notes: Set(input.notes),
        status: Set(Status::Available),
        start_time: Set(input.start_time),
        end_time: Set(input.end_time),
        created_at: Set(chrono::Utc::now()),
        updated_at: Set(None),
    };

    new_appointment.insert(db).await
}

pub async fn get_appointment_by_id(
    db: &DatabaseConnection,
    id: Uuid,
) -> Result<Option<appointments::Model>, DbErr> {
    appointments::Entity::find_by_id(id).one(db).await
}

/// A business's appointments ordered by start time, optionally by status.
pub async fn get_appointments_by_business(
    db: &DatabaseConnection,
    business_id: Uuid,
    status: Option<Status>,
) -> Result<Vec<appointments::Model>, DbErr> {
    let mut query = appointments::Entity::find()
        .filter(appointments::Column::BusinessId.eq(business_id));

    if let Some(status) = status {
        query = query.filter(appointments::Column::Status.eq(status));
    }

    query
        .order_by_asc(appointments::Column::StartTime)
        .all(db)
        .await
}

/// Appointments a client has booked.
pub async fn get_appointments_by_client(
    db: &DatabaseConnection,
    client_id: Uuid,
) -> Result<Vec<appointments::Model>, DbErr> {
    appointments::Entity::find()
        .filter(appointments::Column::ClientId.eq(client_id))
        .order_by_asc(appointments::Column::StartTime)
        .all(db)
        .await
}

/// Claim an open slot. The status guard lives in the UPDATE itself, so two
/// clients racing for the same slot cannot both win.
///
/// Returns `None` when the slot was no longer available.
pub async fn book_appointment(
    db: &DatabaseConnection,
    id: Uuid,
    client_id: Uuid,
) -> Result<Option<appointments::Model>, DbErr> {
    let result = appointments::Entity::update_many()
        .col_expr(appointments::Column::Status, Expr::value(Status::Booked))
        .col_expr(appointments::Column::ClientId, Expr::value(Some(client_id)))
        .col_expr(
            appointments::Column::UpdatedAt,
            Expr::value(Some(chrono::Utc::now())),
        )
        .filter(appointments::Column::Id.eq(id))
        .filter(appointments::Column::Status.eq(Status::Available))
        .filter(appointments::Column::ClientId.is_null())
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Ok(None);
    }

    get_appointment_by_id(db, id).await
}

/// Apply a partial update. Status checks are the handler's job.
pub async fn update_appointment(
    db: &DatabaseConnection,
    appointment: appointments::Model,
    input: UpdateAppointment,
) -> Result<appointments::Model, DbErr> {
    let mut active: appointments::ActiveModel = appointment.into();

    if let Some(title) = input.title {
        active.title = Set(title);
    }
    if let Some(notes) = input.notes {
        active.notes = Set(Some(notes));
    }
    if let Some(start_time) = input.start_time {
        active.start_time = Set(start_time);
    }
    if let Some(end_time) = input.end_time {
        active.end_time = Set(end_time);
    }
    if let Some(status) = input.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Some(chrono::Utc::now()));

    active.update(db).await
}
