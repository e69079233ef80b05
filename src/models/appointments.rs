use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::profiles::ProfileResponse;
use super::users::UserResponse;

/// Appointment status stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "booked")]
    Booked,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl Status {
    /// `available → booked → completed | cancelled`; an open slot can be
    /// withdrawn directly. Terminal states never move.
    pub fn can_transition_to(self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Available, Status::Booked)
                | (Status::Available, Status::Cancelled)
                | (Status::Booked, Status::Completed)
                | (Status::Booked, Status::Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Cancelled)
    }
}

/// SeaORM entity for the `appointments` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appointments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub business_id: Uuid,
    pub client_id: Option<Uuid>,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub status: Status,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BusinessId",
        to = "super::users::Column::Id"
    )]
    Business,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ClientId",
        to = "super::users::Column::Id"
    )]
    Client,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Whether `user_id` may see this slot: the owner, the booked client,
    /// or anyone while it is still open.
    pub fn is_visible_to(&self, user_id: Uuid) -> bool {
        self.business_id == user_id
            || self.client_id == Some(user_id)
            || self.status == Status::Available
    }
}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointment {
    pub title: String,
    pub notes: Option<String>,
    pub start_time: DateTimeUtc,
    pub end_time: DateTimeUtc,
}

/// Partial update by the owning business. `client_id` is only ever set by booking.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAppointment {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub start_time: Option<DateTimeUtc>,
    pub end_time: Option<DateTimeUtc>,
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentListQuery {
    pub status: Option<Status>,
}

/// An appointment joined with its business profile and (if booked) client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentResponse {
    #[serde(flatten)]
    pub appointment: Model,
    pub business: Option<ProfileResponse>,
    pub client: Option<UserResponse>,
}
