use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::profiles::ProfileResponse;

/// Project status stored as a lowercase string in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[sea_orm(string_value = "planned")]
    Planned,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl Status {
    /// `planned → in_progress → completed | cancelled`; planned work can be
    /// dropped before it starts.
    pub fn can_transition_to(self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Planned, Status::InProgress)
                | (Status::Planned, Status::Cancelled)
                | (Status::InProgress, Status::Completed)
                | (Status::InProgress, Status::Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Cancelled)
    }
}

/// SeaORM entity for the `projects` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub business_id: Uuid,
    pub client_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub status: Status,
    pub estimated_start: Option<DateTimeUtc>,
    pub estimated_end: Option<DateTimeUtc>,
    pub actual_start: Option<DateTimeUtc>,
    pub actual_end: Option<DateTimeUtc>,
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
    #[sea_orm(has_many = "super::testimonials::Entity")]
    Testimonials,
}

impl Related<super::testimonials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Testimonials.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.business_id == user_id || self.client_id == user_id
    }
}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProject {
    pub client_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub estimated_start: Option<DateTimeUtc>,
    pub estimated_end: Option<DateTimeUtc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProject {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<Status>,
    pub estimated_start: Option<DateTimeUtc>,
    pub estimated_end: Option<DateTimeUtc>,
    pub actual_start: Option<DateTimeUtc>,
    pub actual_end: Option<DateTimeUtc>,
}

impl UpdateProject {
    /// Stamp `actual_start` when work starts and `actual_end` when it
    /// completes, unless the patch or the stored row already has them.
    pub fn with_lifecycle_stamps(mut self, current: &Model, now: DateTimeUtc) -> Self {
        match self.status {
            Some(Status::InProgress) if current.status != Status::InProgress => {
                if self.actual_start.is_none() && current.actual_start.is_none() {
                    self.actual_start = Some(now);
                }
            }
            Some(Status::Completed) if current.status != Status::Completed => {
                if self.actual_end.is_none() && current.actual_end.is_none() {
                    self.actual_end = Some(now);
                }
            }
            _ => {}
        }
        self
    }
}

/// A project joined with both parties' profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectResponse {
    #[serde(flatten)]
    pub project: Model,
    pub business: Option<ProfileResponse>,
    pub client: Option<ProfileResponse>,
}
