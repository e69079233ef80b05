use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::users::UserResponse;

/// SeaORM entity for the `testimonials` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "testimonials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub client_id: Uuid,
    pub business_id: Uuid,
    pub project_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub rating: Option<i16>,
    pub is_highlighted: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::ClientId",
        to = "super::users::Column::Id"
    )]
    Client,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::BusinessId",
        to = "super::users::Column::Id"
    )]
    Business,
    #[sea_orm(
        belongs_to = "super::projects::Entity",
        from = "Column::ProjectId",
        to = "super::projects::Column::Id"
    )]
    Project,
}

impl Related<super::projects::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_rating(rating: Option<i16>) -> Result<(), String> {
    match rating {
        Some(r) if !(1..=5).contains(&r) => Err(format!("Rating must be between 1 and 5, got {r}")),
        _ => Ok(()),
    }
}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTestimonial {
    pub business_id: Uuid,
    pub project_id: Option<Uuid>,
    pub content: String,
    pub rating: Option<i16>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTestimonial {
    pub content: Option<String>,
    pub rating: Option<i16>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestimonialListQuery {
    pub highlighted: Option<bool>,
}

/// A testimonial joined with its author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestimonialResponse {
    #[serde(flatten)]
    pub testimonial: Model,
    pub client: Option<UserResponse>,
}
