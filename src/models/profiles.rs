use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::users::UserResponse;

/// Discriminates what a user is on the platform. Stored as a lowercase string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    #[sea_orm(string_value = "client")]
    Client,
    #[sea_orm(string_value = "business")]
    Business,
}

/// SeaORM entity for the `profiles` table.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profiles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub user_type: UserType,
    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub avatar_url: Option<String>,
    pub business_name: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub services: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_business(&self) -> bool {
        self.user_type == UserType::Business
    }

    pub fn is_client(&self) -> bool {
        self.user_type == UserType::Client
    }
}

// ── DTOs ──

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfile {
    pub user_type: UserType,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub services: Option<String>,
}

impl CreateProfile {
    /// Business profiles need a name; client profiles carry no business fields.
    pub fn validate(&self) -> Result<(), String> {
        match self.user_type {
            UserType::Business => {
                if self
                    .business_name
                    .as_deref()
                    .is_none_or(|name| name.trim().is_empty())
                {
                    return Err("Business profiles require a business_name".to_string());
                }
            }
            UserType::Client => {
                if self.has_business_fields() {
                    return Err("Client profiles cannot carry business fields".to_string());
                }
            }
        }
        Ok(())
    }

    fn has_business_fields(&self) -> bool {
        self.business_name.is_some()
            || self.description.is_some()
            || self.location.is_some()
            || self.website.is_some()
            || self.phone.is_some()
            || self.services.is_some()
    }
}

/// Partial update. `user_id` and `user_type` are deliberately absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub business_name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub services: Option<String>,
}

impl UpdateProfile {
    pub fn validate_for(&self, user_type: UserType) -> Result<(), String> {
        let touches_business = self.business_name.is_some()
            || self.description.is_some()
            || self.location.is_some()
            || self.website.is_some()
            || self.phone.is_some()
            || self.services.is_some();

        if user_type == UserType::Client && touches_business {
            return Err("Client profiles cannot carry business fields".to_string());
        }
        if matches!(self.business_name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err("business_name cannot be empty".to_string());
        }
        Ok(())
    }
}

/// A profile joined with the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub profile: Model,
    pub user: UserResponse,
}
