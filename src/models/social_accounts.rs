use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `social_accounts` table: one connected
/// third-party account per user.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "social_accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub external_user_id: String,
    #[sea_orm(column_type = "Text")]
    #[serde(skip_serializing)]
    pub access_token: String,
    pub token_expires_at: Option<DateTimeUtc>,
    pub last_synced_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::social_posts::Entity")]
    Posts,
}

impl Related<super::social_posts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Posts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn token_expired(&self, now: DateTimeUtc) -> bool {
        self.token_expires_at.is_some_and(|at| at <= now)
    }
}

/// Upsert input produced by a successful OAuth code exchange.
#[derive(Debug, Clone)]
pub struct ConnectAccount {
    pub user_id: Uuid,
    pub external_user_id: String,
    pub access_token: String,
    pub token_expires_at: Option<DateTimeUtc>,
}

/// Connection status as shown to the account owner. Never carries the token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatus {
    pub connected: bool,
    pub external_user_id: Option<String>,
    pub token_expires_at: Option<DateTimeUtc>,
    pub last_synced_at: Option<DateTimeUtc>,
}

impl From<Option<Model>> for AccountStatus {
    fn from(account: Option<Model>) -> Self {
        match account {
            Some(a) => Self {
                connected: true,
                external_user_id: Some(a.external_user_id),
                token_expires_at: a.token_expires_at,
                last_synced_at: a.last_synced_at,
            },
            None => Self {
                connected: false,
                external_user_id: None,
                token_expires_at: None,
                last_synced_at: None,
            },
        }
    }
}
