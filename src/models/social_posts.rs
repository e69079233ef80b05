use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// SeaORM entity for the `social_posts` table, filled by the sync job.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "social_posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub external_id: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub caption: Option<String>,
    pub media_type: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub media_url: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub permalink: Option<String>,
    pub posted_at: Option<DateTimeUtc>,
    pub synced_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::social_accounts::Entity",
        from = "Column::AccountId",
        to = "super::social_accounts::Column::Id"
    )]
    Account,
}

impl Related<super::social_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Account.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// A post as fetched from the platform, before it is mirrored.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub external_id: String,
    pub caption: Option<String>,
    pub media_type: String,
    pub media_url: Option<String>,
    pub permalink: Option<String>,
    pub posted_at: Option<DateTimeUtc>,
}
