use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use uuid::Uuid;

use crate::models::social_accounts::{self, ConnectAccount};
use crate::models::social_posts::{self, NewPost};

/// Store the result of a code exchange, replacing any earlier connection.
pub async fn upsert_account(
    db: &DatabaseConnection,
    input: ConnectAccount,
) -> Result<social_accounts::Model, DbErr> {
    let now = chrono::Utc::now();

    if let Some(existing) = get_account_by_user(db, input.user_id).await? {
        let mut active: social_accounts::ActiveModel = existing.into();
        active.external_user_id = Set(input.external_user_id);
        active.access_token = Set(input.access_token);
        active.token_expires_at = Set(input.token_expires_at);
        active.updated_at = Set(Some(now));
        return active.update(db).await;
    }

    let account = social_accounts::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(input.user_id),
        external_user_id: Set(input.external_user_id),
        access_token: Set(input.access_token),
        token_expires_at: Set(input.token_expires_at),
        last_synced_at: Set(None),
        created_at: Set(now),
        updated_at: Set(None),
    };

    account.insert(db).await
}

pub async fn get_account_by_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Option<social_accounts::Model>, DbErr> {
    social_accounts::Entity::find()
        .filter(social_accounts::Column::UserId.eq(user_id))
        .one(db)
        .await
}

pub async fn get_all_accounts(
    db: &DatabaseConnection,
) -> Result<Vec<social_accounts::Model>, DbErr> {
    social_accounts::Entity::find().all(db).await
}

/// Remove a user's connection and everything mirrored from it, atomically.
pub async fn delete_account(db: &DatabaseConnection, user_id: Uuid) -> Result<u64, DbErr> {
    let Some(account) = get_account_by_user(db, user_id).await? else {
        return Ok(0);
    };

    let txn = db.begin().await?;

    social_posts::Entity::delete_many()
        .filter(social_posts::Column::AccountId.eq(account.id))
        .exec(&txn)
        .await?;

    let result = social_accounts::Entity::delete_by_id(account.id)
        .exec(&txn)
        .await?;

    txn.commit().await?;
    Ok(result.rows_affected)
}

pub async fn mark_synced(
    db: &DatabaseConnection,
    account: social_accounts::Model,
) -> Result<social_accounts::Model, DbErr> {
    let mut active: social_accounts::ActiveModel = account.into();
    active.last_synced_at = Set(Some(chrono::Utc::now()));
    active.update(db).await
}

/// Insert or refresh mirrored posts, keyed by (account, external id).
pub async fn upsert_posts(
    db: &DatabaseConnection,
    account: &social_accounts::Model,
    posts: Vec<NewPost>,
) -> Result<usize, DbErr> {
    let now = chrono::Utc::now();
    let count = posts.len();

    for post in posts {
        let row = social_posts::ActiveModel {
            id: Set(Uuid::new_v4()),
            account_id: Set(account.id),
            user_id: Set(account.user_id),
            external_id: Set(post.external_id),
            caption: Set(post.caption),
            media_type: Set(post.media_type),
            media_url: Set(post.media_url),
            permalink: Set(post.permalink),
            posted_at: Set(post.posted_at),
            synced_at: Set(now),
        };

        social_posts::Entity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    social_posts::Column::AccountId,
                    social_posts::Column::ExternalId,
                ])
                .update_columns([
                    social_posts::Column::Caption,
                    social_posts::Column::MediaType,
                    social_posts::Column::MediaUrl,
                    social_posts::Column::Permalink,
                    social_posts::Column::PostedAt,
                    social_posts::Column::SyncedAt,
                ])
                .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    Ok(count)
}

/// Mirrored posts for a user, newest first.
pub async fn get_posts_by_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    limit: u64,
) -> Result<Vec<social_posts::Model>, DbErr> {
    social_posts::Entity::find()
        .filter(social_posts::Column::UserId.eq(user_id))
        .order_by_desc(social_posts::Column::PostedAt)
        .order_by_desc(social_posts::Column::SyncedAt)
        .limit(limit)
        .all(db)
        .await
}
