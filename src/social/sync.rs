use futures_util::stream::{self, StreamExt};
use sea_orm::{DatabaseConnection, DbErr};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{SocialClient, SocialError};
use crate::db::social as social_db;
use crate::models::social_accounts;

const CONCURRENT_ACCOUNTS: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("access token expired")]
    TokenExpired,

    #[error(transparent)]
    Social(#[from] SocialError),

    #[error(transparent)]
    Database(#[from] DbErr),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    pub synced: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Mirror one page of an account's recent media. Returns the number of
/// posts written.
pub async fn sync_account(
    db: &DatabaseConnection,
    client: &SocialClient,
    account: social_accounts::Model,
) -> Result<usize, SyncError> {
    if account.token_expired(chrono::Utc::now()) {
        return Err(SyncError::TokenExpired);
    }

    let posts = client.fetch_recent_media(&account.access_token).await?;
    let written = social_db::upsert_posts(db, &account, posts).await?;
    social_db::mark_synced(db, account).await?;

    Ok(written)
}

/// One pass over every connected account. Failures are logged per account.
pub async fn run_once(db: &DatabaseConnection, client: &SocialClient) -> Result<SyncSummary, DbErr> {
    let accounts = social_db::get_all_accounts(db).await?;

    let results: Vec<_> = stream::iter(accounts)
        .map(|account| async move {
            let user_id = account.user_id;
            (user_id, sync_account(db, client, account).await)
        })
        .buffer_unordered(CONCURRENT_ACCOUNTS)
        .collect()
        .await;

    let mut summary = SyncSummary::default();
    for (user_id, result) in results {
        match result {
            Ok(written) => {
                tracing::debug!(%user_id, written, "social account synced");
                summary.synced += 1;
            }
            Err(SyncError::TokenExpired) => {
                tracing::info!(%user_id, "skipping social account with expired token");
                summary.skipped += 1;
            }
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "social account sync failed");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

/// Run the sync on a fixed cadence. Runs happen back to back in this one
/// task, so a slow run delays the next tick instead of overlapping it.
pub fn spawn(db: DatabaseConnection, client: SocialClient, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match run_once(&db, &client).await {
                Ok(summary) => tracing::info!(
                    synced = summary.synced,
                    skipped = summary.skipped,
                    failed = summary.failed,
                    "social sync finished"
                ),
                Err(e) => tracing::error!(error = %e, "social sync could not list accounts"),
            }
        }
    })
}
