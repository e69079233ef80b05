//! Third-party social platform integration: OAuth code exchange and the
//! media feed the sync job mirrors.

pub mod sync;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use reqwest::Url;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::config::SocialConfig;
use crate::models::social_posts::NewPost;

const MEDIA_FIELDS: &str = "id,caption,media_type,media_url,permalink,timestamp";
const MEDIA_PAGE_SIZE: &str = "50";

#[derive(Debug, thiserror::Error)]
pub enum SocialError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("platform returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid URL: {0}")]
    Url(String),

    #[error("not configured: {0}")]
    NotConfigured(&'static str),
}

/// Token endpoint response. The platform returns `user_id` as a number.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub user_id: serde_json::Value,
    pub expires_in: Option<i64>,
}

impl TokenGrant {
    pub fn external_user_id(&self) -> String {
        match &self.user_id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    /// `None` when the platform sent no lifetime or one that overflows a
    /// timestamp.
    pub fn expires_at(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let lifetime = chrono::Duration::try_seconds(self.expires_in?)?;
        now.checked_add_signed(lifetime)
    }
}

#[derive(Debug, Deserialize)]
struct MediaPage {
    #[serde(default)]
    data: Vec<MediaItem>,
}

#[derive(Debug, Deserialize)]
struct MediaItem {
    id: String,
    caption: Option<String>,
    media_type: Option<String>,
    media_url: Option<String>,
    permalink: Option<String>,
    timestamp: Option<String>,
}

impl From<MediaItem> for NewPost {
    fn from(item: MediaItem) -> Self {
        NewPost {
            posted_at: item.timestamp.as_deref().and_then(parse_timestamp),
            external_id: item.id,
            caption: item.caption,
            media_type: item.media_type.unwrap_or_else(|| "IMAGE".to_string()),
            media_url: item.media_url,
            permalink: item.permalink,
        }
    }
}

/// The platform emits `2024-05-01T10:00:00+0000`; accept RFC 3339 as well.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

#[derive(Clone)]
pub struct SocialClient {
    http: reqwest::Client,
    config: SocialConfig,
}

impl SocialClient {
    pub fn new(config: SocialConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.client_id.is_empty() && !self.config.client_secret.is_empty()
    }

    /// Where to send the browser to start the OAuth dance.
    pub fn authorize_url(&self, state: &str) -> Result<String, SocialError> {
        if !self.is_configured() {
            return Err(SocialError::NotConfigured("SOCIAL_CLIENT_ID"));
        }

        let url = Url::parse_with_params(
            &self.config.authorize_url,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("scope", "user_profile,user_media"),
                ("response_type", "code"),
                ("state", state),
            ],
        )
        .map_err(|e| SocialError::Url(e.to_string()))?;

        Ok(url.into())
    }

    /// Trade an authorization code for an access token.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant, SocialError> {
        if !self.is_configured() {
            return Err(SocialError::NotConfigured("SOCIAL_CLIENT_ID"));
        }

        let response = self
            .http
            .post(&self.config.token_url)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("code", code),
            ])
            .send()
            .await?;

        let response = error_for_status(response).await?;
        Ok(response.json().await?)
    }

    /// First page of the account's recent media.
    pub async fn fetch_recent_media(&self, access_token: &str) -> Result<Vec<NewPost>, SocialError> {
        let url = format!("{}/me/media", self.config.api_url.trim_end_matches('/'));

        let response = self
            .http
            .get(&url)
            .query(&[
                ("fields", MEDIA_FIELDS),
                ("limit", MEDIA_PAGE_SIZE),
                ("access_token", access_token),
            ])
            .send()
            .await?;

        let page: MediaPage = error_for_status(response).await?.json().await?;
        Ok(page.data.into_iter().map(NewPost::from).collect())
    }
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, SocialError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(SocialError::Status {
        status: status.as_u16(),
        body,
    })
}

/// One-time OAuth `state` values bound to the user who started the flow.
#[derive(Clone)]
pub struct OAuthStates {
    pending: Arc<Cache<String, Uuid>>,
}

impl OAuthStates {
    pub fn new(ttl: Duration) -> Self {
        let pending = Cache::builder()
            .time_to_live(ttl)
            .max_capacity(10_000)
            .build();
        Self {
            pending: Arc::new(pending),
        }
    }

    pub async fn issue(&self, user_id: Uuid) -> String {
        let state = Uuid::new_v4().simple().to_string();
        self.pending.insert(state.clone(), user_id).await;
        state
    }

    /// Consume a state. A second call with the same value returns `None`.
    pub async fn take(&self, state: &str) -> Option<Uuid> {
        self.pending.remove(state).await
    }
}

impl Default for OAuthStates {
    fn default() -> Self {
        Self::new(Duration::from_secs(600))
    }
}
