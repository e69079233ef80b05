use redis::{Client, RedisError, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use uuid::Uuid;

use crate::models::profiles::ProfileResponse;

#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Get a JSON value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> redis::RedisResult<Option<T>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await?;

        match value {
            Some(v) => {
                let deserialized = serde_json::from_str(&v).map_err(|e| {
                    RedisError::from((
                        redis::ErrorKind::TypeError,
                        "Deserialization error",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// Set a JSON value with a TTL in seconds
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: u64,
    ) -> redis::RedisResult<()> {
        let serialized = serde_json::to_string(value).map_err(|e| {
            RedisError::from((
                redis::ErrorKind::TypeError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        redis::cmd("SET")
            .arg(key)
            .arg(serialized)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async(&mut self.connection.clone())
            .await
    }

    pub async fn delete(&self, key: &str) -> redis::RedisResult<()> {
        redis::cmd("DEL")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await
    }
}

/// Cache key generators
pub mod keys {
    use uuid::Uuid;

    /// Enriched profile, keyed by the owning user
    pub fn profile(user_id: Uuid) -> String {
        format!("profile:{user_id}")
    }
}

/// Read-through cache for enriched business profiles.
///
/// Redis is optional: without `REDIS_URL` every lookup is a miss. Redis
/// failures are logged and treated as misses so a cache outage never fails
/// a request.
#[derive(Clone)]
pub struct ProfileCache {
    redis: Option<RedisCache>,
    ttl: Duration,
}

impl ProfileCache {
    pub fn disabled() -> Self {
        Self {
            redis: None,
            ttl: Duration::ZERO,
        }
    }

    pub async fn connect(redis_url: Option<&str>, ttl: Duration) -> Result<Self, RedisError> {
        let redis = match redis_url {
            Some(url) => Some(RedisCache::new(url).await?),
            None => None,
        };
        Ok(Self { redis, ttl })
    }

    pub fn is_enabled(&self) -> bool {
        self.redis.is_some()
    }

    pub async fn get(&self, user_id: Uuid) -> Option<ProfileResponse> {
        let redis = self.redis.as_ref()?;
        match redis.get(&keys::profile(user_id)).await {
            Ok(hit) => hit,
            Err(e) => {
                tracing::warn!(error = %e, %user_id, "profile cache read failed");
                None
            }
        }
    }

    pub async fn put(&self, profile: &ProfileResponse) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        let key = keys::profile(profile.profile.user_id);
        if let Err(e) = redis.set(&key, profile, self.ttl.as_secs()).await {
            tracing::warn!(error = %e, "profile cache write failed");
        }
    }

    pub async fn invalidate(&self, user_id: Uuid) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        if let Err(e) = redis.delete(&keys::profile(user_id)).await {
            tracing::warn!(error = %e, %user_id, "profile cache invalidation failed");
        }
    }
}
