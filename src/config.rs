use std::env;
use std::time::Duration;

/// Process configuration, read once from the environment at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub redis_url: Option<String>,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
    pub social: SocialConfig,
    pub frontend_url: String,
    pub sync_interval: Duration,
    pub profile_cache_ttl: Duration,
}

/// How bearer tokens are verified.
#[derive(Clone, Debug)]
pub enum AuthConfig {
    /// Asymmetric keys published at the project's JWKS endpoint.
    Jwks { project_ref: String, anon_key: String },
    /// Legacy HS256 shared secret.
    Secret(String),
}

#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub api_url: Option<String>,
    pub api_key: String,
    pub api_key_header: String,
}

#[derive(Clone, Debug)]
pub struct SocialConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub authorize_url: String,
    pub token_url: String,
    pub api_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;

        let auth = match env::var("SUPABASE_JWT_SECRET").ok().filter(|s| !s.is_empty()) {
            Some(secret) => AuthConfig::Secret(secret),
            None => {
                let supabase_url = required("SUPABASE_URL")?;
                AuthConfig::Jwks {
                    project_ref: project_ref(&supabase_url)?,
                    anon_key: required("SUPABASE_ANON_KEY")?,
                }
            }
        };

        let port = match env::var("PORT") {
            Ok(v) => v.parse().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: format!("{e}"),
            })?,
            Err(_) => 8080,
        };

        let frontend_url = env::var("FRONTEND_URL")
            .unwrap_or_else(|_| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            port,
            database_url,
            redis_url: env::var("REDIS_URL").ok().filter(|s| !s.is_empty()),
            auth,
            uploads: UploadConfig {
                api_url: env::var("UPLOAD_API_URL").ok().filter(|s| !s.is_empty()),
                api_key: env::var("UPLOAD_API_KEY").unwrap_or_default(),
                api_key_header: env::var("UPLOAD_API_KEY_HEADER")
                    .unwrap_or_else(|_| "x-api-key".to_string()),
            },
            social: SocialConfig {
                client_id: env::var("SOCIAL_CLIENT_ID").unwrap_or_default(),
                client_secret: env::var("SOCIAL_CLIENT_SECRET").unwrap_or_default(),
                redirect_uri: env::var("SOCIAL_REDIRECT_URI").unwrap_or_else(|_| {
                    format!("http://localhost:{port}/api/social/callback")
                }),
                authorize_url: env::var("SOCIAL_AUTHORIZE_URL")
                    .unwrap_or_else(|_| "https://api.instagram.com/oauth/authorize".to_string()),
                token_url: env::var("SOCIAL_TOKEN_URL")
                    .unwrap_or_else(|_| "https://api.instagram.com/oauth/access_token".to_string()),
                api_url: env::var("SOCIAL_API_URL")
                    .unwrap_or_else(|_| "https://graph.instagram.com".to_string()),
            },
            frontend_url,
            sync_interval: parse_duration_secs("SYNC_INTERVAL_SECS", 3600),
            profile_cache_ttl: parse_duration_secs("CACHE_TTL_PROFILES", 900),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// `https://PROJECT.supabase.co` → `PROJECT`.
pub fn project_ref(supabase_url: &str) -> Result<String, ConfigError> {
    supabase_url
        .trim_end_matches('/')
        .strip_prefix("https://")
        .and_then(|s| s.strip_suffix(".supabase.co"))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ConfigError::Invalid {
            name: "SUPABASE_URL",
            reason: "expected https://PROJECT.supabase.co".to_string(),
        })
}

fn parse_duration_secs(env_var: &str, default: u64) -> Duration {
    env::var(env_var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| Duration::from_secs(default))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn project_ref_from_url() {
        assert_eq!(project_ref("https://abcd1234.supabase.co").unwrap(), "abcd1234");
        assert_eq!(project_ref("https://abcd1234.supabase.co/").unwrap(), "abcd1234");
        assert!(project_ref("http://abcd1234.supabase.co").is_err());
        assert!(project_ref("https://example.com").is_err());
        assert!(project_ref("https://.supabase.co").is_err());
    }

    #[test]
    fn missing_var_message() {
        assert_eq!(
            ConfigError::Missing("DATABASE_URL").to_string(),
            "DATABASE_URL must be set"
        );
    }
}
