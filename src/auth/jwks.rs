use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, decode_header};
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::jwt::Claims;

const JWKS_URL_TEMPLATE: &str = "https://{}.supabase.co/auth/v1/.well-known/jwks.json";

#[derive(Clone)]
struct JwksKeyData {
    x: String,
    y: String,
    algorithm: Algorithm,
}

/// EC signing keys fetched from the auth provider, cached per `kid`.
#[derive(Clone)]
pub struct JwksCache {
    cache: Arc<Cache<String, JwksKeyData>>,
    jwks_url: String,
    client: reqwest::Client,
    anon_key: String,
}

impl JwksCache {
    pub fn new(project_ref: &str, anon_key: &str) -> Self {
        Self::with_url(JWKS_URL_TEMPLATE.replace("{}", project_ref), anon_key)
    }

    pub fn with_url(jwks_url: String, anon_key: &str) -> Self {
        let cache = Arc::new(
            Cache::builder()
                .time_to_live(Duration::from_secs(3600))
                .max_capacity(10)
                .build(),
        );

        Self {
            cache,
            jwks_url,
            client: reqwest::Client::new(),
            anon_key: anon_key.to_string(),
        }
    }

    async fn fetch_jwks(&self) -> Result<serde_json::Value, String> {
        debug!(url = %self.jwks_url, "fetching JWKS");

        let response = self
            .client
            .get(&self.jwks_url)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| format!("Failed to fetch JWKS: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("Failed to fetch JWKS: HTTP {status}"));
        }

        response
            .json()
            .await
            .map_err(|e| format!("Failed to parse JWKS JSON: {e}"))
    }

    async fn get_key_data(&self, kid: &str) -> Result<JwksKeyData, String> {
        if let Some(cached) = self.cache.get(kid).await {
            return Ok(cached);
        }

        let jwks = self.fetch_jwks().await?;
        let key_data = parse_jwk(&jwks, kid)?;

        self.cache.insert(kid.to_string(), key_data.clone()).await;
        Ok(key_data)
    }

    pub async fn validate_token(&self, token: &str) -> Result<Claims, String> {
        let header = decode_header(token).map_err(|e| format!("Failed to decode header: {e}"))?;
        let kid = header.kid.ok_or("No 'kid' in token header")?;

        let key_data = self.get_key_data(&kid).await?;

        let decoding_key = DecodingKey::from_ec_components(&key_data.x, &key_data.y)
            .map_err(|e| format!("Failed to create decoding key: {e}"))?;

        let mut validation = Validation::new(key_data.algorithm);
        validation.validate_aud = false;

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| format!("Token validation failed: {e}"))
    }
}

fn parse_jwk(jwks: &serde_json::Value, kid: &str) -> Result<JwksKeyData, String> {
    let keys = jwks["keys"].as_array().ok_or("No keys in JWKS")?;

    let key = keys
        .iter()
        .find(|k| k["kid"].as_str() == Some(kid))
        .ok_or(format!("Key with kid={kid} not found in JWKS"))?;

    let x = key["x"].as_str().ok_or("Missing 'x' in JWK")?.to_string();
    let y = key["y"].as_str().ok_or("Missing 'y' in JWK")?.to_string();

    let algorithm = match key["alg"].as_str() {
        Some("ES384") => Algorithm::ES384,
        _ => Algorithm::ES256,
    };

    Ok(JwksKeyData { x, y, algorithm })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_key_by_kid() {
        let jwks = serde_json::json!({
            "keys": [
                { "kid": "a", "x": "xa", "y": "ya", "alg": "ES256" },
                { "kid": "b", "x": "xb", "y": "yb", "alg": "ES384" },
            ]
        });

        let key = parse_jwk(&jwks, "b").unwrap();
        assert_eq!(key.x, "xb");
        assert_eq!(key.y, "yb");
        assert_eq!(key.algorithm, Algorithm::ES384);

        assert!(parse_jwk(&jwks, "missing").is_err());
        assert!(parse_jwk(&serde_json::json!({}), "a").is_err());
    }

    #[test]
    fn builds_url_from_project_ref() {
        let cache = JwksCache::new("abcd", "anon");
        assert_eq!(
            cache.jwks_url,
            "https://abcd.supabase.co/auth/v1/.well-known/jwks.json"
        );
    }
}
