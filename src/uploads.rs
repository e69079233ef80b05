//! Pass-through to the third-party file upload API. The API key stays on
//! the server; browsers only ever talk to us.

use actix_web::web::Bytes;
use reqwest::Method;
use std::time::Duration;

use crate::config::UploadConfig;
use crate::errors::{ApiError, ApiResult};

/// What came back from upstream, relayed verbatim.
#[derive(Debug)]
pub struct Forwarded {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Bytes,
}

#[derive(Clone)]
pub struct UploadProxy {
    http: reqwest::Client,
    config: UploadConfig,
}

impl UploadProxy {
    pub fn new(config: UploadConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self { http, config }
    }

    fn target(&self, query: &str) -> ApiResult<String> {
        let base = self
            .config
            .api_url
            .as_deref()
            .ok_or_else(|| ApiError::Unavailable("Uploads are not configured".to_string()))?;

        Ok(if query.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{query}")
        })
    }

    pub async fn forward(
        &self,
        method: Method,
        query: &str,
        content_type: Option<&str>,
        body: Option<Bytes>,
    ) -> ApiResult<Forwarded> {
        let url = self.target(query)?;

        let mut request = self.http.request(method.clone(), &url);
        if !self.config.api_key.is_empty() {
            request = request.header(self.config.api_key_header.as_str(), &self.config.api_key);
        }
        if let Some(content_type) = content_type {
            request = request.header(reqwest::header::CONTENT_TYPE, content_type);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, %method, "upload API unreachable");
            ApiError::Upstream(format!("Upload API unreachable: {e}"))
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        tracing::debug!(%method, status, "upload API responded");
        Ok(Forwarded {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxy(url: Option<&str>) -> UploadProxy {
        UploadProxy::new(UploadConfig {
            api_url: url.map(str::to_string),
            api_key: "key".to_string(),
            api_key_header: "x-api-key".to_string(),
        })
    }

    #[test]
    fn target_appends_query() {
        let p = proxy(Some("https://uploads.example.com/v1/files"));
        assert_eq!(
            p.target("").unwrap(),
            "https://uploads.example.com/v1/files"
        );
        assert_eq!(
            p.target("slug=avatar").unwrap(),
            "https://uploads.example.com/v1/files?slug=avatar"
        );
    }

    #[test]
    fn unconfigured_proxy_is_unavailable() {
        assert!(matches!(
            proxy(None).target(""),
            Err(ApiError::Unavailable(_))
        ));
    }
}
