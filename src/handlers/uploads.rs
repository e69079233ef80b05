use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{HttpRequest, HttpResponse, web};
use reqwest::Method;

use super::preflight;
use crate::auth::middleware::AuthenticatedUser;
use crate::errors::ApiResult;
use crate::uploads::{Forwarded, UploadProxy};

fn relay(forwarded: Forwarded) -> HttpResponse {
    let status = StatusCode::from_u16(forwarded.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut builder = HttpResponse::build(status);
    builder.insert_header(("Access-Control-Allow-Origin", "*"));
    if let Some(content_type) = forwarded.content_type {
        builder.insert_header((CONTENT_TYPE, content_type));
    }
    builder.body(forwarded.body)
}

fn content_type(req: &HttpRequest) -> Option<&str> {
    req.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok())
}

/// POST /api/uploads — forward the body to the upload API.
pub async fn proxy_post(
    user: AuthenticatedUser,
    proxy: web::Data<UploadProxy>,
    req: HttpRequest,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    tracing::info!(user_id = %user.id(), bytes = body.len(), "proxying upload");
    let forwarded = proxy
        .forward(
            Method::POST,
            req.query_string(),
            content_type(&req),
            Some(body),
        )
        .await?;
    Ok(relay(forwarded))
}

/// GET /api/uploads — forward the query string to the upload API.
pub async fn proxy_get(
    _user: AuthenticatedUser,
    proxy: web::Data<UploadProxy>,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    let forwarded = proxy
        .forward(Method::GET, req.query_string(), None, None)
        .await?;
    Ok(relay(forwarded))
}

/// OPTIONS /api/uploads
pub async fn options() -> HttpResponse {
    preflight("GET, POST, OPTIONS")
}
