use actix_web::http::header::Header;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use actix_web_httpauth::headers::authorization::{Authorization, Bearer};
use sea_orm::DatabaseConnection;
use std::future::Future;
use std::pin::Pin;

use crate::auth::jwt::TokenVerifier;
use crate::db::users::find_or_create_from_auth;
use crate::errors::ApiError;
use crate::models::users::{self, CreateUserFromAuth};

/// The caller, resolved from `Authorization: Bearer <jwt>`.
///
/// The user row is created on first sight of a token subject.
pub struct AuthenticatedUser(pub users::Model);

impl AuthenticatedUser {
    pub fn id(&self) -> uuid::Uuid {
        self.0.id
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let auth = Authorization::<Bearer>::parse(&req).map_err(|_| {
                ApiError::Unauthorized("Authorization header must be: Bearer <token>".to_string())
            })?;
            let token = auth.into_scheme().token().to_string();

            let verifier = req.app_data::<web::Data<TokenVerifier>>().ok_or_else(|| {
                ApiError::Unavailable("Token verifier not configured".to_string())
            })?;

            let claims = verifier.verify(&token).await.map_err(|e| {
                tracing::debug!(error = %e, "rejected bearer token");
                ApiError::Unauthorized(format!("Invalid token: {e}"))
            })?;

            let user_id = claims
                .user_id()
                .map_err(ApiError::Unauthorized)?;

            let email = claims
                .user_email()
                .ok_or_else(|| ApiError::Unauthorized("No email in token claims".to_string()))?;

            let db = req
                .app_data::<web::Data<DatabaseConnection>>()
                .ok_or_else(|| ApiError::Unavailable("Database not configured".to_string()))?;

            let user = find_or_create_from_auth(
                db.get_ref(),
                CreateUserFromAuth {
                    id: user_id,
                    email,
                    display_name: claims.display_name(),
                    avatar_url: claims.avatar_url(),
                    auth_provider: claims.auth_provider(),
                },
            )
            .await?;

            Ok(AuthenticatedUser(user))
        })
    }
}
