//! Authentication extractor.
//!
//! Token issuance and session management belong to the external identity
//! service; this backend only verifies the bearer token and reads the
//! caller's user id out of it.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// Claims carried by access tokens issued by the identity service.
#[derive(Debug, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Expiry, seconds since epoch
    pub exp: usize,
}

/// Shared JWT secret, exposed through `FromRef` so the extractor works with
/// any state that carries one.
#[derive(Clone)]
pub struct JwtSecret(pub String);

/// The authenticated caller, acting as a lender.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedLender {
    pub lender_id: Uuid,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedLender
where
    JwtSecret: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| {
                    ApiError::Unauthorized(
                        "Authorization header with Bearer token required".to_string(),
                    )
                })?;

        let secret = JwtSecret::from_ref(state);

        let token = decode::<Claims>(
            bearer.token(),
            &DecodingKey::from_secret(secret.0.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => {
                ApiError::Unauthorized("Token has expired".to_string())
            }
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        })?;

        let lender_id = Uuid::parse_str(&token.claims.sub)
            .map_err(|_| ApiError::Unauthorized("Invalid user id in token".to_string()))?;

        Ok(AuthenticatedLender { lender_id })
    }
}
