//! Request authorization
//!
//! Protected handlers take an [`AuthUser`] argument. Extraction reads the
//! `Authorization: Bearer <token>` header, verifies the token with the shared
//! [`JwtService`] and exposes the caller's identity to the handler.

use crate::auth::jwt::{JwtService, TokenError};
use crate::error::ServiceError;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

const BEARER_PREFIX: &str = "Bearer ";

/// Authenticated caller extracted from a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
    pub merchant_id: i64,
    pub email: String,
}

/// Resolve the caller from a raw `Authorization` header value
///
/// Missing, non-Bearer, or unverifiable credentials are `Unauthorized`.
/// A token that verifies but carries claims of the wrong shape means the
/// signing secret produced something this service never issues, so it is
/// reported as an internal failure instead.
pub fn authorize(jwt: &JwtService, header: Option<&str>) -> Result<AuthUser, ServiceError> {
    let header =
        header.ok_or_else(|| ServiceError::Unauthorized("missing authorization header".into()))?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| ServiceError::Unauthorized("invalid authorization scheme".into()))?;

    match jwt.verify(token) {
        Ok(claims) => Ok(AuthUser {
            user_id: claims.user_id,
            merchant_id: claims.merchant_id,
            email: claims.email,
        }),
        Err(TokenError::MalformedClaims(e)) => Err(ServiceError::Unexpected(
            anyhow::Error::new(e).context("verified token carries malformed claims"),
        )),
        Err(e) => {
            warn!(error = %e, "Rejected bearer token");
            Err(ServiceError::Unauthorized(e.to_string()))
        }
    }
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ServiceError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A header that is not valid visible ASCII is treated as absent
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        authorize(app_state.jwt(), header)
    }
}
