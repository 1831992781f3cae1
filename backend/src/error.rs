//! Application error handling
//!
//! Services report failures as [`ServiceError`]; the HTTP layer converts them
//! into responses. Domain failures carry a safe message, infrastructure
//! failures are logged in full and surfaced as an opaque internal error.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use pos_shared::types::{ErrorDetail, ErrorResponse};
use thiserror::Error;
use tracing::error;

/// Service-level error taxonomy
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Deliberately identical for unknown email and wrong password
    #[error("invalid email or/and password")]
    InvalidCredentials,

    #[error("email is already registered")]
    EmailNotUnique,

    #[error("user not found")]
    UserNotFound,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("request cancelled")]
    Cancelled,

    #[error("Internal server error")]
    Unexpected(#[from] anyhow::Error),
}

impl ServiceError {
    /// Stable machine-readable code for the response body
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::InvalidParameters(_) => "INVALID_PARAMETERS",
            ServiceError::InvalidCredentials => "INVALID_CREDENTIALS",
            ServiceError::EmailNotUnique => "EMAIL_NOT_UNIQUE",
            ServiceError::UserNotFound => "USER_NOT_FOUND",
            ServiceError::Unauthorized(_) => "UNAUTHORIZED",
            ServiceError::Cancelled => "REQUEST_CANCELLED",
            ServiceError::Unexpected(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::InvalidParameters(_) => StatusCode::BAD_REQUEST,
            ServiceError::InvalidCredentials | ServiceError::Unauthorized(_) => {
                StatusCode::UNAUTHORIZED
            }
            ServiceError::EmailNotUnique => StatusCode::CONFLICT,
            ServiceError::UserNotFound => StatusCode::NOT_FOUND,
            ServiceError::Cancelled => StatusCode::REQUEST_TIMEOUT,
            ServiceError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<pos_shared::ValidationError> for ServiceError {
    fn from(err: pos_shared::ValidationError) -> Self {
        ServiceError::InvalidParameters(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();
        messages.sort();
        ServiceError::InvalidParameters(messages.join(", "))
    }
}

impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        ServiceError::InvalidParameters(rejection.body_text())
    }
}

impl From<PathRejection> for ServiceError {
    fn from(rejection: PathRejection) -> Self {
        ServiceError::InvalidParameters(rejection.body_text())
    }
}

impl From<QueryRejection> for ServiceError {
    fn from(rejection: QueryRejection) -> Self {
        ServiceError::InvalidParameters(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ServiceError::Unexpected(err) => {
                error!("Internal error: {:?}", err);
                "An internal error occurred".to_string()
            }
            ServiceError::Unauthorized(_) => "unauthorized".to_string(),
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: ErrorDetail {
                code: self.code().to_string(),
                message,
                field: None,
            },
        });

        (status, body).into_response()
    }
}

/// Result type alias for services and handlers
pub type ServiceResult<T> = Result<T, ServiceError>;
