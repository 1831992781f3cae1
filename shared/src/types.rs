//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::ValidationError;
use crate::models::{PaginationCursor, User};
use crate::validation::{parse_query_number, validate_cursor, validate_limit, DEFAULT_PAGE_LIMIT};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "email can't be empty"))]
    pub email: String,
    #[validate(length(min = 1, message = "password can't be empty"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub token_expires_in: DateTime<Utc>,
}

/// Create-user request
///
/// The merchant is never taken from the body; it comes from the caller's token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
    // Keep in sync with validation::MIN_PASSWORD_LENGTH
    #[validate(length(min = 8, message = "password must be at least 8 characters"))]
    pub password: String,
    #[serde(rename = "firstname")]
    #[validate(length(min = 1, message = "firstname is required"))]
    pub first_name: String,
    #[serde(rename = "lastname", default)]
    pub last_name: Option<String>,
}

/// Create-user response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub user: User,
}

/// One page of a merchant's users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersPage {
    pub users: Vec<User>,
    pub page: i64,
    #[serde(rename = "totalData")]
    pub total_data: i64,
}

/// Query string of the user listing endpoint
///
/// Values are kept as raw strings so malformed numbers can be reported
/// with the same error envelope as every other validation failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<String>,
    #[serde(rename = "lastID")]
    pub last_id: Option<String>,
    pub page: Option<String>,
}

impl ListUsersQuery {
    /// Resolve the page window, applying defaults (limit 10, cursor 0)
    pub fn cursor(&self) -> Result<PaginationCursor, ValidationError> {
        let limit = parse_query_number(self.limit.as_deref(), "limit")?.unwrap_or(DEFAULT_PAGE_LIMIT);
        let cursor = parse_query_number(self.last_id.as_deref(), "lastID")?.unwrap_or(0);

        validate_limit(limit)?;
        validate_cursor(cursor)?;

        Ok(PaginationCursor { limit, cursor })
    }

    /// Page number echoed back to the client; it does not affect the query
    pub fn page(&self) -> Result<i64, ValidationError> {
        Ok(parse_query_number(self.page.as_deref(), "page")?.unwrap_or(1))
    }
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}
