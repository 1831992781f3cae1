//! Input validation functions
//!
//! Request bodies are checked with `validator` derive rules (see `types`);
//! the helpers here cover query-string paging parameters.

use crate::errors::ValidationError;

/// Minimum accepted password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Page size used when the caller does not ask for one
pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// Largest page served over HTTP; larger requests are clamped to it
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Parse an optional numeric query parameter
///
/// Absent and empty values are `None`; anything else must be an integer.
pub fn parse_query_number(
    raw: Option<&str>,
    field: &'static str,
) -> Result<Option<i64>, ValidationError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ValidationError::Malformed(field)),
    }
}

/// Validate a page size
pub fn validate_limit(limit: i64) -> Result<(), ValidationError> {
    if limit < 1 {
        return Err(ValidationError::NonPositiveLimit);
    }
    Ok(())
}

/// Validate a cursor (last seen id)
pub fn validate_cursor(cursor: i64) -> Result<(), ValidationError> {
    if cursor < 0 {
        return Err(ValidationError::NegativeCursor);
    }
    Ok(())
}
