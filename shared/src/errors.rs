//! Error types for input validation

use thiserror::Error;

/// Rejected paging input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid {0}")]
    Malformed(&'static str),

    #[error("limit must be at least 1")]
    NonPositiveLimit,

    #[error("lastID must not be negative")]
    NegativeCursor,
}
