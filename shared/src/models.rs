//! Data models for the POS user-management domain

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::DEFAULT_PAGE_LIMIT;

/// User account, scoped to exactly one merchant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "merchantID")]
    pub merchant_id: i64,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    #[serde(rename = "firstname")]
    pub first_name: String,
    #[serde(rename = "lastname")]
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; a deleted user is invisible to every read path
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for creating a user; the password is already hashed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub merchant_id: i64,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: Option<String>,
}

/// Merchant (tenant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: i64,
    pub name: String,
    pub logo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Input for creating a merchant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMerchant {
    pub name: String,
    pub logo: Option<String>,
}

/// Cursor-based page window: at most `limit` rows with `id > cursor`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationCursor {
    pub limit: i64,
    /// Exclusive lower bound on id; 0 starts from the beginning
    pub cursor: i64,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            cursor: 0,
        }
    }
}
