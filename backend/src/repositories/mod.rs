//! Data access layer
//!
//! Stores are traits so the services can run against PostgreSQL in
//! production and against the in-memory implementations in tests. Every
//! operation takes the caller's cancellation token.

pub mod memory;
pub mod merchant;
pub mod user;

use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

pub use memory::{InMemoryMerchantStore, InMemoryUserStore};
pub use merchant::{MerchantStore, PgMerchantStore};
pub use user::{PgUserStore, UserStore};

/// Store failures
#[derive(Error, Debug)]
pub enum StoreError {
    /// No matching non-deleted row
    #[error("record not found")]
    NotFound,

    /// A uniqueness constraint rejected the write
    #[error("conflicting record: {0}")]
    Conflict(String),

    #[error("store operation cancelled")]
    Cancelled,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Classify a driver error raised by a write
    pub(crate) fn from_write(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(db.constraint().unwrap_or("unique").to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Drive `operation` to completion unless `cancel` fires first
///
/// On cancellation the operation future is dropped; an open transaction
/// inside it rolls back when its connection is returned to the pool.
pub async fn run_cancellable<T, F>(cancel: &CancellationToken, operation: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(StoreError::Cancelled),
        result = operation => result,
    }
}
