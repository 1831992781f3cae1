//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! stores, password hashing and token signing.

pub mod auth;
pub mod merchant;
pub mod user;

pub use auth::AuthService;
pub use merchant::MerchantService;
pub use user::UserAdminService;

use crate::auth::PasswordError;
use crate::error::ServiceError;
use crate::repositories::StoreError;
use tracing::error;

/// Map a store failure that has no domain meaning for the calling operation
fn store_failure(err: StoreError, operation: &'static str) -> ServiceError {
    match err {
        StoreError::Cancelled => ServiceError::Cancelled,
        other => {
            error!(error = %other, operation, "Store operation failed");
            ServiceError::Unexpected(anyhow::Error::new(other).context(operation))
        }
    }
}

/// Map a hashing failure that is not a password mismatch
fn hashing_failure(err: PasswordError, operation: &'static str) -> ServiceError {
    match err {
        PasswordError::Cancelled => ServiceError::Cancelled,
        other => {
            error!(error = %other, operation, "Password hashing failed");
            ServiceError::Unexpected(anyhow::Error::new(other).context(operation))
        }
    }
}
