//! Password hashing using argon2
//!
//! New hashes are Argon2id PHC strings. Rows written by the legacy service
//! carry bcrypt hashes; `verify` still accepts those.
//!
//! # Performance Considerations
//!
//! Both algorithms are intentionally CPU-intensive. The `*_async` variants
//! run on the blocking thread pool and refuse to start once the caller's
//! cancellation token has fired.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use once_cell::sync::Lazy;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Argon2 hash verified against when a login names an unknown email, so
/// that it costs the same as a wrong password
static DECOY_HASH: Lazy<String> = Lazy::new(|| {
    PasswordService::hash("decoy-password-never-issued").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to compute decoy password hash");
        String::new()
    })
});

/// Password hashing failures
///
/// `Mismatch` is an authentication failure; `Hashing` means the stored hash
/// or the hashing machinery is broken and must be treated as a server fault.
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("password does not match")]
    Mismatch,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("password operation cancelled")]
    Cancelled,
}

/// Password hashing service
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using argon2 (blocking operation)
    pub fn hash(password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hashing(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Hash a password on the blocking thread pool
    pub async fn hash_async(
        cancel: &CancellationToken,
        password: String,
    ) -> Result<String, PasswordError> {
        run_blocking(cancel, move || Self::hash(&password)).await
    }

    /// Verify a password against a stored hash (blocking operation)
    pub fn verify(hash: &str, password: &str) -> Result<(), PasswordError> {
        if is_bcrypt_hash(hash) {
            return match bcrypt::verify(password, hash) {
                Ok(true) => Ok(()),
                Ok(false) => Err(PasswordError::Mismatch),
                Err(e) => Err(PasswordError::Hashing(format!("Invalid bcrypt hash: {}", e))),
            };
        }

        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| PasswordError::Hashing(format!("Invalid hash format: {}", e)))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(()),
            Err(argon2::password_hash::Error::Password) => Err(PasswordError::Mismatch),
            Err(e) => Err(PasswordError::Hashing(e.to_string())),
        }
    }

    /// Well-formed Argon2 hash not tied to any user
    pub fn decoy_hash() -> &'static str {
        DECOY_HASH.as_str()
    }

    /// Verify a password on the blocking thread pool
    pub async fn verify_async(
        cancel: &CancellationToken,
        hash: String,
        password: String,
    ) -> Result<(), PasswordError> {
        run_blocking(cancel, move || Self::verify(&hash, &password)).await
    }
}

fn is_bcrypt_hash(hash: &str) -> bool {
    ["$2a$", "$2b$", "$2y$"]
        .iter()
        .any(|prefix| hash.starts_with(prefix))
}

async fn run_blocking<T, F>(cancel: &CancellationToken, work: F) -> Result<T, PasswordError>
where
    F: FnOnce() -> Result<T, PasswordError> + Send + 'static,
    T: Send + 'static,
{
    if cancel.is_cancelled() {
        debug!("Skipping password work, caller already cancelled");
        return Err(PasswordError::Cancelled);
    }

    // Checked again once a blocking thread picks the job up
    let token = cancel.clone();
    tokio::task::spawn_blocking(move || {
        if token.is_cancelled() {
            return Err(PasswordError::Cancelled);
        }
        work()
    })
    .await
    .map_err(|e| PasswordError::Hashing(format!("Task join error: {}", e)))?
}
