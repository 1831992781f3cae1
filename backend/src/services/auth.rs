//! Login
//!
//! Unknown email and wrong password produce the same error, so a caller
//! cannot probe which emails are registered.

use crate::auth::{IssuedToken, JwtService, PasswordError, PasswordService};
use crate::error::{ServiceError, ServiceResult};
use crate::repositories::UserStore;
use pos_shared::User;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::{hashing_failure, store_failure};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    jwt: JwtService,
    decoy_hash: &'static str,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, jwt: JwtService) -> Self {
        Self {
            users,
            jwt,
            decoy_hash: PasswordService::decoy_hash(),
        }
    }

    /// Exchange credentials for a signed access token
    #[instrument(skip(self, cancel, password))]
    pub async fn login(
        &self,
        cancel: &CancellationToken,
        email: &str,
        password: &str,
    ) -> ServiceResult<IssuedToken> {
        let user = self
            .users
            .find_by_email(cancel, email)
            .await
            .map_err(|e| store_failure(e, "look up user for login"))?;

        let Some(user) = user else {
            // Same verify cost as a wrong password
            let decoy =
                PasswordService::verify_async(cancel, self.decoy_hash.to_string(), password.to_string())
                    .await;
            if let Err(PasswordError::Cancelled) = decoy {
                return Err(ServiceError::Cancelled);
            }
            info!("Login rejected: unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        match PasswordService::verify_async(cancel, user.password_hash.clone(), password.to_string()).await
        {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => {
                info!(user_id = user.id, "Login rejected: wrong password");
                return Err(ServiceError::InvalidCredentials);
            }
            Err(e) => return Err(hashing_failure(e, "verify login password")),
        }

        let issued = self.issue_token(cancel, &user)?;

        info!(user_id = user.id, merchant_id = user.merchant_id, "User logged in");
        Ok(issued)
    }

    fn issue_token(&self, cancel: &CancellationToken, user: &User) -> ServiceResult<IssuedToken> {
        if cancel.is_cancelled() {
            return Err(ServiceError::Cancelled);
        }

        self.jwt
            .issue(user.id, &user.email, user.merchant_id)
            .map_err(|e| ServiceError::Unexpected(anyhow::Error::new(e).context("issue token")))
    }
}
