//! User administration
//!
//! Every operation is scoped to the caller's merchant. Users of other
//! merchants are reported as not found, never revealed.

use crate::auth::{AuthUser, PasswordService};
use crate::error::{ServiceError, ServiceResult};
use crate::repositories::{StoreError, UserStore};
use pos_shared::validation::{validate_cursor, validate_limit};
use pos_shared::{CreateUserRequest, NewUser, PaginationCursor, User};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use validator::Validate;

use super::{hashing_failure, store_failure};

/// User administration service
#[derive(Clone)]
pub struct UserAdminService {
    users: Arc<dyn UserStore>,
}

impl UserAdminService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Create a user under `merchant_id` and return its id
    ///
    /// Input is validated before any hashing or store access.
    #[instrument(skip(self, cancel, request), fields(email = %request.email))]
    pub async fn create_user(
        &self,
        cancel: &CancellationToken,
        merchant_id: i64,
        request: CreateUserRequest,
    ) -> ServiceResult<i64> {
        request.validate()?;

        let CreateUserRequest {
            email,
            password,
            first_name,
            last_name,
        } = request;

        let password_hash = PasswordService::hash_async(cancel, password)
            .await
            .map_err(|e| hashing_failure(e, "hash new user password"))?;

        if self
            .users
            .find_by_email(cancel, &email)
            .await
            .map_err(|e| store_failure(e, "check email uniqueness"))?
            .is_some()
        {
            return Err(ServiceError::EmailNotUnique);
        }

        let new_user = NewUser {
            merchant_id,
            email,
            password_hash,
            first_name,
            last_name: last_name.filter(|name| !name.trim().is_empty()),
        };

        let id = match self.users.create(cancel, new_user).await {
            Ok(id) => id,
            // Lost a race with a concurrent create for the same email
            Err(StoreError::Conflict(constraint)) => {
                warn!(constraint = %constraint, "Insert hit uniqueness constraint");
                return Err(ServiceError::EmailNotUnique);
            }
            Err(e) => return Err(store_failure(e, "create user")),
        };

        info!(user_id = id, merchant_id, "User created");
        Ok(id)
    }

    /// One page of the merchant's users and the merchant's total user count
    pub async fn list_users(
        &self,
        cancel: &CancellationToken,
        merchant_id: i64,
        cursor: PaginationCursor,
    ) -> ServiceResult<(Vec<User>, i64)> {
        validate_limit(cursor.limit)?;
        validate_cursor(cursor.cursor)?;

        self.users
            .list(cancel, merchant_id, cursor)
            .await
            .map_err(|e| store_failure(e, "list users"))
    }

    pub async fn get_user(
        &self,
        cancel: &CancellationToken,
        caller: &AuthUser,
        id: i64,
    ) -> ServiceResult<User> {
        self.users
            .get_by_id(cancel, id)
            .await
            .map_err(|e| store_failure(e, "get user"))?
            .filter(|user| user.merchant_id == caller.merchant_id)
            .ok_or(ServiceError::UserNotFound)
    }

    #[instrument(skip(self, cancel, caller), fields(caller_id = caller.user_id))]
    pub async fn delete_user(
        &self,
        cancel: &CancellationToken,
        caller: &AuthUser,
        id: i64,
    ) -> ServiceResult<()> {
        // Ownership check; the user may still vanish before the delete lands
        self.get_user(cancel, caller, id).await?;

        match self.users.delete(cancel, id).await {
            Ok(()) => {
                info!(user_id = id, merchant_id = caller.merchant_id, "User deleted");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(ServiceError::UserNotFound),
            Err(e) => Err(store_failure(e, "delete user")),
        }
    }
}
