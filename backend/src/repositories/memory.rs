//! In-memory store implementations
//!
//! Same invariants as the PostgreSQL stores: ids are assigned ascending,
//! email is unique among non-deleted users, deletion only stamps
//! `deleted_at`. Used by tests and for running without a database.

use async_trait::async_trait;
use chrono::Utc;
use pos_shared::{Merchant, NewMerchant, NewUser, PaginationCursor, User};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use super::{run_cancellable, MerchantStore, StoreError, UserStore};

#[derive(Debug)]
struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory implementation of [`UserStore`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<Table<User>>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw row lookup that also sees soft-deleted users
    pub async fn row(&self, id: i64) -> Option<User> {
        self.users.read().await.rows.get(&id).cloned()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(
        &self,
        cancel: &CancellationToken,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        run_cancellable(cancel, async {
            let users = self.users.read().await;
            Ok(users
                .rows
                .values()
                .find(|u| !u.is_deleted() && u.email == email)
                .cloned())
        })
        .await
    }

    async fn create(&self, cancel: &CancellationToken, user: NewUser) -> Result<i64, StoreError> {
        run_cancellable(cancel, async {
            let mut users = self.users.write().await;

            if users
                .rows
                .values()
                .any(|u| !u.is_deleted() && u.email == user.email)
            {
                return Err(StoreError::Conflict("users_email_active_key".to_string()));
            }

            let id = users.next_id();
            let now = Utc::now();
            users.rows.insert(
                id,
                User {
                    id,
                    merchant_id: user.merchant_id,
                    email: user.email,
                    password_hash: user.password_hash,
                    first_name: user.first_name,
                    last_name: user.last_name,
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                },
            );
            Ok(id)
        })
        .await
    }

    async fn get_by_id(
        &self,
        cancel: &CancellationToken,
        id: i64,
    ) -> Result<Option<User>, StoreError> {
        run_cancellable(cancel, async {
            let users = self.users.read().await;
            Ok(users.rows.get(&id).filter(|u| !u.is_deleted()).cloned())
        })
        .await
    }

    async fn list(
        &self,
        cancel: &CancellationToken,
        merchant_id: i64,
        cursor: PaginationCursor,
    ) -> Result<(Vec<User>, i64), StoreError> {
        run_cancellable(cancel, async {
            let users = self.users.read().await;
            let total = users
                .rows
                .values()
                .filter(|u| u.merchant_id == merchant_id && !u.is_deleted())
                .count() as i64;
            let limit = usize::try_from(cursor.limit).unwrap_or(0);
            let page = users
                .rows
                .range(cursor.cursor.saturating_add(1)..)
                .map(|(_, u)| u)
                .filter(|u| u.merchant_id == merchant_id && !u.is_deleted())
                .take(limit)
                .cloned()
                .collect();

            Ok((page, total))
        })
        .await
    }

    async fn delete(&self, cancel: &CancellationToken, id: i64) -> Result<(), StoreError> {
        run_cancellable(cancel, async {
            let mut users = self.users.write().await;
            match users.rows.get_mut(&id) {
                Some(user) if !user.is_deleted() => {
                    let now = Utc::now();
                    user.deleted_at = Some(now);
                    user.updated_at = now;
                    Ok(())
                }
                _ => Err(StoreError::NotFound),
            }
        })
        .await
    }

    async fn ping(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        run_cancellable(cancel, async { Ok(()) }).await
    }
}

/// In-memory implementation of [`MerchantStore`]
#[derive(Debug, Clone, Default)]
pub struct InMemoryMerchantStore {
    merchants: Arc<RwLock<Table<Merchant>>>,
}

impl InMemoryMerchantStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MerchantStore for InMemoryMerchantStore {
    async fn create(
        &self,
        cancel: &CancellationToken,
        merchant: NewMerchant,
    ) -> Result<Merchant, StoreError> {
        run_cancellable(cancel, async {
            let mut merchants = self.merchants.write().await;
            let id = merchants.next_id();
            let now = Utc::now();
            let merchant = Merchant {
                id,
                name: merchant.name,
                logo: merchant.logo,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            };
            merchants.rows.insert(id, merchant.clone());
            Ok(merchant)
        })
        .await
    }

    async fn get_by_id(
        &self,
        cancel: &CancellationToken,
        id: i64,
    ) -> Result<Option<Merchant>, StoreError> {
        run_cancellable(cancel, async {
            let merchants = self.merchants.read().await;
            Ok(merchants
                .rows
                .get(&id)
                .filter(|m| m.deleted_at.is_none())
                .cloned())
        })
        .await
    }
}
