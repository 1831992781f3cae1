//! User store
//!
//! Soft-deleted rows are filtered here, once, so no read path can return
//! them: every query carries `deleted_at IS NULL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pos_shared::{NewUser, PaginationCursor, User};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{run_cancellable, StoreError};

/// Durable storage of user records
#[async_trait]
pub trait UserStore: Send + Sync {
    /// The unique non-deleted user holding `email`
    async fn find_by_email(
        &self,
        cancel: &CancellationToken,
        email: &str,
    ) -> Result<Option<User>, StoreError>;

    /// Insert a user and return its assigned id
    async fn create(&self, cancel: &CancellationToken, user: NewUser) -> Result<i64, StoreError>;

    async fn get_by_id(&self, cancel: &CancellationToken, id: i64)
        -> Result<Option<User>, StoreError>;

    /// One page of a merchant's users in ascending id order, plus the
    /// merchant's total user count
    async fn list(
        &self,
        cancel: &CancellationToken,
        merchant_id: i64,
        cursor: PaginationCursor,
    ) -> Result<(Vec<User>, i64), StoreError>;

    /// Soft-delete; `NotFound` if there is no such non-deleted user
    async fn delete(&self, cancel: &CancellationToken, id: i64) -> Result<(), StoreError>;

    /// Connectivity probe
    async fn ping(&self, cancel: &CancellationToken) -> Result<(), StoreError>;
}

/// User row as stored in PostgreSQL
#[derive(Debug, Clone, sqlx::FromRow)]
struct UserRecord {
    id: i64,
    merchant_id: i64,
    email: String,
    password: String,
    firstname: String,
    lastname: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            merchant_id: record.merchant_id,
            email: record.email,
            password_hash: record.password,
            first_name: record.firstname,
            last_name: record.lastname,
            created_at: record.created_at,
            updated_at: record.updated_at,
            deleted_at: record.deleted_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, merchant_id, email, password, firstname, lastname, created_at, updated_at, deleted_at";

/// PostgreSQL implementation of [`UserStore`]
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_email(
        &self,
        cancel: &CancellationToken,
        email: &str,
    ) -> Result<Option<User>, StoreError> {
        let query = format!(
            "SELECT {} FROM users WHERE email = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        );

        run_cancellable(cancel, async {
            let record = sqlx::query_as::<_, UserRecord>(&query)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
            Ok(record.map(User::from))
        })
        .await
    }

    async fn create(&self, cancel: &CancellationToken, user: NewUser) -> Result<i64, StoreError> {
        run_cancellable(cancel, async {
            let mut tx = self.pool.begin().await?;

            let id = sqlx::query_scalar::<_, i64>(
                r#"
                INSERT INTO users (merchant_id, email, password, firstname, lastname,
                                   created_at, updated_at, deleted_at)
                VALUES ($1, $2, $3, $4, $5, NOW(), NOW(), NULL)
                RETURNING id
                "#,
            )
            .bind(user.merchant_id)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .fetch_one(&mut *tx)
            .await
            .map_err(StoreError::from_write)?;

            tx.commit().await?;

            debug!(user_id = id, merchant_id = user.merchant_id, "User row inserted");
            Ok(id)
        })
        .await
    }

    async fn get_by_id(
        &self,
        cancel: &CancellationToken,
        id: i64,
    ) -> Result<Option<User>, StoreError> {
        let query = format!(
            "SELECT {} FROM users WHERE id = $1 AND deleted_at IS NULL",
            USER_COLUMNS
        );

        run_cancellable(cancel, async {
            let record = sqlx::query_as::<_, UserRecord>(&query)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(record.map(User::from))
        })
        .await
    }

    async fn list(
        &self,
        cancel: &CancellationToken,
        merchant_id: i64,
        cursor: PaginationCursor,
    ) -> Result<(Vec<User>, i64), StoreError> {
        let page_query = format!(
            r#"
            SELECT {} FROM users
            WHERE merchant_id = $1 AND id > $2 AND deleted_at IS NULL
            ORDER BY id ASC
            LIMIT $3
            "#,
            USER_COLUMNS
        );

        run_cancellable(cancel, async {
            let page = sqlx::query_as::<_, UserRecord>(&page_query)
                .bind(merchant_id)
                .bind(cursor.cursor)
                .bind(cursor.limit)
                .fetch_all(&self.pool);

            let total = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM users WHERE merchant_id = $1 AND deleted_at IS NULL",
            )
            .bind(merchant_id)
            .fetch_one(&self.pool);

            let (records, total) = tokio::try_join!(page, total)?;
            Ok((records.into_iter().map(User::from).collect(), total))
        })
        .await
    }

    async fn delete(&self, cancel: &CancellationToken, id: i64) -> Result<(), StoreError> {
        run_cancellable(cancel, async {
            let mut tx = self.pool.begin().await?;

            let result = sqlx::query(
                r#"
                UPDATE users
                SET deleted_at = NOW(), updated_at = NOW()
                WHERE id = $1 AND deleted_at IS NULL
                "#,
            )
            .bind(id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping `tx` rolls back
                return Err(StoreError::NotFound);
            }

            tx.commit().await?;

            debug!(user_id = id, "User soft-deleted");
            Ok(())
        })
        .await
    }

    async fn ping(&self, cancel: &CancellationToken) -> Result<(), StoreError> {
        run_cancellable(cancel, async {
            crate::db::health_check(&self.pool).await?;
            Ok(())
        })
        .await
    }
}
