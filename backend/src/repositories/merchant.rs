//! Merchant store

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pos_shared::{Merchant, NewMerchant};
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

use super::{run_cancellable, StoreError};

#[async_trait]
pub trait MerchantStore: Send + Sync {
    async fn create(
        &self,
        cancel: &CancellationToken,
        merchant: NewMerchant,
    ) -> Result<Merchant, StoreError>;

    /// Non-deleted merchant by id
    async fn get_by_id(
        &self,
        cancel: &CancellationToken,
        id: i64,
    ) -> Result<Option<Merchant>, StoreError>;
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct MerchantRecord {
    id: i64,
    name: String,
    logo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<MerchantRecord> for Merchant {
    fn from(record: MerchantRecord) -> Self {
        Merchant {
            id: record.id,
            name: record.name,
            logo: record.logo,
            created_at: record.created_at,
            updated_at: record.updated_at,
            deleted_at: record.deleted_at,
        }
    }
}

/// PostgreSQL implementation of [`MerchantStore`]
#[derive(Debug, Clone)]
pub struct PgMerchantStore {
    pool: PgPool,
}

impl PgMerchantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MerchantStore for PgMerchantStore {
    async fn create(
        &self,
        cancel: &CancellationToken,
        merchant: NewMerchant,
    ) -> Result<Merchant, StoreError> {
        run_cancellable(cancel, async {
            let mut tx = self.pool.begin().await?;

            let record = sqlx::query_as::<_, MerchantRecord>(
                r#"
                INSERT INTO merchants (name, logo, created_at, updated_at)
                VALUES ($1, $2, NOW(), NOW())
                RETURNING id, name, logo, created_at, updated_at, deleted_at
                "#,
            )
            .bind(&merchant.name)
            .bind(&merchant.logo)
            .fetch_one(&mut *tx)
            .await
            .map_err(StoreError::from_write)?;

            tx.commit().await?;
            Ok(record.into())
        })
        .await
    }

    async fn get_by_id(
        &self,
        cancel: &CancellationToken,
        id: i64,
    ) -> Result<Option<Merchant>, StoreError> {
        run_cancellable(cancel, async {
            let record = sqlx::query_as::<_, MerchantRecord>(
                r#"
                SELECT id, name, logo, created_at, updated_at, deleted_at
                FROM merchants
                WHERE id = $1 AND deleted_at IS NULL
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
            Ok(record.map(Merchant::from))
        })
        .await
    }
}
