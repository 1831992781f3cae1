//! Merchant provisioning

use crate::error::{ServiceError, ServiceResult};
use crate::repositories::MerchantStore;
use pos_shared::{Merchant, NewMerchant};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::store_failure;

#[derive(Clone)]
pub struct MerchantService {
    merchants: Arc<dyn MerchantStore>,
}

impl MerchantService {
    pub fn new(merchants: Arc<dyn MerchantStore>) -> Self {
        Self { merchants }
    }

    pub async fn create_merchant(
        &self,
        cancel: &CancellationToken,
        name: &str,
        logo: Option<String>,
    ) -> ServiceResult<Merchant> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidParameters(
                "merchant name is required".to_string(),
            ));
        }

        let merchant = self
            .merchants
            .create(
                cancel,
                NewMerchant {
                    name: name.to_string(),
                    logo: logo.filter(|l| !l.trim().is_empty()),
                },
            )
            .await
            .map_err(|e| store_failure(e, "create merchant"))?;

        info!(merchant_id = merchant.id, "Merchant created");
        Ok(merchant)
    }

    /// Existing, non-deleted merchant
    pub async fn find_merchant(
        &self,
        cancel: &CancellationToken,
        id: i64,
    ) -> ServiceResult<Option<Merchant>> {
        self.merchants
            .get_by_id(cancel, id)
            .await
            .map_err(|e| store_failure(e, "get merchant"))
    }
}
