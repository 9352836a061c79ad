use async_trait::async_trait;

use super::shops_model::Shop;
use crate::errors::Result;

/// Trait defining the contract for the shop record store.
#[async_trait]
pub trait ShopRepositoryTrait: Send + Sync {
    /// Fetches a shop by id; `StoreError::NotFound` when missing.
    async fn get_shop(&self, shop_id: &str) -> Result<Shop>;
}
