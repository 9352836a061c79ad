use async_trait::async_trait;

use super::customers_model::{Customer, NewCustomer};
use crate::errors::Result;

/// Trait defining the contract for the customer record store.
#[async_trait]
pub trait CustomerRepositoryTrait: Send + Sync {
    /// Returns the customer with the given email, creating one from
    /// `defaults` when no record exists yet.
    async fn create_or_get(&self, email: &str, defaults: NewCustomer) -> Result<Customer>;
}
