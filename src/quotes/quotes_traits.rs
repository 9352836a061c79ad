use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::quotes_model::{GenerationOutcome, GenerationRequest, Quote};
use crate::errors::Result;
use crate::pricing::LineItem;

/// Trait defining the contract for the quote record store.
#[async_trait]
pub trait QuoteRepositoryTrait: Send + Sync {
    async fn create_quote(&self, quote: &Quote) -> Result<()>;

    async fn create_line_item(&self, quote_id: Uuid, item: &LineItem) -> Result<()>;

    async fn update_quote(&self, quote: &Quote) -> Result<()>;

    async fn get_quote(&self, quote_id: Uuid) -> Result<Quote>;

    /// Non-terminal quotes whose expiry timestamp has passed
    async fn find_expirable(&self, now: DateTime<Utc>) -> Result<Vec<Quote>>;
}

/// Outbound customer notifications. Implementations deliver email or SMS;
/// delivery failure never fails the quote itself.
#[async_trait]
pub trait NotificationDispatcherTrait: Send + Sync {
    async fn send_quote_ready(&self, quote: &Quote) -> Result<()>;

    async fn send_pending_review(&self, quote: &Quote) -> Result<()>;

    async fn send_rejection(&self, quote: &Quote) -> Result<()>;

    async fn send_approval_confirmation(&self, quote: &Quote) -> Result<()>;
}

/// End-to-end quote generation
#[async_trait]
pub trait QuoteGenerationServiceTrait: Send + Sync {
    /// Runs the full pipeline for one request. Failures come back as a
    /// [`GenerationOutcome::Failed`], never as `Err`.
    async fn generate(&self, request: GenerationRequest) -> GenerationOutcome;

    /// Expires every overdue open quote; returns how many were expired
    async fn expire_stale_quotes(&self, now: DateTime<Utc>) -> Result<usize>;

    /// Review action: reject a pending quote with a reason
    async fn reject_quote(&self, quote_id: Uuid, reason: &str) -> Result<Quote>;

    /// Review action: approve and send a quote held for validation
    async fn release_quote(&self, quote_id: Uuid) -> Result<Quote>;

    /// Records the customer accepting a sent quote
    async fn approve_quote(&self, quote_id: Uuid) -> Result<Quote>;
}
