use thiserror::Error;

use crate::pricing::PricingError;
use crate::quotes::QuoteError;
use crate::vehicles::{LookupError, ProviderError};

// Create a type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the quoting core
#[derive(Error, Debug)]
pub enum Error {
    #[error("Vehicle lookup failed: {0}")]
    Lookup(#[from] LookupError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Pricing failed: {0}")]
    Pricing(#[from] PricingError),

    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    #[error("Input validation failed: {0}")]
    Validation(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Errors surfaced by the external record store collaborators
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store backend failed: {0}")]
    Backend(String),
}
