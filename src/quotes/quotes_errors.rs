use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Cannot transition quote from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("A rejection reason is required")]
    MissingReason,

    #[error("Quote store error: {0}")]
    Store(String),
}
