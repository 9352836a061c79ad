use thiserror::Error;

/// Error taxonomy for a single provider call.
///
/// Rate-limited and auth-failed responses are never retried inside this
/// layer; retry policy belongs to the caller.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Whether a later identical call could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProviderError::Timeout | ProviderError::Transport(_) | ProviderError::RateLimited
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(error.to_string())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupErrorKind {
    InvalidVin,
    InvalidPlate,
    NotFound,
    ApiError,
    RateLimited,
    Timeout,
}

/// Terminal failure of a resolution call, raised only after every fallback
/// is exhausted. `recoverable` tells the caller whether a retry with the
/// same inputs is worthwhile.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct LookupError {
    pub kind: LookupErrorKind,
    pub message: String,
    pub recoverable: bool,
}

impl LookupError {
    pub fn new(kind: LookupErrorKind, message: impl Into<String>, recoverable: bool) -> Self {
        LookupError {
            kind,
            message: message.into(),
            recoverable,
        }
    }

    pub fn invalid_vin(vin: &str) -> Self {
        Self::new(
            LookupErrorKind::InvalidVin,
            format!("Invalid VIN: {}", vin),
            false,
        )
    }

    pub fn invalid_plate(plate: &str, state: &str) -> Self {
        Self::new(
            LookupErrorKind::InvalidPlate,
            format!("Invalid license plate or state: {} ({})", plate, state),
            false,
        )
    }
}

impl From<&ProviderError> for LookupErrorKind {
    fn from(error: &ProviderError) -> Self {
        match error {
            ProviderError::NotFound(_) => LookupErrorKind::NotFound,
            ProviderError::RateLimited => LookupErrorKind::RateLimited,
            ProviderError::Timeout => LookupErrorKind::Timeout,
            ProviderError::AuthFailed(_)
            | ProviderError::Transport(_)
            | ProviderError::InvalidResponse(_) => LookupErrorKind::ApiError,
        }
    }
}
