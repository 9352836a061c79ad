use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("No pricing profile configured for shop {0}")]
    NoProfile(String),

    #[error("No parts available to price")]
    NoParts,

    #[error("Service distance {distance} miles exceeds the {max} mile limit")]
    OutsideServiceArea { distance: Decimal, max: Decimal },

    #[error("{0} chips require a full replacement, not repair")]
    TooManyChips(u32),

    #[error("Chip count must be at least 1")]
    NoChips,

    #[error("Pricing store error: {0}")]
    Store(String),
}
