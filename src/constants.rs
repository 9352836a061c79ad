use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Acceptable total for auto-sending a replacement quote (lower bound)
pub const REPLACEMENT_PRICE_MIN: Decimal = dec!(500.00);

/// Acceptable total for auto-sending a replacement quote (upper bound)
pub const REPLACEMENT_PRICE_MAX: Decimal = dec!(1200.00);

/// Default TTL for cached provider responses
pub const DEFAULT_CACHE_TTL_DAYS: i64 = 30;

/// Days before a generated quote expires
pub const QUOTE_EXPIRATION_DAYS: i64 = 7;

/// Request timeout for the Autobolt API
pub const AUTOBOLT_TIMEOUT_SECS: u64 = 30;

/// Request timeout for the NHTSA API
pub const NHTSA_TIMEOUT_SECS: u64 = 15;

/// Mobile-service distance covered by the base fee, in miles
pub const MOBILE_BASE_RANGE_MILES: Decimal = dec!(30);

/// Default urethane tube quantity when the catalog has no figure
pub const DEFAULT_TUBE_QTY: Decimal = dec!(1.5);

/// Default labor hours when the catalog has no figure
pub const DEFAULT_LABOR_HOURS: Decimal = dec!(1.5);
