use async_trait::async_trait;
use rust_decimal::Decimal;

use super::pricing_errors::PricingError;
use super::pricing_model::{ChipRepairPricing, PricingProfile, QuotePricing, ServiceType};
use crate::vehicles::vehicles_model::{GlassType, VehicleLookupResult};

/// Access to stored pricing profiles
#[async_trait]
pub trait PricingProfileRepositoryTrait: Send + Sync {
    /// The profile for a shop. With `default_only` set, only the shop's
    /// designated default profile qualifies; otherwise any active profile.
    async fn get_pricing_profile(
        &self,
        shop_id: &str,
        default_only: bool,
    ) -> Result<Option<PricingProfile>, PricingError>;
}

#[async_trait]
pub trait PricingServiceTrait: Send + Sync {
    async fn calculate_quote(
        &self,
        lookup: &VehicleLookupResult,
        shop_id: &str,
        glass_type: GlassType,
        service_type: ServiceType,
        distance_miles: Option<Decimal>,
    ) -> Result<QuotePricing, PricingError>;

    async fn calculate_chip_repair(
        &self,
        chip_count: u32,
        shop_id: &str,
        service_type: ServiceType,
        distance_miles: Option<Decimal>,
    ) -> Result<ChipRepairPricing, PricingError>;
}
