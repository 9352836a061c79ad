use async_trait::async_trait;

use super::vehicles_errors::LookupError;
use super::vehicles_model::{GlassType, VehicleLookupResult};

/// Vehicle and parts resolution, with provider fallback handled inside.
///
/// Methods fail with [`LookupError`] only once every applicable source has
/// been exhausted; degraded results come back as `Ok` with review flags set.
#[async_trait]
pub trait VehicleLookupServiceTrait: Send + Sync {
    async fn resolve_by_vin(
        &self,
        vin: &str,
        glass_type: GlassType,
    ) -> Result<VehicleLookupResult, LookupError>;

    async fn resolve_by_plate(
        &self,
        plate: &str,
        state: &str,
        glass_type: GlassType,
    ) -> Result<VehicleLookupResult, LookupError>;

    async fn resolve_by_vehicle_info(
        &self,
        year: i32,
        make: &str,
        model: &str,
        glass_type: GlassType,
    ) -> Result<VehicleLookupResult, LookupError>;
}
