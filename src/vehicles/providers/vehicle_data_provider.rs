use async_trait::async_trait;

use crate::vehicles::vehicles_errors::ProviderError;
use crate::vehicles::vehicles_model::{
    Country, GlassKind, GlassPart, GlassType, VehicleLookupResult,
};

/// Full-service vehicle data provider: VIN and plate decode with parts.
#[async_trait]
pub trait VehicleDataProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn decode_vin(
        &self,
        vin: &str,
        kind: GlassKind,
        country: Country,
    ) -> Result<VehicleLookupResult, ProviderError>;

    async fn decode_plate(
        &self,
        plate: &str,
        state: &str,
        kind: GlassKind,
        country: Country,
    ) -> Result<VehicleLookupResult, ProviderError>;
}

/// VIN-only decoder used as the fallback identification source. Returns
/// year/make/model but never parts or calibration data.
#[async_trait]
pub trait VinDecodeProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn decode_vin(&self, vin: &str) -> Result<VehicleLookupResult, ProviderError>;
}

/// Read-only parts catalog: compatible parts by vehicle, and per-part
/// price/labor/hardware enrichment. Never supplies calibration data.
#[async_trait]
pub trait PartsCatalog: Send + Sync {
    async fn parts_for_vehicle(
        &self,
        year: i32,
        make: &str,
        model: &str,
        glass_type: GlassType,
    ) -> Result<Vec<GlassPart>, ProviderError>;

    /// Fills list price (when absent), labor hours and hardware flags for a
    /// part identified by its base part number.
    async fn enrich_part(&self, part: &mut GlassPart) -> Result<(), ProviderError>;
}
