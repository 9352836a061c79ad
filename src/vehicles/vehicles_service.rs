//! Vehicle resolution cascade.
//!
//! VIN lookups try the primary provider first and fall back to the free VIN
//! decoder plus the parts catalog on any failure. Plate lookups have no
//! fallback source, so a primary failure is terminal. Direct year/make/model
//! lookups skip identification and go straight to the catalog.

use std::sync::Arc;

use async_trait::async_trait;
use log::{info, warn};

use super::providers::{PartsCatalog, VehicleDataProvider, VinDecodeProvider};
use super::vehicles_errors::{LookupError, LookupErrorKind, ProviderError};
use super::vehicles_model::{
    validate_plate, validate_vin, Confidence, Country, GlassType, Provenance, ReviewReason,
    VehicleLookupResult,
};
use super::vehicles_traits::VehicleLookupServiceTrait;

pub struct VehicleLookupService {
    primary: Arc<dyn VehicleDataProvider>,
    secondary: Arc<dyn VinDecodeProvider>,
    catalog: Arc<dyn PartsCatalog>,
    country: Country,
}

impl VehicleLookupService {
    pub fn new(
        primary: Arc<dyn VehicleDataProvider>,
        secondary: Arc<dyn VinDecodeProvider>,
        catalog: Arc<dyn PartsCatalog>,
        country: Country,
    ) -> Self {
        VehicleLookupService {
            primary,
            secondary,
            catalog,
            country,
        }
    }

    /// Backfills price/labor/hardware on every part. Enrichment failures are
    /// logged and skipped; a partially enriched part is still usable.
    async fn enrich_parts(&self, result: &mut VehicleLookupResult) {
        for part in &mut result.parts {
            if let Err(e) = self.catalog.enrich_part(part).await {
                warn!("Catalog enrichment failed for {}: {}", part.part_number, e);
            }
        }
    }

    fn flag_missing_prices(result: &mut VehicleLookupResult) {
        let missing = result
            .parts
            .iter()
            .filter(|p| p.list_price.is_unpriced())
            .count();
        if missing > 0 {
            result.add_review_reason(ReviewReason::MissingListPrice { count: missing });
        }
    }

    async fn fallback_by_vin(
        &self,
        vin: &str,
        glass_type: GlassType,
    ) -> Result<VehicleLookupResult, LookupError> {
        let mut result = self.secondary.decode_vin(vin).await.map_err(|e| {
            LookupError::new(
                LookupErrorKind::from(&e),
                format!("Vehicle lookup failed: {}", e),
                e.is_transient(),
            )
        })?;

        if result.year > 0 && !result.make.is_empty() && !result.model.is_empty() {
            match self
                .catalog
                .parts_for_vehicle(result.year, &result.make, &result.model, glass_type)
                .await
            {
                Ok(parts) => {
                    result.parts = parts;
                    if result.parts.is_empty() {
                        result.needs_manual_review = true;
                        result.confidence = Confidence::Low;
                        result.add_review_reason(ReviewReason::NoPartsFound);
                    }
                }
                Err(e) => {
                    warn!("Catalog lookup failed during fallback: {}", e);
                    result.needs_manual_review = true;
                    result.confidence = Confidence::Low;
                    result.add_review_reason(ReviewReason::ReferenceLookupFailed {
                        detail: e.to_string(),
                    });
                }
            }
        }

        Self::flag_missing_prices(&mut result);
        result.derive_flags();
        Ok(result)
    }
}

#[async_trait]
impl VehicleLookupServiceTrait for VehicleLookupService {
    async fn resolve_by_vin(
        &self,
        vin: &str,
        glass_type: GlassType,
    ) -> Result<VehicleLookupResult, LookupError> {
        if !validate_vin(vin) {
            return Err(LookupError::invalid_vin(vin));
        }

        let kind = glass_type.provider_kind();
        match self.primary.decode_vin(vin, kind, self.country).await {
            Ok(mut result) => {
                self.enrich_parts(&mut result).await;
                result.derive_flags();
                Ok(result)
            }
            Err(e) => {
                warn!(
                    "Primary provider {} failed for VIN {}, falling back: {}",
                    self.primary.name(),
                    vin,
                    e
                );
                self.fallback_by_vin(vin, glass_type).await
            }
        }
    }

    async fn resolve_by_plate(
        &self,
        plate: &str,
        state: &str,
        glass_type: GlassType,
    ) -> Result<VehicleLookupResult, LookupError> {
        if !validate_plate(plate, state) {
            return Err(LookupError::invalid_plate(plate, state));
        }

        let kind = glass_type.provider_kind();
        // No secondary source can resolve a plate, so failures are terminal
        match self
            .primary
            .decode_plate(plate, state, kind, self.country)
            .await
        {
            Ok(mut result) => {
                self.enrich_parts(&mut result).await;
                result.derive_flags();
                Ok(result)
            }
            Err(e) => {
                let kind = LookupErrorKind::from(&e);
                Err(LookupError::new(
                    kind,
                    format!("Plate lookup failed: {}", e),
                    false,
                ))
            }
        }
    }

    async fn resolve_by_vehicle_info(
        &self,
        year: i32,
        make: &str,
        model: &str,
        glass_type: GlassType,
    ) -> Result<VehicleLookupResult, LookupError> {
        info!("Direct catalog lookup for {} {} {}", year, make, model);
        let mut result = VehicleLookupResult::new(Provenance::Nags, "", year, make, model);
        result.confidence = Confidence::Medium;

        match self
            .catalog
            .parts_for_vehicle(year, make, model, glass_type)
            .await
        {
            Ok(parts) => {
                result.parts = parts;
                if result.parts.is_empty() {
                    result.needs_manual_review = true;
                    result.confidence = Confidence::Low;
                    result.add_review_reason(ReviewReason::NoPartsFound);
                }
            }
            Err(e) => {
                return Err(LookupError::new(
                    LookupErrorKind::from(&e),
                    format!("Parts catalog lookup failed: {}", e),
                    e.is_transient(),
                ));
            }
        }

        Self::flag_missing_prices(&mut result);
        result.derive_flags();
        Ok(result)
    }
}
