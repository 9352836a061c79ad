//! NAGS reference catalog: compatible parts by year/make/model plus list
//! price, labor and hardware enrichment. The catalog never carries
//! calibration data.
//!
//! Record access goes through [`NagsRecords`] so the client works the same
//! over a database-backed store or the in-memory fixtures used in tests.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;

use crate::constants::DEFAULT_TUBE_QTY;
use crate::vehicles::providers::vehicle_data_provider::PartsCatalog;
use crate::vehicles::vehicles_errors::ProviderError;
use crate::vehicles::vehicles_model::{GlassPart, GlassType, ListPrice, PartSource};

/// A glass part master record
#[derive(Debug, Clone, Default)]
pub struct GlassRecord {
    pub glass_id: String,
    pub prefix_cd: String,
    pub tube_qty: Option<Decimal>,
    pub antenna: bool,
    pub encapsulated: bool,
    pub heads_up_display: bool,
    pub heated: bool,
    pub slider: bool,
    pub solar: bool,
    pub superseded_by: Option<String>,
}

/// Installation configuration for a glass part
#[derive(Debug, Clone, Default)]
pub struct GlassConfigRecord {
    pub labor_hours: Option<Decimal>,
    pub moulding_required: bool,
    pub clips_required: bool,
    pub attachment_desc: Option<String>,
}

/// A vehicle-to-glass fitment row
#[derive(Debug, Clone)]
pub struct VehicleGlassRecord {
    pub glass_id: String,
    pub additional_labor_hours: Option<Decimal>,
}

/// Access to the NAGS reference tables
#[async_trait]
pub trait NagsRecords: Send + Sync {
    /// Fitment rows for a vehicle, restricted to the given part prefixes
    async fn vehicle_glass(
        &self,
        year: i32,
        make: &str,
        model: &str,
        prefixes: &[&str],
    ) -> Result<Vec<VehicleGlassRecord>, ProviderError>;

    async fn glass(&self, glass_id: &str) -> Result<Option<GlassRecord>, ProviderError>;

    async fn list_price(&self, glass_id: &str) -> Result<Option<Decimal>, ProviderError>;

    async fn glass_config(&self, glass_id: &str)
        -> Result<Option<GlassConfigRecord>, ProviderError>;
}

pub struct NagsClient {
    records: Arc<dyn NagsRecords>,
}

impl NagsClient {
    pub fn new(records: Arc<dyn NagsRecords>) -> Self {
        NagsClient { records }
    }

    fn extract_features(record: &GlassRecord) -> Vec<String> {
        let flags = [
            (record.antenna, "Antenna"),
            (record.encapsulated, "Encapsulated"),
            (record.heads_up_display, "Heads-Up Display"),
            (record.heated, "Heated"),
            (record.slider, "Slider"),
            (record.solar, "Solar"),
        ];
        flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, name)| name.to_string())
            .collect()
    }

    async fn build_part(
        &self,
        fitment: &VehicleGlassRecord,
        record: GlassRecord,
    ) -> Result<GlassPart, ProviderError> {
        let mut part = GlassPart::new(&record.glass_id, PartSource::Nags);
        part.prefix_cd = record.prefix_cd.clone();
        part.normalize_prefix();
        part.features = Self::extract_features(&record);
        if let Some(qty) = record.tube_qty {
            part.tube_qty = qty;
        }
        if let Some(extra) = fitment.additional_labor_hours {
            part.additional_labor = format!("+{} hrs", extra);
        }

        if let Some(price) = self.records.list_price(&record.glass_id).await? {
            part.list_price = ListPrice::Priced(price);
        }
        if let Some(config) = self.records.glass_config(&record.glass_id).await? {
            if let Some(hours) = config.labor_hours {
                part.labor_hours = hours;
            }
            part.moulding_required = config.moulding_required;
            part.clips_required = config.clips_required;
        }
        Ok(part)
    }
}

#[async_trait]
impl PartsCatalog for NagsClient {
    async fn parts_for_vehicle(
        &self,
        year: i32,
        make: &str,
        model: &str,
        glass_type: GlassType,
    ) -> Result<Vec<GlassPart>, ProviderError> {
        let (domestic, foreign) = glass_type.catalog_prefixes();
        let fitments = self
            .records
            .vehicle_glass(year, make, model, &[domestic, foreign])
            .await?;
        debug!(
            "NAGS catalog: {} fitment(s) for {} {} {}",
            fitments.len(),
            year,
            make,
            model
        );

        let mut parts = Vec::with_capacity(fitments.len());
        for fitment in &fitments {
            let Some(record) = self.records.glass(&fitment.glass_id).await? else {
                continue;
            };
            // Follow supersession to the replacement part
            let record = match &record.superseded_by {
                Some(successor) => self
                    .records
                    .glass(successor)
                    .await?
                    .unwrap_or(record),
                None => record,
            };
            parts.push(self.build_part(fitment, record).await?);
        }
        Ok(parts)
    }

    async fn enrich_part(&self, part: &mut GlassPart) -> Result<(), ProviderError> {
        if part.list_price.is_unpriced() {
            if let Some(price) = self.records.list_price(&part.part_number).await? {
                part.list_price = ListPrice::Priced(price);
            }
        }
        if part.tube_qty == DEFAULT_TUBE_QTY {
            if let Some(record) = self.records.glass(&part.part_number).await? {
                if let Some(qty) = record.tube_qty {
                    part.tube_qty = qty;
                }
            }
        }
        if let Some(config) = self.records.glass_config(&part.part_number).await? {
            if let Some(hours) = config.labor_hours {
                part.labor_hours = hours;
            }
            part.moulding_required = config.moulding_required;
            part.clips_required = config.clips_required;
        }
        Ok(())
    }
}
