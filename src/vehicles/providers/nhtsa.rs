//! NHTSA vPIC client, the free fallback VIN decoder.
//!
//! Returns year/make/model only; parts come from the catalog afterwards.
//! Results start at medium confidence since calibration data is unavailable
//! on this path.

use std::time::Duration as StdDuration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

use crate::constants::NHTSA_TIMEOUT_SECS;
use crate::vehicles::providers::vehicle_data_provider::VinDecodeProvider;
use crate::vehicles::vehicles_errors::ProviderError;
use crate::vehicles::vehicles_model::{Confidence, Provenance, ReviewReason, VehicleLookupResult};

const DEFAULT_BASE_URL: &str = "https://vpic.nhtsa.dot.gov/api/vehicles";

pub struct NhtsaClient {
    http: Client,
    base_url: String,
}

impl Default for NhtsaClient {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl NhtsaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(StdDuration::from_secs(NHTSA_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        NhtsaClient {
            http,
            base_url: base_url.into(),
        }
    }

    fn parse_decode(vin: &str, record: &Value) -> Result<VehicleLookupResult, ProviderError> {
        // Error code 6 means the VIN failed vPIC's own validation
        let error_code = record["ErrorCode"].as_str().unwrap_or_default();
        if error_code.split(',').any(|code| code.trim() == "6") {
            return Err(ProviderError::NotFound(format!(
                "NHTSA could not decode VIN: {}",
                vin
            )));
        }

        let year = record["ModelYear"]
            .as_str()
            .and_then(|y| y.parse::<i32>().ok())
            .unwrap_or(0);
        let make = record["Make"].as_str().unwrap_or_default();
        let model = record["Model"].as_str().unwrap_or_default();

        let mut result = VehicleLookupResult::new(Provenance::NhtsaNags, vin, year, make, model);
        result.body_style = non_empty(&record["BodyClass"]).or_else(|| non_empty(&record["VehicleType"]));
        result.trim = non_empty(&record["Trim"]).or_else(|| non_empty(&record["Series"]));
        result.confidence = Confidence::Medium;
        result.raw_response = record.clone();

        if year == 0 || result.make.is_empty() || result.model.is_empty() {
            result.needs_manual_review = true;
            result.confidence = Confidence::Low;
            result.add_review_reason(ReviewReason::IncompleteVehicleData {
                year,
                make: result.make.clone(),
                model: result.model.clone(),
            });
        }
        Ok(result)
    }
}

fn non_empty(value: &Value) -> Option<String> {
    value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

#[async_trait]
impl VinDecodeProvider for NhtsaClient {
    fn name(&self) -> &'static str {
        "nhtsa"
    }

    async fn decode_vin(&self, vin: &str) -> Result<VehicleLookupResult, ProviderError> {
        let vin = vin.to_uppercase();
        let url = format!("{}/DecodeVinValues/{}?format=json", self.base_url, vin);
        debug!("NHTSA decode for VIN {}", vin);

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::InvalidResponse(format!(
                "request failed with status {}",
                response.status().as_u16()
            )));
        }
        let body = response
            .json::<Value>()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let record = body["Results"]
            .as_array()
            .and_then(|r| r.first())
            .ok_or_else(|| ProviderError::InvalidResponse("empty Results array".to_string()))?;
        Self::parse_decode(&vin, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_complete_record() {
        let record = json!({
            "ErrorCode": "0",
            "ModelYear": "2003",
            "Make": "HONDA",
            "Model": "Accord",
            "BodyClass": "Sedan/Saloon",
            "Trim": "EX"
        });
        let result = NhtsaClient::parse_decode("1HGCM82633A004352", &record).unwrap();
        assert_eq!(result.year, 2003);
        assert_eq!(result.make, "HONDA");
        assert_eq!(result.model, "Accord");
        assert_eq!(result.body_style.as_deref(), Some("Sedan/Saloon"));
        assert_eq!(result.confidence, Confidence::Medium);
        assert!(!result.needs_manual_review);
    }

    #[test]
    fn incomplete_record_flags_manual_review() {
        let record = json!({
            "ErrorCode": "0",
            "ModelYear": "",
            "Make": "HONDA",
            "Model": ""
        });
        let result = NhtsaClient::parse_decode("1HGCM82633A004352", &record).unwrap();
        assert!(result.needs_manual_review);
        assert_eq!(result.confidence, Confidence::Low);
        assert!(result
            .review_reasons
            .iter()
            .any(|r| matches!(r, ReviewReason::IncompleteVehicleData { .. })));
    }

    #[test]
    fn invalid_vin_error_code_is_not_found() {
        let record = json!({ "ErrorCode": "6", "ModelYear": "2020" });
        let err = NhtsaClient::parse_decode("BADVIN", &record).unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
    }

    #[test]
    fn body_class_falls_back_to_vehicle_type() {
        let record = json!({
            "ErrorCode": "0",
            "ModelYear": "2021",
            "Make": "FORD",
            "Model": "F-150",
            "BodyClass": "",
            "VehicleType": "TRUCK",
            "Series": "XLT"
        });
        let result = NhtsaClient::parse_decode("VIN", &record).unwrap();
        assert_eq!(result.body_style.as_deref(), Some("TRUCK"));
        assert_eq!(result.trim.as_deref(), Some("XLT"));
    }
}
