//! Autobolt API client with per-request digest authentication.
//!
//! The primary vehicle data source: VIN decode, plate-to-VIN, and parts with
//! calibration data (but no authoritative list price). Every successful
//! response is cached to avoid repeat paid calls.
//!
//! Auth header: `AutoBoltAuth version="1", timestamp=..., digest=...,
//! nonce=..., userid=...` where digest = base64(sha256(nonce + timestamp +
//! shared secret)), regenerated for every call.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{Duration, Utc};
use log::{debug, info, warn};
use reqwest::Client;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::constants::{AUTOBOLT_TIMEOUT_SECS, DEFAULT_CACHE_TTL_DAYS};
use crate::vehicles::providers::vehicle_data_provider::VehicleDataProvider;
use crate::vehicles::vehicles_cache::{CacheKey, ResolutionCache};
use crate::vehicles::vehicles_errors::ProviderError;
use crate::vehicles::vehicles_model::{
    Country, GlassKind, GlassPart, PartSource, Provenance, VehicleLookupResult,
};

const DEFAULT_BASE_URL: &str = "https://api.myautobolt.com";

#[derive(Debug, Clone)]
pub struct AutoboltConfig {
    pub base_url: String,
    pub user_id: String,
    pub shared_secret: String,
    pub cache_ttl: Duration,
}

impl Default for AutoboltConfig {
    fn default() -> Self {
        AutoboltConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_id: String::new(),
            shared_secret: String::new(),
            cache_ttl: Duration::days(DEFAULT_CACHE_TTL_DAYS),
        }
    }
}

pub struct AutoboltClient {
    http: Client,
    config: AutoboltConfig,
    cache: Arc<dyn ResolutionCache>,
}

fn generate_nonce() -> String {
    Uuid::new_v4().simple().to_string()[..20].to_string()
}

fn auth_digest(nonce: &str, timestamp: i64, shared_secret: &str) -> String {
    let unhashed = format!("{}{}{}", nonce, timestamp, shared_secret);
    BASE64.encode(Sha256::digest(unhashed.as_bytes()))
}

impl AutoboltClient {
    pub fn new(config: AutoboltConfig, cache: Arc<dyn ResolutionCache>) -> Self {
        if config.user_id.is_empty() || config.shared_secret.is_empty() {
            warn!("Autobolt credentials not configured; lookups will fail authentication");
        }
        let http = Client::builder()
            .timeout(StdDuration::from_secs(AUTOBOLT_TIMEOUT_SECS))
            .build()
            .expect("Failed to create HTTP client");
        AutoboltClient { http, config, cache }
    }

    fn auth_header(&self) -> String {
        let timestamp = Utc::now().timestamp();
        let nonce = generate_nonce();
        let digest = auth_digest(&nonce, timestamp, &self.config.shared_secret);
        format!(
            "AutoBoltAuth version=\"1\", timestamp={}, digest=\"{}\", nonce=\"{}\", userid=\"{}\"",
            timestamp, digest, nonce, self.config.user_id
        )
    }

    /// POSTs to a decode endpoint. `Ok(None)` means the vehicle was not
    /// found (204) or the input failed provider-side validation (422).
    async fn post_decode(
        &self,
        endpoint: &str,
        payload: &Value,
    ) -> Result<Option<Value>, ProviderError> {
        let url = format!("{}{}", self.config.base_url, endpoint);
        let response = self
            .http
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(payload)
            .send()
            .await?;

        match response.status().as_u16() {
            200 => {
                let data = response
                    .json::<Value>()
                    .await
                    .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
                Ok(Some(data))
            }
            204 => {
                info!("Autobolt returned 204 for {}", endpoint);
                Ok(None)
            }
            401 => Err(ProviderError::AuthFailed(
                "check Autobolt API credentials".to_string(),
            )),
            422 => {
                warn!("Autobolt validation error for {}", endpoint);
                Ok(None)
            }
            429 => Err(ProviderError::RateLimited),
            status => Err(ProviderError::InvalidResponse(format!(
                "request failed with status {}",
                status
            ))),
        }
    }

    /// Parses the `parts` / `partsById` sections of a decode response.
    fn parse_parts(data: &Value, source: PartSource) -> Vec<GlassPart> {
        let part_ids = data["parts"].as_array().cloned().unwrap_or_default();
        let parts_by_id = &data["partsById"];

        let mut parts = Vec::new();
        for part_id in part_ids {
            let Some(id) = part_id.as_str() else { continue };
            let part_data = &parts_by_id[id];
            if part_data.is_null() {
                continue;
            }

            // A part may carry multiple calibrations; two or more means dual
            let cal_names: Vec<&str> = part_data["calibrations"]
                .as_array()
                .map(|cals| {
                    cals.iter()
                        .filter_map(|c| c["calibrationType"]["name"].as_str())
                        .collect()
                })
                .unwrap_or_default();
            let calibration_type = match cal_names.len() {
                0 => None,
                1 => Some(cal_names[0].to_string()),
                _ => Some(format!("Dual: {}", cal_names.join(" + "))),
            };

            let features: Vec<String> = part_data["features"]
                .as_array()
                .map(|fs| {
                    fs.iter()
                        .filter_map(|f| f["name"].as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();

            // amNumber is the variant-qualified number, e.g. "FW05555GTYN";
            // the base part number is its first 7 characters
            let full_part_number = part_data["amNumber"].as_str().unwrap_or_default();
            if full_part_number.is_empty() {
                continue;
            }
            // Character truncation; amNumber is not guaranteed ASCII
            let base: String = full_part_number.chars().take(7).collect();

            let photo_urls: Vec<String> = ["photoUrls", "photos", "images", "imageUrls"]
                .iter()
                .find_map(|key| part_data[*key].as_array())
                .map(|urls| {
                    urls.iter()
                        .filter_map(|u| u.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();

            let mut part = GlassPart::new(base, source);
            part.full_part_number = Some(full_part_number.to_string());
            part.calibration_type = calibration_type;
            part.features = features;
            part.photo_urls = photo_urls;
            parts.push(part);
        }
        parts
    }

    fn parse_response(data: Value, vin_hint: Option<&str>, provenance: Provenance) -> VehicleLookupResult {
        let source = match provenance {
            Provenance::Cache => PartSource::Cache,
            _ => PartSource::Autobolt,
        };
        let vin = data["vin"]
            .as_str()
            .map(str::to_string)
            .or_else(|| vin_hint.map(str::to_string))
            .unwrap_or_default();

        let mut result = VehicleLookupResult::new(
            provenance,
            vin,
            data["year"].as_i64().unwrap_or(0) as i32,
            data["make"].as_str().unwrap_or_default(),
            data["model"].as_str().unwrap_or_default(),
        );
        result.body_style = data["bodyStyle"].as_str().map(str::to_string);
        result.trim = data["trim"].as_str().map(str::to_string);
        result.parts = Self::parse_parts(&data, source);
        result.raw_response = data;
        result.derive_flags();
        result
    }
}

#[async_trait]
impl VehicleDataProvider for AutoboltClient {
    fn name(&self) -> &'static str {
        "autobolt"
    }

    async fn decode_vin(
        &self,
        vin: &str,
        kind: GlassKind,
        country: Country,
    ) -> Result<VehicleLookupResult, ProviderError> {
        let vin = vin.to_uppercase();
        let key = CacheKey::vin(&vin, country, kind);

        if let Some(cached) = self.cache.get(&key) {
            info!("Cache hit for VIN {}", vin);
            return Ok(Self::parse_response(cached, Some(vin.as_str()), Provenance::Cache));
        }

        let payload = json!({
            "country": country.as_str(),
            "vin": vin,
            "kind": kind.as_str(),
        });
        let data = self
            .post_decode("/v2/decode", &payload)
            .await?
            .ok_or_else(|| ProviderError::NotFound(format!("Vehicle not found for VIN: {}", vin)))?;

        self.cache.put(key, data.clone(), self.config.cache_ttl);
        debug!("Autobolt VIN decode succeeded for {}", vin);
        Ok(Self::parse_response(data, Some(vin.as_str()), Provenance::Autobolt))
    }

    async fn decode_plate(
        &self,
        plate: &str,
        state: &str,
        kind: GlassKind,
        country: Country,
    ) -> Result<VehicleLookupResult, ProviderError> {
        let plate_clean = plate.replace([' ', '-'], "").to_uppercase();
        let state_upper = state.to_uppercase();
        let key = CacheKey::plate(&plate_clean, &state_upper, country, kind);

        if let Some(cached) = self.cache.get(&key) {
            info!("Cache hit for plate {}", plate_clean);
            return Ok(Self::parse_response(cached, None, Provenance::Cache));
        }

        let payload = json!({
            "country": country.as_str(),
            "plate": { "number": plate_clean, "state": state_upper },
            "kind": kind.as_str(),
        });
        let data = self.post_decode("/v2/decode-plate", &payload).await?.ok_or_else(|| {
            ProviderError::NotFound(format!("Vehicle not found for plate: {} ({})", plate, state))
        })?;

        self.cache.put(key, data.clone(), self.config.cache_ttl);
        Ok(Self::parse_response(data, None, Provenance::Autobolt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicles::vehicles_cache::InMemoryResolutionCache;
    use serde_json::json;

    fn sample_decode_payload() -> Value {
        json!({
            "vin": "1HGCM82633A004352",
            "year": 2022,
            "make": "Honda",
            "model": "CR-V",
            "bodyStyle": "SUV",
            "parts": ["p1", "p2"],
            "partsById": {
                "p1": {
                    "amNumber": "FW05555GTYN",
                    "calibrations": [
                        {"calibrationType": {"name": "Dynamic"}}
                    ],
                    "features": [{"name": "Rain Sensor"}, {"name": "Heated"}],
                    "photoUrls": ["https://img.example/fw05555.jpg"]
                },
                "p2": {
                    "amNumber": "FW05556GBYN",
                    "calibrations": [
                        {"calibrationType": {"name": "Static"}},
                        {"calibrationType": {"name": "Dynamic"}}
                    ],
                    "features": []
                }
            }
        })
    }

    #[test]
    fn digest_is_stable_for_fixed_inputs() {
        let a = auth_digest("nonce12345", 1_700_000_000, "secret");
        let b = auth_digest("nonce12345", 1_700_000_000, "secret");
        assert_eq!(a, b);
        // base64 of a 32-byte sha256 digest
        assert_eq!(a.len(), 44);
        assert_ne!(a, auth_digest("othernonce", 1_700_000_000, "secret"));
    }

    #[test]
    fn parse_parts_extracts_calibration_and_part_numbers() {
        let parts = AutoboltClient::parse_parts(&sample_decode_payload(), PartSource::Autobolt);
        assert_eq!(parts.len(), 2);

        assert_eq!(parts[0].part_number, "FW05555");
        assert_eq!(parts[0].full_part_number.as_deref(), Some("FW05555GTYN"));
        assert_eq!(parts[0].prefix_cd, "FW");
        assert_eq!(parts[0].calibration_type.as_deref(), Some("Dynamic"));
        assert_eq!(parts[0].features, vec!["Rain Sensor", "Heated"]);
        assert_eq!(parts[0].photo_urls.len(), 1);

        // Two calibrations collapse into a dual label
        assert_eq!(
            parts[1].calibration_type.as_deref(),
            Some("Dual: Static + Dynamic")
        );
    }

    #[test]
    fn parse_response_derives_part_selection_flag() {
        let result = AutoboltClient::parse_response(
            sample_decode_payload(),
            None,
            Provenance::Autobolt,
        );
        assert_eq!(result.vin, "1HGCM82633A004352");
        assert_eq!(result.year, 2022);
        assert!(result.needs_part_selection);
        assert!(!result.needs_calibration_review);
    }

    #[test]
    fn parse_parts_truncates_non_ascii_part_numbers_by_character() {
        let payload = json!({
            "parts": ["p1"],
            "partsById": {
                "p1": { "amNumber": "FW055№88GTYN" }
            }
        });
        let parts = AutoboltClient::parse_parts(&payload, PartSource::Autobolt);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].part_number, "FW055№8");
        assert_eq!(parts[0].full_part_number.as_deref(), Some("FW055№88GTYN"));
        assert_eq!(parts[0].prefix_cd, "FW");
    }

    #[tokio::test]
    async fn decode_vin_replays_cached_payload_without_network() {
        let cache = Arc::new(InMemoryResolutionCache::new());
        let key = CacheKey::vin("1HGCM82633A004352", Country::Us, GlassKind::Windshield);
        cache.put(key, sample_decode_payload(), Duration::days(30));

        let client = AutoboltClient::new(AutoboltConfig::default(), cache);
        let result = client
            .decode_vin("1hgcm82633a004352", GlassKind::Windshield, Country::Us)
            .await
            .unwrap();

        assert_eq!(result.provenance, Provenance::Cache);
        assert_eq!(result.parts.len(), 2);
        assert_eq!(result.parts[0].source, PartSource::Cache);
    }
}
