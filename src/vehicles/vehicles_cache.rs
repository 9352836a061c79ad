//! Resolution cache for raw provider responses.
//!
//! Keyed by (lookup type, normalized key, country, glass kind). Entries carry
//! their own expiry; an expired entry reads as a miss and is evicted on the
//! way out. Writes overwrite unconditionally — last writer wins, payloads for
//! the same key are expected to be identical.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use super::vehicles_model::{Country, GlassKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupType {
    VinDecode,
    PlateDecode,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub lookup_type: LookupType,
    pub lookup_key: String,
    pub country: Country,
    pub kind: GlassKind,
}

impl CacheKey {
    pub fn vin(vin: &str, country: Country, kind: GlassKind) -> Self {
        CacheKey {
            lookup_type: LookupType::VinDecode,
            lookup_key: vin.to_uppercase(),
            country,
            kind,
        }
    }

    pub fn plate(plate: &str, state: &str, country: Country, kind: GlassKind) -> Self {
        let normalized = plate.replace([' ', '-'], "").to_uppercase();
        CacheKey {
            lookup_type: LookupType::PlateDecode,
            lookup_key: format!("{}:{}", normalized, state.to_uppercase()),
            country,
            kind,
        }
    }
}

/// Trait defining the contract for the resolution cache. Implementations
/// must tolerate concurrent readers and racing writers.
pub trait ResolutionCache: Send + Sync {
    /// Returns the cached payload, treating an expired entry as a miss
    fn get(&self, key: &CacheKey) -> Option<serde_json::Value>;

    /// Stores a payload, overwriting any previous entry for the key
    fn put(&self, key: CacheKey, payload: serde_json::Value, ttl: Duration);
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: serde_json::Value,
    expires_at: DateTime<Utc>,
}

/// Concurrent in-memory cache; production deployments can substitute a
/// store-backed implementation behind the same trait.
#[derive(Default)]
pub struct InMemoryResolutionCache {
    entries: DashMap<CacheKey, CacheEntry>,
}

impl InMemoryResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ResolutionCache for InMemoryResolutionCache {
    fn get(&self, key: &CacheKey) -> Option<serde_json::Value> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > Utc::now() => {
                return Some(entry.payload.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    fn put(&self, key: CacheKey, payload: serde_json::Value, ttl: Duration) {
        self.entries.insert(
            key,
            CacheEntry {
                payload,
                expires_at: Utc::now() + ttl,
            },
        );
    }
}
