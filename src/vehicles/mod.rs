pub(crate) mod providers;
pub(crate) mod vehicles_cache;
pub(crate) mod vehicles_errors;
pub(crate) mod vehicles_model;
pub(crate) mod vehicles_service;
pub(crate) mod vehicles_traits;

pub use providers::{
    AutoboltClient, AutoboltConfig, GlassConfigRecord, GlassRecord, NagsClient, NagsRecords,
    NhtsaClient, PartsCatalog, VehicleDataProvider, VehicleGlassRecord, VinDecodeProvider,
};
pub use vehicles_cache::{CacheKey, InMemoryResolutionCache, LookupType, ResolutionCache};
pub use vehicles_errors::{LookupError, LookupErrorKind, ProviderError};
pub use vehicles_model::{
    validate_plate, validate_vin, Confidence, Country, GlassKind, GlassPart, GlassType, ListPrice,
    PartSource, Provenance, ReviewReason, VehicleLookupResult,
};
pub use vehicles_service::VehicleLookupService;
pub use vehicles_traits::VehicleLookupServiceTrait;
