pub(crate) mod pricing_errors;
pub(crate) mod pricing_model;
pub(crate) mod pricing_service;
pub(crate) mod pricing_traits;

pub use pricing_errors::PricingError;
pub use pricing_model::{
    CalibrationType, ChipRepairPricing, GlassCategory, LaborMode, LineItem, LineItemType,
    PriceBounds, PricingProfile, QuotePricing, ServiceType,
};
pub use pricing_service::PricingService;
pub use pricing_traits::{PricingProfileRepositoryTrait, PricingServiceTrait};
