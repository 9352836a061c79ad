pub(crate) mod quotes_errors;
pub(crate) mod quotes_model;
pub(crate) mod quotes_service;
pub(crate) mod quotes_traits;

pub use quotes_errors::QuoteError;
pub use quotes_model::{
    DamageType, GenerationOutcome, GenerationRequest, PaymentType, Quote, QuoteLineItem,
    QuoteState, ServiceIntent,
};
pub use quotes_service::QuoteGenerationService;
pub use quotes_traits::{
    NotificationDispatcherTrait, QuoteGenerationServiceTrait, QuoteRepositoryTrait,
};
