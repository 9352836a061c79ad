//! Quote generation pipeline.
//!
//! One request runs identification, resolution, pricing and persistence in
//! sequence. Every failure is converted into a [`GenerationOutcome::Failed`]
//! carrying a retryable flag, so the caller can decide between requeue and
//! surfacing the error. Notification delivery is fire-and-forget: a failed
//! email never fails the quote.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{error, info, warn};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::quotes_model::{
    DamageType, GenerationOutcome, GenerationRequest, Quote, QuoteState, ServiceIntent,
};
use super::quotes_traits::{
    NotificationDispatcherTrait, QuoteGenerationServiceTrait, QuoteRepositoryTrait,
};
use crate::constants::QUOTE_EXPIRATION_DAYS;
use crate::customers::{Customer, CustomerRepositoryTrait};
use crate::errors::{Error, Result, StoreError};
use crate::pricing::{ChipRepairPricing, PricingServiceTrait, QuotePricing};
use crate::shops::ShopRepositoryTrait;
use crate::vehicles::vehicles_model::{GlassType, ReviewReason, VehicleLookupResult};
use crate::vehicles::VehicleLookupServiceTrait;

pub struct QuoteGenerationService {
    lookups: Arc<dyn VehicleLookupServiceTrait>,
    pricing: Arc<dyn PricingServiceTrait>,
    customers: Arc<dyn CustomerRepositoryTrait>,
    shops: Arc<dyn ShopRepositoryTrait>,
    quotes: Arc<dyn QuoteRepositoryTrait>,
    notifications: Arc<dyn NotificationDispatcherTrait>,
    expiration_days: i64,
}

impl QuoteGenerationService {
    pub fn new(
        lookups: Arc<dyn VehicleLookupServiceTrait>,
        pricing: Arc<dyn PricingServiceTrait>,
        customers: Arc<dyn CustomerRepositoryTrait>,
        shops: Arc<dyn ShopRepositoryTrait>,
        quotes: Arc<dyn QuoteRepositoryTrait>,
        notifications: Arc<dyn NotificationDispatcherTrait>,
    ) -> Self {
        QuoteGenerationService {
            lookups,
            pricing,
            customers,
            shops,
            quotes,
            notifications,
            expiration_days: QUOTE_EXPIRATION_DAYS,
        }
    }

    fn failed(error: impl std::fmt::Display, retryable: bool) -> GenerationOutcome {
        GenerationOutcome::Failed {
            error: error.to_string(),
            retryable,
        }
    }

    fn store_failure(err: &Error) -> GenerationOutcome {
        let retryable = matches!(err, Error::Store(StoreError::Backend(_)));
        Self::failed(err, retryable)
    }

    fn base_quote(&self, request: &GenerationRequest, customer: &Customer) -> Quote {
        let now = Utc::now();
        Quote {
            id: Uuid::new_v4(),
            customer_id: customer.id.clone(),
            shop_id: request.shop_id.clone(),
            vin: request.vin.clone(),
            vehicle_year: None,
            vehicle_make: None,
            vehicle_model: None,
            postal_code: request.postal_code.clone(),
            glass_type: request.glass_type,
            damage_type: request.damage_type,
            service_type: request.service_type,
            service_address: request.service_address.clone(),
            distance_miles: request.distance_miles,
            payment_type: request.payment_type,
            pricing_details: serde_json::Value::Null,
            part_cost: Decimal::ZERO,
            labor_cost: Decimal::ZERO,
            total_price: Decimal::ZERO,
            state: QuoteState::Draft,
            rejection_reason: None,
            created_at: now,
            expires_at: Some(now + Duration::days(self.expiration_days)),
        }
    }

    async fn resolve_vehicle(
        &self,
        request: &GenerationRequest,
        glass_type: GlassType,
    ) -> std::result::Result<VehicleLookupResult, GenerationOutcome> {
        if let Some(vin) = &request.vin {
            return self
                .lookups
                .resolve_by_vin(vin, glass_type)
                .await
                .map_err(|e| Self::failed(&e, e.recoverable));
        }
        if let (Some(plate), Some(state)) = (&request.plate, &request.plate_state) {
            return self
                .lookups
                .resolve_by_plate(plate, state, glass_type)
                .await
                .map_err(|e| Self::failed(&e, e.recoverable));
        }
        Err(Self::failed(
            "No vehicle identification provided (VIN or plate required)",
            false,
        ))
    }

    async fn persist_line_items(&self, quote: &Quote, items: &[crate::pricing::LineItem]) {
        for item in items {
            if let Err(e) = self.quotes.create_line_item(quote.id, item).await {
                warn!("Failed to persist line item for quote {}: {}", quote.id, e);
            }
        }
    }

    async fn notify_outcome(&self, quote: &Quote, needs_review: bool) {
        let sent = if needs_review {
            self.notifications.send_pending_review(quote).await
        } else {
            self.notifications.send_quote_ready(quote).await
        };
        if let Err(e) = sent {
            warn!("Notification delivery failed for quote {}: {}", quote.id, e);
        }
    }

    async fn generate_replacement(
        &self,
        request: &GenerationRequest,
        customer: &Customer,
    ) -> GenerationOutcome {
        let glass_type = request.glass_type.unwrap_or(GlassType::Windshield);

        let mut lookup = match self.resolve_vehicle(request, glass_type).await {
            Ok(lookup) => lookup,
            Err(outcome) => return outcome,
        };

        if let Some(part_number) = &request.preselected_part_number {
            if !lookup.select_part(part_number) {
                warn!(
                    "Pre-selected part {} not among candidates, keeping full list",
                    part_number
                );
            }
        }

        let pricing: QuotePricing = match self
            .pricing
            .calculate_quote(
                &lookup,
                &request.shop_id,
                glass_type,
                request.service_type,
                request.distance_miles,
            )
            .await
        {
            Ok(pricing) => pricing,
            Err(e) => return Self::failed(&e, false),
        };

        let mut quote = self.base_quote(request, customer);
        quote.vin = (!lookup.vin.is_empty()).then(|| lookup.vin.clone());
        quote.vehicle_year = (lookup.year > 0).then_some(lookup.year);
        quote.vehicle_make = (!lookup.make.is_empty()).then(|| lookup.make.clone());
        quote.vehicle_model = (!lookup.model.is_empty()).then(|| lookup.model.clone());
        quote.part_cost = pricing.glass_cost;
        quote.labor_cost = pricing.labor_cost;
        quote.total_price = pricing.total;
        quote.pricing_details = match serde_json::to_value(&pricing) {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to serialize pricing breakdown: {}", e);
                serde_json::Value::Null
            }
        };

        let needs_review = pricing.needs_review();
        if let Err(e) = quote.submit_for_validation() {
            return Self::failed(&e, false);
        }
        if !needs_review {
            if let Err(e) = quote.send_to_customer() {
                return Self::failed(&e, false);
            }
        }

        if let Err(e) = self.quotes.create_quote(&quote).await {
            return Self::store_failure(&e);
        }
        self.persist_line_items(&quote, &pricing.line_items).await;
        self.notify_outcome(&quote, needs_review).await;

        info!(
            "Replacement quote {} generated: total {}, needs_review {}",
            quote.id, quote.total_price, needs_review
        );
        GenerationOutcome::Completed {
            quote_id: quote.id,
            total_price: quote.total_price,
            needs_review,
            review_summary: pricing.review_summary(),
        }
    }

    async fn generate_chip_repair(
        &self,
        request: &GenerationRequest,
        customer: &Customer,
    ) -> GenerationOutcome {
        let chip_count = request.chip_count.unwrap_or(1);
        let pricing: ChipRepairPricing = match self
            .pricing
            .calculate_chip_repair(
                chip_count,
                &request.shop_id,
                request.service_type,
                request.distance_miles,
            )
            .await
        {
            Ok(pricing) => pricing,
            Err(e) => return Self::failed(&e, false),
        };

        let mut quote = self.base_quote(request, customer);
        quote.damage_type = DamageType::Chip;
        quote.total_price = pricing.total;
        quote.pricing_details = serde_json::to_value(&pricing).unwrap_or(serde_json::Value::Null);

        // Chip repairs are flat-rate and never held for review, but they
        // walk the same state sequence as replacements
        if let Err(e) = quote.submit_for_validation() {
            return Self::failed(&e, false);
        }
        if let Err(e) = quote.send_to_customer() {
            return Self::failed(&e, false);
        }
        if let Err(e) = self.quotes.create_quote(&quote).await {
            return Self::store_failure(&e);
        }
        self.persist_line_items(&quote, &pricing.line_items).await;
        self.notify_outcome(&quote, false).await;

        GenerationOutcome::Completed {
            quote_id: quote.id,
            total_price: quote.total_price,
            needs_review: false,
            review_summary: None,
        }
    }

    async fn generate_manual(
        &self,
        request: &GenerationRequest,
        customer: &Customer,
    ) -> GenerationOutcome {
        let mut quote = self.base_quote(request, customer);
        if let Err(e) = quote.submit_for_validation() {
            return Self::failed(&e, false);
        }
        if let Err(e) = self.quotes.create_quote(&quote).await {
            return Self::store_failure(&e);
        }
        self.notify_outcome(&quote, true).await;

        GenerationOutcome::Completed {
            quote_id: quote.id,
            total_price: Decimal::ZERO,
            needs_review: true,
            review_summary: Some(ReviewReason::ManualPricingRequired.to_string()),
        }
    }
}

#[async_trait]
impl QuoteGenerationServiceTrait for QuoteGenerationService {
    async fn generate(&self, request: GenerationRequest) -> GenerationOutcome {
        if let Err(e) = request.customer.validate() {
            return Self::failed(&e, false);
        }
        if let Err(e) = self.shops.get_shop(&request.shop_id).await {
            return Self::store_failure(&e);
        }
        let customer = match self
            .customers
            .create_or_get(&request.customer.email, request.customer.clone())
            .await
        {
            Ok(customer) => customer,
            Err(e) => return Self::store_failure(&e),
        };

        match request.intent {
            ServiceIntent::Replacement => self.generate_replacement(&request, &customer).await,
            ServiceIntent::ChipRepair => self.generate_chip_repair(&request, &customer).await,
            ServiceIntent::Other => self.generate_manual(&request, &customer).await,
        }
    }

    async fn expire_stale_quotes(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut expired = 0;
        for mut quote in self.quotes.find_expirable(now).await? {
            match quote.expire() {
                Ok(()) => {
                    self.quotes.update_quote(&quote).await?;
                    expired += 1;
                }
                Err(e) => warn!("Skipping quote {} during expiry sweep: {}", quote.id, e),
            }
        }
        if expired > 0 {
            info!("Expired {} stale quote(s)", expired);
        }
        Ok(expired)
    }

    async fn reject_quote(&self, quote_id: Uuid, reason: &str) -> Result<Quote> {
        let mut quote = self.quotes.get_quote(quote_id).await?;
        quote.reject(reason)?;
        self.quotes.update_quote(&quote).await?;
        if let Err(e) = self.notifications.send_rejection(&quote).await {
            warn!("Rejection notification failed for quote {}: {}", quote.id, e);
        }
        Ok(quote)
    }

    async fn release_quote(&self, quote_id: Uuid) -> Result<Quote> {
        let mut quote = self.quotes.get_quote(quote_id).await?;
        quote.send_to_customer()?;
        self.quotes.update_quote(&quote).await?;
        if let Err(e) = self.notifications.send_quote_ready(&quote).await {
            warn!("Quote-ready notification failed for quote {}: {}", quote.id, e);
        }
        Ok(quote)
    }

    async fn approve_quote(&self, quote_id: Uuid) -> Result<Quote> {
        let mut quote = self.quotes.get_quote(quote_id).await?;
        quote.approve()?;
        self.quotes.update_quote(&quote).await?;
        if let Err(e) = self.notifications.send_approval_confirmation(&quote).await {
            warn!("Approval notification failed for quote {}: {}", quote.id, e);
        }
        Ok(quote)
    }
}
