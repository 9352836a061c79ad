//! Shared in-memory fakes for the integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use glassquote_core::customers::{Customer, CustomerRepositoryTrait, NewCustomer};
use glassquote_core::errors::{Error, StoreError};
use glassquote_core::pricing::{
    LaborMode, LineItem, PricingError, PricingProfile, PricingProfileRepositoryTrait,
};
use glassquote_core::quotes::{NotificationDispatcherTrait, Quote, QuoteRepositoryTrait};
use glassquote_core::shops::{Shop, ShopRepositoryTrait};
use glassquote_core::vehicles::{
    Country, GlassKind, GlassPart, GlassType, ListPrice, PartSource, PartsCatalog, Provenance,
    ProviderError, VehicleDataProvider, VehicleLookupResult, VinDecodeProvider,
};

pub const VIN: &str = "1HGCM82633A004352";

/// Primary provider stub: either serves a fixed part list or fails
pub struct FakePrimary {
    pub failure: Option<ProviderError>,
    pub parts: Vec<GlassPart>,
}

impl FakePrimary {
    pub fn with_parts(parts: Vec<GlassPart>) -> Self {
        FakePrimary {
            failure: None,
            parts,
        }
    }

    pub fn failing(failure: ProviderError) -> Self {
        FakePrimary {
            failure: Some(failure),
            parts: Vec::new(),
        }
    }

    fn result(&self, vin: &str) -> Result<VehicleLookupResult, ProviderError> {
        if let Some(failure) = &self.failure {
            return Err(clone_provider_error(failure));
        }
        let mut result =
            VehicleLookupResult::new(Provenance::Autobolt, vin, 2003, "Honda", "Accord");
        result.parts = self.parts.clone();
        result.derive_flags();
        Ok(result)
    }
}

fn clone_provider_error(e: &ProviderError) -> ProviderError {
    match e {
        ProviderError::AuthFailed(m) => ProviderError::AuthFailed(m.clone()),
        ProviderError::RateLimited => ProviderError::RateLimited,
        ProviderError::NotFound(m) => ProviderError::NotFound(m.clone()),
        ProviderError::Timeout => ProviderError::Timeout,
        ProviderError::Transport(m) => ProviderError::Transport(m.clone()),
        ProviderError::InvalidResponse(m) => ProviderError::InvalidResponse(m.clone()),
    }
}

#[async_trait]
impl VehicleDataProvider for FakePrimary {
    fn name(&self) -> &'static str {
        "fake-primary"
    }

    async fn decode_vin(
        &self,
        vin: &str,
        _kind: GlassKind,
        _country: Country,
    ) -> Result<VehicleLookupResult, ProviderError> {
        self.result(vin)
    }

    async fn decode_plate(
        &self,
        _plate: &str,
        _state: &str,
        _kind: GlassKind,
        _country: Country,
    ) -> Result<VehicleLookupResult, ProviderError> {
        self.result(VIN)
    }
}

/// Secondary decoder stub returning bare year/make/model
pub struct FakeSecondary;

#[async_trait]
impl VinDecodeProvider for FakeSecondary {
    fn name(&self) -> &'static str {
        "fake-secondary"
    }

    async fn decode_vin(&self, vin: &str) -> Result<VehicleLookupResult, ProviderError> {
        Ok(VehicleLookupResult::new(
            Provenance::NhtsaNags,
            vin,
            2003,
            "Honda",
            "Accord",
        ))
    }
}

/// Catalog stub serving fixed parts and price enrichment
pub struct FakeCatalog {
    pub parts: Vec<GlassPart>,
    pub prices: HashMap<String, Decimal>,
}

impl FakeCatalog {
    pub fn empty() -> Self {
        FakeCatalog {
            parts: Vec::new(),
            prices: HashMap::new(),
        }
    }
}

#[async_trait]
impl PartsCatalog for FakeCatalog {
    async fn parts_for_vehicle(
        &self,
        _year: i32,
        _make: &str,
        _model: &str,
        _glass_type: GlassType,
    ) -> Result<Vec<GlassPart>, ProviderError> {
        Ok(self.parts.clone())
    }

    async fn enrich_part(&self, part: &mut GlassPart) -> Result<(), ProviderError> {
        if part.list_price.is_unpriced() {
            if let Some(price) = self.prices.get(&part.part_number) {
                part.list_price = ListPrice::Priced(*price);
            }
        }
        Ok(())
    }
}

pub fn priced_part(part_number: &str, list_price: Decimal) -> GlassPart {
    let mut part = GlassPart::new(part_number, PartSource::Autobolt);
    part.list_price = ListPrice::Priced(list_price);
    part
}

/// Profile store with one profile shared by every shop
pub struct FixedProfiles(pub PricingProfile);

#[async_trait]
impl PricingProfileRepositoryTrait for FixedProfiles {
    async fn get_pricing_profile(
        &self,
        _shop_id: &str,
        _default_only: bool,
    ) -> Result<Option<PricingProfile>, PricingError> {
        Ok(Some(self.0.clone()))
    }
}

/// The standard test rate card: 20% discount, $150 flat labor, $15 kit
pub fn test_profile() -> PricingProfile {
    PricingProfile {
        discount_dw: dec!(20.00),
        discount_dt: dec!(20.00),
        discount_fw: dec!(20.00),
        discount_ft: dec!(20.00),
        labor_mode: LaborMode::Flat,
        labor_flat_rate: dec!(150.00),
        kit_fee_1h: dec!(15.00),
        kit_fee_1_5h: dec!(15.00),
        kit_fee_2h: dec!(15.00),
        kit_fee_2_5h: dec!(15.00),
        kit_fee_3h_plus: dec!(15.00),
        ..Default::default()
    }
}

#[derive(Default)]
pub struct InMemoryCustomers {
    pub records: Mutex<HashMap<String, Customer>>,
}

#[async_trait]
impl CustomerRepositoryTrait for InMemoryCustomers {
    async fn create_or_get(&self, email: &str, defaults: NewCustomer) -> Result<Customer, Error> {
        let mut records = self.records.lock().unwrap();
        if let Some(existing) = records.get(email) {
            return Ok(existing.clone());
        }
        let customer = Customer {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            first_name: defaults.first_name,
            last_name: defaults.last_name,
            phone: defaults.phone,
            created_at: Utc::now(),
        };
        records.insert(email.to_string(), customer.clone());
        Ok(customer)
    }
}

pub struct InMemoryShops {
    pub shops: HashMap<String, Shop>,
}

impl InMemoryShops {
    pub fn with_shop(shop_id: &str) -> Self {
        let mut shops = HashMap::new();
        shops.insert(
            shop_id.to_string(),
            Shop {
                id: shop_id.to_string(),
                name: "Test Glass Shop".to_string(),
                postal_code: "78701".to_string(),
                is_active: true,
            },
        );
        InMemoryShops { shops }
    }
}

#[async_trait]
impl ShopRepositoryTrait for InMemoryShops {
    async fn get_shop(&self, shop_id: &str) -> Result<Shop, Error> {
        self.shops
            .get(shop_id)
            .cloned()
            .ok_or_else(|| Error::Store(StoreError::NotFound(format!("shop {}", shop_id))))
    }
}

#[derive(Default)]
pub struct InMemoryQuotes {
    pub quotes: Mutex<HashMap<Uuid, Quote>>,
    pub line_items: Mutex<Vec<(Uuid, LineItem)>>,
}

impl InMemoryQuotes {
    pub fn get(&self, quote_id: Uuid) -> Option<Quote> {
        self.quotes.lock().unwrap().get(&quote_id).cloned()
    }

    pub fn line_items_for(&self, quote_id: Uuid) -> Vec<LineItem> {
        self.line_items
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == quote_id)
            .map(|(_, item)| item.clone())
            .collect()
    }
}

#[async_trait]
impl QuoteRepositoryTrait for InMemoryQuotes {
    async fn create_quote(&self, quote: &Quote) -> Result<(), Error> {
        self.quotes.lock().unwrap().insert(quote.id, quote.clone());
        Ok(())
    }

    async fn create_line_item(&self, quote_id: Uuid, item: &LineItem) -> Result<(), Error> {
        self.line_items
            .lock()
            .unwrap()
            .push((quote_id, item.clone()));
        Ok(())
    }

    async fn update_quote(&self, quote: &Quote) -> Result<(), Error> {
        self.quotes.lock().unwrap().insert(quote.id, quote.clone());
        Ok(())
    }

    async fn get_quote(&self, quote_id: Uuid) -> Result<Quote, Error> {
        self.get(quote_id)
            .ok_or_else(|| Error::Store(StoreError::NotFound(format!("quote {}", quote_id))))
    }

    async fn find_expirable(&self, now: DateTime<Utc>) -> Result<Vec<Quote>, Error> {
        Ok(self
            .quotes
            .lock()
            .unwrap()
            .values()
            .filter(|q| !q.state.is_terminal())
            .filter(|q| q.expires_at.is_some_and(|at| at <= now))
            .cloned()
            .collect())
    }
}

/// Records which notification was sent for each quote
#[derive(Default)]
pub struct RecordingNotifications {
    pub sent: Mutex<Vec<(Uuid, &'static str)>>,
}

impl RecordingNotifications {
    pub fn kinds_for(&self, quote_id: Uuid) -> Vec<&'static str> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| *id == quote_id)
            .map(|(_, kind)| *kind)
            .collect()
    }

    fn record(&self, quote: &Quote, kind: &'static str) -> Result<(), Error> {
        self.sent.lock().unwrap().push((quote.id, kind));
        Ok(())
    }
}

#[async_trait]
impl NotificationDispatcherTrait for RecordingNotifications {
    async fn send_quote_ready(&self, quote: &Quote) -> Result<(), Error> {
        self.record(quote, "quote_ready")
    }

    async fn send_pending_review(&self, quote: &Quote) -> Result<(), Error> {
        self.record(quote, "pending_review")
    }

    async fn send_rejection(&self, quote: &Quote) -> Result<(), Error> {
        self.record(quote, "rejection")
    }

    async fn send_approval_confirmation(&self, quote: &Quote) -> Result<(), Error> {
        self.record(quote, "approval_confirmation")
    }
}
