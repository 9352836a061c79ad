//! Pricing domain model: per-shop pricing profiles and the calculated
//! quote breakdown.

use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::constants::{MOBILE_BASE_RANGE_MILES, REPLACEMENT_PRICE_MAX, REPLACEMENT_PRICE_MIN};
use crate::vehicles::vehicles_model::{Confidence, ReviewReason};

/// NAGS part category derived from the part-number prefix. The mapping is
/// total; unknown prefixes price as domestic windshields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlassCategory {
    DomesticWindshield,
    DomesticTempered,
    ForeignWindshield,
    ForeignTempered,
    Oem,
}

impl GlassCategory {
    pub fn from_prefix(prefix: &str) -> Self {
        let prefix = prefix.to_uppercase();
        match prefix.as_str() {
            "DW" => GlassCategory::DomesticWindshield,
            "FW" => GlassCategory::ForeignWindshield,
            "OE" | "OEM" => GlassCategory::Oem,
            p if p.starts_with('D') => GlassCategory::DomesticTempered,
            p if p.starts_with('F') => GlassCategory::ForeignTempered,
            _ => GlassCategory::DomesticWindshield,
        }
    }
}

/// ADAS calibration class, recognized from free-text provider labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationType {
    Static,
    Dynamic,
    Dual,
}

impl CalibrationType {
    /// `None` when the label matches no known class; callers price
    /// unrecognized labels as dynamic.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.to_lowercase();
        if label.contains("dual") || label.contains("both") {
            Some(CalibrationType::Dual)
        } else if label.contains("dynamic") {
            Some(CalibrationType::Dynamic)
        } else if label.contains("static") {
            Some(CalibrationType::Static)
        } else {
            None
        }
    }
}

/// How installation labor is billed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LaborMode {
    /// One flat charge regardless of hours
    #[default]
    Flat,
    /// Hourly rate multiplied by the part's labor hours
    Multiplier,
}

/// Per-shop pricing configuration. Defaults mirror the standard company
/// rate card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingProfile {
    pub shop_id: String,
    pub is_default: bool,
    pub is_active: bool,

    /// Discounts off list price, percent, per glass category
    pub discount_dw: Decimal,
    pub discount_dt: Decimal,
    pub discount_fw: Decimal,
    pub discount_ft: Decimal,
    pub discount_oem: Decimal,

    pub labor_mode: LaborMode,
    pub labor_flat_rate: Decimal,
    /// Hourly labor rates per glass category, used in multiplier mode
    pub labor_rate_dw: Decimal,
    pub labor_rate_dt: Decimal,
    pub labor_rate_fw: Decimal,
    pub labor_rate_ft: Decimal,

    /// Urethane kit fees keyed by labor-hour brackets
    pub kit_fee_1h: Decimal,
    pub kit_fee_1_5h: Decimal,
    pub kit_fee_2h: Decimal,
    pub kit_fee_2_5h: Decimal,
    pub kit_fee_3h_plus: Decimal,

    /// Markup percents are carried on the rate card but not auto-applied;
    /// only the flat fees enter a quote
    pub moulding_markup_pct: Decimal,
    pub moulding_flat_fee: Decimal,
    pub hardware_markup_pct: Decimal,
    pub hardware_flat_fee: Decimal,

    /// Chip repair: first chip, second chip, each additional chip
    pub chip_first: Decimal,
    pub chip_second: Decimal,
    pub chip_additional: Decimal,

    /// Crack repair tiers, carried for completeness
    pub crack_short: Decimal,
    pub crack_long: Decimal,
    pub crack_extra: Decimal,

    pub calibration_static: Decimal,
    pub calibration_dynamic: Decimal,
    pub calibration_dual: Decimal,

    pub mobile_base_fee: Decimal,
    pub mobile_extended_base_fee: Decimal,
    pub mobile_per_mile: Decimal,
    pub mobile_max_distance: Decimal,

    /// Flat administrative fee, carried but not auto-applied
    pub admin_fee: Decimal,
}

impl Default for PricingProfile {
    fn default() -> Self {
        PricingProfile {
            shop_id: String::new(),
            is_default: true,
            is_active: true,
            discount_dw: dec!(48.00),
            discount_dt: dec!(48.00),
            discount_fw: dec!(48.00),
            discount_ft: dec!(48.00),
            discount_oem: dec!(0.00),
            labor_mode: LaborMode::Flat,
            labor_flat_rate: dec!(44.80),
            labor_rate_dw: dec!(44.80),
            labor_rate_dt: dec!(44.80),
            labor_rate_fw: dec!(44.80),
            labor_rate_ft: dec!(44.80),
            kit_fee_1h: dec!(23.00),
            kit_fee_1_5h: dec!(46.00),
            kit_fee_2h: dec!(46.00),
            kit_fee_2_5h: dec!(46.00),
            kit_fee_3h_plus: dec!(46.00),
            moulding_markup_pct: dec!(0.00),
            moulding_flat_fee: dec!(0.00),
            hardware_markup_pct: dec!(0.00),
            hardware_flat_fee: dec!(0.00),
            chip_first: dec!(49.00),
            chip_second: dec!(29.00),
            chip_additional: dec!(29.00),
            crack_short: dec!(59.00),
            crack_long: dec!(79.00),
            crack_extra: dec!(0.00),
            calibration_static: dec!(195.00),
            calibration_dynamic: dec!(295.00),
            calibration_dual: dec!(395.00),
            mobile_base_fee: dec!(49.00),
            mobile_extended_base_fee: dec!(49.00),
            mobile_per_mile: dec!(1.50),
            mobile_max_distance: dec!(60.00),
            admin_fee: dec!(0.00),
        }
    }
}

impl PricingProfile {
    pub fn glass_discount(&self, category: GlassCategory) -> Decimal {
        match category {
            GlassCategory::DomesticWindshield => self.discount_dw,
            GlassCategory::DomesticTempered => self.discount_dt,
            GlassCategory::ForeignWindshield => self.discount_fw,
            GlassCategory::ForeignTempered => self.discount_ft,
            GlassCategory::Oem => self.discount_oem,
        }
    }

    /// Discounted glass price for a part with the given category prefix
    pub fn glass_price(&self, list_price: Decimal, prefix: &str) -> Decimal {
        let discount = self.glass_discount(GlassCategory::from_prefix(prefix));
        list_price * (Decimal::ONE - discount / dec!(100))
    }

    /// Hourly labor rate for a category. OEM parts bill at the domestic
    /// windshield rate.
    pub fn labor_rate(&self, category: GlassCategory) -> Decimal {
        match category {
            GlassCategory::DomesticWindshield | GlassCategory::Oem => self.labor_rate_dw,
            GlassCategory::DomesticTempered => self.labor_rate_dt,
            GlassCategory::ForeignWindshield => self.labor_rate_fw,
            GlassCategory::ForeignTempered => self.labor_rate_ft,
        }
    }

    pub fn labor(&self, hours: Decimal, prefix: &str) -> Decimal {
        match self.labor_mode {
            LaborMode::Flat => self.labor_flat_rate,
            LaborMode::Multiplier => self.labor_rate(GlassCategory::from_prefix(prefix)) * hours,
        }
    }

    pub fn kit_fee(&self, labor_hours: Decimal) -> Decimal {
        if labor_hours <= dec!(1) {
            self.kit_fee_1h
        } else if labor_hours <= dec!(1.5) {
            self.kit_fee_1_5h
        } else if labor_hours <= dec!(2) {
            self.kit_fee_2h
        } else if labor_hours <= dec!(2.5) {
            self.kit_fee_2_5h
        } else {
            self.kit_fee_3h_plus
        }
    }

    /// Mobile service fee for a one-way distance in miles. `None` means the
    /// address is outside the serviceable area.
    pub fn mobile_fee(&self, distance: Decimal) -> Option<Decimal> {
        if distance > self.mobile_max_distance {
            None
        } else if distance <= MOBILE_BASE_RANGE_MILES {
            Some(self.mobile_base_fee)
        } else {
            Some(
                self.mobile_extended_base_fee
                    + self.mobile_per_mile * (distance - MOBILE_BASE_RANGE_MILES),
            )
        }
    }

    /// Chip repair pricing: first chip full rate, second discounted, each
    /// further chip at the additional rate. Caller validates 1..=3 chips.
    pub fn chip_repair(&self, chip_count: u32) -> Decimal {
        let mut total = self.chip_first;
        if chip_count >= 2 {
            total += self.chip_second;
        }
        if chip_count >= 3 {
            total += self.chip_additional * Decimal::from(chip_count - 2);
        }
        total
    }

    /// Calibration fee for a free-text calibration label. Unrecognized
    /// labels price as dynamic.
    pub fn calibration_fee(&self, calibration_label: &str) -> Decimal {
        let calibration_type = CalibrationType::from_label(calibration_label).unwrap_or_else(|| {
            warn!(
                "Unrecognized calibration type '{}', pricing as dynamic",
                calibration_label
            );
            CalibrationType::Dynamic
        });
        match calibration_type {
            CalibrationType::Static => self.calibration_static,
            CalibrationType::Dynamic => self.calibration_dynamic,
            CalibrationType::Dual => self.calibration_dual,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    Mobile,
    InStore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItemType {
    Part,
    Labor,
    Fee,
    Calibration,
    ChipRepair,
    Custom,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item_type: LineItemType,
    pub description: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

impl LineItem {
    pub fn new(item_type: LineItemType, description: impl Into<String>, unit_price: Decimal) -> Self {
        LineItem {
            item_type,
            description: description.into(),
            unit_price,
            quantity: 1,
            subtotal: unit_price,
        }
    }
}

/// Sanity bounds for a full replacement quote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceBounds {
    pub min: Decimal,
    pub max: Decimal,
}

impl Default for PriceBounds {
    fn default() -> Self {
        PriceBounds {
            min: REPLACEMENT_PRICE_MIN,
            max: REPLACEMENT_PRICE_MAX,
        }
    }
}

/// Full calculated breakdown for a replacement quote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotePricing {
    pub part_number: String,
    pub part_description: String,
    pub shop_id: String,

    pub glass_cost: Decimal,
    pub labor_cost: Decimal,
    pub kit_fee: Decimal,
    pub moulding_fee: Decimal,
    pub hardware_fee: Decimal,
    pub calibration_fee: Decimal,
    pub mobile_fee: Decimal,

    pub subtotal: Decimal,
    pub tax: Decimal,
    pub total: Decimal,

    pub line_items: Vec<LineItem>,

    pub needs_part_selection: bool,
    pub needs_calibration_review: bool,
    pub needs_manual_review: bool,
    pub missing_list_price: bool,
    pub price_out_of_bounds: bool,
    pub confidence: Confidence,
    pub review_reasons: Vec<ReviewReason>,
}

impl QuotePricing {
    pub fn needs_review(&self) -> bool {
        self.needs_part_selection
            || self.needs_calibration_review
            || self.needs_manual_review
            || self.missing_list_price
            || self.price_out_of_bounds
    }

    /// Flags totals outside the plausible replacement range. Idempotent.
    pub fn check_price_bounds(&mut self, bounds: PriceBounds) {
        self.price_out_of_bounds = self.total < bounds.min || self.total > bounds.max;
        self.review_reasons
            .retain(|r| !matches!(r, ReviewReason::PriceOutOfBounds { .. }));
        if self.price_out_of_bounds {
            self.review_reasons.push(ReviewReason::PriceOutOfBounds {
                total: self.total.to_string(),
                min: bounds.min.to_string(),
                max: bounds.max.to_string(),
            });
        }
    }

    /// Human-readable review summary, "; "-joined in order
    pub fn review_summary(&self) -> Option<String> {
        if self.review_reasons.is_empty() {
            return None;
        }
        Some(
            self.review_reasons
                .iter()
                .map(|r| r.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// Breakdown for a chip repair quote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChipRepairPricing {
    pub chip_count: u32,
    pub repair_cost: Decimal,
    pub mobile_fee: Decimal,
    pub total: Decimal,
    pub line_items: Vec<LineItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_from_prefix_is_total() {
        assert_eq!(GlassCategory::from_prefix("DW"), GlassCategory::DomesticWindshield);
        assert_eq!(GlassCategory::from_prefix("DB"), GlassCategory::DomesticTempered);
        assert_eq!(GlassCategory::from_prefix("dt"), GlassCategory::DomesticTempered);
        assert_eq!(GlassCategory::from_prefix("FW"), GlassCategory::ForeignWindshield);
        assert_eq!(GlassCategory::from_prefix("FT"), GlassCategory::ForeignTempered);
        assert_eq!(GlassCategory::from_prefix("OEM"), GlassCategory::Oem);
        assert_eq!(GlassCategory::from_prefix("ZZ"), GlassCategory::DomesticWindshield);
        assert_eq!(GlassCategory::from_prefix(""), GlassCategory::DomesticWindshield);
    }

    #[test]
    fn glass_price_applies_category_discount() {
        let mut profile = PricingProfile::default();
        profile.discount_dw = dec!(20.00);
        assert_eq!(profile.glass_price(dec!(400), "DW"), dec!(320.0000));
        // OEM parts are never discounted by default
        assert_eq!(profile.glass_price(dec!(400), "OE"), dec!(400.00));
    }

    #[test]
    fn kit_fee_brackets() {
        let mut profile = PricingProfile::default();
        profile.kit_fee_1h = dec!(23);
        profile.kit_fee_1_5h = dec!(30);
        profile.kit_fee_2h = dec!(35);
        profile.kit_fee_2_5h = dec!(40);
        profile.kit_fee_3h_plus = dec!(46);

        assert_eq!(profile.kit_fee(dec!(0.5)), dec!(23));
        assert_eq!(profile.kit_fee(dec!(1)), dec!(23));
        assert_eq!(profile.kit_fee(dec!(1.5)), dec!(30));
        assert_eq!(profile.kit_fee(dec!(2)), dec!(35));
        assert_eq!(profile.kit_fee(dec!(2.5)), dec!(40));
        assert_eq!(profile.kit_fee(dec!(3)), dec!(46));
        assert_eq!(profile.kit_fee(dec!(5)), dec!(46));
    }

    #[test]
    fn mobile_fee_tiers() {
        let profile = PricingProfile::default();
        // Within base range
        assert_eq!(profile.mobile_fee(dec!(10)), Some(dec!(49.00)));
        assert_eq!(profile.mobile_fee(dec!(30)), Some(dec!(49.00)));
        // Extended range adds per-mile beyond 30
        assert_eq!(profile.mobile_fee(dec!(45)), Some(dec!(71.50)));
        // Beyond max distance
        assert_eq!(profile.mobile_fee(dec!(70)), None);
    }

    #[test]
    fn chip_repair_tiering() {
        let profile = PricingProfile::default();
        assert_eq!(profile.chip_repair(1), dec!(49.00));
        assert_eq!(profile.chip_repair(2), dec!(78.00));
        assert_eq!(profile.chip_repair(3), dec!(107.00));
    }

    #[test]
    fn calibration_fee_substring_selection() {
        let profile = PricingProfile::default();
        assert_eq!(profile.calibration_fee("Static"), dec!(195.00));
        assert_eq!(profile.calibration_fee("Dynamic"), dec!(295.00));
        assert_eq!(profile.calibration_fee("Dual: Static + Dynamic"), dec!(395.00));
        assert_eq!(profile.calibration_fee("static and dynamic both"), dec!(395.00));
        // Unknown labels default to dynamic
        assert_eq!(profile.calibration_fee("Lane Keep Assist"), dec!(295.00));
    }

    #[test]
    fn labor_modes() {
        let mut profile = PricingProfile::default();
        profile.labor_flat_rate = dec!(150);
        profile.labor_rate_dw = dec!(50);

        profile.labor_mode = LaborMode::Flat;
        assert_eq!(profile.labor(dec!(2.5), "DW"), dec!(150));

        profile.labor_mode = LaborMode::Multiplier;
        assert_eq!(profile.labor(dec!(2.5), "DW"), dec!(125.0));
    }

    #[test]
    fn multiplier_labor_uses_the_part_category_rate() {
        let mut profile = PricingProfile::default();
        profile.labor_mode = LaborMode::Multiplier;
        profile.labor_rate_dw = dec!(40);
        profile.labor_rate_dt = dec!(45);
        profile.labor_rate_fw = dec!(60);
        profile.labor_rate_ft = dec!(65);

        assert_eq!(profile.labor(dec!(2), "DW"), dec!(80));
        assert_eq!(profile.labor(dec!(2), "DB"), dec!(90));
        assert_eq!(profile.labor(dec!(2), "FW"), dec!(120));
        assert_eq!(profile.labor(dec!(2), "FT"), dec!(130));
        // OEM bills at the domestic windshield rate
        assert_eq!(profile.labor(dec!(2), "OE"), dec!(80));
    }

    #[test]
    fn price_bounds_check_is_idempotent() {
        let mut pricing = QuotePricing {
            part_number: "FW03898".to_string(),
            part_description: String::new(),
            shop_id: "shop-1".to_string(),
            glass_cost: Decimal::ZERO,
            labor_cost: Decimal::ZERO,
            kit_fee: Decimal::ZERO,
            moulding_fee: Decimal::ZERO,
            hardware_fee: Decimal::ZERO,
            calibration_fee: Decimal::ZERO,
            mobile_fee: Decimal::ZERO,
            subtotal: dec!(200),
            tax: Decimal::ZERO,
            total: dec!(200),
            line_items: Vec::new(),
            needs_part_selection: false,
            needs_calibration_review: false,
            needs_manual_review: false,
            missing_list_price: false,
            price_out_of_bounds: false,
            confidence: Confidence::High,
            review_reasons: Vec::new(),
        };

        let bounds = PriceBounds::default();
        pricing.check_price_bounds(bounds);
        pricing.check_price_bounds(bounds);
        assert!(pricing.price_out_of_bounds);
        assert_eq!(
            pricing
                .review_reasons
                .iter()
                .filter(|r| matches!(r, ReviewReason::PriceOutOfBounds { .. }))
                .count(),
            1
        );

        pricing.total = dec!(800);
        pricing.check_price_bounds(bounds);
        assert!(!pricing.price_out_of_bounds);
        assert!(pricing.review_reasons.is_empty());
    }
}
