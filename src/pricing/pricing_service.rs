//! Quote calculation engine.
//!
//! Components are computed independently from the shop's pricing profile and
//! the selected part, then summed. A missing list price never becomes a $0
//! glass line silently; it zeroes the component and routes the quote to
//! review instead.

use std::sync::Arc;

use async_trait::async_trait;
use log::debug;
use rust_decimal::Decimal;

use super::pricing_errors::PricingError;
use super::pricing_model::{
    ChipRepairPricing, LineItem, LineItemType, PriceBounds, PricingProfile, QuotePricing,
    ServiceType,
};
use super::pricing_traits::{PricingProfileRepositoryTrait, PricingServiceTrait};
use crate::vehicles::vehicles_model::{GlassPart, GlassType, ReviewReason, VehicleLookupResult};

pub struct PricingService {
    profiles: Arc<dyn PricingProfileRepositoryTrait>,
    bounds: PriceBounds,
}

impl PricingService {
    pub fn new(profiles: Arc<dyn PricingProfileRepositoryTrait>) -> Self {
        PricingService {
            profiles,
            bounds: PriceBounds::default(),
        }
    }

    pub fn with_bounds(profiles: Arc<dyn PricingProfileRepositoryTrait>, bounds: PriceBounds) -> Self {
        PricingService { profiles, bounds }
    }

    /// Default profile first, then any active profile for the shop
    async fn resolve_profile(&self, shop_id: &str) -> Result<PricingProfile, PricingError> {
        if let Some(profile) = self.profiles.get_pricing_profile(shop_id, true).await? {
            return Ok(profile);
        }
        if let Some(profile) = self.profiles.get_pricing_profile(shop_id, false).await? {
            return Ok(profile);
        }
        Err(PricingError::NoProfile(shop_id.to_string()))
    }

    fn mobile_fee(
        &self,
        profile: &PricingProfile,
        service_type: ServiceType,
        distance_miles: Option<Decimal>,
    ) -> Result<Decimal, PricingError> {
        match service_type {
            ServiceType::InStore => Ok(Decimal::ZERO),
            ServiceType::Mobile => match distance_miles {
                // Unknown distance gets the base fee, corrected at scheduling
                None => Ok(profile.mobile_base_fee),
                Some(distance) => {
                    profile
                        .mobile_fee(distance)
                        .ok_or(PricingError::OutsideServiceArea {
                            distance,
                            max: profile.mobile_max_distance,
                        })
                }
            },
        }
    }

    fn describe_part(part: &GlassPart) -> String {
        let mut description = part
            .features
            .iter()
            .take(3)
            .cloned()
            .collect::<Vec<_>>()
            .join(", ");
        if part.calibration_required() {
            let sentence = format!(
                "{} Calibration Required",
                part.calibration_type.as_deref().unwrap_or_default()
            );
            if description.is_empty() {
                description = sentence;
            } else {
                description = format!("{}; {}", description, sentence);
            }
        }
        if description.is_empty() {
            "Standard Glass".to_string()
        } else {
            description
        }
    }
}

#[async_trait]
impl PricingServiceTrait for PricingService {
    async fn calculate_quote(
        &self,
        lookup: &VehicleLookupResult,
        shop_id: &str,
        glass_type: GlassType,
        service_type: ServiceType,
        distance_miles: Option<Decimal>,
    ) -> Result<QuotePricing, PricingError> {
        let profile = self.resolve_profile(shop_id).await?;
        let part = lookup.primary_part().ok_or(PricingError::NoParts)?;

        let missing_list_price = part.list_price.is_unpriced();
        let glass_cost = match part.list_price.amount() {
            Some(list) => profile.glass_price(list, &part.prefix_cd),
            None => Decimal::ZERO,
        };

        let labor_cost = profile.labor(part.labor_hours, &part.prefix_cd);
        let kit_fee = profile.kit_fee(part.labor_hours);

        // Flat fees, charged only when the part requires the work and the
        // profile prices it
        let moulding_fee = if part.moulding_required && profile.moulding_flat_fee > Decimal::ZERO {
            profile.moulding_flat_fee
        } else {
            Decimal::ZERO
        };
        let hardware_fee = if part.clips_required && profile.hardware_flat_fee > Decimal::ZERO {
            profile.hardware_flat_fee
        } else {
            Decimal::ZERO
        };

        let calibration_fee = match part.calibration_type.as_deref() {
            Some(label) if part.calibration_required() => profile.calibration_fee(label),
            _ => Decimal::ZERO,
        };

        let mobile_fee = self.mobile_fee(&profile, service_type, distance_miles)?;

        let subtotal = glass_cost
            + labor_cost
            + kit_fee
            + moulding_fee
            + hardware_fee
            + calibration_fee
            + mobile_fee;
        let tax = Decimal::ZERO;
        let total = subtotal + tax;
        debug!(
            "Quote for {} at shop {}: subtotal {}, total {}",
            part.part_number, shop_id, subtotal, total
        );

        let mut line_items = Vec::new();
        if glass_cost > Decimal::ZERO {
            line_items.push(LineItem::new(
                LineItemType::Part,
                format!("{} - {}", glass_type.label(), part.part_number),
                glass_cost,
            ));
        }
        if labor_cost > Decimal::ZERO {
            line_items.push(LineItem::new(
                LineItemType::Labor,
                format!("Installation Labor ({}h)", part.labor_hours),
                labor_cost,
            ));
        }
        if kit_fee > Decimal::ZERO {
            line_items.push(LineItem::new(
                LineItemType::Fee,
                format!("Urethane Kit ({} tubes)", part.tube_qty),
                kit_fee,
            ));
        }
        if moulding_fee > Decimal::ZERO {
            line_items.push(LineItem::new(LineItemType::Fee, "Moulding Fee", moulding_fee));
        }
        if hardware_fee > Decimal::ZERO {
            line_items.push(LineItem::new(
                LineItemType::Fee,
                "Hardware/Clips Fee",
                hardware_fee,
            ));
        }
        if calibration_fee > Decimal::ZERO {
            line_items.push(LineItem::new(
                LineItemType::Calibration,
                format!(
                    "ADAS Calibration ({})",
                    part.calibration_type.as_deref().unwrap_or_default()
                ),
                calibration_fee,
            ));
        }
        if mobile_fee > Decimal::ZERO {
            line_items.push(LineItem::new(LineItemType::Fee, "Mobile Service Fee", mobile_fee));
        }

        let mut review_reasons = lookup.review_reasons.clone();
        if missing_list_price
            && !review_reasons
                .iter()
                .any(|r| matches!(r, ReviewReason::MissingListPrice { .. }))
        {
            review_reasons.push(ReviewReason::MissingListPrice { count: 1 });
        }

        let mut pricing = QuotePricing {
            part_number: part.part_number.clone(),
            part_description: Self::describe_part(part),
            shop_id: shop_id.to_string(),
            glass_cost,
            labor_cost,
            kit_fee,
            moulding_fee,
            hardware_fee,
            calibration_fee,
            mobile_fee,
            subtotal,
            tax,
            total,
            line_items,
            needs_part_selection: lookup.needs_part_selection,
            needs_calibration_review: lookup.needs_calibration_review,
            needs_manual_review: lookup.needs_manual_review,
            missing_list_price,
            price_out_of_bounds: false,
            confidence: lookup.confidence,
            review_reasons,
        };
        pricing.check_price_bounds(self.bounds);
        Ok(pricing)
    }

    async fn calculate_chip_repair(
        &self,
        chip_count: u32,
        shop_id: &str,
        service_type: ServiceType,
        distance_miles: Option<Decimal>,
    ) -> Result<ChipRepairPricing, PricingError> {
        if chip_count < 1 {
            return Err(PricingError::NoChips);
        }
        if chip_count > 3 {
            return Err(PricingError::TooManyChips(chip_count));
        }

        let profile = self.resolve_profile(shop_id).await?;
        let repair_cost = profile.chip_repair(chip_count);
        let mobile_fee = self.mobile_fee(&profile, service_type, distance_miles)?;
        let total = repair_cost + mobile_fee;

        let mut line_items = vec![LineItem::new(
            LineItemType::ChipRepair,
            format!("Chip Repair ({} chip(s))", chip_count),
            repair_cost,
        )];
        if mobile_fee > Decimal::ZERO {
            line_items.push(LineItem::new(LineItemType::Fee, "Mobile Service Fee", mobile_fee));
        }

        Ok(ChipRepairPricing {
            chip_count,
            repair_cost,
            mobile_fee,
            total,
            line_items,
        })
    }
}
