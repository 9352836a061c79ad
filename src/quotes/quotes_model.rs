//! Quote domain model and its state machine.
//!
//! State transitions are guarded methods on [`Quote`]; an illegal move is a
//! typed error, never a silent overwrite.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::quotes_errors::QuoteError;
use crate::customers::NewCustomer;
use crate::pricing::{LineItem, ServiceType};
use crate::vehicles::vehicles_model::GlassType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteState {
    Draft,
    PendingValidation,
    Sent,
    CustomerApproved,
    Scheduled,
    Converted,
    Expired,
    Rejected,
}

impl QuoteState {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteState::Draft => "draft",
            QuoteState::PendingValidation => "pending_validation",
            QuoteState::Sent => "sent",
            QuoteState::CustomerApproved => "customer_approved",
            QuoteState::Scheduled => "scheduled",
            QuoteState::Converted => "converted",
            QuoteState::Expired => "expired",
            QuoteState::Rejected => "rejected",
        }
    }

    /// Terminal states are excluded from the expiry sweep and accept no
    /// further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            QuoteState::CustomerApproved
                | QuoteState::Converted
                | QuoteState::Expired
                | QuoteState::Rejected
        )
    }
}

impl std::fmt::Display for QuoteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DamageType {
    Chip,
    Crack,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    #[default]
    Cash,
    Insurance,
}

/// What the customer is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceIntent {
    Replacement,
    ChipRepair,
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    pub customer_id: String,
    pub shop_id: String,
    pub vin: Option<String>,
    pub vehicle_year: Option<i32>,
    pub vehicle_make: Option<String>,
    pub vehicle_model: Option<String>,
    pub postal_code: Option<String>,
    pub glass_type: Option<GlassType>,
    pub damage_type: DamageType,
    pub service_type: ServiceType,
    pub service_address: Option<String>,
    pub distance_miles: Option<Decimal>,
    pub payment_type: PaymentType,
    /// Full pricing breakdown, kept for audit
    pub pricing_details: serde_json::Value,
    pub part_cost: Decimal,
    pub labor_cost: Decimal,
    pub total_price: Decimal,
    pub state: QuoteState,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Quote {
    fn transition(&mut self, allowed_from: &[QuoteState], to: QuoteState) -> Result<(), QuoteError> {
        if !allowed_from.contains(&self.state) {
            return Err(QuoteError::InvalidTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }

    pub fn submit_for_validation(&mut self) -> Result<(), QuoteError> {
        self.transition(&[QuoteState::Draft], QuoteState::PendingValidation)
    }

    pub fn send_to_customer(&mut self) -> Result<(), QuoteError> {
        self.transition(
            &[QuoteState::Draft, QuoteState::PendingValidation],
            QuoteState::Sent,
        )
    }

    pub fn approve(&mut self) -> Result<(), QuoteError> {
        self.transition(&[QuoteState::Sent], QuoteState::CustomerApproved)
    }

    pub fn schedule(&mut self) -> Result<(), QuoteError> {
        self.transition(&[QuoteState::CustomerApproved], QuoteState::Scheduled)
    }

    pub fn convert(&mut self) -> Result<(), QuoteError> {
        self.transition(&[QuoteState::Scheduled], QuoteState::Converted)
    }

    pub fn reject(&mut self, reason: &str) -> Result<(), QuoteError> {
        if reason.trim().is_empty() {
            return Err(QuoteError::MissingReason);
        }
        self.transition(&[QuoteState::PendingValidation], QuoteState::Rejected)?;
        self.rejection_reason = Some(reason.to_string());
        Ok(())
    }

    /// Expires the quote. Legal from any non-terminal state.
    pub fn expire(&mut self) -> Result<(), QuoteError> {
        if self.state.is_terminal() {
            return Err(QuoteError::InvalidTransition {
                from: self.state.to_string(),
                to: QuoteState::Expired.to_string(),
            });
        }
        self.state = QuoteState::Expired;
        Ok(())
    }
}

/// Everything needed to generate one quote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub shop_id: String,
    pub customer: NewCustomer,
    pub intent: ServiceIntent,
    pub glass_type: Option<GlassType>,
    pub damage_type: DamageType,
    pub chip_count: Option<u32>,
    pub vin: Option<String>,
    pub plate: Option<String>,
    pub plate_state: Option<String>,
    pub postal_code: Option<String>,
    pub service_type: ServiceType,
    pub service_address: Option<String>,
    pub distance_miles: Option<Decimal>,
    pub payment_type: PaymentType,
    /// Narrows a multi-part result before pricing
    pub preselected_part_number: Option<String>,
}

/// Result of a generation run. Failures are data, not panics; the caller
/// decides whether to retry based on `retryable`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GenerationOutcome {
    Completed {
        quote_id: Uuid,
        total_price: Decimal,
        needs_review: bool,
        review_summary: Option<String>,
    },
    Failed {
        error: String,
        retryable: bool,
    },
}

/// A quote line item bound to its parent quote
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteLineItem {
    pub quote_id: Uuid,
    #[serde(flatten)]
    pub item: LineItem,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn draft_quote() -> Quote {
        Quote {
            id: Uuid::new_v4(),
            customer_id: "cust-1".to_string(),
            shop_id: "shop-1".to_string(),
            vin: None,
            vehicle_year: None,
            vehicle_make: None,
            vehicle_model: None,
            postal_code: None,
            glass_type: Some(GlassType::Windshield),
            damage_type: DamageType::Crack,
            service_type: ServiceType::InStore,
            service_address: None,
            distance_miles: None,
            payment_type: PaymentType::Cash,
            pricing_details: serde_json::Value::Null,
            part_cost: dec!(320),
            labor_cost: dec!(150),
            total_price: dec!(485),
            state: QuoteState::Draft,
            rejection_reason: None,
            created_at: Utc::now(),
            expires_at: None,
        }
    }

    #[test]
    fn happy_path_transitions() {
        let mut quote = draft_quote();
        quote.submit_for_validation().unwrap();
        assert_eq!(quote.state, QuoteState::PendingValidation);
        quote.send_to_customer().unwrap();
        assert_eq!(quote.state, QuoteState::Sent);
        quote.approve().unwrap();
        assert_eq!(quote.state, QuoteState::CustomerApproved);
        quote.schedule().unwrap();
        assert_eq!(quote.state, QuoteState::Scheduled);
        quote.convert().unwrap();
        assert_eq!(quote.state, QuoteState::Converted);
    }

    #[test]
    fn draft_can_go_straight_to_sent() {
        let mut quote = draft_quote();
        quote.send_to_customer().unwrap();
        assert_eq!(quote.state, QuoteState::Sent);
    }

    #[test]
    fn illegal_transition_is_an_error_and_preserves_state() {
        let mut quote = draft_quote();
        let err = quote.approve().unwrap_err();
        assert!(matches!(err, QuoteError::InvalidTransition { .. }));
        assert_eq!(quote.state, QuoteState::Draft);
    }

    #[test]
    fn rejection_requires_a_reason() {
        let mut quote = draft_quote();
        quote.submit_for_validation().unwrap();
        assert!(matches!(quote.reject("  "), Err(QuoteError::MissingReason)));
        quote.reject("price out of bounds").unwrap();
        assert_eq!(quote.state, QuoteState::Rejected);
        assert_eq!(quote.rejection_reason.as_deref(), Some("price out of bounds"));
    }

    #[test]
    fn terminal_states_cannot_expire() {
        let mut quote = draft_quote();
        quote.send_to_customer().unwrap();
        quote.approve().unwrap();
        assert!(quote.expire().is_err());
        assert_eq!(quote.state, QuoteState::CustomerApproved);

        let mut open = draft_quote();
        open.send_to_customer().unwrap();
        open.expire().unwrap();
        assert_eq!(open.state, QuoteState::Expired);
    }
}
