use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::pricing::PricingBreakdown;

/// Identifier wrapper for card orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Card networks the issuer can provision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    Visa,
    Mastercard,
}

impl CardKind {
    /// Strict wire-format parse; anything else is an invalid card type.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "visa" => Some(Self::Visa),
            "mastercard" => Some(Self::Mastercard),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            CardKind::Visa => "visa",
            CardKind::Mastercard => "mastercard",
        }
    }
}

/// Settlement status reported by the issuer for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    Expired,
}

impl OrderStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Processing => "processing",
            OrderStatus::Completed => "completed",
            OrderStatus::Failed => "failed",
            OrderStatus::Expired => "expired",
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            OrderStatus::Completed | OrderStatus::Failed | OrderStatus::Expired
        )
    }
}

/// Purchase bounds enforced at intake.
pub const MIN_CARD_AMOUNT_USD: f64 = 5.0;
pub const MAX_CARD_AMOUNT_USD: f64 = 10_000.0;

/// Validated purchase request. Construct through [`CardOrderRequest::from_parts`];
/// the lifecycle controller assumes requests reaching it already passed intake.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOrderRequest {
    pub amount: f64,
    pub card_type: CardKind,
    pub email: String,
}

impl CardOrderRequest {
    pub fn from_parts(
        amount: Option<f64>,
        card_type: Option<&str>,
        email: Option<&str>,
    ) -> Result<Self, OrderValidationError> {
        let amount = amount
            .filter(|value| value.is_finite())
            .filter(|value| (MIN_CARD_AMOUNT_USD..=MAX_CARD_AMOUNT_USD).contains(value))
            .ok_or(OrderValidationError::AmountOutOfRange)?;

        let email = email
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(OrderValidationError::EmailRequired)?
            .to_string();

        let card_type = card_type
            .and_then(CardKind::parse)
            .ok_or(OrderValidationError::UnknownCardKind)?;

        Ok(Self {
            amount,
            card_type,
            email,
        })
    }
}

/// Intake failures, worded exactly as surfaced to buyers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum OrderValidationError {
    #[error("Amount must be between $5 and $10,000")]
    AmountOutOfRange,
    #[error("Email is required")]
    EmailRequired,
    #[error("Invalid card type")]
    UnknownCardKind,
}

/// Where and how much to pay, in the settlement currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDestination {
    pub address: String,
    /// Amount owed in settlement-currency units.
    pub amount: f64,
    /// USD per settlement unit at quote time.
    pub reference_price: f64,
}

/// An order as accepted by the issuer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardOrder {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub payment_destination: PaymentDestination,
    pub pricing: PricingBreakdown,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// One poll answer for an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub order_id: OrderId,
    pub status: OrderStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_accepts_a_well_formed_request() {
        let request = CardOrderRequest::from_parts(Some(50.0), Some("visa"), Some("buyer@example.com"))
            .expect("valid request");
        assert_eq!(request.amount, 50.0);
        assert_eq!(request.card_type, CardKind::Visa);
        assert_eq!(request.email, "buyer@example.com");
    }

    #[test]
    fn amount_bounds_are_inclusive() {
        CardOrderRequest::from_parts(Some(5.0), Some("visa"), Some("a@b.c")).expect("lower bound");
        CardOrderRequest::from_parts(Some(10_000.0), Some("visa"), Some("a@b.c"))
            .expect("upper bound");

        let low = CardOrderRequest::from_parts(Some(4.99), Some("visa"), Some("a@b.c"));
        let high = CardOrderRequest::from_parts(Some(10_000.01), Some("visa"), Some("a@b.c"));
        assert_eq!(low.unwrap_err(), OrderValidationError::AmountOutOfRange);
        assert_eq!(high.unwrap_err(), OrderValidationError::AmountOutOfRange);
    }

    #[test]
    fn non_finite_amounts_are_rejected() {
        let request = CardOrderRequest::from_parts(Some(f64::NAN), Some("visa"), Some("a@b.c"));
        assert_eq!(request.unwrap_err(), OrderValidationError::AmountOutOfRange);
    }

    #[test]
    fn amount_is_checked_before_email_and_card_kind() {
        let err = CardOrderRequest::from_parts(None, None, None).unwrap_err();
        assert_eq!(err, OrderValidationError::AmountOutOfRange);

        let err = CardOrderRequest::from_parts(Some(50.0), Some("amex"), None).unwrap_err();
        assert_eq!(err, OrderValidationError::EmailRequired);

        let err =
            CardOrderRequest::from_parts(Some(50.0), Some("amex"), Some("a@b.c")).unwrap_err();
        assert_eq!(err, OrderValidationError::UnknownCardKind);
    }

    #[test]
    fn card_kind_parse_is_case_sensitive() {
        assert_eq!(CardKind::parse("mastercard"), Some(CardKind::Mastercard));
        assert_eq!(CardKind::parse("Visa"), None);
        assert_eq!(CardKind::parse("amex"), None);
    }

    #[test]
    fn terminal_statuses_are_the_three_settled_ones() {
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Failed.is_terminal());
        assert!(OrderStatus::Expired.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
        assert!(!OrderStatus::Processing.is_terminal());
    }
}
