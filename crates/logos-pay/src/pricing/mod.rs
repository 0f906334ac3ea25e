//! Canonicalization of card-issuer pricing quotes.
//!
//! The issuer answers pricing requests in more than one wire shape depending
//! on endpoint and API generation. Everything downstream works from one
//! canonical breakdown, and the platform markup is injected here whenever the
//! issuer did not price one in.

mod extract;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use extract::EXTRACTORS;

/// Platform cut applied when the issuer quote carries no reseller markup.
pub const DEFAULT_PLATFORM_MARKUP_PERCENT: f64 = 5.0;

/// Canonical quote for one card purchase, USD amounts throughout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingBreakdown {
    pub card_value: f64,
    pub fee_percent: f64,
    pub fee_amount: f64,
    pub markup_amount: f64,
    pub total: f64,
}

impl PricingBreakdown {
    /// Quote computed locally from rates, used by the issuer mock and for
    /// synthesized fallbacks.
    pub fn quote(card_value: f64, fee_percent: f64, markup_percent: f64) -> Self {
        let fee_amount = card_value * fee_percent / 100.0;
        let markup_amount = card_value * markup_percent / 100.0;
        Self {
            card_value,
            fee_percent,
            fee_amount,
            markup_amount,
            total: card_value + fee_amount + markup_amount,
        }
    }

    fn recompute_total(&mut self) {
        self.total = self.card_value + self.fee_amount + self.markup_amount;
    }
}

/// Canonicalize an issuer payload, falling back to the requested amount when
/// the payload is absent or unrecognizable. Never errors; malformed quotes
/// degrade to a synthesized breakdown.
///
/// A missing or zero markup is replaced with the platform markup and the
/// total recomputed; a non-zero issuer markup is trusted verbatim, total
/// included.
pub fn normalize_pricing(
    raw: Option<&Value>,
    requested_amount: f64,
    platform_markup_percent: f64,
) -> PricingBreakdown {
    let extracted = raw.and_then(|payload| {
        EXTRACTORS
            .iter()
            .find_map(|extract| extract(payload))
    });

    let mut pricing = match extracted {
        Some(fields) => PricingBreakdown {
            // Zero and negative card values are quote noise; price against
            // the requested amount instead.
            card_value: fields
                .card_value
                .filter(|value| *value > 0.0)
                .unwrap_or(requested_amount),
            fee_percent: fields.fee_percent.unwrap_or(0.0),
            fee_amount: fields.fee_amount.unwrap_or(0.0),
            markup_amount: fields.markup_amount.unwrap_or(0.0),
            total: fields.total.unwrap_or(0.0),
        },
        None => PricingBreakdown {
            card_value: requested_amount,
            fee_percent: 0.0,
            fee_amount: 0.0,
            markup_amount: 0.0,
            total: 0.0,
        },
    };

    if pricing.markup_amount == 0.0 {
        pricing.markup_amount = pricing.card_value * platform_markup_percent / 100.0;
        pricing.recompute_total();
    }

    pricing
}
