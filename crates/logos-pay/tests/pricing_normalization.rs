//! Integration specifications for pricing canonicalization.
//!
//! Quotes arrive in two recognized wire shapes and an assortment of broken
//! ones; every path below must land on a canonical breakdown that carries a
//! non-zero markup.

use logos_pay::pricing::{normalize_pricing, PricingBreakdown};
use serde_json::{json, Value};

const PLATFORM_MARKUP: f64 = 5.0;

fn normalized(payload: &Value, requested: f64) -> PricingBreakdown {
    normalize_pricing(Some(payload), requested, PLATFORM_MARKUP)
}

#[test]
fn absent_payloads_synthesize_a_quote_from_the_requested_amount() {
    let pricing = normalize_pricing(None, 100.0, PLATFORM_MARKUP);

    assert_eq!(pricing.card_value, 100.0);
    assert_eq!(pricing.fee_percent, 0.0);
    assert_eq!(pricing.fee_amount, 0.0);
    assert_eq!(pricing.markup_amount, 5.0);
    assert_eq!(pricing.total, 105.0);
}

#[test]
fn unrecognized_payloads_degrade_to_the_synthesized_quote() {
    let fallback = normalize_pricing(None, 100.0, PLATFORM_MARKUP);

    for payload in [
        json!({}),
        json!("quote unavailable"),
        json!({ "pricing": "n/a" }),
        json!({ "pricing": {} }),
        // A flat shape without a numeric total is not usable.
        json!({ "cardValue": 100.0, "starpayFee": 2.5 }),
    ] {
        assert_eq!(normalized(&payload, 100.0), fallback, "payload {payload}");
    }
}

#[test]
fn string_typed_numbers_degrade_the_whole_shape() {
    // Field-level type drift is treated as an unrecognized payload, not
    // silently coerced.
    let payload = json!({ "pricing": { "card_value": "100", "customer_price": "107.5" } });
    let pricing = normalized(&payload, 40.0);

    assert_eq!(pricing.card_value, 40.0);
    assert_eq!(pricing.markup_amount, 2.0);
    assert_eq!(pricing.total, 42.0);
}

#[test]
fn zero_markup_is_replaced_and_the_total_recomputed() {
    let payload = json!({
        "pricing": {
            "card_value": 100.0,
            "starpay_fee_percent": 2.5,
            "starpay_fee_usd": 2.5,
            "reseller_markup_usd": 0.0,
            "customer_price": 102.5
        }
    });

    let pricing = normalized(&payload, 100.0);
    assert_eq!(pricing.markup_amount, 5.0);
    assert_eq!(pricing.total, 107.5);
}

#[test]
fn upstream_markup_is_trusted_verbatim_total_included() {
    // The upstream total is kept even when it disagrees with the parts.
    let payload = json!({
        "pricing": {
            "cardValue": 100.0,
            "starpayFeePercent": 2.5,
            "starpayFee": 2.5,
            "resellerMarkup": 7.0,
            "total": 111.0
        }
    });

    let pricing = normalized(&payload, 100.0);
    assert_eq!(pricing.markup_amount, 7.0);
    assert_eq!(pricing.total, 111.0);
}

#[test]
fn the_nested_shape_wins_over_flat_root_fields() {
    let payload = json!({
        "cardValue": 999.0,
        "total": 999.0,
        "pricing": {
            "card_value": 100.0,
            "reseller_markup_usd": 7.0,
            "customer_price": 109.5
        }
    });

    let pricing = normalized(&payload, 100.0);
    assert_eq!(pricing.card_value, 100.0);
    assert_eq!(pricing.markup_amount, 7.0);
    assert_eq!(pricing.total, 109.5);
}

#[test]
fn flat_quotes_with_a_numeric_total_are_recognized() {
    let payload = json!({
        "cardValue": 50.0,
        "starpayFee": 1.25,
        "resellerMarkup": 2.0,
        "total": 53.25
    });

    let pricing = normalized(&payload, 50.0);
    assert_eq!(pricing.card_value, 50.0);
    assert_eq!(pricing.fee_amount, 1.25);
    assert_eq!(pricing.markup_amount, 2.0);
    assert_eq!(pricing.total, 53.25);
}

#[test]
fn flat_quotes_without_a_markup_get_one_injected() {
    let payload = json!({ "cardValue": 50.0, "starpayFee": 1.25, "total": 51.25 });

    let pricing = normalized(&payload, 50.0);
    assert_eq!(pricing.markup_amount, 2.5);
    assert_eq!(pricing.total, 53.75);
}

#[test]
fn non_positive_card_values_price_against_the_requested_amount() {
    for card_value in [0.0, -10.0] {
        let payload = json!({
            "pricing": { "card_value": card_value, "starpay_fee_usd": 1.0 }
        });

        let pricing = normalized(&payload, 40.0);
        assert_eq!(pricing.card_value, 40.0, "card value {card_value}");
        assert_eq!(pricing.fee_amount, 1.0);
        assert_eq!(pricing.markup_amount, 2.0);
        assert_eq!(pricing.total, 43.0);
    }
}

#[test]
fn partial_nested_quotes_default_missing_parts_to_zero() {
    let payload = json!({ "pricing": { "cardValue": 80.0 } });

    let pricing = normalized(&payload, 25.0);
    assert_eq!(pricing.card_value, 80.0);
    assert_eq!(pricing.fee_percent, 0.0);
    assert_eq!(pricing.fee_amount, 0.0);
    assert_eq!(pricing.markup_amount, 4.0);
    assert_eq!(pricing.total, 84.0);
}

#[test]
fn breakdowns_serialize_camel_case_for_the_dashboard() {
    let value =
        serde_json::to_value(PricingBreakdown::quote(100.0, 2.5, 5.0)).expect("serializes");

    assert_eq!(value["cardValue"], 100.0);
    assert_eq!(value["feePercent"], 2.5);
    assert_eq!(value["feeAmount"], 2.5);
    assert_eq!(value["markupAmount"], 5.0);
    assert_eq!(value["total"], 107.5);
}
