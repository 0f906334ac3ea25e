use serde::Deserialize;
use serde_json::Value;

/// Raw numeric fields pulled out of an upstream quote before
/// canonicalization. `None` means the payload did not carry the field.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub(crate) struct ExtractedPricing {
    pub(crate) card_value: Option<f64>,
    pub(crate) fee_percent: Option<f64>,
    pub(crate) fee_amount: Option<f64>,
    pub(crate) markup_amount: Option<f64>,
    pub(crate) total: Option<f64>,
}

impl ExtractedPricing {
    fn has_any_field(&self) -> bool {
        self.card_value.is_some()
            || self.fee_percent.is_some()
            || self.fee_amount.is_some()
            || self.markup_amount.is_some()
            || self.total.is_some()
    }
}

type Extractor = fn(&Value) -> Option<ExtractedPricing>;

/// Probed in order; the first extractor that recognizes the payload wins.
pub(crate) const EXTRACTORS: [Extractor; 2] = [extract_nested, extract_flat];

/// Shape (a): a `pricing` object nested in the payload. The quote endpoint
/// spells its fields snake_case, the order endpoint camelCase; both are
/// accepted here.
#[derive(Debug, Deserialize)]
struct NestedPricing {
    #[serde(default, alias = "cardValue")]
    card_value: Option<f64>,
    #[serde(default, alias = "starpayFeePercent")]
    starpay_fee_percent: Option<f64>,
    #[serde(default, alias = "starpayFee")]
    starpay_fee_usd: Option<f64>,
    #[serde(default, alias = "resellerMarkup")]
    reseller_markup_usd: Option<f64>,
    #[serde(default, alias = "customerPrice", alias = "total")]
    customer_price: Option<f64>,
}

fn extract_nested(payload: &Value) -> Option<ExtractedPricing> {
    let pricing = payload.get("pricing")?;
    if !pricing.is_object() {
        return None;
    }

    let parsed: NestedPricing = serde_json::from_value(pricing.clone()).ok()?;
    let extracted = ExtractedPricing {
        card_value: parsed.card_value,
        fee_percent: parsed.starpay_fee_percent,
        fee_amount: parsed.starpay_fee_usd,
        markup_amount: parsed.reseller_markup_usd,
        total: parsed.customer_price,
    };

    extracted.has_any_field().then_some(extracted)
}

/// Shape (b): camelCase fields at the payload root. Only usable when a
/// numeric total is present; partial roots are treated as unrecognized.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatPricing {
    #[serde(default, alias = "card_value")]
    card_value: Option<f64>,
    #[serde(default, alias = "starpay_fee_percent")]
    starpay_fee_percent: Option<f64>,
    #[serde(default, alias = "starpay_fee_usd")]
    starpay_fee: Option<f64>,
    #[serde(default, alias = "reseller_markup_usd")]
    reseller_markup: Option<f64>,
    #[serde(default)]
    total: Option<f64>,
}

fn extract_flat(payload: &Value) -> Option<ExtractedPricing> {
    if !payload.is_object() {
        return None;
    }

    let parsed: FlatPricing = serde_json::from_value(payload.clone()).ok()?;
    parsed.total?;

    Some(ExtractedPricing {
        card_value: parsed.card_value,
        fee_percent: parsed.starpay_fee_percent,
        fee_amount: parsed.starpay_fee,
        markup_amount: parsed.reseller_markup,
        total: parsed.total,
    })
}
