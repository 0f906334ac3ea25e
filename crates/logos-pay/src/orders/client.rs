use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::time::Instant;

use crate::config::StarpayConfig;
use crate::pricing::{normalize_pricing, PricingBreakdown};

use super::domain::{
    CardOrder, CardOrderRequest, OrderId, OrderStatus, PaymentDestination, StatusReport,
};
use super::gateway::{OrderGateway, OrderGatewayError};

/// Fixed settlement address handed out by the issuer mock.
const MOCK_PAYMENT_ADDRESS: &str = "BuCpZ4Sv3g4X4A5j5y5z5A5b5C5d5E5F5G5H5I5J5K5L";
const MOCK_FEE_PERCENT: f64 = 2.5;
/// USD per settlement unit in mock quotes.
const MOCK_REFERENCE_PRICE: f64 = 150.0;
const MOCK_PENDING_WINDOW: Duration = Duration::from_secs(10);
const MOCK_PROCESSING_WINDOW: Duration = Duration::from_secs(20);
const ORDER_TTL_MINUTES: i64 = 30;

/// StarPay REST client. Without an API key every call is served by a
/// deterministic local mock so the stack runs offline; ids created that way
/// are prefixed `mock_` and stay on the mock path even once a key appears.
pub struct StarpayClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    markup_percent: f64,
    mock_first_seen: Mutex<HashMap<String, Instant>>,
}

impl StarpayClient {
    pub fn new(http: reqwest::Client, config: &StarpayConfig) -> Self {
        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            markup_percent: config.markup_percent,
            mock_first_seen: Mutex::new(HashMap::new()),
        }
    }

    pub fn is_mock(&self) -> bool {
        self.api_key.is_none()
    }

    pub fn markup_percent(&self) -> f64 {
        self.markup_percent
    }

    /// Quote a card purchase. Malformed issuer payloads degrade to a
    /// synthesized breakdown; non-success answers surface their status.
    pub async fn quote_price(&self, amount: f64) -> Result<PricingBreakdown, OrderGatewayError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(PricingBreakdown::quote(
                amount,
                MOCK_FEE_PERCENT,
                self.markup_percent,
            ));
        };

        let response = self
            .http
            .get(format!("{}/api/v1/cards/price", self.base_url))
            .query(&[("amount", amount)])
            .bearer_auth(api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OrderGatewayError::Rejected {
                status: status.as_u16(),
                message: "Failed to fetch price".to_string(),
            });
        }

        let body: Value = response.json().await?;
        Ok(normalize_pricing(Some(&body), amount, self.markup_percent))
    }

    pub async fn create_card_order(
        &self,
        request: &CardOrderRequest,
    ) -> Result<CardOrder, OrderGatewayError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Ok(self.mock_card_order(request));
        };

        let response = self
            .http
            .post(format!("{}/api/v1/cards/order", self.base_url))
            .bearer_auth(api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or(Value::Null);
            return Err(OrderGatewayError::Rejected {
                status: status.as_u16(),
                message: upstream_error_message(&body, "Failed to create order"),
            });
        }

        let body: Value = response.json().await?;
        parse_upstream_order(&body, request, self.markup_percent)
    }

    pub async fn order_status(&self, order_id: &OrderId) -> Result<StatusReport, OrderGatewayError> {
        if self.is_mock() || order_id.as_str().starts_with("mock_") {
            return Ok(self.mock_status(order_id));
        }

        let api_key = self.api_key.as_deref().unwrap_or_default();
        let response = self
            .http
            .get(format!("{}/api/v1/cards/order/status", self.base_url))
            .query(&[("orderId", order_id.as_str())])
            .bearer_auth(api_key)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(StatusReport {
                order_id: order_id.clone(),
                status: OrderStatus::Failed,
                details: Some(Value::String("Order not found".to_string())),
            });
        }
        if !status.is_success() {
            // Transient issuer trouble must not fail a poll round.
            return Ok(StatusReport {
                order_id: order_id.clone(),
                status: OrderStatus::Pending,
                details: None,
            });
        }

        let body: Value = response.json().await?;
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .and_then(OrderStatus::parse)
            .unwrap_or(OrderStatus::Pending);

        Ok(StatusReport {
            order_id: order_id.clone(),
            status,
            details: body.get("details").cloned(),
        })
    }

    fn mock_card_order(&self, request: &CardOrderRequest) -> CardOrder {
        let order_id = format!("mock_order_{}", Utc::now().timestamp_millis());
        self.mock_first_seen
            .lock()
            .expect("mock order mutex poisoned")
            .insert(order_id.clone(), Instant::now());

        let pricing = PricingBreakdown::quote(request.amount, MOCK_FEE_PERCENT, self.markup_percent);
        let created_at = Utc::now();

        CardOrder {
            order_id: OrderId(order_id),
            status: OrderStatus::Pending,
            payment_destination: PaymentDestination {
                address: MOCK_PAYMENT_ADDRESS.to_string(),
                amount: pricing.total / MOCK_REFERENCE_PRICE,
                reference_price: MOCK_REFERENCE_PRICE,
            },
            pricing,
            created_at,
            expires_at: created_at + chrono::Duration::minutes(ORDER_TTL_MINUTES),
        }
    }

    /// Settlement theater: pending for the first window, processing for the
    /// second, completed afterwards, keyed off the first time we saw the id.
    fn mock_status(&self, order_id: &OrderId) -> StatusReport {
        let first_seen = {
            let mut guard = self
                .mock_first_seen
                .lock()
                .expect("mock order mutex poisoned");
            *guard
                .entry(order_id.as_str().to_string())
                .or_insert_with(Instant::now)
        };

        let elapsed = first_seen.elapsed();
        let status = if elapsed < MOCK_PENDING_WINDOW {
            OrderStatus::Pending
        } else if elapsed < MOCK_PROCESSING_WINDOW {
            OrderStatus::Processing
        } else {
            OrderStatus::Completed
        };

        StatusReport {
            order_id: order_id.clone(),
            status,
            details: None,
        }
    }
}

impl OrderGateway for StarpayClient {
    async fn create_order(
        &self,
        request: &CardOrderRequest,
    ) -> Result<CardOrder, OrderGatewayError> {
        self.create_card_order(request).await
    }

    async fn fetch_status(&self, order_id: &OrderId) -> Result<StatusReport, OrderGatewayError> {
        self.order_status(order_id).await
    }
}

fn upstream_error_message(body: &Value, fallback: &str) -> String {
    ["error", "message"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .unwrap_or(fallback)
        .to_string()
}

/// Issuer order payloads vary by API generation; probe the known spellings
/// and keep whatever parses. A missing order id is the only hard failure;
/// a missing destination address is the lifecycle controller's call.
fn parse_upstream_order(
    body: &Value,
    request: &CardOrderRequest,
    markup_percent: f64,
) -> Result<CardOrder, OrderGatewayError> {
    let order_id = ["orderId", "id", "order_id"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .ok_or_else(|| {
            OrderGatewayError::MalformedPayload("order response carried no order id".to_string())
        })?;

    let status = body
        .get("status")
        .and_then(Value::as_str)
        .and_then(OrderStatus::parse)
        .unwrap_or(OrderStatus::Pending);

    let payment = ["payment", "paymentDestination", "payment_data"]
        .iter()
        .find_map(|key| body.get(key))
        .filter(|value| value.is_object());

    let payment_destination = PaymentDestination {
        address: payment
            .and_then(|value| {
                ["address", "payment_address"]
                    .iter()
                    .find_map(|key| value.get(key).and_then(Value::as_str))
            })
            .unwrap_or_default()
            .to_string(),
        amount: payment
            .and_then(|value| {
                ["amount", "amountSol", "payment_amount"]
                    .iter()
                    .find_map(|key| value.get(key).and_then(Value::as_f64))
            })
            .unwrap_or(0.0),
        reference_price: payment
            .and_then(|value| {
                ["referencePrice", "solPrice", "reference_price"]
                    .iter()
                    .find_map(|key| value.get(key).and_then(Value::as_f64))
            })
            .unwrap_or(0.0),
    };

    let created_at = Utc::now();
    let expires_at = ["expiresAt", "expires_at"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|parsed| parsed.with_timezone(&Utc))
        .unwrap_or_else(|| created_at + chrono::Duration::minutes(ORDER_TTL_MINUTES));

    Ok(CardOrder {
        order_id: OrderId(order_id.to_string()),
        status,
        payment_destination,
        pricing: normalize_pricing(Some(body), request.amount, markup_percent),
        created_at,
        expires_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mock_client() -> StarpayClient {
        StarpayClient::new(
            reqwest::Client::new(),
            &StarpayConfig {
                base_url: "https://www.starpay.cards".to_string(),
                api_key: None,
                markup_percent: 5.0,
            },
        )
    }

    fn request() -> CardOrderRequest {
        CardOrderRequest::from_parts(Some(100.0), Some("visa"), Some("buyer@example.com"))
            .expect("valid request")
    }

    #[tokio::test]
    async fn mock_orders_are_payable_offline() {
        let client = mock_client();
        let order = client.create_card_order(&request()).await.expect("mock order");

        assert!(order.order_id.as_str().starts_with("mock_order_"));
        assert_eq!(order.payment_destination.address, MOCK_PAYMENT_ADDRESS);
        assert_eq!(order.pricing.total, 107.5);
        assert_eq!(order.payment_destination.amount, 107.5 / 150.0);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[tokio::test(start_paused = true)]
    async fn mock_status_progresses_with_time() {
        let client = mock_client();
        let order = client.create_card_order(&request()).await.expect("mock order");
        let id = order.order_id;

        let report = client.order_status(&id).await.expect("status");
        assert_eq!(report.status, OrderStatus::Pending);

        tokio::time::advance(Duration::from_secs(10)).await;
        let report = client.order_status(&id).await.expect("status");
        assert_eq!(report.status, OrderStatus::Processing);

        tokio::time::advance(Duration::from_secs(10)).await;
        let report = client.order_status(&id).await.expect("status");
        assert_eq!(report.status, OrderStatus::Completed);
    }

    #[test]
    fn parses_camel_case_order_payloads() {
        let body = json!({
            "orderId": "sp_123",
            "status": "pending",
            "payment": { "address": "SoLAddr", "amountSol": 0.7166, "solPrice": 150.0 },
            "pricing": {
                "cardValue": 100.0,
                "starpayFeePercent": 2.5,
                "starpayFee": 2.5,
                "resellerMarkup": 5.0,
                "total": 107.5
            },
            "expiresAt": "2026-03-01T12:00:00Z"
        });

        let order = parse_upstream_order(&body, &request(), 5.0).expect("order parses");
        assert_eq!(order.order_id.as_str(), "sp_123");
        assert_eq!(order.payment_destination.address, "SoLAddr");
        assert_eq!(order.payment_destination.reference_price, 150.0);
        assert_eq!(order.pricing.markup_amount, 5.0);
        assert_eq!(
            order.expires_at,
            DateTime::parse_from_rfc3339("2026-03-01T12:00:00Z")
                .expect("fixture timestamp")
                .with_timezone(&Utc)
        );
    }

    #[test]
    fn parses_snake_case_order_payloads() {
        let body = json!({
            "order_id": "sp_456",
            "status": "processing",
            "payment_data": { "payment_address": "SoLAddr2", "payment_amount": 0.5 }
        });

        let order = parse_upstream_order(&body, &request(), 5.0).expect("order parses");
        assert_eq!(order.order_id.as_str(), "sp_456");
        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.payment_destination.address, "SoLAddr2");
        assert_eq!(order.payment_destination.amount, 0.5);
        // No pricing in the payload: synthesized from the requested amount.
        assert_eq!(order.pricing.card_value, 100.0);
        assert_eq!(order.pricing.markup_amount, 5.0);
    }

    #[test]
    fn order_payloads_without_an_id_are_malformed() {
        let body = json!({ "status": "pending" });
        let err = parse_upstream_order(&body, &request(), 5.0).expect_err("missing id rejected");
        assert!(matches!(err, OrderGatewayError::MalformedPayload(_)));
    }

    #[test]
    fn upstream_error_messages_prefer_the_error_field() {
        assert_eq!(
            upstream_error_message(&json!({ "error": "Insufficient funds" }), "fallback"),
            "Insufficient funds"
        );
        assert_eq!(
            upstream_error_message(&json!({ "message": "Try later" }), "fallback"),
            "Try later"
        );
        assert_eq!(upstream_error_message(&json!({}), "fallback"), "fallback");
    }
}
