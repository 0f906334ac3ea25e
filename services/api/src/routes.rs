use crate::infra::{AppState, CardServices};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use logos_pay::orders::{
    CardOrderRequest, OrderGatewayError, OrderId, OrderValidationError, MAX_CARD_AMOUNT_USD,
    MIN_CARD_AMOUNT_USD,
};
use logos_pay::reputation::ReputationError;
use serde::Deserialize;
use serde_json::json;

/// Card issuance routes plus the operational endpoints. The upstream-facing
/// handlers translate collaborator answers one-to-one; no workflow state is
/// held server-side.
pub(crate) fn with_card_routes(services: CardServices) -> Router {
    Router::new()
        .route("/api/reputation", get(reputation_endpoint))
        .route("/api/starpay/price", get(price_endpoint))
        .route("/api/starpay/order", post(create_order_endpoint))
        .route("/api/starpay/status", get(order_status_endpoint))
        .with_state(services)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReputationParams {
    #[serde(default)]
    address: Option<String>,
}

pub(crate) async fn reputation_endpoint(
    State(services): State<CardServices>,
    Query(params): Query<ReputationParams>,
) -> Response {
    let address = params
        .address
        .as_deref()
        .map(str::trim)
        .filter(|address| !address.is_empty());
    let Some(address) = address else {
        return bad_request("Address is required");
    };

    match services.reputation.fetch_score(address).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(ReputationError::UnknownAddress) => {
            let payload = json!({
                "score": null,
                "source": "ethos",
                "error": "User not found",
            });
            (StatusCode::NOT_FOUND, Json(payload)).into_response()
        }
        Err(_) => {
            let payload = json!({ "error": "Failed to fetch reputation score" });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PriceParams {
    #[serde(default)]
    amount: Option<String>,
}

pub(crate) async fn price_endpoint(
    State(services): State<CardServices>,
    Query(params): Query<PriceParams>,
) -> Response {
    let raw = params
        .amount
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty());
    let Some(raw) = raw else {
        return bad_request("Amount required");
    };

    let amount = raw
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .filter(|value| (MIN_CARD_AMOUNT_USD..=MAX_CARD_AMOUNT_USD).contains(value));
    let Some(amount) = amount else {
        return bad_request(&OrderValidationError::AmountOutOfRange.to_string());
    };

    match services.starpay.quote_price(amount).await {
        Ok(pricing) => (StatusCode::OK, Json(json!({ "pricing": pricing }))).into_response(),
        Err(err) => gateway_error_response(err),
    }
}

/// Intake body; every field optional so validation can answer with the
/// buyer-facing message instead of a deserialization error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CardOrderDraft {
    #[serde(default)]
    amount: Option<f64>,
    #[serde(default)]
    card_type: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

pub(crate) async fn create_order_endpoint(
    State(services): State<CardServices>,
    Json(draft): Json<CardOrderDraft>,
) -> Response {
    let request = match CardOrderRequest::from_parts(
        draft.amount,
        draft.card_type.as_deref(),
        draft.email.as_deref(),
    ) {
        Ok(request) => request,
        Err(err) => return bad_request(&err.to_string()),
    };

    match services.starpay.create_card_order(&request).await {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(err) => gateway_error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusParams {
    #[serde(default, rename = "orderId")]
    order_id: Option<String>,
}

pub(crate) async fn order_status_endpoint(
    State(services): State<CardServices>,
    Query(params): Query<StatusParams>,
) -> Response {
    let order_id = params
        .order_id
        .as_deref()
        .map(str::trim)
        .filter(|order_id| !order_id.is_empty());
    let Some(order_id) = order_id else {
        return bad_request("Order ID required");
    };

    match services
        .starpay
        .order_status(&OrderId(order_id.to_string()))
        .await
    {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => gateway_error_response(err),
    }
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

/// Issuer rejections pass their status and message through; everything else
/// is a bad gateway.
fn gateway_error_response(err: OrderGatewayError) -> Response {
    match err {
        OrderGatewayError::Rejected { status, message } => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (status, Json(json!({ "error": message }))).into_response()
        }
        other => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": other.to_string() })),
        )
            .into_response(),
    }
}
