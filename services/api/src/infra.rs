use std::collections::VecDeque;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use logos_pay::error::AppError;
use logos_pay::orders::{
    CardOrder, CardOrderRequest, DashboardRefresh, OrderGateway, OrderGatewayError, OrderId,
    OrderStatus, PaymentDestination, RefreshError, RefreshPublisher, StarpayClient, StatusReport,
};
use logos_pay::pricing::PricingBreakdown;
use logos_pay::reputation::EthosClient;
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Upstream clients shared by the card routes.
#[derive(Clone)]
pub(crate) struct CardServices {
    pub(crate) reputation: Arc<EthosClient>,
    pub(crate) starpay: Arc<StarpayClient>,
}

/// One pooled outbound client for every upstream; slow collaborators are cut
/// off rather than holding request handlers open.
pub(crate) fn shared_http_client() -> Result<reqwest::Client, AppError> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?)
}

/// Issuer stand-in for the CLI demo: orders are accepted locally and status
/// polls walk a scripted settlement sequence, `pending` once exhausted.
pub(crate) struct ScriptedIssuer {
    rounds: Mutex<VecDeque<OrderStatus>>,
}

impl ScriptedIssuer {
    pub(crate) fn settling(rounds: impl IntoIterator<Item = OrderStatus>) -> Self {
        Self {
            rounds: Mutex::new(rounds.into_iter().collect()),
        }
    }

    pub(crate) fn never_settling() -> Self {
        Self::settling([])
    }
}

impl OrderGateway for ScriptedIssuer {
    async fn create_order(
        &self,
        request: &CardOrderRequest,
    ) -> Result<CardOrder, OrderGatewayError> {
        let pricing = PricingBreakdown::quote(request.amount, 2.5, 5.0);
        let created_at = Utc::now();

        Ok(CardOrder {
            order_id: OrderId("demo_order_1".to_string()),
            status: OrderStatus::Pending,
            payment_destination: PaymentDestination {
                address: "DemoPay1111111111111111111111111111111111".to_string(),
                amount: pricing.total / 150.0,
                reference_price: 150.0,
            },
            pricing,
            created_at,
            expires_at: created_at + chrono::Duration::minutes(30),
        })
    }

    async fn fetch_status(&self, order_id: &OrderId) -> Result<StatusReport, OrderGatewayError> {
        let status = self
            .rounds
            .lock()
            .expect("scripted rounds mutex poisoned")
            .pop_front()
            .unwrap_or(OrderStatus::Pending);

        Ok(StatusReport {
            order_id: order_id.clone(),
            status,
            details: None,
        })
    }
}

#[derive(Default)]
pub(crate) struct RecordingRefreshHook {
    events: Mutex<Vec<DashboardRefresh>>,
}

impl RecordingRefreshHook {
    pub(crate) fn events(&self) -> Vec<DashboardRefresh> {
        self.events.lock().expect("refresh mutex poisoned").clone()
    }
}

impl RefreshPublisher for RecordingRefreshHook {
    fn publish(&self, refresh: DashboardRefresh) -> Result<(), RefreshError> {
        self.events
            .lock()
            .expect("refresh mutex poisoned")
            .push(refresh);
        Ok(())
    }
}
