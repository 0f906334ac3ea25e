use std::future::Future;

use serde::{Deserialize, Serialize};

use super::domain::{CardOrder, CardOrderRequest, OrderId, OrderStatus, StatusReport};

/// Issuer abstraction so the session driver can be exercised in isolation.
/// Futures are `Send` so sessions can live inside server tasks.
pub trait OrderGateway: Send + Sync {
    fn create_order(
        &self,
        request: &CardOrderRequest,
    ) -> impl Future<Output = Result<CardOrder, OrderGatewayError>> + Send;

    fn fetch_status(
        &self,
        order_id: &OrderId,
    ) -> impl Future<Output = Result<StatusReport, OrderGatewayError>> + Send;
}

/// Error enumeration for issuer calls.
#[derive(Debug, thiserror::Error)]
pub enum OrderGatewayError {
    #[error("card issuer request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("card issuer rejected the request: {message}")]
    Rejected { status: u16, message: String },
    #[error("card issuer payload was unreadable: {0}")]
    MalformedPayload(String),
}

/// Trait describing the downstream refresh hook fired after a completed
/// purchase settles (dashboard balances, card listings).
pub trait RefreshPublisher: Send + Sync {
    fn publish(&self, refresh: DashboardRefresh) -> Result<(), RefreshError>;
}

/// Refresh payload so integrations and tests can assert the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardRefresh {
    pub order_id: OrderId,
    pub settled_status: OrderStatus,
}

/// Refresh dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("refresh hook unavailable: {0}")]
    Unavailable(String),
}
