//! Card order lifecycle: intake validation, the issuer gateway, and the
//! polling state machine that walks an order from creation to settlement.
//!
//! [`flow::OrderFlow`] is the synchronous core; [`session::OrderSession`]
//! wraps it with the timers and issuer calls. Sessions are superseded, never
//! shared: a new submission bumps the generation counter and everything still
//! in flight for the old session is dropped on arrival.

pub mod client;
pub mod domain;
pub mod flow;
pub mod gateway;
pub mod session;

pub use client::StarpayClient;
pub use domain::{
    CardKind, CardOrder, CardOrderRequest, OrderId, OrderStatus, OrderValidationError,
    PaymentDestination, StatusReport, MAX_CARD_AMOUNT_USD, MIN_CARD_AMOUNT_USD,
};
pub use flow::{
    OrderFlow, OrderFlowError, OrderFlowState, OrderFlowTimings, PollOutcome, PollStage,
};
pub use gateway::{
    DashboardRefresh, OrderGateway, OrderGatewayError, RefreshError, RefreshPublisher,
};
pub use session::{OrderSession, OrderSessionError};
