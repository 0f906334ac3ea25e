use std::time::Duration;

use serde::Serialize;

use super::domain::{CardOrder, OrderStatus};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_POLL_CEILING: Duration = Duration::from_secs(300);
pub const DEFAULT_COMPLETION_HOLD: Duration = Duration::from_secs(8);

/// Timer settings for one order session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderFlowTimings {
    /// Gap between settlement polls.
    pub poll_interval: Duration,
    /// Hard stop for an unsettled polling session.
    pub poll_ceiling: Duration,
    /// How long a completed order stays visible before the dashboard refresh.
    pub completion_hold: Duration,
}

impl Default for OrderFlowTimings {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            poll_ceiling: DEFAULT_POLL_CEILING,
            completion_hold: DEFAULT_COMPLETION_HOLD,
        }
    }
}

/// Sub-state while a session polls the issuer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PollStage {
    Pending,
    Processing,
}

impl PollStage {
    pub const fn label(self) -> &'static str {
        match self {
            PollStage::Pending => "pending",
            PollStage::Processing => "processing",
        }
    }
}

/// Lifecycle of a single purchase session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderFlowState {
    Idle,
    Creating,
    AwaitingPayment,
    Polling(PollStage),
    Completed,
    Failed,
    Expired,
}

impl OrderFlowState {
    pub const fn label(self) -> &'static str {
        match self {
            OrderFlowState::Idle => "idle",
            OrderFlowState::Creating => "creating",
            OrderFlowState::AwaitingPayment => "awaiting_payment",
            OrderFlowState::Polling(_) => "polling",
            OrderFlowState::Completed => "completed",
            OrderFlowState::Failed => "failed",
            OrderFlowState::Expired => "expired",
        }
    }
}

/// What one applied status means for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Keep polling.
    Continue,
    Completed,
    Failed,
    Expired,
    /// The response belongs to a superseded session; nothing changed.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderFlowError {
    #[error("cannot {action} while the session is {state}")]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
    #[error("order session superseded by a newer submission")]
    Superseded,
    #[error("issuer returned no payment destination address")]
    MissingPaymentDestination,
}

/// State machine for one buyer's order slot.
///
/// The generation counter is the stale-response guard: `submit` and `cancel`
/// bump it, and every deferred event (status responses, the post-completion
/// refresh) must present the generation it was issued under. Mismatches are
/// dropped without touching state.
#[derive(Debug)]
pub struct OrderFlow {
    state: OrderFlowState,
    active: Option<CardOrder>,
    generation: u64,
}

impl Default for OrderFlow {
    fn default() -> Self {
        Self {
            state: OrderFlowState::Idle,
            active: None,
            generation: 0,
        }
    }
}

impl OrderFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> OrderFlowState {
        self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn active_order(&self) -> Option<&CardOrder> {
        self.active.as_ref()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Open a new session, superseding whatever was active. Returns the
    /// generation in-flight work for this session must carry.
    pub fn submit(&mut self) -> u64 {
        self.generation += 1;
        self.active = None;
        self.state = OrderFlowState::Creating;
        self.generation
    }

    /// Attach the issuer's accepted order. Orders without a payment
    /// destination address are rejected and the slot returns to idle.
    pub fn order_created(
        &mut self,
        generation: u64,
        order: CardOrder,
    ) -> Result<(), OrderFlowError> {
        if !self.is_current(generation) {
            return Err(OrderFlowError::Superseded);
        }
        if self.state != OrderFlowState::Creating {
            return Err(OrderFlowError::InvalidTransition {
                state: self.state.label(),
                action: "attach an order",
            });
        }
        if order.payment_destination.address.trim().is_empty() {
            self.state = OrderFlowState::Idle;
            return Err(OrderFlowError::MissingPaymentDestination);
        }

        self.active = Some(order);
        self.state = OrderFlowState::AwaitingPayment;
        Ok(())
    }

    /// Issuer rejected the creation; the slot frees up again.
    pub fn creation_failed(&mut self, generation: u64) {
        if self.is_current(generation) && self.state == OrderFlowState::Creating {
            self.state = OrderFlowState::Idle;
        }
    }

    /// Buyer reports the payment as sent; settlement polling may begin.
    pub fn confirm_payment_sent(&mut self) -> Result<u64, OrderFlowError> {
        if self.state != OrderFlowState::AwaitingPayment {
            return Err(OrderFlowError::InvalidTransition {
                state: self.state.label(),
                action: "confirm payment",
            });
        }
        self.state = OrderFlowState::Polling(PollStage::Pending);
        Ok(self.generation)
    }

    /// Fold one status response into the session.
    pub fn apply_status(&mut self, generation: u64, status: OrderStatus) -> PollOutcome {
        if !self.is_current(generation) || !matches!(self.state, OrderFlowState::Polling(_)) {
            return PollOutcome::Stale;
        }

        if let Some(order) = self.active.as_mut() {
            order.status = status;
        }

        match status {
            OrderStatus::Pending => {
                self.state = OrderFlowState::Polling(PollStage::Pending);
                PollOutcome::Continue
            }
            OrderStatus::Processing => {
                self.state = OrderFlowState::Polling(PollStage::Processing);
                PollOutcome::Continue
            }
            OrderStatus::Completed => {
                self.state = OrderFlowState::Completed;
                PollOutcome::Completed
            }
            OrderStatus::Failed => {
                self.state = OrderFlowState::Failed;
                PollOutcome::Failed
            }
            OrderStatus::Expired => {
                self.state = OrderFlowState::Expired;
                PollOutcome::Expired
            }
        }
    }

    /// The polling ceiling ran out. Returns whether the session expired.
    pub fn ceiling_elapsed(&mut self, generation: u64) -> bool {
        if self.is_current(generation) && matches!(self.state, OrderFlowState::Polling(_)) {
            if let Some(order) = self.active.as_mut() {
                order.status = OrderStatus::Expired;
            }
            self.state = OrderFlowState::Expired;
            true
        } else {
            false
        }
    }

    /// Operator bypass for a session stuck in polling. Callers gate who may
    /// use it; the flow only cares that a poll is actually running.
    pub fn force_complete(&mut self) -> Result<(), OrderFlowError> {
        if !matches!(self.state, OrderFlowState::Polling(_)) {
            return Err(OrderFlowError::InvalidTransition {
                state: self.state.label(),
                action: "force completion",
            });
        }
        if let Some(order) = self.active.as_mut() {
            order.status = OrderStatus::Completed;
        }
        self.state = OrderFlowState::Completed;
        Ok(())
    }

    /// Local teardown. Refused while a terminal callback is pending (the
    /// creation response in `Creating`, the deferred refresh in `Completed`);
    /// everywhere else the slot resets and in-flight responses go stale.
    pub fn cancel(&mut self) -> Result<(), OrderFlowError> {
        match self.state {
            OrderFlowState::Creating | OrderFlowState::Completed => {
                Err(OrderFlowError::InvalidTransition {
                    state: self.state.label(),
                    action: "cancel",
                })
            }
            _ => {
                self.generation += 1;
                self.active = None;
                self.state = OrderFlowState::Idle;
                Ok(())
            }
        }
    }

    /// Completion hold is over; release the slot. Returns whether this
    /// session was still the current one.
    pub fn finish_completion(&mut self, generation: u64) -> bool {
        if self.is_current(generation) && self.state == OrderFlowState::Completed {
            self.active = None;
            self.state = OrderFlowState::Idle;
            true
        } else {
            false
        }
    }
}
