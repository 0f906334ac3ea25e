use std::sync::Arc;

use tokio::time::{interval_at, sleep, sleep_until, Instant, Interval};
use tracing::debug;

use super::domain::{CardOrder, CardOrderRequest, OrderStatus};
use super::flow::{OrderFlow, OrderFlowError, OrderFlowState, OrderFlowTimings, PollOutcome};
use super::gateway::{
    DashboardRefresh, OrderGateway, OrderGatewayError, RefreshError, RefreshPublisher,
};

/// Drives one buyer's order slot against the issuer: creation, payment
/// confirmation, settlement polling under a hard ceiling, and the deferred
/// dashboard refresh after completion.
///
/// The driver owns the timers. Both are armed by `confirm_payment_sent` and
/// torn down on every terminal transition, so a settled session holds no
/// pending timer state.
pub struct OrderSession<G, N> {
    gateway: Arc<G>,
    refresh: Arc<N>,
    timings: OrderFlowTimings,
    flow: OrderFlow,
    ticker: Option<Interval>,
    poll_deadline: Option<Instant>,
}

impl<G, N> OrderSession<G, N>
where
    G: OrderGateway + 'static,
    N: RefreshPublisher + 'static,
{
    pub fn new(gateway: Arc<G>, refresh: Arc<N>, timings: OrderFlowTimings) -> Self {
        Self {
            gateway,
            refresh,
            timings,
            flow: OrderFlow::new(),
            ticker: None,
            poll_deadline: None,
        }
    }

    pub fn state(&self) -> OrderFlowState {
        self.flow.state()
    }

    pub fn generation(&self) -> u64 {
        self.flow.generation()
    }

    pub fn current_order(&self) -> Option<&CardOrder> {
        self.flow.active_order()
    }

    /// Create an order with the issuer. Supersedes any active session first;
    /// issuer rejections and missing payment destinations reset the slot.
    pub async fn submit(
        &mut self,
        request: &CardOrderRequest,
    ) -> Result<CardOrder, OrderSessionError> {
        self.stop_timers();
        let generation = self.flow.submit();

        match self.gateway.create_order(request).await {
            Ok(order) => {
                let accepted = order.clone();
                self.flow.order_created(generation, order)?;
                Ok(accepted)
            }
            Err(err) => {
                self.flow.creation_failed(generation);
                Err(OrderSessionError::Gateway(err))
            }
        }
    }

    /// Buyer reports the payment as sent; arms the poll ticker and the
    /// session ceiling.
    pub fn confirm_payment_sent(&mut self) -> Result<(), OrderSessionError> {
        self.flow.confirm_payment_sent()?;

        let start = Instant::now();
        self.ticker = Some(interval_at(
            start + self.timings.poll_interval,
            self.timings.poll_interval,
        ));
        self.poll_deadline = Some(start + self.timings.poll_ceiling);
        Ok(())
    }

    /// One polling round: wait for the next tick (or the ceiling), ask the
    /// issuer, fold the answer into the flow. Transport and payload errors
    /// count as a missed round and polling continues; the ceiling wins any
    /// tie with the ticker.
    pub async fn poll_step(&mut self) -> Result<PollOutcome, OrderSessionError> {
        let deadline = self.poll_deadline.ok_or_else(|| self.not_polling())?;

        {
            let ticker = match self.ticker.as_mut() {
                Some(ticker) => ticker,
                None => return Err(self.not_polling()),
            };
            tokio::select! {
                biased;
                _ = sleep_until(deadline) => {
                    return Ok(self.expire());
                }
                _ = ticker.tick() => {}
            }
        }

        let gateway = Arc::clone(&self.gateway);
        let order_id = match self.flow.active_order().map(|order| order.order_id.clone()) {
            Some(order_id) => order_id,
            None => return Err(self.not_polling()),
        };
        let generation = self.flow.generation();

        let fetched = tokio::select! {
            biased;
            _ = sleep_until(deadline) => None,
            result = gateway.fetch_status(&order_id) => Some(result),
        };

        match fetched {
            None => Ok(self.expire()),
            Some(Err(err)) => {
                debug!(order_id = %order_id.as_str(), error = %err, "status poll missed; retrying next tick");
                Ok(PollOutcome::Continue)
            }
            Some(Ok(report)) => {
                let outcome = self.flow.apply_status(generation, report.status);
                if !matches!(outcome, PollOutcome::Continue) {
                    self.stop_timers();
                }
                Ok(outcome)
            }
        }
    }

    /// Poll until the session settles. `Completed` runs the completion hold
    /// and fires exactly one dashboard refresh before releasing the slot;
    /// `Failed` and `Expired` return with polling already stopped.
    pub async fn await_settlement(&mut self) -> Result<OrderStatus, OrderSessionError> {
        self.confirm_payment_sent()?;

        loop {
            match self.poll_step().await? {
                PollOutcome::Continue => {}
                PollOutcome::Completed => {
                    self.finalize_completed().await?;
                    return Ok(OrderStatus::Completed);
                }
                PollOutcome::Failed => return Ok(OrderStatus::Failed),
                PollOutcome::Expired => return Ok(OrderStatus::Expired),
                PollOutcome::Stale => return Err(OrderFlowError::Superseded.into()),
            }
        }
    }

    /// Operator bypass for a session stuck in polling.
    pub fn force_complete(&mut self) -> Result<(), OrderSessionError> {
        self.flow.force_complete()?;
        self.stop_timers();
        Ok(())
    }

    /// Hold the completed order visible, then fire the refresh and release
    /// the slot. Skips the refresh if the session was superseded meanwhile.
    pub async fn finalize_completed(&mut self) -> Result<(), OrderSessionError> {
        let generation = self.flow.generation();
        let order_id = match self.flow.active_order().map(|order| order.order_id.clone()) {
            Some(order_id) => order_id,
            None => return Ok(()),
        };

        sleep(self.timings.completion_hold).await;

        if self.flow.is_current(generation) && self.flow.state() == OrderFlowState::Completed {
            self.refresh.publish(DashboardRefresh {
                order_id,
                settled_status: OrderStatus::Completed,
            })?;
            self.flow.finish_completion(generation);
        }
        Ok(())
    }

    /// Local teardown; no issuer call is made.
    pub fn cancel(&mut self) -> Result<(), OrderSessionError> {
        self.flow.cancel()?;
        self.stop_timers();
        Ok(())
    }

    fn expire(&mut self) -> PollOutcome {
        let generation = self.flow.generation();
        self.stop_timers();
        if self.flow.ceiling_elapsed(generation) {
            PollOutcome::Expired
        } else {
            PollOutcome::Stale
        }
    }

    fn stop_timers(&mut self) {
        self.ticker = None;
        self.poll_deadline = None;
    }

    fn not_polling(&self) -> OrderSessionError {
        OrderFlowError::InvalidTransition {
            state: self.flow.state().label(),
            action: "poll",
        }
        .into()
    }
}

/// Error raised by the session driver.
#[derive(Debug, thiserror::Error)]
pub enum OrderSessionError {
    #[error(transparent)]
    Flow(#[from] OrderFlowError),
    #[error(transparent)]
    Gateway(#[from] OrderGatewayError),
    #[error(transparent)]
    Refresh(#[from] RefreshError),
}
