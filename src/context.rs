//! Execution context carrying a deadline and cooperative cancellation

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Deadline and cancellation scope for one bootstrap invocation
#[derive(Clone, Debug, Default)]
pub struct ExecutionContext {
    deadline: Option<Instant>,
    cancel: CancellationToken,
}

impl ExecutionContext {
    /// Context with no deadline that is never cancelled unless asked to
    pub fn background() -> Self {
        Self::default()
    }

    /// Context that expires `timeout` from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::background().deadline_at(Instant::now() + timeout)
    }

    /// Replace the deadline, keeping the cancellation token
    pub fn deadline_at(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Earliest of the context deadline and `now + budget`
    pub fn deadline_within(&self, budget: Duration) -> Instant {
        let local = Instant::now() + budget;
        match self.deadline {
            Some(deadline) if deadline < local => deadline,
            _ => local,
        }
    }
}
