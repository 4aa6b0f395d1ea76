//! Bounded polling shared by the readiness gate and the dependent patcher

use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::{interval_at, sleep_until, Instant, MissedTickBehavior};
use tracing::trace;

use crate::context::ExecutionContext;

/// tokio intervals reject a zero period
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Why a wait ended without the probe succeeding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCause {
    DeadlineExceeded,
    Cancelled,
}

impl fmt::Display for WaitCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCause::DeadlineExceeded => write!(f, "deadline exceeded"),
            WaitCause::Cancelled => write!(f, "context cancelled"),
        }
    }
}

/// A wait that gave up, with the last probe failure if any probe ran
#[derive(Debug)]
pub struct WaitExpired<E> {
    pub cause: WaitCause,
    pub last_error: Option<E>,
}

/// Poll `probe` every `interval` until it succeeds, the context is cancelled,
/// or `budget` (capped by the context deadline) elapses.
///
/// The first probe runs one full interval after the call; every probe consumes
/// one tick. A probe already in flight is never interrupted.
pub async fn poll_until_ready<T, E, F, Fut>(
    ctx: &ExecutionContext,
    budget: Duration,
    interval: Duration,
    target: &str,
    mut probe: F,
) -> Result<T, WaitExpired<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let expiry = sleep_until(ctx.deadline_within(budget));
    tokio::pin!(expiry);

    let interval = interval.max(MIN_POLL_INTERVAL);
    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut last_error = None;

    loop {
        tokio::select! {
            biased;
            _ = ctx.cancellation_token().cancelled() => {
                return Err(WaitExpired { cause: WaitCause::Cancelled, last_error });
            }
            _ = &mut expiry => {
                return Err(WaitExpired { cause: WaitCause::DeadlineExceeded, last_error });
            }
            _ = ticker.tick() => {
                crate::metrics::POLLS.with_label_values(&[target]).inc();
                match probe().await {
                    Ok(value) => return Ok(value),
                    Err(e) => {
                        trace!(probe = target, "Probe not ready yet: {}", e);
                        last_error = Some(e);
                    }
                }
            }
        }
    }
}
