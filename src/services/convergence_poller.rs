//! Bounded fixed-delay convergence polling.
//!
//! The poller drives a probe to completion through an explicit state
//! machine (`Idle -> Scheduled -> Running -> {Converged | Exhausted}
//! -> Stopped`) rather than recursive callback rescheduling, so the
//! budget decrement and the cancellation points are unambiguous.
//!
//! Fixed delay plus a hard tick budget, not exponential backoff: the
//! worst-case latency of a UI-facing operation stays predictable, and
//! budget x delay is the sole timeout mechanism.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::select;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tracing::{debug, trace};

use crate::domain::errors::{ConsoleError, ConsoleResult};

/// Observable poller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PollerState {
    /// Constructed, not yet scheduled.
    Idle,
    /// Waiting out the fixed delay before the next tick.
    Scheduled,
    /// A probe invocation is in flight.
    Running {
        /// Zero-based tick being executed.
        tick: u32,
    },
    /// The probe reported convergence.
    Converged {
        /// Probe invocations performed.
        ticks: u32,
    },
    /// The tick budget ran out while the probe still wanted to continue.
    Exhausted {
        /// Probe invocations performed (equals the budget).
        ticks: u32,
    },
    /// Terminated by cancellation or probe failure.
    Stopped,
}

/// Terminal result of a poll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// The probe reported convergence on the final tick.
    Converged {
        /// Probe invocations performed.
        ticks: u32,
    },
    /// The budget was consumed without observing convergence. Not an
    /// error: the caller treats "gave up polling" distinctly from
    /// "probe failed".
    Exhausted {
        /// Probe invocations performed.
        ticks: u32,
    },
    /// [`ConvergencePoller::cancel`] took effect first.
    Cancelled {
        /// Probe invocations completed before cancellation.
        ticks: u32,
    },
}

/// Repeatedly invokes a probe at a fixed delay until it reports
/// convergence, the tick budget is exhausted, the probe fails, or the
/// poller is cancelled.
///
/// Ticks are strictly sequential: tick N+1 never starts before tick
/// N's probe has returned. The probe performs the externally visible
/// side effects itself and returns whether polling should continue; a
/// probe error (transport failure) terminates the run immediately and
/// is surfaced to the caller, never silently retried.
pub struct ConvergencePoller {
    delay: Duration,
    budget: u32,
    state: RwLock<PollerState>,
    cancel_tx: broadcast::Sender<()>,
    cancelled: Arc<AtomicBool>,
}

impl ConvergencePoller {
    /// Create a poller with a fixed inter-tick delay and a tick budget.
    pub fn new(delay: Duration, budget: u32) -> Self {
        let (cancel_tx, _) = broadcast::channel(1);
        Self {
            delay,
            budget,
            state: RwLock::new(PollerState::Idle),
            cancel_tx,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> PollerState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancel the poller. Takes effect before the next scheduled tick
    /// fires; an in-flight probe may complete, but its side effects
    /// must be discarded by whoever observes [`Self::cancel_flag`].
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.cancel_tx.send(());
    }

    /// Shared cancellation flag for probe closures, checked before
    /// applying a completed fetch to shared state.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    fn set_state(&self, next: PollerState) {
        *self.state.write().unwrap_or_else(PoisonError::into_inner) = next;
    }

    /// Run the poll loop to a terminal state.
    ///
    /// Each iteration waits the fixed delay, then invokes the probe
    /// exactly once with the zero-based tick number. `Ok(true)` means
    /// "not yet converged, keep polling"; `Ok(false)` stops
    /// immediately without consuming the remaining budget.
    ///
    /// A poller runs at most once: a second call, whether concurrent
    /// or after the first run terminated, returns
    /// [`ConsoleError::InvalidState`].
    pub async fn run<F, Fut>(&self, mut probe: F) -> ConsoleResult<PollOutcome>
    where
        F: FnMut(u32) -> Fut + Send,
        Fut: Future<Output = ConsoleResult<bool>> + Send,
    {
        {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            if *state != PollerState::Idle {
                return Err(ConsoleError::InvalidState(
                    "poller has already been run".to_string(),
                ));
            }
            *state = PollerState::Scheduled;
        }

        let mut cancel_rx = self.cancel_tx.subscribe();
        let mut ticks: u32 = 0;

        loop {
            if self.cancelled.load(Ordering::SeqCst) {
                self.set_state(PollerState::Stopped);
                return Ok(PollOutcome::Cancelled { ticks });
            }

            if ticks >= self.budget {
                self.set_state(PollerState::Exhausted { ticks });
                debug!(ticks, budget = self.budget, "poll budget exhausted");
                return Ok(PollOutcome::Exhausted { ticks });
            }

            self.set_state(PollerState::Scheduled);
            select! {
                _ = cancel_rx.recv() => {
                    self.set_state(PollerState::Stopped);
                    debug!(ticks, "poller cancelled before next tick");
                    return Ok(PollOutcome::Cancelled { ticks });
                }
                () = sleep(self.delay) => {}
            }

            self.set_state(PollerState::Running { tick: ticks });
            trace!(tick = ticks, "probe tick");
            let keep_polling = match probe(ticks).await {
                Ok(keep) => keep,
                Err(e) => {
                    self.set_state(PollerState::Stopped);
                    return Err(e);
                }
            };
            ticks += 1;

            // Cancellation that landed while the probe was in flight:
            // the probe has already discarded its side effects.
            if self.cancelled.load(Ordering::SeqCst) {
                self.set_state(PollerState::Stopped);
                return Ok(PollOutcome::Cancelled { ticks });
            }

            if !keep_polling {
                self.set_state(PollerState::Converged { ticks });
                debug!(ticks, "convergence observed");
                return Ok(PollOutcome::Converged { ticks });
            }
        }
    }
}

impl std::fmt::Debug for ConvergencePoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvergencePoller")
            .field("delay", &self.delay)
            .field("budget", &self.budget)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
