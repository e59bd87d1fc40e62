//! The wait engine.
//!
//! Polls a [`Condition`] against a [`BrowserSession`] until it is
//! satisfied, reports a permanent failure, runs out of time, or is
//! cancelled. Each call produces exactly one [`WaitOutcome`].
//!
//! ## Timing
//!
//! - The first evaluation happens immediately, with no initial sleep.
//! - Elapsed time is always measured from the start of the request, so a
//!   slow condition cannot stretch the deadline.
//! - The last sleep is clamped to the time left, so the final poll lands
//!   on the deadline and a timed-out wait reports an elapsed time within
//!   one poll interval of the timeout.

use crate::cancel::CancellationToken;
use crate::clock::{Clock, SystemClock};
use crate::condition::{Condition, Poll};
use crate::locator::Locator;
use crate::result::{SettleError, SettleResult};
use crate::session::{BrowserSession, SessionError};
use crate::settings::{validate_timing, WaitSettings};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

// =============================================================================
// WAIT REQUEST
// =============================================================================

/// One wait: a condition plus its timing and an optional cancellation signal.
///
/// Construction validates `poll_interval > 0` and `timeout >= poll_interval`,
/// so an invalid request is rejected before anything is polled.
#[derive(Debug)]
pub struct WaitRequest<C> {
    condition: C,
    timeout: Duration,
    poll_interval: Duration,
    cancellation: Option<CancellationToken>,
}

impl<C: Condition> WaitRequest<C> {
    /// Create a request
    ///
    /// # Errors
    ///
    /// Returns [`SettleError::InvalidRequest`] if the timing invariant is violated.
    pub fn new(condition: C, timeout: Duration, poll_interval: Duration) -> SettleResult<Self> {
        validate_timing(timeout, poll_interval)?;
        Ok(Self {
            condition,
            timeout,
            poll_interval,
            cancellation: None,
        })
    }

    /// Create a request from configured settings
    ///
    /// # Errors
    ///
    /// Returns [`SettleError::InvalidRequest`] if the settings are invalid.
    pub fn from_settings(condition: C, settings: &WaitSettings) -> SettleResult<Self> {
        Self::new(condition, settings.timeout(), settings.poll_interval())
    }

    /// Make the request cancellable through `token`
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The condition being waited for
    #[must_use]
    pub const fn condition(&self) -> &C {
        &self.condition
    }

    /// Total time budget
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Pause between polls
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Cancellation token, if any
    #[must_use]
    pub const fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }
}

// =============================================================================
// WAIT OUTCOME
// =============================================================================

/// Why a wait failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The condition reported it can never be satisfied
    Condition(String),
    /// The browser session raised an error
    Session(SessionError),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Condition(reason) => write!(f, "{reason}"),
            Self::Session(err) => write!(f, "{err}"),
        }
    }
}

/// Terminal result of a wait request
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum WaitOutcome<T> {
    /// Condition satisfied
    Success {
        /// Value produced by the condition
        value: T,
        /// Time from request start to the satisfying poll
        elapsed: Duration,
        /// Number of polls, including the satisfying one
        polls: u32,
    },
    /// Time budget exhausted
    TimedOut {
        /// Time from request start to the final poll
        elapsed: Duration,
        /// Number of polls
        polls: u32,
        /// What the last poll observed
        last_observed: Option<String>,
    },
    /// Cancelled by the caller
    Cancelled {
        /// Time from request start to noticing the cancellation
        elapsed: Duration,
        /// Number of polls completed
        polls: u32,
    },
    /// Condition failed permanently or the session faulted
    Failed {
        /// Time from request start to the failing poll
        elapsed: Duration,
        /// Number of polls, including the failing one
        polls: u32,
        /// Why it failed
        cause: FailureCause,
    },
}

impl<T> WaitOutcome<T> {
    /// Whether the condition was satisfied
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Whether the wait timed out
    #[must_use]
    pub const fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Whether the caller cancelled the wait
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Whether the wait failed
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Elapsed time, for any variant
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        match self {
            Self::Success { elapsed, .. }
            | Self::TimedOut { elapsed, .. }
            | Self::Cancelled { elapsed, .. }
            | Self::Failed { elapsed, .. } => *elapsed,
        }
    }

    /// Number of polls performed, for any variant
    #[must_use]
    pub const fn polls(&self) -> u32 {
        match self {
            Self::Success { polls, .. }
            | Self::TimedOut { polls, .. }
            | Self::Cancelled { polls, .. }
            | Self::Failed { polls, .. } => *polls,
        }
    }

    /// Satisfied value, if any
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Success { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Short variant label for logs and CLI output
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::TimedOut { .. } => "timed_out",
            Self::Cancelled { .. } => "cancelled",
            Self::Failed { .. } => "failed",
        }
    }

    /// Convert into a `Result` with an actionable error.
    ///
    /// `condition` and `locator` end up in the error message so a failing
    /// test step says what it was waiting for, where, and for how long.
    ///
    /// # Errors
    ///
    /// Returns `WaitTimedOut`, `WaitCancelled` or `WaitFailed` for every
    /// non-success variant.
    pub fn into_result(
        self,
        condition: impl Into<String>,
        locator: Option<String>,
    ) -> SettleResult<T> {
        let condition = condition.into();
        match self {
            Self::Success { value, .. } => Ok(value),
            Self::TimedOut {
                elapsed,
                polls,
                last_observed,
            } => Err(SettleError::WaitTimedOut {
                condition,
                locator,
                elapsed_ms: millis(elapsed),
                polls,
                last_observed: last_observed.unwrap_or_else(|| "nothing".to_string()),
            }),
            Self::Cancelled { elapsed, .. } => Err(SettleError::WaitCancelled {
                condition,
                locator,
                elapsed_ms: millis(elapsed),
            }),
            Self::Failed { elapsed, cause, .. } => {
                let reason = cause.to_string();
                let source = match cause {
                    FailureCause::Session(err) => Some(err),
                    FailureCause::Condition(_) => None,
                };
                Err(SettleError::WaitFailed {
                    condition,
                    locator,
                    elapsed_ms: millis(elapsed),
                    reason,
                    source,
                })
            }
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

// =============================================================================
// WAIT ENGINE
// =============================================================================

/// Polls conditions until they settle.
///
/// The engine holds no per-request state; one instance can serve any
/// number of concurrent callers, each on its own thread with its own
/// request.
#[derive(Debug, Clone)]
pub struct WaitEngine {
    clock: Arc<dyn Clock>,
}

impl Default for WaitEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl WaitEngine {
    /// Create an engine on real time
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }

    /// Create an engine on a custom clock
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
        }
    }

    /// Run a wait request to completion
    pub fn wait<C: Condition>(
        &self,
        session: &dyn BrowserSession,
        request: WaitRequest<C>,
    ) -> WaitOutcome<C::Output> {
        let WaitRequest {
            condition,
            timeout,
            poll_interval,
            cancellation,
        } = request;
        let token = cancellation.as_ref();
        let description = condition.description();
        let start = self.clock.now();
        let elapsed = || self.clock.now().saturating_sub(start);

        let mut polls: u32 = 0;
        let mut last_observed: Option<String> = None;

        loop {
            if token.is_some_and(CancellationToken::is_cancelled) {
                let elapsed = elapsed();
                info!(condition = %description, ?elapsed, polls, "wait cancelled");
                return WaitOutcome::Cancelled { elapsed, polls };
            }

            polls += 1;
            let verdict = condition.check(session);
            let now = elapsed();

            match verdict {
                Ok(Poll::Satisfied(value)) => {
                    debug!(condition = %description, elapsed = ?now, polls, "wait satisfied");
                    return WaitOutcome::Success {
                        value,
                        elapsed: now,
                        polls,
                    };
                }
                Ok(Poll::PermanentlyFailed(reason)) => {
                    warn!(condition = %description, elapsed = ?now, polls, %reason, "condition can never be satisfied");
                    return WaitOutcome::Failed {
                        elapsed: now,
                        polls,
                        cause: FailureCause::Condition(reason),
                    };
                }
                Err(err) => {
                    warn!(condition = %description, elapsed = ?now, polls, error = %err, "session error while polling");
                    return WaitOutcome::Failed {
                        elapsed: now,
                        polls,
                        cause: FailureCause::Session(err),
                    };
                }
                Ok(Poll::NotYetSatisfied(observed)) => {
                    trace!(condition = %description, elapsed = ?now, polls, %observed, "not yet satisfied");
                    last_observed = Some(observed);
                }
            }

            if now >= timeout {
                info!(
                    condition = %description,
                    elapsed = ?now,
                    polls,
                    last_observed = last_observed.as_deref().unwrap_or(""),
                    "wait timed out"
                );
                return WaitOutcome::TimedOut {
                    elapsed: now,
                    polls,
                    last_observed,
                };
            }

            let pause = poll_interval.min(timeout - now);
            if self.clock.sleep(pause, token) {
                let elapsed = elapsed();
                info!(condition = %description, ?elapsed, polls, "wait cancelled during sleep");
                return WaitOutcome::Cancelled { elapsed, polls };
            }
        }
    }

    /// Wait and convert the outcome into a `Result`
    ///
    /// # Errors
    ///
    /// Returns an actionable [`SettleError`] for every non-success outcome.
    pub fn wait_for<C: Condition>(
        &self,
        session: &dyn BrowserSession,
        request: WaitRequest<C>,
    ) -> SettleResult<C::Output> {
        let description = request.condition().description();
        let locator = request.condition().locator().map(Locator::to_string);
        self.wait(session, request).into_result(description, locator)
    }
}

// =============================================================================
// TESTS
// =============================================================================
