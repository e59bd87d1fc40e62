//! Time source for the wait loop.
//!
//! Production waits run on [`SystemClock`]. Tests use [`ManualClock`],
//! whose time only moves when the engine sleeps or the test calls
//! [`ManualClock::advance`], which makes timing scenarios exact and
//! instant.

use crate::cancel::CancellationToken;
use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A monotonic time source that can sleep interruptibly
pub trait Clock: Debug + Send + Sync {
    /// Time since this clock's origin
    fn now(&self) -> Duration;

    /// Sleep for `duration`, waking early on cancellation.
    ///
    /// Returns `true` if the sleep ended because of cancellation.
    fn sleep(&self, duration: Duration, cancel: Option<&CancellationToken>) -> bool;
}

/// Real time, measured from construction
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose origin is now
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn sleep(&self, duration: Duration, cancel: Option<&CancellationToken>) -> bool {
        match cancel {
            Some(token) => token.sleep(duration),
            None => {
                std::thread::sleep(duration);
                false
            }
        }
    }
}

/// Virtual time for deterministic tests.
///
/// Clones share the same time, so a test can hand one clone to the
/// engine and another to a scripted session.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_us: Arc<AtomicU64>,
}

impl ManualClock {
    /// Create a clock at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Move time forward
    pub fn advance(&self, duration: Duration) {
        let us = u64::try_from(duration.as_micros()).unwrap_or(u64::MAX);
        self.now_us.fetch_add(us, Ordering::SeqCst);
    }

    /// Current virtual time in milliseconds
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.now_us.load(Ordering::SeqCst) / 1_000
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.now_us.load(Ordering::SeqCst))
    }

    fn sleep(&self, duration: Duration, cancel: Option<&CancellationToken>) -> bool {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            return true;
        }
        self.advance(duration);
        cancel.is_some_and(CancellationToken::is_cancelled)
    }
}
