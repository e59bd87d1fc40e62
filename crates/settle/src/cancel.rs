//! Cooperative cancellation for blocking waits.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct Shared {
    cancelled: Mutex<bool>,
    wake: Condvar,
}

/// A cloneable cancellation signal.
///
/// All clones observe the same flag. [`CancellationToken::sleep`] blocks
/// on a condition variable, so a `cancel()` from another thread wakes a
/// sleeping waiter immediately instead of after the full interval.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    shared: Arc<Shared>,
}

impl CancellationToken {
    /// Create a token that is not cancelled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn flag(&self) -> MutexGuard<'_, bool> {
        self.shared
            .cancelled
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Request cancellation and wake every sleeper. Idempotent.
    pub fn cancel(&self) {
        *self.flag() = true;
        self.shared.wake.notify_all();
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.flag()
    }

    /// Sleep for `duration` unless cancelled first.
    ///
    /// Returns `true` if the token was (or became) cancelled.
    ///
    /// A `duration` too large to represent as a deadline sleeps until
    /// cancelled.
    pub fn sleep(&self, duration: Duration) -> bool {
        let Some(deadline) = Instant::now().checked_add(duration) else {
            return self.sleep_until_cancelled();
        };
        let mut cancelled = self.flag();
        loop {
            if *cancelled {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            cancelled = self
                .shared
                .wake
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    fn sleep_until_cancelled(&self) -> bool {
        let mut cancelled = self.flag();
        while !*cancelled {
            cancelled = self
                .shared
                .wake
                .wait(cancelled)
                .unwrap_or_else(PoisonError::into_inner);
        }
        true
    }
}
