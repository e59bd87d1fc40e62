//! Wait conditions.
//!
//! A condition is a read-only, three-valued predicate over the current
//! browser state. "Not yet" and "never" are different answers: the
//! engine keeps polling the first and stops immediately on the second.

use crate::locator::Locator;
use crate::session::{BrowserSession, SessionError};
use std::fmt;
use std::marker::PhantomData;

/// Verdict of one condition evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll<T> {
    /// Condition holds; carries the value the caller waited for
    Satisfied(T),
    /// Condition does not hold yet; carries what was observed instead
    NotYetSatisfied(String),
    /// Condition can never hold; carries the reason
    PermanentlyFailed(String),
}

impl<T> Poll<T> {
    /// Whether this poll satisfied the condition
    #[must_use]
    pub const fn is_satisfied(&self) -> bool {
        matches!(self, Self::Satisfied(_))
    }

    /// Whether this poll ends the wait (satisfied or permanently failed)
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::NotYetSatisfied(_))
    }

    /// Transform the satisfied value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Poll<U> {
        match self {
            Self::Satisfied(v) => Poll::Satisfied(f(v)),
            Self::NotYetSatisfied(observed) => Poll::NotYetSatisfied(observed),
            Self::PermanentlyFailed(reason) => Poll::PermanentlyFailed(reason),
        }
    }

    /// Shorthand for a not-yet verdict
    #[must_use]
    pub fn not_yet(observed: impl Into<String>) -> Self {
        Self::NotYetSatisfied(observed.into())
    }

    /// Shorthand for a permanent failure
    #[must_use]
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::PermanentlyFailed(reason.into())
    }
}

/// A predicate the wait engine can poll.
///
/// Implementations must be stateless with respect to the browser: `check`
/// may only issue read-only queries. A `SessionError` returned from
/// `check` is treated as an infrastructure fault and ends the wait; errors
/// that merely mean "not there yet" should be mapped to
/// [`Poll::NotYetSatisfied`] by the condition itself.
pub trait Condition {
    /// Value produced when the condition is satisfied
    type Output;

    /// Evaluate once against the current browser state
    fn check(&self, session: &dyn BrowserSession) -> Result<Poll<Self::Output>, SessionError>;

    /// Human-readable description for logs and errors
    fn description(&self) -> String;

    /// Locator this condition targets, if any
    fn locator(&self) -> Option<&Locator> {
        None
    }

    /// Transform the satisfied value
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(Self::Output) -> U,
    {
        Map {
            inner: self,
            func: f,
        }
    }
}

/// A closure-based condition
pub struct FnCondition<F, T> {
    func: F,
    description: String,
    _output: PhantomData<fn() -> T>,
}

impl<F, T> fmt::Debug for FnCondition<F, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCondition")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

impl<F, T> FnCondition<F, T>
where
    F: Fn(&dyn BrowserSession) -> Result<Poll<T>, SessionError>,
{
    /// Create a new function condition
    pub fn new(description: impl Into<String>, func: F) -> Self {
        Self {
            func,
            description: description.into(),
            _output: PhantomData,
        }
    }
}

impl<F, T> Condition for FnCondition<F, T>
where
    F: Fn(&dyn BrowserSession) -> Result<Poll<T>, SessionError>,
{
    type Output = T;

    fn check(&self, session: &dyn BrowserSession) -> Result<Poll<T>, SessionError> {
        (self.func)(session)
    }

    fn description(&self) -> String {
        self.description.clone()
    }
}

/// Condition adapter returned by [`Condition::map`]
#[derive(Debug)]
pub struct Map<C, F> {
    inner: C,
    func: F,
}

impl<C, F, U> Condition for Map<C, F>
where
    C: Condition,
    F: Fn(C::Output) -> U,
{
    type Output = U;

    fn check(&self, session: &dyn BrowserSession) -> Result<Poll<U>, SessionError> {
        Ok(self.inner.check(session)?.map(&self.func))
    }

    fn description(&self) -> String {
        self.inner.description()
    }

    fn locator(&self) -> Option<&Locator> {
        self.inner.locator()
    }
}
