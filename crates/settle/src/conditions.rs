//! Standard condition library.
//!
//! Element conditions take a [`Target`]:
//!
//! - [`Target::Locator`] is re-resolved on every poll. An element that is
//!   missing or goes stale between lookup and query is simply "not yet".
//! - [`Target::Element`] is a handle resolved earlier. Once the session
//!   reports it stale it is detached for good, and the condition fails
//!   permanently instead of polling until the timeout.
//!
//! Session faults (`Disconnected`, `Other`) are never reclassified; they
//! propagate and end the wait as a failure.

use crate::condition::{Condition, Poll};
use crate::locator::Locator;
use crate::session::{BrowserSession, ElementHandle, SessionError};
use crate::url::UrlPattern;
use std::fmt;

/// What an element condition looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Resolve through the session on every poll
    Locator(Locator),
    /// A handle resolved earlier
    Element(ElementHandle),
}

impl Target {
    fn locator(&self) -> Option<&Locator> {
        match self {
            Self::Locator(locator) => Some(locator),
            Self::Element(handle) => handle.locator(),
        }
    }

    /// `Ok(Err(poll))` means the verdict is already decided without the element
    fn resolve<T>(
        &self,
        session: &dyn BrowserSession,
    ) -> Result<Result<ElementHandle, Poll<T>>, SessionError> {
        match self {
            Self::Element(handle) => Ok(Ok(handle.clone())),
            Self::Locator(locator) => match session.find_element(locator) {
                Ok(handle) => Ok(Ok(handle)),
                Err(err) if err.is_missing() => Ok(Err(Poll::NotYetSatisfied(err.to_string()))),
                Err(err) => Err(err),
            },
        }
    }

    /// Classify an error from a query on an already-resolved element
    fn classify<T>(&self, err: SessionError) -> Result<Poll<T>, SessionError> {
        let bound = matches!(self, Self::Element(_));
        match err {
            SessionError::Stale { .. } if bound => Ok(Poll::PermanentlyFailed(err.to_string())),
            ref missing if missing.is_missing() => Ok(Poll::NotYetSatisfied(missing.to_string())),
            _ => Err(err),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locator(locator) => write!(f, "{locator}"),
            Self::Element(handle) => write!(f, "{handle}"),
        }
    }
}

impl From<Locator> for Target {
    fn from(locator: Locator) -> Self {
        Self::Locator(locator)
    }
}

impl From<&Locator> for Target {
    fn from(locator: &Locator) -> Self {
        Self::Locator(locator.clone())
    }
}

impl From<ElementHandle> for Target {
    fn from(handle: ElementHandle) -> Self {
        Self::Element(handle)
    }
}

/// Unwraps a resolved element or returns the already-decided verdict
macro_rules! resolve_or_return {
    ($target:expr, $session:expr) => {
        match $target.resolve($session)? {
            Ok(element) => element,
            Err(poll) => return Ok(poll),
        }
    };
}

/// Unwraps a query result or returns the classified verdict
macro_rules! query_or_return {
    ($target:expr, $query:expr) => {
        match $query {
            Ok(value) => value,
            Err(err) => return $target.classify(err),
        }
    };
}

// =============================================================================
// ELEMENT VISIBLE
// =============================================================================

/// The element is attached and visible
#[derive(Debug, Clone)]
pub struct ElementVisible {
    target: Target,
}

impl ElementVisible {
    /// Wait for `target` to be visible
    pub fn new(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Condition for ElementVisible {
    type Output = ElementHandle;

    fn check(&self, session: &dyn BrowserSession) -> Result<Poll<ElementHandle>, SessionError> {
        let element = resolve_or_return!(self.target, session);
        if query_or_return!(self.target, session.is_visible(&element)) {
            Ok(Poll::Satisfied(element))
        } else {
            Ok(Poll::not_yet(format!("{element} is present but hidden")))
        }
    }

    fn description(&self) -> String {
        format!("element visible: {}", self.target)
    }

    fn locator(&self) -> Option<&Locator> {
        self.target.locator()
    }
}

// =============================================================================
// ELEMENT CLICKABLE
// =============================================================================

/// The element is visible and enabled
#[derive(Debug, Clone)]
pub struct ElementClickable {
    target: Target,
}

impl ElementClickable {
    /// Wait for `target` to be clickable
    pub fn new(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl Condition for ElementClickable {
    type Output = ElementHandle;

    fn check(&self, session: &dyn BrowserSession) -> Result<Poll<ElementHandle>, SessionError> {
        let element = resolve_or_return!(self.target, session);
        if !query_or_return!(self.target, session.is_visible(&element)) {
            return Ok(Poll::not_yet(format!("{element} is present but hidden")));
        }
        if !query_or_return!(self.target, session.is_enabled(&element)) {
            return Ok(Poll::not_yet(format!("{element} is visible but disabled")));
        }
        Ok(Poll::Satisfied(element))
    }

    fn description(&self) -> String {
        format!("element clickable: {}", self.target)
    }

    fn locator(&self) -> Option<&Locator> {
        self.target.locator()
    }
}

// =============================================================================
// ELEMENT ABSENT
// =============================================================================

/// The element is gone from the page (or, optionally, merely hidden)
#[derive(Debug, Clone)]
pub struct ElementAbsent {
    target: Target,
    accept_hidden: bool,
}

impl ElementAbsent {
    /// Wait for `target` to be detached from the page
    pub fn new(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
            accept_hidden: false,
        }
    }

    /// Also treat a present-but-hidden element as absent
    #[must_use]
    pub const fn or_hidden(mut self) -> Self {
        self.accept_hidden = true;
        self
    }
}

impl Condition for ElementAbsent {
    type Output = ();

    fn check(&self, session: &dyn BrowserSession) -> Result<Poll<()>, SessionError> {
        let element = match &self.target {
            Target::Element(handle) => handle.clone(),
            Target::Locator(locator) => match session.find_element(locator) {
                Ok(handle) => handle,
                Err(err) if err.is_missing() => return Ok(Poll::Satisfied(())),
                Err(err) => return Err(err),
            },
        };
        match session.is_visible(&element) {
            Ok(false) if self.accept_hidden => Ok(Poll::Satisfied(())),
            Ok(visible) => Ok(Poll::not_yet(format!(
                "{element} is still present ({})",
                if visible { "visible" } else { "hidden" }
            ))),
            Err(err) if err.is_missing() => Ok(Poll::Satisfied(())),
            Err(err) => Err(err),
        }
    }

    fn description(&self) -> String {
        if self.accept_hidden {
            format!("element absent or hidden: {}", self.target)
        } else {
            format!("element absent: {}", self.target)
        }
    }

    fn locator(&self) -> Option<&Locator> {
        self.target.locator()
    }
}

// =============================================================================
// TEXT EQUALS
// =============================================================================

/// The element's visible text equals an expected value
#[derive(Debug, Clone)]
pub struct TextEquals {
    target: Target,
    expected: String,
}

impl TextEquals {
    /// Wait for `target`'s text to equal `expected`
    pub fn new(target: impl Into<Target>, expected: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            expected: expected.into(),
        }
    }
}

impl Condition for TextEquals {
    type Output = String;

    fn check(&self, session: &dyn BrowserSession) -> Result<Poll<String>, SessionError> {
        let element = resolve_or_return!(self.target, session);
        let text = query_or_return!(self.target, session.text(&element));
        if text == self.expected {
            Ok(Poll::Satisfied(text))
        } else {
            Ok(Poll::not_yet(format!("text is {text:?}")))
        }
    }

    fn description(&self) -> String {
        format!("text of {} equals {:?}", self.target, self.expected)
    }

    fn locator(&self) -> Option<&Locator> {
        self.target.locator()
    }
}

// =============================================================================
// ATTRIBUTE EQUALS
// =============================================================================

/// An element attribute equals an expected value
#[derive(Debug, Clone)]
pub struct AttributeEquals {
    target: Target,
    name: String,
    expected: String,
}

impl AttributeEquals {
    /// Wait for attribute `name` of `target` to equal `expected`
    pub fn new(
        target: impl Into<Target>,
        name: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self {
            target: target.into(),
            name: name.into(),
            expected: expected.into(),
        }
    }
}

impl Condition for AttributeEquals {
    type Output = String;

    fn check(&self, session: &dyn BrowserSession) -> Result<Poll<String>, SessionError> {
        let element = resolve_or_return!(self.target, session);
        match query_or_return!(self.target, session.attribute(&element, &self.name)) {
            Some(value) if value == self.expected => Ok(Poll::Satisfied(value)),
            Some(value) => Ok(Poll::not_yet(format!("{} is {value:?}", self.name))),
            None => Ok(Poll::not_yet(format!("{} is not set", self.name))),
        }
    }

    fn description(&self) -> String {
        format!(
            "attribute {} of {} equals {:?}",
            self.name, self.target, self.expected
        )
    }

    fn locator(&self) -> Option<&Locator> {
        self.target.locator()
    }
}

// =============================================================================
// URL MATCHES
// =============================================================================

/// The current page URL matches a pattern
#[derive(Debug, Clone)]
pub struct UrlMatches {
    pattern: UrlPattern,
}

impl UrlMatches {
    /// Wait for the current URL to match `pattern`
    #[must_use]
    pub const fn new(pattern: UrlPattern) -> Self {
        Self { pattern }
    }
}

impl Condition for UrlMatches {
    type Output = String;

    fn check(&self, session: &dyn BrowserSession) -> Result<Poll<String>, SessionError> {
        let url = session.current_url()?;
        match self.pattern.matches(&url) {
            Ok(true) => Ok(Poll::Satisfied(url)),
            Ok(false) => Ok(Poll::not_yet(format!("current url is {url}"))),
            Err(err) => Ok(Poll::failed(err.to_string())),
        }
    }

    fn description(&self) -> String {
        self.pattern.to_string()
    }
}
