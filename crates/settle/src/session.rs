//! The browser collaborator.
//!
//! Settle never drives a browser itself. Whatever does (a WebDriver
//! client, a CDP connection, an in-memory fake) implements
//! [`BrowserSession`] and is borrowed read-only by every condition
//! evaluation.

use crate::locator::Locator;
use std::fmt;
use thiserror::Error;

/// Opaque handle to an element resolved by a session.
///
/// The id is whatever the driver uses (a WebDriver element reference,
/// a CDP node id); Settle only carries it back to the session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle {
    id: String,
    locator: Option<Locator>,
}

impl ElementHandle {
    /// Create a handle with a driver-specific id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            locator: None,
        }
    }

    /// Record the locator this handle was resolved from
    #[must_use]
    pub fn with_locator(mut self, locator: Locator) -> Self {
        self.locator = Some(locator);
        self
    }

    /// Driver-specific id
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Locator the handle was resolved from, if known
    #[must_use]
    pub const fn locator(&self) -> Option<&Locator> {
        self.locator.as_ref()
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.locator {
            Some(loc) => write!(f, "element {} ({loc})", self.id),
            None => write!(f, "element {}", self.id),
        }
    }
}

/// Errors raised by a browser session query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// No element matches the locator (yet)
    #[error("no element matches {locator}")]
    NotFound {
        /// Locator display string
        locator: String,
    },

    /// The element was resolved once but is no longer attached to the page
    #[error("{element} is no longer attached to the page")]
    Stale {
        /// Element display string
        element: String,
    },

    /// The session itself is gone (browser crashed, socket closed)
    #[error("browser session disconnected: {message}")]
    Disconnected {
        /// Error message
        message: String,
    },

    /// Any other driver failure
    #[error("browser session error: {message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl SessionError {
    /// Create a not-found error for a locator
    #[must_use]
    pub fn not_found(locator: &Locator) -> Self {
        Self::NotFound {
            locator: locator.to_string(),
        }
    }

    /// Create a stale-element error for a handle
    #[must_use]
    pub fn stale(element: &ElementHandle) -> Self {
        Self::Stale {
            element: element.to_string(),
        }
    }

    /// Create a disconnected error
    #[must_use]
    pub fn disconnected(message: impl Into<String>) -> Self {
        Self::Disconnected {
            message: message.into(),
        }
    }

    /// Create a generic driver error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// The element is absent (never found, or gone), as opposed to a session fault
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Stale { .. })
    }
}

/// Read-only queries over a live browser.
///
/// Every method must be free of side effects: conditions call them on
/// every poll. Implementations are shared across concurrent waits, so
/// they must either be confined to one test worker or be safe for
/// concurrent reads.
pub trait BrowserSession: Send + Sync {
    /// Resolve a locator to a single element
    fn find_element(&self, locator: &Locator) -> Result<ElementHandle, SessionError>;

    /// Whether the element is rendered and visible
    fn is_visible(&self, element: &ElementHandle) -> Result<bool, SessionError>;

    /// Whether the element accepts interaction
    fn is_enabled(&self, element: &ElementHandle) -> Result<bool, SessionError>;

    /// URL of the current page
    fn current_url(&self) -> Result<String, SessionError>;

    /// Visible text of the element
    fn text(&self, element: &ElementHandle) -> Result<String, SessionError>;

    /// Attribute value, `None` when the attribute is not set
    fn attribute(&self, element: &ElementHandle, name: &str)
        -> Result<Option<String>, SessionError>;
}
