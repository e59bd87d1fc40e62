//! Settle: deterministic waits for browser UI tests.
//!
//! UI tests go flaky when they race the page: they click before a button
//! is enabled, read text before it renders, or sleep for a fixed time
//! and hope. Settle replaces that with an explicit polling loop over a
//! three-valued condition:
//!
//! - **Satisfied** ends the wait with a value (an element handle, a URL).
//! - **Not yet** keeps polling until the deadline.
//! - **Permanently failed** ends the wait immediately, so a test does not
//!   burn its whole timeout on something that can never happen.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   WaitRequest   ┌──────────────┐  read-only  ┌────────────────┐
//! │ PageWaits /  │───────────────►│  WaitEngine  │────────────►│ BrowserSession │
//! │ test code    │◄───────────────│  (Clock)     │  Condition  │ (driver, mock) │
//! └──────────────┘   WaitOutcome   └──────────────┘             └────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use settle::{
//!     ElementVisible, Locator, ManualClock, ScriptedElement, ScriptedSession, WaitEngine,
//!     WaitRequest,
//! };
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let submit = Locator::id("submit").with_description("Submit button");
//! let session = ScriptedSession::new(clock.clone())
//!     .with_element(ScriptedElement::new(submit.clone()).visible_at(Duration::from_millis(1200)));
//!
//! let engine = WaitEngine::with_clock(clock);
//! let request = WaitRequest::new(
//!     ElementVisible::new(&submit),
//!     Duration::from_secs(5),
//!     Duration::from_millis(500),
//! )?;
//! let outcome = engine.wait(&session, request);
//! assert!(outcome.is_success());
//! assert_eq!(outcome.polls(), 4);
//! assert_eq!(outcome.elapsed(), Duration::from_millis(1500));
//! # Ok::<(), settle::SettleError>(())
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod cancel;
mod clock;
mod condition;
mod conditions;
mod locator;
mod mock;
mod page;
mod result;
mod session;
mod settings;
mod url;
mod wait;

pub use cancel::CancellationToken;
pub use clock::{Clock, ManualClock, SystemClock};
pub use condition::{Condition, FnCondition, Map, Poll};
pub use conditions::{
    AttributeEquals, ElementAbsent, ElementClickable, ElementVisible, Target, TextEquals,
    UrlMatches,
};
pub use locator::{Locator, LocatorLint, Selector, MAX_XPATH_STEPS};
pub use mock::{ScriptedElement, ScriptedSession};
pub use page::{LoadedPage, PageObject, PageWaits, SimplePageObject};
pub use result::{SettleError, SettleResult};
pub use session::{BrowserSession, ElementHandle, SessionError};
pub use settings::{
    validate_timing, LocatorFinding, SettleConfig, WaitSettings, DEFAULT_POLL_INTERVAL_MS,
    DEFAULT_WAIT_TIMEOUT_MS,
};
pub use url::UrlPattern;
pub use wait::{FailureCause, WaitEngine, WaitOutcome, WaitRequest};

/// Prelude for convenient imports
pub mod prelude {
    pub use super::{
        BrowserSession, CancellationToken, Condition, ElementHandle, Locator, PageObject,
        PageWaits, Poll, SettleError, SettleResult, UrlPattern, WaitEngine, WaitOutcome,
        WaitRequest, WaitSettings,
    };
}
