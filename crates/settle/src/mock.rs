//! Scripted in-memory browser for testing waits.
//!
//! A [`ScriptedSession`] answers queries from a timeline fixed at build
//! time: elements appear, change state and detach at given offsets on a
//! shared [`Clock`]. Pair it with a [`ManualClock`](crate::ManualClock)
//! for exact, instant tests, or with a [`SystemClock`](crate::SystemClock)
//! to rehearse real-time behavior.

use crate::clock::Clock;
use crate::locator::Locator;
use crate::session::{BrowserSession, ElementHandle, SessionError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const HANDLE_PREFIX: &str = "el-";

/// Values that change at fixed offsets
#[derive(Debug, Clone)]
struct Timeline<T> {
    changes: Vec<(Duration, T)>,
}

impl<T> Timeline<T> {
    fn starting(value: T) -> Self {
        Self {
            changes: vec![(Duration::ZERO, value)],
        }
    }

    const fn empty() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    fn set_at(&mut self, at: Duration, value: T) {
        let idx = self.changes.partition_point(|(t, _)| *t <= at);
        self.changes.insert(idx, (at, value));
    }

    fn reset(&mut self, value: T) {
        self.changes = vec![(Duration::ZERO, value)];
    }

    fn at(&self, now: Duration) -> Option<&T> {
        let idx = self.changes.partition_point(|(t, _)| *t <= now);
        idx.checked_sub(1).map(|i| &self.changes[i].1)
    }
}

/// One element's life on the scripted page
#[derive(Debug, Clone)]
pub struct ScriptedElement {
    locator: Locator,
    appears_at: Duration,
    detached_at: Option<Duration>,
    visible: Timeline<bool>,
    enabled: Timeline<bool>,
    text: Timeline<String>,
    attributes: Vec<(String, Timeline<Option<String>>)>,
}

impl ScriptedElement {
    /// An element present from the start, visible and enabled
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            appears_at: Duration::ZERO,
            detached_at: None,
            visible: Timeline::starting(true),
            enabled: Timeline::starting(true),
            text: Timeline::starting(String::new()),
            attributes: Vec::new(),
        }
    }

    /// Attach the element to the page at `at`
    #[must_use]
    pub const fn appears_at(mut self, at: Duration) -> Self {
        self.appears_at = at;
        self
    }

    /// Remove the element from the page at `at`
    #[must_use]
    pub const fn detached_at(mut self, at: Duration) -> Self {
        self.detached_at = Some(at);
        self
    }

    /// Hidden until `at`, visible afterwards
    #[must_use]
    pub fn visible_at(mut self, at: Duration) -> Self {
        self.visible.reset(false);
        self.visible.set_at(at, true);
        self
    }

    /// Hidden from `at` on
    #[must_use]
    pub fn hidden_at(mut self, at: Duration) -> Self {
        self.visible.set_at(at, false);
        self
    }

    /// Never visible
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible.reset(false);
        self
    }

    /// Disabled until `at`, enabled afterwards
    #[must_use]
    pub fn enabled_at(mut self, at: Duration) -> Self {
        self.enabled.reset(false);
        self.enabled.set_at(at, true);
        self
    }

    /// Never enabled
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled.reset(false);
        self
    }

    /// Initial text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text.reset(text.into());
        self
    }

    /// Text changes to `text` at `at`
    #[must_use]
    pub fn text_at(mut self, at: Duration, text: impl Into<String>) -> Self {
        self.text.set_at(at, text.into());
        self
    }

    /// Initial attribute value
    #[must_use]
    pub fn attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attribute_at(Duration::ZERO, name, value)
    }

    /// Attribute `name` becomes `value` at `at`
    #[must_use]
    pub fn attribute_at(
        mut self,
        at: Duration,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let value = Some(value.into());
        if let Some(idx) = self.attributes.iter().position(|(n, _)| *n == name) {
            self.attributes[idx].1.set_at(at, value);
        } else {
            let mut timeline = Timeline::empty();
            timeline.set_at(at, value);
            self.attributes.push((name, timeline));
        }
        self
    }

    /// Attribute `name` is removed at `at`
    #[must_use]
    pub fn remove_attribute_at(mut self, at: Duration, name: impl Into<String>) -> Self {
        let name = name.into();
        if let Some((_, timeline)) = self.attributes.iter_mut().find(|(n, _)| *n == name) {
            timeline.set_at(at, None);
        }
        self
    }

    fn is_attached(&self, now: Duration) -> bool {
        now >= self.appears_at && !matches!(self.detached_at, Some(gone) if now >= gone)
    }
}

/// An in-memory [`BrowserSession`] driven by a clock.
///
/// Immutable once built, so one session can serve many concurrent waits.
#[derive(Debug)]
pub struct ScriptedSession {
    clock: Arc<dyn Clock>,
    url: Timeline<String>,
    elements: Vec<ScriptedElement>,
    disconnect_at: Option<Duration>,
    queries: AtomicU64,
}

impl ScriptedSession {
    /// Create an empty page at `about:blank`
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            url: Timeline::starting("about:blank".to_string()),
            elements: Vec::new(),
            disconnect_at: None,
            queries: AtomicU64::new(0),
        }
    }

    /// Initial page URL
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url.reset(url.into());
        self
    }

    /// Navigate to `url` at `at`
    #[must_use]
    pub fn with_url_at(mut self, at: Duration, url: impl Into<String>) -> Self {
        self.url.set_at(at, url.into());
        self
    }

    /// Add an element to the page
    #[must_use]
    pub fn with_element(mut self, element: ScriptedElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Every query fails with `Disconnected` from `at` on
    #[must_use]
    pub const fn disconnect_at(mut self, at: Duration) -> Self {
        self.disconnect_at = Some(at);
        self
    }

    /// Number of session queries answered so far
    #[must_use]
    pub fn query_count(&self) -> u64 {
        self.queries.load(Ordering::SeqCst)
    }

    /// Count the query and fail if the session is gone
    fn begin(&self) -> Result<Duration, SessionError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        let now = self.clock.now();
        match self.disconnect_at {
            Some(at) if now >= at => Err(SessionError::disconnected(format!(
                "scripted disconnect at {}ms",
                at.as_millis()
            ))),
            _ => Ok(now),
        }
    }

    /// Resolve a handle to an element that is still attached
    fn attached(
        &self,
        handle: &ElementHandle,
        now: Duration,
    ) -> Result<&ScriptedElement, SessionError> {
        let element = handle
            .id()
            .strip_prefix(HANDLE_PREFIX)
            .and_then(|idx| idx.parse::<usize>().ok())
            .and_then(|idx| self.elements.get(idx))
            .ok_or_else(|| SessionError::other(format!("unknown element handle {}", handle.id())))?;
        if element.is_attached(now) {
            Ok(element)
        } else {
            Err(SessionError::stale(handle))
        }
    }
}

impl BrowserSession for ScriptedSession {
    fn find_element(&self, locator: &Locator) -> Result<ElementHandle, SessionError> {
        let now = self.begin()?;
        self.elements
            .iter()
            .enumerate()
            .find(|(_, el)| el.locator.selector() == locator.selector() && el.is_attached(now))
            .map(|(idx, el)| {
                ElementHandle::new(format!("{HANDLE_PREFIX}{idx}")).with_locator(el.locator.clone())
            })
            .ok_or_else(|| SessionError::not_found(locator))
    }

    fn is_visible(&self, element: &ElementHandle) -> Result<bool, SessionError> {
        let now = self.begin()?;
        let el = self.attached(element, now)?;
        Ok(el.visible.at(now).copied().unwrap_or(false))
    }

    fn is_enabled(&self, element: &ElementHandle) -> Result<bool, SessionError> {
        let now = self.begin()?;
        let el = self.attached(element, now)?;
        Ok(el.enabled.at(now).copied().unwrap_or(false))
    }

    fn current_url(&self) -> Result<String, SessionError> {
        let now = self.begin()?;
        Ok(self.url.at(now).cloned().unwrap_or_default())
    }

    fn text(&self, element: &ElementHandle) -> Result<String, SessionError> {
        let now = self.begin()?;
        let el = self.attached(element, now)?;
        Ok(el.text.at(now).cloned().unwrap_or_default())
    }

    fn attribute(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<String>, SessionError> {
        let now = self.begin()?;
        let el = self.attached(element, now)?;
        Ok(el
            .attributes
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, timeline)| timeline.at(now).cloned().flatten()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    mod timeline_tests {
        use super::*;

        #[test]
        fn test_latest_change_wins() {
            let mut timeline = Timeline::starting("a");
            timeline.set_at(ms(200), "c");
            timeline.set_at(ms(100), "b");
            assert_eq!(timeline.at(ms(0)), Some(&"a"));
            assert_eq!(timeline.at(ms(150)), Some(&"b"));
            assert_eq!(timeline.at(ms(200)), Some(&"c"));
        }

        #[test]
        fn test_empty_before_first_change() {
            let mut timeline = Timeline::empty();
            timeline.set_at(ms(50), 1);
            assert_eq!(timeline.at(ms(49)), None);
            assert_eq!(timeline.at(ms(50)), Some(&1));
        }
    }

    mod session_tests {
        use super::*;

        #[test]
        fn test_element_lifecycle() {
            let clock = ManualClock::new();
            let toast = Locator::css(".toast");
            let session = ScriptedSession::new(clock.clone()).with_element(
                ScriptedElement::new(toast.clone())
                    .appears_at(ms(100))
                    .detached_at(ms(300)),
            );

            assert!(matches!(
                session.find_element(&toast),
                Err(SessionError::NotFound { .. })
            ));
            clock.advance(ms(100));
            let handle = session.find_element(&toast).unwrap();
            assert_eq!(handle.id(), "el-0");
            assert!(session.is_visible(&handle).unwrap());

            clock.advance(ms(200));
            assert!(matches!(
                session.is_visible(&handle),
                Err(SessionError::Stale { .. })
            ));
            assert!(session.find_element(&toast).is_err());
        }

        #[test]
        fn test_matching_ignores_description() {
            let session = ScriptedSession::new(ManualClock::new())
                .with_element(ScriptedElement::new(Locator::id("save").with_description("Save")));
            let handle = session.find_element(&Locator::id("save")).unwrap();
            assert_eq!(handle.locator().unwrap().description(), Some("Save"));
        }

        #[test]
        fn test_replacement_element_gets_new_handle() {
            let clock = ManualClock::new();
            let row = Locator::test_id("row");
            let session = ScriptedSession::new(clock.clone())
                .with_element(ScriptedElement::new(row.clone()).detached_at(ms(100)))
                .with_element(ScriptedElement::new(row.clone()).appears_at(ms(100)));
            let first = session.find_element(&row).unwrap();
            clock.advance(ms(100));
            let second = session.find_element(&row).unwrap();
            assert_ne!(first, second);
            assert!(session.text(&first).is_err());
            assert!(session.text(&second).is_ok());
        }

        #[test]
        fn test_state_changes() {
            let clock = ManualClock::new();
            let button = Locator::id("submit");
            let session = ScriptedSession::new(clock.clone()).with_element(
                ScriptedElement::new(button.clone())
                    .visible_at(ms(100))
                    .enabled_at(ms(200))
                    .hidden_at(ms(400))
                    .attribute_at(ms(200), "aria-busy", "false")
                    .remove_attribute_at(ms(300), "aria-busy"),
            );
            let handle = session.find_element(&button).unwrap();
            assert!(!session.is_visible(&handle).unwrap());
            assert!(!session.is_enabled(&handle).unwrap());
            assert_eq!(session.attribute(&handle, "aria-busy").unwrap(), None);

            clock.advance(ms(200));
            assert!(session.is_visible(&handle).unwrap());
            assert!(session.is_enabled(&handle).unwrap());
            assert_eq!(
                session.attribute(&handle, "aria-busy").unwrap().as_deref(),
                Some("false")
            );

            clock.advance(ms(100));
            assert_eq!(session.attribute(&handle, "aria-busy").unwrap(), None);
            clock.advance(ms(100));
            assert!(!session.is_visible(&handle).unwrap());
        }

        #[test]
        fn test_url_navigation() {
            let clock = ManualClock::new();
            let session = ScriptedSession::new(clock.clone())
                .with_url("https://desk.example/login")
                .with_url_at(ms(500), "https://desk.example/home");
            assert_eq!(session.current_url().unwrap(), "https://desk.example/login");
            clock.advance(ms(500));
            assert_eq!(session.current_url().unwrap(), "https://desk.example/home");
        }

        #[test]
        fn test_default_url_is_blank() {
            let session = ScriptedSession::new(ManualClock::new());
            assert_eq!(session.current_url().unwrap(), "about:blank");
        }

        #[test]
        fn test_disconnect_fails_every_query() {
            let clock = ManualClock::new();
            let session = ScriptedSession::new(clock.clone())
                .with_element(ScriptedElement::new(Locator::id("a")))
                .disconnect_at(ms(10));
            let handle = session.find_element(&Locator::id("a")).unwrap();
            clock.advance(ms(10));
            assert!(matches!(
                session.current_url(),
                Err(SessionError::Disconnected { .. })
            ));
            assert!(matches!(
                session.is_visible(&handle),
                Err(SessionError::Disconnected { .. })
            ));
        }

        #[test]
        fn test_unknown_handle_is_other_error() {
            let session = ScriptedSession::new(ManualClock::new());
            let err = session.is_visible(&ElementHandle::new("bogus")).unwrap_err();
            assert!(matches!(err, SessionError::Other { .. }));
        }

        #[test]
        fn test_counts_queries() {
            let session = ScriptedSession::new(ManualClock::new());
            let _ = session.current_url();
            let _ = session.find_element(&Locator::id("x"));
            assert_eq!(session.query_count(), 2);
        }
    }
}
