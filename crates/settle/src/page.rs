//! Page objects and the per-session wait helper.
//!
//! [`PageWaits`] bundles a session, an engine, timing settings and an
//! optional cancellation token so test code can write
//! `waits.visible(&login.submit)?` instead of building requests by hand.

use crate::cancel::CancellationToken;
use crate::condition::Condition;
use crate::conditions::{
    AttributeEquals, ElementAbsent, ElementClickable, ElementVisible, Target, TextEquals,
    UrlMatches,
};
use crate::locator::Locator;
use crate::result::SettleResult;
use crate::session::{BrowserSession, ElementHandle};
use crate::settings::WaitSettings;
use crate::url::UrlPattern;
use crate::wait::{WaitEngine, WaitRequest};
use std::fmt;

/// A page or component in the application under test.
///
/// # Example
///
/// ```
/// use settle::{Locator, PageObject, UrlPattern};
///
/// struct LoginPage {
///     username: Locator,
///     submit: Locator,
/// }
///
/// impl PageObject for LoginPage {
///     fn url_pattern(&self) -> UrlPattern {
///         UrlPattern::Contains("/login".into())
///     }
///
///     fn ready_locators(&self) -> Vec<Locator> {
///         vec![self.username.clone(), self.submit.clone()]
///     }
/// }
/// ```
pub trait PageObject {
    /// Pattern the URL matches once this page is showing
    fn url_pattern(&self) -> UrlPattern;

    /// Elements that must be visible before the page is usable
    fn ready_locators(&self) -> Vec<Locator> {
        Vec::new()
    }

    /// Page name for logging
    fn page_name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Timing override for loading this page
    fn load_settings(&self) -> Option<WaitSettings> {
        None
    }
}

/// A page object defined by data rather than a dedicated type
#[derive(Debug, Clone)]
pub struct SimplePageObject {
    name: String,
    url_pattern: UrlPattern,
    ready: Vec<Locator>,
    settings: Option<WaitSettings>,
}

impl SimplePageObject {
    /// Create a page object
    #[must_use]
    pub fn new(name: impl Into<String>, url_pattern: UrlPattern) -> Self {
        Self {
            name: name.into(),
            url_pattern,
            ready: Vec::new(),
            settings: None,
        }
    }

    /// Add an element that must be visible once loaded
    #[must_use]
    pub fn with_ready_locator(mut self, locator: Locator) -> Self {
        self.ready.push(locator);
        self
    }

    /// Override timing for this page
    #[must_use]
    pub const fn with_load_settings(mut self, settings: WaitSettings) -> Self {
        self.settings = Some(settings);
        self
    }
}

impl PageObject for SimplePageObject {
    fn url_pattern(&self) -> UrlPattern {
        self.url_pattern.clone()
    }

    fn ready_locators(&self) -> Vec<Locator> {
        self.ready.clone()
    }

    fn page_name(&self) -> &str {
        &self.name
    }

    fn load_settings(&self) -> Option<WaitSettings> {
        self.settings
    }
}

/// What [`PageWaits::wait_for_page`] observed once the page was ready
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPage {
    /// URL that matched the page pattern
    pub url: String,
    /// Ready elements, in the order the page declared them
    pub elements: Vec<ElementHandle>,
}

/// Wait helpers bound to one browser session
#[derive(Clone)]
pub struct PageWaits<'s> {
    session: &'s dyn BrowserSession,
    engine: WaitEngine,
    settings: WaitSettings,
    cancel: Option<CancellationToken>,
}

impl fmt::Debug for PageWaits<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageWaits")
            .field("engine", &self.engine)
            .field("settings", &self.settings)
            .field("cancellable", &self.cancel.is_some())
            .finish_non_exhaustive()
    }
}

impl<'s> PageWaits<'s> {
    /// Create with the real clock and default settings
    #[must_use]
    pub fn new(session: &'s dyn BrowserSession) -> Self {
        Self {
            session,
            engine: WaitEngine::new(),
            settings: WaitSettings::default(),
            cancel: None,
        }
    }

    /// Use a specific engine (e.g. one on a manual clock)
    #[must_use]
    pub fn with_engine(mut self, engine: WaitEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Use these timing settings for every wait
    #[must_use]
    pub const fn with_settings(mut self, settings: WaitSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Make every wait cancellable through `token`
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Current timing settings
    #[must_use]
    pub const fn settings(&self) -> &WaitSettings {
        &self.settings
    }

    fn run<C: Condition>(&self, condition: C, settings: &WaitSettings) -> SettleResult<C::Output> {
        let mut request = WaitRequest::from_settings(condition, settings)?;
        if let Some(token) = &self.cancel {
            request = request.with_cancellation(token.clone());
        }
        self.engine.wait_for(self.session, request)
    }

    /// Wait for any condition
    ///
    /// # Errors
    ///
    /// Returns the wait error if the condition is not satisfied in time,
    /// fails, or the wait is cancelled.
    pub fn until<C: Condition>(&self, condition: C) -> SettleResult<C::Output> {
        self.run(condition, &self.settings)
    }

    /// Wait for an element to be visible
    ///
    /// # Errors
    ///
    /// See [`PageWaits::until`].
    pub fn visible(&self, target: impl Into<Target>) -> SettleResult<ElementHandle> {
        self.until(ElementVisible::new(target))
    }

    /// Wait for an element to be visible and enabled
    ///
    /// # Errors
    ///
    /// See [`PageWaits::until`].
    pub fn clickable(&self, target: impl Into<Target>) -> SettleResult<ElementHandle> {
        self.until(ElementClickable::new(target))
    }

    /// Wait for an element to leave the page
    ///
    /// # Errors
    ///
    /// See [`PageWaits::until`].
    pub fn absent(&self, target: impl Into<Target>) -> SettleResult<()> {
        self.until(ElementAbsent::new(target))
    }

    /// Wait for an element's text to equal `expected`
    ///
    /// # Errors
    ///
    /// See [`PageWaits::until`].
    pub fn text_equals(
        &self,
        target: impl Into<Target>,
        expected: impl Into<String>,
    ) -> SettleResult<String> {
        self.until(TextEquals::new(target, expected))
    }

    /// Wait for an attribute to equal `expected`
    ///
    /// # Errors
    ///
    /// See [`PageWaits::until`].
    pub fn attribute_equals(
        &self,
        target: impl Into<Target>,
        name: impl Into<String>,
        expected: impl Into<String>,
    ) -> SettleResult<String> {
        self.until(AttributeEquals::new(target, name, expected))
    }

    /// Wait for the URL to match
    ///
    /// # Errors
    ///
    /// See [`PageWaits::until`].
    pub fn url_matches(&self, pattern: UrlPattern) -> SettleResult<String> {
        self.until(UrlMatches::new(pattern))
    }

    /// Wait until a page is showing: URL first, then every ready locator.
    ///
    /// Each step gets the full timeout of the page's load settings (or
    /// this helper's settings when the page has none).
    ///
    /// # Errors
    ///
    /// Returns the first step's error.
    pub fn wait_for_page<P: PageObject + ?Sized>(&self, page: &P) -> SettleResult<LoadedPage> {
        let settings = page.load_settings().unwrap_or(self.settings);
        tracing::debug!(page = page.page_name(), "waiting for page");

        let url = self.run(UrlMatches::new(page.url_pattern()), &settings)?;
        let elements = page
            .ready_locators()
            .into_iter()
            .map(|locator| self.run(ElementVisible::new(locator), &settings))
            .collect::<SettleResult<Vec<_>>>()?;

        tracing::info!(page = page.page_name(), %url, "page ready");
        Ok(LoadedPage { url, elements })
    }
}
