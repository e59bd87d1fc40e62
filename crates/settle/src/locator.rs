//! Locator abstraction for element selection.
//!
//! The wait core is locator-agnostic: a [`Locator`] is only forwarded to
//! the [`BrowserSession`](crate::BrowserSession), which decides how to
//! resolve it. What lives here is construction, display for error
//! messages, and a brittleness lint for the kinds of locators that make
//! UI tests flaky (absolute XPaths, positional indexes).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Locators longer than this many XPath steps are reported as brittle
pub const MAX_XPATH_STEPS: usize = 6;

/// Selector type for locating elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath selector
    #[serde(rename = "xpath")]
    XPath(String),
    /// Element id attribute
    Id(String),
    /// Element name attribute
    Name(String),
    /// Visible text content
    Text(String),
    /// Test ID selector (data-testid attribute)
    TestId(String),
}

impl Selector {
    /// Short strategy name used in display strings
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::Text(_) => "text",
            Self::TestId(_) => "test-id",
        }
    }

    /// The raw selector expression
    #[must_use]
    pub fn expression(&self) -> &str {
        match self {
            Self::Css(s)
            | Self::XPath(s)
            | Self::Id(s)
            | Self::Name(s)
            | Self::Text(s)
            | Self::TestId(s) => s,
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.expression())
    }
}

/// A brittleness finding for a locator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocatorLint {
    /// XPath anchored at the document root (`/html/body/...`)
    AbsoluteXPath,
    /// Positional index such as `div[3]` or `:nth-child(2)`
    PositionalIndex,
    /// Too many steps in one XPath
    DeepChain {
        /// Number of steps found
        steps: usize,
    },
    /// Empty selector expression
    Empty,
}

impl fmt::Display for LocatorLint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AbsoluteXPath => write!(f, "absolute XPath breaks on any layout change"),
            Self::PositionalIndex => write!(f, "positional index depends on sibling order"),
            Self::DeepChain { steps } => write!(
                f,
                "XPath has {steps} steps (more than {MAX_XPATH_STEPS}); prefer an id or test id"
            ),
            Self::Empty => write!(f, "selector expression is empty"),
        }
    }
}

/// A locator for finding elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    /// The selector for finding elements
    #[serde(flatten)]
    selector: Selector,
    /// Human-readable name used in error messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl Locator {
    /// Create a locator from a selector
    #[must_use]
    pub const fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            description: None,
        }
    }

    /// Create a locator with a CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css(selector.into()))
    }

    /// Create a locator with an XPath selector
    #[must_use]
    pub fn xpath(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::XPath(selector.into()))
    }

    /// Create a locator by element id
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::from_selector(Selector::Id(id.into()))
    }

    /// Create a locator by element name
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::from_selector(Selector::Name(name.into()))
    }

    /// Create a locator by visible text
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::Text(text.into()))
    }

    /// Create a locator by data-testid
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::from_selector(Selector::TestId(id.into()))
    }

    /// Attach a human-readable description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Get the selector
    #[must_use]
    pub const fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Get the description, if one was attached
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether this is an XPath rooted at the document
    #[must_use]
    pub fn is_absolute_xpath(&self) -> bool {
        match &self.selector {
            Selector::XPath(x) => {
                let x = x.trim_start_matches('(').trim_start();
                x.starts_with('/') && !x.starts_with("//")
            }
            _ => false,
        }
    }

    /// Report everything that makes this locator fragile
    #[must_use]
    pub fn lint(&self) -> Vec<LocatorLint> {
        let mut findings = Vec::new();
        let expr = self.selector.expression().trim();
        if expr.is_empty() {
            findings.push(LocatorLint::Empty);
            return findings;
        }

        match &self.selector {
            Selector::XPath(x) => {
                if self.is_absolute_xpath() {
                    findings.push(LocatorLint::AbsoluteXPath);
                }
                if has_xpath_position(x) {
                    findings.push(LocatorLint::PositionalIndex);
                }
                let steps = x.split('/').filter(|s| !s.is_empty()).count();
                if steps > MAX_XPATH_STEPS {
                    findings.push(LocatorLint::DeepChain { steps });
                }
            }
            Selector::Css(css) => {
                if css.contains(":nth-child(") || css.contains(":nth-of-type(") {
                    findings.push(LocatorLint::PositionalIndex);
                }
            }
            _ => {}
        }
        findings
    }
}

/// `[3]` style predicates, but not `[@id='x']` or `[text()='y']`
fn has_xpath_position(xpath: &str) -> bool {
    let mut rest = xpath;
    while let Some(open) = rest.find('[') {
        let after = &rest[open + 1..];
        let Some(close) = after.find(']') else {
            return false;
        };
        let inner = after[..close].trim();
        if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }
        if inner.starts_with("position()") || inner == "last()" {
            return true;
        }
        rest = &after[close + 1..];
    }
    false
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(desc) => write!(f, "{desc} ({})", self.selector),
            None => write!(f, "{}", self.selector),
        }
    }
}

impl From<Selector> for Locator {
    fn from(selector: Selector) -> Self {
        Self::from_selector(selector)
    }
}
