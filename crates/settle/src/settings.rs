//! Wait timing settings and the YAML configuration file.
//!
//! Timeouts, poll intervals and locators are plain parameters supplied
//! by whoever runs the tests. This module only parses and validates
//! them; nothing here is read implicitly from the environment.

use crate::locator::{Locator, LocatorLint};
use crate::result::{SettleError, SettleResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Default timeout for wait operations (30 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Check the wait timing invariant: `poll_interval > 0` and `timeout >= poll_interval`
///
/// # Errors
///
/// Returns [`SettleError::InvalidRequest`] when the invariant does not hold.
pub fn validate_timing(timeout: Duration, poll_interval: Duration) -> SettleResult<()> {
    if poll_interval.is_zero() {
        return Err(SettleError::invalid_request(
            "poll interval must be greater than zero",
        ));
    }
    if timeout < poll_interval {
        return Err(SettleError::invalid_request(format!(
            "timeout ({}ms) must be at least the poll interval ({}ms)",
            timeout.as_millis(),
            poll_interval.as_millis()
        )));
    }
    Ok(())
}

/// Timing for one kind of wait
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitSettings {
    /// Create new wait settings with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Validate the timing invariant
    ///
    /// # Errors
    ///
    /// Returns [`SettleError::InvalidRequest`] for a zero poll interval or a
    /// timeout shorter than the poll interval.
    pub fn validate(&self) -> SettleResult<()> {
        validate_timing(self.timeout(), self.poll_interval())
    }
}

/// A locator that failed the brittleness lint
#[derive(Debug, Clone, Serialize)]
pub struct LocatorFinding {
    /// Name of the locator in the config file
    pub name: String,
    /// The locator itself
    pub locator: Locator,
    /// What is wrong with it
    pub lints: Vec<LocatorLint>,
}

/// Contents of a settle YAML file.
///
/// ```yaml
/// defaults:
///   timeout_ms: 10000
///   poll_interval_ms: 250
/// waits:
///   login:
///     timeout_ms: 20000
/// locators:
///   username:
///     id: username
///     description: Username field
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    /// Settings used when no named entry applies
    pub defaults: WaitSettings,
    /// Named overrides, e.g. per page or per step
    pub waits: BTreeMap<String, WaitSettings>,
    /// Named locators
    pub locators: BTreeMap<String, Locator>,
}

impl SettleConfig {
    /// Create an empty config with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a YAML string and validate
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed or any settings are invalid.
    pub fn from_yaml_str(yaml: &str) -> SettleResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file and validate
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or is invalid.
    pub fn from_path(path: impl AsRef<Path>) -> SettleResult<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded settle config");
        Self::from_yaml_str(&yaml)
    }

    /// Validate every settings entry
    ///
    /// # Errors
    ///
    /// Returns [`SettleError::Config`] naming the first invalid entry.
    pub fn validate(&self) -> SettleResult<()> {
        self.defaults
            .validate()
            .map_err(|e| SettleError::config(format!("defaults: {e}")))?;
        for (name, settings) in &self.waits {
            settings
                .validate()
                .map_err(|e| SettleError::config(format!("waits.{name}: {e}")))?;
        }
        Ok(())
    }

    /// Settings for a named wait, falling back to the defaults
    #[must_use]
    pub fn settings_for(&self, name: &str) -> WaitSettings {
        self.waits.get(name).copied().unwrap_or(self.defaults)
    }

    /// Look up a named locator
    #[must_use]
    pub fn locator(&self, name: &str) -> Option<&Locator> {
        self.locators.get(name)
    }

    /// Lint every locator, returning only those with findings
    #[must_use]
    pub fn lint_locators(&self) -> Vec<LocatorFinding> {
        self.locators
            .iter()
            .filter_map(|(name, locator)| {
                let lints = locator.lint();
                if locator.is_absolute_xpath() {
                    tracing::warn!(%name, %locator, "locator is an absolute XPath");
                }
                (!lints.is_empty()).then(|| LocatorFinding {
                    name: name.clone(),
                    locator: locator.clone(),
                    lints,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locator::Selector;

    mod validate_timing_tests {
        use super::*;

        #[test]
        fn test_rejects_zero_poll_interval() {
            let err = validate_timing(Duration::from_secs(1), Duration::ZERO).unwrap_err();
            assert!(err.to_string().contains("greater than zero"));
        }

        #[test]
        fn test_rejects_timeout_below_interval() {
            let err =
                validate_timing(Duration::from_millis(100), Duration::from_millis(500)).unwrap_err();
            assert!(err.to_string().contains("100ms"));
        }

        #[test]
        fn test_accepts_equal_timeout_and_interval() {
            assert!(validate_timing(Duration::from_millis(500), Duration::from_millis(500)).is_ok());
        }
    }

    mod wait_settings_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let settings = WaitSettings::default();
            assert_eq!(settings.timeout_ms, DEFAULT_WAIT_TIMEOUT_MS);
            assert_eq!(settings.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
            assert!(settings.validate().is_ok());
        }

        #[test]
        fn test_builder_and_durations() {
            let settings = WaitSettings::new().with_timeout(5000).with_poll_interval(500);
            assert_eq!(settings.timeout(), Duration::from_millis(5000));
            assert_eq!(settings.poll_interval(), Duration::from_millis(500));
        }

        #[test]
        fn test_partial_yaml_fills_defaults() {
            let settings: WaitSettings = serde_yaml_ng::from_str("timeout_ms: 1000").unwrap();
            assert_eq!(settings.timeout_ms, 1000);
            assert_eq!(settings.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }
    }

    mod config_tests {
        use super::*;

        const YAML: &str = r#"
defaults:
  timeout_ms: 10000
  poll_interval_ms: 250
waits:
  login:
    timeout_ms: 20000
    poll_interval_ms: 500
locators:
  username:
    id: username
    description: Username field
  submit:
    xpath: /html/body/div[2]/form/button
"#;

        #[test]
        fn test_parse_full_file() {
            let config = SettleConfig::from_yaml_str(YAML).unwrap();
            assert_eq!(config.defaults.timeout_ms, 10_000);
            assert_eq!(config.settings_for("login").timeout_ms, 20_000);
            assert_eq!(config.settings_for("unknown").poll_interval_ms, 250);
            let username = config.locator("username").unwrap();
            assert_eq!(username.selector(), &Selector::Id("username".into()));
            assert_eq!(username.description(), Some("Username field"));
        }

        #[test]
        fn test_lint_reports_only_brittle_locators() {
            let config = SettleConfig::from_yaml_str(YAML).unwrap();
            let findings = config.lint_locators();
            assert_eq!(findings.len(), 1);
            assert_eq!(findings[0].name, "submit");
            assert!(findings[0].lints.contains(&LocatorLint::AbsoluteXPath));
        }

        #[test]
        fn test_invalid_named_entry_is_reported_by_name() {
            let yaml = "waits:\n  slow:\n    timeout_ms: 10\n    poll_interval_ms: 100\n";
            let err = SettleConfig::from_yaml_str(yaml).unwrap_err();
            assert!(err.to_string().contains("waits.slow"));
        }

        #[test]
        fn test_empty_file_is_default() {
            let config = SettleConfig::from_yaml_str("{}").unwrap();
            assert_eq!(config, SettleConfig::new());
        }

        #[test]
        fn test_from_path() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("settle.yaml");
            std::fs::write(&path, YAML).unwrap();
            let config = SettleConfig::from_path(&path).unwrap();
            assert_eq!(config.locators.len(), 2);
        }

        #[test]
        fn test_missing_file_is_io_error() {
            let err = SettleConfig::from_path("/definitely/not/here.yaml").unwrap_err();
            assert!(matches!(err, SettleError::Io(_)));
        }
    }
}
