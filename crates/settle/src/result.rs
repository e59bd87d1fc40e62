//! Result and error types for Settle.

use crate::session::SessionError;
use thiserror::Error;

/// Result type for Settle operations
pub type SettleResult<T> = Result<T, SettleError>;

/// Errors that can occur in Settle
#[derive(Debug, Error)]
pub enum SettleError {
    /// Wait request violated its timing invariant
    #[error("Invalid wait request: {message}")]
    InvalidRequest {
        /// Error message
        message: String,
    },

    /// Condition never became true within the time budget
    #[error(
        "Timed out after {elapsed_ms}ms waiting for {condition}{} (last observed: {last_observed})",
        locator_suffix(.locator)
    )]
    WaitTimedOut {
        /// Condition description
        condition: String,
        /// Locator involved, if any
        locator: Option<String>,
        /// Time spent waiting
        elapsed_ms: u64,
        /// Number of polls performed
        polls: u32,
        /// Last state reported by the condition
        last_observed: String,
    },

    /// Condition reported it can never become true, or the session faulted
    #[error(
        "Wait for {condition}{} failed after {elapsed_ms}ms: {reason}",
        locator_suffix(.locator)
    )]
    WaitFailed {
        /// Condition description
        condition: String,
        /// Locator involved, if any
        locator: Option<String>,
        /// Time spent waiting
        elapsed_ms: u64,
        /// Why the wait failed
        reason: String,
        /// Underlying session fault, if that was the cause
        #[source]
        source: Option<SessionError>,
    },

    /// Caller cancelled the wait
    #[error("Wait for {condition}{} cancelled after {elapsed_ms}ms", locator_suffix(.locator))]
    WaitCancelled {
        /// Condition description
        condition: String,
        /// Locator involved, if any
        locator: Option<String>,
        /// Time spent waiting
        elapsed_ms: u64,
    },

    /// Invalid URL pattern
    #[error("Invalid URL pattern {pattern:?}: {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn locator_suffix(locator: &Option<String>) -> String {
    locator
        .as_deref()
        .map(|l| format!(" [{l}]"))
        .unwrap_or_default()
}

impl SettleError {
    /// Create an invalid request error
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Whether a caller may reasonably retry (re-navigate, wait again)
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::WaitTimedOut { .. })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_timed_out_message_is_actionable() {
        let err = SettleError::WaitTimedOut {
            condition: "element visible".into(),
            locator: Some("css=#login".into()),
            elapsed_ms: 2000,
            polls: 5,
            last_observed: "element not found".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2000ms"));
        assert!(msg.contains("element visible"));
        assert!(msg.contains("css=#login"));
        assert!(msg.contains("element not found"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_failed_keeps_session_source() {
        let err = SettleError::WaitFailed {
            condition: "url matches".into(),
            locator: None,
            elapsed_ms: 500,
            reason: "session disconnected".into(),
            source: Some(SessionError::disconnected("socket closed")),
        };
        assert!(!err.is_recoverable());
        assert!(!err.to_string().contains('['));
        let source = err.source().expect("source kept");
        assert!(source.to_string().contains("socket closed"));
    }

    #[test]
    fn test_cancelled_message() {
        let err = SettleError::WaitCancelled {
            condition: "text equals \"Done\"".into(),
            locator: Some("id=status".into()),
            elapsed_ms: 120,
        };
        assert!(err.to_string().contains("cancelled after 120ms"));
    }

    #[test]
    fn test_invalid_request_helper() {
        let err = SettleError::invalid_request("poll interval must be > 0");
        assert!(err.to_string().contains("Invalid wait request"));
    }
}
