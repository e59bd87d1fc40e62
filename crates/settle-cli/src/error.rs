//! Error types for the CLI

use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Invalid argument
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// `lint --strict` found brittle locators
    #[error("{count} brittle locator(s) found")]
    LintFindings {
        /// Number of locators with findings
        count: usize,
    },

    /// A simulated wait ended without success
    #[error("wait ended with {outcome}")]
    WaitNotSatisfied {
        /// Outcome label
        outcome: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settle library error
    #[error("Settle error: {0}")]
    Settle(#[from] settle::SettleError),

    /// Browser session error outside a wait
    #[error("Session error: {0}")]
    Session(#[from] settle::SessionError),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML output error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl CliError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Process exit code: 2 for an unsatisfied wait, 3 for lint findings, 1 otherwise
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::WaitNotSatisfied { .. } => 2,
            Self::LintFindings { .. } => 3,
            _ => 1,
        }
    }
}
