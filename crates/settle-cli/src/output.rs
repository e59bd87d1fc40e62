//! Output formatting

use crate::commands::OutputFormatArg;
use crate::error::CliResult;
use console::style;
use serde::Serialize;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Text => Self::Text,
            OutputFormatArg::Json => Self::Json,
            OutputFormatArg::Yaml => Self::Yaml,
        }
    }
}

impl OutputFormat {
    /// Serialize `value` for the structured formats; `None` for text
    pub fn structured<T: Serialize>(self, value: &T) -> CliResult<Option<String>> {
        Ok(match self {
            Self::Text => None,
            Self::Json => Some(serde_json::to_string_pretty(value)?),
            Self::Yaml => Some(serde_yaml_ng::to_string(value)?),
        })
    }
}

/// Color a wait outcome label: green for success, yellow for cancelled, red otherwise
#[must_use]
pub fn paint_outcome(label: &str) -> String {
    match label {
        "success" => style(label).green().bold().to_string(),
        "cancelled" => style(label).yellow().bold().to_string(),
        _ => style(label).red().bold().to_string(),
    }
}

/// Color a warning marker
#[must_use]
pub fn paint_warning(text: &str) -> String {
    style(text).yellow().to_string()
}

/// Color a heading
#[must_use]
pub fn paint_heading(text: &str) -> String {
    style(text).bold().to_string()
}
