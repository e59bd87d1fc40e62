//! Lint command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::handlers::config::load_config;
use crate::output::{paint_warning, OutputFormat};
use crate::LintArgs;
use serde::Serialize;
use settle::{LocatorFinding, SettleConfig};
use std::fmt::Write as _;

/// Lint result for one config file
#[derive(Debug, Clone, Serialize)]
pub struct LintReport {
    /// Number of locators checked
    pub checked: usize,
    /// Locators with at least one finding
    pub findings: Vec<LocatorFinding>,
}

impl LintReport {
    /// Lint every locator in `config`
    #[must_use]
    pub fn from_config(config: &SettleConfig) -> Self {
        Self {
            checked: config.locators.len(),
            findings: config.lint_locators(),
        }
    }

    /// Whether every locator passed
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Execute the lint command
pub fn execute_lint(config: &CliConfig, args: &LintArgs) -> CliResult<()> {
    let settle_config = load_config(Some(args.file.as_path()))?;
    let report = LintReport::from_config(&settle_config);
    tracing::debug!(
        checked = report.checked,
        brittle = report.findings.len(),
        "linted locators"
    );

    let rendered = match OutputFormat::from(args.format).structured(&report)? {
        Some(text) => Some(text),
        None if config.verbosity.is_quiet() && report.is_clean() => None,
        None => Some(render_lint_text(&report)),
    };
    if let Some(text) = rendered {
        println!("{}", text.trim_end());
    }

    if args.strict && !report.is_clean() {
        return Err(CliError::LintFindings {
            count: report.findings.len(),
        });
    }
    Ok(())
}

/// Human-readable lint report
#[must_use]
pub fn render_lint_text(report: &LintReport) -> String {
    let mut out = String::new();
    for finding in &report.findings {
        let _ = writeln!(out, "{} {}: {}", paint_warning("warning"), finding.name, finding.locator);
        for lint in &finding.lints {
            let _ = writeln!(out, "    - {lint}");
        }
    }
    let _ = writeln!(
        out,
        "{} locator(s) checked, {} brittle",
        report.checked,
        report.findings.len()
    );
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    const YAML: &str = r#"
locators:
  username:
    id: username
  submit:
    xpath: /html/body/div[2]/form/button
  third_row:
    css: "table tr:nth-child(3)"
"#;

    #[test]
    fn test_report_counts() {
        let config = SettleConfig::from_yaml_str(YAML).unwrap();
        let report = LintReport::from_config(&config);
        assert_eq!(report.checked, 3);
        assert_eq!(report.findings.len(), 2);
        assert!(!report.is_clean());
    }

    #[test]
    fn test_render_text_lists_each_lint() {
        console::set_colors_enabled(false);
        let config = SettleConfig::from_yaml_str(YAML).unwrap();
        let text = render_lint_text(&LintReport::from_config(&config));
        assert!(text.contains("warning submit: xpath=/html/body/div[2]/form/button"));
        assert!(text.contains("absolute XPath"));
        assert!(text.contains("warning third_row"));
        assert!(text.contains("3 locator(s) checked, 2 brittle"));
    }

    #[test]
    fn test_report_json_shape() {
        let config = SettleConfig::from_yaml_str(YAML).unwrap();
        let json = serde_json::to_value(LintReport::from_config(&config)).unwrap();
        assert_eq!(json["checked"], 3);
        assert_eq!(json["findings"][0]["name"], "submit");
        assert_eq!(json["findings"][0]["lints"][0]["kind"], "absolute_xpath");
    }

    #[test]
    fn test_clean_config() {
        let config = SettleConfig::from_yaml_str("locators:\n  a:\n    id: a\n").unwrap();
        assert!(LintReport::from_config(&config).is_clean());
    }
}
