//! Config command handler

use crate::commands::ConfigAction;
use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::{paint_heading, OutputFormat};
use crate::ConfigArgs;
use settle::{SettleConfig, WaitSettings};
use std::fmt::Write as _;
use std::path::Path;

/// Execute the config command
pub fn execute_config(config: &CliConfig, args: &ConfigArgs) -> CliResult<()> {
    match &args.action {
        ConfigAction::Show { file, format } => {
            let settle_config = load_config(file.as_deref())?;
            let format = OutputFormat::from(*format);
            let rendered = match format.structured(&settle_config)? {
                Some(text) => text,
                None => render_config_text(&settle_config),
            };
            println!("{}", rendered.trim_end());
        }
        ConfigAction::Validate { file } => {
            let settle_config = load_config(Some(file.as_path()))?;
            if !config.verbosity.is_quiet() {
                println!(
                    "{}: {} named wait(s), {} locator(s)",
                    file.display(),
                    settle_config.waits.len(),
                    settle_config.locators.len()
                );
            }
        }
    }
    Ok(())
}

/// Load and validate a config file, or the defaults when there is none
pub fn load_config(file: Option<&Path>) -> CliResult<SettleConfig> {
    match file {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading config");
            Ok(SettleConfig::from_path(path)?)
        }
        None => Ok(SettleConfig::new()),
    }
}

fn settings_line(settings: &WaitSettings) -> String {
    format!(
        "timeout {}ms, poll every {}ms",
        settings.timeout_ms, settings.poll_interval_ms
    )
}

/// Human-readable summary of a config
#[must_use]
pub fn render_config_text(config: &SettleConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", paint_heading("Defaults"));
    let _ = writeln!(out, "  {}", settings_line(&config.defaults));

    if !config.waits.is_empty() {
        let _ = writeln!(out, "{}", paint_heading("Waits"));
        for (name, settings) in &config.waits {
            let _ = writeln!(out, "  {name}: {}", settings_line(settings));
        }
    }

    if !config.locators.is_empty() {
        let _ = writeln!(out, "{}", paint_heading("Locators"));
        for (name, locator) in &config.locators {
            let _ = writeln!(out, "  {name}: {locator}");
        }
    }
    out
}
