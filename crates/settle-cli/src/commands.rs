//! CLI command definitions using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Settle: validate wait settings, lint locators and rehearse waits
#[derive(Parser, Debug)]
#[command(name = "settle")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format on stderr
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show or validate a settle config file
    Config(ConfigArgs),

    /// Report brittle locators in a config file
    Lint(LintArgs),

    /// Run a wait against a scripted page on real time
    ///
    /// The page has one element that exists from the start but stays
    /// hidden until --ready-after-ms. The wait resolves it once and then
    /// polls that handle, so detaching it is a permanent failure.
    /// Exit code 0 means the wait succeeded, 2 means it did not.
    Simulate(SimulateArgs),
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Config action
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings (defaults when no file is given)
    Show {
        /// Config file (YAML)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormatArg,
    },

    /// Check timing invariants of every entry
    Validate {
        /// Config file (YAML)
        #[arg(short, long)]
        file: PathBuf,
    },
}

/// Arguments for the lint command
#[derive(Args, Debug)]
pub struct LintArgs {
    /// Config file (YAML) with a `locators` map
    #[arg(short, long)]
    pub file: PathBuf,

    /// Exit non-zero when any locator is brittle
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormatArg,
}

/// Arguments for the simulate command
#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Timeout in milliseconds (overrides the config file)
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Poll interval in milliseconds (overrides the config file)
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Config file supplying timing
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Named wait in the config file to take timing from
    #[arg(long, requires = "config")]
    pub wait: Option<String>,

    /// Element becomes visible after this many ms (never, if unset)
    #[arg(long)]
    pub ready_after_ms: Option<u64>,

    /// Element is removed from the page after this many ms
    #[arg(long)]
    pub detach_after_ms: Option<u64>,

    /// Browser session drops after this many ms
    #[arg(long)]
    pub disconnect_after_ms: Option<u64>,

    /// Cancel the wait after this many ms
    #[arg(long)]
    pub cancel_after_ms: Option<u64>,

    /// Output format
    #[arg(long, default_value = "text")]
    pub format: OutputFormatArg,
}

/// Output format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
    /// YAML
    Yaml,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::{ColorChoice, LogFormat};

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_global_flags() {
            let cli = Cli::parse_from([
                "settle",
                "-vv",
                "--color",
                "never",
                "--log-format",
                "json",
                "lint",
                "--file",
                "settle.yaml",
            ]);
            assert_eq!(cli.verbose, 2);
            assert!(!cli.quiet);
            assert!(matches!(cli.color, ColorArg::Never));
            assert!(matches!(cli.log_format, LogFormatArg::Json));
        }

        #[test]
        fn test_parse_config_show_without_file() {
            let cli = Cli::parse_from(["settle", "config", "show"]);
            match cli.command {
                Commands::Config(ConfigArgs {
                    action: ConfigAction::Show { file, format },
                }) => {
                    assert!(file.is_none());
                    assert_eq!(format, OutputFormatArg::Text);
                }
                other => panic!("expected config show, got {other:?}"),
            }
        }

        #[test]
        fn test_parse_config_validate_requires_file() {
            assert!(Cli::try_parse_from(["settle", "config", "validate"]).is_err());
        }

        #[test]
        fn test_parse_lint() {
            let cli = Cli::parse_from(["settle", "lint", "-f", "a.yaml", "--strict"]);
            if let Commands::Lint(args) = cli.command {
                assert!(args.strict);
                assert_eq!(args.file, PathBuf::from("a.yaml"));
            } else {
                panic!("expected Lint command");
            }
        }

        #[test]
        fn test_parse_simulate() {
            let cli = Cli::parse_from([
                "settle",
                "simulate",
                "--timeout-ms",
                "2000",
                "--poll-interval-ms",
                "100",
                "--ready-after-ms",
                "300",
                "--format",
                "json",
            ]);
            if let Commands::Simulate(args) = cli.command {
                assert_eq!(args.timeout_ms, Some(2000));
                assert_eq!(args.poll_interval_ms, Some(100));
                assert_eq!(args.ready_after_ms, Some(300));
                assert!(args.cancel_after_ms.is_none());
                assert_eq!(args.format, OutputFormatArg::Json);
            } else {
                panic!("expected Simulate command");
            }
        }

        #[test]
        fn test_wait_requires_config() {
            assert!(Cli::try_parse_from(["settle", "simulate", "--wait", "login"]).is_err());
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["settle"]).is_err());
        }
    }

    mod conversion_tests {
        use super::*;

        #[test]
        fn test_color_arg_conversion() {
            assert_eq!(ColorChoice::from(ColorArg::Auto), ColorChoice::Auto);
            assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
            assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
        }

        #[test]
        fn test_log_format_conversion() {
            assert_eq!(LogFormat::from(LogFormatArg::Json), LogFormat::Json);
            assert_eq!(LogFormat::from(LogFormatArg::Text), LogFormat::Text);
        }
    }
}
