//! Settle CLI Library
//!
//! Command-line interface for the Settle wait library: inspect and
//! validate timing config, lint locator maps for brittleness, and
//! rehearse a wait against a scripted page.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
pub mod logging;
mod output;

pub use commands::{
    Cli, ColorArg, Commands, ConfigAction, ConfigArgs, LintArgs, LogFormatArg, OutputFormatArg,
    SimulateArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use output::{paint_heading, paint_outcome, paint_warning, OutputFormat};
