//! Command handlers - kept out of main.rs for testability
//!
//! Each handler renders into a `String` through pure helpers and only
//! `execute_*` prints.

pub mod config;
pub mod lint;
pub mod simulate;

pub use config::{execute_config, load_config, render_config_text};
pub use lint::{execute_lint, render_lint_text, LintReport};
pub use simulate::{execute_simulate, render_simulation_text, run_simulation, SimulationReport};
