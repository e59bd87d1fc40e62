//! Settle CLI: inspect wait settings, lint locators, rehearse waits
//!
//! ## Usage
//!
//! ```bash
//! settle config show --file settle.yaml          # Effective timing and locators
//! settle config validate --file settle.yaml      # Check timing invariants
//! settle lint --file settle.yaml --strict        # Fail on brittle locators
//! settle simulate --timeout-ms 2000 --poll-interval-ms 500 --ready-after-ms 1200
//! ```

use clap::Parser;
use settle_cli::{
    handlers::{execute_config, execute_lint, execute_simulate},
    logging::init_logging,
    Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = build_config(&cli);
    console::set_colors_enabled(config.color.enabled_for(&std::io::stdout()));
    init_logging(&config);

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: &Cli, config: &CliConfig) -> CliResult<()> {
    match &cli.command {
        Commands::Config(args) => execute_config(config, args),
        Commands::Lint(args) => execute_lint(config, args),
        Commands::Simulate(args) => execute_simulate(config, args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let verbosity = if cli.quiet {
        Verbosity::Quiet
    } else {
        match cli.verbose {
            0 => Verbosity::Normal,
            1 => Verbosity::Verbose,
            _ => Verbosity::Debug,
        }
    };

    let color: ColorChoice = cli.color.clone().into();

    CliConfig::new()
        .with_verbosity(verbosity)
        .with_color(color)
        .with_log_format(cli.log_format.into())
}
