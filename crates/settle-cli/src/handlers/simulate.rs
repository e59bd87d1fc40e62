//! Simulate command handler
//!
//! Runs the real engine on the real clock against a one-element
//! scripted page. Useful for seeing how a timeout and poll interval
//! behave before wiring them into a suite.

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::handlers::config::load_config;
use crate::output::{paint_outcome, OutputFormat};
use crate::SimulateArgs;
use serde::Serialize;
use settle::{
    BrowserSession, CancellationToken, ElementVisible, FailureCause, Locator, ScriptedElement,
    ScriptedSession, SystemClock, WaitEngine, WaitOutcome, WaitRequest, WaitSettings,
};
use std::thread;
use std::time::Duration;

/// Result of one simulated wait
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationReport {
    /// `success`, `timed_out`, `cancelled` or `failed`
    pub outcome: String,
    /// Time from request start to outcome
    pub elapsed_ms: u64,
    /// Number of condition evaluations
    pub polls: u32,
    /// Configured timeout
    pub timeout_ms: u64,
    /// Configured poll interval
    pub poll_interval_ms: u64,
    /// Last observation (timeout) or failure reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl SimulationReport {
    fn new<T>(outcome: &WaitOutcome<T>, settings: &WaitSettings) -> Self {
        let detail = match outcome {
            WaitOutcome::TimedOut { last_observed, .. } => last_observed.clone(),
            WaitOutcome::Failed { cause, .. } => Some(describe_cause(cause)),
            WaitOutcome::Success { .. } | WaitOutcome::Cancelled { .. } => None,
        };
        Self {
            outcome: outcome.label().to_string(),
            elapsed_ms: u64::try_from(outcome.elapsed().as_millis()).unwrap_or(u64::MAX),
            polls: outcome.polls(),
            timeout_ms: settings.timeout_ms,
            poll_interval_ms: settings.poll_interval_ms,
            detail,
        }
    }

    /// Whether the wait succeeded
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == "success"
    }
}

fn describe_cause(cause: &FailureCause) -> String {
    match cause {
        FailureCause::Condition(reason) => reason.clone(),
        FailureCause::Session(err) => err.to_string(),
    }
}

fn ms(value: Option<u64>) -> Option<Duration> {
    value.map(Duration::from_millis)
}

/// Timing from the config file (if any), overridden by explicit flags
fn resolve_settings(args: &SimulateArgs) -> CliResult<WaitSettings> {
    // The handle is resolved before the first poll, so the element and
    // session must both exist at t=0
    for (flag, value) in [
        ("--detach-after-ms", args.detach_after_ms),
        ("--disconnect-after-ms", args.disconnect_after_ms),
    ] {
        if value == Some(0) {
            return Err(CliError::invalid_argument(format!(
                "{flag} must be greater than 0"
            )));
        }
    }
    let config = load_config(args.config.as_deref())?;
    let mut settings = match &args.wait {
        Some(name) if !config.waits.contains_key(name) => {
            return Err(CliError::invalid_argument(format!(
                "no wait named {name:?} in config"
            )));
        }
        Some(name) => config.settings_for(name),
        None => config.defaults,
    };
    if let Some(timeout) = args.timeout_ms {
        settings = settings.with_timeout(timeout);
    }
    if let Some(interval) = args.poll_interval_ms {
        settings = settings.with_poll_interval(interval);
    }
    settings.validate()?;
    Ok(settings)
}

fn scripted_page(clock: SystemClock, args: &SimulateArgs, target: &Locator) -> ScriptedSession {
    let mut element = ScriptedElement::new(target.clone()).hidden();
    if let Some(ready) = ms(args.ready_after_ms) {
        element = element.visible_at(ready);
    }
    if let Some(detach) = ms(args.detach_after_ms) {
        element = element.detached_at(detach);
    }
    let mut session = ScriptedSession::new(clock)
        .with_url("https://settle.invalid/simulate")
        .with_element(element);
    if let Some(disconnect) = ms(args.disconnect_after_ms) {
        session = session.disconnect_at(disconnect);
    }
    session
}

/// Run the simulated wait described by `args`
pub fn run_simulation(args: &SimulateArgs) -> CliResult<SimulationReport> {
    let settings = resolve_settings(args)?;
    let clock = SystemClock::new();
    let target = Locator::id("simulated").with_description("simulated element");
    let session = scripted_page(clock, args, &target);
    let engine = WaitEngine::with_clock(clock);
    let token = CancellationToken::new();

    // Resolve once so the wait polls a bound handle
    let handle = session.find_element(&target)?;
    let request = WaitRequest::from_settings(ElementVisible::new(handle), &settings)?
        .with_cancellation(token.clone());

    let finished = CancellationToken::new();
    let canceller = ms(args.cancel_after_ms).map(|after| {
        let token = token.clone();
        let finished = finished.clone();
        thread::spawn(move || {
            if !finished.sleep(after) {
                tracing::info!(?after, "cancelling simulated wait");
                token.cancel();
            }
        })
    });

    let outcome = engine.wait(&session, request);
    finished.cancel();
    if let Some(worker) = canceller {
        join_canceller(worker);
    }

    Ok(SimulationReport::new(&outcome, &settings))
}

/// Join the canceller, logging a panic; `false` if it panicked
fn join_canceller(worker: thread::JoinHandle<()>) -> bool {
    let joined = worker.join().is_ok();
    if !joined {
        tracing::warn!("canceller thread panicked");
    }
    joined
}

/// Execute the simulate command
pub fn execute_simulate(config: &CliConfig, args: &SimulateArgs) -> CliResult<()> {
    let report = run_simulation(args)?;
    let rendered = match OutputFormat::from(args.format).structured(&report)? {
        Some(text) => Some(text),
        None if config.verbosity.is_quiet() => None,
        None => Some(render_simulation_text(&report)),
    };
    if let Some(text) = rendered {
        println!("{}", text.trim_end());
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::WaitNotSatisfied {
            outcome: report.outcome,
        })
    }
}

/// One-line human summary
#[must_use]
pub fn render_simulation_text(report: &SimulationReport) -> String {
    let mut line = format!(
        "{} after {}ms ({} poll(s), timeout {}ms, interval {}ms)",
        paint_outcome(&report.outcome),
        report.elapsed_ms,
        report.polls,
        report.timeout_ms,
        report.poll_interval_ms
    );
    if let Some(detail) = &report.detail {
        line.push_str(": ");
        line.push_str(detail);
    }
    line
}
