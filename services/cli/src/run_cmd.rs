//! Runs one pipeline and maps its outcome to an exit code.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::ChronoLocal;

use learnpath_core::render::render_text;
use learnpath_core::{
    Config, OpenAICompatibleClient, Orchestrator, PipelineSettings, ProgressEvent, RunOutcome,
    Topic,
};

use crate::{Cli, EXIT_CONFIG};

pub const EXIT_COMPLETE: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_CANCELLED: i32 = 130;

const PROGRESS_BUFFER: usize = 32;

/// Runs the pipeline for the topic on the command line.
///
/// Returns the process exit code; `Err` means startup failed.
pub async fn run(cli: &Cli) -> Result<i32> {
    let topic = match Topic::new(cli.topic_text()) {
        Ok(topic) => topic,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_CONFIG);
        }
    };

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&config.log_filter)?)
        .with_timer(ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let settings = apply_overrides(PipelineSettings::from_config(&config)?, cli);
    let client = OpenAICompatibleClient::shared(&config);
    let orchestrator = Orchestrator::new(client, &settings);

    // First signal cancels, second force-exits.
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    let got_first_signal = Arc::new(AtomicBool::new(false));
    tokio::spawn(async move {
        loop {
            tokio::signal::ctrl_c().await.ok();
            if got_first_signal.swap(true, Ordering::SeqCst) {
                eprintln!("\nForce exit.");
                std::process::exit(EXIT_CANCELLED);
            }
            eprintln!("\nCancelling (Ctrl+C again to force)...");
            cancel_clone.cancel();
        }
    });

    let (tx, rx) = mpsc::channel(PROGRESS_BUFFER);
    let printer = spawn_progress_printer(rx, cli.quiet);

    let outcome = orchestrator.run(topic, Some(tx), cancel).await;
    printer.await.ok();

    report(&outcome, cli.json)
}

fn log_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .with_context(|| format!("Invalid RUST_LOG filter '{}'", directives))
}

fn apply_overrides(mut settings: PipelineSettings, cli: &Cli) -> PipelineSettings {
    if let Some(n) = cli.max_attempts {
        settings.retry = settings.retry.with_max_attempts(n);
    }
    if let Some(secs) = cli.timeout_secs {
        settings.call_timeout = Duration::from_secs(secs);
    }
    settings
}

fn spawn_progress_printer(mut rx: mpsc::Receiver<ProgressEvent>, quiet: bool) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if !quiet {
                eprintln!("[learnpath] {}", event);
            }
        }
    })
}

/// Prints the outcome and picks the exit code.
fn report(outcome: &RunOutcome, json: bool) -> Result<i32> {
    match outcome {
        RunOutcome::Complete(plan) => {
            if json {
                println!("{}", serde_json::to_string_pretty(plan)?);
            } else {
                print!("{}", render_text(plan));
            }
            Ok(EXIT_COMPLETE)
        }
        RunOutcome::Failed(failure) => {
            eprintln!("\nCould not generate a learning plan: {}", failure);
            Ok(EXIT_FAILED)
        }
        RunOutcome::Cancelled => {
            eprintln!("\nGeneration cancelled by user.");
            Ok(EXIT_CANCELLED)
        }
    }
}
