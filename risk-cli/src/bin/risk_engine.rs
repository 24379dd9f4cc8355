//! `risk-engine` — replays a scenario file through one [`RiskEngine`] and
//! exits 0/1 per §6 ("Exit codes (CLI harness, illustrative only)").

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use risk_cli::{load_instruments, load_scenario};
use risk_core::aggregation::Metric;
use risk_core::config::Config;
use risk_core::engine::EngineOutcome;
use risk_core::wire;
use risk_core::{EngineTelemetry, InstrumentDirectory, RiskEngine};

/// Replay a tag/value order-event scenario through the pre-trade risk
/// engine and report every decision.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the engine configuration (metrics, groupings, limits).
    #[arg(short, long)]
    config: PathBuf,

    /// Path to a JSON instrument directory (symbol -> InstrumentRecord).
    /// Symbols absent from both the file and this flag fall back to a
    /// vanilla-linear record (§6).
    #[arg(short, long)]
    instruments: Option<PathBuf>,

    /// Path to the scenario file: a JSON array of `{message, portfolio_id,
    /// strategy_id}` events.
    #[arg(short, long)]
    scenario: PathBuf,

    /// Overrides the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    let log_level = args.log_level.as_deref().unwrap_or(&config.telemetry.log_level);
    risk_core::utils::init_logger(log_level, config.telemetry.json_logs);

    let instruments = match &args.instruments {
        Some(path) => InstrumentDirectory::from_records(load_instruments(path)?),
        None => InstrumentDirectory::default(),
    };

    let mut engine = RiskEngine::new(instruments).with_telemetry(EngineTelemetry::new()?);
    for metric in &config.engine.metrics {
        engine.register_metric(Metric::new(
            metric.name.clone(),
            metric.grouping.clone(),
            metric.stage,
            metric.kind,
        ));
    }
    for limit in &config.engine.limits {
        engine.set_limit(limit.metric_name.clone(), limit.bucket_key.clone(), limit.sense);
    }

    let events = load_scenario(&args.scenario)?;
    tracing::info!(count = events.len(), "replaying scenario");

    let mut had_reject_or_error = false;
    for (index, event) in events.iter().enumerate() {
        let bytes = event.wire_bytes();
        let message = match wire::parse(&bytes) {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(index, %err, "wire parse error");
                had_reject_or_error = true;
                continue;
            }
        };

        let outcome = engine.process_message(
            message,
            event.portfolio_id.clone(),
            event.strategy_id.clone(),
        );

        match outcome {
            Ok(Some(EngineOutcome::Accepted)) => {
                tracing::info!(index, "accepted");
            }
            Ok(Some(EngineOutcome::Applied)) => {
                tracing::debug!(index, "applied");
            }
            Ok(Some(EngineOutcome::Rejected(decision))) => {
                tracing::warn!(index, ?decision, "pre-trade check rejected");
                had_reject_or_error = true;
            }
            Ok(None) => {
                tracing::debug!(index, "message required no engine transition");
            }
            Err(err) => {
                tracing::error!(index, %err, "engine error");
                had_reject_or_error = true;
            }
        }
    }

    engine.cleanup_terminal();
    let events_processed = engine
        .telemetry()
        .map(|t| t.events_processed_total.get())
        .unwrap_or(0);
    tracing::info!(
        book_size = engine.book().len(),
        events_processed,
        "scenario complete"
    );

    if had_reject_or_error {
        std::process::exit(1);
    }
    Ok(())
}
