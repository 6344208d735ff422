//! lunchbox - headless simulator for food containers
//!
//! Replays a command script against a small multi-player simulation and
//! prints the transcript.

mod command_script;
mod commands;
mod config;
mod simulation;

use anyhow::{Context, Result};
use clap::Parser;
use command_script::CommandScriptPlayer;
use config::LunchboxConfig;
use lunchbox_testkit::{EventRecord, JsonlSink, SummarySink};
use simulation::Simulation;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Replay food container scripts headlessly", long_about = None)]
struct Args {
    /// JSON command script: {"name": ..., "steps": [{"tick" or "after": N, "command": "/join alex"}, ...]}
    #[arg(long)]
    script: PathBuf,
    /// TOML configuration (defaults to config/lunchbox.toml)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write every transcript event to this JSONL file
    #[arg(long)]
    event_log: Option<PathBuf>,
    /// Write a JSON run summary here when the script ends
    #[arg(long)]
    summary: Option<PathBuf>,
    /// Stop after this many ticks even if uses are still pending
    #[arg(long, default_value_t = 72_000)]
    max_ticks: u64,
    /// Save the effective configuration to this path before running
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Initialize tracing with WARN level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    info!("Starting lunchbox v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => LunchboxConfig::load_from_path(path),
        None => LunchboxConfig::load(),
    };
    if let Some(path) = &args.write_config {
        config
            .save_to_path(path)
            .with_context(|| format!("writing config to {}", path.display()))?;
    }

    let mut script = CommandScriptPlayer::from_path(&args.script)?;
    let mut event_log = args
        .event_log
        .as_ref()
        .map(|path| {
            JsonlSink::create(path)
                .with_context(|| format!("creating event log {}", path.display()))
        })
        .transpose()?;

    if script.last_tick().is_some_and(|tick| tick.0 > args.max_ticks) {
        warn!(
            max_ticks = args.max_ticks,
            "Script schedules commands past the tick limit; they will not run"
        );
    }

    let name = match script.name() {
        Some(name) => name.to_string(),
        None => args
            .script
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "script".to_string()),
    };
    let mut sim = Simulation::new(config, name);

    sim.run_script(&mut script, args.max_ticks, |event| {
        println!("[{:>6}] {:<14} {}", event.tick.0, event.kind, event.payload);
        if let Some(sink) = event_log.as_mut() {
            sink.write(&EventRecord {
                tick: event.tick,
                kind: event.kind,
                payload: &event.payload,
            })?;
        }
        Ok(())
    })?;

    if let Some(sink) = event_log {
        let lines = sink.finish().context("flushing event log")?;
        info!(lines, "Event log written");
    }

    let summary = sim.summary();
    info!(
        ticks = sim.tick().0,
        meals = summary.meals,
        "Script finished"
    );
    if let Some(path) = &args.summary {
        SummarySink::create(path)
            .and_then(|mut sink| sink.write(&summary))
            .with_context(|| format!("writing summary to {}", path.display()))?;
    }

    Ok(())
}
