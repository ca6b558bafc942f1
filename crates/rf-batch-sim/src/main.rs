//! Batch simulation CLI
//!
//! Usage: rf-batch-sim --preset lines_5x3 --sims 100000 --threads 8
//!        rf-batch-sim --config game.yaml --mode bonus
//!
//! Prints one JSON summary per simulated bet mode to stdout. Progress goes
//! through `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use rf_batch_sim::{BatchRunner, BatchSettings, DEFAULT_BATCH_SIZE, RtpSummary, WorkerReport};
use rf_slot_lab::{GameConfig, presets};
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "rf-batch-sim")]
#[command(about = "Simulate slot rounds in parallel and report RTP")]
struct Args {
    /// Game config file (.json, .yaml or .yml)
    #[arg(short, long, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in game by id
    #[arg(short, long, default_value = "lines_5x3")]
    preset: String,

    /// Bet mode to simulate; every mode when omitted
    #[arg(short, long)]
    mode: Option<String>,

    /// Simulations per bet mode
    #[arg(short, long, default_value_t = 10_000)]
    sims: u64,

    /// Worker threads (defaults to the CPU count)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Target simulations per worker range
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: u64,

    /// Include per-worker reports in the output
    #[arg(long)]
    workers: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ModeReport {
    game_id: String,
    summary: RtpSummary,
    force_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    workers: Option<Vec<WorkerReport>>,
}

fn load_config(args: &Args) -> anyhow::Result<GameConfig> {
    let config = match &args.config {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("failed to load game config from {}", path.display()))?,
        None => match presets::by_id(&args.preset) {
            Some(config) => config,
            None => {
                let known: Vec<String> = presets::all_presets().into_iter().map(|c| c.game_id).collect();
                bail!("unknown preset '{}', expected one of {known:?}", args.preset);
            }
        },
    };
    config.validate().context("invalid game config")?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = load_config(&args)?;
    let modes: Vec<String> = match &args.mode {
        Some(mode) => vec![mode.clone()],
        None => config.bet_modes.iter().map(|m| m.name.clone()).collect(),
    };
    let game_id = config.game_id.clone();
    let runner = BatchRunner::new(Arc::new(config)).context("invalid game config")?;
    let threads = args.threads.unwrap_or_else(num_cpus::get);

    let mut reports = Vec::with_capacity(modes.len());
    for mode in modes {
        let settings = BatchSettings::new(mode.clone(), args.sims)
            .with_threads(threads)
            .with_batch_size(args.batch_size);
        let output = runner
            .run(&settings)
            .with_context(|| format!("batch for bet mode '{mode}' failed"))?;
        reports.push(ModeReport {
            game_id: game_id.clone(),
            summary: output.summary,
            force_records: output.ledger.len(),
            workers: args.workers.then_some(output.worker_reports),
        });
    }

    let json = serde_json::to_string_pretty(&reports).context("failed to serialize summary")?;
    println!("{json}");
    Ok(())
}
