//! Parallel batch runner
//!
//! ```text
//!   SimAllocation (criteria per sim)     worker_ranges (repeat × thread)
//!                 │                                 │
//!                 └──────────────┬──────────────────┘
//!                                ▼
//!            for each repeat: rayon pool ─► run_worker per range
//!                                │   (own GameEngine, own RNG stream)
//!                                ▼
//!                   Mutex<Vec<WorkerOutput>> collector
//!                                │
//!                                ▼
//!           merge: books by id, force ledgers, win totals, summary
//! ```
//!
//! A book depends only on its simulation index and criteria, so the merged
//! output is the same for any thread count or batch size.

use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;
use rayon::prelude::*;
use rf_book::{Book, ForceLedger};
use rf_core::{SimError, SimResult};
use rf_slot_lab::{BetMode, GameConfig, GameEngine, WinManager};

use crate::allocation::{SimAllocation, WorkerRange, worker_ranges};
use crate::stats::{BatchOutput, RtpSummary, WorkerReport};

pub const DEFAULT_BATCH_SIZE: u64 = 5_000;

// ═══════════════════════════════════════════════════════════════════════════════
// SETTINGS
// ═══════════════════════════════════════════════════════════════════════════════

/// How much to simulate and on how many threads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSettings {
    pub bet_mode: String,
    pub num_sims: u64,
    pub threads: usize,
    pub batch_size: u64,
}

impl BatchSettings {
    pub fn new(bet_mode: impl Into<String>, num_sims: u64) -> Self {
        Self {
            bet_mode: bet_mode.into(),
            num_sims,
            threads: num_cpus::get(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// WORKER
// ═══════════════════════════════════════════════════════════════════════════════

/// Books and totals of one worker range
struct WorkerOutput {
    report: WorkerReport,
    /// (book, attempts needed)
    rounds: Vec<(Book, u64)>,
    ledger: ForceLedger,
    wins: WinManager,
}

fn run_worker(
    config: &Arc<GameConfig>,
    mode: &BetMode,
    allocation: &SimAllocation,
    range: &WorkerRange,
) -> SimResult<WorkerOutput> {
    let mut engine = GameEngine::new(Arc::clone(config), &mode.name)?;
    let mut rounds = Vec::with_capacity((range.sims.end - range.sims.start) as usize);

    for sim in range.sims.clone() {
        let criteria = allocation.criteria_for(sim)?;
        let outcome = engine.run_round(sim, criteria).map_err(|err| match err {
            SimError::RepeatLimit { .. } => err,
            other => SimError::Simulation(format!("sim {sim} ({criteria}): {other}")),
        })?;
        rounds.push((outcome.book, outcome.attempts));
    }

    let wins = engine.wins().clone();
    let ledger = engine.take_ledger();
    let stake = wins.rounds as f64 * mode.cost;
    let share = |amount: f64| if stake > 0.0 { amount / stake } else { 0.0 };
    let report = WorkerReport {
        thread: range.thread,
        repeat: range.repeat,
        first_sim: range.sims.start,
        sims: wins.rounds,
        rtp: wins.rtp(mode.cost),
        base_rtp: share(wins.cumulative_base_wins),
        free_rtp: share(wins.cumulative_free_wins),
        total_attempts: rounds.iter().map(|(_, a)| a).sum(),
        max_attempts: rounds.iter().map(|(_, a)| *a).max().unwrap_or(0),
    };
    Ok(WorkerOutput {
        report,
        rounds,
        ledger,
        wins,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// RUNNER
// ═══════════════════════════════════════════════════════════════════════════════

/// Runs batches of one game across a rayon pool
pub struct BatchRunner {
    config: Arc<GameConfig>,
}

impl BatchRunner {
    /// Rejects configs that would fail inside a worker
    pub fn new(config: Arc<GameConfig>) -> SimResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Simulate `settings.num_sims` rounds of one bet mode
    pub fn run(&self, settings: &BatchSettings) -> SimResult<BatchOutput> {
        let mode = self.config.bet_mode(&settings.bet_mode)?.clone();
        let allocation = SimAllocation::new(&mode, settings.num_sims)?;
        let plan = worker_ranges(settings.num_sims, settings.threads, settings.batch_size);
        info!(
            "{} / {}: {} sims over {} repeat(s), splits {:?}",
            self.config.game_id,
            mode.name,
            settings.num_sims,
            plan.len(),
            allocation.splits
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(settings.threads.max(1))
            .build()
            .map_err(|e| SimError::Simulation(format!("failed to build worker pool: {e}")))?;

        let collector: Mutex<Vec<WorkerOutput>> = Mutex::new(Vec::new());
        for (repeat, ranges) in plan.iter().enumerate() {
            pool.install(|| {
                ranges.par_iter().try_for_each(|range| {
                    let output = run_worker(&self.config, &mode, &allocation, range)?;
                    let r = &output.report;
                    info!(
                        "thread {} finished with {:.3} RTP [base: {:.3}, free: {:.3}]",
                        r.thread, r.rtp, r.base_rtp, r.free_rtp
                    );
                    collector.lock().push(output);
                    Ok::<(), SimError>(())
                })
            })?;

            let guard = collector.lock();
            let finished = guard.iter().filter(|o| o.report.repeat == repeat);
            let (attempts, worst) = finished.fold((0u64, 0u64), |(sum, max), o| {
                (sum + o.report.total_attempts, max.max(o.report.max_attempts))
            });
            debug!("repeat {repeat}: {attempts} attempts in total, worst round took {worst}");
        }

        Ok(Self::merge(&mode, collector.into_inner()))
    }

    /// Run every bet mode of the game with the same sizing
    pub fn run_all(&self, num_sims: u64, threads: usize, batch_size: u64) -> SimResult<Vec<BatchOutput>> {
        self.config
            .bet_modes
            .iter()
            .map(|mode| {
                let settings = BatchSettings::new(mode.name.clone(), num_sims)
                    .with_threads(threads)
                    .with_batch_size(batch_size);
                self.run(&settings)
            })
            .collect()
    }

    fn merge(mode: &BetMode, mut outputs: Vec<WorkerOutput>) -> BatchOutput {
        outputs.sort_by_key(|o| (o.report.repeat, o.report.thread));

        let mut ledger = ForceLedger::new();
        let mut wins = WinManager::new();
        let mut rounds = Vec::new();
        let mut worker_reports = Vec::with_capacity(outputs.len());
        for output in outputs {
            ledger.merge(output.ledger);
            wins.merge(&output.wins);
            rounds.extend(output.rounds);
            worker_reports.push(output.report);
        }
        rounds.sort_by_key(|(book, _)| book.id);

        let (books, attempts): (Vec<Book>, Vec<u64>) = rounds.into_iter().unzip();
        let summary = RtpSummary::from_books(&mode.name, mode.cost, &books, &attempts);
        info!(
            "{}: {:.4} RTP [base: {:.4}, free: {:.4}], hit rate {:.4}",
            mode.name, summary.rtp, summary.base_rtp, summary.free_rtp, summary.hit_rate
        );

        BatchOutput {
            bet_mode: mode.name.clone(),
            lookup: BatchOutput::lookup_table(&books),
            pay_split: BatchOutput::pay_splits(&books),
            books,
            ledger,
            wins,
            summary,
            worker_reports,
        }
    }
}
