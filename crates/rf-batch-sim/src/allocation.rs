//! Criteria allocation and worker index ranges
//!
//! ```text
//!   quotas ──► sim_splits ──► [criteria; count] ──shuffle(seed 0)──► sim → criteria
//!
//!   repeat 0: | thread 0 | thread 1 | ... | thread T-1 |
//!   repeat 1: | thread 0 | thread 1 | ... | thread T-1 |  (+ remainder on the last range)
//! ```
//!
//! Both steps use a fixed seed, so the same bet mode and simulation count
//! always produce the same assignment.

use std::collections::BTreeMap;
use std::ops::Range;

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use rf_core::{SimError, SimResult};
use rf_slot_lab::{BetMode, WeightTable};

const ALLOCATION_SEED: u64 = 0;

/// Simulations per criteria, summing to exactly `num_sims`
///
/// Each criteria starts at `floor(num_sims × share)` (at least 1), then
/// quota-weighted draws add or remove single simulations until the total
/// matches.
pub fn sim_splits(mode: &BetMode, num_sims: u64) -> SimResult<BTreeMap<String, u64>> {
    let count = mode.distributions.len() as u64;
    if count == 0 {
        return Err(SimError::GameConfig(format!("bet mode '{}' has no distributions", mode.name)));
    }
    if num_sims < count {
        return Err(SimError::Simulation(format!(
            "bet mode '{}' needs at least {count} simulations, got {num_sims}",
            mode.name
        )));
    }

    let total_quota: f64 = mode.distributions.iter().map(|d| d.quota).sum();
    let mut weights = WeightTable::new();
    let mut splits = BTreeMap::new();
    for dist in &mode.distributions {
        let share = (num_sims as f64 * dist.quota / total_quota).floor() as u64;
        splits.insert(dist.criteria.clone(), share.max(1));
        weights.insert(dist.criteria.clone(), dist.quota);
    }

    let mut rng = ChaCha8Rng::seed_from_u64(ALLOCATION_SEED);
    let mut total: u64 = splits.values().sum();
    let reduce = total > num_sims;
    while total != num_sims {
        let criteria = weights.draw(&mut rng)?;
        let Some(n) = splits.get_mut(&criteria) else { continue };
        if reduce {
            if *n > 1 {
                *n -= 1;
                total -= 1;
            }
        } else {
            *n += 1;
            total += 1;
        }
    }
    Ok(splits)
}

/// Criteria for every simulation index of a bet mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimAllocation {
    pub splits: BTreeMap<String, u64>,
    criteria: Vec<String>,
}

impl SimAllocation {
    pub fn new(mode: &BetMode, num_sims: u64) -> SimResult<Self> {
        let splits = sim_splits(mode, num_sims)?;
        let mut criteria: Vec<String> = splits
            .iter()
            .flat_map(|(name, count)| std::iter::repeat_n(name.clone(), *count as usize))
            .collect();
        let mut rng = ChaCha8Rng::seed_from_u64(ALLOCATION_SEED);
        criteria.shuffle(&mut rng);
        Ok(Self { splits, criteria })
    }

    pub fn criteria_for(&self, sim: u64) -> SimResult<&str> {
        self.criteria
            .get(sim as usize)
            .map(String::as_str)
            .ok_or_else(|| SimError::Simulation(format!("simulation {sim} has no criteria assigned")))
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// Contiguous simulation indices owned by one worker in one repeat
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerRange {
    pub thread: usize,
    pub repeat: usize,
    pub sims: Range<u64>,
}

/// Split `num_sims` into `repeats × threads` disjoint ranges
///
/// `repeats = max(round(num_sims / threads / batch_size), 1)`. Indices that
/// do not divide evenly go to the last range of the last repeat.
pub fn worker_ranges(num_sims: u64, threads: usize, batch_size: u64) -> Vec<Vec<WorkerRange>> {
    if num_sims == 0 {
        return Vec::new();
    }
    let threads = (threads.max(1) as u64).min(num_sims);
    let batch_size = batch_size.max(1);
    let repeats = ((num_sims as f64 / threads as f64 / batch_size as f64).round() as u64).max(1);
    let per_worker = num_sims / (threads * repeats);
    let covered = per_worker * threads * repeats;

    (0..repeats)
        .map(|repeat| {
            (0..threads)
                .map(|thread| {
                    let start = thread * per_worker + threads * per_worker * repeat;
                    let mut end = start + per_worker;
                    if repeat == repeats - 1 && thread == threads - 1 {
                        end += num_sims - covered;
                    }
                    WorkerRange {
                        thread: thread as usize,
                        repeat: repeat as usize,
                        sims: start..end,
                    }
                })
                .filter(|range| !range.sims.is_empty())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rf_slot_lab::presets;

    fn base_mode() -> BetMode {
        presets::lines_5x3().bet_mode("base").unwrap().clone()
    }

    #[test]
    fn test_splits_sum_to_total() {
        let mode = base_mode();
        for sims in [3, 10, 97, 1000] {
            let splits = sim_splits(&mode, sims).unwrap();
            assert_eq!(splits.values().sum::<u64>(), sims);
            assert!(splits.values().all(|n| *n >= 1));
        }
        let splits = sim_splits(&mode, 1000).unwrap();
        assert_eq!(splits["basegame"], 600);
        assert_eq!(splits["freegame"], 100);
    }

    #[test]
    fn test_too_few_sims_rejected() {
        assert!(sim_splits(&base_mode(), 2).is_err());
    }

    #[test]
    fn test_allocation_is_deterministic() {
        let mode = base_mode();
        let a = SimAllocation::new(&mode, 200).unwrap();
        let b = SimAllocation::new(&mode, 200).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 200);
        let zero = (0..200).filter(|s| a.criteria_for(*s).unwrap() == "0").count() as u64;
        assert_eq!(zero, a.splits["0"]);
        assert!(a.criteria_for(200).is_err());
    }

    #[test]
    fn test_ranges_cover_every_index_once() {
        for (sims, threads, batch) in [(100, 4, 10), (101, 3, 50), (7, 16, 1000), (1, 1, 1)] {
            let ranges = worker_ranges(sims, threads, batch);
            let mut seen: Vec<u64> = ranges.iter().flatten().flat_map(|r| r.sims.clone()).collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..sims).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_range_layout_follows_repeat_and_thread() {
        let ranges = worker_ranges(100, 4, 10);
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0][1].sims, 8..16);
        assert_eq!(ranges[1][0].sims, 32..40);
        assert_eq!(ranges[2][3].sims, 88..100);
    }
}
