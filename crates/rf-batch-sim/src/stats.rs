//! Batch output and payout statistics

use rf_book::{Book, ForceLedger};
use rf_core::to_cents;
use rf_slot_lab::WinManager;
use serde::{Deserialize, Serialize};

/// One row of the payout lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupEntry {
    pub id: u64,
    pub weight: u64,
    pub payout_cents: u64,
}

/// Base/free share of one book's payout, in bet multiples
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaySplit {
    pub id: u64,
    pub base: f64,
    pub free: f64,
}

/// What one worker range produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerReport {
    pub thread: usize,
    pub repeat: usize,
    pub first_sim: u64,
    pub sims: u64,
    pub rtp: f64,
    pub base_rtp: f64,
    pub free_rtp: f64,
    pub total_attempts: u64,
    pub max_attempts: u64,
}

/// Aggregate figures for a bet mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RtpSummary {
    pub bet_mode: String,
    pub sims: u64,
    pub cost: f64,
    pub rtp: f64,
    pub base_rtp: f64,
    pub free_rtp: f64,
    pub hit_rate: f64,
    pub mean_payout: f64,
    pub std_payout: f64,
    pub median_payout: f64,
    pub max_payout: f64,
    pub wincap_count: u64,
    pub total_attempts: u64,
    pub max_attempts: u64,
}

impl RtpSummary {
    /// Summary over settled books; `attempts` holds one count per book
    pub fn from_books(bet_mode: &str, cost: f64, books: &[Book], attempts: &[u64]) -> Self {
        let sims = books.len() as u64;
        let mut summary = Self {
            bet_mode: bet_mode.to_string(),
            sims,
            cost,
            total_attempts: attempts.iter().sum(),
            max_attempts: attempts.iter().copied().max().unwrap_or(0),
            ..Self::default()
        };
        if sims == 0 {
            return summary;
        }

        let n = sims as f64;
        let stake = if cost > 0.0 { n * cost } else { n };
        let mut payouts: Vec<f64> = books.iter().map(|b| b.payout_multiplier).collect();
        let total: f64 = payouts.iter().sum();

        summary.rtp = total / stake;
        summary.base_rtp = books.iter().map(|b| b.base_game_wins).sum::<f64>() / stake;
        summary.free_rtp = books.iter().map(|b| b.free_game_wins).sum::<f64>() / stake;
        summary.hit_rate = payouts.iter().filter(|p| **p > 0.0).count() as f64 / n;
        summary.mean_payout = total / n;
        summary.std_payout = (payouts
            .iter()
            .map(|p| (p - summary.mean_payout).powi(2))
            .sum::<f64>()
            / n)
            .sqrt();
        summary.wincap_count = books.iter().filter(|b| b.has_event("winCap")).count() as u64;

        payouts.sort_by(f64::total_cmp);
        summary.max_payout = payouts.last().copied().unwrap_or(0.0);
        let mid = payouts.len() / 2;
        summary.median_payout = if payouts.len() % 2 == 0 {
            (payouts[mid - 1] + payouts[mid]) / 2.0
        } else {
            payouts[mid]
        };
        summary
    }
}

/// Everything a batch produces for one bet mode
#[derive(Debug, Clone)]
pub struct BatchOutput {
    pub bet_mode: String,
    /// Sorted by book id
    pub books: Vec<Book>,
    pub ledger: ForceLedger,
    /// Cumulative totals merged across workers
    pub wins: WinManager,
    pub lookup: Vec<LookupEntry>,
    pub pay_split: Vec<PaySplit>,
    pub summary: RtpSummary,
    /// Sorted by (repeat, thread)
    pub worker_reports: Vec<WorkerReport>,
}

impl BatchOutput {
    pub fn lookup_table(books: &[Book]) -> Vec<LookupEntry> {
        books
            .iter()
            .map(|b| LookupEntry {
                id: b.id,
                weight: 1,
                payout_cents: to_cents(b.payout_multiplier),
            })
            .collect()
    }

    pub fn pay_splits(books: &[Book]) -> Vec<PaySplit> {
        books
            .iter()
            .map(|b| PaySplit {
                id: b.id,
                base: b.base_game_wins,
                free: b.free_game_wins,
            })
            .collect()
    }

    /// Lookup rows as `id,weight,payout` CSV lines
    pub fn lookup_csv(&self) -> String {
        self.lookup
            .iter()
            .map(|e| format!("{},{},{}\n", e.id, e.weight, e.payout_cents))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn book(id: u64, base: f64, free: f64) -> Book {
        let mut book = Book::new(id, "basegame");
        book.settle(base + free, base, free);
        book
    }

    #[test]
    fn test_summary_figures() {
        let books = vec![book(1, 0.0, 0.0), book(2, 2.0, 0.0), book(3, 1.0, 3.0), book(4, 0.0, 0.0)];
        let summary = RtpSummary::from_books("base", 1.0, &books, &[1, 3, 1, 2]);
        assert_relative_eq!(summary.rtp, 1.5);
        assert_relative_eq!(summary.base_rtp, 0.75);
        assert_relative_eq!(summary.free_rtp, 0.75);
        assert_relative_eq!(summary.hit_rate, 0.5);
        assert_relative_eq!(summary.median_payout, 1.0);
        assert_relative_eq!(summary.max_payout, 4.0);
        assert_relative_eq!(summary.std_payout, 1.6583, epsilon = 1e-4);
        assert_eq!((summary.total_attempts, summary.max_attempts), (7, 3));
    }

    #[test]
    fn test_cost_scales_rtp() {
        let books = vec![book(1, 50.0, 150.0), book(2, 0.0, 0.0)];
        let summary = RtpSummary::from_books("bonus", 100.0, &books, &[1, 1]);
        assert_relative_eq!(summary.rtp, 1.0);
        assert_relative_eq!(summary.mean_payout, 100.0);
    }

    #[test]
    fn test_empty_batch() {
        let summary = RtpSummary::from_books("base", 1.0, &[], &[]);
        assert_eq!(summary.sims, 0);
        assert_relative_eq!(summary.rtp, 0.0);
    }

    #[test]
    fn test_lookup_rows() {
        let books = vec![book(1, 0.25, 0.0), book(2, 1.0, 2.5)];
        let lookup = BatchOutput::lookup_table(&books);
        assert_eq!(lookup[1], LookupEntry { id: 2, weight: 1, payout_cents: 350 });
        let splits = BatchOutput::pay_splits(&books);
        assert_relative_eq!(splits[1].free, 2.5);
    }
}
