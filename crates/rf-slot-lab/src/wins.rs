//! Win bookkeeping
//!
//! ```text
//!   spin_win ──commit(game_type)──► base_game_wins / free_game_wins
//!      │                                       │
//!      └──────────── running_win ◄─────────────┘  (live round total)
//!                                  │ end_round
//!                                  ▼
//!                        cumulative batch totals
//! ```
//!
//! Everything is kept in uncapped bet multiples. The cap is applied only
//! when a value is shown to the client or settled.

use rf_core::GameType;
use serde::{Deserialize, Serialize};

/// Spin, phase, round and batch win counters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WinManager {
    /// Win of the current spin, across all of its tumbles
    pub spin_win: f64,
    /// Running total of the current tumble sequence
    pub tumble_win: f64,
    /// Live round total
    pub running_win: f64,
    pub base_game_wins: f64,
    pub free_game_wins: f64,

    pub total_cumulative_wins: f64,
    pub cumulative_base_wins: f64,
    pub cumulative_free_wins: f64,
    /// Accepted rounds folded into the cumulative totals
    pub rounds: u64,
    /// Accepted rounds with a non-zero win
    pub winning_rounds: u64,
}

impl WinManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add to the current spin and the round total
    pub fn update_spin_win(&mut self, amount: f64) {
        self.spin_win += amount;
        self.tumble_win += amount;
        self.running_win += amount;
    }

    /// Replace the current spin win, moving the round total by the difference
    pub fn set_spin_win(&mut self, amount: f64) {
        let delta = amount - self.spin_win;
        self.running_win += delta;
        self.tumble_win += delta;
        self.spin_win = amount;
    }

    pub fn reset_spin_win(&mut self) {
        self.spin_win = 0.0;
        self.tumble_win = 0.0;
    }

    /// Commit the current spin win to a phase
    pub fn commit(&mut self, game_type: GameType) {
        match game_type {
            GameType::BaseGame => self.base_game_wins += self.spin_win,
            GameType::FreeGame => self.free_game_wins += self.spin_win,
        }
    }

    /// Clear every per-round counter, keeping cumulative totals
    pub fn reset_round(&mut self) {
        self.spin_win = 0.0;
        self.tumble_win = 0.0;
        self.running_win = 0.0;
        self.base_game_wins = 0.0;
        self.free_game_wins = 0.0;
    }

    /// Fold an accepted round's settled values into the batch totals
    pub fn end_round(&mut self, final_win: f64, base: f64, free: f64) {
        self.total_cumulative_wins += final_win;
        self.cumulative_base_wins += base;
        self.cumulative_free_wins += free;
        self.rounds += 1;
        if final_win > 0.0 {
            self.winning_rounds += 1;
        }
    }

    /// Return to player over the accepted rounds
    pub fn rtp(&self, cost: f64) -> f64 {
        if self.rounds == 0 || cost <= 0.0 {
            0.0
        } else {
            self.total_cumulative_wins / (self.rounds as f64 * cost)
        }
    }

    pub fn hit_rate(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.winning_rounds as f64 / self.rounds as f64
        }
    }

    /// Merge another worker's cumulative totals
    pub fn merge(&mut self, other: &WinManager) {
        self.total_cumulative_wins += other.total_cumulative_wins;
        self.cumulative_base_wins += other.cumulative_base_wins;
        self.cumulative_free_wins += other.cumulative_free_wins;
        self.rounds += other.rounds;
        self.winning_rounds += other.winning_rounds;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_spin_and_phase_counters() {
        let mut wins = WinManager::new();
        wins.update_spin_win(2.5);
        wins.update_spin_win(1.0);
        wins.commit(GameType::BaseGame);
        assert_relative_eq!(wins.base_game_wins, 3.5);

        wins.reset_spin_win();
        wins.update_spin_win(4.0);
        wins.commit(GameType::FreeGame);
        assert_relative_eq!(wins.free_game_wins, 4.0);
        assert_relative_eq!(wins.running_win, 7.5);
        assert_relative_eq!(wins.running_win, wins.base_game_wins + wins.free_game_wins);
    }

    #[test]
    fn test_set_spin_win_moves_running_total() {
        let mut wins = WinManager::new();
        wins.update_spin_win(1.0);
        wins.reset_spin_win();
        wins.update_spin_win(2.0);
        wins.set_spin_win(6.0);
        assert_relative_eq!(wins.spin_win, 6.0);
        assert_relative_eq!(wins.running_win, 7.0);
    }

    #[test]
    fn test_round_reset_keeps_cumulative() {
        let mut wins = WinManager::new();
        wins.update_spin_win(3.0);
        wins.commit(GameType::BaseGame);
        wins.end_round(3.0, 3.0, 0.0);
        wins.reset_round();
        wins.end_round(0.0, 0.0, 0.0);

        assert_eq!(wins.running_win, 0.0);
        assert_eq!(wins.rounds, 2);
        assert_relative_eq!(wins.rtp(1.0), 1.5);
        assert_relative_eq!(wins.hit_rate(), 0.5);
    }
}
