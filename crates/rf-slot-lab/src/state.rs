//! Per-round state
//!
//! One `GameState` lives as long as its worker and is reset, not
//! reallocated, at the start of every attempt.

use rf_book::ForceKey;
use rf_core::GameType;

use crate::board::Board;
use crate::evaluate::WinResult;

/// Mutable state of the round being simulated
#[derive(Debug, Clone)]
pub struct GameState {
    /// Simulation index
    pub sim: u64,
    pub criteria: String,
    pub game_type: GameType,
    pub board: Board,
    /// Result of the latest evaluation
    pub win_data: WinResult,
    pub global_multiplier: f64,
    pub free_spin_count: u32,
    pub total_free_spins: u32,
    pub wincap_triggered: bool,
    pub triggered_free_game: bool,
    /// Reject the current attempt and draw the round again
    pub repeat: bool,
    pub final_win: f64,
    records: Vec<ForceKey>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    pub fn new() -> Self {
        Self {
            sim: 0,
            criteria: String::new(),
            game_type: GameType::BaseGame,
            board: Board::from_reels(Vec::new()),
            win_data: WinResult::new(),
            global_multiplier: 1.0,
            free_spin_count: 0,
            total_free_spins: 0,
            wincap_triggered: false,
            triggered_free_game: false,
            repeat: false,
            final_win: 0.0,
            records: Vec::new(),
        }
    }

    /// Clear everything for a new attempt at `sim`
    pub fn reset(&mut self, sim: u64, criteria: &str) {
        self.sim = sim;
        self.criteria.clear();
        self.criteria.push_str(criteria);
        self.game_type = GameType::BaseGame;
        self.win_data = WinResult::new();
        self.global_multiplier = 1.0;
        self.free_spin_count = 0;
        self.total_free_spins = 0;
        self.wincap_triggered = false;
        self.triggered_free_game = false;
        self.repeat = false;
        self.final_win = 0.0;
        self.records.clear();
    }

    /// Enter the free game with a zeroed counter
    pub fn reset_free_spins(&mut self) {
        self.triggered_free_game = true;
        self.game_type = GameType::FreeGame;
        self.free_spin_count = 0;
    }

    pub fn free_spins_remaining(&self) -> bool {
        self.free_spin_count < self.total_free_spins
    }

    /// Tag the round for distribution tracking
    pub fn record(&mut self, description: ForceKey) {
        self.records.push(description);
    }

    pub fn records(&self) -> &[ForceKey] {
        &self.records
    }
}
