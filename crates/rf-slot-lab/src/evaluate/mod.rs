//! Payout evaluators
//!
//! ```text
//!              ┌──────────────┐
//!   Board ───► │PayoutStrategy│ ───► WinResult { total_win, wins[] }
//!              └──────┬───────┘
//!        ┌────────┬───┴────┬─────────┐
//!      Lines     Ways   Cluster   Scatter
//! ```
//!
//! Evaluators never change which symbol sits in a cell. They may flag
//! winning cells with `explode` for the next tumble. All amounts are bet
//! multiples; conversion to cents happens when events are emitted.

mod cluster;
mod lines;
mod scatter;
mod ways;

pub use cluster::*;
pub use lines::*;
pub use scatter::*;
pub use ways::*;

use std::collections::BTreeSet;

use rf_book::{ForceKey, force_key};
use rf_core::{GameType, Position};
use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::config::{GameConfig, WinType};

/// Breakdown attached to every win
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinMeta {
    /// Global multiplier in effect
    pub global_multiplier: f64,
    /// Total multiplier applied to `win_without_mult`
    pub multiplier: f64,
    pub win_without_mult: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ways: Option<u64>,
    /// Sum of contributing symbol multipliers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Position>,
}

/// One scoring unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinRecord {
    pub symbol: String,
    /// Line length, ways kind, cluster size or scatter count
    pub kind: u32,
    /// Amount after every multiplier, bet multiples
    pub win: f64,
    pub positions: Vec<Position>,
    pub meta: WinMeta,
}

impl WinRecord {
    /// Description recorded for distribution tracking
    pub fn force_description(&self, game_type: GameType) -> ForceKey {
        let mut key = force_key([
            ("kind", self.kind.to_string()),
            ("symbol", self.symbol.clone()),
            ("multiplier", (self.meta.multiplier as u64).to_string()),
            ("gametype", game_type.key().to_string()),
        ]);
        if let Some(ways) = self.meta.ways {
            key.insert("ways".into(), ways.to_string());
        }
        key
    }
}

/// Result of one evaluation pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinResult {
    pub total_win: f64,
    pub wins: Vec<WinRecord>,
}

impl WinResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: WinRecord) {
        self.total_win += record.win;
        self.wins.push(record);
    }

    pub fn is_empty(&self) -> bool {
        self.wins.is_empty()
    }

    /// Every winning cell, deduplicated, reel-major
    pub fn positions(&self) -> BTreeSet<Position> {
        self.wins.iter().flat_map(|w| w.positions.iter().copied()).collect()
    }

    /// Flag every winning cell for removal
    pub fn mark_explode(&self, board: &mut Board) {
        for pos in self.positions() {
            if let Some(cell) = board.get_mut(pos) {
                cell.mark_explode();
            }
        }
    }

    /// Scale every win by `factor`
    pub fn scale(&mut self, factor: f64) {
        for win in &mut self.wins {
            win.win *= factor;
        }
        self.total_win *= factor;
    }
}

/// Inputs shared by every evaluator
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub config: &'a GameConfig,
    pub global_multiplier: f64,
    /// Per-position multipliers, `[reel][row]`, for cluster grid games
    pub position_multipliers: Option<&'a [Vec<u32>]>,
}

impl<'a> EvalContext<'a> {
    pub fn new(config: &'a GameConfig) -> Self {
        Self {
            config,
            global_multiplier: 1.0,
            position_multipliers: None,
        }
    }

    /// Set the global multiplier (builder pattern)
    pub fn with_global_multiplier(mut self, multiplier: f64) -> Self {
        self.global_multiplier = multiplier;
        self
    }

    /// Attach a position multiplier grid (builder pattern)
    pub fn with_position_multipliers(mut self, grid: &'a [Vec<u32>]) -> Self {
        self.position_multipliers = Some(grid);
        self
    }
}

/// A payout algorithm
pub trait PayoutStrategy: Send + Sync {
    fn win_type(&self) -> WinType;

    /// Evaluate the board
    fn evaluate(&self, board: &mut Board, ctx: &EvalContext<'_>) -> WinResult;
}

/// How symbol multipliers combine on a line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiplierStrategy {
    /// Sum of multipliers above 1 on the winning cells (floor 1), times global
    #[default]
    Symbol,
    /// Global multiplier only
    Global,
}

impl MultiplierStrategy {
    /// Total multiplier for a win covering `positions`
    pub fn apply(&self, board: &Board, positions: &[Position], global_multiplier: f64) -> f64 {
        match self {
            MultiplierStrategy::Global => global_multiplier,
            MultiplierStrategy::Symbol => {
                let sum: f64 = positions
                    .iter()
                    .filter_map(|p| board.get(*p))
                    .filter_map(|s| s.enhancing_multiplier())
                    .sum();
                sum.max(1.0) * global_multiplier
            }
        }
    }
}

/// Default evaluator for a payout scheme
pub fn strategy_for(win_type: WinType) -> Box<dyn PayoutStrategy> {
    match win_type {
        WinType::Lines => Box::new(LinesEvaluator::default()),
        WinType::Ways => Box::new(WaysEvaluator),
        WinType::Cluster => Box::new(ClusterEvaluator),
        WinType::Scatter => Box::new(ScatterEvaluator),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::board::Board;
    use crate::config::GameConfig;
    use crate::symbols::SymbolFactory;

    /// Board from a reel-major grid of names
    pub fn board_from_names(config: &GameConfig, names: &[&[&str]]) -> Board {
        let factory = SymbolFactory::from_config(config);
        let reels = names
            .iter()
            .map(|reel| reel.iter().map(|n| factory.template(n).unwrap()).collect())
            .collect();
        let mut board = Board::from_reels(reels);
        board.refresh_special_positions(config.special_symbols.keys());
        board
    }
}
