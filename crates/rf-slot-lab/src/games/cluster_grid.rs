//! Cluster pays with a free-game position multiplier grid
//!
//! ```text
//!   free spin:  reveal ─► updateBoardMultiplier ─► evaluate(grid) ─► bump grid
//!                                                      ▲                │
//!                                                      └── tumble ◄─────┘
//! ```
//!
//! Every winning cell of a free-game evaluation lights up (0 → 1) or, when
//! already lit, climbs by one up to `maximum_board_multiplier`. A cluster
//! pays the sum of its cells' grid values, floored at 1.

use rand::Rng;
use rf_book::EventKind;
use rf_core::{GameType, Position, SimResult};

use super::{GameHooks, empty_outside_zero_criteria};
use crate::engine::EngineCore;

#[derive(Debug, Clone, Default)]
pub struct ClusterGridGame {
    /// `[reel][row]`, empty outside the free game
    grid: Vec<Vec<u32>>,
}

impl ClusterGridGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(&self) -> &[Vec<u32>] {
        &self.grid
    }

    /// Light or raise every winning cell
    pub fn bump(&mut self, positions: impl IntoIterator<Item = Position>, ceiling: u32) {
        for pos in positions {
            let Some(cell) = self.grid.get_mut(pos.reel).and_then(|r| r.get_mut(pos.row)) else {
                continue;
            };
            *cell = if *cell == 0 { 1 } else { (*cell + 1).min(ceiling) };
        }
    }

    fn emit_grid(&self, core: &mut EngineCore) -> SimResult<()> {
        core.emit(EventKind::UpdateBoardMultiplier {
            board_multipliers: self.grid.clone(),
        })?;
        Ok(())
    }

    /// Replace one cell of each qualifying cluster with its upgrade target
    fn apply_upgrades(&self, core: &mut EngineCore) -> SimResult<()> {
        let Some(upgrade) = core.config.upgrade.clone() else {
            return Ok(());
        };
        let wins = core.state.win_data.wins.clone();
        let padding = core.padding();
        let mut changed = false;
        for win in &wins {
            let Some(target) = upgrade.target(&win.symbol, win.kind) else {
                continue;
            };
            if win.positions.is_empty() {
                continue;
            }
            let pick = win.positions[core.rng.random_range(0..win.positions.len())];
            let symbol = core.create_symbol(target)?;
            core.state.board.set(pick, symbol)?;
            core.emit(EventKind::Upgrade {
                symbol: target.to_string(),
                position: pick.padded(padding),
                from_positions: win.positions.iter().map(|p| p.padded(padding)).collect(),
            })?;
            changed = true;
        }
        if changed {
            core.refresh_board()?;
        }
        Ok(())
    }
}

impl GameHooks for ClusterGridGame {
    fn name(&self) -> &'static str {
        "cluster_grid"
    }

    fn on_round_reset(&mut self, _core: &mut EngineCore) -> SimResult<()> {
        self.grid.clear();
        Ok(())
    }

    fn on_free_spin_start(&mut self, core: &mut EngineCore) -> SimResult<()> {
        let config = &core.config;
        self.grid = (0..config.num_reels).map(|reel| vec![0; config.rows(reel)]).collect();
        Ok(())
    }

    fn after_reveal(&mut self, core: &mut EngineCore) -> SimResult<()> {
        if core.state.game_type == GameType::FreeGame {
            self.emit_grid(core)?;
        }
        Ok(())
    }

    fn position_multipliers(&self) -> Option<&[Vec<u32>]> {
        if self.grid.is_empty() { None } else { Some(&self.grid) }
    }

    fn after_evaluate(&mut self, core: &mut EngineCore) -> SimResult<()> {
        if core.state.win_data.total_win <= 0.0 {
            return Ok(());
        }
        self.apply_upgrades(core)?;
        if core.state.game_type == GameType::FreeGame && !self.grid.is_empty() {
            self.bump(core.state.win_data.positions(), core.config.maximum_board_multiplier);
            self.emit_grid(core)?;
        }
        Ok(())
    }

    fn rejects_round(&self, core: &EngineCore) -> bool {
        empty_outside_zero_criteria(core)
    }
}
