//! Scatter pays with tumbles and multiplier symbols
//!
//! In the free game the global multiplier restarts at 1 every spin and
//! climbs by one after each tumble. When a free spin's tumbles are done,
//! the spin win is multiplied by the sum of multiplier symbols left on the
//! board (at least 1).

use rf_book::{EventKind, MultiplierCell};
use rf_core::{GameType, SimResult, capped_cents};

use super::GameHooks;
use crate::board::Board;
use crate::config::{GameConfig, category};
use crate::engine::EngineCore;
use crate::symbols::{SymbolFactory, multiplier_from_conditions};

/// Free spins awarded per scatter when entering from the base game
pub const SPINS_PER_SCATTER: u32 = 2;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScatterTumbleGame;

impl ScatterTumbleGame {
    pub fn new() -> Self {
        Self
    }

    /// Sum of multiplier symbols on the board (floor 1) and the cells that carry one
    pub fn board_multiplier(board: &Board) -> (u32, Vec<MultiplierCell>) {
        let cells: Vec<MultiplierCell> = board
            .cells()
            .filter_map(|(pos, sym)| {
                sym.multiplier().map(|m| MultiplierCell {
                    reel: pos.reel,
                    row: pos.row,
                    value: m as u32,
                })
            })
            .collect();
        let sum: u32 = cells.iter().map(|c| c.value).sum();
        (sum.max(1), cells)
    }
}

impl GameHooks for ScatterTumbleGame {
    fn name(&self) -> &'static str {
        "scatter_tumble"
    }

    fn register_initializers(&self, config: &GameConfig, factory: &mut SymbolFactory) -> SimResult<()> {
        factory.register_category(config, category::MULTIPLIER, multiplier_from_conditions(false))
    }

    fn on_free_spin_update(&mut self, core: &mut EngineCore) -> SimResult<()> {
        core.set_global_multiplier(1.0)
    }

    fn on_tumble(&mut self, core: &mut EngineCore) -> SimResult<()> {
        if core.state.game_type == GameType::FreeGame {
            let next = core.state.global_multiplier + 1.0;
            core.set_global_multiplier(next)?;
        }
        Ok(())
    }

    fn on_spin_end(&mut self, core: &mut EngineCore) -> SimResult<()> {
        // A capped spin is already settled at the cap
        if core.state.game_type != GameType::FreeGame || core.state.wincap_triggered {
            return Ok(());
        }
        let (board_multiplier, cells) = Self::board_multiplier(&core.state.board);
        let base_win = core.wins.spin_win;
        core.wins.set_spin_win(base_win * f64::from(board_multiplier));

        if core.wins.spin_win > 0.0 && !cells.is_empty() {
            let cap = core.win_cap();
            let padding = core.padding();
            let positions = cells
                .into_iter()
                .map(|c| MultiplierCell {
                    row: if padding { c.row + 1 } else { c.row },
                    ..c
                })
                .collect();
            core.emit(EventKind::BoardMultiplierInfo {
                positions,
                board_multiplier,
                base_win: capped_cents(base_win, cap),
                total_win: capped_cents(core.wins.spin_win, cap),
            })?;
            core.emit(EventKind::UpdateTumbleWin {
                amount: capped_cents(core.wins.spin_win, cap),
            })?;
            core.evaluate_wincap()?;
        }
        Ok(())
    }

    fn free_spin_award(&self, core: &EngineCore, scatters: u32) -> Option<u32> {
        match core.state.game_type {
            GameType::BaseGame => Some(scatters * SPINS_PER_SCATTER),
            GameType::FreeGame => core.config.free_spins_for(GameType::FreeGame, scatters),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::strategy_for;
    use crate::evaluate::test_support::board_from_names;
    use crate::presets;
    use std::sync::Arc;

    /// Free game core showing one multiplier symbol worth `mult`, holding `spin_win`
    fn free_game_core(mult: u32, spin_win: f64) -> EngineCore {
        let config = presets::scatter_6x5();
        let game = ScatterTumbleGame::new();
        let mut factory = SymbolFactory::from_config(&config);
        game.register_initializers(&config, &mut factory).unwrap();
        let strategy = strategy_for(config.win_type);
        let mut board = board_from_names(&config, &[&["M", "H1", "H2", "L1", "L2"]]);
        board.reels[0][0].set_multiplier(mult);

        let mut core = EngineCore::new(Arc::new(config), "base", factory, strategy).unwrap();
        core.state.game_type = GameType::FreeGame;
        core.state.board = board;
        core.wins.update_spin_win(spin_win);
        core
    }

    #[test]
    fn test_board_multiplier_sums_symbols() {
        let config = presets::scatter_6x5();
        let mut board = board_from_names(
            &config,
            &[
                &["M", "H1", "H1", "H1", "H1"],
                &["H1", "H1", "M", "H1", "H1"],
                &["H1", "H1", "H1", "H1", "H1"],
            ],
        );
        board.reels[0][0].set_multiplier(3);
        board.reels[1][2].set_multiplier(10);
        let (mult, cells) = ScatterTumbleGame::board_multiplier(&board);
        assert_eq!(mult, 13);
        assert_eq!(cells.len(), 2);
        assert_eq!((cells[1].reel, cells[1].row, cells[1].value), (1, 2, 10));
    }

    #[test]
    fn test_spin_end_applies_board_multiplier() {
        let mut core = free_game_core(5, 2.0);
        ScatterTumbleGame::new().on_spin_end(&mut core).unwrap();
        assert_eq!(core.wins.spin_win, 10.0);
        assert_eq!(core.wins.running_win, 10.0);
        assert!(core.book.has_event("boardMultiplierInfo"));
        assert!(!core.state.wincap_triggered);
    }

    #[test]
    fn test_capped_spin_skips_board_multiplier() {
        let cap = presets::scatter_6x5().win_cap;
        let mut core = free_game_core(10, cap);
        core.evaluate_wincap().unwrap();
        assert!(core.state.wincap_triggered);
        let events = core.book.events.len();

        ScatterTumbleGame::new().on_spin_end(&mut core).unwrap();
        assert_eq!(core.wins.spin_win, cap);
        assert_eq!(core.wins.running_win, cap);
        assert_eq!(core.book.events.len(), events);
        assert!(!core.book.has_event("boardMultiplierInfo"));
    }

    #[test]
    fn test_no_multipliers_floors_at_one() {
        let config = presets::scatter_6x5();
        let board = board_from_names(&config, &[&["H1", "H2", "H3", "L1", "L2"]]);
        let (mult, cells) = ScatterTumbleGame::board_multiplier(&board);
        assert_eq!(mult, 1);
        assert!(cells.is_empty());
    }
}
