//! Game variants
//!
//! A variant is a set of [`GameHooks`] plugged into the one round state
//! machine in [`crate::engine`]. Every hook defaults to a no-op, so a
//! variant only spells out where it departs from the plain flow.
//!
//! | Variant              | Departs at                                            |
//! |----------------------|-------------------------------------------------------|
//! | `StandardGame`       | initializers only                                     |
//! | `ClusterGridGame`    | grid reset, grid update, upgrades, non-zero criteria  |
//! | `ScatterTumbleGame`  | global multiplier, board multiplier, free spin award  |
//! | `ExpandingWildsGame` | wild placement before reveal, super spin sub-machine  |

mod cluster_grid;
mod expanding_wilds;
mod scatter_tumble;
mod standard;

pub use cluster_grid::*;
pub use expanding_wilds::*;
pub use scatter_tumble::*;
pub use standard::*;

use rf_core::SimResult;

use crate::config::{GameConfig, GameVariant};
use crate::engine::EngineCore;
use crate::evaluate::{PayoutStrategy, strategy_for};
use crate::symbols::SymbolFactory;

/// Variant-specific behaviour at fixed points of a round
pub trait GameHooks: Send {
    fn name(&self) -> &'static str;

    fn payout_strategy(&self, config: &GameConfig) -> Box<dyn PayoutStrategy> {
        strategy_for(config.win_type)
    }

    /// Attach symbol initializers once, when the engine is built
    fn register_initializers(&self, _config: &GameConfig, _factory: &mut SymbolFactory) -> SimResult<()> {
        Ok(())
    }

    /// Start of every attempt, after the core state was reset
    fn on_round_reset(&mut self, _core: &mut EngineCore) -> SimResult<()> {
        Ok(())
    }

    /// Play the whole attempt instead of the base game flow
    ///
    /// Return `true` when the round was handled; settlement still follows.
    fn override_round(&mut self, _core: &mut EngineCore) -> SimResult<bool> {
        Ok(false)
    }

    /// Free game entered, before the first free spin
    fn on_free_spin_start(&mut self, _core: &mut EngineCore) -> SimResult<()> {
        Ok(())
    }

    /// Free spin counter advanced, before the draw
    fn on_free_spin_update(&mut self, _core: &mut EngineCore) -> SimResult<()> {
        Ok(())
    }

    /// Board drawn but not yet revealed
    fn after_draw(&mut self, _core: &mut EngineCore) -> SimResult<()> {
        Ok(())
    }

    fn after_reveal(&mut self, _core: &mut EngineCore) -> SimResult<()> {
        Ok(())
    }

    /// Grid handed to the evaluator, if the variant keeps one
    fn position_multipliers(&self) -> Option<&[Vec<u32>]> {
        None
    }

    /// After each evaluation and its win events, tumbles included
    fn after_evaluate(&mut self, _core: &mut EngineCore) -> SimResult<()> {
        Ok(())
    }

    /// After each tumble, before the board is evaluated again
    fn on_tumble(&mut self, _core: &mut EngineCore) -> SimResult<()> {
        Ok(())
    }

    /// Spin finished, before `setWin` / `setTotalWin`
    fn on_spin_end(&mut self, _core: &mut EngineCore) -> SimResult<()> {
        Ok(())
    }

    /// Spins awarded for `scatters` in the current game type
    fn free_spin_award(&self, core: &EngineCore, scatters: u32) -> Option<u32> {
        core.config.free_spins_for(core.state.game_type, scatters)
    }

    /// Extra repeat condition checked after the standard criteria
    fn rejects_round(&self, _core: &EngineCore) -> bool {
        false
    }
}

/// Hooks for a config's variant
pub fn hooks_for(config: &GameConfig) -> Box<dyn GameHooks> {
    match config.variant {
        GameVariant::Standard => {
            let mut game = StandardGame::new();
            if config.require_win {
                game = game.with_required_win();
            }
            if config.wild_multipliers {
                game = game.with_wild_multipliers();
            }
            Box::new(game)
        }
        GameVariant::ClusterGrid => Box::new(ClusterGridGame::new()),
        GameVariant::ScatterTumble => Box::new(ScatterTumbleGame::new()),
        GameVariant::ExpandingWilds => Box::new(ExpandingWildsGame::new()),
    }
}

/// A round that paid nothing under any criteria other than "0"
fn empty_outside_zero_criteria(core: &EngineCore) -> bool {
    core.wins.running_win == 0.0 && core.state.criteria != "0"
}
