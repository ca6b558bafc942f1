//! Plain lines / ways / cluster / scatter games

use rf_core::SimResult;

use super::{GameHooks, empty_outside_zero_criteria};
use crate::config::{GameConfig, category};
use crate::engine::EngineCore;
use crate::symbols::{SymbolFactory, multiplier_from_conditions, prize_from_conditions};

/// The unmodified round flow
#[derive(Debug, Clone, Default)]
pub struct StandardGame {
    wild_multipliers: bool,
    require_win: bool,
}

impl StandardGame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give wilds a multiplier in the free game (builder pattern)
    pub fn with_wild_multipliers(mut self) -> Self {
        self.wild_multipliers = true;
        self
    }

    /// Reject rounds that pay nothing unless the criteria is "0" (builder pattern)
    pub fn with_required_win(mut self) -> Self {
        self.require_win = true;
        self
    }
}

impl GameHooks for StandardGame {
    fn name(&self) -> &'static str {
        "standard"
    }

    fn register_initializers(&self, config: &GameConfig, factory: &mut SymbolFactory) -> SimResult<()> {
        factory.register_category(config, category::MULTIPLIER, multiplier_from_conditions(false))?;
        factory.register_category(config, category::PRIZE, prize_from_conditions())?;
        if self.wild_multipliers {
            factory.register_category(config, category::WILD, multiplier_from_conditions(true))?;
        }
        Ok(())
    }

    fn rejects_round(&self, core: &EngineCore) -> bool {
        self.require_win && empty_outside_zero_criteria(core)
    }
}
