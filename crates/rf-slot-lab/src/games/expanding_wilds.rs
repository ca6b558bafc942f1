//! Lines game with expanding wilds and a sticky-prize respin mode
//!
//! Free game: each spin lands `landing_wilds` new wilds on reels that have
//! not expanded yet. From the following spin on, an expanded reel is all
//! wilds sharing one multiplier, redrawn every spin.
//!
//! Super spin (`super_spin` bet mode), played instead of the base game:
//!
//! ```text
//!   respins = 3
//!   loop while respins remain:
//!       draw ─► stick known prizes back ─► reveal
//!       new prize landed? ─► addStickySymbols, respins = 3 again
//!   pay the sum of every prize on the board
//! ```

use rand::Rng;
use rf_book::{EventKind, ExpandingWild, PrizeCell};
use rf_core::{GameType, Position, SimError, SimResult, capped_cents, to_cents};

use super::{GameHooks, empty_outside_zero_criteria};
use crate::config::{GameConfig, category};
use crate::emit;
use crate::engine::EngineCore;
use crate::symbols::{SymbolFactory, multiplier_from_conditions, prize_from_conditions};

pub const SUPER_SPIN_MODE: &str = "super_spin";
pub const SUPER_SPIN_RESPINS: u32 = 3;
/// Wincap rounds stop forcing prizes once the running win reaches this share of the cap
pub const WINCAP_FORCE_SHARE: f64 = 0.95;

const WILD_SYMBOL: &str = "W";
const PRIZE_SYMBOL: &str = "P";

/// A prize stuck to the board during super spin, in bet multiples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickyPrize {
    pub position: Position,
    pub prize: f64,
}

#[derive(Debug, Clone, Default)]
pub struct ExpandingWildsGame {
    /// Expanded reels, sorted by reel, row always 0
    expanding: Vec<ExpandingWild>,
    /// Landed this spin, expanding from the next
    landed: Vec<ExpandingWild>,
    available_reels: Vec<usize>,
    sticky: Vec<StickyPrize>,
}

impl ExpandingWildsGame {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expanding_wilds(&self) -> &[ExpandingWild] {
        &self.expanding
    }

    fn draw_multiplier(core: &mut EngineCore) -> SimResult<u32> {
        let game_type = core.state.game_type;
        let table = core
            .conditions()
            .mult_values(game_type)
            .ok_or_else(|| SimError::GameConfig(format!("no mult_values for {game_type} expanding wilds")))?
            .clone();
        table.draw(&mut core.rng)
    }

    fn wild_with(core: &mut EngineCore, multiplier: u32) -> SimResult<crate::symbols::Symbol> {
        let mut wild = core.create_symbol(WILD_SYMBOL)?;
        wild.set_multiplier(multiplier);
        Ok(wild)
    }

    /// Drop new wilds on random reels that have not expanded yet
    fn land_new_wilds(&mut self, core: &mut EngineCore) -> SimResult<()> {
        self.landed.clear();
        let landing = core.conditions().landing_wilds.clone();
        let count = if landing.is_empty() { 0 } else { landing.draw(&mut core.rng)? };

        for _ in 0..count {
            if self.available_reels.is_empty() {
                break;
            }
            let idx = core.rng.random_range(0..self.available_reels.len());
            let reel = self.available_reels.remove(idx);
            let row = core.rng.random_range(0..core.config.rows(reel));
            let multiplier = Self::draw_multiplier(core)?;
            let wild = Self::wild_with(core, multiplier)?;
            core.state.board.set(Position::new(reel, row), wild)?;
            self.landed.push(ExpandingWild { reel, row, multiplier });
        }
        Ok(())
    }

    /// Fill every expanded reel with wilds carrying a fresh multiplier
    fn expand_existing(&mut self, core: &mut EngineCore) -> SimResult<()> {
        for i in 0..self.expanding.len() {
            let reel = self.expanding[i].reel;
            let multiplier = Self::draw_multiplier(core)?;
            self.expanding[i].multiplier = multiplier;
            for row in 0..core.state.board.rows(reel) {
                let wild = Self::wild_with(core, multiplier)?;
                core.state.board.set(Position::new(reel, row), wild)?;
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // SUPER SPIN
    // ═══════════════════════════════════════════════════════════════════════

    fn prize_on_board(core: &EngineCore) -> bool {
        core.board().count_special(category::PRIZE) > 0
    }

    /// Redraw for criteria "0" (no prizes) and wincap rounds (force an early prize)
    fn draw_respin(&self, core: &mut EngineCore) -> SimResult<()> {
        core.draw_random()?;
        let criteria = core.state.criteria.clone();
        if criteria == "0" {
            while Self::prize_on_board(core) {
                core.draw_random()?;
            }
        } else if (criteria.eq_ignore_ascii_case("wincap") || core.conditions().force_wincap)
            && core.wins.running_win < WINCAP_FORCE_SHARE * core.win_cap()
            && core.state.free_spin_count <= 1
        {
            while !Self::prize_on_board(core) {
                core.draw_random()?;
            }
        }
        Ok(())
    }

    fn restore_sticky(&self, core: &mut EngineCore) -> SimResult<()> {
        for sticky in &self.sticky {
            let mut prize = core.create_symbol(PRIZE_SYMBOL)?;
            prize.set_prize(sticky.prize);
            core.state.board.set(sticky.position, prize)?;
        }
        if !self.sticky.is_empty() {
            core.refresh_board()?;
        }
        Ok(())
    }

    /// Prizes on the board that are not stuck yet
    fn collect_new_prizes(&mut self, core: &EngineCore) -> Vec<StickyPrize> {
        let mut found = Vec::new();
        for (position, sym) in core.board().cells() {
            let Some(prize) = sym.prize() else { continue };
            if self.sticky.iter().any(|s| s.position == position) {
                continue;
            }
            let sticky = StickyPrize { position, prize };
            self.sticky.push(sticky);
            found.push(sticky);
        }
        found
    }

    fn prize_cells(prizes: &[StickyPrize], padding: bool, cap: f64) -> Vec<PrizeCell> {
        prizes
            .iter()
            .map(|p| {
                let pos = p.position.padded(padding);
                PrizeCell {
                    reel: pos.reel,
                    row: pos.row,
                    prize: capped_cents(p.prize, cap),
                }
            })
            .collect()
    }

    fn run_super_spin(&mut self, core: &mut EngineCore) -> SimResult<()> {
        self.sticky.clear();
        core.state.total_free_spins = SUPER_SPIN_RESPINS;
        core.state.free_spin_count = 0;
        let padding = core.padding();
        let cap = core.win_cap();

        while core.state.free_spins_remaining() {
            core.update_free_spin()?;
            self.draw_respin(core)?;
            self.restore_sticky(core)?;
            core.reveal()?;

            let new_prizes = self.collect_new_prizes(core);
            if !new_prizes.is_empty() {
                core.emit(EventKind::AddStickySymbols {
                    new_prizes: Self::prize_cells(&new_prizes, padding, cap),
                })?;
                core.state.free_spin_count = 0;
                core.emit(emit::update_free_spins(0, core.state.total_free_spins))?;
            }
        }

        let on_board: Vec<StickyPrize> = core
            .board()
            .cells()
            .filter_map(|(position, sym)| sym.prize().map(|prize| StickyPrize { position, prize }))
            .collect();
        let total: f64 = on_board.iter().map(|p| p.prize).sum();
        if total > 0.0 {
            core.wins.update_spin_win(total);
            core.wins.commit(core.state.game_type);
            core.emit(EventKind::PrizeWinInfo {
                total_win: to_cents(total.min(cap)),
                wins: Self::prize_cells(&on_board, padding, cap),
            })?;
            core.evaluate_wincap()?;
        }
        core.emit_spin_end()
    }
}

impl GameHooks for ExpandingWildsGame {
    fn name(&self) -> &'static str {
        "expanding_wilds"
    }

    fn register_initializers(&self, config: &GameConfig, factory: &mut SymbolFactory) -> SimResult<()> {
        factory.register_category(config, category::WILD, multiplier_from_conditions(true))?;
        factory.register_category(config, category::PRIZE, prize_from_conditions())
    }

    fn on_round_reset(&mut self, _core: &mut EngineCore) -> SimResult<()> {
        self.expanding.clear();
        self.landed.clear();
        self.sticky.clear();
        Ok(())
    }

    fn override_round(&mut self, core: &mut EngineCore) -> SimResult<bool> {
        if core.bet_mode() != SUPER_SPIN_MODE {
            return Ok(false);
        }
        self.run_super_spin(core)?;
        Ok(true)
    }

    fn on_free_spin_start(&mut self, core: &mut EngineCore) -> SimResult<()> {
        self.expanding.clear();
        self.available_reels = (0..core.config.num_reels).collect();
        Ok(())
    }

    fn after_draw(&mut self, core: &mut EngineCore) -> SimResult<()> {
        if core.state.game_type != GameType::FreeGame {
            return Ok(());
        }
        self.land_new_wilds(core)?;
        self.expand_existing(core)?;
        core.refresh_board()
    }

    fn after_reveal(&mut self, core: &mut EngineCore) -> SimResult<()> {
        if core.state.game_type != GameType::FreeGame {
            return Ok(());
        }
        if !self.expanding.is_empty() {
            core.emit(EventKind::UpdateExpandingWilds {
                existing_wilds: self.expanding.clone(),
            })?;
        }
        if !self.landed.is_empty() {
            let padding = core.padding();
            let new_wilds = self
                .landed
                .iter()
                .map(|w| ExpandingWild {
                    row: if padding { w.row + 1 } else { w.row },
                    ..*w
                })
                .collect();
            core.emit(EventKind::RevealExpandingWilds { new_wilds })?;
        }
        for wild in self.landed.drain(..) {
            self.expanding.push(ExpandingWild { row: 0, ..wild });
        }
        self.expanding.sort_by_key(|w| w.reel);
        Ok(())
    }

    fn rejects_round(&self, core: &EngineCore) -> bool {
        empty_outside_zero_criteria(core)
    }
}
