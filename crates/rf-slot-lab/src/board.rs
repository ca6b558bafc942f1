//! Board and board generation
//!
//! ```text
//!   reel strip (circular)          visible window (rows = 3)
//!   ┌───┐
//!   │ A │  ← stop - 1   ────────►  top padding
//!   │ B │  ← stop       ────────►  row 0
//!   │ C │               ────────►  row 1
//!   │ D │               ────────►  row 2
//!   │ E │  ← stop + 3   ────────►  bottom padding
//!   └───┘
//! ```
//!
//! A board is drawn either freely (uniform stop per reel) or forced to show
//! exactly N symbols of a target type. Forced draws are rejection sampled:
//! when a reel happens to show the target twice, the whole draw is retried.

use std::collections::BTreeMap;

use rand::Rng;
use rf_book::SymbolView;
use rf_core::{GameType, Position, SimError, SimResult};

use crate::config::{GameConfig, category};
use crate::distribution::weighted_index;
use crate::symbols::{ReelStrip, Symbol, SymbolContext, SymbolFactory};

/// A drawn board plus the strip state needed to tumble it
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    /// Reel-major cells: `reels[reel][row]`
    pub reels: Vec<Vec<Symbol>>,
    /// One symbol above each reel's window (empty without padding)
    pub top_symbols: Vec<Symbol>,
    /// One symbol below each reel's window (empty without padding)
    pub bottom_symbols: Vec<Symbol>,
    /// Strip index of each reel's row 0
    pub reel_positions: Vec<usize>,
    /// Strip set this board was drawn from
    pub reelstrip_id: String,
    pub anticipation: Vec<u32>,
    special_positions: BTreeMap<String, Vec<Position>>,
}

impl Board {
    /// Board from explicit cells, with no strip or padding state
    pub fn from_reels(reels: Vec<Vec<Symbol>>) -> Self {
        let num_reels = reels.len();
        Self {
            reels,
            top_symbols: Vec::new(),
            bottom_symbols: Vec::new(),
            reel_positions: vec![0; num_reels],
            reelstrip_id: String::new(),
            anticipation: vec![0; num_reels],
            special_positions: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn num_reels(&self) -> usize {
        self.reels.len()
    }

    #[inline]
    pub fn rows(&self, reel: usize) -> usize {
        self.reels.get(reel).map_or(0, |r| r.len())
    }

    #[inline]
    pub fn get(&self, pos: Position) -> Option<&Symbol> {
        self.reels.get(pos.reel)?.get(pos.row)
    }

    #[inline]
    pub fn get_mut(&mut self, pos: Position) -> Option<&mut Symbol> {
        self.reels.get_mut(pos.reel)?.get_mut(pos.row)
    }

    /// Replace a cell
    pub fn set(&mut self, pos: Position, symbol: Symbol) -> SimResult<()> {
        let cell = self.get_mut(pos).ok_or_else(|| {
            SimError::BoardGeneration(format!("position {pos:?} is off the board"))
        })?;
        *cell = symbol;
        Ok(())
    }

    pub fn has_padding(&self) -> bool {
        !self.top_symbols.is_empty()
    }

    /// Every position, reel-major
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.reels
            .iter()
            .enumerate()
            .flat_map(|(reel, cells)| (0..cells.len()).map(move |row| Position::new(reel, row)))
    }

    pub fn cells(&self) -> impl Iterator<Item = (Position, &Symbol)> {
        self.reels.iter().enumerate().flat_map(|(reel, cells)| {
            cells
                .iter()
                .enumerate()
                .map(move |(row, s)| (Position::new(reel, row), s))
        })
    }

    /// Rescan the board for special categories, reel-major
    pub fn refresh_special_positions<'c>(&mut self, categories: impl IntoIterator<Item = &'c String>) {
        self.special_positions.clear();
        for cat in categories {
            let found: Vec<Position> = self
                .cells()
                .filter(|(_, s)| s.has_category(cat))
                .map(|(p, _)| p)
                .collect();
            self.special_positions.insert(cat.clone(), found);
        }
    }

    /// Positions of a special category as of the last refresh
    pub fn special_positions(&self, category: &str) -> &[Position] {
        self.special_positions
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn count_special(&self, category: &str) -> usize {
        self.special_positions(category).len()
    }

    pub fn count_symbol(&self, name: &str) -> usize {
        self.cells().filter(|(_, s)| s.name() == name).count()
    }

    /// Names only, reel-major
    pub fn names(&self) -> Vec<Vec<&str>> {
        self.reels
            .iter()
            .map(|reel| reel.iter().map(|s| s.name()).collect())
            .collect()
    }

    /// Client view, with padding rows when present
    pub fn to_view(&self) -> Vec<Vec<SymbolView>> {
        self.reels
            .iter()
            .enumerate()
            .map(|(reel, cells)| {
                let mut column = Vec::with_capacity(cells.len() + 2);
                if let Some(top) = self.top_symbols.get(reel) {
                    column.push(top.to_view());
                }
                column.extend(cells.iter().map(Symbol::to_view));
                if let Some(bottom) = self.bottom_symbols.get(reel) {
                    column.push(bottom.to_view());
                }
                column
            })
            .collect()
    }

    /// Clear every explode flag
    pub fn clear_explode(&mut self) {
        for cell in self.reels.iter_mut().flatten() {
            cell.remove_attribute(&crate::symbols::AttributeKey::Explode);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// GENERATOR
// ═══════════════════════════════════════════════════════════════════════════

/// Draws boards from the configured reel strips
pub struct BoardGenerator<'a> {
    config: &'a GameConfig,
    factory: &'a SymbolFactory,
}

impl<'a> BoardGenerator<'a> {
    pub fn new(config: &'a GameConfig, factory: &'a SymbolFactory) -> Self {
        Self { config, factory }
    }

    /// Unconstrained draw: weighted strip choice, uniform stop per reel
    pub fn random(&self, ctx: &mut SymbolContext<'_>) -> SimResult<Board> {
        let strip_id = ctx.conditions.reel_weights(ctx.game_type)?.draw(&mut *ctx.rng)?;
        let strips = self.config.reel_set(&strip_id)?;
        Self::check_strips(&strip_id, strips)?;
        let stops: Vec<usize> = strips
            .iter()
            .map(|strip| ctx.rng.random_range(0..strip.len()))
            .collect();
        self.from_stops(ctx, &strip_id, &stops)
    }

    /// Materialize a board from explicit stop positions
    pub fn from_stops(
        &self,
        ctx: &mut SymbolContext<'_>,
        strip_id: &str,
        stops: &[usize],
    ) -> SimResult<Board> {
        let strips = self.config.reel_set(strip_id)?;
        Self::check_strips(strip_id, strips)?;
        if strips.len() != self.config.num_reels || stops.len() != self.config.num_reels {
            return Err(SimError::BoardGeneration(format!(
                "strip set '{strip_id}' has {} reels and {} stops for a {}-reel board",
                strips.len(),
                stops.len(),
                self.config.num_reels
            )));
        }
        let padding = self.config.include_padding;
        let mut reels = Vec::with_capacity(strips.len());
        let mut top_symbols = Vec::new();
        let mut bottom_symbols = Vec::new();
        let mut reel_positions = Vec::with_capacity(strips.len());

        for (reel, (strip, stop)) in strips.iter().zip(stops).enumerate() {
            let stop = stop % strip.len();
            let rows = self.config.rows(reel);
            if padding {
                top_symbols.push(self.factory.create(strip.symbol_at(strip.wrap_back(stop, 1)), ctx)?);
                bottom_symbols.push(self.factory.create(strip.symbol_at(stop + rows), ctx)?);
            }
            let mut cells = Vec::with_capacity(rows);
            for row in 0..rows {
                cells.push(self.factory.create(strip.symbol_at(stop + row), ctx)?);
            }
            reels.push(cells);
            reel_positions.push(stop);
        }

        let mut board = Board {
            reels,
            top_symbols,
            bottom_symbols,
            reel_positions,
            reelstrip_id: strip_id.to_string(),
            anticipation: Vec::new(),
            special_positions: BTreeMap::new(),
        };
        board.refresh_special_positions(self.config.special_symbols.keys());
        board.anticipation = self.anticipation(&board, ctx.game_type)?;
        Ok(board)
    }

    /// Draw a board showing exactly `count` symbols matching `target`
    ///
    /// `target` is a special category name ("scatter") or a symbol name.
    pub fn forced(&self, ctx: &mut SymbolContext<'_>, target: &str, count: usize) -> SimResult<Board> {
        let weights = ctx.conditions.reel_weights(ctx.game_type)?;
        let feasible = weights
            .iter()
            .filter(|(_, w)| *w > 0.0)
            .map(|(id, _)| id)
            .filter_map(|id| self.config.reels.get(id))
            .map(|strips| {
                strips
                    .iter()
                    .filter(|s| !self.target_stops(s, target).is_empty())
                    .count()
            })
            .max()
            .unwrap_or(0);
        if feasible < count {
            return Err(SimError::GameConfig(format!(
                "no reel strip for {} can show {count} '{target}' symbols",
                ctx.game_type
            )));
        }

        loop {
            let strip_id = weights.draw(&mut *ctx.rng)?;
            let strips = self.config.reel_set(&strip_id)?;
            Self::check_strips(&strip_id, strips)?;
            let candidates: Vec<Vec<usize>> =
                strips.iter().map(|s| self.target_stops(s, target)).collect();
            let mut reel_weights: Vec<f64> = candidates
                .iter()
                .zip(strips)
                .map(|(c, s)| c.len() as f64 / s.len() as f64)
                .collect();

            let mut forced: BTreeMap<usize, usize> = BTreeMap::new();
            while forced.len() < count {
                let Some(reel) = weighted_index(&reel_weights, &mut *ctx.rng) else {
                    break;
                };
                let stop = candidates[reel][ctx.rng.random_range(0..candidates[reel].len())];
                reel_weights[reel] = 0.0;
                forced.insert(reel, stop);
            }
            if forced.len() < count {
                continue;
            }

            let mut stops = vec![0usize; strips.len()];
            for (reel, target_stop) in &forced {
                let offset = ctx.rng.random_range(0..self.config.rows(*reel).max(1));
                stops[*reel] = strips[*reel].wrap_back(*target_stop, offset);
            }
            for (reel, strip) in strips.iter().enumerate() {
                if !forced.contains_key(&reel) {
                    stops[reel] = ctx.rng.random_range(0..strip.len());
                }
            }

            let board = self.from_stops(ctx, &strip_id, &stops)?;
            if self.count_target(&board, target) == count {
                return Ok(board);
            }
        }
    }

    /// Every reel of a strip set needs at least one stop to draw from
    fn check_strips(strip_id: &str, strips: &[ReelStrip]) -> SimResult<()> {
        match strips.iter().position(ReelStrip::is_empty) {
            Some(reel) => Err(SimError::BoardGeneration(format!(
                "strip set '{strip_id}' reel {reel} is empty"
            ))),
            None => Ok(()),
        }
    }

    /// Strip indices holding a symbol that matches `target`
    pub fn target_stops(&self, strip: &ReelStrip, target: &str) -> Vec<usize> {
        if self.config.special_symbols.contains_key(target) {
            strip.positions_where(|name| self.config.is_special(name, target))
        } else {
            strip.positions_where(|name| name == target)
        }
    }

    fn count_target(&self, board: &Board, target: &str) -> usize {
        if self.config.special_symbols.contains_key(target) {
            board.count_special(target)
        } else {
            board.count_symbol(target)
        }
    }

    /// Per-reel suspense counters for a potential scatter trigger
    ///
    /// Once the running scatter count reaches the game type's anticipation
    /// threshold on reel `k`, reels after `k` count up 1, 2, 3, ...
    pub fn anticipation(&self, board: &Board, game_type: GameType) -> SimResult<Vec<u32>> {
        let num_reels = board.num_reels();
        let mut anticipation = vec![0u32; num_reels];
        let Some(threshold) = self.config.anticipation_trigger(game_type) else {
            return Ok(anticipation);
        };

        let mut seen = 0u32;
        let mut first_reel = None;
        for pos in board.special_positions(category::SCATTER) {
            seen += 1;
            if seen >= threshold {
                first_reel = Some(pos.reel + 1);
                break;
            }
        }

        if let Some(first) = first_reel.filter(|f| *f < num_reels) {
            for (count, reel) in (first..num_reels).enumerate() {
                anticipation[reel] = count as u32 + 1;
            }
        }

        if let Some(r) = (1..num_reels).find(|r| anticipation[r - 1] > anticipation[*r]) {
            return Err(SimError::BoardGeneration(format!(
                "anticipation must be non-decreasing: reel {} = {} > reel {r} = {} in {anticipation:?}",
                r - 1,
                anticipation[r - 1],
                anticipation[r]
            )));
        }
        Ok(anticipation)
    }
}
