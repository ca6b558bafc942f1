//! Tumble (cascade) mechanics
//!
//! ```text
//!   before        remove         refill from strip (above the stop)
//!   pad  A         pad A          new pad  Y
//!   row0 B  ✕      ──►            row0     A   (old padding drops in)
//!   row1 C         C              row1     C
//!   row2 D  ✕      ──►            row2     ...
//! ```
//!
//! Exploded cells are removed and the reel shifts down; replacements are read
//! backwards along the strip from the current stop. With padding, the old top
//! padding symbol drops in first and a fresh padding symbol is read above it.

use rf_book::SymbolView;
use rf_core::{SimError, SimResult};

use crate::board::Board;
use crate::config::GameConfig;
use crate::symbols::{Symbol, SymbolContext, SymbolFactory};

/// Symbols that entered the board during one tumble
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TumbleOutcome {
    /// Per reel, top to bottom; includes the new padding symbol when present
    pub new_symbols: Vec<Vec<Symbol>>,
    /// Exploded cells per reel
    pub removed: Vec<usize>,
}

impl TumbleOutcome {
    pub fn is_empty(&self) -> bool {
        self.removed.iter().all(|n| *n == 0)
    }

    /// Client views of the new symbols
    pub fn views(&self) -> Vec<Vec<SymbolView>> {
        self.new_symbols
            .iter()
            .map(|reel| reel.iter().map(Symbol::to_view).collect())
            .collect()
    }
}

impl Board {
    /// Remove exploded cells and refill every reel from its strip
    ///
    /// A reel whose length differs from its configured row count afterwards
    /// is a bookkeeping bug and returns [`SimError::Tumble`].
    pub fn tumble(
        &mut self,
        config: &GameConfig,
        factory: &SymbolFactory,
        ctx: &mut SymbolContext<'_>,
    ) -> SimResult<TumbleOutcome> {
        let strips = config.reel_set(&self.reelstrip_id)?;
        let padding = self.has_padding();
        let num_reels = self.num_reels();
        let mut outcome = TumbleOutcome {
            new_symbols: vec![Vec::new(); num_reels],
            removed: vec![0; num_reels],
        };

        for reel in 0..num_reels {
            let strip = strips.get(reel).ok_or_else(|| {
                SimError::Tumble(format!("no strip for reel {reel} in '{}'", self.reelstrip_id))
            })?;
            let exploding = self.reels[reel].iter().filter(|s| s.is_exploding()).count();
            outcome.removed[reel] = exploding;
            if exploding == 0 {
                continue;
            }

            let mut dropped: Vec<Symbol> = Vec::with_capacity(exploding);
            let mut created: Vec<Symbol> = Vec::new();
            for i in 0..exploding {
                let stop = strip.wrap_back(self.reel_positions[reel], 1);
                self.reel_positions[reel] = stop;
                if i == 0 && padding {
                    dropped.push(self.top_symbols[reel].clone());
                } else {
                    let sym = factory.create(strip.symbol_at(stop), ctx)?;
                    created.push(sym.clone());
                    dropped.push(sym);
                }
            }
            // read upwards, so reverse into top-to-bottom order
            dropped.reverse();
            created.reverse();

            let survivors = self.reels[reel].drain(..).filter(|s| !s.is_exploding());
            let column: Vec<Symbol> = dropped.into_iter().chain(survivors).collect();
            let expected = config.rows(reel);
            if column.len() != expected {
                return Err(SimError::Tumble(format!(
                    "reel {reel} has {} symbols after tumble, expected {expected}",
                    column.len()
                )));
            }
            self.reels[reel] = column;

            if padding {
                let above = strip.wrap_back(self.reel_positions[reel], 1);
                let pad = factory.create(strip.symbol_at(above), ctx)?;
                created.insert(0, pad.clone());
                self.top_symbols[reel] = pad;
            }
            outcome.new_symbols[reel] = created;
        }

        self.refresh_special_positions(config.special_symbols.keys());
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardGenerator;
    use crate::presets;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rf_core::GameType;

    #[test]
    fn test_tumble_refills_from_strip() {
        let config = presets::lines_5x3();
        let factory = SymbolFactory::from_config(&config);
        let generator = BoardGenerator::new(&config, &factory);
        let conditions = config.bet_modes[0].distributions[0].conditions.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut ctx = SymbolContext {
            rng: &mut rng,
            conditions: &conditions,
            game_type: GameType::BaseGame,
        };
        let mut board = generator.from_stops(&mut ctx, "BR0", &[5, 5, 5, 5, 5]).unwrap();
        let strip = config.reel_set("BR0").unwrap()[1].clone();
        let old_top = board.top_symbols[1].name().to_string();
        let kept = board.reels[1][2].name().to_string();

        board.reels[1][0].mark_explode();
        board.reels[1][1].mark_explode();
        let outcome = board.tumble(&config, &factory, &mut ctx).unwrap();

        assert_eq!(outcome.removed, vec![0, 2, 0, 0, 0]);
        assert_eq!(board.reel_positions[1], 3);
        // one fresh symbol plus the new padding
        assert_eq!(outcome.new_symbols[1].len(), 2);
        assert!(outcome.new_symbols[0].is_empty());

        let names: Vec<&str> = board.reels[1].iter().map(|s| s.name()).collect();
        assert_eq!(names, vec![strip.symbol_at(3), old_top.as_str(), kept.as_str()]);
        assert_eq!(board.top_symbols[1].name(), strip.symbol_at(2));
        assert!(board.reels.iter().flatten().all(|s| !s.is_exploding()));
    }

    #[test]
    fn test_tumble_keeps_row_counts() {
        let config = presets::cluster_7x7();
        let factory = SymbolFactory::from_config(&config);
        let generator = BoardGenerator::new(&config, &factory);
        let conditions = config.bet_modes[0].distributions[0].conditions.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut ctx = SymbolContext {
            rng: &mut rng,
            conditions: &conditions,
            game_type: GameType::BaseGame,
        };
        for _ in 0..25 {
            let mut board = generator.random(&mut ctx).unwrap();
            for reel in 0..board.num_reels() {
                for row in (0..board.rows(reel)).step_by(2) {
                    board.reels[reel][row].mark_explode();
                }
            }
            board.tumble(&config, &factory, &mut ctx).unwrap();
            for reel in 0..board.num_reels() {
                assert_eq!(board.rows(reel), config.rows(reel));
            }
        }
    }

    #[test]
    fn test_tumble_without_padding() {
        let mut config = presets::lines_5x3();
        config.include_padding = false;
        let factory = SymbolFactory::from_config(&config);
        let generator = BoardGenerator::new(&config, &factory);
        let conditions = config.bet_modes[0].distributions[0].conditions.clone();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut ctx = SymbolContext {
            rng: &mut rng,
            conditions: &conditions,
            game_type: GameType::BaseGame,
        };
        let mut board = generator.from_stops(&mut ctx, "BR0", &[0, 0, 0, 0, 0]).unwrap();
        let strip = config.reel_set("BR0").unwrap()[0].clone();
        board.reels[0][2].mark_explode();
        let outcome = board.tumble(&config, &factory, &mut ctx).unwrap();
        assert_eq!(outcome.new_symbols[0].len(), 1);
        assert_eq!(board.reels[0][0].name(), strip.symbol_at(strip.len() - 1));
        assert_eq!(board.reel_positions[0], strip.len() - 1);
    }
}
