//! Fixed-payline evaluation
//!
//! Each payline is walked left to right. A leading wild run is scored on its
//! own against the wild's paytable entry, and the full run (wilds plus the
//! first non-wild and everything matching it) is scored against that
//! symbol's entry. The better of the two pays; a tie goes to the longer run.

use rf_core::Position;

use super::{EvalContext, MultiplierStrategy, PayoutStrategy, WinMeta, WinRecord, WinResult};
use crate::board::Board;
use crate::config::WinType;
use crate::paytable::Payline;

/// Payline evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct LinesEvaluator {
    pub multiplier_strategy: MultiplierStrategy,
}

impl LinesEvaluator {
    pub fn new(multiplier_strategy: MultiplierStrategy) -> Self {
        Self { multiplier_strategy }
    }

    fn evaluate_line(&self, board: &Board, line: &Payline, ctx: &EvalContext<'_>) -> Option<WinRecord> {
        let cell = |reel: usize| board.get(Position::new(reel, *line.rows.get(reel)?));

        let first = cell(0)?;
        let mut wild_matches = 0u32;
        let mut matches = 0u32;
        let mut first_non_wild = None;

        if first.is_wild() {
            wild_matches = 1;
        } else {
            first_non_wild = Some(first);
            matches = 1;
        }

        for reel in 1..line.rows.len() {
            let Some(sym) = cell(reel) else { break };
            match first_non_wild {
                Some(anchor) => {
                    if sym.name() == anchor.name() || sym.is_wild() {
                        matches += 1;
                    } else {
                        break;
                    }
                }
                None if sym.is_wild() => wild_matches += 1,
                None => {
                    first_non_wild = Some(sym);
                    matches += 1;
                }
            }
        }

        let paytable = &ctx.config.paytable;
        let wild_win = if wild_matches > 0 {
            paytable.pay_or_zero(wild_matches, first.name())
        } else {
            0.0
        };
        let base_win = first_non_wild
            .map(|s| paytable.pay_or_zero(wild_matches + matches, s.name()))
            .unwrap_or(0.0);

        if base_win <= 0.0 && wild_win <= 0.0 {
            return None;
        }

        let (symbol, kind, pay) = match first_non_wild {
            Some(anchor) if base_win >= wild_win => (anchor.name(), wild_matches + matches, base_win),
            _ => (first.name(), wild_matches, wild_win),
        };

        let positions: Vec<Position> = (0..kind as usize)
            .map(|reel| Position::new(reel, line.rows[reel]))
            .collect();
        let applied = self
            .multiplier_strategy
            .apply(board, &positions, ctx.global_multiplier);

        Some(WinRecord {
            symbol: symbol.to_string(),
            kind,
            win: pay * applied,
            positions,
            meta: WinMeta {
                global_multiplier: ctx.global_multiplier,
                multiplier: applied,
                win_without_mult: pay,
                line_index: Some(line.index),
                line_multiplier: Some((applied / ctx.global_multiplier).trunc()),
                ..Default::default()
            },
        })
    }
}

impl PayoutStrategy for LinesEvaluator {
    fn win_type(&self) -> WinType {
        WinType::Lines
    }

    fn evaluate(&self, board: &mut Board, ctx: &EvalContext<'_>) -> WinResult {
        let mut result = WinResult::new();
        for line in &ctx.config.paylines {
            if let Some(record) = self.evaluate_line(board, line, ctx) {
                result.push(record);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluate::test_support::board_from_names;
    use crate::paytable::{PayTable, Payline};
    use crate::presets;
    use approx::assert_relative_eq;

    fn straight_lines_config() -> crate::config::GameConfig {
        let mut config = presets::lines_5x3();
        config.paytable = PayTable::new()
            .with(5, "H1", 70.0)
            .with(5, "W", 100.0)
            .with(3, "H1", 5.0)
            .with(3, "W", 2.0);
        config.paylines = (0..3).map(|row| Payline::straight(row as u32 + 1, row, 5)).collect();
        config
    }

    #[test]
    fn test_wild_row_pays_wild_and_h1_rows_pay_h1() {
        let config = straight_lines_config();
        let reel: &[&str] = &["W", "H1", "H1"];
        let mut board = board_from_names(&config, &[reel, reel, reel, reel, reel]);
        let result = LinesEvaluator::default().evaluate(&mut board, &EvalContext::new(&config));

        let h1: Vec<_> = result.wins.iter().filter(|w| w.symbol == "H1").collect();
        assert_eq!(h1.len(), 2);
        assert_relative_eq!(h1.iter().map(|w| w.win).sum::<f64>(), 70.0 * 2.0);

        let wild: Vec<_> = result.wins.iter().filter(|w| w.symbol == "W").collect();
        assert_eq!(wild.len(), 1);
        assert_relative_eq!(wild[0].win, 100.0);
        assert_relative_eq!(result.total_win, 240.0);
    }

    #[test]
    fn test_leading_wilds_substitute_without_double_counting() {
        let config = straight_lines_config();
        let mut board = board_from_names(
            &config,
            &[
                &["W", "L1", "L1"],
                &["W", "L1", "L1"],
                &["H1", "L1", "L1"],
                &["H1", "L1", "L1"],
                &["H1", "L1", "L1"],
            ],
        );
        let result = LinesEvaluator::default().evaluate(&mut board, &EvalContext::new(&config));
        assert_eq!(result.wins.len(), 1);
        let win = &result.wins[0];
        assert_eq!(win.symbol, "H1");
        assert_eq!(win.kind, 5);
        assert_eq!(win.positions.len(), 5);
        assert_relative_eq!(result.total_win, 70.0);
    }

    #[test]
    fn test_wild_run_beats_short_symbol_run() {
        let config = straight_lines_config();
        let mut board = board_from_names(
            &config,
            &[
                &["W", "L1", "L1"],
                &["W", "L1", "L1"],
                &["W", "L1", "L1"],
                &["H1", "L1", "L1"],
                &["L1", "L1", "L1"],
            ],
        );
        // wild 3 pays 2.0, H1 4 is not configured
        let result = LinesEvaluator::default().evaluate(&mut board, &EvalContext::new(&config));
        assert_eq!(result.wins.len(), 1);
        assert_eq!(result.wins[0].symbol, "W");
        assert_eq!(result.wins[0].kind, 3);
    }

    #[test]
    fn test_tie_favours_longer_run() {
        let mut config = straight_lines_config();
        config.paytable.insert(4, "H1", 2.0);
        let mut board = board_from_names(
            &config,
            &[
                &["W", "L1", "L1"],
                &["W", "L1", "L1"],
                &["W", "L1", "L1"],
                &["H1", "L1", "L1"],
                &["L1", "L1", "L1"],
            ],
        );
        let result = LinesEvaluator::default().evaluate(&mut board, &EvalContext::new(&config));
        assert_eq!(result.wins[0].symbol, "H1");
        assert_eq!(result.wins[0].kind, 4);
    }

    #[test]
    fn test_line_multiplier_meta() {
        let config = straight_lines_config();
        let reel: &[&str] = &["H1", "L1", "L1"];
        let mut board = board_from_names(&config, &[reel, reel, reel, &["W", "L1", "L1"], reel]);
        board.reels[3][0].set_multiplier(3);

        let ctx = EvalContext::new(&config).with_global_multiplier(2.0);
        let result = LinesEvaluator::default().evaluate(&mut board, &ctx);
        let meta = &result.wins[0].meta;
        assert_relative_eq!(meta.multiplier, 6.0);
        assert_eq!(meta.line_multiplier, Some(3.0));
        assert_eq!(meta.line_index, Some(1));
        assert_relative_eq!(result.total_win, 70.0 * 6.0);

        let global_only = LinesEvaluator::new(MultiplierStrategy::Global).evaluate(&mut board, &ctx);
        assert_relative_eq!(global_only.total_win, 140.0);
    }

    #[test]
    fn test_unpaid_line_contributes_nothing() {
        let config = straight_lines_config();
        let reel: &[&str] = &["L1", "L1", "L1"];
        let mut board = board_from_names(&config, &[reel, reel, reel, reel, reel]);
        let result = LinesEvaluator::default().evaluate(&mut board, &EvalContext::new(&config));
        assert!(result.is_empty());
        assert_eq!(result.total_win, 0.0);
    }
}
