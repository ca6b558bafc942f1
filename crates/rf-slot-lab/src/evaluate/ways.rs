//! Ways evaluation
//!
//! Every distinct name on reel 0 seeds a candidate. The candidate extends one
//! reel at a time while the next reel shows that name or a wild. Per reel the
//! way count grows by `matches + wilds + enhancement`, so symbol multipliers
//! compound across reels instead of summing like they do on a payline.

use rf_core::Position;

use super::{EvalContext, PayoutStrategy, WinMeta, WinRecord, WinResult};
use crate::board::Board;
use crate::config::{WinType, category};

/// All-ways evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct WaysEvaluator;

impl WaysEvaluator {
    fn seeds(board: &Board) -> Vec<String> {
        let mut seeds: Vec<String> = Vec::new();
        for sym in board.reels.first().into_iter().flatten() {
            if !seeds.iter().any(|s| s == sym.name()) {
                seeds.push(sym.name().to_string());
            }
        }
        seeds
    }

    fn evaluate_seed(board: &Board, seed: &str, wilds: &[Vec<Position>], ctx: &EvalContext<'_>) -> Option<WinRecord> {
        let seed_is_wild = ctx.config.is_special(seed, category::WILD);
        let mut kind = 0u32;
        let mut ways = 1u64;
        let mut symbol_multiplier = 0.0;
        let mut positions = Vec::new();

        for (reel, cells) in board.reels.iter().enumerate() {
            // a wild seed is already covered by the wild positions
            let matches: Vec<Position> = if seed_is_wild {
                Vec::new()
            } else {
                cells
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.name() == seed && !s.is_wild())
                    .map(|(row, _)| Position::new(reel, row))
                    .collect()
            };
            let reel_wilds = &wilds[reel];
            if matches.is_empty() && reel_wilds.is_empty() {
                break;
            }

            let enhance: f64 = matches
                .iter()
                .chain(reel_wilds)
                .filter_map(|p| board.get(*p))
                .filter_map(|s| s.enhancing_multiplier())
                .sum();

            kind += 1;
            ways *= (matches.len() + reel_wilds.len()) as u64 + enhance as u64;
            symbol_multiplier += enhance;
            positions.extend(matches);
            positions.extend(reel_wilds.iter().copied());
        }

        let pay = ctx.config.paytable.get(kind, seed)?;
        let base = pay * ways as f64;
        Some(WinRecord {
            symbol: seed.to_string(),
            kind,
            win: base * ctx.global_multiplier,
            positions,
            meta: WinMeta {
                global_multiplier: ctx.global_multiplier,
                multiplier: ctx.global_multiplier,
                win_without_mult: base,
                ways: Some(ways),
                symbol_multiplier: Some(symbol_multiplier),
                ..Default::default()
            },
        })
    }
}

impl PayoutStrategy for WaysEvaluator {
    fn win_type(&self) -> WinType {
        WinType::Ways
    }

    fn evaluate(&self, board: &mut Board, ctx: &EvalContext<'_>) -> WinResult {
        let wilds: Vec<Vec<Position>> = board
            .reels
            .iter()
            .enumerate()
            .map(|(reel, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.is_wild())
                    .map(|(row, _)| Position::new(reel, row))
                    .collect()
            })
            .collect();

        let mut result = WinResult::new();
        for seed in Self::seeds(board) {
            if let Some(record) = Self::evaluate_seed(board, &seed, &wilds, ctx) {
                result.push(record);
            }
        }
        result
    }
}
