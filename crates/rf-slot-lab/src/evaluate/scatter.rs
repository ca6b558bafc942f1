//! Pay-anywhere evaluation
//!
//! Each non-wild name is counted anywhere on the board, and every wild counts
//! towards every name. Paying groups are flagged to explode.

use rf_core::Position;

use super::{EvalContext, PayoutStrategy, WinMeta, WinRecord, WinResult};
use crate::board::Board;
use crate::config::WinType;

/// Scatter-pays evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct ScatterEvaluator;

impl ScatterEvaluator {
    /// Non-wild names in first-seen order, each with its cells plus every wild
    pub fn groups(board: &Board) -> Vec<(String, Vec<Position>)> {
        let mut groups: Vec<(String, Vec<Position>)> = Vec::new();
        let mut wilds = Vec::new();
        for (pos, sym) in board.cells() {
            if sym.is_wild() {
                wilds.push(pos);
                continue;
            }
            match groups.iter_mut().find(|(name, _)| name == sym.name()) {
                Some((_, cells)) => cells.push(pos),
                None => groups.push((sym.name().to_string(), vec![pos])),
            }
        }
        for (_, cells) in &mut groups {
            cells.extend(wilds.iter().copied());
        }
        groups
    }

    /// Cell closest to the board centre whose row has no overlay yet
    pub fn overlay_position(used_rows: &[usize], positions: &[Position], reels: usize, rows: usize) -> Position {
        let mid_reel = reels as f64 / 2.0;
        let mid_row = rows as f64 / 2.0;
        let mut closest = f64::MAX;
        let mut overlay = Position::new(0, 0);
        if used_rows.len() >= reels {
            return overlay;
        }
        for pos in positions {
            let dist = (pos.reel as f64 - mid_reel).powi(2) + (pos.row as f64 - mid_row).powi(2);
            if dist < closest && !used_rows.contains(&pos.row) {
                closest = dist;
                overlay = *pos;
            }
        }
        overlay
    }
}

impl PayoutStrategy for ScatterEvaluator {
    fn win_type(&self) -> WinType {
        WinType::Scatter
    }

    fn evaluate(&self, board: &mut Board, ctx: &EvalContext<'_>) -> WinResult {
        let mut result = WinResult::new();
        let mut used_rows = Vec::new();
        let reels = board.num_reels();
        let rows = board.rows(0);

        for (symbol, positions) in Self::groups(board) {
            let count = positions.len() as u32;
            let Some(pay) = ctx.config.paytable.get(count, &symbol) else {
                continue;
            };

            let mut symbol_mult = 0.0;
            for pos in &positions {
                if let Some(cell) = board.get_mut(*pos) {
                    symbol_mult += cell.multiplier().unwrap_or(0.0);
                    cell.mark_explode();
                }
            }
            let symbol_mult = f64::max(symbol_mult, 1.0);

            let overlay = Self::overlay_position(&used_rows, &positions, reels, rows);
            used_rows.push(overlay.row);

            result.push(WinRecord {
                symbol,
                kind: count,
                win: pay * ctx.global_multiplier * symbol_mult,
                positions,
                meta: WinMeta {
                    global_multiplier: ctx.global_multiplier,
                    multiplier: ctx.global_multiplier * symbol_mult,
                    win_without_mult: pay,
                    symbol_multiplier: Some(symbol_mult),
                    overlay: Some(overlay),
                    ..Default::default()
                },
            });
        }
        result
    }
}
