//! Event builders
//!
//! Turn engine state into client events. Amounts go out as capped integer
//! cents and positions are shifted one row down when the board carries
//! padding, so the client can index straight into the revealed columns.

use rf_book::{EventKind, WinDetail, WinLevels};
use rf_core::{GameType, Position, SimResult, capped_cents, to_cents};

use crate::board::Board;
use crate::evaluate::WinResult;
use crate::tumble::TumbleOutcome;

pub fn reveal(board: &Board, game_type: GameType) -> EventKind {
    EventKind::Reveal {
        board: board.to_view(),
        game_type: game_type.client_name().to_string(),
        anticipation: board.anticipation.clone(),
        padding_positions: board.has_padding().then(|| board.reel_positions.clone()),
    }
}

fn padded_all(positions: &[Position], padding: bool) -> Vec<Position> {
    positions.iter().map(|p| p.padded(padding)).collect()
}

/// One detail per scoring unit
pub fn win_details(result: &WinResult, win_cap: f64, padding: bool) -> Vec<WinDetail> {
    result
        .wins
        .iter()
        .map(|w| WinDetail {
            symbol: w.symbol.clone(),
            count: w.kind,
            amount: capped_cents(w.win, win_cap),
            positions: padded_all(&w.positions, padding),
            base_amount: capped_cents(w.meta.win_without_mult, win_cap),
            multiplier: w.meta.global_multiplier,
            line_index: w.meta.line_index,
            ways: w.meta.ways,
            cluster_multiplier: w.meta.cluster_multiplier,
            overlay: w.meta.overlay.map(|p| p.padded(padding)),
        })
        .collect()
}

/// Win details of one evaluation plus the round total so far
pub fn win(result: &WinResult, running_win: f64, win_cap: f64, padding: bool) -> EventKind {
    EventKind::Win {
        amount: capped_cents(result.total_win, win_cap),
        total_amount: capped_cents(running_win, win_cap),
        details: win_details(result, win_cap, padding),
    }
}

pub fn set_win(spin_win: f64, levels: &WinLevels, win_cap: f64) -> SimResult<EventKind> {
    let capped = spin_win.min(win_cap);
    Ok(EventKind::SetWin {
        amount: to_cents(capped),
        win_level: levels.level(rf_book::STANDARD, capped)?,
    })
}

pub fn set_total_win(running_win: f64, win_cap: f64) -> EventKind {
    EventKind::SetTotalWin {
        amount: capped_cents(running_win, win_cap),
    }
}

pub fn win_cap(running_win: f64, win_cap: f64) -> EventKind {
    EventKind::WinCap {
        amount: capped_cents(running_win, win_cap),
    }
}

/// Final payout, already capped and rounded by settlement
pub fn set_final_win(final_win: f64) -> EventKind {
    EventKind::SetFinalWin {
        amount: to_cents(final_win),
    }
}

pub fn update_tumble_win(spin_win: f64, win_cap: f64) -> EventKind {
    EventKind::UpdateTumbleWin {
        amount: capped_cents(spin_win, win_cap),
    }
}

/// Total paid by a finished tumble sequence
pub fn set_tumble_win(tumble_win: f64, win_cap: f64) -> EventKind {
    EventKind::SetTumbleWin {
        amount: capped_cents(tumble_win, win_cap),
    }
}

/// Removed cells (deduplicated, reel-major) and their replacements
pub fn tumble(outcome: &TumbleOutcome, exploded: impl IntoIterator<Item = Position>, padding: bool) -> EventKind {
    let mut exploding_symbols: Vec<Position> = exploded.into_iter().map(|p| p.padded(padding)).collect();
    exploding_symbols.sort();
    exploding_symbols.dedup();
    EventKind::Tumble {
        new_symbols: outcome.views(),
        exploding_symbols,
    }
}

/// `triggerFreeSpins` from the base game, `retriggerFreeSpins` inside free spins
pub fn free_spin_trigger(game_type: GameType, total: u32, scatters: &[Position], padding: bool) -> EventKind {
    let positions = padded_all(scatters, padding);
    match game_type {
        GameType::BaseGame => EventKind::TriggerFreeSpins { total, positions },
        GameType::FreeGame => EventKind::RetriggerFreeSpins { total, positions },
    }
}

pub fn update_free_spins(count: u32, total: u32) -> EventKind {
    EventKind::UpdateFreeSpins { amount: count, total }
}

pub fn end_free_spins(free_game_wins: f64, levels: &WinLevels, win_cap: f64) -> SimResult<EventKind> {
    let capped = free_game_wins.min(win_cap);
    Ok(EventKind::EndFreeSpins {
        amount: to_cents(capped),
        win_level: levels.level(rf_book::END_FEATURE, capped)?,
    })
}
