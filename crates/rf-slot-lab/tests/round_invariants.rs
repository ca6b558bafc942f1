//! Round-level invariants across every preset
//!
//! - Settlement: payout equals capped base + free, never above the cap
//! - Books: contiguous indices, reveal first, setFinalWin last
//! - Determinism: a simulation's book depends only on its index
//! - Criteria: "0" pays nothing, forced free games show the forced scatters
//! - Board shape survives tumbles, anticipation only counts up
//! - A capped round stops paying: nothing wins or advances after `winCap`
//! - Standard game switches: required win, free game wild multipliers

use std::sync::Arc;

use rf_book::{Book, EventKind};
use rf_core::{GameType, capped_cents, to_cents};
use rf_slot_lab::{GameConfig, GameEngine, WeightTable, presets};

// ═══════════════════════════════════════════════════════════════════════════════
// TEST FIXTURES
// ═══════════════════════════════════════════════════════════════════════════════

const SIMS: u64 = 12;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn engine(config: GameConfig, mode: &str) -> GameEngine {
    GameEngine::new(Arc::new(config), mode).unwrap()
}

fn run(config: GameConfig, mode: &str, criteria: &str, sims: u64) -> Vec<Book> {
    let mut engine = engine(config, mode);
    (0..sims)
        .map(|sim| engine.run_round(sim, criteria).unwrap().book)
        .collect()
}

/// Every (bet mode, criteria) pair of a config
fn pairs(config: &GameConfig) -> Vec<(String, String)> {
    config
        .bet_modes
        .iter()
        .flat_map(|mode| mode.criteria().map(|c| (mode.name.clone(), c.to_string())))
        .collect()
}

/// Visible names of a reveal board, padding stripped
fn visible(board: &[Vec<rf_book::SymbolView>], padding: bool) -> Vec<Vec<&str>> {
    board
        .iter()
        .map(|reel| {
            let rows = if padding { &reel[1..reel.len() - 1] } else { &reel[..] };
            rows.iter().map(|s| s.name.as_str()).collect()
        })
        .collect()
}

fn assert_book_shape(book: &Book, cap: f64) {
    assert!(!book.is_empty());
    assert!(book.events.iter().enumerate().all(|(i, e)| e.index == i));
    assert_eq!(book.events[0].type_name(), "reveal");
    match &book.last_event().unwrap().kind {
        EventKind::SetFinalWin { amount } => assert_eq!(*amount, to_cents(book.payout_multiplier)),
        other => panic!("book {} ends with {other:?}", book.id),
    }
    assert!(book.payout_multiplier <= cap);
    assert_eq!(
        capped_cents(book.base_game_wins + book.free_game_wins, cap),
        book.payout_cents(),
        "book {} split does not add up",
        book.id
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// SETTLEMENT
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_every_preset_settles_every_criteria() {
    init_logging();
    for config in presets::all_presets() {
        let cap = config.win_cap;
        for (mode, criteria) in pairs(&config) {
            for book in run(config.clone(), &mode, &criteria, SIMS) {
                assert_book_shape(&book, cap);
                assert_eq!(book.criteria, criteria);
            }
        }
    }
}

#[test]
fn test_zero_criteria_pays_nothing_anywhere() {
    for config in presets::all_presets() {
        for (mode, criteria) in pairs(&config) {
            if criteria != "0" {
                continue;
            }
            for book in run(config.clone(), &mode, "0", SIMS) {
                assert_eq!(book.payout_cents(), 0, "{} {mode}", config.game_id);
                assert!(!book.has_event("win"));
                assert!(!book.has_event("triggerFreeSpins"));
            }
        }
    }
}

/// Events that would pay or advance the round past its cap
const STOPPED_AT_CAP: [&str; 5] = ["win", "tumble", "updateFreeSpins", "updateTumbleWin", "boardMultiplierInfo"];

#[test]
fn test_low_cap_stops_every_preset() {
    const CAP: f64 = 1.0;
    for mut config in presets::all_presets() {
        config.win_cap = CAP;
        let mut capped = 0;
        for (mode, criteria) in pairs(&config) {
            if criteria == "0" {
                continue;
            }
            for book in run(config.clone(), &mode, &criteria, SIMS) {
                assert_book_shape(&book, CAP);
                let caps = book.events_by_type("winCap");
                if caps.is_empty() {
                    continue;
                }
                capped += 1;
                assert_eq!(caps.len(), 1);
                assert_eq!(book.payout_cents(), to_cents(CAP));
                let after: Vec<&str> = book.events[caps[0].index + 1..]
                    .iter()
                    .map(|e| e.type_name())
                    .filter(|name| STOPPED_AT_CAP.contains(name))
                    .collect();
                assert!(after.is_empty(), "{} book {} emits {after:?} after winCap", config.game_id, book.id);
            }
        }
        assert!(capped > 0, "{} never reached a cap of {CAP}", config.game_id);
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// STANDARD GAME SWITCHES
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_required_win_repeats_empty_rounds() {
    let loose = run(presets::lines_5x3(), "base", "basegame", 40);
    assert!(loose.iter().any(|b| b.payout_cents() == 0));

    let mut config = presets::lines_5x3();
    config.require_win = true;
    let mut engine = engine(config, "base");
    for sim in 0..40 {
        let outcome = engine.run_round(sim, "basegame").unwrap();
        assert!(outcome.book.payout_cents() > 0, "book {} paid nothing", outcome.book.id);
    }
    for sim in 0..SIMS {
        assert_eq!(engine.run_round(sim, "0").unwrap().book.payout_cents(), 0);
    }
}

#[test]
fn test_wild_multipliers_only_in_free_game() {
    let mut config = presets::lines_5x3();
    config.wild_multipliers = true;
    for dist in config.bet_modes[0].distributions.iter_mut() {
        dist.conditions
            .mult_values
            .insert(GameType::FreeGame, WeightTable::new().with(3, 1.0));
    }

    let mut free_wilds = 0;
    for book in run(config, "base", "freegame", SIMS) {
        for event in book.events_by_type("reveal") {
            let EventKind::Reveal { board, game_type, .. } = &event.kind else { unreachable!() };
            let expected = if game_type == "freeGame" { Some(3) } else { None };
            for wild in board.iter().flatten().filter(|s| s.name == "W") {
                assert_eq!(wild.multiplier, expected, "{game_type} wild");
                if expected.is_some() {
                    free_wilds += 1;
                }
            }
        }
    }
    assert!(free_wilds > 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// DETERMINISM
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_same_sim_same_book() {
    for config in presets::all_presets() {
        let mode = config.bet_modes[0].name.clone();
        let mut warm = engine(config.clone(), &mode);
        let mut books = Vec::new();
        for sim in 0..6 {
            books.push(warm.run_round(sim, "basegame").unwrap().book);
        }
        let mut cold = engine(config.clone(), &mode);
        let alone = cold.run_round(4, "basegame").unwrap().book;
        assert_eq!(alone, books[4], "{}", config.game_id);
        assert_eq!(alone.id, 5);
    }
}

#[test]
fn test_wins_accumulate_over_accepted_rounds() {
    let mut engine = engine(presets::ways_5x3(), "base");
    let mut paid = 0.0;
    for sim in 0..SIMS {
        paid += engine.run_round(sim, "basegame").unwrap().book.payout_multiplier;
    }
    let wins = engine.wins();
    assert_eq!(wins.rounds, SIMS);
    assert_eq!(to_cents(wins.total_cumulative_wins), to_cents(paid));
    assert!(wins.hit_rate() <= 1.0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// FORCED DRAWS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_forced_free_game_shows_forced_scatters() {
    let config = presets::lines_5x3();
    let padding = config.include_padding;
    for book in run(config.clone(), "base", "freegame", SIMS) {
        let EventKind::Reveal { board, game_type, .. } = &book.events[0].kind else {
            panic!("first event is not a reveal");
        };
        assert_eq!(game_type, "baseGame");
        let scatters = visible(board, padding).iter().flatten().filter(|n| **n == "S").count() as u32;
        assert!((3..=5).contains(&scatters), "forced {scatters} scatters");

        let trigger = book.events_by_type("triggerFreeSpins");
        assert_eq!(trigger.len(), 1);
        let EventKind::TriggerFreeSpins { total, positions } = &trigger[0].kind else {
            unreachable!()
        };
        assert_eq!(Some(*total), config.free_spins_for(GameType::BaseGame, scatters));
        assert_eq!(positions.len() as u32, scatters);
        assert!(book.has_event("endFreeSpins"));
    }
}

#[test]
fn test_buy_bonus_mode_always_enters_free_game() {
    for book in run(presets::lines_5x3(), "bonus", "freegame", 6) {
        assert!(book.has_event("triggerFreeSpins"));
        let updates = book.events_by_type("updateFreeSpins");
        let EventKind::UpdateFreeSpins { amount, .. } = &updates[0].kind else {
            unreachable!()
        };
        assert_eq!(*amount, 1);
    }
}

#[test]
fn test_force_ledger_counts_accepted_rounds() {
    let mut engine = engine(presets::lines_5x3(), "base");
    for sim in 0..SIMS {
        engine.run_round(sim, "freegame").unwrap();
    }
    let ledger = engine.take_ledger();
    let has = |r: &rf_book::ForceRecord, name: &str, value: &str| {
        r.search.iter().any(|o| o.name == name && o.value == value)
    };
    let entries: u64 = ledger
        .records()
        .iter()
        .filter(|r| has(r, "symbol", "scatter") && has(r, "gametype", "basegame"))
        .map(|r| r.times_triggered)
        .sum();
    assert_eq!(entries, SIMS);
    assert!(engine.ledger().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// BOARD SHAPE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_tumbles_keep_board_shape() {
    let config = presets::cluster_7x7();
    for book in run(config.clone(), "base", "basegame", SIMS) {
        for event in book.events_by_type("reveal") {
            let EventKind::Reveal { board, .. } = &event.kind else { unreachable!() };
            assert_eq!(board.len(), 7);
            assert!(board.iter().all(|reel| reel.len() == 7 + 2));
        }
        for event in book.events_by_type("tumble") {
            let EventKind::Tumble { new_symbols, .. } = &event.kind else { unreachable!() };
            assert_eq!(new_symbols.len(), 7);
        }
    }
}

#[test]
fn test_anticipation_never_decreases() {
    for config in [presets::lines_5x3(), presets::scatter_6x5()] {
        for book in run(config, "base", "freegame", SIMS) {
            for event in book.events_by_type("reveal") {
                let EventKind::Reveal { anticipation, .. } = &event.kind else { unreachable!() };
                assert!(anticipation.windows(2).all(|w| w[0] <= w[1]), "{anticipation:?}");
            }
        }
    }
}
