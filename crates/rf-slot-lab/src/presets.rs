//! Built-in game configurations
//!
//! One preset per payout scheme and variant. They are small, validate as-is
//! and double as fixtures for tests and benches.
//!
//! | Preset                | Board | Pays    | Variant          | Bet modes           |
//! |-----------------------|-------|---------|------------------|---------------------|
//! | `lines_5x3`           | 5×3   | lines   | standard         | base, bonus         |
//! | `ways_5x3`            | 5×3   | ways    | standard         | base                |
//! | `cluster_7x7`         | 7×7   | cluster | cluster grid     | base                |
//! | `scatter_6x5`         | 6×5   | scatter | scatter tumble   | base                |
//! | `expanding_wilds_5x5` | 5×5   | lines   | expanding wilds  | base, super_spin    |

use std::collections::BTreeMap;

use rf_core::GameType;

use crate::config::{
    BetMode, Conditions, Distribution, GameConfig, GameVariant, UpgradeConfig, UpgradeTargets, WinType, category,
};
use crate::distribution::WeightTable;
use crate::paytable::{PayTable, Payline, standard_paylines_5x3};
use crate::symbols::ReelStrip;

/// Every preset by game id
pub fn all_presets() -> Vec<GameConfig> {
    vec![
        lines_5x3(),
        ways_5x3(),
        cluster_7x7(),
        scatter_6x5(),
        expanding_wilds_5x5(),
    ]
}

/// Preset by game id
pub fn by_id(id: &str) -> Option<GameConfig> {
    all_presets().into_iter().find(|c| c.game_id == id)
}

// ═══════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════

const HIGH: [&str; 4] = ["H1", "H2", "H3", "H4"];
const LOW: [&str; 4] = ["L1", "L2", "L3", "L4"];

/// Strip starting `offset` symbols into `pattern`
fn rotated(pattern: &[&str], offset: usize) -> ReelStrip {
    let len = pattern.len();
    ReelStrip::from_names(&(0..len).map(|i| pattern[(i + offset) % len]).collect::<Vec<_>>())
}

fn reel_set(pattern: &[&str], reels: usize, step: usize) -> Vec<ReelStrip> {
    (0..reels).map(|reel| rotated(pattern, reel * step)).collect()
}

fn specials(wild: bool, extra: &[(&str, &str)]) -> BTreeMap<String, Vec<String>> {
    let mut map = BTreeMap::new();
    if wild {
        map.insert(category::WILD.to_string(), vec!["W".to_string()]);
    }
    map.insert(category::SCATTER.to_string(), vec!["S".to_string()]);
    for (cat, name) in extra {
        map.entry(cat.to_string()).or_insert_with(Vec::new).push(name.to_string());
    }
    map
}

fn triggers(entries: &[(u32, u32)]) -> BTreeMap<u32, u32> {
    entries.iter().copied().collect()
}

fn strips_for(entries: &[(GameType, &str)]) -> BTreeMap<GameType, WeightTable<String>> {
    entries
        .iter()
        .map(|(game_type, id)| (*game_type, WeightTable::new().with(id.to_string(), 1.0)))
        .collect()
}

fn distribution(criteria: &str, quota: f64, win_criteria: Option<f64>, conditions: Conditions) -> Distribution {
    Distribution {
        criteria: criteria.to_string(),
        quota,
        win_criteria,
        conditions,
    }
}

fn weights(entries: &[(u32, f64)]) -> WeightTable<u32> {
    entries
        .iter()
        .fold(WeightTable::new(), |table, (value, weight)| table.with(*value, *weight))
}

/// Base game, zero-win and forced free game criteria over `BR0` / `FR0`
///
/// `extra` supplies the variant's value tables to all three.
fn standard_distributions(scatter_counts: &[(u32, f64)], extra: Conditions) -> Vec<Distribution> {
    let base = Conditions {
        reel_weights: strips_for(&[(GameType::BaseGame, "BR0"), (GameType::FreeGame, "FR0")]),
        ..extra.clone()
    };
    let forced = Conditions {
        scatter_triggers: weights(scatter_counts),
        force_free_game: true,
        ..base.clone()
    };
    vec![
        distribution("basegame", 0.6, None, base.clone()),
        distribution("0", 0.3, Some(0.0), base),
        distribution("freegame", 0.1, None, forced),
    ]
}

/// Three to five of a kind for every high/low symbol, plus a paying wild
fn line_paytable() -> PayTable {
    let mut table = PayTable::new();
    for (i, symbol) in HIGH.iter().enumerate() {
        let scale = (4 - i) as f64;
        table = table
            .with(3, *symbol, 0.5 * scale)
            .with(4, *symbol, 1.5 * scale)
            .with(5, *symbol, 5.0 * scale);
    }
    for symbol in LOW {
        table = table.with(3, symbol, 0.2).with(4, symbol, 0.5).with(5, symbol, 1.5);
    }
    table.with(3, "W", 2.5).with(4, "W", 10.0).with(5, "W", 50.0)
}

// ═══════════════════════════════════════════════════════════════════════════
// LINES / WAYS
// ═══════════════════════════════════════════════════════════════════════════

const BASE_5: [&str; 20] = [
    "H1", "L1", "L2", "H2", "L3", "L4", "S", "L1", "H3", "L2", "W", "L3", "H4", "L4", "L1", "H1", "L2", "L3", "H2",
    "L4",
];

const FREE_5: [&str; 20] = [
    "H1", "L1", "W", "H2", "L3", "L4", "S", "L1", "H3", "L2", "W", "L3", "H4", "L4", "H1", "L2", "W", "L3", "H2", "L4",
];

/// 5×3, ten paylines, 3+ scatters award free spins
pub fn lines_5x3() -> GameConfig {
    let mut bonus = BetMode::new("bonus", 100.0, 0.96, 5000.0);
    bonus.is_buy_bonus = true;
    bonus.is_feature = true;
    bonus.distributions = standard_distributions(&[(3, 60.0), (4, 30.0), (5, 10.0)], Conditions::default())
        .into_iter()
        .filter(|d| d.criteria == "freegame")
        .map(|mut d| {
            d.quota = 1.0;
            d
        })
        .collect();

    let mut base = BetMode::new("base", 1.0, 0.96, 5000.0);
    base.distributions = standard_distributions(&[(3, 60.0), (4, 30.0), (5, 10.0)], Conditions::default());

    GameConfig {
        game_id: "lines_5x3".to_string(),
        win_type: WinType::Lines,
        num_reels: 5,
        num_rows: vec![3; 5],
        paytable: line_paytable(),
        paylines: standard_paylines_5x3().into_iter().take(10).collect(),
        special_symbols: specials(true, &[]),
        free_spin_triggers: BTreeMap::from([
            (GameType::BaseGame, triggers(&[(3, 10), (4, 15), (5, 20)])),
            (GameType::FreeGame, triggers(&[(3, 4), (4, 6), (5, 8)])),
        ]),
        anticipation_triggers: BTreeMap::from([(GameType::BaseGame, 2), (GameType::FreeGame, 2)]),
        reels: BTreeMap::from([
            ("BR0".to_string(), reel_set(&BASE_5, 5, 3)),
            ("FR0".to_string(), reel_set(&FREE_5, 5, 3)),
        ]),
        bet_modes: vec![base, bonus],
        ..Default::default()
    }
}

/// 5×3, 243 ways
pub fn ways_5x3() -> GameConfig {
    let mut base = BetMode::new("base", 1.0, 0.96, 5000.0);
    base.distributions = standard_distributions(&[(3, 70.0), (4, 25.0), (5, 5.0)], Conditions::default());

    GameConfig {
        game_id: "ways_5x3".to_string(),
        win_type: WinType::Ways,
        num_reels: 5,
        num_rows: vec![3; 5],
        paytable: line_paytable(),
        special_symbols: specials(true, &[]),
        free_spin_triggers: BTreeMap::from([
            (GameType::BaseGame, triggers(&[(3, 8), (4, 12), (5, 15)])),
            (GameType::FreeGame, triggers(&[(3, 4)])),
        ]),
        anticipation_triggers: BTreeMap::from([(GameType::BaseGame, 2)]),
        reels: BTreeMap::from([
            ("BR0".to_string(), reel_set(&BASE_5, 5, 7)),
            ("FR0".to_string(), reel_set(&FREE_5, 5, 7)),
        ]),
        bet_modes: vec![base],
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// CLUSTER
// ═══════════════════════════════════════════════════════════════════════════

const CLUSTER_7: [&str; 24] = [
    "L1", "L2", "H1", "L3", "L4", "L1", "H2", "L2", "W", "L3", "L4", "H3", "L1", "L2", "S", "L3", "H4", "L4", "L1",
    "L2", "H1", "L3", "L4", "H2",
];

/// 7×7 cluster pays with tumbles, upgrades and a free-game multiplier grid
pub fn cluster_7x7() -> GameConfig {
    let mut paytable = PayTable::new();
    for (i, symbol) in HIGH.iter().enumerate() {
        let scale = (4 - i) as f64;
        paytable = paytable
            .with_range(5, 7, *symbol, 0.5 * scale)
            .with_range(8, 11, *symbol, 2.0 * scale)
            .with_range(12, 49, *symbol, 10.0 * scale);
    }
    for symbol in LOW {
        paytable = paytable
            .with_range(5, 7, symbol, 0.1)
            .with_range(8, 11, symbol, 0.4)
            .with_range(12, 49, symbol, 2.0);
    }

    let upgrade = UpgradeConfig {
        symbol_map: LOW
            .iter()
            .map(|low| {
                (
                    low.to_string(),
                    UpgradeTargets {
                        medium: "H3".to_string(),
                        high: "H1".to_string(),
                    },
                )
            })
            .collect(),
        medium_threshold: 8,
        high_threshold: 12,
    };

    let mut base = BetMode::new("base", 1.0, 0.96, 5000.0);
    base.distributions = standard_distributions(&[(3, 70.0), (4, 25.0), (5, 5.0)], Conditions::default());

    GameConfig {
        game_id: "cluster_7x7".to_string(),
        win_type: WinType::Cluster,
        variant: GameVariant::ClusterGrid,
        num_reels: 7,
        num_rows: vec![7; 7],
        paytable,
        tumble: true,
        special_symbols: specials(true, &[]),
        free_spin_triggers: BTreeMap::from([
            (GameType::BaseGame, triggers(&[(3, 10), (4, 12), (5, 15)])),
            (GameType::FreeGame, triggers(&[(3, 5)])),
        ]),
        anticipation_triggers: BTreeMap::from([(GameType::BaseGame, 2)]),
        reels: BTreeMap::from([
            ("BR0".to_string(), reel_set(&CLUSTER_7, 7, 5)),
            ("FR0".to_string(), reel_set(&CLUSTER_7, 7, 11)),
        ]),
        bet_modes: vec![base],
        maximum_board_multiplier: 128,
        upgrade: Some(upgrade),
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SCATTER
// ═══════════════════════════════════════════════════════════════════════════

const SCATTER_6: [&str; 30] = [
    "L1", "H1", "L2", "L3", "H2", "L4", "L1", "M", "L2", "H3", "L3", "S", "L4", "H4", "L1", "L2", "H1", "L3", "W",
    "L4", "H2", "L1", "L2", "M", "L3", "H3", "L4", "L1", "H4", "L2",
];

/// 6×5 pay-anywhere with tumbles and multiplier symbols
pub fn scatter_6x5() -> GameConfig {
    let mut paytable = PayTable::new();
    for (i, symbol) in HIGH.iter().enumerate() {
        let scale = (4 - i) as f64;
        paytable = paytable
            .with_range(8, 9, *symbol, 1.0 * scale)
            .with_range(10, 11, *symbol, 2.5 * scale)
            .with_range(12, 30, *symbol, 10.0 * scale);
    }
    for symbol in LOW {
        paytable = paytable
            .with_range(8, 9, symbol, 0.25)
            .with_range(10, 11, symbol, 0.75)
            .with_range(12, 30, symbol, 2.0);
    }

    let with_mults = Conditions {
        mult_values: BTreeMap::from([
            (GameType::BaseGame, weights(&[(2, 50.0), (3, 30.0), (5, 15.0), (10, 5.0)])),
            (
                GameType::FreeGame,
                weights(&[(2, 40.0), (3, 30.0), (5, 20.0), (10, 8.0), (25, 2.0)]),
            ),
        ]),
        ..Default::default()
    };
    let mut base = BetMode::new("base", 1.0, 0.96, 5000.0);
    base.distributions = standard_distributions(&[(4, 80.0), (5, 15.0), (6, 5.0)], with_mults);

    GameConfig {
        game_id: "scatter_6x5".to_string(),
        win_type: WinType::Scatter,
        variant: GameVariant::ScatterTumble,
        num_reels: 6,
        num_rows: vec![5; 6],
        paytable,
        tumble: true,
        special_symbols: specials(true, &[(category::MULTIPLIER, "M")]),
        free_spin_triggers: BTreeMap::from([
            (GameType::BaseGame, triggers(&[(4, 8), (5, 10), (6, 12)])),
            (GameType::FreeGame, triggers(&[(3, 5)])),
        ]),
        anticipation_triggers: BTreeMap::from([(GameType::BaseGame, 3)]),
        reels: BTreeMap::from([
            ("BR0".to_string(), reel_set(&SCATTER_6, 6, 5)),
            ("FR0".to_string(), reel_set(&SCATTER_6, 6, 13)),
        ]),
        bet_modes: vec![base],
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// EXPANDING WILDS
// ═══════════════════════════════════════════════════════════════════════════

const EXPANDING_5: [&str; 25] = [
    "H1", "L1", "L2", "H2", "L3", "L4", "S", "L1", "H3", "L2", "W", "L3", "H4", "L4", "L1", "H1", "L2", "L3", "H2",
    "L4", "L1", "H3", "L2", "H4", "L3",
];

const SUPER_5: [&str; 24] = [
    "L1", "P", "H1", "L2", "L3", "H2", "L4", "L1", "H3", "L2", "L3", "H4", "L4", "P", "L1", "H1", "L2", "L3", "H2",
    "L4", "W", "H3", "L1", "L2",
];

fn paylines_5x5() -> Vec<Payline> {
    let mut lines: Vec<Payline> = (0..5).map(|row| Payline::straight(row as u32 + 1, row, 5)).collect();
    let shapes: [[usize; 5]; 10] = [
        [0, 1, 2, 1, 0],
        [4, 3, 2, 3, 4],
        [1, 2, 3, 2, 1],
        [3, 2, 1, 2, 3],
        [0, 1, 2, 3, 4],
        [4, 3, 2, 1, 0],
        [2, 1, 0, 1, 2],
        [2, 3, 4, 3, 2],
        [1, 0, 1, 0, 1],
        [3, 4, 3, 4, 3],
    ];
    for (i, rows) in shapes.iter().enumerate() {
        lines.push(Payline::new(i as u32 + 6, rows.to_vec()));
    }
    lines
}

/// 5×5 lines with expanding wilds in free spins and a sticky-prize super spin
pub fn expanding_wilds_5x5() -> GameConfig {
    let free = Conditions {
        mult_values: BTreeMap::from([(
            GameType::FreeGame,
            weights(&[(1, 50.0), (2, 30.0), (3, 15.0), (5, 5.0)]),
        )]),
        landing_wilds: weights(&[(0, 60.0), (1, 30.0), (2, 10.0)]),
        ..Default::default()
    };
    let mut base = BetMode::new("base", 1.0, 0.96, 5000.0);
    base.distributions = standard_distributions(&[(3, 70.0), (4, 25.0), (5, 5.0)], free);

    let super_conditions = Conditions {
        reel_weights: strips_for(&[(GameType::BaseGame, "SR0")]),
        prize_values: weights(&[(1, 40.0), (2, 30.0), (5, 20.0), (10, 8.0), (50, 2.0)]),
        ..Default::default()
    };
    let mut super_spin = BetMode::new("super_spin", 25.0, 0.96, 5000.0);
    super_spin.is_feature = true;
    super_spin.distributions = vec![
        distribution("0", 0.4, Some(0.0), super_conditions.clone()),
        distribution("prize", 0.6, None, super_conditions),
    ];

    GameConfig {
        game_id: "expanding_wilds_5x5".to_string(),
        win_type: WinType::Lines,
        variant: GameVariant::ExpandingWilds,
        num_reels: 5,
        num_rows: vec![5; 5],
        paytable: line_paytable(),
        paylines: paylines_5x5(),
        special_symbols: specials(true, &[(category::PRIZE, "P")]),
        free_spin_triggers: BTreeMap::from([
            (GameType::BaseGame, triggers(&[(3, 8), (4, 10), (5, 12)])),
            (GameType::FreeGame, triggers(&[(3, 3)])),
        ]),
        anticipation_triggers: BTreeMap::from([(GameType::BaseGame, 2)]),
        reels: BTreeMap::from([
            ("BR0".to_string(), reel_set(&EXPANDING_5, 5, 4)),
            ("FR0".to_string(), reel_set(&EXPANDING_5, 5, 9)),
            ("SR0".to_string(), reel_set(&SUPER_5, 5, 5)),
        ]),
        bet_modes: vec![base, super_spin],
        ..Default::default()
    }
}
