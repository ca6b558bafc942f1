//! Game configuration
//!
//! One `GameConfig` describes a complete game: board shape, paytable, reel
//! strips, special symbols, free-spin rules and the bet modes with their
//! distribution criteria. It is loaded once (JSON or YAML), validated, and
//! shared read-only with every worker through an `Arc`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rf_book::{EventFilter, WinLevels};
use rf_core::{GameType, SimError, SimResult};
use serde::{Deserialize, Serialize};

use crate::distribution::WeightTable;
use crate::paytable::{PayTable, Payline};
use crate::symbols::ReelStrip;

/// Special-symbol category names used by the engine
pub mod category {
    pub const WILD: &str = "wild";
    pub const SCATTER: &str = "scatter";
    pub const MULTIPLIER: &str = "multiplier";
    pub const PRIZE: &str = "prize";
}

/// Payout scheme
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WinType {
    /// Fixed paylines, left to right
    #[default]
    Lines,
    /// All contiguous left-to-right paths
    Ways,
    /// Flood-fill adjacency groups
    Cluster,
    /// Count anywhere
    Scatter,
}

/// Which set of game hooks drives the round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameVariant {
    #[default]
    Standard,
    /// Position multiplier grid in free spins
    ClusterGrid,
    /// Global multiplier plus multiplier symbols in free spins
    ScatterTumble,
    /// Expanding wilds in free spins, sticky prize respins
    ExpandingWilds,
}

// ═══════════════════════════════════════════════════════════════════════════
// BET MODES
// ═══════════════════════════════════════════════════════════════════════════

/// Named conditions attached to a distribution criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Conditions {
    /// Reel strip id weights per game type
    pub reel_weights: BTreeMap<GameType, WeightTable<String>>,
    /// Scatter counts to force when `force_free_game` is set
    pub scatter_triggers: WeightTable<u32>,
    pub force_wincap: bool,
    pub force_free_game: bool,
    /// Multiplier symbol values per game type
    pub mult_values: BTreeMap<GameType, WeightTable<u32>>,
    /// Prize symbol values (bet multiples)
    pub prize_values: WeightTable<u32>,
    /// Number of new expanding wilds landing per free spin
    pub landing_wilds: WeightTable<u32>,
}

impl Conditions {
    pub fn reel_weights(&self, game_type: GameType) -> SimResult<&WeightTable<String>> {
        self.reel_weights.get(&game_type).ok_or_else(|| {
            SimError::GameConfig(format!("no reel_weights configured for {game_type}"))
        })
    }

    pub fn mult_values(&self, game_type: GameType) -> Option<&WeightTable<u32>> {
        self.mult_values.get(&game_type)
    }
}

/// A named target outcome bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub criteria: String,
    /// Relative share of simulations assigned to this criteria
    pub quota: f64,
    /// Exact payout multiplier a round must settle at, if any
    #[serde(default)]
    pub win_criteria: Option<f64>,
    #[serde(default)]
    pub conditions: Conditions,
}

/// A bet mode: cost, target RTP and its distributions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BetMode {
    pub name: String,
    pub cost: f64,
    pub rtp: f64,
    pub max_win: f64,
    #[serde(default)]
    pub auto_close_disabled: bool,
    #[serde(default)]
    pub is_feature: bool,
    #[serde(default)]
    pub is_buy_bonus: bool,
    pub distributions: Vec<Distribution>,
}

impl BetMode {
    pub fn new(name: impl Into<String>, cost: f64, rtp: f64, max_win: f64) -> Self {
        Self {
            name: name.into(),
            cost,
            rtp,
            max_win,
            auto_close_disabled: false,
            is_feature: false,
            is_buy_bonus: false,
            distributions: Vec::new(),
        }
    }

    /// Add a distribution (builder pattern)
    pub fn with_distribution(mut self, distribution: Distribution) -> Self {
        self.distributions.push(distribution);
        self
    }

    pub fn distribution(&self, criteria: &str) -> SimResult<&Distribution> {
        self.distributions
            .iter()
            .find(|d| d.criteria == criteria)
            .ok_or_else(|| {
                SimError::GameConfig(format!(
                    "criteria '{criteria}' not found in bet mode '{}'",
                    self.name
                ))
            })
    }

    /// Criteria names in declaration order
    pub fn criteria(&self) -> impl Iterator<Item = &str> {
        self.distributions.iter().map(|d| d.criteria.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// GAME-SPECIFIC SECTIONS
// ═══════════════════════════════════════════════════════════════════════════

/// Upgrade targets for one symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeTargets {
    pub medium: String,
    pub high: String,
}

/// Cluster-size driven symbol upgrades
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeConfig {
    pub symbol_map: BTreeMap<String, UpgradeTargets>,
    pub medium_threshold: u32,
    pub high_threshold: u32,
}

impl UpgradeConfig {
    /// Upgrade target for a winning cluster, if it qualifies
    pub fn target(&self, symbol: &str, cluster_size: u32) -> Option<&str> {
        let targets = self.symbol_map.get(symbol)?;
        if cluster_size >= self.high_threshold {
            Some(&targets.high)
        } else if cluster_size >= self.medium_threshold {
            Some(&targets.medium)
        } else {
            None
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// GAME CONFIG
// ═══════════════════════════════════════════════════════════════════════════

/// Complete configuration of one game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub game_id: String,

    /// Maximum payout multiplier of a round
    pub win_cap: f64,

    pub win_type: WinType,

    pub variant: GameVariant,

    /// Target RTP of the game, in (0, 1)
    pub rtp: f64,

    pub num_reels: usize,

    /// Visible rows per reel
    pub num_rows: Vec<usize>,

    pub paytable: PayTable,

    /// Only used by `WinType::Lines`
    pub paylines: Vec<Payline>,

    /// Show one extra symbol above and below each reel
    pub include_padding: bool,

    /// Remove winning symbols and refill after each winning evaluation
    pub tumble: bool,

    /// Category → symbol names ("wild", "scatter", "multiplier", "prize", ...)
    pub special_symbols: BTreeMap<String, Vec<String>>,

    /// Scatter count → free spins awarded, per game type
    pub free_spin_triggers: BTreeMap<GameType, BTreeMap<u32, u32>>,

    /// Scatter count at which anticipation starts, per game type
    pub anticipation_triggers: BTreeMap<GameType, u32>,

    /// Strip id → one strip per reel
    pub reels: BTreeMap<String, Vec<ReelStrip>>,

    pub bet_modes: Vec<BetMode>,

    /// Ceiling for cluster grid position multipliers
    pub maximum_board_multiplier: u32,

    /// Custom win level tables, merged over the defaults
    pub win_levels: BTreeMap<String, Vec<f64>>,

    pub event_filter: EventFilter,

    /// Give up on a simulation after this many rejected attempts
    pub repeat_limit: Option<u64>,

    /// Log a warning every this many rejected attempts
    pub repeat_warn_interval: u64,

    pub upgrade: Option<UpgradeConfig>,

    /// Standard variant: repeat rounds that pay nothing outside criteria "0"
    pub require_win: bool,

    /// Standard variant: free game wilds draw a multiplier from `mult_values`
    pub wild_multipliers: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_id: "untitled".to_string(),
            win_cap: 5000.0,
            win_type: WinType::Lines,
            variant: GameVariant::Standard,
            rtp: 0.97,
            num_reels: 5,
            num_rows: vec![3; 5],
            paytable: PayTable::new(),
            paylines: Vec::new(),
            include_padding: true,
            tumble: false,
            special_symbols: BTreeMap::new(),
            free_spin_triggers: BTreeMap::new(),
            anticipation_triggers: BTreeMap::new(),
            reels: BTreeMap::new(),
            bet_modes: Vec::new(),
            maximum_board_multiplier: 512,
            win_levels: BTreeMap::new(),
            event_filter: EventFilter::default(),
            repeat_limit: None,
            repeat_warn_interval: 10_000,
            upgrade: None,
            require_win: false,
            wild_multipliers: false,
        }
    }
}

impl GameConfig {
    // ═══════════════════════════════════════════════════════════════════════
    // LOADING
    // ═══════════════════════════════════════════════════════════════════════

    /// Parse and validate a JSON config
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| SimError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a YAML config
    pub fn from_yaml_str(yaml: &str) -> SimResult<Self> {
        let config: Self =
            serde_yml::from_str(yaml).map_err(|e| SimError::Serialization(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a `.json`, `.yaml` or `.yml` file
    pub fn from_path(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&text),
            Some("yaml") | Some("yml") => Self::from_yaml_str(&text),
            other => Err(SimError::GameConfig(format!(
                "unsupported config extension {other:?} for {}",
                path.display()
            ))),
        }
    }

    pub fn to_json(&self) -> SimResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SimError::Serialization(e.to_string()))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // VALIDATION
    // ═══════════════════════════════════════════════════════════════════════

    /// Check the whole config, reporting every problem at once
    pub fn validate(&self) -> SimResult<()> {
        let mut errors = Vec::new();

        if !(self.rtp > 0.0 && self.rtp < 1.0) {
            errors.push(format!("rtp must be in (0, 1), got {}", self.rtp));
        }
        if !(self.win_cap > 0.0) {
            errors.push(format!("win_cap must be positive, got {}", self.win_cap));
        }
        if self.num_reels == 0 {
            errors.push("num_reels must be positive".to_string());
        }
        if self.num_rows.len() != self.num_reels {
            errors.push(format!(
                "num_rows has {} entries for {} reels",
                self.num_rows.len(),
                self.num_reels
            ));
        }
        if self.num_rows.iter().any(|r| *r == 0) {
            errors.push("every reel needs at least one row".to_string());
        }

        if self.paytable.is_empty() {
            errors.push("paytable is empty".to_string());
        }
        for (count, symbol, pay) in self.paytable.iter() {
            if count == 0 {
                errors.push(format!("paytable entry for '{symbol}' has count 0"));
            }
            if !(pay >= 0.0) {
                errors.push(format!("paytable pay for ({count}, '{symbol}') is {pay}"));
            }
        }

        self.validate_reels(&mut errors);
        self.validate_paylines(&mut errors);
        self.validate_bet_modes(&mut errors);

        for (game_type, table) in &self.free_spin_triggers {
            if table.values().any(|spins| *spins == 0) {
                errors.push(format!("free_spin_triggers for {game_type} awards zero spins"));
            }
        }

        if let Err(e) = self.win_level_tables() {
            errors.push(e.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SimError::GameConfig(errors.join("; ")))
        }
    }

    fn validate_reels(&self, errors: &mut Vec<String>) {
        if self.reels.is_empty() {
            errors.push("no reel strips configured".to_string());
        }
        let registered = self.registered_symbols();
        for (id, strips) in &self.reels {
            if strips.len() != self.num_reels {
                errors.push(format!(
                    "reel set '{id}' has {} strips for {} reels",
                    strips.len(),
                    self.num_reels
                ));
            }
            for (reel, strip) in strips.iter().enumerate() {
                if strip.is_empty() {
                    errors.push(format!("reel set '{id}' reel {reel} is empty"));
                }
                let unknown: BTreeSet<&str> = strip
                    .symbols()
                    .iter()
                    .map(|s| s.as_str())
                    .filter(|s| !registered.contains(*s))
                    .collect();
                if !unknown.is_empty() {
                    errors.push(format!(
                        "reel set '{id}' reel {reel} uses unregistered symbols {unknown:?}"
                    ));
                }
            }
        }
    }

    fn validate_paylines(&self, errors: &mut Vec<String>) {
        if self.win_type == WinType::Lines && self.paylines.is_empty() {
            errors.push("lines game without paylines".to_string());
        }
        for line in &self.paylines {
            if line.rows.len() != self.num_reels {
                errors.push(format!(
                    "payline {} has {} rows for {} reels",
                    line.index,
                    line.rows.len(),
                    self.num_reels
                ));
                continue;
            }
            for (reel, row) in line.rows.iter().enumerate() {
                if *row >= self.rows(reel) {
                    errors.push(format!(
                        "payline {} row {row} is off the board on reel {reel}",
                        line.index
                    ));
                }
            }
        }
    }

    fn validate_bet_modes(&self, errors: &mut Vec<String>) {
        if self.bet_modes.is_empty() {
            errors.push("no bet modes configured".to_string());
        }
        for mode in &self.bet_modes {
            if !(mode.rtp > 0.0 && mode.rtp < 1.0) {
                errors.push(format!("bet mode '{}' rtp must be in (0, 1)", mode.name));
            }
            if !(mode.cost > 0.0) {
                errors.push(format!("bet mode '{}' cost must be positive", mode.name));
            }
            if mode.distributions.is_empty() {
                errors.push(format!("bet mode '{}' has no distributions", mode.name));
            }
            for dist in &mode.distributions {
                let label = format!("{}/{}", mode.name, dist.criteria);
                if !(dist.quota > 0.0) {
                    errors.push(format!("{label}: quota must be positive"));
                }
                let conditions = &dist.conditions;
                for (game_type, weights) in &conditions.reel_weights {
                    if let Err(e) = weights.validate(&format!("{label} reel_weights {game_type}")) {
                        errors.push(e);
                    }
                    for id in weights.values() {
                        if !self.reels.contains_key(id) {
                            errors.push(format!("{label}: reel_weights references unknown strip '{id}'"));
                        }
                    }
                }
                if !conditions.reel_weights.contains_key(&GameType::BaseGame) {
                    errors.push(format!("{label}: missing basegame reel_weights"));
                }
                if conditions.force_free_game {
                    if let Err(e) = conditions.scatter_triggers.validate(&format!("{label} scatter_triggers")) {
                        errors.push(e);
                    }
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════

    /// Visible rows of a reel
    #[inline]
    pub fn rows(&self, reel: usize) -> usize {
        self.num_rows.get(reel).copied().unwrap_or(0)
    }

    pub fn max_rows(&self) -> usize {
        self.num_rows.iter().copied().max().unwrap_or(0)
    }

    pub fn total_cells(&self) -> usize {
        self.num_rows.iter().sum()
    }

    /// Symbol names in a special category
    pub fn special(&self, category: &str) -> &[String] {
        self.special_symbols
            .get(category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_special(&self, name: &str, category: &str) -> bool {
        self.special(category).iter().any(|s| s == name)
    }

    /// Paytable names plus every special symbol name
    pub fn registered_symbols(&self) -> BTreeSet<String> {
        let mut names: BTreeSet<String> =
            self.paytable.symbols().into_iter().map(str::to_string).collect();
        for list in self.special_symbols.values() {
            names.extend(list.iter().cloned());
        }
        names
    }

    pub fn bet_mode(&self, name: &str) -> SimResult<&BetMode> {
        self.bet_modes
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| SimError::GameConfig(format!("unknown bet mode '{name}'")))
    }

    pub fn reel_set(&self, id: &str) -> SimResult<&[ReelStrip]> {
        self.reels
            .get(id)
            .map(|v| v.as_slice())
            .ok_or_else(|| SimError::ReelStrip(format!("unknown reel strip id '{id}'")))
    }

    /// Smallest scatter count that awards free spins in a game type
    pub fn min_trigger(&self, game_type: GameType) -> Option<u32> {
        self.free_spin_triggers
            .get(&game_type)
            .and_then(|t| t.keys().next().copied())
    }

    /// Free spins awarded for `count` scatters
    ///
    /// Counts above the largest configured key award the largest entry.
    pub fn free_spins_for(&self, game_type: GameType, count: u32) -> Option<u32> {
        self.free_spin_triggers
            .get(&game_type)?
            .range(..=count)
            .next_back()
            .map(|(_, spins)| *spins)
    }

    pub fn anticipation_trigger(&self, game_type: GameType) -> Option<u32> {
        self.anticipation_triggers.get(&game_type).copied()
    }

    /// Default tables for this win cap with the configured overrides applied
    pub fn win_level_tables(&self) -> SimResult<WinLevels> {
        let mut levels = WinLevels::defaults(self.win_cap);
        for (name, bounds) in &self.win_levels {
            levels = levels.with_table(name.clone(), bounds.clone())?;
        }
        Ok(levels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    #[test]
    fn test_presets_validate() {
        for config in [
            presets::lines_5x3(),
            presets::ways_5x3(),
            presets::cluster_7x7(),
            presets::scatter_6x5(),
            presets::expanding_wilds_5x5(),
        ] {
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_validation_collects_every_error() {
        let mut config = presets::lines_5x3();
        config.rtp = 1.2;
        config.num_rows = vec![3; 4];
        config.bet_modes.clear();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("rtp must be in (0, 1)"));
        assert!(err.contains("num_rows has 4 entries"));
        assert!(err.contains("no bet modes"));
    }

    #[test]
    fn test_unregistered_strip_symbol_rejected() {
        let mut config = presets::lines_5x3();
        config
            .reels
            .get_mut("BR0")
            .unwrap()[0] = ReelStrip::from_names(&["H1", "ZZ"]);
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("ZZ"));
    }

    #[test]
    fn test_json_round_trip() {
        let config = presets::ways_5x3();
        let json = config.to_json().unwrap();
        let back = GameConfig::from_json_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_yaml_minimal_config() {
        let yaml = r#"
game_id: mini
win_cap: 100
rtp: 0.95
num_reels: 3
num_rows: [3, 3, 3]
win_type: scatter
paytable:
  - { kind: [3, 9], symbol: A, pay: 1.0 }
reels:
  BR0: [[A, B, A], [A, B], [B, A, A]]
special_symbols:
  scatter: [B]
bet_modes:
  - name: base
    cost: 1.0
    rtp: 0.95
    max_win: 100
    distributions:
      - criteria: basegame
        quota: 1.0
        conditions:
          reel_weights:
            basegame: { BR0: 1 }
"#;
        let config = GameConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.win_type, WinType::Scatter);
        assert_eq!(config.paytable.get(7, "A"), Some(1.0));
        assert_eq!(config.reel_set("BR0").unwrap()[1].len(), 2);
        assert!(config.is_special("B", category::SCATTER));
        assert_eq!(config.bet_mode("base").unwrap().distributions.len(), 1);
        assert!(config.bet_mode("missing").is_err());
    }

    #[test]
    fn test_free_spins_for_clamps_to_largest_key() {
        let config = presets::lines_5x3();
        assert_eq!(config.min_trigger(GameType::BaseGame), Some(3));
        assert_eq!(config.free_spins_for(GameType::BaseGame, 2), None);
        assert_eq!(config.free_spins_for(GameType::BaseGame, 3), Some(10));
        assert_eq!(config.free_spins_for(GameType::BaseGame, 9), Some(20));
    }

    #[test]
    fn test_upgrade_targets() {
        let upgrade = UpgradeConfig {
            symbol_map: BTreeMap::from([(
                "L1".to_string(),
                UpgradeTargets {
                    medium: "H2".into(),
                    high: "H1".into(),
                },
            )]),
            medium_threshold: 5,
            high_threshold: 8,
        };
        assert_eq!(upgrade.target("L1", 4), None);
        assert_eq!(upgrade.target("L1", 5), Some("H2"));
        assert_eq!(upgrade.target("L1", 12), Some("H1"));
        assert_eq!(upgrade.target("H1", 12), None);
    }
}
