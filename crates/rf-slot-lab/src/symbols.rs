//! Symbol definitions and reel strips
//!
//! A [`Symbol`] is a name plus a sparse set of runtime attributes. The
//! [`SymbolFactory`] stamps symbols out of per-name templates built from the
//! config, then runs any registered initializers (random multiplier, prize
//! value, ...) for that name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use rand_chacha::ChaCha8Rng;
use rf_book::SymbolView;
use rf_core::{GameType, SimError, SimResult, to_cents};
use serde::{Deserialize, Serialize};

use crate::config::{Conditions, GameConfig, category};

// ═══════════════════════════════════════════════════════════════════════════
// ATTRIBUTES
// ═══════════════════════════════════════════════════════════════════════════

/// Attribute identifier
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AttributeKey {
    Wild,
    Scatter,
    Multiplier,
    Prize,
    /// Marked for removal by the next tumble
    Explode,
    /// Name appears in the paytable
    Paying,
    /// Any other configured special category
    Category(String),
}

impl AttributeKey {
    /// Map a `special_symbols` category name onto a key
    pub fn from_category(name: &str) -> Self {
        match name {
            category::WILD => AttributeKey::Wild,
            category::SCATTER => AttributeKey::Scatter,
            category::MULTIPLIER => AttributeKey::Multiplier,
            category::PRIZE => AttributeKey::Prize,
            other => AttributeKey::Category(other.to_string()),
        }
    }
}

/// Attribute value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Flag(bool),
    Int(u32),
    Float(f64),
}

impl AttributeValue {
    /// `Flag(false)` is the only falsy value
    #[inline]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, AttributeValue::Flag(false))
    }

    /// Numeric view; `Flag(true)` reads as 1
    #[inline]
    pub fn as_f64(&self) -> f64 {
        match self {
            AttributeValue::Flag(b) => f64::from(u8::from(*b)),
            AttributeValue::Int(v) => f64::from(*v),
            AttributeValue::Float(v) => *v,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// SYMBOL
// ═══════════════════════════════════════════════════════════════════════════

/// A board cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    name: String,
    /// Usually fewer than four entries, so a flat list beats a map
    attributes: Vec<(AttributeKey, AttributeValue)>,
}

impl Symbol {
    /// Bare symbol with no attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attribute(&self, key: &AttributeKey) -> Option<AttributeValue> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| *v)
    }

    /// Present and truthy
    #[inline]
    pub fn check_attribute(&self, key: &AttributeKey) -> bool {
        self.attribute(key).is_some_and(|v| v.is_truthy())
    }

    pub fn set_attribute(&mut self, key: AttributeKey, value: AttributeValue) {
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((key, value)),
        }
    }

    /// Set an attribute (builder pattern)
    pub fn with_attribute(mut self, key: AttributeKey, value: AttributeValue) -> Self {
        self.set_attribute(key, value);
        self
    }

    pub fn remove_attribute(&mut self, key: &AttributeKey) {
        self.attributes.retain(|(k, _)| k != key);
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&AttributeKey, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k, v))
    }

    #[inline]
    pub fn is_wild(&self) -> bool {
        self.check_attribute(&AttributeKey::Wild)
    }

    #[inline]
    pub fn is_scatter(&self) -> bool {
        self.check_attribute(&AttributeKey::Scatter)
    }

    #[inline]
    pub fn is_paying(&self) -> bool {
        self.check_attribute(&AttributeKey::Paying)
    }

    /// Whether the symbol belongs to a `special_symbols` category
    pub fn has_category(&self, name: &str) -> bool {
        self.check_attribute(&AttributeKey::from_category(name))
    }

    /// Numeric multiplier, if the symbol carries one
    pub fn multiplier(&self) -> Option<f64> {
        self.attribute(&AttributeKey::Multiplier)
            .filter(|v| v.is_truthy())
            .map(|v| v.as_f64())
    }

    /// Multiplier above 1, the only values that enhance a win
    pub fn enhancing_multiplier(&self) -> Option<f64> {
        self.multiplier().filter(|m| *m > 1.0)
    }

    pub fn set_multiplier(&mut self, value: u32) {
        self.set_attribute(AttributeKey::Multiplier, AttributeValue::Int(value));
    }

    /// Prize in bet multiples
    pub fn prize(&self) -> Option<f64> {
        match self.attribute(&AttributeKey::Prize)? {
            AttributeValue::Flag(_) => None,
            v => Some(v.as_f64()),
        }
    }

    pub fn set_prize(&mut self, value: f64) {
        self.set_attribute(AttributeKey::Prize, AttributeValue::Float(value));
    }

    #[inline]
    pub fn is_exploding(&self) -> bool {
        self.check_attribute(&AttributeKey::Explode)
    }

    pub fn mark_explode(&mut self) {
        self.set_attribute(AttributeKey::Explode, AttributeValue::Flag(true));
    }

    /// Client view of this symbol
    pub fn to_view(&self) -> SymbolView {
        let multiplier = match self.attribute(&AttributeKey::Multiplier) {
            Some(AttributeValue::Flag(_)) | None => None,
            Some(v) => Some(v.as_f64() as u32),
        };
        SymbolView {
            name: self.name.clone(),
            wild: self.is_wild(),
            scatter: self.is_scatter(),
            multiplier,
            prize: self.prize().map(to_cents),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// FACTORY
// ═══════════════════════════════════════════════════════════════════════════

/// What an initializer may read or draw from while a symbol is created
pub struct SymbolContext<'a> {
    pub rng: &'a mut ChaCha8Rng,
    pub conditions: &'a Conditions,
    pub game_type: GameType,
}

/// Runs once for every freshly created symbol of a registered name
pub type SymbolInitializer =
    Arc<dyn Fn(&mut Symbol, &mut SymbolContext<'_>) -> SimResult<()> + Send + Sync>;

/// Draw the multiplier from `conditions.mult_values[game_type]`
///
/// With `free_game_only`, base-game symbols keep their config attributes.
/// Game types without a table leave the symbol unchanged.
pub fn multiplier_from_conditions(free_game_only: bool) -> SymbolInitializer {
    Arc::new(move |symbol: &mut Symbol, ctx: &mut SymbolContext<'_>| {
        if free_game_only && ctx.game_type == GameType::BaseGame {
            return Ok(());
        }
        if let Some(table) = ctx.conditions.mult_values(ctx.game_type) {
            let value = table.draw(&mut *ctx.rng)?;
            symbol.set_multiplier(value);
        }
        Ok(())
    })
}

/// Draw the prize from `conditions.prize_values`
pub fn prize_from_conditions() -> SymbolInitializer {
    Arc::new(|symbol: &mut Symbol, ctx: &mut SymbolContext<'_>| {
        if ctx.conditions.prize_values.is_empty() {
            return Err(SimError::GameConfig(format!(
                "prize symbol '{}' created without prize_values",
                symbol.name()
            )));
        }
        let value = ctx.conditions.prize_values.draw(&mut *ctx.rng)?;
        symbol.set_prize(f64::from(value));
        Ok(())
    })
}

/// Creates board symbols from config templates plus registered initializers
#[derive(Clone)]
pub struct SymbolFactory {
    templates: BTreeMap<String, Symbol>,
    initializers: BTreeMap<String, Vec<SymbolInitializer>>,
}

impl SymbolFactory {
    /// Build a template for every registered name
    pub fn from_config(config: &GameConfig) -> Self {
        let mut templates = BTreeMap::new();
        for name in config.registered_symbols() {
            let mut symbol = Symbol::new(name.clone());
            for (cat, members) in &config.special_symbols {
                if members.contains(&name) {
                    symbol.set_attribute(AttributeKey::from_category(cat), AttributeValue::Flag(true));
                }
            }
            if config.paytable.pays_symbol(&name) {
                symbol.set_attribute(AttributeKey::Paying, AttributeValue::Flag(true));
            }
            templates.insert(name, symbol);
        }
        Self {
            templates,
            initializers: BTreeMap::new(),
        }
    }

    /// Attach an initializer to a symbol name
    pub fn register(&mut self, name: &str, initializer: SymbolInitializer) -> SimResult<()> {
        if !self.templates.contains_key(name) {
            return Err(self.unregistered(name));
        }
        self.initializers
            .entry(name.to_string())
            .or_default()
            .push(initializer);
        Ok(())
    }

    /// Attach an initializer to every member of a special category
    pub fn register_category(
        &mut self,
        config: &GameConfig,
        category: &str,
        initializer: SymbolInitializer,
    ) -> SimResult<()> {
        for name in config.special(category) {
            self.register(name, initializer.clone())?;
        }
        Ok(())
    }

    /// Template copy without running initializers
    pub fn template(&self, name: &str) -> SimResult<Symbol> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| self.unregistered(name))
    }

    /// Fresh symbol with every initializer for its name applied
    pub fn create(&self, name: &str, ctx: &mut SymbolContext<'_>) -> SimResult<Symbol> {
        let mut symbol = self.template(name)?;
        if let Some(inits) = self.initializers.get(name) {
            for init in inits {
                init(&mut symbol, ctx)?;
            }
        }
        Ok(symbol)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    pub fn registered_names(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(|k| k.as_str())
    }

    fn unregistered(&self, name: &str) -> SimError {
        SimError::UnregisteredSymbol {
            name: name.to_string(),
            registered: self.templates.keys().cloned().collect(),
        }
    }
}

impl fmt::Debug for SymbolFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolFactory")
            .field("templates", &self.templates.keys().collect::<Vec<_>>())
            .field(
                "initializers",
                &self
                    .initializers
                    .iter()
                    .map(|(k, v)| (k, v.len()))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// REEL STRIPS
// ═══════════════════════════════════════════════════════════════════════════

/// A circular reel strip of symbol names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReelStrip {
    symbols: Vec<String>,
}

impl ReelStrip {
    pub fn new(symbols: Vec<String>) -> Self {
        Self { symbols }
    }

    pub fn from_names(names: &[&str]) -> Self {
        Self {
            symbols: names.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Symbol at a position (wraps around)
    #[inline]
    pub fn symbol_at(&self, position: usize) -> &str {
        &self.symbols[position % self.symbols.len()]
    }

    /// Position `offset` steps before `position`, wrapping
    #[inline]
    pub fn wrap_back(&self, position: usize, offset: usize) -> usize {
        let len = self.symbols.len();
        (position % len + len - offset % len) % len
    }

    /// Indices whose symbol satisfies `predicate`
    pub fn positions_where(&self, mut predicate: impl FnMut(&str) -> bool) -> Vec<usize> {
        self.symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| predicate(s))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distribution::WeightTable;
    use crate::presets;
    use rand::SeedableRng;

    #[test]
    fn test_attribute_truthiness() {
        let mut sym = Symbol::new("W").with_attribute(AttributeKey::Wild, AttributeValue::Flag(true));
        assert!(sym.is_wild());
        sym.set_attribute(AttributeKey::Wild, AttributeValue::Flag(false));
        assert!(!sym.is_wild());
        sym.set_multiplier(0);
        // Int(0) is present and not a false flag
        assert!(sym.check_attribute(&AttributeKey::Multiplier));
        assert_eq!(sym.enhancing_multiplier(), None);
        sym.set_multiplier(3);
        assert_eq!(sym.enhancing_multiplier(), Some(3.0));
    }

    #[test]
    fn test_factory_templates_follow_config() {
        let config = presets::lines_5x3();
        let factory = SymbolFactory::from_config(&config);
        let wild = factory.template("W").unwrap();
        assert!(wild.is_wild());
        assert!(wild.is_paying());
        let scatter = factory.template("S").unwrap();
        assert!(scatter.is_scatter());
        assert!(!scatter.is_paying());
        assert!(scatter.has_category("scatter"));
    }

    #[test]
    fn test_unregistered_symbol_is_config_error() {
        let config = presets::lines_5x3();
        let factory = SymbolFactory::from_config(&config);
        match factory.template("NOPE") {
            Err(SimError::UnregisteredSymbol { name, registered }) => {
                assert_eq!(name, "NOPE");
                assert!(registered.contains(&"H1".to_string()));
                let mut sorted = registered.clone();
                sorted.sort();
                assert_eq!(sorted, registered);
            }
            other => panic!("expected UnregisteredSymbol, got {other:?}"),
        }
    }

    #[test]
    fn test_initializers_run_on_create() {
        let config = presets::lines_5x3();
        let mut factory = SymbolFactory::from_config(&config);
        factory.register("W", multiplier_from_conditions(true)).unwrap();

        let mut conditions = Conditions::default();
        conditions
            .mult_values
            .insert(GameType::FreeGame, WeightTable::new().with(4, 1.0));
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let mut ctx = SymbolContext {
            rng: &mut rng,
            conditions: &conditions,
            game_type: GameType::BaseGame,
        };
        assert_eq!(factory.create("W", &mut ctx).unwrap().multiplier(), None);

        ctx.game_type = GameType::FreeGame;
        let wild = factory.create("W", &mut ctx).unwrap();
        assert_eq!(wild.multiplier(), Some(4.0));
        assert_eq!(wild.to_view().multiplier, Some(4));
    }

    #[test]
    fn test_prize_initializer_requires_values() {
        let config = presets::expanding_wilds_5x5();
        let mut factory = SymbolFactory::from_config(&config);
        factory.register("P", prize_from_conditions()).unwrap();
        let conditions = Conditions::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut ctx = SymbolContext {
            rng: &mut rng,
            conditions: &conditions,
            game_type: GameType::BaseGame,
        };
        assert!(matches!(
            factory.create("P", &mut ctx),
            Err(SimError::GameConfig(_))
        ));
    }

    #[test]
    fn test_register_unknown_name_fails() {
        let config = presets::lines_5x3();
        let mut factory = SymbolFactory::from_config(&config);
        assert!(factory.register("Q9", prize_from_conditions()).is_err());
    }

    #[test]
    fn test_strip_wraps() {
        let strip = ReelStrip::from_names(&["A", "B", "C"]);
        assert_eq!(strip.symbol_at(4), "B");
        assert_eq!(strip.wrap_back(0, 1), 2);
        assert_eq!(strip.wrap_back(1, 4), 0);
        assert_eq!(strip.positions_where(|s| s == "C"), vec![2]);
    }
}
