//! Win levels: client celebration tiers keyed by payout size

use std::collections::BTreeMap;

use rf_core::{SimError, SimResult};
use serde::{Deserialize, Serialize};

/// Lower bounds (in bet multiples) of the tiers after the first
const STANDARD_BOUNDS: [f64; 8] = [0.1, 1.0, 2.0, 5.0, 15.0, 30.0, 50.0, 100.0];
const END_FEATURE_BOUNDS: [f64; 8] = [1.0, 5.0, 10.0, 20.0, 50.0, 100.0, 500.0, 2000.0];

pub const STANDARD: &str = "standard";
pub const END_FEATURE: &str = "endFeature";

/// Named tier tables
///
/// Each table is an ascending list of tier lower bounds starting at 0. The last
/// bound is the win cap, so a capped win always lands in the top tier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinLevels {
    tables: BTreeMap<String, Vec<f64>>,
}

impl WinLevels {
    /// Default `standard` and `endFeature` tables for a win cap
    pub fn defaults(win_cap: f64) -> Self {
        let mut tables = BTreeMap::new();
        tables.insert(STANDARD.to_string(), Self::bounds(&STANDARD_BOUNDS, win_cap));
        tables.insert(END_FEATURE.to_string(), Self::bounds(&END_FEATURE_BOUNDS, win_cap));
        Self { tables }
    }

    fn bounds(inner: &[f64], win_cap: f64) -> Vec<f64> {
        let mut bounds = Vec::with_capacity(inner.len() + 2);
        bounds.push(0.0);
        bounds.extend(inner.iter().copied().filter(|b| *b < win_cap));
        bounds.push(win_cap);
        bounds
    }

    /// Add or replace a table (builder pattern)
    pub fn with_table(mut self, name: impl Into<String>, bounds: Vec<f64>) -> SimResult<Self> {
        let name = name.into();
        if bounds.first() != Some(&0.0) || bounds.windows(2).any(|w| w[0] >= w[1]) {
            return Err(SimError::GameConfig(format!(
                "win level table '{name}' must start at 0 and be strictly ascending"
            )));
        }
        self.tables.insert(name, bounds);
        Ok(self)
    }

    /// 1-based tier of `amount` in table `key`
    pub fn level(&self, key: &str, amount: f64) -> SimResult<u32> {
        let bounds = self
            .tables
            .get(key)
            .ok_or_else(|| SimError::Event(format!("unknown win level table '{key}'")))?;
        let level = bounds.iter().take_while(|b| **b <= amount).count();
        Ok(level.max(1) as u32)
    }

    pub fn table(&self, key: &str) -> Option<&[f64]> {
        self.tables.get(key).map(|v| v.as_slice())
    }
}
