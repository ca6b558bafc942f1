//! Paytable and payline definitions

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Count column of a paytable entry: exact, or an inclusive range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PayCount {
    Exact(u32),
    Range(u32, u32),
}

/// One configured paytable row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayEntry {
    pub kind: PayCount,
    pub symbol: String,
    pub pay: f64,
}

/// `(count, symbol) → pay` lookup
///
/// Range entries (`kind: [8, 9]`) expand to one key per count, so a cluster of
/// any size inside the range resolves with a single map lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PayEntry>", into = "Vec<PayEntry>")]
pub struct PayTable {
    /// symbol → count → pay
    pays: BTreeMap<String, BTreeMap<u32, f64>>,
}

impl PayTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an exact-count pay (builder pattern)
    pub fn with(mut self, count: u32, symbol: impl Into<String>, pay: f64) -> Self {
        self.insert(count, symbol, pay);
        self
    }

    /// Add one pay for every count in `min..=max` (builder pattern)
    pub fn with_range(mut self, min: u32, max: u32, symbol: impl Into<String>, pay: f64) -> Self {
        let symbol = symbol.into();
        for count in min..=max {
            self.insert(count, symbol.clone(), pay);
        }
        self
    }

    pub fn insert(&mut self, count: u32, symbol: impl Into<String>, pay: f64) {
        self.pays.entry(symbol.into()).or_default().insert(count, pay);
    }

    /// Pay for `count` of `symbol`, if configured
    #[inline]
    pub fn get(&self, count: u32, symbol: &str) -> Option<f64> {
        self.pays.get(symbol)?.get(&count).copied()
    }

    /// Pay or zero
    #[inline]
    pub fn pay_or_zero(&self, count: u32, symbol: &str) -> f64 {
        self.get(count, symbol).unwrap_or(0.0)
    }

    pub fn contains(&self, count: u32, symbol: &str) -> bool {
        self.get(count, symbol).is_some()
    }

    /// Every symbol name that pays something
    pub fn symbols(&self) -> BTreeSet<&str> {
        self.pays.keys().map(|s| s.as_str()).collect()
    }

    pub fn pays_symbol(&self, symbol: &str) -> bool {
        self.pays.contains_key(symbol)
    }

    /// Rows as `(count, symbol, pay)`, symbol-major
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str, f64)> {
        self.pays
            .iter()
            .flat_map(|(s, counts)| counts.iter().map(move |(c, p)| (*c, s.as_str(), *p)))
    }

    pub fn len(&self) -> usize {
        self.pays.values().map(|c| c.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.pays.is_empty()
    }
}

impl TryFrom<Vec<PayEntry>> for PayTable {
    type Error = String;

    fn try_from(entries: Vec<PayEntry>) -> Result<Self, Self::Error> {
        let mut table = PayTable::new();
        for entry in entries {
            match entry.kind {
                PayCount::Exact(count) => table.insert(count, entry.symbol, entry.pay),
                PayCount::Range(min, max) => {
                    if min > max {
                        return Err(format!(
                            "paytable range [{min}, {max}] for '{}' is reversed",
                            entry.symbol
                        ));
                    }
                    table = table.with_range(min, max, entry.symbol, entry.pay);
                }
            }
        }
        Ok(table)
    }
}

impl From<PayTable> for Vec<PayEntry> {
    fn from(table: PayTable) -> Self {
        table
            .pays
            .into_iter()
            .flat_map(|(symbol, counts)| {
                counts.into_iter().map(move |(count, pay)| PayEntry {
                    kind: PayCount::Exact(count),
                    symbol: symbol.clone(),
                    pay,
                })
            })
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PAYLINES
// ═══════════════════════════════════════════════════════════════════════════

/// A payline definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payline {
    /// Payline index as reported in win metadata
    pub index: u32,
    /// Row for each reel (e.g., [0, 1, 2, 1, 0] for a "V" shape)
    pub rows: Vec<usize>,
}

impl Payline {
    pub fn new(index: u32, rows: Vec<usize>) -> Self {
        Self { index, rows }
    }

    /// Create a straight line (same row across all reels)
    pub fn straight(index: u32, row: usize, reel_count: usize) -> Self {
        Self {
            index,
            rows: vec![row; reel_count],
        }
    }

    /// Create a V-shaped line
    pub fn v_shape(index: u32, reel_count: usize) -> Self {
        let mid = reel_count / 2;
        let rows = (0..reel_count)
            .map(|i| if i <= mid { i } else { reel_count - 1 - i })
            .collect();
        Self { index, rows }
    }
}

/// Standard payline patterns for a 5×3 grid
pub fn standard_paylines_5x3() -> Vec<Payline> {
    vec![
        // Straight lines
        Payline::straight(1, 1, 5),
        Payline::straight(2, 0, 5),
        Payline::straight(3, 2, 5),
        // V shapes
        Payline::v_shape(4, 5),
        Payline::new(5, vec![2, 1, 0, 1, 2]),
        // Zigzag
        Payline::new(6, vec![0, 0, 1, 2, 2]),
        Payline::new(7, vec![2, 2, 1, 0, 0]),
        Payline::new(8, vec![1, 0, 0, 0, 1]),
        Payline::new(9, vec![1, 2, 2, 2, 1]),
        // W shapes
        Payline::new(10, vec![0, 1, 0, 1, 0]),
        Payline::new(11, vec![2, 1, 2, 1, 2]),
        Payline::new(12, vec![0, 1, 1, 1, 0]),
        Payline::new(13, vec![2, 1, 1, 1, 2]),
        Payline::new(14, vec![1, 1, 0, 1, 1]),
        Payline::new(15, vec![1, 1, 2, 1, 1]),
        Payline::new(16, vec![0, 2, 0, 2, 0]),
        Payline::new(17, vec![2, 0, 2, 0, 2]),
        Payline::new(18, vec![1, 0, 1, 0, 1]),
        Payline::new(19, vec![1, 2, 1, 2, 1]),
        Payline::new(20, vec![0, 0, 2, 0, 0]),
    ]
}
