//! Weighted random draws
//!
//! Every random choice the engine makes from configuration (reel strip,
//! scatter count, multiplier value, prize value) goes through a
//! [`WeightTable`]. Keys live in a `BTreeMap`, so iteration order and
//! therefore draw results depend only on the RNG stream.

use std::collections::BTreeMap;

use rand::Rng;
use rf_core::{SimError, SimResult};
use serde::{Deserialize, Serialize};

/// Value → weight map with roulette-wheel selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable<T: Ord> {
    weights: BTreeMap<T, f64>,
}

impl<T: Ord> Default for WeightTable<T> {
    fn default() -> Self {
        Self {
            weights: BTreeMap::new(),
        }
    }
}

impl<T: Ord + Clone> WeightTable<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder pattern)
    pub fn with(mut self, value: T, weight: f64) -> Self {
        self.weights.insert(value, weight);
        self
    }

    pub fn insert(&mut self, value: T, weight: f64) {
        self.weights.insert(value, weight);
    }

    pub fn total(&self) -> f64 {
        self.weights.values().sum()
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn contains(&self, value: &T) -> bool {
        self.weights.contains_key(value)
    }

    pub fn weight(&self, value: &T) -> Option<f64> {
        self.weights.get(value).copied()
    }

    /// Values in key order
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.weights.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&T, f64)> {
        self.weights.iter().map(|(v, w)| (v, *w))
    }

    /// Smallest value with a positive weight
    pub fn min_value(&self) -> Option<&T> {
        self.weights.iter().find(|(_, w)| **w > 0.0).map(|(v, _)| v)
    }

    /// Roulette-wheel draw
    ///
    /// `roll` is uniform in `[0, total)`; the first value whose cumulative
    /// weight exceeds the roll is returned.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> SimResult<T> {
        let total = self.total();
        if total <= 0.0 || !total.is_finite() {
            return Err(SimError::Simulation(format!(
                "weighted draw from a table with total weight {total}"
            )));
        }
        let roll = rng.random::<f64>() * total;
        let mut cumulative = 0.0;
        let mut last_positive = None;
        for (value, weight) in &self.weights {
            if *weight <= 0.0 {
                continue;
            }
            cumulative += weight;
            if cumulative > roll {
                return Ok(value.clone());
            }
            last_positive = Some(value);
        }
        // Rounding can leave the roll a hair above the final cumulative sum
        last_positive
            .cloned()
            .ok_or_else(|| SimError::Simulation("weighted draw found no positive weight".into()))
    }

    /// Check weights are finite, non-negative and not all zero
    pub fn validate(&self, what: &str) -> Result<(), String> {
        if self.weights.is_empty() {
            return Err(format!("{what}: empty weight table"));
        }
        if self.weights.values().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(format!("{what}: weights must be finite and non-negative"));
        }
        if self.total() <= 0.0 {
            return Err(format!("{what}: total weight must be positive"));
        }
        Ok(())
    }
}

impl<T: Ord> FromIterator<(T, f64)> for WeightTable<T> {
    fn from_iter<I: IntoIterator<Item = (T, f64)>>(iter: I) -> Self {
        Self {
            weights: iter.into_iter().collect(),
        }
    }
}

/// Roulette-wheel pick over a slice of weights, returning the index
///
/// Returns `None` when no weight is positive.
pub fn weighted_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }
    let roll = rng.random::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last = None;
    for (index, weight) in weights.iter().enumerate() {
        if *weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        if cumulative > roll {
            return Some(index);
        }
        last = Some(index);
    }
    last
}
