//! Force records: tagged counters of which rounds matched a description
//!
//! Hooks and evaluators describe notable outcomes ("free spins from 4
//! scatters") as string maps. The ledger de-duplicates them per book and
//! counts occurrences; downstream optimisation consumes the result.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Canonical description: keys sorted, values stringified
pub type ForceKey = BTreeMap<String, String>;

/// Build a force key from displayable pairs
pub fn force_key<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> ForceKey
where
    K: ToString,
    V: ToString,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Occurrences of one description
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceEntry {
    pub times_triggered: u64,
    pub book_ids: Vec<u64>,
}

/// Flattened ledger row for output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceRecord {
    pub search: Vec<ForceOption>,
    pub times_triggered: u64,
    pub book_ids: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForceOption {
    pub name: String,
    pub value: String,
}

/// Accumulated force records for a bet mode
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForceLedger {
    entries: BTreeMap<ForceKey, ForceEntry>,
    force_keys: BTreeSet<String>,
}

impl ForceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit the descriptions recorded during one accepted round
    pub fn imprint(&mut self, book_id: u64, descriptions: &[ForceKey]) {
        for description in descriptions {
            match self.entries.get_mut(description) {
                Some(entry) => {
                    if !entry.book_ids.contains(&book_id) {
                        entry.times_triggered += 1;
                        entry.book_ids.push(book_id);
                    }
                }
                None => {
                    self.force_keys.extend(description.keys().cloned());
                    self.entries.insert(
                        description.clone(),
                        ForceEntry {
                            times_triggered: 1,
                            book_ids: vec![book_id],
                        },
                    );
                }
            }
        }
    }

    /// Fold another worker's ledger into this one
    pub fn merge(&mut self, other: ForceLedger) {
        self.force_keys.extend(other.force_keys);
        for (key, entry) in other.entries {
            let target = self.entries.entry(key).or_default();
            for id in entry.book_ids {
                if !target.book_ids.contains(&id) {
                    target.book_ids.push(id);
                    target.times_triggered += 1;
                }
            }
        }
        for entry in self.entries.values_mut() {
            entry.book_ids.sort_unstable();
        }
    }

    pub fn get(&self, key: &ForceKey) -> Option<&ForceEntry> {
        self.entries.get(key)
    }

    /// Every description key name seen so far, sorted
    pub fn force_keys(&self) -> impl Iterator<Item = &str> {
        self.force_keys.iter().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Output rows in key order
    pub fn records(&self) -> Vec<ForceRecord> {
        self.entries
            .iter()
            .map(|(key, entry)| ForceRecord {
                search: key
                    .iter()
                    .map(|(name, value)| ForceOption {
                        name: name.clone(),
                        value: value.clone(),
                    })
                    .collect(),
                times_triggered: entry.times_triggered,
                book_ids: entry.book_ids.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trigger(kind: u32) -> ForceKey {
        force_key([
            ("kind", kind.to_string()),
            ("symbol", "scatter".to_string()),
            ("gametype", "basegame".to_string()),
        ])
    }

    #[test]
    fn test_dedupe_within_book() {
        let mut ledger = ForceLedger::new();
        ledger.imprint(1, &[trigger(4), trigger(4)]);
        ledger.imprint(2, &[trigger(4), trigger(5)]);

        let four = ledger.get(&trigger(4)).unwrap();
        assert_eq!(four.times_triggered, 2);
        assert_eq!(four.book_ids, vec![1, 2]);
        assert_eq!(ledger.get(&trigger(5)).unwrap().times_triggered, 1);
        assert_eq!(
            ledger.force_keys().collect::<Vec<_>>(),
            vec!["gametype", "kind", "symbol"]
        );
    }

    #[test]
    fn test_merge_sums_workers() {
        let mut a = ForceLedger::new();
        a.imprint(3, &[trigger(4)]);
        let mut b = ForceLedger::new();
        b.imprint(1, &[trigger(4)]);
        b.imprint(2, &[trigger(5)]);

        a.merge(b);
        let four = a.get(&trigger(4)).unwrap();
        assert_eq!(four.times_triggered, 2);
        assert_eq!(four.book_ids, vec![1, 3]);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_records_are_sorted_options() {
        let mut ledger = ForceLedger::new();
        ledger.imprint(1, &[trigger(3)]);
        let records = ledger.records();
        assert_eq!(records.len(), 1);
        let names: Vec<_> = records[0].search.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["gametype", "kind", "symbol"]);
    }
}
