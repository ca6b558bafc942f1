//! Book: the complete event record of one accepted simulation round

use rf_core::{SimError, SimResult, to_cents};
use serde::{Deserialize, Serialize};

use crate::event::{Event, EventKind};
use crate::filter::EventFilter;

/// Ordered, append-only event log for one round plus its settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Simulation index + 1
    pub id: u64,

    /// Distribution criteria this round was drawn under
    pub criteria: String,

    /// Final capped payout, in bet multiples
    pub payout_multiplier: f64,

    pub base_game_wins: f64,

    pub free_game_wins: f64,

    /// All events in emission order
    pub events: Vec<Event>,

    #[serde(skip)]
    filter: EventFilter,
}

impl Book {
    /// Create a new empty book
    pub fn new(id: u64, criteria: impl Into<String>) -> Self {
        Self {
            id,
            criteria: criteria.into(),
            payout_multiplier: 0.0,
            base_game_wins: 0.0,
            free_game_wins: 0.0,
            events: Vec::new(),
            filter: EventFilter::default(),
        }
    }

    /// Apply an emission filter (builder pattern)
    pub fn with_filter(mut self, filter: EventFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// Clear for reuse by the next attempt, keeping the allocation and filter
    pub fn reset(&mut self, id: u64, criteria: &str) {
        self.id = id;
        self.criteria.clear();
        self.criteria.push_str(criteria);
        self.payout_multiplier = 0.0;
        self.base_game_wins = 0.0;
        self.free_game_wins = 0.0;
        self.events.clear();
    }

    /// Append an event, assigning `index = events.len()`
    ///
    /// Returns the assigned index, or `None` when the filter dropped the event.
    pub fn add_event(&mut self, kind: EventKind) -> SimResult<Option<usize>> {
        kind.validate().map_err(SimError::Event)?;
        if !self.filter.should_include(&kind) {
            return Ok(None);
        }
        let index = self.events.len();
        self.events.push(Event::new(index, kind));
        Ok(Some(index))
    }

    /// Attach a late-known field to an already recorded event
    pub fn patch(&mut self, index: usize, key: impl Into<String>, value: serde_json::Value) -> SimResult<()> {
        let len = self.events.len();
        let event = self
            .events
            .get_mut(index)
            .ok_or_else(|| SimError::Event(format!("patch index {index} out of range ({len} events)")))?;
        event.extra.insert(key.into(), value);
        Ok(())
    }

    /// Record settlement values
    pub fn settle(&mut self, payout_multiplier: f64, base_game_wins: f64, free_game_wins: f64) {
        self.payout_multiplier = payout_multiplier;
        self.base_game_wins = base_game_wins;
        self.free_game_wins = free_game_wins;
    }

    /// Final payout in cents
    pub fn payout_cents(&self) -> u64 {
        to_cents(self.payout_multiplier)
    }

    /// Get events by type name
    pub fn events_by_type(&self, type_name: &str) -> Vec<&Event> {
        self.events.iter().filter(|e| e.type_name() == type_name).collect()
    }

    /// Check if the book contains an event type
    pub fn has_event(&self, type_name: &str) -> bool {
        self.events.iter().any(|e| e.type_name() == type_name)
    }

    pub fn last_event(&self) -> Option<&Event> {
        self.events.last()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Verbosity;

    fn sample_book() -> Book {
        let mut book = Book::new(7, "basegame");
        book.add_event(EventKind::SetTotalWin { amount: 0 }).unwrap();
        book.add_event(EventKind::UpdateFreeSpins { amount: 1, total: 8 })
            .unwrap();
        book.add_event(EventKind::SetFinalWin { amount: 250 }).unwrap();
        book.settle(2.5, 2.5, 0.0);
        book
    }

    #[test]
    fn test_indices_are_dense() {
        let book = sample_book();
        let indices: Vec<usize> = book.events.iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(book.payout_cents(), 250);
    }

    #[test]
    fn test_filtered_events_do_not_consume_indices() {
        let filter = EventFilter {
            verbosity: Verbosity::Standard,
            ..Default::default()
        };
        let mut book = Book::new(1, "0").with_filter(filter);
        assert_eq!(book.add_event(EventKind::SetTotalWin { amount: 0 }).unwrap(), Some(0));
        assert_eq!(
            book.add_event(EventKind::UpdateFreeSpins { amount: 1, total: 8 })
                .unwrap(),
            None
        );
        assert_eq!(book.add_event(EventKind::SetFinalWin { amount: 0 }).unwrap(), Some(1));
    }

    #[test]
    fn test_patch_in_place() {
        let mut book = sample_book();
        book.patch(1, "reason", serde_json::json!("retrigger")).unwrap();
        assert_eq!(book.events[1].extra["reason"], "retrigger");
        assert!(book.patch(9, "x", serde_json::json!(1)).is_err());
    }

    #[test]
    fn test_malformed_event_rejected() {
        let mut book = Book::new(1, "0");
        let result = book.add_event(EventKind::RetriggerFreeSpins {
            total: 0,
            positions: vec![],
        });
        assert!(matches!(result, Err(SimError::Event(_))));
        assert!(book.is_empty());
    }

    #[test]
    fn test_reset_keeps_filter() {
        let filter = EventFilter {
            verbosity: Verbosity::Minimal,
            ..Default::default()
        };
        let mut book = sample_book().with_filter(filter.clone());
        book.reset(8, "freegame");
        assert!(book.is_empty());
        assert_eq!(book.id, 8);
        assert_eq!(book.criteria, "freegame");
        assert_eq!(book.payout_multiplier, 0.0);
        assert_eq!(book.filter(), &filter);
    }

    #[test]
    fn test_serde_pass_through_is_identity() {
        let book = sample_book();
        let json = serde_json::to_string(&book).unwrap();
        let back: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
    }
}
