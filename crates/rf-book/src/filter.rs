//! Event filtering: emission verbosity control
//!
//! Filtering may drop events that are re-computable from others (running
//! totals) or pure progress counters. Board reveals, win details and the
//! other `Required` events always pass.

use serde::{Deserialize, Serialize};

use crate::event::{Event, EventKind};

/// Filtering class of an event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    /// Needed to replay the round
    Required,
    /// Summary values a client normally shows
    Standard,
    /// Progress counters
    Verbose,
}

/// How many event categories to keep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verbosity {
    #[default]
    Full,
    Standard,
    Minimal,
}

impl Verbosity {
    fn admits(&self, category: EventCategory) -> bool {
        match self {
            Verbosity::Full => true,
            Verbosity::Standard => category != EventCategory::Verbose,
            Verbosity::Minimal => category == EventCategory::Required,
        }
    }
}

/// Emission filter applied when events are appended to a book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventFilter {
    pub verbosity: Verbosity,
    /// Drop `setWin` / `setTotalWin`
    pub skip_derived_wins: bool,
    /// Drop `updateFreeSpins` / `updateTumbleWin`
    pub skip_progress_updates: bool,
}

impl EventFilter {
    /// Keep everything
    pub fn full() -> Self {
        Self::default()
    }

    /// Keep only replay-critical events
    pub fn minimal() -> Self {
        Self {
            verbosity: Verbosity::Minimal,
            skip_derived_wins: true,
            skip_progress_updates: true,
        }
    }

    /// Classify an event payload
    pub fn category(kind: &EventKind) -> EventCategory {
        match kind {
            EventKind::Reveal { .. }
            | EventKind::Win { .. }
            | EventKind::TriggerFreeSpins { .. }
            | EventKind::RetriggerFreeSpins { .. }
            | EventKind::Tumble { .. }
            | EventKind::UpdateGlobalMultiplier { .. }
            | EventKind::UpdateBoardMultiplier { .. }
            | EventKind::BoardMultiplierInfo { .. }
            | EventKind::Upgrade { .. }
            | EventKind::RevealExpandingWilds { .. }
            | EventKind::UpdateExpandingWilds { .. }
            | EventKind::AddStickySymbols { .. }
            | EventKind::PrizeWinInfo { .. } => EventCategory::Required,

            EventKind::SetWin { .. }
            | EventKind::SetTotalWin { .. }
            | EventKind::WinCap { .. }
            | EventKind::EndFreeSpins { .. }
            | EventKind::SetFinalWin { .. } => EventCategory::Standard,

            EventKind::UpdateFreeSpins { .. }
            | EventKind::UpdateTumbleWin { .. }
            | EventKind::SetTumbleWin { .. } => EventCategory::Verbose,
        }
    }

    fn is_derived_win(kind: &EventKind) -> bool {
        matches!(kind, EventKind::SetWin { .. } | EventKind::SetTotalWin { .. })
    }

    fn is_progress_update(kind: &EventKind) -> bool {
        matches!(
            kind,
            EventKind::UpdateFreeSpins { .. } | EventKind::UpdateTumbleWin { .. }
        )
    }

    /// Decide whether an event is emitted
    pub fn should_include(&self, kind: &EventKind) -> bool {
        let category = Self::category(kind);
        if category == EventCategory::Required {
            return true;
        }
        if self.skip_derived_wins && Self::is_derived_win(kind) {
            return false;
        }
        if self.skip_progress_updates && Self::is_progress_update(kind) {
            return false;
        }
        self.verbosity.admits(category)
    }

    /// Filter an already recorded event list, re-indexing the survivors
    pub fn filter_events(&self, events: &[Event]) -> Vec<Event> {
        events
            .iter()
            .filter(|e| self.should_include(&e.kind))
            .enumerate()
            .map(|(index, e)| {
                let mut kept = e.clone();
                kept.index = index;
                kept
            })
            .collect()
    }

    /// Fraction of events this filter would drop
    pub fn reduction(&self, events: &[Event]) -> f64 {
        if events.is_empty() {
            return 0.0;
        }
        let dropped = events.iter().filter(|e| !self.should_include(&e.kind)).count();
        dropped as f64 / events.len() as f64
    }
}
