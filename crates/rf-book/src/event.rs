//! Event: one client-replayable step of a simulated round
//!
//! Every event carries a dense `index` (its position in the book) and a
//! `type` discriminator. Amounts are integer cents of the bet, already capped.

use std::collections::BTreeMap;

use rf_core::Position;
use serde::{Deserialize, Serialize};

/// A recorded event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Position in the owning book
    pub index: usize,

    /// Typed payload, serialized inline with its `type` tag
    #[serde(flatten)]
    pub kind: EventKind,

    /// Late-known fields patched in after append
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Event {
    pub fn new(index: usize, kind: EventKind) -> Self {
        Self {
            index,
            kind,
            extra: BTreeMap::new(),
        }
    }

    /// Get event type name
    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PAYLOAD PIECES
// ═══════════════════════════════════════════════════════════════════════════

/// Client view of a symbol: its name plus the special attributes it carries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SymbolView {
    pub name: String,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub wild: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub scatter: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<u32>,

    /// Prize in cents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prize: Option<u64>,
}

impl SymbolView {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// One scoring unit inside a `win` event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinDetail {
    pub symbol: String,
    /// Line length, ways kind, cluster size or scatter count
    pub count: u32,
    /// Win in cents, capped
    pub amount: u64,
    pub positions: Vec<Position>,
    /// Win before any multiplier, in cents
    pub base_amount: u64,
    /// Global multiplier in effect
    pub multiplier: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ways: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_multiplier: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay: Option<Position>,
}

/// A wild that expands over its whole reel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExpandingWild {
    pub reel: usize,
    pub row: usize,
    pub multiplier: u32,
}

/// A prize cell (sticky symbols, prize payouts); prize in cents
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrizeCell {
    pub reel: usize,
    pub row: usize,
    pub prize: u64,
}

/// A multiplier symbol contributing to an end-of-spin board multiplier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplierCell {
    pub reel: usize,
    pub row: usize,
    pub value: u32,
}

// ═══════════════════════════════════════════════════════════════════════════
// EVENT KIND
// ═══════════════════════════════════════════════════════════════════════════

/// Event payload, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EventKind {
    // ═══════════════════════════════════════════════════════════════════════
    // BOARD
    // ═══════════════════════════════════════════════════════════════════════
    /// Board shown to the player (reel-major, padding rows included when enabled)
    Reveal {
        board: Vec<Vec<SymbolView>>,
        game_type: String,
        anticipation: Vec<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        padding_positions: Option<Vec<usize>>,
    },

    /// Winning cells removed and replacements dropped in
    Tumble {
        new_symbols: Vec<Vec<SymbolView>>,
        exploding_symbols: Vec<Position>,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // WINS
    // ═══════════════════════════════════════════════════════════════════════
    Win {
        amount: u64,
        total_amount: u64,
        details: Vec<WinDetail>,
    },

    SetWin {
        amount: u64,
        win_level: u32,
    },

    SetTotalWin {
        amount: u64,
    },

    SetFinalWin {
        amount: u64,
    },

    WinCap {
        amount: u64,
    },

    SetTumbleWin {
        amount: u64,
    },

    UpdateTumbleWin {
        amount: u64,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // FREE SPINS
    // ═══════════════════════════════════════════════════════════════════════
    TriggerFreeSpins {
        total: u32,
        positions: Vec<Position>,
    },

    RetriggerFreeSpins {
        total: u32,
        positions: Vec<Position>,
    },

    UpdateFreeSpins {
        amount: u32,
        total: u32,
    },

    EndFreeSpins {
        amount: u64,
        win_level: u32,
    },

    // ═══════════════════════════════════════════════════════════════════════
    // SPECIAL SYMBOLS
    // ═══════════════════════════════════════════════════════════════════════
    UpdateGlobalMultiplier {
        global_multiplier: f64,
    },

    /// Grid position multipliers after a winning evaluation
    UpdateBoardMultiplier {
        board_multipliers: Vec<Vec<u32>>,
    },

    /// Multiplier symbols applied to a finished spin
    BoardMultiplierInfo {
        positions: Vec<MultiplierCell>,
        board_multiplier: u32,
        base_win: u64,
        total_win: u64,
    },

    Upgrade {
        symbol: String,
        position: Position,
        from_positions: Vec<Position>,
    },

    RevealExpandingWilds {
        new_wilds: Vec<ExpandingWild>,
    },

    UpdateExpandingWilds {
        existing_wilds: Vec<ExpandingWild>,
    },

    AddStickySymbols {
        new_prizes: Vec<PrizeCell>,
    },

    PrizeWinInfo {
        total_win: u64,
        wins: Vec<PrizeCell>,
    },
}

impl EventKind {
    /// Get the serialized `type` string
    pub fn type_name(&self) -> &'static str {
        match self {
            EventKind::Reveal { .. } => "reveal",
            EventKind::Tumble { .. } => "tumble",
            EventKind::Win { .. } => "win",
            EventKind::SetWin { .. } => "setWin",
            EventKind::SetTotalWin { .. } => "setTotalWin",
            EventKind::SetFinalWin { .. } => "setFinalWin",
            EventKind::WinCap { .. } => "winCap",
            EventKind::SetTumbleWin { .. } => "setTumbleWin",
            EventKind::UpdateTumbleWin { .. } => "updateTumbleWin",
            EventKind::TriggerFreeSpins { .. } => "triggerFreeSpins",
            EventKind::RetriggerFreeSpins { .. } => "retriggerFreeSpins",
            EventKind::UpdateFreeSpins { .. } => "updateFreeSpins",
            EventKind::EndFreeSpins { .. } => "endFreeSpins",
            EventKind::UpdateGlobalMultiplier { .. } => "updateGlobalMultiplier",
            EventKind::UpdateBoardMultiplier { .. } => "updateBoardMultiplier",
            EventKind::BoardMultiplierInfo { .. } => "boardMultiplierInfo",
            EventKind::Upgrade { .. } => "upgrade",
            EventKind::RevealExpandingWilds { .. } => "revealExpandingWilds",
            EventKind::UpdateExpandingWilds { .. } => "updateExpandingWilds",
            EventKind::AddStickySymbols { .. } => "addStickySymbols",
            EventKind::PrizeWinInfo { .. } => "prizeWinInfo",
        }
    }

    /// Structural checks applied before an event enters a book
    pub fn validate(&self) -> Result<(), String> {
        match self {
            EventKind::Reveal { board, anticipation, .. } => {
                if board.is_empty() {
                    return Err("reveal with an empty board".into());
                }
                if anticipation.len() != board.len() {
                    return Err(format!(
                        "reveal anticipation has {} entries for {} reels",
                        anticipation.len(),
                        board.len()
                    ));
                }
                Ok(())
            }
            EventKind::TriggerFreeSpins { total, .. } | EventKind::RetriggerFreeSpins { total, .. } => {
                if *total == 0 {
                    Err(format!("{} with zero free spins", self.type_name()))
                } else {
                    Ok(())
                }
            }
            EventKind::Win { details, .. } => {
                if details.iter().any(|d| d.positions.is_empty()) {
                    Err("win detail without positions".into())
                } else {
                    Ok(())
                }
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tag_matches_type_name() {
        let kinds = vec![
            EventKind::SetWin {
                amount: 150,
                win_level: 3,
            },
            EventKind::UpdateFreeSpins { amount: 1, total: 10 },
            EventKind::UpdateGlobalMultiplier {
                global_multiplier: 2.0,
            },
            EventKind::AddStickySymbols { new_prizes: vec![] },
        ];
        for kind in kinds {
            let value = serde_json::to_value(Event::new(0, kind.clone())).unwrap();
            assert_eq!(value["type"], kind.type_name());
        }
    }

    #[test]
    fn test_fields_are_camel_case() {
        let event = Event::new(
            4,
            EventKind::Win {
                amount: 200,
                total_amount: 500,
                details: vec![WinDetail {
                    symbol: "H1".into(),
                    count: 3,
                    amount: 200,
                    positions: vec![Position::new(0, 1)],
                    base_amount: 200,
                    multiplier: 1.0,
                    line_index: Some(2),
                    ways: None,
                    cluster_multiplier: None,
                    overlay: None,
                }],
            },
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["index"], 4);
        assert_eq!(value["totalAmount"], 500);
        assert_eq!(value["details"][0]["baseAmount"], 200);
        assert_eq!(value["details"][0]["lineIndex"], 2);
        assert!(value["details"][0].get("ways").is_none());
    }

    #[test]
    fn test_event_round_trip() {
        let mut event = Event::new(
            0,
            EventKind::Reveal {
                board: vec![vec![SymbolView::named("H1"), SymbolView {
                    name: "W".into(),
                    wild: true,
                    multiplier: Some(3),
                    ..Default::default()
                }]],
                game_type: "baseGame".into(),
                anticipation: vec![0],
                padding_positions: Some(vec![17]),
            },
        );
        event.extra.insert("note".into(), serde_json::json!("late"));

        let json = serde_json::to_string(&event).unwrap();
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_validate_rejects_zero_trigger() {
        let kind = EventKind::TriggerFreeSpins {
            total: 0,
            positions: vec![],
        };
        assert!(kind.validate().is_err());
    }
}
