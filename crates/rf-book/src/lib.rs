//! # rf-book: ReelForge round event log
//!
//! A simulated round produces one [`Book`]: the capped payout multiplier, the
//! base/free split, and an ordered list of [`Event`]s a client can replay.
//!
//! ## Flow
//!
//! ```text
//! engine ──EventKind──▶ Book::add_event ──EventFilter──▶ events[index]
//!                              │
//!                              └── settle(payout, base, free)
//! ```
//!
//! Force records ([`ForceLedger`]) and win-level tables ([`WinLevels`]) live
//! here as well since both are consumed alongside books downstream.

pub mod book;
pub mod event;
pub mod filter;
pub mod record;
pub mod win_level;

pub use book::*;
pub use event::*;
pub use filter::*;
pub use record::*;
pub use win_level::*;
