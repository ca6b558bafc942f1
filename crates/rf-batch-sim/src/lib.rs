//! rf-batch-sim: parallel batch simulation for ReelForge slot games
//!
//! Splits a bet mode's simulation count across its distribution criteria,
//! hands contiguous index ranges to a rayon pool of independent engines and
//! merges what comes back into one sorted library of books.
//!
//! ```text
//! ┌──────────────┐    ┌───────────────┐    ┌──────────────────────┐
//! │ allocation   │───►│ runner        │───►│ stats                │
//! │ quota splits │    │ rayon workers │    │ lookup, pay split,   │
//! │ index ranges │    │ merge         │    │ RTP summary          │
//! └──────────────┘    └───────────────┘    └──────────────────────┘
//! ```

pub mod allocation;
pub mod runner;
pub mod stats;

pub use allocation::*;
pub use runner::*;
pub use stats::*;
