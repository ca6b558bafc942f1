//! # rf-slot-lab: ReelForge slot engine
//!
//! Simulates betting rounds of a configured slot game and writes each one
//! down as an [`rf_book::Book`]. Rounds are deterministic: simulation `n`
//! always seeds its RNG with `n + 1`.
//!
//! ## Architecture
//!
//! ```text
//! GameConfig (JSON / YAML / presets)
//!     │
//!     ├── SymbolFactory ── templates + initializers (multiplier, prize)
//!     ├── BoardGenerator ── random / forced / anticipation
//!     ├── PayoutStrategy ── lines | ways | cluster | scatter
//!     └── GameHooks ─────── standard | cluster grid | scatter tumble | expanding wilds
//!           │
//!           v
//!     GameEngine::run_round(sim, criteria)
//!         reset ─► base spin ─► tumbles ─► free spins ─► settle ─► repeat?
//!           │
//!           v
//!     RoundOutcome { Book, attempts } + ForceLedger + WinManager totals
//! ```

pub mod board;
pub mod config;
pub mod distribution;
pub mod emit;
pub mod engine;
pub mod evaluate;
pub mod games;
pub mod paytable;
pub mod presets;
pub mod state;
pub mod symbols;
pub mod tumble;
pub mod wins;

pub use board::*;
pub use config::*;
pub use distribution::*;
pub use engine::*;
pub use evaluate::*;
pub use games::*;
pub use paytable::*;
pub use state::*;
pub use symbols::*;
pub use tumble::*;
pub use wins::*;
