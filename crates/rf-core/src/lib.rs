//! rf-core: Shared types for the ReelForge slot simulator
//!
//! Everything the engine, event log and batch runner agree on:
//! board coordinates, game phases, currency rounding and the error type.

mod error;
mod game_type;
mod money;
mod position;

pub use error::*;
pub use game_type::*;
pub use money::*;
pub use position::*;
