//! Public API for the draughts engine
//!
//! Provides the pure functions the match session and the relay server build on.
//!
//! ## Module Organization
//!
//! - `moves` - Move application (relocation, capture removal, promotion)
//! - `state` - Terminal detection and random move selection for bots

mod moves;
mod state;

pub use moves::apply_move;
pub use state::{random_move, terminal, Terminal, WinReason};
