//! # Draughts Engine
//!
//! Rules engine for 10x10 international draughts and the match state machine
//! the relay server drives.
//!
//! ## Module Organization
//!
//! - `constants` - Board geometry and diagonal direction vectors
//! - `types` - Sides, ranks, pieces, squares and moves
//! - `board` - The 10x10 grid and the initial position
//! - `move_gen` - Legal move generation under the mandatory maximum capture rule
//! - `api` - Move application, terminal detection and random move selection
//! - `session` - Authoritative match state machine (turns, draws, resignation)
//! - `error` - Error taxonomy shared by the engine and its callers
//!
//! All functions outside `session` are pure and synchronous. A `MatchSession`
//! owns mutable state and must be accessed by one caller at a time.

pub mod api;
pub mod board;
pub mod constants;
pub mod error;
pub mod move_gen;
pub mod session;
pub mod types;

pub use api::{apply_move, random_move, terminal, Terminal, WinReason};
pub use board::Board;
pub use error::{DraughtsError, DraughtsResult};
pub use move_gen::legal_moves;
pub use session::{
    DrawOffer, EndReason, GameOutcome, MatchSession, MatchStatus, MoveRecord, ParticipantId,
    SessionEvent, SessionId, SessionSnapshot,
};
pub use types::{Move, Piece, Rank, Side, Square};
