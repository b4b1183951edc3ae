//! Error types for the draughts engine
//!
//! Every variant is recoverable: it is reported to the caller that caused it
//! and never mutates a board or ends a session.

use thiserror::Error;

use crate::types::Side;

/// Errors that can occur in the draughts engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraughtsError {
    /// Coordinate out of the 0-9 range or on a light (non-playable) square
    #[error("Invalid coordinate ({row}, {col}): must be a dark square within 0-9")]
    InvalidCoordinate { row: u8, col: u8 },

    /// Submitter is not the side to move
    #[error("Not your turn: {expected:?} to move")]
    WrongTurn { expected: Side },

    /// Move is not in the current legal move set
    #[error("Illegal move")]
    IllegalMove,

    /// Session already reached a terminal result
    #[error("Session is finished")]
    SessionFinished,

    /// Participant does not play in this session
    #[error("Participant {participant} is not part of this session")]
    NotAParticipant { participant: String },

    /// Draw acceptance without a pending offer from the opponent
    #[error("No draw offer to accept")]
    NoDrawOffer,
}

/// Result type alias for draughts engine operations
pub type DraughtsResult<T> = Result<T, DraughtsError>;
