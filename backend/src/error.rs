//! Error types for the relay server
//!
//! Wraps rule violations from the engine and adds the routing and lobby
//! failures that only exist once sessions live in a directory.

use axum::http::StatusCode;
use draughts_engine::{DraughtsError, ParticipantId, SessionId};
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur while relaying a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// Rule or state-machine violation reported by the engine
    #[error(transparent)]
    Rules(#[from] DraughtsError),

    /// No live session under this id (never existed, or already finished)
    #[error("Session {0} not found")]
    SessionNotFound(SessionId),

    #[error("Room code {0} is invalid or expired")]
    RoomNotFound(String),

    #[error("You are already the host of this room")]
    OwnRoom,

    #[error("Participant {0} is not connected")]
    PlayerOffline(ParticipantId),

    #[error("Participant {0} is already searching for a game")]
    AlreadyQueued(ParticipantId),

    #[error("Participant {0} is already playing")]
    AlreadyInSession(ParticipantId),

    #[error("Invitation {0} not found")]
    InvitationNotFound(Uuid),

    #[error("A participant cannot play against themselves")]
    SelfPairing,

    #[error("Participant {0} already plays in this game")]
    SpectatingOwnGame(ParticipantId),

    /// Client sent a message only the server may emit
    #[error("Unexpected {0} packet from client")]
    UnexpectedPacket(&'static str),
}

impl RelayError {
    /// Stable machine-readable error name for clients
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Rules(err) => match err {
                DraughtsError::InvalidCoordinate { .. } => "invalid_coordinate",
                DraughtsError::WrongTurn { .. } => "wrong_turn",
                DraughtsError::IllegalMove => "illegal_move",
                DraughtsError::SessionFinished => "session_finished",
                DraughtsError::NotAParticipant { .. } => "not_a_participant",
                DraughtsError::NoDrawOffer => "no_draw_offer",
            },
            RelayError::SessionNotFound(_) => "session_not_found",
            RelayError::RoomNotFound(_) => "room_not_found",
            RelayError::OwnRoom => "own_room",
            RelayError::PlayerOffline(_) => "player_offline",
            RelayError::AlreadyQueued(_) => "already_queued",
            RelayError::AlreadyInSession(_) => "already_in_session",
            RelayError::InvitationNotFound(_) => "invitation_not_found",
            RelayError::SelfPairing => "self_pairing",
            RelayError::SpectatingOwnGame(_) => "spectating_own_game",
            RelayError::UnexpectedPacket(_) => "unexpected_packet",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::Rules(err) => match err {
                DraughtsError::InvalidCoordinate { .. } | DraughtsError::IllegalMove => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                DraughtsError::NotAParticipant { .. } => StatusCode::FORBIDDEN,
                DraughtsError::WrongTurn { .. }
                | DraughtsError::SessionFinished
                | DraughtsError::NoDrawOffer => StatusCode::CONFLICT,
            },
            RelayError::SessionNotFound(_)
            | RelayError::RoomNotFound(_)
            | RelayError::InvitationNotFound(_)
            | RelayError::PlayerOffline(_) => StatusCode::NOT_FOUND,
            RelayError::AlreadyQueued(_)
            | RelayError::AlreadyInSession(_)
            | RelayError::SpectatingOwnGame(_) => StatusCode::CONFLICT,
            RelayError::OwnRoom | RelayError::SelfPairing | RelayError::UnexpectedPacket(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;
    use draughts_engine::Side;

    #[test]
    fn test_engine_errors_keep_their_message() {
        let err = RelayError::from(DraughtsError::WrongTurn {
            expected: Side::White,
        });
        assert_eq!(err.to_string(), "Not your turn: White to move");
        assert_eq!(err.kind(), "wrong_turn");
        assert_eq!(err.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_routing_errors_are_not_found() {
        let err = RelayError::SessionNotFound(SessionId::new());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.kind(), "session_not_found");
    }

    #[test]
    fn test_illegal_move_is_unprocessable() {
        let err = RelayError::from(DraughtsError::IllegalMove);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
