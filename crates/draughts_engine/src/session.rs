//! # Match Session State Machine
//!
//! A `MatchSession` is the authoritative record of one game between two
//! participants. It owns the board, the side to move and the status, and is
//! the only place those change.
//!
//! ## States
//!
//! ```text
//!            submit_move (not terminal) / offer_draw
//!              +------+
//!              v      |
//!   new --> Active ---+--- submit_move (terminal) --+
//!              |                                    |
//!              +--- resign / disconnect ------------+--> Finished
//!              |                                    |
//!              +--- accept_draw / crossed offers ---+
//! ```
//!
//! `Finished` is absorbing: every operation on a finished session fails with
//! `SessionFinished` and leaves it untouched.
//!
//! ## Validation order for `submit_move`
//!
//! 1. Session must be active (`SessionFinished`)
//! 2. Submitter must play in it (`NotAParticipant`)
//! 3. Submitter's side must be on turn (`WrongTurn`)
//! 4. Move must be exactly one of the current legal moves (`IllegalMove`)
//!
//! A rejected submission never touches the board.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::{apply_move, terminal, Terminal, WinReason};
use crate::board::Board;
use crate::error::{DraughtsError, DraughtsResult};
use crate::move_gen::legal_moves;
use crate::types::{Move, Side};

/// Opaque identifier of one match session
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        SessionId::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of a player as established by the surrounding login layer
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        ParticipantId(id.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        ParticipantId(id)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Active,
    Finished,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    NoPieces,
    Blocked,
    Resignation,
    Disconnect,
    DrawAgreed,
}

impl From<WinReason> for EndReason {
    fn from(reason: WinReason) -> Self {
        match reason {
            WinReason::NoPieces => EndReason::NoPieces,
            WinReason::Blocked => EndReason::Blocked,
        }
    }
}

/// Final result of a session. `winner` is `None` for a draw.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub winner: Option<Side>,
    pub reason: EndReason,
}

/// One entry of the chronological move log
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub side: Side,
    #[serde(rename = "move")]
    pub mv: Move,
    pub played_at: DateTime<Utc>,
}

/// What an accepted move produced
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEvent {
    /// Game goes on with `to_move` on turn
    Continued {
        #[serde(rename = "move")]
        mv: Move,
        board: Board,
        to_move: Side,
    },
    /// The move ended the game
    Finished {
        #[serde(rename = "move")]
        mv: Move,
        board: Board,
        outcome: GameOutcome,
    },
}

/// Result of a draw offer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DrawOffer {
    /// Offer recorded, waiting for the opponent
    Pending { by: Side },
    /// The opponent had already offered; the game is drawn
    Agreed { outcome: GameOutcome },
}

/// Serializable view of a session for clients
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub red: ParticipantId,
    pub white: ParticipantId,
    pub board: Board,
    pub to_move: Side,
    pub status: MatchStatus,
    pub outcome: Option<GameOutcome>,
    pub draw_offer: Option<Side>,
    pub moves: Vec<MoveRecord>,
    pub created_at: DateTime<Utc>,
    pub last_move_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug)]
pub struct MatchSession {
    id: SessionId,
    red: ParticipantId,
    white: ParticipantId,
    board: Board,
    to_move: Side,
    status: MatchStatus,
    outcome: Option<GameOutcome>,
    draw_offer: Option<Side>,
    log: Vec<MoveRecord>,
    created_at: DateTime<Utc>,
    last_move_at: Option<DateTime<Utc>>,
}

impl MatchSession {
    /// Start a game from the initial position with RED to move
    pub fn new(id: SessionId, red: ParticipantId, white: ParticipantId) -> Self {
        Self::with_position(id, red, white, Board::initial(), Side::Red)
    }

    /// Start a game from an arbitrary position, for puzzles and tests
    pub fn with_position(
        id: SessionId,
        red: ParticipantId,
        white: ParticipantId,
        board: Board,
        to_move: Side,
    ) -> Self {
        MatchSession {
            id,
            red,
            white,
            board,
            to_move,
            status: MatchStatus::Active,
            outcome: None,
            draw_offer: None,
            log: Vec::new(),
            created_at: Utc::now(),
            last_move_at: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn to_move(&self) -> Side {
        self.to_move
    }

    pub fn status(&self) -> MatchStatus {
        self.status
    }

    pub fn outcome(&self) -> Option<GameOutcome> {
        self.outcome
    }

    pub fn move_log(&self) -> &[MoveRecord] {
        &self.log
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    pub fn participant(&self, side: Side) -> &ParticipantId {
        match side {
            Side::Red => &self.red,
            Side::White => &self.white,
        }
    }

    pub fn participants(&self) -> [&ParticipantId; 2] {
        [&self.red, &self.white]
    }

    /// Side assigned to `participant`
    pub fn side_of(&self, participant: &ParticipantId) -> DraughtsResult<Side> {
        if *participant == self.red {
            Ok(Side::Red)
        } else if *participant == self.white {
            Ok(Side::White)
        } else {
            Err(DraughtsError::NotAParticipant {
                participant: participant.to_string(),
            })
        }
    }

    /// Legal moves for the side on turn; empty once finished
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_finished() {
            return Vec::new();
        }
        legal_moves(&self.board, self.to_move)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            red: self.red.clone(),
            white: self.white.clone(),
            board: self.board.clone(),
            to_move: self.to_move,
            status: self.status,
            outcome: self.outcome,
            draw_offer: self.draw_offer,
            moves: self.log.clone(),
            created_at: self.created_at,
            last_move_at: self.last_move_at,
        }
    }

    fn ensure_active(&self) -> DraughtsResult<()> {
        if self.is_finished() {
            Err(DraughtsError::SessionFinished)
        } else {
            Ok(())
        }
    }

    fn finish(&mut self, outcome: GameOutcome) -> GameOutcome {
        self.status = MatchStatus::Finished;
        self.outcome = Some(outcome);
        self.draw_offer = None;
        outcome
    }

    /// Validate and play a move for `participant`
    pub fn submit_move(
        &mut self,
        participant: &ParticipantId,
        mv: &Move,
    ) -> DraughtsResult<SessionEvent> {
        self.ensure_active()?;
        let side = self.side_of(participant)?;
        if side != self.to_move {
            return Err(DraughtsError::WrongTurn {
                expected: self.to_move,
            });
        }
        if !legal_moves(&self.board, side).contains(mv) {
            return Err(DraughtsError::IllegalMove);
        }

        let now = Utc::now();
        self.board = apply_move(&self.board, mv);
        self.to_move = side.opponent();
        self.draw_offer = None;
        self.last_move_at = Some(now);
        self.log.push(MoveRecord {
            side,
            mv: mv.clone(),
            played_at: now,
        });

        match terminal(&self.board, self.to_move) {
            Terminal::Pending => Ok(SessionEvent::Continued {
                mv: mv.clone(),
                board: self.board.clone(),
                to_move: self.to_move,
            }),
            Terminal::Decisive { winner, reason } => {
                let outcome = self.finish(GameOutcome {
                    winner: Some(winner),
                    reason: reason.into(),
                });
                Ok(SessionEvent::Finished {
                    mv: mv.clone(),
                    board: self.board.clone(),
                    outcome,
                })
            }
        }
    }

    /// End the game in favour of the other participant
    pub fn resign(&mut self, participant: &ParticipantId) -> DraughtsResult<GameOutcome> {
        self.forfeit(participant, EndReason::Resignation)
    }

    /// Same as resignation; no reconnection window is kept
    pub fn disconnect(&mut self, participant: &ParticipantId) -> DraughtsResult<GameOutcome> {
        self.forfeit(participant, EndReason::Disconnect)
    }

    fn forfeit(
        &mut self,
        participant: &ParticipantId,
        reason: EndReason,
    ) -> DraughtsResult<GameOutcome> {
        self.ensure_active()?;
        let side = self.side_of(participant)?;
        Ok(self.finish(GameOutcome {
            winner: Some(side.opponent()),
            reason,
        }))
    }

    /// Offer a draw to the opponent
    ///
    /// The offer stays open until the opponent accepts it or a move is played.
    /// Offering while the opponent's own offer is pending counts as accepting it.
    pub fn offer_draw(&mut self, participant: &ParticipantId) -> DraughtsResult<DrawOffer> {
        self.ensure_active()?;
        let side = self.side_of(participant)?;
        if self.draw_offer == Some(side.opponent()) {
            let outcome = self.finish(GameOutcome {
                winner: None,
                reason: EndReason::DrawAgreed,
            });
            return Ok(DrawOffer::Agreed { outcome });
        }
        self.draw_offer = Some(side);
        Ok(DrawOffer::Pending { by: side })
    }

    /// Accept the opponent's pending draw offer
    pub fn accept_draw(&mut self, participant: &ParticipantId) -> DraughtsResult<GameOutcome> {
        self.ensure_active()?;
        let side = self.side_of(participant)?;
        if self.draw_offer != Some(side.opponent()) {
            return Err(DraughtsError::NoDrawOffer);
        }
        Ok(self.finish(GameOutcome {
            winner: None,
            reason: EndReason::DrawAgreed,
        }))
    }
}
