use draughts_engine::{
    Board, DraughtsError, GameOutcome, Move, MoveRecord, ParticipantId, SessionId,
    SessionSnapshot, Side, Square,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ton,
    Stars,
}

/// Wager label a game was paired under. Settlement happens outside the relay.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Stake {
    pub amount: u64,
    pub currency: Currency,
}

/// Move as sent by an untrusted client, before coordinate validation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMove {
    pub origin: (u8, u8),
    pub destination: (u8, u8),
    #[serde(default)]
    pub captures: Vec<(u8, u8)>,
}

impl TryFrom<WireMove> for Move {
    type Error = DraughtsError;

    fn try_from(wire: WireMove) -> Result<Self, Self::Error> {
        Ok(Move {
            origin: Square::try_from(wire.origin)?,
            destination: Square::try_from(wire.destination)?,
            captures: wire
                .captures
                .into_iter()
                .map(Square::try_from)
                .collect::<Result<_, _>>()?,
        })
    }
}

impl From<&Move> for WireMove {
    fn from(mv: &Move) -> Self {
        WireMove {
            origin: mv.origin.into(),
            destination: mv.destination.into(),
            captures: mv.captures.iter().map(|&sq| sq.into()).collect(),
        }
    }
}

/// Active game listed for a would-be spectator
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpectatableGame {
    pub session_id: SessionId,
    pub red: ParticipantId,
    pub white: ParticipantId,
    pub board: Board,
    pub to_move: Side,
    pub moves_played: usize,
    pub stake: Option<Stake>,
}

/// Lobby-related messages for pairing players
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum LobbyMessage {
    // Client → Server
    Search {
        stake: Option<Stake>,
    },
    CancelSearch {
        stake: Option<Stake>,
    },
    CreateRoom {
        stake: Option<Stake>,
    },
    JoinRoom {
        code: String,
    },
    Invite {
        friend: ParticipantId,
        stake: Option<Stake>,
    },
    AcceptInvitation {
        invitation_id: Uuid,
    },
    DeclineInvitation {
        invitation_id: Uuid,
    },

    // Server → Client
    Queued {
        stake: Option<Stake>,
    },
    RoomCreated {
        code: String,
    },
    InvitationSent {
        invitation_id: Uuid,
    },
    InvitationReceived {
        invitation_id: Uuid,
        from: ParticipantId,
        stake: Option<Stake>,
    },
    InvitationDeclined {
        invitation_id: Uuid,
        by: ParticipantId,
    },
    GameStarted {
        session_id: SessionId,
        your_side: Side,
        opponent: ParticipantId,
        board: Board,
        stake: Option<Stake>,
    },
    /// Sent on connect: everyone else currently connected
    OnlinePlayers {
        players: Vec<ParticipantId>,
    },
}

/// In-game messages
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum GameMessage {
    // Client → Server
    SubmitMove {
        session_id: SessionId,
        mv: WireMove,
    },
    Resign {
        session_id: SessionId,
    },
    OfferDraw {
        session_id: SessionId,
    },
    AcceptDraw {
        session_id: SessionId,
    },
    /// List active games where any of `friends` plays
    RequestSpectatable {
        friends: Vec<ParticipantId>,
    },
    Spectate {
        session_id: SessionId,
    },

    // Server → Client (broadcast to both players and spectators)
    MoveMade {
        session_id: SessionId,
        mv: Move,
        board: Board,
        to_move: Side,
        moves: Vec<MoveRecord>,
    },
    GameEnded {
        session_id: SessionId,
        outcome: GameOutcome,
        final_board: Board,
        moves: Vec<MoveRecord>,
    },

    // Server → Client (opponent only)
    DrawOffered {
        session_id: SessionId,
        by: Side,
    },

    // Server → Client (requester only)
    SpectatableGames {
        games: Vec<SpectatableGame>,
    },
    SpectatorState {
        session: SessionSnapshot,
        stake: Option<Stake>,
    },
}

/// Envelope for everything carried over the relay socket
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Packet {
    Lobby(LobbyMessage),
    Game(GameMessage),
    /// Request rejected; only the requester receives this
    Error { kind: String, message: String },
}

impl From<LobbyMessage> for Packet {
    fn from(msg: LobbyMessage) -> Self {
        Packet::Lobby(msg)
    }
}

impl From<GameMessage> for Packet {
    fn from(msg: GameMessage) -> Self {
        Packet::Game(msg)
    }
}
