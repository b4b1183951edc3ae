//! Relay: owns the session directory, the lobby and the connection registry
//!
//! Every mutation of a session happens under that session's lock, and the
//! resulting notifications are queued before the lock is released, so both
//! players and every spectator observe events in the order the session
//! produced them.
//!
//! Lock order is session, then directory, then spectators, then connections.

use parking_lot::Mutex;
use rand::Rng;
use serde::Serialize;
use shared::protocol::{GameMessage, LobbyMessage, Packet, SpectatableGame, Stake};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use draughts_engine::{
    DraughtsError, DrawOffer, GameOutcome, MatchSession, Move, ParticipantId, SessionEvent,
    SessionId, SessionSnapshot, Side,
};

use crate::config::ServerConfig;
use crate::directory::{SessionDirectory, SessionHandle};
use crate::error::{RelayError, RelayResult};
use crate::lobby::{Invitation, Lobby};

struct Connection {
    id: u64,
    outbox: mpsc::UnboundedSender<Packet>,
}

/// Session state as reported to clients
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session: SessionSnapshot,
    pub stake: Option<Stake>,
    pub legal_moves: Vec<Move>,
}

pub struct Relay {
    directory: SessionDirectory,
    lobby: Lobby,
    connections: Mutex<HashMap<ParticipantId, Connection>>,
    next_connection: AtomicU64,
}

impl Relay {
    pub fn new(config: &ServerConfig) -> Self {
        Relay {
            directory: SessionDirectory::new(),
            lobby: Lobby::new(config.room_code_length),
            connections: Mutex::new(HashMap::new()),
            next_connection: AtomicU64::new(1),
        }
    }

    pub fn directory(&self) -> &SessionDirectory {
        &self.directory
    }

    pub fn lobby(&self) -> &Lobby {
        &self.lobby
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Register a connection for `participant`, replacing any previous one
    ///
    /// Returns the connection id to pass to [`Relay::release`] and the
    /// receiving end of the participant's outbox. The outbox starts with the
    /// list of everyone else who is online.
    pub fn connect(&self, participant: &ParticipantId) -> (u64, mpsc::UnboundedReceiver<Packet>) {
        let id = self.next_connection.fetch_add(1, Ordering::Relaxed);
        let (outbox, inbox) = mpsc::unbounded_channel();
        let replaced = self
            .connections
            .lock()
            .insert(participant.clone(), Connection { id, outbox });
        if replaced.is_some() {
            info!("[RELAY] {} reconnected, old connection dropped", participant);
        } else {
            info!("[RELAY] {} connected", participant);
        }

        let players = self.online_players(Some(participant));
        self.send(participant, LobbyMessage::OnlinePlayers { players });
        (id, inbox)
    }

    /// Connected participants, sorted, optionally leaving one out
    pub fn online_players(&self, except: Option<&ParticipantId>) -> Vec<ParticipantId> {
        let mut players: Vec<ParticipantId> = self
            .connections
            .lock()
            .keys()
            .filter(|player| Some(*player) != except)
            .cloned()
            .collect();
        players.sort();
        players
    }

    pub fn is_connected(&self, participant: &ParticipantId) -> bool {
        self.connections.lock().contains_key(participant)
    }

    /// Close connection `connection_id` of `participant`
    ///
    /// Treated as a disconnection notice unless a newer connection has
    /// already replaced this one.
    pub fn release(&self, participant: &ParticipantId, connection_id: u64) -> Option<GameOutcome> {
        {
            let mut connections = self.connections.lock();
            match connections.get(participant) {
                Some(current) if current.id == connection_id => {
                    connections.remove(participant);
                }
                _ => return None,
            }
        }
        info!("[RELAY] {} disconnected", participant);
        self.disconnect(participant)
    }

    /// Queue `packet` for `participant`; dropped silently when offline
    pub fn send(&self, participant: &ParticipantId, packet: impl Into<Packet>) {
        if let Some(connection) = self.connections.lock().get(participant) {
            if connection.outbox.send(packet.into()).is_err() {
                debug!("[RELAY] Outbox of {} already closed", participant);
            }
        }
    }

    /// Send to both players and every spectator of the session
    fn broadcast(
        &self,
        handle: &SessionHandle,
        session: &MatchSession,
        packet: impl Into<Packet>,
    ) {
        let packet = packet.into();
        for participant in session.participants() {
            self.send(participant, packet.clone());
        }
        for spectator in handle.spectators() {
            self.send(&spectator, packet.clone());
        }
    }

    // ========================================================================
    // Sessions
    // ========================================================================

    /// Start a game between two participants and notify both
    pub fn create_session(
        &self,
        red: &ParticipantId,
        white: &ParticipantId,
        stake: Option<Stake>,
    ) -> RelayResult<SessionSnapshot> {
        if red == white {
            return Err(RelayError::SelfPairing);
        }

        let session = MatchSession::new(SessionId::new(), red.clone(), white.clone());
        let handle = self.directory.insert(session, stake)?;
        self.lobby.leave_queues(red);
        self.lobby.leave_queues(white);

        let snapshot = handle.lock().snapshot();
        info!(
            "[GAME] Session {} started: {} (red) vs {} (white)",
            snapshot.id, red, white
        );

        for (side, player, opponent) in [(Side::Red, red, white), (Side::White, white, red)] {
            self.send(
                player,
                LobbyMessage::GameStarted {
                    session_id: snapshot.id,
                    your_side: side,
                    opponent: opponent.clone(),
                    board: snapshot.board.clone(),
                    stake,
                },
            );
        }
        Ok(snapshot)
    }

    /// Pair two participants with a coin flip for sides
    fn pair(
        &self,
        first: &ParticipantId,
        second: &ParticipantId,
        stake: Option<Stake>,
    ) -> RelayResult<SessionSnapshot> {
        if rand::rng().random_bool(0.5) {
            self.create_session(first, second, stake)
        } else {
            self.create_session(second, first, stake)
        }
    }

    pub fn session_view(&self, id: SessionId) -> RelayResult<SessionView> {
        let handle = self.directory.get(id)?;
        let session = handle.lock();
        Ok(SessionView {
            session: session.snapshot(),
            stake: handle.stake(),
            legal_moves: session.legal_moves(),
        })
    }

    /// Validate and relay a move
    ///
    /// Players and spectators receive `MoveMade`, followed by `GameEnded` if
    /// the move finished the game, in which case the session is also removed.
    /// Both carry the full move log.
    pub fn submit_move(
        &self,
        id: SessionId,
        participant: &ParticipantId,
        mv: &Move,
    ) -> RelayResult<SessionEvent> {
        let handle = self.directory.get(id)?;
        let mut session = handle.lock();

        let event = match session.submit_move(participant, mv) {
            Ok(event) => event,
            Err(err) => {
                warn!(
                    "[GAME] Rejected move {:?} from {} in {}: {}",
                    mv, participant, id, err
                );
                return Err(err.into());
            }
        };
        debug!("[GAME] {} played {:?} in {}", participant, mv, id);

        self.broadcast(
            &handle,
            &session,
            GameMessage::MoveMade {
                session_id: id,
                mv: mv.clone(),
                board: session.board().clone(),
                to_move: session.to_move(),
                moves: session.move_log().to_vec(),
            },
        );
        if let SessionEvent::Finished { outcome, .. } = &event {
            self.end_session(&handle, &session, *outcome);
        }
        Ok(event)
    }

    pub fn resign(&self, id: SessionId, participant: &ParticipantId) -> RelayResult<GameOutcome> {
        let handle = self.directory.get(id)?;
        let mut session = handle.lock();
        let outcome = session.resign(participant)?;
        self.end_session(&handle, &session, outcome);
        Ok(outcome)
    }

    /// Record a draw offer and forward it to the opponent
    ///
    /// Crossing an offer already made by the opponent ends the game drawn.
    pub fn offer_draw(
        &self,
        id: SessionId,
        participant: &ParticipantId,
    ) -> RelayResult<DrawOffer> {
        let handle = self.directory.get(id)?;
        let mut session = handle.lock();
        let offer = session.offer_draw(participant)?;
        match offer {
            DrawOffer::Pending { by } => self.send(
                session.participant(by.opponent()),
                GameMessage::DrawOffered { session_id: id, by },
            ),
            DrawOffer::Agreed { outcome } => self.end_session(&handle, &session, outcome),
        }
        Ok(offer)
    }

    pub fn accept_draw(
        &self,
        id: SessionId,
        participant: &ParticipantId,
    ) -> RelayResult<GameOutcome> {
        let handle = self.directory.get(id)?;
        let mut session = handle.lock();
        let outcome = session.accept_draw(participant)?;
        self.end_session(&handle, &session, outcome);
        Ok(outcome)
    }

    /// Disconnection notice
    ///
    /// Clears the participant's lobby presence and forfeits their active
    /// session, if any. Returns the forfeited outcome.
    pub fn disconnect(&self, participant: &ParticipantId) -> Option<GameOutcome> {
        self.lobby.forget(participant);
        for handle in self.directory.handles() {
            handle.remove_spectator(participant);
        }

        let handle = self.directory.session_of(participant)?;
        let mut session = handle.lock();
        match session.disconnect(participant) {
            Ok(outcome) => {
                self.end_session(&handle, &session, outcome);
                Some(outcome)
            }
            // Finished by a concurrent request between lookup and lock
            Err(_) => None,
        }
    }

    fn end_session(&self, handle: &SessionHandle, session: &MatchSession, outcome: GameOutcome) {
        self.broadcast(
            handle,
            session,
            GameMessage::GameEnded {
                session_id: handle.id(),
                outcome,
                final_board: session.board().clone(),
                moves: session.move_log().to_vec(),
            },
        );
        self.directory.remove(handle.id());

        match outcome.winner {
            Some(winner) => info!(
                "[GAME] Session {} finished: {:?} wins by {:?}",
                handle.id(),
                winner,
                outcome.reason
            ),
            None => info!("[GAME] Session {} finished in a draw", handle.id()),
        }
    }

    // ========================================================================
    // Spectators
    // ========================================================================

    /// Active games where any of `friends` plays
    ///
    /// Participant ids are compared ASCII case-insensitively.
    pub fn spectatable_games(&self, friends: &[ParticipantId]) -> Vec<SpectatableGame> {
        let is_friend = |player: &ParticipantId| {
            friends
                .iter()
                .any(|friend| friend.as_str().eq_ignore_ascii_case(player.as_str()))
        };

        let mut games = Vec::new();
        for handle in self.directory.handles() {
            let session = handle.lock();
            if session.is_finished() || !session.participants().into_iter().any(is_friend) {
                continue;
            }
            let snapshot = session.snapshot();
            games.push(SpectatableGame {
                session_id: snapshot.id,
                red: snapshot.red,
                white: snapshot.white,
                board: snapshot.board,
                to_move: snapshot.to_move,
                moves_played: snapshot.moves.len(),
                stake: handle.stake(),
            });
        }
        games.sort_by_key(|game| game.session_id.0);
        games
    }

    /// Start watching a live game
    ///
    /// The spectator is sent a `SpectatorState` snapshot and from then on
    /// receives every broadcast of the session. Players of the game are
    /// rejected.
    pub fn spectate(
        &self,
        id: SessionId,
        participant: &ParticipantId,
    ) -> RelayResult<SessionSnapshot> {
        let handle = self.directory.get(id)?;
        let session = handle.lock();
        if session.is_finished() {
            return Err(DraughtsError::SessionFinished.into());
        }
        if session.side_of(participant).is_ok() {
            return Err(RelayError::SpectatingOwnGame(participant.clone()));
        }

        let snapshot = session.snapshot();
        if handle.add_spectator(participant) {
            info!("[GAME] {} is spectating {}", participant, id);
        }
        self.send(
            participant,
            GameMessage::SpectatorState {
                session: snapshot.clone(),
                stake: handle.stake(),
            },
        );
        Ok(snapshot)
    }

    // ========================================================================
    // Lobby
    // ========================================================================

    /// Join the matchmaking queue for `stake`
    ///
    /// Returns the new session if an opponent was already waiting, `None`
    /// if the participant is now queued.
    ///
    /// A waiting opponent who turns out to be busy elsewhere is dropped and
    /// the next one is tried. If pairing fails for any other reason the
    /// opponent gets their place at the head of the queue back.
    pub fn search(
        &self,
        participant: &ParticipantId,
        stake: Option<Stake>,
    ) -> RelayResult<Option<SessionSnapshot>> {
        self.ensure_idle(participant)?;
        loop {
            let Some(opponent) = self.lobby.search(participant, stake)? else {
                info!("[LOBBY] {} queued with stake {:?}", participant, stake);
                return Ok(None);
            };

            match self.pair(&opponent, participant, stake) {
                Ok(snapshot) => {
                    info!("[LOBBY] Matched {} with {}", participant, opponent);
                    return Ok(Some(snapshot));
                }
                Err(RelayError::AlreadyInSession(busy)) if busy == opponent => {
                    warn!("[LOBBY] Dropped {} from the queue, already playing", opponent);
                }
                Err(err) => {
                    self.lobby.requeue_front(&opponent, stake);
                    return Err(err);
                }
            }
        }
    }

    pub fn cancel_search(&self, participant: &ParticipantId, stake: Option<Stake>) -> bool {
        self.lobby.cancel_search(participant, stake)
    }

    pub fn create_room(
        &self,
        host: &ParticipantId,
        stake: Option<Stake>,
    ) -> RelayResult<String> {
        self.ensure_idle(host)?;
        let code = self.lobby.create_room(host, stake);
        info!("[LOBBY] {} created room {}", host, code);
        Ok(code)
    }

    pub fn join_room(&self, guest: &ParticipantId, code: &str) -> RelayResult<SessionSnapshot> {
        self.ensure_idle(guest)?;
        let room = self.lobby.join_room(guest, code)?;
        info!("[LOBBY] {} joined room {}", guest, room.code);
        self.pair(&room.host, guest, room.stake)
    }

    /// Invite a connected participant to a game
    pub fn invite(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
        stake: Option<Stake>,
    ) -> RelayResult<Invitation> {
        self.ensure_idle(from)?;
        if !self.is_connected(to) {
            return Err(RelayError::PlayerOffline(to.clone()));
        }
        let invitation = self.lobby.invite(from, to, stake)?;
        self.send(
            to,
            LobbyMessage::InvitationReceived {
                invitation_id: invitation.id,
                from: from.clone(),
                stake,
            },
        );
        info!("[LOBBY] {} invited {}", from, to);
        Ok(invitation)
    }

    pub fn accept_invitation(
        &self,
        invitation_id: Uuid,
        participant: &ParticipantId,
    ) -> RelayResult<SessionSnapshot> {
        self.ensure_idle(participant)?;
        let invitation = self.lobby.take_invitation(invitation_id, participant)?;
        if !self.is_connected(&invitation.from) {
            return Err(RelayError::PlayerOffline(invitation.from));
        }
        self.pair(&invitation.from, &invitation.to, invitation.stake)
    }

    pub fn decline_invitation(
        &self,
        invitation_id: Uuid,
        participant: &ParticipantId,
    ) -> RelayResult<()> {
        let invitation = self.lobby.take_invitation(invitation_id, participant)?;
        self.send(
            &invitation.from,
            LobbyMessage::InvitationDeclined {
                invitation_id,
                by: participant.clone(),
            },
        );
        Ok(())
    }

    fn ensure_idle(&self, participant: &ParticipantId) -> RelayResult<()> {
        if self.directory.is_playing(participant) {
            return Err(RelayError::AlreadyInSession(participant.clone()));
        }
        Ok(())
    }
}
