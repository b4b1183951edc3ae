//! Lobby: matchmaking queues, room codes and direct invitations
//!
//! The lobby only decides who plays whom. Creating the session and
//! notifying the players is left to the relay.

use parking_lot::Mutex;
use rand::Rng;
use shared::protocol::Stake;
use std::collections::{HashMap, VecDeque};
use uuid::Uuid;

use draughts_engine::ParticipantId;

use crate::error::{RelayError, RelayResult};

const ROOM_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A room created by a host, waiting for a guest with the code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitingRoom {
    pub code: String,
    pub host: ParticipantId,
    pub stake: Option<Stake>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub id: Uuid,
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub stake: Option<Stake>,
}

#[derive(Default)]
struct LobbyState {
    queues: HashMap<Option<Stake>, VecDeque<ParticipantId>>,
    rooms: HashMap<String, WaitingRoom>,
    invitations: HashMap<Uuid, Invitation>,
}

pub struct Lobby {
    state: Mutex<LobbyState>,
    code_length: usize,
}

impl Lobby {
    pub fn new(code_length: usize) -> Self {
        Lobby {
            state: Mutex::new(LobbyState::default()),
            code_length,
        }
    }

    /// Queue `participant` for a random opponent with the same stake
    ///
    /// Returns the opponent when the queue already held someone, in which
    /// case both are removed from it.
    pub fn search(
        &self,
        participant: &ParticipantId,
        stake: Option<Stake>,
    ) -> RelayResult<Option<ParticipantId>> {
        let mut state = self.state.lock();
        if state.queues.values().any(|queue| queue.contains(participant)) {
            return Err(RelayError::AlreadyQueued(participant.clone()));
        }

        let queue = state.queues.entry(stake).or_default();
        let opponent = queue.pop_front();
        if opponent.is_none() {
            queue.push_back(participant.clone());
        } else if queue.is_empty() {
            state.queues.remove(&stake);
        }
        Ok(opponent)
    }

    /// Put a popped opponent back at the head of its queue
    ///
    /// Used when pairing fails after `search` already took them out. No-op if
    /// they queued again in the meantime.
    pub fn requeue_front(&self, participant: &ParticipantId, stake: Option<Stake>) {
        let mut state = self.state.lock();
        if state.queues.values().any(|queue| queue.contains(participant)) {
            return;
        }
        state
            .queues
            .entry(stake)
            .or_default()
            .push_front(participant.clone());
    }

    /// Leave the queue for `stake`; returns whether an entry was removed
    pub fn cancel_search(&self, participant: &ParticipantId, stake: Option<Stake>) -> bool {
        let mut state = self.state.lock();
        let Some(queue) = state.queues.get_mut(&stake) else {
            return false;
        };
        let before = queue.len();
        queue.retain(|queued| queued != participant);
        let removed = queue.len() != before;
        if queue.is_empty() {
            state.queues.remove(&stake);
        }
        removed
    }

    /// Open a waiting room and return its code
    pub fn create_room(&self, host: &ParticipantId, stake: Option<Stake>) -> String {
        let mut state = self.state.lock();
        let code = loop {
            let code = generate_room_code(self.code_length);
            if !state.rooms.contains_key(&code) {
                break code;
            }
        };
        state.rooms.insert(
            code.clone(),
            WaitingRoom {
                code: code.clone(),
                host: host.clone(),
                stake,
            },
        );
        code
    }

    /// Claim the room behind `code` as its guest
    ///
    /// Codes are matched case-insensitively after trimming. The room is
    /// consumed on success.
    pub fn join_room(&self, guest: &ParticipantId, code: &str) -> RelayResult<WaitingRoom> {
        let code = code.trim().to_uppercase();
        let mut state = self.state.lock();
        let room = state
            .rooms
            .get(&code)
            .ok_or_else(|| RelayError::RoomNotFound(code.clone()))?;
        if room.host == *guest {
            return Err(RelayError::OwnRoom);
        }
        state
            .rooms
            .remove(&code)
            .ok_or(RelayError::RoomNotFound(code))
    }

    pub fn invite(
        &self,
        from: &ParticipantId,
        to: &ParticipantId,
        stake: Option<Stake>,
    ) -> RelayResult<Invitation> {
        if from == to {
            return Err(RelayError::SelfPairing);
        }
        let invitation = Invitation {
            id: Uuid::new_v4(),
            from: from.clone(),
            to: to.clone(),
            stake,
        };
        self.state
            .lock()
            .invitations
            .insert(invitation.id, invitation.clone());
        Ok(invitation)
    }

    /// Remove an invitation addressed to `recipient`
    pub fn take_invitation(&self, id: Uuid, recipient: &ParticipantId) -> RelayResult<Invitation> {
        let mut state = self.state.lock();
        match state.invitations.get(&id) {
            Some(invitation) if invitation.to == *recipient => state
                .invitations
                .remove(&id)
                .ok_or(RelayError::InvitationNotFound(id)),
            _ => Err(RelayError::InvitationNotFound(id)),
        }
    }

    /// Remove `participant` from every matchmaking queue
    pub fn leave_queues(&self, participant: &ParticipantId) {
        self.state.lock().queues.retain(|_, queue| {
            queue.retain(|queued| queued != participant);
            !queue.is_empty()
        });
    }

    /// Drop every queue entry, hosted room and invitation involving `participant`
    pub fn forget(&self, participant: &ParticipantId) {
        self.leave_queues(participant);
        let mut state = self.state.lock();
        state.rooms.retain(|_, room| room.host != *participant);
        state
            .invitations
            .retain(|_, inv| inv.from != *participant && inv.to != *participant);
    }

    pub fn queued(&self, stake: Option<Stake>) -> usize {
        self.state
            .lock()
            .queues
            .get(&stake)
            .map_or(0, VecDeque::len)
    }

    pub fn open_rooms(&self) -> usize {
        self.state.lock().rooms.len()
    }
}

pub fn generate_room_code(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| {
            let idx = rng.random_range(0..ROOM_CODE_CHARSET.len());
            ROOM_CODE_CHARSET[idx] as char
        })
        .collect()
}
