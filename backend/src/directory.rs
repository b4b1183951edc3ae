//! Session directory
//!
//! Maps session ids to live sessions and participants to the session they
//! play in. Inserts and removals are atomic per session: once `remove`
//! returns, neither the id nor either participant resolves any more.
//!
//! Each session sits behind its own mutex, so submissions to one session are
//! serialized while different sessions proceed in parallel. The directory
//! lock is only held for map lookups and is never held while a session lock
//! is acquired. The spectator list of a handle is taken last, after the
//! session lock.

use parking_lot::{Mutex, MutexGuard};
use shared::protocol::Stake;
use std::collections::HashMap;
use std::sync::Arc;

use draughts_engine::{MatchSession, ParticipantId, SessionId};

use crate::error::{RelayError, RelayResult};

/// A live session plus the stake it was paired under and its spectators
pub struct SessionHandle {
    id: SessionId,
    stake: Option<Stake>,
    session: Mutex<MatchSession>,
    spectators: Mutex<Vec<ParticipantId>>,
}

impl SessionHandle {
    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn stake(&self) -> Option<Stake> {
        self.stake
    }

    /// Exclusive access to the session state
    pub fn lock(&self) -> MutexGuard<'_, MatchSession> {
        self.session.lock()
    }

    /// Returns false if `participant` was already watching
    pub fn add_spectator(&self, participant: &ParticipantId) -> bool {
        let mut spectators = self.spectators.lock();
        if spectators.contains(participant) {
            return false;
        }
        spectators.push(participant.clone());
        true
    }

    pub fn remove_spectator(&self, participant: &ParticipantId) -> bool {
        let mut spectators = self.spectators.lock();
        let before = spectators.len();
        spectators.retain(|watching| watching != participant);
        spectators.len() != before
    }

    pub fn spectators(&self) -> Vec<ParticipantId> {
        self.spectators.lock().clone()
    }
}

#[derive(Default)]
struct DirectoryState {
    sessions: HashMap<SessionId, Arc<SessionHandle>>,
    by_participant: HashMap<ParticipantId, SessionId>,
}

#[derive(Default)]
pub struct SessionDirectory {
    state: Mutex<DirectoryState>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly created session
    ///
    /// Fails with `AlreadyInSession` if either participant already plays
    /// elsewhere; nothing is inserted in that case.
    pub fn insert(
        &self,
        session: MatchSession,
        stake: Option<Stake>,
    ) -> RelayResult<Arc<SessionHandle>> {
        let id = session.id();
        let players: Vec<ParticipantId> = session.participants().into_iter().cloned().collect();

        let mut state = self.state.lock();
        if let Some(busy) = players.iter().find(|p| state.by_participant.contains_key(*p)) {
            return Err(RelayError::AlreadyInSession(busy.clone()));
        }

        let handle = Arc::new(SessionHandle {
            id,
            stake,
            session: Mutex::new(session),
            spectators: Mutex::new(Vec::new()),
        });
        state.sessions.insert(id, handle.clone());
        for player in players {
            state.by_participant.insert(player, id);
        }
        Ok(handle)
    }

    pub fn get(&self, id: SessionId) -> RelayResult<Arc<SessionHandle>> {
        self.state
            .lock()
            .sessions
            .get(&id)
            .cloned()
            .ok_or(RelayError::SessionNotFound(id))
    }

    /// Session `participant` currently plays in, if any
    pub fn session_of(&self, participant: &ParticipantId) -> Option<Arc<SessionHandle>> {
        let state = self.state.lock();
        state
            .by_participant
            .get(participant)
            .and_then(|id| state.sessions.get(id))
            .cloned()
    }

    /// Every live session, in no particular order
    pub fn handles(&self) -> Vec<Arc<SessionHandle>> {
        self.state.lock().sessions.values().cloned().collect()
    }

    pub fn is_playing(&self, participant: &ParticipantId) -> bool {
        self.state.lock().by_participant.contains_key(participant)
    }

    /// Drop a session and both participant routes
    pub fn remove(&self, id: SessionId) -> Option<Arc<SessionHandle>> {
        let mut state = self.state.lock();
        let handle = state.sessions.remove(&id)?;
        state.by_participant.retain(|_, session| *session != id);
        Some(handle)
    }

    pub fn len(&self) -> usize {
        self.state.lock().sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(red: &str, white: &str) -> MatchSession {
        MatchSession::new(SessionId::new(), red.into(), white.into())
    }

    #[test]
    fn test_insert_routes_both_participants() {
        let directory = SessionDirectory::new();
        let handle = directory.insert(session("a", "b"), None).unwrap();

        assert_eq!(directory.len(), 1);
        assert_eq!(
            directory.session_of(&"a".into()).map(|h| h.id()),
            Some(handle.id())
        );
        assert!(directory.is_playing(&"b".into()));
        assert!(!directory.is_playing(&"c".into()));
    }

    #[test]
    fn test_busy_participant_rejected() {
        let directory = SessionDirectory::new();
        directory.insert(session("a", "b"), None).unwrap();

        let err = directory.insert(session("c", "b"), None).err();
        assert_eq!(err, Some(RelayError::AlreadyInSession("b".into())));
        assert_eq!(directory.len(), 1);
        assert!(!directory.is_playing(&"c".into()));
    }

    #[test]
    fn test_spectators_are_not_routed() {
        let directory = SessionDirectory::new();
        let handle = directory.insert(session("a", "b"), None).unwrap();

        assert!(handle.add_spectator(&"c".into()));
        assert!(!handle.add_spectator(&"c".into()));
        assert_eq!(handle.spectators(), vec![ParticipantId::from("c")]);
        assert!(!directory.is_playing(&"c".into()));

        assert!(handle.remove_spectator(&"c".into()));
        assert!(handle.spectators().is_empty());
        assert_eq!(directory.handles().len(), 1);
    }

    #[test]
    fn test_remove_clears_routes() {
        let directory = SessionDirectory::new();
        let id = directory.insert(session("a", "b"), None).unwrap().id();

        assert!(directory.remove(id).is_some());
        assert!(directory.is_empty());
        assert!(directory.session_of(&"a".into()).is_none());
        assert!(matches!(
            directory.get(id),
            Err(RelayError::SessionNotFound(missing)) if missing == id
        ));
        assert!(directory.remove(id).is_none());
    }
}
