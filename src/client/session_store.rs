use crate::client::SessionPersistence;
use crate::domain_model::*;
use crate::domain_port::Clock;
use crate::logger::*;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Authoritative in-memory session, mirrored to durable storage.
///
/// The state is only ever replaced whole (`set_tokens`, `hydrate`, `clear`),
/// so readers never observe a half-written session. Concurrent logins are not
/// deduplicated: the last `set_tokens` call wins.
pub struct SessionStore {
    state: RwLock<SessionState>,
    persistence: SessionPersistence,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    pub fn new(persistence: SessionPersistence, clock: Arc<dyn Clock>) -> Self {
        SessionStore {
            state: RwLock::new(SessionState::default()),
            persistence,
            clock,
        }
    }

    /// Replaces the session with `grant` and persists it.
    pub fn set_tokens(&self, grant: &TokenGrant) {
        let next = SessionState::from_grant(grant, self.clock.now_millis());
        let mut state = self.write_state();
        // persist under the lock so storage order matches call order
        if let Some(persisted) = next.to_persisted() {
            if let Err(e) = self.persistence.write(&persisted) {
                warn!(error = %e, "could not persist session");
            }
        }
        info!(user_id = %grant.user_id, expires_in = grant.expires_in, "session started");
        *state = next;
    }

    /// Restores the persisted session if none is loaded. Returns whether
    /// anything was restored.
    pub fn hydrate(&self) -> bool {
        let mut state = self.write_state();
        if !state.is_empty() {
            return false;
        }
        let Some(persisted) = self.persistence.read() else {
            return false;
        };
        debug!(user_id = %persisted.user_id, "session restored from storage");
        *state = SessionState::from(persisted);
        true
    }

    pub fn clear(&self) {
        let mut state = self.write_state();
        if let Err(e) = self.persistence.remove() {
            warn!(error = %e, "could not remove persisted session");
        }
        if !state.is_empty() {
            info!("session cleared");
        }
        *state = SessionState::default();
    }

    pub fn snapshot(&self) -> SessionState {
        self.read_state().clone()
    }

    pub fn has_access_token(&self) -> bool {
        !self.read_state().is_empty()
    }

    /// The access token regardless of expiry.
    pub fn access_token(&self) -> Option<String> {
        self.read_state().access_token().map(str::to_string)
    }

    /// The access token, only while the session is still valid.
    pub fn bearer_token(&self) -> Option<String> {
        let now = self.clock.now_millis();
        let state = self.read_state();
        if state.is_authenticated_at(now) {
            state.access_token().map(str::to_string)
        } else {
            None
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated_at(self.clock.now_millis())
    }

    pub fn is_authenticated_at(&self, now: EpochMillis) -> bool {
        self.read_state().is_authenticated_at(now)
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.remaining_seconds_at(self.clock.now_millis())
    }

    pub fn remaining_seconds_at(&self, now: EpochMillis) -> u64 {
        self.read_state().remaining_seconds_at(now)
    }

    // A poisoned lock still holds a whole state value.
    fn read_state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
