use crate::domain_model::PersistedSession;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

/// Storage key holding the serialized session.
pub const SESSION_KEY: &str = "auth";

/// Typed view over the single `"auth"` entry of a [`KeyValueStorage`].
///
/// Reads never fail: a missing, unreadable, or malformed entry is reported
/// as "no session". An empty entry is a tombstone left by [`remove`].
///
/// [`remove`]: SessionPersistence::remove
#[derive(Clone)]
pub struct SessionPersistence {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionPersistence {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        SessionPersistence { storage }
    }

    pub fn read(&self) -> Option<PersistedSession> {
        let raw = match self.storage.get(SESSION_KEY) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return None,
            Err(e) => {
                warn!(error = %e, "could not read persisted session");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(error = %e, "ignoring malformed persisted session");
                None
            }
        }
    }

    pub fn write(&self, session: &PersistedSession) -> Result<(), StorageError> {
        let raw = serde_json::to_string(session)?;
        self.storage.set(SESSION_KEY, &raw)
    }

    /// Deletes the entry. If the storage refuses, blanks it instead so a
    /// later [`read`](SessionPersistence::read) cannot restore the session.
    pub fn remove(&self) -> Result<(), StorageError> {
        let Err(e) = self.storage.remove(SESSION_KEY) else {
            return Ok(());
        };
        warn!(error = %e, "could not remove persisted session, blanking it");
        self.storage.set(SESSION_KEY, "")
    }
}
