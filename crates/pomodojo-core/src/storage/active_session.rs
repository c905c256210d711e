//! Persistence of the in-flight session.
//!
//! The whole [`PomodoroSession`] is stored as one JSON document. A snapshot
//! that cannot be decoded is treated as "no active session" rather than an
//! error, so a schema change never locks the user out of starting a new one.

use std::sync::Mutex;

use super::Database;
use crate::error::Result;
use crate::timer::PomodoroSession;

/// Key of the session snapshot in the kv table.
pub const ACTIVE_SESSION_KEY: &str = "active_session";

pub trait ActiveSessionStore {
    /// The persisted session, if there is a usable one.
    fn get_active_session(&self) -> Option<PomodoroSession>;

    /// Replace the persisted session.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be encoded or written.
    fn save_active_session(&self, session: &PomodoroSession) -> Result<()>;

    /// Forget the persisted session. Clearing an empty store is not an error.
    ///
    /// # Errors
    /// Returns an error if the store cannot be written.
    fn clear_active_session(&self) -> Result<()>;

    fn has_active_session(&self) -> bool {
        self.get_active_session().is_some()
    }
}

impl<T: ActiveSessionStore + ?Sized> ActiveSessionStore for &T {
    fn get_active_session(&self) -> Option<PomodoroSession> {
        (**self).get_active_session()
    }

    fn save_active_session(&self, session: &PomodoroSession) -> Result<()> {
        (**self).save_active_session(session)
    }

    fn clear_active_session(&self) -> Result<()> {
        (**self).clear_active_session()
    }

    fn has_active_session(&self) -> bool {
        (**self).has_active_session()
    }
}

impl ActiveSessionStore for Database {
    fn get_active_session(&self) -> Option<PomodoroSession> {
        let raw = match self.kv_get(ACTIVE_SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read active session");
                return None;
            }
        };
        decode(&raw)
    }

    fn save_active_session(&self, session: &PomodoroSession) -> Result<()> {
        let json = serde_json::to_string(session)?;
        self.kv_set(ACTIVE_SESSION_KEY, &json)?;
        Ok(())
    }

    fn clear_active_session(&self) -> Result<()> {
        self.kv_delete(ACTIVE_SESSION_KEY)?;
        Ok(())
    }
}

/// [`ActiveSessionStore`] holding the snapshot as JSON in memory.
///
/// Keeps the encoded form so it goes through the same decode path as the
/// database store.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    raw: Mutex<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text as the snapshot, bypassing encoding.
    pub fn set_raw(&self, raw: impl Into<String>) {
        *self.slot() = Some(raw.into());
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.raw.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ActiveSessionStore for MemorySessionStore {
    fn get_active_session(&self) -> Option<PomodoroSession> {
        self.slot().as_deref().and_then(decode)
    }

    fn save_active_session(&self, session: &PomodoroSession) -> Result<()> {
        let json = serde_json::to_string(session)?;
        *self.slot() = Some(json);
        Ok(())
    }

    fn clear_active_session(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

fn decode(raw: &str) -> Option<PomodoroSession> {
    match serde_json::from_str::<PomodoroSession>(raw) {
        Ok(session) if session.segments.is_empty() => None,
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, "discarding unreadable session snapshot");
            None
        }
    }
}
