//! Owner of the active session.
//!
//! [`SessionController`] wires the [`SessionEngine`] to persistence, history
//! and event listeners. Every command is applied to the in-memory engine
//! first; the resulting events are then persisted (snapshot saved, or
//! history recorded and snapshot cleared on completion) and finally handed
//! to each listener. Persistence failures are logged and do not stop the
//! engine.

use crate::error::ValidationError;
use crate::events::{epoch_ms_to_utc, Event, EventListener};
use crate::preferences::PomodoroPreferences;
use crate::quote::Quote;
use crate::storage::{ActiveSessionStore, HistoryRecord, HistoryStore};
use crate::timer::{NotificationSummary, PomodoroSession, SessionEngine};

pub struct SessionController<S, H> {
    store: S,
    history: H,
    engine: Option<SessionEngine>,
    listeners: Vec<Box<dyn EventListener>>,
}

impl<S: ActiveSessionStore, H: HistoryStore> SessionController<S, H> {
    pub fn new(store: S, history: H) -> Self {
        Self {
            store,
            history,
            engine: None,
            listeners: Vec::new(),
        }
    }

    pub fn add_listener(&mut self, listener: impl EventListener + 'static) {
        self.listeners.push(Box::new(listener));
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> Option<&SessionEngine> {
        self.engine.as_ref()
    }

    pub fn session(&self) -> Option<&PomodoroSession> {
        self.engine.as_ref().map(SessionEngine::session)
    }

    pub fn has_session(&self) -> bool {
        self.engine.is_some()
    }

    pub fn snapshot(&self, now_ms: u64) -> Option<Event> {
        self.engine.as_ref().map(|e| e.snapshot(now_ms))
    }

    pub fn notification_summary(&self, now_ms: u64) -> Option<NotificationSummary> {
        self.session().map(|s| s.notification_summary(now_ms))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Load the persisted session, if any, and fast-forward it to `now_ms`.
    ///
    /// A snapshot that turns out to be finished is completed right away:
    /// its history is recorded and the snapshot cleared.
    pub fn restore(&mut self, now_ms: u64) -> Vec<Event> {
        if self.engine.is_some() {
            return Vec::new();
        }
        let Some(session) = self.store.get_active_session() else {
            return Vec::new();
        };
        let (engine, events) = SessionEngine::restore(session, now_ms);
        tracing::debug!(
            session_id = %engine.session().session_id(),
            fast_forwarded = events.len(),
            "session restored"
        );
        self.engine = Some(engine);
        self.apply(now_ms, events)
    }

    /// Resume the persisted session, or start a new one when there is none.
    ///
    /// # Errors
    /// Returns a validation error when a new session has to be built from
    /// invalid preferences.
    pub fn open_or_start(
        &mut self,
        now_ms: u64,
        preferences: &PomodoroPreferences,
        quote: Quote,
    ) -> Result<Vec<Event>, ValidationError> {
        let mut events = self.restore(now_ms);
        if self.engine.is_none() {
            events.extend(self.start_new(now_ms, preferences, quote)?);
        }
        Ok(events)
    }

    /// Start a fresh session, discarding the current one without history.
    ///
    /// # Errors
    /// Returns a validation error for invalid preferences; the current
    /// session is kept in that case.
    pub fn start_new(
        &mut self,
        now_ms: u64,
        preferences: &PomodoroPreferences,
        quote: Quote,
    ) -> Result<Vec<Event>, ValidationError> {
        let (engine, started) = SessionEngine::start(now_ms, preferences, quote)?;
        let mut events = self.cancel(now_ms);
        self.engine = Some(engine);
        events.extend(self.apply(now_ms, started));
        Ok(events)
    }

    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        self.command(now_ms, |engine| engine.tick(now_ms))
    }

    pub fn pause(&mut self, now_ms: u64) -> Vec<Event> {
        self.command(now_ms, |engine| engine.pause(now_ms))
    }

    pub fn resume(&mut self, now_ms: u64) -> Vec<Event> {
        self.command(now_ms, |engine| engine.resume(now_ms))
    }

    pub fn toggle_pause(&mut self, now_ms: u64) -> Vec<Event> {
        self.command(now_ms, |engine| engine.toggle_pause(now_ms))
    }

    /// End the session early. Completed segments go to history.
    pub fn finish(&mut self, now_ms: u64) -> Vec<Event> {
        self.command(now_ms, |engine| engine.finish(now_ms))
    }

    /// Drop the session without recording history.
    pub fn cancel(&mut self, now_ms: u64) -> Vec<Event> {
        let session_id = match self.engine.take() {
            Some(engine) => Some(engine.session().session_id()),
            None => self.store.get_active_session().map(|s| s.session_id()),
        };
        if let Err(e) = self.store.clear_active_session() {
            tracing::warn!(error = %e, "failed to clear active session");
        }
        let Some(session_id) = session_id else {
            return Vec::new();
        };
        tracing::debug!(%session_id, "session cancelled");
        let events = vec![Event::SessionCancelled {
            session_id,
            at: epoch_ms_to_utc(now_ms),
        }];
        self.dispatch(&events);
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn command<F>(&mut self, now_ms: u64, f: F) -> Vec<Event>
    where
        F: FnOnce(&mut SessionEngine) -> Vec<Event>,
    {
        let events = match self.engine.as_mut() {
            Some(engine) => f(engine),
            None => return Vec::new(),
        };
        self.apply(now_ms, events)
    }

    /// Persist the outcome of `events`, then notify listeners.
    fn apply(&mut self, now_ms: u64, events: Vec<Event>) -> Vec<Event> {
        if events.is_empty() {
            return events;
        }

        let completed = events.iter().find_map(|e| match e {
            Event::SessionCompleted { summary, .. } => Some(summary),
            _ => None,
        });

        match completed {
            Some(summary) => {
                if let Some(engine) = self.engine.take() {
                    let record = HistoryRecord::from_summary(
                        summary,
                        engine.session().started_at_epoch_ms,
                        now_ms,
                    );
                    if let Err(e) = self.history.record_session(&record) {
                        tracing::warn!(error = %e, "failed to record session history");
                    }
                }
                if let Err(e) = self.store.clear_active_session() {
                    tracing::warn!(error = %e, "failed to clear active session");
                }
            }
            None => {
                if let Some(engine) = &self.engine {
                    if let Err(e) = self.store.save_active_session(engine.session()) {
                        tracing::warn!(error = %e, "failed to save active session");
                    }
                }
            }
        }

        self.dispatch(&events);
        events
    }

    fn dispatch(&self, events: &[Event]) {
        for event in events {
            for listener in &self.listeners {
                listener.on_event(event);
            }
        }
    }
}
