//! Session engine implementation.
//!
//! The engine is a wall-clock-based state machine over a
//! [`PomodoroSession`]. It does not use internal threads and never reads the
//! clock itself: every command takes `now_ms`, and the caller is responsible
//! for calling `tick()` periodically.
//!
//! ## Segment Transitions
//!
//! ```text
//! Initial -> Running -> (Paused <-> Running)* -> Completed
//! ```
//!
//! Cancelling a session is not a segment state; the owner simply drops the
//! session (see [`crate::controller::SessionController::cancel`]).
//!
//! ## Usage
//!
//! ```ignore
//! let (mut engine, events) = SessionEngine::start(now_ms(), &prefs, quote)?;
//! // In a loop:
//! let events = engine.tick(now_ms()); // SegmentCompleted / SegmentStarted / SessionCompleted
//! ```

use crate::error::ValidationError;
use crate::events::{epoch_ms_to_utc, Event};
use crate::preferences::PomodoroPreferences;
use crate::quote::Quote;

use super::segment::{TimerSegment, TimerStatus, TimerType};
use super::session::PomodoroSession;

#[derive(Debug, Clone)]
pub struct SessionEngine {
    session: PomodoroSession,
    /// Set when the user ends the session before the timeline runs out.
    ended: bool,
}

impl SessionEngine {
    pub fn new(session: PomodoroSession) -> Self {
        Self {
            session,
            ended: false,
        }
    }

    /// Build a new session from `preferences` and start its first segment.
    ///
    /// # Errors
    /// Returns a validation error for invalid preferences.
    pub fn start(
        now_ms: u64,
        preferences: &PomodoroPreferences,
        quote: Quote,
    ) -> Result<(Self, Vec<Event>), ValidationError> {
        let session = PomodoroSession::create(now_ms, preferences, quote)?;
        if session.segments.is_empty() {
            return Err(ValidationError::EmptyCollection("segments".into()));
        }
        let engine = Self::new(session);
        let mut events = vec![Event::SessionStarted {
            session_id: engine.session.session_id(),
            total_cycle: engine.session.total_cycle,
            segment_count: engine.session.segments.len(),
            at: epoch_ms_to_utc(now_ms),
        }];
        if let Some(first) = engine.session.segments.first() {
            events.push(segment_started(0, first, now_ms));
        }
        tracing::debug!(session_id = %engine.session.session_id(), "session started");
        Ok((engine, events))
    }

    /// Catch a persisted snapshot up to `now_ms`.
    ///
    /// A running segment whose deadline passed while the process was gone is
    /// completed and the next one started; a stale `Initial` active segment
    /// is started; paused segments stay frozen.
    pub fn restore(session: PomodoroSession, now_ms: u64) -> (Self, Vec<Event>) {
        let mut engine = Self::new(session);
        let mut events = Vec::new();

        if engine.session.is_complete() {
            events.push(engine.session_completed(now_ms));
            return (engine, events);
        }

        loop {
            let index = engine.session.active_index();
            let Some((status, due)) = engine
                .session
                .segments
                .get(index)
                .map(|s| (s.status, s.is_due(now_ms)))
            else {
                break;
            };
            match status {
                TimerStatus::Running if due => {
                    if !engine.advance(index, now_ms, &mut events) {
                        break;
                    }
                }
                TimerStatus::Initial => {
                    if let Some(segment) = engine.session.segments.get_mut(index) {
                        segment.start(now_ms);
                        events.push(segment_started(index, segment, now_ms));
                    }
                    break;
                }
                TimerStatus::Running | TimerStatus::Paused | TimerStatus::Completed => break,
            }
        }
        (engine, events)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn session(&self) -> &PomodoroSession {
        &self.session
    }

    pub fn into_session(self) -> PomodoroSession {
        self.session
    }

    pub fn active_index(&self) -> usize {
        self.session.active_index()
    }

    pub fn active_segment(&self) -> Option<&TimerSegment> {
        self.session.active_segment()
    }

    pub fn is_complete(&self) -> bool {
        self.ended || self.session.is_complete()
    }

    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        self.active_segment()
            .map(|s| s.remaining_ms(now_ms))
            .unwrap_or(0)
    }

    /// 0.0 .. 1.0 progress within the active segment.
    pub fn segment_progress(&self, now_ms: u64) -> f64 {
        self.active_segment()
            .map(|s| s.progress(now_ms))
            .unwrap_or(1.0)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self, now_ms: u64) -> Event {
        let segment = self.active_segment();
        Event::StateSnapshot {
            session_id: self.session.session_id(),
            active_index: self.active_index(),
            timer_type: segment.map(|s| s.timer_type).unwrap_or(TimerType::Focus),
            cycle_number: segment.map(|s| s.cycle_number).unwrap_or(0),
            status: segment.map(|s| s.status).unwrap_or(TimerStatus::Completed),
            remaining_ms: self.remaining_ms(now_ms),
            total_ms: segment.map(|s| s.duration_ms).unwrap_or(0),
            segment_progress: self.segment_progress(now_ms),
            session_progress_pct: (self.session.overall_progress(now_ms) * 100.0).min(100.0),
            is_complete: self.is_complete(),
            at: epoch_ms_to_utc(now_ms),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Call periodically. Completes the active segment once its deadline
    /// has passed and starts the next one.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.is_complete() {
            return events;
        }
        let index = self.active_index();
        let due = self
            .session
            .segments
            .get(index)
            .is_some_and(|s| s.is_due(now_ms));
        if due {
            self.advance(index, now_ms, &mut events);
        }
        events
    }

    /// Pause the running segment.
    ///
    /// A segment whose deadline has already passed completes instead; the
    /// completion events are returned and nothing is paused.
    pub fn pause(&mut self, now_ms: u64) -> Vec<Event> {
        let events = self.tick(now_ms);
        if !events.is_empty() || self.is_complete() {
            return events;
        }
        let index = self.active_index();
        match self.session.segments.get_mut(index) {
            Some(segment) if segment.status == TimerStatus::Running => {
                segment.pause(now_ms);
                vec![Event::SegmentPaused {
                    index,
                    remaining_ms: segment.remaining_ms(now_ms),
                    at: epoch_ms_to_utc(now_ms),
                }]
            }
            _ => Vec::new(),
        }
    }

    /// Resume the paused segment with the time it had left when paused.
    pub fn resume(&mut self, now_ms: u64) -> Vec<Event> {
        if self.is_complete() {
            return Vec::new();
        }
        let index = self.active_index();
        match self.session.segments.get_mut(index) {
            Some(segment) if segment.status == TimerStatus::Paused => {
                let paused_for = segment.resume(now_ms);
                let event = Event::SegmentResumed {
                    index,
                    remaining_ms: segment.remaining_ms(now_ms),
                    finished_at_epoch_ms: segment.finished_at_epoch_ms,
                    at: epoch_ms_to_utc(now_ms),
                };
                self.session.elapsed_pause_epoch_ms =
                    self.session.elapsed_pause_epoch_ms.saturating_add(paused_for);
                vec![event]
            }
            _ => Vec::new(),
        }
    }

    pub fn toggle_pause(&mut self, now_ms: u64) -> Vec<Event> {
        match self.active_segment().map(|s| s.status) {
            Some(TimerStatus::Running) => self.pause(now_ms),
            Some(TimerStatus::Paused) => self.resume(now_ms),
            _ => Vec::new(),
        }
    }

    /// End the session now: the active segment counts as completed and the
    /// remaining ones are dropped.
    pub fn finish(&mut self, now_ms: u64) -> Vec<Event> {
        let mut events = Vec::new();
        if self.is_complete() {
            return events;
        }
        let index = self.active_index();
        let mut paused_for = 0;
        if let Some(segment) = self.session.segments.get_mut(index) {
            if segment.status != TimerStatus::Completed {
                paused_for = segment.end_pause(now_ms);
                segment.complete();
                events.push(segment_completed(index, segment, now_ms));
            }
        }
        self.session.elapsed_pause_epoch_ms =
            self.session.elapsed_pause_epoch_ms.saturating_add(paused_for);
        self.ended = true;
        events.push(self.session_completed(now_ms));
        events
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Complete segment `index` and start the next one.
    /// Returns `false` when `index` was the last segment.
    fn advance(&mut self, index: usize, now_ms: u64, events: &mut Vec<Event>) -> bool {
        if let Some(segment) = self.session.segments.get_mut(index) {
            segment.complete();
            events.push(segment_completed(index, segment, now_ms));
        }

        match self.session.segments.get_mut(index + 1) {
            Some(next) => {
                next.start(now_ms);
                events.push(segment_started(index + 1, next, now_ms));
                tracing::debug!(index = index + 1, timer_type = ?next.timer_type, "segment started");
                true
            }
            None => {
                events.push(self.session_completed(now_ms));
                false
            }
        }
    }

    fn session_completed(&self, now_ms: u64) -> Event {
        tracing::debug!(session_id = %self.session.session_id(), "session completed");
        Event::SessionCompleted {
            summary: self.session.completion_summary(),
            at: epoch_ms_to_utc(now_ms),
        }
    }
}

fn segment_started(index: usize, segment: &TimerSegment, now_ms: u64) -> Event {
    Event::SegmentStarted {
        index,
        timer_type: segment.timer_type,
        cycle_number: segment.cycle_number,
        duration_ms: segment.duration_ms,
        finished_at_epoch_ms: segment.finished_at_epoch_ms,
        at: epoch_ms_to_utc(now_ms),
    }
}

fn segment_completed(index: usize, segment: &TimerSegment, now_ms: u64) -> Event {
    Event::SegmentCompleted {
        index,
        timer_type: segment.timer_type,
        cycle_number: segment.cycle_number,
        at: epoch_ms_to_utc(now_ms),
    }
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
