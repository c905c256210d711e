use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{CompletionSummary, TimerStatus, TimerType};

/// Every state change of a session produces an Event.
/// The CLI prints them; notifiers and sound players subscribe to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        session_id: String,
        total_cycle: u32,
        segment_count: usize,
        at: DateTime<Utc>,
    },
    /// A segment became the running one.
    SegmentStarted {
        index: usize,
        timer_type: TimerType,
        cycle_number: u32,
        duration_ms: u64,
        finished_at_epoch_ms: u64,
        at: DateTime<Utc>,
    },
    SegmentCompleted {
        index: usize,
        timer_type: TimerType,
        cycle_number: u32,
        at: DateTime<Utc>,
    },
    SegmentPaused {
        index: usize,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    SegmentResumed {
        index: usize,
        remaining_ms: u64,
        finished_at_epoch_ms: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        summary: CompletionSummary,
        at: DateTime<Utc>,
    },
    /// The session was discarded without recording history.
    SessionCancelled {
        session_id: String,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        session_id: String,
        active_index: usize,
        timer_type: TimerType,
        cycle_number: u32,
        status: TimerStatus,
        remaining_ms: u64,
        total_ms: u64,
        segment_progress: f64,
        session_progress_pct: f64,
        is_complete: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Segment and session completions are the events a sound player cares
    /// about.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            Event::SegmentCompleted { .. } | Event::SessionCompleted { .. }
        )
    }
}

/// Receiver of session events (notifier, sound player, logger).
///
/// Delivery is fire-and-forget: listeners cannot fail the transition that
/// produced the event.
pub trait EventListener {
    fn on_event(&self, event: &Event);
}

impl<F> EventListener for F
where
    F: Fn(&Event),
{
    fn on_event(&self, event: &Event) {
        self(event)
    }
}

/// Epoch milliseconds as a UTC timestamp.
pub fn epoch_ms_to_utc(ms: u64) -> DateTime<Utc> {
    i64::try_from(ms)
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let event = Event::SegmentPaused {
            index: 2,
            remaining_ms: 1_000,
            at: epoch_ms_to_utc(0),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SegmentPaused");
        assert_eq!(json["index"], 2);
    }

    #[test]
    fn epoch_conversion() {
        assert_eq!(epoch_ms_to_utc(1_500).timestamp_millis(), 1_500);
        assert_eq!(epoch_ms_to_utc(u64::MAX), DateTime::<Utc>::default());
    }

    #[test]
    fn closures_are_listeners() {
        let seen = std::cell::Cell::new(0);
        let listener = |e: &Event| {
            if e.is_completion() {
                seen.set(seen.get() + 1);
            }
        };
        listener.on_event(&Event::SessionCancelled {
            session_id: "1".into(),
            at: epoch_ms_to_utc(0),
        });
        listener.on_event(&Event::SegmentCompleted {
            index: 0,
            timer_type: TimerType::Focus,
            cycle_number: 1,
            at: epoch_ms_to_utc(0),
        });
        assert_eq!(seen.get(), 1);
    }
}
