use serde::{Deserialize, Serialize};

use super::hour_split::build_hour_splits;
use super::segment::{format_duration_ms, TimerSegment, TimerStatus, TimerType, MILLIS_PER_MINUTE};
use super::timeline::build_segments;
use crate::error::ValidationError;
use crate::preferences::PomodoroPreferences;
use crate::quote::Quote;

/// Snapshot of a running session. This is what gets persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PomodoroSession {
    pub total_cycle: u32,
    pub started_at_epoch_ms: u64,
    /// Total time spent paused across the whole session.
    #[serde(default)]
    pub elapsed_pause_epoch_ms: u64,
    #[serde(default)]
    pub segments: Vec<TimerSegment>,
    #[serde(default)]
    pub hour_splits: Vec<u32>,
    #[serde(default)]
    pub quote: Quote,
}

impl PomodoroSession {
    /// Build a fresh session from validated preferences.
    ///
    /// # Errors
    /// Returns the validation error of the preferences.
    pub fn create(
        now_ms: u64,
        preferences: &PomodoroPreferences,
        quote: Quote,
    ) -> Result<Self, ValidationError> {
        preferences.validate()?;
        Ok(Self {
            total_cycle: preferences.repeat_count,
            started_at_epoch_ms: now_ms,
            elapsed_pause_epoch_ms: 0,
            segments: build_segments(now_ms, preferences),
            hour_splits: build_hour_splits(preferences),
            quote,
        })
    }

    /// Stable per-run identifier (the start timestamp).
    pub fn session_id(&self) -> String {
        self.started_at_epoch_ms.to_string()
    }

    /// Index of the segment the session is currently on.
    ///
    /// The first running or paused segment wins; otherwise the first one not
    /// yet completed; otherwise the last index (0 for an empty timeline).
    pub fn active_index(&self) -> usize {
        if let Some(i) = self.segments.iter().position(TimerSegment::is_active) {
            return i;
        }
        self.segments
            .iter()
            .position(|s| s.status != TimerStatus::Completed)
            .unwrap_or_else(|| self.segments.len().saturating_sub(1))
    }

    pub fn active_segment(&self) -> Option<&TimerSegment> {
        self.segments.get(self.active_index())
    }

    pub fn is_complete(&self) -> bool {
        !self.segments.is_empty()
            && self
                .segments
                .iter()
                .all(|s| s.status == TimerStatus::Completed)
    }

    pub fn is_paused(&self) -> bool {
        self.active_segment()
            .is_some_and(|s| s.status == TimerStatus::Paused)
    }

    pub fn total_duration_ms(&self) -> u64 {
        self.segments.iter().map(|s| s.duration_ms).sum()
    }

    /// 0.0 ..= 1.0 progress across the whole timeline at `now_ms`.
    pub fn overall_progress(&self, now_ms: u64) -> f64 {
        let total = self.total_duration_ms();
        if total == 0 {
            return 1.0;
        }
        let done: u64 = self
            .segments
            .iter()
            .map(|s| s.duration_ms - s.remaining_ms(now_ms).min(s.duration_ms))
            .sum();
        (done as f64 / total as f64).clamp(0.0, 1.0)
    }

    /// Totals over completed segments.
    pub fn completion_summary(&self) -> CompletionSummary {
        let mut focus_ms = 0u64;
        let mut break_ms = 0u64;
        let mut completed_cycles = 0u32;
        for segment in self
            .segments
            .iter()
            .filter(|s| s.status == TimerStatus::Completed)
        {
            match segment.timer_type {
                TimerType::Focus => {
                    focus_ms += segment.duration_ms;
                    completed_cycles += 1;
                }
                TimerType::ShortBreak | TimerType::LongBreak => break_ms += segment.duration_ms,
            }
        }
        CompletionSummary {
            session_id: self.session_id(),
            total_focus_minutes: focus_ms / MILLIS_PER_MINUTE,
            total_break_minutes: break_ms / MILLIS_PER_MINUTE,
            completed_cycles,
        }
    }

    /// What an ongoing-session notification should display at `now_ms`.
    pub fn notification_summary(&self, now_ms: u64) -> NotificationSummary {
        let complete = self.is_complete();
        let active = self.active_segment();
        let (title, remaining, progress, finish_time) = match active {
            Some(segment) if !complete => (
                segment_title(segment, self.total_cycle),
                segment.remaining_ms(now_ms),
                segment.progress(now_ms),
                segment.finished_at_epoch_ms,
            ),
            _ => ("Session complete".to_string(), 0, 1.0, 0),
        };
        NotificationSummary {
            session_id: self.session_id(),
            title,
            timer_text: format_duration_ms(remaining),
            segment_progress_percent: (progress * 100.0).round() as u8,
            is_paused: self.is_paused(),
            finish_time_epoch_ms: finish_time,
            quote: self.quote.with_attribution(),
            all_segments_completed: complete,
        }
    }
}

fn segment_title(segment: &TimerSegment, total_cycle: u32) -> String {
    match segment.timer_type {
        TimerType::Focus => format!("Focus {} of {}", segment.cycle_number, total_cycle),
        other => other.label().to_string(),
    }
}

/// Totals handed to the history store when a session ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionSummary {
    pub session_id: String,
    pub total_focus_minutes: u64,
    pub total_break_minutes: u64,
    pub completed_cycles: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSummary {
    pub session_id: String,
    pub title: String,
    pub timer_text: String,
    pub segment_progress_percent: u8,
    pub is_paused: bool,
    pub finish_time_epoch_ms: u64,
    pub quote: String,
    pub all_segments_completed: bool,
}
