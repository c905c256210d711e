use serde::{Deserialize, Serialize};

pub const MILLIS_PER_MINUTE: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerType {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerType {
    pub fn is_break(self) -> bool {
        matches!(self, TimerType::ShortBreak | TimerType::LongBreak)
    }

    pub fn label(self) -> &'static str {
        match self {
            TimerType::Focus => "Focus",
            TimerType::ShortBreak => "Short Break",
            TimerType::LongBreak => "Long Break",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Initial,
    Running,
    Paused,
    Completed,
}

/// One timed phase of a session.
///
/// All timestamps are epoch milliseconds; `0` means "unset".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSegment {
    pub timer_type: TimerType,
    /// 1-based cycle this segment belongs to.
    pub cycle_number: u32,
    pub duration_ms: u64,
    /// Absolute deadline while running (and the frozen one while paused).
    #[serde(default)]
    pub finished_at_epoch_ms: u64,
    #[serde(default)]
    pub started_pause_at_epoch_ms: u64,
    /// Total time spent paused in this segment.
    #[serde(default)]
    pub elapsed_pause_ms: u64,
    pub status: TimerStatus,
}

impl TimerSegment {
    pub fn new(timer_type: TimerType, cycle_number: u32, duration_min: u32) -> Self {
        Self {
            timer_type,
            cycle_number,
            duration_ms: u64::from(duration_min).saturating_mul(MILLIS_PER_MINUTE),
            finished_at_epoch_ms: 0,
            started_pause_at_epoch_ms: 0,
            elapsed_pause_ms: 0,
            status: TimerStatus::Initial,
        }
    }

    pub fn duration_min(&self) -> u64 {
        self.duration_ms / MILLIS_PER_MINUTE
    }

    /// Remaining time at `now_ms`.
    ///
    /// Paused segments report the value frozen at the instant the pause
    /// began, whatever `now_ms` is.
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.status {
            TimerStatus::Initial => self.duration_ms,
            TimerStatus::Running => self.finished_at_epoch_ms.saturating_sub(now_ms),
            TimerStatus::Paused => self
                .finished_at_epoch_ms
                .saturating_sub(self.started_pause_at_epoch_ms),
            TimerStatus::Completed => 0,
        }
    }

    /// 0.0 ..= 1.0 progress at `now_ms`.
    pub fn progress(&self, now_ms: u64) -> f64 {
        calculate_progress(self.duration_ms, self.remaining_ms(now_ms))
    }

    /// Running and past its deadline.
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.status == TimerStatus::Running && self.remaining_ms(now_ms) == 0
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, TimerStatus::Running | TimerStatus::Paused)
    }

    // ── Transitions ──────────────────────────────────────────────────

    pub(crate) fn start(&mut self, now_ms: u64) {
        self.status = TimerStatus::Running;
        self.finished_at_epoch_ms = now_ms.saturating_add(self.duration_ms);
        self.started_pause_at_epoch_ms = 0;
        self.elapsed_pause_ms = 0;
    }

    pub(crate) fn pause(&mut self, now_ms: u64) {
        self.status = TimerStatus::Paused;
        self.started_pause_at_epoch_ms = now_ms;
    }

    /// Resume a paused segment. Returns how long the pause lasted.
    pub(crate) fn resume(&mut self, now_ms: u64) -> u64 {
        let paused_at = if self.started_pause_at_epoch_ms > 0 {
            self.started_pause_at_epoch_ms
        } else {
            now_ms
        };
        let remaining = self.finished_at_epoch_ms.saturating_sub(paused_at);
        let paused_for = now_ms.saturating_sub(paused_at);

        self.status = TimerStatus::Running;
        self.finished_at_epoch_ms = now_ms.saturating_add(remaining);
        self.elapsed_pause_ms = self.elapsed_pause_ms.saturating_add(paused_for);
        self.started_pause_at_epoch_ms = 0;
        paused_for
    }

    /// Close an open pause without resuming. Returns how long it lasted.
    pub(crate) fn end_pause(&mut self, now_ms: u64) -> u64 {
        if self.status != TimerStatus::Paused {
            return 0;
        }
        let paused_for = now_ms.saturating_sub(self.started_pause_at_epoch_ms);
        self.elapsed_pause_ms = self.elapsed_pause_ms.saturating_add(paused_for);
        self.started_pause_at_epoch_ms = 0;
        paused_for
    }

    pub(crate) fn complete(&mut self) {
        self.status = TimerStatus::Completed;
        self.started_pause_at_epoch_ms = 0;
    }
}

/// Fraction of `duration_ms` already elapsed, clamped to `0.0..=1.0`.
///
/// A non-positive duration counts as fully complete.
pub fn calculate_progress(duration_ms: u64, remaining_ms: u64) -> f64 {
    if duration_ms == 0 {
        return 1.0;
    }
    let completed = duration_ms - remaining_ms.min(duration_ms);
    (completed as f64 / duration_ms as f64).clamp(0.0, 1.0)
}

/// `MM:SS`, rounding partial seconds up so a timer never shows `00:00`
/// while time is left.
pub fn format_duration_ms(ms: u64) -> String {
    let total_secs = ms.div_ceil(1_000);
    format!("{:02}:{:02}", total_secs / 60, total_secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(duration_ms: u64, finished_at: u64) -> TimerSegment {
        TimerSegment {
            timer_type: TimerType::Focus,
            cycle_number: 1,
            duration_ms,
            finished_at_epoch_ms: finished_at,
            started_pause_at_epoch_ms: 0,
            elapsed_pause_ms: 0,
            status: TimerStatus::Running,
        }
    }

    #[test]
    fn running_segment_with_ten_minutes_left() {
        let finished_at = 10_000_000;
        let seg = running(1_500_000, finished_at);
        let now = finished_at - 600_000;
        assert_eq!(seg.remaining_ms(now), 600_000);
        assert!((seg.progress(now) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn remaining_by_status() {
        let mut seg = TimerSegment::new(TimerType::ShortBreak, 1, 5);
        assert_eq!(seg.remaining_ms(123), 300_000);
        assert_eq!(seg.progress(123), 0.0);

        seg.start(1_000);
        assert_eq!(seg.remaining_ms(1_000), 300_000);
        assert_eq!(seg.remaining_ms(1_000 + 400_000), 0);

        seg.complete();
        assert_eq!(seg.remaining_ms(0), 0);
        assert_eq!(seg.progress(0), 1.0);
    }

    #[test]
    fn paused_remaining_is_frozen() {
        let mut seg = TimerSegment::new(TimerType::Focus, 1, 25);
        seg.start(0);
        seg.pause(60_000);
        let frozen = seg.remaining_ms(60_000);
        assert_eq!(frozen, 1_440_000);
        for later in [60_001, 120_000, 10_000_000] {
            assert_eq!(seg.remaining_ms(later), frozen);
        }
    }

    #[test]
    fn resume_shifts_deadline_by_pause_length() {
        let mut seg = TimerSegment::new(TimerType::Focus, 1, 25);
        seg.start(0);
        seg.pause(60_000);
        let paused_for = seg.resume(180_000);

        assert_eq!(paused_for, 120_000);
        assert_eq!(seg.status, TimerStatus::Running);
        assert_eq!(seg.finished_at_epoch_ms, 1_500_000 + 120_000);
        assert_eq!(seg.elapsed_pause_ms, 120_000);
        assert_eq!(seg.started_pause_at_epoch_ms, 0);
        assert_eq!(seg.remaining_ms(180_000), 1_440_000);
    }

    #[test]
    fn zero_duration_counts_as_complete() {
        assert_eq!(calculate_progress(0, 0), 1.0);
        assert_eq!(calculate_progress(0, 500), 1.0);
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(calculate_progress(1_000, 5_000), 0.0);
        assert_eq!(calculate_progress(1_000, 0), 1.0);
    }

    #[test]
    fn due_only_when_running_past_deadline() {
        let seg = running(1_000, 5_000);
        assert!(!seg.is_due(4_999));
        assert!(seg.is_due(5_000));

        let mut paused = seg.clone();
        paused.pause(4_000);
        assert!(!paused.is_due(9_000));
    }

    #[test]
    fn format_rounds_up_partial_seconds() {
        assert_eq!(format_duration_ms(0), "00:00");
        assert_eq!(format_duration_ms(1), "00:01");
        assert_eq!(format_duration_ms(59_001), "01:00");
        assert_eq!(format_duration_ms(1_500_000), "25:00");
    }
}
