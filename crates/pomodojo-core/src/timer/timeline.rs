//! Segment timeline builder.
//!
//! Turns preferences into the ordered list of segments a session runs
//! through. The final focus cycle is not followed by a break, so a session
//! of `n` cycles has `2n - 1` segments; [`super::hour_split`] uses the same
//! rule for its total.

use super::segment::{TimerSegment, TimerType};
use crate::preferences::PomodoroPreferences;

/// Build the segments for a session starting at `now_ms`.
///
/// The first segment comes back `Running` with its deadline set; all others
/// are `Initial`. Preferences are expected to be validated already: a
/// `repeat_count` of 0 yields an empty list.
pub fn build_segments(now_ms: u64, preferences: &PomodoroPreferences) -> Vec<TimerSegment> {
    let mut segments = plan_segments(preferences);
    if let Some(first) = segments.first_mut() {
        first.start(now_ms);
    }
    segments
}

/// The same sequence with every segment still `Initial`. Used for previews.
pub fn plan_segments(preferences: &PomodoroPreferences) -> Vec<TimerSegment> {
    let cycles = preferences.repeat_count;
    let mut segments = Vec::with_capacity((cycles as usize * 2).saturating_sub(1));

    for cycle in 1..=cycles {
        segments.push(TimerSegment::new(
            TimerType::Focus,
            cycle,
            preferences.focus_minutes,
        ));
        if cycle == cycles {
            break;
        }
        let segment = if preferences.is_long_break_point(cycle) {
            TimerSegment::new(TimerType::LongBreak, cycle, preferences.long_break_minutes)
        } else {
            TimerSegment::new(TimerType::ShortBreak, cycle, preferences.break_minutes)
        };
        segments.push(segment);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::segment::TimerStatus;

    fn prefs(repeat: u32, after: u32) -> PomodoroPreferences {
        PomodoroPreferences {
            repeat_count: repeat,
            focus_minutes: 25,
            break_minutes: 5,
            long_break_enabled: true,
            long_break_after: after,
            long_break_minutes: 15,
            always_on_display: false,
        }
    }

    #[test]
    fn five_cycles_every_second_long() {
        let segments = build_segments(0, &prefs(5, 2));
        let types: Vec<TimerType> = segments.iter().map(|s| s.timer_type).collect();
        use TimerType::*;
        assert_eq!(
            types,
            vec![Focus, ShortBreak, Focus, LongBreak, Focus, ShortBreak, Focus, LongBreak, Focus]
        );

        let long_cycles: Vec<u32> = segments
            .iter()
            .filter(|s| s.timer_type == LongBreak)
            .map(|s| s.cycle_number)
            .collect();
        assert_eq!(long_cycles, vec![2, 4]);

        let total_min: u64 = segments.iter().map(|s| s.duration_min()).sum();
        assert_eq!(total_min, 5 * 25 + 2 * 15 + 2 * 5);
    }

    #[test]
    fn first_segment_is_running() {
        let now = 1_700_000_000_000;
        let segments = build_segments(now, &prefs(3, 4));
        assert_eq!(segments[0].status, TimerStatus::Running);
        assert_eq!(segments[0].finished_at_epoch_ms, now + 25 * 60_000);
        assert!(segments[1..]
            .iter()
            .all(|s| s.status == TimerStatus::Initial && s.finished_at_epoch_ms == 0));
    }

    #[test]
    fn breaks_share_cycle_number_with_their_focus() {
        let segments = build_segments(0, &prefs(3, 4));
        let cycles: Vec<u32> = segments.iter().map(|s| s.cycle_number).collect();
        assert_eq!(cycles, vec![1, 1, 2, 2, 3]);
    }

    #[test]
    fn disabled_long_breaks_use_short_breaks_only() {
        let mut p = prefs(4, 2);
        p.long_break_enabled = false;
        let segments = build_segments(0, &p);
        assert!(segments.iter().all(|s| s.timer_type != TimerType::LongBreak));
        assert_eq!(segments.len(), 7);
    }

    #[test]
    fn single_cycle_has_no_break() {
        let segments = build_segments(0, &prefs(1, 1));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].timer_type, TimerType::Focus);
    }

    #[test]
    fn zero_repeat_builds_nothing() {
        assert!(build_segments(0, &prefs(0, 2)).is_empty());
    }

    #[test]
    fn plan_leaves_everything_initial() {
        assert!(plan_segments(&prefs(4, 2))
            .iter()
            .all(|s| s.status == TimerStatus::Initial));
    }
}
