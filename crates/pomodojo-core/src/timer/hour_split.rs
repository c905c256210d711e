//! Display partition of a session's total length into hour chunks.

use crate::preferences::PomodoroPreferences;

/// Total session length in minutes.
///
/// Counts one break per cycle except the last, matching
/// [`super::timeline::build_segments`].
pub fn total_duration_min(preferences: &PomodoroPreferences) -> u64 {
    let cycles = u64::from(preferences.repeat_count);
    let breaks = cycles.saturating_sub(1);
    let long_breaks = if preferences.long_break_enabled && preferences.long_break_after > 0 {
        breaks / u64::from(preferences.long_break_after)
    } else {
        0
    };
    let short_breaks = breaks - long_breaks;

    cycles
        .saturating_mul(u64::from(preferences.focus_minutes))
        .saturating_add(short_breaks.saturating_mul(u64::from(preferences.break_minutes)))
        .saturating_add(long_breaks.saturating_mul(u64::from(preferences.long_break_minutes)))
}

/// Split the total length into 60-minute chunks plus a trailing remainder.
pub fn build_hour_splits(preferences: &PomodoroPreferences) -> Vec<u32> {
    let total = total_duration_min(preferences);
    let full_hours = total / 60;
    let remainder = total % 60;

    let mut splits: Vec<u32> = (0..full_hours).map(|_| 60).collect();
    if remainder != 0 {
        splits.push(u32::try_from(remainder).unwrap_or(59));
    }
    splits
}
