//! User-configured session preferences.
//!
//! [`PomodoroPreferences`] is the input of the timeline and hour-split
//! builders. Values are validated where they enter the system (config load,
//! repository updates, session creation); the builders trust them.

mod cascade;
mod repository;

pub use cascade::{BreakCascade, CascadeResolver, FocusCascade, BREAK_OPTIONS, FOCUS_OPTIONS};
pub use repository::{
    MemoryPreferencesStorage, PreferencesListener, PreferencesRepository, PreferencesStorage,
};

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

pub const DEFAULT_REPEAT_COUNT: u32 = 4;
pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_AFTER: u32 = 4;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 10;

/// Upper bound on `repeat_count`.
pub const MAX_REPEAT_COUNT: u32 = 99;
/// Upper bound on every minute value: one day.
pub const MAX_SEGMENT_MINUTES: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroPreferences {
    /// Number of focus cycles in a session.
    #[serde(default = "default_repeat_count")]
    pub repeat_count: u32,
    #[serde(default = "default_focus_minutes")]
    pub focus_minutes: u32,
    #[serde(default = "default_break_minutes")]
    pub break_minutes: u32,
    #[serde(default = "default_true")]
    pub long_break_enabled: bool,
    /// A long break replaces the short break after every N-th cycle.
    #[serde(default = "default_long_break_after")]
    pub long_break_after: u32,
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u32,
    /// Keep the screen awake while a session runs. Display-only.
    #[serde(default)]
    pub always_on_display: bool,
}

fn default_repeat_count() -> u32 {
    DEFAULT_REPEAT_COUNT
}
fn default_focus_minutes() -> u32 {
    DEFAULT_FOCUS_MINUTES
}
fn default_break_minutes() -> u32 {
    DEFAULT_BREAK_MINUTES
}
fn default_long_break_after() -> u32 {
    DEFAULT_LONG_BREAK_AFTER
}
fn default_long_break_minutes() -> u32 {
    DEFAULT_LONG_BREAK_MINUTES
}
fn default_true() -> bool {
    true
}

impl Default for PomodoroPreferences {
    fn default() -> Self {
        Self {
            repeat_count: DEFAULT_REPEAT_COUNT,
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            break_minutes: DEFAULT_BREAK_MINUTES,
            long_break_enabled: true,
            long_break_after: DEFAULT_LONG_BREAK_AFTER,
            long_break_minutes: DEFAULT_LONG_BREAK_MINUTES,
            always_on_display: false,
        }
    }
}

impl PomodoroPreferences {
    /// Check the invariants the builders rely on.
    ///
    /// # Errors
    /// Returns the first offending field: every count and minute value must
    /// be positive, and `long_break_after` must be positive while long
    /// breaks are enabled.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let positive = [
            ("repeat_count", self.repeat_count),
            ("focus_minutes", self.focus_minutes),
            ("break_minutes", self.break_minutes),
            ("long_break_minutes", self.long_break_minutes),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ValidationError::invalid(field, "must be greater than 0"));
            }
        }
        if self.repeat_count > MAX_REPEAT_COUNT {
            return Err(ValidationError::invalid(
                "repeat_count",
                format!("must be at most {MAX_REPEAT_COUNT}"),
            ));
        }
        let minutes = [
            ("focus_minutes", self.focus_minutes),
            ("break_minutes", self.break_minutes),
            ("long_break_minutes", self.long_break_minutes),
        ];
        for (field, value) in minutes {
            if value > MAX_SEGMENT_MINUTES {
                return Err(ValidationError::invalid(
                    field,
                    format!("must be at most {MAX_SEGMENT_MINUTES}"),
                ));
            }
        }
        if self.long_break_enabled && self.long_break_after == 0 {
            return Err(ValidationError::invalid(
                "long_break_after",
                "must be greater than 0 when long breaks are enabled",
            ));
        }
        Ok(())
    }

    /// Whether the break after `cycle` (1-based) is a long one.
    pub fn is_long_break_point(&self, cycle: u32) -> bool {
        self.long_break_enabled && self.long_break_after > 0 && cycle % self.long_break_after == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PomodoroPreferences::default().validate().is_ok());
    }

    #[test]
    fn zero_values_are_rejected() {
        let prefs = PomodoroPreferences {
            focus_minutes: 0,
            ..Default::default()
        };
        match prefs.validate() {
            Err(ValidationError::InvalidValue { field, .. }) => assert_eq!(field, "focus_minutes"),
            other => panic!("expected focus_minutes error, got {other:?}"),
        }

        let prefs = PomodoroPreferences {
            repeat_count: 0,
            ..Default::default()
        };
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let prefs = PomodoroPreferences {
            repeat_count: 1_000_000_000,
            ..Default::default()
        };
        assert!(matches!(
            prefs.validate(),
            Err(ValidationError::InvalidValue { field, .. }) if field == "repeat_count"
        ));

        let prefs = PomodoroPreferences {
            repeat_count: u32::MAX,
            focus_minutes: u32::MAX,
            break_minutes: u32::MAX,
            ..Default::default()
        };
        assert!(prefs.validate().is_err());

        let prefs = PomodoroPreferences {
            repeat_count: MAX_REPEAT_COUNT,
            focus_minutes: MAX_SEGMENT_MINUTES,
            break_minutes: MAX_SEGMENT_MINUTES,
            long_break_minutes: MAX_SEGMENT_MINUTES,
            ..Default::default()
        };
        assert!(prefs.validate().is_ok());
    }

    #[test]
    fn long_break_after_only_matters_when_enabled() {
        let mut prefs = PomodoroPreferences {
            long_break_after: 0,
            ..Default::default()
        };
        assert!(prefs.validate().is_err());

        prefs.long_break_enabled = false;
        assert!(prefs.validate().is_ok());
        assert!(!prefs.is_long_break_point(4));
    }

    #[test]
    fn long_break_points_follow_cadence() {
        let prefs = PomodoroPreferences {
            long_break_after: 2,
            ..Default::default()
        };
        let points: Vec<u32> = (1..=6).filter(|c| prefs.is_long_break_point(*c)).collect();
        assert_eq!(points, vec![2, 4, 6]);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let prefs: PomodoroPreferences = toml::from_str("focus_minutes = 50").unwrap();
        assert_eq!(prefs.focus_minutes, 50);
        assert_eq!(prefs.repeat_count, DEFAULT_REPEAT_COUNT);
        assert!(prefs.long_break_enabled);
    }
}
