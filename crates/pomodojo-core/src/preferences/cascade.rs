//! Preset cascades for focus and break durations.
//!
//! Picking a focus or break length in the preferences resets the dependent
//! values to product-decided presets. This is a lookup table, not a formula:
//! values outside the preset lists are rejected.

use serde::{Deserialize, Serialize};

use crate::error::{CascadeError, DurationKind};

/// Focus lengths offered in the preferences, in minutes.
pub const FOCUS_OPTIONS: [u32; 3] = [10, 25, 50];

/// Break lengths offered in the preferences, in minutes.
pub const BREAK_OPTIONS: [u32; 3] = [2, 5, 10];

/// Values derived from a focus length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusCascade {
    pub break_minutes: u32,
    pub long_break_after_count: u32,
    pub long_break_minutes: u32,
}

/// Values derived from a break length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakCascade {
    pub long_break_after_count: u32,
    pub long_break_minutes: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CascadeResolver;

impl CascadeResolver {
    pub fn new() -> Self {
        Self
    }

    /// # Errors
    /// Returns [`CascadeError::UnsupportedDuration`] unless `minutes` is one
    /// of [`FOCUS_OPTIONS`].
    pub fn resolve_for_focus(&self, minutes: u32) -> Result<FocusCascade, CascadeError> {
        let cascade = match minutes {
            10 => FocusCascade {
                break_minutes: 2,
                long_break_after_count: 6,
                long_break_minutes: 4,
            },
            25 => FocusCascade {
                break_minutes: 5,
                long_break_after_count: 4,
                long_break_minutes: 10,
            },
            50 => FocusCascade {
                break_minutes: 10,
                long_break_after_count: 2,
                long_break_minutes: 20,
            },
            _ => {
                return Err(CascadeError::UnsupportedDuration {
                    kind: DurationKind::Focus,
                    minutes,
                })
            }
        };
        Ok(cascade)
    }

    /// # Errors
    /// Returns [`CascadeError::UnsupportedDuration`] unless `minutes` is one
    /// of [`BREAK_OPTIONS`].
    pub fn resolve_for_break(&self, minutes: u32) -> Result<BreakCascade, CascadeError> {
        let (long_break_after_count, long_break_minutes) = match minutes {
            2 => (6, 4),
            5 => (4, 10),
            10 => (2, 20),
            _ => {
                return Err(CascadeError::UnsupportedDuration {
                    kind: DurationKind::Break,
                    minutes,
                })
            }
        };
        Ok(BreakCascade {
            long_break_after_count,
            long_break_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_fifty_resolves_to_long_session_preset() {
        let cascade = CascadeResolver::new().resolve_for_focus(50).unwrap();
        assert_eq!(
            cascade,
            FocusCascade {
                break_minutes: 10,
                long_break_after_count: 2,
                long_break_minutes: 20,
            }
        );
    }

    #[test]
    fn every_focus_option_resolves() {
        let resolver = CascadeResolver::new();
        for minutes in FOCUS_OPTIONS {
            let cascade = resolver.resolve_for_focus(minutes).unwrap();
            assert!(BREAK_OPTIONS.contains(&cascade.break_minutes));
        }
    }

    #[test]
    fn focus_and_break_tables_agree() {
        // Choosing a focus value and then its derived break value must not
        // change the long-break settings a second time.
        let resolver = CascadeResolver::new();
        for minutes in FOCUS_OPTIONS {
            let focus = resolver.resolve_for_focus(minutes).unwrap();
            let brk = resolver.resolve_for_break(focus.break_minutes).unwrap();
            assert_eq!(brk.long_break_after_count, focus.long_break_after_count);
            assert_eq!(brk.long_break_minutes, focus.long_break_minutes);
        }
    }

    #[test]
    fn unsupported_values_fail() {
        let resolver = CascadeResolver::new();
        assert_eq!(
            resolver.resolve_for_focus(99),
            Err(CascadeError::UnsupportedDuration {
                kind: DurationKind::Focus,
                minutes: 99,
            })
        );
        assert!(resolver.resolve_for_break(0).is_err());
        assert!(resolver.resolve_for_break(25).is_err());
    }

    #[test]
    fn break_five_resolves_to_default_cadence() {
        let cascade = CascadeResolver::new().resolve_for_break(5).unwrap();
        assert_eq!(cascade.long_break_after_count, 4);
        assert_eq!(cascade.long_break_minutes, 10);
    }
}
