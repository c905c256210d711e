use clap::Subcommand;
use pomodojo_core::preferences::{PreferencesRepository, BREAK_OPTIONS, FOCUS_OPTIONS};
use pomodojo_core::storage::ConfigPreferencesStorage;
use pomodojo_core::timer::{build_hour_splits, plan_segments, total_duration_min};
use serde_json::json;

use super::print_json;

#[derive(Subcommand)]
pub enum PreferencesAction {
    /// Print the current preferences as JSON
    Show,
    /// Set the focus length; break and long-break values follow the preset
    Focus {
        /// One of 10, 25, 50
        minutes: u32,
    },
    /// Set the break length; long-break values follow the preset
    Break {
        /// One of 2, 5, 10
        minutes: u32,
    },
    /// Set the number of focus cycles per session
    Repeat { count: u32 },
    /// Adjust long-break settings
    LongBreak {
        #[arg(long)]
        enabled: Option<bool>,
        /// Long break after every N-th cycle
        #[arg(long)]
        after: Option<u32>,
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Preview the session timeline the current preferences produce
    Timeline,
}

pub fn run(action: PreferencesAction) -> Result<(), Box<dyn std::error::Error>> {
    let repo = PreferencesRepository::new(ConfigPreferencesStorage::open_default()?);

    let preferences = match action {
        PreferencesAction::Show => repo.preferences()?,
        PreferencesAction::Focus { minutes } => repo.update_focus_minutes(minutes)?,
        PreferencesAction::Break { minutes } => repo.update_break_minutes(minutes)?,
        PreferencesAction::Repeat { count } => repo.update_repeat_count(count)?,
        PreferencesAction::LongBreak {
            enabled,
            after,
            minutes,
        } => repo.update(|p| {
            if let Some(enabled) = enabled {
                p.long_break_enabled = enabled;
            }
            if let Some(after) = after {
                p.long_break_after = after;
            }
            if let Some(minutes) = minutes {
                p.long_break_minutes = minutes;
            }
            Ok(())
        })?,
        PreferencesAction::Timeline => {
            let preferences = repo.preferences()?;
            let segments: Vec<_> = plan_segments(&preferences)
                .iter()
                .map(|s| {
                    json!({
                        "timer_type": s.timer_type,
                        "cycle_number": s.cycle_number,
                        "minutes": s.duration_min(),
                    })
                })
                .collect();
            return print_json(&json!({
                "segments": segments,
                "total_minutes": total_duration_min(&preferences),
                "hour_splits": build_hour_splits(&preferences),
            }));
        }
    };

    print_json(&json!({
        "preferences": preferences,
        "focus_options": FOCUS_OPTIONS,
        "break_options": BREAK_OPTIONS,
    }))
}
