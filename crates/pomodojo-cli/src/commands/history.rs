use chrono::{Datelike, Local};
use clap::Subcommand;
use pomodojo_core::storage::{DailyHistory, Database};

use super::print_json;

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Totals for today
    Today,
    /// Per-day totals for a year
    Year {
        /// Defaults to the current year
        year: Option<i32>,
    },
    /// Years that have history
    Years,
}

pub fn run(action: HistoryAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        HistoryAction::Today => {
            let today = db.history_today()?.unwrap_or_else(|| DailyHistory {
                date: Local::now().date_naive(),
                focus_minutes: 0,
                break_minutes: 0,
                completed_cycles: 0,
            });
            print_json(&today)
        }
        HistoryAction::Year { year } => {
            let year = year.unwrap_or_else(|| Local::now().year());
            print_json(&db.history_for_year(year)?)
        }
        HistoryAction::Years => print_json(&db.available_years()?),
    }
}
