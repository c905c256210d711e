mod active_session;
mod config;
pub mod database;
mod history;
pub mod migrations;

pub use active_session::{ActiveSessionStore, MemorySessionStore, ACTIVE_SESSION_KEY};
pub use config::{AppTheme, Config, ConfigPreferencesStorage, UiConfig};
pub use database::Database;
pub use history::{
    DailyHistory, HistoryRecord, HistoryStore, HistorySummary, MemoryHistoryStore,
};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns the pomodojo data directory, creating it if needed.
///
/// `POMODOJO_DATA_DIR` wins when set. Otherwise `~/.config/pomodojo[-dev]/`,
/// where the `-dev` suffix is chosen by `POMODOJO_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let dir = match std::env::var_os("POMODOJO_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMODOJO_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomodojo-dev")
            } else {
                base_dir.join("pomodojo")
            }
        }
    };

    std::fs::create_dir_all(&dir).map_err(|source| ConfigError::DataDir {
        path: dir.clone(),
        source,
    })?;
    Ok(dir)
}
