//! # Pomodojo Core Library
//!
//! This library provides the core logic of the Pomodojo Pomodoro timer. The
//! `pomodojo` CLI is a thin layer over it; every operation is available here.
//!
//! ## Architecture
//!
//! - **Preferences**: user-configured durations with preset cascades
//! - **Timer**: pure timeline and hour-split builders plus a wall-clock
//!   state machine that requires the caller to periodically invoke `tick()`
//! - **Storage**: SQLite snapshot and history persistence, TOML configuration
//! - **Controller**: the single owner of the active session
//!
//! ## Key Components
//!
//! - [`SessionEngine`]: segment state machine
//! - [`SessionController`]: engine plus persistence, history and listeners
//! - [`Database`]: snapshot and history persistence
//! - [`Config`]: application configuration management

pub mod controller;
pub mod error;
pub mod events;
pub mod preferences;
pub mod quote;
pub mod storage;
pub mod timer;

pub use controller::SessionController;
pub use error::{CascadeError, ConfigError, CoreError, DatabaseError, ValidationError};
pub use events::{Event, EventListener};
pub use preferences::{CascadeResolver, PomodoroPreferences, PreferencesRepository};
pub use quote::{Quote, QuoteBook};
pub use storage::{ActiveSessionStore, Config, Database, HistoryStore};
pub use timer::{now_ms, PomodoroSession, SessionEngine, TimerSegment, TimerStatus, TimerType};
