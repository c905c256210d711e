//! Preferences repository: current value, atomic updates, change listeners.
//!
//! The repository sits on top of a [`PreferencesStorage`] backend (the TOML
//! config file in the app, memory in tests). Every update is a
//! read-modify-write under one lock, is validated before it is written, and
//! notifies subscribers only when the stored value actually changed.

use std::sync::{Arc, Mutex, MutexGuard};

use super::cascade::CascadeResolver;
use super::PomodoroPreferences;
use crate::error::Result;

/// Backend that persists a single [`PomodoroPreferences`] value.
pub trait PreferencesStorage: Send + Sync {
    /// Read the stored preferences, or defaults when nothing is stored yet.
    fn read(&self) -> Result<PomodoroPreferences>;

    fn write(&self, preferences: &PomodoroPreferences) -> Result<()>;
}

/// Callback invoked with the new value after every effective change.
///
/// Listeners run after the repository released its locks, so they may call
/// back into it.
pub type PreferencesListener = Arc<dyn Fn(&PomodoroPreferences) + Send + Sync>;

/// In-memory backend.
#[derive(Debug, Default)]
pub struct MemoryPreferencesStorage {
    value: Mutex<PomodoroPreferences>,
}

impl MemoryPreferencesStorage {
    pub fn new(initial: PomodoroPreferences) -> Self {
        Self {
            value: Mutex::new(initial),
        }
    }
}

impl PreferencesStorage for MemoryPreferencesStorage {
    fn read(&self) -> Result<PomodoroPreferences> {
        Ok(lock(&self.value).clone())
    }

    fn write(&self, preferences: &PomodoroPreferences) -> Result<()> {
        *lock(&self.value) = preferences.clone();
        Ok(())
    }
}

pub struct PreferencesRepository<S: PreferencesStorage> {
    storage: S,
    cascade: CascadeResolver,
    write_lock: Mutex<()>,
    listeners: Mutex<Vec<PreferencesListener>>,
}

impl<S: PreferencesStorage> PreferencesRepository<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            cascade: CascadeResolver::new(),
            write_lock: Mutex::new(()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Current stored preferences.
    pub fn preferences(&self) -> Result<PomodoroPreferences> {
        self.storage.read()
    }

    /// Register a listener for future changes.
    pub fn subscribe(&self, listener: PreferencesListener) {
        lock(&self.listeners).push(listener);
    }

    /// Atomically apply `edit` to the stored preferences.
    ///
    /// Returns the resulting value. Nothing is written (and no listener is
    /// called) when `edit` fails, validation fails, or the value is unchanged.
    ///
    /// # Errors
    /// Propagates storage errors, errors returned by `edit`, and validation
    /// errors.
    pub fn update<F>(&self, edit: F) -> Result<PomodoroPreferences>
    where
        F: FnOnce(&mut PomodoroPreferences) -> Result<()>,
    {
        let (next, changed) = {
            let _guard = lock(&self.write_lock);
            let current = self.storage.read()?;
            let mut next = current.clone();
            edit(&mut next)?;
            next.validate()?;

            let changed = next != current;
            if changed {
                self.storage.write(&next)?;
                tracing::debug!(?next, "preferences updated");
            }
            (next, changed)
        };

        if changed {
            let listeners: Vec<PreferencesListener> = lock(&self.listeners).clone();
            for listener in listeners {
                listener(&next);
            }
        }
        Ok(next)
    }

    pub fn update_repeat_count(&self, value: u32) -> Result<PomodoroPreferences> {
        self.update(|p| {
            p.repeat_count = value;
            Ok(())
        })
    }

    /// Set the focus length and reset break and long-break values to the
    /// matching preset.
    ///
    /// # Errors
    /// Fails with a cascade error for values outside the preset list.
    pub fn update_focus_minutes(&self, value: u32) -> Result<PomodoroPreferences> {
        let cascade = self.cascade.resolve_for_focus(value)?;
        self.update(|p| {
            p.focus_minutes = value;
            p.break_minutes = cascade.break_minutes;
            p.long_break_after = cascade.long_break_after_count;
            p.long_break_minutes = cascade.long_break_minutes;
            Ok(())
        })
    }

    /// Set the break length and reset the long-break values to the matching
    /// preset.
    ///
    /// # Errors
    /// Fails with a cascade error for values outside the preset list.
    pub fn update_break_minutes(&self, value: u32) -> Result<PomodoroPreferences> {
        let cascade = self.cascade.resolve_for_break(value)?;
        self.update(|p| {
            p.break_minutes = value;
            p.long_break_after = cascade.long_break_after_count;
            p.long_break_minutes = cascade.long_break_minutes;
            Ok(())
        })
    }

    pub fn update_long_break_enabled(&self, enabled: bool) -> Result<PomodoroPreferences> {
        self.update(|p| {
            p.long_break_enabled = enabled;
            Ok(())
        })
    }

    pub fn update_long_break_after(&self, value: u32) -> Result<PomodoroPreferences> {
        self.update(|p| {
            p.long_break_after = value;
            Ok(())
        })
    }

    pub fn update_long_break_minutes(&self, value: u32) -> Result<PomodoroPreferences> {
        self.update(|p| {
            p.long_break_minutes = value;
            Ok(())
        })
    }

    pub fn update_always_on_display(&self, enabled: bool) -> Result<PomodoroPreferences> {
        self.update(|p| {
            p.always_on_display = enabled;
            Ok(())
        })
    }
}

// A panicking listener must not wedge every later update.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
