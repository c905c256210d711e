//! TOML-based application configuration.
//!
//! Stores:
//! - Session preferences (the `[preferences]` table)
//! - Appearance settings (the `[ui]` table)
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result as CoreResult};
use crate::preferences::{PomodoroPreferences, PreferencesStorage};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppTheme {
    #[default]
    Dark,
    Light,
}

/// UI configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub theme: AppTheme,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub preferences: PomodoroPreferences,
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => value
                    .parse::<bool>()
                    .map(serde_json::Value::Bool)
                    .map_err(|e| invalid(e.to_string()))?,
                serde_json::Value::Number(_) => {
                    if let Ok(n) = value.parse::<u64>() {
                        serde_json::Value::Number(n.into())
                    } else {
                        value
                            .parse::<f64>()
                            .ok()
                            .and_then(serde_json::Number::from_f64)
                            .map(serde_json::Value::Number)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                    }
                }
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown())
    }

    /// Default location of the config file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults if the file is missing.
    ///
    /// # Errors
    /// See [`Config::load_from`].
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults if the file is missing.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed,
    /// if the stored preferences are invalid, or if the default config
    /// cannot be written to disk.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config missing, writing defaults");
                let cfg = Self::default();
                cfg.save_to(path)?;
                return Ok(cfg);
            }
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })
            }
        };

        let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.preferences
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: "preferences".to_string(),
                message: e.to_string(),
            })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key.
    ///
    /// The config is left untouched when the key is unknown or the
    /// resulting config does not validate. Call [`Config::save`] to persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the value is invalid.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated
            .preferences
            .validate()
            .map_err(|e| invalid(e.to_string()))?;
        *self = updated;
        Ok(())
    }
}

/// [`PreferencesStorage`] backed by the `[preferences]` table of a config file.
#[derive(Debug, Clone)]
pub struct ConfigPreferencesStorage {
    path: PathBuf,
}

impl ConfigPreferencesStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Storage over the default config file.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open_default() -> Result<Self, ConfigError> {
        Ok(Self::new(Config::path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferencesStorage for ConfigPreferencesStorage {
    fn read(&self) -> CoreResult<PomodoroPreferences> {
        Ok(Config::load_from(&self.path)?.preferences)
    }

    fn write(&self, preferences: &PomodoroPreferences) -> CoreResult<()> {
        let mut cfg = Config::load_from(&self.path)?;
        cfg.preferences = preferences.clone();
        cfg.save_to(&self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preferences::PreferencesRepository;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert!(toml_str.contains("[preferences]"));
        assert!(toml_str.contains("theme = \"dark\""));
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let parsed: Config = toml::from_str("[preferences]\nfocus_minutes = 50\n").unwrap();
        assert_eq!(parsed.preferences.focus_minutes, 50);
        assert_eq!(parsed.preferences.repeat_count, 4);
        assert_eq!(parsed.ui.theme, AppTheme::Dark);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("ui.theme").as_deref(), Some("dark"));
        assert_eq!(cfg.get("preferences.focus_minutes").as_deref(), Some("25"));
        assert_eq!(
            cfg.get("preferences.long_break_enabled").as_deref(),
            Some("true")
        );
        assert!(cfg.get("ui.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_json_value_by_path_updates_nested_bool() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::set_json_value_by_path(&mut json, "preferences.always_on_display", "true")
            .unwrap();
        assert_eq!(
            Config::get_json_value_by_path(&json, "preferences.always_on_display").unwrap(),
            &serde_json::Value::Bool(true)
        );
    }

    #[test]
    fn set_json_value_by_path_rejects_unknown_key() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        let result = Config::set_json_value_by_path(&mut json, "ui.nonexistent_key", "value");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn set_updates_and_validates() {
        let mut cfg = Config::default();
        cfg.set("preferences.repeat_count", "6").unwrap();
        assert_eq!(cfg.preferences.repeat_count, 6);
        cfg.set("ui.theme", "light").unwrap();
        assert_eq!(cfg.ui.theme, AppTheme::Light);

        assert!(cfg.set("preferences.repeat_count", "0").is_err());
        assert!(cfg.set("preferences.focus_minutes", "-5").is_err());
        assert!(cfg.set("preferences.long_break_enabled", "maybe").is_err());
        assert!(cfg.set("ui.theme", "sepia").is_err());
        assert_eq!(cfg.preferences.repeat_count, 6);
        assert_eq!(cfg.ui.theme, AppTheme::Light);
    }

    #[test]
    fn load_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn load_rejects_invalid_preferences() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[preferences]\nrepeat_count = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "preferences = [").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn repository_over_config_file_keeps_ui_section() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.ui.theme = AppTheme::Light;
        cfg.save_to(&path).unwrap();

        let repo = PreferencesRepository::new(ConfigPreferencesStorage::new(&path));
        repo.update_focus_minutes(50).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.preferences.focus_minutes, 50);
        assert_eq!(reloaded.preferences.break_minutes, 10);
        assert_eq!(reloaded.ui.theme, AppTheme::Light);
    }
}
