//! TOML-based application configuration.
//!
//! Stores:
//! - Gate behavior (dev mode opens every day)
//! - Which year's themed week to run
//! - Countdown refresh interval
//!
//! Configuration is stored at `~/.config/weekgate/config.toml`.
//! `WEEKGATE_DEV_MODE=1` forces `gate.dev_mode` on for one run without
//! touching the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Datelike, Local};
use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::{ConfigError, ScheduleError};
use crate::gate::GateConfig;
use crate::schedule::Schedule;

/// Schedule-specific configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Year of the themed week; the current year when unset.
    #[serde(default)]
    pub year: Option<i32>,
}

/// Countdown configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountdownConfig {
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/weekgate/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub countdown: CountdownConfig,
}

fn default_tick_interval_ms() -> u64 {
    1000
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
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

        let (parents, leaf) = match key.rsplit_once('.') {
            Some((parents, leaf)) => (Some(parents), leaf),
            None => (None, key),
        };
        if leaf.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        if let Some(parents) = parents {
            for part in parents.split('.') {
                current = current.get_mut(part).ok_or_else(unknown)?;
            }
        }

        let obj = current.as_object_mut().ok_or_else(unknown)?;
        let existing = obj.get(leaf).ok_or_else(unknown)?;

        if value.trim() == "null" {
            obj.insert(leaf.to_string(), serde_json::Value::Null);
            return Ok(());
        }

        let new_value = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|e| invalid(format!("cannot parse '{value}' as bool: {e}")))?,
            ),
            serde_json::Value::Number(_) => value
                .parse::<i64>()
                .map(|n| serde_json::Value::Number(n.into()))
                .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
            }
            // Unset optional: take JSON if it parses, the raw string otherwise.
            serde_json::Value::Null => serde_json::from_str(value)
                .unwrap_or_else(|_| serde_json::Value::String(value.into())),
            serde_json::Value::String(_) => serde_json::Value::String(value.into()),
        };

        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data dir, writing defaults on first run, then apply
    /// environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = Self::load_from(&Self::path()?)?;
        cfg.apply_dev_mode_override(std::env::var("WEEKGATE_DEV_MODE").ok().as_deref());
        Ok(cfg)
    }

    /// Load from `path`, creating it with defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or created.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "config unavailable; using defaults");
            Self::default()
        })
    }

    /// Persist to the data dir.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
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

    /// Set a config value by dot-separated key. Does not save.
    ///
    /// `null` unsets an optional value such as `schedule.year`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        if let Some(year) = updated.schedule.year {
            Schedule::themed_week(year).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        }
        *self = updated;
        Ok(())
    }

    /// `"1"`/`"true"` forces dev mode on, `"0"`/`"false"` forces it off,
    /// anything else leaves the file's value.
    pub fn apply_dev_mode_override(&mut self, value: Option<&str>) {
        match value.map(str::trim) {
            Some("1") | Some("true") => self.gate.dev_mode = true,
            Some("0") | Some("false") => self.gate.dev_mode = false,
            Some(other) => tracing::warn!(value = other, "ignoring WEEKGATE_DEV_MODE"),
            None => {}
        }
    }

    pub fn gate_config(&self) -> GateConfig {
        self.gate
    }

    /// The themed week for the configured year, or the year of `now`.
    ///
    /// # Errors
    /// Fails when the configured year cannot hold the week (a hand-edited
    /// file; `set` refuses such years).
    pub fn schedule(&self, now: DateTime<Local>) -> Result<Schedule, ScheduleError> {
        Schedule::themed_week(self.schedule.year.unwrap_or_else(|| now.year()))
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.countdown.tick_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::local_midnight;
    use chrono::NaiveDate;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert!(!parsed.gate.dev_mode);
        assert_eq!(parsed.countdown.tick_interval_ms, 1000);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[gate]\ndev_mode = true\n").unwrap();
        assert!(parsed.gate.dev_mode);
        assert_eq!(parsed.schedule.year, None);
        assert_eq!(parsed.tick_interval(), Duration::from_secs(1));
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("gate.dev_mode").as_deref(), Some("false"));
        assert_eq!(cfg.get("countdown.tick_interval_ms").as_deref(), Some("1000"));
        assert_eq!(cfg.get("schedule.year").as_deref(), Some("null"));
        assert!(cfg.get("gate.missing_key").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut cfg = Config::default();
        cfg.set("gate.dev_mode", "true").unwrap();
        cfg.set("schedule.year", "2027").unwrap();
        cfg.set("countdown.tick_interval_ms", "250").unwrap();
        assert!(cfg.gate.dev_mode);
        assert_eq!(cfg.schedule.year, Some(2027));
        assert_eq!(cfg.tick_interval(), Duration::from_millis(250));
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("gate.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.set("", "1"), Err(ConfigError::UnknownKey(_))));
        assert!(matches!(
            cfg.set("gate.dev_mode", "not_a_bool"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("schedule.year", "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_from_creates_then_reads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let first = Config::load_from(&path).unwrap();
        assert_eq!(first, Config::default());
        assert!(path.exists());

        let mut changed = first;
        changed.set("schedule.year", "2030").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().schedule.year, Some(2030));
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "gate = [[[").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn dev_mode_override() {
        let mut cfg = Config::default();
        cfg.apply_dev_mode_override(Some("1"));
        assert!(cfg.gate_config().dev_mode);
        cfg.apply_dev_mode_override(Some("maybe"));
        assert!(cfg.gate_config().dev_mode);
        cfg.apply_dev_mode_override(Some("false"));
        assert!(!cfg.gate_config().dev_mode);
        cfg.apply_dev_mode_override(None);
        assert!(!cfg.gate_config().dev_mode);
    }

    #[test]
    fn schedule_year_falls_back_to_now() {
        let now = local_midnight(NaiveDate::from_ymd_opt(2031, 6, 1).unwrap());
        let cfg = Config::default();
        assert_eq!(
            cfg.schedule(now).unwrap().events()[0].target_date,
            NaiveDate::from_ymd_opt(2031, 2, 7).unwrap()
        );
    }

    #[test]
    fn set_rejects_year_without_a_themed_week() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("schedule.year", "999999"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg.schedule.year, None);

        cfg.schedule.year = Some(999_999);
        let now = local_midnight(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert!(matches!(
            cfg.schedule(now),
            Err(ScheduleError::InvalidDate(_))
        ));
    }

    #[test]
    fn null_unsets_optional_values() {
        let mut cfg = Config::default();
        cfg.set("schedule.year", "2027").unwrap();
        cfg.set("schedule.year", "null").unwrap();
        assert_eq!(cfg.schedule.year, None);
        assert_eq!(cfg.get("schedule.year").as_deref(), Some("null"));

        assert!(matches!(
            cfg.set("gate.dev_mode", "null"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            cfg.set("countdown.tick_interval_ms", "null"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(cfg, Config::default());
    }
}
