//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Streak gap tolerance
//! - Weekly recap window and roast triggers
//! - Output formatting
//!
//! Configuration is stored at `~/.config/pactroom/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::recap::RecapConfig;
use crate::stats::{StreakPolicy, GAP_TOLERANCE_DAYS};

/// Streak detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakConfig {
    /// Days allowed between successes before a streak breaks
    #[serde(default = "default_gap_tolerance")]
    pub gap_tolerance_days: i64,
}

/// Weekly recap settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecapSection {
    #[serde(default = "default_window_days")]
    pub window_days: u32,
    #[serde(default = "default_true")]
    pub roast_on_fold: bool,
    #[serde(default = "default_true")]
    pub roast_on_missed: bool,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_true")]
    pub pretty_json: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pactroom/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub recap: RecapSection,
    #[serde(default)]
    pub display: DisplayConfig,
}

fn default_gap_tolerance() -> i64 {
    GAP_TOLERANCE_DAYS
}
/// Longest recap window accepted, roughly ten years.
pub const MAX_RECAP_WINDOW_DAYS: u32 = 3660;

fn default_window_days() -> u32 {
    7
}
fn default_true() -> bool {
    true
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            gap_tolerance_days: default_gap_tolerance(),
        }
    }
}

impl Default for RecapSection {
    fn default() -> Self {
        Self {
            window_days: default_window_days(),
            roast_on_fold: true,
            roast_on_missed: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { pretty_json: true }
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

        if key.is_empty() {
            return Err(unknown());
        }

        let mut parts = key.split('.').peekable();

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let new_value = match existing {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                ),
                serde_json::Value::Number(_) => value
                    .parse::<i64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as integer")))?,
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

    /// Path of the config file inside the data directory.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn path() -> Result<PathBuf, ConfigError> {
        data_dir()
            .map(|dir| dir.join("config.toml"))
            .map_err(|e| ConfigError::LoadFailed {
                path: PathBuf::from("config.toml"),
                message: e.to_string(),
            })
    }

    /// Load from disk or return (and persist) the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is absent.
    ///
    /// # Errors
    /// Returns an error if the file cannot be parsed or the defaults cannot be written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, writing defaults");
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

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    ///
    /// # Errors
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

    /// Reject values the engine cannot work with.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.streak.gap_tolerance_days < 0 {
            return Err(ConfigError::InvalidValue {
                key: "streak.gap_tolerance_days".to_string(),
                message: "must be zero or more".to_string(),
            });
        }
        if !(1..=MAX_RECAP_WINDOW_DAYS).contains(&self.recap.window_days) {
            return Err(ConfigError::InvalidValue {
                key: "recap.window_days".to_string(),
                message: format!("must be between 1 and {MAX_RECAP_WINDOW_DAYS}"),
            });
        }
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

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    pub fn streak_policy(&self) -> StreakPolicy {
        StreakPolicy::with_tolerance(self.streak.gap_tolerance_days)
    }

    pub fn recap_config(&self) -> RecapConfig {
        RecapConfig {
            window_days: self.recap.window_days,
            roast_on_fold: self.recap.roast_on_fold,
            roast_on_missed: self.recap.roast_on_missed,
            streak_policy: self.streak_policy(),
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.streak.gap_tolerance_days, 7);
        assert_eq!(parsed.recap.window_days, 7);
        assert!(parsed.display.pretty_json);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[streak]\ngap_tolerance_days = 3\n").unwrap();
        assert_eq!(parsed.streak.gap_tolerance_days, 3);
        assert!(parsed.recap.roast_on_fold);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("streak.gap_tolerance_days").as_deref(), Some("7"));
        assert_eq!(cfg.get("recap.roast_on_missed").as_deref(), Some("true"));
        assert!(cfg.get("recap.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.apply("streak.gap_tolerance_days", "3").unwrap();
        cfg.apply("recap.roast_on_fold", "false").unwrap();
        assert_eq!(cfg.streak.gap_tolerance_days, 3);
        assert!(!cfg.recap.roast_on_fold);
        assert_eq!(cfg.streak_policy(), StreakPolicy::with_tolerance(3));
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.apply("recap.nonexistent", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(cfg.apply("", "1"), Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_type_and_value() {
        let mut cfg = Config::default();
        assert!(cfg.apply("display.pretty_json", "maybe").is_err());
        assert!(cfg.apply("recap.window_days", "0").is_err());
        assert!(cfg.apply("recap.window_days", "200000000").is_err());
        assert!(cfg.apply("streak.gap_tolerance_days", "-1").is_err());
        // Failed updates leave the config untouched
        assert_eq!(cfg.recap.window_days, 7);
        assert_eq!(cfg.streak.gap_tolerance_days, 7);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.streak.gap_tolerance_days, 7);
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.apply("recap.window_days", "14").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().recap.window_days, 14);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "streak = [").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::ParseFailed(_))));
    }
}
