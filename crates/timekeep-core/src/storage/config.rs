//! TOML-based application configuration.
//!
//! Stores the settings-surface preferences:
//! - Appearance (dark mode, accent color)
//! - Notification behavior (sound, haptics, volume)
//! - Timer defaults (duration, borrow step)
//!
//! Configuration is stored at `~/.config/timekeep/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Appearance configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppearanceConfig {
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub sound: bool,
    #[serde(default = "default_true")]
    pub haptics: bool,
    #[serde(default = "default_volume")]
    pub volume: u32,
}

/// Timer defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerDefaultsConfig {
    /// Countdown length used when none is given, in minutes.
    #[serde(default = "default_timer_minutes")]
    pub default_minutes: u32,
    /// Step offered by the borrow affordance, in minutes.
    #[serde(default = "default_borrow_step")]
    pub borrow_step_minutes: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/timekeep/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub appearance: AppearanceConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub timer: TimerDefaultsConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_accent_color() -> String {
    "#3b82f6".into()
}
fn default_volume() -> u32 {
    50
}
fn default_timer_minutes() -> u32 {
    30
}
fn default_borrow_step() -> u32 {
    5
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        Self {
            dark_mode: true,
            accent_color: default_accent_color(),
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            sound: true,
            haptics: true,
            volume: default_volume(),
        }
    }
}

impl Default for TimerDefaultsConfig {
    fn default() -> Self {
        Self {
            default_minutes: default_timer_minutes(),
            borrow_step_minutes: default_borrow_step(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            appearance: AppearanceConfig::default(),
            notifications: NotificationsConfig::default(),
            timer: TimerDefaultsConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults on first run.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content)?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Get a value as a string by dot-separated key, e.g.
    /// `"appearance.dark_mode"`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(match current {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Set a value by dot-separated key, parsing `value` according to the
    /// existing field's type.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownKey`] for keys that don't exist and
    /// [`ConfigError::InvalidValue`] when the value cannot be parsed.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut json =
            serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;

        let mut current = &mut json;
        let mut parts = key.split('.').peekable();
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current
                    .get_mut(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                continue;
            }
            let slot = current
                .as_object_mut()
                .and_then(|obj| obj.get_mut(part))
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            let new_value = match &*slot {
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::Number(_) => serde_json::Value::from(
                    value.parse::<u64>().map_err(|e| invalid(e.to_string()))?,
                ),
                serde_json::Value::String(_) => serde_json::Value::String(value.to_string()),
                _ => return Err(invalid("unsupported field type".to_string())),
            };
            *slot = new_value;
        }

        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = Config::default();
        assert!(cfg.appearance.dark_mode);
        assert_eq!(cfg.appearance.accent_color, "#3b82f6");
        assert!(cfg.notifications.sound);
        assert_eq!(cfg.timer.default_minutes, 30);
    }

    #[test]
    fn get_by_dotted_key() {
        let cfg = Config::default();
        assert_eq!(cfg.get("appearance.dark_mode").as_deref(), Some("true"));
        assert_eq!(
            cfg.get("appearance.accent_color").as_deref(),
            Some("#3b82f6")
        );
        assert_eq!(cfg.get("notifications.volume").as_deref(), Some("50"));
        assert!(cfg.get("nope.nothing").is_none());
    }

    #[test]
    fn set_parses_according_to_field_type() {
        let mut cfg = Config::default();
        cfg.set("appearance.dark_mode", "false").unwrap();
        assert!(!cfg.appearance.dark_mode);

        cfg.set("notifications.volume", "80").unwrap();
        assert_eq!(cfg.notifications.volume, 80);

        cfg.set("appearance.accent_color", "#ff0000").unwrap();
        assert_eq!(cfg.appearance.accent_color, "#ff0000");
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set("appearance.nope", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            cfg.set("appearance.dark_mode", "maybe"),
            Err(ConfigError::InvalidValue { .. })
        ));
        // Failed sets leave the config unchanged.
        assert!(cfg.appearance.dark_mode);
    }

    #[test]
    fn toml_round_trip() {
        let mut cfg = Config::default();
        cfg.timer.borrow_step_minutes = 10;
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let decoded: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(decoded.timer.borrow_step_minutes, 10);
    }
}
