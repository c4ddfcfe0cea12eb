//! TOML-based application configuration.
//!
//! Stores:
//! - Allowance limits (spins per window, cooldown length, countdown cadence)
//! - The key the allowance record is persisted under
//! - Reel symbols and the cosmetic win probability
//!
//! Configuration is stored at `<data_dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::allowance::AllowancePolicy;
use crate::error::{ConfigError, CoreError};
use crate::reels::DEFAULT_SYMBOLS;

/// Allowance-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceConfig {
    #[serde(default = "default_max_spins")]
    pub max_spins: u32,
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

/// Reel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReelsConfig {
    #[serde(default = "default_symbols")]
    pub symbols: Vec<String>,
    #[serde(default = "default_win_probability")]
    pub win_probability: f64,
    /// Fixed RNG seed (optional). Unset means a fresh seed per run.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data_dir>/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub allowance: AllowanceConfig,
    #[serde(default)]
    pub reels: ReelsConfig,
}

// Default functions
fn default_max_spins() -> u32 {
    10
}
fn default_cooldown_ms() -> u64 {
    2 * 60 * 60 * 1000
}
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_storage_key() -> String {
    "spinData".into()
}
fn default_symbols() -> Vec<String> {
    DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect()
}
fn default_win_probability() -> f64 {
    0.5
}

impl Default for AllowanceConfig {
    fn default() -> Self {
        Self {
            max_spins: default_max_spins(),
            cooldown_ms: default_cooldown_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            storage_key: default_storage_key(),
        }
    }
}

impl Default for ReelsConfig {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            win_probability: default_win_probability(),
            seed: None,
        }
    }
}

impl AllowanceConfig {
    pub fn policy(&self) -> AllowancePolicy {
        AllowancePolicy {
            max_spins: self.max_spins,
            cooldown_ms: self.cooldown_ms,
            storage_key: self.storage_key.clone(),
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
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let new_value = match existing {
                    serde_json::Value::Number(_) | serde_json::Value::Null if value == "none" => {
                        serde_json::Value::Null
                    }
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // Optional fields (the reel seed) serialize as null.
                    serde_json::Value::Null => {
                        let n = value
                            .parse::<u64>()
                            .map_err(|e| invalid(e.to_string()))?;
                        serde_json::Value::Number(n.into())
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    fn path() -> Result<PathBuf, CoreError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from disk or return (and write) the default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or fails
    /// validation, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, CoreError> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content).map_err(|e| {
                CoreError::from(ConfigError::LoadFailed {
                    path: path.clone(),
                    message: e.to_string(),
                })
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save()?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path,
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), CoreError> {
        let path = Self::path()?;
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, content).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Reject values the tracker or reel machine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.allowance.max_spins == 0 {
            return Err(ConfigError::InvalidValue {
                key: "allowance.max_spins".into(),
                message: "must be at least 1".into(),
            });
        }
        if self.allowance.cooldown_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "allowance.cooldown_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.allowance.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "allowance.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if self.allowance.storage_key.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "allowance.storage_key".into(),
                message: "must not be empty".into(),
            });
        }
        if self.reels.symbols.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "reels.symbols".into(),
                message: "at least one symbol is required".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.reels.win_probability) {
            return Err(ConfigError::InvalidValue {
                key: "reels.win_probability".into(),
                message: format!("{} is outside 0.0..=1.0", self.reels.win_probability),
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

    /// Update a value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed, or the
    /// result fails validation. `self` is left untouched on error.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and persist.
    ///
    /// # Errors
    ///
    /// Returns an error if [`Config::apply`] rejects the value or the config
    /// cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), CoreError> {
        self.apply(key, value)?;
        self.save()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed = Config::from_toml_str(&toml_str).unwrap();
        assert_eq!(parsed.allowance.max_spins, 10);
        assert_eq!(parsed.reels.symbols.len(), 7);
        assert!(parsed.reels.seed.is_none());
    }

    #[test]
    fn config_default_values() {
        let cfg = Config::default();
        assert_eq!(cfg.allowance.max_spins, 10);
        assert_eq!(cfg.allowance.cooldown_ms, 7_200_000);
        assert_eq!(cfg.allowance.tick_interval_ms, 1000);
        assert_eq!(cfg.allowance.storage_key, "spinData");
        assert_eq!(cfg.reels.win_probability, 0.5);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = Config::from_toml_str("[allowance]\nmax_spins = 3\n").unwrap();
        assert_eq!(cfg.allowance.max_spins, 3);
        assert_eq!(cfg.allowance.cooldown_ms, 7_200_000);
        assert_eq!(cfg.reels.symbols[0], "🍒");
    }

    #[test]
    fn invalid_toml_values_are_rejected() {
        assert!(Config::from_toml_str("[allowance]\nmax_spins = 0\n").is_err());
        assert!(Config::from_toml_str("[reels]\nwin_probability = 1.5\n").is_err());
        assert!(Config::from_toml_str("[reels]\nsymbols = []\n").is_err());
        assert!(Config::from_toml_str("[allowance\n").is_err());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("allowance.max_spins").as_deref(), Some("10"));
        assert_eq!(cfg.get("allowance.storage_key").as_deref(), Some("spinData"));
        assert_eq!(cfg.get("reels.seed").as_deref(), Some("null"));
        assert!(cfg.get("allowance.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn apply_updates_number() {
        let mut cfg = Config::default();
        cfg.apply("allowance.cooldown_ms", "60000").unwrap();
        assert_eq!(cfg.allowance.cooldown_ms, 60_000);
    }

    #[test]
    fn apply_updates_float_and_seed() {
        let mut cfg = Config::default();
        cfg.apply("reels.win_probability", "0.25").unwrap();
        cfg.apply("reels.seed", "42").unwrap();
        assert_eq!(cfg.reels.win_probability, 0.25);
        assert_eq!(cfg.reels.seed, Some(42));

        cfg.apply("reels.seed", "none").unwrap();
        assert_eq!(cfg.reels.seed, None);
    }

    #[test]
    fn apply_updates_symbol_list() {
        let mut cfg = Config::default();
        cfg.apply("reels.symbols", r#"["A","B"]"#).unwrap();
        assert_eq!(cfg.reels.symbols, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let result = cfg.apply("allowance.nonexistent_key", "1");
        assert!(matches!(result, Err(ConfigError::UnknownKey(_))));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("allowance.max_spins", "lots").is_err());
        assert_eq!(cfg.allowance.max_spins, 10);
    }

    #[test]
    fn apply_rejects_values_failing_validation() {
        let mut cfg = Config::default();
        let result = cfg.apply("allowance.max_spins", "0");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
        assert_eq!(cfg.allowance.max_spins, 10);
    }

    #[test]
    fn policy_mirrors_allowance_section() {
        let cfg = Config::default();
        let policy = cfg.allowance.policy();
        assert_eq!(policy.max_spins, 10);
        assert_eq!(policy.cooldown_ms, 7_200_000);
        assert_eq!(policy.storage_key, "spinData");
    }
}
