//! TOML-based guard configuration.
//!
//! Stores the cooldown of each gate and the short recovery delay used by
//! `rearm`. Defaults reproduce the stock behaviour: 800 ms for every gate,
//! 200 ms for tap recovery.
//!
//! ```toml
//! [cooldown]
//! tab_switch_ms = 800
//! view_transition_ms = 800
//! normal_tap_ms = 800
//! recovery_ms = 200
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;
use crate::gate::GateKind;

/// Cooldown applied after an admitted invocation.
pub const LONG_COOLDOWN_MS: u64 = 800;
/// Delay of the tap recovery reset scheduled by `rearm`.
pub const SHORT_COOLDOWN_MS: u64 = 200;

/// Per-gate cooldowns in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownConfig {
    #[serde(default = "default_long")]
    pub tab_switch_ms: u64,
    #[serde(default = "default_long")]
    pub view_transition_ms: u64,
    #[serde(default = "default_long")]
    pub normal_tap_ms: u64,
    #[serde(default = "default_short")]
    pub recovery_ms: u64,
}

/// Guard configuration.
///
/// Serialized to/from TOML, by default at `~/.config/exclusive/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    #[serde(default)]
    pub cooldown: CooldownConfig,
}

fn default_long() -> u64 {
    LONG_COOLDOWN_MS
}
fn default_short() -> u64 {
    SHORT_COOLDOWN_MS
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            tab_switch_ms: default_long(),
            view_transition_ms: default_long(),
            normal_tap_ms: default_long(),
            recovery_ms: default_short(),
        }
    }
}

impl GuardConfig {
    /// Same `long` cooldown for every gate, `short` for tap recovery.
    pub fn uniform(long_ms: u64, short_ms: u64) -> Self {
        Self {
            cooldown: CooldownConfig {
                tab_switch_ms: long_ms,
                view_transition_ms: long_ms,
                normal_tap_ms: long_ms,
                recovery_ms: short_ms,
            },
        }
    }

    /// Cooldown applied after an admitted invocation on `kind`.
    pub fn cooldown(&self, kind: GateKind) -> Duration {
        let ms = match kind {
            GateKind::TabSwitch => self.cooldown.tab_switch_ms,
            GateKind::ViewTransition => self.cooldown.view_transition_ms,
            GateKind::NormalTap => self.cooldown.normal_tap_ms,
        };
        Duration::from_millis(ms)
    }

    /// Recovery delay for `kind`; only taps can be re-armed.
    pub fn rearm_delay(&self, kind: GateKind) -> Option<Duration> {
        match kind {
            GateKind::NormalTap => Some(Duration::from_millis(self.cooldown.recovery_ms)),
            GateKind::TabSwitch | GateKind::ViewTransition => None,
        }
    }

    /// Reject zero delays: a gate that never blocks is a misconfiguration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first zero field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("cooldown.tab_switch_ms", self.cooldown.tab_switch_ms),
            ("cooldown.view_transition_ms", self.cooldown.view_transition_ms),
            ("cooldown.normal_tap_ms", self.cooldown.normal_tap_ms),
            ("cooldown.recovery_ms", self.cooldown.recovery_ms),
        ];
        for (key, value) in fields {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must be greater than zero".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseFailed`] for malformed TOML and
    /// [`ConfigError::InvalidValue`] for zero delays.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let cfg: GuardConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from `path`, or return defaults if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_stock_timings() {
        let cfg = GuardConfig::default();
        assert_eq!(cfg.cooldown(GateKind::TabSwitch), Duration::from_millis(800));
        assert_eq!(cfg.cooldown(GateKind::ViewTransition), Duration::from_millis(800));
        assert_eq!(cfg.cooldown(GateKind::NormalTap), Duration::from_millis(800));
        assert_eq!(
            cfg.rearm_delay(GateKind::NormalTap),
            Some(Duration::from_millis(200))
        );
        assert_eq!(cfg.rearm_delay(GateKind::TabSwitch), None);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let cfg = GuardConfig::from_toml_str("[cooldown]\nnormal_tap_ms = 300\n").unwrap();
        assert_eq!(cfg.cooldown.normal_tap_ms, 300);
        assert_eq!(cfg.cooldown.tab_switch_ms, LONG_COOLDOWN_MS);
        assert_eq!(cfg.cooldown.recovery_ms, SHORT_COOLDOWN_MS);

        let empty = GuardConfig::from_toml_str("").unwrap();
        assert_eq!(empty, GuardConfig::default());
    }

    #[test]
    fn zero_cooldown_is_rejected() {
        let err = GuardConfig::from_toml_str("[cooldown]\nrecovery_ms = 0\n").unwrap_err();
        match err {
            ConfigError::InvalidValue { key, .. } => assert_eq!(key, "cooldown.recovery_ms"),
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let err = GuardConfig::from_toml_str("[cooldown\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed(_)));
    }

    #[test]
    fn get_by_dotted_key() {
        let cfg = GuardConfig::uniform(500, 100);
        assert_eq!(cfg.get("cooldown.view_transition_ms").as_deref(), Some("500"));
        assert_eq!(cfg.get("cooldown.recovery_ms").as_deref(), Some("100"));
        assert_eq!(cfg.get("cooldown.missing"), None);
        assert_eq!(cfg.get(""), None);
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let cfg = GuardConfig::uniform(650, 150);
        cfg.save_to(&path).unwrap();
        assert_eq!(GuardConfig::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = GuardConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, GuardConfig::default());
    }
}
