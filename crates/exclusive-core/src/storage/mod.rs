mod config;

pub use config::{CooldownConfig, GuardConfig, LONG_COOLDOWN_MS, SHORT_COOLDOWN_MS};

use std::path::PathBuf;

/// Returns the config file path.
///
/// `EXCLUSIVE_CONFIG` overrides the location; otherwise the file lives at
/// `<config dir>/exclusive/config.toml`, falling back to `./.config` when no
/// config directory can be determined.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("EXCLUSIVE_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from(".config"))
        .join("exclusive")
        .join("config.toml")
}
