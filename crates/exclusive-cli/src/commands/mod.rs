pub mod config;
pub mod replay;

use std::path::PathBuf;

/// Explicit `--config` path, or the default location.
pub fn resolve_config_path(explicit: Option<PathBuf>) -> PathBuf {
    explicit.unwrap_or_else(exclusive_core::config_path)
}
