use std::path::PathBuf;

use clap::Subcommand;
use exclusive_core::GuardConfig;

use super::resolve_config_path;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as JSON
    Show {
        /// Config file (defaults to $EXCLUSIVE_CONFIG or the user config dir)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Get a config value
    Get {
        /// Config key (e.g. "cooldown.normal_tap_ms")
        key: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Write the default configuration to disk
    Init {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show { config } => {
            let cfg = GuardConfig::load_from(&resolve_config_path(config))?;
            println!("{}", serde_json::to_string_pretty(&cfg)?);
        }
        ConfigAction::Get { key, config } => {
            let cfg = GuardConfig::load_from(&resolve_config_path(config))?;
            match cfg.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown config key: {key}").into()),
            }
        }
        ConfigAction::Init { config, force } => {
            let path = resolve_config_path(config);
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )
                .into());
            }
            GuardConfig::default().save_to(&path)?;
            tracing::info!(path = %path.display(), "wrote default config");
            println!("{}", path.display());
        }
        ConfigAction::Path => {
            println!("{}", resolve_config_path(None).display());
        }
    }
    Ok(())
}
