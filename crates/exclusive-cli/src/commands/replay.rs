use std::path::PathBuf;

use clap::Args;
use exclusive_core::{replay, GuardConfig, Script};

use super::resolve_config_path;

#[derive(Args)]
pub struct ReplayArgs {
    /// Script file (.toml, or .json)
    pub script: PathBuf,
    /// Config file (defaults to $EXCLUSIVE_CONFIG or the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Override every gate cooldown (ms)
    #[arg(long)]
    pub cooldown_ms: Option<u64>,
    /// Override the tap recovery delay (ms)
    #[arg(long)]
    pub recovery_ms: Option<u64>,
    /// Pretty-print the JSON report
    #[arg(long)]
    pub pretty: bool,
}

pub fn run(args: ReplayArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut cfg = GuardConfig::load_from(&resolve_config_path(args.config))?;
    if let Some(ms) = args.cooldown_ms {
        cfg.cooldown.tab_switch_ms = ms;
        cfg.cooldown.view_transition_ms = ms;
        cfg.cooldown.normal_tap_ms = ms;
    }
    if let Some(ms) = args.recovery_ms {
        cfg.cooldown.recovery_ms = ms;
    }

    let script = Script::load(&args.script)?;
    tracing::debug!(steps = script.steps.len(), "replaying script");
    let report = replay(&script, &cfg)?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&report)?
    } else {
        serde_json::to_string(&report)?
    };
    println!("{json}");
    Ok(())
}
