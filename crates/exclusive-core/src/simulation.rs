//! Deterministic replay harness.
//!
//! A [`Script`] is a timeline of interactions. [`replay`] runs it against a
//! guard on a [`ManualScheduler`], so the same script always produces the same
//! report. Useful for reproducing "the button fired twice" reports and for
//! tuning cooldowns.
//!
//! ```toml
//! name = "double tap"
//!
//! [[steps]]
//! at_ms = 0
//! gate = "tap"
//!
//! [[steps]]
//! at_ms = 120
//! gate = "tap"
//! label = "second tap"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, SimulationError};
use crate::events::{GuardEvent, GuardSnapshot};
use crate::gate::{GateKind, InteractionGuard};
use crate::scheduler::{as_millis, ManualScheduler};
use crate::storage::GuardConfig;

/// What a step does to its gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOp {
    /// Attempt an interaction.
    #[default]
    Invoke,
    /// Replace pending resets with the short recovery reset.
    Rearm,
}

/// One scripted interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    pub gate: GateKind,
    #[serde(default)]
    pub op: StepOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Timeline of interactions to replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

impl Script {
    pub fn from_toml_str(content: &str) -> Result<Self, SimulationError> {
        toml::from_str(content).map_err(|e| SimulationError::Parse(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(content).map_err(|e| SimulationError::Parse(e.to_string()))
    }

    /// Read a script; `.json` files are parsed as JSON, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        let script = if is_json {
            Self::from_json_str(&content)?
        } else {
            Self::from_toml_str(&content)?
        };
        Ok(script)
    }

    /// Check that steps are in non-decreasing time order.
    pub fn validate(&self) -> Result<(), SimulationError> {
        let mut previous_ms = 0;
        for (index, step) in self.steps.iter().enumerate() {
            if step.at_ms < previous_ms {
                return Err(SimulationError::OutOfOrder {
                    index,
                    at_ms: step.at_ms,
                    previous_ms,
                });
            }
            previous_ms = step.at_ms;
        }
        Ok(())
    }
}

/// Result of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Admitted,
    Rejected { blocked_by: GateKind },
    Rearmed,
    RearmUnsupported,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepReport {
    pub index: usize,
    pub at_ms: u64,
    pub gate: GateKind,
    pub op: StepOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub outcome: StepOutcome,
}

/// Everything a replay observed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub steps: Vec<StepReport>,
    pub admitted: usize,
    pub rejected: usize,
    /// Gate states right after the last step.
    pub snapshot: GuardSnapshot,
    /// When the last pending reset fired.
    pub settled_at_ms: u64,
    /// Events up to and including the final resets.
    pub events: Vec<GuardEvent>,
}

/// Replay `script` against a fresh guard configured by `config`.
///
/// # Errors
///
/// Returns an error if the config is invalid or the steps are out of order.
pub fn replay(script: &Script, config: &GuardConfig) -> Result<ReplayReport, CoreError> {
    script.validate()?;
    let clock = ManualScheduler::new();
    let guard = InteractionGuard::with_config(clock.clone(), config)?;

    let mut steps = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        clock.advance_to(Duration::from_millis(step.at_ms));

        let outcome = match step.op {
            StepOp::Invoke => {
                let blocker = guard.blocker(step.gate);
                guard.run_if_free(step.gate, || ());
                match blocker {
                    Some(blocked_by) => StepOutcome::Rejected { blocked_by },
                    None => StepOutcome::Admitted,
                }
            }
            StepOp::Rearm => match guard.rearm(step.gate) {
                Ok(()) => StepOutcome::Rearmed,
                Err(_) => StepOutcome::RearmUnsupported,
            },
        };

        steps.push(StepReport {
            index,
            at_ms: step.at_ms,
            gate: step.gate,
            op: step.op,
            label: step.label.clone(),
            outcome,
        });
    }

    let snapshot = guard.snapshot();
    let settled_at_ms = as_millis(clock.run_until_idle());
    let admitted = count(&steps, |o| matches!(o, StepOutcome::Admitted));
    let rejected = count(&steps, |o| matches!(o, StepOutcome::Rejected { .. }));

    Ok(ReplayReport {
        name: script.name.clone(),
        steps,
        admitted,
        rejected,
        snapshot,
        settled_at_ms,
        events: guard.drain_events(),
    })
}

fn count(steps: &[StepReport], pred: impl Fn(&StepOutcome) -> bool) -> usize {
    steps.iter().filter(|s| pred(&s.outcome)).count()
}
