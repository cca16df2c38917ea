use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Interaction class guarded by its own gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateKind {
    /// Switching between tabs.
    #[serde(alias = "tab")]
    TabSwitch,
    /// Pushing or popping a screen.
    #[serde(alias = "view")]
    ViewTransition,
    /// Any other tap.
    #[serde(alias = "tap")]
    NormalTap,
}

impl GateKind {
    pub const ALL: [GateKind; 3] = [
        GateKind::TabSwitch,
        GateKind::ViewTransition,
        GateKind::NormalTap,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GateKind::TabSwitch => "tab_switch",
            GateKind::ViewTransition => "view_transition",
            GateKind::NormalTap => "normal_tap",
        }
    }

    /// Other gates whose busy state also rejects this one.
    ///
    /// A tap landing while a screen is being pushed or popped is dropped.
    pub fn blocked_by(self) -> &'static [GateKind] {
        match self {
            GateKind::NormalTap => &[GateKind::ViewTransition],
            GateKind::TabSwitch | GateKind::ViewTransition => &[],
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            GateKind::TabSwitch => 0,
            GateKind::ViewTransition => 1,
            GateKind::NormalTap => 2,
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "tab_switch" | "tab" => Ok(GateKind::TabSwitch),
            "view_transition" | "view" => Ok(GateKind::ViewTransition),
            "normal_tap" | "tap" => Ok(GateKind::NormalTap),
            other => Err(format!("unknown gate: {other}")),
        }
    }
}

/// Whether a gate currently admits invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateState {
    Free,
    Busy,
}
