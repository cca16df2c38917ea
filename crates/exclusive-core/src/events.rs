use serde::{Deserialize, Serialize};

use crate::gate::{GateKind, GateSnapshot};

/// Every gate state change produces an Event.
/// Callers poll for them with `InteractionGuard::drain_events`.
///
/// Timestamps are milliseconds on the guard's scheduler clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GuardEvent {
    /// Invocation ran; the gate is now cooling down.
    Admitted { gate: GateKind, at_ms: u64 },
    /// Invocation dropped because `blocked_by` was busy.
    Rejected {
        gate: GateKind,
        blocked_by: GateKind,
        at_ms: u64,
    },
    /// A reset task fired and the gate re-opened.
    Released { gate: GateKind, at_ms: u64 },
    /// Pending resets were replaced by one short recovery reset.
    Rearmed {
        gate: GateKind,
        cancelled: usize,
        delay_ms: u64,
        at_ms: u64,
    },
}

impl GuardEvent {
    pub fn gate(&self) -> GateKind {
        match self {
            GuardEvent::Admitted { gate, .. }
            | GuardEvent::Rejected { gate, .. }
            | GuardEvent::Released { gate, .. }
            | GuardEvent::Rearmed { gate, .. } => *gate,
        }
    }

    pub fn at_ms(&self) -> u64 {
        match self {
            GuardEvent::Admitted { at_ms, .. }
            | GuardEvent::Rejected { at_ms, .. }
            | GuardEvent::Released { at_ms, .. }
            | GuardEvent::Rearmed { at_ms, .. } => *at_ms,
        }
    }
}

/// Point-in-time view of all gates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardSnapshot {
    pub at_ms: u64,
    pub gates: Vec<GateSnapshot>,
}

impl GuardSnapshot {
    pub fn gate(&self, kind: GateKind) -> Option<&GateSnapshot> {
        self.gates.iter().find(|g| g.gate == kind)
    }
}
