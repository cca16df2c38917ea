use std::cell::{Cell, RefCell};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::kind::{GateKind, GateState};
use crate::scheduler::{as_millis, TimerHandle};

/// A reset task the gate is waiting on.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingReset {
    pub(crate) id: u64,
    pub(crate) timer: TimerHandle,
}

/// One independently guarded interaction class.
///
/// Gates are owned by an [`InteractionGuard`](super::InteractionGuard) and
/// mutated only through it; this type exposes read-only accessors.
#[derive(Debug)]
pub struct Gate {
    kind: GateKind,
    cooldown: Duration,
    rearm_delay: Option<Duration>,
    blocked_by: &'static [GateKind],
    busy: Cell<bool>,
    pending: RefCell<Vec<PendingReset>>,
}

impl Gate {
    pub(crate) fn new(kind: GateKind, cooldown: Duration, rearm_delay: Option<Duration>) -> Self {
        Self {
            kind,
            cooldown,
            rearm_delay,
            blocked_by: kind.blocked_by(),
            busy: Cell::new(false),
            pending: RefCell::new(Vec::new()),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Short recovery delay used by `rearm`, if the gate supports it.
    pub fn rearm_delay(&self) -> Option<Duration> {
        self.rearm_delay
    }

    pub fn blocked_by(&self) -> &'static [GateKind] {
        self.blocked_by
    }

    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    pub fn state(&self) -> GateState {
        if self.is_busy() {
            GateState::Busy
        } else {
            GateState::Free
        }
    }

    /// Reset tasks scheduled for this gate that have not fired yet.
    pub fn pending_resets(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn snapshot(&self) -> GateSnapshot {
        GateSnapshot {
            gate: self.kind,
            state: self.state(),
            cooldown_ms: as_millis(self.cooldown),
            rearm_ms: self.rearm_delay.map(as_millis),
            pending_resets: self.pending_resets(),
        }
    }

    // ── Mutation (guard only) ────────────────────────────────────────

    pub(crate) fn occupy(&self) {
        self.busy.set(true);
    }

    pub(crate) fn track(&self, reset: PendingReset) {
        self.pending.borrow_mut().push(reset);
    }

    /// Called when the reset task `id` fires. Returns whether the gate was
    /// busy, i.e. whether this reset changed its state.
    pub(crate) fn release(&self, id: u64) -> bool {
        self.pending.borrow_mut().retain(|reset| reset.id != id);
        self.busy.replace(false)
    }

    /// Forget every pending reset, returning the timers to cancel.
    pub(crate) fn take_pending(&self) -> Vec<PendingReset> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }
}

/// Serializable view of a gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateSnapshot {
    pub gate: GateKind,
    pub state: GateState,
    pub cooldown_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rearm_ms: Option<u64>,
    pub pending_resets: usize,
}
