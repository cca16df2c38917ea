//! Interaction guard.
//!
//! Owns the three gates and hands their reset tasks to a [`Scheduler`].
//!
//! ## State Transitions (per gate)
//!
//! ```text
//! Free -> Busy        admitted invocation
//! Busy -> Free        scheduled reset fires
//! Busy -> Busy        rearm (pending resets replaced)
//! ```
//!
//! Rejected invocations never change state.
//!
//! ## Usage
//!
//! ```ignore
//! let guard = InteractionGuard::new(scheduler);
//! guard
//!     .tab_switch()
//!     .on_abort(|| tracing::debug!("tab switch dropped"))
//!     .run(|| show_tab(2));
//! ```

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::debug;

use super::kind::{GateKind, GateState};
use super::state::{Gate, PendingReset};
use crate::error::{ConfigError, GuardError};
use crate::events::{GuardEvent, GuardSnapshot};
use crate::scheduler::{as_millis, Scheduler};
use crate::storage::GuardConfig;

/// State shared with scheduled reset tasks.
///
/// Tasks hold it weakly, so the scheduler owning them never keeps the guard
/// alive.
struct Shared<S> {
    gates: [Gate; 3],
    journal: RefCell<Vec<GuardEvent>>,
    next_reset: Cell<u64>,
    scheduler: S,
}

impl<S: Scheduler> Shared<S> {
    fn gate(&self, kind: GateKind) -> &Gate {
        &self.gates[kind.index()]
    }

    fn record(&self, event: GuardEvent) {
        self.journal.borrow_mut().push(event);
    }

    fn now_ms(&self) -> u64 {
        as_millis(self.scheduler.elapsed())
    }

    fn release(&self, kind: GateKind, id: u64) {
        if !self.gate(kind).release(id) {
            return;
        }
        let at_ms = self.now_ms();
        debug!(gate = %kind, at_ms, "gate released");
        self.record(GuardEvent::Released { gate: kind, at_ms });
    }
}

/// Guards UI interactions against rapid repeats.
///
/// All state is single-threaded (`!Send`): the guard, its gates and the reset
/// tasks live on the thread that dispatches UI events.
pub struct InteractionGuard<S: Scheduler> {
    shared: Rc<Shared<S>>,
}

impl<S: Scheduler + 'static> InteractionGuard<S> {
    /// Create a guard with the stock timings (800 ms, 200 ms tap recovery).
    pub fn new(scheduler: S) -> Self {
        Self::build(scheduler, &GuardConfig::default())
    }

    /// Create a guard with custom timings.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` contains a zero delay.
    pub fn with_config(scheduler: S, config: &GuardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(scheduler, config))
    }

    fn build(scheduler: S, config: &GuardConfig) -> Self {
        let gate = |kind: GateKind| Gate::new(kind, config.cooldown(kind), config.rearm_delay(kind));
        Self {
            shared: Rc::new(Shared {
                gates: [
                    gate(GateKind::TabSwitch),
                    gate(GateKind::ViewTransition),
                    gate(GateKind::NormalTap),
                ],
                journal: RefCell::new(Vec::new()),
                next_reset: Cell::new(0),
                scheduler,
            }),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn gate(&self, kind: GateKind) -> &Gate {
        self.shared.gate(kind)
    }

    pub fn state(&self, kind: GateKind) -> GateState {
        self.gate(kind).state()
    }

    pub fn is_busy(&self, kind: GateKind) -> bool {
        self.gate(kind).is_busy()
    }

    pub fn pending_resets(&self, kind: GateKind) -> usize {
        self.gate(kind).pending_resets()
    }

    /// The gate that would reject an invocation on `kind` right now.
    pub fn blocker(&self, kind: GateKind) -> Option<GateKind> {
        let gate = self.gate(kind);
        if gate.is_busy() {
            return Some(kind);
        }
        gate.blocked_by()
            .iter()
            .copied()
            .find(|other| self.is_busy(*other))
    }

    pub fn scheduler(&self) -> &S {
        &self.shared.scheduler
    }

    pub fn snapshot(&self) -> GuardSnapshot {
        GuardSnapshot {
            at_ms: self.now_ms(),
            gates: self.shared.gates.iter().map(Gate::snapshot).collect(),
        }
    }

    /// Take every event recorded since the last call.
    pub fn drain_events(&self) -> Vec<GuardEvent> {
        std::mem::take(&mut *self.shared.journal.borrow_mut())
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run `action` if `kind` is free; otherwise drop it and return `None`.
    pub fn run_if_free<T>(&self, kind: GateKind, action: impl FnOnce() -> T) -> Option<T> {
        self.invoke(kind, action, None::<fn()>)
    }

    /// Like [`run_if_free`](Self::run_if_free), calling `on_abort` when the
    /// invocation is rejected.
    pub fn run_or_abort<T>(
        &self,
        kind: GateKind,
        action: impl FnOnce() -> T,
        on_abort: impl FnOnce(),
    ) -> Option<T> {
        self.invoke(kind, action, Some(on_abort))
    }

    /// Replace every pending reset of `kind` with one short recovery reset.
    ///
    /// The busy flag is left alone: a busy gate stays busy until the new
    /// reset fires, a free gate stays free.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::RearmUnsupported`] for gates without a recovery
    /// delay (everything but `NormalTap`).
    pub fn rearm(&self, kind: GateKind) -> Result<(), GuardError> {
        let gate = self.gate(kind);
        let delay = gate
            .rearm_delay()
            .ok_or(GuardError::RearmUnsupported(kind))?;

        let cancelled = gate
            .take_pending()
            .into_iter()
            .filter(|reset| self.scheduler().cancel(reset.timer))
            .count();
        self.schedule_reset(kind, delay);

        let at_ms = self.now_ms();
        debug!(gate = %kind, cancelled, delay_ms = as_millis(delay), "gate rearmed");
        self.shared.record(GuardEvent::Rearmed {
            gate: kind,
            cancelled,
            delay_ms: as_millis(delay),
            at_ms,
        });
        Ok(())
    }

    /// Entry point for a tab switch.
    pub fn tab_switch(&self) -> Invocation<'_, S> {
        Invocation::new(self, GateKind::TabSwitch)
    }

    /// Entry point for a screen push or pop.
    pub fn view_transition(&self) -> Invocation<'_, S> {
        Invocation::new(self, GateKind::ViewTransition)
    }

    /// Entry point for an ordinary tap.
    pub fn normal_tap(&self) -> Invocation<'_, S> {
        Invocation::new(self, GateKind::NormalTap)
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn invoke<T, A, F>(&self, kind: GateKind, action: A, on_abort: Option<F>) -> Option<T>
    where
        A: FnOnce() -> T,
        F: FnOnce(),
    {
        let at_ms = self.now_ms();
        if let Some(blocked_by) = self.blocker(kind) {
            debug!(gate = %kind, blocked_by = %blocked_by, at_ms, "interaction rejected");
            self.shared.record(GuardEvent::Rejected {
                gate: kind,
                blocked_by,
                at_ms,
            });
            if let Some(on_abort) = on_abort {
                on_abort();
            }
            return None;
        }

        let gate = self.gate(kind);
        gate.occupy();
        debug!(gate = %kind, at_ms, "interaction admitted");
        self.shared.record(GuardEvent::Admitted { gate: kind, at_ms });

        // Scheduled before the action so the window is measured from the
        // invocation and survives an action that panics.
        self.schedule_reset(kind, gate.cooldown());
        Some(action())
    }

    fn schedule_reset(&self, kind: GateKind, delay: Duration) {
        let id = self.shared.next_reset.get();
        self.shared.next_reset.set(id + 1);

        let shared: Weak<Shared<S>> = Rc::downgrade(&self.shared);
        let timer = self.scheduler().schedule(
            delay,
            Box::new(move || {
                if let Some(shared) = shared.upgrade() {
                    shared.release(kind, id);
                }
            }),
        );
        self.gate(kind).track(PendingReset { id, timer });
    }

    fn now_ms(&self) -> u64 {
        self.shared.now_ms()
    }
}

impl<S: Scheduler> std::fmt::Debug for InteractionGuard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteractionGuard")
            .field("gates", &self.shared.gates)
            .finish_non_exhaustive()
    }
}

/// A pending invocation on one gate, with an optional abort callback.
pub struct Invocation<'g, S: Scheduler> {
    guard: &'g InteractionGuard<S>,
    kind: GateKind,
    on_abort: Option<Box<dyn FnOnce() + 'g>>,
}

impl<'g, S: Scheduler + 'static> Invocation<'g, S> {
    fn new(guard: &'g InteractionGuard<S>, kind: GateKind) -> Self {
        Self {
            guard,
            kind,
            on_abort: None,
        }
    }

    /// Callback run instead of the action when the gate is busy.
    pub fn on_abort(mut self, on_abort: impl FnOnce() + 'g) -> Self {
        self.on_abort = Some(Box::new(on_abort));
        self
    }

    pub fn kind(&self) -> GateKind {
        self.kind
    }

    pub fn run<T>(self, action: impl FnOnce() -> T) -> Option<T> {
        self.guard.invoke(self.kind, action, self.on_abort)
    }
}
