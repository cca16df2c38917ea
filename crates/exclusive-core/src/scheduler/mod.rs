//! Delayed-callback facility used to re-open gates.
//!
//! A gate never blocks while it cools down. Instead it hands a reset task to a
//! [`Scheduler`], which runs the task later on the same thread that performs
//! every other guard operation.
//!
//! Two implementations are provided:
//!
//! - [`ManualScheduler`]: a simulated clock advanced explicitly by the caller.
//!   Deterministic, used by tests and the replay harness.
//! - [`LocalScheduler`]: tokio timers spawned on a `LocalSet`, for running the
//!   guard inside a real event loop.

mod local;
mod manual;

use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use local::LocalScheduler;
pub use manual::ManualScheduler;

/// A deferred callback. Tasks are `!Send`: they only ever run on the thread
/// that scheduled them.
pub type Task = Box<dyn FnOnce() + 'static>;

/// Opaque handle identifying a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Schedules callbacks to run after a delay.
pub trait Scheduler {
    /// Run `task` once `delay` has elapsed.
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle;

    /// Cancel a pending task. Returns `true` if it had not run yet.
    fn cancel(&self, handle: TimerHandle) -> bool;

    /// Time elapsed since the scheduler was created.
    fn elapsed(&self) -> Duration;
}

impl<S: Scheduler + ?Sized> Scheduler for Rc<S> {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        (**self).schedule(delay, task)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        (**self).cancel(handle)
    }

    fn elapsed(&self) -> Duration {
        (**self).elapsed()
    }
}

/// Whole milliseconds of `d`, saturating.
pub(crate) fn as_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
