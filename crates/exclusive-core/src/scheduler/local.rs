//! Tokio-backed scheduler for a single-threaded event loop.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::{Scheduler, Task, TimerHandle};

struct LocalState {
    started: Instant,
    next_id: Cell<u64>,
    tasks: RefCell<HashMap<u64, JoinHandle<()>>>,
}

impl Drop for LocalState {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.get_mut().drain() {
            handle.abort();
        }
    }
}

/// Runs reset tasks as `spawn_local` timers.
///
/// Every method that schedules work must be called from inside a
/// [`tokio::task::LocalSet`]; `spawn_local` panics otherwise. Pending timers
/// are aborted when the last clone is dropped.
#[derive(Clone)]
pub struct LocalScheduler {
    state: Rc<LocalState>,
}

impl LocalScheduler {
    pub fn new() -> Self {
        Self {
            state: Rc::new(LocalState {
                started: Instant::now(),
                next_id: Cell::new(0),
                tasks: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.state.tasks.borrow().len()
    }
}

impl Default for LocalScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for LocalScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let id = self.state.next_id.get();
        self.state.next_id.set(id + 1);

        let state = Rc::downgrade(&self.state);
        let handle = tokio::task::spawn_local(async move {
            tokio::time::sleep(delay).await;
            if let Some(state) = state.upgrade() {
                state.tasks.borrow_mut().remove(&id);
            }
            task();
        });
        self.state.tasks.borrow_mut().insert(id, handle);
        TimerHandle::new(id)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        match self.state.tasks.borrow_mut().remove(&handle.id()) {
            Some(join) => {
                join.abort();
                true
            }
            None => false,
        }
    }

    fn elapsed(&self) -> Duration {
        Instant::now().saturating_duration_since(self.state.started)
    }
}

impl fmt::Debug for LocalScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}
