//! Simulated clock.
//!
//! Time only moves when the caller says so. Due tasks run in deadline order,
//! ties broken by scheduling order, which mirrors a UI message queue.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use super::{Scheduler, Task, TimerHandle};

#[derive(Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Task>,
    deadlines: HashMap<u64, Duration>,
}

/// Deterministic scheduler driven by [`advance`](ManualScheduler::advance).
///
/// Cloning yields another handle onto the same clock, so a test can keep one
/// handle while the guard owns the other.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<ManualState>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time.
    pub fn now(&self) -> Duration {
        self.state.borrow().now
    }

    /// Number of tasks still waiting to run.
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Deadline of the earliest pending task.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.state
            .borrow()
            .queue
            .first_key_value()
            .map(|((deadline, _), _)| *deadline)
    }

    /// Move the clock forward by `by`, running every task that falls due.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        self.advance_to(target);
    }

    /// Move the clock to `target`, running every task due at or before it.
    ///
    /// A target in the past leaves the clock where it is.
    pub fn advance_to(&self, target: Duration) {
        loop {
            // The borrow must end before the task runs: tasks may schedule
            // or cancel other tasks.
            let due = {
                let mut state = self.state.borrow_mut();
                let head = state.queue.keys().next().copied();
                match head {
                    Some(key @ (deadline, id)) if deadline <= target => {
                        state.deadlines.remove(&id);
                        if deadline > state.now {
                            state.now = deadline;
                        }
                        state.queue.remove(&key)
                    }
                    _ => None,
                }
            };
            match due {
                Some(task) => task(),
                None => break,
            }
        }

        let mut state = self.state.borrow_mut();
        if target > state.now {
            state.now = target;
        }
    }

    /// Run tasks until the queue is empty. Returns the time of the last one.
    pub fn run_until_idle(&self) -> Duration {
        while let Some(deadline) = self.next_deadline() {
            self.advance_to(deadline);
        }
        self.now()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, delay: Duration, task: Task) -> TimerHandle {
        let mut state = self.state.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let deadline = state.now + delay;
        state.queue.insert((deadline, id), task);
        state.deadlines.insert(id, deadline);
        TimerHandle::new(id)
    }

    fn cancel(&self, handle: TimerHandle) -> bool {
        let mut state = self.state.borrow_mut();
        match state.deadlines.remove(&handle.id()) {
            Some(deadline) => state.queue.remove(&(deadline, handle.id())).is_some(),
            None => false,
        }
    }

    fn elapsed(&self) -> Duration {
        self.now()
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ManualScheduler")
            .field("now", &state.now)
            .field("pending", &state.queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn runs_tasks_in_deadline_order() {
        let clock = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay, tag) in [(300, "c"), (100, "a"), (200, "b")] {
            let log = log.clone();
            clock.schedule(ms(delay), Box::new(move || log.borrow_mut().push(tag)));
        }

        clock.advance(ms(250));
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        assert_eq!(clock.now(), ms(250));

        clock.advance(ms(50));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn equal_deadlines_keep_scheduling_order() {
        let clock = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for tag in 0..4 {
            let log = log.clone();
            clock.schedule(ms(10), Box::new(move || log.borrow_mut().push(tag)));
        }
        clock.advance(ms(10));
        assert_eq!(*log.borrow(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn cancelled_task_never_runs() {
        let clock = ManualScheduler::new();
        let fired = Rc::new(Cell::new(false));
        let flag = fired.clone();
        let handle = clock.schedule(ms(100), Box::new(move || flag.set(true)));

        assert!(clock.cancel(handle));
        assert!(!clock.cancel(handle));
        clock.advance(ms(500));
        assert!(!fired.get());
    }

    #[test]
    fn cancel_after_fire_reports_false() {
        let clock = ManualScheduler::new();
        let handle = clock.schedule(ms(5), Box::new(|| {}));
        clock.advance(ms(5));
        assert!(!clock.cancel(handle));
    }

    #[test]
    fn task_may_schedule_follow_up_within_same_advance() {
        let clock = ManualScheduler::new();
        let fired_at = Rc::new(Cell::new(None));

        let inner_clock = clock.clone();
        let slot = fired_at.clone();
        clock.schedule(
            ms(100),
            Box::new(move || {
                let probe = inner_clock.clone();
                inner_clock.schedule(ms(50), Box::new(move || slot.set(Some(probe.now()))));
            }),
        );

        clock.advance(ms(200));
        assert_eq!(fired_at.get(), Some(ms(150)));
        assert_eq!(clock.now(), ms(200));
    }

    #[test]
    fn advance_to_past_is_ignored() {
        let clock = ManualScheduler::new();
        clock.advance(ms(100));
        clock.advance_to(ms(40));
        assert_eq!(clock.now(), ms(100));
    }

    #[test]
    fn run_until_idle_stops_at_last_deadline() {
        let clock = ManualScheduler::new();
        clock.schedule(ms(800), Box::new(|| {}));
        clock.schedule(ms(200), Box::new(|| {}));
        assert_eq!(clock.next_deadline(), Some(ms(200)));
        assert_eq!(clock.run_until_idle(), ms(800));
        assert_eq!(clock.pending(), 0);
    }
}
