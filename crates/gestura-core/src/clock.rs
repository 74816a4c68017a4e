//! Scheduling capability for timer-driven gestures.
//!
//! Long-tap ticks, the double-tap window and swipe momentum frames are the only deferred work in
//! the engine. They go through a [`Scheduler`] so hosts can plug their event loop in and tests can
//! drive time by hand with [`ManualScheduler`].

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use tracing::trace;

/// Milliseconds on the scheduler's clock.
pub type Millis = u64;

/// Handle to a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// One-shot task.
pub type OnceTask = Box<dyn FnOnce()>;

/// Task run on every interval.
pub type RepeatingTask = Box<dyn FnMut()>;

/// Deferred execution on the engine's thread.
pub trait Scheduler {
    /// Current time in milliseconds.
    fn now(&self) -> Millis;

    /// Run `task` once after `delay` milliseconds.
    fn schedule_once(&self, delay: Millis, task: OnceTask) -> TimerId;

    /// Run `task` every `interval` milliseconds until cancelled.
    fn schedule_repeating(&self, interval: Millis, task: RepeatingTask) -> TimerId;

    /// Cancel a task. Unknown or already finished handles are ignored.
    fn cancel(&self, id: TimerId);
}

enum Task {
    Once(OnceTask),
    Repeating(RepeatingTask),
}

struct Slot {
    due: Millis,
    interval: Option<Millis>,
    /// `None` while the task is running.
    task: Option<Task>,
}

/// Deterministic scheduler whose clock only moves when [`ManualScheduler::advance`] is called.
///
/// Tasks run in due order; tasks due at the same time run in scheduling order. Tasks may
/// schedule or cancel other tasks, including themselves, while running.
#[derive(Default)]
pub struct ManualScheduler {
    now: Cell<Millis>,
    next_id: Cell<u64>,
    slots: RefCell<BTreeMap<TimerId, Slot>>,
}

impl ManualScheduler {
    /// Create a scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks still scheduled.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Check if a task is still scheduled.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.slots.borrow().contains_key(&id)
    }

    /// Move the clock forward, running every task that falls due on the way.
    pub fn advance(&self, delta: Millis) {
        let target = self.now.get().saturating_add(delta);
        while let Some((id, due)) = self.next_due(target) {
            self.now.set(due);
            self.run(id);
        }
        self.now.set(target);
    }

    fn next_due(&self, target: Millis) -> Option<(TimerId, Millis)> {
        self.slots
            .borrow()
            .iter()
            .filter(|(_, slot)| slot.task.is_some() && slot.due <= target)
            .min_by_key(|(id, slot)| (slot.due, **id))
            .map(|(id, slot)| (*id, slot.due))
    }

    fn run(&self, id: TimerId) {
        let task = {
            let mut slots = self.slots.borrow_mut();
            let Some(repeating) = slots.get(&id).map(|s| s.interval.is_some()) else {
                return;
            };
            if repeating {
                slots.get_mut(&id).and_then(|s| s.task.take())
            } else {
                slots.remove(&id).and_then(|s| s.task)
            }
        };
        trace!(timer = id.0, now = self.now.get(), "running scheduled task");
        match task {
            Some(Task::Once(f)) => f(),
            Some(Task::Repeating(mut f)) => {
                f();
                let mut slots = self.slots.borrow_mut();
                // A task cancelled while running has already lost its slot.
                if let Some(slot) = slots.get_mut(&id) {
                    slot.due += slot.interval.unwrap_or(1).max(1);
                    slot.task = Some(Task::Repeating(f));
                }
            }
            None => {}
        }
    }

    fn insert(&self, due: Millis, interval: Option<Millis>, task: Task) -> TimerId {
        let id = TimerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.slots.borrow_mut().insert(
            id,
            Slot {
                due,
                interval,
                task: Some(task),
            },
        );
        id
    }
}

impl Scheduler for ManualScheduler {
    fn now(&self) -> Millis {
        self.now.get()
    }

    fn schedule_once(&self, delay: Millis, task: OnceTask) -> TimerId {
        self.insert(self.now.get() + delay, None, Task::Once(task))
    }

    fn schedule_repeating(&self, interval: Millis, task: RepeatingTask) -> TimerId {
        let interval = interval.max(1);
        self.insert(
            self.now.get() + interval,
            Some(interval),
            Task::Repeating(task),
        )
    }

    fn cancel(&self, id: TimerId) {
        self.slots.borrow_mut().remove(&id);
    }
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now.get())
            .field("pending", &self.pending())
            .finish()
    }
}
