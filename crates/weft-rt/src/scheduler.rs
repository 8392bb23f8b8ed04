//! Deterministic single-threaded timer queue.
//!
//! The runtime never touches wall-clock time. Delays are expressed in
//! abstract ticks against a virtual clock, and [`Scheduler::run`]
//! drains due callbacks in (deadline, registration) order, which makes
//! every interleaving reproducible under test.

use std::cell::{Cell, RefCell};

pub type TimerFn = Box<dyn FnOnce()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId(u64);

struct TimerSlot {
    id: u64,
    due: u64,
    callback: TimerFn,
}

#[derive(Default)]
pub struct Scheduler {
    clock: Cell<u64>,
    next_id: Cell<u64>,
    queue: RefCell<Vec<TimerSlot>>,
}

impl Scheduler {
    pub fn new() -> Scheduler {
        Scheduler::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> u64 {
        self.clock.get()
    }

    /// Register `f` to run `after` ticks from now.
    pub fn schedule(&self, after: u64, f: TimerFn) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.queue.borrow_mut().push(TimerSlot {
            id,
            due: self.clock.get().saturating_add(after),
            callback: f,
        });
        TimerId(id)
    }

    /// Drop a pending timer. Cancelling an already-fired or unknown
    /// timer is a no-op.
    pub fn cancel(&self, timer: TimerId) {
        self.queue.borrow_mut().retain(|slot| slot.id != timer.0);
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.borrow().is_empty()
    }

    /// Run callbacks until the queue is empty, advancing the clock to
    /// each deadline. Callbacks may schedule and cancel freely.
    pub fn run(&self) {
        while let Some(slot) = self.pop_next() {
            self.clock.set(self.clock.get().max(slot.due));
            (slot.callback)();
        }
    }

    fn pop_next(&self) -> Option<TimerSlot> {
        let mut queue = self.queue.borrow_mut();
        let next = queue
            .iter()
            .enumerate()
            .min_by_key(|(_, slot)| (slot.due, slot.id))
            .map(|(index, _)| index)?;
        Some(queue.swap_remove(next))
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod scheduler_tests;
