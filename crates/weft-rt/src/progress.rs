//! Cancellation and observation for in-flight arrows.
//!
//! Every execution runs under a [`Progress`] node. Asynchronous steps
//! register cancellers so the whole subtree can be torn down; racing
//! combinators register observers that fire when a competing branch
//! makes observable progress.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::RunError;

pub type CancelFn = Box<dyn FnOnce(Option<RunError>)>;
pub type ObserverFn = Box<dyn FnOnce()>;

pub struct Progress {
    can_emit: bool,
    next_id: Cell<u64>,
    cancellers: RefCell<IndexMap<u64, Option<CancelFn>>>,
    observers: RefCell<Vec<ObserverFn>>,
}

impl Progress {
    pub fn new(can_emit: bool) -> Rc<Progress> {
        Rc::new(Progress {
            can_emit,
            next_id: Cell::new(0),
            cancellers: RefCell::new(IndexMap::new()),
            observers: RefCell::new(Vec::new()),
        })
    }

    /// Whether advancement on this node is visible to racing observers.
    pub fn can_emit(&self) -> bool {
        self.can_emit
    }

    /// Register a teardown hook, returning a handle that [`advance`]
    /// accepts to retire the hook once its step has completed.
    ///
    /// [`advance`]: Progress::advance
    pub fn add_canceller(&self, f: CancelFn) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.cancellers.borrow_mut().insert(id, Some(f));
        id
    }

    pub fn add_observer(&self, f: ObserverFn) {
        self.observers.borrow_mut().push(f);
    }

    /// Record observable progress. The named canceller, if any, is
    /// retired first; observers then fire in reverse registration
    /// order, but only on an emitting node.
    pub fn advance(&self, canceller: Option<u64>) {
        if let Some(id) = canceller
            && let Some(slot) = self.cancellers.borrow_mut().get_mut(&id)
        {
            *slot = None;
        }
        loop {
            // Observers may register further observers; never hold the
            // borrow across the callback.
            let next = self.observers.borrow_mut().pop();
            match next {
                Some(observer) if self.can_emit => observer(),
                Some(_) => {}
                None => break,
            }
        }
    }

    /// Tear down everything registered here. Idempotent: hooks are
    /// drained before any of them run, so re-entrant cancellation
    /// finds nothing left to do.
    pub fn cancel(&self, error: Option<RunError>) {
        let drained = std::mem::take(&mut *self.cancellers.borrow_mut());
        for (_, slot) in drained {
            if let Some(f) = slot {
                f(error.clone());
            }
        }
    }
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod progress_tests;
