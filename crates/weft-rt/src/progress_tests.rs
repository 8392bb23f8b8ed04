use std::cell::{Cell, RefCell};
use std::rc::Rc;

use super::Progress;

#[test]
fn cancel_runs_each_hook_exactly_once() {
    let p = Progress::new(true);
    let fired = Rc::new(Cell::new(0u32));

    let probe = fired.clone();
    p.add_canceller(Box::new(move |_| probe.set(probe.get() + 1)));

    p.cancel(None);
    p.cancel(None);
    assert_eq!(fired.get(), 1);
}

#[test]
fn reentrant_cancel_does_not_rerun_hooks() {
    let p = Progress::new(true);
    let fired = Rc::new(Cell::new(0u32));

    let inner = p.clone();
    let probe = fired.clone();
    p.add_canceller(Box::new(move |_| {
        probe.set(probe.get() + 1);
        // A hook cancelling its own node must find the set drained.
        inner.cancel(None);
    }));

    p.cancel(None);
    assert_eq!(fired.get(), 1);
}

#[test]
fn advance_retires_the_named_canceller() {
    let p = Progress::new(true);
    let fired = Rc::new(Cell::new(0u32));

    let probe = fired.clone();
    let id = p.add_canceller(Box::new(move |_| probe.set(probe.get() + 1)));

    p.advance(Some(id));
    p.cancel(None);
    assert_eq!(fired.get(), 0);
}

#[test]
fn observers_fire_in_reverse_registration_order() {
    let p = Progress::new(true);
    let seen = Rc::new(RefCell::new(Vec::new()));

    for label in ["first", "second", "third"] {
        let probe = seen.clone();
        p.add_observer(Box::new(move || probe.borrow_mut().push(label)));
    }

    p.advance(None);
    assert_eq!(*seen.borrow(), vec!["third", "second", "first"]);
}

#[test]
fn quiet_nodes_swallow_observers() {
    let p = Progress::new(false);
    let fired = Rc::new(Cell::new(false));

    let probe = fired.clone();
    p.add_observer(Box::new(move || probe.set(true)));

    p.advance(None);
    assert!(!fired.get());
}
