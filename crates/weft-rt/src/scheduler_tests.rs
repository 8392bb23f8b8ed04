use std::cell::RefCell;
use std::rc::Rc;

use super::Scheduler;

#[test]
fn fires_in_deadline_order() {
    let sched = Scheduler::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    for (after, label) in [(30, "late"), (10, "early"), (20, "middle")] {
        let probe = seen.clone();
        sched.schedule(after, Box::new(move || probe.borrow_mut().push(label)));
    }

    sched.run();
    assert_eq!(*seen.borrow(), vec!["early", "middle", "late"]);
    assert_eq!(sched.now(), 30);
}

#[test]
fn ties_break_by_registration_order() {
    let sched = Scheduler::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    for label in ["a", "b", "c"] {
        let probe = seen.clone();
        sched.schedule(5, Box::new(move || probe.borrow_mut().push(label)));
    }

    sched.run();
    assert_eq!(*seen.borrow(), vec!["a", "b", "c"]);
}

#[test]
fn cancelled_timers_never_fire() {
    let sched = Scheduler::new();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let probe = seen.clone();
    let doomed = sched.schedule(10, Box::new(move || probe.borrow_mut().push("doomed")));
    let probe = seen.clone();
    sched.schedule(20, Box::new(move || probe.borrow_mut().push("kept")));

    sched.cancel(doomed);
    sched.run();
    assert_eq!(*seen.borrow(), vec!["kept"]);
    assert_eq!(sched.now(), 20);
}

#[test]
fn callbacks_may_schedule_more_work() {
    let sched = Rc::new(Scheduler::new());
    let seen = Rc::new(RefCell::new(Vec::new()));

    let probe = seen.clone();
    let inner = sched.clone();
    sched.schedule(10, Box::new(move || {
        probe.borrow_mut().push(inner.now());
        let probe = probe.clone();
        let at = inner.clone();
        inner.schedule(5, Box::new(move || probe.borrow_mut().push(at.now())));
    }));

    sched.run();
    assert_eq!(*seen.borrow(), vec![10, 15]);
}
