use std::cell::{Cell, RefCell};
use std::rc::Rc;

use weft_types::ArrowType;

use crate::{ComposeError, Context, RunError, Tracer, Value};

#[test]
fn annotated_lift_checks_its_output() {
    let cx = Context::new();
    let lies = cx.lift("Number ~> String", Ok).unwrap();

    let err = lies.run_to_completion(Value::from(3.0)).unwrap_err();
    assert!(matches!(err, RunError::TypeClash { .. }));

    cx.set_runtime_checks(false);
    assert_eq!(
        lies.run_to_completion(Value::from(3.0)),
        Ok(Value::from(3.0))
    );
}

#[test]
fn annotation_failures_surface_at_composition() {
    let cx = Context::new();
    let err = cx.lift("~>", Ok).unwrap_err();
    assert!(matches!(err, ComposeError::Annotation(_)));
}

#[test]
fn annotations_are_parsed_once_per_context() {
    let cx = Context::new();
    cx.lift("Number ~> Number", Ok).unwrap();
    cx.lift("Number ~> Number", Ok).unwrap();
    assert_eq!(cx.annotations().parse_count(), 1);
}

struct WarnCapture(Rc<RefCell<Vec<String>>>);

impl Tracer for WarnCapture {
    fn trace_call(&mut self, _kind: &str) {}
    fn trace_value(&mut self, _value: &Value) {}
    fn trace_deliver(&mut self, _success: bool) {}
    fn warn(&mut self, message: &str) {
        self.0.borrow_mut().push(message.to_string());
    }
}

#[test]
fn opaque_lift_warns_through_the_tracer() {
    let cx = Context::new();
    let warnings = Rc::new(RefCell::new(Vec::new()));
    cx.set_tracer(Box::new(WarnCapture(warnings.clone())));

    let opaque = cx.lift_opaque(Ok);
    assert_eq!(warnings.borrow().len(), 1);
    assert!(warnings.borrow()[0].contains("without an annotation"));

    // Degraded signature still executes.
    assert_eq!(
        opaque.run_to_completion(Value::from(7.0)),
        Ok(Value::from(7.0))
    );
}

#[test]
fn responder_delivers_at_most_once() {
    let cx = Context::new();
    let p = cx.types().fresh(false);
    let arrow = cx.klift_with(ArrowType::plain(p.clone(), p), |x, responder| {
        responder.respond(x.clone());
        responder.respond(Value::from("second"));
        Ok(None)
    });

    let count = Rc::new(Cell::new(0u32));
    let probe = count.clone();
    arrow.run_with(
        Value::from("first"),
        move |v| {
            assert_eq!(v, Value::from("first"));
            probe.set(probe.get() + 1);
        },
        |e| panic!("unexpected failure: {e}"),
    );

    assert_eq!(count.get(), 1);
}

#[test]
fn cancellation_runs_cleanup_and_suppresses_delivery() {
    let cx = Context::new();
    let delivered = Rc::new(Cell::new(false));

    let probe = delivered.clone();
    let run = cx
        .delay(10)
        .run_with(Value::Null, move |_| probe.set(true), |_| {});

    run.cancel(None);
    cx.scheduler().run();

    assert!(!delivered.get());
    assert!(!cx.scheduler().has_pending());
}

#[test]
fn klift_failures_reach_the_failure_continuation() {
    let cx = Context::new();
    let p = cx.types().fresh(false);
    let arrow = cx.klift_with(ArrowType::plain(p.clone(), p), |_, _| {
        Err(RunError::Raised(Value::from("refused")))
    });

    assert_eq!(
        arrow.run_to_completion(Value::Null),
        Err(RunError::Raised(Value::from("refused")))
    );
}

#[test]
fn equality_is_pointer_based_for_lifted_functions() {
    let cx = Context::new();
    let a = cx.id();

    assert!(a.equals(&a.clone()));
    assert!(!a.equals(&cx.id()));

    let left = a.then(&a).unwrap();
    let right = a.then(&a).unwrap();
    assert!(left.equals(&right));
}
