use crate::{Arrow, Context, Cx, Value};

fn num_lift(cx: &Cx, f: impl Fn(f64) -> f64 + 'static) -> Arrow {
    cx.lift("Number ~> Number", move |x| {
        Ok(Value::from(f(x.as_num().unwrap())))
    })
    .unwrap()
}

fn num_test(cx: &Cx, f: impl Fn(f64) -> bool + 'static) -> Arrow {
    cx.lift("Number ~> Bool", move |x| {
        Ok(Value::from(f(x.as_num().unwrap())))
    })
    .unwrap()
}

#[test]
fn carry_pairs_input_with_output() {
    let cx = Context::new();
    let inc = num_lift(&cx, |n| n + 1.0);

    let arrow = inc.carry().unwrap();
    assert_eq!(
        arrow.run_to_completion(Value::from(3.0)),
        Ok(Value::seq([Value::from(3.0), Value::from(4.0)]))
    );
}

#[test]
fn remember_restores_the_input() {
    let cx = Context::new();
    let inc = num_lift(&cx, |n| n + 1.0);

    let arrow = inc.remember().unwrap();
    assert_eq!(
        arrow.run_to_completion(Value::from(3.0)),
        Ok(Value::from(3.0))
    );
}

#[test]
fn if_then_else_branches_on_the_predicate() {
    let cx = Context::new();
    let negative = num_test(&cx, |n| n < 0.0);
    let negate = num_lift(&cx, |n| -n);
    let arrow = negative.if_then_else(&negate, &cx.id()).unwrap();

    assert_eq!(
        arrow.run_to_completion(Value::from(-4.0)),
        Ok(Value::from(4.0))
    );
    assert_eq!(
        arrow.run_to_completion(Value::from(4.0)),
        Ok(Value::from(4.0))
    );
}

#[test]
fn if_true_passes_through_on_false() {
    let cx = Context::new();
    let negative = num_test(&cx, |n| n < 0.0);
    let negate = num_lift(&cx, |n| -n);

    let arrow = negative.if_true(&negate).unwrap();
    assert_eq!(
        arrow.run_to_completion(Value::from(5.0)),
        Ok(Value::from(5.0))
    );
    assert_eq!(
        arrow.run_to_completion(Value::from(-5.0)),
        Ok(Value::from(5.0))
    );
}

#[test]
fn while_loop_counts_to_three() {
    let cx = Context::new();
    let below_three = num_test(&cx, |n| n < 3.0);
    let increment = num_lift(&cx, |n| n + 1.0);

    let arrow = below_three.while_true_then(&increment).unwrap();
    assert_eq!(
        arrow.run_to_completion(Value::from(0.0)),
        Ok(Value::from(3.0))
    );
}

#[test]
fn repeat_until_stops_when_the_predicate_holds() {
    let cx = Context::new();
    let increment = num_lift(&cx, |n| n + 1.0);
    let at_least_three = num_test(&cx, |n| n >= 3.0);

    let arrow = increment.repeat_until(&at_least_three).unwrap();
    assert_eq!(
        arrow.run_to_completion(Value::from(0.0)),
        Ok(Value::from(3.0))
    );
}

#[test]
fn fold_accumulates_until_the_condition_fails() {
    let cx = Context::new();
    let two = cx.constant(Value::from(2.0));
    let zero = cx.constant(Value::from(0.0));
    let below_six = num_test(&cx, |n| n < 6.0);
    let add = cx
        .lift("(Number, Number) ~> Number", |x| {
            let items = x.as_seq().unwrap();
            Ok(Value::from(
                items[0].as_num().unwrap() + items[1].as_num().unwrap(),
            ))
        })
        .unwrap();

    let arrow = two.fold(&zero, &below_six, &add).unwrap();
    assert_eq!(arrow.run_to_completion(Value::Null), Ok(Value::from(6.0)));
}

#[test]
fn until_hands_over_to_the_interrupter() {
    let cx = Context::new();
    let slow = cx.delay(100);
    let interrupt = cx
        .delay(10)
        .then(&cx.constant(Value::from("interrupt")))
        .unwrap();

    let arrow = slow.until(&interrupt).unwrap();
    assert_eq!(
        arrow.run_to_completion(Value::from(0.0)),
        Ok(Value::from("interrupt"))
    );
    assert_eq!(cx.scheduler().now(), 10);
}

#[test]
fn race_with_favors_the_earlier_completion() {
    let cx = Context::new();
    let quick = cx
        .delay(5)
        .then(&cx.constant(Value::from("quick")))
        .unwrap();
    let slow = cx
        .delay(25)
        .then(&cx.constant(Value::from("slow")))
        .unwrap();

    let arrow = slow.race_with(&quick).unwrap();
    assert_eq!(
        arrow.run_to_completion(Value::from(0.0)),
        Ok(Value::from("quick"))
    );
    assert_eq!(cx.scheduler().now(), 5);
}

#[test]
fn first_and_second_target_one_slot() {
    let cx = Context::new();
    let inc = num_lift(&cx, |n| n + 1.0);

    let first = inc.first().unwrap();
    assert_eq!(
        first.run_to_completion(Value::seq([Value::from(3.0), Value::from("keep")])),
        Ok(Value::seq([Value::from(4.0), Value::from("keep")]))
    );

    let inc = num_lift(&cx, |n| n + 1.0);
    let second = inc.second().unwrap();
    assert_eq!(
        second.run_to_completion(Value::seq([Value::from("keep"), Value::from(3.0)])),
        Ok(Value::seq([Value::from("keep"), Value::from(4.0)]))
    );
}

#[test]
fn catch_with_recovers_from_a_raise() {
    let cx = Context::new();
    let boom = cx.raise(Value::from("boom"));
    let saved = cx.constant(Value::from("saved"));

    let arrow = boom.catch_with(&saved).unwrap();
    assert_eq!(
        arrow.run_to_completion(Value::Null),
        Ok(Value::from("saved"))
    );
}

#[test]
fn handle_pairs_the_input_with_the_failure() {
    let cx = Context::new();
    let handler = cx
        .lift("('a, 'b) ~> String", |x| {
            let items = x.as_seq().unwrap();
            Ok(Value::from(format!("failed on {}", items[0])))
        })
        .unwrap();

    let arrow = cx.throw_false().handle(&handler).unwrap();
    assert_eq!(
        arrow.run_to_completion(Value::from(true)),
        Ok(Value::from("failed on true"))
    );
    assert_eq!(
        arrow.run_to_completion(Value::from(false)),
        Ok(Value::from(false))
    );
}
