use crate::lattice::{glb, lub};
use crate::types::Type;

fn concrete_samples() -> Vec<Type> {
    vec![
        Type::named("Number"),
        Type::from_names(["Number", "String"]),
        Type::array(Type::named("Bool")),
        Type::tuple(vec![Type::named("Number"), Type::named("String")]),
        Type::record([("x", Type::named("Number"))]),
        Type::tagged([("left", Type::named("Bool")), ("right", Type::named("Number"))]),
    ]
}

#[test]
fn lub_and_glb_are_idempotent_on_concrete_types() {
    for t in concrete_samples() {
        assert_eq!(lub(&t, &t), t);
        assert_eq!(glb(&t, &t).unwrap(), t);
    }
}

#[test]
fn named_lub_is_union_glb_is_intersection() {
    let a = Type::from_names(["Number", "String"]);
    let b = Type::from_names(["String", "Bool"]);

    assert_eq!(lub(&a, &b), Type::from_names(["Bool", "Number", "String"]));
    assert_eq!(glb(&a, &b).unwrap(), Type::named("String"));
}

#[test]
fn named_glb_fails_on_empty_intersection() {
    let err = glb(&Type::named("Number"), &Type::named("String"));
    assert!(err.is_err());
}

#[test]
fn glb_treats_top_as_identity() {
    let t = Type::named("Number");
    assert_eq!(glb(&Type::Top, &t).unwrap(), t);
    assert_eq!(glb(&t, &Type::Top).unwrap(), t);
}

#[test]
fn tuple_lub_takes_shorter_arity() {
    let short = Type::tuple(vec![Type::named("Number")]);
    let long = Type::tuple(vec![Type::named("Number"), Type::named("String")]);

    assert_eq!(lub(&short, &long), Type::tuple(vec![Type::named("Number")]));
}

#[test]
fn tuple_glb_takes_longer_arity() {
    let short = Type::tuple(vec![Type::from_names(["Number", "String"])]);
    let long = Type::tuple(vec![Type::named("Number"), Type::named("Bool")]);

    assert_eq!(
        glb(&short, &long).unwrap(),
        Type::tuple(vec![Type::named("Number"), Type::named("Bool")])
    );
}

#[test]
fn record_lub_keeps_shared_keys_glb_keeps_all_keys() {
    let a = Type::record([("x", Type::named("Number")), ("y", Type::named("String"))]);
    let b = Type::record([("x", Type::named("Number")), ("z", Type::named("Bool"))]);

    assert_eq!(lub(&a, &b), Type::record([("x", Type::named("Number"))]));
    assert_eq!(
        glb(&a, &b).unwrap(),
        Type::record([
            ("x", Type::named("Number")),
            ("y", Type::named("String")),
            ("z", Type::named("Bool")),
        ])
    );
}

#[test]
fn tagged_lub_keeps_shared_keys() {
    let a = Type::tagged([("left", Type::named("Number")), ("right", Type::named("Bool"))]);
    let b = Type::tagged([("left", Type::from_names(["Number", "String"]))]);

    assert_eq!(
        lub(&a, &b),
        Type::tagged([("left", Type::from_names(["Number", "String"]))])
    );
}

#[test]
fn mismatched_shapes_widen_for_lub_and_fail_for_glb() {
    let arr = Type::array(Type::named("Number"));
    let tup = Type::tuple(vec![Type::named("Number")]);

    assert_eq!(lub(&arr, &tup), Type::Top);
    assert!(glb(&arr, &tup).is_err());
}
