use weft_types::{Type, TypeCx};

use crate::parser::parse_signature;
use crate::render::render_parse_error;

#[test]
fn parses_identity_with_shared_var() {
    let cx = TypeCx::new();
    let sig = parse_signature("'a ~> 'a", &cx).unwrap();

    assert!(sig.arg.is_param());
    assert_eq!(sig.arg, sig.out);
    assert!(sig.bounds.is_empty());
    assert!(sig.throws.is_empty());
}

#[test]
fn first_param_gets_the_first_fresh_id() {
    let cx = TypeCx::new();
    let sig = parse_signature("'a ~> 'a", &cx).unwrap();
    insta::assert_snapshot!(format!("{} ~> {}", sig.arg, sig.out), @"'1 ~> '1");
}

#[test]
fn distinct_vars_get_distinct_params() {
    let cx = TypeCx::new();
    let sig = parse_signature("'a ~> 'b", &cx).unwrap();
    assert_ne!(sig.arg, sig.out);
}

#[test]
fn parses_wildcard_names_and_sums() {
    let cx = TypeCx::new();
    let sig = parse_signature("_ ~> Number+String", &cx).unwrap();

    assert_eq!(sig.arg, Type::Top);
    assert_eq!(sig.out, Type::from_names(["Number", "String"]));
}

#[test]
fn parses_containers() {
    let cx = TypeCx::new();
    let sig = parse_signature("[Number] ~> ({x: Bool}, <left: 'a, right: 'a>)", &cx).unwrap();

    assert_eq!(sig.arg, Type::array(Type::named("Number")));

    let Type::Tuple(items) = &sig.out else {
        panic!("expected tuple output");
    };
    assert_eq!(items[0], Type::record([("x", Type::named("Bool"))]));

    let Type::Tagged(entries) = &items[1] else {
        panic!("expected tagged union");
    };
    assert_eq!(entries["left"], entries["right"]);
    assert!(entries["left"].is_param());
}

#[test]
fn parses_bounds_and_throws_clause() {
    let cx = TypeCx::new();
    let sig = parse_signature("'a ~> 'a \\ ({'a <= Number+String}, {Bool, String})", &cx).unwrap();

    assert_eq!(sig.bounds.len(), 1);
    assert_eq!(sig.bounds[0].0, sig.arg);
    assert_eq!(sig.bounds[0].1, Type::from_names(["Number", "String"]));
    assert_eq!(
        sig.throws,
        vec![Type::named("Bool"), Type::named("String")]
    );
}

#[test]
fn parses_empty_clause_sets() {
    let cx = TypeCx::new();
    let sig = parse_signature("Bool ~> _ \\ ({}, {Bool})", &cx).unwrap();

    assert!(sig.bounds.is_empty());
    assert_eq!(sig.throws, vec![Type::named("Bool")]);
}

#[test]
fn rejects_missing_arrow() {
    let cx = TypeCx::new();
    assert!(parse_signature("Number String", &cx).is_err());
}

#[test]
fn rejects_trailing_input() {
    let cx = TypeCx::new();
    assert!(parse_signature("'a ~> 'a extra", &cx).is_err());
}

#[test]
fn rejects_unclosed_tuple() {
    let cx = TypeCx::new();
    let err = parse_signature("(Number, String ~> Bool", &cx).unwrap_err();
    assert_eq!(err.message, "expected `)`");
}

#[test]
fn render_points_at_the_offending_token() {
    let cx = TypeCx::new();
    let source = "'a ~> 'a extra";
    let err = parse_signature(source, &cx).unwrap_err();

    let rendered = render_parse_error(&err, source);
    assert!(rendered.contains("bad arrow annotation"));
    assert!(rendered.contains("trailing input"));
}
