use crate::cx::TypeCx;
use crate::types::{SubstMap, Type};

#[test]
fn params_compare_by_id_only() {
    let a = Type::Param {
        id: 7,
        noreduce: false,
    };
    let b = Type::Param {
        id: 7,
        noreduce: true,
    };
    let c = Type::Param {
        id: 8,
        noreduce: false,
    };

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn from_names_dedups_sorts_and_collapses_singletons() {
    assert_eq!(Type::from_names(["Number"]), Type::named("Number"));

    let sum = Type::from_names(["String", "Number", "String"]);
    assert_eq!(sum, Type::Sum(vec!["Number".into(), "String".into()]));
    assert_eq!(sum.to_string(), "Number+String");
}

#[test]
fn keyed_variants_sort_keys_at_construction() {
    let rec = Type::record([("b", Type::named("Number")), ("a", Type::named("String"))]);
    assert_eq!(rec.to_string(), "{a: String, b: Number}");

    let tagged = Type::tagged([("right", Type::Top), ("left", Type::Top)]);
    assert_eq!(tagged.to_string(), "<left: _, right: _>");
}

#[test]
fn keyed_equality_ignores_insertion_order() {
    let a = Type::record([("x", Type::named("Number")), ("y", Type::named("String"))]);
    let b = Type::record([("y", Type::named("String")), ("x", Type::named("Number"))]);
    assert_eq!(a, b);
}

#[test]
fn concreteness_and_harvest() {
    let cx = TypeCx::new();
    let p = cx.fresh(false);
    let q = cx.fresh(false);

    let t = Type::tuple(vec![
        Type::array(p.clone()),
        Type::named("Number"),
        Type::record([("k", q.clone())]),
    ]);

    assert!(!t.is_concrete());
    assert!(Type::named("Number").is_concrete());

    let mut ids = t.harvest();
    ids.sort_unstable();
    assert_eq!(
        ids,
        vec![p.param_id().unwrap(), q.param_id().unwrap()]
    );
}

#[test]
fn substitute_replaces_mapped_params_structurally() {
    let cx = TypeCx::new();
    let p = cx.fresh(false);
    let id = p.param_id().unwrap();

    let t = Type::array(Type::tuple(vec![p.clone(), Type::named("Bool")]));

    let mut map = SubstMap::new();
    map.insert(id, Type::named("Number"));

    let replaced = t.substitute(&map);
    assert_eq!(
        replaced,
        Type::array(Type::tuple(vec![Type::named("Number"), Type::named("Bool")]))
    );
    // Source value untouched.
    assert!(!t.is_concrete());
}

#[test]
fn sanitize_mints_one_fresh_param_per_distinct_origin() {
    let cx = TypeCx::new();
    let p = cx.fresh(false);
    let q = cx.fresh(true);

    let t = Type::tuple(vec![p.clone(), q.clone(), p.clone()]);

    let mut map = SubstMap::new();
    let fresh = t.sanitize(&cx, &mut map);

    let Type::Tuple(items) = &fresh else {
        panic!("expected tuple");
    };

    // First and third positions share one replacement; all replacements are new.
    assert_eq!(items[0], items[2]);
    assert_ne!(items[0], items[1]);
    assert_ne!(items[0], p);
    assert_ne!(items[1], q);

    // noreduce is preserved on the fresh copy.
    assert!(items[1].is_noreduce_param());
    assert!(!items[0].is_noreduce_param());
}

#[test]
fn sanitize_records_descendants_transitively() {
    let cx = TypeCx::new();
    let p = cx.fresh(false);
    let root = p.param_id().unwrap();

    let mut map = SubstMap::new();
    let first = p.sanitize(&cx, &mut map);

    let mut map2 = SubstMap::new();
    let second = first.sanitize(&cx, &mut map2);

    let descendants = cx.descendants(root);
    assert!(descendants.contains(&root));
    assert!(descendants.contains(&first.param_id().unwrap()));
    assert!(descendants.contains(&second.param_id().unwrap()));
}

#[test]
fn display_forms() {
    let cx = TypeCx::new();
    let p = cx.fresh(false);
    let id = p.param_id().unwrap();

    assert_eq!(Type::Top.to_string(), "_");
    assert_eq!(p.to_string(), format!("'{id}"));
    assert_eq!(Type::array(Type::named("Number")).to_string(), "[Number]");
    assert_eq!(
        Type::tuple(vec![Type::named("Number"), Type::named("String")]).to_string(),
        "(Number, String)"
    );
}
