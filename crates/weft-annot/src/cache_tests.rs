use std::cell::Cell;
use std::rc::Rc;

use weft_types::TypeCx;

use crate::cache::SignatureCache;
use crate::parser::parse_signature;

#[test]
fn identical_text_is_parsed_once() {
    let cx = TypeCx::new();
    let cache = SignatureCache::new();

    let first = cache.parse("'a ~> 'a", &cx).unwrap();
    let second = cache.parse("'a ~> 'a", &cx).unwrap();

    assert_eq!(cache.parse_count(), 1);
    // Identical parsed structure, not merely equal.
    assert!(Rc::ptr_eq(&first, &second));
}

#[test]
fn distinct_text_parses_separately() {
    let cx = TypeCx::new();
    let cache = SignatureCache::new();

    cache.parse("'a ~> 'a", &cx).unwrap();
    cache.parse("'a ~> 'b", &cx).unwrap();

    assert_eq!(cache.parse_count(), 2);
}

#[test]
fn injected_parser_is_observable() {
    let calls = Rc::new(Cell::new(0u32));
    let probe = calls.clone();

    let cache = SignatureCache::with_parser(Box::new(move |src, cx| {
        probe.set(probe.get() + 1);
        parse_signature(src, cx)
    }));

    let cx = TypeCx::new();
    cache.parse("Number ~> Number", &cx).unwrap();
    cache.parse("Number ~> Number", &cx).unwrap();

    assert_eq!(calls.get(), 1);
}

#[test]
fn failures_are_not_cached() {
    let cx = TypeCx::new();
    let cache = SignatureCache::new();

    assert!(cache.parse("~>", &cx).is_err());
    assert!(cache.parse("~>", &cx).is_err());
    assert_eq!(cache.parse_count(), 2);
}
