//! Exact-text parse cache for annotations.
//!
//! Annotation strings are few and static, so cached entries live for the
//! life of the owning context with no eviction. The parser function is
//! injectable, which keeps the grammar machinery behind a seam and lets
//! tests probe how often a parse actually happens.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use weft_types::TypeCx;

use crate::ParseError;
use crate::parser::{Signature, parse_signature};

/// The pluggable parser hook.
pub type ParserFn = Box<dyn Fn(&str, &TypeCx) -> Result<Signature, ParseError>>;

/// Caches parsed annotations by exact source text.
pub struct SignatureCache {
    parser: ParserFn,
    entries: RefCell<HashMap<String, Rc<Signature>>>,
    parses: Cell<u64>,
}

impl SignatureCache {
    /// A cache backed by the crate's own grammar.
    pub fn new() -> Self {
        Self::with_parser(Box::new(parse_signature))
    }

    /// A cache backed by an arbitrary parser function.
    pub fn with_parser(parser: ParserFn) -> Self {
        Self {
            parser,
            entries: RefCell::new(HashMap::new()),
            parses: Cell::new(0),
        }
    }

    /// Parse an annotation, or return the cached result for identical text.
    ///
    /// Parse failures are not cached; the annotation is fatal to its arrow
    /// anyway.
    pub fn parse(&self, source: &str, cx: &TypeCx) -> Result<Rc<Signature>, ParseError> {
        if let Some(found) = self.entries.borrow().get(source) {
            return Ok(found.clone());
        }

        self.parses.set(self.parses.get() + 1);
        let parsed = Rc::new((self.parser)(source, cx)?);
        self.entries
            .borrow_mut()
            .insert(source.to_owned(), parsed.clone());
        Ok(parsed)
    }

    /// How many times the underlying parser has run.
    pub fn parse_count(&self) -> u64 {
        self.parses.get()
    }
}

impl Default for SignatureCache {
    fn default() -> Self {
        Self::new()
    }
}
