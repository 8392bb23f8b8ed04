//! The arrow annotation mini-grammar.
//!
//! A lifted function declares its signature with a lightweight annotation:
//!
//! ```text
//! ('a, Bool) ~> <left: 'a, right: 'a>
//! Bool ~> _ \ ({}, {Bool})
//! ```
//!
//! This crate lexes and parses such annotations into a [`Signature`] (the
//! raw argument/output types, bounds, and throw set, ready to become an
//! `ArrowType`), and provides [`SignatureCache`]: an exact-source-text parse
//! cache with an injectable parser function, so identical annotation text is
//! parsed once per process.

mod cache;
mod lexer;
mod parser;
mod render;

#[cfg(test)]
mod cache_tests;
#[cfg(test)]
mod lexer_tests;
#[cfg(test)]
mod parser_tests;

pub use cache::{ParserFn, SignatureCache};
pub use lexer::{Token, TokenKind, lex};
pub use parser::{Signature, parse_signature};
pub use render::render_parse_error;

use std::ops::Range;

/// An annotation that could not be parsed. Fatal at arrow construction time.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{message} at {}..{}", span.start, span.end)]
pub struct ParseError {
    pub message: String,
    /// Byte span of the offending token in the annotation source.
    pub span: Range<usize>,
}

impl ParseError {
    pub(crate) fn new(message: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}
