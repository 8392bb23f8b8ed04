//! Runtime and composition error families.

use weft_annot::ParseError;
use weft_types::TypeError;

use crate::value::Value;

/// A failure raised while an arrow is executing.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RunError {
    #[error("runtime type assertion failed: expected \"{expected}\", got {value}")]
    TypeClash { expected: String, value: Value },

    #[error("raised: {0}")]
    Raised(Value),

    #[error("named type \"{0}\" has no registered checker")]
    MissingChecker(String),
}

impl RunError {
    /// The value handed to a recovery arrow. A raised payload passes
    /// through unchanged; other failures become their message string.
    pub fn into_value(self) -> Value {
        match self {
            RunError::Raised(value) => value,
            other => Value::Str(other.to_string()),
        }
    }
}

/// A failure detected while building an arrow, before anything runs.
#[derive(Debug, thiserror::Error)]
pub enum ComposeError {
    #[error("unable to {op} arrows\n  input => {op}({input})\n  error => {source}")]
    Type {
        op: &'static str,
        input: String,
        source: TypeError,
    },

    #[error("combinator contains no arrows")]
    Empty,

    #[error("bad arrow annotation: {0}")]
    Annotation(#[from] ParseError),
}
