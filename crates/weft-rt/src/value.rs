//! Runtime values flowing through arrows.
//!
//! A [`Value`] mirrors the shape vocabulary of the type model: scalars,
//! sequences (used for both arrays and tuples), records, and tagged
//! variants. Values are cheap to clone and structurally comparable.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Seq(Vec<Value>),
    Record(IndexMap<String, Value>),
    Tagged { tag: String, value: Box<Value> },
}

impl Value {
    pub fn seq(items: impl IntoIterator<Item = Value>) -> Value {
        Value::Seq(items.into_iter().collect())
    }

    pub fn record<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Value {
        Value::Record(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn tagged(tag: impl Into<String>, value: Value) -> Value {
        Value::Tagged {
            tag: tag.into(),
            value: Box::new(value),
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Value::Num(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Value {
        Value::Num(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Num(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Str(s)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Num(n) => write!(f, "{n}"),
            Value::Str(s) => write!(f, "{s:?}"),
            Value::Seq(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Value::Record(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                write!(f, "}}")
            }
            Value::Tagged { tag, value } => write!(f, "<{tag}: {value}>"),
        }
    }
}

#[cfg(test)]
mod value_tests {
    use super::Value;

    #[test]
    fn equality_is_structural() {
        let a = Value::seq([Value::from(1.0), Value::from("x")]);
        let b = Value::seq([Value::from(1.0), Value::from("x")]);
        assert_eq!(a, b);
        assert_ne!(a, Value::seq([Value::from(1.0)]));
    }

    #[test]
    fn display_mirrors_the_type_grammar() {
        let v = Value::record([
            ("flag", Value::from(true)),
            ("pick", Value::tagged("left", Value::from(3.0))),
        ]);
        insta::assert_snapshot!(v.to_string(), @"{flag: true, pick: <left: 3>}");
    }

    #[test]
    fn sequences_serialize_transparently() {
        let v = Value::seq([Value::from(1.0), Value::from("x"), Value::Null]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"[1.0,"x",null]"#);
    }

    #[test]
    fn accessors_reject_other_shapes() {
        assert_eq!(Value::from(2.5).as_num(), Some(2.5));
        assert_eq!(Value::from(2.5).as_bool(), None);
        assert_eq!(Value::Null.as_seq(), None);
    }
}
