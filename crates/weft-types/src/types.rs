//! The structural type lattice.
//!
//! A closed variant set: wildcard, type parameter, named leaf, sum of named
//! leaves, tagged union, array, tuple, record. Map-keyed variants keep their
//! keys sorted at construction so comparison and printing are deterministic.
//!
//! Types are immutable value objects; every operation returns a new value.

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::cx::TypeCx;

/// Globally unique identity of a type parameter.
pub type ParamId = u64;

/// A parameter substitution, keyed by parameter id.
pub type SubstMap = HashMap<ParamId, Type>;

/// A structural type.
#[derive(Debug, Clone, Serialize)]
pub enum Type {
    /// Unconstrained wildcard, printed `_`.
    Top,
    /// Type variable. `noreduce` marks it non-eliminable during resolution.
    Param { id: ParamId, noreduce: bool },
    /// Single named leaf type, e.g. `Number`.
    Named(String),
    /// Union of named leaves, deduplicated and sorted, printed `A+B`.
    Sum(Vec<String>),
    /// Tagged union, printed `<tag: T, ...>`.
    Tagged(IndexMap<String, Type>),
    /// Homogeneous array, printed `[T]`.
    Array(Box<Type>),
    /// Fixed-arity tuple, printed `(T, U)`.
    Tuple(Vec<Type>),
    /// Record with named fields, printed `{k: T, ...}`.
    Record(IndexMap<String, Type>),
}

impl Type {
    pub fn named(name: impl Into<String>) -> Type {
        Type::Named(name.into())
    }

    /// Build a named or sum-of-names type from a name list: deduplicates,
    /// sorts, and collapses a singleton to [`Type::Named`].
    pub fn from_names<I, S>(names: I) -> Type
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();

        if names.len() == 1 {
            Type::Named(names.pop().unwrap_or_default())
        } else {
            Type::Sum(names)
        }
    }

    pub fn array(inner: Type) -> Type {
        Type::Array(Box::new(inner))
    }

    pub fn tuple(items: Vec<Type>) -> Type {
        Type::Tuple(items)
    }

    /// Build a tagged union; keys are sorted.
    pub fn tagged<I, S>(entries: I) -> Type
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<String>,
    {
        Type::Tagged(sorted_map(entries))
    }

    /// Build a record; keys are sorted.
    pub fn record<I, S>(entries: I) -> Type
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<String>,
    {
        Type::Record(sorted_map(entries))
    }

    pub fn is_param(&self) -> bool {
        matches!(self, Type::Param { .. })
    }

    /// The id of this type if it is a parameter.
    pub fn param_id(&self) -> Option<ParamId> {
        match self {
            Type::Param { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Whether this type is a parameter marked non-eliminable.
    pub fn is_noreduce_param(&self) -> bool {
        matches!(self, Type::Param { noreduce: true, .. })
    }

    /// The name list of a name-bearing type (`Named` or `Sum`).
    pub fn names(&self) -> Option<Vec<&str>> {
        match self {
            Type::Named(n) => Some(vec![n.as_str()]),
            Type::Sum(ns) => Some(ns.iter().map(String::as_str).collect()),
            _ => None,
        }
    }

    /// True unless a parameter is reachable anywhere in the type.
    pub fn is_concrete(&self) -> bool {
        match self {
            Type::Top | Type::Named(_) | Type::Sum(_) => true,
            Type::Param { .. } => false,
            Type::Array(inner) => inner.is_concrete(),
            Type::Tuple(items) => items.iter().all(Type::is_concrete),
            Type::Tagged(map) | Type::Record(map) => map.values().all(Type::is_concrete),
        }
    }

    /// Collect every parameter id reachable in the type. Order is not
    /// significant; duplicates are preserved.
    pub fn harvest_into(&self, out: &mut Vec<ParamId>) {
        match self {
            Type::Top | Type::Named(_) | Type::Sum(_) => {}
            Type::Param { id, .. } => out.push(*id),
            Type::Array(inner) => inner.harvest_into(out),
            Type::Tuple(items) => {
                for t in items {
                    t.harvest_into(out);
                }
            }
            Type::Tagged(map) | Type::Record(map) => {
                for t in map.values() {
                    t.harvest_into(out);
                }
            }
        }
    }

    pub fn harvest(&self) -> Vec<ParamId> {
        let mut out = Vec::new();
        self.harvest_into(&mut out);
        out
    }

    /// Replace parameters whose id is a key of `map`, recursing structurally.
    pub fn substitute(&self, map: &SubstMap) -> Type {
        match self {
            Type::Top | Type::Named(_) | Type::Sum(_) => self.clone(),
            Type::Param { id, .. } => match map.get(id) {
                Some(t) => t.clone(),
                None => self.clone(),
            },
            Type::Array(inner) => Type::Array(Box::new(inner.substitute(map))),
            Type::Tuple(items) => Type::Tuple(items.iter().map(|t| t.substitute(map)).collect()),
            Type::Tagged(entries) => Type::Tagged(
                entries
                    .iter()
                    .map(|(k, t)| (k.clone(), t.substitute(map)))
                    .collect(),
            ),
            Type::Record(entries) => Type::Record(
                entries
                    .iter()
                    .map(|(k, t)| (k.clone(), t.substitute(map)))
                    .collect(),
            ),
        }
    }

    /// Produce a fresh alpha-renamed copy: each distinct parameter gets a
    /// newly minted replacement, first occurrence wins. Every fresh parameter
    /// is recorded as a descendant of its origin in `cx` for fixed-point
    /// bookkeeping.
    pub fn sanitize(&self, cx: &TypeCx, map: &mut SubstMap) -> Type {
        match self {
            Type::Top | Type::Named(_) | Type::Sum(_) => self.clone(),
            Type::Param { id, noreduce } => {
                if !map.contains_key(id) {
                    let fresh = cx.fresh(*noreduce);
                    if let Some(fresh_id) = fresh.param_id() {
                        cx.record_child(*id, fresh_id);
                    }
                    map.insert(*id, fresh);
                }
                map[id].clone()
            }
            Type::Array(inner) => Type::Array(Box::new(inner.sanitize(cx, map))),
            Type::Tuple(items) => {
                Type::Tuple(items.iter().map(|t| t.sanitize(cx, map)).collect())
            }
            Type::Tagged(entries) => Type::Tagged(
                entries
                    .iter()
                    .map(|(k, t)| (k.clone(), t.sanitize(cx, map)))
                    .collect(),
            ),
            Type::Record(entries) => Type::Record(
                entries
                    .iter()
                    .map(|(k, t)| (k.clone(), t.sanitize(cx, map)))
                    .collect(),
            ),
        }
    }
}

fn sorted_map<I, S>(entries: I) -> IndexMap<String, Type>
where
    I: IntoIterator<Item = (S, Type)>,
    S: Into<String>,
{
    let mut pairs: Vec<(String, Type)> =
        entries.into_iter().map(|(k, t)| (k.into(), t)).collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));
    pairs.into_iter().collect()
}

/// Structural equality, variant by variant. Parameters compare by id only;
/// the `noreduce` flag is bookkeeping, not identity.
impl PartialEq for Type {
    fn eq(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Top, Type::Top) => true,
            (Type::Param { id: a, .. }, Type::Param { id: b, .. }) => a == b,
            (Type::Named(a), Type::Named(b)) => a == b,
            (Type::Sum(a), Type::Sum(b)) => a == b,
            (Type::Array(a), Type::Array(b)) => a == b,
            (Type::Tuple(a), Type::Tuple(b)) => a == b,
            (Type::Tagged(a), Type::Tagged(b)) | (Type::Record(a), Type::Record(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, t)| b.get(k).is_some_and(|u| t == u))
            }
            _ => false,
        }
    }
}

impl Eq for Type {}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Top => write!(f, "_"),
            Type::Param { id, .. } => write!(f, "'{id}"),
            Type::Named(name) => write!(f, "{name}"),
            Type::Sum(names) => write!(f, "{}", names.join("+")),
            Type::Array(inner) => write!(f, "[{inner}]"),
            Type::Tuple(items) => {
                write!(f, "(")?;
                for (i, t) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{t}")?;
                }
                write!(f, ")")
            }
            Type::Tagged(entries) => write_keyed(f, entries, "<", ">"),
            Type::Record(entries) => write_keyed(f, entries, "{", "}"),
        }
    }
}

fn write_keyed(
    f: &mut fmt::Formatter<'_>,
    entries: &IndexMap<String, Type>,
    open: &str,
    close: &str,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, (k, t)) in entries.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{k}: {t}")?;
    }
    write!(f, "{close}")
}
