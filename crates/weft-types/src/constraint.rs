//! Subtype constraints and deduplicated constraint sets.

use std::fmt;

use serde::Serialize;

use crate::TypeError;
use crate::cx::TypeCx;
use crate::types::{SubstMap, Type};

/// An ordered subtype obligation: `lower <= upper`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constraint {
    pub lower: Type,
    pub upper: Type,
}

impl Constraint {
    pub fn new(lower: Type, upper: Type) -> Self {
        Self { lower, upper }
    }

    /// A constraint carries no information when both sides are equal or the
    /// upper bound is the wildcard.
    pub fn is_useless(&self) -> bool {
        self.lower == self.upper || matches!(self.upper, Type::Top)
    }

    /// Whether the two sides' shapes are compatible at all.
    pub fn is_consistent(&self) -> bool {
        let a = &self.lower;
        let b = &self.upper;

        if let (Some(na), Some(nb)) = (a.names(), b.names()) {
            return na.iter().all(|n| nb.contains(n));
        }

        match (a, b) {
            (Type::Array(_), Type::Array(_)) => true,
            (Type::Tuple(ta), Type::Tuple(tb)) => tb.len() <= ta.len(),
            (Type::Tagged(ma), Type::Tagged(mb)) => ma.keys().all(|k| mb.contains_key(k)),
            (Type::Record(ma), Type::Record(mb)) => mb.keys().all(|k| ma.contains_key(k)),
            _ => matches!(b, Type::Top) || a.is_param() || b.is_param(),
        }
    }

    /// Structural decomposition: constraints implied by this one alone.
    pub fn unary(&self) -> Vec<Constraint> {
        match (&self.lower, &self.upper) {
            (Type::Array(ia), Type::Array(ib)) => {
                vec![Constraint::new((**ia).clone(), (**ib).clone())]
            }
            (Type::Tuple(ta), Type::Tuple(tb)) => tb
                .iter()
                .take(ta.len())
                .enumerate()
                .map(|(i, t)| Constraint::new(ta[i].clone(), t.clone()))
                .collect(),
            (Type::Tagged(ma), Type::Tagged(mb)) => ma
                .iter()
                .filter_map(|(k, ta)| {
                    mb.get(k).map(|tb| Constraint::new(ta.clone(), tb.clone()))
                })
                .collect(),
            (Type::Record(ma), Type::Record(mb)) => mb
                .iter()
                .filter_map(|(k, tb)| {
                    ma.get(k).map(|ta| Constraint::new(ta.clone(), tb.clone()))
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Transitivity against another constraint, in either orientation.
    pub fn binary(&self, that: &Constraint) -> Vec<Constraint> {
        if self.upper == that.lower {
            return vec![Constraint::new(self.lower.clone(), that.upper.clone())];
        }

        if self.lower == that.upper {
            return vec![Constraint::new(that.lower.clone(), self.upper.clone())];
        }

        Vec::new()
    }

    pub fn substitute(&self, map: &SubstMap) -> Constraint {
        Constraint::new(self.lower.substitute(map), self.upper.substitute(map))
    }

    pub fn sanitize(&self, cx: &TypeCx, map: &mut SubstMap) -> Constraint {
        Constraint::new(self.lower.sanitize(cx, map), self.upper.sanitize(cx, map))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <= {}", self.lower, self.upper)
    }
}

/// A deduplicated set of constraints.
///
/// Construction filters useless members and fails if any member is
/// inconsistent, so a `ConstraintSet` that exists is always satisfiable
/// shape-wise.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConstraintSet {
    items: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new(constraints: Vec<Constraint>) -> Result<Self, TypeError> {
        let inconsistent: Vec<String> = constraints
            .iter()
            .filter(|c| !c.is_consistent())
            .map(Constraint::to_string)
            .collect();

        if !inconsistent.is_empty() {
            return Err(TypeError::InconsistentConstraints(inconsistent.join(", ")));
        }

        Ok(Self {
            items: constraints.into_iter().filter(|c| !c.is_useless()).collect(),
        })
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.items.iter()
    }

    pub fn contains(&self, constraint: &Constraint) -> bool {
        self.items.iter().any(|c| c == constraint)
    }

    /// Add a constraint, deduplicating by structural equality.
    pub fn add(&self, constraint: Constraint) -> Result<Self, TypeError> {
        if self.contains(&constraint) {
            return Ok(self.clone());
        }

        let mut items = self.items.clone();
        items.push(constraint);
        Self::new(items)
    }

    pub fn add_all<I>(&self, constraints: I) -> Result<Self, TypeError>
    where
        I: IntoIterator<Item = Constraint>,
    {
        let mut set = self.clone();
        for c in constraints {
            set = set.add(c)?;
        }
        Ok(set)
    }

    pub fn concat(&self, other: &ConstraintSet) -> Result<Self, TypeError> {
        self.add_all(other.items.iter().cloned())
    }

    /// Substitution may collapse shapes, so the result is re-validated.
    pub fn substitute(&self, map: &SubstMap) -> Result<Self, TypeError> {
        Self::new(self.items.iter().map(|c| c.substitute(map)).collect())
    }

    pub fn sanitize(&self, cx: &TypeCx, map: &mut SubstMap) -> Result<Self, TypeError> {
        Self::new(self.items.iter().map(|c| c.sanitize(cx, map)).collect())
    }

    /// Set equality up to ordering (both sets are deduplicated).
    pub fn set_equals(&self, other: &ConstraintSet) -> bool {
        self.items.len() == other.items.len()
            && self.items.iter().all(|c| other.contains(c))
    }
}

impl fmt::Display for ConstraintSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, c) in self.items.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "}}")
    }
}
