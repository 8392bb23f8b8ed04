//! Arrow signatures and the constraint-closure normalization algorithm.
//!
//! `resolve` runs once per [`ArrowType`], at construction, and repeatedly:
//! closes the constraint set under decomposition and transitivity, merges
//! concrete bounds per parameter through the lattice, eliminates parameters
//! that are safe to substitute away, and finally prunes constraints that no
//! longer say anything about the signature. The surviving set is the minimal
//! signature exposed to callers.

use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::TypeError;
use crate::constraint::{Constraint, ConstraintSet};
use crate::cx::TypeCx;
use crate::lattice::{glb, lub};
use crate::types::{ParamId, SubstMap, Type};

/// The signature of an arrow: argument type, output type, outstanding
/// constraints, and the set of types it may raise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrowType {
    pub arg: Type,
    pub out: Type,
    pub constraints: ConstraintSet,
    pub errors: Vec<Type>,
}

impl ArrowType {
    /// Build and immediately normalize a signature. Error types are
    /// deduplicated by structural equality.
    pub fn new(
        arg: Type,
        out: Type,
        constraints: ConstraintSet,
        errors: Vec<Type>,
    ) -> Result<Self, TypeError> {
        let mut deduped: Vec<Type> = Vec::new();
        for e in errors {
            if !deduped.contains(&e) {
                deduped.push(e);
            }
        }

        let mut ty = Self {
            arg,
            out,
            constraints,
            errors: deduped,
        };
        ty.resolve()?;
        Ok(ty)
    }

    /// An unconstrained signature with no error types. With an empty
    /// constraint set there is nothing to normalize, so construction
    /// cannot fail.
    pub fn plain(arg: Type, out: Type) -> Self {
        Self {
            arg,
            out,
            constraints: ConstraintSet::empty(),
            errors: Vec::new(),
        }
    }

    /// Every parameter mentioned by the signature proper (not the
    /// constraint set).
    pub fn harvest(&self) -> Vec<ParamId> {
        let mut out = self.arg.harvest();
        self.out.harvest_into(&mut out);
        for e in &self.errors {
            e.harvest_into(&mut out);
        }
        out
    }

    /// Apply a substitution to the whole signature.
    pub fn substitute(&mut self, map: &SubstMap) -> Result<(), TypeError> {
        self.arg = self.arg.substitute(map);
        self.out = self.out.substitute(map);
        self.constraints = self.constraints.substitute(map)?;
        self.errors = self.errors.iter().map(|e| e.substitute(map)).collect();
        Ok(())
    }

    /// Fresh alpha-renamed copy of the entire signature.
    pub fn sanitize(&self, cx: &TypeCx) -> Result<ArrowType, TypeError> {
        let mut map = SubstMap::new();
        let arg = self.arg.sanitize(cx, &mut map);
        let out = self.out.sanitize(cx, &mut map);
        let constraints = self.constraints.sanitize(cx, &mut map)?;
        let errors = self.errors.iter().map(|e| e.sanitize(cx, &mut map)).collect();

        ArrowType::new(arg, out, constraints, errors)
    }

    /// Normalization loop. Terminates because pruning strictly shrinks the
    /// set whenever it does not stop the loop.
    pub fn resolve(&mut self) -> Result<(), TypeError> {
        loop {
            let initial = self.constraints.clone();

            loop {
                self.constraints = self.closure()?;
                self.constraints = self.merge_concrete_bounds()?;

                let map = self.collect_bounds();
                if map.is_empty() {
                    break;
                }

                self.substitute(&map)?;
            }

            let pruned = self.prune()?;
            if pruned.len() == self.constraints.len() || initial.set_equals(&pruned) {
                return Ok(());
            }

            self.constraints = pruned;
        }
    }

    /// Worklist fixpoint over the unary and binary closure rules,
    /// deduplicating by structural equality.
    fn closure(&self) -> Result<ConstraintSet, TypeError> {
        let mut accepted: Vec<Constraint> = Vec::new();
        let mut worklist: Vec<Constraint> = self.constraints.iter().cloned().collect();

        while let Some(w) = worklist.pop() {
            if accepted.contains(&w) {
                continue;
            }

            worklist.extend(w.unary());
            for c in &accepted {
                worklist.extend(w.binary(c));
            }

            accepted.push(w);
        }

        ConstraintSet::new(accepted)
    }

    /// Collapse multiple concrete bounds on one parameter into a single
    /// bound: glb of upper bounds (tightest), lub of lower bounds (loosest
    /// sufficient). Constraints between two parameters or two concrete
    /// types pass through unchanged.
    fn merge_concrete_bounds(&self) -> Result<ConstraintSet, TypeError> {
        let mut params: IndexMap<ParamId, Type> = IndexMap::new();
        let mut uppers: IndexMap<ParamId, Type> = IndexMap::new();
        let mut lowers: IndexMap<ParamId, Type> = IndexMap::new();
        let mut rest: Vec<Constraint> = Vec::new();

        for c in self.constraints.iter() {
            if let Some(id) = c.lower.param_id() {
                params.entry(id).or_insert_with(|| c.lower.clone());
            }
            if let Some(id) = c.upper.param_id() {
                params.entry(id).or_insert_with(|| c.upper.clone());
            }

            match (c.lower.param_id(), c.upper.param_id()) {
                (Some(id), None) if c.upper.is_concrete() => {
                    let merged = match uppers.get(&id) {
                        Some(prev) => glb(prev, &c.upper)?,
                        None => c.upper.clone(),
                    };
                    uppers.insert(id, merged);
                }
                (None, Some(id)) if c.lower.is_concrete() => {
                    let merged = match lowers.get(&id) {
                        Some(prev) => lub(prev, &c.lower),
                        None => c.lower.clone(),
                    };
                    lowers.insert(id, merged);
                }
                _ => rest.push(c.clone()),
            }
        }

        for (id, bound) in uppers {
            rest.push(Constraint::new(params[&id].clone(), bound));
        }
        for (id, bound) in lowers {
            rest.push(Constraint::new(bound, params[&id].clone()));
        }

        ConstraintSet::new(rest)
    }

    /// Parameters safe to substitute away this pass:
    ///
    /// - `t <= p` and `p <= t` (mutually bounded): `p -> t`
    /// - negative-only `p` with exactly one upper bound: `p -> bound`
    /// - positive-only `p` with exactly one lower bound: `p -> bound`
    ///
    /// Uniqueness checks compare parameters by id, which is identity here:
    /// ids are globally unique even when two parameters are shape-identical.
    fn collect_bounds(&self) -> SubstMap {
        let mut map = SubstMap::new();

        fn bind(map: &mut SubstMap, id: ParamId, t: &Type) {
            let resolved = match t.param_id() {
                Some(tid) if map.contains_key(&tid) => map[&tid].clone(),
                _ => t.clone(),
            };
            map.insert(id, resolved);
        }

        let items: Vec<&Constraint> = self.constraints.iter().collect();

        for c1 in items.iter().filter(|c| {
            c.lower.is_param() && !c.lower.is_noreduce_param()
        }) {
            for c2 in items.iter().filter(|c| {
                c.upper.is_param() && !c.upper.is_noreduce_param()
            }) {
                if c1.lower == c2.upper && c1.upper == c2.lower {
                    if let Some(id) = c1.lower.param_id() {
                        bind(&mut map, id, &c1.upper);
                    }
                }
            }
        }

        let (neg, pos) = self.polarity();

        for id in neg.iter().filter(|id| !pos.contains(*id)) {
            let bounds: Vec<&&Constraint> = items
                .iter()
                .filter(|c| c.lower.param_id() == Some(*id))
                .collect();
            if let [only] = bounds.as_slice() {
                bind(&mut map, *id, &only.upper);
            }
        }

        for id in pos.iter().filter(|id| !neg.contains(*id)) {
            let bounds: Vec<&&Constraint> = items
                .iter()
                .filter(|c| c.upper.param_id() == Some(*id))
                .collect();
            if let [only] = bounds.as_slice() {
                bind(&mut map, *id, &only.lower);
            }
        }

        map
    }

    /// Drop constraints that no longer inform the signature: both sides
    /// concrete, an internal parameter unreachable from arg/out/errors, or
    /// a parameter kept against its polarity. Constraints touching a
    /// `noreduce` parameter are always retained.
    fn prune(&self) -> Result<ConstraintSet, TypeError> {
        let (neg, pos) = self.polarity();
        let reachable: IndexSet<ParamId> = self.harvest().into_iter().collect();

        let kept = self
            .constraints
            .iter()
            .filter(|c| {
                if c.lower.is_noreduce_param() || c.upper.is_noreduce_param() {
                    return true;
                }

                if !c.lower.is_param() && !c.upper.is_param() {
                    return false;
                }

                if let (Some(l), Some(u)) = (c.lower.param_id(), c.upper.param_id()) {
                    if !reachable.contains(&l) || !reachable.contains(&u) {
                        return false;
                    }
                }

                if let Some(id) = c.lower.param_id() {
                    if !neg.contains(&id) {
                        return false;
                    }
                }
                if let Some(id) = c.upper.param_id() {
                    if !pos.contains(&id) {
                        return false;
                    }
                }

                true
            })
            .cloned()
            .collect();

        ConstraintSet::new(kept)
    }

    /// Negative (consumed) and positive (produced) parameter sets, expanded
    /// through bound definitions to a fixpoint. A parameter occurring in
    /// both positions is in both sets; one unreachable from the signature
    /// is in neither.
    fn polarity(&self) -> (IndexSet<ParamId>, IndexSet<ParamId>) {
        let mut neg: IndexSet<ParamId> = self.arg.harvest().into_iter().collect();
        let mut pos: IndexSet<ParamId> = {
            let mut ids = self.out.harvest();
            for e in &self.errors {
                e.harvest_into(&mut ids);
            }
            ids.into_iter().collect()
        };

        let neg_defs: Vec<(ParamId, Vec<ParamId>)> = self
            .constraints
            .iter()
            .filter_map(|c| c.lower.param_id().map(|id| (id, c.upper.harvest())))
            .collect();
        let pos_defs: Vec<(ParamId, Vec<ParamId>)> = self
            .constraints
            .iter()
            .filter_map(|c| c.upper.param_id().map(|id| (id, c.lower.harvest())))
            .collect();

        loop {
            let mut changed = false;

            for (id, deps) in &neg_defs {
                if neg.contains(id) {
                    for d in deps {
                        changed |= neg.insert(*d);
                    }
                }
            }
            for (id, deps) in &pos_defs {
                if pos.contains(id) {
                    for d in deps {
                        changed |= pos.insert(*d);
                    }
                }
            }

            if !changed {
                return (neg, pos);
            }
        }
    }
}

impl fmt::Display for ArrowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ~> {}", self.arg, self.out)?;

        if !self.constraints.is_empty() || !self.errors.is_empty() {
            write!(f, " \\ ({}, {{", self.constraints)?;
            for (i, e) in self.errors.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{e}")?;
            }
            write!(f, "}})")?;
        }

        Ok(())
    }
}
