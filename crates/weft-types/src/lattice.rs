//! Least-upper-bound and greatest-lower-bound over the structural lattice.
//!
//! Used by constraint resolution to merge multiple concrete bounds on a
//! parameter into a single tightest (glb) or loosest sufficient (lub) bound.

use crate::TypeError;
use crate::types::Type;

/// Least upper bound under the subtype order.
///
/// Any shape mismatch widens to `Top`; lub is total.
pub fn lub(a: &Type, b: &Type) -> Type {
    if a == b {
        return a.clone();
    }

    if let (Some(na), Some(nb)) = (a.names(), b.names()) {
        return Type::from_names(na.into_iter().chain(nb));
    }

    match (a, b) {
        (Type::Tagged(ma), Type::Tagged(mb)) => Type::tagged(
            mb.iter()
                .filter_map(|(k, tb)| ma.get(k).map(|ta| (k.clone(), lub(ta, tb)))),
        ),
        (Type::Array(ia), Type::Array(ib)) => Type::array(lub(ia, ib)),
        (Type::Tuple(ta), Type::Tuple(tb)) => {
            // The shorter tuple's arity wins; trailing positions are dropped.
            let (short, long) = if ta.len() < tb.len() { (ta, tb) } else { (tb, ta) };
            Type::tuple(
                short
                    .iter()
                    .zip(long.iter())
                    .map(|(x, y)| lub(x, y))
                    .collect(),
            )
        }
        (Type::Record(ma), Type::Record(mb)) => Type::record(
            ma.iter()
                .filter_map(|(k, ta)| mb.get(k).map(|tb| (k.clone(), lub(ta, tb)))),
        ),
        _ => Type::Top,
    }
}

/// Greatest lower bound under the subtype order.
///
/// Unlike [`lub`], glb is partial: a shape mismatch (or an empty name
/// intersection) has no greatest lower bound and is a composition error.
pub fn glb(a: &Type, b: &Type) -> Result<Type, TypeError> {
    if a == b {
        return Ok(a.clone());
    }

    if matches!(a, Type::Top) {
        return Ok(b.clone());
    }
    if matches!(b, Type::Top) {
        return Ok(a.clone());
    }

    if let (Some(na), Some(nb)) = (a.names(), b.names()) {
        let shared: Vec<&str> = na.into_iter().filter(|n| nb.contains(n)).collect();
        if !shared.is_empty() {
            return Ok(Type::from_names(shared));
        }
        return Err(no_glb(a, b));
    }

    match (a, b) {
        (Type::Array(ia), Type::Array(ib)) => Ok(Type::array(glb(ia, ib)?)),
        (Type::Tuple(ta), Type::Tuple(tb)) => {
            // The longer tuple's arity wins; positions beyond the shorter
            // one pass through unchanged.
            let (short, long) = if ta.len() < tb.len() { (ta, tb) } else { (tb, ta) };
            let mut items = Vec::with_capacity(long.len());
            for (i, t) in long.iter().enumerate() {
                match short.get(i) {
                    Some(s) => items.push(glb(t, s)?),
                    None => items.push(t.clone()),
                }
            }
            Ok(Type::tuple(items))
        }
        (Type::Tagged(ma), Type::Tagged(mb)) => Ok(Type::tagged(merge_keyed(ma, mb)?)),
        (Type::Record(ma), Type::Record(mb)) => Ok(Type::record(merge_keyed(ma, mb)?)),
        _ => Err(no_glb(a, b)),
    }
}

/// Keys from either operand, combined by glb when present in both.
fn merge_keyed(
    a: &indexmap::IndexMap<String, Type>,
    b: &indexmap::IndexMap<String, Type>,
) -> Result<Vec<(String, Type)>, TypeError> {
    let mut out: Vec<(String, Type)> = a.iter().map(|(k, t)| (k.clone(), t.clone())).collect();
    for (k, tb) in b {
        match out.iter_mut().find(|(ok, _)| ok == k) {
            Some((_, ta)) => *ta = glb(ta, tb)?,
            None => out.push((k.clone(), tb.clone())),
        }
    }
    Ok(out)
}

fn no_glb(a: &Type, b: &Type) -> TypeError {
    TypeError::NoGreatestLowerBound {
        lhs: a.to_string(),
        rhs: b.to_string(),
    }
}
