//! Structural type lattice and constraint engine for weft arrows.
//!
//! Every arrow carries an [`ArrowType`]: an argument type, an output type,
//! a set of outstanding subtype [`Constraint`]s, and the types it may raise.
//! Combinators build composite arrow types out of their children's types and
//! immediately normalize them with [`ArrowType::resolve`], so a composition
//! that cannot typecheck fails at construction time, never at execution time.
//!
//! Types themselves are immutable values; parameter identity is a globally
//! unique id minted by [`TypeCx`], which lives for the life of the process.

mod arrow_type;
mod constraint;
mod cx;
mod lattice;
mod types;

#[cfg(test)]
mod lattice_tests;
#[cfg(test)]
mod types_tests;

pub use arrow_type::ArrowType;
pub use constraint::{Constraint, ConstraintSet};
pub use cx::TypeCx;
pub use lattice::{glb, lub};
pub use types::{ParamId, SubstMap, Type};

/// Errors raised while combining or normalizing types.
///
/// These are composition-time failures: they abort the construction of an
/// arrow and are never deferred to execution.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    /// A constraint set contained a structurally impossible obligation.
    #[error("inconsistent constraints: [{0}]")]
    InconsistentConstraints(String),

    /// Two types have no common lower bound under the subtype order.
    #[error("no greatest lower bound of \"{lhs}\" and \"{rhs}\"")]
    NoGreatestLowerBound { lhs: String, rhs: String },
}
