//! Process-wide context for type construction.
//!
//! Parameter ids are small monotonically increasing integers with no reset;
//! the counter and the sanitize-descendant registry live as long as the
//! owning runtime context.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::types::{ParamId, Type};

/// Mints fresh type parameters and tracks which parameters were spawned
/// from which by [`Type::sanitize`].
///
/// The descendant registry exists for fixed-point construction: when a
/// recursive arrow is tied shut, every parameter that sanitize derived from
/// the fixed argument/output parameters is remapped back onto them, so a
/// recursive use does not keep growing the type.
#[derive(Debug, Default)]
pub struct TypeCx {
    next_id: Cell<ParamId>,
    children: RefCell<HashMap<ParamId, Vec<ParamId>>>,
}

impl TypeCx {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh type parameter.
    pub fn fresh(&self, noreduce: bool) -> Type {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        Type::Param { id, noreduce }
    }

    pub(crate) fn record_child(&self, parent: ParamId, child: ParamId) {
        self.children
            .borrow_mut()
            .entry(parent)
            .or_default()
            .push(child);
    }

    /// The parameter itself plus everything sanitize derived from it,
    /// transitively.
    pub fn descendants(&self, root: ParamId) -> Vec<ParamId> {
        let mut out = Vec::new();
        let mut stack = vec![root];
        let children = self.children.borrow();

        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(kids) = children.get(&id) {
                stack.extend(kids.iter().copied());
            }
        }

        out
    }
}
