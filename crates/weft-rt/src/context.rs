//! Shared execution context.
//!
//! A [`Context`] owns everything arrows need to be built and run: the
//! parameter allocator, the annotation cache, the virtual clock, the
//! named-type checker registry, and the tracer. Arrows hold an `Rc` to
//! their context, so one context spans a whole composition.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use weft_annot::SignatureCache;
use weft_types::{Type, TypeCx};

use crate::error::RunError;
use crate::scheduler::Scheduler;
use crate::trace::{NoopTracer, Tracer};
use crate::value::Value;

pub type Cx = Rc<Context>;

/// Decides whether a value inhabits a named type.
pub type CheckerFn = Box<dyn Fn(&Value) -> bool>;

pub struct Context {
    types: TypeCx,
    scheduler: Scheduler,
    annotations: SignatureCache,
    checkers: RefCell<HashMap<String, CheckerFn>>,
    runtime_checks: Cell<bool>,
    tracer: RefCell<Box<dyn Tracer>>,
}

impl Context {
    /// A fresh context with the built-in checkers for `Bool`, `Number`,
    /// and `String` and runtime checks enabled.
    pub fn new() -> Cx {
        let cx = Context {
            types: TypeCx::new(),
            scheduler: Scheduler::new(),
            annotations: SignatureCache::new(),
            checkers: RefCell::new(HashMap::new()),
            runtime_checks: Cell::new(true),
            tracer: RefCell::new(Box::new(NoopTracer)),
        };
        cx.register_checker("Bool", Box::new(|v| matches!(v, Value::Bool(_))));
        cx.register_checker("Number", Box::new(|v| matches!(v, Value::Num(_))));
        cx.register_checker("String", Box::new(|v| matches!(v, Value::Str(_))));
        Rc::new(cx)
    }

    pub fn types(&self) -> &TypeCx {
        &self.types
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn annotations(&self) -> &SignatureCache {
        &self.annotations
    }

    pub fn register_checker(&self, name: impl Into<String>, checker: CheckerFn) {
        self.checkers.borrow_mut().insert(name.into(), checker);
    }

    /// Toggle runtime value checks. Composition-time constraint
    /// checking is unaffected.
    pub fn set_runtime_checks(&self, enabled: bool) {
        self.runtime_checks.set(enabled);
    }

    pub fn runtime_checks(&self) -> bool {
        self.runtime_checks.get()
    }

    pub fn set_tracer(&self, tracer: Box<dyn Tracer>) {
        *self.tracer.borrow_mut() = tracer;
    }

    pub(crate) fn trace(&self, f: impl FnOnce(&mut dyn Tracer)) {
        f(self.tracer.borrow_mut().as_mut());
    }

    /// Structurally check `value` against `ty`. Parameters and the top
    /// type admit everything; named types consult the registry.
    pub fn check(&self, ty: &Type, value: &Value) -> Result<(), RunError> {
        match ty {
            Type::Top | Type::Param { .. } => Ok(()),
            Type::Named(name) => self.check_named(name, value),
            Type::Sum(names) => {
                for name in names {
                    if self.check_named(name, value).is_ok() {
                        return Ok(());
                    }
                    // A missing checker is an error even inside a sum.
                    if !self.checkers.borrow().contains_key(name) {
                        return Err(RunError::MissingChecker(name.clone()));
                    }
                }
                Err(self.clash(ty, value))
            }
            Type::Array(elem) => match value {
                Value::Seq(items) => {
                    for item in items {
                        self.check(elem, item)?;
                    }
                    Ok(())
                }
                _ => Err(self.clash(ty, value)),
            },
            Type::Tuple(slots) => match value {
                Value::Seq(items) if items.len() >= slots.len() => {
                    for (slot, item) in slots.iter().zip(items) {
                        self.check(slot, item)?;
                    }
                    Ok(())
                }
                _ => Err(self.clash(ty, value)),
            },
            Type::Tagged(variants) => match value {
                Value::Tagged { tag, value: inner } => match variants.get(tag) {
                    Some(variant) => self.check(variant, inner),
                    None => Err(self.clash(ty, value)),
                },
                _ => Err(self.clash(ty, value)),
            },
            Type::Record(fields) => match value {
                Value::Record(entries) => {
                    for (key, field) in fields {
                        match entries.get(key) {
                            Some(entry) => self.check(field, entry)?,
                            None => return Err(self.clash(ty, value)),
                        }
                    }
                    Ok(())
                }
                _ => Err(self.clash(ty, value)),
            },
        }
    }

    fn check_named(&self, name: &str, value: &Value) -> Result<(), RunError> {
        let checkers = self.checkers.borrow();
        let checker = checkers
            .get(name)
            .ok_or_else(|| RunError::MissingChecker(name.to_string()))?;
        if checker(value) {
            Ok(())
        } else {
            Err(RunError::TypeClash {
                expected: name.to_string(),
                value: value.clone(),
            })
        }
    }

    fn clash(&self, ty: &Type, value: &Value) -> RunError {
        RunError::TypeClash {
            expected: ty.to_string(),
            value: value.clone(),
        }
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod context_tests;
