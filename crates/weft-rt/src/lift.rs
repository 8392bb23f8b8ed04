//! Lifting host functions into arrows.
//!
//! Synchronous functions become arrows directly. Continuation-passing
//! functions get a [`Responder`] they call when the result is ready,
//! and may hand back a cleanup closure that runs if the step is
//! cancelled first.

use std::cell::RefCell;
use std::rc::Rc;

use weft_annot::Signature;
use weft_types::{ArrowType, Constraint, ConstraintSet, Type, TypeError};

use crate::arrow::{Arrow, ArrowKind, H, K};
use crate::context::{Context, Cx};
use crate::error::{ComposeError, RunError};
use crate::progress::Progress;
use crate::value::Value;

pub type Cleanup = Box<dyn FnOnce()>;

pub(crate) type LiftFn = Rc<dyn Fn(Value) -> Result<Value, RunError>>;
pub(crate) type KLiftFn = Rc<dyn Fn(Value, Responder) -> Result<Option<Cleanup>, RunError>>;

impl Context {
    /// Lift a synchronous function under an annotation like
    /// `"'a ~> 'a"` or `"Bool ~> _ \ ({}, {Bool})"`.
    pub fn lift(
        self: &Rc<Self>,
        annotation: &str,
        f: impl Fn(Value) -> Result<Value, RunError> + 'static,
    ) -> Result<Arrow, ComposeError> {
        let ty = self.annotated_type(annotation)?;
        Ok(self.lift_with(ty, f))
    }

    /// Lift a synchronous function whose signature is already built.
    pub fn lift_with(
        self: &Rc<Self>,
        ty: ArrowType,
        f: impl Fn(Value) -> Result<Value, RunError> + 'static,
    ) -> Arrow {
        Arrow::from_parts(self.clone(), ty, ArrowKind::Lift(Rc::new(f)))
    }

    /// Lift without an annotation. The signature degrades to a pair of
    /// unrelated parameters, which defeats composition checking, so
    /// this warns through the tracer.
    pub fn lift_opaque(
        self: &Rc<Self>,
        f: impl Fn(Value) -> Result<Value, RunError> + 'static,
    ) -> Arrow {
        self.trace(|t| t.warn("function lifted without an annotation"));
        let ty = ArrowType::plain(self.types().fresh(false), self.types().fresh(false));
        self.lift_with(ty, f)
    }

    /// Lift a continuation-passing function under an annotation. The
    /// resulting arrow is always asynchronous.
    pub fn klift(
        self: &Rc<Self>,
        annotation: &str,
        f: impl Fn(Value, Responder) -> Result<Option<Cleanup>, RunError> + 'static,
    ) -> Result<Arrow, ComposeError> {
        let ty = self.annotated_type(annotation)?;
        Ok(self.klift_with(ty, f))
    }

    /// Lift a continuation-passing function with a prebuilt signature.
    pub fn klift_with(
        self: &Rc<Self>,
        ty: ArrowType,
        f: impl Fn(Value, Responder) -> Result<Option<Cleanup>, RunError> + 'static,
    ) -> Arrow {
        Arrow::from_parts(self.clone(), ty, ArrowKind::LiftK(Rc::new(f)))
    }

    fn annotated_type(self: &Rc<Self>, annotation: &str) -> Result<ArrowType, ComposeError> {
        let sig = self.annotations().parse(annotation, self.types())?;
        signature_type(self, &sig).map_err(|source| ComposeError::Type {
            op: "lift",
            input: annotation.to_string(),
            source,
        })
    }
}

/// Build and alpha-rename a cached signature so each lifted arrow gets
/// its own parameters.
fn signature_type(cx: &Cx, sig: &Signature) -> Result<ArrowType, TypeError> {
    let bounds = sig
        .bounds
        .iter()
        .map(|(lower, upper)| Constraint::new(lower.clone(), upper.clone()))
        .collect();
    let ty = ArrowType::new(
        sig.arg.clone(),
        sig.out.clone(),
        ConstraintSet::new(bounds)?,
        sig.throws.clone(),
    )?;
    ty.sanitize(cx.types())
}

pub(crate) fn call_lift(arrow: &Arrow, f: &LiftFn, x: Value, k: K, h: H) {
    let cx = arrow.cx();
    let result = f(x).and_then(|v| {
        if cx.runtime_checks() {
            cx.check(&arrow.ty().out, &v)?;
        }
        Ok(v)
    });
    match result {
        Ok(v) => k(v),
        Err(e) => h(e),
    }
}

struct KState {
    aborted: bool,
    cleanup: Option<Cleanup>,
}

/// Handed to a continuation-passing function; delivers the result at
/// most once, after cancellation no longer applies.
#[derive(Clone)]
pub struct Responder {
    state: Rc<RefCell<KState>>,
    progress: Rc<Progress>,
    out: Type,
    cx: Cx,
    k: K,
    h: H,
}

impl Responder {
    /// Deliver the result. A responder whose step was cancelled, or
    /// that already responded, does nothing.
    pub fn respond(&self, v: Value) {
        let cleanup = {
            let mut state = self.state.borrow_mut();
            if state.aborted {
                return;
            }
            state.aborted = true;
            state.cleanup.take()
        };
        if let Some(cleanup) = cleanup {
            cleanup();
        }

        self.progress.advance(None);

        if self.cx.runtime_checks()
            && let Err(e) = self.cx.check(&self.out, &v)
        {
            (self.h)(e);
            return;
        }
        (self.k)(v);
    }
}

pub(crate) fn call_klift(arrow: &Arrow, f: &KLiftFn, x: Value, p: &Rc<Progress>, k: K, h: H) {
    let state = Rc::new(RefCell::new(KState {
        aborted: false,
        cleanup: None,
    }));

    {
        let state = state.clone();
        p.add_canceller(Box::new(move |_| {
            let cleanup = {
                let mut state = state.borrow_mut();
                if state.aborted {
                    None
                } else {
                    state.aborted = true;
                    state.cleanup.take()
                }
            };
            if let Some(cleanup) = cleanup {
                cleanup();
            }
        }));
    }

    let responder = Responder {
        state: state.clone(),
        progress: p.clone(),
        out: arrow.ty().out.clone(),
        cx: arrow.cx().clone(),
        k,
        h: h.clone(),
    };

    match f(x, responder) {
        // Stored even if the function already responded; the abort
        // flag keeps a late cleanup from ever running.
        Ok(cleanup) => state.borrow_mut().cleanup = cleanup,
        Err(e) => h(e),
    }
}
