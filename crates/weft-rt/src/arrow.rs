//! The arrow value itself: a typed, composable unit of execution.
//!
//! An [`Arrow`] is an immutable handle (cheap to clone) over its
//! context, its resolved signature, and its execution shape. Execution
//! is continuation-passing: [`Arrow::call`] takes a success and a
//! failure continuation plus the [`Progress`] node the step runs
//! under, and every combinator threads those through its children.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use weft_types::ArrowType;

use crate::combinators;
use crate::context::Cx;
use crate::error::RunError;
use crate::lift::{self, KLiftFn, LiftFn};
use crate::progress::Progress;
use crate::value::Value;

/// Success continuation.
pub type K = Rc<dyn Fn(Value)>;
/// Failure continuation.
pub type H = Rc<dyn Fn(RunError)>;

#[derive(Clone)]
pub(crate) enum ArrowKind {
    Lift(LiftFn),
    LiftK(KLiftFn),
    Seq(Rc<Vec<Arrow>>),
    All(Rc<Vec<Arrow>>),
    Any(Rc<Vec<Arrow>>),
    NoEmit(Box<Arrow>),
    Try {
        body: Box<Arrow>,
        success: Box<Arrow>,
        failure: Box<Arrow>,
    },
    Fanin {
        left: Box<Arrow>,
        right: Box<Arrow>,
    },
    Spawn(Rc<Vec<Arrow>>),
    Proxy(Rc<combinators::ProxySlot>),
}

struct ArrowInner {
    cx: Cx,
    ty: ArrowType,
    kind: ArrowKind,
}

#[derive(Clone)]
pub struct Arrow {
    inner: Rc<ArrowInner>,
}

impl Arrow {
    pub(crate) fn from_parts(cx: Cx, ty: ArrowType, kind: ArrowKind) -> Arrow {
        Arrow {
            inner: Rc::new(ArrowInner { cx, ty, kind }),
        }
    }

    pub fn cx(&self) -> &Cx {
        &self.inner.cx
    }

    /// The resolved signature.
    pub fn ty(&self) -> &ArrowType {
        &self.inner.ty
    }

    pub(crate) fn kind(&self) -> &ArrowKind {
        &self.inner.kind
    }

    /// Whether this arrow may deliver its result after `call` returns.
    pub fn is_async(&self) -> bool {
        match self.kind() {
            ArrowKind::Lift(_) => false,
            ArrowKind::LiftK(_) => true,
            ArrowKind::NoEmit(_) | ArrowKind::Any(_) => true,
            ArrowKind::Seq(items) | ArrowKind::All(items) => {
                items.iter().any(Arrow::is_async)
            }
            ArrowKind::Try {
                body,
                success,
                failure,
            } => (body.is_async() || success.is_async()) && failure.is_async(),
            ArrowKind::Fanin { left, right } => left.is_async() || right.is_async(),
            // A spawned group completes when its foreground arrow does.
            ArrowKind::Spawn(items) => items[0].is_async(),
            ArrowKind::Proxy(slot) => slot.is_async(),
        }
    }

    /// Structural identity: lifted functions compare by pointer,
    /// combinators recursively.
    pub fn equals(&self, other: &Arrow) -> bool {
        fn all_equal(a: &[Arrow], b: &[Arrow]) -> bool {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equals(y))
        }

        match (self.kind(), other.kind()) {
            (ArrowKind::Proxy(slot), _) => match slot.target() {
                Some(target) => target.equals(other),
                None => false,
            },
            (_, ArrowKind::Proxy(slot)) => match slot.target() {
                Some(target) => self.equals(&target),
                None => false,
            },
            (ArrowKind::Lift(f), ArrowKind::Lift(g)) => Rc::ptr_eq(f, g),
            (ArrowKind::LiftK(f), ArrowKind::LiftK(g)) => Rc::ptr_eq(f, g),
            (ArrowKind::Seq(a), ArrowKind::Seq(b)) => all_equal(a, b),
            (ArrowKind::All(a), ArrowKind::All(b)) => all_equal(a, b),
            (ArrowKind::Any(a), ArrowKind::Any(b)) => all_equal(a, b),
            (ArrowKind::Spawn(a), ArrowKind::Spawn(b)) => all_equal(a, b),
            (ArrowKind::NoEmit(a), ArrowKind::NoEmit(b)) => a.equals(b),
            (
                ArrowKind::Try {
                    body: ab,
                    success: asucc,
                    failure: af,
                },
                ArrowKind::Try {
                    body: bb,
                    success: bs,
                    failure: bf,
                },
            ) => ab.equals(bb) && asucc.equals(bs) && af.equals(bf),
            (
                ArrowKind::Fanin {
                    left: al,
                    right: ar,
                },
                ArrowKind::Fanin {
                    left: bl,
                    right: br,
                },
            ) => al.equals(bl) && ar.equals(br),
            _ => false,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self.kind() {
            ArrowKind::Lift(_) => "lift",
            ArrowKind::LiftK(_) => "klift",
            ArrowKind::Seq(_) => "seq",
            ArrowKind::All(_) => "all",
            ArrowKind::Any(_) => "any",
            ArrowKind::NoEmit(_) => "noemit",
            ArrowKind::Try { .. } => "try",
            ArrowKind::Fanin { .. } => "fanin",
            ArrowKind::Spawn(_) => "spawn",
            ArrowKind::Proxy(_) => "proxy",
        }
    }

    /// Execute under `p`, delivering exactly one of `k(value)` or
    /// `h(error)` unless the run is cancelled first.
    pub fn call(&self, x: Value, p: &Rc<Progress>, k: K, h: H) {
        self.cx().trace(|t| t.trace_call(self.kind_name()));
        match self.kind() {
            ArrowKind::Lift(f) => lift::call_lift(self, f, x, k, h),
            ArrowKind::LiftK(f) => lift::call_klift(self, f, x, p, k, h),
            ArrowKind::Seq(items) => combinators::call_seq(items.clone(), x, p, k, h),
            ArrowKind::All(items) => combinators::call_all(items, x, p, k, h),
            ArrowKind::Any(items) => combinators::call_any(items, x, p, k, h),
            ArrowKind::NoEmit(body) => combinators::call_noemit(self.cx(), body, x, p, k, h),
            ArrowKind::Try {
                body,
                success,
                failure,
            } => combinators::call_try(body, success, failure, x, p, k, h),
            ArrowKind::Fanin { left, right } => combinators::call_fanin(left, right, x, p, k, h),
            ArrowKind::Spawn(items) => combinators::call_spawn(items, x, p, k, h),
            ArrowKind::Proxy(slot) => match slot.target() {
                Some(target) => target.call(x, p, k, h),
                None => panic!("recursion placeholder called before its body was frozen"),
            },
        }
    }

    /// Start a run under a fresh emitting root. The returned node
    /// cancels the whole run.
    pub fn run_with(
        &self,
        x: Value,
        k: impl Fn(Value) + 'static,
        h: impl Fn(RunError) + 'static,
    ) -> Rc<Progress> {
        let p = Progress::new(true);

        let deliver_cx = self.cx().clone();
        let k: K = Rc::new(move |v| {
            deliver_cx.trace(|t| t.trace_deliver(true));
            k(v);
        });

        let fail_cx = self.cx().clone();
        let root = p.clone();
        let h: H = Rc::new(move |e| {
            fail_cx.trace(|t| t.trace_deliver(false));
            root.cancel(None);
            h(e);
        });

        self.call(x, &p, k, h);
        p
    }

    /// Fire and forget. An unhandled failure panics.
    pub fn run(&self, x: Value) -> Rc<Progress> {
        self.run_with(x, |_| {}, |e| panic!("unhandled arrow failure: {e}"))
    }

    /// Run and drive the virtual clock until the result is in. Panics
    /// if the run stalls with no pending timers, which means some
    /// asynchronous step lost its continuation.
    pub fn run_to_completion(&self, x: Value) -> Result<Value, RunError> {
        let outcome: Rc<RefCell<Option<Result<Value, RunError>>>> =
            Rc::new(RefCell::new(None));

        let on_ok = outcome.clone();
        let on_err = outcome.clone();
        self.run_with(
            x,
            move |v| {
                on_ok.borrow_mut().get_or_insert(Ok(v));
            },
            move |e| {
                on_err.borrow_mut().get_or_insert(Err(e));
            },
        );

        self.cx().scheduler().run();

        match outcome.borrow_mut().take() {
            Some(result) => result,
            None => panic!("arrow stalled without delivering a result"),
        }
    }
}

// The lifted function kinds hold `Rc<dyn Fn>`, so Debug cannot be derived.
impl fmt::Debug for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arrow")
            .field("kind", &self.kind_name())
            .field("ty", &self.ty().to_string())
            .finish()
    }
}
