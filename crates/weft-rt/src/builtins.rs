//! Stock arrows every program wants.

use std::rc::Rc;

use weft_types::{ArrowType, Type};

use crate::arrow::Arrow;
use crate::context::Context;
use crate::error::RunError;
use crate::value::Value;

impl Context {
    /// `'a ~> 'a`, the identity arrow.
    pub fn id(self: &Rc<Self>) -> Arrow {
        let p = self.types().fresh(false);
        self.lift_with(ArrowType::plain(p.clone(), p), Ok)
    }

    /// Ignore the input and produce `v`. Scalar constants get a named
    /// output type; anything else degrades to a fresh parameter.
    pub fn constant(self: &Rc<Self>, v: Value) -> Arrow {
        let out = match &v {
            Value::Bool(_) => Type::named("Bool"),
            Value::Num(_) => Type::named("Number"),
            Value::Str(_) => Type::named("String"),
            _ => self.types().fresh(false),
        };
        self.lift_with(ArrowType::plain(Type::Top, out), move |_| Ok(v.clone()))
    }

    /// `'a ~> 'a`, delivered `ticks` later on the virtual clock.
    /// Cancellation before the deadline drops the timer.
    pub fn delay(self: &Rc<Self>, ticks: u64) -> Arrow {
        let p = self.types().fresh(false);
        let cx = self.clone();
        self.klift_with(ArrowType::plain(p.clone(), p), move |x, responder| {
            let timer = cx
                .scheduler()
                .schedule(ticks, Box::new(move || responder.respond(x)));
            let cx = cx.clone();
            Ok(Some(Box::new(move || cx.scheduler().cancel(timer))))
        })
    }

    /// `'a ~> ('a, ..., 'a)`: duplicate the input into an n-tuple.
    pub fn split(self: &Rc<Self>, n: usize) -> Arrow {
        let p = self.types().fresh(false);
        let ty = ArrowType::plain(p.clone(), Type::tuple(vec![p; n]));
        self.lift_with(ty, move |x| Ok(Value::Seq(vec![x; n])))
    }

    /// `('a1, ..., 'an) ~> 'an`: select the nth element, 1-based.
    pub fn nth(self: &Rc<Self>, n: usize) -> Arrow {
        let slots: Vec<Type> = (0..n).map(|_| self.types().fresh(false)).collect();
        let out = slots[n - 1].clone();
        let ty = ArrowType::plain(Type::tuple(slots), out);
        self.lift_with(ty, move |x| {
            let Value::Seq(mut items) = x else {
                panic!("tuple selector input is not a tuple");
            };
            if items.len() < n {
                panic!("tuple selector input has too few elements");
            }
            Ok(items.swap_remove(n - 1))
        })
    }

    /// `'a ~> 'a`, reporting the value through the tracer on the way.
    pub fn log(self: &Rc<Self>) -> Arrow {
        let p = self.types().fresh(false);
        let cx = self.clone();
        self.lift_with(ArrowType::plain(p.clone(), p), move |x| {
            cx.trace(|t| t.trace_value(&x));
            Ok(x)
        })
    }

    /// Fail unconditionally with `v` as the raised payload.
    pub fn raise(self: &Rc<Self>, v: Value) -> Arrow {
        let ty = ArrowType::plain(self.types().fresh(false), self.types().fresh(false));
        self.lift_with(ty, move |_| Err(RunError::Raised(v.clone())))
    }

    /// `Bool ~> _ \ ({}, {Bool})`: raise a true input, pass false
    /// through. Turns a boolean test into control flow for `try`.
    pub fn throw_false(self: &Rc<Self>) -> Arrow {
        let mut ty = ArrowType::plain(Type::named("Bool"), Type::Top);
        ty.errors.push(Type::named("Bool"));
        self.lift_with(ty, |x| match x {
            Value::Bool(true) => Err(RunError::Raised(x)),
            other => Ok(other),
        })
    }
}
