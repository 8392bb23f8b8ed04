//! Derived combinators built from the primitive ones.
//!
//! Nothing here has its own execution strategy; every method expands
//! into lifts, `seq`, `all`, `any`, `try`, `fanin`, and `fix`.

use crate::arrow::Arrow;
use crate::error::ComposeError;
use crate::value::Value;

impl Arrow {
    /// `self` then `next`.
    pub fn then(&self, next: &Arrow) -> Result<Arrow, ComposeError> {
        Arrow::seq(&[self.clone(), next.clone()])
    }

    /// `'a ~> ('a, 'b)`: keep the input alongside the output.
    pub fn carry(&self) -> Result<Arrow, ComposeError> {
        let cx = self.cx().clone();
        cx.split(2).then(&Arrow::all(&[cx.id(), self.clone()])?)
    }

    /// Run for effect, delivering the original input.
    pub fn remember(&self) -> Result<Arrow, ComposeError> {
        self.carry()?.then(&self.cx().nth(1))
    }

    /// Route the input through `then_a` or `else_a` depending on the
    /// boolean this arrow computes from it.
    pub fn if_then_else(&self, then_a: &Arrow, else_a: &Arrow) -> Result<Arrow, ComposeError> {
        let cx = self.cx().clone();
        let chooser = cx.lift("('a, Bool) ~> <left: 'a, right: 'a>", |x| {
            let Value::Seq(mut items) = x else {
                panic!("conditional input is not a pair");
            };
            assert!(items.len() >= 2, "conditional input has too few elements");
            let flag = items.swap_remove(1);
            let input = items.swap_remove(0);
            let tag = if matches!(flag, Value::Bool(true)) {
                "left"
            } else {
                "right"
            };
            Ok(Value::tagged(tag, input))
        })?;

        self.carry()?
            .then(&chooser)?
            .then(&Arrow::fanin(then_a, else_a)?)
    }

    /// Run `update` when the predicate holds, else pass through.
    pub fn if_true(&self, update: &Arrow) -> Result<Arrow, ComposeError> {
        self.if_then_else(update, &self.cx().id())
    }

    /// Run `update` when the predicate fails, else pass through.
    pub fn if_false(&self, update: &Arrow) -> Result<Arrow, ComposeError> {
        self.if_then_else(&self.cx().id(), update)
    }

    /// While the predicate holds, run `update` and loop on its output.
    pub fn while_true_then(&self, update: &Arrow) -> Result<Arrow, ComposeError> {
        let predicate = self.clone();
        let update = update.clone();
        Arrow::fix(self.cx(), move |alpha| {
            predicate.if_true(&update.then(&alpha)?)
        })
    }

    /// Run this arrow, then loop while `predicate` rejects its output.
    pub fn repeat_until(&self, predicate: &Arrow) -> Result<Arrow, ComposeError> {
        let body = self.clone();
        let predicate = predicate.clone();
        Arrow::fix(self.cx(), move |alpha| body.then(&predicate.if_false(&alpha)?))
    }

    /// Loop this arrow on its own output without terminating.
    pub fn forever(&self) -> Result<Arrow, ComposeError> {
        let body = self.clone();
        Arrow::fix(self.cx(), move |alpha| body.then(&alpha))
    }

    /// Fold this arrow's outputs into an accumulator.
    ///
    /// `initial` produces the starting accumulator, `condition`
    /// decides whether to keep going, and `accumulator` combines the
    /// running value with one more output of this arrow.
    pub fn fold(
        &self,
        initial: &Arrow,
        condition: &Arrow,
        accumulator: &Arrow,
    ) -> Result<Arrow, ComposeError> {
        let step = self.carry()?.then(accumulator)?;
        initial.then(&condition.while_true_then(&step)?)
    }

    /// Run this arrow silently until `other` delivers, then hand over.
    pub fn until(&self, other: &Arrow) -> Result<Arrow, ComposeError> {
        Arrow::any(&[Arrow::noemit(self), other.clone()])
    }

    /// Race both arrows with progress silenced, so whichever finishes
    /// first wins regardless of intermediate work.
    pub fn race_with(&self, other: &Arrow) -> Result<Arrow, ComposeError> {
        Arrow::any(&[Arrow::noemit(self), Arrow::noemit(other)])
    }

    /// `('a, 'c) ~> ('b, 'c)`: apply this arrow to the first slot.
    pub fn first(&self) -> Result<Arrow, ComposeError> {
        Arrow::all(&[self.clone(), self.cx().id()])
    }

    /// `('c, 'a) ~> ('c, 'b)`: apply this arrow to the second slot.
    pub fn second(&self) -> Result<Arrow, ComposeError> {
        Arrow::all(&[self.cx().id(), self.clone()])
    }

    /// `try` with an identity success arm.
    pub fn catch_with(&self, failure: &Arrow) -> Result<Arrow, ComposeError> {
        Arrow::try_recover(self, &self.cx().id(), failure)
    }

    /// Run this arrow and route the outcome, paired with the original
    /// input, to `handler` on failure or straight through on success.
    pub fn handle(&self, handler: &Arrow) -> Result<Arrow, ComposeError> {
        let cx = self.cx().clone();

        let tag = |t: &'static str| {
            cx.lift("'a ~> <left: 'a, right: 'a>", move |x| Ok(Value::tagged(t, x)))
        };

        let tried = Arrow::try_recover(self, &tag("right")?, &tag("left")?)?;

        // Push the pairing inside the tag so fanin sees (input, payload)
        // on both arms.
        let distribute = cx.lift(
            "('a, <left: 'b, right: 'b>) ~> <left: ('a, 'b), right: ('a, 'b)>",
            |x| {
                let Value::Seq(mut items) = x else {
                    panic!("handler input is not a pair");
                };
                assert!(items.len() >= 2, "handler input has too few elements");
                let outcome = items.swap_remove(1);
                let input = items.swap_remove(0);
                let Value::Tagged { tag, value } = outcome else {
                    panic!("handler outcome is not tagged");
                };
                Ok(Value::Tagged {
                    tag,
                    value: Box::new(Value::seq([input, *value])),
                })
            },
        )?;

        let succeed = cx.lift("('a, 'b) ~> 'b", |x| {
            let Value::Seq(mut items) = x else {
                panic!("handler input is not a pair");
            };
            assert!(items.len() >= 2, "handler input has too few elements");
            Ok(items.swap_remove(1))
        })?;

        tried
            .carry()?
            .then(&distribute)?
            .then(&Arrow::fanin(handler, &succeed)?)
    }
}
