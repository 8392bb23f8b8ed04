//! Combinator constructors and their execution strategies.
//!
//! Construction is where typechecking happens: each constructor
//! alpha-renames its children's signatures, concatenates their
//! constraint sets, adds the wiring constraints for the combinator's
//! shape, and normalizes. A wiring that cannot be made consistent is a
//! [`ComposeError`] before anything runs.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use weft_types::{ArrowType, Constraint, ConstraintSet, SubstMap, Type, TypeError};

use crate::arrow::{Arrow, ArrowKind, H, K};
use crate::context::Cx;
use crate::error::ComposeError;
use crate::progress::Progress;
use crate::value::Value;

impl Arrow {
    /// Feed each arrow's output to the next.
    pub fn seq(arrows: &[Arrow]) -> Result<Arrow, ComposeError> {
        let cx = shared_cx(arrows)?;
        let ty = seq_type(&cx, arrows).map_err(|e| compose_error("seq", arrows, e))?;
        Ok(Arrow::from_parts(
            cx,
            ty,
            ArrowKind::Seq(Rc::new(arrows.to_vec())),
        ))
    }

    /// Run every arrow on its slot of a tuple input, collecting a
    /// tuple of outputs.
    pub fn all(arrows: &[Arrow]) -> Result<Arrow, ComposeError> {
        let cx = shared_cx(arrows)?;
        let ty = all_type(&cx, arrows).map_err(|e| compose_error("all", arrows, e))?;
        Ok(Arrow::from_parts(
            cx,
            ty,
            ArrowKind::All(Rc::new(arrows.to_vec())),
        ))
    }

    /// Race every arrow on the same input; first observable progress
    /// wins and the rest are cancelled.
    pub fn any(arrows: &[Arrow]) -> Result<Arrow, ComposeError> {
        let cx = shared_cx(arrows)?;
        let ty = any_type(&cx, arrows).map_err(|e| compose_error("any", arrows, e))?;
        Ok(Arrow::from_parts(
            cx,
            ty,
            ArrowKind::Any(Rc::new(arrows.to_vec())),
        ))
    }

    /// Silence an arrow's progress so it can lose a race even after
    /// doing internal work. Delivery is deferred a tick, which also
    /// breaks synchronous recursion in self-referential loops.
    pub fn noemit(arrow: &Arrow) -> Arrow {
        Arrow::from_parts(
            arrow.cx().clone(),
            arrow.ty().clone(),
            ArrowKind::NoEmit(Box::new(arrow.clone())),
        )
    }

    /// Run `body`; route its result through `success`, or its failure
    /// through `failure`.
    pub fn try_recover(
        body: &Arrow,
        success: &Arrow,
        failure: &Arrow,
    ) -> Result<Arrow, ComposeError> {
        let cx = body.cx().clone();
        let parts = [body.clone(), success.clone(), failure.clone()];
        let ty = try_type(&cx, &parts).map_err(|e| compose_error("try", &parts, e))?;
        Ok(Arrow::from_parts(
            cx,
            ty,
            ArrowKind::Try {
                body: Box::new(body.clone()),
                success: Box::new(success.clone()),
                failure: Box::new(failure.clone()),
            },
        ))
    }

    /// Dispatch a `<left: _, right: _>` tagged input to one of two
    /// arrows sharing an output type.
    pub fn fanin(left: &Arrow, right: &Arrow) -> Result<Arrow, ComposeError> {
        let cx = left.cx().clone();
        let parts = [left.clone(), right.clone()];
        let ty = fanin_type(&cx, &parts).map_err(|e| compose_error("fanin", &parts, e))?;
        Ok(Arrow::from_parts(
            cx,
            ty,
            ArrowKind::Fanin {
                left: Box::new(left.clone()),
                right: Box::new(right.clone()),
            },
        ))
    }

    /// Run all arrows on the same input but deliver only the first
    /// arrow's result; the rest keep running in the background.
    pub fn spawn(arrows: &[Arrow]) -> Result<Arrow, ComposeError> {
        let cx = shared_cx(arrows)?;
        let ty = spawn_type(&cx, arrows).map_err(|e| compose_error("spawn", arrows, e))?;
        Ok(Arrow::from_parts(
            cx,
            ty,
            ArrowKind::Spawn(Rc::new(arrows.to_vec())),
        ))
    }

    /// Tie a recursive knot: `ctor` receives a placeholder arrow it
    /// may embed in the body it builds, and the placeholder is frozen
    /// to that body afterwards.
    ///
    /// The placeholder's parameters are marked `noreduce` so the
    /// normalizer cannot eliminate them while the body is still open.
    /// Once the body exists, every parameter derived from them is
    /// folded back onto an ordinary pair, the knot is expressed as
    /// mutual bounds, and the signature re-normalized.
    pub fn fix(
        cx: &Cx,
        ctor: impl FnOnce(Arrow) -> Result<Arrow, ComposeError>,
    ) -> Result<Arrow, ComposeError> {
        let arg = cx.types().fresh(true);
        let out = cx.types().fresh(true);
        let (Some(arg_id), Some(out_id)) = (arg.param_id(), out.param_id()) else {
            unreachable!("fresh always returns a parameter");
        };

        let slot = Rc::new(ProxySlot::new());
        let proxy = Arrow::from_parts(
            cx.clone(),
            ArrowType::plain(arg, out),
            ArrowKind::Proxy(slot.clone()),
        );

        let body = ctor(proxy)?;
        slot.freeze(body.clone());

        let arg_open = Type::Param {
            id: arg_id,
            noreduce: false,
        };
        let out_open = Type::Param {
            id: out_id,
            noreduce: false,
        };

        let mut map = SubstMap::new();
        for d in cx.types().descendants(arg_id) {
            map.insert(d, arg_open.clone());
        }
        for d in cx.types().descendants(out_id) {
            map.insert(d, out_open.clone());
        }

        let parts = [body.clone()];
        let ty = fix_type(body.ty(), &map, &arg_open, &out_open)
            .map_err(|e| compose_error("fix", &parts, e))?;

        Ok(Arrow::from_parts(cx.clone(), ty, body.kind().clone()))
    }
}

fn shared_cx(arrows: &[Arrow]) -> Result<Cx, ComposeError> {
    let first = arrows.first().ok_or(ComposeError::Empty)?;
    Ok(first.cx().clone())
}

fn compose_error(op: &'static str, arrows: &[Arrow], source: TypeError) -> ComposeError {
    let input = arrows
        .iter()
        .map(|a| a.ty().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    ComposeError::Type { op, input, source }
}

fn sanitized(cx: &Cx, arrows: &[Arrow]) -> Result<Vec<ArrowType>, TypeError> {
    arrows.iter().map(|a| a.ty().sanitize(cx.types())).collect()
}

fn seq_type(cx: &Cx, arrows: &[Arrow]) -> Result<ArrowType, TypeError> {
    let sty = sanitized(cx, arrows)?;

    let mut ncs = ConstraintSet::empty();
    let mut err = Vec::new();
    for (i, t) in sty.iter().enumerate() {
        ncs = ncs.concat(&t.constraints)?;
        err.extend(t.errors.iter().cloned());

        if i != 0 {
            ncs = ncs.add(Constraint::new(sty[i - 1].out.clone(), t.arg.clone()))?;
        }
    }

    let last = sty.len() - 1;
    ArrowType::new(sty[0].arg.clone(), sty[last].out.clone(), ncs, err)
}

fn all_type(cx: &Cx, arrows: &[Arrow]) -> Result<ArrowType, TypeError> {
    let sty = sanitized(cx, arrows)?;

    let mut arg = Vec::new();
    let mut out = Vec::new();
    let mut ncs = ConstraintSet::empty();
    let mut err = Vec::new();
    for t in &sty {
        arg.push(t.arg.clone());
        out.push(t.out.clone());
        ncs = ncs.concat(&t.constraints)?;
        err.extend(t.errors.iter().cloned());
    }

    ArrowType::new(Type::tuple(arg), Type::tuple(out), ncs, err)
}

fn any_type(cx: &Cx, arrows: &[Arrow]) -> Result<ArrowType, TypeError> {
    let sty = sanitized(cx, arrows)?;

    let arg = cx.types().fresh(false);
    let out = cx.types().fresh(false);
    let mut ncs = ConstraintSet::empty();
    let mut err = Vec::new();
    for t in &sty {
        ncs = ncs.concat(&t.constraints)?;
        err.extend(t.errors.iter().cloned());

        ncs = ncs.add(Constraint::new(arg.clone(), t.arg.clone()))?;
        ncs = ncs.add(Constraint::new(t.out.clone(), out.clone()))?;
    }

    ArrowType::new(arg, out, ncs, err)
}

fn try_type(cx: &Cx, parts: &[Arrow; 3]) -> Result<ArrowType, TypeError> {
    let sty = sanitized(cx, parts)?;
    let (sta, sts, stf) = (&sty[0], &sty[1], &sty[2]);

    let out = cx.types().fresh(false);
    let mut ncs = ConstraintSet::empty();
    ncs = ncs.concat(&sta.constraints)?;
    ncs = ncs.concat(&sts.constraints)?;
    ncs = ncs.concat(&stf.constraints)?;
    ncs = ncs.add(Constraint::new(sta.out.clone(), sts.arg.clone()))?;
    ncs = ncs.add(Constraint::new(sts.out.clone(), out.clone()))?;
    ncs = ncs.add(Constraint::new(stf.out.clone(), out.clone()))?;

    // A failure value of any raisable type must be acceptable to the
    // failure arrow.
    for e in &sta.errors {
        ncs = ncs.add(Constraint::new(e.clone(), stf.arg.clone()))?;
    }

    let mut err = sts.errors.clone();
    err.extend(stf.errors.iter().cloned());

    ArrowType::new(sta.arg.clone(), out, ncs, err)
}

fn fanin_type(cx: &Cx, parts: &[Arrow; 2]) -> Result<ArrowType, TypeError> {
    let sty = sanitized(cx, parts)?;
    let (stl, str_) = (&sty[0], &sty[1]);

    let tl = cx.types().fresh(false);
    let tr = cx.types().fresh(false);
    let arg = Type::tagged([("left", tl.clone()), ("right", tr.clone())]);

    let out = cx.types().fresh(false);
    let mut ncs = ConstraintSet::empty();
    ncs = ncs.concat(&stl.constraints)?;
    ncs = ncs.concat(&str_.constraints)?;
    ncs = ncs.add(Constraint::new(stl.arg.clone(), tl))?;
    ncs = ncs.add(Constraint::new(str_.arg.clone(), tr))?;
    ncs = ncs.add(Constraint::new(stl.out.clone(), out.clone()))?;
    ncs = ncs.add(Constraint::new(str_.out.clone(), out.clone()))?;

    let mut err = stl.errors.clone();
    err.extend(str_.errors.iter().cloned());

    ArrowType::new(arg, out, ncs, err)
}

fn spawn_type(cx: &Cx, arrows: &[Arrow]) -> Result<ArrowType, TypeError> {
    let sty = sanitized(cx, arrows)?;

    let arg = cx.types().fresh(false);
    let out = cx.types().fresh(false);
    let mut ncs = ConstraintSet::empty();
    let mut err = Vec::new();
    for (i, t) in sty.iter().enumerate() {
        ncs = ncs.concat(&t.constraints)?;
        err.extend(t.errors.iter().cloned());

        ncs = ncs.add(Constraint::new(arg.clone(), t.arg.clone()))?;
        // Only the foreground arrow's output reaches the caller.
        if i == 0 {
            ncs = ncs.add(Constraint::new(t.out.clone(), out.clone()))?;
        }
    }

    ArrowType::new(arg, out, ncs, err)
}

fn fix_type(
    body: &ArrowType,
    map: &SubstMap,
    arg_open: &Type,
    out_open: &Type,
) -> Result<ArrowType, TypeError> {
    let mut ty = body.clone();
    ty.substitute(map)?;

    ty.constraints = ty
        .constraints
        .add(Constraint::new(ty.arg.clone(), arg_open.clone()))?;
    ty.constraints = ty
        .constraints
        .add(Constraint::new(arg_open.clone(), ty.arg.clone()))?;
    ty.constraints = ty
        .constraints
        .add(Constraint::new(ty.out.clone(), out_open.clone()))?;
    ty.constraints = ty
        .constraints
        .add(Constraint::new(out_open.clone(), ty.out.clone()))?;

    ty.resolve()?;
    Ok(ty)
}

/// The mutable cell behind a recursion placeholder.
pub(crate) struct ProxySlot {
    target: RefCell<Option<Arrow>>,
    probing: Cell<bool>,
}

impl ProxySlot {
    pub(crate) fn new() -> ProxySlot {
        ProxySlot {
            target: RefCell::new(None),
            probing: Cell::new(false),
        }
    }

    pub(crate) fn freeze(&self, arrow: Arrow) {
        *self.target.borrow_mut() = Some(arrow);
    }

    pub(crate) fn target(&self) -> Option<Arrow> {
        self.target.borrow().clone()
    }

    /// Asking the body whether it is asynchronous may recurse back
    /// into this slot; the guard reports "not async" for the inner
    /// query so the probe terminates.
    pub(crate) fn is_async(&self) -> bool {
        if self.probing.get() {
            return false;
        }
        match self.target() {
            Some(target) => {
                self.probing.set(true);
                let result = target.is_async();
                self.probing.set(false);
                result
            }
            None => false,
        }
    }
}

pub(crate) fn call_seq(items: Rc<Vec<Arrow>>, x: Value, p: &Rc<Progress>, k: K, h: H) {
    seq_step(items, 0, x, p, k, h);
}

fn seq_step(items: Rc<Vec<Arrow>>, i: usize, x: Value, p: &Rc<Progress>, k: K, h: H) {
    if i + 1 >= items.len() {
        items[i].call(x, p, k, h);
    } else {
        let rest = items.clone();
        let p_next = p.clone();
        let k_next = k.clone();
        let h_next = h.clone();
        items[i].call(
            x,
            p,
            Rc::new(move |y| {
                seq_step(
                    rest.clone(),
                    i + 1,
                    y,
                    &p_next,
                    k_next.clone(),
                    h_next.clone(),
                )
            }),
            h,
        );
    }
}

pub(crate) fn call_all(items: &Rc<Vec<Arrow>>, x: Value, p: &Rc<Progress>, k: K, h: H) {
    let Value::Seq(values) = x else {
        panic!("parallel combinator input is not a tuple");
    };
    assert!(
        values.len() >= items.len(),
        "parallel combinator input has too few elements"
    );

    let n = items.len();
    let state = Rc::new(RefCell::new((0usize, vec![Value::Null; n])));

    for (i, (a, v)) in items.iter().zip(values).enumerate() {
        let state = state.clone();
        let k = k.clone();
        a.call(
            v,
            p,
            Rc::new(move |y| {
                let finished = {
                    let mut s = state.borrow_mut();
                    s.1[i] = y;
                    s.0 += 1;
                    s.0 == n
                };
                if finished {
                    let results = std::mem::take(&mut state.borrow_mut().1);
                    k(Value::Seq(results));
                }
            }),
            h.clone(),
        );
    }
}

pub(crate) fn call_any(items: &Rc<Vec<Arrow>>, x: Value, p: &Rc<Progress>, k: K, h: H) {
    // Checked at call time rather than construction time: a recursive
    // arrow may present itself as falsely synchronous while its body
    // is still being frozen.
    if !items.iter().all(Arrow::is_async) {
        panic!("race combinator requires asynchronous arrows");
    }

    let children: Vec<Rc<Progress>> = items.iter().map(|_| Progress::new(true)).collect();

    {
        let children = children.clone();
        p.add_canceller(Box::new(move |e| {
            for c in &children {
                c.cancel(e.clone());
            }
        }));
    }

    for (i, a) in items.iter().enumerate() {
        // When branch i progresses, the race is decided.
        let parent = p.clone();
        let siblings = children.clone();
        children[i].add_observer(Box::new(move || {
            parent.advance(None);
            for (j, c) in siblings.iter().enumerate() {
                if j != i {
                    c.cancel(None);
                }
            }
        }));

        a.call(x.clone(), &children[i], k.clone(), h.clone());
    }
}

pub(crate) fn call_noemit(cx: &Cx, body: &Arrow, x: Value, p: &Rc<Progress>, k: K, h: H) {
    let quiet = Progress::new(false);
    {
        let quiet = quiet.clone();
        p.add_canceller(Box::new(move |_| quiet.cancel(None)));
    }

    let parent = p.clone();
    let cx = cx.clone();
    body.call(
        x,
        &quiet,
        Rc::new(move |z| {
            parent.advance(None);

            let k = k.clone();
            cx.scheduler().schedule(0, Box::new(move || k(z)));
        }),
        h,
    );
}

pub(crate) fn call_try(
    body: &Arrow,
    success: &Arrow,
    failure: &Arrow,
    x: Value,
    p: &Rc<Progress>,
    k: K,
    h: H,
) {
    // The body runs under its own emitting branch so a raced try can
    // still be cancelled as a unit; its progress forwards upward.
    let branch = Progress::new(true);
    {
        let branch = branch.clone();
        p.add_canceller(Box::new(move |_| branch.cancel(None)));
    }
    {
        let parent = p.clone();
        branch.add_observer(Box::new(move || parent.advance(None)));
    }

    let success = success.clone();
    let success_p = p.clone();
    let success_k = k.clone();
    let success_h = h.clone();

    let failure = failure.clone();
    let failure_p = p.clone();
    let failure_branch = branch.clone();

    body.call(
        x,
        &branch,
        Rc::new(move |y| success.call(y, &success_p, success_k.clone(), success_h.clone())),
        Rc::new(move |e| {
            failure_branch.cancel(None);
            failure.call(e.into_value(), &failure_p, k.clone(), h.clone());
        }),
    );
}

pub(crate) fn call_fanin(left: &Arrow, right: &Arrow, x: Value, p: &Rc<Progress>, k: K, h: H) {
    let Value::Tagged { tag, value } = x else {
        panic!("fan-in input is not a tagged value");
    };
    match tag.as_str() {
        "left" => left.call(*value, p, k, h),
        "right" => right.call(*value, p, k, h),
        other => panic!("fan-in input is tagged \"{other}\", not \"left\" or \"right\""),
    }
}

pub(crate) fn call_spawn(items: &Rc<Vec<Arrow>>, x: Value, p: &Rc<Progress>, k: K, h: H) {
    for (i, a) in items.iter().enumerate() {
        if i == 0 {
            a.call(x.clone(), p, k.clone(), h.clone());
        } else {
            // Background results are discarded; failures still reach h.
            a.call(x.clone(), p, Rc::new(|_| {}), h.clone());
        }
    }
}
