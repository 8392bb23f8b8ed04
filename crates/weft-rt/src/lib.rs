//! Asynchronous arrow runtime.
//!
//! Arrows are typed units of computation composed with combinators:
//! sequencing, parallel joins, races, error recovery, tagged-union
//! dispatch, background spawning, and a fix-point for recursion.
//! Composition typechecks structurally through [`weft_types`];
//! execution is continuation-passing over a cancellable progress tree
//! and a deterministic virtual clock.
//!
//! ```no_run
//! use weft_rt::{Context, Value};
//!
//! let cx = Context::new();
//! let double = cx
//!     .lift("Number ~> Number", |x| {
//!         let n = x.as_num().unwrap_or(0.0);
//!         Ok(Value::from(n * 2.0))
//!     })
//!     .unwrap();
//! let slow = cx.delay(10).then(&double).unwrap();
//! assert_eq!(slow.run_to_completion(Value::from(21.0)), Ok(Value::from(42.0)));
//! ```

mod arrow;
mod builtins;
mod combinators;
mod context;
mod error;
mod lift;
mod progress;
mod scheduler;
mod sugar;
mod trace;
mod value;

pub use arrow::{Arrow, H, K};
pub use context::{CheckerFn, Context, Cx};
pub use error::{ComposeError, RunError};
pub use lift::{Cleanup, Responder};
pub use progress::{CancelFn, ObserverFn, Progress};
pub use scheduler::{Scheduler, TimerFn, TimerId};
pub use trace::{NoopTracer, PrintTracer, Tracer, Verbosity};
pub use value::Value;

pub use weft_annot::{ParseError, Signature, SignatureCache, render_parse_error};
pub use weft_types::{ArrowType, Constraint, ConstraintSet, Type, TypeCx, TypeError};

#[cfg(test)]
mod lift_tests;
#[cfg(test)]
mod sugar_tests;
