//! Tracing infrastructure for debugging arrow execution.
//!
//! The tracer is a zero-cost abstraction: `NoopTracer` methods are
//! `#[inline(always)]` empty functions that the compiler eliminates,
//! so untraced runs pay nothing. Tracing-only state (like call depth
//! for indentation) lives in the tracer itself, not in the runtime.

use crate::value::Value;

/// Verbosity level for trace output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Verbosity {
    /// Default: warnings and final deliveries only.
    #[default]
    Default,
    /// Verbose: every combinator entry and every emitted value.
    Verbose,
}

/// Tracer trait for runtime instrumentation.
///
/// Each method is called at a specific point during execution:
/// - `trace_call` - when a combinator or lifted function is entered
/// - `trace_value` - when a logging arrow observes a value
/// - `trace_deliver` - when a run's final continuation or handler fires
/// - `warn` - for recoverable misuse, like lifting without an annotation
pub trait Tracer {
    /// Called when a combinator or lifted function is entered.
    fn trace_call(&mut self, kind: &str);

    /// Called when a logging arrow observes a value.
    fn trace_value(&mut self, value: &Value);

    /// Called when a run delivers its outcome. `success` is false for
    /// a handled failure.
    fn trace_deliver(&mut self, success: bool);

    /// Called for recoverable misuse.
    fn warn(&mut self, message: &str);
}

/// No-op tracer that gets optimized away completely.
pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_call(&mut self, _kind: &str) {}

    #[inline(always)]
    fn trace_value(&mut self, _value: &Value) {}

    #[inline(always)]
    fn trace_deliver(&mut self, _success: bool) {}

    #[inline(always)]
    fn warn(&mut self, _message: &str) {}
}

/// Tracer that prints execution events to stderr.
pub struct PrintTracer {
    verbosity: Verbosity,
    depth: usize,
}

impl PrintTracer {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            depth: 0,
        }
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }
}

impl Tracer for PrintTracer {
    fn trace_call(&mut self, kind: &str) {
        if self.verbosity == Verbosity::Verbose {
            eprintln!("{}call {kind}", self.indent());
            self.depth += 1;
        }
    }

    fn trace_value(&mut self, value: &Value) {
        eprintln!("{}{value}", self.indent());
    }

    fn trace_deliver(&mut self, success: bool) {
        self.depth = 0;
        let outcome = if success { "ok" } else { "err" };
        eprintln!("deliver {outcome}");
    }

    fn warn(&mut self, message: &str) {
        eprintln!("warning: {message}");
    }
}
