//! Evaluator tracing infrastructure.
//!
//! A trait-based tracing system with zero-cost abstraction: the evaluator
//! carries the tracer as a type parameter, so with [`NoopTracer`] every
//! hook compiles away through monomorphization. [`StdoutTracer`] provides
//! the interpreter's verbose mode, logging every node visit and non-null
//! return to stdout. [`RecordingTracer`] captures events for inspection in
//! tests.

use crate::{
    ast::CodeRange,
    value::Value,
};

/// A single recorded trace event, captured by [`RecordingTracer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    /// The evaluator entered a node.
    Visit { label: &'static str },
    /// A node produced a non-null value.
    Return { label: &'static str, rendered: String },
    /// A user function call pushed an activation.
    Call { name: String, depth: usize },
    /// A memoized call was answered from the call cache.
    CacheHit { name: String },
}

/// Trait for evaluator tracing.
///
/// All methods have default no-op implementations, so [`NoopTracer`]
/// requires zero lines of code and compiles to zero instructions.
/// Implementations only override the hooks they care about.
pub trait EvalTracer {
    /// Called when the evaluator enters a node.
    #[inline(always)]
    fn on_visit(&mut self, _label: &'static str, _position: CodeRange) {}

    /// Called when a node evaluation produced a non-null value.
    #[inline(always)]
    fn on_return(&mut self, _label: &'static str, _value: &Value) {}

    /// Called when a user function call pushes a new activation.
    #[inline(always)]
    fn on_call(&mut self, _name: &str, _depth: usize) {}

    /// Called when a call is answered from the memoization cache.
    #[inline(always)]
    fn on_cache_hit(&mut self, _name: &str) {}
}

/// Zero-cost no-op tracer (the production default).
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTracer;

impl EvalTracer for NoopTracer {}

/// Human-readable trace on stdout; backs the interpreter's verbose mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutTracer;

impl EvalTracer for StdoutTracer {
    fn on_visit(&mut self, label: &'static str, _position: CodeRange) {
        println!("Visiting {label}");
    }

    fn on_return(&mut self, label: &'static str, value: &Value) {
        println!("Returned --> {label}: {value}");
    }

    fn on_call(&mut self, name: &str, depth: usize) {
        println!("Calling {name} (depth {depth})");
    }

    fn on_cache_hit(&mut self, name: &str) {
        println!("Cache hit for {name}");
    }
}

/// Records every event for post-run inspection.
#[derive(Debug, Default)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
}

impl RecordingTracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded events in order.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Number of cache hits recorded.
    #[must_use]
    pub fn cache_hits(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TraceEvent::CacheHit { .. }))
            .count()
    }

    /// Number of function-call activations recorded.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, TraceEvent::Call { .. }))
            .count()
    }
}

impl EvalTracer for RecordingTracer {
    fn on_visit(&mut self, label: &'static str, _position: CodeRange) {
        self.events.push(TraceEvent::Visit { label });
    }

    fn on_return(&mut self, label: &'static str, value: &Value) {
        self.events.push(TraceEvent::Return {
            label,
            rendered: value.to_string(),
        });
    }

    fn on_call(&mut self, name: &str, depth: usize) {
        self.events.push(TraceEvent::Call {
            name: name.to_owned(),
            depth,
        });
    }

    fn on_cache_hit(&mut self, name: &str) {
        self.events.push(TraceEvent::CacheHit {
            name: name.to_owned(),
        });
    }
}
