//! Public interface for running Quill programs.

use crate::{
    ast::Program,
    error::RunResult,
    eval::Evaluator,
    io::{InputReader, PrintWriter, StdInput, StdPrint},
    limits::EvalLimits,
    tracer::{EvalTracer, NoopTracer, StdoutTracer},
    value::Value,
};

/// Primary interface for evaluating Quill programs.
///
/// An `Interpreter` holds only configuration; every [`Self::run`] call gets
/// a fresh scope store and call cache, so nothing leaks between independent
/// program runs. The AST is borrowed immutably and can be evaluated any
/// number of times.
///
/// # Example
/// ```
/// use quill::{
///     Interpreter,
///     ast::{Body, CodeRange, ExprLoc, Node, NodeLoc, Program},
///     io::{CollectStringPrint, NoInput},
/// };
///
/// let range = CodeRange::default();
/// let program = Program::with_body(Body::new(
///     range,
///     vec![NodeLoc::new(range, Node::Expr(ExprLoc::int(range, 41)))],
/// ));
///
/// let mut print = CollectStringPrint::new();
/// let mut input = NoInput;
/// let result = Interpreter::new().run(&program, &mut print, &mut input).unwrap();
/// assert_eq!(result, Some(quill::Value::Int(41)));
/// ```
#[derive(Debug, Clone)]
pub struct Interpreter {
    limits: EvalLimits,
    memoize: bool,
    verbose: bool,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// An interpreter with default depth limits, call memoization enabled,
    /// and verbose tracing off.
    #[must_use]
    pub fn new() -> Self {
        Self {
            limits: EvalLimits::default(),
            memoize: true,
            verbose: false,
        }
    }

    /// Overrides the visitor/call depth limits.
    #[must_use]
    pub fn with_limits(mut self, limits: EvalLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Enables or disables memoization of calls to pure functions.
    #[must_use]
    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    /// Enables or disables the verbose visit/return trace on stdout.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Evaluates a program against the given print/input handles and
    /// returns the last evaluated value of the program body.
    pub fn run(
        &self,
        program: &Program,
        print: &mut impl PrintWriter,
        input: &mut impl InputReader,
    ) -> RunResult<Option<Value>> {
        if self.verbose {
            self.run_with_tracer(program, print, input, &mut StdoutTracer)
        } else {
            self.run_with_tracer(program, print, input, &mut NoopTracer)
        }
    }

    /// Evaluates a program with an explicit tracer.
    pub fn run_with_tracer(
        &self,
        program: &Program,
        print: &mut impl PrintWriter,
        input: &mut impl InputReader,
        tracer: &mut impl EvalTracer,
    ) -> RunResult<Option<Value>> {
        Evaluator::new(self.limits, self.memoize, print, input, tracer).run(program)
    }

    /// Evaluates a program against the process stdin/stdout.
    pub fn run_stdio(&self, program: &Program) -> RunResult<Option<Value>> {
        self.run(program, &mut StdPrint, &mut StdInput)
    }
}
