#![doc = include_str!("../../../README.md")]

pub mod ast;
mod cache;
mod environment;
mod error;
mod eval;
pub mod io;
mod limits;
mod run;
mod symbol;
pub mod tracer;
mod value;

pub use crate::{
    error::{ErrorKind, InterpreterError, RunResult},
    io::{CollectStringPrint, InputReader, NoInput, NoPrint, PrintWriter, QueuedInput, StdInput, StdPrint},
    limits::{CALL_RECURSION_LIMIT, EvalLimits, MAX_VISIT_DEPTH},
    run::Interpreter,
    symbol::{ArraySymbol, FunctionSymbol, UNBOUNDED_ARRAY},
    tracer::{EvalTracer, NoopTracer, RecordingTracer, StdoutTracer, TraceEvent},
    value::{Type, Value},
};
