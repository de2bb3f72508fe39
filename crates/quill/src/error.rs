//! The typed error taxonomy raised during evaluation.
//!
//! Every error carries the source span of the offending node. Errors
//! propagate upward and abort the current program run; there is no partial
//! recovery.

use std::fmt;

use strum::{Display, EnumString, IntoStaticStr};

use crate::{
    ast::CodeRange,
    value::Type,
};

/// Result type alias for operations that can fail with an interpreter error.
pub type RunResult<T> = Result<T, InterpreterError>;

/// Error categories reported by the evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum ErrorKind {
    /// Semantic violations: name not found, arity mismatch, array index out
    /// of bounds, division by zero, invalid operand combination, non-integer
    /// range endpoints.
    #[strum(serialize = "RUNTIME")]
    Runtime,
    /// A unary or postfix operator applied to an incompatible operand.
    #[strum(serialize = "TYPE")]
    Type,
    /// The internal call-recursion limit or the visitor depth was exceeded.
    #[strum(serialize = "RECURSION")]
    Recursion,
}

/// An error raised while evaluating a program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpreterError {
    kind: ErrorKind,
    message: String,
    range: CodeRange,
}

impl InterpreterError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>, range: CodeRange) -> Self {
        Self {
            kind,
            message: message.into(),
            range,
        }
    }

    #[must_use]
    pub fn runtime(message: impl Into<String>, range: CodeRange) -> Self {
        Self::new(ErrorKind::Runtime, message, range)
    }

    #[must_use]
    pub fn type_error(message: impl Into<String>, range: CodeRange) -> Self {
        Self::new(ErrorKind::Type, message, range)
    }

    #[must_use]
    pub fn recursion(message: impl Into<String>, range: CodeRange) -> Self {
        Self::new(ErrorKind::Recursion, message, range)
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Source span of the node the error points at.
    #[must_use]
    pub fn range(&self) -> CodeRange {
        self.range
    }
}

impl fmt::Display for InterpreterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error at {}: {}", self.kind, self.range, self.message)
    }
}

impl std::error::Error for InterpreterError {}

/// Standardised message for an invalid binary operand combination.
///
/// Callers supply the current node's span.
#[must_use]
pub(crate) fn invalid_operation(left: Type, op: impl fmt::Display, right: Type, range: CodeRange) -> InterpreterError {
    InterpreterError::runtime(format!("invalid operation: {left} {op} {right}"), range)
}

/// Standardised message for a unary operator applied to an unsupported type.
#[must_use]
pub(crate) fn unary_type_error(op: impl fmt::Display, operand: Type, range: CodeRange) -> InterpreterError {
    InterpreterError::type_error(format!("unary '{op}' cannot be applied to {operand}"), range)
}

#[must_use]
pub(crate) fn name_not_found(what: &str, name: &str, range: CodeRange) -> InterpreterError {
    InterpreterError::runtime(format!("{what} '{name}' is not defined"), range)
}

#[must_use]
pub(crate) fn division_by_zero(range: CodeRange) -> InterpreterError {
    InterpreterError::runtime("division by zero", range)
}

#[must_use]
pub(crate) fn index_out_of_bounds(index: i64, len: usize, range: CodeRange) -> InterpreterError {
    InterpreterError::runtime(format!("array index {index} out of bounds for length {len}"), range)
}

#[must_use]
pub(crate) fn arity_mismatch(name: &str, expected: usize, got: usize, range: CodeRange) -> InterpreterError {
    InterpreterError::runtime(
        format!("invalid number of arguments for '{name}': expected {expected} but got {got}"),
        range,
    )
}

#[must_use]
pub(crate) fn non_integer_range(describe: &str, range: CodeRange) -> InterpreterError {
    InterpreterError::runtime(format!("range value '{describe}' cannot be used as an integer"), range)
}
