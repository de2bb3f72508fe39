//! Array and function bindings stored in an environment.
//!
//! Plain variables are held directly as [`Value`]s; arrays and functions
//! carry enough structure to warrant their own symbol types.

use crate::{
    ast::Body,
    value::Value,
};

/// Size recorded for an array defined without a size expression or initial
/// values ("unbounded").
pub const UNBOUNDED_ARRAY: i64 = -1;

/// An array binding: a declared size and the element store.
///
/// `declared_size` is the size expression's value for sized definitions,
/// the literal count for literal-initialized definitions, and
/// [`UNBOUNDED_ARRAY`] otherwise. Bounds checks always use `values.len()`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArraySymbol {
    pub name: String,
    pub declared_size: i64,
    pub values: Vec<Value>,
}

impl ArraySymbol {
    /// A sized array filled with `null`.
    #[must_use]
    pub fn sized(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            declared_size: size as i64,
            values: vec![Value::Null; size],
        }
    }

    /// An array initialized from literal element values.
    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            declared_size: values.len() as i64,
            values,
        }
    }

    /// An empty, unbounded array.
    #[must_use]
    pub fn unbounded(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared_size: UNBOUNDED_ARRAY,
            values: vec![],
        }
    }
}

/// A function binding.
///
/// The body borrows the immutable AST owned by the program being run, so
/// function symbols never outlive the tree they point into. `pure` is
/// decided once at definition time by a syntactic scan and gates call
/// memoization: only calls to pure functions consult the call cache.
#[derive(Debug, Clone)]
pub struct FunctionSymbol<'ast> {
    pub name: String,
    pub params: Vec<String>,
    pub body: &'ast Body,
    pub pure: bool,
}
