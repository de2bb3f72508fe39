//! Runtime values and their type labels.

use std::{fmt, hash::Hasher};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Primary value type representing Quill data at runtime.
///
/// The language is dynamically typed, so every user-observable datum is one
/// of these variants. `Int` and `Float` together form the language's
/// `number` type; operator dispatch treats them interchangeably and tracks
/// the integer/real distinction only where semantics require it (`for`
/// ranges, string repetition).
///
/// `Identifier` is a sentinel: expression evaluation produces it for bare
/// variable references and the evaluator resolves it through the scope
/// chain before the value reaches any arithmetic, logical, or relational
/// path. An unresolved identifier leaking into such a path is a bug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Null,
    Identifier(String),
}

/// Type label used in diagnostics ("invalid operation: number + string").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum Type {
    #[strum(serialize = "number")]
    Number,
    #[strum(serialize = "string")]
    String,
    #[strum(serialize = "boolean")]
    Boolean,
    #[strum(serialize = "null")]
    Null,
    #[strum(serialize = "identifier")]
    Identifier,
}

impl Value {
    /// Returns the type label of this value.
    #[must_use]
    pub fn kind(&self) -> Type {
        match self {
            Self::Int(_) | Self::Float(_) => Type::Number,
            Self::Str(_) => Type::String,
            Self::Bool(_) => Type::Boolean,
            Self::Null => Type::Null,
            Self::Identifier(_) => Type::Identifier,
        }
    }

    /// Coerces the value to a boolean: the empty string, `0`, `0.0`,
    /// `false`, and `null` are falsy; everything else is truthy.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Int(v) => *v != 0,
            Self::Float(v) => *v != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::Bool(b) => *b,
            Self::Null => false,
            // a bound identifier name is a non-empty string
            Self::Identifier(_) => true,
        }
    }

    /// A precise one-word description of the value's type, distinguishing
    /// integers from reals where diagnostics need it.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Int(_) => "integer",
            Self::Float(_) => "real",
            Self::Str(_) => "string",
            Self::Bool(_) => "boolean",
            Self::Null => "null",
            Self::Identifier(_) => "identifier",
        }
    }

    /// Whether this value is a number (integer or real).
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    /// Numeric view of the value, if it is a number.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Feeds the value into a hasher for environment fingerprinting.
    ///
    /// Floats hash by bit pattern so fingerprints stay stable across runs.
    pub(crate) fn hash_into(&self, state: &mut impl Hasher) {
        match self {
            Self::Int(v) => {
                state.write_u8(0);
                state.write_i64(*v);
            }
            Self::Float(v) => {
                state.write_u8(1);
                state.write_u64(v.to_bits());
            }
            Self::Str(s) => {
                state.write_u8(2);
                state.write(s.as_bytes());
            }
            Self::Bool(b) => {
                state.write_u8(3);
                state.write_u8(u8::from(*b));
            }
            Self::Null => state.write_u8(4),
            Self::Identifier(name) => {
                state.write_u8(5);
                state.write(name.as_bytes());
            }
        }
    }
}

/// Display renders the value the way `print` shows it: strings unquoted,
/// booleans as `True`/`False`, reals always with a decimal point or
/// exponent.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{}", float_repr(*v)),
            Self::Str(s) => write!(f, "{s}"),
            Self::Bool(true) => write!(f, "True"),
            Self::Bool(false) => write!(f, "False"),
            Self::Null => write!(f, "null"),
            Self::Identifier(name) => write!(f, "{name}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl TryFrom<&Value> for i64 {
    type Error = Type;

    fn try_from(value: &Value) -> Result<Self, Type> {
        match value {
            Value::Int(v) => Ok(*v),
            other => Err(other.kind()),
        }
    }
}

impl TryFrom<&Value> for f64 {
    type Error = Type;

    fn try_from(value: &Value) -> Result<Self, Type> {
        match value {
            Value::Int(v) => Ok(*v as Self),
            Value::Float(v) => Ok(*v),
            other => Err(other.kind()),
        }
    }
}

impl TryFrom<&Value> for bool {
    type Error = Type;

    fn try_from(value: &Value) -> Result<Self, Type> {
        match value {
            Value::Bool(v) => Ok(*v),
            other => Err(other.kind()),
        }
    }
}

impl TryFrom<&Value> for String {
    type Error = Type;

    fn try_from(value: &Value) -> Result<Self, Type> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(other.kind()),
        }
    }
}

/// Returns a string representation of a real number.
///
/// Uses the `ryu` crate, which produces the shortest decimal representation
/// that round-trips through `f64` parsing. A decimal point is always
/// present (`3.0`, not `3`) so reals stay distinguishable from integers in
/// program output; special values render as lowercase `inf`/`-inf`/`nan`.
fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f.is_sign_negative() {
            "-inf".to_string()
        } else {
            "inf".to_string()
        };
    }

    let mut buffer = ryu::Buffer::new();
    buffer.format(f).to_string()
}
