//! The AST node model consumed by the evaluator.
//!
//! The external parser produces a [`Program`] and hands it over fully
//! constructed; nothing in this crate mutates the tree after that point.
//! Every node carries a [`CodeRange`] so diagnostics can point at the
//! offending source span. All node types are serde-serializable since the
//! parser emits the tree as JSON.

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::value::Value;

/// A single source position (line and column, both 1-indexed by convention
/// of the parser; `0` means "unknown").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeLoc {
    pub line: u32,
    pub column: u32,
}

impl CodeLoc {
    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for CodeLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Source span of a node, used for error reporting and tracing.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CodeRange {
    start: CodeLoc,
    end: CodeLoc,
}

/// Custom Debug implementation to make dumping nodes much less verbose.
impl fmt::Debug for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CodeRange{{{}..{}}}", self.start, self.end)
    }
}

impl fmt::Display for CodeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl CodeRange {
    /// Creates a new code range from start and end locations.
    #[must_use]
    pub const fn new(start: CodeLoc, end: CodeLoc) -> Self {
        Self { start, end }
    }

    /// Returns the start position.
    #[must_use]
    pub fn start(&self) -> CodeLoc {
        self.start
    }

    /// Returns the end position.
    #[must_use]
    pub fn end(&self) -> CodeLoc {
        self.end
    }
}

/// A literal constant produced by the parser.
///
/// Literals are detached from runtime semantics until evaluation turns them
/// into [`Value`]s; this is the only place parse-time data crosses into the
/// runtime rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Int(v) => Self::Int(*v),
            Literal::Float(v) => Self::Float(*v),
            Literal::Str(s) => Self::Str(s.clone()),
            Literal::Bool(b) => Self::Bool(*b),
        }
    }
}

/// Binary arithmetic and boolean operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "or")]
    Or,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
    #[strum(serialize = "and")]
    And,
}

/// Defined separately since these operators always produce a boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum CmpOp {
    #[strum(serialize = "==")]
    Eq,
    #[strum(serialize = "!=")]
    NotEq,
    #[strum(serialize = "<")]
    Lt,
    #[strum(serialize = ">")]
    Gt,
    #[strum(serialize = "<=")]
    LtE,
    #[strum(serialize = ">=")]
    GtE,
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum UnaryOp {
    #[strum(serialize = "not")]
    Not,
    #[strum(serialize = "-")]
    Neg,
}

/// Postfix mutation operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr, Serialize, Deserialize)]
pub enum PostfixOp {
    #[strum(serialize = "++")]
    Incr,
    #[strum(serialize = "--")]
    Decr,
}

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Literal(Literal),
    /// A variable reference. Evaluates to an identifier sentinel which the
    /// evaluator resolves through the scope chain before use.
    Identifier(String),
    Binary {
        left: Box<ExprLoc>,
        op: BinaryOp,
        right: Box<ExprLoc>,
    },
    Compare {
        left: Box<ExprLoc>,
        op: CmpOp,
        right: Box<ExprLoc>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ExprLoc>,
    },
    /// Postfix increment/decrement: mutates the named variable in place and
    /// evaluates to the new value.
    Postfix {
        target: String,
        op: PostfixOp,
    },
    /// Function call expression.
    Call {
        name: String,
        args: Args,
    },
    /// Array element read: `a[i]`.
    ArrayAccess {
        name: String,
        index: Box<ExprLoc>,
    },
    /// Console input: prints the prompt (no newline), reads one line, and
    /// evaluates to that line as a string.
    Input {
        prompt: String,
    },
}

/// An expression with its source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExprLoc {
    pub position: CodeRange,
    pub expr: Expr,
}

impl ExprLoc {
    #[must_use]
    pub fn new(position: CodeRange, expr: Expr) -> Self {
        Self { position, expr }
    }

    /// Returns a static name for the expression variant, used by trace
    /// output and diagnostics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match &self.expr {
            Expr::Literal(Literal::Int(_) | Literal::Float(_)) => "numeric_literal",
            Expr::Literal(Literal::Str(_)) => "string_literal",
            Expr::Literal(Literal::Bool(_)) => "boolean_literal",
            Expr::Identifier(_) => "identifier",
            Expr::Binary { .. } => "binary_expr",
            Expr::Compare { .. } => "compare_expr",
            Expr::Unary { .. } => "unary_expr",
            Expr::Postfix { .. } => "postfix_expr",
            Expr::Call { .. } => "call",
            Expr::ArrayAccess { .. } => "array_access",
            Expr::Input { .. } => "input",
        }
    }

    // Constructor helpers for hosts (and tests) that build trees
    // programmatically rather than deserializing parser output.

    #[must_use]
    pub fn int(position: CodeRange, value: i64) -> Self {
        Self::new(position, Expr::Literal(Literal::Int(value)))
    }

    #[must_use]
    pub fn float(position: CodeRange, value: f64) -> Self {
        Self::new(position, Expr::Literal(Literal::Float(value)))
    }

    #[must_use]
    pub fn string(position: CodeRange, value: impl Into<String>) -> Self {
        Self::new(position, Expr::Literal(Literal::Str(value.into())))
    }

    #[must_use]
    pub fn boolean(position: CodeRange, value: bool) -> Self {
        Self::new(position, Expr::Literal(Literal::Bool(value)))
    }

    #[must_use]
    pub fn identifier(position: CodeRange, name: impl Into<String>) -> Self {
        Self::new(position, Expr::Identifier(name.into()))
    }

    #[must_use]
    pub fn binary(position: CodeRange, left: Self, op: BinaryOp, right: Self) -> Self {
        Self::new(
            position,
            Expr::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
        )
    }

    #[must_use]
    pub fn compare(position: CodeRange, left: Self, op: CmpOp, right: Self) -> Self {
        Self::new(
            position,
            Expr::Compare {
                left: Box::new(left),
                op,
                right: Box::new(right),
            },
        )
    }

    #[must_use]
    pub fn unary(position: CodeRange, op: UnaryOp, operand: Self) -> Self {
        Self::new(
            position,
            Expr::Unary {
                op,
                operand: Box::new(operand),
            },
        )
    }

    #[must_use]
    pub fn call(position: CodeRange, name: impl Into<String>, args: Args) -> Self {
        Self::new(
            position,
            Expr::Call {
                name: name.into(),
                args,
            },
        )
    }
}

/// Argument list of a call or print statement.
///
/// Kept as its own node so arity errors can point at the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Args {
    pub position: CodeRange,
    pub exprs: Vec<ExprLoc>,
}

impl Args {
    #[must_use]
    pub fn new(position: CodeRange, exprs: Vec<ExprLoc>) -> Self {
        Self { position, exprs }
    }

    #[must_use]
    pub fn empty(position: CodeRange) -> Self {
        Self {
            position,
            exprs: vec![],
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }
}

/// Parameter list of a function definition.
///
/// Kept as its own node so duplicate-parameter errors can point at the list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub position: CodeRange,
    pub names: Vec<String>,
}

impl Params {
    #[must_use]
    pub fn new(position: CodeRange, names: Vec<String>) -> Self {
        Self { position, names }
    }

    #[must_use]
    pub fn empty(position: CodeRange) -> Self {
        Self {
            position,
            names: vec![],
        }
    }
}

/// An `elif` branch of an [`Node::If`] statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElifBranch {
    pub position: CodeRange,
    pub test: ExprLoc,
    pub body: Body,
}

/// A statement in the AST.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Variable assignment: evaluates the right-hand side, then upserts the
    /// binding into the current scope.
    Assignment {
        target: String,
        value: ExprLoc,
    },
    /// Array definition: sized (filled with `null`), literal-initialized,
    /// or empty and unbounded.
    ArrayDef {
        name: String,
        size: Option<ExprLoc>,
        initial_values: Option<Vec<ExprLoc>>,
    },
    /// Array element write: `a[i] = v`.
    ArrayUpdate {
        name: String,
        index: ExprLoc,
        value: ExprLoc,
    },
    /// Console output: arguments separated by single spaces, with a
    /// trailing newline iff `newline` is set (`println`).
    Print {
        args: Args,
        newline: bool,
    },
    /// Expression evaluated for its value or side effects.
    Expr(ExprLoc),
    Return(Option<ExprLoc>),
    Break,
    Continue,
    If {
        test: ExprLoc,
        body: Body,
        elif_branches: Vec<ElifBranch>,
        else_body: Option<Body>,
    },
    While {
        test: ExprLoc,
        body: Body,
    },
    /// Range loop. Both endpoints must evaluate to integers; the endpoint
    /// is exclusive and the direction follows the sign of `end - start`.
    For {
        target: String,
        range_start: ExprLoc,
        range_end: ExprLoc,
        body: Body,
    },
}

/// A statement with its source location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLoc {
    pub position: CodeRange,
    pub node: Node,
}

impl NodeLoc {
    #[must_use]
    pub fn new(position: CodeRange, node: Node) -> Self {
        Self { position, node }
    }

    /// Returns a static name for the statement variant, used by trace
    /// output and diagnostics.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match &self.node {
            Node::Assignment { .. } => "assignment",
            Node::ArrayDef { .. } => "array_def",
            Node::ArrayUpdate { .. } => "array_update",
            Node::Print { .. } => "print",
            Node::Expr(expr) => expr.label(),
            Node::Return(_) => "return",
            Node::Break => "break",
            Node::Continue => "continue",
            Node::If { .. } => "if",
            Node::While { .. } => "while",
            Node::For { .. } => "for",
        }
    }
}

/// A sequence of statements forming a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: CodeRange,
    pub statements: Vec<NodeLoc>,
}

impl Body {
    #[must_use]
    pub fn new(position: CodeRange, statements: Vec<NodeLoc>) -> Self {
        Self {
            position,
            statements,
        }
    }
}

/// A function definition. All definitions precede the program body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuncDef {
    pub position: CodeRange,
    pub name: String,
    pub params: Params,
    pub body: Body,
}

/// The root node handed over by the parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub functions: Vec<FuncDef>,
    pub body: Body,
}

impl Program {
    #[must_use]
    pub fn new(functions: Vec<FuncDef>, body: Body) -> Self {
        Self { functions, body }
    }

    /// A program with no function definitions.
    #[must_use]
    pub fn with_body(body: Body) -> Self {
        Self {
            functions: vec![],
            body,
        }
    }
}
