//! Shared AST-building helpers for the integration tests.
//!
//! The parser is an external collaborator, so tests construct trees
//! directly through the crate's constructor helpers. Positions default to
//! the unknown range unless a test needs a specific span.

#![allow(dead_code)]

use quill::{
    Interpreter, RunResult, Value,
    ast::{
        Args, Body, CmpOp, CodeRange, ElifBranch, Expr, ExprLoc, FuncDef, Node, NodeLoc, Params, PostfixOp, Program,
    },
    io::{CollectStringPrint, NoInput, QueuedInput},
};

pub fn range() -> CodeRange {
    CodeRange::default()
}

pub fn stmt(node: Node) -> NodeLoc {
    NodeLoc::new(range(), node)
}

pub fn body(statements: Vec<NodeLoc>) -> Body {
    Body::new(range(), statements)
}

pub fn program(statements: Vec<NodeLoc>) -> Program {
    Program::with_body(body(statements))
}

pub fn program_with_funcs(functions: Vec<FuncDef>, statements: Vec<NodeLoc>) -> Program {
    Program::new(functions, body(statements))
}

pub fn func(name: &str, params: &[&str], statements: Vec<NodeLoc>) -> FuncDef {
    FuncDef {
        position: range(),
        name: name.to_owned(),
        params: Params::new(range(), params.iter().map(|&p| p.to_owned()).collect()),
        body: body(statements),
    }
}

// === expressions ===

pub fn int(value: i64) -> ExprLoc {
    ExprLoc::int(range(), value)
}

pub fn float(value: f64) -> ExprLoc {
    ExprLoc::float(range(), value)
}

pub fn string(value: &str) -> ExprLoc {
    ExprLoc::string(range(), value)
}

pub fn boolean(value: bool) -> ExprLoc {
    ExprLoc::boolean(range(), value)
}

pub fn ident(name: &str) -> ExprLoc {
    ExprLoc::identifier(range(), name)
}

pub use quill::ast::{BinaryOp, UnaryOp};

pub fn bin(left: ExprLoc, op: BinaryOp, right: ExprLoc) -> ExprLoc {
    ExprLoc::binary(range(), left, op, right)
}

pub fn cmp(left: ExprLoc, op: CmpOp, right: ExprLoc) -> ExprLoc {
    ExprLoc::compare(range(), left, op, right)
}

pub fn unary(op: UnaryOp, operand: ExprLoc) -> ExprLoc {
    ExprLoc::unary(range(), op, operand)
}

pub fn postfix(target: &str, op: PostfixOp) -> ExprLoc {
    ExprLoc::new(
        range(),
        Expr::Postfix {
            target: target.to_owned(),
            op,
        },
    )
}

pub fn call(name: &str, args: Vec<ExprLoc>) -> ExprLoc {
    ExprLoc::call(range(), name, Args::new(range(), args))
}

pub fn array_access(name: &str, index: ExprLoc) -> ExprLoc {
    ExprLoc::new(
        range(),
        Expr::ArrayAccess {
            name: name.to_owned(),
            index: Box::new(index),
        },
    )
}

pub fn input(prompt: &str) -> ExprLoc {
    ExprLoc::new(
        range(),
        Expr::Input {
            prompt: prompt.to_owned(),
        },
    )
}

// === statements ===

pub fn assign(target: &str, value: ExprLoc) -> NodeLoc {
    stmt(Node::Assignment {
        target: target.to_owned(),
        value,
    })
}

pub fn expr_stmt(expr: ExprLoc) -> NodeLoc {
    stmt(Node::Expr(expr))
}

pub fn print_stmt(args: Vec<ExprLoc>) -> NodeLoc {
    stmt(Node::Print {
        args: Args::new(range(), args),
        newline: false,
    })
}

pub fn println_stmt(args: Vec<ExprLoc>) -> NodeLoc {
    stmt(Node::Print {
        args: Args::new(range(), args),
        newline: true,
    })
}

pub fn ret(expr: Option<ExprLoc>) -> NodeLoc {
    stmt(Node::Return(expr))
}

pub fn brk() -> NodeLoc {
    stmt(Node::Break)
}

pub fn cont() -> NodeLoc {
    stmt(Node::Continue)
}

pub fn if_stmt(test: ExprLoc, then: Vec<NodeLoc>) -> NodeLoc {
    stmt(Node::If {
        test,
        body: body(then),
        elif_branches: vec![],
        else_body: None,
    })
}

pub fn if_else(test: ExprLoc, then: Vec<NodeLoc>, otherwise: Vec<NodeLoc>) -> NodeLoc {
    stmt(Node::If {
        test,
        body: body(then),
        elif_branches: vec![],
        else_body: Some(body(otherwise)),
    })
}

pub fn if_elif_else(
    test: ExprLoc,
    then: Vec<NodeLoc>,
    elifs: Vec<(ExprLoc, Vec<NodeLoc>)>,
    otherwise: Option<Vec<NodeLoc>>,
) -> NodeLoc {
    stmt(Node::If {
        test,
        body: body(then),
        elif_branches: elifs
            .into_iter()
            .map(|(test, statements)| ElifBranch {
                position: range(),
                test,
                body: body(statements),
            })
            .collect(),
        else_body: otherwise.map(body),
    })
}

pub fn while_stmt(test: ExprLoc, statements: Vec<NodeLoc>) -> NodeLoc {
    stmt(Node::While {
        test,
        body: body(statements),
    })
}

pub fn for_stmt(target: &str, start: ExprLoc, end: ExprLoc, statements: Vec<NodeLoc>) -> NodeLoc {
    stmt(Node::For {
        target: target.to_owned(),
        range_start: start,
        range_end: end,
        body: body(statements),
    })
}

pub fn array_def_sized(name: &str, size: ExprLoc) -> NodeLoc {
    stmt(Node::ArrayDef {
        name: name.to_owned(),
        size: Some(size),
        initial_values: None,
    })
}

pub fn array_def_literal(name: &str, values: Vec<ExprLoc>) -> NodeLoc {
    stmt(Node::ArrayDef {
        name: name.to_owned(),
        size: None,
        initial_values: Some(values),
    })
}

pub fn array_def_empty(name: &str) -> NodeLoc {
    stmt(Node::ArrayDef {
        name: name.to_owned(),
        size: None,
        initial_values: None,
    })
}

pub fn array_update(name: &str, index: ExprLoc, value: ExprLoc) -> NodeLoc {
    stmt(Node::ArrayUpdate {
        name: name.to_owned(),
        index,
        value,
    })
}

// === run helpers ===

/// Runs a program with captured output and no stdin.
pub fn run(program: &Program) -> (RunResult<Option<Value>>, String) {
    let mut print = CollectStringPrint::new();
    let mut input = NoInput;
    let result = Interpreter::new().run(program, &mut print, &mut input);
    (result, print.into_output())
}

/// Runs a program with captured output and the given stdin lines.
pub fn run_with_input(program: &Program, lines: &[&str]) -> (RunResult<Option<Value>>, String) {
    let mut print = CollectStringPrint::new();
    let mut input = QueuedInput::new(lines.iter().copied());
    let result = Interpreter::new().run(program, &mut print, &mut input);
    (result, print.into_output())
}

/// Unwraps a successful run into its terminal value and output.
pub fn run_ok(program: &Program) -> (Option<Value>, String) {
    let (result, output) = run(program);
    (result.expect("program should evaluate"), output)
}

/// Runs a program with custom depth limits.
pub fn run_with_limits(program: &Program, limits: quill::EvalLimits) -> (RunResult<Option<Value>>, String) {
    let mut print = CollectStringPrint::new();
    let mut input = NoInput;
    let result = Interpreter::new().with_limits(limits).run(program, &mut print, &mut input);
    (result, print.into_output())
}
