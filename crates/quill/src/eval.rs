//! The tree-walking evaluator.
//!
//! One [`Evaluator`] exists per program run. It owns the scope store and the
//! call cache, borrows the immutable AST, and is parameterized over the
//! host's print/input handles and a tracer (all monomorphized, so the no-op
//! tracer costs nothing).
//!
//! Control flow is threaded through [`Flow`] rather than mutable flags:
//! bodies stop on the first `Break`/`Continue`/`Return` outcome and hand it
//! to the enclosing construct, loops consume `Break`/`Continue`, and calls
//! consume `Return`. Two explicit depth counters bound node-visit nesting
//! and active user calls.

use std::borrow::Cow;

use ahash::AHashSet;
use smallvec::SmallVec;

use crate::{
    ast::{
        Args, BinaryOp, Body, CmpOp, CodeRange, ElifBranch, Expr, ExprLoc, FuncDef, Node, NodeLoc, PostfixOp, Program,
        UnaryOp,
    },
    cache::CallCache,
    environment::{Environment, Environments, GLOBAL_SCOPE, ScopeId},
    error::{
        InterpreterError, RunResult, arity_mismatch, division_by_zero, index_out_of_bounds, invalid_operation,
        non_integer_range, unary_type_error,
    },
    io::{InputReader, PrintWriter},
    limits::EvalLimits,
    symbol::{ArraySymbol, FunctionSymbol},
    tracer::EvalTracer,
    value::Value,
};

/// Outcome of evaluating a statement or body.
///
/// `Value` is normal completion carrying the statement's value, if any.
/// The other variants unwind outward until a loop (`Break`, `Continue`) or
/// a function call (`Return`) consumes them.
#[derive(Debug)]
pub(crate) enum Flow {
    Value(Option<Value>),
    Break,
    Continue,
    Return(Option<Value>),
}

pub(crate) struct Evaluator<'ast, 'io, P, I, T> {
    envs: Environments<'ast>,
    current: ScopeId,
    cache: CallCache,
    limits: EvalLimits,
    memoize: bool,
    visit_depth: usize,
    call_depth: usize,
    print: &'io mut P,
    input: &'io mut I,
    tracer: &'io mut T,
}

impl<'ast, 'io, P: PrintWriter, I: InputReader, T: EvalTracer> Evaluator<'ast, 'io, P, I, T> {
    pub fn new(
        limits: EvalLimits,
        memoize: bool,
        print: &'io mut P,
        input: &'io mut I,
        tracer: &'io mut T,
    ) -> Self {
        Self {
            envs: Environments::new(),
            current: GLOBAL_SCOPE,
            cache: CallCache::new(),
            limits,
            memoize,
            visit_depth: 0,
            call_depth: 0,
            print,
            input,
            tracer,
        }
    }

    /// Evaluates a program: installs its function definitions, then runs the
    /// body and returns the last evaluated value.
    pub fn run(mut self, program: &'ast Program) -> RunResult<Option<Value>> {
        for function in &program.functions {
            self.define_function(function)?;
        }
        Ok(match self.eval_body(&program.body)? {
            Flow::Value(value) | Flow::Return(value) => value,
            Flow::Break | Flow::Continue => None,
        })
    }

    fn define_function(&mut self, def: &'ast FuncDef) -> RunResult<()> {
        let mut seen = AHashSet::with_capacity(def.params.names.len());
        for param in &def.params.names {
            if !seen.insert(param.as_str()) {
                return Err(InterpreterError::runtime(
                    format!("duplicate parameter '{param}'"),
                    def.params.position,
                ));
            }
        }
        let symbol = FunctionSymbol {
            name: def.name.clone(),
            params: def.params.names.clone(),
            body: &def.body,
            pure: function_is_pure(def),
        };
        self.envs.insert_function(self.current, symbol, def.position)
    }

    /// Guard executed on entry to every node visit: bounds the visitor
    /// depth and feeds the tracer.
    fn enter(&mut self, label: &'static str, position: CodeRange) -> RunResult<()> {
        if self.visit_depth >= self.limits.max_visit_depth {
            return Err(InterpreterError::recursion("visitor depth exceeded", position));
        }
        self.visit_depth += 1;
        self.tracer.on_visit(label, position);
        Ok(())
    }

    // === statements ===

    fn eval_body(&mut self, body: &'ast Body) -> RunResult<Flow> {
        let mut last: Option<Value> = None;
        for statement in &body.statements {
            match self.eval_node(statement)? {
                Flow::Value(value) => {
                    if value.is_some() {
                        last = value;
                    }
                }
                Flow::Return(value) => return Ok(Flow::Return(value.or(last))),
                flow @ (Flow::Break | Flow::Continue) => return Ok(flow),
            }
        }
        Ok(Flow::Value(last))
    }

    fn eval_node(&mut self, node: &'ast NodeLoc) -> RunResult<Flow> {
        self.enter(node.label(), node.position)?;
        let result = self.eval_node_inner(node);
        self.visit_depth -= 1;
        if let Ok(Flow::Value(Some(value)) | Flow::Return(Some(value))) = &result {
            self.tracer.on_return(node.label(), value);
        }
        result
    }

    fn eval_node_inner(&mut self, node: &'ast NodeLoc) -> RunResult<Flow> {
        match &node.node {
            Node::Assignment { target, value } => {
                let value = self.eval_resolved(value)?;
                self.envs.insert_variable(self.current, target.clone(), value);
                Ok(Flow::Value(None))
            }
            Node::ArrayDef {
                name,
                size,
                initial_values,
            } => {
                let symbol = self.build_array(name, size.as_ref(), initial_values.as_deref())?;
                self.envs.insert_array(self.current, symbol, node.position)?;
                Ok(Flow::Value(None))
            }
            Node::ArrayUpdate { name, index, value } => {
                self.eval_array_update(name, index, value, node.position)?;
                Ok(Flow::Value(None))
            }
            Node::Print { args, newline } => {
                self.eval_print(args, *newline, node.position)?;
                Ok(Flow::Value(None))
            }
            Node::Expr(expr) => match &expr.expr {
                // kept apart from the expression path so that a call to a
                // function without a return does not overwrite the body's
                // last value with null
                Expr::Call { name, args } => Ok(Flow::Value(self.eval_call(name, args, expr.position)?)),
                _ => {
                    let value = self.eval_expr_kind(&expr.expr, expr.position)?;
                    let value = self.resolve(value, expr.position)?;
                    Ok(Flow::Value(Some(value)))
                }
            },
            Node::Return(expr) => {
                let value = match expr {
                    Some(expr) => Some(self.eval_resolved(expr)?),
                    None => None,
                };
                Ok(Flow::Return(value))
            }
            Node::Break => Ok(Flow::Break),
            Node::Continue => Ok(Flow::Continue),
            Node::If {
                test,
                body,
                elif_branches,
                else_body,
            } => self.eval_if(test, body, elif_branches, else_body.as_ref()),
            Node::While { test, body } => self.eval_while(test, body),
            Node::For {
                target,
                range_start,
                range_end,
                body,
            } => self.eval_for(target, range_start, range_end, body),
        }
    }

    fn eval_if(
        &mut self,
        test: &'ast ExprLoc,
        body: &'ast Body,
        elif_branches: &'ast [ElifBranch],
        else_body: Option<&'ast Body>,
    ) -> RunResult<Flow> {
        if self.eval_resolved(test)?.is_truthy() {
            return self.eval_branch(body);
        }
        for branch in elif_branches {
            if self.eval_resolved(&branch.test)?.is_truthy() {
                return self.eval_branch(&branch.body);
            }
        }
        match else_body {
            Some(body) => self.eval_branch(body),
            None => Ok(Flow::Value(None)),
        }
    }

    fn eval_while(&mut self, test: &'ast ExprLoc, body: &'ast Body) -> RunResult<Flow> {
        while self.eval_resolved(test)?.is_truthy() {
            match self.eval_body(body)? {
                Flow::Value(_) | Flow::Continue => {}
                Flow::Break => break,
                flow @ Flow::Return(_) => return Ok(flow),
            }
        }
        Ok(Flow::Value(None))
    }

    fn eval_for(
        &mut self,
        target: &'ast str,
        range_start: &'ast ExprLoc,
        range_end: &'ast ExprLoc,
        body: &'ast Body,
    ) -> RunResult<Flow> {
        let start = self.range_endpoint(range_start)?;
        let end = self.range_endpoint(range_end)?;
        // the loop variable is bound even when the range is empty
        self.envs.insert_variable(self.current, target.to_owned(), Value::Int(start));
        let step: i64 = if start < end { 1 } else { -1 };
        let mut i = start;
        while i != end {
            self.envs.insert_variable(self.current, target.to_owned(), Value::Int(i));
            match self.eval_body(body)? {
                Flow::Value(_) | Flow::Continue => {}
                Flow::Break => break,
                flow @ Flow::Return(_) => return Ok(flow),
            }
            i += step;
        }
        Ok(Flow::Value(None))
    }

    fn eval_array_update(
        &mut self,
        name: &str,
        index: &'ast ExprLoc,
        value: &'ast ExprLoc,
        position: CodeRange,
    ) -> RunResult<()> {
        let index_value = self.array_index(index)?;
        let new_value = self.eval_resolved(value)?;
        let array = self.envs.lookup_array_mut(self.current, name, position)?;
        let len = array.values.len();
        if index_value < 0 || index_value as usize >= len {
            return Err(index_out_of_bounds(index_value, len, position));
        }
        array.values[index_value as usize] = new_value;
        Ok(())
    }

    fn eval_print(&mut self, args: &'ast Args, newline: bool, position: CodeRange) -> RunResult<()> {
        let count = args.len();
        for (i, arg) in args.exprs.iter().enumerate() {
            let value = self.eval_resolved(arg)?;
            self.write_print(Cow::Owned(value.to_string()), arg.position)?;
            if i + 1 < count {
                self.push_print(' ', arg.position)?;
            }
        }
        if newline {
            self.push_print('\n', position)?;
        }
        Ok(())
    }

    /// Evaluates a conditional branch body.
    ///
    /// A branch yields a value to its surroundings only by returning;
    /// normal completion discards the branch's last statement value.
    fn eval_branch(&mut self, body: &'ast Body) -> RunResult<Flow> {
        match self.eval_body(body)? {
            Flow::Value(_) => Ok(Flow::Value(None)),
            flow => Ok(flow),
        }
    }

    fn build_array(
        &mut self,
        name: &str,
        size: Option<&'ast ExprLoc>,
        initial_values: Option<&'ast [ExprLoc]>,
    ) -> RunResult<ArraySymbol> {
        if let Some(size_expr) = size {
            let size_value = self.eval_resolved(size_expr)?;
            let Value::Int(n) = size_value else {
                return Err(InterpreterError::runtime(
                    format!("array size must be an integer, got {}", size_value.describe()),
                    size_expr.position,
                ));
            };
            if n < 0 {
                return Err(InterpreterError::runtime(
                    format!("array size must be non-negative, got {n}"),
                    size_expr.position,
                ));
            }
            return Ok(ArraySymbol::sized(name, n as usize));
        }
        if let Some(exprs) = initial_values {
            let mut values = Vec::with_capacity(exprs.len());
            for expr in exprs {
                values.push(self.eval_resolved(expr)?);
            }
            return Ok(ArraySymbol::with_values(name, values));
        }
        Ok(ArraySymbol::unbounded(name))
    }

    // === expressions ===

    fn eval_expr(&mut self, expr: &'ast ExprLoc) -> RunResult<Value> {
        self.enter(expr.label(), expr.position)?;
        let result = self.eval_expr_kind(&expr.expr, expr.position);
        self.visit_depth -= 1;
        if let Ok(value) = &result {
            if !matches!(value, Value::Null) {
                self.tracer.on_return(expr.label(), value);
            }
        }
        result
    }

    /// Evaluates an expression and resolves an identifier sentinel through
    /// the scope chain.
    fn eval_resolved(&mut self, expr: &'ast ExprLoc) -> RunResult<Value> {
        let value = self.eval_expr(expr)?;
        self.resolve(value, expr.position)
    }

    fn resolve(&self, value: Value, position: CodeRange) -> RunResult<Value> {
        match value {
            Value::Identifier(name) => Ok(self
                .envs
                .lookup_variable(self.current, &name, false, position)?
                .clone()),
            other => Ok(other),
        }
    }

    fn eval_expr_kind(&mut self, expr: &'ast Expr, position: CodeRange) -> RunResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(Value::from(literal)),
            Expr::Identifier(name) => Ok(Value::Identifier(name.clone())),
            Expr::Binary { left, op, right } => {
                let left = self.eval_resolved(left)?;
                let right = self.eval_resolved(right)?;
                binary_op(left, *op, right, position)
            }
            Expr::Compare { left, op, right } => {
                let left = self.eval_resolved(left)?;
                let right = self.eval_resolved(right)?;
                compare_op(left, *op, right, position)
            }
            Expr::Unary { op, operand } => {
                let operand = self.eval_resolved(operand)?;
                unary_op(*op, operand, position)
            }
            Expr::Postfix { target, op } => self.postfix_op(target, *op, position),
            Expr::Call { name, args } => Ok(self.eval_call(name, args, position)?.unwrap_or(Value::Null)),
            Expr::ArrayAccess { name, index } => {
                let index_value = self.array_index(index)?;
                let array = self.envs.lookup_array(self.current, name, position)?;
                let len = array.values.len();
                if index_value < 0 || index_value as usize >= len {
                    return Err(index_out_of_bounds(index_value, len, position));
                }
                Ok(array.values[index_value as usize].clone())
            }
            Expr::Input { prompt } => self.eval_input(prompt, position),
        }
    }

    /// Postfix `++`/`--`: the target must resolve to a variable holding a
    /// number, which is mutated in place through the scope chain.
    fn postfix_op(&mut self, target: &str, op: PostfixOp, position: CodeRange) -> RunResult<Value> {
        let delta: i64 = match op {
            PostfixOp::Incr => 1,
            PostfixOp::Decr => -1,
        };
        let value = self.envs.lookup_variable_mut(self.current, target, position)?;
        match value {
            Value::Int(v) => {
                let next = v
                    .checked_add(delta)
                    .ok_or_else(|| InterpreterError::runtime("integer overflow", position))?;
                *v = next;
                Ok(Value::Int(next))
            }
            Value::Float(v) => {
                *v += delta as f64;
                Ok(Value::Float(*v))
            }
            other => Err(unary_type_error(op, other.kind(), position)),
        }
    }

    fn array_index(&mut self, expr: &'ast ExprLoc) -> RunResult<i64> {
        let value = self.eval_resolved(expr)?;
        match value {
            Value::Int(v) => Ok(v),
            other => Err(InterpreterError::runtime(
                format!("array index must be an integer, got {}", other.describe()),
                expr.position,
            )),
        }
    }

    fn range_endpoint(&mut self, expr: &'ast ExprLoc) -> RunResult<i64> {
        let value = self.eval_resolved(expr)?;
        match value {
            Value::Int(v) => Ok(v),
            other => Err(non_integer_range(other.describe(), expr.position)),
        }
    }

    fn eval_input(&mut self, prompt: &str, position: CodeRange) -> RunResult<Value> {
        if !prompt.is_empty() {
            self.write_print(Cow::Borrowed(prompt), position)?;
        }
        let line = self
            .input
            .read_line()
            .map_err(|err| InterpreterError::runtime(format!("failed to read from stdin: {err}"), position))?;
        match line {
            Some(line) => Ok(Value::Str(line)),
            None => Err(InterpreterError::runtime("end of input reached", position)),
        }
    }

    // === calls ===

    /// Calls a user function and returns its result, `None` when the body
    /// completed without returning a value.
    fn eval_call(&mut self, name: &str, args: &'ast Args, position: CodeRange) -> RunResult<Option<Value>> {
        if self.call_depth >= self.limits.max_call_depth {
            return Err(InterpreterError::recursion("recursion depth exceeded", position));
        }
        self.call_depth += 1;
        let result = self.call_function(name, args, position);
        self.call_depth -= 1;
        result
    }

    fn call_function(&mut self, name: &str, args: &'ast Args, position: CodeRange) -> RunResult<Option<Value>> {
        let function = self.envs.lookup_function(self.current, name, position)?.clone();
        self.tracer.on_call(name, self.call_depth);

        // arguments evaluate in the caller scope
        let mut arg_values: SmallVec<[Value; 8]> = SmallVec::with_capacity(args.len());
        for arg in &args.exprs {
            arg_values.push(self.eval_resolved(arg)?);
        }
        if arg_values.len() != function.params.len() {
            return Err(arity_mismatch(name, function.params.len(), arg_values.len(), args.position));
        }

        let level = self.envs.level(self.current) + 1;
        let local = self.envs.push(Environment::local(name, level));
        for (param, value) in function.params.iter().zip(arg_values) {
            self.envs.insert_variable(local, param.clone(), value);
        }

        let saved = self.current;
        self.current = local;
        let result = self.run_function_body(&function);
        self.current = saved;
        self.envs.pop();
        result
    }

    fn run_function_body(&mut self, function: &FunctionSymbol<'ast>) -> RunResult<Option<Value>> {
        let memoizable = self.memoize && function.pure;
        let fingerprint = if memoizable {
            let fingerprint = self.envs.fingerprint(self.current);
            if let Some(hit) = self.cache.get(fingerprint) {
                self.tracer.on_cache_hit(&function.name);
                return Ok(Some(hit.clone()));
            }
            Some(fingerprint)
        } else {
            None
        };

        let value = match self.eval_body(function.body)? {
            Flow::Value(value) | Flow::Return(value) => value,
            // a stray break/continue terminates the body like a bare exit
            Flow::Break | Flow::Continue => None,
        };

        if let (Some(fingerprint), Some(value)) = (fingerprint, &value) {
            self.cache.insert(fingerprint, value.clone());
        }
        Ok(value)
    }

    // === host output plumbing ===

    fn write_print(&mut self, text: Cow<'_, str>, position: CodeRange) -> RunResult<()> {
        self.print
            .stdout_write(text)
            .map_err(|err| InterpreterError::runtime(format!("failed to write to stdout: {err}"), position))
    }

    fn push_print(&mut self, end: char, position: CodeRange) -> RunResult<()> {
        self.print
            .stdout_push(end)
            .map_err(|err| InterpreterError::runtime(format!("failed to write to stdout: {err}"), position))
    }
}

// === operator semantics ===
//
// Binary operands arrive resolved; dispatch is on the pair of value tags and
// invalid pairs produce a RUNTIME invalid-operation error with the node span.

fn binary_op(left: Value, op: BinaryOp, right: Value, position: CodeRange) -> RunResult<Value> {
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::Str(mut l), Value::Str(r)) => {
                l.push_str(&r);
                Ok(Value::Str(l))
            }
            (Value::Int(l), Value::Int(r)) => checked_int(l.checked_add(r), position),
            (Value::Int(l), Value::Float(r)) => Ok(Value::Float(l as f64 + r)),
            (Value::Float(l), Value::Int(r)) => Ok(Value::Float(l + r as f64)),
            (Value::Float(l), Value::Float(r)) => Ok(Value::Float(l + r)),
            (l, r) => Err(invalid_operation(l.kind(), op, r.kind(), position)),
        },
        BinaryOp::Sub => match (left, right) {
            (Value::Int(l), Value::Int(r)) => checked_int(l.checked_sub(r), position),
            (Value::Int(l), Value::Float(r)) => Ok(Value::Float(l as f64 - r)),
            (Value::Float(l), Value::Int(r)) => Ok(Value::Float(l - r as f64)),
            (Value::Float(l), Value::Float(r)) => Ok(Value::Float(l - r)),
            (l, r) => Err(invalid_operation(l.kind(), op, r.kind(), position)),
        },
        // `or` selects the first truthy operand, `and` short-circuits on a
        // falsy left; both evaluate the right-hand side eagerly
        BinaryOp::Or => Ok(if left.is_truthy() { left } else { right }),
        BinaryOp::And => Ok(if left.is_truthy() { right } else { left }),
        BinaryOp::Mul => match (left, right) {
            (Value::Int(l), Value::Int(r)) => checked_int(l.checked_mul(r), position),
            (Value::Int(l), Value::Float(r)) => Ok(Value::Float(l as f64 * r)),
            (Value::Float(l), Value::Int(r)) => Ok(Value::Float(l * r as f64)),
            (Value::Float(l), Value::Float(r)) => Ok(Value::Float(l * r)),
            (Value::Str(s), Value::Int(n)) | (Value::Int(n), Value::Str(s)) => Ok(Value::Str(repeat_str(&s, n))),
            (l, r) => Err(invalid_operation(l.kind(), op, r.kind(), position)),
        },
        // division always produces a real number
        BinaryOp::Div => match (left, right) {
            (Value::Int(l), Value::Int(r)) => div_f64(l as f64, r as f64, position),
            (Value::Int(l), Value::Float(r)) => div_f64(l as f64, r, position),
            (Value::Float(l), Value::Int(r)) => div_f64(l, r as f64, position),
            (Value::Float(l), Value::Float(r)) => div_f64(l, r, position),
            (l, r) => Err(invalid_operation(l.kind(), op, r.kind(), position)),
        },
    }
}

fn checked_int(result: Option<i64>, position: CodeRange) -> RunResult<Value> {
    result
        .map(Value::Int)
        .ok_or_else(|| InterpreterError::runtime("integer overflow", position))
}

fn div_f64(dividend: f64, divisor: f64, position: CodeRange) -> RunResult<Value> {
    if divisor == 0.0 {
        return Err(division_by_zero(position));
    }
    Ok(Value::Float(dividend / divisor))
}

/// String repetition; a non-positive count yields the empty string.
fn repeat_str(s: &str, n: i64) -> String {
    if n <= 0 {
        String::new()
    } else {
        s.repeat(n as usize)
    }
}

fn compare_op(left: Value, op: CmpOp, right: Value, position: CodeRange) -> RunResult<Value> {
    let (l, r) = match (&left, &right) {
        (Value::Str(l), Value::Str(r)) => return Ok(Value::Bool(str_cmp(op, l, r))),
        // a string measured against a number compares by length
        (Value::Str(s), Value::Int(r)) => (s.chars().count() as f64, *r as f64),
        (Value::Str(s), Value::Float(r)) => (s.chars().count() as f64, *r),
        (Value::Int(l), Value::Int(r)) => (*l as f64, *r as f64),
        (Value::Int(l), Value::Float(r)) => (*l as f64, *r),
        (Value::Float(l), Value::Int(r)) => (*l, *r as f64),
        (Value::Float(l), Value::Float(r)) => (*l, *r),
        (Value::Bool(l), Value::Bool(r)) => (f64::from(*l), f64::from(*r)),
        (l, r) => return Err(invalid_operation(l.kind(), op, r.kind(), position)),
    };
    Ok(Value::Bool(num_cmp(op, l, r)))
}

fn num_cmp(op: CmpOp, l: f64, r: f64) -> bool {
    match op {
        CmpOp::Eq => l == r,
        CmpOp::NotEq => l != r,
        CmpOp::Lt => l < r,
        CmpOp::Gt => l > r,
        CmpOp::LtE => l <= r,
        CmpOp::GtE => l >= r,
    }
}

fn str_cmp(op: CmpOp, l: &str, r: &str) -> bool {
    match op {
        CmpOp::Eq => l == r,
        CmpOp::NotEq => l != r,
        CmpOp::Lt => l < r,
        CmpOp::Gt => l > r,
        CmpOp::LtE => l <= r,
        CmpOp::GtE => l >= r,
    }
}

fn unary_op(op: UnaryOp, operand: Value, position: CodeRange) -> RunResult<Value> {
    match op {
        UnaryOp::Not => match operand {
            Value::Int(_) | Value::Float(_) | Value::Str(_) | Value::Bool(_) => Ok(Value::Bool(!operand.is_truthy())),
            other => Err(unary_type_error(op, other.kind(), position)),
        },
        UnaryOp::Neg => match operand {
            Value::Int(v) => checked_int(v.checked_neg(), position),
            Value::Float(v) => Ok(Value::Float(-v)),
            // booleans negate numerically as 0/1
            Value::Bool(b) => Ok(Value::Int(-i64::from(b))),
            other => Err(unary_type_error(op, other.kind(), position)),
        },
    }
}

// === purity scan ===
//
// A function is memoizable only when re-running its body with equal
// parameter bindings cannot produce a different result or skip an
// observable effect. The scan is syntactic and flow-insensitive: console
// I/O, array writes, postfix mutation, calls to other functions, and any
// name read that is not provably local all disqualify the function.
// Self-recursion is allowed, since a function whose only calls target
// itself derives all effects from its own body.

fn function_is_pure(def: &FuncDef) -> bool {
    let mut locals: AHashSet<&str> = def.params.names.iter().map(String::as_str).collect();
    let mut local_arrays: AHashSet<&str> = AHashSet::new();
    collect_local_names(&def.body, &mut locals, &mut local_arrays);
    body_is_pure(&def.body, &def.name, &locals, &local_arrays)
}

/// Gathers every name the body assigns or defines, flow-insensitively.
fn collect_local_names<'a>(body: &'a Body, locals: &mut AHashSet<&'a str>, arrays: &mut AHashSet<&'a str>) {
    for statement in &body.statements {
        match &statement.node {
            Node::Assignment { target, .. } => {
                locals.insert(target);
            }
            Node::ArrayDef { name, .. } => {
                arrays.insert(name);
            }
            Node::For { target, body, .. } => {
                locals.insert(target);
                collect_local_names(body, locals, arrays);
            }
            Node::If {
                body,
                elif_branches,
                else_body,
                ..
            } => {
                collect_local_names(body, locals, arrays);
                for branch in elif_branches {
                    collect_local_names(&branch.body, locals, arrays);
                }
                if let Some(else_body) = else_body {
                    collect_local_names(else_body, locals, arrays);
                }
            }
            Node::While { body, .. } => collect_local_names(body, locals, arrays),
            _ => {}
        }
    }
}

fn body_is_pure(body: &Body, name: &str, locals: &AHashSet<&str>, arrays: &AHashSet<&str>) -> bool {
    body.statements
        .iter()
        .all(|statement| node_is_pure(&statement.node, name, locals, arrays))
}

fn node_is_pure(node: &Node, name: &str, locals: &AHashSet<&str>, arrays: &AHashSet<&str>) -> bool {
    match node {
        Node::Print { .. } | Node::ArrayUpdate { .. } => false,
        Node::Assignment { value, .. } => expr_is_pure(value, name, locals, arrays),
        Node::ArrayDef {
            size, initial_values, ..
        } => {
            size.as_ref().is_none_or(|expr| expr_is_pure(expr, name, locals, arrays))
                && initial_values
                    .as_ref()
                    .is_none_or(|exprs| exprs.iter().all(|expr| expr_is_pure(expr, name, locals, arrays)))
        }
        Node::Expr(expr) => expr_is_pure(expr, name, locals, arrays),
        Node::Return(expr) => expr.as_ref().is_none_or(|expr| expr_is_pure(expr, name, locals, arrays)),
        Node::Break | Node::Continue => true,
        Node::If {
            test,
            body,
            elif_branches,
            else_body,
        } => {
            expr_is_pure(test, name, locals, arrays)
                && body_is_pure(body, name, locals, arrays)
                && elif_branches.iter().all(|branch| {
                    expr_is_pure(&branch.test, name, locals, arrays) && body_is_pure(&branch.body, name, locals, arrays)
                })
                && else_body
                    .as_ref()
                    .is_none_or(|else_body| body_is_pure(else_body, name, locals, arrays))
        }
        Node::While { test, body } => {
            expr_is_pure(test, name, locals, arrays) && body_is_pure(body, name, locals, arrays)
        }
        Node::For {
            range_start,
            range_end,
            body,
            ..
        } => {
            expr_is_pure(range_start, name, locals, arrays)
                && expr_is_pure(range_end, name, locals, arrays)
                && body_is_pure(body, name, locals, arrays)
        }
    }
}

fn expr_is_pure(expr: &ExprLoc, name: &str, locals: &AHashSet<&str>, arrays: &AHashSet<&str>) -> bool {
    match &expr.expr {
        Expr::Literal(_) => true,
        Expr::Input { .. } | Expr::Postfix { .. } => false,
        Expr::Identifier(ident) => locals.contains(ident.as_str()),
        Expr::Binary { left, right, .. } | Expr::Compare { left, right, .. } => {
            expr_is_pure(left, name, locals, arrays) && expr_is_pure(right, name, locals, arrays)
        }
        Expr::Unary { operand, .. } => expr_is_pure(operand, name, locals, arrays),
        Expr::Call { name: callee, args } => {
            callee == name && args.exprs.iter().all(|arg| expr_is_pure(arg, name, locals, arrays))
        }
        Expr::ArrayAccess { name: array, index } => {
            arrays.contains(array.as_str()) && expr_is_pure(index, name, locals, arrays)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Params;

    fn def(name: &str, params: &[&str], statements: Vec<NodeLoc>) -> FuncDef {
        let range = CodeRange::default();
        FuncDef {
            position: range,
            name: name.to_owned(),
            params: Params::new(range, params.iter().map(|&p| p.to_owned()).collect()),
            body: Body::new(range, statements),
        }
    }

    fn stmt(node: Node) -> NodeLoc {
        NodeLoc::new(CodeRange::default(), node)
    }

    fn range() -> CodeRange {
        CodeRange::default()
    }

    #[test]
    fn self_recursive_arithmetic_is_pure() {
        // func fact(n) { return n * fact(n - 1) }
        let body = ExprLoc::binary(
            range(),
            ExprLoc::identifier(range(), "n"),
            BinaryOp::Mul,
            ExprLoc::call(
                range(),
                "fact",
                Args::new(
                    range(),
                    vec![ExprLoc::binary(
                        range(),
                        ExprLoc::identifier(range(), "n"),
                        BinaryOp::Sub,
                        ExprLoc::int(range(), 1),
                    )],
                ),
            ),
        );
        let func = def("fact", &["n"], vec![stmt(Node::Return(Some(body)))]);
        assert!(function_is_pure(&func));
    }

    #[test]
    fn print_makes_a_function_impure() {
        let func = def(
            "shout",
            &["n"],
            vec![stmt(Node::Print {
                args: Args::new(range(), vec![ExprLoc::identifier(range(), "n")]),
                newline: true,
            })],
        );
        assert!(!function_is_pure(&func));
    }

    #[test]
    fn reading_an_unassigned_name_is_impure() {
        // `g` is neither a parameter nor assigned in the body, so it would
        // resolve in the global scope and break memoization
        let func = def(
            "add_global",
            &["n"],
            vec![stmt(Node::Return(Some(ExprLoc::binary(
                range(),
                ExprLoc::identifier(range(), "n"),
                BinaryOp::Add,
                ExprLoc::identifier(range(), "g"),
            ))))],
        );
        assert!(!function_is_pure(&func));
    }

    #[test]
    fn locally_assigned_names_stay_pure() {
        let func = def(
            "double",
            &["n"],
            vec![
                stmt(Node::Assignment {
                    target: "twice".to_owned(),
                    value: ExprLoc::binary(
                        range(),
                        ExprLoc::identifier(range(), "n"),
                        BinaryOp::Mul,
                        ExprLoc::int(range(), 2),
                    ),
                }),
                stmt(Node::Return(Some(ExprLoc::identifier(range(), "twice")))),
            ],
        );
        assert!(function_is_pure(&func));
    }

    #[test]
    fn calling_another_function_is_impure() {
        let func = def(
            "wrapper",
            &["n"],
            vec![stmt(Node::Return(Some(ExprLoc::call(
                range(),
                "helper",
                Args::new(range(), vec![ExprLoc::identifier(range(), "n")]),
            ))))],
        );
        assert!(!function_is_pure(&func));
    }

    #[test]
    fn array_update_is_impure_but_local_array_read_is_pure() {
        let update = def(
            "poke",
            &[],
            vec![stmt(Node::ArrayUpdate {
                name: "a".to_owned(),
                index: ExprLoc::int(range(), 0),
                value: ExprLoc::int(range(), 1),
            })],
        );
        assert!(!function_is_pure(&update));

        let read_local = def(
            "peek",
            &[],
            vec![
                stmt(Node::ArrayDef {
                    name: "a".to_owned(),
                    size: None,
                    initial_values: Some(vec![ExprLoc::int(range(), 7)]),
                }),
                stmt(Node::Return(Some(ExprLoc::new(
                    range(),
                    Expr::ArrayAccess {
                        name: "a".to_owned(),
                        index: Box::new(ExprLoc::int(range(), 0)),
                    },
                )))),
            ],
        );
        assert!(function_is_pure(&read_local));
    }
}
