use criterion::{Criterion, black_box, criterion_group, criterion_main};
use quill::{
    Interpreter, Value,
    ast::{Args, BinaryOp, Body, CmpOp, CodeRange, Expr, ExprLoc, FuncDef, Node, NodeLoc, Params, Program},
    io::{NoInput, NoPrint},
};

fn range() -> CodeRange {
    CodeRange::default()
}

fn stmt(node: Node) -> NodeLoc {
    NodeLoc::new(range(), node)
}

fn int(value: i64) -> ExprLoc {
    ExprLoc::int(range(), value)
}

fn ident(name: &str) -> ExprLoc {
    ExprLoc::identifier(range(), name)
}

fn call(name: &str, args: Vec<ExprLoc>) -> ExprLoc {
    ExprLoc::call(range(), name, Args::new(range(), args))
}

/// `func fib(n) { if n < 2 { return n } return fib(n-1) + fib(n-2) }`
fn fib_program(n: i64) -> Program {
    let fib = FuncDef {
        position: range(),
        name: "fib".to_owned(),
        params: Params::new(range(), vec!["n".to_owned()]),
        body: Body::new(
            range(),
            vec![
                stmt(Node::If {
                    test: ExprLoc::compare(range(), ident("n"), CmpOp::Lt, int(2)),
                    body: Body::new(range(), vec![stmt(Node::Return(Some(ident("n"))))]),
                    elif_branches: vec![],
                    else_body: None,
                }),
                stmt(Node::Return(Some(ExprLoc::binary(
                    range(),
                    call("fib", vec![ExprLoc::binary(range(), ident("n"), BinaryOp::Sub, int(1))]),
                    BinaryOp::Add,
                    call("fib", vec![ExprLoc::binary(range(), ident("n"), BinaryOp::Sub, int(2))]),
                )))),
            ],
        ),
    };
    Program::new(
        vec![fib],
        Body::new(range(), vec![stmt(Node::Expr(call("fib", vec![int(n)])))]),
    )
}

/// Tight loop summing integers: `total = 0; for i in 0..n { total = total + i }`
fn loop_sum_program(n: i64) -> Program {
    Program::with_body(Body::new(
        range(),
        vec![
            stmt(Node::Assignment {
                target: "total".to_owned(),
                value: int(0),
            }),
            stmt(Node::For {
                target: "i".to_owned(),
                range_start: int(0),
                range_end: int(n),
                body: Body::new(
                    range(),
                    vec![stmt(Node::Assignment {
                        target: "total".to_owned(),
                        value: ExprLoc::binary(range(), ident("total"), BinaryOp::Add, ident("i")),
                    })],
                ),
            }),
            stmt(Node::Expr(ident("total"))),
        ],
    ))
}

fn run_to_value(interpreter: &Interpreter, program: &Program) -> Option<Value> {
    let mut print = NoPrint;
    let mut input = NoInput;
    interpreter
        .run(program, &mut print, &mut input)
        .expect("benchmark program should evaluate")
}

fn benches(c: &mut Criterion) {
    let memoized = Interpreter::new();
    let unmemoized = Interpreter::new().with_memoize(false);

    let fib = fib_program(15);
    assert_eq!(run_to_value(&memoized, &fib), Some(Value::Int(610)));
    c.bench_function("fib_15_memoized", |b| {
        b.iter(|| black_box(run_to_value(&memoized, &fib)));
    });
    c.bench_function("fib_15_unmemoized", |b| {
        b.iter(|| black_box(run_to_value(&unmemoized, &fib)));
    });

    let loop_sum = loop_sum_program(1_000);
    assert_eq!(run_to_value(&memoized, &loop_sum), Some(Value::Int(499_500)));
    c.bench_function("loop_sum_1000", |b| {
        b.iter(|| black_box(run_to_value(&memoized, &loop_sum)));
    });
}

criterion_group!(benches_group, benches);
criterion_main!(benches_group);
