//! The JSON wire format: programs arrive from the external parser as JSON.

mod common;

use common::*;
use pretty_assertions::assert_eq;
use quill::{Value, ast::Program};

#[test]
fn program_deserializes_from_parser_json() {
    let json = r#"
    {
      "functions": [],
      "body": {
        "position": {"start": {"line": 1, "column": 1}, "end": {"line": 2, "column": 16}},
        "statements": [
          {
            "position": {"start": {"line": 1, "column": 1}, "end": {"line": 1, "column": 6}},
            "node": {
              "Assignment": {
                "target": "a",
                "value": {
                  "position": {"start": {"line": 1, "column": 5}, "end": {"line": 1, "column": 6}},
                  "expr": {"Literal": {"Int": 3}}
                }
              }
            }
          },
          {
            "position": {"start": {"line": 2, "column": 1}, "end": {"line": 2, "column": 16}},
            "node": {
              "Print": {
                "args": {
                  "position": {"start": {"line": 2, "column": 9}, "end": {"line": 2, "column": 16}},
                  "exprs": [
                    {
                      "position": {"start": {"line": 2, "column": 9}, "end": {"line": 2, "column": 16}},
                      "expr": {
                        "Binary": {
                          "left": {
                            "position": {"start": {"line": 2, "column": 9}, "end": {"line": 2, "column": 10}},
                            "expr": {"Identifier": "a"}
                          },
                          "op": "Mul",
                          "right": {
                            "position": {"start": {"line": 2, "column": 13}, "end": {"line": 2, "column": 14}},
                            "expr": {"Literal": {"Int": 4}}
                          }
                        }
                      }
                    }
                  ]
                },
                "newline": true
              }
            }
          }
        ]
      }
    }
    "#;

    let program: Program = serde_json::from_str(json).expect("parser JSON should deserialize");
    let (_, output) = run_ok(&program);
    assert_eq!(output, "12\n");
}

#[test]
fn programs_round_trip_through_json() {
    let original = program(vec![
        assign("n", int(3)),
        while_stmt(
            cmp(ident("n"), quill::ast::CmpOp::Gt, int(0)),
            vec![
                print_stmt(vec![ident("n")]),
                assign("n", bin(ident("n"), BinaryOp::Sub, int(1))),
            ],
        ),
    ]);

    let json = serde_json::to_string(&original).expect("program should serialize");
    let decoded: Program = serde_json::from_str(&json).expect("program should deserialize");
    assert_eq!(decoded, original);

    let (_, output) = run_ok(&decoded);
    assert_eq!(output, "321");
}

#[test]
fn values_round_trip_through_json() {
    for value in [
        Value::Int(42),
        Value::Float(2.5),
        Value::from("hello"),
        Value::Bool(true),
        Value::Null,
    ] {
        let json = serde_json::to_string(&value).expect("value should serialize");
        let decoded: Value = serde_json::from_str(&json).expect("value should deserialize");
        assert_eq!(decoded, value);
    }
}

#[test]
fn function_definitions_round_trip() {
    let fact = func(
        "fact",
        &["n"],
        vec![ret(Some(bin(
            ident("n"),
            BinaryOp::Mul,
            call("fact", vec![bin(ident("n"), BinaryOp::Sub, int(1))]),
        )))],
    );
    let original = program_with_funcs(vec![fact], vec![expr_stmt(call("fact", vec![int(1)]))]);

    let json = serde_json::to_string_pretty(&original).expect("program should serialize");
    let decoded: Program = serde_json::from_str(&json).expect("program should deserialize");
    assert_eq!(decoded, original);
}
