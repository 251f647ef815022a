//! Unit tests for the parser module.
//!
//! This module contains tests for parsing various language constructs including:
//! - Variable declarations
//! - Function declarations
//! - Expressions and precedence
//! - Control flow statements and labels
//! - Blocks, conditionals and loops in value position

use std::rc::Rc;

use super::parser::parse;
use crate::{
    ast::{
        ast::{ExprKind, Stmt, StmtKind},
        expressions::{BinaryOperator, ElseBranch, NumberLiteral, PrefixOperator},
        statements::BlockStmt,
        types::{DimensionAnnotation, TypeAnnotation},
    },
    errors::errors::Error,
    lexer::lexer::tokenize,
};

fn parse_source(source: &str) -> Result<BlockStmt, Error> {
    let tokens = tokenize(source.to_string(), Some("test.hxn".to_string()))?;
    let (_, result) = parse(tokens, Rc::new("test.hxn".to_string()));
    result
}

fn parse_ok(source: &str) -> Vec<Stmt> {
    match parse_source(source) {
        Ok(block) => block.body,
        Err(error) => panic!("failed to parse {:?}: {}", source, error),
    }
}

#[test]
fn test_parse_variable_declaration() {
    let body = parse_ok("val x : i32 = 42");
    assert_eq!(body.len(), 1);

    match &body[0].kind {
        StmtKind::VarDecl(decl) => {
            assert_eq!(decl.identifier, "x");
            assert!(!decl.is_mutable);
            assert_eq!(decl.explicit_type.as_ref().map(|t| t.to_string()), Some("i32".to_string()));
            assert!(matches!(
                decl.assigned_value.kind,
                ExprKind::Number(ref n) if n.value == NumberLiteral::Int(42)
            ));
        }
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_mutable_undef_declaration() {
    let body = parse_ok("mut total : f64 = undef;");

    match &body[0].kind {
        StmtKind::VarDecl(decl) => {
            assert!(decl.is_mutable);
            assert!(matches!(decl.assigned_value.kind, ExprKind::Undef));
        }
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_semicolons_are_optional() {
    let body = parse_ok("val a = 1\nval b = 2; val c = 3");
    assert_eq!(body.len(), 3);
}

#[test]
fn test_declaration_requires_value() {
    assert!(parse_source("val x : i32").is_err());
}

#[test]
fn test_parse_function_declaration() {
    let body = parse_ok("func add(a: i32, mut b: i32) : i32 = { return a + b }");

    match &body[0].kind {
        StmtKind::FnDecl(func) => {
            assert_eq!(func.identifier, "add");
            assert_eq!(func.parameters.len(), 2);
            assert!(!func.parameters[0].is_mutable);
            assert!(func.parameters[1].is_mutable);
            assert_eq!(func.return_type.as_ref().map(|t| t.to_string()), Some("i32".to_string()));
            assert!(matches!(func.body.body[0].kind, StmtKind::Return(_)));
        }
        other => panic!("expected function, got {:?}", other),
    }
}

#[test]
fn test_parse_void_function_without_return_type() {
    let body = parse_ok("func log_it() { return }");

    match &body[0].kind {
        StmtKind::FnDecl(func) => {
            assert!(func.return_type.is_none());
            match &func.body.body[0].kind {
                StmtKind::Return(ret) => assert!(ret.value.is_none()),
                other => panic!("expected return, got {:?}", other),
            }
        }
        other => panic!("expected function, got {:?}", other),
    }
}

#[test]
fn test_binary_precedence() {
    let body = parse_ok("1 + 2 * 3");

    match &body[0].kind {
        StmtKind::Expression(expr) => match &expr.kind {
            ExprKind::Binary(binary) => {
                assert_eq!(binary.operator, BinaryOperator::Add);
                assert!(matches!(
                    binary.right.kind,
                    ExprKind::Binary(ref inner) if inner.operator == BinaryOperator::Multiply
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        },
        other => panic!("expected expression, got {:?}", other),
    }
}

#[test]
fn test_prefix_binds_tighter_than_binary() {
    let body = parse_ok("-a + b");

    match &body[0].kind {
        StmtKind::Expression(expr) => match &expr.kind {
            ExprKind::Binary(binary) => {
                assert!(matches!(
                    binary.left.kind,
                    ExprKind::Prefix(ref prefix) if prefix.operator == PrefixOperator::Negate
                ));
            }
            other => panic!("expected binary, got {:?}", other),
        },
        other => panic!("expected expression, got {:?}", other),
    }
}

#[test]
fn test_and_binds_tighter_than_or() {
    let body = parse_ok("a || b && c");

    match &body[0].kind {
        StmtKind::Expression(expr) => {
            assert!(matches!(
                expr.kind,
                ExprKind::Binary(ref binary) if binary.operator == BinaryOperator::Or
            ));
        }
        other => panic!("expected expression, got {:?}", other),
    }
}

#[test]
fn test_conversion_binds_tighter_than_arithmetic() {
    let body = parse_ok("a + b:i64");

    match &body[0].kind {
        StmtKind::Expression(expr) => match &expr.kind {
            ExprKind::Binary(binary) => match &binary.right.kind {
                ExprKind::Conversion(conversion) => {
                    assert_eq!(conversion.target.to_string(), "i64");
                }
                other => panic!("expected conversion, got {:?}", other),
            },
            other => panic!("expected binary, got {:?}", other),
        },
        other => panic!("expected expression, got {:?}", other),
    }
}

#[test]
fn test_compound_assignment() {
    let body = parse_ok("x += 2");

    match &body[0].kind {
        StmtKind::Expression(expr) => {
            assert!(matches!(
                expr.kind,
                ExprKind::Assignment(ref assignment) if assignment.operator == Some(BinaryOperator::Add)
            ));
        }
        other => panic!("expected expression, got {:?}", other),
    }
}

#[test]
fn test_parse_array_types() {
    let body = parse_ok("val m : [2][_]f64 = [[1.0], [2.0]]");

    match &body[0].kind {
        StmtKind::VarDecl(decl) => match decl.explicit_type.as_ref() {
            Some(TypeAnnotation::Array(outer)) => {
                assert_eq!(outer.dimension, DimensionAnnotation::Fixed(2));
                match outer.underlying.as_ref() {
                    TypeAnnotation::Array(inner) => {
                        assert_eq!(inner.dimension, DimensionAnnotation::Inferred)
                    }
                    other => panic!("expected inner array, got {:?}", other),
                }
            }
            other => panic!("expected array type, got {:?}", other),
        },
        other => panic!("expected declaration, got {:?}", other),
    }
}

#[test]
fn test_parse_index_slice_copy_and_length() {
    let body = parse_ok("a[1]\na[1..3]\na[..]\na.length");
    assert_eq!(body.len(), 4);

    let kinds: Vec<&ExprKind> = body
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::Expression(expr) => &expr.kind,
            other => panic!("expected expression, got {:?}", other),
        })
        .collect();

    assert!(matches!(kinds[0], ExprKind::Index(_)));
    match kinds[1] {
        ExprKind::Index(index) => assert!(matches!(index.index.kind, ExprKind::Range(_))),
        other => panic!("expected slice, got {:?}", other),
    }
    match kinds[2] {
        ExprKind::Index(index) => match &index.index.kind {
            ExprKind::Range(range) => {
                assert!(range.start.is_none());
                assert!(range.end.is_none());
            }
            other => panic!("expected full range, got {:?}", other),
        },
        other => panic!("expected copy, got {:?}", other),
    }
    assert!(matches!(kinds[3], ExprKind::Member(ref m) if m.property == "length"));
}

#[test]
fn test_parse_ranges() {
    let body = parse_ok("val a = 1..10\nval b = 1..=10\nval c = ..5\nval d = 3..");
    let ranges: Vec<_> = body
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::VarDecl(decl) => match &decl.assigned_value.kind {
                ExprKind::Range(range) => {
                    (range.start.is_some(), range.end.is_some(), range.inclusive)
                }
                other => panic!("expected range, got {:?}", other),
            },
            other => panic!("expected declaration, got {:?}", other),
        })
        .collect();

    assert_eq!(
        ranges,
        vec![(true, true, false), (true, true, true), (false, true, false), (true, false, false)]
    );
}

#[test]
fn test_inclusive_range_requires_end() {
    assert!(parse_source("val a = 1..=").is_err());
}

#[test]
fn test_open_range_before_loop_body() {
    let body = parse_ok("for i in 0.. { break }");

    match &body[0].kind {
        StmtKind::For(for_stmt) => match &for_stmt.iterable.kind {
            ExprKind::Range(range) => assert!(range.end.is_none()),
            other => panic!("expected range, got {:?}", other),
        },
        other => panic!("expected for, got {:?}", other),
    }
}

#[test]
fn test_parse_if_else_chain() {
    let body = parse_ok("if a { } else if b { } else { }");

    match &body[0].kind {
        StmtKind::If(if_stmt) => match &if_stmt.else_body {
            Some(ElseBranch::If(nested)) => {
                assert!(matches!(nested.else_body, Some(ElseBranch::Block(_))))
            }
            other => panic!("expected else-if, got {:?}", other),
        },
        other => panic!("expected if, got {:?}", other),
    }
}

#[test]
fn test_parse_runtime_constructs_as_values() {
    let body = parse_ok(
        "val a : i32 = { -> 1 }\nval b : i32 = if c { -> 1 } else { -> 2 }\nval d : [_]i32 = for i in 0..3 { -> i }",
    );

    let values: Vec<&ExprKind> = body
        .iter()
        .map(|stmt| match &stmt.kind {
            StmtKind::VarDecl(decl) => &decl.assigned_value.kind,
            other => panic!("expected declaration, got {:?}", other),
        })
        .collect();

    assert!(matches!(values[0], ExprKind::Block(_)));
    assert!(matches!(values[1], ExprKind::If(_)));
    assert!(matches!(values[2], ExprKind::For(_)));
}

#[test]
fn test_parse_labeled_loops() {
    let body = parse_ok("'outer for i in 0..3 { 'inner while true { break 'outer } continue }");

    match &body[0].kind {
        StmtKind::For(for_stmt) => {
            assert_eq!(for_stmt.label.as_deref(), Some("outer"));
            match &for_stmt.body.body[0].kind {
                StmtKind::While(while_stmt) => {
                    assert_eq!(while_stmt.label.as_deref(), Some("inner"));
                    match &while_stmt.body.body[0].kind {
                        StmtKind::Break(control) => {
                            assert_eq!(control.label.as_deref(), Some("outer"))
                        }
                        other => panic!("expected break, got {:?}", other),
                    }
                }
                other => panic!("expected while, got {:?}", other),
            }
            match &for_stmt.body.body[1].kind {
                StmtKind::Continue(control) => assert!(control.label.is_none()),
                other => panic!("expected continue, got {:?}", other),
            }
        }
        other => panic!("expected for, got {:?}", other),
    }
}

#[test]
fn test_loop_variable_annotation() {
    let body = parse_ok("for i : i64 in 0..3 { }");

    match &body[0].kind {
        StmtKind::For(for_stmt) => {
            assert_eq!(for_stmt.variable, "i");
            assert_eq!(
                for_stmt.explicit_type.as_ref().map(|t| t.to_string()),
                Some("i64".to_string())
            );
        }
        other => panic!("expected for, got {:?}", other),
    }
}

#[test]
fn test_call_requires_named_callee() {
    assert!(parse_source("(a + b)(1)").is_err());
    assert_eq!(parse_ok("sum(1, 2)").len(), 1);
}

#[test]
fn test_node_ids_are_unique() {
    let body = parse_ok("val a = 1 + 2\nval b = a * 3");
    let mut ids = vec![];

    for stmt in &body {
        if let StmtKind::VarDecl(decl) = &stmt.kind {
            ids.push(decl.assigned_value.id);
            if let ExprKind::Binary(binary) = &decl.assigned_value.kind {
                ids.push(binary.left.id);
                ids.push(binary.right.id);
            }
        }
    }

    let mut deduped = ids.clone();
    deduped.sort();
    deduped.dedup();
    assert_eq!(ids.len(), deduped.len());
    assert!(ids.iter().all(|id| *id >= 1024));
}

#[test]
fn test_unexpected_token_error() {
    let error = match parse_source("val = 3") {
        Err(error) => error,
        Ok(_) => panic!("expected an error"),
    };
    assert_eq!(error.get_error_name(), "UnexpectedTokenDetailed");
}

#[test]
fn test_unknown_type_name_is_parsed() {
    // rejection of unknown names happens during checking
    assert_eq!(parse_ok("val x : float = 1").len(), 1);
}

#[test]
fn test_empty_source() {
    assert!(parse_ok("").is_empty());
}
