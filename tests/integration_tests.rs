//! Integration tests for the whole front end.
//!
//! These tests run complete programs through tokenization, parsing and type
//! resolution, and check the diagnostics a caller would see.

use comptime_core::{
    check_source,
    errors::errors::ErrorKind,
    render_error,
    type_checker::types::{Dimension, ScalarKind, Type},
};

fn kinds(source: &str) -> Vec<ErrorKind> {
    let checker = check_source(source, "test.hxn").unwrap();
    checker
        .diagnostics()
        .entries()
        .iter()
        .map(|error| error.get_kind())
        .collect()
}

#[test]
fn test_unresolved_array_adapts_on_assignment() {
    let source = "val a = [1, 2, 3]\nval b : [_]i64 = a";
    let checker = check_source(source, "test.hxn").unwrap();

    assert!(checker.diagnostics().is_empty());
    assert_eq!(
        checker.declared_type("a"),
        Some(&Type::comptime_array(Type::ComptimeInt, vec![Dimension::Fixed(3)]))
    );
    assert_eq!(
        checker.declared_type("b"),
        Some(&Type::array(Type::Scalar(ScalarKind::I64), vec![Dimension::Fixed(3)]))
    );
}

#[test]
fn test_array_length_disagreement() {
    assert_eq!(kinds("val a : [2]i32 = [1, 2, 3]"), vec![ErrorKind::DimensionMismatch]);
}

#[test]
fn test_literal_exceeding_width() {
    assert_eq!(
        kinds("val x : i32 = 300_000_000_000"),
        vec![ErrorKind::LiteralRangeError]
    );
}

#[test]
fn test_conditional_value_needs_declared_type() {
    assert_eq!(
        kinds("val cond : bool = true\nval y = if cond { 1 } else { 2 }"),
        vec![ErrorKind::MissingExplicitContext]
    );

    let checker =
        check_source("val cond : bool = true\nval y : i32 = if cond { 1 } else { 2 }", "test.hxn")
            .unwrap();
    assert!(checker.diagnostics().is_empty());
    assert_eq!(checker.declared_type("y"), Some(&Type::Scalar(ScalarKind::I32)));
}

#[test]
fn test_loop_as_statement_and_as_value() {
    assert!(kinds("for i in 1..10 { -> i * i }").is_empty());

    let checker = check_source("val s : [_]i32 = for i in 1..10 { -> i * i }", "test.hxn").unwrap();
    assert!(checker.diagnostics().is_empty());
    assert_eq!(
        checker.declared_type("s"),
        Some(&Type::array(Type::Scalar(ScalarKind::I32), vec![Dimension::Inferred]))
    );
}

#[test]
fn test_break_without_loop() {
    assert_eq!(kinds("break"), vec![ErrorKind::ScopeError]);
}

#[test]
fn test_diagnostics_are_ordered_and_complete() {
    let source = "\
val a : i8 = 1000
val b : i32 = 1
val c : i64 = b
val d = { -> 1 }
break
";
    assert_eq!(
        kinds(source),
        vec![
            ErrorKind::LiteralRangeError,
            ErrorKind::MissingExplicitConversion,
            ErrorKind::MissingExplicitContext,
            ErrorKind::ScopeError,
        ]
    );
}

#[test]
fn test_program_with_functions_and_loops() {
    let source = "\
func sum(values: [_]i64) : i64 = {
    mut total : i64 = 0
    for v in values {
        total += v
    }
    return total
}

func squares(n: i64) : [_]i64 = {
    return for i in 0..n { -> i * i }
}

val table : [_][_]i32 = for row in 0..4 {
    -> for col in 0..4 { -> row * col }
}
val first : [_]i32 = table[0]
val count : i64 = table.length
val total : i64 = sum(squares(10))
val ratio : f64 = 10 / 4
";
    let checker = check_source(source, "test.hxn").unwrap();

    assert!(
        checker.diagnostics().is_empty(),
        "{:?}",
        checker
            .diagnostics()
            .entries()
            .iter()
            .map(|error| error.to_string())
            .collect::<Vec<_>>()
    );
    assert_eq!(
        checker.declared_type("first"),
        Some(&Type::array(Type::Scalar(ScalarKind::I32), vec![Dimension::Inferred]))
    );
}

#[test]
fn test_syntax_errors_abort() {
    assert!(check_source("val = 1", "test.hxn").is_err());
    assert!(check_source("val x : i32 = @", "test.hxn").is_err());
}

#[test]
fn test_rendered_diagnostic_points_at_literal() {
    let source = "val small : u8 = 256\n";
    let checker = check_source(source, "test.hxn").unwrap();
    let error = &checker.diagnostics().entries()[0];

    let rendered = render_error(error, source, "test.hxn");
    assert!(rendered.starts_with("Error: LiteralOutOfRange"));
    assert!(rendered.contains("-> test.hxn"));
    assert!(rendered.contains("1 | val small : u8 = 256"));
}
