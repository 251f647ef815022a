//! Unit tests for error handling.
//!
//! This module contains tests for error construction, naming, tips and the
//! mapping from concrete errors onto diagnostic kinds.

use crate::errors::errors::{Error, ErrorImpl, ErrorKind, ErrorTip};
use crate::Position;
use std::rc::Rc;

fn at_start(error: ErrorImpl) -> Error {
    Error::new(error, Position(0, Rc::new("test.cx".to_string())))
}

#[test]
fn test_error_creation() {
    let error = at_start(ErrorImpl::UnrecognisedToken {
        token: "@".to_string(),
    });

    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_kind(), ErrorKind::Syntax);
}

#[test]
fn test_error_position() {
    let pos = Position(42, Rc::new("test.cx".to_string()));
    let error = Error::new(
        ErrorImpl::UnexpectedToken {
            token: "identifier".to_string(),
        },
        pos.clone(),
    );

    assert_eq!(error.get_position().0, 42);
    assert_eq!(error.get_node(), None);
}

#[test]
fn test_error_node_reference() {
    let error = at_start(ErrorImpl::EmptyArrayLiteral).at_node(1030);
    assert_eq!(error.get_node(), Some(1030));
}

#[test]
fn test_type_mismatch_message_names_both_types() {
    let error = at_start(ErrorImpl::TypeMatchError {
        expected: "i32".to_string(),
        received: "string".to_string(),
    });

    assert_eq!(error.get_error_name(), "TypeMatchError");
    assert_eq!(error.get_kind(), ErrorKind::TypeMismatch);
    assert_eq!(
        error.to_string(),
        "types do not match: expected i32, received string"
    );
}

#[test]
fn test_missing_conversion_suggests_syntax() {
    let error = at_start(ErrorImpl::MissingExplicitConversion {
        from: "i32".to_string(),
        to: "i64".to_string(),
    });

    assert_eq!(error.get_kind(), ErrorKind::MissingExplicitConversion);
    assert_eq!(error.to_string(), "i32 cannot be implicitly converted to i64");
    assert_eq!(
        error.get_tip().to_string(),
        "Use an explicit conversion: `value:i64`"
    );
}

#[test]
fn test_scope_errors_share_kind() {
    let errors = [
        ErrorImpl::VariableNotDeclared {
            variable: "foo".to_string(),
        },
        ErrorImpl::VariableAlreadyDeclared {
            variable: "x".to_string(),
        },
        ErrorImpl::FunctionAlreadyDeclared {
            function: "main".to_string(),
        },
        ErrorImpl::ControlFlowOutsideLoop {
            keyword: "break".to_string(),
        },
        ErrorImpl::UndefinedLabel {
            label: "outer".to_string(),
        },
        ErrorImpl::ReturnOutsideFunction,
    ];

    for error in errors {
        assert_eq!(at_start(error).get_kind(), ErrorKind::ScopeError);
    }
}

#[test]
fn test_dimension_errors_share_kind() {
    let ragged = at_start(ErrorImpl::RaggedArray {
        row: 1,
        expected: 3,
        received: 2,
    });
    assert_eq!(ragged.get_kind(), ErrorKind::DimensionMismatch);
    assert_eq!(
        ragged.to_string(),
        "inconsistent inner array length: expected 3 elements, row 1 has 2"
    );

    let rank = at_start(ErrorImpl::RankMismatch {
        expected: 2,
        received: 1,
    });
    assert_eq!(rank.get_kind(), ErrorKind::DimensionMismatch);
}

#[test]
fn test_literal_range_error() {
    let error = at_start(ErrorImpl::LiteralOutOfRange {
        value: "300".to_string(),
        target: "i8".to_string(),
    });

    assert_eq!(error.get_kind(), ErrorKind::LiteralRangeError);
    assert_eq!(error.to_string(), "literal 300 does not fit in i8");
}

#[test]
fn test_error_tip_none() {
    let error = at_start(ErrorImpl::UnrecognisedToken {
        token: "@".to_string(),
    });

    assert!(matches!(error.get_tip(), ErrorTip::None));
}

#[test]
fn test_division_tips() {
    let float_division = at_start(ErrorImpl::InvalidOperand {
        operator: "/".to_string(),
        operand: "i32".to_string(),
    });
    assert!(float_division.get_tip().to_string().contains("integer division"));

    let integer_division = at_start(ErrorImpl::InvalidOperand {
        operator: "\\".to_string(),
        operand: "f64".to_string(),
    });
    assert!(integer_division.get_tip().to_string().contains("float division"));
}

#[test]
fn test_error_tip_display() {
    let tip = ErrorTip::Suggestion("Try this instead".to_string());
    assert_eq!(tip.to_string(), "Try this instead");

    let tip = ErrorTip::None;
    assert_eq!(tip.to_string(), "");
}

#[test]
fn test_arity_errors() {
    let unexpected = at_start(ErrorImpl::UnexpectedArguments {
        expected: 2,
        received: 3,
    });
    assert_eq!(unexpected.get_error_name(), "UnexpectedArguments");

    let missing = at_start(ErrorImpl::MissingArguments {
        expected: 3,
        received: 1,
    });
    assert_eq!(missing.get_error_name(), "MissingArguments");
    assert_eq!(missing.get_kind(), ErrorKind::TypeMismatch);
}
