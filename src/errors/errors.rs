use std::fmt::Display;

use thiserror::Error;

use crate::{ast::ast::NodeId, Position};

/// A positioned diagnostic.
///
/// Lexer and parser failures are returned as `Err(Error)`; the type checker
/// accumulates these in its diagnostics list instead.
#[derive(Debug, Clone)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
    node: Option<NodeId>,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
            node: None,
        }
    }

    /// Attaches the tree node the diagnostic refers to.
    pub fn at_node(mut self, node: NodeId) -> Self {
        self.node = Some(node);
        self
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_node(&self) -> Option<NodeId> {
        self.node
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    pub fn get_error_name(&self) -> &str {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => "UnrecognisedToken",
            ErrorImpl::UnexpectedToken { .. } => "UnexpectedToken",
            ErrorImpl::UnexpectedTokenDetailed { .. } => "UnexpectedTokenDetailed",
            ErrorImpl::NumberParseError { .. } => "NumberParseError",
            ErrorImpl::UnknownType { .. } => "UnknownType",
            ErrorImpl::TypeMatchError { .. } => "TypeMatchError",
            ErrorImpl::InvalidOperand { .. } => "InvalidOperand",
            ErrorImpl::InvalidConversion { .. } => "InvalidConversion",
            ErrorImpl::NotIndexable { .. } => "NotIndexable",
            ErrorImpl::NotIterable { .. } => "NotIterable",
            ErrorImpl::UnknownProperty { .. } => "UnknownProperty",
            ErrorImpl::UnexpectedArguments { .. } => "UnexpectedArguments",
            ErrorImpl::MissingArguments { .. } => "MissingArguments",
            ErrorImpl::MissingExplicitConversion { .. } => "MissingExplicitConversion",
            ErrorImpl::MissingExplicitContext { .. } => "MissingExplicitContext",
            ErrorImpl::MutRequiresExplicitType { .. } => "MutRequiresExplicitType",
            ErrorImpl::EmptyArrayLiteral => "EmptyArrayLiteral",
            ErrorImpl::DimensionMismatch { .. } => "DimensionMismatch",
            ErrorImpl::RaggedArray { .. } => "RaggedArray",
            ErrorImpl::RankMismatch { .. } => "RankMismatch",
            ErrorImpl::IndexOutOfBounds { .. } => "IndexOutOfBounds",
            ErrorImpl::VariableNotDeclared { .. } => "VariableNotDeclared",
            ErrorImpl::VariableAlreadyDeclared { .. } => "VariableAlreadyDeclared",
            ErrorImpl::FunctionNotDeclared { .. } => "FunctionNotDeclared",
            ErrorImpl::FunctionAlreadyDeclared { .. } => "FunctionAlreadyDeclared",
            ErrorImpl::ControlFlowOutsideLoop { .. } => "ControlFlowOutsideLoop",
            ErrorImpl::UndefinedLabel { .. } => "UndefinedLabel",
            ErrorImpl::DuplicateLabel { .. } => "DuplicateLabel",
            ErrorImpl::ReturnOutsideFunction => "ReturnOutsideFunction",
            ErrorImpl::YieldOutsideExpression => "YieldOutsideExpression",
            ErrorImpl::LiteralOutOfRange { .. } => "LiteralOutOfRange",
            ErrorImpl::ImmutableAssignment { .. } => "ImmutableAssignment",
            ErrorImpl::MissingBlockValue => "MissingBlockValue",
            ErrorImpl::MissingElseBranch => "MissingElseBranch",
            ErrorImpl::UndefWithoutMut { .. } => "UndefWithoutMut",
            ErrorImpl::MissingReturnValue { .. } => "MissingReturnValue",
            ErrorImpl::UnboundedLoopExpression => "UnboundedLoopExpression",
        }
    }

    pub fn get_kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. }
            | ErrorImpl::UnknownType { .. } => ErrorKind::Syntax,
            ErrorImpl::TypeMatchError { .. }
            | ErrorImpl::InvalidOperand { .. }
            | ErrorImpl::InvalidConversion { .. }
            | ErrorImpl::NotIndexable { .. }
            | ErrorImpl::NotIterable { .. }
            | ErrorImpl::UnknownProperty { .. }
            | ErrorImpl::UnexpectedArguments { .. }
            | ErrorImpl::MissingArguments { .. } => ErrorKind::TypeMismatch,
            ErrorImpl::MissingExplicitConversion { .. } => ErrorKind::MissingExplicitConversion,
            ErrorImpl::MissingExplicitContext { .. }
            | ErrorImpl::MutRequiresExplicitType { .. }
            | ErrorImpl::EmptyArrayLiteral => ErrorKind::MissingExplicitContext,
            ErrorImpl::DimensionMismatch { .. }
            | ErrorImpl::RaggedArray { .. }
            | ErrorImpl::RankMismatch { .. } => ErrorKind::DimensionMismatch,
            ErrorImpl::IndexOutOfBounds { .. } => ErrorKind::OutOfBounds,
            ErrorImpl::VariableNotDeclared { .. }
            | ErrorImpl::VariableAlreadyDeclared { .. }
            | ErrorImpl::FunctionNotDeclared { .. }
            | ErrorImpl::FunctionAlreadyDeclared { .. }
            | ErrorImpl::ControlFlowOutsideLoop { .. }
            | ErrorImpl::UndefinedLabel { .. }
            | ErrorImpl::DuplicateLabel { .. }
            | ErrorImpl::ReturnOutsideFunction
            | ErrorImpl::YieldOutsideExpression => ErrorKind::ScopeError,
            ErrorImpl::LiteralOutOfRange { .. } => ErrorKind::LiteralRangeError,
            ErrorImpl::ImmutableAssignment { .. } => ErrorKind::Mutability,
            ErrorImpl::MissingBlockValue
            | ErrorImpl::MissingElseBranch
            | ErrorImpl::UndefWithoutMut { .. }
            | ErrorImpl::MissingReturnValue { .. } => ErrorKind::MissingValue,
            ErrorImpl::UnboundedLoopExpression => ErrorKind::UnboundedIteration,
        }
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. } => ErrorTip::None,
            ErrorImpl::UnexpectedToken { token } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`", token))
            }
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::UnknownType { type_ } => ErrorTip::Suggestion(format!(
                "Unknown type `{}`; expected one of i8..i64, u8..u64, f32, f64, bool, string",
                type_
            )),
            ErrorImpl::MissingExplicitConversion { to, .. } => {
                ErrorTip::Suggestion(format!("Use an explicit conversion: `value:{}`", to))
            }
            ErrorImpl::MissingExplicitContext { .. } => ErrorTip::Suggestion(String::from(
                "Add a type annotation, e.g. `val name : i32 = ...`",
            )),
            ErrorImpl::MutRequiresExplicitType { variable } => ErrorTip::Suggestion(format!(
                "Declare the type of `{}`, e.g. `mut {} : i32 = ...`",
                variable, variable
            )),
            ErrorImpl::EmptyArrayLiteral => ErrorTip::Suggestion(String::from(
                "Annotate the declaration, e.g. `val empty : [0]i32 = []`",
            )),
            ErrorImpl::InvalidOperand { operator, .. } if operator == "/" => ErrorTip::Suggestion(
                String::from("`/` is float division; use `\\` for integer division"),
            ),
            ErrorImpl::InvalidOperand { operator, .. } if operator == "\\" => ErrorTip::Suggestion(
                String::from("`\\` is integer division; use `/` for float division"),
            ),
            ErrorImpl::UnboundedLoopExpression => ErrorTip::Suggestion(String::from(
                "Give the range an upper bound, or use a statement loop with `break`",
            )),
            ErrorImpl::ImmutableAssignment { variable } => ErrorTip::Suggestion(format!(
                "Declare `{}` with `mut` to allow reassignment",
                variable
            )),
            ErrorImpl::UndefWithoutMut { variable } => ErrorTip::Suggestion(format!(
                "`undef` is only meaningful for `mut`; declare `mut {}`",
                variable
            )),
            ErrorImpl::MissingBlockValue => {
                ErrorTip::Suggestion(String::from("Produce the value with `-> expression`"))
            }
            ErrorImpl::MissingElseBranch => ErrorTip::Suggestion(String::from(
                "A conditional used as a value needs an `else` branch",
            )),
            _ => ErrorTip::None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.internal_error)
    }
}

impl std::error::Error for Error {}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

/// Diagnostic categories. Several `ErrorImpl` variants share a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    TypeMismatch,
    MissingExplicitConversion,
    MissingExplicitContext,
    DimensionMismatch,
    OutOfBounds,
    ScopeError,
    LiteralRangeError,
    Mutability,
    MissingValue,
    UnboundedIteration,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },
    #[error("unknown type {type_}")]
    UnknownType { type_: String },

    #[error("types do not match: expected {expected}, received {received}")]
    TypeMatchError { expected: String, received: String },
    #[error("operator `{operator}` cannot be applied to {operand}")]
    InvalidOperand { operator: String, operand: String },
    #[error("cannot convert {from} to {to}")]
    InvalidConversion { from: String, to: String },
    #[error("type {type_} cannot be indexed")]
    NotIndexable { type_: String },
    #[error("type {type_} cannot be iterated")]
    NotIterable { type_: String },
    #[error("type {type_} has no property `{property}`")]
    UnknownProperty { property: String, type_: String },
    #[error("unexpected arguments: expected {expected}, received {received}")]
    UnexpectedArguments { expected: usize, received: usize },
    #[error("missing arguments: expected {expected}, received {received}")]
    MissingArguments { expected: usize, received: usize },

    #[error("{from} cannot be implicitly converted to {to}")]
    MissingExplicitConversion { from: String, to: String },
    #[error("{construct} is a runtime operation and requires an explicit type context")]
    MissingExplicitContext { construct: String },
    #[error("mutable variable {variable:?} requires an explicit type")]
    MutRequiresExplicitType { variable: String },
    #[error("empty array literal requires an explicit type")]
    EmptyArrayLiteral,

    #[error("array dimension mismatch: expected {expected}, received {received}")]
    DimensionMismatch { expected: String, received: String },
    #[error("inconsistent inner array length: expected {expected} elements, row {row} has {received}")]
    RaggedArray {
        row: usize,
        expected: usize,
        received: usize,
    },
    #[error("array rank mismatch: expected {expected} dimensions, received {received}")]
    RankMismatch { expected: usize, received: usize },
    #[error("index {index} is out of bounds for length {length}")]
    IndexOutOfBounds { index: i128, length: usize },

    #[error("variable {variable:?} not declared")]
    VariableNotDeclared { variable: String },
    #[error("variable {variable:?} already declared")]
    VariableAlreadyDeclared { variable: String },
    #[error("function {function:?} not declared")]
    FunctionNotDeclared { function: String },
    #[error("function {function:?} already declared")]
    FunctionAlreadyDeclared { function: String },
    #[error("`{keyword}` outside of a loop")]
    ControlFlowOutsideLoop { keyword: String },
    #[error("label '{label} is not defined by an enclosing loop")]
    UndefinedLabel { label: String },
    #[error("label '{label} is already in use by an enclosing loop")]
    DuplicateLabel { label: String },
    #[error("`return` outside of a function")]
    ReturnOutsideFunction,
    #[error("`->` outside of an expression block or loop")]
    YieldOutsideExpression,

    #[error("literal {value} does not fit in {target}")]
    LiteralOutOfRange { value: String, target: String },
    #[error("cannot assign to immutable {variable:?}")]
    ImmutableAssignment { variable: String },

    #[error("expression block does not produce a value")]
    MissingBlockValue,
    #[error("conditional expression is missing an `else` branch")]
    MissingElseBranch,
    #[error("`undef` cannot initialise immutable {variable:?}")]
    UndefWithoutMut { variable: String },
    #[error("`return` requires a value of type {expected}")]
    MissingReturnValue { expected: String },

    #[error("a loop expression cannot iterate an unbounded range")]
    UnboundedLoopExpression,
}
