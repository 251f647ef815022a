use std::fmt::Display;

use crate::lexer::tokens::TokenKind;

use super::{ast::Expr, statements::BlockStmt, types::TypeAnnotation};

// LITERALS

/// A numeric literal as written, before any type is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLiteral {
    Int(i128),
    Float(f64),
}

/// Number Expression
#[derive(Debug, Clone)]
pub struct NumberExpr {
    pub value: NumberLiteral,
}

/// String Expression
#[derive(Debug, Clone)]
pub struct StringExpr {
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct BoolExpr {
    pub value: bool,
}

/// Symbol Expression
/// Represents an identifier reference.
#[derive(Debug, Clone)]
pub struct SymbolExpr {
    pub value: String,
}

// OPERATORS

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    /// `/`, always float division
    Divide,
    /// `\`, integer division
    IntDivide,
    Modulo,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Equals,
    NotEquals,
    And,
    Or,
}

impl BinaryOperator {
    pub fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus | TokenKind::PlusEquals => BinaryOperator::Add,
            TokenKind::Dash | TokenKind::MinusEquals => BinaryOperator::Subtract,
            TokenKind::Star | TokenKind::StarEquals => BinaryOperator::Multiply,
            TokenKind::Slash | TokenKind::SlashEquals => BinaryOperator::Divide,
            TokenKind::Backslash => BinaryOperator::IntDivide,
            TokenKind::Percent => BinaryOperator::Modulo,
            TokenKind::Less => BinaryOperator::Less,
            TokenKind::LessEquals => BinaryOperator::LessEquals,
            TokenKind::Greater => BinaryOperator::Greater,
            TokenKind::GreaterEquals => BinaryOperator::GreaterEquals,
            TokenKind::Equals => BinaryOperator::Equals,
            TokenKind::NotEquals => BinaryOperator::NotEquals,
            TokenKind::And => BinaryOperator::And,
            TokenKind::Or => BinaryOperator::Or,
            _ => return None,
        })
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Subtract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::IntDivide
                | BinaryOperator::Modulo
        )
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Less
                | BinaryOperator::LessEquals
                | BinaryOperator::Greater
                | BinaryOperator::GreaterEquals
                | BinaryOperator::Equals
                | BinaryOperator::NotEquals
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

impl Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::IntDivide => "\\",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Less => "<",
            BinaryOperator::LessEquals => "<=",
            BinaryOperator::Greater => ">",
            BinaryOperator::GreaterEquals => ">=",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::And => "&&",
            BinaryOperator::Or => "||",
        };
        write!(f, "{}", symbol)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Negate,
    Not,
}

impl Display for PrefixOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefixOperator::Negate => write!(f, "-"),
            PrefixOperator::Not => write!(f, "!"),
        }
    }
}

// COMPLEX

/// Binary Expression
#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Box<Expr>,
    pub operator: BinaryOperator,
    pub right: Box<Expr>,
}

/// Prefix Expression
/// `-x`, `!flag`
#[derive(Debug, Clone)]
pub struct PrefixExpr {
    pub operator: PrefixOperator,
    pub right_expr: Box<Expr>,
}

/// Assignment Expression
///
/// `operator` is `None` for plain `=` and the arithmetic operator of a
/// compound assignment (`+=`) otherwise.
#[derive(Debug, Clone)]
pub struct AssignmentExpr {
    pub assignee: Box<Expr>,
    pub operator: Option<BinaryOperator>,
    pub value: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: String,
    pub arguments: Vec<Expr>,
}

/// Explicit conversion, `value:type`.
#[derive(Debug, Clone)]
pub struct ConversionExpr {
    pub value: Box<Expr>,
    pub target: TypeAnnotation,
}

#[derive(Debug, Clone)]
pub struct ArrayLiteralExpr {
    pub elements: Vec<Expr>,
}

/// `array[index]`; a range index is a slice and `array[..]` is a copy.
#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub array: Box<Expr>,
    pub index: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct MemberExpr {
    pub object: Box<Expr>,
    pub property: String,
}

#[derive(Debug, Clone)]
pub struct RangeExpr {
    pub start: Option<Box<Expr>>,
    pub end: Option<Box<Expr>>,
    pub inclusive: bool,
}

#[derive(Debug, Clone)]
pub enum ElseBranch {
    If(Box<IfExpr>),
    Block(BlockStmt),
}

/// Conditional, used both as a statement and as a value.
#[derive(Debug, Clone)]
pub struct IfExpr {
    pub condition: Box<Expr>,
    pub then_body: BlockStmt,
    pub else_body: Option<ElseBranch>,
}

/// `for` loop, used both as a statement and as an array-producing value.
#[derive(Debug, Clone)]
pub struct ForExpr {
    pub label: Option<String>,
    pub variable: String,
    pub explicit_type: Option<TypeAnnotation>,
    pub iterable: Box<Expr>,
    pub body: BlockStmt,
}
