//! Type annotations as written in the source.
//!
//! Annotations are kept symbolic by the parser and converted into resolved
//! types by the type checker, which also rejects unknown names.

use std::fmt::Display;

use crate::Position;

#[derive(Debug, Clone)]
pub enum TypeAnnotation {
    Symbol(SymbolType),
    Array(ArrayType),
}

impl TypeAnnotation {
    pub fn get_position(&self) -> Position {
        match self {
            TypeAnnotation::Symbol(symbol) => symbol.position.clone(),
            TypeAnnotation::Array(array) => array.position.clone(),
        }
    }
}

/// A type referenced by name: `i32`, `string`, `void`.
#[derive(Debug, Clone)]
pub struct SymbolType {
    pub name: String,
    pub position: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionAnnotation {
    Fixed(usize),
    /// `_`
    Inferred,
}

/// `[N]T` or `[_]T`; `[2][3]i32` nests an array type as the underlying type.
#[derive(Debug, Clone)]
pub struct ArrayType {
    pub dimension: DimensionAnnotation,
    pub underlying: Box<TypeAnnotation>,
    pub position: Position,
}

impl Display for TypeAnnotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TypeAnnotation::Symbol(symbol) => write!(f, "{}", symbol.name),
            TypeAnnotation::Array(array) => match array.dimension {
                DimensionAnnotation::Fixed(size) => write!(f, "[{}]{}", size, array.underlying),
                DimensionAnnotation::Inferred => write!(f, "[_]{}", array.underlying),
            },
        }
    }
}
