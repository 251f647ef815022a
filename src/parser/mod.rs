//! Parser module for building an Abstract Syntax Tree (AST).
//!
//! This module contains the parser that transforms a stream of tokens
//! into an Abstract Syntax Tree. It uses a Pratt parser for expressions
//! with proper operator precedence and handles:
//!
//! - Statement parsing (declarations, functions, loops, control flow)
//! - Expression parsing (operators, conversions, ranges, arrays, and
//!   blocks, conditionals and loops used as values)
//! - Type parsing for type annotations
//!
//! Statement terminators (`;`) are optional.

pub mod expr;
pub mod lookups;
pub mod parser;
pub mod stmt;
pub mod types;

#[cfg(test)]
mod tests;
