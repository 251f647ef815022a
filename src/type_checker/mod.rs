//! Type resolution and coercion.
//!
//! A single depth-first walk over the parsed program decides the type of
//! every expression and declaration:
//!
//! - Integer and float literals start out as `comptime_int` / `comptime_float`
//!   and stay that way until a typed use fixes them
//! - The expected type of a position is threaded down as a `TypeContext`
//! - Blocks, conditionals and loops used as values always need a target type
//! - Array literals must be rectangular and match the target's dimensions
//! - Value-producing loops build arrays one peeled dimension at a time
//!
//! Problems are collected in `Diagnostics` rather than aborting the walk.

pub mod arrays;
pub mod classifier;
pub mod coercion;
pub mod context;
pub mod declarations;
pub mod diagnostics;
pub mod environment;
pub mod literals;
pub mod loops;
pub mod resolver;
pub mod type_checker;
pub mod types;
