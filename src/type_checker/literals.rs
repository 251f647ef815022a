//! Literal range validation and comptime constant folding.
//!
//! The range checks are pure functions of a value and a target kind, so the
//! coercion rules can ask "does this literal fit" without walking the tree.

use std::fmt::Display;

use crate::ast::expressions::{BinaryOperator, NumberLiteral};

use super::types::ScalarKind;

/// Whether the integer `value` is representable in `kind`.
///
/// Any integer fits a float kind; nothing fits `bool` or `string`.
pub fn integer_fits(value: i128, kind: ScalarKind) -> bool {
    match kind {
        ScalarKind::I8 => i8::try_from(value).is_ok(),
        ScalarKind::I16 => i16::try_from(value).is_ok(),
        ScalarKind::I32 => i32::try_from(value).is_ok(),
        ScalarKind::I64 => i64::try_from(value).is_ok(),
        ScalarKind::U8 => u8::try_from(value).is_ok(),
        ScalarKind::U16 => u16::try_from(value).is_ok(),
        ScalarKind::U32 => u32::try_from(value).is_ok(),
        ScalarKind::U64 => u64::try_from(value).is_ok(),
        ScalarKind::F32 | ScalarKind::F64 => true,
        ScalarKind::Bool | ScalarKind::String => false,
    }
}

/// Whether the float `value` is representable in `kind` without losing
/// precision.
///
/// A value narrows to `f32` when it is within range and the nearest `f32`
/// is either exactly the value or reads back as the same decimal literal:
/// `0.1` fits, `16777217.0` and `3.141592653589793` do not.
pub fn float_fits(value: f64, kind: ScalarKind) -> bool {
    if !value.is_finite() {
        return false;
    }

    match kind {
        ScalarKind::F32 => {
            if value.abs() > f32::MAX as f64 {
                return false;
            }
            let narrowed = value as f32;
            narrowed as f64 == value || narrowed.to_string().parse::<f64>() == Ok(value)
        }
        ScalarKind::F64 => true,
        _ => false,
    }
}

/// A value known at compile time, carried by comptime `val` bindings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConstValue {
    Int(i128),
    Float(f64),
}

impl ConstValue {
    pub fn fits(&self, kind: ScalarKind) -> bool {
        match self {
            ConstValue::Int(value) => integer_fits(*value, kind),
            ConstValue::Float(value) => kind.is_float() && float_fits(*value, kind),
        }
    }

    pub fn as_f64(&self) -> f64 {
        match self {
            ConstValue::Int(value) => *value as f64,
            ConstValue::Float(value) => *value,
        }
    }

    pub fn negate(&self) -> Option<ConstValue> {
        match self {
            ConstValue::Int(value) => value.checked_neg().map(ConstValue::Int),
            ConstValue::Float(value) => Some(ConstValue::Float(-value)),
        }
    }

    /// Folds an arithmetic operator. `None` when the result is not a
    /// constant: comparisons, division by zero, or `i128` overflow.
    pub fn fold(operator: BinaryOperator, left: ConstValue, right: ConstValue) -> Option<ConstValue> {
        match (left, right) {
            (ConstValue::Int(a), ConstValue::Int(b)) => match operator {
                BinaryOperator::Add => a.checked_add(b).map(ConstValue::Int),
                BinaryOperator::Subtract => a.checked_sub(b).map(ConstValue::Int),
                BinaryOperator::Multiply => a.checked_mul(b).map(ConstValue::Int),
                BinaryOperator::IntDivide => a.checked_div(b).map(ConstValue::Int),
                BinaryOperator::Modulo => a.checked_rem(b).map(ConstValue::Int),
                BinaryOperator::Divide if b != 0 => Some(ConstValue::Float(a as f64 / b as f64)),
                _ => None,
            },
            (left, right) => {
                let (a, b) = (left.as_f64(), right.as_f64());
                let result = match operator {
                    BinaryOperator::Add => a + b,
                    BinaryOperator::Subtract => a - b,
                    BinaryOperator::Multiply => a * b,
                    BinaryOperator::Divide if b != 0.0 => a / b,
                    _ => return None,
                };
                Some(ConstValue::Float(result))
            }
        }
    }
}

impl From<NumberLiteral> for ConstValue {
    fn from(literal: NumberLiteral) -> Self {
        match literal {
            NumberLiteral::Int(value) => ConstValue::Int(value),
            NumberLiteral::Float(value) => ConstValue::Float(value),
        }
    }
}

impl Display for ConstValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConstValue::Int(value) => write!(f, "{}", value),
            ConstValue::Float(value) => write!(f, "{}", value),
        }
    }
}
