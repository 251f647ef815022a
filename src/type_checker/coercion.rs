//! Implicit coercion between types.
//!
//! Rules, highest priority first:
//! 1. comptime with comptime stays comptime (any float makes it a float);
//! 2. comptime with concrete adapts to the concrete type when representable;
//!    a comptime float never becomes an integer implicitly;
//! 3. two different concrete numeric types need an explicit conversion, any
//!    other pair of different concrete types is incompatible;
//! 4. identical concrete types are the identity.
//!
//! Arrays coerce element-wise after their dimensions are matched.

use super::{
    literals::ConstValue,
    types::{Dimension, ScalarKind, Type},
};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Resolved(Type),
    RequiresExplicitConversion,
    Incompatible,
    DimensionMismatch,
    /// Only produced by `coerce_value`, when a known constant does not fit.
    LiteralOutOfRange,
}

impl Outcome {
    pub fn resolved(self) -> Option<Type> {
        match self {
            Outcome::Resolved(ty) => Some(ty),
            _ => None,
        }
    }
}

fn widest_comptime(left: &Type, right: &Type) -> Type {
    if matches!(left, Type::ComptimeFloat) || matches!(right, Type::ComptimeFloat) {
        Type::ComptimeFloat
    } else {
        Type::ComptimeInt
    }
}

/// Coerces a value of type `from` into the slot `to`.
///
/// With no target the type is kept as is. `Unknown` on either side is never
/// compatible; callers suppress the report in that case.
pub fn coerce(from: &Type, to: Option<&Type>) -> Outcome {
    let Some(to) = to else {
        return Outcome::Resolved(from.clone());
    };

    if from.is_unknown() || to.is_unknown() {
        return Outcome::Incompatible;
    }

    match (from, to) {
        (from, to) if from.is_comptime_scalar() && to.is_comptime_scalar() => {
            Outcome::Resolved(widest_comptime(from, to))
        }

        (Type::ComptimeInt, Type::Scalar(kind)) if kind.is_numeric() => Outcome::Resolved(to.clone()),
        (Type::ComptimeFloat, Type::Scalar(kind)) if kind.is_float() => Outcome::Resolved(to.clone()),
        (Type::ComptimeFloat, Type::Scalar(kind)) if kind.is_integer() => {
            Outcome::RequiresExplicitConversion
        }
        (Type::ComptimeInt | Type::ComptimeFloat, _) => Outcome::Incompatible,
        // A concrete value offered to a comptime slot keeps its concrete type.
        (Type::Scalar(_), Type::ComptimeInt | Type::ComptimeFloat) => coerce(to, Some(from)),

        (Type::Array { .. } | Type::ComptimeArray { .. }, Type::Array { .. } | Type::ComptimeArray { .. }) => {
            coerce_array(from, to)
        }

        (
            Type::Range { element, has_start, has_end },
            Type::Range { element: target, .. },
        ) => match coerce(element, Some(target.as_ref())) {
            Outcome::Resolved(element) => Outcome::Resolved(Type::Range {
                element: Box::new(element),
                has_start: *has_start,
                has_end: *has_end,
            }),
            other => other,
        },

        (Type::Scalar(a), Type::Scalar(b)) if a == b => Outcome::Resolved(to.clone()),
        (Type::Scalar(a), Type::Scalar(b)) if a.is_numeric() && b.is_numeric() => {
            Outcome::RequiresExplicitConversion
        }
        (Type::Void, Type::Void) => Outcome::Resolved(Type::Void),
        _ => Outcome::Incompatible,
    }
}

/// Matches source dimensions against target dimensions.
///
/// An inferred target dimension adopts the source's; a fixed one must equal a
/// fixed source length.
fn match_dimensions(from: &[Dimension], to: &[Dimension]) -> Option<Vec<Dimension>> {
    if from.len() != to.len() {
        return None;
    }

    from.iter()
        .zip(to)
        .map(|(source, target)| match (source, target) {
            (_, Dimension::Inferred) => Some(*source),
            (Dimension::Fixed(a), Dimension::Fixed(b)) if a == b => Some(*target),
            _ => None,
        })
        .collect()
}

fn coerce_array(from: &Type, to: &Type) -> Outcome {
    let (Some((from_element, from_dims)), Some((to_element, to_dims))) =
        (from.array_parts(), to.array_parts())
    else {
        return Outcome::Incompatible;
    };

    let Some(dims) = match_dimensions(from_dims, to_dims) else {
        return Outcome::DimensionMismatch;
    };

    match coerce(from_element, Some(to_element)) {
        Outcome::Resolved(element) if element.is_comptime_scalar() => {
            Outcome::Resolved(Type::comptime_array(element, dims))
        }
        Outcome::Resolved(element) => Outcome::Resolved(Type::array(element, dims)),
        other => other,
    }
}

/// Like `coerce`, but also rejects a known comptime constant that does not
/// fit the concrete scalar it resolves to.
pub fn coerce_value(from: &Type, to: Option<&Type>, value: Option<ConstValue>) -> Outcome {
    let values: Vec<ConstValue> = value.into_iter().collect();
    coerce_values(from, to, &values).0
}

/// Coerces a comptime scalar or array whose possible constants are known.
///
/// Every constant must fit the concrete kind the value resolves to; the
/// first one that does not is returned with `LiteralOutOfRange`.
pub fn coerce_values(
    from: &Type,
    to: Option<&Type>,
    values: &[ConstValue],
) -> (Outcome, Option<ConstValue>) {
    let outcome = coerce(from, to);

    if let Outcome::Resolved(resolved) = &outcome {
        if let Some(kind) = materialized_kind(from, resolved) {
            if let Some(misfit) = values.iter().find(|value| !value.fits(kind)) {
                return (Outcome::LiteralOutOfRange, Some(*misfit));
            }
        }
    }

    (outcome, None)
}

/// The concrete scalar kind a comptime value's constants end up in.
fn materialized_kind(from: &Type, resolved: &Type) -> Option<ScalarKind> {
    match (from, resolved) {
        (from, Type::Scalar(kind)) if from.is_comptime_scalar() => Some(*kind),
        (Type::ComptimeArray { .. }, Type::Array { element, .. }) => match element.as_ref() {
            Type::Scalar(kind) => Some(*kind),
            _ => None,
        },
        _ => None,
    }
}

/// Merges the dimensions of two values that flow into the same place: equal
/// lengths are kept, anything else becomes inferred.
pub fn join_dimensions(left: &[Dimension], right: &[Dimension]) -> Vec<Dimension> {
    left.iter()
        .zip(right)
        .map(|(a, b)| if a == b { *a } else { Dimension::Inferred })
        .collect()
}

/// The type of a place fed by two values already resolved against the same
/// target, such as the branches of a conditional.
///
/// Arrays of the same rank keep only the lengths both agree on. `Unknown`
/// gives way to the other side.
pub fn join(left: &Type, right: &Type) -> Type {
    if left.is_unknown() {
        return right.clone();
    }

    match (left, right) {
        (Type::Array { element, dims }, Type::Array { dims: other, .. }) if dims.len() == other.len() => {
            Type::array(element.as_ref().clone(), join_dimensions(dims, other))
        }
        (
            Type::ComptimeArray { element, dims },
            Type::ComptimeArray { dims: other, .. },
        ) if dims.len() == other.len() => {
            Type::comptime_array(element.as_ref().clone(), join_dimensions(dims, other))
        }
        _ => left.clone(),
    }
}

fn unify_dimensions(left: &[Dimension], right: &[Dimension]) -> Option<Vec<Dimension>> {
    if left.len() != right.len() {
        return None;
    }

    left.iter()
        .zip(right)
        .map(|(a, b)| match (a, b) {
            (Dimension::Fixed(x), Dimension::Fixed(y)) if x == y => Some(*a),
            (Dimension::Fixed(_), Dimension::Fixed(_)) => None,
            _ => Some(Dimension::Inferred),
        })
        .collect()
}

/// The common type of two operands, independent of their order.
pub fn unify(left: &Type, right: &Type) -> Outcome {
    if left.is_unknown() || right.is_unknown() {
        return Outcome::Incompatible;
    }

    match (left, right) {
        (a, b) if a.is_comptime_scalar() && b.is_comptime_scalar() => {
            Outcome::Resolved(widest_comptime(a, b))
        }
        (a, b) if a.is_comptime_scalar() => coerce(a, Some(b)),
        (a, b) if b.is_comptime_scalar() => coerce(b, Some(a)),

        (a, b) if a.is_array() && b.is_array() => {
            let (Some((a, a_dims)), Some((b, b_dims))) = (a.array_parts(), b.array_parts()) else {
                return Outcome::Incompatible;
            };
            let Some(dims) = unify_dimensions(a_dims, b_dims) else {
                return Outcome::DimensionMismatch;
            };
            match unify(a, b) {
                Outcome::Resolved(element) if element.is_comptime_scalar() => {
                    Outcome::Resolved(Type::comptime_array(element, dims))
                }
                Outcome::Resolved(element) => Outcome::Resolved(Type::array(element, dims)),
                other => other,
            }
        }

        _ => coerce(left, Some(right)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_checker::types::ScalarKind;

    fn i32_() -> Type {
        Type::Scalar(ScalarKind::I32)
    }

    #[test]
    fn test_comptime_int_adapts_to_any_numeric() {
        for kind in ScalarKind::ALL.iter().filter(|kind| kind.is_numeric()) {
            assert_eq!(
                coerce(&Type::ComptimeInt, Some(&Type::Scalar(*kind))),
                Outcome::Resolved(Type::Scalar(*kind))
            );
        }
    }

    #[test]
    fn test_comptime_float_into_integer_needs_conversion() {
        assert_eq!(
            coerce(&Type::ComptimeFloat, Some(&i32_())),
            Outcome::RequiresExplicitConversion
        );
    }

    #[test]
    fn test_comptime_into_bool_is_incompatible() {
        assert_eq!(coerce(&Type::ComptimeInt, Some(&Type::bool())), Outcome::Incompatible);
    }

    #[test]
    fn test_different_concrete_numerics_need_conversion() {
        let i64_ = Type::Scalar(ScalarKind::I64);
        assert_eq!(coerce(&i32_(), Some(&i64_)), Outcome::RequiresExplicitConversion);
        assert_eq!(
            coerce(&i32_(), Some(&Type::Scalar(ScalarKind::String))),
            Outcome::Incompatible
        );
    }

    #[test]
    fn test_unknown_never_matches() {
        assert_eq!(coerce(&Type::Unknown, Some(&Type::Unknown)), Outcome::Incompatible);
        assert_eq!(unify(&i32_(), &Type::Unknown), Outcome::Incompatible);
    }

    #[test]
    fn test_inferred_dimension_adopts_source_length() {
        let literal = Type::comptime_array(Type::ComptimeInt, vec![Dimension::Fixed(3)]);
        let target = Type::array(Type::Scalar(ScalarKind::I64), vec![Dimension::Inferred]);

        assert_eq!(
            coerce(&literal, Some(&target)),
            Outcome::Resolved(Type::array(
                Type::Scalar(ScalarKind::I64),
                vec![Dimension::Fixed(3)]
            ))
        );
    }

    #[test]
    fn test_fixed_dimension_must_match() {
        let literal = Type::comptime_array(Type::ComptimeInt, vec![Dimension::Fixed(3)]);
        let target = Type::array(i32_(), vec![Dimension::Fixed(2)]);
        assert_eq!(coerce(&literal, Some(&target)), Outcome::DimensionMismatch);

        let runtime = Type::array(i32_(), vec![Dimension::Inferred]);
        assert_eq!(coerce(&runtime, Some(&target)), Outcome::DimensionMismatch);
    }

    #[test]
    fn test_rank_must_match() {
        let matrix = Type::array(i32_(), vec![Dimension::Fixed(2), Dimension::Fixed(2)]);
        let vector = Type::array(i32_(), vec![Dimension::Fixed(2)]);
        assert_eq!(coerce(&matrix, Some(&vector)), Outcome::DimensionMismatch);
    }

    #[test]
    fn test_coerce_value_rejects_out_of_range_constants() {
        let i8_ = Type::Scalar(ScalarKind::I8);
        assert_eq!(
            coerce_value(&Type::ComptimeInt, Some(&i8_), Some(ConstValue::Int(300))),
            Outcome::LiteralOutOfRange
        );
        assert_eq!(
            coerce_value(&Type::ComptimeInt, Some(&i8_), Some(ConstValue::Int(-128))),
            Outcome::Resolved(i8_)
        );
    }

    #[test]
    fn test_unify_concrete_with_comptime() {
        assert_eq!(unify(&Type::ComptimeInt, &i32_()), Outcome::Resolved(i32_()));
        assert_eq!(unify(&i32_(), &Type::ComptimeInt), Outcome::Resolved(i32_()));
        assert_eq!(
            unify(&i32_(), &Type::ComptimeFloat),
            Outcome::RequiresExplicitConversion
        );
    }

    #[test]
    fn test_comptime_array_constants_are_range_checked() {
        let literal = Type::comptime_array(Type::ComptimeInt, vec![Dimension::Fixed(2)]);
        let target = Type::array(Type::Scalar(ScalarKind::I8), vec![Dimension::Inferred]);
        let values = [ConstValue::Int(300), ConstValue::Int(1)];

        assert_eq!(
            coerce_values(&literal, Some(&target), &values),
            (Outcome::LiteralOutOfRange, Some(ConstValue::Int(300)))
        );

        let wide = Type::array(Type::Scalar(ScalarKind::I16), vec![Dimension::Inferred]);
        assert_eq!(
            coerce_values(&literal, Some(&wide), &values),
            (
                Outcome::Resolved(Type::array(
                    Type::Scalar(ScalarKind::I16),
                    vec![Dimension::Fixed(2)]
                )),
                None
            )
        );
    }

    #[test]
    fn test_join_infers_disagreeing_lengths() {
        let three = Type::array(i32_(), vec![Dimension::Fixed(3)]);
        let four = Type::array(i32_(), vec![Dimension::Fixed(4)]);

        assert_eq!(join(&three, &three), three);
        assert_eq!(join(&three, &four), Type::array(i32_(), vec![Dimension::Inferred]));
        assert_eq!(join(&Type::Unknown, &four), four);
        assert_eq!(join(&i32_(), &Type::Unknown), i32_());
    }

    #[test]
    fn test_unify_mixed_array_flavours() {
        let literal = Type::comptime_array(Type::ComptimeInt, vec![Dimension::Fixed(2)]);
        let slice = Type::array(i32_(), vec![Dimension::Inferred]);
        let expected = Outcome::Resolved(Type::array(i32_(), vec![Dimension::Inferred]));

        assert_eq!(unify(&literal, &slice), expected);
        assert_eq!(unify(&slice, &literal), expected);
    }
}
