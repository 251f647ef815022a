//! Array literals, indexing, slicing, `.length` and ranges.

use crate::{
    ast::{
        ast::{Expr, ExprKind},
        expressions::{ArrayLiteralExpr, IndexExpr, MemberExpr, RangeExpr},
    },
    errors::errors::ErrorImpl,
};

use super::{
    coercion::{join_dimensions, unify, Outcome},
    context::TypeContext,
    literals::ConstValue,
    type_checker::TypeChecker,
    types::{Dimension, ScalarKind, Type},
};

/// First place where sibling rows of a nested literal disagree in length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ragged {
    pub row: usize,
    pub expected: usize,
    pub received: usize,
}

/// The lengths of a literal at each nesting depth, outermost first.
///
/// Non-literal elements have no known shape; rows are only compared where
/// both shapes are known, down to the shallower of the two.
pub fn literal_shape(expr: &Expr) -> Result<Option<Vec<usize>>, Ragged> {
    let ExprKind::ArrayLiteral(literal) = &expr.kind else {
        return Ok(None);
    };

    let mut rows = Vec::with_capacity(literal.elements.len());
    for element in &literal.elements {
        rows.push(literal_shape(element)?);
    }

    let mut shape = vec![literal.elements.len()];
    let Some(first) = rows.first().cloned().flatten() else {
        return Ok(Some(shape));
    };

    for (row, candidate) in rows.iter().enumerate().skip(1) {
        let Some(candidate) = candidate else {
            continue;
        };

        if let Some((expected, received)) = first
            .iter()
            .zip(candidate)
            .find(|(expected, received)| expected != received)
        {
            return Err(Ragged {
                row,
                expected: *expected,
                received: *received,
            });
        }
    }

    shape.extend(first);
    Ok(Some(shape))
}

/// The nesting depth of a literal whose innermost elements are plain
/// literals; `None` when a leaf is any other expression.
fn literal_rank(expr: &Expr) -> Option<usize> {
    match &expr.kind {
        ExprKind::ArrayLiteral(literal) => match literal.elements.first() {
            Some(first) => literal_rank(first).map(|rank| rank + 1),
            None => None,
        },
        ExprKind::Number(_) | ExprKind::String(_) | ExprKind::Bool(_) => Some(0),
        _ => None,
    }
}

/// Checks the resolved rows of a literal against each other.
///
/// Every fixed length is compared with the first fixed length seen at the
/// same depth. The rows' common dimensions keep a length only where all rows
/// agree on it; a row whose length is known only at runtime makes it
/// inferred.
fn row_dimensions(rows: &[(usize, Type)]) -> Result<Option<Vec<Dimension>>, Ragged> {
    let mut common: Option<Vec<Dimension>> = None;
    let mut lengths: Vec<Option<usize>> = vec![];

    for (row, ty) in rows {
        let Some((_, dims)) = ty.array_parts() else {
            continue;
        };

        if lengths.len() < dims.len() {
            lengths.resize(dims.len(), None);
        }
        for (depth, dim) in dims.iter().enumerate() {
            let Dimension::Fixed(received) = *dim else {
                continue;
            };
            match lengths[depth] {
                Some(expected) if expected != received => {
                    return Err(Ragged {
                        row: *row,
                        expected,
                        received,
                    })
                }
                Some(_) => {}
                None => lengths[depth] = Some(received),
            }
        }

        common = Some(match common {
            Some(previous) => join_dimensions(&previous, dims),
            None => dims.to_vec(),
        });
    }

    Ok(common)
}

impl TypeChecker {
    fn report_ragged(&mut self, ragged: Ragged, expr: &Expr) {
        self.report(
            ErrorImpl::RaggedArray {
                row: ragged.row,
                expected: ragged.expected,
                received: ragged.received,
            },
            &expr.span,
            Some(expr.id),
        );
    }

    pub(super) fn resolve_array_literal(
        &mut self,
        expr: &Expr,
        literal: &ArrayLiteralExpr,
        ctx: &TypeContext,
    ) -> Type {
        let shape = match literal_shape(expr) {
            Ok(shape) => shape.unwrap_or_default(),
            Err(ragged) => {
                self.report_ragged(ragged, expr);
                return Type::Unknown;
            }
        };

        if literal.elements.is_empty() {
            return self.resolve_empty_array(expr, ctx);
        }

        let array_target = ctx
            .target()
            .filter(|target| target.is_array())
            .cloned();

        let Some(target) = array_target else {
            let ty = self.fold_elements(expr, literal);
            if ty.is_unknown() {
                return ty;
            }
            return self.fit(expr, ty, ctx);
        };

        let Some((_, target_dims)) = target.array_parts() else {
            return Type::Unknown;
        };

        if let Some(rank) = literal_rank(expr) {
            if rank != target_dims.len() {
                self.report(
                    ErrorImpl::RankMismatch {
                        expected: target_dims.len(),
                        received: rank,
                    },
                    &expr.span,
                    Some(expr.id),
                );
                return Type::Unknown;
            }
        }

        // Compare the literal's known lengths with the target once, up front.
        for (depth, (expected, received)) in target_dims.iter().zip(&shape).enumerate() {
            if let Dimension::Fixed(expected) = expected {
                if expected != received {
                    let error = if depth == 0 {
                        ErrorImpl::DimensionMismatch {
                            expected: format!("{} elements", expected),
                            received: format!("{} elements", received),
                        }
                    } else {
                        ErrorImpl::DimensionMismatch {
                            expected: format!("{} elements at depth {}", expected, depth + 1),
                            received: format!("{} elements", received),
                        }
                    };
                    self.report(error, &expr.span, Some(expr.id));
                    return Type::Unknown;
                }
            }
        }

        let Some(element_target) = target.peel() else {
            return Type::Unknown;
        };

        let mut rows = vec![];
        for (row, element) in literal.elements.iter().enumerate() {
            let ty = self.resolve(element, TypeContext::expecting(element_target.clone()));
            if !ty.is_unknown() {
                rows.push((row, ty));
            }
        }

        // Rows that are not literals only show their lengths once resolved.
        let dims = match row_dimensions(&rows) {
            Ok(dims) => dims,
            Err(ragged) => {
                self.report_ragged(ragged, expr);
                return Type::Unknown;
            }
        };

        let Some((_, first)) = rows.first() else {
            return Type::Unknown;
        };
        let element = match (first, dims) {
            (Type::Array { element, .. }, Some(dims)) => Type::array(element.as_ref().clone(), dims),
            (Type::ComptimeArray { element, .. }, Some(dims)) => {
                Type::comptime_array(element.as_ref().clone(), dims)
            }
            (first, _) => first.clone(),
        };
        Type::wrap(element, Dimension::Fixed(literal.elements.len()))
    }

    /// Folds the natural types of the elements into their common type.
    fn fold_elements(&mut self, expr: &Expr, literal: &ArrayLiteralExpr) -> Type {
        let mut rows = Vec::with_capacity(literal.elements.len());
        for (row, element) in literal.elements.iter().enumerate() {
            let ty = self.resolve(element, TypeContext::permissive());
            if ty.is_unknown() {
                return Type::Unknown;
            }
            rows.push((row, ty));
        }

        if let Err(ragged) = row_dimensions(&rows) {
            self.report_ragged(ragged, expr);
            return Type::Unknown;
        }

        let mut common: Option<Type> = None;
        for (element, (_, ty)) in literal.elements.iter().zip(rows) {
            common = Some(match common {
                None => ty,
                Some(previous) => match unify(&previous, &ty) {
                    Outcome::Resolved(unified) => unified,
                    outcome => {
                        return self.settle(
                            outcome,
                            &ty,
                            &previous,
                            &element.span,
                            Some(element.id),
                            None,
                        )
                    }
                },
            });
        }

        match common {
            Some(element) => Type::wrap(element, Dimension::Fixed(literal.elements.len())),
            None => Type::Unknown,
        }
    }

    fn resolve_empty_array(&mut self, expr: &Expr, ctx: &TypeContext) -> Type {
        match ctx.target() {
            Some(target) if target.is_unknown() => Type::Unknown,
            Some(target) => match target.array_parts() {
                Some((element, dims)) => match dims[0] {
                    Dimension::Fixed(0) | Dimension::Inferred => {
                        let mut dims = dims.to_vec();
                        dims[0] = Dimension::Fixed(0);
                        Type::array(element.clone(), dims)
                    }
                    Dimension::Fixed(expected) => {
                        self.report(
                            ErrorImpl::DimensionMismatch {
                                expected: format!("{} elements", expected),
                                received: String::from("0 elements"),
                            },
                            &expr.span,
                            Some(expr.id),
                        );
                        Type::Unknown
                    }
                },
                None => {
                    let target = target.to_string();
                    self.report(
                        ErrorImpl::TypeMatchError {
                            expected: target,
                            received: String::from("[0]array"),
                        },
                        &expr.span,
                        Some(expr.id),
                    );
                    Type::Unknown
                }
            },
            None => {
                self.report(ErrorImpl::EmptyArrayLiteral, &expr.span, Some(expr.id));
                Type::Unknown
            }
        }
    }

    /// Element access, slicing (`a[i..j]`) and copying (`a[..]`).
    pub(super) fn resolve_index(&mut self, expr: &Expr, index: &IndexExpr, ctx: &TypeContext) -> Type {
        let array = self.resolve(&index.array, TypeContext::permissive());
        if array.is_unknown() {
            return array;
        }

        let Some((_, dims)) = array.array_parts() else {
            self.report(
                ErrorImpl::NotIndexable {
                    type_: array.to_string(),
                },
                &index.array.span,
                Some(index.array.id),
            );
            return Type::Unknown;
        };
        let outer = dims[0];

        if let ExprKind::Range(range) = &index.index.kind {
            let bounds = self.resolve(&index.index, TypeContext::permissive());
            if bounds.is_unknown() {
                return bounds;
            }
            if let Type::Range { element, .. } = &bounds {
                if !element.is_integer() {
                    self.report(
                        ErrorImpl::TypeMatchError {
                            expected: String::from("integer range"),
                            received: bounds.to_string(),
                        },
                        &index.index.span,
                        Some(index.index.id),
                    );
                    return Type::Unknown;
                }
            }

            let ty = if range.start.is_none() && range.end.is_none() {
                // Copy
                array.clone()
            } else {
                let limits = [(&range.start, true), (&range.end, !range.inclusive)];
                for (bound, may_equal_length) in limits {
                    let Some(bound) = bound else {
                        continue;
                    };
                    if !self.check_constant_index(bound, outer, may_equal_length) {
                        return Type::Unknown;
                    }
                }
                let mut sliced = array.clone();
                if let Type::Array { dims, .. } | Type::ComptimeArray { dims, .. } = &mut sliced {
                    dims[0] = Dimension::Inferred;
                }
                sliced
            };
            return self.fit(expr, ty, ctx);
        }

        let position = self.resolve(&index.index, TypeContext::permissive());
        if position.is_unknown() {
            return position;
        }
        if !position.is_integer() {
            self.report(
                ErrorImpl::TypeMatchError {
                    expected: String::from("integer index"),
                    received: position.to_string(),
                },
                &index.index.span,
                Some(index.index.id),
            );
            return Type::Unknown;
        }

        if !self.check_constant_index(&index.index, outer, false) {
            return Type::Unknown;
        }

        match array.peel() {
            Some(element) => self.fit(expr, element, ctx),
            None => Type::Unknown,
        }
    }

    /// Reports a constant index outside `dimension`. An exclusive slice bound
    /// may equal the length.
    fn check_constant_index(&mut self, index: &Expr, dimension: Dimension, may_equal_length: bool) -> bool {
        let Some(ConstValue::Int(value)) = self.constant_of(index) else {
            return true;
        };

        let length = match dimension {
            Dimension::Fixed(length) => Some(length),
            Dimension::Inferred => None,
        };

        let out_of_bounds = value < 0
            || length.is_some_and(|length| {
                let length = length as i128;
                if may_equal_length {
                    value > length
                } else {
                    value >= length
                }
            });

        if out_of_bounds {
            self.report(
                ErrorImpl::IndexOutOfBounds {
                    index: value,
                    length: length.unwrap_or(0),
                },
                &index.span,
                Some(index.id),
            );
        }

        !out_of_bounds
    }

    pub(super) fn resolve_member(&mut self, expr: &Expr, member: &MemberExpr, ctx: &TypeContext) -> Type {
        let object = self.resolve(&member.object, TypeContext::permissive());
        if object.is_unknown() {
            return object;
        }

        if member.property == "length" && object.is_array() {
            return self.fit(expr, Type::Scalar(ScalarKind::I64), ctx);
        }

        self.report(
            ErrorImpl::UnknownProperty {
                property: member.property.clone(),
                type_: object.to_string(),
            },
            &expr.span,
            Some(expr.id),
        );
        Type::Unknown
    }

    pub(super) fn resolve_range(&mut self, expr: &Expr, range: &RangeExpr, ctx: &TypeContext) -> Type {
        let mut element: Option<Type> = None;

        for bound in [&range.start, &range.end].into_iter().flatten() {
            let ty = self.resolve(bound, TypeContext::permissive());
            if ty.is_unknown() {
                return ty;
            }
            if !ty.is_numeric() {
                self.report(
                    ErrorImpl::InvalidOperand {
                        operator: String::from(".."),
                        operand: ty.to_string(),
                    },
                    &bound.span,
                    Some(bound.id),
                );
                return Type::Unknown;
            }

            element = Some(match element {
                None => ty,
                Some(previous) => match unify(&previous, &ty) {
                    Outcome::Resolved(unified) => unified,
                    outcome => {
                        return self.settle(outcome, &ty, &previous, &bound.span, Some(bound.id), None)
                    }
                },
            });
        }

        let ty = Type::Range {
            element: Box::new(element.unwrap_or(Type::ComptimeInt)),
            has_start: range.start.is_some(),
            has_end: range.end.is_some(),
        };
        self.fit(expr, ty, ctx)
    }
}
