//! `for` loops, as statements and as array-producing expressions.

use crate::{
    ast::{ast::Expr, expressions::ForExpr},
    errors::errors::ErrorImpl,
    Span,
};

use super::{
    coercion::coerce,
    context::TypeContext,
    environment::{Symbol, SymbolTable},
    type_checker::{Frame, FrameGuard, LoopContext, ScopeGuard, TypeChecker},
    types::{Dimension, Type},
};

impl TypeChecker {
    /// The type of the loop variable: the iterable's element type, or the
    /// annotation when one is written and the element fits it.
    fn infer_loop_variable(&mut self, for_expr: &ForExpr) -> Type {
        let iterable = self.resolve(&for_expr.iterable, TypeContext::permissive());

        let element = if iterable.is_unknown() {
            Type::Unknown
        } else {
            match iterable.iteration_element() {
                Some(element) => element,
                None => {
                    self.report(
                        ErrorImpl::NotIterable {
                            type_: iterable.to_string(),
                        },
                        &for_expr.iterable.span,
                        Some(for_expr.iterable.id),
                    );
                    Type::Unknown
                }
            }
        };

        let Some(annotation) = &for_expr.explicit_type else {
            return element;
        };
        let annotated = self.resolve_annotation(annotation);

        let outcome = coerce(&element, Some(&annotated));
        let settled = self.settle(
            outcome,
            &element,
            &annotated,
            &for_expr.iterable.span,
            Some(for_expr.iterable.id),
            None,
        );

        if settled.is_unknown() {
            annotated
        } else {
            settled
        }
    }

    /// Checks the loop body in a scope holding the loop variable.
    ///
    /// `element_target` is the target of every value the body produces; a
    /// statement loop has none.
    fn check_loop_body(
        &mut self,
        for_expr: &ForExpr,
        span: &Span,
        variable: Type,
        element_target: Option<Type>,
    ) {
        self.check_duplicate_label(for_expr.label.as_deref(), span);

        let frame = Frame::Loop(LoopContext {
            label: for_expr.label.clone(),
            is_expression: element_target.is_some(),
            element_target: element_target.clone(),
            variable: Some((for_expr.variable.clone(), variable.clone())),
        });
        let mut framed = FrameGuard::new(self, frame);
        let mut checker = ScopeGuard::new(&mut framed);

        log::trace!("loop variable {} : {}", for_expr.variable, variable);
        if for_expr.variable != "_" {
            let declared = checker
                .scopes
                .declare(&for_expr.variable, Symbol::new(variable, false));
            debug_assert!(declared.is_ok(), "loop scope already held {}", for_expr.variable);
        }

        checker.check_body_with_tail(&for_expr.body, element_target);
    }

    pub(super) fn check_for_stmt(&mut self, for_stmt: &ForExpr, span: &Span) {
        let variable = self.infer_loop_variable(for_stmt);
        self.check_loop_body(for_stmt, span, variable, None);
    }

    /// Resolves a `for` used as a value against the array type it builds.
    ///
    /// The target's outer dimension is peeled off for the body, so a loop
    /// nested in the body builds the next dimension down.
    pub(super) fn resolve_for_expr(
        &mut self,
        expr: &Expr,
        for_expr: &ForExpr,
        target: Option<Type>,
    ) -> Type {
        let variable = self.infer_loop_variable(for_expr);

        let Some(target) = target else {
            self.check_loop_body(for_expr, &expr.span, variable, None);
            return Type::Void;
        };

        let iterable = self.node_types.get(&for_expr.iterable.id).cloned();
        if matches!(&iterable, Some(iterable) if !iterable.is_bounded_iterable()) {
            self.report(ErrorImpl::UnboundedLoopExpression, &for_expr.iterable.span, Some(for_expr.iterable.id));
            self.check_loop_body(for_expr, &expr.span, variable, Some(Type::Unknown));
            return Type::Unknown;
        }

        let element_target = if target.is_unknown() {
            Type::Unknown
        } else {
            match target.array_parts() {
                Some((_, dims)) if dims[0] != Dimension::Inferred => {
                    // Filtering and early exits make the length a runtime value.
                    self.report(
                        ErrorImpl::DimensionMismatch {
                            expected: target.to_string(),
                            received: format!("{} produced by a loop", Dimension::Inferred),
                        },
                        &expr.span,
                        Some(expr.id),
                    );
                    Type::Unknown
                }
                Some(_) => target.peel().unwrap_or(Type::Unknown),
                None => {
                    self.report(
                        ErrorImpl::TypeMatchError {
                            expected: target.to_string(),
                            received: String::from("array produced by a loop"),
                        },
                        &expr.span,
                        Some(expr.id),
                    );
                    Type::Unknown
                }
            }
        };

        log::debug!(
            "loop expression over {} builds {}",
            for_expr.variable,
            target
        );

        self.check_loop_body(for_expr, &expr.span, variable, Some(element_target.clone()));

        if element_target.is_unknown() {
            return Type::Unknown;
        }
        Type::wrap(element_target, Dimension::Inferred)
    }
}
