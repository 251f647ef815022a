//! Expression resolution.
//!
//! `resolve` is the single recursive entry point: it takes an expression and
//! the context it appears in, returns its type, records it against the node
//! and reports anything wrong on the way. Array and loop expressions are
//! delegated to `arrays` and `loops`.

use crate::{
    ast::{
        ast::{Expr, ExprKind},
        expressions::{
            AssignmentExpr, BinaryExpr, BinaryOperator, CallExpr, ConversionExpr, ElseBranch,
            IfExpr, NumberLiteral, PrefixExpr, PrefixOperator,
        },
        statements::BlockStmt,
    },
    errors::errors::ErrorImpl,
};

use super::{
    classifier::describe_construct,
    coercion::{coerce, coerce_value, coerce_values, join, unify, Outcome},
    context::TypeContext,
    environment::SymbolTable,
    literals::ConstValue,
    type_checker::TypeChecker,
    types::{Dimension, ScalarKind, Type},
};

impl TypeChecker {
    pub fn resolve(&mut self, expr: &Expr, ctx: TypeContext) -> Type {
        let ty = match &expr.kind {
            ExprKind::Number(number) => {
                let ty = match number.value {
                    NumberLiteral::Int(_) => Type::ComptimeInt,
                    NumberLiteral::Float(_) => Type::ComptimeFloat,
                };
                self.fit(expr, ty, &ctx)
            }
            ExprKind::String(_) => self.fit(expr, Type::Scalar(ScalarKind::String), &ctx),
            ExprKind::Bool(_) => self.fit(expr, Type::bool(), &ctx),
            ExprKind::Undef => {
                let expected = ctx
                    .target()
                    .map(|target| target.to_string())
                    .unwrap_or_else(|| String::from("a value"));
                self.report(
                    ErrorImpl::TypeMatchError {
                        expected,
                        received: String::from("undef"),
                    },
                    &expr.span,
                    Some(expr.id),
                );
                Type::Unknown
            }
            ExprKind::Symbol(symbol) => match self.scopes.lookup(&symbol.value) {
                Some(found) => {
                    let ty = found.ty.clone();
                    self.fit(expr, ty, &ctx)
                }
                None => {
                    self.report(
                        ErrorImpl::VariableNotDeclared {
                            variable: symbol.value.clone(),
                        },
                        &expr.span,
                        Some(expr.id),
                    );
                    Type::Unknown
                }
            },
            ExprKind::Binary(binary) => self.resolve_binary(expr, binary, &ctx),
            ExprKind::Prefix(prefix) => self.resolve_prefix(expr, prefix, &ctx),
            ExprKind::Assignment(assignment) => self.resolve_assignment(expr, assignment, &ctx),
            ExprKind::Call(call) => self.resolve_call(expr, call, &ctx),
            ExprKind::Conversion(conversion) => self.resolve_conversion(expr, conversion, &ctx),
            ExprKind::ArrayLiteral(literal) => self.resolve_array_literal(expr, literal, &ctx),
            ExprKind::Index(index) => self.resolve_index(expr, index, &ctx),
            ExprKind::Member(member) => self.resolve_member(expr, member, &ctx),
            ExprKind::Range(range) => self.resolve_range(expr, range, &ctx),
            ExprKind::Block(block) => {
                let target = self.runtime_target(expr, &ctx);
                self.resolve_block_expr(block, target)
            }
            ExprKind::If(if_expr) => {
                let target = self.runtime_target(expr, &ctx);
                self.resolve_if_expr(expr, if_expr, target)
            }
            ExprKind::For(for_expr) => {
                let target = self.runtime_target(expr, &ctx);
                self.resolve_for_expr(expr, for_expr, target)
            }
        };

        self.node_types.insert(expr.id, ty.clone());
        ty
    }

    /// Fits an expression's natural type into the context's target.
    pub(super) fn fit(&mut self, expr: &Expr, ty: Type, ctx: &TypeContext) -> Type {
        let Some(target) = ctx.target() else {
            return ty;
        };

        let values = if ty.is_comptime() {
            self.constants_of(expr).unwrap_or_default()
        } else {
            vec![]
        };

        let (outcome, misfit) = coerce_values(&ty, Some(target), &values);
        self.settle(outcome, &ty, target, &expr.span, Some(expr.id), misfit)
    }

    /// The comptime value of an expression, when it can be folded.
    pub(super) fn constant_of(&self, expr: &Expr) -> Option<ConstValue> {
        match &expr.kind {
            ExprKind::Number(number) => Some(ConstValue::from(number.value)),
            ExprKind::Symbol(symbol) => self.scopes.lookup(&symbol.value)?.value,
            ExprKind::Prefix(prefix) if prefix.operator == PrefixOperator::Negate => {
                self.constant_of(&prefix.right_expr)?.negate()
            }
            ExprKind::Binary(binary) => ConstValue::fold(
                binary.operator,
                self.constant_of(&binary.left)?,
                self.constant_of(&binary.right)?,
            ),
            _ => None,
        }
    }

    /// Every constant a comptime expression may evaluate to, flattened row by
    /// row for arrays. `None` when any of them cannot be folded.
    ///
    /// Indexing with a constant picks the matching row; any other index keeps
    /// all of the array's constants.
    pub(super) fn constants_of(&self, expr: &Expr) -> Option<Vec<ConstValue>> {
        match &expr.kind {
            ExprKind::Symbol(symbol) => self.scopes.lookup(&symbol.value)?.constants(),
            ExprKind::ArrayLiteral(literal) => {
                let mut values = vec![];
                for element in &literal.elements {
                    values.extend(self.constants_of(element)?);
                }
                Some(values)
            }
            ExprKind::Index(index) => {
                let values = self.constants_of(&index.array)?;
                let outer = self
                    .node_types
                    .get(&index.array.id)
                    .and_then(|ty| ty.array_parts())
                    .map(|(_, dims)| dims[0]);

                let row = match (self.constant_of(&index.index), outer) {
                    (Some(ConstValue::Int(row)), Some(Dimension::Fixed(length)))
                        if length > 0 && values.len() % length == 0 =>
                    {
                        usize::try_from(row)
                            .ok()
                            .filter(|row| *row < length)
                            .map(|row| (row, values.len() / length))
                    }
                    _ => None,
                };

                match row {
                    Some((row, width)) => Some(values[row * width..(row + 1) * width].to_vec()),
                    None => Some(values),
                }
            }
            _ => self.constant_of(expr).map(|value| vec![value]),
        }
    }

    /// The target a runtime construct resolves against.
    ///
    /// Without one, the construct is reported once and resolved against
    /// `Unknown` so nothing inside it reports again.
    fn runtime_target(&mut self, expr: &Expr, ctx: &TypeContext) -> Option<Type> {
        if ctx.lacks_runtime_target() {
            self.report(
                ErrorImpl::MissingExplicitContext {
                    construct: describe_construct(expr).to_string(),
                },
                &expr.span,
                Some(expr.id),
            );
            return Some(Type::Unknown);
        }

        ctx.target().cloned()
    }

    fn invalid_operand(&mut self, operator: &str, operand: &Type, expr: &Expr) -> Type {
        self.report(
            ErrorImpl::InvalidOperand {
                operator: operator.to_string(),
                operand: operand.to_string(),
            },
            &expr.span,
            Some(expr.id),
        );
        Type::Unknown
    }

    /// Records that a comptime operand materializes as `ty`, checking that
    /// its constant fits.
    fn adapt_operand(&mut self, operand: &Expr, natural: &Type, ty: &Type) -> bool {
        if !natural.is_comptime_scalar() || ty.is_comptime() {
            return true;
        }

        let value = self.constant_of(operand);
        let outcome = coerce_value(natural, Some(ty), value);
        let adapted = self.settle(outcome, natural, ty, &operand.span, Some(operand.id), value);
        let ok = !adapted.is_unknown();
        self.node_types.insert(operand.id, adapted);
        ok
    }

    /// The common type of two operands, reported when there is none.
    fn unify_operands(&mut self, binary: &BinaryExpr, left: &Type, right: &Type) -> Type {
        match unify(left, right) {
            Outcome::Resolved(ty) => {
                let left_ok = self.adapt_operand(&binary.left, left, &ty);
                let right_ok = self.adapt_operand(&binary.right, right, &ty);
                if left_ok && right_ok {
                    ty
                } else {
                    Type::Unknown
                }
            }
            outcome => self.settle(outcome, right, left, &binary.right.span, Some(binary.right.id), None),
        }
    }

    fn resolve_binary(&mut self, expr: &Expr, binary: &BinaryExpr, ctx: &TypeContext) -> Type {
        let left = self.resolve(&binary.left, TypeContext::permissive());
        let right = self.resolve(&binary.right, TypeContext::permissive());

        if left.is_unknown() || right.is_unknown() {
            return Type::Unknown;
        }

        let operator = binary.operator;
        let symbol = operator.to_string();

        let ty = if operator.is_logical() {
            for operand in [&left, &right] {
                if *operand != Type::bool() {
                    return self.invalid_operand(&symbol, operand, expr);
                }
            }
            Type::bool()
        } else if operator.is_comparison() {
            let ordering = !matches!(operator, BinaryOperator::Equals | BinaryOperator::NotEquals);
            if ordering {
                for operand in [&left, &right] {
                    if !operand.is_numeric() {
                        return self.invalid_operand(&symbol, operand, expr);
                    }
                }
            }

            if self.unify_operands(binary, &left, &right).is_unknown() {
                return Type::Unknown;
            }
            Type::bool()
        } else {
            let string = Type::Scalar(ScalarKind::String);
            if operator == BinaryOperator::Add && left == string && right == string {
                return self.fit(expr, string, ctx);
            }

            for operand in [&left, &right] {
                if !operand.is_numeric() {
                    return self.invalid_operand(&symbol, operand, expr);
                }
            }

            match operator {
                BinaryOperator::Divide => {
                    for operand in [&left, &right] {
                        if matches!(operand, Type::Scalar(kind) if kind.is_integer()) {
                            return self.invalid_operand(&symbol, operand, expr);
                        }
                    }
                }
                BinaryOperator::IntDivide | BinaryOperator::Modulo => {
                    for operand in [&left, &right] {
                        if !operand.is_integer() {
                            return self.invalid_operand(&symbol, operand, expr);
                        }
                    }
                }
                _ => {}
            }

            let ty = self.unify_operands(binary, &left, &right);
            if operator == BinaryOperator::Divide && ty == Type::ComptimeInt {
                Type::ComptimeFloat
            } else {
                ty
            }
        };

        if ty.is_unknown() {
            return ty;
        }
        self.fit(expr, ty, ctx)
    }

    fn resolve_prefix(&mut self, expr: &Expr, prefix: &PrefixExpr, ctx: &TypeContext) -> Type {
        let operand = self.resolve(&prefix.right_expr, TypeContext::permissive());
        if operand.is_unknown() {
            return operand;
        }

        let valid = match prefix.operator {
            PrefixOperator::Negate => operand.is_numeric(),
            PrefixOperator::Not => operand == Type::bool(),
        };

        if !valid {
            return self.invalid_operand(&prefix.operator.to_string(), &operand, expr);
        }

        self.fit(expr, operand, ctx)
    }

    fn resolve_assignment(
        &mut self,
        expr: &Expr,
        assignment: &AssignmentExpr,
        ctx: &TypeContext,
    ) -> Type {
        let target = match &assignment.assignee.kind {
            ExprKind::Symbol(symbol) => match self.scopes.lookup(&symbol.value) {
                Some(found) if !found.mutable => {
                    self.report(
                        ErrorImpl::ImmutableAssignment {
                            variable: symbol.value.clone(),
                        },
                        &assignment.assignee.span,
                        Some(assignment.assignee.id),
                    );
                    Type::Unknown
                }
                Some(found) => found.ty.clone(),
                None => {
                    self.report(
                        ErrorImpl::VariableNotDeclared {
                            variable: symbol.value.clone(),
                        },
                        &assignment.assignee.span,
                        Some(assignment.assignee.id),
                    );
                    Type::Unknown
                }
            },
            ExprKind::Index(_) => {
                if let Some(root) = root_variable(&assignment.assignee) {
                    if matches!(self.scopes.lookup(root), Some(found) if !found.mutable) {
                        self.report(
                            ErrorImpl::ImmutableAssignment {
                                variable: root.to_string(),
                            },
                            &assignment.assignee.span,
                            Some(assignment.assignee.id),
                        );
                    }
                }
                self.resolve(&assignment.assignee, TypeContext::permissive())
            }
            _ => {
                self.report(
                    ErrorImpl::UnexpectedTokenDetailed {
                        token: String::from("="),
                        message: String::from("left side of an assignment must be a variable or element"),
                    },
                    &expr.span,
                    Some(expr.id),
                );
                Type::Unknown
            }
        };
        self.node_types.insert(assignment.assignee.id, target.clone());

        if let Some(operator) = assignment.operator {
            let invalid = match operator {
                BinaryOperator::Divide => target.is_integer(),
                _ => !target.is_numeric() && !target.is_unknown(),
            };
            if invalid {
                return self.invalid_operand(&format!("{}=", operator), &target, expr);
            }
        }

        self.resolve(&assignment.value, TypeContext::expecting(target));
        self.fit(expr, Type::Void, ctx)
    }

    fn resolve_call(&mut self, expr: &Expr, call: &CallExpr, ctx: &TypeContext) -> Type {
        let Some(signature) = self.scopes.lookup_function(&call.callee).cloned() else {
            self.report(
                ErrorImpl::FunctionNotDeclared {
                    function: call.callee.clone(),
                },
                &expr.span,
                Some(expr.id),
            );
            for argument in &call.arguments {
                self.resolve(argument, TypeContext::discarded());
            }
            return Type::Unknown;
        };

        let expected = signature.parameters.len();
        let received = call.arguments.len();
        if received > expected {
            self.report(
                ErrorImpl::UnexpectedArguments { expected, received },
                &call.arguments[expected].span,
                Some(call.arguments[expected].id),
            );
        } else if received < expected {
            self.report(
                ErrorImpl::MissingArguments { expected, received },
                &expr.span,
                Some(expr.id),
            );
        }

        for (index, argument) in call.arguments.iter().enumerate() {
            match signature.parameters.get(index) {
                Some(parameter) => {
                    self.resolve(argument, TypeContext::expecting(parameter.ty.clone()));
                }
                None => {
                    self.resolve(argument, TypeContext::discarded());
                }
            }
        }

        self.fit(expr, signature.return_type, ctx)
    }

    fn resolve_conversion(
        &mut self,
        expr: &Expr,
        conversion: &ConversionExpr,
        ctx: &TypeContext,
    ) -> Type {
        let target = self.resolve_annotation(&conversion.target);
        let from = self.resolve(&conversion.value, TypeContext::permissive());

        if target.is_unknown() || from.is_unknown() {
            return Type::Unknown;
        }

        let converted = match (&from, &target) {
            (from, to) if from.is_numeric() && to.is_numeric() => Some(target.clone()),
            (from, to) if from.is_array() && to.is_array() => {
                match (from.array_parts(), to.array_parts()) {
                    (Some((from_element, dims)), Some((to_element, _)))
                        if from_element.is_numeric() && to_element.is_numeric() =>
                    {
                        // Only the element converts; the shape must still fit.
                        let relabelled = Type::array(to_element.clone(), dims.to_vec());
                        coerce(&relabelled, Some(to)).resolved()
                    }
                    _ => None,
                }
            }
            (from, to) => coerce(from, Some(to)).resolved(),
        };

        match converted {
            Some(ty) => self.fit(expr, ty, ctx),
            None => {
                self.report(
                    ErrorImpl::InvalidConversion {
                        from: from.to_string(),
                        to: target.to_string(),
                    },
                    &expr.span,
                    Some(expr.id),
                );
                Type::Unknown
            }
        }
    }

    /// Resolves `{ ... }` in expression position; without a target the
    /// value is discarded and the block is only checked.
    fn resolve_block_expr(&mut self, block: &BlockStmt, target: Option<Type>) -> Type {
        match target {
            Some(target) => self.check_value_block(block, target),
            None => {
                self.check_block(block);
                Type::Void
            }
        }
    }

    fn resolve_if_expr(&mut self, expr: &Expr, if_expr: &IfExpr, target: Option<Type>) -> Type {
        self.resolve(&if_expr.condition, TypeContext::expecting(Type::bool()));

        let Some(target) = target else {
            self.check_block(&if_expr.then_body);
            match &if_expr.else_body {
                Some(ElseBranch::If(nested)) => {
                    self.resolve_if_expr(expr, nested, None);
                }
                Some(ElseBranch::Block(block)) => self.check_block(block),
                None => {}
            }
            return Type::Void;
        };

        let result = self.check_value_block(&if_expr.then_body, target.clone());

        // Branches may disagree on array lengths.
        match &if_expr.else_body {
            Some(ElseBranch::If(nested)) => {
                let other = self.resolve_if_expr(expr, nested, Some(target));
                join(&result, &other)
            }
            Some(ElseBranch::Block(block)) => {
                let other = self.check_value_block(block, target);
                join(&result, &other)
            }
            None => {
                if !target.is_unknown() {
                    self.report(ErrorImpl::MissingElseBranch, &expr.span, Some(expr.id));
                }
                result
            }
        }
    }
}

/// The variable at the root of an index chain: `grid` in `grid[i][j]`.
fn root_variable(expr: &Expr) -> Option<&str> {
    match &expr.kind {
        ExprKind::Symbol(symbol) => Some(&symbol.value),
        ExprKind::Index(index) => root_variable(&index.array),
        _ => None,
    }
}
