//! The checker: one depth-first walk over the tree.
//!
//! Statements are checked here; expression resolution lives in `resolver`,
//! with declarations, arrays and loops split into their own files. All of
//! them are `impl TypeChecker` blocks sharing the state below.

use std::{
    collections::{HashMap, HashSet},
    ops::{Deref, DerefMut},
};

use crate::{
    ast::{
        ast::{ExprKind, NodeId, Stmt, StmtKind},
        expressions::{ElseBranch, IfExpr},
        statements::{BlockStmt, ControlStmt, ReturnStmt, WhileStmt, YieldStmt},
        types::{DimensionAnnotation, TypeAnnotation},
    },
    errors::errors::{Error, ErrorImpl},
    Span,
};

use super::{
    coercion::{join, Outcome},
    context::TypeContext,
    diagnostics::Diagnostics,
    environment::{Scopes, SymbolTable},
    literals::ConstValue,
    types::{Dimension, ScalarKind, Type},
};

/// An active loop, innermost last on the frame stack.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopContext {
    pub label: Option<String>,
    /// Whether the loop produces an array.
    pub is_expression: bool,
    /// Target of the loop body's yields; `None` for statement loops.
    pub element_target: Option<Type>,
    pub variable: Option<(String, Type)>,
}

/// Constructs that `return`, `->`, `break` and `continue` resolve against.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    Function {
        name: String,
        return_type: Type,
    },
    /// A block or conditional branch used as a value.
    ExprBlock {
        target: Type,
        yielded: Option<Type>,
    },
    Loop(LoopContext),
}

pub struct TypeChecker {
    pub(super) scopes: Scopes,
    pub(super) frames: Vec<Frame>,
    pub(super) diagnostics: Diagnostics,
    pub(super) node_types: HashMap<NodeId, Type>,
    pub(super) declarations: Vec<(String, Type)>,
    /// Start offsets of function declarations rejected as duplicates.
    pub(super) duplicate_functions: HashSet<u32>,
}

/// Keeps a scope entered for as long as it lives.
pub struct ScopeGuard<'a> {
    checker: &'a mut TypeChecker,
}

impl<'a> ScopeGuard<'a> {
    pub fn new(checker: &'a mut TypeChecker) -> Self {
        checker.scopes.enter_scope();
        log::trace!("enter scope (depth {})", checker.scopes.depth());
        ScopeGuard { checker }
    }
}

impl Deref for ScopeGuard<'_> {
    type Target = TypeChecker;

    fn deref(&self) -> &TypeChecker {
        self.checker
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut TypeChecker {
        self.checker
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        log::trace!("exit scope (depth {})", self.checker.scopes.depth());
        self.checker.scopes.exit_scope();
    }
}

/// Keeps a frame pushed for as long as it lives.
pub struct FrameGuard<'a> {
    checker: &'a mut TypeChecker,
}

impl<'a> FrameGuard<'a> {
    pub fn new(checker: &'a mut TypeChecker, frame: Frame) -> Self {
        checker.frames.push(frame);
        FrameGuard { checker }
    }
}

impl Deref for FrameGuard<'_> {
    type Target = TypeChecker;

    fn deref(&self) -> &TypeChecker {
        self.checker
    }
}

impl DerefMut for FrameGuard<'_> {
    fn deref_mut(&mut self) -> &mut TypeChecker {
        self.checker
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.checker.frames.pop();
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        TypeChecker::new()
    }
}

impl TypeChecker {
    pub fn new() -> Self {
        TypeChecker {
            scopes: Scopes::new(),
            frames: vec![],
            diagnostics: Diagnostics::new(),
            node_types: HashMap::new(),
            declarations: vec![],
            duplicate_functions: HashSet::new(),
        }
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The resolved type of an expression node.
    pub fn type_of(&self, node: NodeId) -> Option<&Type> {
        self.node_types.get(&node)
    }

    /// Every declared variable, in declaration order, with its final type.
    pub fn declarations(&self) -> &[(String, Type)] {
        &self.declarations
    }

    /// The type a variable was declared with, by name; the latest wins.
    pub fn declared_type(&self, name: &str) -> Option<&Type> {
        self.declarations
            .iter()
            .rev()
            .find(|(declared, _)| declared == name)
            .map(|(_, ty)| ty)
    }

    pub fn scopes(&self) -> &Scopes {
        &self.scopes
    }

    pub(super) fn report(&mut self, error: ErrorImpl, span: &Span, node: Option<NodeId>) {
        let error = Error::new(error, span.start.clone());
        let error = match node {
            Some(node) => error.at_node(node),
            None => error,
        };
        self.diagnostics.report(error);
    }

    /// Turns a coercion outcome into a type, reporting failures.
    ///
    /// Nothing is reported when either side is already `Unknown`.
    pub(super) fn settle(
        &mut self,
        outcome: Outcome,
        from: &Type,
        to: &Type,
        span: &Span,
        node: Option<NodeId>,
        value: Option<ConstValue>,
    ) -> Type {
        if let Outcome::Resolved(ty) = outcome {
            return ty;
        }

        if from.is_unknown() || to.is_unknown() {
            return Type::Unknown;
        }

        let error = match outcome {
            Outcome::RequiresExplicitConversion => ErrorImpl::MissingExplicitConversion {
                from: from.to_string(),
                to: to.to_string(),
            },
            Outcome::DimensionMismatch if from.rank() != to.rank() => ErrorImpl::RankMismatch {
                expected: to.rank(),
                received: from.rank(),
            },
            Outcome::DimensionMismatch => ErrorImpl::DimensionMismatch {
                expected: to.to_string(),
                received: from.to_string(),
            },
            Outcome::LiteralOutOfRange => ErrorImpl::LiteralOutOfRange {
                value: value.map(|value| value.to_string()).unwrap_or_default(),
                target: to.to_string(),
            },
            _ => ErrorImpl::TypeMatchError {
                expected: to.to_string(),
                received: from.to_string(),
            },
        };

        self.report(error, span, node);
        Type::Unknown
    }

    /// Converts a written annotation into a type. Unknown names are reported.
    pub(super) fn resolve_annotation(&mut self, annotation: &TypeAnnotation) -> Type {
        match annotation {
            TypeAnnotation::Symbol(symbol) => {
                if symbol.name == "void" {
                    return Type::Void;
                }

                match ScalarKind::from_name(&symbol.name) {
                    Some(kind) => Type::Scalar(kind),
                    None => {
                        let error = Error::new(
                            ErrorImpl::UnknownType {
                                type_: symbol.name.clone(),
                            },
                            symbol.position.clone(),
                        );
                        self.diagnostics.report(error);
                        Type::Unknown
                    }
                }
            }
            TypeAnnotation::Array(array) => {
                let underlying = self.resolve_annotation(&array.underlying);
                if underlying.is_unknown() {
                    return Type::Unknown;
                }

                let dimension = match array.dimension {
                    DimensionAnnotation::Fixed(size) => Dimension::Fixed(size),
                    DimensionAnnotation::Inferred => Dimension::Inferred,
                };
                Type::wrap(underlying, dimension)
            }
        }
    }

    /// Checks the statements of a program or block, after registering the
    /// functions it declares so calls may precede declarations.
    pub(super) fn check_statements(&mut self, statements: &[Stmt]) {
        self.collect_functions(statements);

        for stmt in statements {
            self.check_stmt(stmt);
        }
    }

    /// Checks a block in its own scope.
    pub(super) fn check_block(&mut self, block: &BlockStmt) {
        let mut checker = ScopeGuard::new(self);
        checker.check_statements(&block.body);
    }

    pub(super) fn check_stmt(&mut self, stmt: &Stmt) {
        match &stmt.kind {
            StmtKind::Expression(expr) => {
                self.resolve(expr, TypeContext::discarded());
            }
            StmtKind::Block(block) => self.check_block(block),
            StmtKind::VarDecl(decl) => self.check_var_decl(decl, &stmt.span),
            StmtKind::FnDecl(func) => self.check_fn_decl(func, &stmt.span),
            StmtKind::Return(ret) => self.check_return(ret, &stmt.span),
            StmtKind::Yield(yield_stmt) => self.check_yield(yield_stmt, &stmt.span),
            StmtKind::If(if_stmt) => self.check_if_stmt(if_stmt),
            StmtKind::For(for_stmt) => self.check_for_stmt(for_stmt, &stmt.span),
            StmtKind::While(while_stmt) => self.check_while(while_stmt, &stmt.span),
            StmtKind::Break(control) => self.check_control(control, "break", &stmt.span),
            StmtKind::Continue(control) => self.check_control(control, "continue", &stmt.span),
        }
    }

    fn check_if_stmt(&mut self, if_stmt: &IfExpr) {
        self.resolve(&if_stmt.condition, TypeContext::expecting(Type::bool()));
        self.check_block(&if_stmt.then_body);

        match &if_stmt.else_body {
            Some(ElseBranch::If(nested)) => self.check_if_stmt(nested),
            Some(ElseBranch::Block(block)) => self.check_block(block),
            None => {}
        }
    }

    fn check_while(&mut self, while_stmt: &WhileStmt, span: &Span) {
        self.resolve(&while_stmt.condition, TypeContext::expecting(Type::bool()));
        self.check_duplicate_label(while_stmt.label.as_deref(), span);

        let frame = Frame::Loop(LoopContext {
            label: while_stmt.label.clone(),
            is_expression: false,
            element_target: None,
            variable: None,
        });
        let mut checker = FrameGuard::new(self, frame);
        checker.check_block(&while_stmt.body);
    }

    /// Frames visible from the current position: everything up to and
    /// including the innermost function frame.
    pub(super) fn visible_frames(&self) -> impl Iterator<Item = &Frame> + '_ {
        let mut crossed_function = false;
        self.frames.iter().rev().take_while(move |frame| {
            if crossed_function {
                return false;
            }
            crossed_function = matches!(frame, Frame::Function { .. });
            true
        })
    }

    pub(super) fn check_duplicate_label(&mut self, label: Option<&str>, span: &Span) {
        let Some(label) = label else {
            return;
        };

        let active = self.visible_frames().any(|frame| {
            matches!(frame, Frame::Loop(context) if context.label.as_deref() == Some(label))
        });

        if active {
            self.report(
                ErrorImpl::DuplicateLabel {
                    label: label.to_string(),
                },
                span,
                None,
            );
        }
    }

    fn check_control(&mut self, control: &ControlStmt, keyword: &str, span: &Span) {
        let found = match &control.label {
            Some(label) => self.visible_frames().any(|frame| {
                matches!(frame, Frame::Loop(context) if context.label.as_ref() == Some(label))
            }),
            None => self
                .visible_frames()
                .any(|frame| matches!(frame, Frame::Loop(_))),
        };

        if found {
            return;
        }

        let error = match &control.label {
            Some(label) => ErrorImpl::UndefinedLabel {
                label: label.clone(),
            },
            None => ErrorImpl::ControlFlowOutsideLoop {
                keyword: keyword.to_string(),
            },
        };
        self.report(error, span, None);
    }

    fn check_return(&mut self, ret: &ReturnStmt, span: &Span) {
        let return_type = self.frames.iter().rev().find_map(|frame| match frame {
            Frame::Function { return_type, .. } => Some(return_type.clone()),
            _ => None,
        });

        let Some(return_type) = return_type else {
            self.report(ErrorImpl::ReturnOutsideFunction, span, None);
            if let Some(value) = &ret.value {
                self.resolve(value, TypeContext::discarded());
            }
            return;
        };

        match (&ret.value, &return_type) {
            (Some(value), Type::Void) => {
                let ty = self.resolve(value, TypeContext::discarded());
                if !ty.is_unknown() {
                    self.report(
                        ErrorImpl::TypeMatchError {
                            expected: Type::Void.to_string(),
                            received: ty.to_string(),
                        },
                        &value.span,
                        Some(value.id),
                    );
                }
            }
            (Some(value), _) => {
                self.resolve(value, TypeContext::expecting(return_type));
            }
            (None, Type::Void) => {}
            (None, _) => {
                if !return_type.is_unknown() {
                    self.report(
                        ErrorImpl::MissingReturnValue {
                            expected: return_type.to_string(),
                        },
                        span,
                        None,
                    );
                }
            }
        }
    }

    fn check_yield(&mut self, yield_stmt: &YieldStmt, span: &Span) {
        // Index of the frame the value is yielded to.
        let mut destination = None;
        for (index, frame) in self.frames.iter().enumerate().rev() {
            match frame {
                Frame::Function { .. } => break,
                Frame::ExprBlock { .. } | Frame::Loop(_) => {
                    destination = Some(index);
                    break;
                }
            }
        }

        let Some(index) = destination else {
            self.report(ErrorImpl::YieldOutsideExpression, span, None);
            self.resolve(&yield_stmt.value, TypeContext::discarded());
            return;
        };

        let ctx = match &self.frames[index] {
            Frame::ExprBlock { target, .. } => TypeContext::expecting(target.clone()),
            Frame::Loop(context) => match &context.element_target {
                Some(target) => TypeContext::expecting(target.clone()),
                None => TypeContext::discarded(),
            },
            Frame::Function { .. } => TypeContext::discarded(),
        };

        let ty = self.resolve(&yield_stmt.value, ctx);

        if let Frame::ExprBlock { yielded, .. } = &mut self.frames[index] {
            *yielded = Some(match yielded.take() {
                Some(previous) => join(&previous, &ty),
                None => ty,
            });
        }
    }

    /// Checks a block whose value is used, inside its own scope and frame.
    ///
    /// The value comes from `->` statements, or from a trailing expression
    /// statement. Returns the join of every value produced, or the target.
    pub(super) fn check_value_block(&mut self, block: &BlockStmt, target: Type) -> Type {
        let frame = Frame::ExprBlock {
            target: target.clone(),
            yielded: None,
        };
        let mut framed = FrameGuard::new(self, frame);
        let mut checker = ScopeGuard::new(&mut framed);

        let produced_tail = checker.check_body_with_tail(block, Some(target.clone()));

        let yielded = match checker.frames.last() {
            Some(Frame::ExprBlock { yielded, .. }) => yielded.clone(),
            _ => None,
        };

        if yielded.is_none() && produced_tail.is_none() && !diverges(block) && !target.is_unknown() {
            checker.report(ErrorImpl::MissingBlockValue, &block.span, Some(block.id));
        }

        let produced = match (yielded, produced_tail) {
            (Some(yielded), Some(tail)) => Some(join(&yielded, &tail)),
            (yielded, tail) => yielded.or(tail),
        };

        produced.filter(|ty| !ty.is_unknown()).unwrap_or(target)
    }

    /// Checks the statements of `block`, resolving a trailing expression
    /// statement as the block's value when `tail_target` is set.
    ///
    /// Returns the tail value's type, if the block ended in one.
    pub(super) fn check_body_with_tail(
        &mut self,
        block: &BlockStmt,
        tail_target: Option<Type>,
    ) -> Option<Type> {
        self.collect_functions(&block.body);

        let Some((last, rest)) = block.body.split_last() else {
            return None;
        };

        for stmt in rest {
            self.check_stmt(stmt);
        }

        match (&last.kind, tail_target) {
            (StmtKind::Expression(expr), Some(target))
                if !matches!(expr.kind, ExprKind::Assignment(_)) =>
            {
                Some(self.resolve(expr, TypeContext::expecting(target)))
            }
            _ => {
                self.check_stmt(last);
                None
            }
        }
    }
}

/// Whether a block always leaves through `return`, `break` or `continue`.
pub(super) fn diverges(block: &BlockStmt) -> bool {
    matches!(
        block.body.last().map(|stmt| &stmt.kind),
        Some(StmtKind::Return(_)) | Some(StmtKind::Break(_)) | Some(StmtKind::Continue(_))
    )
}

/// Checks a whole program.
///
/// Never fails: every problem is recorded in the returned checker's
/// diagnostics.
pub fn type_check(ast: &BlockStmt) -> TypeChecker {
    let mut checker = TypeChecker::new();
    checker.check_statements(&ast.body);
    log::debug!(
        "checked {} statements, {} diagnostics",
        ast.body.len(),
        checker.diagnostics.len()
    );
    checker
}
