//! Variable and function declarations.

use crate::{
    ast::{
        ast::{ExprKind, Stmt, StmtKind},
        statements::{FnDeclStmt, VarDeclStmt},
    },
    errors::errors::ErrorImpl,
    Span,
};

use super::{
    classifier::{describe_construct, requires_explicit_context},
    context::TypeContext,
    environment::{FunctionSignature, ParamSignature, Symbol, SymbolTable},
    type_checker::{Frame, FrameGuard, ScopeGuard, TypeChecker},
    types::Type,
};

impl TypeChecker {
    /// Registers the signatures of the functions declared directly in
    /// `statements` in the current scope.
    pub(super) fn collect_functions(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            let StmtKind::FnDecl(func) = &stmt.kind else {
                continue;
            };

            let parameters = func
                .parameters
                .iter()
                .map(|parameter| ParamSignature {
                    name: parameter.name.clone(),
                    ty: self.resolve_annotation(&parameter.ty),
                    mutable: parameter.is_mutable,
                })
                .collect();
            let return_type = match &func.return_type {
                Some(annotation) => self.resolve_annotation(annotation),
                None => Type::Void,
            };

            let signature = FunctionSignature {
                parameters,
                return_type,
            };

            if self.scopes.declare_function(&func.identifier, signature).is_err() {
                self.duplicate_functions.insert(stmt.span.start.0);
                self.report(
                    ErrorImpl::FunctionAlreadyDeclared {
                        function: func.identifier.clone(),
                    },
                    &stmt.span,
                    None,
                );
            }
        }
    }

    pub(super) fn check_fn_decl(&mut self, func: &FnDeclStmt, span: &Span) {
        // The name belongs to the first declaration; a rejected one is not checked.
        if self.duplicate_functions.contains(&span.start.0) {
            log::debug!("skipping duplicate function {}", func.identifier);
            return;
        }

        let Some(signature) = self.scopes.lookup_function(&func.identifier).cloned() else {
            return;
        };

        log::debug!(
            "checking function {} ({} parameters) -> {}",
            func.identifier,
            signature.parameters.len(),
            signature.return_type
        );

        let frame = Frame::Function {
            name: func.identifier.clone(),
            return_type: signature.return_type.clone(),
        };
        let mut framed = FrameGuard::new(self, frame);
        let mut checker = ScopeGuard::new(&mut framed);

        for (parameter, declared) in func.parameters.iter().zip(&signature.parameters) {
            let symbol = Symbol::new(declared.ty.clone(), declared.mutable);
            if checker.scopes.declare(&declared.name, symbol).is_err() {
                checker.report(
                    ErrorImpl::VariableAlreadyDeclared {
                        variable: declared.name.clone(),
                    },
                    &parameter.span,
                    None,
                );
            }
        }

        // The body shares the parameters' scope.
        checker.check_statements(&func.body.body);
    }

    pub(super) fn check_var_decl(&mut self, decl: &VarDeclStmt, span: &Span) {
        let explicit = decl
            .explicit_type
            .as_ref()
            .map(|annotation| self.resolve_annotation(annotation));
        let value = &decl.assigned_value;

        let (ty, constant, elements) = if matches!(value.kind, ExprKind::Undef) {
            if !decl.is_mutable {
                self.report(
                    ErrorImpl::UndefWithoutMut {
                        variable: decl.identifier.clone(),
                    },
                    &value.span,
                    Some(value.id),
                );
            } else if explicit.is_none() {
                self.report(
                    ErrorImpl::MutRequiresExplicitType {
                        variable: decl.identifier.clone(),
                    },
                    span,
                    None,
                );
            }
            (explicit.unwrap_or(Type::Unknown), None, None)
        } else {
            match explicit {
                Some(annotation) => {
                    let resolved = self.resolve(value, TypeContext::expecting(annotation.clone()));
                    let ty = if resolved.is_unknown() { annotation } else { resolved };
                    (ty, None, None)
                }
                None if decl.is_mutable => {
                    self.report(
                        ErrorImpl::MutRequiresExplicitType {
                            variable: decl.identifier.clone(),
                        },
                        span,
                        None,
                    );
                    self.resolve(value, TypeContext::discarded());
                    (Type::Unknown, None, None)
                }
                None if requires_explicit_context(value) => {
                    self.report(
                        ErrorImpl::MissingExplicitContext {
                            construct: describe_construct(value).to_string(),
                        },
                        &value.span,
                        Some(value.id),
                    );
                    // Resolve against `Unknown` so the construct does not report again.
                    self.resolve(value, TypeContext::expecting(Type::Unknown));
                    (Type::Unknown, None, None)
                }
                None => {
                    let ty = self.resolve(value, TypeContext::permissive());
                    if ty == Type::Void {
                        self.report(
                            ErrorImpl::TypeMatchError {
                                expected: String::from("a value"),
                                received: ty.to_string(),
                            },
                            &value.span,
                            Some(value.id),
                        );
                        (Type::Unknown, None, None)
                    } else if ty.is_comptime_scalar() {
                        let constant = self.constant_of(value);
                        (ty, constant, None)
                    } else if ty.is_comptime() {
                        let elements = self.constants_of(value);
                        (ty, None, elements)
                    } else {
                        (ty, None, None)
                    }
                }
            }
        };

        let symbol = Symbol::new(ty.clone(), decl.is_mutable)
            .with_value(constant)
            .with_elements(elements);
        if self.scopes.declare(&decl.identifier, symbol).is_err() {
            self.report(
                ErrorImpl::VariableAlreadyDeclared {
                    variable: decl.identifier.clone(),
                },
                span,
                None,
            );
            return;
        }

        log::trace!("declared {} : {}", decl.identifier, ty);
        self.declarations.push((decl.identifier.clone(), ty));
    }
}
