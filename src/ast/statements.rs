use std::slice::Iter;

use crate::Span;

use super::{
    ast::{Expr, NodeId, Stmt},
    types::TypeAnnotation,
};

#[derive(Debug, Clone)]
pub struct BlockStmt {
    pub body: Vec<Stmt>,
    pub id: NodeId,
    pub span: Span,
}

impl BlockStmt {
    pub fn iter(&self) -> Iter<'_, Stmt> {
        self.body.iter()
    }
}

/// `val name : T = value` or `mut name : T = value`.
#[derive(Debug, Clone)]
pub struct VarDeclStmt {
    pub identifier: String,
    pub is_mutable: bool,
    pub explicit_type: Option<TypeAnnotation>,
    pub assigned_value: Expr,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub is_mutable: bool,
    pub ty: TypeAnnotation,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct FnDeclStmt {
    pub identifier: String,
    pub parameters: Vec<Parameter>,
    /// `None` when the function returns nothing.
    pub return_type: Option<TypeAnnotation>,
    pub body: BlockStmt,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
}

/// `-> value`
#[derive(Debug, Clone)]
pub struct YieldStmt {
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub label: Option<String>,
    pub condition: Expr,
    pub body: BlockStmt,
}

/// `break` / `continue` with an optional label.
#[derive(Debug, Clone)]
pub struct ControlStmt {
    pub label: Option<String>,
}
