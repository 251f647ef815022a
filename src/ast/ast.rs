use crate::Span;

use super::{
    expressions::{
        ArrayLiteralExpr, AssignmentExpr, BinaryExpr, BoolExpr, CallExpr, ConversionExpr,
        ForExpr, IfExpr, IndexExpr, MemberExpr, NumberExpr, PrefixExpr, RangeExpr, StringExpr,
        SymbolExpr,
    },
    statements::{BlockStmt, ControlStmt, FnDeclStmt, ReturnStmt, VarDeclStmt, WhileStmt, YieldStmt},
};

/// Stable handle of a node, used to attach diagnostics and resolved types.
pub type NodeId = i32;

/// Statement Kinds
#[derive(Debug, Clone)]
pub enum StmtKind {
    Expression(Expr),
    Block(BlockStmt),
    VarDecl(VarDeclStmt),
    FnDecl(FnDeclStmt),
    Return(ReturnStmt),
    Yield(YieldStmt),
    If(IfExpr),
    For(ForExpr),
    While(WhileStmt),
    Break(ControlStmt),
    Continue(ControlStmt),
}

#[derive(Debug, Clone)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }
}

/// Expression Kinds
///
/// `Block`, `If` and `For` in expression position are the value-producing
/// (runtime) constructs.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Number(NumberExpr),
    String(StringExpr),
    Bool(BoolExpr),
    Undef,
    Symbol(SymbolExpr),
    Binary(BinaryExpr),
    Prefix(PrefixExpr),
    Assignment(AssignmentExpr),
    Call(CallExpr),
    Conversion(ConversionExpr),
    ArrayLiteral(ArrayLiteralExpr),
    Index(IndexExpr),
    Member(MemberExpr),
    Range(RangeExpr),
    Block(BlockStmt),
    If(IfExpr),
    For(ForExpr),
}

#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(id: NodeId, kind: ExprKind, span: Span) -> Self {
        Expr { id, kind, span }
    }

    pub fn get_span(&self) -> &Span {
        &self.span
    }
}
