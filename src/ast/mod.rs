/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the tree the parser produces
///
/// Submodules:
/// - ast: Core node definitions (`Stmt`, `Expr` and their kinds)
/// - expressions: Payloads of the expression kinds
/// - statements: Payloads of the statement kinds
/// - types: Type annotations as written in the source
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
