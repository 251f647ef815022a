use crate::ast::ast::{Expr, ExprKind};

/// Whether `expr` is a runtime operation whose value needs a declared type.
///
/// Every block, conditional and loop used as a value qualifies, regardless of
/// whether its contents could be folded at compile time.
pub fn requires_explicit_context(expr: &Expr) -> bool {
    matches!(
        expr.kind,
        ExprKind::Block(_) | ExprKind::If(_) | ExprKind::For(_)
    )
}

/// Human-readable name of a runtime construct, for diagnostics.
pub fn describe_construct(expr: &Expr) -> &'static str {
    match expr.kind {
        ExprKind::Block(_) => "expression block",
        ExprKind::If(_) => "conditional expression",
        ExprKind::For(_) => "loop expression",
        _ => "expression",
    }
}
