use crate::{
    ast::{
        ast::{Stmt, StmtKind},
        statements::{
            BlockStmt, ControlStmt, FnDeclStmt, Parameter, ReturnStmt, VarDeclStmt, WhileStmt,
            YieldStmt,
        },
    },
    errors::errors::Error,
    lexer::tokens::TokenKind,
    parser::{expr::parse_expr, lookups::BindingPower},
    Span,
};

use super::{
    expr::{parse_for, parse_if},
    parser::Parser,
    types::parse_type,
};

/// Parses one statement and the optional `;` that ends it.
pub fn parse_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let handler = parser
        .get_stmt_lookup()
        .get(&parser.current_token_kind())
        .copied();

    let stmt = match handler {
        Some(handler) => handler(parser)?,
        None => {
            let expr = parse_expr(parser, BindingPower::Default)?;
            let span = expr.get_span().clone();
            Stmt::new(StmtKind::Expression(expr), span)
        }
    };

    parser.eat(TokenKind::Semicolon);

    Ok(stmt)
}

pub fn parse_block(parser: &mut Parser) -> Result<BlockStmt, Error> {
    let start = parser.expect(TokenKind::OpenCurly)?.span.start;
    let id = parser.advance_id();
    let mut body = vec![];

    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseCurly {
        body.push(parse_stmt(parser)?);
    }

    parser.expect(TokenKind::CloseCurly)?;

    Ok(BlockStmt {
        body,
        id,
        span: parser.span_from(start),
    })
}

pub fn parse_block_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let block = parse_block(parser)?;
    let span = block.span.clone();

    Ok(Stmt::new(StmtKind::Block(block), span))
}

pub fn parse_var_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start_token = parser.advance().clone();
    let is_mutable = start_token.kind == TokenKind::Mut;

    let error = parser.unexpected("expected identifier during variable declaration");
    let identifier = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let explicit_type = if parser.eat(TokenKind::Colon) {
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    let error = parser.unexpected("expected `=` and a value");
    parser.expect_error(TokenKind::Assignment, Some(error))?;
    let assigned_value = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt::new(
        StmtKind::VarDecl(VarDeclStmt {
            identifier,
            is_mutable,
            explicit_type,
            assigned_value,
        }),
        parser.span_from(start_token.span.start),
    ))
}

fn parse_parameter(parser: &mut Parser) -> Result<Parameter, Error> {
    let start = parser.get_position();
    let is_mutable = parser.eat(TokenKind::Mut);

    let error = parser.unexpected("expected parameter name");
    let name = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let error = parser.unexpected("parameters require a type");
    parser.expect_error(TokenKind::Colon, Some(error))?;
    let ty = parse_type(parser, BindingPower::Default)?;

    Ok(Parameter {
        name,
        is_mutable,
        ty,
        span: parser.span_from(start),
    })
}

pub fn parse_fn_decl_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let error = parser.unexpected("expected function name");
    let identifier = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    parser.expect(TokenKind::OpenParen)?;
    let mut parameters = vec![];
    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseParen {
        parameters.push(parse_parameter(parser)?);

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }
    parser.expect(TokenKind::CloseParen)?;

    let return_type = if parser.eat(TokenKind::Colon) {
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.eat(TokenKind::Assignment);
    let body = parse_block(parser)?;

    Ok(Stmt::new(
        StmtKind::FnDecl(FnDeclStmt {
            identifier,
            parameters,
            return_type,
            body,
        }),
        parser.span_from(start),
    ))
}

pub fn parse_return_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.advance().span.start.clone();

    let value = if parser.at_expression_start() {
        Some(parse_expr(parser, BindingPower::Default)?)
    } else {
        None
    };

    Ok(Stmt::new(
        StmtKind::Return(ReturnStmt { value }),
        parser.span_from(start),
    ))
}

/// `-> value`
pub fn parse_yield_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.expect(TokenKind::Arrow)?.span.start;
    let value = parse_expr(parser, BindingPower::Default)?;

    Ok(Stmt::new(
        StmtKind::Yield(YieldStmt { value }),
        parser.span_from(start),
    ))
}

pub fn parse_if_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.get_position();
    let if_stmt = parse_if(parser)?;

    Ok(Stmt::new(StmtKind::If(if_stmt), parser.span_from(start)))
}

/// `for` and `while`, either optionally preceded by a label.
pub fn parse_loop_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let start = parser.get_position();
    let label = if parser.current_token_kind() == TokenKind::Label {
        Some(parser.advance().value.clone())
    } else {
        None
    };

    let kind = match parser.current_token_kind() {
        TokenKind::For => StmtKind::For(parse_for(parser, label)?),
        TokenKind::While => {
            parser.advance();
            let condition = parse_expr(parser, BindingPower::Default)?;
            let body = parse_block(parser)?;
            StmtKind::While(WhileStmt {
                label,
                condition,
                body,
            })
        }
        _ => return Err(parser.unexpected("expected `for` or `while` after label")),
    };

    Ok(Stmt::new(kind, parser.span_from(start)))
}

/// `break` and `continue` with an optional target label.
pub fn parse_control_stmt(parser: &mut Parser) -> Result<Stmt, Error> {
    let token = parser.advance().clone();
    let label = if parser.current_token_kind() == TokenKind::Label {
        Some(parser.advance().value.clone())
    } else {
        None
    };

    let control = ControlStmt { label };
    let span = Span {
        start: token.span.start,
        end: parser.previous_end(),
    };

    let kind = if token.kind == TokenKind::Break {
        StmtKind::Break(control)
    } else {
        StmtKind::Continue(control)
    };

    Ok(Stmt::new(kind, span))
}
