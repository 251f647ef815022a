use crate::{
    ast::{
        ast::{Expr, ExprKind},
        expressions::{
            ArrayLiteralExpr, AssignmentExpr, BinaryExpr, BinaryOperator, BoolExpr, CallExpr,
            ConversionExpr, ElseBranch, ForExpr, IfExpr, IndexExpr, MemberExpr, NumberExpr,
            NumberLiteral, PrefixExpr, PrefixOperator, RangeExpr, StringExpr, SymbolExpr,
        },
    },
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
    Span,
};

use super::{lookups::BindingPower, parser::Parser, stmt::parse_block, types::parse_type};

pub fn parse_expr(parser: &mut Parser, bp: BindingPower) -> Result<Expr, Error> {
    // First parse NUD
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_nud_lookup().get(&token_kind) {
        Some(handler) => *handler,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: parser.current_token().value.clone(),
                },
                parser.get_position(),
            ))
        }
    };

    let mut left = nud(parser)?;

    // While LED and current BP is less than BP of current token, continue parsing lhs
    loop {
        let token_kind = parser.current_token_kind();
        let next_bp = match parser.get_bp_lookup().get(&token_kind) {
            Some(next_bp) if *next_bp > bp => *next_bp,
            _ => break,
        };

        let led = match parser.get_led_lookup().get(&token_kind) {
            Some(handler) => *handler,
            None => {
                return Err(Error::new(
                    ErrorImpl::UnexpectedToken {
                        token: parser.current_token().value.clone(),
                    },
                    parser.get_position(),
                ))
            }
        };

        left = led(parser, left, next_bp)?;
    }

    Ok(left)
}

/// Parses a numeric literal, dropping `_` separators.
fn parse_number(text: &str) -> Option<NumberLiteral> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    if digits.contains('.') {
        digits.parse::<f64>().ok().map(NumberLiteral::Float)
    } else {
        digits.parse::<i128>().ok().map(NumberLiteral::Int)
    }
}

pub fn parse_primary_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.current_token().clone();
    let kind = match token.kind {
        TokenKind::Number => match parse_number(&token.value) {
            Some(value) => ExprKind::Number(NumberExpr { value }),
            None => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ))
            }
        },
        TokenKind::Identifier => ExprKind::Symbol(SymbolExpr {
            value: token.value.clone(),
        }),
        TokenKind::String => ExprKind::String(StringExpr {
            value: token.value.clone(),
        }),
        TokenKind::True => ExprKind::Bool(BoolExpr { value: true }),
        TokenKind::False => ExprKind::Bool(BoolExpr { value: false }),
        TokenKind::Undef => ExprKind::Undef,
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken { token: token.value },
                token.span.start,
            ))
        }
    };

    parser.advance();
    Ok(Expr::new(parser.advance_id(), kind, token.span))
}

pub fn parse_binary_expr(parser: &mut Parser, left: Expr, bp: BindingPower) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match BinaryOperator::from_token(operator_token.kind) {
        Some(operator) => operator,
        None => {
            return Err(Error::new(
                ErrorImpl::UnexpectedToken {
                    token: operator_token.value,
                },
                operator_token.span.start,
            ))
        }
    };

    let right = parse_expr(parser, bp)?;
    let span = Span {
        start: left.get_span().start.clone(),
        end: right.get_span().end.clone(),
    };

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Binary(BinaryExpr {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }),
        span,
    ))
}

pub fn parse_prefix_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match operator_token.kind {
        TokenKind::Dash => PrefixOperator::Negate,
        _ => PrefixOperator::Not,
    };
    let rhs = parse_expr(parser, BindingPower::Unary)?;

    let span = Span {
        start: operator_token.span.start.clone(),
        end: rhs.get_span().end.clone(),
    };

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Prefix(PrefixExpr {
            operator,
            right_expr: Box::new(rhs),
        }),
        span,
    ))
}

pub fn parse_assignment_expr(
    parser: &mut Parser,
    left: Expr,
    bp: BindingPower,
) -> Result<Expr, Error> {
    let operator_token = parser.advance().clone();
    let operator = match operator_token.kind {
        TokenKind::Assignment => None,
        kind => BinaryOperator::from_token(kind),
    };

    let rhs = parse_expr(parser, bp)?;
    let span = Span {
        start: left.get_span().start.clone(),
        end: rhs.get_span().end.clone(),
    };

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Assignment(AssignmentExpr {
            assignee: Box::new(left),
            operator,
            value: Box::new(rhs),
        }),
        span,
    ))
}

pub fn parse_grouping_expr(parser: &mut Parser) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenParen)?;
    let expr = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseParen)?;

    Ok(expr)
}

/// `value:type`
pub fn parse_conversion_expr(
    parser: &mut Parser,
    left: Expr,
    _bp: BindingPower,
) -> Result<Expr, Error> {
    parser.expect(TokenKind::Colon)?;
    let target = parse_type(parser, BindingPower::Default)?;
    let span = parser.span_from(left.get_span().start.clone());

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Conversion(ConversionExpr {
            value: Box::new(left),
            target,
        }),
        span,
    ))
}

pub fn parse_call_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let callee = match &left.kind {
        ExprKind::Symbol(symbol) => symbol.value.clone(),
        _ => return Err(parser.unexpected("only named functions can be called")),
    };

    parser.expect(TokenKind::OpenParen)?;
    let mut arguments = vec![];

    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseParen {
        arguments.push(parse_expr(parser, BindingPower::Assignment)?);

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(TokenKind::CloseParen)?;
    let span = parser.span_from(left.get_span().start.clone());

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Call(CallExpr { callee, arguments }),
        span,
    ))
}

/// `array[index]`, `array[start..end]` and `array[..]`.
pub fn parse_index_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.expect(TokenKind::OpenBracket)?;
    let index = parse_expr(parser, BindingPower::Default)?;
    parser.expect(TokenKind::CloseBracket)?;
    let span = parser.span_from(left.get_span().start.clone());

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Index(IndexExpr {
            array: Box::new(left),
            index: Box::new(index),
        }),
        span,
    ))
}

pub fn parse_member_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    parser.expect(TokenKind::Dot)?;
    let error = parser.unexpected("expected property name");
    let property = parser.expect_error(TokenKind::Identifier, Some(error))?.value;
    let span = parser.span_from(left.get_span().start.clone());

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Member(MemberExpr {
            object: Box::new(left),
            property,
        }),
        span,
    ))
}

pub fn parse_array_literal_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.expect(TokenKind::OpenBracket)?.span.start;
    let mut elements = vec![];

    while parser.has_tokens() && parser.current_token_kind() != TokenKind::CloseBracket {
        elements.push(parse_expr(parser, BindingPower::Assignment)?);

        if !parser.eat(TokenKind::Comma) {
            break;
        }
    }

    parser.expect(TokenKind::CloseBracket)?;
    let span = parser.span_from(start);

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::ArrayLiteral(ArrayLiteralExpr { elements }),
        span,
    ))
}

/// Parses the end bound of a range if one follows.
///
/// A `{` never starts a bound, so `for i in 0.. { }` is an open range.
fn parse_range_end(parser: &mut Parser, inclusive: bool) -> Result<Option<Box<Expr>>, Error> {
    let can_end = parser.at_expression_start() && parser.current_token_kind() != TokenKind::OpenCurly;

    if can_end {
        Ok(Some(Box::new(parse_expr(parser, BindingPower::Range)?)))
    } else if inclusive {
        Err(parser.unexpected("inclusive range requires an end bound"))
    } else {
        Ok(None)
    }
}

pub fn parse_range_expr(parser: &mut Parser, left: Expr, _bp: BindingPower) -> Result<Expr, Error> {
    let inclusive = parser.advance().kind == TokenKind::DotDotEquals;
    let end = parse_range_end(parser, inclusive)?;
    let span = parser.span_from(left.get_span().start.clone());

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Range(RangeExpr {
            start: Some(Box::new(left)),
            end,
            inclusive,
        }),
        span,
    ))
}

/// `..end`, `..=end` and the full range `..`.
pub fn parse_prefix_range_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let token = parser.advance().clone();
    let inclusive = token.kind == TokenKind::DotDotEquals;
    let end = parse_range_end(parser, inclusive)?;
    let span = parser.span_from(token.span.start);

    Ok(Expr::new(
        parser.advance_id(),
        ExprKind::Range(RangeExpr {
            start: None,
            end,
            inclusive,
        }),
        span,
    ))
}

pub fn parse_block_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let block = parse_block(parser)?;
    let span = block.span.clone();

    Ok(Expr::new(parser.advance_id(), ExprKind::Block(block), span))
}

/// Parses `if cond { } else if cond { } else { }` without the node wrapper.
pub fn parse_if(parser: &mut Parser) -> Result<IfExpr, Error> {
    parser.expect(TokenKind::If)?;

    let condition = parse_expr(parser, BindingPower::Default)?;
    let then_body = parse_block(parser)?;

    let else_body = if parser.eat(TokenKind::Else) {
        if parser.current_token_kind() == TokenKind::If {
            Some(ElseBranch::If(Box::new(parse_if(parser)?)))
        } else {
            Some(ElseBranch::Block(parse_block(parser)?))
        }
    } else {
        None
    };

    Ok(IfExpr {
        condition: Box::new(condition),
        then_body,
        else_body,
    })
}

pub fn parse_if_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.get_position();
    let if_expr = parse_if(parser)?;
    let span = parser.span_from(start);

    Ok(Expr::new(parser.advance_id(), ExprKind::If(if_expr), span))
}

/// Parses `for name (: type)? in iterable { }`, after any label.
pub fn parse_for(parser: &mut Parser, label: Option<String>) -> Result<ForExpr, Error> {
    parser.expect(TokenKind::For)?;

    let error = parser.unexpected("expected loop variable");
    let variable = parser.expect_error(TokenKind::Identifier, Some(error))?.value;

    let explicit_type = if parser.eat(TokenKind::Colon) {
        Some(parse_type(parser, BindingPower::Default)?)
    } else {
        None
    };

    parser.expect(TokenKind::In)?;
    let iterable = parse_expr(parser, BindingPower::Default)?;
    let body = parse_block(parser)?;

    Ok(ForExpr {
        label,
        variable,
        explicit_type,
        iterable: Box::new(iterable),
        body,
    })
}

pub fn parse_for_expr(parser: &mut Parser) -> Result<Expr, Error> {
    let start = parser.get_position();
    let label = if parser.current_token_kind() == TokenKind::Label {
        Some(parser.advance().value.clone())
    } else {
        None
    };

    let for_expr = parse_for(parser, label)?;
    let span = parser.span_from(start);

    Ok(Expr::new(parser.advance_id(), ExprKind::For(for_expr), span))
}
