//! Type parsing implementation.
//!
//! This module handles parsing of type annotations. It supports:
//!
//! - Named types (`i32`, `f64`, `string`, `bool`, `void`)
//! - Array types with a fixed (`[3]i32`) or inferred (`[_]i32`) size,
//!   nested for multiple dimensions (`[2][3]f64`)
//!
//! Names are not validated here; the type checker rejects unknown ones.

use std::collections::HashMap;

use crate::{
    ast::types::{ArrayType, DimensionAnnotation, SymbolType, TypeAnnotation},
    errors::errors::{Error, ErrorImpl},
    lexer::tokens::TokenKind,
};

use super::{lookups::BindingPower, parser::Parser};

/// Type alias for type null denotation handler functions.
pub type TypeNUDHandler = fn(&mut Parser) -> Result<TypeAnnotation, Error>;

/// Type alias for type NUD lookup table.
pub type TypeNUDLookup = HashMap<TokenKind, TypeNUDHandler>;

/// Initializes the type parsing lookup table.
pub fn create_token_type_lookups(parser: &mut Parser) {
    parser.type_nud(TokenKind::Identifier, parse_symbol_type);
    parser.type_nud(TokenKind::OpenBracket, parse_array_type);
}

pub fn parse_symbol_type(parser: &mut Parser) -> Result<TypeAnnotation, Error> {
    let token = parser.expect(TokenKind::Identifier)?;
    Ok(TypeAnnotation::Symbol(SymbolType {
        name: token.value,
        position: token.span.start,
    }))
}

/// `[N]T` or `[_]T`
pub fn parse_array_type(parser: &mut Parser) -> Result<TypeAnnotation, Error> {
    let position = parser.expect(TokenKind::OpenBracket)?.span.start;

    let token = parser.advance().clone();
    let dimension = match token.kind {
        TokenKind::Identifier if token.value == "_" => DimensionAnnotation::Inferred,
        TokenKind::Number => match token.value.replace('_', "").parse::<usize>() {
            Ok(size) => DimensionAnnotation::Fixed(size),
            Err(_) => {
                return Err(Error::new(
                    ErrorImpl::NumberParseError { token: token.value },
                    token.span.start,
                ))
            }
        },
        _ => {
            return Err(Error::new(
                ErrorImpl::UnexpectedTokenDetailed {
                    token: token.value,
                    message: String::from("expected array size or `_`"),
                },
                token.span.start,
            ))
        }
    };

    parser.expect(TokenKind::CloseBracket)?;
    let underlying = parse_type(parser, BindingPower::Default)?;

    Ok(TypeAnnotation::Array(ArrayType {
        dimension,
        underlying: Box::new(underlying),
        position,
    }))
}

pub fn parse_type(parser: &mut Parser, _bp: BindingPower) -> Result<TypeAnnotation, Error> {
    let token_kind = parser.current_token_kind();
    let nud = match parser.get_type_nud_lookup().get(&token_kind) {
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

    nud(parser)
}
