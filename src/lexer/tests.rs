//! Unit tests for the lexer module.
//!
//! This module contains tests for tokenization including:
//! - Keywords, identifiers and labels
//! - Numeric literals (integers, separators and floats)
//! - String literals with escape sequences
//! - Operators, ranges and punctuation
//! - Comments
//! - Error cases

use super::{lexer::tokenize, tokens::TokenKind};

fn kinds(source: &str) -> Vec<TokenKind> {
    tokenize(source.to_string(), Some("test.cx".to_string()))
        .unwrap()
        .into_iter()
        .map(|token| token.kind)
        .collect()
}

#[test]
fn test_tokenize_keywords() {
    let source = "val mut func return if else for in while break continue true false undef";

    assert_eq!(
        kinds(source),
        vec![
            TokenKind::Val,
            TokenKind::Mut,
            TokenKind::Func,
            TokenKind::Return,
            TokenKind::If,
            TokenKind::Else,
            TokenKind::For,
            TokenKind::In,
            TokenKind::While,
            TokenKind::Break,
            TokenKind::Continue,
            TokenKind::True,
            TokenKind::False,
            TokenKind::Undef,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_identifiers() {
    let source = "foo bar baz_123 _underscore _ CamelCase".to_string();
    let tokens = tokenize(source, Some("test.cx".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Identifier);
    assert_eq!(tokens[0].value, "foo");
    assert_eq!(tokens[2].value, "baz_123");
    assert_eq!(tokens[3].value, "_underscore");
    assert_eq!(tokens[4].kind, TokenKind::Identifier);
    assert_eq!(tokens[4].value, "_");
    assert_eq!(tokens[5].value, "CamelCase");
    assert_eq!(tokens[6].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_labels() {
    let source = "'outer for break 'outer".to_string();
    let tokens = tokenize(source, Some("test.cx".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Label);
    assert_eq!(tokens[0].value, "outer");
    assert_eq!(tokens[1].kind, TokenKind::For);
    assert_eq!(tokens[2].kind, TokenKind::Break);
    assert_eq!(tokens[3].kind, TokenKind::Label);
}

#[test]
fn test_tokenize_numbers() {
    let source = "42 3.14 0 300_000_000_000 1_0.5".to_string();
    let tokens = tokenize(source, Some("test.cx".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Number);
    assert_eq!(tokens[0].value, "42");
    assert_eq!(tokens[1].value, "3.14");
    assert_eq!(tokens[2].value, "0");
    assert_eq!(tokens[3].value, "300_000_000_000");
    assert_eq!(tokens[4].value, "1_0.5");
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_ranges_are_not_floats() {
    assert_eq!(
        kinds("1..10 0..=5 ..n x.."),
        vec![
            TokenKind::Number,
            TokenKind::DotDot,
            TokenKind::Number,
            TokenKind::Number,
            TokenKind::DotDotEquals,
            TokenKind::Number,
            TokenKind::DotDot,
            TokenKind::Identifier,
            TokenKind::Identifier,
            TokenKind::DotDot,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_strings() {
    let source = r#""hello" "multiple words""#.to_string();
    let tokens = tokenize(source, Some("test.cx".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::String);
    assert_eq!(tokens[0].value, "hello");
    assert_eq!(tokens[1].value, "multiple words");
    assert_eq!(tokens[2].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_string_escapes() {
    let source = r#""hello\nworld" "tab\there" "backslash\\" "hex\x41" "quote\"test""#.to_string();
    let tokens = tokenize(source, Some("test.cx".to_string())).unwrap();

    assert_eq!(tokens[0].value, "hello\nworld");
    assert_eq!(tokens[1].value, "tab\there");
    assert_eq!(tokens[2].value, "backslash\\");
    assert_eq!(tokens[3].value, "hexA");
    assert_eq!(tokens[4].value, "quote\"test");
    assert_eq!(tokens[5].kind, TokenKind::EOF);
}

#[test]
fn test_tokenize_operators() {
    assert_eq!(
        kinds("+ - * / \\ % == != < > <= >= = && || !"),
        vec![
            TokenKind::Plus,
            TokenKind::Dash,
            TokenKind::Star,
            TokenKind::Slash,
            TokenKind::Backslash,
            TokenKind::Percent,
            TokenKind::Equals,
            TokenKind::NotEquals,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::LessEquals,
            TokenKind::GreaterEquals,
            TokenKind::Assignment,
            TokenKind::And,
            TokenKind::Or,
            TokenKind::Not,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_punctuation() {
    assert_eq!(
        kinds("( ) { } [ ] . , ; : ->"),
        vec![
            TokenKind::OpenParen,
            TokenKind::CloseParen,
            TokenKind::OpenCurly,
            TokenKind::CloseCurly,
            TokenKind::OpenBracket,
            TokenKind::CloseBracket,
            TokenKind::Dot,
            TokenKind::Comma,
            TokenKind::Semicolon,
            TokenKind::Colon,
            TokenKind::Arrow,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_compound_operators() {
    assert_eq!(
        kinds("+= -= *= /="),
        vec![
            TokenKind::PlusEquals,
            TokenKind::MinusEquals,
            TokenKind::StarEquals,
            TokenKind::SlashEquals,
            TokenKind::EOF,
        ]
    );
}

#[test]
fn test_tokenize_comments() {
    let source = "val x = 5 // this is a comment\nval y = 10".to_string();
    let tokens = tokenize(source, Some("test.cx".to_string())).unwrap();

    assert_eq!(tokens[0].kind, TokenKind::Val);
    assert_eq!(tokens[1].value, "x");
    assert_eq!(tokens[2].kind, TokenKind::Assignment);
    assert_eq!(tokens[3].value, "5");
    assert_eq!(tokens[4].kind, TokenKind::Val);
    assert_eq!(tokens[5].value, "y");
    assert_eq!(tokens[7].value, "10");
    assert_eq!(tokens[8].kind, TokenKind::EOF);
}

#[test]
fn test_token_spans() {
    let source = "val answer = 42".to_string();
    let tokens = tokenize(source, Some("test.cx".to_string())).unwrap();

    assert_eq!(tokens[1].span.start.0, 4);
    assert_eq!(tokens[1].span.end.0, 10);
    assert_eq!(tokens[3].span.start.0, 13);
    assert_eq!(*tokens[3].span.start.1, "test.cx");
}

#[test]
fn test_tokenize_unrecognised_character() {
    let result = tokenize("val x = 4 @ 2".to_string(), Some("test.cx".to_string()));

    let error = result.unwrap_err();
    assert_eq!(error.get_error_name(), "UnrecognisedToken");
    assert_eq!(error.get_position().0, 10);
}

#[test]
fn test_tokenize_empty_source() {
    assert_eq!(kinds(""), vec![TokenKind::EOF]);
}
