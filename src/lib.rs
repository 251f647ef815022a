#![allow(clippy::module_inception)]

use std::rc::Rc;

use crate::{
    errors::errors::{Error, ErrorTip},
    lexer::lexer::tokenize,
    parser::parser::parse,
    type_checker::type_checker::{type_check, TypeChecker},
};

pub mod ast;
pub mod errors;
pub mod lexer;
pub mod macros;
pub mod parser;
pub mod type_checker;

extern crate regex;

#[derive(Debug, Clone, PartialEq)]
pub struct Position(pub u32, pub Rc<String>);

impl Position {
    pub fn null() -> Self {
        Position(0, Rc::new(String::from("<null>")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

/// Runs the whole front end over `source`.
///
/// Lexer and parser errors abort and are returned as `Err`; type errors are
/// accumulated on the returned checker.
pub fn check_source(source: &str, file: &str) -> Result<TypeChecker, Error> {
    let tokens = tokenize(source.to_string(), Some(file.to_string()))?;
    let (_, ast) = parse(tokens, Rc::new(file.to_string()));
    Ok(type_check(&ast?))
}

/// Returns the 1-based line number, the line text and the column of `position`.
pub fn get_line_at_position(content: &str, position: u32) -> Option<(usize, String, usize)> {
    let pos = position as usize;

    // Errors reported at EOF point just past the last character.
    if pos > content.len() {
        return None;
    }

    let mut start = 0;
    let mut line_number = 1;

    for line in content.split_inclusive('\n') {
        let end = start + line.len();

        if (start..end).contains(&pos) {
            return Some((line_number, line.to_string(), pos - start));
        }

        start = end;
        line_number += 1;
    }

    let last = content.lines().last().unwrap_or("");
    Some((line_number.saturating_sub(1).max(1), last.to_string(), last.len()))
}

/// Renders an error in the compiler's caret format:
///
/// ```text
/// Error: Name (tip)
/// -> main.cx
///   |
/// 1 | val x : i8 = 300
///   | -------------^
/// ```
pub fn render_error(error: &Error, source: &str, file: &str) -> String {
    let mut out = String::new();

    if let ErrorTip::None = error.get_tip() {
        out.push_str(&format!("Error: {}: {}\n", error.get_error_name(), error));
    } else {
        out.push_str(&format!(
            "Error: {}: {} ({})\n",
            error.get_error_name(),
            error,
            error.get_tip()
        ));
    }
    out.push_str(&format!("-> {}\n", file));

    let Some((line, line_text, line_pos)) = get_line_at_position(source, error.get_position().0)
    else {
        return out;
    };

    let line_string = line.to_string();
    let padding = line_string.len() + 2;

    out.push_str(&format!("{:>padding$}\n", "|"));

    let (line_text_removed, removed_whitespace) = remove_starting_whitespace(&line_text);
    out.push_str(&format!("{} | {}\n", line_string, line_text_removed.trim_end()));

    let arrows = line_pos.saturating_sub(removed_whitespace) + 1;
    out.push_str(&format!("{:>padding$} {:->arrows$}", "|", "^"));

    out
}

pub fn display_error(error: &Error, source: &str, file: &str) {
    eprintln!("{}", render_error(error, source, file));
}

fn remove_starting_whitespace(string: &str) -> (String, usize) {
    let mut start = 0;
    for c in string.chars() {
        if c == ' ' {
            start += 1;
        } else {
            break;
        }
    }

    (String::from(&string[start..]), start)
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_get_line_at_position() {
        let content = "Hello, world!\nfoo\nbar\nTesting { }\n";

        let (line_number, line, line_pos) = super::get_line_at_position(content, 10).unwrap();
        assert_eq!(line_number, 1);
        assert_eq!(line, "Hello, world!\n");
        assert_eq!(line_pos, 10);

        let (line_number, line, line_pos) = super::get_line_at_position(content, 30).unwrap();
        assert_eq!(line_number, 4);
        assert_eq!(line, "Testing { }\n");
        assert_eq!(line_pos, 8);
    }

    #[test]
    fn test_position_past_end() {
        assert!(super::get_line_at_position("abc", 10).is_none());
    }

    #[test]
    fn test_render_error_points_at_column() {
        use crate::errors::errors::{Error, ErrorImpl};
        use crate::Position;
        use std::rc::Rc;

        let source = "val x : i8 = 300\n";
        let error = Error::new(
            ErrorImpl::LiteralOutOfRange {
                value: String::from("300"),
                target: String::from("i8"),
            },
            Position(13, Rc::new(String::from("main.cx"))),
        );

        let rendered = super::render_error(&error, source, "main.cx");
        assert!(rendered.starts_with("Error: LiteralOutOfRange"));
        assert!(rendered.contains("1 | val x : i8 = 300"));
        assert!(rendered.lines().last().unwrap().ends_with('^'));
    }
}
