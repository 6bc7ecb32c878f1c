//! Quoted string literals
//!
//! Field names may be single- or double-quoted; the other quote character
//! is an ordinary content character, and a backslash escapes the delimiter,
//! itself, and the usual control shorthands.
use nom::branch::alt;
use nom::bytes::complete::is_not;
use nom::character::complete::{anychar, char};
use nom::combinator::{cut, map, value, verify};
use nom::error::context;
use nom::multi::fold_many0;
use nom::sequence::{delimited, preceded};

use crate::parser::PResult;

#[derive(Debug, Copy, Clone)]
enum Quotes {
    Single,
    Double,
}

fn parse_escaped_char(input: &str) -> PResult<char> {
    preceded(
        char('\\'),
        alt((
            value('\u{0008}', char('b')),
            value('\u{0009}', char('t')),
            value('\u{000A}', char('n')),
            value('\u{000C}', char('f')),
            value('\u{000D}', char('r')),
            anychar,
        )),
    )(input)
}

fn parse_unescaped(quoted_with: Quotes) -> impl Fn(&str) -> PResult<&str> {
    move |input: &str| {
        let not_quote_slash = match quoted_with {
            Quotes::Single => is_not("'\\"),
            Quotes::Double => is_not("\"\\"),
        };
        verify(not_quote_slash, |s: &str| !s.is_empty())(input)
    }
}

enum StringFragment<'a> {
    Literal(&'a str),
    EscapedChar(char),
}

fn parse_fragment(quoted_with: Quotes) -> impl Fn(&str) -> PResult<StringFragment<'_>> {
    move |input: &str| {
        alt((
            map(parse_unescaped(quoted_with), StringFragment::Literal),
            map(parse_escaped_char, StringFragment::EscapedChar),
        ))(input)
    }
}

fn parse_internal(quoted_with: Quotes) -> impl Fn(&str) -> PResult<String> {
    move |input: &str| {
        fold_many0(
            parse_fragment(quoted_with),
            String::new,
            |mut string, fragment| {
                match fragment {
                    StringFragment::Literal(s) => string.push_str(s),
                    StringFragment::EscapedChar(c) => string.push(c),
                }
                string
            },
        )(input)
    }
}

fn parse_single_quoted(input: &str) -> PResult<String> {
    context(
        "single quoted string",
        delimited(char('\''), parse_internal(Quotes::Single), cut(char('\''))),
    )(input)
}

fn parse_double_quoted(input: &str) -> PResult<String> {
    context(
        "double quoted string",
        delimited(char('"'), parse_internal(Quotes::Double), cut(char('"'))),
    )(input)
}

pub(crate) fn parse_string_literal(input: &str) -> PResult<String> {
    alt((parse_single_quoted, parse_double_quoted))(input)
}

#[cfg(test)]
mod tests {
    use super::parse_string_literal;

    #[test]
    fn double_quoted() {
        assert_eq!(
            parse_string_literal("\"hello\""),
            Ok(("", String::from("hello")))
        );
        assert_eq!(
            parse_string_literal(r#""doublequote\"""#),
            Ok(("", String::from("doublequote\"")))
        );
        assert_eq!(
            parse_string_literal("\"singlequote'\""),
            Ok(("", String::from("singlequote'")))
        );
        assert_eq!(
            parse_string_literal("\"fuzz.bang\""),
            Ok(("", String::from("fuzz.bang")))
        );
    }

    #[test]
    fn single_quoted() {
        assert_eq!(
            parse_string_literal("'goodbye'"),
            Ok(("", String::from("goodbye")))
        );
        assert_eq!(
            parse_string_literal("'doublequote\"'"),
            Ok(("", String::from("doublequote\"")))
        );
        assert_eq!(
            parse_string_literal(r"'singlequote\''"),
            Ok(("", String::from("singlequote'")))
        );
        assert_eq!(
            parse_string_literal(r"'back\\slash'"),
            Ok(("", String::from("back\\slash")))
        );
    }

    #[test]
    fn escape_shorthands() {
        assert_eq!(
            parse_string_literal(r#""tab\there""#),
            Ok(("", String::from("tab\there")))
        );
        assert_eq!(
            parse_string_literal(r#""line\nbreak""#),
            Ok(("", String::from("line\nbreak")))
        );
    }

    #[test]
    fn unterminated_quotes_fail() {
        assert!(parse_string_literal("'\"").is_err());
        assert!(parse_string_literal("\"'").is_err());
        assert!(parse_string_literal("'`").is_err());
        assert!(parse_string_literal("\"never closed").is_err());
    }
}
