//! Token-level parsers: barewords, integers, and quoted strings
use nom::branch::alt;
use nom::bytes::complete::take_while;
use nom::character::complete::{char, satisfy};
use nom::combinator::{map, recognize, verify};
use nom::sequence::pair;

pub(crate) mod int;
pub(crate) mod string;

use self::string::parse_string_literal;
use super::PResult;

pub(crate) fn is_bareword_first(chr: char) -> bool {
    chr.is_ascii_alphabetic() || matches!(chr, '_' | '#' | '@')
}

pub(crate) fn is_bareword_char(chr: char) -> bool {
    chr.is_ascii_alphanumeric() || matches!(chr, '_' | '-' | '#')
}

pub(crate) fn parse_bareword(input: &str) -> PResult<&str> {
    recognize(pair(satisfy(is_bareword_first), take_while(is_bareword_char)))(input)
}

/// A field name: a quoted string, a bareword (the keyword `where` is
/// reserved), or the wildcard `*`
pub(crate) fn parse_field_name(input: &str) -> PResult<String> {
    alt((
        parse_string_literal,
        map(
            verify(parse_bareword, |word: &str| word != "where"),
            String::from,
        ),
        map(char('*'), |_| String::from("*")),
    ))(input)
}
