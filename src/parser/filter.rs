//! The filter predicate grammar used inside `[?...]` brackets
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{char, digit1, multispace0};
use nom::combinator::{map, map_opt, opt, recognize, value};
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, tuple};
use serde_json::Number;

use crate::expr::{CmpOp, FilterTerm, Literal, Predicate};

use super::primitive::string::parse_string_literal;
use super::{parse_child, PResult};

pub(crate) fn parse_predicate(input: &str) -> PResult<Predicate> {
    map(
        separated_list1(
            delimited(multispace0, char('&'), multispace0),
            parse_filter_term,
        ),
        Predicate,
    )(input)
}

fn parse_filter_term(input: &str) -> PResult<FilterTerm> {
    map(
        pair(
            parse_child,
            opt(pair(
                delimited(multispace0, parse_cmp_op, multispace0),
                parse_literal,
            )),
        ),
        |(path, comparison)| FilterTerm { path, comparison },
    )(input)
}

fn parse_cmp_op(input: &str) -> PResult<CmpOp> {
    alt((
        value(CmpOp::Eq, tag("==")),
        value(CmpOp::Gte, tag(">=")),
        value(CmpOp::Lte, tag("<=")),
        value(CmpOp::Eq, char('=')),
        value(CmpOp::Gt, char('>')),
        value(CmpOp::Lt, char('<')),
    ))(input)
}

fn parse_literal(input: &str) -> PResult<Literal> {
    alt((
        map(parse_string_literal, Literal::String),
        parse_number_literal,
        value(Literal::Bool(true), tag("true")),
        value(Literal::Bool(false), tag("false")),
        value(Literal::Null, tag("null")),
    ))(input)
}

fn parse_number_literal(input: &str) -> PResult<Literal> {
    map_opt(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit1)),
        ))),
        |text: &str| {
            let number = if text.contains('.') {
                Number::from_f64(text.parse().ok()?)
            } else {
                text.parse::<i64>().ok().map(Number::from)
            };
            number.map(Literal::Number)
        },
    )(input)
}
