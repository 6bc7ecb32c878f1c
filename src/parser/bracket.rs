//! The interior of bracketed accessors: indexes, slices, filters, sorts,
//! and field lists
use nom::branch::alt;
use nom::character::complete::{char, multispace0};
use nom::combinator::{cut, map, opt, value};
use nom::error::context;
use nom::multi::separated_list1;
use nom::sequence::{delimited, pair, preceded, terminated, tuple};

use crate::expr::{Expr, SortDirection, SortKey};

use super::filter::parse_predicate;
use super::primitive::int::parse_int;
use super::primitive::parse_field_name;
use super::{parse_child, PResult};

pub(crate) fn parse_bracketed(input: &str) -> PResult<Expr> {
    context(
        "bracket accessor",
        preceded(
            pair(char('['), multispace0),
            cut(terminated(
                parse_bracket_inner,
                pair(multispace0, char(']')),
            )),
        ),
    )(input)
}

fn parse_bracket_inner(input: &str) -> PResult<Expr> {
    alt((
        parse_slice,
        map(parse_int, Expr::Index),
        value(Expr::slice_all(), char('*')),
        parse_filter,
        parse_sort,
        parse_bracket_fields,
    ))(input)
}

/// A slice requires at least one `:`; a bare number is an `Index` and is
/// tried after this parser fails
fn parse_slice(input: &str) -> PResult<Expr> {
    map(
        tuple((
            opt(parse_int),
            preceded(multispace0, char(':')),
            preceded(multispace0, opt(parse_int)),
            opt(preceded(
                pair(multispace0, char(':')),
                preceded(multispace0, opt(parse_int)),
            )),
        )),
        |(start, _, end, step)| Expr::Slice {
            start,
            end,
            step: step.flatten(),
        },
    )(input)
}

fn parse_filter(input: &str) -> PResult<Expr> {
    map(
        context(
            "filter predicate",
            preceded(pair(char('?'), multispace0), parse_predicate),
        ),
        Expr::Filter,
    )(input)
}

fn parse_sort(input: &str) -> PResult<Expr> {
    map(
        separated_list1(
            delimited(multispace0, char(','), multispace0),
            parse_sort_key,
        ),
        Expr::Sort,
    )(input)
}

fn parse_sort_key(input: &str) -> PResult<SortKey> {
    map(
        pair(
            alt((
                value(SortDirection::Ascending, char('/')),
                value(SortDirection::Descending, char('\\')),
            )),
            preceded(multispace0, parse_child),
        ),
        |(direction, key)| SortKey { direction, key },
    )(input)
}

fn parse_bracket_fields(input: &str) -> PResult<Expr> {
    map(
        separated_list1(
            delimited(multispace0, char(','), multispace0),
            parse_field_name,
        ),
        Expr::Fields,
    )(input)
}

#[cfg(test)]
mod tests {
    use crate::expr::{Expr, SortDirection};

    use super::parse_bracketed;

    #[test]
    fn indexes_and_slices() {
        assert_eq!(parse_bracketed("[0]"), Ok(("", Expr::Index(0))));
        assert_eq!(parse_bracketed("[-1]"), Ok(("", Expr::Index(-1))));
        assert_eq!(
            parse_bracketed("[1:2:2]"),
            Ok((
                "",
                Expr::Slice {
                    start: Some(1),
                    end: Some(2),
                    step: Some(2),
                },
            )),
        );
        assert_eq!(
            parse_bracketed("[::2]"),
            Ok((
                "",
                Expr::Slice {
                    start: None,
                    end: None,
                    step: Some(2),
                },
            )),
        );
        assert_eq!(parse_bracketed("[*]"), Ok(("", Expr::slice_all())));
    }

    #[test]
    fn bracketed_fields() {
        assert_eq!(
            parse_bracketed("[name]"),
            Ok(("", Expr::field("name"))),
        );
        assert_eq!(
            parse_bracketed("['name',\"other\"]"),
            Ok(("", Expr::fields(["name", "other"]))),
        );
    }

    #[test]
    fn sort_keys() {
        let (_, sort) = parse_bracketed("[/cow,\\cat.tail]").unwrap();
        match sort {
            Expr::Sort(keys) => {
                assert_eq!(keys.len(), 2);
                assert_eq!(keys[0].direction, SortDirection::Ascending);
                assert_eq!(keys[0].key, Expr::field("cow"));
                assert_eq!(keys[1].direction, SortDirection::Descending);
                assert_eq!(
                    keys[1].key,
                    Expr::Child(Box::new(Expr::field("cat")), Box::new(Expr::field("tail"))),
                );
            }
            other => panic!("expected a sort, got {other:?}"),
        }
    }

    #[test]
    fn unbalanced_brackets_fail() {
        assert!(parse_bracketed("[0").is_err());
        assert!(parse_bracketed("[?]").is_err());
    }
}
