//! The expression parser
//!
//! Grammar levels, loosest binding first: union (`|`), intersection (`&`),
//! `where`, descendants (`..`), child (`.`), and atoms. Bracketed accessors
//! bind tighter than `.`, so `objects[0]` is the same composition as
//! `objects.[0]`.
use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, multispace0, satisfy};
use nom::combinator::{all_consuming, cut, map, not, value, verify};
use nom::error::{context, VerboseError};
use nom::multi::{fold_many0, separated_list1};
use nom::sequence::{delimited, pair, preceded, terminated};
use nom::IResult;

use crate::expr::Expr;

pub(crate) mod bracket;
pub(crate) mod filter;
pub(crate) mod primitive;

use self::bracket::parse_bracketed;
use self::primitive::{is_bareword_char, parse_bareword, parse_field_name};

pub(crate) type PResult<'a, O> = IResult<&'a str, O, VerboseError<&'a str>>;

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_expr_main(input: &str) -> PResult<Expr> {
    all_consuming(delimited(multispace0, parse_expr, multispace0))(input)
}

#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", parent = None, ret, err))]
pub(crate) fn parse_expr(input: &str) -> PResult<Expr> {
    parse_union(input)
}

fn parse_union(input: &str) -> PResult<Expr> {
    let (input, first) = parse_intersect(input)?;
    fold_many0(
        preceded(
            delimited(multispace0, char('|'), multispace0),
            parse_intersect,
        ),
        move || first.clone(),
        Expr::union,
    )(input)
}

fn parse_intersect(input: &str) -> PResult<Expr> {
    let (input, first) = parse_where(input)?;
    fold_many0(
        preceded(delimited(multispace0, char('&'), multispace0), parse_where),
        move || first.clone(),
        Expr::intersect,
    )(input)
}

fn parse_where(input: &str) -> PResult<Expr> {
    let (input, first) = parse_descend(input)?;
    fold_many0(
        preceded(
            delimited(multispace0, parse_where_keyword, multispace0),
            parse_descend,
        ),
        move || first.clone(),
        Expr::where_,
    )(input)
}

fn parse_where_keyword(input: &str) -> PResult<&str> {
    verify(parse_bareword, |word: &str| word == "where")(input)
}

fn parse_descend(input: &str) -> PResult<Expr> {
    let (input, first) = parse_child(input)?;
    fold_many0(
        preceded(delimited(multispace0, tag(".."), multispace0), parse_child),
        move || first.clone(),
        Expr::descendants,
    )(input)
}

pub(crate) fn parse_child(input: &str) -> PResult<Expr> {
    let (input, first) = parse_postfixed(input)?;
    fold_many0(
        preceded(parse_child_sep, parse_postfixed),
        move || first.clone(),
        |left, right| Expr::Child(Box::new(left), Box::new(right)),
    )(input)
}

/// A single `.`, rejecting the `..` descendant form
fn parse_child_sep(input: &str) -> PResult<char> {
    delimited(
        multispace0,
        terminated(char('.'), not(char('.'))),
        multispace0,
    )(input)
}

/// An atom followed by any number of directly attached bracket accessors
fn parse_postfixed(input: &str) -> PResult<Expr> {
    let (input, atom) = parse_atom(input)?;
    fold_many0(
        preceded(multispace0, parse_bracketed),
        move || atom.clone(),
        |left, right| Expr::Child(Box::new(left), Box::new(right)),
    )(input)
}

fn parse_atom(input: &str) -> PResult<Expr> {
    context(
        "expression atom",
        alt((
            value(Expr::Root, char('$')),
            parse_named_operator,
            parse_this,
            parse_bracketed,
            parse_parens,
            parse_fieldset,
        )),
    )(input)
}

/// A standalone `@`; with a bareword continuation attached it is a field
/// name instead
fn parse_this(input: &str) -> PResult<Expr> {
    value(
        Expr::This,
        terminated(char('@'), not(satisfy(is_bareword_char))),
    )(input)
}

fn parse_named_operator(input: &str) -> PResult<Expr> {
    map(
        context(
            "named operator",
            preceded(
                char('`'),
                cut(terminated(take_while1(|c| c != '`'), char('`'))),
            ),
        ),
        |name: &str| Expr::NamedOperator(name.to_owned()),
    )(input)
}

fn parse_parens(input: &str) -> PResult<Expr> {
    context(
        "parenthesized expression",
        preceded(
            pair(char('('), multispace0),
            cut(terminated(parse_expr, pair(multispace0, char(')')))),
        ),
    )(input)
}

fn parse_fieldset(input: &str) -> PResult<Expr> {
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
    use crate::expr::Expr;

    use super::{parse_expr, parse_expr_main};

    fn parsed(input: &str) -> Expr {
        let (_, expr) = parse_expr_main(input).expect("parses expression");
        expr
    }

    #[test]
    fn atomic() {
        let cases = [
            ("foo", Expr::field("foo")),
            ("*", Expr::field("*")),
            ("baz,bizzle", Expr::fields(["baz", "bizzle"])),
            ("[1]", Expr::Index(1)),
            (
                "[1:]",
                Expr::Slice {
                    start: Some(1),
                    end: None,
                    step: None,
                },
            ),
            ("[:]", Expr::slice_all()),
            ("[*]", Expr::slice_all()),
            (
                "[:2]",
                Expr::Slice {
                    start: None,
                    end: Some(2),
                    step: None,
                },
            ),
            (
                "[1:2]",
                Expr::Slice {
                    start: Some(1),
                    end: Some(2),
                    step: None,
                },
            ),
            ("$", Expr::Root),
            ("@", Expr::This),
            ("`parent`", Expr::NamedOperator(String::from("parent"))),
        ];
        for (input, expected) in cases {
            assert_eq!(parsed(input), expected, "parsing {input:?}");
        }
    }

    #[test]
    fn nested() {
        let cases = [
            (
                "foo.baz",
                Expr::Child(Box::new(Expr::field("foo")), Box::new(Expr::field("baz"))),
            ),
            (
                "foo.baz,bizzle",
                Expr::Child(
                    Box::new(Expr::field("foo")),
                    Box::new(Expr::fields(["baz", "bizzle"])),
                ),
            ),
            (
                "foo where baz",
                Expr::where_(Expr::field("foo"), Expr::field("baz")),
            ),
            (
                "foo..baz",
                Expr::descendants(Expr::field("foo"), Expr::field("baz")),
            ),
            (
                "foo..baz.bing",
                Expr::descendants(
                    Expr::field("foo"),
                    Expr::Child(Box::new(Expr::field("baz")), Box::new(Expr::field("bing"))),
                ),
            ),
            (
                "foo|baz",
                Expr::union(Expr::field("foo"), Expr::field("baz")),
            ),
            (
                "foo&baz",
                Expr::intersect(Expr::field("foo"), Expr::field("baz")),
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(parsed(input), expected, "parsing {input:?}");
        }
    }

    #[test]
    fn bracket_binds_tighter_than_dot() {
        assert_eq!(
            parsed("objects[1]"),
            Expr::Child(Box::new(Expr::field("objects")), Box::new(Expr::Index(1))),
        );
        assert_eq!(parsed("objects[1]"), parsed("objects.[1]"));
    }

    #[test]
    fn where_binds_looser_than_descend() {
        assert_eq!(
            parsed("* where flag..bar"),
            Expr::where_(
                Expr::field("*"),
                Expr::descendants(Expr::field("flag"), Expr::field("bar")),
            ),
        );
        assert_eq!(
            parsed("(* where flag)..bar"),
            Expr::descendants(
                Expr::where_(Expr::field("*"), Expr::field("flag")),
                Expr::field("bar"),
            ),
        );
    }

    #[test]
    fn quoted_and_marked_fields() {
        assert_eq!(parsed("\"fuzz.bang\""), Expr::field("fuzz.bang"));
        assert_eq!(
            parsed("a.#text"),
            Expr::Child(Box::new(Expr::field("a")), Box::new(Expr::field("#text"))),
        );
        assert_eq!(parsed("@foo"), Expr::field("@foo"));
        assert_eq!(
            parsed("fuzz.*"),
            Expr::Child(Box::new(Expr::field("fuzz")), Box::new(Expr::field("*"))),
        );
    }

    #[test]
    fn whitespace_is_insignificant() {
        assert_eq!(parsed(" foo . baz "), parsed("foo.baz"));
        assert_eq!(parsed("foo | baz"), parsed("foo|baz"));
        assert_eq!(parsed("[ 1 : 2 ]"), parsed("[1:2]"));
    }

    #[test]
    fn rejects_malformed_input() {
        for input in [
            "?",
            "$.foo.bar.%",
            "'unterminated",
            "\"mismatched'",
            "`this",
            "foo.",
            "(foo",
            "[",
            "[]",
            "foo|",
            "",
        ] {
            assert!(parse_expr_main(input).is_err(), "accepted {input:?}");
        }
    }

    #[test]
    fn trailing_input_is_rejected() {
        assert!(parse_expr("foo]").is_ok());
        assert!(parse_expr_main("foo]").is_err());
    }

    #[test]
    fn round_trips_canonical_strings() {
        for input in [
            "$",
            "@",
            "foo.baz",
            "foo..baz",
            "foo,bar",
            "foo where baz",
            "foo|bar.baz",
            "[2]",
            "[1:2]",
            "[*]",
            "foo.[?cow>5&cat=2]",
            "foo.[/cow,\\cat]",
            "`parent`",
        ] {
            let expr = parsed(input);
            assert_eq!(parsed(&expr.to_string()), expr, "round-tripping {input:?}");
        }
    }
}
