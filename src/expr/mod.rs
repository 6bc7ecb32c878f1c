//! The abstract syntax of extended JSONPath expressions
//!
//! An [`Expr`] is produced by the parser and is immutable thereafter. Each
//! variant carries the data needed by the three evaluation modes, which live
//! in the sibling modules: [`find`](Expr::find), [`update`](Expr::update),
//! and the [`include`](Expr::include)/[`exclude`](Expr::exclude) projections.
use serde_json::{Number, Value};

mod find;
mod project;
mod update;

/// A node in the abstract syntax tree of an extended JSONPath expression
///
/// The [`Display`][std::fmt::Display] implementation renders the canonical
/// textual form of the expression; for the non-ambiguous subset of the
/// language, parsing that form yields a structurally equal tree.
#[derive(Debug, PartialEq, Clone)]
pub enum Expr {
    /// The document root, i.e., `$`
    Root,
    /// The datum currently under evaluation, i.e., `@`
    This,
    /// One or more object field accessors, e.g., `foo` or `foo,bar`
    ///
    /// The literal name `*` selects every field present.
    Fields(Vec<String>),
    /// An array element accessor, e.g., `[2]`
    ///
    /// Negative indexes address elements relative to the end of the array.
    Index(isize),
    /// An array slice, e.g., `[1:]` or `[::2]`
    ///
    /// With all three bounds absent this is the `[*]` form, which selects
    /// every element.
    Slice {
        /// First selected position; defaults to the start of the array
        start: Option<isize>,
        /// First position past the selection; defaults to the end
        end: Option<isize>,
        /// Selection stride; defaults to `1`
        step: Option<isize>,
    },
    /// Sequential composition: match the left, then the right at each match
    Child(Box<Expr>, Box<Expr>),
    /// Match the right at each left match and at every descendant of it
    Descendants(Box<Expr>, Box<Expr>),
    /// Each left match whose right-hand predicate matches non-empty
    Where(Box<Expr>, Box<Expr>),
    /// Concatenation of both operands' matches
    Union(Box<Expr>, Box<Expr>),
    /// Reserved; evaluation produces [`EvalError`][crate::EvalError]
    Intersect(Box<Expr>, Box<Expr>),
    /// The bracketed predicate form `[?expr]`
    Filter(Predicate),
    /// The bracketed sort forms `[/key]` and `[\key]`
    Sort(Vec<SortKey>),
    /// A back-tick named operator such as `` `this` `` or `` `parent` ``
    NamedOperator(String),
}

impl Expr {
    /// Compose two expressions sequentially, collapsing trivial operands
    ///
    /// `This` and `Root` on the left, and `This` on the right, are identity
    /// elements for composition; this keeps synthesized paths free of
    /// redundant `@.` prefixes.
    pub fn child(left: Expr, right: Expr) -> Expr {
        match (left, right) {
            (Expr::This | Expr::Root, r) => r,
            (l, Expr::This) => l,
            (l, r) => Expr::Child(Box::new(l), Box::new(r)),
        }
    }

    /// A single-field accessor
    pub fn field(name: impl Into<String>) -> Expr {
        Expr::Fields(vec![name.into()])
    }

    /// A multi-field accessor
    pub fn fields<I, S>(names: I) -> Expr
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Expr::Fields(names.into_iter().map(Into::into).collect())
    }

    /// An array slice with every bound absent, i.e., `[*]`
    pub fn slice_all() -> Expr {
        Expr::Slice {
            start: None,
            end: None,
            step: None,
        }
    }

    pub(crate) fn descendants(left: Expr, right: Expr) -> Expr {
        Expr::Descendants(Box::new(left), Box::new(right))
    }

    pub(crate) fn where_(left: Expr, right: Expr) -> Expr {
        Expr::Where(Box::new(left), Box::new(right))
    }

    pub(crate) fn union(left: Expr, right: Expr) -> Expr {
        Expr::Union(Box::new(left), Box::new(right))
    }

    pub(crate) fn intersect(left: Expr, right: Expr) -> Expr {
        Expr::Intersect(Box::new(left), Box::new(right))
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Root => write!(f, "$"),
            Expr::This => write!(f, "@"),
            Expr::Fields(names) => write!(f, "{names}", names = names.join(",")),
            Expr::Index(i) => write!(f, "[{i}]"),
            Expr::Slice { start, end, step } => {
                if start.is_none() && end.is_none() && step.is_none() {
                    return write!(f, "[*]");
                }
                write!(f, "[")?;
                if let Some(start) = start {
                    write!(f, "{start}")?;
                }
                write!(f, ":")?;
                if let Some(end) = end {
                    write!(f, "{end}")?;
                }
                if let Some(step) = step {
                    write!(f, ":{step}")?;
                }
                write!(f, "]")
            }
            Expr::Child(l, r) => write!(f, "{l}.{r}"),
            Expr::Descendants(l, r) => write!(f, "{l}..{r}"),
            Expr::Where(l, r) => write!(f, "{l} where {r}"),
            Expr::Union(l, r) => write!(f, "{l}|{r}"),
            Expr::Intersect(l, r) => write!(f, "{l}&{r}"),
            Expr::Filter(pred) => write!(f, "[?{pred}]"),
            Expr::Sort(keys) => {
                write!(f, "[")?;
                for (i, k) in keys.iter().enumerate() {
                    write!(f, "{k}{comma}", comma = if i == keys.len() - 1 { "" } else { "," })?;
                }
                write!(f, "]")
            }
            Expr::NamedOperator(name) => write!(f, "`{name}`"),
        }
    }
}

/// A filter predicate: the conjunction of one or more terms
///
/// Appears in the bracketed `[?a>1&b]` form. Terms are evaluated left to
/// right with short-circuiting.
#[derive(Debug, PartialEq, Clone)]
pub struct Predicate(pub(crate) Vec<FilterTerm>);

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, term) in self.0.iter().enumerate() {
            write!(f, "{term}{amp}", amp = if i == self.0.len() - 1 { "" } else { "&" })?;
        }
        Ok(())
    }
}

/// A single term of a filter predicate
///
/// A bare term is an existence test on its path; with a comparison attached
/// it is satisfied when at least one match of the path satisfies the
/// comparison.
#[derive(Debug, PartialEq, Clone)]
pub struct FilterTerm {
    pub(crate) path: Expr,
    pub(crate) comparison: Option<(CmpOp, Literal)>,
}

impl std::fmt::Display for FilterTerm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{path}", path = self.path)?;
        if let Some((op, lit)) = &self.comparison {
            write!(f, "{op}{lit}")?;
        }
        Ok(())
    }
}

/// A comparison operator within a filter term
///
/// The surface forms `=` and `==` both denote [`CmpOp::Eq`].
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum CmpOp {
    Eq,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl std::fmt::Display for CmpOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CmpOp::Eq => write!(f, "="),
            CmpOp::Gt => write!(f, ">"),
            CmpOp::Lt => write!(f, "<"),
            CmpOp::Gte => write!(f, ">="),
            CmpOp::Lte => write!(f, "<="),
        }
    }
}

/// A literal on the right-hand side of a filter comparison
#[derive(Debug, PartialEq, Clone)]
pub enum Literal {
    Number(Number),
    String(String),
    Bool(bool),
    Null,
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => write!(f, "'{s}'"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Null => write!(f, "null"),
        }
    }
}

/// One key of a bracketed sort: a direction and the sub-path it orders by
#[derive(Debug, PartialEq, Clone)]
pub struct SortKey {
    pub(crate) direction: SortDirection,
    pub(crate) key: Expr,
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{dir}{key}", dir = self.direction, key = self.key)
    }
}

/// Sort direction marker: `/` ascending, `\` descending
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortDirection::Ascending => write!(f, "/"),
            SortDirection::Descending => write!(f, "\\"),
        }
    }
}

/// Render a scalar the way it appears in synthesized identifiers and CLI
/// output: strings bare, everything else as compact JSON.
pub(crate) fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::{CmpOp, Expr, FilterTerm, Literal, Predicate, SortDirection, SortKey};

    #[test]
    fn child_collapses_identities() {
        assert_eq!(Expr::child(Expr::This, Expr::field("foo")), Expr::field("foo"));
        assert_eq!(Expr::child(Expr::Root, Expr::field("foo")), Expr::field("foo"));
        assert_eq!(Expr::child(Expr::field("foo"), Expr::This), Expr::field("foo"));
        assert_eq!(
            Expr::child(Expr::field("foo"), Expr::field("bar")),
            Expr::Child(Box::new(Expr::field("foo")), Box::new(Expr::field("bar"))),
        );
    }

    #[test]
    fn canonical_strings() {
        let cases = [
            (Expr::Root, "$"),
            (Expr::This, "@"),
            (Expr::fields(["foo", "bar"]), "foo,bar"),
            (Expr::Index(3), "[3]"),
            (Expr::slice_all(), "[*]"),
            (
                Expr::Slice {
                    start: Some(1),
                    end: None,
                    step: None,
                },
                "[1:]",
            ),
            (
                Expr::Slice {
                    start: None,
                    end: Some(2),
                    step: Some(2),
                },
                "[:2:2]",
            ),
            (
                Expr::child(Expr::field("foo"), Expr::field("baz")),
                "foo.baz",
            ),
            (
                Expr::descendants(Expr::field("foo"), Expr::field("baz")),
                "foo..baz",
            ),
            (
                Expr::where_(Expr::field("foo"), Expr::field("baz")),
                "foo where baz",
            ),
            (
                Expr::union(Expr::field("foo"), Expr::field("baz")),
                "foo|baz",
            ),
            (Expr::NamedOperator(String::from("parent")), "`parent`"),
        ];
        for (expr, expected) in cases {
            assert_eq!(expr.to_string(), expected);
        }
    }

    #[test]
    fn filter_and_sort_strings() {
        let filter = Expr::Filter(Predicate(vec![
            FilterTerm {
                path: Expr::field("cow"),
                comparison: Some((CmpOp::Gt, Literal::Number(5.into()))),
            },
            FilterTerm {
                path: Expr::field("cat"),
                comparison: None,
            },
        ]));
        assert_eq!(filter.to_string(), "[?cow>5&cat]");

        let sort = Expr::Sort(vec![
            SortKey {
                direction: SortDirection::Ascending,
                key: Expr::field("cow"),
            },
            SortKey {
                direction: SortDirection::Descending,
                key: Expr::field("cat"),
            },
        ]);
        assert_eq!(sort.to_string(), "[/cow,\\cat]");
    }
}
