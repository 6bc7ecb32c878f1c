//! Matched values in context: the result type of `find`
use std::borrow::Cow;
use std::rc::Rc;
use std::slice::Iter;

use serde::Serialize;
use serde_json::Value;

use crate::expr::{scalar_text, Expr};

/// A matched value together with the symbolic path taken to reach it
///
/// Every result of a [`find`][crate::JsonPath::find] is a `Datum`: the
/// matched `value`, the `path` fragment for the step taken from its parent
/// match, and a `context` link to that parent. Walking the context chain and
/// composing the fragments yields the [`full_path`][Datum::full_path] of the
/// match.
///
/// # Example
/// ```rust
/// # use serde_json::json;
/// # use serde_json_query::JsonPath;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let value = json!({"foo": {"bar": [1, 2]}});
/// let path = JsonPath::parse("foo.bar.[1]")?;
/// let matches = path.find(&value)?;
/// let datum = matches.exactly_one().unwrap();
/// assert_eq!(datum.value(), 2);
/// assert_eq!(datum.full_path().to_string(), "foo.bar.[1]");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct Datum<'a> {
    pub(crate) value: Cow<'a, Value>,
    pub(crate) path: Expr,
    pub(crate) context: Option<Rc<Datum<'a>>>,
}

impl<'a> Datum<'a> {
    /// Wrap a value as the head of a context chain
    pub(crate) fn wrap(value: &'a Value) -> Self {
        Self {
            value: Cow::Borrowed(value),
            path: Expr::This,
            context: None,
        }
    }

    pub(crate) fn step(value: &'a Value, path: Expr, context: &Rc<Datum<'a>>) -> Self {
        Self {
            value: Cow::Borrowed(value),
            path,
            context: Some(Rc::clone(context)),
        }
    }

    /// The matched value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The matched value at the lifetime of the queried document, or `None`
    /// for synthesized values that have no location in it
    pub(crate) fn borrowed_value(&self) -> Option<&'a Value> {
        match &self.value {
            Cow::Borrowed(value) => Some(value),
            Cow::Owned(_) => None,
        }
    }

    /// Take ownership of the matched value, cloning when it is borrowed from
    /// the queried document
    pub fn into_value(self) -> Value {
        self.value.into_owned()
    }

    /// The path fragment for the step taken from the parent match
    pub fn path(&self) -> &Expr {
        &self.path
    }

    /// The parent match, when this datum was reached through one
    pub fn context(&self) -> Option<&Datum<'a>> {
        self.context.as_deref()
    }

    /// The full path from the root of the queried document to this datum
    ///
    /// Composed left-associatively from the context chain's path fragments;
    /// `This` and `Root` heads collapse away, so a top-level field match
    /// renders as `foo` rather than `@.foo`.
    pub fn full_path(&self) -> Expr {
        match &self.context {
            Some(context) => Expr::child(context.full_path(), self.path.clone()),
            None => self.path.clone(),
        }
    }

    /// Replace or chain this datum's context so that its full path grows on
    /// the left
    pub fn in_context(&self, path: Expr, context: Datum<'a>) -> Datum<'a> {
        match &self.context {
            Some(inner) => Datum {
                value: self.value.clone(),
                path: self.path.clone(),
                context: Some(Rc::new(inner.in_context(path, context))),
            },
            None => Datum {
                value: self.value.clone(),
                path,
                context: Some(Rc::new(context)),
            },
        }
    }

    /// The pseudo-identifier path used for auto-id synthesis
    ///
    /// Each level of the context chain contributes its value's native
    /// `field` member rendered as text when present, and its path fragment
    /// otherwise.
    pub(crate) fn id_path(&self, field: &str) -> Expr {
        let step = self
            .value
            .as_object()
            .and_then(|obj| obj.get(field))
            .map(|v| Expr::field(scalar_text(v)))
            .unwrap_or_else(|| self.path.clone());
        match &self.context {
            Some(context) => Expr::child(context.id_path(field), step),
            None => step,
        }
    }

    /// The concrete location of this datum within the queried document, as
    /// a chain of field and index steps; `None` when any step along the
    /// chain is not a literal field or index (e.g., a slice coercion).
    pub(crate) fn location(&self) -> Option<Vec<Step>> {
        let mut steps = match &self.context {
            Some(context) => context.location()?,
            None => Vec::new(),
        };
        match &self.path {
            Expr::Root | Expr::This => {}
            Expr::Fields(names) if names.len() == 1 && names[0] != "*" => {
                steps.push(Step::Field(names[0].clone()));
            }
            Expr::Index(i) if *i >= 0 => steps.push(Step::Index(*i as usize)),
            _ => return None,
        }
        Some(steps)
    }
}

/// One concrete navigation step within a document
#[derive(Debug, PartialEq, Eq, Clone)]
pub(crate) enum Step {
    Field(String),
    Index(usize),
}

/// The list of matches produced by a [`find`][crate::JsonPath::find]
///
/// Matches appear in depth-first, left-to-right traversal order of the
/// expression; within an object they follow the map's iteration order.
/// Serializes as the array of matched values.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct Matches<'a>(pub(crate) Vec<Datum<'a>>);

impl<'a> Matches<'a> {
    /// Extract all matched datums
    pub fn all(self) -> Vec<Datum<'a>> {
        self.0
    }

    /// The matched values, in match order
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use serde_json_query::JsonPath;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let value = json!({"foo": [1, 2, 3]});
    /// let path = JsonPath::parse("foo.[*]")?;
    /// assert_eq!(path.find(&value)?.values(), vec![1, 2, 3]);
    /// # Ok(())
    /// # }
    /// ```
    pub fn values(&self) -> Vec<&Value> {
        self.0.iter().map(Datum::value).collect()
    }

    /// The full path of each match, in match order
    pub fn paths(&self) -> Vec<Expr> {
        self.0.iter().map(Datum::full_path).collect()
    }

    /// Extract _at most_ one match
    ///
    /// Intended for expressions expected to optionally yield a single match;
    /// `None` when there are zero or several.
    pub fn at_most_one(&self) -> Option<&Datum<'a>> {
        if self.0.len() == 1 {
            self.0.first()
        } else {
            None
        }
    }

    /// Extract _exactly_ one match, or an error carrying the match count
    pub fn exactly_one(&self) -> Result<&Datum<'a>, ExactlyOneError> {
        if self.0.is_empty() {
            Err(ExactlyOneError::Empty)
        } else if self.0.len() > 1 {
            Err(ExactlyOneError::MoreThanOne(self.0.len()))
        } else {
            Ok(&self.0[0])
        }
    }

    /// The first match, or `None` when there are none
    pub fn first(&self) -> Option<&Datum<'a>> {
        self.0.first()
    }

    /// The number of matches
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the expression matched nothing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the matches
    ///
    /// Note that [`Matches`] also implements [`IntoIterator`].
    pub fn iter(&self) -> Iter<'_, Datum<'a>> {
        self.0.iter()
    }
}

/// Error produced when expecting exactly one match from an expression
#[derive(Debug, thiserror::Error)]
pub enum ExactlyOneError {
    /// The expression matched nothing
    #[error("expected the expression to match one datum, but it matched none")]
    Empty,
    /// The expression matched more than one datum
    #[error("expected the expression to match one datum, but it matched {0}")]
    MoreThanOne(usize),
}

impl<'a> From<Vec<Datum<'a>>> for Matches<'a> {
    fn from(data: Vec<Datum<'a>>) -> Self {
        Self(data)
    }
}

impl<'a> IntoIterator for Matches<'a> {
    type Item = Datum<'a>;

    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> Serialize for Matches<'a> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.0.iter().map(Datum::value))
    }
}
