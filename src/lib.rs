//! Query, rewrite, and filter [`serde_json::Value`]s with an extended
//! JSONPath expression language.
//!
//! Expressions compose field accessors (`foo`, `foo,bar`, `*`), bracketed
//! indexes and slices (`[0]`, `[1:]`, `[*]`), recursive descent (`..`),
//! `where` filtering, unions (`|`), bracketed predicates (`[?cow>5]`) and
//! sorts (`[/key]`, `[\key]`), and the back-tick operators `` `this` `` and
//! `` `parent` ``.
//!
//! # Features
//!
//! This crate provides three key abstractions:
//!
//! * The [`JsonPath`] struct, which represents a parsed expression.
//! * The [`Matches`] struct, the result of [`JsonPath::find`]: every
//!   matched value as a [`Datum`] carrying the symbolic path that reached
//!   it and a link to its parent match.
//! * The rewriting modes: [`JsonPath::update`] replaces every matched
//!   location in a copy of the document, and [`JsonPath::include`] /
//!   [`JsonPath::exclude`] project a document down to, or away from, its
//!   matches.
//!
//! In addition, the [`JsonPathExt`] trait extends [`serde_json::Value`]
//! with the [`json_query`][JsonPathExt::json_query] method for one-shot
//! queries.
//!
//! # Usage
//!
//! ## Parsing
//!
//! Expressions are parsed with [`JsonPath::parse`]:
//!
//! ```rust
//! use serde_json_query::JsonPath;
//!
//! # fn main() -> Result<(), serde_json_query::ParseError> {
//! let path = JsonPath::parse("foo..baz")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Finding
//!
//! ```rust
//! use serde_json::json;
//! use serde_json_query::JsonPath;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let value = json!({"foo": {"baz": 1, "bing": {"baz": 2}}});
//! let path = JsonPath::parse("foo..baz")?;
//! let matches = path.find(&value)?;
//! assert_eq!(matches.values(), vec![1, 2]);
//! let paths: Vec<String> = matches
//!     .paths()
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(paths, ["foo.baz", "foo.bing.baz"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Updating
//!
//! ```rust
//! use serde_json::json;
//! use serde_json_query::JsonPath;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let value = json!({"foo": {"bar": 1}, "baz": 2});
//! let path = JsonPath::parse("foo.bar")?;
//! let updated = path.update(&value, &json!(5))?;
//! assert_eq!(updated, json!({"foo": {"bar": 5}, "baz": 2}));
//! # Ok(())
//! # }
//! ```
//!
//! ## Projecting
//!
//! ```rust
//! use serde_json::json;
//! use serde_json_query::JsonPath;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let value = json!({"keep": {"bar": 1}, "drop": true});
//! let path = JsonPath::parse("keep.bar")?;
//! assert_eq!(path.include(&value)?, json!({"keep": {"bar": 1}}));
//! assert_eq!(path.exclude(&value)?, json!({"keep": {}, "drop": true}));
//! # Ok(())
//! # }
//! ```
use std::str::FromStr;

use serde::{de::Visitor, Deserialize};
use serde_json::Value;

mod datum;
mod error;
mod expr;
mod options;
mod parser;

pub use datum::{Datum, ExactlyOneError, Matches};
pub use error::{Error, EvalError, ParseError};
pub use expr::{CmpOp, Expr, Literal, Predicate, SortDirection, SortKey};
pub use options::set_auto_id_field;

/// A parsed extended JSONPath expression
///
/// # Usage
///
/// A `JsonPath` is parsed from an `&str` with [`parse`][JsonPath::parse]:
/// ```rust
/// # use serde_json_query::JsonPath;
/// # fn main() {
/// let path = JsonPath::parse("foo.*").expect("valid expression");
/// # }
/// ```
/// It can then be evaluated against [`serde_json::Value`]s with
/// [`find`][JsonPath::find], [`update`][JsonPath::update],
/// [`include`][JsonPath::include], and [`exclude`][JsonPath::exclude]:
/// ```rust
/// # use serde_json::json;
/// # use serde_json_query::JsonPath;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let path = JsonPath::parse("foo.*")?;
/// let value = json!({"foo": [1, 2, 3, 4]});
/// let matches = path.find(&value)?;
/// assert!(matches.is_empty()); // `*` selects object fields, not elements
/// # Ok(())
/// # }
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct JsonPath(Expr);

impl JsonPath {
    /// Create a [`JsonPath`] by parsing an expression string
    ///
    /// # Example
    /// ```rust
    /// # use serde_json_query::JsonPath;
    /// # fn main() {
    /// let path = JsonPath::parse("foo.[1:10:2].baz").expect("valid expression");
    /// # }
    /// ```
    pub fn parse(path_str: &str) -> Result<Self, ParseError> {
        let (_, expr) = parser::parse_expr_main(path_str).map_err(|err| match err {
            nom::Err::Error(e) | nom::Err::Failure(e) => (path_str, e),
            nom::Err::Incomplete(_) => unreachable!("we do not use streaming parsers"),
        })?;
        Ok(Self(expr))
    }

    /// Find every datum this expression matches in `value`
    ///
    /// See [`Expr::find`].
    pub fn find<'a>(&self, value: &'a Value) -> Result<Matches<'a>, EvalError> {
        self.0.find(value)
    }

    /// Return a copy of `data` with every matched location replaced by
    /// `value`
    ///
    /// See [`Expr::update`].
    pub fn update(&self, data: &Value, value: &Value) -> Result<Value, EvalError> {
        self.0.update(data, value)
    }

    /// Return the smallest sub-document of `data` retaining every matched
    /// location
    ///
    /// See [`Expr::include`].
    pub fn include(&self, data: &Value) -> Result<Value, EvalError> {
        self.0.include(data)
    }

    /// Return a copy of `data` with every matched location removed
    ///
    /// See [`Expr::exclude`].
    pub fn exclude(&self, data: &Value) -> Result<Value, EvalError> {
        self.0.exclude(data)
    }

    /// The abstract syntax tree of this expression
    pub fn expr(&self) -> &Expr {
        &self.0
    }
}

impl std::fmt::Display for JsonPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{expr}", expr = self.0)
    }
}

impl FromStr for JsonPath {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JsonPath::parse(s)
    }
}

impl From<Expr> for JsonPath {
    fn from(expr: Expr) -> Self {
        Self(expr)
    }
}

impl<'de> Deserialize<'de> for JsonPath {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct JsonPathVisitor;

        impl<'de> Visitor<'de> for JsonPathVisitor {
            type Value = JsonPath;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "a string representing an extended JSONPath expression")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                JsonPath::parse(v).map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_str(JsonPathVisitor)
    }
}

/// Extension trait for one-shot queries on [`serde_json::Value`]
pub trait JsonPathExt {
    /// Parse `expr` and find its matches in `self`
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use serde_json_query::JsonPathExt;
    /// # fn main() -> Result<(), serde_json_query::Error> {
    /// let value = json!({"foo": {"bar": [1, 2]}});
    /// let matches = value.json_query("foo.bar.[*]")?;
    /// assert_eq!(matches.values(), vec![1, 2]);
    /// # Ok(())
    /// # }
    /// ```
    fn json_query(&self, expr: &str) -> Result<Matches, Error>;
}

impl JsonPathExt for Value {
    fn json_query(&self, expr: &str) -> Result<Matches, Error> {
        let path = JsonPath::parse(expr)?;
        let matches = path.0.find(self)?;
        Ok(matches)
    }
}
