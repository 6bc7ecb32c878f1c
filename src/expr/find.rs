//! The `find` evaluation mode
use std::borrow::Cow;
use std::cmp::Ordering;
use std::rc::Rc;

use serde_json::{Number, Value};

use crate::datum::{Datum, Matches};
use crate::error::EvalError;
use crate::options::auto_id_field;

use super::{CmpOp, Expr, FilterTerm, Literal, Predicate, SortDirection, SortKey};

impl Expr {
    /// Find every datum matched by this expression in `value`
    ///
    /// Matches are produced in depth-first, left-to-right traversal order of
    /// the expression. Structural mismatches (a field accessor against an
    /// array, an index beyond the array's length, and so on) contribute
    /// empty results rather than errors; only the reserved expression forms
    /// fail.
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use serde_json_query::JsonPath;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let value = json!({"foo": {"baz": 1, "bing": {"baz": 2}}});
    /// let path = JsonPath::parse("foo..baz")?;
    /// assert_eq!(path.find(&value)?.values(), vec![1, 2]);
    /// # Ok(())
    /// # }
    /// ```
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Find", level = "trace", parent = None, ret, err))]
    pub fn find<'a>(&self, value: &'a Value) -> Result<Matches<'a>, EvalError> {
        let focus = Rc::new(Datum::wrap(value));
        self.find_in(&focus, value).map(Matches)
    }

    pub(crate) fn find_in<'a>(
        &self,
        datum: &Rc<Datum<'a>>,
        root: &'a Value,
    ) -> Result<Vec<Datum<'a>>, EvalError> {
        match self {
            Expr::Root => Ok(vec![Datum {
                value: Cow::Borrowed(root),
                path: Expr::Root,
                context: None,
            }]),
            Expr::This => Ok(vec![(**datum).clone()]),
            Expr::Fields(names) => Ok(find_fields(names, datum)),
            Expr::Index(index) => Ok(find_index(*index, datum)),
            Expr::Slice { start, end, step } => Ok(find_slice(*start, *end, *step, datum)),
            Expr::Child(left, right) => {
                let mut found = Vec::new();
                for sub in left.find_in(datum, root)? {
                    let sub = Rc::new(sub);
                    found.append(&mut right.find_in(&sub, root)?);
                }
                Ok(found)
            }
            Expr::Descendants(left, right) => {
                let mut found = Vec::new();
                for sub in left.find_in(datum, root)? {
                    let sub = Rc::new(sub);
                    descend(right, &sub, root, &mut found)?;
                }
                Ok(found)
            }
            Expr::Where(left, right) => {
                let mut found = Vec::new();
                for sub in left.find_in(datum, root)? {
                    let subject = Rc::new(sub.clone());
                    if !right.find_in(&subject, root)?.is_empty() {
                        found.push(sub);
                    }
                }
                Ok(found)
            }
            Expr::Union(left, right) => {
                let mut found = left.find_in(datum, root)?;
                found.append(&mut right.find_in(datum, root)?);
                Ok(found)
            }
            Expr::Intersect(..) => Err(EvalError::Unimplemented("&")),
            Expr::Filter(predicate) => find_filter(predicate, datum, root),
            Expr::Sort(keys) => find_sorted(keys, datum, root),
            Expr::NamedOperator(name) => match name.as_str() {
                "this" => Ok(vec![(**datum).clone()]),
                "parent" => Ok(datum
                    .context
                    .as_deref()
                    .cloned()
                    .into_iter()
                    .collect()),
                other => Err(EvalError::UnknownOperator(other.to_owned())),
            },
        }
    }
}

fn find_fields<'a>(names: &[String], datum: &Rc<Datum<'a>>) -> Vec<Datum<'a>> {
    let obj = match datum.borrowed_value().and_then(Value::as_object) {
        Some(obj) => obj,
        None => return Vec::new(),
    };
    let auto = auto_id_field();
    let mut found = Vec::new();
    if names.iter().any(|name| name == "*") {
        for (key, value) in obj {
            found.push(Datum::step(value, Expr::field(key.clone()), datum));
        }
        if let Some(field) = &auto {
            found.push(auto_id_datum(field, datum));
        }
    } else {
        for name in names {
            match &auto {
                Some(field) if name == field => found.push(auto_id_datum(field, datum)),
                _ => {
                    if let Some(value) = obj.get(name) {
                        found.push(Datum::step(value, Expr::field(name.clone()), datum));
                    }
                }
            }
        }
    }
    found
}

fn auto_id_datum<'a>(field: &str, datum: &Rc<Datum<'a>>) -> Datum<'a> {
    Datum {
        value: Cow::Owned(Value::String(datum.id_path(field).to_string())),
        path: Expr::field(field),
        context: Some(Rc::clone(datum)),
    }
}

fn find_index<'a>(index: isize, datum: &Rc<Datum<'a>>) -> Vec<Datum<'a>> {
    let list = match datum.borrowed_value().and_then(Value::as_array) {
        Some(list) => list,
        None => return Vec::new(),
    };
    resolve_index(index, list.len())
        .and_then(|i| list.get(i).map(|value| (i, value)))
        .map(|(i, value)| Datum::step(value, Expr::Index(i as isize), datum))
        .into_iter()
        .collect()
}

/// Resolve a possibly-negative index against an array length; out of range
/// resolves to `None`
pub(crate) fn resolve_index(index: isize, len: usize) -> Option<usize> {
    if index < 0 {
        index
            .checked_abs()
            .and_then(|i| usize::try_from(i).ok())
            .and_then(|i| len.checked_sub(i))
    } else {
        usize::try_from(index).ok().filter(|i| *i < len)
    }
}

fn find_slice<'a>(
    start: Option<isize>,
    end: Option<isize>,
    step: Option<isize>,
    datum: &Rc<Datum<'a>>,
) -> Vec<Datum<'a>> {
    let value = match datum.borrowed_value() {
        Some(value) => value,
        None => return Vec::new(),
    };
    match value {
        Value::Array(list) => slice_indices(list.len(), start, end, step)
            .into_iter()
            .map(|i| Datum::step(&list[i], Expr::Index(i as isize), datum))
            .collect(),
        Value::Null => Vec::new(),
        // Schema-unaware coercion: a lone value slices as the one-element
        // array containing it.
        scalar => {
            if slice_indices(1, start, end, step).contains(&0) {
                vec![Datum::step(scalar, Expr::Index(0), datum)]
            } else {
                Vec::new()
            }
        }
    }
}

/// The positions a slice selects from an array of length `len`, in
/// selection order
pub(crate) fn slice_indices(
    len: usize,
    start: Option<isize>,
    end: Option<isize>,
    step: Option<isize>,
) -> Vec<usize> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Vec::new();
    }
    let len = match isize::try_from(len) {
        Ok(len) => len,
        Err(_) => return Vec::new(),
    };
    let mut selected = Vec::new();
    if step > 0 {
        let lower = normalize_index(start.unwrap_or(0), len).clamp(0, len);
        let upper = normalize_index(end.unwrap_or(len), len).clamp(0, len);
        let mut i = lower;
        while i < upper {
            selected.push(i as usize);
            i += step;
        }
    } else {
        let upper = normalize_index(start.unwrap_or(len - 1), len).clamp(-1, len - 1);
        let lower = normalize_index(end.unwrap_or(-len - 1), len).clamp(-1, len - 1);
        let mut i = upper;
        while i > lower {
            selected.push(i as usize);
            i += step;
        }
    }
    selected
}

fn normalize_index(index: isize, len: isize) -> isize {
    if index >= 0 {
        index
    } else {
        index.saturating_add(len)
    }
}

/// Recursive arm of `Descendants`: match `expr` here and at every genuine
/// array element or object member below. Deliberately bypasses the slice
/// coercion, which would otherwise recurse forever on scalars.
fn descend<'a>(
    expr: &Expr,
    datum: &Rc<Datum<'a>>,
    root: &'a Value,
    found: &mut Vec<Datum<'a>>,
) -> Result<(), EvalError> {
    found.append(&mut expr.find_in(datum, root)?);
    let value = match datum.borrowed_value() {
        Some(value) => value,
        None => return Ok(()),
    };
    if let Some(list) = value.as_array() {
        for (i, sub) in list.iter().enumerate() {
            let sub = Rc::new(Datum::step(sub, Expr::Index(i as isize), datum));
            descend(expr, &sub, root, found)?;
        }
    } else if let Some(obj) = value.as_object() {
        for (key, sub) in obj {
            let sub = Rc::new(Datum::step(sub, Expr::field(key.clone()), datum));
            descend(expr, &sub, root, found)?;
        }
    }
    Ok(())
}

fn find_filter<'a>(
    predicate: &Predicate,
    datum: &Rc<Datum<'a>>,
    root: &'a Value,
) -> Result<Vec<Datum<'a>>, EvalError> {
    let value = match datum.borrowed_value() {
        Some(value) => value,
        None => return Ok(Vec::new()),
    };
    let elements: Vec<Datum<'a>> = match value {
        Value::Array(list) => list
            .iter()
            .enumerate()
            .map(|(i, sub)| Datum::step(sub, Expr::Index(i as isize), datum))
            .collect(),
        Value::Object(obj) => obj
            .iter()
            .map(|(key, sub)| Datum::step(sub, Expr::field(key.clone()), datum))
            .collect(),
        _ => return Ok(Vec::new()),
    };
    let mut found = Vec::new();
    for element in elements {
        let subject = Rc::new(element.clone());
        if predicate.matches(&subject, root)? {
            found.push(element);
        }
    }
    Ok(found)
}

impl Predicate {
    /// Evaluate the conjunction at `datum`, short-circuiting on the first
    /// unsatisfied term
    pub(crate) fn matches<'a>(
        &self,
        datum: &Rc<Datum<'a>>,
        root: &'a Value,
    ) -> Result<bool, EvalError> {
        for term in &self.0 {
            if !term.matches(datum, root)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl FilterTerm {
    fn matches<'a>(&self, datum: &Rc<Datum<'a>>, root: &'a Value) -> Result<bool, EvalError> {
        let found = self.path.find_in(datum, root)?;
        match &self.comparison {
            // A bare term tests existence; a matched null or false still
            // counts as a match.
            None => Ok(!found.is_empty()),
            Some((op, literal)) => Ok(found
                .iter()
                .any(|sub| compare(sub.value(), *op, literal))),
        }
    }
}

fn compare(value: &Value, op: CmpOp, literal: &Literal) -> bool {
    match (value, literal) {
        (Value::Number(a), Literal::Number(b)) => compare_numbers(a, b)
            .map(|ord| op.admits(ord))
            .unwrap_or(false),
        (Value::String(a), Literal::String(b)) => op.admits(a.as_str().cmp(b.as_str())),
        (Value::Bool(a), Literal::Bool(b)) => matches!(op, CmpOp::Eq) && a == b,
        (Value::Null, Literal::Null) => matches!(op, CmpOp::Eq),
        _ => false,
    }
}

fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return Some(x.cmp(&y));
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x.partial_cmp(&y),
        _ => None,
    }
}

impl CmpOp {
    fn admits(&self, ord: Ordering) -> bool {
        match self {
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Gte => ord != Ordering::Less,
            CmpOp::Lte => ord != Ordering::Greater,
        }
    }
}

fn find_sorted<'a>(
    keys: &[SortKey],
    datum: &Rc<Datum<'a>>,
    root: &'a Value,
) -> Result<Vec<Datum<'a>>, EvalError> {
    let value = match datum.borrowed_value() {
        Some(value) => value,
        None => return Ok(Vec::new()),
    };
    let elements: Vec<Datum<'a>> = match value {
        Value::Array(list) => list
            .iter()
            .enumerate()
            .map(|(i, sub)| Datum::step(sub, Expr::Index(i as isize), datum))
            .collect(),
        Value::Object(obj) => obj
            .iter()
            .map(|(key, sub)| Datum::step(sub, Expr::field(key.clone()), datum))
            .collect(),
        _ => return Ok(Vec::new()),
    };
    let mut keyed = Vec::with_capacity(elements.len());
    for element in elements {
        let subject = Rc::new(element.clone());
        let mut sort_values = Vec::with_capacity(keys.len());
        for key in keys {
            let found = key.key.find_in(&subject, root)?;
            sort_values.push(found.first().map(|sub| sub.value().clone()));
        }
        keyed.push((sort_values, element));
    }
    keyed.sort_by(|(a, _), (b, _)| compare_sort_values(a, b, keys));
    Ok(keyed.into_iter().map(|(_, element)| element).collect())
}

fn compare_sort_values(
    a: &[Option<Value>],
    b: &[Option<Value>],
    keys: &[SortKey],
) -> Ordering {
    for (i, key) in keys.iter().enumerate() {
        // A missing key sorts after present keys ascending, and before them
        // descending, which the direction reversal below gives for free.
        let ord = match (&a[i], &b[i]) {
            (Some(x), Some(y)) => compare_values(x, y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        let ord = match key.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Total order over values for sorting: by type rank first, then within
/// booleans, numbers, and strings by their natural order. Arrays and
/// objects compare equal to their own kind, leaving input order in place.
fn compare_values(a: &Value, b: &Value) -> Ordering {
    fn rank(value: &Value) -> u8 {
        match value {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            compare_numbers(x, y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}
