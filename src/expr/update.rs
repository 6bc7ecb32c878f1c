//! The `update` evaluation mode
use std::rc::Rc;

use serde_json::{Map, Value};

use crate::datum::{Datum, Step};
use crate::error::EvalError;

use super::find::{resolve_index, slice_indices};
use super::{Expr, Predicate};

impl Expr {
    /// Return a copy of `data` with every location matched by this
    /// expression replaced by `value`
    ///
    /// The input is never mutated, and locations outside any match are
    /// preserved as-is. Updating an explicitly named field that an object
    /// does not contain inserts it; the `*` wildcard only touches members
    /// that are present.
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use serde_json_query::JsonPath;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let value = json!({"foo": {"bar": 1}});
    /// let path = JsonPath::parse("foo.bar")?;
    /// let updated = path.update(&value, &json!("baz"))?;
    /// assert_eq!(updated, json!({"foo": {"bar": "baz"}}));
    /// # Ok(())
    /// # }
    /// ```
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Update", level = "trace", parent = None, ret, err))]
    pub fn update(&self, data: &Value, value: &Value) -> Result<Value, EvalError> {
        match self {
            Expr::Root | Expr::This => Ok(value.clone()),
            Expr::Fields(names) => Ok(update_fields(names, data, value)),
            Expr::Index(index) => Ok(update_index(*index, data, value)),
            Expr::Slice { start, end, step } => {
                Ok(update_slice(*start, *end, *step, data, value))
            }
            Expr::Child(left, right) => {
                // The parent operator reaches outside the sub-document a
                // recursive update would hand it, so it is spliced through
                // the locations of the whole match instead.
                if matches!(right.as_ref(), Expr::NamedOperator(name) if name == "parent") {
                    return self.update_located(data, value);
                }
                let mut updated = data.clone();
                let focus = Rc::new(Datum::wrap(data));
                for sub in left.find_in(&focus, data)? {
                    if let Some(steps) = sub.location() {
                        let rewritten = right.update(sub.value(), value)?;
                        set_at(&mut updated, &steps, rewritten);
                    }
                }
                Ok(updated)
            }
            Expr::Descendants(left, right) => {
                let mut updated = data.clone();
                let focus = Rc::new(Datum::wrap(data));
                for sub in left.find_in(&focus, data)? {
                    if let Some(steps) = sub.location() {
                        let rewritten = update_descendants(sub.value(), right, value)?;
                        set_at(&mut updated, &steps, rewritten);
                    }
                }
                Ok(updated)
            }
            Expr::Where(left, right) => {
                let mut updated = data.clone();
                let focus = Rc::new(Datum::wrap(data));
                for sub in left.find_in(&focus, data)? {
                    let subject = Rc::new(sub.clone());
                    if right.find_in(&subject, data)?.is_empty() {
                        continue;
                    }
                    if let Some(steps) = sub.location() {
                        set_at(&mut updated, &steps, value.clone());
                    }
                }
                Ok(updated)
            }
            Expr::Union(left, right) => {
                let interim = left.update(data, value)?;
                right.update(&interim, value)
            }
            Expr::Intersect(..) => Err(EvalError::Unimplemented("&")),
            Expr::Filter(predicate) => update_filter(predicate, data, value),
            Expr::Sort(_) => self.update_located(data, value),
            Expr::NamedOperator(name) => match name.as_str() {
                "this" => Ok(value.clone()),
                "parent" => self.update_located(data, value),
                other => Err(EvalError::UnknownOperator(other.to_owned())),
            },
        }
    }

    /// Replace the concrete location of every match of this expression
    fn update_located(&self, data: &Value, value: &Value) -> Result<Value, EvalError> {
        let mut updated = data.clone();
        for steps in self.locate(data)? {
            set_at(&mut updated, &steps, value.clone());
        }
        Ok(updated)
    }

    /// The concrete locations this expression matches in `data`, skipping
    /// matches whose path is not a literal field/index chain
    pub(crate) fn locate(&self, data: &Value) -> Result<Vec<Vec<Step>>, EvalError> {
        let focus = Rc::new(Datum::wrap(data));
        Ok(self
            .find_in(&focus, data)?
            .iter()
            .filter_map(Datum::location)
            .collect())
    }
}

fn update_fields(names: &[String], data: &Value, value: &Value) -> Value {
    let mut updated = data.clone();
    if let Some(obj) = updated.as_object_mut() {
        for name in names {
            if name == "*" {
                let keys: Vec<String> = obj.keys().cloned().collect();
                for key in keys {
                    obj.insert(key, value.clone());
                }
            } else {
                obj.insert(name.clone(), value.clone());
            }
        }
    }
    updated
}

fn update_index(index: isize, data: &Value, value: &Value) -> Value {
    let mut updated = data.clone();
    if let Some(list) = updated.as_array_mut() {
        if let Some(slot) = resolve_index(index, list.len()).and_then(|i| list.get_mut(i)) {
            *slot = value.clone();
        }
    }
    updated
}

fn update_slice(
    start: Option<isize>,
    end: Option<isize>,
    step: Option<isize>,
    data: &Value,
    value: &Value,
) -> Value {
    let mut updated = data.clone();
    if let Some(list) = updated.as_array_mut() {
        for i in slice_indices(list.len(), start, end, step) {
            list[i] = value.clone();
        }
    }
    updated
}

/// Rewrite every location `expr` matches within `node`, at the node itself
/// and recursively through arrays and object members
fn update_descendants(node: &Value, expr: &Expr, value: &Value) -> Result<Value, EvalError> {
    let recursed = match node {
        Value::Array(list) => Value::Array(
            list.iter()
                .map(|sub| update_descendants(sub, expr, value))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(obj) => Value::Object(
            obj.iter()
                .map(|(key, sub)| Ok((key.clone(), update_descendants(sub, expr, value)?)))
                .collect::<Result<Map<String, Value>, EvalError>>()?,
        ),
        scalar => scalar.clone(),
    };
    // Only rewrite nodes where the expression actually matches; otherwise a
    // field rewrite would insert its field into every object in the subtree.
    if expr.find(&recursed)?.is_empty() {
        Ok(recursed)
    } else {
        expr.update(&recursed, value)
    }
}

fn update_filter(
    predicate: &Predicate,
    data: &Value,
    value: &Value,
) -> Result<Value, EvalError> {
    let focus = Rc::new(Datum::wrap(data));
    let mut updated = data.clone();
    match data {
        Value::Array(list) => {
            for (i, sub) in list.iter().enumerate() {
                let subject = Rc::new(Datum::step(sub, Expr::Index(i as isize), &focus));
                if predicate.matches(&subject, data)? {
                    set_at(&mut updated, &[Step::Index(i)], value.clone());
                }
            }
        }
        Value::Object(obj) => {
            for (key, sub) in obj {
                let subject = Rc::new(Datum::step(sub, Expr::field(key.clone()), &focus));
                if predicate.matches(&subject, data)? {
                    set_at(&mut updated, &[Step::Field(key.clone())], value.clone());
                }
            }
        }
        _ => {}
    }
    Ok(updated)
}

/// Replace the value at a concrete location; missing steps make the write a
/// no-op rather than an error
pub(crate) fn set_at(target: &mut Value, steps: &[Step], new: Value) {
    match steps.split_first() {
        None => *target = new,
        Some((Step::Field(name), rest)) => {
            if let Some(slot) = target.as_object_mut().and_then(|obj| obj.get_mut(name)) {
                set_at(slot, rest, new);
            }
        }
        Some((Step::Index(i), rest)) => {
            if let Some(slot) = target.as_array_mut().and_then(|list| list.get_mut(*i)) {
                set_at(slot, rest, new);
            }
        }
    }
}
