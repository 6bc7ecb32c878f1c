//! The `include` and `exclude` projection modes
use serde_json::{Map, Value};

use crate::datum::Step;
use crate::error::EvalError;

use super::Expr;

impl Expr {
    /// Return a copy of `data` with every matched location removed
    ///
    /// Object members are deleted from their containing object; array
    /// elements are removed with the relative order of the remainder
    /// preserved; containers left empty by a removal are retained. Matching
    /// the document root yields `Value::Null`. An expression that matches
    /// nothing returns the document unchanged.
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use serde_json_query::JsonPath;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let value = json!({"outs": {"bar": 1, "ins": {"bar": 9}}, "outs2": {"bar": 2}});
    /// let pruned = JsonPath::parse("$..bar")?.exclude(&value)?;
    /// assert_eq!(pruned, json!({"outs": {"ins": {}}, "outs2": {}}));
    /// # Ok(())
    /// # }
    /// ```
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Exclude", level = "trace", parent = None, ret, err))]
    pub fn exclude(&self, data: &Value) -> Result<Value, EvalError> {
        let locations = self.locate(data)?;
        if locations.iter().any(Vec::is_empty) {
            return Ok(Value::Null);
        }
        let locations: Vec<&[Step]> = locations.iter().map(Vec::as_slice).collect();
        let mut pruned = data.clone();
        exclude_locations(&mut pruned, &locations);
        Ok(pruned)
    }

    /// Return the smallest sub-document of `data` that retains every
    /// matched location along its ancestry
    ///
    /// Members and elements not on the prefix of any match are removed; at
    /// the leaf of a match the whole sub-value is kept. Matching the
    /// document root keeps the document intact; matching nothing yields an
    /// empty container of the document's own shape.
    ///
    /// # Example
    /// ```rust
    /// # use serde_json::json;
    /// # use serde_json_query::JsonPath;
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let value = json!({"foo": {"bar": 1, "baz": 2}, "other": true});
    /// let kept = JsonPath::parse("foo.bar")?.include(&value)?;
    /// assert_eq!(kept, json!({"foo": {"bar": 1}}));
    /// # Ok(())
    /// # }
    /// ```
    #[cfg_attr(feature = "trace", tracing::instrument(name = "Include", level = "trace", parent = None, ret, err))]
    pub fn include(&self, data: &Value) -> Result<Value, EvalError> {
        let locations = self.locate(data)?;
        if locations.iter().any(Vec::is_empty) {
            return Ok(data.clone());
        }
        if locations.is_empty() {
            return Ok(match data {
                Value::Object(_) => Value::Object(Map::new()),
                Value::Array(_) => Value::Array(Vec::new()),
                _ => Value::Null,
            });
        }
        let locations: Vec<&[Step]> = locations.iter().map(Vec::as_slice).collect();
        Ok(include_locations(data, &locations))
    }
}

fn exclude_locations(target: &mut Value, locations: &[&[Step]]) {
    match target {
        Value::Object(obj) => {
            for (key, sub) in obj.iter_mut() {
                let deeper: Vec<&[Step]> = locations
                    .iter()
                    .filter_map(|loc| match loc.split_first() {
                        Some((Step::Field(name), rest)) if name == key && !rest.is_empty() => {
                            Some(rest)
                        }
                        _ => None,
                    })
                    .collect();
                if !deeper.is_empty() {
                    exclude_locations(sub, &deeper);
                }
            }
            for loc in locations {
                if let [Step::Field(name)] = *loc {
                    obj.remove(name.as_str());
                }
            }
        }
        Value::Array(list) => {
            for (i, sub) in list.iter_mut().enumerate() {
                let deeper: Vec<&[Step]> = locations
                    .iter()
                    .filter_map(|loc| match loc.split_first() {
                        Some((Step::Index(at), rest)) if *at == i && !rest.is_empty() => {
                            Some(rest)
                        }
                        _ => None,
                    })
                    .collect();
                if !deeper.is_empty() {
                    exclude_locations(sub, &deeper);
                }
            }
            let mut removals: Vec<usize> = locations
                .iter()
                .filter_map(|loc| match *loc {
                    [Step::Index(i)] => Some(*i),
                    _ => None,
                })
                .collect();
            removals.sort_unstable();
            removals.dedup();
            // Delete from the back so earlier removals do not shift the
            // later indices
            for i in removals.into_iter().rev() {
                if i < list.len() {
                    list.remove(i);
                }
            }
        }
        _ => {}
    }
}

fn include_locations(data: &Value, locations: &[&[Step]]) -> Value {
    match data {
        Value::Object(obj) => {
            let mut kept = Map::new();
            for (key, sub) in obj {
                let is_leaf = locations
                    .iter()
                    .any(|loc| matches!(*loc, [Step::Field(name)] if name == key));
                if is_leaf {
                    kept.insert(key.clone(), sub.clone());
                    continue;
                }
                let deeper: Vec<&[Step]> = locations
                    .iter()
                    .filter_map(|loc| match loc.split_first() {
                        Some((Step::Field(name), rest)) if name == key && !rest.is_empty() => {
                            Some(rest)
                        }
                        _ => None,
                    })
                    .collect();
                if !deeper.is_empty() {
                    kept.insert(key.clone(), include_locations(sub, &deeper));
                }
            }
            Value::Object(kept)
        }
        Value::Array(list) => {
            let mut kept = Vec::new();
            for (i, sub) in list.iter().enumerate() {
                let is_leaf = locations
                    .iter()
                    .any(|loc| matches!(*loc, [Step::Index(at)] if *at == i));
                if is_leaf {
                    kept.push(sub.clone());
                    continue;
                }
                let deeper: Vec<&[Step]> = locations
                    .iter()
                    .filter_map(|loc| match loc.split_first() {
                        Some((Step::Index(at), rest)) if *at == i && !rest.is_empty() => {
                            Some(rest)
                        }
                        _ => None,
                    })
                    .collect();
                if !deeper.is_empty() {
                    kept.push(include_locations(sub, &deeper));
                }
            }
            Value::Array(kept)
        }
        other => other.clone(),
    }
}
