//! Process-wide evaluation configuration
use std::sync::RwLock;

use once_cell::sync::Lazy;

static AUTO_ID_FIELD: Lazy<RwLock<Option<String>>> = Lazy::new(|| RwLock::new(None));

/// Configure the automatic identifier field
///
/// When set to `Some(name)`, a [`find`][crate::JsonPath::find] that looks up
/// `name` on an object synthesizes a string identifier from the match's
/// position in the document, substituting each level's native `name` member
/// when one is present. `None` (the default) disables the synthesis.
///
/// This is process-wide configuration; flipping it concurrently with an
/// evaluation on another thread means individual lookups observe whichever
/// value was current when they ran.
///
/// # Example
/// ```rust
/// # use serde_json::json;
/// # use serde_json_query::{set_auto_id_field, JsonPath};
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// set_auto_id_field(Some("id"));
/// let value = json!({"foo": {"baz": {"id": "hi"}}});
/// let matches = JsonPath::parse("foo.baz.id")?.find(&value)?;
/// assert_eq!(matches.values(), vec!["foo.hi"]);
/// # set_auto_id_field(None::<&str>);
/// # Ok(())
/// # }
/// ```
pub fn set_auto_id_field<S: Into<String>>(field: Option<S>) {
    *AUTO_ID_FIELD
        .write()
        .expect("auto id field lock poisoned") = field.map(Into::into);
}

pub(crate) fn auto_id_field() -> Option<String> {
    AUTO_ID_FIELD
        .read()
        .expect("auto id field lock poisoned")
        .clone()
}
