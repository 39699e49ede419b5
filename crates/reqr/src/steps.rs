//! Ready-made transform steps.
//!
//! Every chain starts from a [`BodyReader`]; the reader steps below turn it
//! into text, bytes, or decoded JSON.

use crate::body::BodyReader;
use crate::transform::Step;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::io::Read;

/// Reads the whole body as UTF-8 text.
pub fn read_text() -> Step {
    Step::new(|mut reader: BodyReader| {
        let mut text = String::new();
        reader.read_to_string(&mut text).map(|_| text)
    })
}

/// Reads the whole body as bytes.
pub fn read_bytes() -> Step {
    Step::map(BodyReader::into_bytes)
}

/// Decodes the body as JSON into `T`.
///
/// # Example
///
/// ```ignore
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// response.body_with([steps::json::<User>()]).equals(User { name: "Alice".into() });
/// ```
pub fn json<T>() -> Step
where
    T: DeserializeOwned + Any + fmt::Debug,
{
    Step::new(|reader: BodyReader| serde_json::from_reader::<_, T>(reader))
}

/// Decodes the body as a JSON value.
pub fn json_value() -> Step {
    json::<Value>()
}

/// Selects the value at a dotted path in a JSON value.
///
/// Numeric segments index arrays, e.g. `user.tags.0`. A missing path fails
/// the step.
pub fn json_field(path: impl Into<String>) -> Step {
    let path = path.into();
    Step::new(move |value: Value| {
        json_path(&value, &path)
            .cloned()
            .ok_or_else(|| format!("JSON path '{path}' not found in {value}"))
    })
}

fn json_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match segment.parse::<usize>() {
            Ok(index) => current.get(index),
            Err(_) => current.get(segment),
        })
}
