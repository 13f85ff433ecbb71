//! Lenient serde helpers for payloads produced by the note generator.
//!
//! The generator omits fields, sends `null`, and sometimes sends numbers where strings are
//! expected. These helpers normalise all of that to empty values instead of failing the whole
//! record.

use crate::TaggedItem;
use passometro_types::StyleTag;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// `null` reads as an empty string. Combine with `#[serde(default)]` for absent keys.
pub fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts a string, a number or `null` and holds the result as a string.
pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(Value::Bool(b)) => Ok(b.to_string()),
        Some(other) => Err(D::Error::custom(format!(
            "expected a string or number, found {other}"
        ))),
    }
}

/// Reads a highlight table, keeping only entries whose tag is a string.
///
/// A `null` tag means "no emphasis" for that key. A `null` or non-object table reads as empty.
pub fn lenient_highlights<'de, D>(deserializer: D) -> Result<BTreeMap<String, StyleTag>, D::Error>
where
    D: Deserializer<'de>,
{
    let highlights = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(entries)) => entries
            .into_iter()
            .filter_map(|(key, tag)| match tag {
                Value::String(tag) => Some((key, StyleTag::new(tag))),
                _ => None,
            })
            .collect(),
        _ => BTreeMap::new(),
    };
    Ok(highlights)
}

/// `null` reads as `T::default()`. Combine with `#[serde(default)]` for absent keys.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a tagged-item list, skipping entries that are not well-formed items.
///
/// An absent, `null` or non-array value reads as an empty list.
pub fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<TaggedItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(values)) => values
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|value| serde_json::from_value::<TaggedItem>(value).ok())
            .collect(),
        _ => Vec::new(),
    };
    Ok(items)
}
