// ── Primitive converters ──
//
// Helpers between the sequence forms a declarative engine stores and the
// native forms the model uses, plus the merge rule flattening applies to
// fields the server does not echo back.

use std::collections::BTreeSet;

/// Serde adapter for optional singleton blocks.
///
/// Declarative engines store nested blocks as lists. This accepts `null`,
/// a bare object, `[]`, or a one-element list, and rejects longer lists
/// instead of silently taking the first element. Serializes as the bare
/// object.
pub mod singleton {
    use serde::de::{DeserializeOwned, Error as _};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Value;

    pub fn serialize<S, T>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        value.serialize(serializer)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let item = match Value::deserialize(deserializer)? {
            Value::Null => return Ok(None),
            Value::Array(items) => {
                let count = items.len();
                match <[Value; 1]>::try_from(items) {
                    Ok([item]) => item,
                    Err(_) if count == 0 => return Ok(None),
                    Err(_) => {
                        return Err(D::Error::custom(format!(
                            "expected at most one block, got {count}"
                        )));
                    }
                }
            }
            other => other,
        };
        T::deserialize(item).map(Some).map_err(D::Error::custom)
    }
}

/// Collect names into an ordered, de-duplicated set.
pub fn string_set<I>(items: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = String>,
{
    items.into_iter().collect()
}

/// Expand a set back into the list form the wire uses.
pub fn set_to_list(set: &BTreeSet<String>) -> Vec<String> {
    set.iter().cloned().collect()
}

/// `None` for an empty string, an owned copy otherwise.
pub fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_owned())
}

/// Like [`non_empty`] for an already optional value.
pub fn non_empty_opt(value: Option<&str>) -> Option<String> {
    value.and_then(non_empty)
}

/// Values that can be present but carry nothing.
pub trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Blank for Vec<T> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// The flatten merge rule for a single optional field.
///
/// A non-blank fresh value wins; otherwise the previously stored value is
/// carried forward; otherwise the field stays unset. Absence in a server
/// response is never treated as deletion.
pub fn prefer_fresh<T>(fresh: Option<T>, previous: Option<&T>) -> Option<T>
where
    T: Blank + Clone,
{
    match fresh {
        Some(value) if !value.is_blank() => Some(value),
        _ => previous.filter(|value| !value.is_blank()).cloned(),
    }
}
