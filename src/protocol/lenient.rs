//! Forgiving field deserializers for server payloads.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Decode a field, falling back to its zero value when the JSON type does not
/// match. The surrounding struct keeps decoding its other fields.
pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Decode a field, treating an explicit `null` as its zero value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
