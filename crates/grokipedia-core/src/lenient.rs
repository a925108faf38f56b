//! Field deserializers for values the service sends as either strings or numbers.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde_json::Value;

fn render(value: Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(format!("expected string or number, got {}", other)),
    }
}

/// Accepts a string, number, bool or null; null becomes an empty string.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    render(value)
        .map(Option::unwrap_or_default)
        .map_err(de::Error::custom)
}

/// Like [`string`], but keeps null as `None`.
pub fn opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    render(value).map_err(de::Error::custom)
}

/// Accepts a number or a numeric string; null and blank strings become zero.
pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(T::default()),
        Value::Number(n) => n.to_string().parse().map_err(de::Error::custom),
        Value::String(s) if s.trim().is_empty() => Ok(T::default()),
        Value::String(s) => s.trim().parse().map_err(de::Error::custom),
        other => Err(de::Error::custom(format!(
            "expected number or numeric string, got {}",
            other
        ))),
    }
}
