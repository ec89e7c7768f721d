//! Tolerant decoding of loosely typed JSON values
//!
//! The Oblio API is not consistent about how it encodes scalars: the same field
//! may arrive as a number, a numeric string, a float, or be missing entirely.
//! The helpers here accept a small closed set of representations and normalise
//! them, falling back to a default instead of failing.
//!
//! The `de_*` functions are `deserialize_with` adapters over the same rules.
//! Pair them with `#[serde(default)]` so absent fields also fall back.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Normalise a value to `f64`.
///
/// Numbers convert directly; strings are trimmed and parsed. Anything else,
/// including absent values and unparseable strings, yields `default`.
pub fn f64_from_value(value: Option<&Value>, default: f64) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(default),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(default),
        _ => default,
    }
}

/// Normalise a value to `i64`, truncating any fractional part.
pub fn i64_from_value(value: Option<&Value>, default: i64) -> i64 {
    match value {
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i,
            None => n.as_f64().map(|f| f as i64).unwrap_or(default),
        },
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|f| f as i64)
            .unwrap_or(default),
        _ => default,
    }
}

/// Normalise a value to `u64`. Negative values clamp to zero.
pub fn u64_from_value(value: Option<&Value>, default: u64) -> u64 {
    match value {
        Some(Value::Number(n)) => match n.as_u64() {
            Some(u) => u,
            None => n.as_f64().map(|f| f.max(0.0) as u64).unwrap_or(default),
        },
        Some(Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|f| f.max(0.0) as u64)
            .unwrap_or(default),
        _ => default,
    }
}

/// Normalise a value to a string.
///
/// Strings are trimmed, integers printed as-is, floats printed without
/// fractional digits. Everything else becomes an empty string.
pub fn string_from_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                format!("{:.0}", n.as_f64().unwrap_or_default())
            }
        }
        _ => String::new(),
    }
}

/// Normalise a value to a boolean.
///
/// Numbers are true only when equal to 1; `null` or absent yields `default`.
pub fn bool_from_value(value: Option<&Value>, default: bool) -> bool {
    match value {
        None | Some(Value::Null) => default,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}

/// Parse the leading `YYYY-MM-DD` of a string value.
///
/// Timestamps such as `2024-05-01 10:00:00` are accepted; the time is dropped.
pub fn date_from_value(value: Option<&Value>) -> Option<NaiveDate> {
    let s = value?.as_str()?.trim();
    let head = s.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

pub fn de_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(u64_from_value(Some(&value), 0))
}

pub fn de_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(i64_from_value(Some(&value), 0))
}

pub fn de_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(f64_from_value(Some(&value), 0.0))
}

pub fn de_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(string_from_value(Some(&value)))
}

pub fn de_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(bool_from_value(Some(&value), false))
}

pub fn de_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(date_from_value(Some(&value)))
}
