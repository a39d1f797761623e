//! Tolerant field decoders for stored records.
//!
//! Older clients posted raw form state, so numbers may arrive as strings
//! and optional text as `null`. A field that cannot be read falls back to
//! its default instead of failing the whole record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

pub(crate) fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_text(Value::deserialize(deserializer)?))
}

pub(crate) fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_number(&Value::deserialize(deserializer)?))
}

/// Whole years only; `"2019"` and `2019.0` are both accepted.
pub(crate) fn optional_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_number(&Value::deserialize(deserializer)?)
        .filter(|year| year.fract() == 0.0 && (i32::MIN as f64..=i32::MAX as f64).contains(year))
        .map(|year| year as i32))
}

/// Slider values, rounded to the nearest step.
pub(crate) fn optional_step<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(as_number(&Value::deserialize(deserializer)?)
        .map(|value| value.round().clamp(0.0, u8::MAX as f64) as u8))
}

pub(crate) fn optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(raw) => raw.trim().parse::<DateTime<Utc>>().ok(),
        _ => None,
    })
}

fn as_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => raw.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|number| number.is_finite())
}
