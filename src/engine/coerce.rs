//! Leaf text to typed value conversion.
//!
//! ```text
//! string / any  -> passthrough (untrimmed)
//! integer/float -> trimmed decimal parse, finite only
//! bool          -> true/false/yes/no/1/0, any case
//! date          -> offset datetime (as UTC) | naive datetime | date at 00:00
//! ```
//!
//! Delegate overrides are applied by the caller before reaching this module.

use crate::error::CoercionError;
use crate::value::{Value, ValueType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Convert `text` into `target`.
pub(crate) fn coerce(text: &str, target: &ValueType, date_format: &str) -> Result<Value, CoercionError> {
    let malformed = || CoercionError::Malformed { text: text.to_string(), target: target.clone() };
    match target {
        ValueType::String | ValueType::Any => Ok(Value::String(text.to_string())),
        ValueType::Integer => text.trim().parse::<i64>().map(Value::Integer).map_err(|_| malformed()),
        ValueType::Float => match text.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Value::Float(n)),
            _ => Err(malformed()),
        },
        ValueType::Bool => parse_bool(text).map(Value::Bool).ok_or_else(malformed),
        ValueType::Date => parse_date(text.trim(), date_format)
            .map(Value::Date)
            .ok_or_else(|| CoercionError::Date { text: text.to_string(), format: date_format.to_string() }),
        other => Err(CoercionError::NotAtomic(other.clone())),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let lower = text.trim().to_ascii_lowercase();
    match lower.as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn parse_date(text: &str, format: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_str(text, format) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, format).ok().and_then(|d| d.and_hms_opt(0, 0, 0))
}
