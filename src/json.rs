//! Lenient JSON helpers shared by the normalizer and the row mappers.
//!
//! Everything coming back from the oracle or from JSON columns is treated as
//! untrusted: these helpers never fail, they fall back.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Parse `raw` as JSON into `T`, returning `fallback` on any error.
pub fn parse_json_or<T: DeserializeOwned>(raw: &str, fallback: T) -> T {
    serde_json::from_str(raw).unwrap_or(fallback)
}

/// String members of a JSON array; anything else is skipped.
pub fn string_array(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_owned))
            .collect(),
        _ => Vec::new(),
    }
}

/// Integral floats are emitted as JSON integers so `78.0` goes out as `78`.
pub fn json_number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

/// Loose numeric coercion: JSON numbers and numeric strings.
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}
