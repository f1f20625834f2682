//! Decoding helpers for loosely-typed server values
//!
//! The API encodes booleans as native booleans, numbers or strings, and lists
//! as comma-separated strings, JSON-encoded arrays or native arrays. These
//! helpers collapse every encoding into one canonical shape and never fail:
//! unrecognised input maps to a default.

use serde_json::Value;

/// Parent id values that mean "no parent".
const ROOT_SENTINELS: &[&str] = &["", "0", "null", "undefined", "nan"];

/// Decode a truthy-ish value.
///
/// `true`, the strings `"true"`/`"1"` (trimmed, any case) and the number `1`
/// decode to `true`. Everything else, including `null`, decodes to `false`.
pub fn decode_truthy(value: Option<&Value>) -> bool {
    try_decode_truthy(value).unwrap_or(false)
}

/// Strict form of [`decode_truthy`]: `None` when the value is absent or is
/// not one of the recognised true/false encodings.
pub fn try_decode_truthy(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_f64() {
            Some(f) if (f - 1.0).abs() < f64::EPSILON => Some(true),
            Some(f) if f.abs() < f64::EPSILON => Some(false),
            _ => None,
        },
        Value::String(s) => {
            let s = s.trim();
            if s.eq_ignore_ascii_case("true") || s == "1" {
                Some(true)
            } else if s.eq_ignore_ascii_case("false") || s == "0" || s.is_empty() {
                Some(false)
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Decode a list encoded as a native array, a JSON-array string or a CSV string.
///
/// Entries are trimmed and empty entries dropped. Source order is kept and
/// duplicates are not removed.
pub fn decode_csv_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_to_trimmed).collect(),
        Some(Value::String(s)) => decode_csv_str(s),
        Some(other @ Value::Number(_)) => scalar_to_trimmed(other).into_iter().collect(),
        _ => Vec::new(),
    }
}

/// String half of [`decode_csv_list`].
pub fn decode_csv_str(s: &str) -> Vec<String> {
    let trimmed = s.trim();
    if trimmed.starts_with('[') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
            return items.iter().filter_map(scalar_to_trimmed).collect();
        }
    }

    trimmed
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(String::from)
        .collect()
}

/// Decode an integer. Numbers pass through, base-10 strings parse, anything else is `0`.
pub fn decode_integer(value: Option<&Value>) -> i64 {
    try_decode_integer(value).unwrap_or(0)
}

/// Strict form of [`decode_integer`]: `None` when absent or unparsable.
pub fn try_decode_integer(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Like [`decode_integer`] but clamped to a non-negative count.
pub fn decode_count(value: Option<&Value>) -> u32 {
    decode_integer(value).clamp(0, i64::from(u32::MAX)) as u32
}

/// Stringify an identifier that may arrive as a string or a number.
///
/// Returns `None` for `null`, absent values, and anything that is not a scalar.
pub fn value_to_id(value: Option<&Value>) -> Option<String> {
    let id = match value? {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!id.is_empty()).then_some(id)
}

/// Stringify a scalar for display, empty when absent or not a scalar.
pub fn value_to_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Normalize a comment's parent reference.
///
/// Trims and lowercases the value; the sentinels `""`, `"0"`, `"null"`,
/// `"undefined"`, `"nan"` and absence all mean "root" and yield `None`.
pub fn normalize_parent_id(value: Option<&Value>) -> Option<String> {
    let raw = match value? {
        Value::String(s) => s.trim().to_lowercase(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    if ROOT_SENTINELS.contains(&raw.as_str()) {
        None
    } else {
        Some(raw)
    }
}

fn scalar_to_trimmed(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}
