//! Field Validators
//!
//! Each validator checks one attribute value and returns the violations it
//! found: empty when the value is acceptable, one message otherwise. The
//! message always names the attribute. Values of the wrong JSON type are
//! reported rather than coerced.

use serde_json::Value;

/// Accepted rsyslog `format` values
pub const RSYSLOG_FORMATS: [&str; 3] = ["rfc5424", "rfc3164", "custom"];

/// Largest `timeout_seconds`; the API carries the timeout as a 32-bit float,
/// which holds every integer up to here exactly
pub const MAX_TIMEOUT_SECONDS: i64 = 1 << 24;

/// Largest `index_days_max` the API accepts
pub const MAX_INDEX_DAYS: i64 = u32::MAX as i64;

fn as_int(value: &Value) -> Option<i64> {
    // Integers beyond i64 are still integers, just out of every range below
    value
        .as_i64()
        .or_else(|| value.as_u64().map(|_| i64::MAX))
}

fn not_integer(key: &str) -> Vec<String> {
    vec![format!("{:?} must be an integer", key)]
}

fn not_string(key: &str) -> Vec<String> {
    vec![format!("{:?} must be a string", key)]
}

fn at_least_one(value: &Value, key: &str, max: i64) -> Vec<String> {
    match as_int(value) {
        None => not_integer(key),
        Some(v) if v < 1 => vec![format!("{:?} must be >= 1", key)],
        Some(v) if v > max => vec![format!("{:?} must be <= {}", key, max)],
        Some(_) => vec![],
    }
}

/// `timeout_seconds`: integer in 1..=[`MAX_TIMEOUT_SECONDS`]
pub fn validate_timeout(value: &Value, key: &str) -> Vec<String> {
    at_least_one(value, key, MAX_TIMEOUT_SECONDS)
}

/// `port`: integer in 1..=65535
pub fn validate_port(value: &Value, key: &str) -> Vec<String> {
    match as_int(value) {
        None => not_integer(key),
        Some(v) if !(1..=65535).contains(&v) => {
            vec![format!("{:?} must be between 1 and 65535", key)]
        }
        Some(_) => vec![],
    }
}

/// `endpoint`: absolute URL with the `https` scheme
pub fn validate_https_endpoint(value: &Value, key: &str) -> Vec<String> {
    let Some(v) = value.as_str() else {
        return not_string(key);
    };

    match url::Url::parse(v) {
        Err(err) => vec![format!("{:?} must be a valid URL: {}", key, err)],
        Ok(u) if u.scheme() != "https" => vec![format!("{:?} must use HTTPS scheme", key)],
        Ok(_) => vec![],
    }
}

/// `format`: one of [`RSYSLOG_FORMATS`]
pub fn validate_rsyslog_format(value: &Value, key: &str) -> Vec<String> {
    let Some(v) = value.as_str() else {
        return not_string(key);
    };

    if RSYSLOG_FORMATS.contains(&v) {
        return vec![];
    }
    vec![format!(
        "{:?} must be one of: {}",
        key,
        RSYSLOG_FORMATS.join(", ")
    )]
}

/// `index_prefix`: not blank
pub fn validate_index_prefix(value: &Value, key: &str) -> Vec<String> {
    match value.as_str() {
        None => not_string(key),
        Some(v) if v.trim().is_empty() => vec![format!("{:?} cannot be empty", key)],
        Some(_) => vec![],
    }
}

/// `index_days_max`: integer in 1..=[`MAX_INDEX_DAYS`]
pub fn validate_index_days_max(value: &Value, key: &str) -> Vec<String> {
    at_least_one(value, key, MAX_INDEX_DAYS)
}

/// Rejects the zero value of the attribute's type
pub fn no_zero_values(value: &Value, key: &str) -> Vec<String> {
    let zero = match value {
        Value::String(s) => s.is_empty(),
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Bool(b) => !b,
        Value::Null => true,
        _ => false,
    };
    if zero {
        vec![format!("{:?} must not be empty", key)]
    } else {
        vec![]
    }
}
