//! Lookup and conversion helpers over span and resource attributes.
//!
//! Attribute values are read with "truthy" semantics: empty strings, `false`,
//! zero and empty arrays count as unset, so that fallback chains move on to
//! the next candidate key.
use opentelemetry::{Array, Key, KeyValue, Value};
use opentelemetry_sdk::Resource;
use std::net::IpAddr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Raw value of `key`, if the attribute is recorded at all.
pub(crate) fn get<'a>(attributes: &'a [KeyValue], key: &str) -> Option<&'a Value> {
    attributes
        .iter()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| &kv.value)
}

/// Whether `key` is recorded, whatever its value.
pub(crate) fn contains(attributes: &[KeyValue], key: &str) -> bool {
    get(attributes, key).is_some()
}

/// String form of `key`, unless unset or falsy.
pub(crate) fn string(attributes: &[KeyValue], key: &str) -> Option<String> {
    get(attributes, key).and_then(stringify)
}

/// First truthy string among `keys`, in order.
pub(crate) fn first_string(attributes: &[KeyValue], keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| string(attributes, key))
}

/// Numeric form of `key`. Strings holding a number are accepted.
pub(crate) fn number(attributes: &[KeyValue], key: &str) -> Option<i64> {
    get(attributes, key).and_then(numeric)
}

/// String form of a resource attribute, unless unset or falsy.
pub(crate) fn resource_string(resource: &Resource, key: &'static str) -> Option<String> {
    resource
        .get(&Key::from_static_str(key))
        .and_then(|value| stringify(&value))
}

/// Whether the resource records `key`, whatever its value.
pub(crate) fn resource_contains(resource: &Resource, key: &'static str) -> bool {
    resource.get(&Key::from_static_str(key)).is_some()
}

/// Converts a value into a string, treating falsy values as absent.
///
/// Arrays are joined with `,`.
pub(crate) fn stringify(value: &Value) -> Option<String> {
    let text = match value {
        Value::Bool(false) => return None,
        Value::Bool(true) => "true".to_string(),
        Value::I64(0) => return None,
        Value::I64(number) => number.to_string(),
        Value::F64(number) if *number == 0.0 || number.is_nan() => return None,
        Value::F64(number) => number.to_string(),
        Value::String(text) => text.as_str().to_string(),
        Value::Array(array) => join(array),
        other => other.as_str().into_owned(),
    };
    Some(text).filter(|text| !text.is_empty())
}

fn join(array: &Array) -> String {
    match array {
        Array::Bool(values) => join_display(values),
        Array::I64(values) => join_display(values),
        Array::F64(values) => join_display(values),
        Array::String(values) => values
            .iter()
            .map(|value| value.as_str())
            .collect::<Vec<_>>()
            .join(","),
        other => other.to_string(),
    }
}

fn join_display<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

fn numeric(value: &Value) -> Option<i64> {
    match value {
        Value::I64(number) => Some(*number),
        Value::F64(number) if number.is_finite() => Some(*number as i64),
        Value::String(text) => {
            let text = text.as_str().trim();
            text.parse::<i64>().ok().or_else(|| {
                text.parse::<f64>()
                    .ok()
                    .filter(|number| number.is_finite())
                    .map(|number| number as i64)
            })
        }
        _ => None,
    }
}

/// Returns the candidate only if it is an IPv4 or IPv6 literal.
pub(crate) fn ip(candidate: Option<String>) -> Option<String> {
    candidate.filter(|text| text.parse::<IpAddr>().is_ok())
}

/// Converts a timestamp into fractional seconds since the epoch.
pub(crate) fn epoch_seconds(time: SystemTime) -> f64 {
    time.duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as f64 + f64::from(elapsed.subsec_nanos()) / 1e9)
        .unwrap_or(0.0)
}

/// `None` for empty vectors.
pub(crate) fn non_empty<T>(items: Vec<T>) -> Option<Vec<T>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

/// JSON form of an attribute value.
pub(crate) fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(flag) => serde_json::Value::Bool(*flag),
        Value::I64(number) => serde_json::Value::from(*number),
        Value::F64(number) => serde_json::Number::from_f64(*number)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(text) => serde_json::Value::String(text.as_str().to_string()),
        Value::Array(Array::Bool(values)) => serde_json::Value::from(values.clone()),
        Value::Array(Array::I64(values)) => serde_json::Value::from(values.clone()),
        Value::Array(Array::F64(values)) => values
            .iter()
            .map(|number| {
                serde_json::Number::from_f64(*number)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null)
            })
            .collect(),
        Value::Array(Array::String(values)) => values
            .iter()
            .map(|value| serde_json::Value::String(value.as_str().to_string()))
            .collect(),
        other => serde_json::Value::String(other.as_str().into_owned()),
    }
}
