//! Scope and data path helpers.
//!
//! Scopes are schema pointers (`#/properties/address/properties/street`);
//! data paths are dotted (`address.street`, `items.0.name`).

use serde_json::{Map, Value};

/// Converts a scope into a data path by keeping every second segment after
/// the root marker.
pub fn to_data_path(scope: &str) -> String {
    to_data_segments(scope).join(".")
}

pub fn to_data_segments(scope: &str) -> Vec<String> {
    let segments: Vec<String> = scope.split('/').map(decode_segment).collect();
    let start = match segments.first().map(String::as_str) {
        Some("#") | Some("") => 2,
        _ => 1,
    };
    segments
        .into_iter()
        .skip(start)
        .step_by(2)
        .collect()
}

fn decode_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Joins two data paths, ignoring empty sides.
pub fn compose_paths(first: &str, second: &str) -> String {
    match (first.is_empty(), second.is_empty()) {
        (true, _) => second.to_owned(),
        (_, true) => first.to_owned(),
        _ => format!("{first}.{second}"),
    }
}

/// Parent scope and property name of a property scope, e.g.
/// `#/properties/a/properties/b` gives `#/properties/a` and `b`.
pub fn split_property_scope(scope: &str) -> Option<(&str, &str)> {
    let (rest, property) = scope.rsplit_once('/')?;
    let (parent, keyword) = rest.rsplit_once('/')?;
    (keyword == "properties").then_some((parent, property))
}

pub fn resolve_data<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(data, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
            _ => None,
        })
}

/// Returns a copy of `data` with `value` stored at `path`, creating
/// intermediate objects as needed. The empty path replaces the root.
pub fn set_data(data: &Value, path: &str, value: Value) -> Value {
    let segments: Vec<&str> = path.split('.').filter(|segment| !segment.is_empty()).collect();
    if segments.is_empty() {
        return value;
    }
    let mut root = data.clone();
    store(&mut root, &segments, value);
    root
}

fn store(target: &mut Value, segments: &[&str], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return;
    };
    if let Value::Array(items) = &mut *target {
        if let Ok(index) = head.parse::<usize>() {
            if index < items.len() {
                store(&mut items[index], rest, value);
                return;
            }
            if index == items.len() {
                items.push(Value::Null);
                store(&mut items[index], rest, value);
                return;
            }
        }
    }
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        let slot = map.entry((*head).to_owned()).or_insert(Value::Null);
        store(slot, rest, value);
    }
}
