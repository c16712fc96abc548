//! Data schema handle and scope resolution.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::equality::deep_equal;
use crate::uischema::UiSchema;

/// Shared, immutable JSON schema.
///
/// Cloning is cheap. Two handles created from the same [`JsonSchema::new`]
/// call are identical (see [`JsonSchema::same`]); equality falls back to a
/// structural comparison.
#[derive(Clone)]
pub struct JsonSchema(Rc<Value>);

impl JsonSchema {
    pub fn new(value: Value) -> Self {
        Self(Rc::new(value))
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Pointer identity.
    pub fn same(&self, other: &JsonSchema) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn keyword(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Declared `type` names; a single string and an array are both accepted.
    pub fn type_names(&self) -> Vec<&str> {
        match self.0.get("type") {
            Some(Value::String(name)) => vec![name.as_str()],
            Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn has_type(&self, name: &str) -> bool {
        self.type_names().contains(&name)
    }

    pub fn format(&self) -> Option<&str> {
        self.0.get("format").and_then(Value::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    pub fn is_required(&self, property: &str) -> bool {
        self.0
            .get("required")
            .and_then(Value::as_array)
            .is_some_and(|names| names.iter().any(|name| name.as_str() == Some(property)))
    }

    /// Resolves a `#/properties/...` style scope against this schema.
    ///
    /// `$ref`s of the form `#/...` encountered on the way are followed
    /// against `root`, or against this schema when no root is given.
    pub fn resolve_scope(&self, root: Option<&JsonSchema>, scope: &str) -> Option<JsonSchema> {
        let root = root.unwrap_or(self).value();
        let pointer = scope.strip_prefix('#')?;
        let mut current = follow_refs(root, self.value())?;
        for segment in pointer.split('/').filter(|segment| !segment.is_empty()) {
            let key = unescape_segment(segment);
            let next = match current {
                Value::Object(map) => map.get(key.as_str())?,
                Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
                _ => return None,
            };
            current = follow_refs(root, next)?;
        }
        Some(JsonSchema::new(current.clone()))
    }
}

const MAX_REF_DEPTH: usize = 32;

fn follow_refs<'a>(root: &'a Value, mut schema: &'a Value) -> Option<&'a Value> {
    for _ in 0..MAX_REF_DEPTH {
        match schema.get("$ref").and_then(Value::as_str) {
            Some(reference) => {
                let pointer = reference.strip_prefix('#')?;
                schema = root.pointer(pointer)?;
            }
            None => return Some(schema),
        }
    }
    log::warn!("gave up resolving $ref chain after {MAX_REF_DEPTH} hops");
    None
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

impl PartialEq for JsonSchema {
    fn eq(&self, other: &Self) -> bool {
        self.same(other) || deep_equal(&self.0, &other.0)
    }
}

impl fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("JsonSchema").field(&*self.0).finish()
    }
}

impl From<Value> for JsonSchema {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}

impl Serialize for JsonSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for JsonSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::new)
    }
}

/// Produces default schemas when a host omits them.
pub trait SchemaGenerator {
    /// Infers a data schema describing `data`.
    fn json_schema(&self, data: &Value) -> JsonSchema;

    /// Builds a default layout for `schema`.
    fn ui_schema(&self, schema: &JsonSchema) -> UiSchema;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> JsonSchema {
        JsonSchema::new(json!({
            "type": "object",
            "required": ["name"],
            "properties": {
                "name": {"type": "string", "title": "Full name"},
                "address": {"$ref": "#/definitions/address"}
            },
            "definitions": {
                "address": {
                    "type": "object",
                    "properties": {"street": {"type": "string", "format": "street"}}
                }
            }
        }))
    }

    #[test]
    fn resolves_nested_property_scope() {
        let schema = person();
        let name = schema.resolve_scope(None, "#/properties/name").expect("name");
        assert!(name.has_type("string"));
        assert_eq!(name.title(), Some("Full name"));
    }

    #[test]
    fn follows_refs_against_root() {
        let schema = person();
        let street = schema
            .resolve_scope(None, "#/properties/address/properties/street")
            .expect("street");
        assert_eq!(street.format(), Some("street"));
    }

    #[test]
    fn root_scope_returns_whole_schema() {
        let schema = person();
        assert_eq!(schema.resolve_scope(None, "#"), Some(schema.clone()));
    }

    #[test]
    fn missing_or_malformed_scope_is_none() {
        let schema = person();
        assert!(schema.resolve_scope(None, "#/properties/age").is_none());
        assert!(schema.resolve_scope(None, "properties/name").is_none());
    }

    #[test]
    fn equality_uses_identity_then_structure() {
        let a = JsonSchema::new(json!({"type": "number"}));
        let b = JsonSchema::new(json!({"type": "number"}));
        assert!(!a.same(&b));
        assert_eq!(a, b);
        assert!(a.same(&a.clone()));
    }

    #[test]
    fn type_names_accept_arrays() {
        let schema = JsonSchema::new(json!({"type": ["string", "null"]}));
        assert!(schema.has_type("null"));
        assert!(person().is_required("name"));
        assert!(!person().is_required("address"));
    }
}
