//! Default data schema and layout generation for hosts that omit them.

use formweave_core::{JsonSchema, SchemaGenerator, UiSchema};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::label::start_case;

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultGenerator;

impl DefaultGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl SchemaGenerator for DefaultGenerator {
    fn json_schema(&self, data: &Value) -> JsonSchema {
        JsonSchema::new(infer(data))
    }

    fn ui_schema(&self, schema: &JsonSchema) -> UiSchema {
        if !schema.has_type("object") {
            return UiSchema::control("#");
        }
        UiSchema::vertical(object_elements(schema.value(), "#"))
    }
}

fn infer(data: &Value) -> Value {
    match data {
        Value::Null => json!({"type": "null"}),
        Value::Bool(_) => json!({"type": "boolean"}),
        Value::Number(number) => {
            let integral = number.is_i64()
                || number.is_u64()
                || number.as_f64().is_some_and(|value| value.fract() == 0.0);
            if integral {
                json!({"type": "integer"})
            } else {
                json!({"type": "number"})
            }
        }
        Value::String(_) => json!({"type": "string"}),
        Value::Array(items) => infer_array(items),
        Value::Object(fields) => {
            let properties: Map<String, Value> = fields
                .iter()
                .map(|(key, value)| (key.clone(), infer(value)))
                .collect();
            let required: Vec<&String> = fields.keys().collect();
            json!({
                "type": "object",
                "properties": properties,
                "additionalProperties": true,
                "required": required
            })
        }
    }
}

/// One item schema per distinct item type, in order of first appearance.
fn infer_array(items: &[Value]) -> Value {
    let mut distinct: IndexMap<String, Value> = IndexMap::new();
    for item in items {
        let schema = infer(item);
        let type_name = schema["type"].as_str().unwrap_or_default().to_owned();
        distinct.entry(type_name).or_insert(schema);
    }
    match distinct.len() {
        0 => json!({"type": "array", "items": {}}),
        1 => {
            let items = distinct.into_values().next().unwrap_or_default();
            json!({"type": "array", "items": items})
        }
        _ => {
            let variants: Vec<Value> = distinct.into_values().collect();
            json!({"type": "array", "items": {"anyOf": variants}})
        }
    }
}

fn object_elements(schema: &Value, scope: &str) -> Vec<UiSchema> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Vec::new();
    };
    properties
        .iter()
        .map(|(name, property)| {
            let child_scope = format!("{scope}/properties/{name}");
            let nested = property.get("type").and_then(Value::as_str) == Some("object")
                && property.get("properties").is_some();
            if nested {
                UiSchema::group(start_case(name), object_elements(property, &child_scope))
            } else {
                UiSchema::control(child_scope)
            }
        })
        .collect()
}
