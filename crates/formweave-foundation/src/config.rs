use serde_json::{json, Map, Value};

/// Configuration every form starts from.
pub fn default_config() -> Value {
    json!({
        "restrict": false,
        "trim": false,
        "showUnfocusedDescription": false,
        "hideRequiredAsterisk": false
    })
}

/// Shallow merge of `overrides` over `base`. Non-object inputs count as empty.
pub fn merge_config(base: &Value, overrides: &Value) -> Value {
    let mut merged: Map<String, Value> = base.as_object().cloned().unwrap_or_default();
    if let Some(overrides) = overrides.as_object() {
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
    }
    Value::Object(merged)
}

pub fn flag(config: &Value, key: &str) -> bool {
    config.get(key).and_then(Value::as_bool).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_win_and_defaults_remain() {
        let merged = merge_config(&default_config(), &json!({"trim": true, "custom": 1}));
        assert!(flag(&merged, "trim"));
        assert!(!flag(&merged, "restrict"));
        assert_eq!(merged["custom"], json!(1));
        assert_eq!(merge_config(&Value::Null, &Value::Null), json!({}));
    }
}
