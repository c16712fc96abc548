use serde_json::{Number, Value};

use super::InputVariant;

/// Converts a raw edit into the JSON type the control edits.
///
/// Strings are accepted for every variant so text typed into an input can be
/// submitted as is. An empty string clears the value.
pub fn coerce_edit(
    variant: InputVariant,
    value: Value,
    max_length: Option<u64>,
) -> Result<Value, String> {
    if value.as_str() == Some("") && variant != InputVariant::Text {
        return Ok(Value::Null);
    }
    match (variant, value) {
        (_, Value::Null) => Ok(Value::Null),
        (InputVariant::Text, Value::String(text)) => Ok(Value::String(clip(text, max_length))),
        (InputVariant::Text, other) => Ok(Value::String(clip(other.to_string(), max_length))),
        (InputVariant::Number, Value::Number(number)) => Ok(Value::Number(number)),
        (InputVariant::Number, Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| format!("`{text}` is not a number")),
        (InputVariant::Integer, Value::Number(number)) => match number.as_i64() {
            Some(integer) => Ok(Value::from(integer)),
            None => match number.as_f64() {
                Some(float) if float.fract() == 0.0 => Ok(Value::from(float as i64)),
                _ => Err(format!("{number} is not an integer")),
            },
        },
        (InputVariant::Integer, Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| format!("`{text}` is not an integer")),
        (InputVariant::Boolean, Value::Bool(flag)) => Ok(Value::Bool(flag)),
        (InputVariant::Boolean, Value::String(text)) => match text.as_str() {
            "true" | "on" => Ok(Value::Bool(true)),
            "false" | "off" => Ok(Value::Bool(false)),
            _ => Err(format!("`{text}` is not a boolean")),
        },
        (variant, other) => Err(format!(
            "{other} cannot be stored by a {} control",
            variant.name()
        )),
    }
}

fn clip(text: String, max_length: Option<u64>) -> String {
    match max_length {
        Some(limit) => text.chars().take(limit as usize).collect(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strings_are_parsed_per_variant() {
        assert_eq!(coerce_edit(InputVariant::Number, json!("2.5"), None), Ok(json!(2.5)));
        assert_eq!(coerce_edit(InputVariant::Integer, json!(" 7 "), None), Ok(json!(7)));
        assert_eq!(coerce_edit(InputVariant::Integer, json!(3.0), None), Ok(json!(3)));
        assert_eq!(coerce_edit(InputVariant::Boolean, json!("on"), None), Ok(json!(true)));
        assert_eq!(coerce_edit(InputVariant::Number, json!(""), None), Ok(Value::Null));
        assert_eq!(coerce_edit(InputVariant::Text, json!(""), None), Ok(json!("")));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(coerce_edit(InputVariant::Integer, json!(1.5), None).is_err());
        assert!(coerce_edit(InputVariant::Number, json!("abc"), None).is_err());
        assert!(coerce_edit(InputVariant::Boolean, json!(1), None).is_err());
    }

    #[test]
    fn text_is_clipped_to_the_restricted_length() {
        assert_eq!(
            coerce_edit(InputVariant::Text, json!("abcdef"), Some(3)),
            Ok(json!("abc"))
        );
        assert_eq!(coerce_edit(InputVariant::Text, json!(42), None), Ok(json!("42")));
    }
}
