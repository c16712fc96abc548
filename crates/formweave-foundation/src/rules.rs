//! Rule evaluation for visibility and enablement.

use formweave_core::{deep_equal, Condition, RuleEffect, UiSchema};
use serde_json::Value;

use crate::path::{compose_paths, resolve_data, to_data_path};

/// Evaluates `condition` against the root `data`; scopes are taken relative
/// to `path`.
pub fn evaluate_condition(condition: &Condition, data: &Value, path: &str) -> bool {
    match condition {
        Condition::Leaf { scope, expected } => {
            let value = resolve_data(data, &compose_paths(path, &to_data_path(scope)));
            value.is_some_and(|value| deep_equal(value, expected))
        }
        Condition::Schema { scope, schema } => {
            let value = resolve_data(data, &compose_paths(path, &to_data_path(scope)));
            matches_schema(value, schema)
        }
        Condition::And(conditions) => conditions
            .iter()
            .all(|condition| evaluate_condition(condition, data, path)),
        Condition::Or(conditions) => conditions
            .iter()
            .any(|condition| evaluate_condition(condition, data, path)),
    }
}

/// Only `const` and `enum` are checked; an absent value never matches.
fn matches_schema(value: Option<&Value>, schema: &Value) -> bool {
    let Some(value) = value else {
        return false;
    };
    if let Some(expected) = schema.get("const") {
        if !deep_equal(value, expected) {
            return false;
        }
    }
    if let Some(options) = schema.get("enum").and_then(Value::as_array) {
        if !options.iter().any(|option| deep_equal(value, option)) {
            return false;
        }
    }
    true
}

pub fn is_visible(uischema: &UiSchema, data: &Value, path: &str) -> bool {
    match uischema.rule() {
        Some(rule) if rule.effect == RuleEffect::Hide => {
            !evaluate_condition(&rule.condition, data, path)
        }
        Some(rule) if rule.effect == RuleEffect::Show => {
            evaluate_condition(&rule.condition, data, path)
        }
        _ => true,
    }
}

/// `Some` when an ENABLE or DISABLE rule decides enablement.
pub fn rule_enablement(uischema: &UiSchema, data: &Value, path: &str) -> Option<bool> {
    let rule = uischema.rule()?;
    match rule.effect {
        RuleEffect::Enable => Some(evaluate_condition(&rule.condition, data, path)),
        RuleEffect::Disable => Some(!evaluate_condition(&rule.condition, data, path)),
        RuleEffect::Show | RuleEffect::Hide => None,
    }
}
