//! Layout description tree.
//!
//! A [`UiSchema`] node is either a control bound to a data location by
//! scope, a layout that arranges an ordered list of child elements, a static
//! label, or an element kind this crate does not know about. The JSON wire
//! shape follows JSON Forms (`{"type": "VerticalLayout", "elements": [...]}`).

use std::rc::Rc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};

use crate::equality::{deep_equal, rc_equal};
use crate::error::SchemaError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    Vertical,
    Horizontal,
    Group,
}

impl LayoutKind {
    pub fn type_name(self) -> &'static str {
        match self {
            LayoutKind::Vertical => "VerticalLayout",
            LayoutKind::Horizontal => "HorizontalLayout",
            LayoutKind::Group => "Group",
        }
    }

    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "VerticalLayout" => Some(LayoutKind::Vertical),
            "HorizontalLayout" => Some(LayoutKind::Horizontal),
            "Group" => Some(LayoutKind::Group),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleEffect {
    Show,
    Hide,
    Enable,
    Disable,
}

impl RuleEffect {
    fn parse(name: &str) -> Result<Self, SchemaError> {
        match name {
            "SHOW" => Ok(RuleEffect::Show),
            "HIDE" => Ok(RuleEffect::Hide),
            "ENABLE" => Ok(RuleEffect::Enable),
            "DISABLE" => Ok(RuleEffect::Disable),
            other => Err(SchemaError::UnknownEffect(other.to_owned())),
        }
    }

    fn name(self) -> &'static str {
        match self {
            RuleEffect::Show => "SHOW",
            RuleEffect::Hide => "HIDE",
            RuleEffect::Enable => "ENABLE",
            RuleEffect::Disable => "DISABLE",
        }
    }
}

/// Condition of a [`Rule`]. Scopes are resolved against the data at the
/// owning element's path.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Data at `scope` equals `expected`.
    Leaf { scope: String, expected: Value },
    /// Data at `scope` satisfies the `const` / `enum` keywords of `schema`.
    Schema { scope: String, schema: Value },
    And(Vec<Condition>),
    Or(Vec<Condition>),
}

impl Condition {
    fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let kind = value.get("type").and_then(Value::as_str);
        match kind {
            Some("LEAF") => Ok(Condition::Leaf {
                scope: required_str(value, "scope", "LEAF")?.to_owned(),
                expected: value.get("expectedValue").cloned().unwrap_or(Value::Null),
            }),
            Some("AND") | Some("OR") => {
                let conditions = value
                    .get("conditions")
                    .and_then(Value::as_array)
                    .ok_or(SchemaError::MissingField {
                        field: "conditions",
                        element: "composite condition",
                    })?
                    .iter()
                    .map(Condition::from_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(if kind == Some("AND") {
                    Condition::And(conditions)
                } else {
                    Condition::Or(conditions)
                })
            }
            None if value.get("schema").is_some() => Ok(Condition::Schema {
                scope: required_str(value, "scope", "schema condition")?.to_owned(),
                schema: value.get("schema").cloned().unwrap_or(Value::Null),
            }),
            Some(other) => Err(SchemaError::UnsupportedCondition(other.to_owned())),
            None => Err(SchemaError::UnsupportedCondition(value.to_string())),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Condition::Leaf { scope, expected } => {
                json!({"type": "LEAF", "scope": scope, "expectedValue": expected})
            }
            Condition::Schema { scope, schema } => json!({"scope": scope, "schema": schema}),
            Condition::And(conditions) => json!({
                "type": "AND",
                "conditions": conditions.iter().map(Condition::to_value).collect::<Vec<_>>()
            }),
            Condition::Or(conditions) => json!({
                "type": "OR",
                "conditions": conditions.iter().map(Condition::to_value).collect::<Vec<_>>()
            }),
        }
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Condition::Leaf { scope, expected },
                Condition::Leaf {
                    scope: other_scope,
                    expected: other_expected,
                },
            ) => scope == other_scope && deep_equal(expected, other_expected),
            (
                Condition::Schema { scope, schema },
                Condition::Schema {
                    scope: other_scope,
                    schema: other_schema,
                },
            ) => scope == other_scope && deep_equal(schema, other_schema),
            (Condition::And(a), Condition::And(b)) | (Condition::Or(a), Condition::Or(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub effect: RuleEffect,
    pub condition: Condition,
}

impl Rule {
    fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let effect = RuleEffect::parse(required_str(value, "effect", "rule")?)?;
        let condition = value.get("condition").ok_or(SchemaError::MissingField {
            field: "condition",
            element: "rule",
        })?;
        Ok(Rule {
            effect,
            condition: Condition::from_value(condition)?,
        })
    }

    fn to_value(&self) -> Value {
        json!({"effect": self.effect.name(), "condition": self.condition.to_value()})
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlLabel {
    Text(String),
    /// `true` derives the label from the schema, `false` hides it.
    Show(bool),
}

#[derive(Debug, Clone, Default)]
pub struct ControlElement {
    pub scope: String,
    pub label: Option<ControlLabel>,
    pub options: Map<String, Value>,
    pub rule: Option<Rule>,
}

#[derive(Debug, Clone)]
pub struct LayoutElement {
    pub kind: LayoutKind,
    pub elements: Vec<Rc<UiSchema>>,
    pub label: Option<String>,
    pub options: Map<String, Value>,
    pub rule: Option<Rule>,
}

#[derive(Debug, Clone, Default)]
pub struct LabelElement {
    pub text: String,
    pub rule: Option<Rule>,
}

#[derive(Debug, Clone)]
pub enum UiSchema {
    Control(ControlElement),
    Layout(LayoutElement),
    Label(LabelElement),
    /// Element kind without built-in support; kept verbatim so custom
    /// renderers can still match on it.
    Unknown { type_name: String, raw: Value },
}

impl UiSchema {
    pub fn control(scope: impl Into<String>) -> Self {
        UiSchema::Control(ControlElement {
            scope: scope.into(),
            ..ControlElement::default()
        })
    }

    pub fn layout(kind: LayoutKind, elements: impl IntoIterator<Item = UiSchema>) -> Self {
        UiSchema::Layout(LayoutElement {
            kind,
            elements: elements.into_iter().map(Rc::new).collect(),
            label: None,
            options: Map::new(),
            rule: None,
        })
    }

    pub fn vertical(elements: impl IntoIterator<Item = UiSchema>) -> Self {
        Self::layout(LayoutKind::Vertical, elements)
    }

    pub fn horizontal(elements: impl IntoIterator<Item = UiSchema>) -> Self {
        Self::layout(LayoutKind::Horizontal, elements)
    }

    pub fn group(label: impl Into<String>, elements: impl IntoIterator<Item = UiSchema>) -> Self {
        let mut group = Self::layout(LayoutKind::Group, elements);
        if let UiSchema::Layout(layout) = &mut group {
            layout.label = Some(label.into());
        }
        group
    }

    pub fn label(text: impl Into<String>) -> Self {
        UiSchema::Label(LabelElement {
            text: text.into(),
            rule: None,
        })
    }

    /// Attaches a rule, replacing any existing one. No-op on unknown elements.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        match &mut self {
            UiSchema::Control(control) => control.rule = Some(rule),
            UiSchema::Layout(layout) => layout.rule = Some(rule),
            UiSchema::Label(label) => label.rule = Some(rule),
            UiSchema::Unknown { .. } => {}
        }
        self
    }

    /// Sets an option. No-op on labels and unknown elements.
    pub fn with_option(mut self, key: impl Into<String>, value: Value) -> Self {
        match &mut self {
            UiSchema::Control(control) => {
                control.options.insert(key.into(), value);
            }
            UiSchema::Layout(layout) => {
                layout.options.insert(key.into(), value);
            }
            UiSchema::Label(_) | UiSchema::Unknown { .. } => {}
        }
        self
    }

    pub fn type_name(&self) -> &str {
        match self {
            UiSchema::Control(_) => "Control",
            UiSchema::Layout(layout) => layout.kind.type_name(),
            UiSchema::Label(_) => "Label",
            UiSchema::Unknown { type_name, .. } => type_name,
        }
    }

    pub fn scope(&self) -> Option<&str> {
        match self {
            UiSchema::Control(control) => Some(&control.scope),
            _ => None,
        }
    }

    pub fn elements(&self) -> &[Rc<UiSchema>] {
        match self {
            UiSchema::Layout(layout) => &layout.elements,
            _ => &[],
        }
    }

    pub fn rule(&self) -> Option<&Rule> {
        match self {
            UiSchema::Control(control) => control.rule.as_ref(),
            UiSchema::Layout(layout) => layout.rule.as_ref(),
            UiSchema::Label(label) => label.rule.as_ref(),
            UiSchema::Unknown { .. } => None,
        }
    }

    pub fn option(&self, key: &str) -> Option<&Value> {
        match self {
            UiSchema::Control(control) => control.options.get(key),
            UiSchema::Layout(layout) => layout.options.get(key),
            UiSchema::Label(_) => None,
            UiSchema::Unknown { raw, .. } => {
                raw.get("options").and_then(|options| options.get(key))
            }
        }
    }

    pub fn is_control(&self) -> bool {
        matches!(self, UiSchema::Control(_))
    }

    pub fn is_layout(&self) -> bool {
        matches!(self, UiSchema::Layout(_))
    }

    pub fn from_value(value: &Value) -> Result<Self, SchemaError> {
        let type_name = required_str(value, "type", "ui schema element")?;
        let rule = value.get("rule").map(Rule::from_value).transpose()?;
        let options = value
            .get("options")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        if type_name == "Control" {
            let label = match value.get("label") {
                None | Some(Value::Null) => None,
                Some(Value::String(text)) => Some(ControlLabel::Text(text.clone())),
                Some(Value::Bool(show)) => Some(ControlLabel::Show(*show)),
                Some(Value::Object(settings)) => {
                    match (settings.get("text").and_then(Value::as_str), settings.get("show")) {
                        (_, Some(Value::Bool(false))) => Some(ControlLabel::Show(false)),
                        (Some(text), _) => Some(ControlLabel::Text(text.to_owned())),
                        (None, _) => Some(ControlLabel::Show(true)),
                    }
                }
                Some(other) => return Err(SchemaError::InvalidLabel(other.to_string())),
            };
            return Ok(UiSchema::Control(ControlElement {
                scope: required_str(value, "scope", "Control")?.to_owned(),
                label,
                options,
                rule,
            }));
        }
        if type_name == "Label" {
            return Ok(UiSchema::Label(LabelElement {
                text: value
                    .get("text")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_owned(),
                rule,
            }));
        }
        if let Some(kind) = LayoutKind::from_type_name(type_name) {
            let elements = value
                .get("elements")
                .and_then(Value::as_array)
                .map(|elements| {
                    elements
                        .iter()
                        .map(|element| UiSchema::from_value(element).map(Rc::new))
                        .collect::<Result<Vec<_>, _>>()
                })
                .transpose()?
                .unwrap_or_default();
            return Ok(UiSchema::Layout(LayoutElement {
                kind,
                elements,
                label: value.get("label").and_then(Value::as_str).map(str::to_owned),
                options,
                rule,
            }));
        }
        Ok(UiSchema::Unknown {
            type_name: type_name.to_owned(),
            raw: value.clone(),
        })
    }

    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        match self {
            UiSchema::Control(control) => {
                out.insert("type".into(), json!("Control"));
                out.insert("scope".into(), json!(control.scope));
                match &control.label {
                    Some(ControlLabel::Text(text)) => {
                        out.insert("label".into(), json!(text));
                    }
                    Some(ControlLabel::Show(show)) => {
                        out.insert("label".into(), json!(show));
                    }
                    None => {}
                }
                insert_options(&mut out, &control.options);
                insert_rule(&mut out, control.rule.as_ref());
            }
            UiSchema::Layout(layout) => {
                out.insert("type".into(), json!(layout.kind.type_name()));
                if let Some(label) = &layout.label {
                    out.insert("label".into(), json!(label));
                }
                out.insert(
                    "elements".into(),
                    Value::Array(
                        layout
                            .elements
                            .iter()
                            .map(|element| element.to_value())
                            .collect(),
                    ),
                );
                insert_options(&mut out, &layout.options);
                insert_rule(&mut out, layout.rule.as_ref());
            }
            UiSchema::Label(label) => {
                out.insert("type".into(), json!("Label"));
                out.insert("text".into(), json!(label.text));
                insert_rule(&mut out, label.rule.as_ref());
            }
            UiSchema::Unknown { raw, .. } => return raw.clone(),
        }
        Value::Object(out)
    }
}

fn insert_options(out: &mut Map<String, Value>, options: &Map<String, Value>) {
    if !options.is_empty() {
        out.insert("options".into(), Value::Object(options.clone()));
    }
}

fn insert_rule(out: &mut Map<String, Value>, rule: Option<&Rule>) {
    if let Some(rule) = rule {
        out.insert("rule".into(), rule.to_value());
    }
}

fn required_str<'a>(
    value: &'a Value,
    field: &'static str,
    element: &'static str,
) -> Result<&'a str, SchemaError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or(SchemaError::MissingField { field, element })
}

fn options_equal(a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .all(|(key, value)| b.get(key).is_some_and(|other| deep_equal(value, other)))
}

impl PartialEq for UiSchema {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (UiSchema::Control(a), UiSchema::Control(b)) => {
                a.scope == b.scope
                    && a.label == b.label
                    && a.rule == b.rule
                    && options_equal(&a.options, &b.options)
            }
            (UiSchema::Layout(a), UiSchema::Layout(b)) => {
                a.kind == b.kind
                    && a.label == b.label
                    && a.rule == b.rule
                    && options_equal(&a.options, &b.options)
                    && a.elements.len() == b.elements.len()
                    && a
                        .elements
                        .iter()
                        .zip(&b.elements)
                        .all(|(x, y)| rc_equal(x, y, |x, y| x == y))
            }
            (UiSchema::Label(a), UiSchema::Label(b)) => a.text == b.text && a.rule == b.rule,
            (
                UiSchema::Unknown { type_name, raw },
                UiSchema::Unknown {
                    type_name: other_type,
                    raw: other_raw,
                },
            ) => type_name == other_type && deep_equal(raw, other_raw),
            _ => false,
        }
    }
}

impl Serialize for UiSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for UiSchema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        UiSchema::from_value(&value).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<Value> for UiSchema {
    type Error = SchemaError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        UiSchema::from_value(&value)
    }
}

#[cfg(test)]
#[path = "tests/uischema_tests.rs"]
mod tests;
