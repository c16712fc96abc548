//! Application state observed by dispatch nodes.
//!
//! The engine never mutates these values. Hosts replace them wholesale and
//! hand the new snapshot to the root node.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::equality::{deep_equal, option_equal, rc_equal};
use crate::registry::RendererRegistry;
use crate::schema::JsonSchema;
use crate::uischema::UiSchema;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationMode {
    #[default]
    ValidateAndShow,
    ValidateAndHide,
    NoValidation,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationError {
    /// JSON pointer to the offending value, e.g. `/address/street`.
    pub instance_path: String,
    pub message: String,
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub schema_path: String,
    #[serde(default)]
    pub params: Value,
}

impl ValidationError {
    pub fn new(instance_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            instance_path: instance_path.into(),
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = keyword.into();
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Dotted data path the error belongs to.
    ///
    /// `required` errors are reported on the parent object, so the missing
    /// property is appended to point at the control that shows it.
    pub fn data_path(&self) -> String {
        let mut path = self
            .instance_path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
            .collect::<Vec<_>>();
        if self.keyword == "required" {
            if let Some(missing) = self.params.get("missingProperty").and_then(Value::as_str) {
                path.push(missing.to_owned());
            }
        }
        path.join(".")
    }
}

impl PartialEq for ValidationError {
    fn eq(&self, other: &Self) -> bool {
        self.instance_path == other.instance_path
            && self.message == other.message
            && self.keyword == other.keyword
            && self.schema_path == other.schema_path
            && deep_equal(&self.params, &other.params)
    }
}

#[derive(Debug, Clone, Default)]
pub struct CoreState {
    pub data: Value,
    pub schema: Option<JsonSchema>,
    pub uischema: Option<Rc<UiSchema>>,
    pub errors: Vec<ValidationError>,
    pub additional_errors: Vec<ValidationError>,
    pub validation_mode: ValidationMode,
}

impl CoreState {
    pub fn new(data: Value) -> Self {
        Self {
            data,
            ..Self::default()
        }
    }

    /// Validation errors followed by host supplied ones.
    pub fn all_errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter().chain(&self.additional_errors)
    }
}

impl PartialEq for CoreState {
    fn eq(&self, other: &Self) -> bool {
        deep_equal(&self.data, &other.data)
            && self.schema == other.schema
            && option_equal(self.uischema.as_ref(), other.uischema.as_ref(), |a, b| {
                rc_equal(a, b, |a, b| a == b)
            })
            && self.errors == other.errors
            && self.additional_errors == other.additional_errors
            && self.validation_mode == other.validation_mode
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct I18nState {
    pub locale: Option<String>,
    pub translations: BTreeMap<String, String>,
}

impl I18nState {
    pub fn translate(&self, key: &str, default: &str) -> String {
        self.translations
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_owned())
    }
}

/// Snapshot of everything a dispatch node reads.
#[derive(Debug, Clone)]
pub struct ApplicationState {
    pub core: CoreState,
    pub config: Value,
    pub renderers: Rc<RendererRegistry>,
    pub readonly: bool,
    pub i18n: I18nState,
}

impl ApplicationState {
    pub fn new(core: CoreState, renderers: Rc<RendererRegistry>) -> Self {
        Self {
            core,
            config: Value::Object(Default::default()),
            renderers,
            readonly: false,
            i18n: I18nState::default(),
        }
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn with_readonly(mut self, readonly: bool) -> Self {
        self.readonly = readonly;
        self
    }

    pub fn with_i18n(mut self, i18n: I18nState) -> Self {
        self.i18n = i18n;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_path_converts_pointer_segments() {
        let error = ValidationError::new("/address/0/street", "too short");
        assert_eq!(error.data_path(), "address.0.street");
        assert_eq!(ValidationError::new("", "bad root").data_path(), "");
    }

    #[test]
    fn required_errors_point_at_missing_property() {
        let error = ValidationError::new("/person", "is required")
            .with_keyword("required")
            .with_params(json!({"missingProperty": "name"}));
        assert_eq!(error.data_path(), "person.name");
    }

    #[test]
    fn validation_errors_use_camel_case_on_the_wire() {
        let error = ValidationError::new("/age", "must be number").with_keyword("type");
        let value = serde_json::to_value(&error).expect("serialize");
        assert_eq!(value["instancePath"], json!("/age"));
        assert_eq!(value["keyword"], json!("type"));
    }

    #[test]
    fn translate_falls_back_to_default() {
        let mut i18n = I18nState::default();
        i18n.translations.insert("name.label".into(), "Nom".into());
        assert_eq!(i18n.translate("name.label", "Name"), "Nom");
        assert_eq!(i18n.translate("age.label", "Age"), "Age");
    }
}
