//! Actions and reducer traits for the externally owned state.
//!
//! The engine only emits [`CoreAction::UpdateData`] from controls; hosts use
//! the rest to build state snapshots.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde_json::Value;

use crate::schema::JsonSchema;
use crate::state::{CoreState, I18nState, ValidationError, ValidationMode};
use crate::uischema::UiSchema;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitOptions {
    pub validation_mode: Option<ValidationMode>,
    pub additional_errors: Option<Vec<ValidationError>>,
}

#[derive(Debug, Clone)]
pub enum CoreAction {
    Init {
        data: Value,
        schema: JsonSchema,
        uischema: Rc<UiSchema>,
        options: InitOptions,
    },
    UpdateCore {
        data: Value,
        schema: JsonSchema,
        uischema: Rc<UiSchema>,
        options: InitOptions,
    },
    /// Replaces the value at a dotted data path; the empty path is the root.
    UpdateData { path: String, value: Value },
    UpdateErrors(Vec<ValidationError>),
    SetSchema(JsonSchema),
    SetUiSchema(Rc<UiSchema>),
    SetValidationMode(ValidationMode),
}

#[derive(Debug, Clone)]
pub enum ConfigAction {
    /// Merges the given object over the default configuration.
    Set(Value),
}

#[derive(Debug, Clone)]
pub enum I18nAction {
    Update {
        locale: Option<String>,
        translations: Option<BTreeMap<String, String>>,
    },
}

/// Pure state transitions.
pub trait StateReducer {
    fn reduce_core(&self, state: &CoreState, action: &CoreAction) -> CoreState;
    fn reduce_config(&self, config: &Value, action: &ConfigAction) -> Value;
    fn reduce_i18n(&self, i18n: &I18nState, action: &I18nAction) -> I18nState;
}

pub trait Validator {
    fn validate(&self, schema: &JsonSchema, data: &Value) -> Vec<ValidationError>;
}
