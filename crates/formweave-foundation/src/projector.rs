//! Default mapping from application state to render props.

use formweave_core::{
    ApplicationState, JsonSchema, NodeInputs, ProjectionError, RenderProps, StateProjector,
    UiSchema, ValidationMode,
};
use serde_json::Value;

use crate::config::merge_config;
use crate::label::default_label;
use crate::path::{compose_paths, resolve_data, split_property_scope, to_data_path};
use crate::rules::{is_visible, rule_enablement};

/// Resolves scopes, evaluates rules, derives labels and scopes errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProjector;

impl DefaultProjector {
    pub fn new() -> Self {
        Self
    }
}

impl StateProjector for DefaultProjector {
    fn project(
        &self,
        state: &ApplicationState,
        inputs: &NodeInputs,
    ) -> Result<RenderProps, ProjectionError> {
        let core = &state.core;
        let mut props = RenderProps::new(state.renderers.clone());
        props.root_schema = core.schema.clone();
        props.schema = inputs.schema.clone().or_else(|| core.schema.clone());
        props.uischema = inputs.uischema.clone().or_else(|| core.uischema.clone());
        props.path = inputs.path.clone();
        props.data_path = inputs.path.clone();
        props.i18n = state.i18n.clone();

        let Some(uischema) = props.uischema.clone() else {
            props.config = state.config.clone();
            props.enabled = inputs.enabled.unwrap_or(true) && !state.readonly;
            return Ok(props);
        };

        props.config = match &*uischema {
            UiSchema::Control(control) => {
                merge_config(&state.config, &Value::Object(control.options.clone()))
            }
            UiSchema::Layout(layout) => {
                merge_config(&state.config, &Value::Object(layout.options.clone()))
            }
            _ => state.config.clone(),
        };
        props.visible = is_visible(&uischema, &core.data, &inputs.path);
        props.enabled = is_enabled(state, inputs, &uischema, None);

        if let UiSchema::Layout(layout) = &*uischema {
            props.label = layout.label.clone().unwrap_or_default();
        }
        if let UiSchema::Label(label) = &*uischema {
            props.label = label.text.clone();
        }
        let Some(scope) = uischema.scope() else {
            props.data = resolve_data(&core.data, &props.data_path)
                .cloned()
                .unwrap_or(Value::Null);
            return Ok(props);
        };

        if !scope.starts_with('#') {
            return Err(ProjectionError::InvalidScope {
                scope: scope.to_owned(),
            });
        }
        props.data_path = compose_paths(&inputs.path, &to_data_path(scope));
        props.data = resolve_data(&core.data, &props.data_path)
            .cloned()
            .unwrap_or(Value::Null);
        props.control_schema = props
            .schema
            .as_ref()
            .and_then(|schema| schema.resolve_scope(props.root_schema.as_ref(), scope));
        if props.control_schema.is_none() {
            log::debug!("scope `{scope}` does not resolve against the data schema");
        }
        props.enabled = is_enabled(state, inputs, &uischema, props.control_schema.as_ref());
        props.required = is_required(props.schema.as_ref(), props.root_schema.as_ref(), scope);
        let label = default_label(&uischema, props.control_schema.as_ref());
        props.label = if label.is_empty() {
            label
        } else {
            state
                .i18n
                .translate(&format!("{}.label", props.data_path), &label)
        };
        props.errors = match core.validation_mode {
            ValidationMode::ValidateAndShow => core
                .all_errors()
                .filter(|error| error.data_path() == props.data_path)
                .map(|error| error.message.clone())
                .collect(),
            ValidationMode::ValidateAndHide | ValidationMode::NoValidation => core
                .additional_errors
                .iter()
                .filter(|error| error.data_path() == props.data_path)
                .map(|error| error.message.clone())
                .collect(),
        };
        Ok(props)
    }
}

/// Precedence: readonly form, readonly option, rule, explicit input,
/// schema `readOnly`, enabled.
fn is_enabled(
    state: &ApplicationState,
    inputs: &NodeInputs,
    uischema: &UiSchema,
    control_schema: Option<&JsonSchema>,
) -> bool {
    if state.readonly {
        return false;
    }
    if uischema.option("readonly").and_then(Value::as_bool) == Some(true) {
        return false;
    }
    if let Some(enabled) = rule_enablement(uischema, &state.core.data, &inputs.path) {
        return enabled;
    }
    if let Some(enabled) = inputs.enabled {
        return enabled;
    }
    !control_schema
        .is_some_and(|schema| schema.keyword("readOnly").and_then(Value::as_bool) == Some(true))
}

fn is_required(schema: Option<&JsonSchema>, root: Option<&JsonSchema>, scope: &str) -> bool {
    let Some((parent_scope, property)) = split_property_scope(scope) else {
        return false;
    };
    schema
        .and_then(|schema| schema.resolve_scope(root, parent_scope))
        .is_some_and(|parent| parent.is_required(property))
}

#[cfg(test)]
#[path = "tests/projector_tests.rs"]
mod tests;
