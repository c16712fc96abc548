//! Default reducers for core, config and i18n state.

use formweave_core::{
    ConfigAction, CoreAction, CoreState, I18nAction, I18nState, InitOptions, JsonSchema,
    StateReducer, ValidationError, ValidationMode, Validator,
};
use serde_json::Value;

use crate::config::{default_config, merge_config};
use crate::path::set_data;
use crate::validate::NoopValidator;

/// Reduces actions into fresh snapshots, revalidating data after every
/// change that can affect it.
#[derive(Debug, Clone, Default)]
pub struct CoreReducer<V = NoopValidator> {
    validator: V,
}

impl CoreReducer<NoopValidator> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V: Validator> CoreReducer<V> {
    pub fn with_validator(validator: V) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    fn validate(
        &self,
        mode: ValidationMode,
        schema: Option<&JsonSchema>,
        data: &Value,
    ) -> Vec<ValidationError> {
        match (mode, schema) {
            (ValidationMode::NoValidation, _) | (_, None) => Vec::new(),
            (_, Some(schema)) => self.validator.validate(schema, data),
        }
    }

    fn revalidated(&self, mut core: CoreState) -> CoreState {
        core.errors = self.validate(core.validation_mode, core.schema.as_ref(), &core.data);
        core
    }
}

impl<V: Validator> StateReducer for CoreReducer<V> {
    fn reduce_core(&self, state: &CoreState, action: &CoreAction) -> CoreState {
        match action {
            CoreAction::Init {
                data,
                schema,
                uischema,
                options,
            } => self.revalidated(CoreState {
                data: data.clone(),
                schema: Some(schema.clone()),
                uischema: Some(uischema.clone()),
                errors: Vec::new(),
                additional_errors: options.additional_errors.clone().unwrap_or_default(),
                validation_mode: options.validation_mode.unwrap_or_default(),
            }),
            CoreAction::UpdateCore {
                data,
                schema,
                uischema,
                options,
            } => {
                let InitOptions {
                    validation_mode,
                    additional_errors,
                } = options;
                self.revalidated(CoreState {
                    data: data.clone(),
                    schema: Some(schema.clone()),
                    uischema: Some(uischema.clone()),
                    errors: Vec::new(),
                    additional_errors: additional_errors
                        .clone()
                        .unwrap_or_else(|| state.additional_errors.clone()),
                    validation_mode: validation_mode.unwrap_or(state.validation_mode),
                })
            }
            CoreAction::UpdateData { path, value } => {
                let mut next = state.clone();
                next.data = set_data(&state.data, path, value.clone());
                self.revalidated(next)
            }
            CoreAction::UpdateErrors(errors) => CoreState {
                errors: errors.clone(),
                ..state.clone()
            },
            CoreAction::SetSchema(schema) => self.revalidated(CoreState {
                schema: Some(schema.clone()),
                ..state.clone()
            }),
            CoreAction::SetUiSchema(uischema) => CoreState {
                uischema: Some(uischema.clone()),
                ..state.clone()
            },
            CoreAction::SetValidationMode(mode) => {
                if *mode == state.validation_mode {
                    return state.clone();
                }
                self.revalidated(CoreState {
                    validation_mode: *mode,
                    ..state.clone()
                })
            }
        }
    }

    fn reduce_config(&self, _config: &Value, action: &ConfigAction) -> Value {
        match action {
            ConfigAction::Set(overrides) => merge_config(&default_config(), overrides),
        }
    }

    fn reduce_i18n(&self, i18n: &I18nState, action: &I18nAction) -> I18nState {
        match action {
            I18nAction::Update {
                locale,
                translations,
            } => I18nState {
                locale: locale.clone().or_else(|| i18n.locale.clone()),
                translations: translations
                    .clone()
                    .unwrap_or_else(|| i18n.translations.clone()),
            },
        }
    }
}
