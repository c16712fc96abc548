//! Input controls for string, number, integer and boolean properties.

mod coerce;

use std::rc::Rc;

use formweave_core::testers::{
    is_boolean_control, is_integer_control, is_number_control, is_string_control, rank_with,
};
use formweave_core::{
    ApplicationState, CoreAction, CoreChange, EditError, InputView, JsonSchema, NodeContext,
    NodeId, RefreshError, RendererEntry, View, Widget, WidgetFactory, WidgetInputs, WidgetKind,
};
use formweave_foundation::config::flag;
use serde_json::Value;

pub use coerce::coerce_edit;

/// Which JSON type a control edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputVariant {
    Text,
    Number,
    Integer,
    Boolean,
}

impl InputVariant {
    pub fn name(self) -> &'static str {
        match self {
            InputVariant::Text => "text",
            InputVariant::Number => "number",
            InputVariant::Integer => "integer",
            InputVariant::Boolean => "boolean",
        }
    }

    pub fn widget_kind(self) -> WidgetKind {
        WidgetKind::Control(self.name())
    }
}

/// Everything a control shows, captured on the last push.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    node: NodeId,
    state: Option<Rc<ApplicationState>>,
    id: Option<String>,
    data_path: String,
    data: Value,
    control_schema: Option<JsonSchema>,
    input_type: String,
    label: String,
    visible: bool,
    enabled: bool,
    required: bool,
    restrict: bool,
    errors: String,
}

pub struct InputControl {
    variant: InputVariant,
    context: NodeContext,
    snapshot: Snapshot,
}

impl InputControl {
    pub fn new(context: &NodeContext, variant: InputVariant) -> Self {
        Self {
            variant,
            context: context.clone(),
            snapshot: Snapshot::default(),
        }
    }

    pub fn variant(&self) -> InputVariant {
        self.variant
    }

    /// Data path the control writes edits to.
    pub fn data_path(&self) -> &str {
        &self.snapshot.data_path
    }

    pub fn value(&self) -> &Value {
        &self.snapshot.data
    }

    pub fn element_id(&self) -> Option<&str> {
        self.snapshot.id.as_deref()
    }

    fn input_type(&self, inputs: &WidgetInputs<'_>) -> String {
        match self.variant {
            InputVariant::Text => {
                let props = inputs.props;
                let option = props
                    .uischema
                    .as_ref()
                    .and_then(|uischema| uischema.option("format"))
                    .and_then(Value::as_str);
                let schema_format = props
                    .control_schema
                    .as_ref()
                    .and_then(JsonSchema::format)
                    .filter(|format| matches!(*format, "tel" | "email"));
                option.or(schema_format).unwrap_or("text").to_owned()
            }
            InputVariant::Number | InputVariant::Integer => "number".to_owned(),
            InputVariant::Boolean => "checkbox".to_owned(),
        }
    }

    fn display_value(&self) -> String {
        match &self.snapshot.data {
            Value::Null => String::new(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

impl Widget for InputControl {
    fn kind(&self) -> WidgetKind {
        self.variant.widget_kind()
    }

    fn update(&mut self, inputs: &WidgetInputs<'_>) -> Result<(), RefreshError> {
        let props = inputs.props;
        let hide_asterisk = flag(&props.config, "hideRequiredAsterisk");
        self.snapshot = Snapshot {
            node: inputs.node,
            state: Some(inputs.state.clone()),
            id: inputs.id.map(str::to_owned),
            data_path: props.data_path.clone(),
            data: props.data.clone(),
            control_schema: props.control_schema.clone(),
            input_type: self.input_type(inputs),
            label: props.label.clone(),
            visible: props.visible,
            enabled: props.enabled,
            required: props.required && !hide_asterisk,
            restrict: flag(&props.config, "restrict"),
            errors: props.error_text(),
        };
        Ok(())
    }

    fn unmount(&mut self) {
        self.snapshot.state = None;
    }

    fn view(&self) -> View {
        if !self.snapshot.visible {
            return View::Empty;
        }
        View::Input(InputView {
            id: self.snapshot.id.clone(),
            input_type: self.snapshot.input_type.clone(),
            label: self.snapshot.label.clone(),
            value: self.display_value(),
            enabled: self.snapshot.enabled,
            required: self.snapshot.required,
            errors: self.snapshot.errors.clone(),
        })
    }

    /// Reduces the edit into a new core state and emits it; the control
    /// itself changes only when the host pushes the new state back.
    fn edit(&mut self, value: Value) -> Result<(), EditError> {
        let Some(state) = self.snapshot.state.clone() else {
            return Err(EditError::MissingState);
        };
        if !self.snapshot.enabled {
            return Err(EditError::Rejected {
                kind: self.kind().to_string(),
                reason: "control is disabled".to_owned(),
            });
        }
        let max_length = self
            .snapshot
            .control_schema
            .as_ref()
            .filter(|_| self.snapshot.restrict)
            .and_then(|schema| schema.keyword("maxLength"))
            .and_then(Value::as_u64);
        let value = coerce_edit(self.variant, value, max_length).map_err(|reason| {
            EditError::Rejected {
                kind: self.kind().to_string(),
                reason,
            }
        })?;
        let path = self.snapshot.data_path.clone();
        let core = self.context.reducer.reduce_core(
            &state.core,
            &CoreAction::UpdateData {
                path: path.clone(),
                value: value.clone(),
            },
        );
        log::debug!("control {} edited `{}`", self.snapshot.node, path);
        self.context.events.emit(CoreChange {
            core,
            path,
            value,
            origin: self.snapshot.node,
        });
        Ok(())
    }
}

impl std::fmt::Debug for InputControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputControl")
            .field("variant", &self.variant)
            .field("data_path", &self.snapshot.data_path)
            .field("value", &self.snapshot.data)
            .finish()
    }
}

fn control_factory(variant: InputVariant) -> WidgetFactory {
    WidgetFactory::new(variant.widget_kind(), move |context| {
        Box::new(InputControl::new(context, variant))
    })
}

pub fn text_control_entry() -> RendererEntry {
    RendererEntry {
        tester: rank_with(1, is_string_control()),
        factory: control_factory(InputVariant::Text),
    }
}

pub fn number_control_entry() -> RendererEntry {
    RendererEntry {
        tester: rank_with(2, is_number_control()),
        factory: control_factory(InputVariant::Number),
    }
}

pub fn integer_control_entry() -> RendererEntry {
    RendererEntry {
        tester: rank_with(2, is_integer_control()),
        factory: control_factory(InputVariant::Integer),
    }
}

pub fn boolean_control_entry() -> RendererEntry {
    RendererEntry {
        tester: rank_with(2, is_boolean_control()),
        factory: control_factory(InputVariant::Boolean),
    }
}
