//! Render props derived from application state for one node.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::equality::{deep_equal, option_equal, rc_equal};
use crate::error::ProjectionError;
use crate::registry::{RendererRegistry, TesterContext};
use crate::schema::JsonSchema;
use crate::state::{ApplicationState, I18nState};
use crate::uischema::UiSchema;

/// Inputs a parent (or host) sets on a dispatch node.
#[derive(Debug, Clone, Default)]
pub struct NodeInputs {
    pub schema: Option<JsonSchema>,
    pub uischema: Option<Rc<UiSchema>>,
    /// Dotted data path of the enclosing element; empty at the root.
    pub path: String,
    pub enabled: Option<bool>,
}

impl NodeInputs {
    pub fn new(schema: Option<JsonSchema>, uischema: Option<Rc<UiSchema>>) -> Self {
        Self {
            schema,
            uischema,
            ..Self::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }
}

impl PartialEq for NodeInputs {
    fn eq(&self, other: &Self) -> bool {
        self.schema == other.schema
            && option_equal(self.uischema.as_ref(), other.uischema.as_ref(), |a, b| {
                rc_equal(a, b, |a, b| a == b)
            })
            && self.path == other.path
            && self.enabled == other.enabled
    }
}

/// View model a widget renders from.
///
/// Recomputed on every refresh. Two props are compared in two steps: the
/// selection fields decide whether the renderer choice can change, the rest
/// decide whether a mounted widget needs new inputs.
#[derive(Clone)]
pub struct RenderProps {
    pub renderers: Rc<RendererRegistry>,
    /// Effective data schema: the node's own, or the root schema.
    pub schema: Option<JsonSchema>,
    pub root_schema: Option<JsonSchema>,
    pub uischema: Option<Rc<UiSchema>>,
    /// Path of the enclosing element as given by the parent.
    pub path: String,
    /// Path of the data this element is bound to; equals `path` for layouts.
    pub data_path: String,
    /// Sub-schema a control's scope resolves to.
    pub control_schema: Option<JsonSchema>,
    pub data: Value,
    pub visible: bool,
    pub enabled: bool,
    pub errors: Vec<String>,
    pub label: String,
    pub required: bool,
    pub config: Value,
    /// Translations the labels were derived with.
    pub i18n: I18nState,
}

impl RenderProps {
    pub fn new(renderers: Rc<RendererRegistry>) -> Self {
        Self {
            renderers,
            schema: None,
            root_schema: None,
            uischema: None,
            path: String::new(),
            data_path: String::new(),
            control_schema: None,
            data: Value::Null,
            visible: true,
            enabled: true,
            errors: Vec::new(),
            label: String::new(),
            required: false,
            config: Value::Null,
            i18n: I18nState::default(),
        }
    }

    /// Equality restricted to what renderer selection depends on.
    pub fn selection_equal(&self, other: &RenderProps) -> bool {
        Rc::ptr_eq(&self.renderers, &other.renderers)
            && option_equal(self.schema.as_ref(), other.schema.as_ref(), JsonSchema::same)
            && option_equal(self.uischema.as_ref(), other.uischema.as_ref(), |a, b| {
                rc_equal(a, b, |a, b| a == b)
            })
            && self.path == other.path
    }

    pub fn tester_context(&self) -> TesterContext {
        TesterContext {
            root_schema: self.root_schema.clone(),
            config: self.config.clone(),
        }
    }

    /// Error messages joined for display.
    pub fn error_text(&self) -> String {
        self.errors.join("\n")
    }
}

impl PartialEq for RenderProps {
    fn eq(&self, other: &Self) -> bool {
        self.selection_equal(other)
            && self.root_schema == other.root_schema
            && self.data_path == other.data_path
            && self.control_schema == other.control_schema
            && deep_equal(&self.data, &other.data)
            && self.visible == other.visible
            && self.enabled == other.enabled
            && self.errors == other.errors
            && self.label == other.label
            && self.required == other.required
            && deep_equal(&self.config, &other.config)
            && self.i18n == other.i18n
    }
}

impl fmt::Debug for RenderProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderProps")
            .field("renderers", &self.renderers.len())
            .field("uischema", &self.uischema.as_ref().map(|ui| ui.type_name().to_owned()))
            .field("path", &self.path)
            .field("data_path", &self.data_path)
            .field("data", &self.data)
            .field("visible", &self.visible)
            .field("enabled", &self.enabled)
            .field("errors", &self.errors)
            .field("label", &self.label)
            .field("required", &self.required)
            .finish()
    }
}

/// Derives render props for a node from the shared state and its inputs.
///
/// Implementations must be pure: the same state and inputs yield equal props.
pub trait StateProjector {
    fn project(
        &self,
        state: &ApplicationState,
        inputs: &NodeInputs,
    ) -> Result<RenderProps, ProjectionError>;
}
