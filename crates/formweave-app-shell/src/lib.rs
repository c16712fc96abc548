//! Root form host.
//!
//! [`JsonForms`] owns the authoritative [`ApplicationState`], feeds it to a
//! root [`DispatchNode`], and turns control edits into change notifications.
//! Setters only record inputs; the state refresh and the render that follows
//! run on the shared coalescer.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use formweave_core::{
    deep_equal, ApplicationState, Coalescer, ConfigAction, CoreAction, DispatchNode, EditError,
    I18nAction, I18nState, InitOptions, JsonSchema, NodeContext, NodeId, RendererRegistry,
    SchemaGenerator, UiSchema, ValidationError, ValidationMode, View,
};
use formweave_foundation::{default_context, DefaultGenerator};
use formweave_runtime_std::StdRuntime;
use formweave_ui::vanilla_renderers;
use serde_json::{json, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("data is required to initialize the form")]
    MissingData,
}

/// What listeners receive after the form state changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub data: Value,
    pub errors: Vec<ValidationError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(usize);

type Listener = Rc<dyn Fn(&ChangeEvent)>;

/// Values set on the host, applied to the state on the next refresh.
struct HostInputs {
    data: Option<Value>,
    schema: Option<JsonSchema>,
    uischema: Option<Rc<UiSchema>>,
    renderers: Rc<RendererRegistry>,
    config: Option<Value>,
    readonly: bool,
    validation_mode: ValidationMode,
    i18n: Option<I18nState>,
    additional_errors: Vec<ValidationError>,
}

struct HostInner {
    context: NodeContext,
    generator: Rc<dyn SchemaGenerator>,
    refresh_key: NodeId,
    render_key: NodeId,
    inputs: RefCell<HostInputs>,
    state: RefCell<Option<Rc<ApplicationState>>>,
    root: DispatchNode,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<usize>,
}

impl Drop for HostInner {
    fn drop(&mut self) {
        self.context.coalescer.cancel(self.refresh_key);
        self.context.coalescer.cancel(self.render_key);
    }
}

#[derive(Clone)]
pub struct JsonForms {
    inner: Rc<HostInner>,
}

impl JsonForms {
    /// Host rendering with `renderers` on the given node context.
    pub fn new(context: NodeContext, renderers: RendererRegistry) -> Self {
        Self::with_generator(context, renderers, Rc::new(DefaultGenerator::new()))
    }

    pub fn with_generator(
        context: NodeContext,
        renderers: RendererRegistry,
        generator: Rc<dyn SchemaGenerator>,
    ) -> Self {
        let root = DispatchNode::new(context.clone());
        Self {
            inner: Rc::new(HostInner {
                refresh_key: formweave_core::next_node_id(),
                render_key: formweave_core::next_node_id(),
                context,
                generator,
                inputs: RefCell::new(HostInputs {
                    data: None,
                    schema: None,
                    uischema: None,
                    renderers: Rc::new(renderers),
                    config: None,
                    readonly: false,
                    validation_mode: ValidationMode::default(),
                    i18n: None,
                    additional_errors: Vec::new(),
                }),
                state: RefCell::new(None),
                root,
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    /// Host with the vanilla renderers.
    pub fn vanilla(context: NodeContext) -> Self {
        Self::new(context, vanilla_renderers())
    }

    /// Host on a std runtime with the default collaborators and the vanilla
    /// renderers.
    pub fn with_runtime(runtime: &StdRuntime) -> Self {
        Self::vanilla(default_context(runtime.coalescer()))
    }

    pub fn context(&self) -> &NodeContext {
        &self.inner.context
    }

    pub fn coalescer(&self) -> &Coalescer {
        &self.inner.context.coalescer
    }

    pub fn root(&self) -> &DispatchNode {
        &self.inner.root
    }

    pub fn state(&self) -> Option<Rc<ApplicationState>> {
        self.inner.state.borrow().clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.state.borrow().is_some()
    }

    /// Current data: the state's once initialized, else the last set value.
    pub fn data(&self) -> Option<Value> {
        match self.state() {
            Some(state) => Some(state.core.data.clone()),
            None => self.inner.inputs.borrow().data.clone(),
        }
    }

    pub fn schema(&self) -> Option<JsonSchema> {
        self.inner.inputs.borrow().schema.clone()
    }

    pub fn uischema(&self) -> Option<Rc<UiSchema>> {
        self.inner.inputs.borrow().uischema.clone()
    }

    pub fn set_data(&self, data: Value) {
        {
            let mut inputs = self.inner.inputs.borrow_mut();
            if inputs.data.as_ref().is_some_and(|current| deep_equal(current, &data)) {
                return;
            }
            inputs.data = Some(data);
        }
        self.schedule_refresh();
    }

    /// `None` generates a schema from the current data. A layout is
    /// generated as well when none was set.
    pub fn set_schema(&self, schema: Option<JsonSchema>) {
        {
            let mut inputs = self.inner.inputs.borrow_mut();
            let schema = match schema {
                Some(schema) => schema,
                None => self.inner.generator.json_schema(&object_or_empty(inputs.data.as_ref())),
            };
            if inputs.schema.as_ref().is_some_and(|current| current == &schema) {
                return;
            }
            if inputs.uischema.is_none() {
                inputs.uischema = Some(Rc::new(self.inner.generator.ui_schema(&schema)));
            }
            inputs.schema = Some(schema);
        }
        self.schedule_refresh();
    }

    /// `None` generates a layout from the schema; ignored without one.
    pub fn set_uischema(&self, uischema: Option<UiSchema>) {
        {
            let mut inputs = self.inner.inputs.borrow_mut();
            let uischema = match (uischema, inputs.schema.as_ref()) {
                (Some(uischema), _) => uischema,
                (None, Some(schema)) => self.inner.generator.ui_schema(schema),
                (None, None) => return,
            };
            if inputs.uischema.as_deref() == Some(&uischema) {
                return;
            }
            inputs.uischema = Some(Rc::new(uischema));
        }
        self.schedule_refresh();
    }

    /// An empty registry is ignored.
    pub fn set_renderers(&self, renderers: Rc<RendererRegistry>) {
        {
            let mut inputs = self.inner.inputs.borrow_mut();
            if renderers.is_empty() || Rc::ptr_eq(&inputs.renderers, &renderers) {
                return;
            }
            inputs.renderers = renderers;
        }
        self.schedule_refresh();
    }

    /// Non-object configs are ignored.
    pub fn set_config(&self, config: Value) {
        {
            let mut inputs = self.inner.inputs.borrow_mut();
            if !config.is_object()
                || inputs.config.as_ref().is_some_and(|current| deep_equal(current, &config))
            {
                return;
            }
            inputs.config = Some(config);
        }
        self.schedule_refresh();
    }

    pub fn set_readonly(&self, readonly: bool) {
        {
            let mut inputs = self.inner.inputs.borrow_mut();
            if inputs.readonly == readonly {
                return;
            }
            inputs.readonly = readonly;
        }
        self.schedule_refresh();
    }

    pub fn set_validation_mode(&self, mode: ValidationMode) {
        {
            let mut inputs = self.inner.inputs.borrow_mut();
            if inputs.validation_mode == mode {
                return;
            }
            inputs.validation_mode = mode;
        }
        self.schedule_refresh();
    }

    pub fn set_i18n(&self, i18n: I18nState) {
        {
            let mut inputs = self.inner.inputs.borrow_mut();
            if inputs.i18n.as_ref() == Some(&i18n) {
                return;
            }
            inputs.i18n = Some(i18n);
        }
        self.schedule_refresh();
    }

    /// An empty list is ignored.
    pub fn set_additional_errors(&self, errors: Vec<ValidationError>) {
        {
            let mut inputs = self.inner.inputs.borrow_mut();
            if errors.is_empty() || inputs.additional_errors == errors {
                return;
            }
            inputs.additional_errors = errors;
        }
        self.schedule_refresh();
    }

    /// Builds the initial state from the inputs. Does nothing once
    /// initialized.
    pub fn initialize(&self) -> Result<(), HostError> {
        if self.is_initialized() {
            return Ok(());
        }
        let inner = &self.inner;
        let mut inputs = inner.inputs.borrow_mut();
        let data = inputs.data.clone().ok_or(HostError::MissingData)?;
        let (schema, uischema) = self.documents(&mut inputs, &data);
        let reducer = &inner.context.reducer;
        let core = reducer.reduce_core(
            &Default::default(),
            &CoreAction::Init {
                data,
                schema,
                uischema,
                options: InitOptions {
                    validation_mode: Some(inputs.validation_mode),
                    additional_errors: Some(inputs.additional_errors.clone()),
                },
            },
        );
        let config = reducer.reduce_config(
            &Value::Null,
            &ConfigAction::Set(inputs.config.clone().unwrap_or_else(|| json!({}))),
        );
        let i18n = reducer.reduce_i18n(
            &I18nState::default(),
            &I18nAction::Update {
                locale: inputs.i18n.as_ref().and_then(|i18n| i18n.locale.clone()),
                translations: inputs.i18n.as_ref().map(|i18n| i18n.translations.clone()),
            },
        );
        let state = ApplicationState::new(core, inputs.renderers.clone())
            .with_config(config)
            .with_readonly(inputs.readonly)
            .with_i18n(i18n);
        drop(inputs);
        *inner.state.borrow_mut() = Some(Rc::new(state));
        log::debug!("form initialized");
        Ok(())
    }

    /// Initializes, renders and reports the initial state to listeners.
    pub fn connect(&self) -> Result<(), HostError> {
        self.initialize()?;
        self.render();
        self.emit_change();
        Ok(())
    }

    /// Detaches the tree and drops pending host work.
    pub fn disconnect(&self) {
        self.inner.context.coalescer.cancel(self.inner.refresh_key);
        self.inner.context.coalescer.cancel(self.inner.render_key);
        self.inner.root.dispose();
    }

    /// Applies queued control edits. Each change is taken off the queue
    /// once and replayed against the current core, so edits made before the
    /// tree settles build on each other.
    pub fn process_events(&self) -> usize {
        let changes = self.inner.context.events.drain();
        let applied = changes.len();
        for change in changes {
            let Some(state) = self.state() else {
                log::error!("dropping change from node {}: form not initialized", change.origin);
                continue;
            };
            let mut next = (*state).clone();
            next.core = self.inner.context.reducer.reduce_core(&state.core, &change.action());
            self.inner.inputs.borrow_mut().data = Some(next.core.data.clone());
            *self.inner.state.borrow_mut() = Some(Rc::new(next));
            self.render();
            self.emit_change();
        }
        applied
    }

    /// Submits `value` to the control bound to `scope`.
    pub fn edit(&self, scope: &str, value: Value) -> Result<(), EditError> {
        let control = self
            .inner
            .root
            .find_control(scope)
            .ok_or_else(|| EditError::UnknownScope {
                scope: scope.to_owned(),
            })?;
        control.submit_edit(value)
    }

    pub fn on_change(&self, listener: impl Fn(&ChangeEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.inner.next_listener.get());
        self.inner.next_listener.set(id.0 + 1);
        self.inner
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(each, _)| *each != id);
        listeners.len() != before
    }

    pub fn view(&self) -> View {
        self.inner.root.current_view()
    }

    pub fn dump(&self) -> String {
        self.view().dump()
    }

    /// Schema and layout to render with, generating and keeping whichever
    /// is missing so later refreshes see the same documents.
    fn documents(&self, inputs: &mut HostInputs, data: &Value) -> (JsonSchema, Rc<UiSchema>) {
        let generator = &self.inner.generator;
        let schema = inputs
            .schema
            .get_or_insert_with(|| generator.json_schema(&object_or_empty(Some(data))))
            .clone();
        let uischema = inputs
            .uischema
            .get_or_insert_with(|| Rc::new(generator.ui_schema(&schema)))
            .clone();
        (schema, uischema)
    }

    fn schedule_refresh(&self) {
        let host = Rc::downgrade(&self.inner);
        self.inner
            .context
            .coalescer
            .schedule(self.inner.refresh_key, move || {
                if let Some(host) = upgrade(&host) {
                    host.refresh();
                }
            });
    }

    fn schedule_render(&self) {
        let host = Rc::downgrade(&self.inner);
        self.inner
            .context
            .coalescer
            .schedule(self.inner.render_key, move || {
                if let Some(host) = upgrade(&host) {
                    host.render();
                }
            });
    }

    /// Applies the recorded inputs to the state.
    fn refresh(&self) {
        let Some(state) = self.state() else {
            log::trace!("refresh skipped: form not initialized");
            return;
        };
        let inner = &self.inner;
        let mut inputs = inner.inputs.borrow_mut();
        let Some(data) = inputs.data.clone() else {
            log::error!("refresh skipped: data was never set");
            return;
        };
        let (schema, uischema) = self.documents(&mut inputs, &data);
        let reducer = &inner.context.reducer;
        let mut next = (*state).clone();
        next.renderers = inputs.renderers.clone();
        next.readonly = inputs.readonly;
        if let Some(config) = &inputs.config {
            next.config = reducer.reduce_config(&state.config, &ConfigAction::Set(config.clone()));
        }
        if let Some(i18n) = &inputs.i18n {
            next.i18n = reducer.reduce_i18n(
                &state.i18n,
                &I18nAction::Update {
                    locale: i18n.locale.clone(),
                    translations: Some(i18n.translations.clone()),
                },
            );
        }
        next.core = reducer.reduce_core(
            &state.core,
            &CoreAction::UpdateCore {
                data,
                schema,
                uischema,
                options: InitOptions {
                    validation_mode: Some(inputs.validation_mode),
                    additional_errors: Some(inputs.additional_errors.clone()),
                },
            },
        );
        drop(inputs);
        *inner.state.borrow_mut() = Some(Rc::new(next));
        self.schedule_render();
    }

    fn render(&self) {
        match self.state() {
            Some(state) => self.inner.root.set_state(state),
            None => log::error!("render skipped: form not initialized"),
        }
    }

    fn emit_change(&self) {
        let Some(state) = self.state() else {
            return;
        };
        let event = ChangeEvent {
            data: state.core.data.clone(),
            errors: state.core.errors.clone(),
        };
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }
}

fn upgrade(host: &Weak<HostInner>) -> Option<JsonForms> {
    host.upgrade().map(|inner| JsonForms { inner })
}

fn object_or_empty(data: Option<&Value>) -> Value {
    match data {
        Some(data) if data.is_object() => data.clone(),
        _ => json!({}),
    }
}

impl fmt::Debug for JsonForms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonForms")
            .field("initialized", &self.is_initialized())
            .field("root", &self.inner.root)
            .field("listeners", &self.inner.listeners.borrow().len())
            .finish()
    }
}
