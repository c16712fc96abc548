//! Dispatch node: picks, mounts and feeds the widget for one element.
//!
//! Inputs are written through setters, which only record the value and
//! schedule a refresh on the shared [`Coalescer`](crate::Coalescer). The
//! refresh derives [`RenderProps`], skips work when nothing relevant changed,
//! resolves a renderer, and mounts or updates the widget.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;

use crate::error::{ConfigurationError, EditError, RefreshError};
use crate::next_node_id;
use crate::props::{NodeInputs, RenderProps};
use crate::registry::WidgetKind;
use crate::schema::JsonSchema;
use crate::state::ApplicationState;
use crate::uischema::UiSchema;
use crate::view::View;
use crate::widget::{NodeContext, Widget, WidgetInputs};
use crate::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    /// No application state attached.
    Unattached,
    /// State attached, nothing rendered yet.
    Attached,
    Mounted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Props structurally equal to the last render; nothing touched.
    Unchanged,
    /// New inputs pushed into the mounted widget.
    Updated,
    Mounted(WidgetKind),
    Remounted { from: WidgetKind, to: WidgetKind },
}

/// Counters for observing refresh behaviour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub refreshes: usize,
    pub skipped: usize,
    pub pushes: usize,
    pub mounts: usize,
    pub unmounts: usize,
    pub failures: usize,
}

struct ControlId {
    scope: String,
    id: String,
}

struct DispatchInner {
    id: NodeId,
    context: NodeContext,
    state: RefCell<Option<Rc<ApplicationState>>>,
    inputs: RefCell<NodeInputs>,
    props: RefCell<Option<RenderProps>>,
    widget: RefCell<Option<Box<dyn Widget>>>,
    control_id: RefCell<Option<ControlId>>,
    last_error: RefCell<Option<RefreshError>>,
    stats: Cell<RefreshStats>,
}

impl DispatchInner {
    fn bump(&self, f: impl FnOnce(&mut RefreshStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }

    fn release_control_id(&self) {
        if let Some(control) = self.control_id.borrow_mut().take() {
            self.context.ids.remove(&control.id);
        }
    }
}

impl Drop for DispatchInner {
    fn drop(&mut self) {
        self.context.coalescer.cancel(self.id);
        if let Some(mut widget) = self.widget.get_mut().take() {
            widget.unmount();
        }
        self.release_control_id();
    }
}

/// Shared handle to a dispatch node. Cloning shares the node; the node is
/// torn down when the last handle is dropped or [`dispose`](Self::dispose)
/// is called.
#[derive(Clone)]
pub struct DispatchNode {
    inner: Rc<DispatchInner>,
}

impl DispatchNode {
    pub fn new(context: NodeContext) -> Self {
        Self {
            inner: Rc::new(DispatchInner {
                id: next_node_id(),
                context,
                state: RefCell::new(None),
                inputs: RefCell::new(NodeInputs::default()),
                props: RefCell::new(None),
                widget: RefCell::new(None),
                control_id: RefCell::new(None),
                last_error: RefCell::new(None),
                stats: Cell::new(RefreshStats::default()),
            }),
        }
    }

    pub fn id(&self) -> NodeId {
        self.inner.id
    }

    pub fn context(&self) -> &NodeContext {
        &self.inner.context
    }

    pub fn status(&self) -> NodeStatus {
        if self.inner.widget.borrow().is_some() {
            NodeStatus::Mounted
        } else if self.inner.state.borrow().is_some() {
            NodeStatus::Attached
        } else {
            NodeStatus::Unattached
        }
    }

    pub fn set_state(&self, state: Rc<ApplicationState>) {
        *self.inner.state.borrow_mut() = Some(state);
        self.schedule_refresh();
    }

    pub fn set_schema(&self, schema: Option<JsonSchema>) {
        self.inner.inputs.borrow_mut().schema = schema;
        self.schedule_refresh();
    }

    pub fn set_uischema(&self, uischema: Option<Rc<UiSchema>>) {
        self.inner.inputs.borrow_mut().uischema = uischema;
        self.schedule_refresh();
    }

    pub fn set_path(&self, path: impl Into<String>) {
        self.inner.inputs.borrow_mut().path = path.into();
        self.schedule_refresh();
    }

    pub fn set_enabled(&self, enabled: Option<bool>) {
        self.inner.inputs.borrow_mut().enabled = enabled;
        self.schedule_refresh();
    }

    /// Replaces every input at once; schedules a single refresh.
    pub fn set_inputs(&self, inputs: NodeInputs) {
        *self.inner.inputs.borrow_mut() = inputs;
        self.schedule_refresh();
    }

    pub fn state(&self) -> Option<Rc<ApplicationState>> {
        self.inner.state.borrow().clone()
    }

    pub fn inputs(&self) -> NodeInputs {
        self.inner.inputs.borrow().clone()
    }

    /// Props of the last successful render.
    pub fn props(&self) -> Option<RenderProps> {
        self.inner.props.borrow().clone()
    }

    pub fn widget_kind(&self) -> Option<WidgetKind> {
        self.inner.widget.borrow().as_ref().map(|widget| widget.kind())
    }

    pub fn control_id(&self) -> Option<String> {
        self.inner
            .control_id
            .borrow()
            .as_ref()
            .map(|control| control.id.clone())
    }

    pub fn last_error(&self) -> Option<RefreshError> {
        self.inner.last_error.borrow().clone()
    }

    pub fn stats(&self) -> RefreshStats {
        self.inner.stats.get()
    }

    pub fn is_refresh_pending(&self) -> bool {
        self.inner.context.coalescer.is_scheduled(self.inner.id)
    }

    /// Queues a refresh on the coalescer, superseding any pending one.
    pub fn schedule_refresh(&self) {
        let node = Rc::downgrade(&self.inner);
        self.inner
            .context
            .coalescer
            .schedule(self.inner.id, move || run_scheduled_refresh(node));
    }

    /// Runs the refresh routine now.
    ///
    /// On failure the node keeps its previous widget and props, the error is
    /// logged and kept in [`last_error`](Self::last_error), and a later
    /// refresh retries from scratch.
    pub fn refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        self.inner.bump(|stats| stats.refreshes += 1);
        let result = self.try_refresh();
        match &result {
            Ok(outcome) => {
                *self.inner.last_error.borrow_mut() = None;
                log::trace!("node {} refreshed: {outcome:?}", self.inner.id);
            }
            Err(err) => {
                self.inner.bump(|stats| stats.failures += 1);
                log::error!("node {} failed to refresh: {err}", self.inner.id);
                *self.inner.last_error.borrow_mut() = Some(err.clone());
            }
        }
        result
    }

    fn try_refresh(&self) -> Result<RefreshOutcome, RefreshError> {
        let id = self.inner.id;
        let state = self
            .inner
            .state
            .borrow()
            .clone()
            .ok_or(ConfigurationError::MissingState { node: id })?;
        let inputs = self.inner.inputs.borrow().clone();
        let props = self.inner.context.projector.project(&state, &inputs)?;

        let selection_unchanged = self
            .inner
            .props
            .borrow()
            .as_ref()
            .is_some_and(|previous| previous.selection_equal(&props));
        if selection_unchanged && self.inner.widget.borrow().is_some() {
            let unchanged = self.inner.props.borrow().as_ref() == Some(&props);
            if unchanged {
                self.inner.bump(|stats| stats.skipped += 1);
                return Ok(RefreshOutcome::Unchanged);
            }
            self.push(&state, &props)?;
            *self.inner.props.borrow_mut() = Some(props);
            return Ok(RefreshOutcome::Updated);
        }

        let schema = props
            .schema
            .clone()
            .ok_or(ConfigurationError::MissingSchema { node: id })?;
        let uischema = props
            .uischema
            .clone()
            .ok_or(ConfigurationError::MissingUiSchema { node: id })?;
        let factory = props
            .renderers
            .resolve(&uischema, &schema, &props.tester_context());
        self.sync_control_id(&uischema);

        let mounted_kind = self.widget_kind();
        let outcome = if mounted_kind == Some(factory.kind()) {
            self.push(&state, &props)?;
            RefreshOutcome::Updated
        } else {
            let mut widget = factory.build(&self.inner.context);
            widget.mount();
            let control_id = self.control_id();
            let update = widget.update(&WidgetInputs {
                node: id,
                state: &state,
                props: &props,
                id: control_id.as_deref(),
            });
            if let Err(err) = update {
                widget.unmount();
                return Err(err);
            }
            let previous = self.inner.widget.borrow_mut().replace(widget);
            self.inner.bump(|stats| {
                stats.mounts += 1;
                stats.pushes += 1;
            });
            match previous {
                Some(mut previous) => {
                    let from = previous.kind();
                    previous.unmount();
                    self.inner.bump(|stats| stats.unmounts += 1);
                    log::debug!("node {id} remounted {from} as {}", factory.kind());
                    RefreshOutcome::Remounted {
                        from,
                        to: factory.kind(),
                    }
                }
                None => {
                    log::debug!("node {id} mounted {}", factory.kind());
                    RefreshOutcome::Mounted(factory.kind())
                }
            }
        };
        *self.inner.props.borrow_mut() = Some(props);
        Ok(outcome)
    }

    fn push(&self, state: &Rc<ApplicationState>, props: &RenderProps) -> Result<(), RefreshError> {
        let control_id = self.control_id();
        let mut widget = self.inner.widget.borrow_mut();
        let Some(widget) = widget.as_mut() else {
            return Ok(());
        };
        widget.update(&WidgetInputs {
            node: self.inner.id,
            state,
            props,
            id: control_id.as_deref(),
        })?;
        self.inner.bump(|stats| stats.pushes += 1);
        Ok(())
    }

    fn sync_control_id(&self, uischema: &UiSchema) {
        let current_scope = self
            .inner
            .control_id
            .borrow()
            .as_ref()
            .map(|control| control.scope.clone());
        match uischema.scope() {
            Some(scope) if current_scope.as_deref() == Some(scope) => {}
            Some(scope) => {
                self.inner.release_control_id();
                let id = self.inner.context.ids.create(scope);
                *self.inner.control_id.borrow_mut() = Some(ControlId {
                    scope: scope.to_owned(),
                    id,
                });
            }
            None => self.inner.release_control_id(),
        }
    }

    /// Cancels any pending refresh, unmounts the widget and detaches the
    /// state. The node can be attached again afterwards.
    pub fn dispose(&self) {
        self.inner.context.coalescer.cancel(self.inner.id);
        let widget = self.inner.widget.borrow_mut().take();
        if let Some(mut widget) = widget {
            widget.unmount();
            self.inner.bump(|stats| stats.unmounts += 1);
        }
        self.inner.release_control_id();
        *self.inner.props.borrow_mut() = None;
        *self.inner.state.borrow_mut() = None;
        *self.inner.last_error.borrow_mut() = None;
    }

    /// What the mounted widget currently shows.
    pub fn current_view(&self) -> View {
        self.inner
            .widget
            .borrow()
            .as_ref()
            .map_or(View::Empty, |widget| widget.view())
    }

    /// Child dispatch nodes owned by the mounted widget.
    pub fn children(&self) -> Vec<DispatchNode> {
        self.inner
            .widget
            .borrow()
            .as_ref()
            .map(|widget| widget.children())
            .unwrap_or_default()
    }

    /// Runs `f` against the mounted widget if it is a `W`.
    pub fn with_widget<W: Widget + 'static, R>(&self, f: impl FnOnce(&W) -> R) -> Option<R> {
        let widget = self.inner.widget.borrow();
        widget.as_deref().and_then(|widget| widget.downcast_ref::<W>()).map(f)
    }

    /// First node in depth-first order bound to `scope` with a mounted
    /// control widget.
    pub fn find_control(&self, scope: &str) -> Option<DispatchNode> {
        let bound = self
            .inner
            .props
            .borrow()
            .as_ref()
            .and_then(|props| props.uischema.as_ref())
            .and_then(|uischema| uischema.scope())
            == Some(scope);
        if bound && matches!(self.widget_kind(), Some(WidgetKind::Control(_))) {
            return Some(self.clone());
        }
        self.children()
            .iter()
            .find_map(|child| child.find_control(scope))
    }

    /// Forwards a user edit to the mounted widget.
    pub fn submit_edit(&self, value: Value) -> Result<(), EditError> {
        let mut widget = self.inner.widget.borrow_mut();
        match widget.as_mut() {
            Some(widget) => widget.edit(value),
            None => Err(EditError::NotMounted {
                node: self.inner.id,
            }),
        }
    }

    pub fn ptr_eq(&self, other: &DispatchNode) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakDispatchNode {
        WeakDispatchNode {
            inner: Rc::downgrade(&self.inner),
        }
    }
}

fn run_scheduled_refresh(node: Weak<DispatchInner>) {
    if let Some(inner) = node.upgrade() {
        // Failures are logged and recorded on the node.
        let _ = DispatchNode { inner }.refresh();
    }
}

#[derive(Clone)]
pub struct WeakDispatchNode {
    inner: Weak<DispatchInner>,
}

impl WeakDispatchNode {
    pub fn upgrade(&self) -> Option<DispatchNode> {
        self.inner.upgrade().map(|inner| DispatchNode { inner })
    }
}

impl fmt::Debug for DispatchNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchNode")
            .field("id", &self.inner.id)
            .field("status", &self.status())
            .field("widget", &self.widget_kind())
            .finish()
    }
}

/// A dispatch node can be the widget of another dispatch node; it then
/// receives the outer node's state and computed schema, ui schema and path.
impl Widget for DispatchNode {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Dispatch
    }

    fn update(&mut self, inputs: &WidgetInputs<'_>) -> Result<(), RefreshError> {
        let enabled = self.inner.inputs.borrow().enabled;
        *self.inner.inputs.borrow_mut() = NodeInputs {
            schema: inputs.props.schema.clone(),
            uischema: inputs.props.uischema.clone(),
            path: inputs.props.path.clone(),
            enabled,
        };
        self.set_state(inputs.state.clone());
        Ok(())
    }

    fn unmount(&mut self) {
        self.dispose();
    }

    fn view(&self) -> View {
        self.current_view()
    }

    fn children(&self) -> Vec<DispatchNode> {
        vec![self.clone()]
    }

    fn edit(&mut self, value: Value) -> Result<(), EditError> {
        self.submit_edit(value)
    }
}

#[cfg(test)]
#[path = "tests/dispatch_tests.rs"]
mod tests;
