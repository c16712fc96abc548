//! Fixtures shared by the unit tests of this crate.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::composite::{CompositeNode, ReconcileReport, ShrinkPolicy};
use crate::dispatch::DispatchNode;
use crate::error::{ProjectionError, RefreshError};
use crate::platform::VirtualClock;
use crate::props::{NodeInputs, RenderProps, StateProjector};
use crate::reducer::{ConfigAction, CoreAction, I18nAction, StateReducer};
use crate::registry::{RendererEntry, RendererRegistry, WidgetFactory, WidgetKind};
use crate::schema::JsonSchema;
use crate::state::{ApplicationState, CoreState, I18nState};
use crate::uischema::{LayoutKind, UiSchema};
use crate::view::{Orientation, View};
use crate::widget::{NodeContext, Widget, WidgetInputs};
use crate::{Coalescer, DEFAULT_DELAY_MS};

/// Minimal projector: top-level scopes only.
pub struct TestProjector;

impl StateProjector for TestProjector {
    fn project(
        &self,
        state: &ApplicationState,
        inputs: &NodeInputs,
    ) -> Result<RenderProps, ProjectionError> {
        let mut props = RenderProps::new(state.renderers.clone());
        props.schema = inputs.schema.clone().or_else(|| state.core.schema.clone());
        props.root_schema = state.core.schema.clone();
        props.uischema = inputs.uischema.clone().or_else(|| state.core.uischema.clone());
        props.path = inputs.path.clone();
        props.enabled = inputs.enabled.unwrap_or(true) && !state.readonly;
        props.config = state.config.clone();
        props.data = state.core.data.clone();
        if let Some(scope) = props.uischema.as_ref().and_then(|ui| ui.scope()) {
            if !scope.starts_with('#') {
                return Err(ProjectionError::InvalidScope {
                    scope: scope.to_owned(),
                });
            }
            let property = scope.rsplit('/').next().unwrap_or_default().to_owned();
            props.data = state.core.data.get(&property).cloned().unwrap_or(Value::Null);
            props.label = property.clone();
            props.data_path = property;
        }
        Ok(props)
    }
}

/// Writes top-level properties only.
pub struct TestReducer;

impl StateReducer for TestReducer {
    fn reduce_core(&self, state: &CoreState, action: &CoreAction) -> CoreState {
        let mut next = state.clone();
        if let CoreAction::UpdateData { path, value } = action {
            if let Some(object) = next.data.as_object_mut() {
                object.insert(path.clone(), value.clone());
            }
        }
        next
    }

    fn reduce_config(&self, _config: &Value, action: &ConfigAction) -> Value {
        let ConfigAction::Set(config) = action;
        config.clone()
    }

    fn reduce_i18n(&self, i18n: &I18nState, _action: &I18nAction) -> I18nState {
        i18n.clone()
    }
}

pub struct Harness {
    pub clock: Rc<VirtualClock>,
    pub context: NodeContext,
}

impl Harness {
    pub fn new() -> Self {
        let clock = Rc::new(VirtualClock::new());
        let coalescer = Coalescer::new(clock.clone());
        let context = NodeContext::new(coalescer, Rc::new(TestProjector), Rc::new(TestReducer));
        Self { clock, context }
    }

    pub fn node(&self) -> DispatchNode {
        DispatchNode::new(self.context.clone())
    }

    /// Advances past the quiet period and runs due refreshes until idle.
    pub fn settle(&self) -> usize {
        let mut ran = 0;
        for _ in 0..32 {
            if self.context.coalescer.is_idle() {
                break;
            }
            self.clock.advance(DEFAULT_DELAY_MS);
            ran += self.context.coalescer.run_due();
        }
        ran
    }
}

pub fn state(
    renderers: RendererRegistry,
    data: Value,
    schema: Value,
    uischema: UiSchema,
) -> Rc<ApplicationState> {
    let core = CoreState {
        data,
        schema: Some(JsonSchema::new(schema)),
        uischema: Some(Rc::new(uischema)),
        ..CoreState::default()
    };
    Rc::new(ApplicationState::new(core, Rc::new(renderers)))
}

/// Replaces the data of `state`, keeping everything else shared.
pub fn with_data(state: &Rc<ApplicationState>, data: Value) -> Rc<ApplicationState> {
    let mut next = (**state).clone();
    next.core.data = data;
    Rc::new(next)
}

pub type ProbeLog = Rc<RefCell<Vec<String>>>;

/// Control stand-in recording its lifecycle calls.
pub struct ProbeWidget {
    name: &'static str,
    log: ProbeLog,
    value: Value,
    fail_on: Option<Value>,
}

impl Widget for ProbeWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Control(self.name)
    }

    fn mount(&mut self) {
        self.log.borrow_mut().push(format!("{}:mount", self.name));
    }

    fn update(&mut self, inputs: &WidgetInputs<'_>) -> Result<(), RefreshError> {
        if self.fail_on.as_ref() == Some(&inputs.props.data) {
            return Err(RefreshError::widget(self.name, "rejected value"));
        }
        self.value = inputs.props.data.clone();
        self.log
            .borrow_mut()
            .push(format!("{}:update:{}", self.name, inputs.props.data));
        Ok(())
    }

    fn unmount(&mut self) {
        self.log.borrow_mut().push(format!("{}:unmount", self.name));
    }

    fn view(&self) -> View {
        View::Label(format!("{}={}", self.name, self.value))
    }
}

pub fn probe(name: &'static str) -> (WidgetFactory, ProbeLog) {
    probe_failing_on(name, None)
}

pub fn probe_failing_on(name: &'static str, fail_on: Option<Value>) -> (WidgetFactory, ProbeLog) {
    let log = ProbeLog::default();
    let shared = log.clone();
    let factory = WidgetFactory::new(WidgetKind::Control(name), move |_| {
        Box::new(ProbeWidget {
            name,
            log: shared.clone(),
            value: Value::Null,
            fail_on: fail_on.clone(),
        })
    });
    (factory, log)
}

pub fn count(log: &ProbeLog, entry: &str) -> usize {
    log.borrow().iter().filter(|line| line.as_str() == entry).count()
}

pub fn count_prefix(log: &ProbeLog, prefix: &str) -> usize {
    log.borrow().iter().filter(|line| line.starts_with(prefix)).count()
}

/// Vertical layout widget exposing its reconcile reports.
pub struct TestLayout {
    composite: CompositeNode,
    pub reports: Rc<RefCell<Vec<ReconcileReport>>>,
}

impl Widget for TestLayout {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Layout(LayoutKind::Vertical)
    }

    fn update(&mut self, inputs: &WidgetInputs<'_>) -> Result<(), RefreshError> {
        let report = self.composite.update(inputs);
        self.reports.borrow_mut().push(report);
        Ok(())
    }

    fn unmount(&mut self) {
        self.composite.dispose_children();
    }

    fn view(&self) -> View {
        self.composite.view()
    }

    fn children(&self) -> Vec<DispatchNode> {
        self.composite.active_children().to_vec()
    }
}

pub fn layout_entry(policy: ShrinkPolicy) -> (RendererEntry, Rc<RefCell<Vec<ReconcileReport>>>) {
    let reports: Rc<RefCell<Vec<ReconcileReport>>> = Rc::default();
    let shared = reports.clone();
    let factory = WidgetFactory::new(WidgetKind::Layout(LayoutKind::Vertical), move |context| {
        Box::new(TestLayout {
            composite: CompositeNode::new(context.clone(), Orientation::Column).with_policy(policy),
            reports: shared.clone(),
        })
    });
    let entry = RendererEntry::new(
        |uischema, _, _| Ok(if uischema.is_layout() { 1 } else { -1 }),
        factory,
    );
    (entry, reports)
}
