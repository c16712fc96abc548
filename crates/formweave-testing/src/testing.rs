use std::rc::Rc;

use formweave_core::{
    ApplicationState, Coalescer, CoreState, DispatchNode, JsonSchema, NodeContext,
    RendererRegistry, UiSchema, VirtualClock, DEFAULT_DELAY_MS,
};
use formweave_foundation::{default_config, default_context};
use serde_json::Value;

/// Upper bound on quiet periods [`FormsTestRule::settle`] waits through.
/// Each tree level needs one, so this also bounds the tree depth it settles.
pub const MAX_SETTLE_ROUNDS: usize = 64;

/// Headless harness for exercising dispatch trees in tests.
///
/// Owns a virtual clock and the coalescer driven by it, so refreshes only run
/// when the test moves time forward.
pub struct FormsTestRule {
    clock: Rc<VirtualClock>,
    context: NodeContext,
}

impl FormsTestRule {
    /// Create a rule wired with the default projector and reducer.
    pub fn new() -> Self {
        Self::with_context(default_context)
    }

    /// Create a rule whose context is built by `build` from the rule's
    /// coalescer.
    pub fn with_context(build: impl FnOnce(Coalescer) -> NodeContext) -> Self {
        let clock = Rc::new(VirtualClock::new());
        let context = build(Coalescer::new(clock.clone()));
        Self { clock, context }
    }

    pub fn clock(&self) -> &Rc<VirtualClock> {
        &self.clock
    }

    pub fn context(&self) -> &NodeContext {
        &self.context
    }

    pub fn coalescer(&self) -> &Coalescer {
        &self.context.coalescer
    }

    /// A fresh, unattached dispatch node sharing this rule's context.
    pub fn node(&self) -> DispatchNode {
        DispatchNode::new(self.context.clone())
    }

    /// Attaches `state` to a new node and settles the tree below it.
    pub fn mount(&self, state: Rc<ApplicationState>) -> DispatchNode {
        let node = self.node();
        node.set_state(state);
        self.settle();
        node
    }

    /// Moves time forward by `millis` and runs whatever became due.
    pub fn advance(&self, millis: u64) -> usize {
        self.clock.advance(millis);
        self.context.coalescer.run_due()
    }

    /// Waits out quiet periods until no refresh is pending. Returns the
    /// number of tasks run.
    pub fn settle(&self) -> usize {
        let mut ran = 0;
        for _ in 0..MAX_SETTLE_ROUNDS {
            if self.context.coalescer.is_idle() {
                break;
            }
            ran += self.advance(DEFAULT_DELAY_MS);
        }
        ran
    }
}

impl Default for FormsTestRule {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state with the default config and the given documents.
pub fn form_state(
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
    Rc::new(ApplicationState::new(core, Rc::new(renderers)).with_config(default_config()))
}

/// Copy of `state` with new data and everything else shared.
pub fn with_data(state: &Rc<ApplicationState>, data: Value) -> Rc<ApplicationState> {
    let mut next = (**state).clone();
    next.core.data = data;
    Rc::new(next)
}

/// Copy of `state` with a new core, as a host applies a reduced edit.
pub fn with_core(state: &Rc<ApplicationState>, core: CoreState) -> Rc<ApplicationState> {
    let mut next = (**state).clone();
    next.core = core;
    Rc::new(next)
}
