#![doc = r"Renderer dispatch and tree reconciliation for schema driven forms."]

pub mod coalescer;
pub mod collections;
pub mod composite;
pub mod dispatch;
pub mod equality;
pub mod error;
pub mod event;
pub mod platform;
pub mod props;
pub mod reducer;
pub mod registry;
pub mod schema;
pub mod state;
pub mod testers;
pub mod uischema;
pub mod unknown;
pub mod view;
pub mod widget;

pub use coalescer::{Coalescer, CoalescerConfig, DEFAULT_DELAY_MS};
pub use composite::{ChildDescriptor, CompositeNode, ReconcileReport, ShrinkPolicy};
pub use dispatch::{DispatchNode, NodeStatus, RefreshOutcome, RefreshStats, WeakDispatchNode};
pub use equality::deep_equal;
pub use error::{
    ConfigurationError, EditError, ProjectionError, RefreshError, SchemaError, TesterError,
};
pub use event::{ControlIds, CoreChange, EventQueue};
pub use platform::{Clock, VirtualClock};
pub use props::{NodeInputs, RenderProps, StateProjector};
pub use reducer::{ConfigAction, CoreAction, I18nAction, InitOptions, StateReducer, Validator};
pub use registry::{
    Rank, RankedTester, RendererEntry, RendererRegistry, TesterContext, WidgetFactory, WidgetKind,
    NOT_APPLICABLE,
};
pub use schema::{JsonSchema, SchemaGenerator};
pub use state::{ApplicationState, CoreState, I18nState, ValidationError, ValidationMode};
pub use uischema::{
    Condition, ControlElement, ControlLabel, LabelElement, LayoutElement, LayoutKind, Rule,
    RuleEffect, UiSchema,
};
pub use unknown::{UnknownWidget, UNKNOWN_RENDERER_TEXT};
pub use view::{InputView, Orientation, View};
pub use widget::{NodeContext, Widget, WidgetInputs};

use std::sync::atomic::{AtomicUsize, Ordering};

pub type NodeId = usize;

static NEXT_NODE_ID: AtomicUsize = AtomicUsize::new(1);

/// Process-wide unique id for dispatch nodes and other coalescer keys.
pub fn next_node_id() -> NodeId {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
