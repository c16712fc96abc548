//! Widget contract and the context shared by every node of a tree.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::coalescer::Coalescer;
use crate::dispatch::DispatchNode;
use crate::error::{EditError, RefreshError};
use crate::event::{ControlIds, EventQueue};
use crate::props::{RenderProps, StateProjector};
use crate::reducer::StateReducer;
use crate::registry::WidgetKind;
use crate::state::ApplicationState;
use crate::view::View;
use crate::NodeId;

/// What a dispatch node hands its widget on every push.
pub struct WidgetInputs<'a> {
    pub node: NodeId,
    pub state: &'a Rc<ApplicationState>,
    pub props: &'a RenderProps,
    /// Element id allocated for control elements.
    pub id: Option<&'a str>,
}

pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A concrete renderer mounted under a dispatch node.
///
/// Lifecycle: `mount` once, `update` on every push, `unmount` once before
/// the widget is dropped. A widget owns whatever children it creates.
pub trait Widget: AsAny {
    fn kind(&self) -> WidgetKind;

    fn mount(&mut self) {}

    fn update(&mut self, inputs: &WidgetInputs<'_>) -> Result<(), RefreshError>;

    fn unmount(&mut self) {}

    fn view(&self) -> View;

    /// Children taking part in rendering. Traversal and edits only reach
    /// these; children kept out of the view are not listed.
    fn children(&self) -> Vec<DispatchNode> {
        Vec::new()
    }

    /// Applies a user edit. Only controls accept edits.
    fn edit(&mut self, _value: Value) -> Result<(), EditError> {
        Err(EditError::NotEditable {
            kind: self.kind().to_string(),
        })
    }
}

impl dyn Widget {
    pub fn downcast_ref<W: Widget + 'static>(&self) -> Option<&W> {
        self.as_any().downcast_ref::<W>()
    }

    pub fn downcast_mut<W: Widget + 'static>(&mut self) -> Option<&mut W> {
        self.as_any_mut().downcast_mut::<W>()
    }
}

/// Services shared by all nodes of one rendered tree.
#[derive(Clone)]
pub struct NodeContext {
    pub coalescer: Coalescer,
    pub projector: Rc<dyn StateProjector>,
    pub reducer: Rc<dyn StateReducer>,
    pub events: EventQueue,
    pub ids: ControlIds,
}

impl NodeContext {
    pub fn new(
        coalescer: Coalescer,
        projector: Rc<dyn StateProjector>,
        reducer: Rc<dyn StateReducer>,
    ) -> Self {
        Self {
            coalescer,
            projector,
            reducer,
            events: EventQueue::new(),
            ids: ControlIds::new(),
        }
    }
}

impl fmt::Debug for NodeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeContext")
            .field("coalescer", &self.coalescer)
            .field("events", &self.events)
            .field("ids", &self.ids)
            .finish_non_exhaustive()
    }
}
