//! Composite node: positional reconciliation of a layout's children.
//!
//! Each render computes one [`ChildDescriptor`] per layout element. The child
//! at index `i` is reused for descriptor `i`; only its inputs change, and its
//! own dispatch node decides whether that requires any work. Missing children
//! are created. Surplus children are handled by the [`ShrinkPolicy`].

use std::rc::Rc;

use crate::dispatch::DispatchNode;
use crate::props::{NodeInputs, RenderProps};
use crate::schema::JsonSchema;
use crate::state::ApplicationState;
use crate::uischema::UiSchema;
use crate::view::{Orientation, View};
use crate::widget::{NodeContext, WidgetInputs};

/// What happens to children beyond the new element count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShrinkPolicy {
    /// Dispose and drop them.
    #[default]
    Truncate,
    /// Keep them mounted but exclude them from rendering. They become active
    /// again if the layout grows back.
    Retain,
}

#[derive(Debug, Clone)]
pub struct ChildDescriptor {
    pub uischema: Rc<UiSchema>,
    pub schema: Option<JsonSchema>,
    pub path: String,
    pub enabled: Option<bool>,
}

impl ChildDescriptor {
    fn inputs(&self) -> NodeInputs {
        NodeInputs {
            schema: self.schema.clone(),
            uischema: Some(self.uischema.clone()),
            path: self.path.clone(),
            enabled: self.enabled,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    /// Surplus children kept under [`ShrinkPolicy::Retain`].
    pub retained: usize,
}

pub struct CompositeNode {
    context: NodeContext,
    orientation: Orientation,
    policy: ShrinkPolicy,
    children: Vec<DispatchNode>,
    active: usize,
    visible: bool,
    label: Option<String>,
}

impl CompositeNode {
    pub fn new(context: NodeContext, orientation: Orientation) -> Self {
        Self {
            context,
            orientation,
            policy: ShrinkPolicy::default(),
            children: Vec::new(),
            active: 0,
            visible: true,
            label: None,
        }
    }

    pub fn with_policy(mut self, policy: ShrinkPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn policy(&self) -> ShrinkPolicy {
        self.policy
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_label(&mut self, label: Option<String>) {
        self.label = label;
    }

    /// Every child currently owned, rendered or retained.
    pub fn children(&self) -> &[DispatchNode] {
        &self.children
    }

    /// Children that take part in rendering.
    pub fn active_children(&self) -> &[DispatchNode] {
        &self.children[..self.active]
    }

    /// One descriptor per layout element, inheriting schema, path and
    /// enablement from the layout's props. Non-layout elements have none.
    pub fn child_descriptors(props: &RenderProps) -> Vec<ChildDescriptor> {
        let Some(uischema) = props.uischema.as_ref() else {
            return Vec::new();
        };
        uischema
            .elements()
            .iter()
            .map(|element| ChildDescriptor {
                uischema: element.clone(),
                schema: props.schema.clone(),
                path: props.path.clone(),
                enabled: Some(props.enabled),
            })
            .collect()
    }

    /// Matches `descriptors` against existing children by index.
    pub fn reconcile(
        &mut self,
        state: &Rc<ApplicationState>,
        descriptors: Vec<ChildDescriptor>,
    ) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let wanted = descriptors.len();
        for (index, descriptor) in descriptors.into_iter().enumerate() {
            match self.children.get(index) {
                Some(child) => {
                    child.set_inputs(descriptor.inputs());
                    child.set_state(state.clone());
                    report.updated += 1;
                }
                None => {
                    let child = DispatchNode::new(self.context.clone());
                    child.set_inputs(descriptor.inputs());
                    child.set_state(state.clone());
                    self.children.push(child);
                    report.created += 1;
                }
            }
        }
        if self.children.len() > wanted {
            match self.policy {
                ShrinkPolicy::Truncate => {
                    for child in self.children.drain(wanted..) {
                        child.dispose();
                        report.removed += 1;
                    }
                }
                ShrinkPolicy::Retain => report.retained = self.children.len() - wanted,
            }
        }
        self.active = wanted;
        log::trace!(
            "reconciled {:?} layout: {} created, {} updated, {} removed, {} retained",
            self.orientation,
            report.created,
            report.updated,
            report.removed,
            report.retained
        );
        report
    }

    /// Applies a layout push: visibility, label and children.
    pub fn update(&mut self, inputs: &WidgetInputs<'_>) -> ReconcileReport {
        self.visible = inputs.props.visible;
        if !self.visible {
            return ReconcileReport::default();
        }
        let descriptors = Self::child_descriptors(inputs.props);
        self.reconcile(inputs.state, descriptors)
    }

    pub fn view(&self) -> View {
        if !self.visible {
            return View::Empty;
        }
        View::Container {
            orientation: self.orientation,
            label: self.label.clone(),
            children: self
                .active_children()
                .iter()
                .map(DispatchNode::current_view)
                .collect(),
        }
    }

    pub fn dispose_children(&mut self) {
        for child in self.children.drain(..) {
            child.dispose();
        }
        self.active = 0;
    }
}

impl std::fmt::Debug for CompositeNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeNode")
            .field("orientation", &self.orientation)
            .field("policy", &self.policy)
            .field("children", &self.children.len())
            .field("active", &self.active)
            .field("visible", &self.visible)
            .finish()
    }
}

#[cfg(test)]
#[path = "tests/composite_tests.rs"]
mod tests;
