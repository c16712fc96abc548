//! Vertical, horizontal and group layouts.
//!
//! All three share [`LayoutRenderer`]; they differ in orientation and in
//! whether the layout label is shown.

use formweave_core::testers::{rank_with, ui_type_is};
use formweave_core::{
    CompositeNode, DispatchNode, LayoutKind, NodeContext, Orientation, RefreshError,
    RendererEntry, ShrinkPolicy, View, Widget, WidgetFactory, WidgetInputs, WidgetKind,
};

pub struct LayoutRenderer {
    kind: LayoutKind,
    composite: CompositeNode,
}

impl LayoutRenderer {
    pub fn new(context: &NodeContext, kind: LayoutKind) -> Self {
        Self::with_policy(context, kind, ShrinkPolicy::default())
    }

    pub fn with_policy(context: &NodeContext, kind: LayoutKind, policy: ShrinkPolicy) -> Self {
        let orientation = match kind {
            LayoutKind::Horizontal => Orientation::Row,
            LayoutKind::Vertical | LayoutKind::Group => Orientation::Column,
        };
        Self {
            kind,
            composite: CompositeNode::new(context.clone(), orientation).with_policy(policy),
        }
    }

    pub fn layout_kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn composite(&self) -> &CompositeNode {
        &self.composite
    }
}

impl Widget for LayoutRenderer {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Layout(self.kind)
    }

    fn update(&mut self, inputs: &WidgetInputs<'_>) -> Result<(), RefreshError> {
        if self.kind == LayoutKind::Group {
            let label = &inputs.props.label;
            self.composite
                .set_label((!label.is_empty()).then(|| label.clone()));
        }
        let report = self.composite.update(inputs);
        log::trace!(
            "{} layout of node {} reconciled: {report:?}",
            self.kind.type_name(),
            inputs.node
        );
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

impl std::fmt::Debug for LayoutRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutRenderer")
            .field("kind", &self.kind)
            .field("composite", &self.composite)
            .finish()
    }
}

/// Registry entry rendering `kind` layouts at rank 1.
pub fn layout_entry(kind: LayoutKind, policy: ShrinkPolicy) -> RendererEntry {
    let tester = rank_with(1, ui_type_is(kind.type_name()));
    let factory = WidgetFactory::new(WidgetKind::Layout(kind), move |context| {
        Box::new(LayoutRenderer::with_policy(context, kind, policy))
    });
    RendererEntry {
        tester,
        factory,
    }
}

pub fn vertical_layout_entry() -> RendererEntry {
    layout_entry(LayoutKind::Vertical, ShrinkPolicy::default())
}

pub fn horizontal_layout_entry() -> RendererEntry {
    layout_entry(LayoutKind::Horizontal, ShrinkPolicy::default())
}

pub fn group_entry() -> RendererEntry {
    layout_entry(LayoutKind::Group, ShrinkPolicy::default())
}
