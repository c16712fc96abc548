use formweave_core::testers::{rank_with, ui_type_is};
use formweave_core::{
    RefreshError, RendererEntry, View, Widget, WidgetFactory, WidgetInputs, WidgetKind,
};

/// Static text element.
#[derive(Debug, Default)]
pub struct LabelRenderer {
    text: String,
    visible: bool,
}

impl LabelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Widget for LabelRenderer {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Label
    }

    fn update(&mut self, inputs: &WidgetInputs<'_>) -> Result<(), RefreshError> {
        self.text = inputs.props.label.clone();
        self.visible = inputs.props.visible;
        Ok(())
    }

    fn view(&self) -> View {
        if self.visible {
            View::Label(self.text.clone())
        } else {
            View::Empty
        }
    }
}

pub fn label_entry() -> RendererEntry {
    RendererEntry {
        tester: rank_with(1, ui_type_is("Label")),
        factory: WidgetFactory::new(WidgetKind::Label, |_| Box::new(LabelRenderer::new())),
    }
}
