use crate::error::RefreshError;
use crate::registry::WidgetKind;
use crate::view::View;
use crate::widget::{Widget, WidgetInputs};

pub const UNKNOWN_RENDERER_TEXT: &str = "No applicable renderer found!";

/// Fallback shown for elements no registered renderer accepts.
#[derive(Debug, Default)]
pub struct UnknownWidget {
    mounted: bool,
}

impl UnknownWidget {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Widget for UnknownWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Unknown
    }

    fn mount(&mut self) {
        self.mounted = true;
    }

    fn update(&mut self, _inputs: &WidgetInputs<'_>) -> Result<(), RefreshError> {
        Ok(())
    }

    fn unmount(&mut self) {
        self.mounted = false;
    }

    fn view(&self) -> View {
        if self.mounted {
            View::Placeholder(UNKNOWN_RENDERER_TEXT.to_owned())
        } else {
            View::Empty
        }
    }
}
