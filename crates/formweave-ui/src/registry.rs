use formweave_core::RendererRegistry;

use crate::controls::{
    boolean_control_entry, integer_control_entry, number_control_entry, text_control_entry,
};
use crate::label::label_entry;
use crate::layout::{group_entry, horizontal_layout_entry, vertical_layout_entry};

/// Layouts, the label element and the four input controls.
pub fn vanilla_renderers() -> RendererRegistry {
    RendererRegistry::new()
        .with(vertical_layout_entry())
        .with(horizontal_layout_entry())
        .with(group_entry())
        .with(label_entry())
        .with(text_control_entry())
        .with(number_control_entry())
        .with(integer_control_entry())
        .with(boolean_control_entry())
}
