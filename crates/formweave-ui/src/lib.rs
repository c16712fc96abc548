//! Vanilla renderers for formweave: layouts, labels and input controls,
//! plus a headless renderer for inspecting rendered trees.

pub mod controls;
pub mod label;
pub mod layout;
mod registry;
mod renderer;

pub use controls::{
    boolean_control_entry, coerce_edit, integer_control_entry, number_control_entry,
    text_control_entry, InputControl, InputVariant,
};
pub use label::{label_entry, LabelRenderer};
pub use layout::{
    group_entry, horizontal_layout_entry, layout_entry, vertical_layout_entry, LayoutRenderer,
};
pub use registry::vanilla_renderers;
pub use renderer::{format_tree, log_tree, HeadlessRenderer};

#[cfg(test)]
#[path = "tests/renderers_tests.rs"]
mod tests;
