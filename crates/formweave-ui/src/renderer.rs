//! Headless rendering and debug dumps of a dispatch tree.

use std::fmt::Write as _;

use formweave_core::{DispatchNode, InputView, View};

/// Renders a mounted tree without any output surface.
pub struct HeadlessRenderer<'a> {
    root: &'a DispatchNode,
}

impl<'a> HeadlessRenderer<'a> {
    pub fn new(root: &'a DispatchNode) -> Self {
        Self { root }
    }

    pub fn render(&self) -> View {
        self.root.current_view()
    }

    /// Indented text of the rendered view, one element per line.
    pub fn dump(&self) -> String {
        self.render().dump()
    }

    /// Inputs in document order, owned.
    pub fn inputs(&self) -> Vec<InputView> {
        self.render().inputs().into_iter().cloned().collect()
    }
}

/// Structure of the dispatch tree: node ids, widget kinds and data paths.
pub fn format_tree(root: &DispatchNode) -> String {
    let mut output = String::new();
    format_node(root, 0, &mut output);
    output
}

fn format_node(node: &DispatchNode, depth: usize, output: &mut String) {
    let indent = "  ".repeat(depth);
    let kind = node
        .widget_kind()
        .map_or_else(|| "-".to_owned(), |kind| kind.to_string());
    let _ = write!(output, "{indent}#{} {kind}", node.id());
    if let Some(props) = node.props() {
        if !props.data_path.is_empty() {
            let _ = write!(output, " @{}", props.data_path);
        }
    }
    if let Some(err) = node.last_error() {
        let _ = write!(output, " error: {err}");
    }
    output.push('\n');
    for child in node.children() {
        format_node(&child, depth + 1, output);
    }
}

pub fn log_tree(root: &DispatchNode) {
    log::debug!("dispatch tree:\n{}", format_tree(root));
}
