//! Renderer-agnostic description of what a widget shows.

use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Column,
    Row,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::Column => "column",
            Orientation::Row => "row",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InputView {
    pub id: Option<String>,
    /// `text`, `tel`, `email`, `number`, `checkbox`, ...
    pub input_type: String,
    pub label: String,
    pub value: String,
    pub enabled: bool,
    pub required: bool,
    pub errors: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum View {
    /// Nothing rendered: not mounted yet, or hidden.
    Empty,
    Placeholder(String),
    Label(String),
    Container {
        orientation: Orientation,
        label: Option<String>,
        children: Vec<View>,
    },
    Input(InputView),
}

impl View {
    /// Indented textual dump, one element per line.
    pub fn dump(&self) -> String {
        let mut output = String::new();
        self.dump_into(&mut output, 0);
        output
    }

    fn dump_into(&self, output: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            View::Empty => {}
            View::Placeholder(text) => {
                let _ = writeln!(output, "{indent}<placeholder> {text}");
            }
            View::Label(text) => {
                let _ = writeln!(output, "{indent}<label> {text}");
            }
            View::Container {
                orientation,
                label,
                children,
            } => {
                match label {
                    Some(label) => {
                        let _ = writeln!(output, "{indent}<{}> {label}", orientation.as_str());
                    }
                    None => {
                        let _ = writeln!(output, "{indent}<{}>", orientation.as_str());
                    }
                }
                for child in children {
                    child.dump_into(output, depth + 1);
                }
            }
            View::Input(input) => {
                let marker = if input.required { "*" } else { "" };
                let disabled = if input.enabled { "" } else { " disabled" };
                let _ = write!(
                    output,
                    "{indent}<input type={}{disabled}> {}{marker} = {:?}",
                    input.input_type, input.label, input.value
                );
                if !input.errors.is_empty() {
                    let _ = write!(output, " !{}", input.errors.replace('\n', "; "));
                }
                output.push('\n');
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, View::Empty)
    }

    /// Depth-first list of inputs.
    pub fn inputs(&self) -> Vec<&InputView> {
        let mut found = Vec::new();
        self.collect_inputs(&mut found);
        found
    }

    fn collect_inputs<'a>(&'a self, found: &mut Vec<&'a InputView>) {
        match self {
            View::Input(input) => found.push(input),
            View::Container { children, .. } => {
                for child in children {
                    child.collect_inputs(found);
                }
            }
            _ => {}
        }
    }
}
