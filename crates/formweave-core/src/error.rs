use thiserror::Error;

use crate::NodeId;

/// A node was asked to refresh without the inputs it needs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no application state attached to node {node}")]
    MissingState { node: NodeId },
    #[error("no data schema available for node {node}")]
    MissingSchema { node: NodeId },
    #[error("no ui schema available for node {node}")]
    MissingUiSchema { node: NodeId },
}

/// Deriving render props from the application state failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("scope `{scope}` is not a `#/...` schema pointer")]
    InvalidScope { scope: String },
    #[error("scope `{scope}` does not resolve against the data schema")]
    UnresolvedScope { scope: String },
    #[error("projection failed: {0}")]
    Other(String),
}

/// A tester could not evaluate its match.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tester fault: {message}")]
pub struct TesterError {
    pub message: String,
}

impl TesterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Malformed ui schema input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("missing `{field}` on {element}")]
    MissingField {
        field: &'static str,
        element: &'static str,
    },
    #[error("unknown rule effect `{0}`")]
    UnknownEffect(String),
    #[error("unsupported rule condition `{0}`")]
    UnsupportedCondition(String),
    #[error("invalid control label `{0}`")]
    InvalidLabel(String),
}

/// A widget rejected a user edit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("widget `{kind}` is not editable")]
    NotEditable { kind: String },
    #[error("node {node} has nothing mounted")]
    NotMounted { node: NodeId },
    #[error("no application state to apply the edit to")]
    MissingState,
    #[error("no control bound to scope `{scope}`")]
    UnknownScope { scope: String },
    #[error("widget `{kind}` rejected the edit: {reason}")]
    Rejected { kind: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Projection(#[from] ProjectionError),
    #[error("widget `{kind}` failed to update: {message}")]
    Widget { kind: String, message: String },
}

impl RefreshError {
    pub fn widget(kind: impl Into<String>, message: impl Into<String>) -> Self {
        RefreshError::Widget {
            kind: kind.into(),
            message: message.into(),
        }
    }
}
