//! Error types produced by the annotate crate.

use convert::ConvertError;
use thiserror::Error;

/// Structural errors raised by [`Document`](crate::Document) edits.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DomError {
    #[error("text nodes cannot have children")]
    NotAnElement,

    #[error("operation requires a text node")]
    NotAText,

    #[error("node is not a child of the given parent")]
    NotAChild,

    #[error("a node cannot be inserted into its own subtree")]
    HierarchyCycle,
}

/// Errors raised while building an annotation driver.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnnotateError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("conversion engine: {0}")]
    Convert(#[from] ConvertError),

    #[error("document: {0}")]
    Dom(#[from] DomError),
}

impl AnnotateError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
