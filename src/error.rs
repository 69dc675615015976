//! Error and diagnostic types.
//!
//! Only sink failures abort a run. Everything else is absorbed where it is
//! detected and surfaces as a [`Diagnostic`] attached to the output tree.

use std::fmt;
use thiserror::Error;

/// Fatal errors returned to the caller.
#[derive(Debug, Error)]
pub enum DocletError {
    /// The output sink rejected a write. Partial XML cannot be repaired.
    #[error("failed to write output: {0}")]
    OutputWriteFailure(#[from] std::io::Error),

    /// The XML writer reported an error while emitting an event.
    #[error("failed to write XML: {0}")]
    XmlWriting(#[source] quick_xml::Error),

    /// The declaration model as a whole could not be loaded.
    #[error("invalid declaration model: {0}")]
    Host(#[from] HostError),

    /// An option value was rejected.
    #[error("invalid option: {0}")]
    Config(String),
}

impl From<quick_xml::Error> for DocletError {
    fn from(err: quick_xml::Error) -> Self {
        match err {
            // the sink failed underneath the writer
            quick_xml::Error::Io(io) => {
                DocletError::OutputWriteFailure(std::io::Error::new(io.kind(), io.to_string()))
            }
            other => DocletError::XmlWriting(other),
        }
    }
}

/// A failure raised by the host model for a single declaration.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("declaration of kind `{kind}` has no name")]
    MissingName { kind: String },

    #[error("unexpected declaration shape: {0}")]
    Shape(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Kinds of non-fatal problems recorded during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// An inline tag could not be parsed cleanly and was read best-effort.
    MalformedMarkup,
    /// The host produced a declaration that could not be mapped.
    UnmappableDeclaration,
    /// A link target did not match anything in the declaration model.
    UnresolvedReference,
}

impl DiagnosticKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedMarkup => "malformed-markup",
            DiagnosticKind::UnmappableDeclaration => "unmappable-declaration",
            DiagnosticKind::UnresolvedReference => "unresolved-reference",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}
