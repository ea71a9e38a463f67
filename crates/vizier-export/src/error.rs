//! Exporter errors
//!
//! A missing entity during export is a document-integrity violation: it
//! means a cascade failed upstream. The exporter reports it rather than
//! guessing at recovery.

use vizier_doc::DocumentError;

/// Errors produced while compiling a document to a specification.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// A referenced entity no longer exists in the snapshot.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// Inline values could not be rendered to the requested format.
    #[error("value rendering failed: {0}")]
    Render(String),
}
