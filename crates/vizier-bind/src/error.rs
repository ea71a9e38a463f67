//! Binding errors
//!
//! Resolution failures are contained: the bind for the offending channel
//! is skipped with a warning and the document stays in its last good
//! state. Only document-integrity violations escape as hard errors.

use vizier_doc::DocumentError;

/// Errors surfaced by the binding resolver.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// A referenced entity no longer exists.
    #[error(transparent)]
    Document(#[from] DocumentError),
}
