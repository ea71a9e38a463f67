//! Rendering-engine boundary
//!
//! The engine renders compiled specifications; the controller owns exactly
//! one live view at a time. Views expose signal listener attachment and
//! per-group signal access; everything else about rendering is opaque.

use serde_json::Value;
use std::sync::Arc;

/// Callback invoked when a signal's value changes.
pub type SignalHandler = Arc<dyn Fn(&str, &Value) + Send + Sync>;

/// Errors crossing the engine boundary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The engine rejected the synthesized specification.
    #[error("specification rejected: {0}")]
    Parse(String),
    /// A render pass failed.
    #[error("render failed: {0}")]
    Render(String),
}

/// A rendering engine that parses specifications into live views.
#[async_trait::async_trait]
pub trait RenderEngine: Send + Sync + 'static {
    /// Parse a specification into a new view.
    async fn parse(&self, spec: Value) -> Result<Arc<dyn EngineView>, EngineError>;
}

/// One live rendering of a specification.
#[async_trait::async_trait]
pub trait EngineView: Send + Sync {
    /// Run a render pass (visual encoding and drawing).
    async fn run(&self) -> Result<(), EngineError>;

    /// Whether the view defines a top-level signal.
    fn has_signal(&self, name: &str) -> bool;

    /// Attach a listener to a top-level signal.
    fn add_signal_listener(&self, name: &str, handler: SignalHandler);

    /// Detach a previously attached listener.
    fn remove_signal_listener(&self, name: &str, handler: &SignalHandler);

    /// Whether a group-scoped signal exists.
    fn has_group_signal(&self, group: &str, name: &str) -> bool;

    /// Attach a listener to a group-scoped signal.
    fn add_group_signal_listener(&self, group: &str, name: &str, handler: SignalHandler);

    /// Detach a group-scoped listener.
    fn remove_group_signal_listener(&self, group: &str, name: &str, handler: &SignalHandler);

    /// Read a group-scoped signal's current value.
    fn group_signal(&self, group: &str, name: &str) -> Option<Value>;

    /// Set a group-scoped signal's value.
    fn set_group_signal(&self, group: &str, name: &str, value: Value);
}
