//! The runtime controller
//!
//! Owns the single live view and mediates recompilation. `parse` debounces
//! slightly so rapid successive mutations coalesce into one recompile, and
//! every scheduled recompilation checks a cancellation flag before acting —
//! only the most recently scheduled one may complete. Engine failures are
//! caught at this boundary and leave the current view in place.

use crate::engine::{EngineView, RenderEngine, SignalHandler};
use crate::listeners::ListenerTable;
use parking_lot::RwLock;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use vizier_doc::{DataRegistry, Document};
use vizier_export::{export, ExportError};

/// Builds the latest specification at recompile time, so a debounced parse
/// always sees the newest settled snapshot.
pub type SpecProvider = Arc<dyn Fn() -> Result<Value, ExportError> + Send + Sync>;

/// Delay before a scheduled recompilation fires.
const DEBOUNCE: Duration = Duration::from_millis(10);

struct Shared {
    view: RwLock<Option<Arc<dyn EngineView>>>,
    listeners: ListenerTable,
}

struct Pending {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Owner of the live rendering-engine view.
pub struct Controller<E: RenderEngine> {
    engine: Arc<E>,
    shared: Arc<Shared>,
    pending: Option<Pending>,
}

impl<E: RenderEngine> Controller<E> {
    /// Wrap an engine; no view exists until the first `parse`.
    #[must_use]
    pub fn new(engine: E) -> Self {
        Self {
            engine: Arc::new(engine),
            shared: Arc::new(Shared {
                view: RwLock::new(None),
                listeners: ListenerTable::new(),
            }),
            pending: None,
        }
    }

    /// The current live view, if any.
    #[must_use]
    pub fn view(&self) -> Option<Arc<dyn EngineView>> {
        self.shared.view.read().clone()
    }

    /// Schedule a recompilation, superseding any in-flight one.
    ///
    /// After the debounce delay the provider builds the specification, the
    /// engine parses it into a new view, registered listeners re-attach,
    /// and one render pass runs. A parse superseded at any point before
    /// installing its view is a no-op.
    pub fn parse(&mut self, provider: SpecProvider) {
        if let Some(previous) = self.pending.take() {
            previous.cancelled.store(true, Ordering::SeqCst);
            previous.handle.abort();
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        let shared = Arc::clone(&self.shared);
        let engine = Arc::clone(&self.engine);
        let flag = Arc::clone(&cancelled);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(DEBOUNCE).await;
            if flag.load(Ordering::SeqCst) {
                return;
            }
            let spec = match provider() {
                Ok(spec) => spec,
                Err(err) => {
                    tracing::error!(error = %err, "specification rebuild failed");
                    return;
                }
            };
            match engine.parse(spec).await {
                Ok(view) => {
                    if flag.load(Ordering::SeqCst) {
                        // Superseded while the engine was parsing.
                        return;
                    }
                    shared.listeners.register(view.as_ref());
                    {
                        *shared.view.write() = Some(Arc::clone(&view));
                    }
                    // Initial render pass; the view has to run once before
                    // the scene graph is ready.
                    if let Err(err) = view.run().await {
                        tracing::warn!(error = %err, "initial render failed");
                    }
                }
                Err(err) => {
                    // Current view stays as-is; no partial render.
                    tracing::error!(error = %err, "engine rejected specification");
                }
            }
        });
        self.pending = Some(Pending { cancelled, handle });
    }

    /// Wait for the most recently scheduled recompilation to finish (or be
    /// cancelled).
    pub async fn settled(&mut self) {
        if let Some(pending) = self.pending.take() {
            let _ = pending.handle.await;
        }
    }

    /// Re-render the current view without rebuilding the specification —
    /// for signal-value-only changes.
    pub async fn update(&self) {
        let view = self.view();
        if let Some(view) = view {
            if let Err(err) = view.run().await {
                tracing::warn!(error = %err, "render pass failed");
            }
        }
    }

    /// Register a top-level signal handler; survives view recreation.
    pub fn on_signal(&self, name: &str, handler: SignalHandler) {
        let view = self.view();
        self.shared
            .listeners
            .on_signal(view.as_deref(), name, handler);
    }

    /// Unregister top-level signal handlers.
    pub fn off_signal(&self, name: &str, handler: Option<&SignalHandler>) {
        let view = self.view();
        self.shared
            .listeners
            .off_signal(view.as_deref(), name, handler);
    }

    /// Register a group-scoped signal handler.
    pub fn on_signal_in_group(&self, group: &str, name: &str, handler: SignalHandler) {
        let view = self.view();
        self.shared
            .listeners
            .on_signal_in_group(view.as_deref(), group, name, handler);
    }

    /// Unregister group-scoped signal handlers.
    pub fn off_signal_in_group(&self, group: &str, name: &str, handler: Option<&SignalHandler>) {
        let view = self.view();
        self.shared
            .listeners
            .off_signal_in_group(view.as_deref(), group, name, handler);
    }

    /// Read a group-scoped signal from the live view.
    #[must_use]
    pub fn signal_in_group(&self, group: &str, name: &str) -> Option<Value> {
        self.view()?.group_signal(group, name)
    }

    /// Set a group-scoped signal and re-render.
    pub async fn set_signal_in_group(&self, group: &str, name: &str, value: Value) {
        if let Some(view) = self.view() {
            view.set_group_signal(group, name, value);
            if let Err(err) = view.run().await {
                tracing::warn!(error = %err, "render pass failed");
            }
        }
    }

    /// The listener table (diagnostics and tests).
    #[must_use]
    pub fn listeners(&self) -> &ListenerTable {
        &self.shared.listeners
    }
}

impl<E: RenderEngine> std::fmt::Debug for Controller<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Controller")
            .field("has_view", &self.shared.view.read().is_some())
            .field("pending", &self.pending.is_some())
            .finish()
    }
}

/// Build the editor's own specification: the internal export plus the
/// registered property-signal definitions (in registration order) and the
/// placeholder rows path marks fall back to.
///
/// # Errors
/// Propagates exporter integrity failures.
pub fn manipulator_spec(doc: &Document, data: &DataRegistry) -> Result<Value, ExportError> {
    let exported = export(doc, data, true, false)?;
    let mut spec = exported.spec;

    let mut defs: Vec<_> = doc.signals.values().collect();
    defs.sort_by_key(|signal| signal.idx);
    for def in defs {
        let mut wire = serde_json::to_value(def)
            .map_err(|err| ExportError::Render(err.to_string()))?;
        if let Some(object) = wire.as_object_mut() {
            object.remove("_idx");
        }
        if let Some(signals) = spec["signals"].as_array_mut() {
            signals.push(wire);
        }
    }

    if let Some(datasets) = spec["data"].as_array_mut() {
        datasets.push(json!({
            "name": "dummy_data",
            "values": [{"x": 0, "y": 0}, {"x": 100, "y": 100}]
        }));
    }

    Ok(spec)
}
