//! Listener table
//!
//! Signal listeners are registered against this table, not against a view:
//! the table outlives every view teardown/rebuild, and `register` replays
//! its entries onto each freshly parsed view. Entries whose signal no
//! longer exists in the new view are dropped.

use crate::engine::{EngineView, SignalHandler};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Handler registry surviving view recreation.
#[derive(Default)]
pub struct ListenerTable {
    signals: Mutex<HashMap<String, Vec<SignalHandler>>>,
    groups: Mutex<HashMap<String, HashMap<String, Vec<SignalHandler>>>>,
}

impl ListenerTable {
    /// Empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a top-level signal handler, attaching it to the live view
    /// when one exists.
    pub fn on_signal(&self, view: Option<&dyn EngineView>, name: &str, handler: SignalHandler) {
        self.signals
            .lock()
            .entry(name.to_string())
            .or_default()
            .push(handler.clone());
        if let Some(view) = view {
            view.add_signal_listener(name, handler);
        }
    }

    /// Unregister handlers for a signal; `None` removes all of them.
    pub fn off_signal(
        &self,
        view: Option<&dyn EngineView>,
        name: &str,
        handler: Option<&SignalHandler>,
    ) {
        let mut signals = self.signals.lock();
        let Some(entries) = signals.get_mut(name) else {
            return;
        };
        entries.retain(|registered| {
            let matches = handler.map_or(true, |target| Arc::ptr_eq(registered, target));
            if matches {
                if let Some(view) = view {
                    view.remove_signal_listener(name, registered);
                }
            }
            !matches
        });
    }

    /// Register a group-scoped signal handler.
    pub fn on_signal_in_group(
        &self,
        view: Option<&dyn EngineView>,
        group: &str,
        name: &str,
        handler: SignalHandler,
    ) {
        self.groups
            .lock()
            .entry(group.to_string())
            .or_default()
            .entry(name.to_string())
            .or_default()
            .push(handler.clone());
        if let Some(view) = view {
            view.add_group_signal_listener(group, name, handler);
        }
    }

    /// Unregister group-scoped handlers; `None` removes all of them.
    pub fn off_signal_in_group(
        &self,
        view: Option<&dyn EngineView>,
        group: &str,
        name: &str,
        handler: Option<&SignalHandler>,
    ) {
        let mut groups = self.groups.lock();
        let Some(entries) = groups.get_mut(group).and_then(|group| group.get_mut(name)) else {
            return;
        };
        entries.retain(|registered| {
            let matches = handler.map_or(true, |target| Arc::ptr_eq(registered, target));
            if matches {
                if let Some(view) = view {
                    view.remove_group_signal_listener(group, name, registered);
                }
            }
            !matches
        });
    }

    /// Replay every registered handler onto a freshly parsed view.
    /// Entries for signals absent from the new view are cleared.
    pub fn register(&self, view: &dyn EngineView) {
        let mut signals = self.signals.lock();
        signals.retain(|name, handlers| {
            if !view.has_signal(name) {
                return false;
            }
            for handler in handlers.iter() {
                view.add_signal_listener(name, handler.clone());
            }
            true
        });

        let mut groups = self.groups.lock();
        for (group, by_signal) in groups.iter_mut() {
            by_signal.retain(|name, handlers| {
                if !view.has_group_signal(group, name) {
                    return false;
                }
                for handler in handlers.iter() {
                    view.add_group_signal_listener(group, name, handler.clone());
                }
                true
            });
        }
    }

    /// Number of handlers registered for a signal (diagnostics).
    #[must_use]
    pub fn handler_count(&self, name: &str) -> usize {
        self.signals.lock().get(name).map_or(0, Vec::len)
    }
}

impl std::fmt::Debug for ListenerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerTable")
            .field("signals", &self.signals.lock().len())
            .field("groups", &self.groups.lock().len())
            .finish()
    }
}
