//! Signal reducers

use crate::document::Document;
use crate::signal::SignalDef;
use serde_json::Value;

fn next_idx(doc: &Document) -> u64 {
    doc.signals
        .values()
        .map(|signal| signal.idx + 1)
        .max()
        .unwrap_or(0)
}

/// Register a signal if absent; an existing definition wins.
pub(super) fn init_signal(
    doc: &mut Document,
    name: &str,
    value: Value,
    streams: Vec<crate::signal::SignalStream>,
) {
    if doc.signals.get(name).is_some() {
        return;
    }
    let idx = next_idx(doc);
    let mut signal = SignalDef::new(name, value, idx);
    signal.streams = streams;
    doc.signals.insert(name.to_string(), signal);
}

/// Set a signal's current value, creating the definition on first use.
pub(super) fn set_signal(doc: &mut Document, name: &str, value: Value) {
    match doc.signals.get(name).cloned() {
        Some(mut signal) => {
            signal.value = value;
            doc.signals.insert(name.to_string(), signal);
        }
        None => {
            let idx = next_idx(doc);
            doc.signals
                .insert(name.to_string(), SignalDef::new(name, value, idx));
        }
    }
}
