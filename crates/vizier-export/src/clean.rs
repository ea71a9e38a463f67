//! The clean pass
//!
//! Recursively scrubs a serialized record for the wire: editor-internal
//! keys (underscore-prefixed) are stripped, null and disabled properties
//! dropped, names sanitized, and — unless exporting for the editor itself —
//! references to namespaced signals are rendered down to their current
//! literal values so internal signal names never leak.

use serde_json::Value;
use vizier_doc::document::export_name;
use vizier_doc::signal::is_internal;
use vizier_doc::Document;

/// Scrub a serialized record. `internal` keeps signal references live for
/// the editor's own view.
#[must_use]
pub fn clean(value: Value, internal: bool, doc: &Document) -> Value {
    match value {
        Value::Object(object) => {
            let mut out = serde_json::Map::with_capacity(object.len());
            for (key, prop) in object {
                if key.starts_with('_') || prop.is_null() || is_disabled(&prop) {
                    continue;
                }
                if key == "name" {
                    if let Some(name) = prop.as_str() {
                        out.insert(key, Value::String(export_name(name)));
                        continue;
                    }
                }
                if let Some(signal) = signal_ref(&prop) {
                    if !internal && is_internal(signal) {
                        // Render the signal to its current value.
                        let resolved = doc
                            .signal_value(signal)
                            .cloned()
                            .unwrap_or(Value::Null);
                        if !resolved.is_null() {
                            out.insert(key, resolved);
                        }
                        continue;
                    }
                }
                out.insert(key, clean(prop, internal, doc));
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| clean(item, internal, doc))
                .collect(),
        ),
        scalar => scalar,
    }
}

fn is_disabled(value: &Value) -> bool {
    value.get("_disabled").and_then(Value::as_bool) == Some(true)
}

fn signal_ref(value: &Value) -> Option<&str> {
    value.get("signal").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vizier_doc::Store;

    #[test]
    fn strips_internal_keys_and_disabled_props() {
        let doc = Document::new();
        let out = clean(
            json!({
                "_id": 4,
                "name": "Rect 1",
                "encode": {"update": {
                    "x": {"value": 25},
                    "xc": {"value": 70, "_disabled": true},
                    "empty": null
                }}
            }),
            false,
            &doc,
        );
        assert_eq!(
            out,
            json!({
                "name": "Rect_1",
                "encode": {"update": {"x": {"value": 25}}}
            })
        );
    }

    #[test]
    fn resolves_internal_signals_unless_internal() {
        let mut store = Store::new();
        store.set_signal("vz_rect_4_x", json!(25));
        let doc = store.snapshot();

        let external = clean(json!({"x": {"signal": "vz_rect_4_x"}}), false, &doc);
        assert_eq!(external, json!({"x": 25}));

        let internal = clean(json!({"x": {"signal": "vz_rect_4_x"}}), true, &doc);
        assert_eq!(internal, json!({"x": {"signal": "vz_rect_4_x"}}));
    }

    #[test]
    fn leaves_external_signals_alone() {
        let doc = Document::new();
        let out = clean(json!({"x": {"signal": "brush_x"}}), false, &doc);
        assert_eq!(out, json!({"x": {"signal": "brush_x"}}));
    }
}
