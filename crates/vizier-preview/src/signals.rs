//! Signal reconciliation and preview cleaning

use crate::util::{map_group, take_array};
use serde_json::{json, Value};

/// Merge incoming signal definitions into an existing list: a same-named
/// signal is replaced in place (its position preserved), anything new is
/// appended. Idempotent under repeated application with identical input.
#[must_use]
pub fn edit_signals(existing: Vec<Value>, incoming: Vec<Value>) -> Vec<Value> {
    let mut merged: Vec<Value> = existing
        .into_iter()
        .map(|signal| {
            let replacement = incoming
                .iter()
                .find(|candidate| candidate["name"] == signal["name"]);
            replacement.cloned().unwrap_or(signal)
        })
        .collect();
    for signal in incoming {
        let present = merged
            .iter()
            .any(|candidate| candidate["name"] == signal["name"]);
        if !present {
            merged.push(signal);
        }
    }
    merged
}

/// Shrink an exported scene to preview size: strip axis chrome and
/// legends, pin every group to the origin, down-scale symbol sizes, and
/// push non-target groups off-canvas. Off-canvas rather than deleted —
/// multi-view filtering demonstrations still reference sibling groups.
#[must_use]
pub fn clean_spec_for_preview(mut spec: Value, group_name: &str) -> Value {
    if let Some(marks) = spec.get_mut("marks").and_then(Value::as_array_mut) {
        for mark in marks {
            if mark.get("type").and_then(Value::as_str) != Some("group")
                || mark.get("name").and_then(Value::as_str).is_none()
            {
                continue;
            }
            if let Some(axes) = mark.get_mut("axes").and_then(Value::as_array_mut) {
                for axis in axes {
                    axis["title"] = json!("");
                    axis["labels"] = json!(false);
                    axis["ticks"] = json!(false);
                    axis["domain"] = json!(false);
                }
            }
            mark["legends"] = json!([]);
            mark["encode"]["update"]["x"] = json!({"value": 0});
            mark["encode"]["update"]["y"] = json!({"value": 0});
            mark["encode"]["update"]["width"] = json!({"signal": "width"});
            mark["encode"]["update"]["height"] = json!({"signal": "height"});

            let first_is_sized_symbol = mark["marks"]
                .get(0)
                .is_some_and(|child| {
                    child["type"] == "symbol"
                        && !child["encode"]["update"]["size"]["value"].is_null()
                });
            if first_is_sized_symbol {
                mark["marks"][0]["encode"]["update"]["size"] = json!({"value": "10"});
            }

            if mark.get("name").and_then(Value::as_str) != Some(group_name) {
                mark["clip"] = json!(true);
                mark["encode"]["update"]["x"] = json!({"value": -999});
                mark["encode"]["update"]["y"] = json!({"value": -999});
            }
        }
    }
    add_base_signals_for_preview(spec, group_name)
}

fn add_base_signals_for_preview(mut spec: Value, group_name: &str) -> Value {
    map_group(&mut spec, group_name, |group| {
        let existing = take_array(group, "signals");
        group["signals"] = Value::Array(edit_signals(existing, base_signals()));
    });
    spec
}

/// Baseline signal values for an isolated preview viewport.
fn base_signals() -> Vec<Value> {
    vec![
        json!({"name": "width", "init": "100"}),
        json!({"name": "height", "init": "100"}),
        json!({"name": "brush_x", "init": "[0, 0]"}),
        json!({"name": "brush_y", "init": "[0, 0]"}),
        json!({"name": "brush_zoom_anchor", "init": "null"}),
        json!({"name": "brush_zoom_delta", "init": "null"}),
        json!({"name": "grid_zoom_anchor", "init": "null"}),
        json!({"name": "grid_zoom_delta", "init": "null"}),
        json!({"name": "points_tuple", "init": "null"}),
        json!({"name": "grid_translate_anchor", "init": {}}),
        json!({"name": "grid_translate_delta", "init": {}}),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn existing() -> Vec<Value> {
        vec![
            json!({"name": "width", "value": 640}),
            json!({"name": "unit", "value": {}}),
        ]
    }

    #[test]
    fn replaces_in_place_and_appends() {
        let incoming = vec![
            json!({"name": "width", "init": "100"}),
            json!({"name": "brush_x", "init": "[0, 0]"}),
        ];
        let merged = edit_signals(existing(), incoming);
        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0], json!({"name": "width", "init": "100"}));
        assert_eq!(merged[1]["name"], "unit");
        assert_eq!(merged[2]["name"], "brush_x");
    }

    #[test]
    fn merge_is_idempotent() {
        let incoming = vec![
            json!({"name": "width", "init": "100"}),
            json!({"name": "brush_x", "init": "[0, 0]"}),
        ];
        let once = edit_signals(existing(), incoming.clone());
        let twice = edit_signals(once.clone(), incoming);
        assert_eq!(once, twice);
    }

    #[test]
    fn preview_cleaning_hides_sibling_groups() {
        let spec = json!({
            "marks": [
                {"name": "Group_1", "type": "group", "axes": [{"title": "t"}],
                 "legends": [{"fill": "c"}], "encode": {"update": {}}, "marks": [], "signals": []},
                {"name": "Group_2", "type": "group", "axes": [],
                 "legends": [], "encode": {"update": {}}, "marks": [], "signals": []}
            ]
        });
        let out = clean_spec_for_preview(spec, "Group_1");
        let target = &out["marks"][0];
        assert_eq!(target["axes"][0]["labels"], json!(false));
        assert_eq!(target["legends"], json!([]));
        assert_eq!(target["encode"]["update"]["x"], json!({"value": 0}));
        let sibling = &out["marks"][1];
        assert_eq!(sibling["encode"]["update"]["x"], json!({"value": -999}));
        assert_eq!(sibling["clip"], json!(true));
        // Base signals land only on the previewed group.
        assert!(target["signals"].as_array().unwrap().len() > 5);
        assert!(sibling["signals"].as_array().unwrap().is_empty());
    }
}
