//! Selection scaffolding
//!
//! Layers the signals implementing a provisional selection onto an
//! exported scene. Point selections capture the clicked datum's key field
//! (cleared on double-click; multi-select adds a shift-key toggle).
//! Interval selections constrain the pre-wired brush to one axis by
//! flipping its encoding signals.

use crate::signals::edit_signals;
use crate::util::{map_group, take_array};
use serde_json::{json, Value};
use vizier_doc::interaction::{IntervalScope, PointKind, SelectionDef};

/// Apply a provisional selection to the named group of an exported scene.
#[must_use]
pub fn add_selection_to_scene(spec: Value, group_name: &str, selection: &SelectionDef) -> Value {
    match selection {
        SelectionDef::Point(point) => {
            let field = point.field.as_deref().unwrap_or("_vgsid_");
            let mut signals = vec![
                json!({
                    "name": "points_tuple",
                    "on": [
                        {
                            "events": [{"source": "scope", "type": "click"}],
                            "update": click_tuple_update(field),
                            "force": true
                        },
                        {"events": [{"source": "scope", "type": "dblclick"}], "update": "null"}
                    ]
                }),
                json!({
                    "name": "points_tuple_fields",
                    "value": [{"type": "E", "field": field}]
                }),
            ];
            if point.ptype == PointKind::Multi {
                signals.push(json!({
                    "name": "points_toggle",
                    "value": false,
                    "on": [
                        {
                            "events": [{"source": "scope", "type": "click"}],
                            "update": "event.shiftKey"
                        },
                        {"events": [{"source": "scope", "type": "dblclick"}], "update": "false"}
                    ]
                }));
            }
            apply_signals(spec, group_name, &signals)
        }
        SelectionDef::Interval(interval) => match interval.scope {
            IntervalScope::X => apply_signals(
                spec,
                group_name,
                &[json!({"name": "vz_brush_is_x_encoding", "init": "true"})],
            ),
            IntervalScope::Y => apply_signals(
                spec,
                group_name,
                &[json!({"name": "vz_brush_is_y_encoding", "init": "true"})],
            ),
            IntervalScope::Both => spec,
        },
    }
}

/// Update expression capturing the clicked datum's key into a selection
/// tuple; manipulators and group marks never participate.
fn click_tuple_update(field: &str) -> String {
    format!(
        "datum && !datum.manipulator && item().mark.marktype !== 'group' ? \
         {{unit: \"layer_0\", fields: points_tuple_fields, values: \
         [(item().isVoronoi ? datum.datum : datum)['{field}']]}} : null"
    )
}

fn apply_signals(mut spec: Value, group_name: &str, signals: &[Value]) -> Value {
    map_group(&mut spec, group_name, |group| {
        let existing = take_array(group, "signals");
        group["signals"] = Value::Array(edit_signals(existing, signals.to_vec()));
    });
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizier_doc::interaction::{IntervalSelection, PointSelection};

    fn scene() -> Value {
        json!({
            "marks": [
                {"name": "Group_1", "type": "group", "signals": [
                    {"name": "points_tuple", "on": []}
                ]},
                {"name": "Other", "type": "group", "signals": []}
            ]
        })
    }

    #[test]
    fn point_single_injects_tuple_signals() {
        let sel = SelectionDef::Point(PointSelection {
            ptype: PointKind::Single,
            field: Some("category".into()),
        });
        let out = add_selection_to_scene(scene(), "Group_1", &sel);
        let signals = out["marks"][0]["signals"].as_array().unwrap();
        let names: Vec<&str> = signals
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["points_tuple", "points_tuple_fields"]);
        assert!(signals[0]["on"][0]["update"]
            .as_str()
            .unwrap()
            .contains("['category']"));
        // The sibling group is untouched.
        assert!(out["marks"][1]["signals"].as_array().unwrap().is_empty());
    }

    #[test]
    fn point_multi_adds_toggle() {
        let sel = SelectionDef::Point(PointSelection {
            ptype: PointKind::Multi,
            field: None,
        });
        let out = add_selection_to_scene(scene(), "Group_1", &sel);
        let signals = out["marks"][0]["signals"].as_array().unwrap();
        assert!(signals.iter().any(|s| s["name"] == "points_toggle"));
        assert!(signals[0]["on"][0]["update"]
            .as_str()
            .unwrap()
            .contains("['_vgsid_']"));
    }

    #[test]
    fn interval_x_flips_encoding_signal() {
        let sel = SelectionDef::Interval(IntervalSelection {
            scope: IntervalScope::X,
        });
        let out = add_selection_to_scene(scene(), "Group_1", &sel);
        let signals = out["marks"][0]["signals"].as_array().unwrap();
        assert!(signals
            .iter()
            .any(|s| s["name"] == "vz_brush_is_x_encoding" && s["init"] == "true"));
    }

    #[test]
    fn interval_both_returns_scene_unmodified() {
        let sel = SelectionDef::Interval(IntervalSelection {
            scope: IntervalScope::Both,
        });
        let before = scene();
        let out = add_selection_to_scene(before.clone(), "Group_1", &sel);
        assert_eq!(out, before);
    }
}
