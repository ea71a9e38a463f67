//! Direct-manipulation scaffolding
//!
//! In internal mode every mark is wrapped with a manipulator group: a
//! derived dataset runs the mark-type manipulator transform over the
//! mark's rendered items (parameterized by the selection and mode
//! signals), a second derivation filters down to handle rows, and a shared
//! symbol encoding renders them.

use serde_json::{json, Value};
use vizier_doc::document::export_name;
use vizier_doc::marks::Mark;
use vizier_doc::signal::{ns, MODE, SELECTED};

/// Wrap an exported mark with its manipulator group.
#[must_use]
pub fn manipulators(mark: &Mark, spec: Value) -> Vec<Value> {
    let mark_name = export_name(mark.name.as_deref().unwrap_or_default());
    let manip_name = format!("{mark_name}_manipulators");
    let handles_name = format!("{manip_name}_handles");
    let wrapper = json!({
        "type": "group",
        "data": [
            {
                "name": manip_name,
                "source": mark_name,
                "transform": [{
                    "type": ns(&format!("manipulators_{}", mark.mark_type.as_str())),
                    "vz_id": mark.id,
                    "vz_selected": {"signal": SELECTED},
                    "vz_mode": {"signal": MODE}
                }]
            },
            {
                "name": handles_name,
                "source": manip_name,
                "transform": [{"type": "filter", "expr": "datum.manipulator === \"handle\""}]
            }
        ],
        "marks": [handle_mark(&handles_name)]
    });
    vec![spec, wrapper]
}

/// The shared handle rendering: white squares sized by the transform, with
/// resize cursors on hover.
fn handle_mark(source: &str) -> Value {
    json!({
        "type": "symbol",
        "from": {"data": source},
        "encode": {
            "update": {
                "x": {"field": "x"},
                "y": {"field": "y"},
                "shape": {"value": "square"},
                "size": {"field": "size"},
                "fill": {"value": "white"},
                "stroke": {"value": "black"},
                "strokeWidth": {"value": 0.5}
            },
            "hover": {
                "cursor": {"field": "cursor"}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizier_doc::marks::MarkType;
    use vizier_doc::MarkId;

    #[test]
    fn wraps_spec_with_manipulator_group() {
        let mut mark = Mark::new(MarkId(4), MarkType::Rect);
        mark.name = Some("Rect 1".into());
        let out = manipulators(&mark, json!({"name": "Rect_1", "type": "rect"}));
        assert_eq!(out.len(), 2);
        assert_eq!(out[1]["type"], "group");
        assert_eq!(out[1]["data"][0]["name"], "Rect_1_manipulators");
        assert_eq!(
            out[1]["data"][0]["transform"][0]["type"],
            "vz_manipulators_rect"
        );
        assert_eq!(out[1]["data"][1]["name"], "Rect_1_manipulators_handles");
        assert_eq!(out[1]["marks"][0]["encode"]["update"]["shape"]["value"], "square");
    }
}
