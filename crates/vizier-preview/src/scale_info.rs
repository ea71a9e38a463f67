//! Scale discovery heuristics
//!
//! A group can be demonstrated when its first child mark binds x and/or y
//! through scales with data-ref domains. The discovered names, fields, and
//! continuous/discrete classes parameterize all synthesized scaffolding.

use vizier_doc::document::export_name;
use vizier_doc::interaction::ScaleInfo;
use vizier_doc::marks::Mark;
use vizier_doc::scale::Scale;
use vizier_doc::{Document, MarkId};

/// Inspect a group's first child mark and report its x/y scale bindings.
/// All fields stay `None` when nothing usable is bound.
#[must_use]
pub fn get_scale_info_for_group(doc: &Document, group_id: MarkId) -> ScaleInfo {
    let (scale_x, scale_y) = scale_records(doc, group_id);
    let mut info = ScaleInfo::default();
    if let Some(scale) = scale_x {
        info.x_scale_name = Some(export_name(&scale.name));
        info.x_field_name = scale.domain.first().map(|d| d.field.clone());
        info.x_scale_type = Some(scale.scale_type.simple());
    }
    if let Some(scale) = scale_y {
        info.y_scale_name = Some(export_name(&scale.name));
        info.y_field_name = scale.domain.first().map(|d| d.field.clone());
        info.y_scale_type = Some(scale.scale_type.simple());
    }
    info
}

fn scale_records(doc: &Document, group_id: MarkId) -> (Option<&Scale>, Option<&Scale>) {
    let Some(children) = doc
        .marks
        .get(&group_id)
        .and_then(Mark::children)
    else {
        return (None, None);
    };
    let Some(first_child) = children.marks.first().and_then(|id| doc.marks.get(id)) else {
        return (None, None);
    };
    let scale_for = |property: &str| {
        first_child
            .encode
            .update
            .get(property)
            .and_then(|entry| entry.scale)
            .and_then(|id| doc.scales.get(&id))
    };
    (scale_for("x"), scale_for("y"))
}
