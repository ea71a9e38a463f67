//! Guide reducers

use crate::action::GuidePatch;
use crate::document::Document;
use crate::guide::Guide;
use crate::ids::{GuideId, MarkId};

pub(super) fn add_guide(doc: &mut Document, guide: &Guide) {
    doc.guides.insert(guide.id, guide.clone());
}

pub(super) fn delete_guide(doc: &mut Document, id: GuideId) {
    doc.guides.remove(&id);
    let groups: Vec<MarkId> = doc
        .marks
        .iter()
        .filter(|(_, mark)| {
            mark.children().is_some_and(|children| {
                children.axes.contains(&id) || children.legends.contains(&id)
            })
        })
        .map(|(mark_id, _)| *mark_id)
        .collect();
    for group_id in groups {
        if let Some(mut group) = doc.marks.get(&group_id).cloned() {
            if let Some(children) = group.children_mut() {
                children.axes.retain(|guide| *guide != id);
                children.legends.retain(|guide| *guide != id);
            }
            doc.marks.insert(group_id, group);
        }
    }
}

pub(super) fn update_guide(doc: &mut Document, id: GuideId, patch: &GuidePatch) {
    let Some(mut guide) = doc.guides.get(&id).cloned() else {
        return;
    };
    match patch {
        GuidePatch::Title(title) => guide.title = title.clone(),
        GuidePatch::Orient(orient) => guide.orient = Some(*orient),
        GuidePatch::Grid(grid) => guide.grid = *grid,
    }
    doc.guides.insert(id, guide);
}

pub(super) fn add_axis_to_group(doc: &mut Document, axis: GuideId, group: MarkId) {
    with_group(doc, group, |children| {
        if !children.axes.contains(&axis) {
            children.axes.push(axis);
        }
    });
}

pub(super) fn add_legend_to_group(doc: &mut Document, legend: GuideId, group: MarkId) {
    with_group(doc, group, |children| {
        if !children.legends.contains(&legend) {
            children.legends.push(legend);
        }
    });
}

fn with_group(
    doc: &mut Document,
    group: MarkId,
    update: impl FnOnce(&mut crate::marks::GroupChildren),
) {
    if let Some(mut mark) = doc.marks.get(&group).cloned() {
        if let Some(children) = mark.children_mut() {
            update(children);
            doc.marks.insert(group, mark);
        }
    }
}
