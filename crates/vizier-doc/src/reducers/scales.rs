//! Scale reducers

use crate::action::ScalePatch;
use crate::document::Document;
use crate::ids::{MarkId, ScaleId};
use crate::scale::Scale;

pub(super) fn add_scale(doc: &mut Document, scale: &Scale) {
    doc.scales.insert(scale.id, scale.clone());
}

pub(super) fn update_scale(doc: &mut Document, id: ScaleId, patch: &ScalePatch) {
    let Some(mut scale) = doc.scales.get(&id).cloned() else {
        return;
    };
    match patch {
        ScalePatch::Name(name) => scale.name = name.clone(),
        ScalePatch::ScaleType(scale_type) => scale.scale_type = *scale_type,
        ScalePatch::Range(range) => scale.range = range.clone(),
        ScalePatch::Domain(domain) => scale.domain = domain.clone(),
        ScalePatch::Nice(nice) => scale.nice = *nice,
        ScalePatch::Round(round) => scale.round = *round,
        ScalePatch::Zero(zero) => scale.zero = *zero,
        ScalePatch::Points(points) => scale.points = *points,
        ScalePatch::Padding(padding) => scale.padding = *padding,
    }
    doc.scales.insert(id, scale);
}

pub(super) fn delete_scale(doc: &mut Document, id: ScaleId) {
    doc.scales.remove(&id);
    let groups: Vec<MarkId> = doc
        .marks
        .iter()
        .filter(|(_, mark)| {
            mark.children()
                .is_some_and(|children| children.scales.contains(&id))
        })
        .map(|(mark_id, _)| *mark_id)
        .collect();
    for group_id in groups {
        if let Some(mut group) = doc.marks.get(&group_id).cloned() {
            if let Some(children) = group.children_mut() {
                children.scales.retain(|scale| *scale != id);
            }
            doc.marks.insert(group_id, group);
        }
    }
}

pub(super) fn add_scale_to_group(doc: &mut Document, scale: ScaleId, group: MarkId) {
    let Some(mut mark) = doc.marks.get(&group).cloned() else {
        return;
    };
    if let Some(children) = mark.children_mut() {
        if !children.scales.contains(&scale) {
            children.scales.push(scale);
            doc.marks.insert(group, mark);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::{Mark, MarkType};
    use crate::scale::{ScaleRange, ScaleType};

    #[test]
    fn delete_scale_detaches_from_groups() {
        let mut doc = Document::new();
        let mut group = Mark::new(MarkId(1), MarkType::Group);
        group.children_mut().unwrap().scales.push(ScaleId(5));
        doc.marks.insert(MarkId(1), group);
        add_scale(
            &mut doc,
            &Scale::new(ScaleId(5), "x", ScaleType::Linear, Some(ScaleRange::Width)),
        );

        delete_scale(&mut doc, ScaleId(5));
        assert!(doc.scales.get(&ScaleId(5)).is_none());
        assert!(doc
            .mark(MarkId(1))
            .unwrap()
            .children()
            .unwrap()
            .scales
            .is_empty());
    }

    #[test]
    fn attach_is_idempotent() {
        let mut doc = Document::new();
        doc.marks
            .insert(MarkId(1), Mark::new(MarkId(1), MarkType::Group));
        add_scale_to_group(&mut doc, ScaleId(5), MarkId(1));
        add_scale_to_group(&mut doc, ScaleId(5), MarkId(1));
        assert_eq!(
            doc.mark(MarkId(1)).unwrap().children().unwrap().scales,
            vec![ScaleId(5)]
        );
    }
}
