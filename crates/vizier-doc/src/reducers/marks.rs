//! Mark reducers

use crate::document::Document;
use crate::encode::EncodeValue;
use crate::ids::{MarkId, ScaleId};
use crate::marks::{default_encode, Mark, MarkFrom};

pub(super) fn create_scene(doc: &mut Document, scene: &Mark) {
    doc.marks.insert(scene.id, scene.clone());
    doc.scene = Some(scene.id);
}

pub(super) fn add_mark(doc: &mut Document, mark: &Mark) {
    doc.marks.insert(mark.id, mark.clone());
    if let Some(parent_id) = mark.parent {
        attach_child(doc, parent_id, mark.id);
    }
}

fn attach_child(doc: &mut Document, parent: MarkId, child: MarkId) {
    let Some(mut group) = doc.marks.get(&parent).cloned() else {
        return;
    };
    if let Some(children) = group.children_mut() {
        if !children.marks.contains(&child) {
            children.marks.push(child);
            doc.marks.insert(parent, group);
        }
    }
}

fn detach_child(doc: &mut Document, parent: MarkId, child: MarkId) {
    let Some(mut group) = doc.marks.get(&parent).cloned() else {
        return;
    };
    if let Some(children) = group.children_mut() {
        children.marks.retain(|id| *id != child);
        doc.marks.insert(parent, group);
    }
}

pub(super) fn delete_mark(doc: &mut Document, id: MarkId) {
    let parent = doc.marks.get(&id).and_then(|mark| mark.parent);
    if let Some(parent) = parent {
        detach_child(doc, parent, id);
    }
    doc.marks.remove(&id);
    if doc.scene == Some(id) {
        doc.scene = None;
    }
}

pub(super) fn set_parent(doc: &mut Document, child: MarkId, parent: MarkId) {
    let Some(mut mark) = doc.marks.get(&child).cloned() else {
        return;
    };
    if let Some(old_parent) = mark.parent {
        detach_child(doc, old_parent, child);
    }
    mark.parent = Some(parent);
    doc.marks.insert(child, mark);
    attach_child(doc, parent, child);
}

pub(super) fn update_name(doc: &mut Document, id: MarkId, name: &str) {
    with_mark(doc, id, |mark| mark.name = Some(name.to_string()));
}

pub(super) fn update_from(doc: &mut Document, id: MarkId, from: Option<MarkFrom>) {
    with_mark(doc, id, |mark| mark.from = from);
}

pub(super) fn set_manual_layout(doc: &mut Document, id: MarkId, value: bool) {
    with_mark(doc, id, |mark| {
        if let Some(children) = mark.children_mut() {
            children.manual_layout = value;
        }
    });
}

pub(super) fn set_visual(doc: &mut Document, id: MarkId, property: &str, mut def: EncodeValue) {
    def.disabled = false;
    with_mark(doc, id, |mark| {
        mark.encode.update.insert(property.to_string(), def);
    });
}

pub(super) fn disable_visual(doc: &mut Document, id: MarkId, property: &str) {
    with_mark(doc, id, |mark| {
        if let Some(entry) = mark.encode.update.get_mut(property) {
            entry.disabled = true;
        }
    });
}

pub(super) fn reset_visual(doc: &mut Document, id: MarkId, property: &str) {
    with_mark(doc, id, |mark| {
        let defaults = default_encode(mark.mark_type);
        match defaults.get(property) {
            Some(def) => {
                mark.encode.update.insert(property.to_string(), def.clone());
            }
            None => {
                mark.encode.update.shift_remove(property);
            }
        }
    });
}

pub(super) fn set_extent(doc: &mut Document, id: MarkId, old_extent: &str, new_extent: &str) {
    with_mark(doc, id, |mark| {
        if let Some(entry) = mark.encode.update.get_mut(old_extent) {
            entry.disabled = true;
        }
        if let Some(entry) = mark.encode.update.get_mut(new_extent) {
            entry.disabled = false;
        }
    });
}

pub(super) fn bind_scale(doc: &mut Document, id: MarkId, property: &str, scale: ScaleId) {
    with_mark(doc, id, |mark| {
        let entry = mark
            .encode
            .update
            .entry(property.to_string())
            .or_default();
        entry.scale = Some(scale);
        entry.disabled = false;
    });
}

fn with_mark(doc: &mut Document, id: MarkId, update: impl FnOnce(&mut Mark)) {
    if let Some(mut mark) = doc.marks.get(&id).cloned() {
        update(&mut mark);
        doc.marks.insert(id, mark);
    }
}

#[cfg(test)]
mod tests {
    use crate::action::Action;
    use crate::ids::MarkId;
    use crate::marks::{Mark, MarkType};
    use crate::reducers::reduce;
    use crate::Document;

    fn base_doc() -> Document {
        let doc = Document::new();
        let doc = reduce(
            &doc,
            &Action::CreateScene {
                scene: Mark::scene(MarkId(1)),
            },
        );
        let mut group = Mark::new(MarkId(2), MarkType::Group);
        group.parent = Some(MarkId(1));
        reduce(&doc, &Action::AddMark { mark: group })
    }

    #[test]
    fn add_mark_attaches_to_parent() {
        let doc = base_doc();
        let scene = doc.mark(MarkId(1)).unwrap();
        assert_eq!(scene.children().unwrap().marks, vec![MarkId(2)]);
    }

    #[test]
    fn delete_mark_detaches_from_parent() {
        let doc = base_doc();
        let doc = reduce(&doc, &Action::DeleteMark { id: MarkId(2) });
        assert!(doc.marks.get(&MarkId(2)).is_none());
        let scene = doc.mark(MarkId(1)).unwrap();
        assert!(scene.children().unwrap().marks.is_empty());
    }

    #[test]
    fn reduce_leaves_prior_snapshot_untouched() {
        let doc = base_doc();
        let before = doc.clone();
        let _next = reduce(&doc, &Action::DeleteMark { id: MarkId(2) });
        assert_eq!(doc, before);
    }

    #[test]
    fn set_parent_moves_between_groups() {
        let doc = base_doc();
        let mut rect = Mark::new(MarkId(3), MarkType::Rect);
        rect.parent = Some(MarkId(1));
        let doc = reduce(&doc, &Action::AddMark { mark: rect });
        let doc = reduce(
            &doc,
            &Action::SetParent {
                child: MarkId(3),
                parent: MarkId(2),
            },
        );
        assert!(!doc
            .mark(MarkId(1))
            .unwrap()
            .children()
            .unwrap()
            .marks
            .contains(&MarkId(3)));
        assert!(doc
            .mark(MarkId(2))
            .unwrap()
            .children()
            .unwrap()
            .marks
            .contains(&MarkId(3)));
        assert_eq!(doc.mark(MarkId(3)).unwrap().parent, Some(MarkId(2)));
    }
}
