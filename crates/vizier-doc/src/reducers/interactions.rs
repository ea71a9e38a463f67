//! Interaction and widget reducers

use crate::document::Document;
use crate::ids::{InteractionId, MarkId, WidgetId};
use crate::interaction::{ApplicationDef, Interaction, SelectionDef};
use crate::widget::{Widget, WidgetSelection};

pub(super) fn add_interaction(doc: &mut Document, interaction: &Interaction) {
    doc.interactions.insert(interaction.id, interaction.clone());
    with_group(doc, interaction.group_id, |children| {
        if !children.interactions.contains(&interaction.id) {
            children.interactions.push(interaction.id);
        }
    });
}

pub(super) fn set_selection(doc: &mut Document, id: InteractionId, selection: SelectionDef) {
    with_interaction(doc, id, |interaction| {
        interaction.selection = Some(selection);
    });
}

/// Applications replace a previous application of the same kind; distinct
/// kinds stack.
pub(super) fn set_application(doc: &mut Document, id: InteractionId, application: ApplicationDef) {
    with_interaction(doc, id, |interaction| {
        apply_application(&mut interaction.applications, application);
    });
}

pub(super) fn remove_application(doc: &mut Document, id: InteractionId, kind: &str) {
    with_interaction(doc, id, |interaction| {
        interaction.applications.retain(|app| app.kind() != kind);
    });
}

pub(super) fn delete_interaction(doc: &mut Document, id: InteractionId) {
    let group = doc.interactions.get(&id).map(|rec| rec.group_id);
    doc.interactions.remove(&id);
    if let Some(group) = group {
        with_group(doc, group, |children| {
            children.interactions.retain(|other| *other != id);
        });
    }
}

pub(super) fn add_widget(doc: &mut Document, widget: &Widget) {
    doc.widgets.insert(widget.id, widget.clone());
    with_group(doc, widget.group_id, |children| {
        if !children.widgets.contains(&widget.id) {
            children.widgets.push(widget.id);
        }
    });
}

pub(super) fn set_widget_selection(doc: &mut Document, id: WidgetId, selection: WidgetSelection) {
    with_widget(doc, id, |widget| widget.selection = Some(selection));
}

pub(super) fn set_widget_application(doc: &mut Document, id: WidgetId, application: ApplicationDef) {
    with_widget(doc, id, |widget| {
        apply_application(&mut widget.applications, application);
    });
}

pub(super) fn remove_widget_application(doc: &mut Document, id: WidgetId, kind: &str) {
    with_widget(doc, id, |widget| {
        widget.applications.retain(|app| app.kind() != kind);
    });
}

pub(super) fn delete_widget(doc: &mut Document, id: WidgetId) {
    let group = doc.widgets.get(&id).map(|rec| rec.group_id);
    doc.widgets.remove(&id);
    if let Some(group) = group {
        with_group(doc, group, |children| {
            children.widgets.retain(|other| *other != id);
        });
    }
}

fn apply_application(applications: &mut Vec<ApplicationDef>, application: ApplicationDef) {
    match applications
        .iter_mut()
        .find(|app| app.kind() == application.kind())
    {
        Some(slot) => *slot = application,
        None => applications.push(application),
    }
}

fn with_interaction(
    doc: &mut Document,
    id: InteractionId,
    update: impl FnOnce(&mut Interaction),
) {
    if let Some(mut interaction) = doc.interactions.get(&id).cloned() {
        update(&mut interaction);
        doc.interactions.insert(id, interaction);
    }
}

fn with_widget(doc: &mut Document, id: WidgetId, update: impl FnOnce(&mut Widget)) {
    if let Some(mut widget) = doc.widgets.get(&id).cloned() {
        update(&mut widget);
        doc.widgets.insert(id, widget);
    }
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
