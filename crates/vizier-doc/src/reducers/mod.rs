//! Reducers: pure application of actions to snapshots
//!
//! `reduce` never mutates its input; it clones the (structurally shared)
//! document and applies one action. A reducer targeting a missing entity is
//! a no-op — the prior state wins, mirroring the containment policy of the
//! resolution layer.

mod data;
mod guides;
mod interactions;
mod marks;
mod scales;
mod signals;

use crate::action::Action;
use crate::document::Document;

/// Apply one action, producing the next snapshot.
#[must_use]
pub fn reduce(doc: &Document, action: &Action) -> Document {
    let mut next = doc.clone();
    apply(&mut next, action);
    next
}

fn apply(doc: &mut Document, action: &Action) {
    match action {
        Action::CreateScene { scene } => marks::create_scene(doc, scene),
        Action::AddMark { mark } => marks::add_mark(doc, mark),
        Action::DeleteMark { id } => marks::delete_mark(doc, *id),
        Action::SetParent { child, parent } => marks::set_parent(doc, *child, *parent),
        Action::UpdateMarkName { id, name } => marks::update_name(doc, *id, name),
        Action::UpdateMarkFrom { id, from } => marks::update_from(doc, *id, from.clone()),
        Action::SetManualLayout { id, value } => marks::set_manual_layout(doc, *id, *value),
        Action::SetMarkVisual { id, property, def } => {
            marks::set_visual(doc, *id, property, def.clone());
        }
        Action::DisableMarkVisual { id, property } => marks::disable_visual(doc, *id, property),
        Action::ResetMarkVisual { id, property } => marks::reset_visual(doc, *id, property),
        Action::SetMarkExtent { id, old_extent, new_extent } => {
            marks::set_extent(doc, *id, old_extent, new_extent);
        }
        Action::BindScale { id, property, scale } => {
            marks::bind_scale(doc, *id, property, *scale);
        }

        Action::AddPipeline { pipeline } => data::add_pipeline(doc, pipeline),
        Action::AddDataset { dataset } => data::add_dataset(doc, dataset),
        Action::DeleteDataset { id } => data::delete_dataset(doc, *id),
        Action::AggregatePipeline { pipeline, key, dataset } => {
            data::aggregate_pipeline(doc, *pipeline, key, dataset);
        }
        Action::SummarizeAggregate { id, transform } => {
            data::summarize_aggregate(doc, *id, transform);
        }
        Action::SortDataset { id, sort } => data::sort_dataset(doc, *id, sort.clone()),
        Action::AddTransform { id, transform } => {
            data::add_transform(doc, *id, transform.clone());
        }
        Action::UpdateTransform { id, index, transform } => {
            data::update_transform(doc, *id, *index, transform.clone());
        }
        Action::ChangeFieldMType { id, field, mtype } => {
            data::change_field_mtype(doc, *id, field, *mtype);
        }

        Action::AddScale { scale } => scales::add_scale(doc, scale),
        Action::UpdateScale { id, patch } => scales::update_scale(doc, *id, patch),
        Action::DeleteScale { id } => scales::delete_scale(doc, *id),
        Action::AddScaleToGroup { scale, group } => {
            scales::add_scale_to_group(doc, *scale, *group);
        }

        Action::AddGuide { guide } => guides::add_guide(doc, guide),
        Action::DeleteGuide { id } => guides::delete_guide(doc, *id),
        Action::UpdateGuide { id, patch } => guides::update_guide(doc, *id, patch),
        Action::AddAxisToGroup { axis, group } => guides::add_axis_to_group(doc, *axis, *group),
        Action::AddLegendToGroup { legend, group } => {
            guides::add_legend_to_group(doc, *legend, *group);
        }

        Action::AddInteraction { interaction } => {
            interactions::add_interaction(doc, interaction);
        }
        Action::SetSelection { id, selection } => {
            interactions::set_selection(doc, *id, selection.clone());
        }
        Action::SetApplication { id, application } => {
            interactions::set_application(doc, *id, application.clone());
        }
        Action::RemoveApplication { id, kind } => {
            interactions::remove_application(doc, *id, kind);
        }
        Action::DeleteInteraction { id } => interactions::delete_interaction(doc, *id),

        Action::AddWidget { widget } => interactions::add_widget(doc, widget),
        Action::SetWidgetSelection { id, selection } => {
            interactions::set_widget_selection(doc, *id, selection.clone());
        }
        Action::SetWidgetApplication { id, application } => {
            interactions::set_widget_application(doc, *id, application.clone());
        }
        Action::RemoveWidgetApplication { id, kind } => {
            interactions::remove_widget_application(doc, *id, kind);
        }
        Action::DeleteWidget { id } => interactions::delete_widget(doc, *id),

        Action::InitSignal { name, value, streams } => {
            signals::init_signal(doc, name, value.clone(), streams.clone());
        }
        Action::SetSignal { name, value } => signals::set_signal(doc, name, value.clone()),
    }
}
