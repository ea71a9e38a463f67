//! Document model and mutation layer
//!
//! The source of truth for a chart under construction: typed records for
//! pipelines, datasets, scales, guides, marks, interactions, and widgets,
//! stored in persistent registries so every mutation yields a new
//! structurally-shared snapshot. All change flows through
//! [`Store::dispatch`]; readers (the exporter, the binding resolver) only
//! ever observe settled snapshots.

pub mod action;
pub mod dataset;
pub mod document;
pub mod encode;
pub mod error;
pub mod guide;
pub mod ids;
pub mod interaction;
pub mod marks;
pub mod pipeline;
pub mod reducers;
pub mod scale;
pub mod signal;
pub mod store;
pub mod values;
pub mod widget;

pub use action::{Action, GuidePatch, ScalePatch};
pub use document::{export_name, Document};
pub use error::{DocumentError, ImportError};
pub use ids::{
    DatasetId, GuideId, InteractionId, MarkId, PipelineId, ScaleId, WidgetId,
};
pub use store::Store;
pub use values::DataRegistry;

#[cfg(test)]
mod tests {
    use crate::dataset::Dataset;
    use crate::marks::{Mark, MarkType};
    use crate::scale::{DomainRef, Scale, ScaleRange, ScaleType};
    use crate::{DatasetId, Document, MarkId, ScaleId, Store};
    use pretty_assertions::assert_eq;

    /// The whole document survives a serde round-trip with identity and
    /// references intact.
    #[test]
    fn document_round_trips_through_serde() {
        let mut store = Store::new();
        let scene = store.create_scene();
        let (_pl, ds) = store.add_pipeline("cars", Dataset::new(DatasetId(0), "cars"));

        let mut group = Mark::new(MarkId(0), MarkType::Group);
        group.parent = Some(scene);
        let group_id = store.add_mark(group);

        let mut rect = Mark::new(MarkId(0), MarkType::Rect);
        rect.parent = Some(group_id);
        rect.from = Some(crate::marks::MarkFrom::data(ds));
        store.add_mark(rect);

        let mut scale = Scale::new(ScaleId(0), "x", ScaleType::Ordinal, Some(ScaleRange::Width));
        scale.domain.push(DomainRef {
            data: ds,
            field: "a".into(),
        });
        store.add_scale(scale);

        let doc = store.snapshot();
        let wire = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, doc);
    }
}
