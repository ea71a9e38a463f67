//! The store: dispatch, batching, invalidation
//!
//! Owns the current document snapshot, the ID counter (which deliberately
//! lives *outside* the snapshot so restoring history never reuses IDs), and
//! the bind-sequence counter that ranks competing spatial properties.
//!
//! Mutations are applied strictly in dispatch order. `begin_batch` /
//! `end_batch` bracket compound operations: `snapshot()` only advances when
//! the outermost bracket closes, so intermediate states of a cascade are
//! never observable. Nested brackets collapse into the outermost one.

use crate::action::Action;
use crate::dataset::{AggregateTransform, Dataset, MType, Sort};
use crate::document::Document;
use crate::encode::EncodeValue;
use crate::error::DocumentError;
use crate::guide::{AxisKind, Guide, GuideKind, LegendChannel};
use crate::ids::{DatasetId, GuideId, IdCounter, InteractionId, MarkId, PipelineId, ScaleId, WidgetId};
use crate::interaction::Interaction;
use crate::marks::Mark;
use crate::pipeline::{aggregate_key, Pipeline};
use crate::reducers::reduce;
use crate::scale::Scale;
use crate::widget::Widget;
use serde_json::Value;

/// Mutable owner of the document.
#[derive(Debug, Clone)]
pub struct Store {
    present: Document,
    settled: Document,
    counter: IdCounter,
    bind_seq: u64,
    invalid: bool,
    batch_depth: u32,
}

impl Store {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            present: Document::new(),
            settled: Document::new(),
            counter: IdCounter::new(),
            bind_seq: 0,
            invalid: false,
            batch_depth: 0,
        }
    }

    /// Rebuild a store around a persisted document. The counter fast
    /// forwards past every live ID so new entities never collide.
    #[must_use]
    pub fn hydrate(document: Document) -> Self {
        let mut counter = IdCounter::new();
        for id in document.pipelines.keys() {
            counter.observe(id.0);
        }
        for id in document.datasets.keys() {
            counter.observe(id.0);
        }
        for id in document.scales.keys() {
            counter.observe(id.0);
        }
        for id in document.guides.keys() {
            counter.observe(id.0);
        }
        for id in document.marks.keys() {
            counter.observe(id.0);
        }
        for id in document.interactions.keys() {
            counter.observe(id.0);
        }
        for id in document.widgets.keys() {
            counter.observe(id.0);
        }
        Self {
            settled: document.clone(),
            present: document,
            counter,
            bind_seq: 0,
            invalid: true,
            batch_depth: 0,
        }
    }

    /// The last settled snapshot. Cheap: registries are structurally
    /// shared.
    #[must_use]
    pub fn snapshot(&self) -> Document {
        self.settled.clone()
    }

    /// The in-progress document, including any open batch. Reducer-level
    /// code and the binding resolver read through this.
    #[must_use]
    pub fn present(&self) -> &Document {
        &self.present
    }

    /// Whether the compiled view is stale.
    #[must_use]
    pub fn invalid(&self) -> bool {
        self.invalid
    }

    /// Note that a recompile has consumed the current state.
    pub fn clear_invalid(&mut self) {
        self.invalid = false;
    }

    /// Apply one action.
    pub fn dispatch(&mut self, action: Action) {
        self.present = reduce(&self.present, &action);
        if action.invalidates() {
            self.invalid = true;
        }
        if self.batch_depth == 0 {
            self.settled = self.present.clone();
        }
    }

    /// Open a batch bracket.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Close a batch bracket; the outermost close publishes the snapshot.
    pub fn end_batch(&mut self) {
        self.batch_depth = self.batch_depth.saturating_sub(1);
        if self.batch_depth == 0 {
            self.settled = self.present.clone();
        }
    }

    /// Run `body` inside a batch bracket.
    pub fn batch<T>(&mut self, body: impl FnOnce(&mut Self) -> T) -> T {
        self.begin_batch();
        let out = body(self);
        self.end_batch();
        out
    }

    fn assign_id(&mut self) -> u64 {
        self.counter.assign()
    }

    /// Next bind-sequence stamp. Monotonic per document, deterministic
    /// under batching.
    pub fn next_bind_stamp(&mut self) -> u64 {
        self.bind_seq += 1;
        self.bind_seq
    }

    // ---------------------------------------------------------------
    // Creators: assign IDs, fill defaults, and dispatch in batches so
    // multi-step operations publish exactly one snapshot.
    // ---------------------------------------------------------------

    /// Install the scene root.
    pub fn create_scene(&mut self) -> MarkId {
        let id = MarkId(self.assign_id());
        self.dispatch(Action::CreateScene {
            scene: Mark::scene(id),
        });
        id
    }

    /// Add a mark, assigning its ID, default name, and parent (the closest
    /// group to the current scene when none is set). The mark's property
    /// signals are registered alongside, carrying the manipulator handle
    /// streams the editor's view listens on.
    pub fn add_mark(&mut self, mut mark: Mark) -> MarkId {
        let id = MarkId(self.assign_id());
        mark.id = id;
        if mark.name.is_none() {
            mark.name = Some(self.present.name_mark(mark.mark_type));
        }
        if mark.parent.is_none() {
            mark.parent = self.present.closest_group_id(None);
        }

        let streams = crate::marks::handle_streams(&mark);
        let encode = mark.encode.update.clone();
        self.batch(|store| {
            store.dispatch(Action::AddMark { mark });
            for (name, stream_defs) in streams {
                // vz_<type>_<id>_<prop>: seed the signal from the
                // property's default literal when one exists.
                let value = name
                    .rsplit('_')
                    .next()
                    .and_then(|prop| encode.get(prop))
                    .and_then(|entry| entry.value.clone())
                    .unwrap_or(Value::Null);
                store.dispatch(Action::InitSignal {
                    name,
                    value,
                    streams: stream_defs,
                });
            }
        });
        id
    }

    /// Delete a mark and, depth-first, every descendant.
    pub fn delete_mark(&mut self, id: MarkId) {
        let order = self.present.subtree_postorder(id);
        self.batch(|store| {
            for mark_id in order {
                store.dispatch(Action::DeleteMark { id: mark_id });
            }
        });
    }

    /// Set one visual property, stamping it with the bind sequence.
    pub fn set_mark_visual(&mut self, id: MarkId, property: &str, mut def: EncodeValue) {
        def.bound = Some(self.next_bind_stamp());
        self.dispatch(Action::SetMarkVisual {
            id,
            property: property.to_string(),
            def,
        });
    }

    /// Add a pipeline around a source dataset, assigning both IDs.
    pub fn add_pipeline(&mut self, name: &str, mut source: Dataset) -> (PipelineId, DatasetId) {
        let pl_id = PipelineId(self.assign_id());
        let ds_id = DatasetId(self.assign_id());
        source.id = ds_id;
        source.parent = Some(pl_id);
        let pipeline = Pipeline::new(pl_id, name, ds_id);
        self.batch(|store| {
            store.dispatch(Action::AddDataset { dataset: source });
            store.dispatch(Action::AddPipeline { pipeline });
        });
        (pl_id, ds_id)
    }

    /// Register a standalone dataset (no pipeline), assigning its ID.
    pub fn add_dataset(&mut self, mut dataset: Dataset) -> DatasetId {
        let id = DatasetId(self.assign_id());
        dataset.id = id;
        self.dispatch(Action::AddDataset { dataset });
        id
    }

    /// Create the aggregate dataset for a group-by key under a pipeline.
    ///
    /// The derived dataset sources the pipeline's source dataset and
    /// carries the aggregate transform; its schema lists the group-by
    /// columns (copied from the source) plus one quantitative column per
    /// summary output.
    pub fn aggregate_pipeline(
        &mut self,
        pl_id: PipelineId,
        transform: &AggregateTransform,
    ) -> Result<DatasetId, DocumentError> {
        let pipeline = self.present.pipeline(pl_id)?.clone();
        let source = self.present.dataset(pipeline.source)?.clone();
        let key = aggregate_key(&transform.groupby);

        let id = DatasetId(self.assign_id());
        let mut dataset = Dataset::new(
            id,
            format!("{}_groupby_{}", source.name, transform.groupby.join("_")),
        );
        dataset.source = Some(source.id);
        dataset.parent = Some(pl_id);
        dataset
            .transform
            .push(crate::dataset::Transform::Aggregate(transform.clone()));
        for field in &transform.groupby {
            if let Some(column) = source.schema.get(field) {
                dataset.schema.insert(field.clone(), column.clone());
            }
        }
        for name in &transform.as_fields {
            dataset.schema.insert(
                name.clone(),
                crate::dataset::Column {
                    name: name.clone(),
                    ctype: crate::dataset::ColumnType::Number,
                    mtype: MType::Quantitative,
                },
            );
        }

        self.dispatch(Action::AggregatePipeline {
            pipeline: pl_id,
            key,
            dataset,
        });
        Ok(id)
    }

    /// Merge summarize operations into an existing aggregate dataset.
    pub fn summarize_aggregate(&mut self, id: DatasetId, transform: &AggregateTransform) {
        self.dispatch(Action::SummarizeAggregate {
            id,
            transform: transform.clone(),
        });
    }

    /// Set or clear a dataset's sort directive.
    pub fn sort_dataset(&mut self, id: DatasetId, sort: Option<Sort>) {
        self.dispatch(Action::SortDataset { id, sort });
    }

    /// Add a scale, assigning its ID.
    pub fn add_scale(&mut self, mut scale: Scale) -> ScaleId {
        let id = ScaleId(self.assign_id());
        scale.id = id;
        self.dispatch(Action::AddScale { scale });
        id
    }

    /// Add an axis for a scale on a group.
    ///
    /// A group carries at most two axes per direction; a second axis of the
    /// same direction gets the swapped orient, a third is refused.
    pub fn add_axis(
        &mut self,
        axis_kind: AxisKind,
        scale: ScaleId,
        group: MarkId,
    ) -> Result<Option<GuideId>, DocumentError> {
        let group_mark = self.present.mark(group)?;
        let children = group_mark
            .children()
            .ok_or(DocumentError::NotAGroup(group))?;

        let mut same_direction = 0usize;
        for axis_id in &children.axes {
            let existing = self.present.guide(*axis_id)?;
            if existing.kind == GuideKind::Axis && existing.axis_kind == Some(axis_kind) {
                same_direction += 1;
                if existing.scale == scale {
                    return Ok(Some(*axis_id));
                }
            }
        }
        if same_direction >= 2 {
            tracing::warn!(group = %group, "group already has two {:?} axes, skipping", axis_kind);
            return Ok(None);
        }

        let id = GuideId(self.assign_id());
        let mut guide = Guide::axis(id, axis_kind, scale);
        if same_direction == 1 {
            guide.orient = guide.orient.map(crate::guide::AxisOrient::swapped);
        }
        self.batch(|store| {
            store.dispatch(Action::AddGuide { guide });
            store.dispatch(Action::AddAxisToGroup { axis: id, group });
        });
        Ok(Some(id))
    }

    /// Add a legend for a scale on a group.
    pub fn add_legend(
        &mut self,
        channel: LegendChannel,
        scale: ScaleId,
        group: MarkId,
    ) -> GuideId {
        let id = GuideId(self.assign_id());
        let guide = Guide::legend(id, channel, scale);
        self.batch(|store| {
            store.dispatch(Action::AddGuide { guide });
            store.dispatch(Action::AddLegendToGroup { legend: id, group });
        });
        id
    }

    /// Add an interaction on a group, assigning its ID.
    pub fn add_interaction(&mut self, group: MarkId) -> InteractionId {
        let id = InteractionId(self.assign_id());
        let name = format!("Interaction {}", self.present.interactions.len() + 1);
        self.dispatch(Action::AddInteraction {
            interaction: Interaction::new(id, name, group),
        });
        id
    }

    /// Add a widget on a group, assigning its ID.
    pub fn add_widget(&mut self, group: MarkId) -> WidgetId {
        let id = WidgetId(self.assign_id());
        let name = format!("Widget {}", self.present.widgets.len() + 1);
        self.dispatch(Action::AddWidget {
            widget: Widget::new(id, name, group),
        });
        id
    }

    /// Set (or create) a signal's value.
    pub fn set_signal(&mut self, name: &str, value: Value) {
        self.dispatch(Action::SetSignal {
            name: name.to_string(),
            value,
        });
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marks::MarkType;

    #[test]
    fn ids_are_never_reused_after_delete() {
        let mut store = Store::new();
        store.create_scene();
        let rect = store.add_mark(Mark::new(MarkId(0), MarkType::Rect));
        store.delete_mark(rect);
        let next = store.add_mark(Mark::new(MarkId(0), MarkType::Rect));
        assert!(next.0 > rect.0);
    }

    #[test]
    fn cascade_delete_removes_whole_subtree() {
        let mut store = Store::new();
        let scene = store.create_scene();
        let mut group = Mark::new(MarkId(0), MarkType::Group);
        group.parent = Some(scene);
        let group_id = store.add_mark(group);

        let mut inner = Mark::new(MarkId(0), MarkType::Group);
        inner.parent = Some(group_id);
        let inner_id = store.add_mark(inner);

        let mut rect = Mark::new(MarkId(0), MarkType::Rect);
        rect.parent = Some(inner_id);
        let rect_id = store.add_mark(rect);

        let before = store.snapshot().marks.len();
        store.delete_mark(group_id);
        let doc = store.snapshot();
        assert_eq!(doc.marks.len(), before - 3);

        for id in [group_id, inner_id, rect_id] {
            assert!(doc.marks.get(&id).is_none());
        }
        // No dangling references survive the cascade.
        for mark in doc.marks.values() {
            if let Some(parent) = mark.parent {
                assert!(doc.marks.get(&parent).is_some());
            }
            if let Some(children) = mark.children() {
                for child in &children.marks {
                    assert!(doc.marks.get(child).is_some());
                }
            }
        }
    }

    #[test]
    fn batches_publish_exactly_one_snapshot() {
        let mut store = Store::new();
        let scene = store.create_scene();
        let before = store.snapshot();

        store.begin_batch();
        let mut group = Mark::new(MarkId(0), MarkType::Group);
        group.parent = Some(scene);
        store.add_mark(group);
        // Still inside the bracket: observers see the pre-batch state.
        assert_eq!(store.snapshot(), before);
        store.end_batch();

        assert_ne!(store.snapshot(), before);
    }

    #[test]
    fn nested_batches_collapse_to_outermost() {
        let mut store = Store::new();
        let before = store.snapshot();
        store.begin_batch();
        store.begin_batch();
        store.create_scene();
        store.end_batch();
        assert_eq!(store.snapshot(), before);
        store.end_batch();
        assert_ne!(store.snapshot(), before);
    }

    #[test]
    fn add_mark_registers_handle_stream_signals() {
        let mut store = Store::new();
        store.create_scene();
        let rect = store.add_mark(Mark::new(MarkId(0), MarkType::Rect));
        let doc = store.snapshot();

        let x2 = doc
            .signals
            .get(&crate::signal::prop_signal(rect, MarkType::Rect, "x2"))
            .unwrap();
        assert!(!x2.streams.is_empty());
        assert_eq!(x2.value, serde_json::json!(140));

        let width = doc
            .signals
            .get(&crate::signal::prop_signal(rect, MarkType::Rect, "width"))
            .unwrap();
        assert_eq!(width.streams.len(), 2);
    }

    #[test]
    fn signal_updates_do_not_invalidate() {
        let mut store = Store::new();
        store.create_scene();
        store.clear_invalid();
        store.set_signal("vz_rect_4_x", serde_json::json!(10));
        assert!(!store.invalid());
        store.add_mark(Mark::new(MarkId(0), MarkType::Rect));
        assert!(store.invalid());
    }

    #[test]
    fn hydrate_fast_forwards_counter() {
        let mut store = Store::new();
        store.create_scene();
        store.add_mark(Mark::new(MarkId(0), MarkType::Rect));
        let doc = store.snapshot();

        let mut rebuilt = Store::hydrate(doc);
        let next = rebuilt.add_mark(Mark::new(MarkId(0), MarkType::Symbol));
        assert!(next.0 >= 3);
    }

    #[test]
    fn second_same_direction_axis_swaps_orient() {
        use crate::scale::{ScaleRange, ScaleType};
        let mut store = Store::new();
        let scene = store.create_scene();
        let s1 = store.add_scale(Scale::new(
            ScaleId(0),
            "x",
            ScaleType::Linear,
            Some(ScaleRange::Width),
        ));
        let s2 = store.add_scale(Scale::new(
            ScaleId(0),
            "x2",
            ScaleType::Linear,
            Some(ScaleRange::Width),
        ));
        let a1 = store.add_axis(AxisKind::X, s1, scene).unwrap().unwrap();
        let a2 = store.add_axis(AxisKind::X, s2, scene).unwrap().unwrap();
        let doc = store.snapshot();
        assert_eq!(
            doc.guide(a1).unwrap().orient,
            Some(crate::guide::AxisOrient::Bottom)
        );
        assert_eq!(
            doc.guide(a2).unwrap().orient,
            Some(crate::guide::AxisOrient::Top)
        );

        // A third x axis is refused.
        let s3 = store.add_scale(Scale::new(
            ScaleId(0),
            "x3",
            ScaleType::Linear,
            Some(ScaleRange::Width),
        ));
        assert!(store.add_axis(AxisKind::X, s3, scene).unwrap().is_none());
    }
}
