//! Mutation actions
//!
//! The only way a document changes. Every variant is pure data; the
//! reducers in [`crate::reducers`] apply them to produce a new snapshot.
//! Compound operations (cascading deletes, add-and-attach) are expanded
//! into batches of these primitives by the [`Store`](crate::store::Store)
//! creators, so reducers stay single-step.

use crate::dataset::{AggregateTransform, Dataset, MType, Sort, Transform};
use crate::encode::EncodeValue;
use crate::guide::{AxisOrient, Guide};
use crate::ids::{DatasetId, GuideId, InteractionId, MarkId, PipelineId, ScaleId, WidgetId};
use crate::interaction::{ApplicationDef, Interaction, SelectionDef};
use crate::marks::{Mark, MarkFrom};
use crate::pipeline::Pipeline;
use crate::scale::{DomainRef, Scale, ScaleRange, ScaleType};
use crate::widget::{Widget, WidgetSelection};
use serde_json::Value;

/// Partial update of a scale.
#[derive(Debug, Clone, PartialEq)]
pub enum ScalePatch {
    /// Rename.
    Name(String),
    /// Change type.
    ScaleType(ScaleType),
    /// Replace range.
    Range(Option<ScaleRange>),
    /// Replace unresolved domain.
    Domain(Vec<DomainRef>),
    /// Nice flag.
    Nice(Option<bool>),
    /// Round flag.
    Round(Option<bool>),
    /// Zero flag.
    Zero(Option<bool>),
    /// Points flag.
    Points(Option<bool>),
    /// Padding.
    Padding(Option<f64>),
}

/// Partial update of a guide.
#[derive(Debug, Clone, PartialEq)]
pub enum GuidePatch {
    /// Retitle.
    Title(Option<String>),
    /// Reorient an axis.
    Orient(AxisOrient),
    /// Toggle grid lines.
    Grid(Option<bool>),
}

/// One primitive document mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Install the scene root.
    CreateScene {
        /// The scene mark.
        scene: Mark,
    },
    /// Insert a mark and attach it to its parent's child list.
    AddMark {
        /// Fully-initialized mark (ID and parent already assigned).
        mark: Mark,
    },
    /// Remove one mark and detach it from its parent. Cascades are
    /// expanded into batches of these by the store.
    DeleteMark {
        /// Mark to remove.
        id: MarkId,
    },
    /// Reparent a mark.
    SetParent {
        /// Child being moved.
        child: MarkId,
        /// New parent group.
        parent: MarkId,
    },
    /// Rename a mark.
    UpdateMarkName {
        /// Target mark.
        id: MarkId,
        /// New display name.
        name: String,
    },
    /// Re-source a mark.
    UpdateMarkFrom {
        /// Target mark.
        id: MarkId,
        /// New source, or none.
        from: Option<MarkFrom>,
    },
    /// Toggle manual layout on a group.
    SetManualLayout {
        /// Target group.
        id: MarkId,
        /// New flag value.
        value: bool,
    },
    /// Set one visual property.
    SetMarkVisual {
        /// Target mark.
        id: MarkId,
        /// Property name.
        property: String,
        /// New value, bind stamp already assigned.
        def: EncodeValue,
    },
    /// Park a visual property without losing its contents.
    DisableMarkVisual {
        /// Target mark.
        id: MarkId,
        /// Property name.
        property: String,
    },
    /// Restore a visual property to its variant default.
    ResetMarkVisual {
        /// Target mark.
        id: MarkId,
        /// Property name.
        property: String,
    },
    /// Swap which extent property of an axis is active.
    SetMarkExtent {
        /// Target mark.
        id: MarkId,
        /// Property being parked.
        old_extent: String,
        /// Property being activated.
        new_extent: String,
    },
    /// Bind a property to a scale.
    BindScale {
        /// Target mark.
        id: MarkId,
        /// Property name.
        property: String,
        /// Mediating scale.
        scale: ScaleId,
    },

    /// Register a pipeline.
    AddPipeline {
        /// Fully-initialized pipeline.
        pipeline: Pipeline,
    },
    /// Register a dataset.
    AddDataset {
        /// Fully-initialized dataset.
        dataset: Dataset,
    },
    /// Remove a dataset.
    DeleteDataset {
        /// Dataset to remove.
        id: DatasetId,
    },
    /// Record a new aggregate dataset under its pipeline key.
    AggregatePipeline {
        /// Owning pipeline.
        pipeline: PipelineId,
        /// Canonical group-by key.
        key: String,
        /// The derived dataset.
        dataset: Dataset,
    },
    /// Merge summarize operations into an existing aggregate dataset.
    SummarizeAggregate {
        /// The aggregate dataset.
        id: DatasetId,
        /// Operations to merge.
        transform: AggregateTransform,
    },
    /// Set or clear a dataset's sort directive.
    SortDataset {
        /// Target dataset.
        id: DatasetId,
        /// New sort, or none.
        sort: Option<Sort>,
    },
    /// Append a transform.
    AddTransform {
        /// Target dataset.
        id: DatasetId,
        /// Transform to append.
        transform: Transform,
    },
    /// Replace a transform in place.
    UpdateTransform {
        /// Target dataset.
        id: DatasetId,
        /// Index into the transform list.
        index: usize,
        /// Replacement transform.
        transform: Transform,
    },
    /// Override a column's measurement type.
    ChangeFieldMType {
        /// Target dataset.
        id: DatasetId,
        /// Column name.
        field: String,
        /// New measurement type.
        mtype: MType,
    },

    /// Register a scale.
    AddScale {
        /// Fully-initialized scale.
        scale: Scale,
    },
    /// Patch a scale.
    UpdateScale {
        /// Target scale.
        id: ScaleId,
        /// The change.
        patch: ScalePatch,
    },
    /// Remove a scale and detach it from every group.
    DeleteScale {
        /// Scale to remove.
        id: ScaleId,
    },
    /// Attach a scale to a group's scale list.
    AddScaleToGroup {
        /// Scale to attach.
        scale: ScaleId,
        /// Target group.
        group: MarkId,
    },

    /// Register a guide.
    AddGuide {
        /// Fully-initialized guide.
        guide: Guide,
    },
    /// Remove a guide and detach it from every group.
    DeleteGuide {
        /// Guide to remove.
        id: GuideId,
    },
    /// Patch a guide.
    UpdateGuide {
        /// Target guide.
        id: GuideId,
        /// The change.
        patch: GuidePatch,
    },
    /// Attach an axis to a group.
    AddAxisToGroup {
        /// Axis to attach.
        axis: GuideId,
        /// Target group.
        group: MarkId,
    },
    /// Attach a legend to a group.
    AddLegendToGroup {
        /// Legend to attach.
        legend: GuideId,
        /// Target group.
        group: MarkId,
    },

    /// Register an interaction and attach it to its group.
    AddInteraction {
        /// Fully-initialized interaction.
        interaction: Interaction,
    },
    /// Set an interaction's selection.
    SetSelection {
        /// Target interaction.
        id: InteractionId,
        /// New selection.
        selection: SelectionDef,
    },
    /// Add or replace (by kind) an interaction's application.
    SetApplication {
        /// Target interaction.
        id: InteractionId,
        /// New application.
        application: ApplicationDef,
    },
    /// Remove an application by kind.
    RemoveApplication {
        /// Target interaction.
        id: InteractionId,
        /// Kind tag (`mark`/`scale`/`transform`).
        kind: String,
    },
    /// Remove an interaction and detach it from its group.
    DeleteInteraction {
        /// Interaction to remove.
        id: InteractionId,
    },

    /// Register a widget and attach it to its group.
    AddWidget {
        /// Fully-initialized widget.
        widget: Widget,
    },
    /// Set a widget's control definition.
    SetWidgetSelection {
        /// Target widget.
        id: WidgetId,
        /// New control definition.
        selection: WidgetSelection,
    },
    /// Add or replace (by kind) a widget's application.
    SetWidgetApplication {
        /// Target widget.
        id: WidgetId,
        /// New application.
        application: ApplicationDef,
    },
    /// Remove a widget application by kind.
    RemoveWidgetApplication {
        /// Target widget.
        id: WidgetId,
        /// Kind tag.
        kind: String,
    },
    /// Remove a widget and detach it from its group.
    DeleteWidget {
        /// Widget to remove.
        id: WidgetId,
    },

    /// Register a signal definition if absent.
    InitSignal {
        /// Signal name.
        name: String,
        /// Initial value.
        value: Value,
        /// Event-driven update rules.
        streams: Vec<crate::signal::SignalStream>,
    },
    /// Set (or create) a signal's current value.
    SetSignal {
        /// Signal name.
        name: String,
        /// New value.
        value: Value,
    },
}

impl Action {
    /// Whether this action structurally invalidates the compiled view.
    ///
    /// Signal value updates and measurement-type overrides re-render
    /// without a rebuild; everything else forces a recompile.
    #[must_use]
    pub fn invalidates(&self) -> bool {
        !matches!(
            self,
            Self::SetSignal { .. } | Self::ChangeFieldMType { .. }
        )
    }
}
