//! The document: one immutable snapshot of every primitive
//!
//! Registries are persistent ordered maps, so cloning a document is cheap
//! and every reader observes a consistent snapshot. The mark tree is a flat
//! arena — groups hold child-ID arrays, children hold a `_parent` ID — so
//! traversal is lookups plus ID walks, never owned cycles.

use crate::dataset::Dataset;
use crate::error::DocumentError;
use crate::guide::Guide;
use crate::ids::{
    DatasetId, GuideId, InteractionId, MarkId, PipelineId, ScaleId, WidgetId,
};
use crate::interaction::Interaction;
use crate::marks::{Mark, MarkType};
use crate::pipeline::Pipeline;
use crate::scale::Scale;
use crate::signal::SignalDef;
use crate::widget::Widget;
use im::OrdMap;
use serde::{Deserialize, Serialize};

/// One immutable snapshot of the chart under construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Data-processing lineages.
    pub pipelines: OrdMap<PipelineId, Pipeline>,
    /// Tabular data descriptors.
    pub datasets: OrdMap<DatasetId, Dataset>,
    /// Domain → range mappings.
    pub scales: OrdMap<ScaleId, Scale>,
    /// Axes and legends.
    pub guides: OrdMap<GuideId, Guide>,
    /// The mark arena.
    pub marks: OrdMap<MarkId, Mark>,
    /// Direct-manipulation interactions.
    pub interactions: OrdMap<InteractionId, Interaction>,
    /// Control-driven interactions.
    pub widgets: OrdMap<WidgetId, Widget>,
    /// Named property signals.
    pub signals: OrdMap<String, SignalDef>,
    /// The tree root; exactly one per document once created.
    pub scene: Option<MarkId>,
}

impl Document {
    /// Empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a mark.
    pub fn mark(&self, id: MarkId) -> Result<&Mark, DocumentError> {
        self.marks.get(&id).ok_or(DocumentError::MissingMark(id))
    }

    /// Look up a dataset.
    pub fn dataset(&self, id: DatasetId) -> Result<&Dataset, DocumentError> {
        self.datasets
            .get(&id)
            .ok_or(DocumentError::MissingDataset(id))
    }

    /// Look up a scale.
    pub fn scale(&self, id: ScaleId) -> Result<&Scale, DocumentError> {
        self.scales.get(&id).ok_or(DocumentError::MissingScale(id))
    }

    /// Look up a guide.
    pub fn guide(&self, id: GuideId) -> Result<&Guide, DocumentError> {
        self.guides.get(&id).ok_or(DocumentError::MissingGuide(id))
    }

    /// Look up a pipeline.
    pub fn pipeline(&self, id: PipelineId) -> Result<&Pipeline, DocumentError> {
        self.pipelines
            .get(&id)
            .ok_or(DocumentError::MissingPipeline(id))
    }

    /// Look up an interaction.
    pub fn interaction(&self, id: InteractionId) -> Result<&Interaction, DocumentError> {
        self.interactions
            .get(&id)
            .ok_or(DocumentError::MissingInteraction(id))
    }

    /// Look up a widget.
    pub fn widget(&self, id: WidgetId) -> Result<&Widget, DocumentError> {
        self.widgets
            .get(&id)
            .ok_or(DocumentError::MissingWidget(id))
    }

    /// The scene mark.
    pub fn scene_mark(&self) -> Result<&Mark, DocumentError> {
        let id = self.scene.ok_or(DocumentError::NoScene)?;
        self.mark(id)
    }

    /// Current value of a named signal, if registered.
    #[must_use]
    pub fn signal_value(&self, name: &str) -> Option<&serde_json::Value> {
        self.signals.get(name).map(|sg| &sg.value)
    }

    /// The parent mark of a mark, if any.
    #[must_use]
    pub fn parent_of(&self, mark: &Mark) -> Option<&Mark> {
        mark.parent.and_then(|id| self.marks.get(&id))
    }

    /// All ancestors of a mark, nearest first.
    #[must_use]
    pub fn ancestors_of(&self, id: MarkId) -> Vec<&Mark> {
        let mut out = Vec::new();
        let mut current = self.marks.get(&id).and_then(|m| self.parent_of(m));
        while let Some(mark) = current {
            out.push(mark);
            current = self.parent_of(mark);
        }
        out
    }

    /// IDs of a mark's ancestor groups, nearest first.
    #[must_use]
    pub fn parent_group_ids(&self, id: MarkId) -> Vec<MarkId> {
        self.ancestors_of(id)
            .into_iter()
            .filter(|mark| mark.is_group())
            .map(|mark| mark.id)
            .collect()
    }

    /// The nearest group that is or contains the given mark; falls back to
    /// the scene when the mark is missing.
    #[must_use]
    pub fn closest_group_id(&self, id: Option<MarkId>) -> Option<MarkId> {
        let mark = id.and_then(|id| self.marks.get(&id));
        match mark {
            None => self.scene,
            Some(mark) if mark.is_group() => Some(mark.id),
            Some(mark) => self.closest_group_id(mark.parent),
        }
    }

    /// IDs of every mark in the subtree rooted at `id`, depth-first with
    /// children before their parent — deletion order for a cascade.
    #[must_use]
    pub fn subtree_postorder(&self, id: MarkId) -> Vec<MarkId> {
        let mut out = Vec::new();
        self.collect_postorder(id, &mut out);
        out
    }

    fn collect_postorder(&self, id: MarkId, out: &mut Vec<MarkId>) {
        if let Some(children) = self.marks.get(&id).and_then(Mark::children) {
            for child in &children.marks {
                self.collect_postorder(*child, out);
            }
        }
        out.push(id);
    }

    /// Auto-generated display name for a new mark: the capitalized type
    /// plus a per-type ordinal ("Rect 1", "Rect 2", …).
    #[must_use]
    pub fn name_mark(&self, mark_type: MarkType) -> String {
        let count = self
            .marks
            .values()
            .filter(|mark| mark.mark_type == mark_type)
            .count();
        let tag = mark_type.as_str();
        let mut name = String::new();
        let mut chars = tag.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
        format!("{name} {}", count + 1)
    }
}

/// Sanitize a display name for the executable specification: whitespace
/// becomes underscores so names are valid reference tokens.
#[must_use]
pub fn export_name(name: &str) -> String {
    name.split_whitespace().collect::<Vec<_>>().join("_")
}
