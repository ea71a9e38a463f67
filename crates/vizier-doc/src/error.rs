//! Error types for the document model
//!
//! Two families: integrity errors (a reference that should resolve does
//! not — these indicate a bug in cascade logic upstream and are not
//! recoverable locally), and import validation errors (surfaced to the
//! caller; nothing is registered on failure).

use crate::ids::{DatasetId, GuideId, InteractionId, MarkId, PipelineId, ScaleId, WidgetId};

/// Document-model integrity errors.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// A mark ID did not resolve to a live entity.
    #[error("no mark with id {0}")]
    MissingMark(MarkId),

    /// A dataset ID did not resolve to a live entity.
    #[error("no dataset with id {0}")]
    MissingDataset(DatasetId),

    /// A scale ID did not resolve to a live entity.
    #[error("no scale with id {0}")]
    MissingScale(ScaleId),

    /// A guide ID did not resolve to a live entity.
    #[error("no guide with id {0}")]
    MissingGuide(GuideId),

    /// A pipeline ID did not resolve to a live entity.
    #[error("no pipeline with id {0}")]
    MissingPipeline(PipelineId),

    /// An interaction ID did not resolve to a live entity.
    #[error("no interaction with id {0}")]
    MissingInteraction(InteractionId),

    /// A widget ID did not resolve to a live entity.
    #[error("no widget with id {0}")]
    MissingWidget(WidgetId),

    /// A mark was used where a group was required.
    #[error("mark {0} is not a group")]
    NotAGroup(MarkId),

    /// The document has no scene yet.
    #[error("document has no scene")]
    NoScene,
}

/// Import validation errors.
///
/// An import either registers every row or none of them.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// A row was not a JSON object.
    #[error("row {index} is not an object")]
    NotTabular {
        /// Zero-based row index.
        index: usize,
    },

    /// No rows were supplied.
    #[error("dataset is empty")]
    Empty,

    /// A field held incompatible value kinds across rows.
    #[error("field {field:?} mixes {first} and {second} values")]
    MixedTypes {
        /// Offending field name.
        field: String,
        /// Kind seen first.
        first: &'static str,
        /// Conflicting kind.
        second: &'static str,
    },
}
