//! Reference-usage counters
//!
//! Tracks, per dataset and per scale, which marks and guides reference
//! them during one export. Feeds the diagnostic query surface; compilation
//! correctness never depends on it. State is per-export, so repeated
//! exports of one snapshot are structurally identical.

use std::collections::{BTreeMap, BTreeSet};
use vizier_doc::{DatasetId, GuideId, MarkId, ScaleId};

/// Usage of one dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DataCount {
    /// Marks sourcing this dataset.
    pub marks: BTreeSet<MarkId>,
    /// Scales whose domains reference this dataset.
    pub scales: BTreeSet<ScaleId>,
}

impl DataCount {
    /// Total referers.
    #[must_use]
    pub fn total(&self) -> usize {
        self.marks.len() + self.scales.len()
    }
}

/// Usage of one scale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScaleCount {
    /// Marks encoding through this scale.
    pub marks: BTreeSet<MarkId>,
    /// Guides visualizing this scale.
    pub guides: BTreeSet<GuideId>,
}

impl ScaleCount {
    /// Total referers.
    #[must_use]
    pub fn total(&self) -> usize {
        self.marks.len() + self.guides.len()
    }
}

/// All usage counters gathered during one export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Counts {
    /// Per-dataset usage.
    pub data: BTreeMap<DatasetId, DataCount>,
    /// Per-scale usage.
    pub scales: BTreeMap<ScaleId, ScaleCount>,
}

impl Counts {
    pub(crate) fn data_entry(&mut self, id: DatasetId) -> &mut DataCount {
        self.data.entry(id).or_default()
    }

    pub(crate) fn scale_entry(&mut self, id: ScaleId) -> &mut ScaleCount {
        self.scales.entry(id).or_default()
    }
}
