//! Pipeline records
//!
//! A pipeline is a data-processing lineage: one source dataset plus derived
//! aggregate datasets, keyed by the canonical group-by key. At most one
//! aggregate dataset exists per distinct key per pipeline.

use crate::ids::{DatasetId, PipelineId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Separator used to build canonical group-by keys.
const KEY_SEPARATOR: &str = "|";

/// Build the canonical aggregate key for a group-by field list.
///
/// Order-preserving: `["a", "b"]` and `["b", "a"]` are distinct keys.
#[must_use]
pub fn aggregate_key(groupby: &[String]) -> String {
    groupby.join(KEY_SEPARATOR)
}

/// A named data-processing lineage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Entity ID.
    #[serde(rename = "_id")]
    pub id: PipelineId,
    /// Display name.
    pub name: String,
    /// Source dataset.
    #[serde(rename = "_source")]
    pub source: DatasetId,
    /// Canonical group-by key → derived aggregate dataset.
    #[serde(rename = "_aggregates", default, skip_serializing_if = "IndexMap::is_empty")]
    pub aggregates: IndexMap<String, DatasetId>,
}

impl Pipeline {
    /// New pipeline around a source dataset.
    #[must_use]
    pub fn new(id: PipelineId, name: impl Into<String>, source: DatasetId) -> Self {
        Self {
            id,
            name: name.into(),
            source,
            aggregates: IndexMap::new(),
        }
    }

    /// The aggregate dataset for a group-by field list, if one exists.
    #[must_use]
    pub fn aggregate_for(&self, groupby: &[String]) -> Option<DatasetId> {
        self.aggregates.get(&aggregate_key(groupby)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_preserves_field_order() {
        let ab = aggregate_key(&["a".into(), "b".into()]);
        let ba = aggregate_key(&["b".into(), "a".into()]);
        assert_eq!(ab, "a|b");
        assert_ne!(ab, ba);
    }

    #[test]
    fn aggregate_lookup_by_fields() {
        let mut pipeline = Pipeline::new(PipelineId(1), "cars", DatasetId(2));
        pipeline.aggregates.insert("category".into(), DatasetId(9));
        assert_eq!(
            pipeline.aggregate_for(&["category".into()]),
            Some(DatasetId(9))
        );
        assert_eq!(pipeline.aggregate_for(&["other".into()]), None);
    }
}
