//! Compiled fragments
//!
//! The input shape produced by the external declarative-chart compiler: a
//! compiled output (data, scale, and mark definitions) plus a map from the
//! compiled spec's names to internal IDs, accumulated as channels bind.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use vizier_doc::marks::MarkType;
use vizier_doc::{DatasetId, MarkId, PipelineId, ScaleId};

/// Data, scale, and mark definitions emitted by the compiler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompiledOutput {
    /// Data source definitions; the primary one is named `"source"`, an
    /// optional aggregate one `"summary"`.
    #[serde(default)]
    pub data: Vec<Value>,
    /// Scale definitions, named for the channel they encode.
    #[serde(default)]
    pub scales: Vec<Value>,
    /// Mark definitions; the first is the bound mark (possibly nested in a
    /// path group for faceting).
    #[serde(default)]
    pub marks: Vec<Value>,
}

/// Compiled-spec names → internal IDs, filled in as resolution proceeds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragmentMap {
    /// Data definition name → dataset.
    #[serde(default)]
    pub data: HashMap<String, DatasetId>,
    /// Channel name → scale.
    #[serde(default)]
    pub scales: HashMap<String, ScaleId>,
    /// Mark → property → bind stamp, mirroring the document's own stamps.
    #[serde(default)]
    pub marks: HashMap<MarkId, HashMap<String, u64>>,
}

/// One channel-bind request against the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledFragment {
    /// Compiler output.
    pub output: CompiledOutput,
    /// Name → ID map.
    #[serde(default)]
    pub map: FragmentMap,
    /// Backing dataset of the bound mark.
    pub ds_id: DatasetId,
    /// Pipeline owning that dataset.
    pub pl_id: PipelineId,
    /// The mark being bound.
    pub mark_id: MarkId,
    /// The mark's variant.
    pub mark_type: MarkType,
    /// Channel being bound (`x`, `y`, `fill`, …).
    pub channel: String,
    /// Visual property receiving the bind; usually the channel itself.
    pub property: String,
}

impl CompiledFragment {
    /// The compiled data definition with the given name.
    #[must_use]
    pub fn data_def(&self, name: &str) -> Option<&Value> {
        self.output
            .data
            .iter()
            .find(|def| def.get("name").and_then(Value::as_str) == Some(name))
    }
}
