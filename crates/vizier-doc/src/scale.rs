//! Scale records
//!
//! A scale maps data-domain values to visual-range values. Domains are kept
//! *unresolved* — `{dataset, field}` pairs — because the equality test that
//! decides reuse-vs-create never needs materialized domain values.

use crate::ids::{DatasetId, ScaleId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Scale type, mirroring the executable format's vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleType {
    /// Continuous linear.
    Linear,
    /// Continuous logarithmic.
    Log,
    /// Continuous power.
    Pow,
    /// Continuous square-root.
    Sqrt,
    /// Continuous symmetric log.
    Symlog,
    /// Continuous time.
    Time,
    /// Continuous UTC time.
    Utc,
    /// Continuous sequential.
    Sequential,
    /// Discrete ordinal.
    Ordinal,
    /// Discrete band.
    Band,
    /// Discrete point.
    Point,
    /// Discretizing quantile.
    Quantile,
    /// Discretizing quantize.
    Quantize,
    /// Discretizing threshold.
    Threshold,
    /// Discrete binned ordinal.
    BinOrdinal,
}

/// Coarse classification used by the demonstration heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ScaleSimpleType {
    /// Invertible pixel ↔ domain mapping.
    Continuous,
    /// Enumerable domain.
    Discrete,
}

impl ScaleType {
    /// Collapse to continuous/discrete.
    #[must_use]
    pub fn simple(self) -> ScaleSimpleType {
        match self {
            Self::Linear
            | Self::Log
            | Self::Pow
            | Self::Sqrt
            | Self::Symlog
            | Self::Time
            | Self::Utc
            | Self::Sequential => ScaleSimpleType::Continuous,
            Self::Ordinal
            | Self::Band
            | Self::Point
            | Self::Quantile
            | Self::Quantize
            | Self::Threshold
            | Self::BinOrdinal => ScaleSimpleType::Discrete,
        }
    }
}

/// Scale range: the `width`/`height` sentinels or a literal range value.
#[derive(Debug, Clone, PartialEq)]
pub enum ScaleRange {
    /// Spans the owning group's width.
    Width,
    /// Spans the owning group's height.
    Height,
    /// Literal range (array, scheme name, …).
    Literal(Value),
}

impl Serialize for ScaleRange {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Width => serializer.serialize_str("width"),
            Self::Height => serializer.serialize_str("height"),
            Self::Literal(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ScaleRange {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value.as_str() {
            Some("width") => Self::Width,
            Some("height") => Self::Height,
            _ => Self::Literal(value),
        })
    }
}

/// Unresolved domain reference: a field of a live dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainRef {
    /// Backing dataset.
    pub data: DatasetId,
    /// Field within the dataset.
    pub field: String,
}

/// A mapping from data-domain values to visual-range values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    /// Entity ID.
    #[serde(rename = "_id")]
    pub id: ScaleId,
    /// Display name; sanitized on export.
    pub name: String,
    /// Scale type.
    #[serde(rename = "type")]
    pub scale_type: ScaleType,
    /// Range, if set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<ScaleRange>,
    /// Unresolved domain references.
    #[serde(rename = "_domain", default, skip_serializing_if = "Vec::is_empty")]
    pub domain: Vec<DomainRef>,
    /// Unresolved range references (rare; mirrors `_domain`).
    #[serde(rename = "_range", default, skip_serializing_if = "Vec::is_empty")]
    pub range_refs: Vec<DomainRef>,
    /// Extend the domain to human-friendly values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nice: Option<bool>,
    /// Round range values to integers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<bool>,
    /// Include zero in the domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zero: Option<bool>,
    /// Discrete scale positions points rather than bands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<bool>,
    /// Band/point padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<f64>,
}

impl Scale {
    /// New scale with a type and optional range.
    #[must_use]
    pub fn new(
        id: ScaleId,
        name: impl Into<String>,
        scale_type: ScaleType,
        range: Option<ScaleRange>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            scale_type,
            range,
            domain: Vec::new(),
            range_refs: Vec::new(),
            nice: None,
            round: None,
            zero: None,
            points: None,
            padding: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn range_sentinels_round_trip() {
        assert_eq!(serde_json::to_value(ScaleRange::Width).unwrap(), json!("width"));
        let back: ScaleRange = serde_json::from_value(json!("height")).unwrap();
        assert_eq!(back, ScaleRange::Height);
        let lit: ScaleRange = serde_json::from_value(json!([0, 100])).unwrap();
        assert_eq!(lit, ScaleRange::Literal(json!([0, 100])));
    }

    #[test]
    fn simple_classification() {
        assert_eq!(ScaleType::Linear.simple(), ScaleSimpleType::Continuous);
        assert_eq!(ScaleType::Band.simple(), ScaleSimpleType::Discrete);
        assert_eq!(ScaleType::BinOrdinal.simple(), ScaleSimpleType::Discrete);
    }

    #[test]
    fn bin_ordinal_serializes_kebab_case() {
        assert_eq!(
            serde_json::to_value(ScaleType::BinOrdinal).unwrap(),
            json!("bin-ordinal")
        );
    }
}
