//! Dataset records
//!
//! A dataset is a tabular-data descriptor: raw (imported) or derived
//! (aggregate of a pipeline source). Raw row values live in the
//! [`DataRegistry`](crate::values::DataRegistry), not in the snapshot.

use crate::ids::{DatasetId, PipelineId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Measurement type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MType {
    /// Categorical.
    Nominal,
    /// Ordered categorical.
    Ordinal,
    /// Numeric.
    Quantitative,
    /// Date/time.
    Temporal,
}

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// UTF-8 text.
    String,
    /// Double-precision number.
    Number,
    /// True/false.
    Boolean,
    /// Date/time.
    Date,
}

/// Inferred schema entry for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Column name as it appears in the rows.
    pub name: String,
    /// Storage type.
    #[serde(rename = "type")]
    pub ctype: ColumnType,
    /// Measurement type, user-overridable.
    pub mtype: MType,
}

/// Column name → schema entry.
pub type Schema = IndexMap<String, Column>;

/// Serialization format of an external data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatType {
    /// JSON array of objects.
    Json,
    /// Comma-separated.
    Csv,
    /// Tab-separated.
    Tsv,
}

/// Data format descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFormat {
    /// Wire format.
    #[serde(rename = "type")]
    pub ftype: FormatType,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// Dataset-level sort directive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    /// Field to order by.
    pub field: String,
    /// Direction.
    pub order: SortOrder,
}

/// Aggregate operation applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateOp {
    /// Row count.
    Count,
    /// Sum.
    Sum,
    /// Arithmetic mean.
    Mean,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// Median.
    Median,
    /// Sample variance.
    Variance,
    /// Sample standard deviation.
    Stdev,
}

/// Aggregate transform: group rows and summarize fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateTransform {
    /// Group-by fields, order-preserving.
    pub groupby: Vec<String>,
    /// Summary operations, parallel to `fields`.
    #[serde(default)]
    pub ops: Vec<AggregateOp>,
    /// Fields being summarized, parallel to `ops`.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Output field names, parallel to `ops`.
    #[serde(rename = "as", default)]
    pub as_fields: Vec<String>,
}

impl AggregateTransform {
    /// Merge another set of summarize operations into this transform,
    /// skipping (op, field) pairs already present.
    pub fn merge(&mut self, other: &AggregateTransform) {
        for (idx, op) in other.ops.iter().enumerate() {
            let field = other.fields.get(idx);
            let present = self
                .ops
                .iter()
                .zip(self.fields.iter())
                .any(|(o, f)| o == op && Some(f) == field);
            if present {
                continue;
            }
            self.ops.push(*op);
            if let Some(field) = field {
                self.fields.push(field.clone());
            }
            if let Some(name) = other.as_fields.get(idx) {
                self.as_fields.push(name.clone());
            }
        }
    }
}

/// A single data transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Transform {
    /// Group-and-summarize.
    Aggregate(AggregateTransform),
    /// Row filter.
    Filter {
        /// Predicate expression over `datum`.
        expr: String,
    },
    /// Derived field.
    Formula {
        /// Value expression over `datum`.
        expr: String,
        /// Output field name.
        #[serde(rename = "as")]
        as_field: String,
    },
}

/// A tabular data descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Entity ID.
    #[serde(rename = "_id")]
    pub id: DatasetId,
    /// Display name; sanitized on export.
    pub name: String,
    /// Upstream dataset this one derives from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DatasetId>,
    /// External URL source, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Wire format of the external source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<DataFormat>,
    /// Transform list applied in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transform: Vec<Transform>,
    /// Inferred column schema.
    #[serde(rename = "_schema", default, skip_serializing_if = "IndexMap::is_empty")]
    pub schema: Schema,
    /// Owning pipeline.
    #[serde(rename = "_parent", default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<PipelineId>,
    /// Editor-level sort directive, exported as a sort transform.
    #[serde(rename = "_sort", default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<Sort>,
}

impl Dataset {
    /// Minimal dataset with a name; everything else defaults.
    #[must_use]
    pub fn new(id: DatasetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            source: None,
            url: None,
            format: None,
            transform: Vec::new(),
            schema: IndexMap::new(),
            parent: None,
            sort: None,
        }
    }

    /// The aggregate transform carried by a derived dataset, if any.
    #[must_use]
    pub fn aggregate(&self) -> Option<&AggregateTransform> {
        self.transform.iter().find_map(|tx| match tx {
            Transform::Aggregate(agg) => Some(agg),
            _ => None,
        })
    }

    /// Mutable access to the aggregate transform.
    pub fn aggregate_mut(&mut self) -> Option<&mut AggregateTransform> {
        self.transform.iter_mut().find_map(|tx| match tx {
            Transform::Aggregate(agg) => Some(agg),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agg(ops: &[AggregateOp], fields: &[&str]) -> AggregateTransform {
        AggregateTransform {
            groupby: vec!["category".into()],
            ops: ops.to_vec(),
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
            as_fields: Vec::new(),
        }
    }

    #[test]
    fn merge_skips_duplicate_ops() {
        let mut base = agg(&[AggregateOp::Mean], &["price"]);
        base.merge(&agg(&[AggregateOp::Mean, AggregateOp::Sum], &["price", "price"]));
        assert_eq!(base.ops, vec![AggregateOp::Mean, AggregateOp::Sum]);
        assert_eq!(base.fields, vec!["price", "price"]);
    }

    #[test]
    fn transform_tags_by_type() {
        let tx = Transform::Filter { expr: "datum.a > 2".into() };
        let wire = serde_json::to_value(&tx).unwrap();
        assert_eq!(wire["type"], "filter");
        assert_eq!(wire["expr"], "datum.a > 2");
    }
}
