//! Widget records
//!
//! A widget drives a selection through a UI control (radio, range, select)
//! instead of direct manipulation. Its signal definitions are appended to
//! the top level of the exported specification.

use crate::dataset::Column;
use crate::ids::{DatasetId, MarkId, WidgetId};
use crate::interaction::ApplicationDef;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Control kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    /// Radio buttons over distinct values.
    Radio,
    /// Numeric range slider.
    Range,
    /// Dropdown select.
    Select,
}

/// Comparison the widget's value applies against the bound field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WidgetComparator {
    /// Equality.
    #[serde(rename = "==")]
    Eq,
    /// Less than.
    #[serde(rename = "<")]
    Lt,
    /// Greater than.
    #[serde(rename = ">")]
    Gt,
    /// Less than or equal.
    #[serde(rename = "<=")]
    Le,
    /// Greater than or equal.
    #[serde(rename = ">=")]
    Ge,
}

/// Control definition of a widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSelection {
    /// Control kind.
    #[serde(rename = "type")]
    pub kind: WidgetKind,
    /// Backing signal name.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Slider step, range widgets only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// Comparison applied against the bound field.
    pub comparator: WidgetComparator,
}

/// A control-driven interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    /// Entity ID.
    #[serde(rename = "_id")]
    pub id: WidgetId,
    /// Display name.
    pub name: String,
    /// Hosting group.
    pub group_id: MarkId,
    /// Bound column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<Column>,
    /// Dataset the bound column belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<DatasetId>,
    /// Control definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<WidgetSelection>,
    /// Applications driven by the control.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<ApplicationDef>,
    /// Signal definitions exported at the top level of the spec.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<Value>,
}

impl Widget {
    /// New widget on a group.
    #[must_use]
    pub fn new(id: WidgetId, name: impl Into<String>, group_id: MarkId) -> Self {
        Self {
            id,
            name: name.into(),
            group_id,
            field: None,
            dataset_id: None,
            selection: None,
            applications: Vec::new(),
            signals: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparator_serializes_as_operator() {
        assert_eq!(
            serde_json::to_value(WidgetComparator::Le).unwrap(),
            serde_json::json!("<=")
        );
    }
}
