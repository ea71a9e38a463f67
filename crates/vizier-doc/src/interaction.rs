//! Interaction records
//!
//! An interaction is hosted by a group and pairs a *selection* (how the
//! user picks data: point clicks or an interval brush) with *applications*
//! (what the selection does: restyle a mark, pan/zoom scales, or filter
//! another group's data). Interactions are materialized into the
//! specification only at export time; the records here are pure data.

use crate::ids::{DatasetId, InteractionId, MarkId};
use crate::scale::ScaleSimpleType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Point selection cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    /// One datum at a time; click replaces.
    Single,
    /// Shift-click toggles membership.
    Multi,
}

/// Interval selection scope: which axes the brush constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalScope {
    /// Horizontal only.
    X,
    /// Vertical only.
    Y,
    /// Both axes.
    Both,
}

/// Click-to-select definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointSelection {
    /// Single or multi select.
    pub ptype: PointKind,
    /// Key field captured per click; defaults to the row identity field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Brush-drag definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalSelection {
    /// Constrained axes.
    pub scope: IntervalScope,
}

/// How the user picks data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SelectionDef {
    /// Click selection.
    Point(PointSelection),
    /// Brush selection.
    Interval(IntervalSelection),
}

/// Scale bindings of a group's first child mark, as discovered by the
/// demonstration heuristics. All fields are optional: a group with no
/// usable scales simply cannot be demonstrated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleInfo {
    /// Exported name of the x scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_scale_name: Option<String>,
    /// Domain field of the x scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_field_name: Option<String>,
    /// Continuous/discrete classification of the x scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_scale_type: Option<ScaleSimpleType>,
    /// Exported name of the y scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_scale_name: Option<String>,
    /// Domain field of the y scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_field_name: Option<String>,
    /// Continuous/discrete classification of the y scale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y_scale_type: Option<ScaleSimpleType>,
}

impl ScaleInfo {
    /// True when the x axis is usable for demonstration.
    #[must_use]
    pub fn has_x(&self) -> bool {
        self.x_scale_name.is_some() && self.x_field_name.is_some()
    }

    /// True when the y axis is usable for demonstration.
    #[must_use]
    pub fn has_y(&self) -> bool {
        self.y_scale_name.is_some() && self.y_field_name.is_some()
    }
}

/// Restyle a mark property while selected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkApplication {
    /// Exported name of the target mark.
    pub target_mark_name: String,
    /// Encode property rewritten into a conditional.
    pub property_name: String,
    /// Value applied to unselected data.
    pub default_value: Value,
    /// Whether the driving selection is an interval (brush store) rather
    /// than a point (points store).
    #[serde(default)]
    pub is_demonstrating_interval: bool,
}

/// Pan/zoom: override scale domains from the grid selection store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleApplication {
    /// Scales and fields affected.
    pub scale_info: ScaleInfo,
}

/// Filter another group's data through the selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformApplication {
    /// Exported name of the dataset being filtered.
    pub dataset_name: String,
    /// Exported name of the group whose mark is repointed.
    pub target_group_name: String,
    /// Exported name of the repointed mark.
    pub target_mark_name: String,
    /// Interval vs point selection store.
    #[serde(default)]
    pub is_demonstrating_interval: bool,
}

/// What a selection does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ApplicationDef {
    /// Conditional mark restyle.
    Mark(MarkApplication),
    /// Scale-domain override (pan/zoom).
    Scale(ScaleApplication),
    /// Cross-group filter.
    Transform(TransformApplication),
}

impl ApplicationDef {
    /// Tag used when replacing a same-kind application.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Mark(_) => "mark",
            Self::Scale(_) => "scale",
            Self::Transform(_) => "transform",
        }
    }
}

/// A direct-manipulation interaction hosted by a group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Entity ID.
    #[serde(rename = "_id")]
    pub id: InteractionId,
    /// Display name.
    pub name: String,
    /// Hosting group.
    pub group_id: MarkId,
    /// Dataset the selection tests against, when pinned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_id: Option<DatasetId>,
    /// How data is picked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionDef>,
    /// What the selection does.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applications: Vec<ApplicationDef>,
    /// Derived signal definitions, populated when the interaction is wired.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub signals: Vec<Value>,
}

impl Interaction {
    /// New interaction on a group.
    #[must_use]
    pub fn new(id: InteractionId, name: impl Into<String>, group_id: MarkId) -> Self {
        Self {
            id,
            name: name.into(),
            group_id,
            dataset_id: None,
            selection: None,
            applications: Vec::new(),
            signals: Vec::new(),
        }
    }
}
