//! Guide records: axes and legends
//!
//! A guide visualizes exactly one scale. Axes carry an orientation; legends
//! carry the encoding channel they explain.

use crate::encode::Encoding;
use crate::ids::{GuideId, ScaleId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Guide kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideKind {
    /// Positional axis.
    Axis,
    /// Channel legend.
    Legend,
}

/// Axis direction, horizontal or vertical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

/// Axis placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisOrient {
    /// Above the plotting area.
    Top,
    /// Below the plotting area.
    Bottom,
    /// Left of the plotting area.
    Left,
    /// Right of the plotting area.
    Right,
}

impl AxisOrient {
    /// The opposite placement, used when a group already has an axis of the
    /// same direction.
    #[must_use]
    pub fn swapped(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Legend channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendChannel {
    /// Fill color.
    Fill,
    /// Stroke color.
    Stroke,
    /// Symbol size.
    Size,
    /// Symbol shape.
    Shape,
}

impl LegendChannel {
    /// Wire key under which the legend names its scale.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Fill => "fill",
            Self::Stroke => "stroke",
            Self::Size => "size",
            Self::Shape => "shape",
        }
    }
}

/// An axis or legend bound to one scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guide {
    /// Entity ID.
    #[serde(rename = "_id")]
    pub id: GuideId,
    /// Axis or legend.
    #[serde(rename = "_gtype")]
    pub kind: GuideKind,
    /// Axis direction, axes only.
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub axis_kind: Option<AxisKind>,
    /// Explained channel, legends only.
    #[serde(rename = "_channel", default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<LegendChannel>,
    /// The visualized scale.
    pub scale: ScaleId,
    /// Axis placement.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orient: Option<AxisOrient>,
    /// Guide title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Draw grid lines, axes only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<bool>,
    /// Display-property overrides, keyed by encode block
    /// (`labels`, `ticks`, `title`, …).
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub encode: IndexMap<String, Encoding>,
}

impl Guide {
    /// New axis for a scale.
    #[must_use]
    pub fn axis(id: GuideId, axis_kind: AxisKind, scale: ScaleId) -> Self {
        let orient = match axis_kind {
            AxisKind::X => AxisOrient::Bottom,
            AxisKind::Y => AxisOrient::Left,
        };
        Self {
            id,
            kind: GuideKind::Axis,
            axis_kind: Some(axis_kind),
            channel: None,
            scale,
            orient: Some(orient),
            title: None,
            grid: None,
            encode: IndexMap::new(),
        }
    }

    /// New legend for a scale on a channel.
    #[must_use]
    pub fn legend(id: GuideId, channel: LegendChannel, scale: ScaleId) -> Self {
        Self {
            id,
            kind: GuideKind::Legend,
            axis_kind: None,
            channel: Some(channel),
            scale,
            orient: None,
            title: None,
            grid: None,
            encode: IndexMap::new(),
        }
    }
}
