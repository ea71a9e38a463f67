//! Mark records
//!
//! Marks are a closed set of variants — group, rect, symbol, line, area,
//! text — sharing one record shape; variant-specific behavior (default
//! encodings, manipulator handle streams) is dispatched by tag through the
//! capability functions below. The scene is a group with no parent.
//!
//! Marks live in one flat arena keyed by ID; groups reference children
//! through explicit ID arrays, never back-pointers.

mod area;
mod group;
mod line;
mod rect;
mod symbol;
mod text;

use crate::encode::{Encode, Encoding};
use crate::ids::{DatasetId, GuideId, InteractionId, MarkId, ScaleId, WidgetId};
use crate::signal::SignalStream;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Mark variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkType {
    /// Container mark; owns child scales, guides, and marks.
    Group,
    /// Rectangle.
    Rect,
    /// Point symbol.
    Symbol,
    /// Connected line.
    Line,
    /// Filled area.
    Area,
    /// Text label.
    Text,
}

impl MarkType {
    /// Lowercase tag, as used in wire specs and signal names.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Rect => "rect",
            Self::Symbol => "symbol",
            Self::Line => "line",
            Self::Area => "area",
            Self::Text => "text",
        }
    }
}

/// Data or mark source of a mark's items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarkFrom {
    /// Backing dataset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<DatasetId>,
    /// Backing mark (reactive geometry).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mark: Option<MarkId>,
}

impl MarkFrom {
    /// Source a mark from a dataset.
    #[must_use]
    pub fn data(id: DatasetId) -> Self {
        Self {
            data: Some(id),
            mark: None,
        }
    }
}

/// Child collections owned by a group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupChildren {
    /// Child scale IDs.
    #[serde(default)]
    pub scales: Vec<ScaleId>,
    /// Child axis IDs.
    #[serde(default)]
    pub axes: Vec<GuideId>,
    /// Child legend IDs.
    #[serde(default)]
    pub legends: Vec<GuideId>,
    /// Child mark IDs.
    #[serde(default)]
    pub marks: Vec<MarkId>,
    /// Interactions hosted by this group.
    #[serde(rename = "_interactions", default)]
    pub interactions: Vec<InteractionId>,
    /// Widgets hosted by this group.
    #[serde(rename = "_widgets", default)]
    pub widgets: Vec<WidgetId>,
    /// Suppress automatic layout growth for this group.
    #[serde(rename = "_manualLayout", default)]
    pub manual_layout: bool,
}

/// A visual primitive in the mark tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    /// Entity ID.
    #[serde(rename = "_id")]
    pub id: MarkId,
    /// Owning group (or scene); `None` only for the scene itself.
    #[serde(rename = "_parent", default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<MarkId>,
    /// Display name; sanitized on export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Variant tag.
    #[serde(rename = "type")]
    pub mark_type: MarkType,
    /// Item source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<MarkFrom>,
    /// Visual encodings.
    #[serde(default)]
    pub encode: Encode,
    /// Child collections; present iff this mark is a group. Serialized
    /// under an internal key — the exporter emits the wire child arrays
    /// itself after routing each child through its per-type exporter.
    #[serde(rename = "_group", default, skip_serializing_if = "Option::is_none")]
    pub group: Option<GroupChildren>,
}

impl Mark {
    /// New mark of the given variant, with that variant's default encoding.
    #[must_use]
    pub fn new(id: MarkId, mark_type: MarkType) -> Self {
        Self {
            id,
            parent: None,
            name: None,
            mark_type,
            from: None,
            encode: Encode {
                update: default_encode(mark_type),
            },
            group: matches!(mark_type, MarkType::Group).then(GroupChildren::default),
        }
    }

    /// The scene: a group with scene-sized defaults and no parent.
    #[must_use]
    pub fn scene(id: MarkId) -> Self {
        let mut mark = Self::new(id, MarkType::Group);
        mark.name = Some("Scene".into());
        mark.encode.update = group::scene_encode();
        mark
    }

    /// True for groups (including the scene).
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.group.is_some()
    }

    /// Group children, if this mark is a group.
    #[must_use]
    pub fn children(&self) -> Option<&GroupChildren> {
        self.group.as_ref()
    }

    /// Mutable group children, if this mark is a group.
    pub fn children_mut(&mut self) -> Option<&mut GroupChildren> {
        self.group.as_mut()
    }
}

/// Default `encode.update` block for a mark variant.
#[must_use]
pub fn default_encode(mark_type: MarkType) -> Encoding {
    match mark_type {
        MarkType::Group => group::default_encode(),
        MarkType::Rect => rect::default_encode(),
        MarkType::Symbol => symbol::default_encode(),
        MarkType::Line => line::default_encode(),
        MarkType::Area => area::default_encode(),
        MarkType::Text => text::default_encode(),
    }
}

/// Manipulator handle streams for a mark, keyed by property-signal name.
///
/// Groups reuse the rect streams (they resize the same way); text marks are
/// move-only like symbols.
#[must_use]
pub fn handle_streams(mark: &Mark) -> HandleStreams {
    match mark.mark_type {
        MarkType::Group | MarkType::Rect => rect::handle_streams(mark),
        MarkType::Symbol => symbol::handle_streams(mark),
        MarkType::Line | MarkType::Area => line::handle_streams(mark),
        MarkType::Text => text::handle_streams(mark),
    }
}

/// Property-signal name → update streams.
pub type HandleStreams = IndexMap<String, Vec<SignalStream>>;

/// Spatial axis of a mark's extent properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialAxis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

/// Role of one extent property within an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentRole {
    /// Leading edge (`x`/`y`).
    Start,
    /// Center (`xc`/`yc`).
    Center,
    /// Trailing edge (`x2`/`y2`).
    End,
    /// Span (`width`/`height`).
    Span,
}

/// One extent property of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtentDef {
    /// Role within the axis.
    pub role: ExtentRole,
    /// Encode property name.
    pub name: &'static str,
}

/// The four extent properties of an axis, in start/center/end/span order.
///
/// At most two of these may be active on a mark at any time; the binding
/// resolver enforces this by parking the least recently bound.
#[must_use]
pub fn extents(axis: SpatialAxis) -> [ExtentDef; 4] {
    match axis {
        SpatialAxis::X => [
            ExtentDef { role: ExtentRole::Start, name: "x" },
            ExtentDef { role: ExtentRole::Center, name: "xc" },
            ExtentDef { role: ExtentRole::End, name: "x2" },
            ExtentDef { role: ExtentRole::Span, name: "width" },
        ],
        SpatialAxis::Y => [
            ExtentDef { role: ExtentRole::Start, name: "y" },
            ExtentDef { role: ExtentRole::Center, name: "yc" },
            ExtentDef { role: ExtentRole::End, name: "y2" },
            ExtentDef { role: ExtentRole::Span, name: "height" },
        ],
    }
}

/// The span property name (`width`/`height`) for an axis.
#[must_use]
pub fn span_name(axis: SpatialAxis) -> &'static str {
    match axis {
        SpatialAxis::X => "width",
        SpatialAxis::Y => "height",
    }
}

/// `cond ? then : otherwise` expression helper for handle streams.
pub(crate) fn test_if(cond: &str, then: &str, otherwise: &str) -> String {
    format!("{cond} ? {then} : {otherwise}")
}

/// Expression testing whether the drag anchor grabbed this mark's handle,
/// optionally at a specific region (`left`, `top`, …).
pub(crate) fn anchor_test(id: MarkId, region: &str) -> String {
    use crate::signal::ANCHOR;
    if region.is_empty() {
        format!("{ANCHOR}.target && {ANCHOR}.target.id === {id}")
    } else {
        format!(
            "{ANCHOR}.target && {ANCHOR}.target.id === {id} && indexof({ANCHOR}.target.key, '{region}') >= 0"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_mark_carries_children() {
        let mark = Mark::new(MarkId(1), MarkType::Group);
        assert!(mark.is_group());
        assert!(mark.children().unwrap().marks.is_empty());
    }

    #[test]
    fn leaf_mark_has_no_children() {
        let mark = Mark::new(MarkId(1), MarkType::Rect);
        assert!(!mark.is_group());
    }

    #[test]
    fn group_children_serialize_under_internal_key() {
        let mark = Mark::new(MarkId(1), MarkType::Group);
        let wire = serde_json::to_value(&mark).unwrap();
        assert!(wire["_group"]["scales"].is_array());
        assert!(wire["_group"]["marks"].is_array());
        assert_eq!(wire["type"], "group");
    }

    #[test]
    fn extent_tables_cover_both_axes() {
        assert_eq!(extents(SpatialAxis::X)[3].name, "width");
        assert_eq!(extents(SpatialAxis::Y)[0].name, "y");
    }

    #[test]
    fn mark_round_trips_through_serde() {
        let mut mark = Mark::new(MarkId(3), MarkType::Rect);
        mark.parent = Some(MarkId(1));
        mark.name = Some("Rect 1".into());
        let wire = serde_json::to_value(&mark).unwrap();
        let back: Mark = serde_json::from_value(wire).unwrap();
        assert_eq!(back, mark);
    }
}
