//! Signal definitions and the internal signal namespace
//!
//! Editor-internal signals carry the `vz_` prefix. The exporter resolves
//! namespaced signal references back to their literal values when producing
//! an externally consumable specification, so the prefix never leaks.

use crate::ids::MarkId;
use crate::marks::MarkType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Internal signal namespace prefix.
pub const NS: &str = "vz";

/// Interaction-mode signal (idle handles / dragging / channel binding).
pub const MODE: &str = "vz_mode";
/// Drag delta signal fed by manipulator streams.
pub const DELTA: &str = "vz_delta";
/// Drag anchor signal identifying the grabbed manipulator.
pub const ANCHOR: &str = "vz_anchor";
/// Currently hovered manipulator cell.
pub const CELL: &str = "vz_cell";
/// Mouse position signal.
pub const MOUSE: &str = "vz_mouse";
/// Currently selected scenegraph item.
pub const SELECTED: &str = "vz_selected";

/// Prefix a name into the internal namespace.
#[must_use]
pub fn ns(name: &str) -> String {
    format!("{NS}_{name}")
}

/// True when a signal name belongs to the internal namespace.
#[must_use]
pub fn is_internal(name: &str) -> bool {
    name.starts_with(NS)
}

/// Name of the property signal backing a mark's visual property.
#[must_use]
pub fn prop_signal(id: MarkId, mark_type: MarkType, property: &str) -> String {
    format!("{NS}_{}_{id}_{property}", mark_type.as_str())
}

/// One event-driven update rule of a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalStream {
    /// Event source selector.
    pub events: Value,
    /// Update expression.
    pub update: String,
}

/// A named signal definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalDef {
    /// Signal name.
    pub name: String,
    /// Initial/current value.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub value: Value,
    /// Event-driven update rules.
    #[serde(rename = "on", default, skip_serializing_if = "Vec::is_empty")]
    pub streams: Vec<SignalStream>,
    /// Registration order, used to emit signals deterministically.
    #[serde(rename = "_idx")]
    pub idx: u64,
}

impl SignalDef {
    /// New value-only signal.
    #[must_use]
    pub fn new(name: impl Into<String>, value: Value, idx: u64) -> Self {
        Self {
            name: name.into(),
            value,
            streams: Vec::new(),
            idx,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prop_signal_name_shape() {
        assert_eq!(
            prop_signal(MarkId(4), MarkType::Rect, "x"),
            "vz_rect_4_x"
        );
    }

    #[test]
    fn namespace_detection() {
        assert!(is_internal("vz_rect_4_x"));
        assert!(is_internal(MODE));
        assert!(!is_internal("brush_x"));
    }
}
