//! Visual-encoding property values
//!
//! A mark's `encode.update` block maps property names (`x`, `width`,
//! `fill`, …) to [`EncodeValue`]s. A value is a literal, a signal
//! reference, a data-field reference, a scale-mediated reference, or a text
//! template; each can additionally be disabled without losing its contents,
//! which is how competing rect spatial properties are parked.

use crate::ids::ScaleId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Property name → encode value, insertion-ordered for stable export.
pub type Encoding = IndexMap<String, EncodeValue>;

/// The `encode` block of a mark or guide.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Encode {
    /// Properties evaluated on every re-render.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub update: Encoding,
}

/// One visual-encoding property value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncodeValue {
    /// Literal value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    /// Named signal reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<String>,

    /// Datum field reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    /// Parent-group property reference (`width`/`height` inheritance).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,

    /// Scale mediating this property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<ScaleId>,

    /// Use the scale's band width instead of a field lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band: Option<bool>,

    /// Pixel offset applied after scale resolution.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,

    /// Text interpolation template (`"{{datum.field}}"`), text marks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,

    /// Parked: kept in the document but stripped from exported specs.
    #[serde(rename = "_disabled", default, skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,

    /// Bind sequence stamp, set when the binding resolver writes this
    /// property. Ranks competing rect spatial properties deterministically.
    #[serde(rename = "_bound", default, skip_serializing_if = "Option::is_none")]
    pub bound: Option<u64>,
}

impl EncodeValue {
    /// Literal value.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Disabled literal value.
    #[must_use]
    pub fn parked(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            disabled: true,
            ..Self::default()
        }
    }

    /// Signal reference.
    #[must_use]
    pub fn signal_ref(name: impl Into<String>) -> Self {
        Self {
            signal: Some(name.into()),
            ..Self::default()
        }
    }

    /// Scale-mediated field reference.
    #[must_use]
    pub fn scaled_field(scale: ScaleId, field: impl Into<String>) -> Self {
        Self {
            scale: Some(scale),
            field: Some(field.into()),
            ..Self::default()
        }
    }

    /// Scale band-width reference.
    #[must_use]
    pub fn scaled_band(scale: ScaleId, offset: f64) -> Self {
        Self {
            scale: Some(scale),
            band: Some(true),
            offset: Some(offset),
            ..Self::default()
        }
    }

    /// A disabled copy of this value.
    #[must_use]
    pub fn disable(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// True when no content has been set at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.signal.is_none()
            && self.field.is_none()
            && self.group.is_none()
            && self.scale.is_none()
            && self.band.is_none()
            && self.template.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literal_round_trips() {
        let val = EncodeValue::literal(25);
        let wire = serde_json::to_value(&val).unwrap();
        assert_eq!(wire, json!({"value": 25}));
        let back: EncodeValue = serde_json::from_value(wire).unwrap();
        assert_eq!(back, val);
    }

    #[test]
    fn disabled_flag_uses_internal_key() {
        let val = EncodeValue::parked(70);
        let wire = serde_json::to_value(&val).unwrap();
        assert_eq!(wire, json!({"value": 70, "_disabled": true}));
    }

    #[test]
    fn scaled_field_serializes_scale_id_as_number() {
        let val = EncodeValue::scaled_field(ScaleId(3), "a");
        let wire = serde_json::to_value(&val).unwrap();
        assert_eq!(wire, json!({"scale": 3, "field": "a"}));
    }
}
