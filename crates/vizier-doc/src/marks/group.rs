//! Group mark defaults
//!
//! Groups have no fill or stroke by default so that marks across layered
//! groups stay individually selectable; a transparent fill is only rendered
//! when the group itself is selected.

use crate::encode::{EncodeValue, Encoding};
use indexmap::IndexMap;
use serde_json::json;

pub(super) fn default_encode() -> Encoding {
    let mut update = IndexMap::new();
    update.insert("fill".into(), EncodeValue::default());
    update.insert("stroke".into(), EncodeValue::default());
    update.insert("x".into(), EncodeValue::literal(0));
    update.insert("y".into(), EncodeValue::literal(0));
    update.insert("x2".into(), EncodeValue::parked(140));
    update.insert("y2".into(), EncodeValue::parked(140));
    update.insert("xc".into(), EncodeValue::parked(70));
    update.insert("yc".into(), EncodeValue::parked(70));
    update.insert("width".into(), EncodeValue::literal(640));
    update.insert("height".into(), EncodeValue::literal(360));
    update
}

/// Scene-sized encoding for the root group.
pub(super) fn scene_encode() -> Encoding {
    let mut update = IndexMap::new();
    update.insert("fill".into(), EncodeValue::default());
    update.insert("stroke".into(), EncodeValue::default());
    update.insert("x".into(), EncodeValue::literal(0));
    update.insert("y".into(), EncodeValue::literal(0));
    update.insert("width".into(), EncodeValue::literal(500));
    update.insert("height".into(), EncodeValue::literal(500));
    update.insert("padding".into(), EncodeValue::literal(json!("auto")));
    update.insert("background".into(), EncodeValue::literal(json!("auto")));
    update
}
