//! Area mark defaults
//!
//! Areas carry an `orient` that decides which trailing edge survives
//! export: a horizontal area keeps `x2`, a vertical one keeps `y2`.

use crate::encode::{EncodeValue, Encoding};
use indexmap::IndexMap;
use serde_json::json;

pub(super) fn default_encode() -> Encoding {
    let mut update = IndexMap::new();
    update.insert("x2".into(), EncodeValue::literal(0));
    update.insert("y2".into(), EncodeValue::literal(0));
    update.insert("xc".into(), EncodeValue::parked(70));
    update.insert("yc".into(), EncodeValue::parked(70));
    update.insert("width".into(), EncodeValue::parked(40));
    update.insert("height".into(), EncodeValue::parked(40));
    update.insert("orient".into(), EncodeValue::literal(json!("vertical")));
    update.insert("interpolate".into(), EncodeValue::literal(json!("monotone")));
    update.insert("tension".into(), EncodeValue::literal(13));
    update.insert("fill".into(), EncodeValue::literal(json!("#55498D")));
    update
}
