//! Text mark defaults and handle streams

use super::{anchor_test, test_if, HandleStreams, Mark};
use crate::encode::{EncodeValue, Encoding};
use crate::signal::{prop_signal, SignalStream, DELTA};
use indexmap::IndexMap;
use serde_json::json;

pub(super) fn default_encode() -> Encoding {
    let mut update = IndexMap::new();
    update.insert("text".into(), EncodeValue::literal(json!("Text")));
    update.insert("x".into(), EncodeValue::literal(80));
    update.insert("y".into(), EncodeValue::literal(30));
    update.insert("dx".into(), EncodeValue::literal(0));
    update.insert("dy".into(), EncodeValue::literal(0));
    update.insert("fill".into(), EncodeValue::literal(json!("#4682b4")));
    update.insert("fontSize".into(), EncodeValue::literal(14));
    update.insert("align".into(), EncodeValue::literal(json!("center")));
    update.insert("baseline".into(), EncodeValue::literal(json!("middle")));
    update
}

/// Text marks are move-only.
pub(super) fn handle_streams(mark: &Mark) -> HandleStreams {
    let id = mark.id;
    let mark_type = mark.mark_type;
    let dx = format!("{DELTA}.x");
    let dy = format!("{DELTA}.y");
    let body = anchor_test(id, "");

    let mut streams: HandleStreams = IndexMap::new();
    let x = prop_signal(id, mark_type, "x");
    streams.insert(
        x.clone(),
        vec![SignalStream {
            events: json!({ "signal": DELTA }),
            update: test_if(&body, &format!("{x} + {dx}"), &x),
        }],
    );
    let y = prop_signal(id, mark_type, "y");
    streams.insert(
        y.clone(),
        vec![SignalStream {
            events: json!({ "signal": DELTA }),
            update: test_if(&body, &format!("{y} + {dy}"), &y),
        }],
    );

    streams
}
