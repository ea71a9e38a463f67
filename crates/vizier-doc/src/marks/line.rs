//! Line mark defaults and handle streams

use super::{anchor_test, test_if, HandleStreams, Mark};
use crate::encode::{EncodeValue, Encoding};
use crate::signal::{prop_signal, SignalStream, DELTA};
use indexmap::IndexMap;
use serde_json::json;

pub(super) fn default_encode() -> Encoding {
    let mut update = IndexMap::new();
    update.insert("stroke".into(), EncodeValue::literal(json!("#000000")));
    update.insert("strokeWidth".into(), EncodeValue::literal(3));
    update.insert("tension".into(), EncodeValue::literal(13));
    update.insert("interpolate".into(), EncodeValue::literal(json!("monotone")));
    update
}

/// Path marks (line/area) only translate; their shape is data-driven.
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
