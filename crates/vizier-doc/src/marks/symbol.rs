//! Symbol mark defaults and handle streams

use super::{anchor_test, test_if, HandleStreams, Mark};
use crate::encode::{EncodeValue, Encoding};
use crate::signal::{prop_signal, SignalStream, DELTA};
use indexmap::IndexMap;
use serde_json::json;

pub(super) fn default_encode() -> Encoding {
    let mut update = IndexMap::new();
    update.insert("size".into(), EncodeValue::literal(100));
    update.insert("shape".into(), EncodeValue::literal(json!("circle")));
    update.insert("x".into(), EncodeValue::literal(25));
    update.insert("y".into(), EncodeValue::literal(25));
    update
}

/// Symbols move with the drag delta; size follows vertical drags on the
/// top/bottom handles (shifted to make the growth perceptible).
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
    let size = prop_signal(id, mark_type, "size");
    streams.insert(
        size.clone(),
        vec![
            SignalStream {
                events: json!({ "signal": DELTA }),
                update: test_if(&anchor_test(id, "top"), &format!("{size} - ({dy} << 5)"), &size),
            },
            SignalStream {
                events: json!({ "signal": DELTA }),
                update: test_if(&anchor_test(id, "bottom"), &format!("{size} + ({dy} << 5)"), &size),
            },
        ],
    );

    streams
}
