//! Rect mark defaults and handle streams

use super::{anchor_test, test_if, HandleStreams, Mark};
use crate::encode::{EncodeValue, Encoding};
use crate::signal::{prop_signal, SignalStream, DELTA};
use indexmap::IndexMap;
use serde_json::json;

pub(super) fn default_encode() -> Encoding {
    let mut update = IndexMap::new();
    update.insert("x2".into(), EncodeValue::literal(140));
    update.insert("y2".into(), EncodeValue::literal(140));
    update.insert("xc".into(), EncodeValue::parked(70));
    update.insert("yc".into(), EncodeValue::parked(70));
    update.insert("width".into(), EncodeValue::parked(40));
    update.insert("height".into(), EncodeValue::parked(40));
    update
}

/// Handle streams for rect-shaped marks: each spatial property follows the
/// drag delta when its edge or the mark body is the anchor target.
pub(super) fn handle_streams(mark: &Mark) -> HandleStreams {
    let id = mark.id;
    let mark_type = mark.mark_type;
    let dx = format!("{DELTA}.x");
    let dy = format!("{DELTA}.y");
    let body = anchor_test(id, "");

    let mut streams: HandleStreams = IndexMap::new();
    let mut edge = |prop: &str, region: &str, delta: &str| {
        let sg = prop_signal(id, mark_type, prop);
        let cond = format!("{body} || {}", anchor_test(id, region));
        let update = test_if(&cond, &format!("{sg} + {delta}"), &sg);
        streams.insert(
            sg,
            vec![SignalStream {
                events: json!({ "signal": DELTA }),
                update,
            }],
        );
    };

    edge("x", "left", &dx);
    edge("xc", "left", &dx);
    edge("x2", "right", &dx);
    edge("y", "top", &dy);
    edge("yc", "top", &dy);
    edge("y2", "bottom", &dy);

    let width = prop_signal(id, mark_type, "width");
    streams.insert(
        width.clone(),
        vec![
            SignalStream {
                events: json!({ "signal": DELTA }),
                update: test_if(&anchor_test(id, "left"), &format!("{width} - {dx}"), &width),
            },
            SignalStream {
                events: json!({ "signal": DELTA }),
                update: test_if(&anchor_test(id, "right"), &format!("{width} + {dx}"), &width),
            },
        ],
    );
    let height = prop_signal(id, mark_type, "height");
    streams.insert(
        height.clone(),
        vec![
            SignalStream {
                events: json!({ "signal": DELTA }),
                update: test_if(&anchor_test(id, "top"), &format!("{height} - {dy}"), &height),
            },
            SignalStream {
                events: json!({ "signal": DELTA }),
                update: test_if(&anchor_test(id, "bottom"), &format!("{height} + {dy}"), &height),
            },
        ],
    );

    streams
}
