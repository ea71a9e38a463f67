//! Layout growth for discrete spatial scales
//!
//! A new ordinal scale spanning width or height needs room for every band:
//! the minimum panel size is `(distinct domain values + 1) × minimum band
//! size`. The scene only ever grows — shrinking on rebind would fight the
//! user's own sizing.

use crate::error::BindError;
use serde_json::json;
use vizier_doc::encode::EncodeValue;
use vizier_doc::marks::{span_name, SpatialAxis};
use vizier_doc::scale::{Scale, ScaleRange, ScaleType};
use vizier_doc::{DataRegistry, Document, MarkId, Store};

/// Minimum pixel span reserved per discrete domain value.
pub(crate) const MIN_BAND_SIZE: f64 = 21.0;

/// Grow the scene (and its automatically laid out descendant groups) if
/// the new scale needs more room than the current span provides.
pub(crate) fn compute_layout(
    store: &mut Store,
    data: &DataRegistry,
    scale: &Scale,
) -> Result<(), BindError> {
    let doc = store.present().clone();
    let Some(scene_id) = doc.scene else {
        return Ok(());
    };
    let scene = doc.mark(scene_id)?;
    if scene
        .children()
        .is_some_and(|children| children.manual_layout)
    {
        return Ok(());
    }

    if !matches!(scale.scale_type, ScaleType::Ordinal | ScaleType::Band) {
        return Ok(());
    }
    let axis = match scale.range {
        Some(ScaleRange::Width) => SpatialAxis::X,
        Some(ScaleRange::Height) => SpatialAxis::Y,
        _ => return Ok(()),
    };

    let distinct: usize = scale
        .domain
        .iter()
        .map(|domain_ref| data.distinct_count(&doc, domain_ref.data, &domain_ref.field))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let min_size = (distinct as f64 + 1.0) * MIN_BAND_SIZE;

    let current = scene
        .encode
        .update
        .get(span_name(axis))
        .and_then(|entry| entry.value.as_ref())
        .and_then(serde_json::Value::as_f64)
        .unwrap_or(0.0);
    if current < min_size {
        resize(store, &doc, scene_id, axis, min_size)?;
    }
    Ok(())
}

fn resize(
    store: &mut Store,
    doc: &Document,
    mark_id: MarkId,
    axis: SpatialAxis,
    size: f64,
) -> Result<(), BindError> {
    let mark = doc.mark(mark_id)?;
    let span = span_name(axis);

    if Some(mark_id) == doc.scene {
        store.set_mark_visual(mark_id, span, EncodeValue::literal(json!(size)));
    } else if let Some(signal) = mark
        .encode
        .update
        .get(span)
        .and_then(|entry| entry.signal.clone())
    {
        // Group spans driven by data stay untouched; only signal-driven
        // spans follow the layout.
        store.set_signal(&signal, json!(size));
    }

    if let Some(children) = mark.children() {
        for child_id in children.marks.clone() {
            let child = doc.mark(child_id)?;
            let is_auto_group = child
                .children()
                .is_some_and(|children| !children.manual_layout);
            if is_auto_group {
                resize(store, doc, child_id, axis, size)?;
            }
        }
    }
    Ok(())
}
