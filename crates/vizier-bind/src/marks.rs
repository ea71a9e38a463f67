//! Mark resolution
//!
//! Maps a compiled mark's visual-property definitions onto the internal
//! mark. Two channel shapes are special-cased: spatial channels of rect
//! marks (the compiler emits center+span pairs, the document prefers
//! start+span, and at most two extent properties per axis may be active)
//! and the text channel of text marks (field binds become interpolation
//! templates).

use crate::error::BindError;
use crate::fragment::CompiledFragment;
use serde_json::Value;
use vizier_doc::action::Action;
use vizier_doc::encode::EncodeValue;
use vizier_doc::marks::{extents, span_name, MarkFrom, MarkType, SpatialAxis};
use vizier_doc::signal::prop_signal;
use vizier_doc::Store;

/// Resolve the compiled mark definition onto the internal mark.
pub(crate) fn resolve_marks(
    store: &mut Store,
    fragment: &mut CompiledFragment,
) -> Result<(), BindError> {
    let Some(mut def) = fragment.output.marks.first().cloned() else {
        tracing::warn!("fragment carries no mark definition, skipping bind");
        return Ok(());
    };
    // Path marks may be nested in a group for faceting.
    if def["type"] == "group"
        && def["name"]
            .as_str()
            .is_some_and(|name| name.contains("pathgroup"))
    {
        def = def["marks"][0].clone();
    }

    let update = def["encode"]["update"].clone();
    let channel = fragment.channel.clone();
    let spatial = channel == "x" || channel == "y";

    if fragment.mark_type == MarkType::Rect && spatial {
        rect_spatial(store, fragment, &update)?;
    } else if fragment.mark_type == MarkType::Text && channel == "text" {
        text_template(store, fragment, &update);
    } else {
        let property = fragment.property.clone();
        bind_property(store, fragment, &update, &property);
    }

    if let Some(from_data) = def["from"]["data"].as_str() {
        if let Some(ds_id) = fragment.map.data.get(from_data).copied() {
            store.dispatch(Action::UpdateMarkFrom {
                id: fragment.mark_id,
                from: Some(MarkFrom::data(ds_id)),
            });
        }
    }
    Ok(())
}

/// Bind one property from the compiled update block.
fn bind_property(
    store: &mut Store,
    fragment: &mut CompiledFragment,
    update: &Value,
    property: &str,
) {
    // Compilers emit stroke encodings under fill for some mark shapes.
    let def = if property == "stroke" {
        update
            .get("stroke")
            .or_else(|| update.get("fill"))
            .cloned()
    } else {
        update.get(property).cloned()
    };
    let Some(def) = def else {
        tracing::warn!(property, "compiled mark has no definition for property, skipping");
        return;
    };
    bind_def(store, fragment, property, &def);
}

/// Bind an explicit definition under the given property name.
fn bind_def(store: &mut Store, fragment: &mut CompiledFragment, property: &str, def: &Value) {
    let mut value = EncodeValue::default();

    if let Some(scale_name) = def.get("scale").and_then(Value::as_str) {
        match fragment.map.scales.get(scale_name) {
            Some(scale_id) => value.scale = Some(*scale_id),
            None => {
                tracing::warn!(
                    scale = scale_name,
                    property,
                    "compiled scale reference did not resolve, skipping bind"
                );
                return;
            }
        }
    }
    if let Some(field) = def.get("field").and_then(Value::as_str) {
        value.field = Some(field.to_string());
    }
    if let Some(band) = def.get("band").and_then(Value::as_bool) {
        value.band = Some(band);
    }
    if let Some(offset) = def.get("offset").and_then(Value::as_f64) {
        value.offset = Some(offset);
    }
    if let Some(literal) = def.get("value") {
        // Literals become named signals so the value stays independently
        // tunable in the editor.
        let signal = prop_signal(fragment.mark_id, fragment.mark_type, property);
        store.set_signal(&signal, literal.clone());
        value.signal = Some(signal);
    }

    let stamp = {
        store.set_mark_visual(fragment.mark_id, property, value);
        store
            .present()
            .mark(fragment.mark_id)
            .ok()
            .and_then(|mark| mark.encode.update.get(property))
            .and_then(|entry| entry.bound)
            .unwrap_or(0)
    };
    fragment
        .map
        .marks
        .entry(fragment.mark_id)
        .or_default()
        .insert(property.to_string(), stamp);
}

/// Spatial channels of rect marks.
///
/// Enforces the extent invariant — at most two of {start, center, end,
/// span} active per axis — by ranking the competing properties by bind
/// stamp and parking all but the most recent survivor, then remaps
/// center+span output to the preferred start+span form.
fn rect_spatial(
    store: &mut Store,
    fragment: &mut CompiledFragment,
    update: &Value,
) -> Result<(), BindError> {
    let channel = fragment.channel.clone();
    let property = fragment.property.clone();
    let axis = if channel == "x" { SpatialAxis::X } else { SpatialAxis::Y };
    let max = format!("{channel}2");
    let center = format!("{channel}c");
    let span = span_name(axis);
    let extent_defs = extents(axis);

    if property != format!("{channel}+") {
        let mark = store.present().mark(fragment.mark_id)?.clone();
        // Rank by most-recent bind; the stable sort keeps table order for
        // never-bound properties, so ties are deterministic.
        let mut ranked: Vec<(&'static str, u64)> = extent_defs
            .iter()
            .map(|ext| {
                let stamp = mark
                    .encode
                    .update
                    .get(ext.name)
                    .and_then(|entry| entry.bound)
                    .unwrap_or(0);
                (ext.name, stamp)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));

        let mut kept = 0usize;
        for (name, _) in ranked {
            if name == property {
                continue;
            }
            let active = mark
                .encode
                .update
                .get(name)
                .is_some_and(|entry| !entry.disabled);
            if kept >= 1 {
                store.dispatch(Action::DisableMarkVisual {
                    id: fragment.mark_id,
                    property: name.to_string(),
                });
            } else if active {
                kept += 1;
            }
        }

        let def = update
            .get(&channel)
            .or_else(|| update.get(&center))
            .or_else(|| update.get(&property))
            .cloned();
        let Some(def) = def else {
            tracing::warn!(property, "no spatial definition for rect channel, skipping");
            return Ok(());
        };
        bind_def(store, fragment, &property, &def);
        return Ok(());
    }

    // Dual bind from the channel drop zone: park every extent, then
    // re-enable exactly the pair the compiled output provides.
    for ext in &extent_defs {
        store.dispatch(Action::DisableMarkVisual {
            id: fragment.mark_id,
            property: ext.name.to_string(),
        });
    }

    if let Some(max_def) = update.get(&max).cloned() {
        if let Some(channel_def) = update.get(&channel).cloned() {
            bind_def(store, fragment, &channel, &channel_def);
        }
        bind_def(store, fragment, &max, &max_def);
    } else if let Some(center_def) = update.get(&center).cloned() {
        // Center+span output: remap the center to the start property and
        // derive the span from the scale's band width.
        bind_def(store, fragment, &channel, &center_def);
        let span_def = serde_json::json!({
            "scale": center_def.get("scale"),
            "band": true,
            "offset": -1
        });
        bind_def(store, fragment, span, &span_def);
    }
    Ok(())
}

/// A field bound to a text mark's text becomes an interpolation template
/// rather than a literal field binding.
fn text_template(store: &mut Store, fragment: &CompiledFragment, update: &Value) {
    let Some(field) = update["text"]["field"].as_str() else {
        tracing::warn!("text channel bind without a field, skipping");
        return;
    };
    let value = EncodeValue {
        template: Some(format!("{{{{datum.{field}}}}}")),
        ..EncodeValue::default()
    };
    store.set_mark_visual(fragment.mark_id, "text", value);
}
