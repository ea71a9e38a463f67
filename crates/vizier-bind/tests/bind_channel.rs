//! Channel-bind invariants: scale reuse, aggregate dedup, and rect
//! spatial exclusivity across bind sequences.

use pretty_assertions::assert_eq;
use serde_json::json;
use vizier_bind::bind_channel;
use vizier_doc::encode::EncodeValue;
use vizier_doc::marks::{extents, SpatialAxis};
use vizier_doc::scale::{ScaleRange, ScaleType};
use vizier_test_utils::{aggregate_fragment, fixture, ordinal_fragment};

#[test]
fn binding_x_creates_one_ordinal_width_scale() {
    let mut fx = fixture();
    let mut fragment = ordinal_fragment(&fx, "x", "a");
    bind_channel(&mut fx.store, &fx.data, &mut fragment).unwrap();

    let doc = fx.store.snapshot();
    assert_eq!(doc.scales.len(), 1);
    let scale = doc.scales.values().next().unwrap();
    assert_eq!(scale.scale_type, ScaleType::Ordinal);
    assert_eq!(scale.range, Some(ScaleRange::Width));
    assert_eq!(scale.domain[0].field, "a");

    // The mark's x property went through the new scale.
    let rect = doc.mark(fx.rect).unwrap();
    assert_eq!(rect.encode.update["x"].scale, Some(scale.id));

    // The scale landed on the mark's parent group.
    let group = doc.mark(fx.group).unwrap();
    assert_eq!(group.children().unwrap().scales, vec![scale.id]);
}

/// Two channels whose compiled domains reference different datasets of the
/// same pipeline resolve to one shared scale.
#[test]
fn same_pipeline_domains_reuse_the_scale() {
    let mut fx = fixture();
    let mut first = ordinal_fragment(&fx, "x", "a");
    bind_channel(&mut fx.store, &fx.data, &mut first).unwrap();

    // The second bind aggregates, so its domain references the derived
    // summary dataset rather than the source.
    let mut second = aggregate_fragment(&fx, "x2", "a", &["category"]);
    bind_channel(&mut fx.store, &fx.data, &mut second).unwrap();

    let doc = fx.store.snapshot();
    assert_eq!(doc.scales.len(), 1, "expected the x scale to be reused");

    let scale_id = doc.scales.values().next().unwrap().id;
    let rect = doc.mark(fx.rect).unwrap();
    assert_eq!(rect.encode.update["x"].scale, Some(scale_id));
    assert_eq!(rect.encode.update["x2"].scale, Some(scale_id));
}

/// A manually constructed dataset has no parent pipeline and never fuzzy
/// matches.
#[test]
fn parentless_domain_never_matches() {
    let mut fx = fixture();
    let mut first = ordinal_fragment(&fx, "x", "a");
    bind_channel(&mut fx.store, &fx.data, &mut first).unwrap();

    let standalone = fx
        .store
        .add_dataset(vizier_doc::dataset::Dataset::new(vizier_doc::DatasetId(0), "manual"));
    let mut second = ordinal_fragment(&fx, "x2", "a");
    second.ds_id = standalone;
    second.output.scales = vec![json!({
        "name": "x2",
        "type": "ordinal",
        "range": [{"signal": "width"}],
        "domain": {"data": "source", "field": "a"}
    })];
    bind_channel(&mut fx.store, &fx.data, &mut second).unwrap();

    assert_eq!(fx.store.snapshot().scales.len(), 2);
}

#[test]
fn aggregate_binds_deduplicate_by_groupby_key() {
    let mut fx = fixture();
    let mut first = aggregate_fragment(&fx, "x", "a", &["category"]);
    bind_channel(&mut fx.store, &fx.data, &mut first).unwrap();
    let mut second = aggregate_fragment(&fx, "x2", "b", &["category"]);
    bind_channel(&mut fx.store, &fx.data, &mut second).unwrap();

    let doc = fx.store.snapshot();
    let pipeline = doc.pipeline(fx.pipeline).unwrap();
    assert_eq!(pipeline.aggregates.len(), 1, "same groupby key must reuse");

    // The reused aggregate carries both summarize ops.
    let agg_id = pipeline.aggregates["category"];
    let aggregate = doc.dataset(agg_id).unwrap().aggregate().unwrap().clone();
    assert_eq!(aggregate.fields, vec!["a", "b"]);

    // A different groupby key derives a second dataset.
    let mut third = aggregate_fragment(&fx, "y", "a", &["category", "b"]);
    bind_channel(&mut fx.store, &fx.data, &mut third).unwrap();
    let doc = fx.store.snapshot();
    assert_eq!(doc.pipeline(fx.pipeline).unwrap().aggregates.len(), 2);
}

fn active_extents(doc: &vizier_doc::Document, id: vizier_doc::MarkId) -> Vec<&'static str> {
    let mark = doc.mark(id).unwrap();
    extents(SpatialAxis::X)
        .into_iter()
        .filter(|ext| {
            mark.encode
                .update
                .get(ext.name)
                .is_some_and(|entry| !entry.disabled)
        })
        .map(|ext| ext.name)
        .collect()
}

/// After any bind sequence at most two x extents are enabled, and binding
/// a third disables the least recently bound of the prior pair.
#[test]
fn rect_spatial_exclusivity() {
    let mut fx = fixture();

    // Defaults: x2 is the only active x extent.
    assert_eq!(active_extents(&fx.store.snapshot(), fx.rect), vec!["x2"]);

    let mut first = ordinal_fragment(&fx, "x", "a");
    bind_channel(&mut fx.store, &fx.data, &mut first).unwrap();
    assert_eq!(active_extents(&fx.store.snapshot(), fx.rect), vec!["x", "x2"]);

    // Binding the center must evict x2 (never bound) rather than x (the
    // most recent bind).
    let mut second = ordinal_fragment(&fx, "x", "a");
    second.property = "xc".into();
    bind_channel(&mut fx.store, &fx.data, &mut second).unwrap();
    let doc = fx.store.snapshot();
    assert_eq!(active_extents(&doc, fx.rect), vec!["x", "xc"]);

    let active = active_extents(&doc, fx.rect);
    assert!(active.len() <= 2);
}

/// Literal values bound through the resolver become named, tunable
/// signals.
#[test]
fn literal_binds_materialize_property_signals() {
    let mut fx = fixture();
    let mut fragment = ordinal_fragment(&fx, "fill", "a");
    fragment.output.scales = vec![];
    fragment.output.marks = vec![json!({
        "type": "rect",
        "encode": {"update": {"fill": {"value": "#4682b4"}}}
    })];
    bind_channel(&mut fx.store, &fx.data, &mut fragment).unwrap();

    let doc = fx.store.snapshot();
    let rect = doc.mark(fx.rect).unwrap();
    let fill = &rect.encode.update["fill"];
    let signal = fill.signal.as_deref().unwrap();
    assert!(signal.starts_with("vz_rect_"));
    assert_eq!(doc.signal_value(signal), Some(&json!("#4682b4")));
}

/// An ordinal width scale over a cramped scene grows it to fit every band.
#[test]
fn ordinal_width_scale_grows_the_scene() {
    let mut fx = fixture();
    fx.store
        .set_mark_visual(fx.scene, "width", EncodeValue::literal(50));

    let mut fragment = ordinal_fragment(&fx, "x", "category");
    bind_channel(&mut fx.store, &fx.data, &mut fragment).unwrap();

    let doc = fx.store.snapshot();
    let scene = doc.mark(fx.scene).unwrap();
    let width = scene.encode.update["width"].value.as_ref().unwrap();
    // 3 distinct categories → (3 + 1) × 21.
    assert_eq!(width.as_f64(), Some(84.0));
}

/// A spacious scene is left alone — the layout never shrinks.
#[test]
fn layout_never_shrinks() {
    let mut fx = fixture();
    let mut fragment = ordinal_fragment(&fx, "x", "category");
    bind_channel(&mut fx.store, &fx.data, &mut fragment).unwrap();

    let doc = fx.store.snapshot();
    let scene = doc.mark(fx.scene).unwrap();
    let width = scene.encode.update["width"].value.as_ref().unwrap();
    assert_eq!(width.as_f64(), Some(500.0));
}
