//! Exporter behavior over a bound document: determinism, reference
//! resolution, inline values, and interaction materialization.

use pretty_assertions::assert_eq;
use serde_json::json;
use vizier_bind::bind_channel;
use vizier_doc::dataset::{DataFormat, Dataset, FormatType, Sort, SortOrder};
use vizier_doc::interaction::{
    ApplicationDef, MarkApplication, PointKind, PointSelection, SelectionDef,
};
use vizier_doc::marks::{Mark, MarkFrom, MarkType};
use vizier_doc::values::infer_schema;
use vizier_doc::{Action, DataRegistry, DatasetId, MarkId, Store};
use vizier_export::export;
use vizier_test_utils::{fixture, ordinal_fragment, sample_rows, Fixture};

fn bound_fixture() -> Fixture {
    let mut fx = fixture();
    let mut fragment = ordinal_fragment(&fx, "x", "category");
    bind_channel(&mut fx.store, &fx.data, &mut fragment).unwrap();
    fx
}

/// Exporting the same snapshot twice with identical flags yields
/// structurally identical output — no counters leak between calls.
#[test]
fn export_is_idempotent() {
    let fx = bound_fixture();
    let doc = fx.store.snapshot();
    let first = export(&doc, &fx.data, false, false).unwrap();
    let second = export(&doc, &fx.data, false, false).unwrap();
    assert_eq!(first.spec, second.spec);
    assert_eq!(first.counts, second.counts);
}

#[test]
fn exported_spec_resolves_references_to_names() {
    let fx = bound_fixture();
    let doc = fx.store.snapshot();
    let exported = export(&doc, &fx.data, false, false).unwrap();
    let spec = &exported.spec;

    // Dataset exported by name with inline rows (no url source).
    let data = spec["data"].as_array().unwrap();
    assert_eq!(data[0]["name"], "cars");
    assert!(data[0]["values"].is_array());

    // Group carries its scale with a resolved data-ref domain, and span
    // signals so nested ranges compute.
    let group = &spec["marks"][0];
    assert_eq!(group["scales"][0]["name"], "x");
    assert_eq!(
        group["scales"][0]["domain"],
        json!({"data": "cars", "field": "category"})
    );
    let signals = group["signals"].as_array().unwrap();
    assert!(signals
        .iter()
        .any(|sg| sg["name"] == "width" && sg["value"] == json!(640)));

    // The rect encodes through the scale by name; no internal keys leak.
    let rect = &group["marks"][0];
    assert_eq!(rect["encode"]["update"]["x"]["scale"], "x");
    assert!(rect.get("_id").is_none());
    assert!(rect["encode"]["update"].get("xc").is_none());
}

#[test]
fn counts_track_dataset_and_scale_usage() {
    let fx = bound_fixture();
    let doc = fx.store.snapshot();
    let exported = export(&doc, &fx.data, false, false).unwrap();

    let data_count = &exported.counts.data[&fx.dataset];
    assert!(data_count.marks.contains(&fx.rect));
    assert_eq!(data_count.scales.len(), 1);
    assert_eq!(data_count.total(), 2);

    let (_, scale_count) = exported.counts.scales.iter().next().unwrap();
    assert!(scale_count.marks.contains(&fx.rect));
}

/// CSV-formatted datasets without a URL inline their values as a CSV
/// string, not a raw array.
#[test]
fn csv_dataset_inlines_delimited_values() {
    let mut store = Store::new();
    let scene = store.create_scene();
    let rows = sample_rows();
    let mut dataset = Dataset::new(DatasetId(0), "cars");
    dataset.schema = infer_schema(&rows).unwrap();
    dataset.format = Some(DataFormat {
        ftype: FormatType::Csv,
    });
    let (_pl, ds) = store.add_pipeline("cars", dataset);
    let mut data = DataRegistry::new();
    data.register(ds, rows).unwrap();

    let mut rect = Mark::new(MarkId(0), MarkType::Rect);
    rect.parent = Some(scene);
    rect.from = Some(MarkFrom::data(ds));
    store.add_mark(rect);

    let doc = store.snapshot();
    let exported = export(&doc, &data, false, false).unwrap();
    let values = exported.spec["data"][0]["values"].as_str().unwrap();
    let mut lines = values.lines();
    assert_eq!(lines.next(), Some("a,b,category,price"));
    assert_eq!(lines.next(), Some("1,10,alpha,3.5"));

    // The editor's own view wants parsed rows, not a string.
    let internal = export(&doc, &data, true, false).unwrap();
    assert!(internal.spec["data"][0]["values"].is_array());
    assert!(internal.spec["data"][0].get("format").is_none());
}

#[test]
fn internal_export_adds_manipulator_scaffolding() {
    let fx = bound_fixture();
    let doc = fx.store.snapshot();
    let exported = export(&doc, &fx.data, true, false).unwrap();

    let group = &exported.spec["marks"][0];
    let marks = group["marks"].as_array().unwrap();
    // The rect is followed by its manipulator wrapper group.
    assert!(marks[0]["role"].as_str().unwrap().starts_with("vz_"));
    assert_eq!(marks[1]["type"], "group");
    assert_eq!(marks[1]["data"][0]["name"], "Rect_1_manipulators");
}

#[test]
fn demonstration_stores_are_appended_per_group() {
    let fx = bound_fixture();
    let doc = fx.store.snapshot();
    let exported = export(&doc, &fx.data, false, false).unwrap();
    let names: Vec<&str> = exported.spec["data"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|d| d["name"].as_str())
        .collect();
    assert!(names.contains(&"brush_store_Group_1"));
    assert!(names.contains(&"points_store_Group_1"));
}

#[test]
fn committed_interactions_materialize_unless_previewing() {
    let mut fx = bound_fixture();
    let interaction = fx.store.add_interaction(fx.group);
    fx.store.dispatch(Action::SetSelection {
        id: interaction,
        selection: SelectionDef::Point(PointSelection {
            ptype: PointKind::Single,
            field: Some("category".into()),
        }),
    });
    fx.store.dispatch(Action::SetApplication {
        id: interaction,
        application: ApplicationDef::Mark(MarkApplication {
            target_mark_name: "Rect_1".into(),
            property_name: "fill".into(),
            default_value: json!("grey"),
            is_demonstrating_interval: false,
        }),
    });

    let doc = fx.store.snapshot();
    let exported = export(&doc, &fx.data, false, false).unwrap();
    let rect = &exported.spec["marks"][0]["marks"][0];
    let fill = rect["encode"]["update"]["fill"].as_array().unwrap();
    assert_eq!(fill.len(), 2);
    assert!(fill[0]["test"]
        .as_str()
        .unwrap()
        .contains("points_store_Group_1"));
    assert_eq!(fill[1], json!({"value": "grey"}));

    // Preview-restricted export leaves the property unconditional so a
    // provisional definition can be substituted.
    let preview = export(&doc, &fx.data, false, true).unwrap();
    let rect = &preview.spec["marks"][0]["marks"][0];
    assert!(!rect["encode"]["update"]["fill"].is_array());
}

/// A stale reference is an integrity violation, not a recoverable state.
#[test]
fn missing_entity_fails_the_export() {
    let mut store = Store::new();
    let scene = store.create_scene();
    let mut rect = Mark::new(MarkId(0), MarkType::Rect);
    rect.parent = Some(scene);
    rect.from = Some(MarkFrom::data(DatasetId(999)));
    store.add_mark(rect);

    let doc = store.snapshot();
    let data = DataRegistry::new();
    assert!(export(&doc, &data, false, false).is_err());
}

#[test]
fn descending_sort_flips_scale_reverse_and_appends_transform() {
    let mut fx = bound_fixture();
    fx.store.sort_dataset(
        fx.dataset,
        Some(Sort {
            field: "category".into(),
            order: SortOrder::Desc,
        }),
    );
    let doc = fx.store.snapshot();
    let exported = export(&doc, &fx.data, false, false).unwrap();

    let scale = &exported.spec["marks"][0]["scales"][0];
    assert_eq!(scale["reverse"], json!(true));
    assert_eq!(scale["domain"]["sort"], json!(true));
    assert!(scale["domain"].get("_sortOrder").is_none());

    let dataset = &exported.spec["data"][0];
    let transforms = dataset["transform"].as_array().unwrap();
    assert_eq!(
        transforms.last().unwrap(),
        &json!({"type": "sort", "by": "-category"})
    );
}

/// After a cascade delete the export stays well-formed and the deleted
/// subtree is gone.
#[test]
fn export_after_cascade_delete_is_clean() {
    let mut fx = bound_fixture();
    fx.store.delete_mark(fx.group);
    let doc = fx.store.snapshot();
    let exported = export(&doc, &fx.data, false, false).unwrap();
    assert!(exported.spec["marks"].as_array().unwrap().is_empty());
}

/// Widget signal definitions surface at the top level of the spec.
#[test]
fn widget_signals_export_at_top_level() {
    let mut fx = bound_fixture();
    let widget = fx.store.add_widget(fx.group);
    let mut record = fx.store.snapshot().widget(widget).unwrap().clone();
    record.signals = vec![json!({
        "name": "price_threshold",
        "value": 5,
        "bind": {"input": "range", "min": 0, "max": 10}
    })];
    fx.store.dispatch(Action::AddWidget { widget: record });

    let doc = fx.store.snapshot();
    let exported = export(&doc, &fx.data, false, false).unwrap();
    let signals = exported.spec["signals"].as_array().unwrap();
    assert!(signals.iter().any(|sg| sg["name"] == "price_threshold"));
}
