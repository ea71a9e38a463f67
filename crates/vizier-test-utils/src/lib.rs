//! Testing utilities for the vizier workspace
//!
//! Shared fixtures: a small document with a pipeline, scene, group, and
//! rect mark, plus builders for compiled fragments shaped like the chart
//! compiler's output.

#![allow(missing_docs)]

use serde_json::{json, Value};
use vizier_bind::{CompiledFragment, CompiledOutput, FragmentMap};
use vizier_doc::dataset::Dataset;
use vizier_doc::marks::{Mark, MarkFrom, MarkType};
use vizier_doc::values::infer_schema;
use vizier_doc::{DataRegistry, DatasetId, MarkId, PipelineId, Store};

/// Install a test-writer subscriber so `RUST_LOG` surfaces resolver
/// warnings during test runs. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A populated store plus the IDs of its primitives.
pub struct Fixture {
    pub store: Store,
    pub data: DataRegistry,
    pub pipeline: PipelineId,
    pub dataset: DatasetId,
    pub scene: MarkId,
    pub group: MarkId,
    pub rect: MarkId,
}

pub fn sample_rows() -> Vec<Value> {
    vec![
        json!({"a": 1, "b": 10, "category": "alpha", "price": 3.5}),
        json!({"a": 2, "b": 20, "category": "beta", "price": 1.25}),
        json!({"a": 3, "b": 15, "category": "alpha", "price": 8.0}),
        json!({"a": 4, "b": 5, "category": "gamma", "price": 2.0}),
    ]
}

/// One pipeline over [`sample_rows`], a scene containing one group, and a
/// rect mark inside the group sourcing the pipeline's dataset.
pub fn fixture() -> Fixture {
    init_tracing();
    let mut store = Store::new();
    let scene = store.create_scene();

    let rows = sample_rows();
    let mut dataset = Dataset::new(DatasetId(0), "cars");
    dataset.schema = infer_schema(&rows).expect("sample rows are tabular");
    let (pipeline, dataset) = store.add_pipeline("cars", dataset);

    let mut data = DataRegistry::new();
    data.register(dataset, rows).expect("sample rows are tabular");

    let mut group = Mark::new(MarkId(0), MarkType::Group);
    group.parent = Some(scene);
    let group = store.add_mark(group);

    let mut rect = Mark::new(MarkId(0), MarkType::Rect);
    rect.parent = Some(group);
    rect.from = Some(MarkFrom::data(dataset));
    let rect = store.add_mark(rect);

    Fixture {
        store,
        data,
        pipeline,
        dataset,
        scene,
        group,
        rect,
    }
}

/// A compiled fragment binding `channel` of the fixture's rect to `field`
/// through an ordinal scale spanning the width.
pub fn ordinal_fragment(fx: &Fixture, channel: &str, field: &str) -> CompiledFragment {
    let mut update = serde_json::Map::new();
    update.insert(
        channel.to_string(),
        json!({"scale": channel, "field": field}),
    );
    CompiledFragment {
        output: CompiledOutput {
            data: vec![json!({"name": "source"})],
            scales: vec![json!({
                "name": channel,
                "type": "ordinal",
                "range": [{"signal": "width"}],
                "domain": {"data": "source", "field": field}
            })],
            marks: vec![json!({
                "type": "rect",
                "from": {"data": "source"},
                "encode": {"update": update}
            })],
        },
        map: FragmentMap::default(),
        ds_id: fx.dataset,
        pl_id: fx.pipeline,
        mark_id: fx.rect,
        mark_type: MarkType::Rect,
        channel: channel.to_string(),
        property: channel.to_string(),
    }
}

/// Like [`ordinal_fragment`], but aggregating on `groupby` first: the
/// compiled output carries a `summary` data definition and the scale
/// domain references it.
pub fn aggregate_fragment(
    fx: &Fixture,
    channel: &str,
    field: &str,
    groupby: &[&str],
) -> CompiledFragment {
    let mut fragment = ordinal_fragment(fx, channel, field);
    fragment.output.data.push(json!({
        "name": "summary",
        "source": "source",
        "transform": [{
            "type": "aggregate",
            "groupby": groupby,
            "ops": ["mean"],
            "fields": [field],
            "as": [format!("mean_{field}")]
        }]
    }));
    fragment.output.scales = vec![json!({
        "name": channel,
        "type": "ordinal",
        "range": [{"signal": "width"}],
        "domain": {"data": "summary", "field": field}
    })];
    fragment
}
