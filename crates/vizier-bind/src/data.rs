//! Data resolution
//!
//! Identifies the fragment's primary data source and reconciles aggregate
//! definitions against the owning pipeline: one aggregate dataset per
//! distinct group-by key, reused and extended rather than duplicated.

use crate::error::BindError;
use crate::fragment::CompiledFragment;
use serde_json::Value;
use vizier_doc::dataset::AggregateTransform;
use vizier_doc::Store;

/// Record the fragment's source dataset and resolve any aggregate
/// definition.
pub(crate) fn resolve_data(
    store: &mut Store,
    fragment: &mut CompiledFragment,
) -> Result<(), BindError> {
    fragment
        .map
        .data
        .insert("source".into(), fragment.ds_id);

    let summary = fragment.data_def("summary").cloned();
    if let Some(summary) = summary {
        resolve_aggregate(store, fragment, &summary)?;
    }
    Ok(())
}

fn resolve_aggregate(
    store: &mut Store,
    fragment: &mut CompiledFragment,
    summary: &Value,
) -> Result<(), BindError> {
    let Some(aggregate) = aggregate_transform(summary) else {
        tracing::warn!("summary data definition carries no aggregate transform, skipping");
        return Ok(());
    };

    let pipeline = store.present().pipeline(fragment.pl_id)?.clone();
    let agg_id = match pipeline.aggregate_for(&aggregate.groupby) {
        Some(existing) => {
            // Same group-by key: merge the new summarize ops instead of
            // deriving a duplicate dataset.
            store.summarize_aggregate(existing, &aggregate);
            existing
        }
        None => store.aggregate_pipeline(fragment.pl_id, &aggregate)?,
    };

    fragment.map.data.insert("summary".into(), agg_id);
    Ok(())
}

fn aggregate_transform(summary: &Value) -> Option<AggregateTransform> {
    let transforms = summary.get("transform")?.as_array()?;
    let aggregate = transforms
        .iter()
        .find(|tx| tx.get("type").and_then(Value::as_str) == Some("aggregate"))?;
    serde_json::from_value(aggregate.clone()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn aggregate_transform_parses_from_wire() {
        let summary = json!({
            "name": "summary",
            "transform": [
                {"type": "formula", "expr": "1", "as": "one"},
                {"type": "aggregate", "groupby": ["category"],
                 "ops": ["mean"], "fields": ["price"], "as": ["mean_price"]}
            ]
        });
        let aggregate = aggregate_transform(&summary).unwrap();
        assert_eq!(aggregate.groupby, vec!["category"]);
        assert_eq!(aggregate.as_fields, vec!["mean_price"]);
    }
}
