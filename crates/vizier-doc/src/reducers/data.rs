//! Pipeline and dataset reducers

use crate::dataset::{AggregateTransform, Dataset, MType, Sort, Transform};
use crate::document::Document;
use crate::ids::{DatasetId, PipelineId};
use crate::pipeline::Pipeline;

pub(super) fn add_pipeline(doc: &mut Document, pipeline: &Pipeline) {
    doc.pipelines.insert(pipeline.id, pipeline.clone());
}

pub(super) fn add_dataset(doc: &mut Document, dataset: &Dataset) {
    doc.datasets.insert(dataset.id, dataset.clone());
}

pub(super) fn delete_dataset(doc: &mut Document, id: DatasetId) {
    doc.datasets.remove(&id);
}

pub(super) fn aggregate_pipeline(
    doc: &mut Document,
    pipeline: PipelineId,
    key: &str,
    dataset: &Dataset,
) {
    doc.datasets.insert(dataset.id, dataset.clone());
    if let Some(mut record) = doc.pipelines.get(&pipeline).cloned() {
        record.aggregates.insert(key.to_string(), dataset.id);
        doc.pipelines.insert(pipeline, record);
    }
}

pub(super) fn summarize_aggregate(
    doc: &mut Document,
    id: DatasetId,
    transform: &AggregateTransform,
) {
    with_dataset(doc, id, |dataset| {
        if let Some(aggregate) = dataset.aggregate_mut() {
            aggregate.merge(transform);
        }
    });
}

pub(super) fn sort_dataset(doc: &mut Document, id: DatasetId, sort: Option<Sort>) {
    with_dataset(doc, id, |dataset| dataset.sort = sort);
}

pub(super) fn add_transform(doc: &mut Document, id: DatasetId, transform: Transform) {
    with_dataset(doc, id, |dataset| dataset.transform.push(transform));
}

pub(super) fn update_transform(
    doc: &mut Document,
    id: DatasetId,
    index: usize,
    transform: Transform,
) {
    with_dataset(doc, id, |dataset| {
        if let Some(slot) = dataset.transform.get_mut(index) {
            *slot = transform;
        }
    });
}

pub(super) fn change_field_mtype(doc: &mut Document, id: DatasetId, field: &str, mtype: MType) {
    with_dataset(doc, id, |dataset| {
        if let Some(column) = dataset.schema.get_mut(field) {
            column.mtype = mtype;
        }
    });
}

fn with_dataset(doc: &mut Document, id: DatasetId, update: impl FnOnce(&mut Dataset)) {
    if let Some(mut dataset) = doc.datasets.get(&id).cloned() {
        update(&mut dataset);
        doc.datasets.insert(id, dataset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Action;
    use crate::dataset::AggregateOp;
    use crate::reducers::reduce;

    #[test]
    fn aggregate_pipeline_records_key() {
        let mut doc = Document::new();
        add_dataset(&mut doc, &Dataset::new(DatasetId(2), "cars"));
        add_pipeline(&mut doc, &Pipeline::new(PipelineId(1), "cars", DatasetId(2)));

        let mut agg = Dataset::new(DatasetId(3), "cars_groupby_category");
        agg.parent = Some(PipelineId(1));
        let doc = reduce(
            &doc,
            &Action::AggregatePipeline {
                pipeline: PipelineId(1),
                key: "category".into(),
                dataset: agg,
            },
        );

        let pipeline = doc.pipeline(PipelineId(1)).unwrap();
        assert_eq!(pipeline.aggregates.get("category"), Some(&DatasetId(3)));
    }

    #[test]
    fn summarize_merges_into_existing_aggregate() {
        let mut doc = Document::new();
        let mut agg = Dataset::new(DatasetId(3), "agg");
        agg.transform.push(Transform::Aggregate(AggregateTransform {
            groupby: vec!["category".into()],
            ops: vec![AggregateOp::Mean],
            fields: vec!["price".into()],
            as_fields: vec!["mean_price".into()],
        }));
        add_dataset(&mut doc, &agg);

        summarize_aggregate(
            &mut doc,
            DatasetId(3),
            &AggregateTransform {
                groupby: vec!["category".into()],
                ops: vec![AggregateOp::Max],
                fields: vec!["price".into()],
                as_fields: vec!["max_price".into()],
            },
        );

        let dataset = doc.dataset(DatasetId(3)).unwrap();
        let merged = dataset.aggregate().unwrap();
        assert_eq!(merged.ops, vec![AggregateOp::Mean, AggregateOp::Max]);
    }
}
