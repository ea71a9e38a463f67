//! Scale domain/range references
//!
//! Resolves a scale's unresolved `{dataset, field}` references to one of
//! three wire shapes, most to least performant for the executable format:
//! single data + field, single data + field list, or an explicit `fields`
//! list spanning distinct datasets. Ordinal scales backed by a sorted
//! dataset gain a sort directive.

use crate::counts::Counts;
use crate::error::ExportError;
use indexmap::IndexMap;
use serde_json::{json, Value};
use vizier_doc::dataset::{Dataset, SortOrder};
use vizier_doc::document::export_name;
use vizier_doc::scale::{DomainRef, Scale, ScaleType};
use vizier_doc::{DatasetId, Document};

/// Key carrying the requested sort direction through to the scale
/// exporter, which folds it into `reverse` and strips it.
pub(crate) const SORT_ORDER_KEY: &str = "_sortOrder";

pub(crate) fn data_ref(
    doc: &Document,
    counts: &mut Counts,
    scale: &Scale,
    refs: &[DomainRef],
) -> Result<Value, ExportError> {
    if let [single] = refs {
        let dataset = doc.dataset(single.data)?;
        return Ok(sort_data_ref(
            dataset,
            counts,
            scale,
            json!(single.field),
        ));
    }

    // Group fields by backing dataset, preserving reference order.
    let mut sets: IndexMap<DatasetId, Vec<String>> = IndexMap::new();
    for domain_ref in refs {
        sets.entry(domain_ref.data)
            .or_default()
            .push(domain_ref.field.clone());
    }

    if sets.len() == 1 {
        let (ds_id, fields) = sets.first().expect("non-empty reference set");
        let dataset = doc.dataset(*ds_id)?;
        return Ok(sort_data_ref(dataset, counts, scale, json!(fields)));
    }

    let mut fields = Vec::with_capacity(sets.len());
    for (ds_id, ds_fields) in &sets {
        let dataset = doc.dataset(*ds_id)?;
        fields.push(sort_data_ref(dataset, counts, scale, json!(ds_fields)));
    }
    Ok(json!({ "fields": fields }))
}

fn sort_data_ref(dataset: &Dataset, counts: &mut Counts, scale: &Scale, field: Value) -> Value {
    let mut reference = json!({
        "data": export_name(&dataset.name),
        "field": field,
    });

    if scale.scale_type == ScaleType::Ordinal {
        if let Some(sort) = &dataset.sort {
            let exact = reference["field"].as_str() == Some(sort.field.as_str());
            reference["sort"] = if exact {
                json!(true)
            } else {
                json!({"field": sort.field, "op": "min"})
            };
            reference[SORT_ORDER_KEY] = match sort.order {
                SortOrder::Asc => json!("asc"),
                SortOrder::Desc => json!("desc"),
            };
        }
    }

    counts.data_entry(dataset.id).scales.insert(scale.id);
    reference
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizier_doc::dataset::Sort;
    use vizier_doc::scale::ScaleRange;
    use vizier_doc::ScaleId;

    fn doc_with_datasets() -> Document {
        let mut doc = Document::new();
        doc.datasets
            .insert(DatasetId(1), Dataset::new(DatasetId(1), "cars"));
        doc.datasets
            .insert(DatasetId(2), Dataset::new(DatasetId(2), "trucks"));
        doc
    }

    fn ordinal_scale() -> Scale {
        Scale::new(ScaleId(7), "x", ScaleType::Ordinal, Some(ScaleRange::Width))
    }

    fn refs(pairs: &[(u64, &str)]) -> Vec<DomainRef> {
        pairs
            .iter()
            .map(|(id, field)| DomainRef {
                data: DatasetId(*id),
                field: (*field).to_string(),
            })
            .collect()
    }

    #[test]
    fn single_ref_is_data_plus_field() {
        let doc = doc_with_datasets();
        let mut counts = Counts::default();
        let out = data_ref(&doc, &mut counts, &ordinal_scale(), &refs(&[(1, "a")])).unwrap();
        assert_eq!(out, json!({"data": "cars", "field": "a"}));
        assert!(counts.data[&DatasetId(1)].scales.contains(&ScaleId(7)));
    }

    #[test]
    fn same_dataset_refs_collapse_to_field_list() {
        let doc = doc_with_datasets();
        let mut counts = Counts::default();
        let out = data_ref(
            &doc,
            &mut counts,
            &ordinal_scale(),
            &refs(&[(1, "a"), (1, "b")]),
        )
        .unwrap();
        assert_eq!(out, json!({"data": "cars", "field": ["a", "b"]}));
    }

    #[test]
    fn distinct_datasets_become_fields_list() {
        let doc = doc_with_datasets();
        let mut counts = Counts::default();
        let out = data_ref(
            &doc,
            &mut counts,
            &ordinal_scale(),
            &refs(&[(1, "a"), (2, "b")]),
        )
        .unwrap();
        assert_eq!(
            out,
            json!({"fields": [
                {"data": "cars", "field": ["a"]},
                {"data": "trucks", "field": ["b"]}
            ]})
        );
    }

    #[test]
    fn ordinal_sorted_dataset_gains_sort_directive() {
        let mut doc = doc_with_datasets();
        let mut sorted = Dataset::new(DatasetId(1), "cars");
        sorted.sort = Some(Sort {
            field: "a".into(),
            order: SortOrder::Desc,
        });
        doc.datasets.insert(DatasetId(1), sorted);

        let mut counts = Counts::default();
        let exact = data_ref(&doc, &mut counts, &ordinal_scale(), &refs(&[(1, "a")])).unwrap();
        assert_eq!(exact["sort"], json!(true));
        assert_eq!(exact[SORT_ORDER_KEY], json!("desc"));

        let other = data_ref(&doc, &mut counts, &ordinal_scale(), &refs(&[(1, "b")])).unwrap();
        assert_eq!(other["sort"], json!({"field": "a", "op": "min"}));
    }
}
