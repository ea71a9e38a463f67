//! Raw tabular values
//!
//! Row values live outside the undo-able snapshot — history tracks the
//! descriptors, not the data. The registry validates rows on registration
//! (all-or-nothing), infers schemas, and serves sorted views and distinct
//! counts to the exporter and layout computation.

use crate::dataset::{Column, ColumnType, MType, Schema, Sort, SortOrder};
use crate::document::Document;
use crate::error::ImportError;
use crate::ids::DatasetId;
use indexmap::IndexMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Registry of raw rows per dataset.
#[derive(Debug, Clone, Default)]
pub struct DataRegistry {
    rows: HashMap<DatasetId, Vec<Value>>,
}

impl DataRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register rows for a dataset after validating them. On error nothing
    /// is registered.
    pub fn register(&mut self, id: DatasetId, rows: Vec<Value>) -> Result<(), ImportError> {
        validate_rows(&rows)?;
        self.rows.insert(id, rows);
        Ok(())
    }

    /// Drop a dataset's rows.
    pub fn remove(&mut self, id: DatasetId) {
        self.rows.remove(&id);
    }

    /// Raw rows as registered.
    #[must_use]
    pub fn raw(&self, id: DatasetId) -> Option<&[Value]> {
        self.rows.get(&id).map(Vec::as_slice)
    }

    /// Rows with the dataset's sort directive applied. Falls back through
    /// the dataset's source chain when the dataset itself has no rows
    /// (derived datasets share their source's values).
    #[must_use]
    pub fn output(&self, doc: &Document, id: DatasetId) -> Vec<Value> {
        let mut current = Some(id);
        let mut rows: Vec<Value> = Vec::new();
        while let Some(ds_id) = current {
            if let Some(found) = self.rows.get(&ds_id) {
                rows = found.clone();
                break;
            }
            current = doc.datasets.get(&ds_id).and_then(|ds| ds.source);
        }
        if let Some(sort) = doc.datasets.get(&id).and_then(|ds| ds.sort.clone()) {
            sort_rows(&mut rows, &sort);
        }
        rows
    }

    /// Number of distinct values a field takes, resolved through the
    /// source chain like [`DataRegistry::output`].
    #[must_use]
    pub fn distinct_count(&self, doc: &Document, id: DatasetId, field: &str) -> usize {
        let rows = self.output(doc, id);
        let mut seen = BTreeSet::new();
        for row in &rows {
            if let Some(value) = row.get(field) {
                seen.insert(value.to_string());
            }
        }
        seen.len()
    }
}

fn validate_rows(rows: &[Value]) -> Result<(), ImportError> {
    if rows.is_empty() {
        return Err(ImportError::Empty);
    }
    let mut kinds: IndexMap<String, &'static str> = IndexMap::new();
    for (index, row) in rows.iter().enumerate() {
        let Some(object) = row.as_object() else {
            return Err(ImportError::NotTabular { index });
        };
        for (field, value) in object {
            let kind = value_kind(value);
            if kind == "null" {
                continue;
            }
            match kinds.get(field.as_str()) {
                Some(first) if *first != kind => {
                    return Err(ImportError::MixedTypes {
                        field: field.clone(),
                        first,
                        second: kind,
                    });
                }
                Some(_) => {}
                None => {
                    kinds.insert(field.clone(), kind);
                }
            }
        }
    }
    Ok(())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(text) => {
            if looks_like_date(text) {
                "date"
            } else {
                "string"
            }
        }
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// ISO-8601-shaped strings (`2024-01-31` with optional time suffix) are
/// treated as temporal.
fn looks_like_date(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.len() < 10 {
        return false;
    }
    bytes[0..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..7].iter().all(u8::is_ascii_digit)
        && bytes[7] == b'-'
        && bytes[8..10].iter().all(u8::is_ascii_digit)
}

/// Infer a schema from validated rows: field order follows first
/// appearance; measurement types default from the storage type.
pub fn infer_schema(rows: &[Value]) -> Result<Schema, ImportError> {
    validate_rows(rows)?;
    let mut schema: Schema = IndexMap::new();
    for row in rows {
        let Some(object) = row.as_object() else {
            continue;
        };
        for (field, value) in object {
            if schema.contains_key(field.as_str()) {
                continue;
            }
            let (ctype, mtype) = match value_kind(value) {
                "number" => (ColumnType::Number, MType::Quantitative),
                "boolean" => (ColumnType::Boolean, MType::Nominal),
                "date" => (ColumnType::Date, MType::Temporal),
                "null" => continue,
                _ => (ColumnType::String, MType::Nominal),
            };
            schema.insert(
                field.clone(),
                Column {
                    name: field.clone(),
                    ctype,
                    mtype,
                },
            );
        }
    }
    Ok(schema)
}

fn sort_rows(rows: &mut [Value], sort: &Sort) {
    rows.sort_by(|a, b| {
        let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));
        match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({"a": 3, "category": "x", "when": "2024-01-01"}),
            json!({"a": 1, "category": "y", "when": "2024-02-01"}),
            json!({"a": 2, "category": "x", "when": "2024-03-01"}),
        ]
    }

    #[test]
    fn register_rejects_non_objects_without_partial_import() {
        let mut registry = DataRegistry::new();
        let bad = vec![json!({"a": 1}), json!(42)];
        assert!(matches!(
            registry.register(DatasetId(1), bad),
            Err(ImportError::NotTabular { index: 1 })
        ));
        assert!(registry.raw(DatasetId(1)).is_none());
    }

    #[test]
    fn register_rejects_mixed_types() {
        let mut registry = DataRegistry::new();
        let bad = vec![json!({"a": 1}), json!({"a": "one"})];
        assert!(matches!(
            registry.register(DatasetId(1), bad),
            Err(ImportError::MixedTypes { .. })
        ));
    }

    #[test]
    fn schema_inference_types_and_order() {
        let schema = infer_schema(&rows()).unwrap();
        let fields: Vec<&String> = schema.keys().collect();
        assert_eq!(fields, ["a", "category", "when"]);
        assert_eq!(schema["a"].mtype, MType::Quantitative);
        assert_eq!(schema["category"].mtype, MType::Nominal);
        assert_eq!(schema["when"].mtype, MType::Temporal);
    }

    #[test]
    fn output_applies_sort_directive() {
        let mut doc = Document::new();
        let mut dataset = Dataset::new(DatasetId(1), "d");
        dataset.sort = Some(Sort {
            field: "a".into(),
            order: SortOrder::Desc,
        });
        doc.datasets.insert(DatasetId(1), dataset);

        let mut registry = DataRegistry::new();
        registry.register(DatasetId(1), rows()).unwrap();
        let sorted = registry.output(&doc, DatasetId(1));
        let values: Vec<i64> = sorted.iter().map(|r| r["a"].as_i64().unwrap()).collect();
        assert_eq!(values, vec![3, 2, 1]);
    }

    #[test]
    fn distinct_count_resolves_through_source_chain() {
        let mut doc = Document::new();
        doc.datasets.insert(DatasetId(1), Dataset::new(DatasetId(1), "src"));
        let mut derived = Dataset::new(DatasetId(2), "agg");
        derived.source = Some(DatasetId(1));
        doc.datasets.insert(DatasetId(2), derived);

        let mut registry = DataRegistry::new();
        registry.register(DatasetId(1), rows()).unwrap();
        assert_eq!(registry.distinct_count(&doc, DatasetId(2), "category"), 2);
    }
}
