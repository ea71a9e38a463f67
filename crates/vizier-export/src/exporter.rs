//! The specification exporter
//!
//! A pure function from one document snapshot (plus the value registry) to
//! a complete executable specification, walking the mark tree top-down and
//! resolving every internal reference — IDs to names, signals to literals,
//! unresolved domains to data refs — while counting reference usage.

use crate::clean::clean;
use crate::counts::Counts;
use crate::data_ref::{data_ref, SORT_ORDER_KEY};
use crate::error::ExportError;
use crate::manipulators::manipulators;
use serde_json::{json, Value};
use vizier_doc::dataset::{Dataset, FormatType, SortOrder};
use vizier_doc::document::export_name;
use vizier_doc::error::DocumentError;
use vizier_doc::marks::{span_name, Mark, MarkType, SpatialAxis};
use vizier_doc::signal::prop_signal;
use vizier_doc::{DataRegistry, DatasetId, Document, GuideId, MarkId, ScaleId};
use vizier_preview::{add_application_to_scene, add_selection_to_scene, demonstration_datasets, demonstrations};

/// A compiled specification plus the usage counters gathered on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedSpec {
    /// The executable specification.
    pub spec: Value,
    /// Reference-usage counters.
    pub counts: Counts,
}

/// Compile a document snapshot into an executable specification.
///
/// `internal` keeps editor-only scaffolding (manipulators, live signal
/// references); `preview` excludes committed interaction definitions so a
/// caller can substitute provisional ones.
///
/// # Errors
/// Fails when a referenced entity no longer exists in the snapshot — an
/// integrity violation that cascade deletion should have prevented.
pub fn export(
    doc: &Document,
    data: &DataRegistry,
    internal: bool,
    preview: bool,
) -> Result<ExportedSpec, ExportError> {
    let mut exporter = Exporter {
        doc,
        data,
        internal,
        preview,
        counts: Counts::default(),
    };
    let mut spec = exporter.scene()?;
    spec["data"] = Value::Array(exporter.pipelines()?);
    demonstration_datasets(&mut spec);
    spec["signals"] = Value::Array(exporter.widget_signals());
    Ok(ExportedSpec {
        spec,
        counts: exporter.counts,
    })
}

struct Exporter<'a> {
    doc: &'a Document,
    data: &'a DataRegistry,
    internal: bool,
    preview: bool,
    counts: Counts,
}

impl Exporter<'_> {
    fn scene(&mut self) -> Result<Value, ExportError> {
        let scene_id = self.doc.scene.ok_or(DocumentError::NoScene)?;
        let mut outputs = self.group(scene_id)?;
        let mut spec = outputs.swap_remove(0);
        // Scenes have no item source or mark encoding.
        if let Some(object) = spec.as_object_mut() {
            object.remove("from");
            object.remove("encode");
        }
        Ok(spec)
    }

    fn pipelines(&mut self) -> Result<Vec<Value>, ExportError> {
        let mut out = Vec::new();
        for pipeline in self.doc.pipelines.values() {
            out.push(self.dataset(pipeline.source)?);
            for aggregate_id in pipeline.aggregates.values() {
                out.push(self.dataset(*aggregate_id)?);
            }
        }
        Ok(out)
    }

    /// Widget signal definitions surface at the top level of the spec so
    /// external controls can drive them.
    fn widget_signals(&self) -> Vec<Value> {
        self.doc
            .widgets
            .values()
            .flat_map(|widget| widget.signals.iter().cloned())
            .collect()
    }

    fn group(&mut self, id: MarkId) -> Result<Vec<Value>, ExportError> {
        let mark = self.doc.mark(id)?.clone();
        let children = mark
            .children()
            .ok_or(DocumentError::NotAGroup(id))?
            .clone();
        let mut outputs = self.mark(id)?;

        {
            let group = &mut outputs[0];

            let mut scales = Vec::with_capacity(children.scales.len());
            for scale_id in &children.scales {
                scales.push(self.scale(*scale_id)?);
            }
            group["scales"] = Value::Array(scales);

            let mut axes = Vec::with_capacity(children.axes.len());
            for guide_id in &children.axes {
                axes.push(self.guide(*guide_id)?);
            }
            group["axes"] = Value::Array(axes);

            let mut legends = Vec::with_capacity(children.legends.len());
            for guide_id in &children.legends {
                legends.push(self.guide(*guide_id)?);
            }
            group["legends"] = Value::Array(legends);
        }

        // Internal mode expands each child into [mark, manipulators];
        // flatten the lot into this group's mark list.
        let mut mark_specs = Vec::new();
        for child_id in &children.marks {
            let child = self.doc.mark(*child_id)?;
            let exported = match child.mark_type {
                MarkType::Group => self.group(*child_id)?,
                MarkType::Area => self.area(*child_id)?,
                MarkType::Line => self.line(*child_id)?,
                _ => self.mark(*child_id)?,
            };
            mark_specs.extend(exported);
        }
        outputs[0]["marks"] = Value::Array(mark_specs);

        if Some(id) != self.doc.scene {
            // Nested scale ranges compute against the group's own span.
            let width = self.group_size(&mark, SpatialAxis::X);
            let height = self.group_size(&mark, SpatialAxis::Y);
            push_onto(
                &mut outputs[0],
                "signals",
                json!({"name": "width", "value": width}),
            );
            push_onto(
                &mut outputs[0],
                "signals",
                json!({"name": "height", "value": height}),
            );

            let group = std::mem::take(&mut outputs[0]);
            outputs[0] = demonstrations(group, id, self.doc);

            if !self.preview {
                self.apply_interactions(&mut outputs[0], &mark, &children.interactions)?;
            }
        }

        Ok(outputs)
    }

    /// Materialize committed interactions into this group's marks, signals,
    /// and data in place.
    fn apply_interactions(
        &mut self,
        group: &mut Value,
        mark: &Mark,
        interactions: &[vizier_doc::InteractionId],
    ) -> Result<(), ExportError> {
        if interactions.is_empty() {
            return Ok(());
        }
        let group_name = export_name(mark.name.as_deref().unwrap_or_default());
        for interaction_id in interactions {
            let interaction = self.doc.interaction(*interaction_id)?;
            let Some(selection) = &interaction.selection else {
                continue;
            };
            if interaction.applications.is_empty() {
                continue;
            }
            let mut wrapper = json!({ "marks": [std::mem::take(group)] });
            wrapper = add_selection_to_scene(wrapper, &group_name, selection);
            for application in &interaction.applications {
                wrapper = add_application_to_scene(wrapper, &group_name, application);
            }
            // Derived datasets synthesized by transform applications move
            // onto the group itself.
            let extra_data = take_array(&mut wrapper, "data");
            *group = wrapper["marks"][0].take();
            for dataset in extra_data {
                push_onto(group, "data", dataset);
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn mark(&mut self, id: MarkId) -> Result<Vec<Value>, ExportError> {
        let mark = self.doc.mark(id)?.clone();
        let wire = serde_json::to_value(&mark)
            .map_err(|err| ExportError::Render(err.to_string()))?;
        let mut spec = clean(wire, self.internal, self.doc);

        if let Some(from) = &mark.from {
            if let Some(ds_id) = from.data {
                let dataset = self.doc.dataset(ds_id)?;
                spec["from"]["data"] = json!(export_name(&dataset.name));
                self.counts.data_entry(ds_id).marks.insert(id);
            } else if let Some(mark_id) = from.mark {
                let source = self.doc.mark(mark_id)?;
                spec["from"]["mark"] =
                    json!(export_name(source.name.as_deref().unwrap_or_default()));
            }
        }

        for (key, orig) in &mark.encode.update {
            if orig.disabled {
                continue;
            }
            let Some(update) = spec
                .get_mut("encode")
                .and_then(|encode| encode.get_mut("update"))
            else {
                break;
            };
            let Some(spec_val) = update.get_mut(key) else {
                continue;
            };
            if !spec_val.is_object() {
                // A signal reference resolved to a literal during cleaning.
                *spec_val = json!({ "value": spec_val.take() });
            }
            if let Some(scale_id) = orig.scale {
                let scale = self.doc.scale(scale_id)?;
                spec_val["scale"] = json!(export_name(&scale.name));
                self.counts.scale_entry(scale_id).marks.insert(id);
            }
            if let Some(group_prop) = &orig.group {
                if let Some(object) = spec_val.as_object_mut() {
                    object.remove("group");
                    object.insert("field".into(), json!({ "group": group_prop }));
                }
            }
        }

        // Text templates become interpolating signal expressions.
        if mark.mark_type == MarkType::Text {
            if let Some(template) = mark
                .encode
                .update
                .get("text")
                .and_then(|entry| entry.template.as_deref())
            {
                spec["encode"]["update"]["text"] =
                    json!({ "signal": template_to_expression(template) });
            }
        }

        if self.internal {
            spec["role"] = json!(format!("vz_{id}"));
            return Ok(manipulators(&mark, spec));
        }
        Ok(vec![spec])
    }

    /// Path marks with no data source render against placeholder rows so
    /// an initial shape appears on the canvas.
    fn line(&mut self, id: MarkId) -> Result<Vec<Value>, ExportError> {
        let mut outputs = self.mark(id)?;
        let line = &mut outputs[0];
        if line.get("from").is_none() {
            line["from"] = json!({"data": "dummy_data"});
            line["encode"]["update"]["x"] = json!({
                "signal": format!("datum.x + {}", prop_signal(id, MarkType::Line, "x"))
            });
            line["encode"]["update"]["y"] = json!({
                "signal": format!("datum.y + {}", prop_signal(id, MarkType::Line, "y"))
            });
        }
        Ok(outputs)
    }

    fn area(&mut self, id: MarkId) -> Result<Vec<Value>, ExportError> {
        let mut outputs = self.mark(id)?;
        let area = &mut outputs[0];
        if area.get("from").is_none() {
            area["from"] = json!({"data": "dummy_data"});
            area["encode"]["update"]["x"] = json!({
                "signal": format!("datum.x + {}", prop_signal(id, MarkType::Area, "x"))
            });
            area["encode"]["update"]["y"] = json!({
                "signal": format!("datum.y + {}", prop_signal(id, MarkType::Area, "y"))
            });
        }
        // Only the trailing edge matching the orientation survives.
        let horizontal = area["encode"]["update"]["orient"]["value"] == json!("horizontal");
        if let Some(update) = area["encode"]["update"].as_object_mut() {
            if horizontal {
                update.remove("y2");
            } else {
                update.remove("x2");
            }
        }
        Ok(outputs)
    }

    fn dataset(&mut self, id: DatasetId) -> Result<Value, ExportError> {
        let dataset = self.doc.dataset(id)?.clone();
        let wire = serde_json::to_value(&dataset)
            .map_err(|err| ExportError::Render(err.to_string()))?;
        let mut spec = clean(wire, self.internal, self.doc);
        self.counts.data_entry(id);

        // Resolve the upstream reference to a name. Raw values are inlined
        // only for the editor's own view, or when the user supplied them
        // directly (no url to fetch from).
        if let Some(source_id) = dataset.source {
            let source = self.doc.dataset(source_id)?;
            spec["source"] = json!(export_name(&source.name));
        } else if self.internal {
            let rows = self.data.raw(id).unwrap_or(&[]);
            spec["values"] = json!(rows);
            if let Some(object) = spec.as_object_mut() {
                object.remove("url");
                // Inlined values are parsed rows already.
                object.remove("format");
            }
        } else if dataset.url.is_none() {
            let rows = self.data.raw(id).unwrap_or(&[]);
            spec["values"] = match dataset.format.as_ref().map(|format| format.ftype) {
                Some(FormatType::Csv) => json!(render_delimited(&dataset, rows, b',')?),
                Some(FormatType::Tsv) => json!(render_delimited(&dataset, rows, b'\t')?),
                _ => json!(rows),
            };
        }

        rewrite_defensive_filters(&mut spec);

        if let Some(sort) = &dataset.sort {
            let by = match sort.order {
                SortOrder::Asc => sort.field.clone(),
                SortOrder::Desc => format!("-{}", sort.field),
            };
            push_onto(&mut spec, "transform", json!({"type": "sort", "by": by}));
        }

        Ok(spec)
    }

    fn scale(&mut self, id: ScaleId) -> Result<Value, ExportError> {
        let scale = self.doc.scale(id)?.clone();
        let wire = serde_json::to_value(&scale)
            .map_err(|err| ExportError::Render(err.to_string()))?;
        let mut spec = clean(wire, self.internal, self.doc);
        self.counts.scale_entry(id);

        if spec.get("domain").is_none() && !scale.domain.is_empty() {
            spec["domain"] = data_ref(self.doc, &mut self.counts, &scale, &scale.domain)?;
        }
        if spec.get("range").is_none() && !scale.range_refs.is_empty() {
            spec["range"] = data_ref(self.doc, &mut self.counts, &scale, &scale.range_refs)?;
        }

        // Fold the backing dataset's sort direction into `reverse`.
        let sort_order = spec["domain"]
            .get(SORT_ORDER_KEY)
            .and_then(Value::as_str)
            .map(String::from);
        if let Some(order) = sort_order {
            let current = spec.get("reverse").and_then(Value::as_bool).unwrap_or(false);
            spec["reverse"] = json!(if order == "desc" { !current } else { false });
            if let Some(domain) = spec["domain"].as_object_mut() {
                domain.remove(SORT_ORDER_KEY);
            }
        }

        Ok(spec)
    }

    fn guide(&mut self, id: GuideId) -> Result<Value, ExportError> {
        let guide = self.doc.guide(id)?.clone();
        let wire = serde_json::to_value(&guide)
            .map_err(|err| ExportError::Render(err.to_string()))?;
        let mut spec = clean(wire, self.internal, self.doc);

        let scale = self.doc.scale(guide.scale)?;
        let scale_name = json!(export_name(&scale.name));
        match guide.channel {
            // Legends name their scale under the channel they explain.
            Some(channel) => {
                if let Some(object) = spec.as_object_mut() {
                    object.remove("scale");
                    object.insert(channel.key().into(), scale_name);
                }
            }
            None => {
                spec["scale"] = scale_name;
            }
        }
        self.counts.scale_entry(guide.scale).guides.insert(id);

        // Remaining literal encode values get explicit wrappers.
        if let Some(encode) = spec.get_mut("encode").and_then(Value::as_object_mut) {
            for block in encode.values_mut() {
                if let Some(props) = block.as_object_mut() {
                    for value in props.values_mut() {
                        if !value.is_object() {
                            *value = json!({ "value": value.take() });
                        }
                    }
                }
            }
        }

        Ok(spec)
    }

    /// A group's resolved span: the active width/height property, through
    /// its backing signal when one drives it.
    fn group_size(&self, mark: &Mark, axis: SpatialAxis) -> Value {
        let Some(entry) = mark.encode.update.get(span_name(axis)) else {
            return Value::Null;
        };
        if entry.disabled {
            return Value::Null;
        }
        if let Some(signal) = &entry.signal {
            return self.doc.signal_value(signal).cloned().unwrap_or(Value::Null);
        }
        entry.value.clone().unwrap_or(Value::Null)
    }
}

/// Rewrite filter expressions that test a selection store so an undefined
/// selection passes rows through instead of emptying the view.
fn rewrite_defensive_filters(spec: &mut Value) {
    let Some(transforms) = spec.get_mut("transform").and_then(Value::as_array_mut) else {
        return;
    };
    for transform in transforms {
        if transform["type"] != "filter" {
            continue;
        }
        let Some(expr) = transform["expr"].as_str() else {
            continue;
        };
        if expr.starts_with("!(length(data(") {
            continue;
        }
        let Some(store) = selection_store_name(expr) else {
            continue;
        };
        transform["expr"] = json!(format!("!(length(data(\"{store}\"))) || ({expr})"));
    }
}

fn selection_store_name(expr: &str) -> Option<&str> {
    let start = expr.find("vlSelectionTest(\"")? + "vlSelectionTest(\"".len();
    let end = expr[start..].find('"')?;
    Some(&expr[start..start + end])
}

/// Render rows as a delimited string, columns ordered by the dataset's
/// schema (falling back to the first row's fields).
fn render_delimited(
    dataset: &Dataset,
    rows: &[Value],
    delimiter: u8,
) -> Result<String, ExportError> {
    let columns: Vec<String> = if dataset.schema.is_empty() {
        rows.first()
            .and_then(Value::as_object)
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    } else {
        dataset.schema.keys().cloned().collect()
    };

    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    writer
        .write_record(&columns)
        .map_err(|err| ExportError::Render(err.to_string()))?;
    for row in rows {
        let record: Vec<String> = columns
            .iter()
            .map(|column| match row.get(column) {
                Some(Value::String(text)) => text.clone(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect();
        writer
            .write_record(&record)
            .map_err(|err| ExportError::Render(err.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Render(err.to_string()))?;
    String::from_utf8(bytes).map_err(|err| ExportError::Render(err.to_string()))
}

/// Build the `"" + datum.field + ""` interpolation expression from a
/// `{{datum.field}}` template.
fn template_to_expression(template: &str) -> String {
    let mut out = String::new();
    let mut rest = template;
    loop {
        let Some(start) = rest.find("{{") else {
            out.push_str(&format!("\"{rest}\""));
            break;
        };
        let (literal, tail) = rest.split_at(start);
        out.push_str(&format!("\"{literal}\""));
        let tail = &tail[2..];
        let Some(end) = tail.find("}}") else {
            out.push_str(&format!("\"{tail}\""));
            break;
        };
        let expr = &tail[..end];
        if expr.contains("datum") {
            out.push_str(&format!(" + {expr} + "));
        } else {
            out.push_str(&format!("\"{expr}\""));
        }
        rest = &tail[end + 2..];
    }
    out
}

fn push_onto(spec: &mut Value, key: &str, value: Value) {
    let Some(object) = spec.as_object_mut() else {
        return;
    };
    let entry = object
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if let Some(array) = entry.as_array_mut() {
        array.push(value);
    }
}

fn take_array(spec: &mut Value, key: &str) -> Vec<Value> {
    match spec.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_expression_interpolates_datum() {
        assert_eq!(
            template_to_expression("{{datum.price}}"),
            "\"\" + datum.price + \"\""
        );
        assert_eq!(
            template_to_expression("cost: {{datum.price}}!"),
            "\"cost: \" + datum.price + \"!\""
        );
    }

    #[test]
    fn defensive_filter_wraps_unguarded_selection_tests() {
        let mut spec = json!({
            "transform": [
                {"type": "filter", "expr": "vlSelectionTest(\"points_store_Group_1\", datum)"},
                {"type": "filter", "expr": "datum.a > 3"}
            ]
        });
        rewrite_defensive_filters(&mut spec);
        assert_eq!(
            spec["transform"][0]["expr"],
            "!(length(data(\"points_store_Group_1\"))) || (vlSelectionTest(\"points_store_Group_1\", datum))"
        );
        assert_eq!(spec["transform"][1]["expr"], "datum.a > 3");
    }

    #[test]
    fn defensive_filter_is_idempotent() {
        let guarded = "!(length(data(\"s\"))) || (vlSelectionTest(\"s\", datum))";
        let mut spec = json!({"transform": [{"type": "filter", "expr": guarded}]});
        rewrite_defensive_filters(&mut spec);
        assert_eq!(spec["transform"][0]["expr"], guarded);
    }
}
