//! Scale resolution
//!
//! Decides whether a compiled scale definition reuses an existing scale or
//! constructs a new one. The equality test is deliberately fuzzy on
//! domains: two domains over different datasets are equivalent when the
//! datasets belong to the same pipeline, which is exactly the case where a
//! prior channel's bind already derived an aggregate the current one can
//! share.

use crate::error::BindError;
use crate::fragment::CompiledFragment;
use crate::layout::compute_layout;
use serde_json::Value;
use vizier_doc::action::Action;
use vizier_doc::scale::{DomainRef, Scale, ScaleRange, ScaleType};
use vizier_doc::{DataRegistry, DatasetId, Document, ScaleId, Store};

/// A compiled scale definition, normalized for comparison. Domains keep
/// the *compiled* dataset name — resolving them to internal IDs is only
/// needed (and paid for) when a new scale is actually constructed.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScaleDef {
    pub name: String,
    pub scale_type: ScaleType,
    pub range: Option<ScaleRange>,
    pub domain: Option<CompiledDomain>,
    pub nice: Option<bool>,
    pub round: Option<bool>,
    pub zero: Option<bool>,
    pub points: Option<bool>,
    pub padding: Option<f64>,
}

/// Domain of a compiled scale.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CompiledDomain {
    /// Reference to a compiled data definition.
    DataRef {
        /// Compiled dataset name.
        data: String,
        /// Field within it.
        field: String,
    },
    /// Literal domain values.
    Literal(Value),
}

/// Resolve the fragment's scale for the bound channel. Returns the scale
/// the channel ended up mapped to, or `None` when the bind was skipped.
pub(crate) fn resolve_scale(
    store: &mut Store,
    data: &DataRegistry,
    fragment: &mut CompiledFragment,
) -> Result<Option<ScaleId>, BindError> {
    let channel = fragment.channel.clone();
    let matching: Vec<&Value> = fragment
        .output
        .scales
        .iter()
        .filter(|def| def.get("name").and_then(Value::as_str) == Some(channel.as_str()))
        .collect();
    if matching.is_empty() {
        return Ok(None);
    }
    if matching.len() != 1 {
        tracing::warn!(
            channel = %channel,
            found = matching.len(),
            "ambiguous scale set for channel, skipping bind"
        );
        return Ok(None);
    }

    let Some(def) = parse(matching[0]) else {
        tracing::warn!(channel = %channel, "unparseable scale definition, skipping bind");
        return Ok(None);
    };

    // Resolution order: the scale most recently bound to this channel,
    // then a linear scan of every scale in the document.
    let doc = store.present().clone();
    let mut resolved: Option<ScaleId> = fragment
        .map
        .scales
        .get(&channel)
        .copied()
        .filter(|prev| {
            doc.scales
                .get(prev)
                .is_some_and(|scale| equals(&doc, &def, scale, fragment))
        });
    if resolved.is_none() {
        resolved = doc
            .scales
            .values()
            .find(|scale| equals(&doc, &def, scale, fragment))
            .map(|scale| scale.id);
    }

    let scale_id = match resolved {
        Some(id) => id,
        None => {
            let Some(created) = create_scale(store, fragment, &def) else {
                return Ok(None);
            };
            // New ordinal scales spanning a dimension may force the layout
            // to grow so every band stays visible.
            let scale = store.present().scale(created)?.clone();
            compute_layout(store, data, &scale)?;
            created
        }
    };

    fragment.map.scales.insert(channel, scale_id);
    let parent = store.present().mark(fragment.mark_id)?.parent;
    if let Some(group) = parent {
        store.dispatch(Action::AddScaleToGroup {
            scale: scale_id,
            group,
        });
    }
    Ok(Some(scale_id))
}

/// Normalize a compiled scale definition. Channel-named spatial scales and
/// ranges carrying `width`/`height` signal references collapse to the
/// sentinels.
pub(crate) fn parse(def: &Value) -> Option<ScaleDef> {
    let name = def.get("name")?.as_str()?.to_string();
    let scale_type: ScaleType =
        serde_json::from_value(def.get("type").cloned().unwrap_or_else(|| "linear".into()))
            .ok()?;

    let raw_range = def.get("range");
    let range = if name == "x" || range_has_signal(raw_range, "width") {
        Some(ScaleRange::Width)
    } else if name == "y" || range_has_signal(raw_range, "height") {
        Some(ScaleRange::Height)
    } else {
        raw_range.cloned().map(ScaleRange::Literal)
    };

    let domain = def.get("domain").map(|domain| {
        match (
            domain.get("data").and_then(Value::as_str),
            domain.get("field").and_then(Value::as_str),
        ) {
            (Some(data), Some(field)) => CompiledDomain::DataRef {
                data: data.to_string(),
                field: field.to_string(),
            },
            _ => CompiledDomain::Literal(domain.clone()),
        }
    });

    Some(ScaleDef {
        name,
        scale_type,
        range,
        domain,
        nice: def.get("nice").and_then(Value::as_bool),
        round: def.get("round").and_then(Value::as_bool),
        zero: def.get("zero").and_then(Value::as_bool),
        points: def.get("points").and_then(Value::as_bool),
        padding: def.get("padding").and_then(Value::as_f64),
    })
}

fn range_has_signal(range: Option<&Value>, signal: &str) -> bool {
    range
        .and_then(Value::as_array)
        .is_some_and(|items| {
            items
                .iter()
                .any(|item| item.get("signal").and_then(Value::as_str) == Some(signal))
        })
}

/// Fuzzy equality between a compiled definition and an existing scale:
/// type, deep range, and — for data-ref domains — field plus backing
/// pipeline lineage. A domain dataset with no parent pipeline never
/// matches.
pub(crate) fn equals(
    doc: &Document,
    def: &ScaleDef,
    scale: &Scale,
    fragment: &CompiledFragment,
) -> bool {
    if scale.scale_type != def.scale_type {
        return false;
    }
    let def_range = serde_json::to_value(&def.range).unwrap_or(Value::Null);
    let scale_range = serde_json::to_value(&scale.range).unwrap_or(Value::Null);
    if def_range != scale_range {
        return false;
    }

    if let Some(CompiledDomain::DataRef { data, field }) = &def.domain {
        if let Some(existing) = scale.domain.first() {
            if existing.field != *field {
                return false;
            }
            let existing_pipeline = parent_pipeline(doc, existing.data);
            let incoming_pipeline = fragment
                .map
                .data
                .get(data)
                .and_then(|ds_id| parent_pipeline(doc, *ds_id));
            match (existing_pipeline, incoming_pipeline) {
                (Some(a), Some(b)) if a == b => {}
                _ => return false,
            }
        }
    }

    true
}

fn parent_pipeline(doc: &Document, ds_id: DatasetId) -> Option<vizier_doc::PipelineId> {
    doc.datasets.get(&ds_id).and_then(|dataset| dataset.parent)
}

/// Construct a new scale from the definition, translating its domain
/// reference to an internal dataset ID.
fn create_scale(
    store: &mut Store,
    fragment: &CompiledFragment,
    def: &ScaleDef,
) -> Option<ScaleId> {
    let mut scale = Scale::new(ScaleId(0), def.name.clone(), def.scale_type, def.range.clone());
    scale.nice = def.nice;
    scale.round = def.round;
    scale.zero = def.zero;
    scale.points = def.points;
    scale.padding = def.padding;

    if let Some(CompiledDomain::DataRef { data, field }) = &def.domain {
        let Some(ds_id) = fragment.map.data.get(data) else {
            tracing::warn!(
                data = %data,
                "scale domain references an unresolved data definition, skipping bind"
            );
            return None;
        };
        scale.domain.push(DomainRef {
            data: *ds_id,
            field: field.clone(),
        });
    }

    Some(store.add_scale(scale))
}
