//! Application scaffolding
//!
//! Rewrites an exported scene so a selection has a visible effect: a
//! two-rule conditional on a mark property, a scale-domain override for
//! pan/zoom, or a derived filtered dataset for cross-group filtering.
//! Later-applied interactions compose with earlier ones — an existing rule
//! on the same property is conjoined, never clobbered.

use crate::util::{is_named_group, map_group};
use crate::{brush_store, points_store, selection_test};
use serde_json::{json, Value};
use vizier_doc::interaction::ApplicationDef;
use vizier_doc::signal::NS;

/// Apply a provisional application to the named group of an exported scene.
#[must_use]
pub fn add_application_to_scene(
    spec: Value,
    group_name: &str,
    application: &ApplicationDef,
) -> Value {
    match application {
        ApplicationDef::Mark(app) => {
            let store = if app.is_demonstrating_interval {
                brush_store(group_name)
            } else {
                points_store(group_name)
            };
            let rules = json!([
                {
                    "test": selection_test(&store),
                    // Overwritten with the mark's own value when one is
                    // already bound.
                    "value": ""
                },
                {"value": &app.default_value}
            ]);
            let mut update = serde_json::Map::new();
            update.insert(app.property_name.clone(), rules);
            let props = json!({"encode": {"update": update}});
            apply_mark_properties(spec, group_name, &app.target_mark_name, &props)
        }
        ApplicationDef::Scale(app) => {
            let info = &app.scale_info;
            let spec = remove_brush_marks(spec, group_name);
            let spec = clip_group(spec, group_name);
            let overrides = vec![
                json!({
                    "name": &info.x_scale_name,
                    "domainRaw": {
                        "signal": format!(
                            "grid[\"{}\"]",
                            info.x_field_name.as_deref().unwrap_or_default()
                        )
                    },
                    "zero": false
                }),
                json!({
                    "name": &info.y_scale_name,
                    "domainRaw": {
                        "signal": format!(
                            "grid[\"{}\"]",
                            info.y_field_name.as_deref().unwrap_or_default()
                        )
                    },
                    "zero": false
                }),
            ];
            apply_scale_properties(spec, group_name, &overrides)
        }
        ApplicationDef::Transform(app) => {
            let new_dataset_name =
                format!("{}_filter_{}", app.dataset_name, app.target_group_name);
            let store = if app.is_demonstrating_interval {
                brush_store(group_name)
            } else {
                points_store(group_name)
            };

            let mut spec = apply_mark_properties(
                spec,
                &app.target_group_name,
                &app.target_mark_name,
                &json!({"from": {"data": &new_dataset_name}}),
            );

            let (source, mut transforms) = collect_transforms(&spec, &app.dataset_name);
            let mut transform = vec![json!({
                "type": "filter",
                "expr": selection_test(&store),
            })];
            transform.append(&mut transforms);

            apply_dataset_properties(
                &mut spec,
                json!({
                    "name": new_dataset_name,
                    "source": source,
                    "transform": transform
                }),
            );
            spec
        }
    }
}

/// Merge properties into the named mark of the named group. Encode rules
/// compose with whatever is already bound:
/// - a prior scalar binding (value/signal/field) is folded into the new
///   conditional's first rule, replacing its placeholder value;
/// - a prior conditional's test is conjoined and its value preserved.
fn apply_mark_properties(
    mut spec: Value,
    group_name: &str,
    mark_name: &str,
    properties: &Value,
) -> Value {
    map_group(&mut spec, group_name, |group| {
        let Some(marks) = group.get_mut("marks").and_then(Value::as_array_mut) else {
            return;
        };
        for mark in marks {
            if mark["type"] == "group"
                || mark["name"]
                    .as_str()
                    .is_some_and(|name| name.starts_with(NS))
            {
                continue;
            }
            if mark["name"].as_str() != Some(mark_name) {
                continue;
            }
            let Some(props) = properties.as_object() else {
                continue;
            };
            for (key, value) in props {
                if key != "encode" {
                    mark[key.as_str()] = value.clone();
                }
            }
            let Some(update) = properties
                .get("encode")
                .and_then(|encode| encode.get("update"))
                .and_then(Value::as_object)
            else {
                continue;
            };
            for (key, value) in update {
                let mut rules = value.clone();
                let old_value = mark["encode"]["update"].get(key).cloned();
                if let Some(old_value) = old_value {
                    compose_rules(&mut rules, &old_value);
                }
                mark["encode"]["update"][key.as_str()] = rules;
            }
        }
    });
    spec
}

fn compose_rules(rules: &mut Value, old_value: &Value) {
    let is_scalar_binding = old_value.get("value").is_some()
        || old_value.get("signal").is_some()
        || old_value.get("field").is_some();

    if is_scalar_binding {
        if let (Some(first), Some(old)) = (
            rules.get_mut(0).and_then(Value::as_object_mut),
            old_value.as_object(),
        ) {
            first.remove("value");
            for (key, value) in old {
                first.insert(key.clone(), value.clone());
            }
        }
        return;
    }

    // A prior conditional: conjoin tests, keep its value.
    let Some(old_first) = old_value.get(0) else {
        return;
    };
    let Some(old_test) = old_first.get("test").and_then(Value::as_str) else {
        return;
    };
    let new_test = rules
        .get(0)
        .and_then(|rule| rule.get("test"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if new_test.contains(old_test) {
        return;
    }
    if let Some(first) = rules.get_mut(0).and_then(Value::as_object_mut) {
        first.insert("test".into(), json!(format!("{new_test} && {old_test}")));
        if let Some(old_rule_value) = old_first.get("value") {
            first.insert("value".into(), old_rule_value.clone());
        }
    }
}

/// Drop the synthesized brush-overlay marks from a group (pan/zoom replaces
/// the brush).
fn remove_brush_marks(mut spec: Value, group_name: &str) -> Value {
    map_group(&mut spec, group_name, |group| {
        if let Some(marks) = group.get_mut("marks").and_then(Value::as_array_mut) {
            marks.retain(|mark| {
                !mark["name"]
                    .as_str()
                    .is_some_and(|name| name.starts_with(NS))
            });
        }
    });
    spec
}

fn clip_group(mut spec: Value, group_name: &str) -> Value {
    map_group(&mut spec, group_name, |group| {
        group["clip"] = json!({"value": true});
    });
    spec
}

/// Merge overrides into same-named scales of the named group.
fn apply_scale_properties(mut spec: Value, group_name: &str, overrides: &[Value]) -> Value {
    map_group(&mut spec, group_name, |group| {
        let Some(scales) = group.get_mut("scales").and_then(Value::as_array_mut) else {
            return;
        };
        for scale in scales {
            for props in overrides {
                if scale["name"] != props["name"] {
                    continue;
                }
                if let (Some(dst), Some(src)) = (scale.as_object_mut(), props.as_object()) {
                    for (key, value) in src {
                        dst.insert(key.clone(), value.clone());
                    }
                }
            }
        }
    });
    spec
}

/// Walk a dataset's source chain upward, collecting its transforms with
/// structural dedup (serialized comparison, first occurrence wins), and
/// return the chain's root source name.
fn collect_transforms(spec: &Value, dataset_name: &str) -> (String, Vec<Value>) {
    let mut transforms: Vec<Value> = Vec::new();
    let mut current = dataset_name.to_string();
    loop {
        let Some(dataset) = spec["data"]
            .as_array()
            .and_then(|data| data.iter().find(|d| d["name"] == current.as_str()))
        else {
            return (current, transforms);
        };
        if let Some(own) = dataset.get("transform").and_then(Value::as_array) {
            for tx in own {
                let serialized = tx.to_string();
                if !transforms.iter().any(|seen| seen.to_string() == serialized) {
                    transforms.push(tx.clone());
                }
            }
        }
        match dataset.get("source").and_then(Value::as_str) {
            Some(source) => current = source.to_string(),
            None => return (current, transforms),
        }
    }
}

fn apply_dataset_properties(spec: &mut Value, dataset: Value) {
    crate::util::push_onto(spec, "data", dataset);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vizier_doc::interaction::{
        MarkApplication, ScaleApplication, ScaleInfo, TransformApplication,
    };

    fn scene() -> Value {
        json!({
            "data": [
                {"name": "cars", "transform": [{"type": "filter", "expr": "datum.a > 0"}]},
                {"name": "cars_sub", "source": "cars",
                 "transform": [{"type": "filter", "expr": "datum.a > 0"},
                               {"type": "formula", "expr": "datum.a * 2", "as": "b"}]}
            ],
            "marks": [{
                "name": "Group_1",
                "type": "group",
                "scales": [
                    {"name": "x", "type": "linear", "domain": {"data": "cars", "field": "a"}},
                    {"name": "y", "type": "linear", "domain": {"data": "cars", "field": "b"}}
                ],
                "marks": [
                    {"name": "Rect_1", "type": "rect",
                     "encode": {"update": {"fill": {"value": "steelblue"}}}},
                    {"name": "vz_brush_brush", "type": "rect", "encode": {"update": {}}}
                ]
            }]
        })
    }

    fn mark_application() -> ApplicationDef {
        ApplicationDef::Mark(MarkApplication {
            target_mark_name: "Rect_1".into(),
            property_name: "fill".into(),
            default_value: json!("grey"),
            is_demonstrating_interval: true,
        })
    }

    #[test]
    fn mark_application_builds_two_rule_conditional() {
        let out = add_application_to_scene(scene(), "Group_1", &mark_application());
        let fill = &out["marks"][0]["marks"][0]["encode"]["update"]["fill"];
        let rules = fill.as_array().unwrap();
        assert_eq!(rules.len(), 2);
        // The prior scalar binding replaced the placeholder value.
        assert_eq!(rules[0]["value"], "steelblue");
        assert!(rules[0]["test"]
            .as_str()
            .unwrap()
            .contains("brush_store_Group_1"));
        assert_eq!(rules[1], json!({"value": "grey"}));
    }

    #[test]
    fn second_application_conjoins_tests() {
        let once = add_application_to_scene(scene(), "Group_1", &mark_application());
        let second = ApplicationDef::Mark(MarkApplication {
            target_mark_name: "Rect_1".into(),
            property_name: "fill".into(),
            default_value: json!("silver"),
            is_demonstrating_interval: false,
        });
        let twice = add_application_to_scene(once, "Group_1", &second);
        let rules = twice["marks"][0]["marks"][0]["encode"]["update"]["fill"]
            .as_array()
            .unwrap();
        let test = rules[0]["test"].as_str().unwrap();
        assert!(test.contains("points_store_Group_1"));
        assert!(test.contains(" && "));
        assert!(test.contains("brush_store_Group_1"));
        assert_eq!(rules[0]["value"], "steelblue");
    }

    #[test]
    fn scale_application_overrides_domains_and_clips() {
        let info = ScaleInfo {
            x_scale_name: Some("x".into()),
            x_field_name: Some("a".into()),
            y_scale_name: Some("y".into()),
            y_field_name: Some("b".into()),
            ..ScaleInfo::default()
        };
        let app = ApplicationDef::Scale(ScaleApplication { scale_info: info });
        let out = add_application_to_scene(scene(), "Group_1", &app);
        let group = &out["marks"][0];
        assert_eq!(group["clip"], json!({"value": true}));
        // Brush overlays are gone.
        assert_eq!(group["marks"].as_array().unwrap().len(), 1);
        let x = &group["scales"][0];
        assert_eq!(x["domainRaw"], json!({"signal": "grid[\"a\"]"}));
        assert_eq!(x["zero"], json!(false));
    }

    #[test]
    fn transform_application_derives_filtered_dataset() {
        let app = ApplicationDef::Transform(TransformApplication {
            dataset_name: "cars_sub".into(),
            target_group_name: "Group_1".into(),
            target_mark_name: "Rect_1".into(),
            is_demonstrating_interval: false,
        });
        let out = add_application_to_scene(scene(), "Group_1", &app);

        let mark = &out["marks"][0]["marks"][0];
        assert_eq!(mark["from"], json!({"data": "cars_sub_filter_Group_1"}));

        let derived = out["data"].as_array().unwrap().last().unwrap();
        assert_eq!(derived["name"], "cars_sub_filter_Group_1");
        assert_eq!(derived["source"], "cars");
        let transforms = derived["transform"].as_array().unwrap();
        // Selection filter first, then the deduplicated chain (the shared
        // filter appears once despite living in both datasets).
        assert!(transforms[0]["expr"]
            .as_str()
            .unwrap()
            .contains("points_store_Group_1"));
        assert_eq!(transforms.len(), 3);
    }

    #[test]
    fn preview_rewrites_never_touch_the_document() {
        use vizier_doc::Store;
        let mut store = Store::new();
        store.create_scene();
        let before = store.snapshot();
        let _ = add_application_to_scene(scene(), "Group_1", &mark_application());
        assert_eq!(store.snapshot(), before);
    }
}
