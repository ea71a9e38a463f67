//! Demonstration scaffolding
//!
//! Wires a group for live interaction demonstration: the brush rectangle
//! marks, the brush/grid/points signal networks (drag, pan, zoom, scale
//! inversion), and the per-group backing data stores. The scaffolding is
//! parameterized by whichever of the group's axes carry usable scales; a
//! group with no usable scale on either axis is returned unmodified —
//! "cannot currently demonstrate" is a valid, silent outcome.

use crate::scale_info::get_scale_info_for_group;
use crate::util::push_onto;
use crate::{brush_store, grid_store, points_store};
use serde_json::{json, Value};
use vizier_doc::interaction::ScaleInfo;
use vizier_doc::{Document, MarkId};

/// Conditional expression helpers over the available axes.
struct AxisCond<'a> {
    info: &'a ScaleInfo,
}

impl AxisCond<'_> {
    fn if_x(&self, then: &str, otherwise: &str) -> String {
        if self.info.has_x() { then.into() } else { otherwise.into() }
    }

    fn if_y(&self, then: &str, otherwise: &str) -> String {
        if self.info.has_y() { then.into() } else { otherwise.into() }
    }

    fn if_xy(&self, then: &str) -> String {
        if self.info.has_x() && self.info.has_y() { then.into() } else { String::new() }
    }

    fn x_pair(&self) -> (String, String) {
        (
            self.info.x_field_name.clone().unwrap_or_default(),
            self.info.x_scale_name.clone().unwrap_or_default(),
        )
    }

    fn y_pair(&self) -> (String, String) {
        (
            self.info.y_field_name.clone().unwrap_or_default(),
            self.info.y_scale_name.clone().unwrap_or_default(),
        )
    }
}

/// Append the per-group selection data stores to a scene's data list.
pub fn demonstration_datasets(spec: &mut Value) {
    let group_names: Vec<String> = spec
        .get("marks")
        .and_then(Value::as_array)
        .map(|marks| {
            marks
                .iter()
                .filter(|mark| mark["type"] == "group")
                .filter_map(|mark| mark["name"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default();
    for name in group_names {
        push_onto(spec, "data", json!({"name": brush_store(&name)}));
        push_onto(spec, "data", json!({"name": grid_store(&name)}));
        push_onto(spec, "data", json!({"name": points_store(&name)}));
    }
}

/// Add demonstration signals and brush marks to an exported group spec.
/// Manipulator groups (no name) and groups without usable scales pass
/// through untouched.
#[must_use]
pub fn demonstrations(mut group_spec: Value, group_id: MarkId, doc: &Document) -> Value {
    let Some(group_name) = group_spec.get("name").and_then(Value::as_str).map(String::from)
    else {
        return group_spec;
    };
    let info = get_scale_info_for_group(doc, group_id);
    if !info.has_x() && !info.has_y() {
        // Likely no scales have been created yet.
        tracing::debug!(group = %group_id, "no usable scales, skipping demonstration scaffolding");
        return group_spec;
    }
    add_signals_to_group(&mut group_spec, &group_name, &info);
    add_marks_to_group(&mut group_spec, &group_name, &info);
    group_spec
}

fn add_marks_to_group(group_spec: &mut Value, group_name: &str, info: &ScaleInfo) {
    let cond = AxisCond { info };
    let store = brush_store(group_name);
    let in_unit = format!(
        "data(\"{store}\").length && data(\"{store}\")[0].unit === \"\""
    );

    let spatial = |axis_signal: &str, fallback: Value| -> Value {
        let mut rule = json!({"test": in_unit});
        let active = json!({"signal": axis_signal});
        let merged = if fallback.is_null() { active } else { fallback };
        if let (Some(dst), Some(src)) = (rule.as_object_mut(), merged.as_object()) {
            for (key, value) in src {
                dst.insert(key.clone(), value.clone());
            }
        }
        json!([rule, {"value": 0}])
    };

    let x_rule = |signal: &str| {
        if info.has_x() {
            spatial(signal, Value::Null)
        } else {
            spatial(signal, json!({"value": "0"}))
        }
    };
    let y_rule = |signal: &str| {
        if info.has_y() {
            spatial(signal, Value::Null)
        } else {
            spatial(signal, json!({"value": "0"}))
        }
    };
    let x2_rule = if info.has_x() {
        spatial("vz_brush_x[1]", Value::Null)
    } else {
        spatial("", json!({"signal": "width"}))
    };
    let y2_rule = if info.has_y() {
        spatial("vz_brush_y[1]", Value::Null)
    } else {
        spatial("", json!({"signal": "height"}))
    };

    let stroke_test = format!(
        "{}{}{}",
        cond.if_x("vz_brush_x[0] !== vz_brush_x[1]", ""),
        cond.if_xy(" && "),
        cond.if_y("vz_brush_y[0] !== vz_brush_y[1]", "")
    );

    push_onto(
        group_spec,
        "marks",
        json!({
            "name": "vz_brush_brush_bg",
            "type": "rect",
            "clip": true,
            "encode": {
                "enter": {
                    "fill": {"value": "#333"},
                    "fillOpacity": {"value": 0.125}
                },
                "update": {
                    "x": x_rule("vz_brush_x[0]"),
                    "y": y_rule("vz_brush_y[0]"),
                    "x2": x2_rule.clone(),
                    "y2": y2_rule.clone()
                }
            }
        }),
    );
    push_onto(
        group_spec,
        "marks",
        json!({
            "name": "vz_brush_brush",
            "type": "rect",
            "clip": true,
            "encode": {
                "enter": {
                    "fill": {"value": "transparent"}
                },
                "update": {
                    "x": x_rule("vz_brush_x[0]"),
                    "y": y_rule("vz_brush_y[0]"),
                    "x2": x2_rule,
                    "y2": y2_rule,
                    "stroke": [
                        {"test": stroke_test, "value": "white"},
                        {"value": null}
                    ]
                }
            }
        }),
    );
}

#[allow(clippy::too_many_lines)]
fn add_signals_to_group(group_spec: &mut Value, group_name: &str, info: &ScaleInfo) {
    let cond = AxisCond { info };
    let (x_field, x_scale) = cond.x_pair();
    let (y_field, y_scale) = cond.y_pair();
    let brush = brush_store(group_name);
    let grid = grid_store(group_name);
    let points = points_store(group_name);

    let brush_x_name = if info.has_x() {
        format!("brush_{x_field}_{x_scale}")
    } else {
        "brush_x_field_undefined".into()
    };
    let brush_y_name = if info.has_y() {
        format!("brush_{y_field}_{y_scale}")
    } else {
        "brush_y_field_undefined".into()
    };
    let grid_x_name = if info.has_x() {
        format!("grid_{x_field}_{x_scale}")
    } else {
        "grid_x_field_undefined".into()
    };
    let grid_y_name = if info.has_y() {
        format!("grid_{y_field}_{y_scale}")
    } else {
        "grid_y_field_undefined".into()
    };

    let not_brush_mark = "!event.item || event.item.mark.name !== \"vz_brush_brush\"";

    let brush_x_on = if info.has_x() {
        json!([{
            "events": {"signal": "vz_brush_x"},
            "update": format!(
                "vz_brush_x[0] === vz_brush_x[1] ? null : invert(\"{x_scale}\", vz_brush_x)"
            )
        }])
    } else {
        json!([])
    };
    let brush_y_on = if info.has_y() {
        json!([{
            "events": {"signal": "vz_brush_y"},
            "update": format!(
                "vz_brush_y[0] === vz_brush_y[1] ? null : invert(\"{y_scale}\", vz_brush_y)"
            )
        }])
    } else {
        json!([])
    };
    let grid_x_on = if info.has_x() {
        json!([
            {
                "events": {"signal": "grid_translate_delta"},
                "update": "panLinear(grid_translate_anchor.extent_x, -grid_translate_delta.x / width)"
            },
            {
                "events": {"signal": "grid_zoom_delta"},
                "update": format!("zoomLinear(domain(\"{x_scale}\"), grid_zoom_anchor.x, grid_zoom_delta)")
            },
            {"events": [{"source": "scope", "type": "dblclick"}], "update": "null"}
        ])
    } else {
        json!([])
    };
    let grid_y_on = if info.has_y() {
        json!([
            {
                "events": {"signal": "grid_translate_delta"},
                "update": "panLinear(grid_translate_anchor.extent_y, grid_translate_delta.y / height)"
            },
            {
                "events": {"signal": "grid_zoom_delta"},
                "update": format!("zoomLinear(domain(\"{y_scale}\"), grid_zoom_anchor.y, grid_zoom_delta)")
            },
            {"events": [{"source": "scope", "type": "dblclick"}], "update": "null"}
        ])
    } else {
        json!([])
    };

    let mut signals = vec![
        json!({"name": "vz_brush_is_x_encoding", "init": "false"}),
        json!({"name": "vz_brush_is_y_encoding", "init": "false"}),
        json!({
            "name": "vz_brush_x",
            "update": "vz_brush_is_y_encoding ? [width, 0] : brush_x"
        }),
        json!({
            "name": "vz_brush_y",
            "update": "vz_brush_is_x_encoding ? [0, height] : brush_y"
        }),
        json!({
            "name": "unit",
            "value": {},
            "on": [
                {"events": "mousemove", "update": "isTuple(group()) ? group() : unit"}
            ]
        }),
        json!({"name": "brush", "update": format!("vlSelectionResolve(\"{brush}\")")}),
        json!({"name": "grid", "update": format!("vlSelectionResolve(\"{grid}\")")}),
        json!({
            "name": "brush_x",
            "value": [],
            "on": [
                {
                    "events": {
                        "source": "scope",
                        "type": "mousedown",
                        "filter": [not_brush_mark]
                    },
                    "update": "[x(unit), x(unit)]"
                },
                {
                    "events": {
                        "source": "window",
                        "type": "mousemove",
                        "consume": true,
                        "between": [
                            {"source": "scope", "type": "mousedown", "filter": [not_brush_mark]},
                            {"source": "window", "type": "mouseup"}
                        ]
                    },
                    "update": "[brush_x[0], clamp(x(unit), 0, width)]"
                },
                {
                    "events": {"signal": "brush_scale_trigger"},
                    "update": cond.if_x(
                        &format!(
                            "isArray({brush_x_name}) && length({brush_x_name}) == 2 ? \
                             [scale(\"{x_scale}\", {brush_x_name}[0]), scale(\"{x_scale}\", {brush_x_name}[1])] : [0, 0]"
                        ),
                        "[width, 0]"
                    )
                },
                {
                    "events": {"signal": "brush_translate_delta"},
                    "update": "clampRange(panLinear(brush_translate_anchor.extent_x, brush_translate_delta.x / span(brush_translate_anchor.extent_x)), 0, width)"
                },
                {
                    "events": {"signal": "brush_zoom_delta"},
                    "update": "clampRange(zoomLinear(brush_x, brush_zoom_anchor.x, brush_zoom_delta), 0, width)"
                },
                {
                    "events": [{"source": "scope", "type": "dblclick"}],
                    "update": "[0, 0]"
                }
            ]
        }),
        json!({
            "name": &brush_x_name,
            "on": brush_x_on
        }),
        json!({
            "name": "brush_y",
            "value": [],
            "on": [
                {
                    "events": {
                        "source": "scope",
                        "type": "mousedown",
                        "filter": [not_brush_mark]
                    },
                    "update": "[y(unit), y(unit)]"
                },
                {
                    "events": {
                        "source": "window",
                        "type": "mousemove",
                        "consume": true,
                        "between": [
                            {"source": "scope", "type": "mousedown", "filter": [not_brush_mark]},
                            {"source": "window", "type": "mouseup"}
                        ]
                    },
                    "update": "[brush_y[0], clamp(y(unit), 0, height)]"
                },
                {
                    "events": {"signal": "brush_scale_trigger"},
                    "update": cond.if_y(
                        &format!(
                            "isArray({brush_y_name}) && length({brush_y_name}) == 2 ? \
                             [scale(\"{y_scale}\", {brush_y_name}[0]), scale(\"{y_scale}\", {brush_y_name}[1])] : [0, 0]"
                        ),
                        "[0, height]"
                    )
                },
                {
                    "events": {"signal": "brush_translate_delta"},
                    "update": "clampRange(panLinear(brush_translate_anchor.extent_y, brush_translate_delta.y / span(brush_translate_anchor.extent_y)), 0, height)"
                },
                {
                    "events": {"signal": "brush_zoom_delta"},
                    "update": "clampRange(zoomLinear(brush_y, brush_zoom_anchor.y, brush_zoom_delta), 0, height)"
                },
                {
                    "events": [{"source": "scope", "type": "dblclick"}],
                    "update": "[0, 0]"
                }
            ]
        }),
        json!({
            "name": &brush_y_name,
            "on": brush_y_on
        }),
        json!({
            "name": "brush_scale_trigger",
            "value": {},
            "on": [{
                "events": scale_trigger_events(info),
                "update": format!(
                    "{}{}{} ? brush_scale_trigger : {{}}",
                    cond.if_x(
                        &format!(
                            "(!isArray({brush_x_name}) || (+invert(\"{x_scale}\", vz_brush_x)[0] === +{brush_x_name}[0] && +invert(\"{x_scale}\", vz_brush_x)[1] === +{brush_x_name}[1]))"
                        ),
                        ""
                    ),
                    cond.if_xy(" && "),
                    cond.if_y(
                        &format!(
                            "(!isArray({brush_y_name}) || (+invert(\"{y_scale}\", vz_brush_y)[0] === +{brush_y_name}[0] && +invert(\"{y_scale}\", vz_brush_y)[1] === +{brush_y_name}[1]))"
                        ),
                        ""
                    )
                )
            }]
        }),
        json!({
            "name": "brush_tuple",
            "on": [{
                "events": [{
                    "signal": format!(
                        "{}{}{}",
                        cond.if_x(&brush_x_name, ""),
                        cond.if_xy(" || "),
                        cond.if_y(&brush_y_name, "")
                    )
                }],
                "update": format!(
                    "{}{}{} ? {{unit: \"\", fields: tuple_fields, values: [{}{}{}]}} : null",
                    cond.if_x(&brush_x_name, ""),
                    cond.if_xy(" && "),
                    cond.if_y(&brush_y_name, ""),
                    cond.if_x(&brush_x_name, ""),
                    cond.if_xy(","),
                    cond.if_y(&brush_y_name, "")
                )
            }]
        }),
        json!({
            "name": "tuple_fields",
            "value": tuple_fields(info, &x_field, &y_field)
        }),
        json!({
            "name": "brush_translate_anchor",
            "value": {},
            "on": [{
                "events": [{"source": "scope", "type": "mousedown", "markname": "vz_brush_brush"}],
                "update": "{x: x(unit), y: y(unit), extent_x: slice(vz_brush_x), extent_y: slice(vz_brush_y)}"
            }]
        }),
        json!({
            "name": "brush_translate_delta",
            "value": {},
            "on": [{
                "events": [{
                    "source": "window",
                    "type": "mousemove",
                    "consume": true,
                    "between": [
                        {"source": "scope", "type": "mousedown", "markname": "vz_brush_brush"},
                        {"source": "window", "type": "mouseup"}
                    ]
                }],
                "update": "{x: brush_translate_anchor.x - x(unit), y: brush_translate_anchor.y - y(unit)}"
            }]
        }),
        json!({
            "name": "brush_zoom_anchor",
            "on": [{
                "events": [{"source": "scope", "type": "wheel", "consume": true, "markname": "vz_brush_brush"}],
                "update": "{x: x(unit), y: y(unit)}"
            }]
        }),
        json!({
            "name": "brush_zoom_delta",
            "on": [{
                "events": [{"source": "scope", "type": "wheel", "consume": true, "markname": "vz_brush_brush"}],
                "force": true,
                "update": "pow(1.001, event.deltaY * pow(16, event.deltaMode))"
            }]
        }),
        json!({
            "name": "brush_modify",
            "update": format!("modify(\"{brush}\", brush_tuple, true)")
        }),
        json!({
            "name": &grid_x_name,
            "on": grid_x_on
        }),
        json!({
            "name": &grid_y_name,
            "on": grid_y_on
        }),
        json!({
            "name": "grid_tuple",
            "on": [{
                "events": [{
                    "signal": format!(
                        "{}{}{}",
                        cond.if_x(&grid_x_name, ""),
                        cond.if_xy(" || "),
                        cond.if_y(&grid_y_name, "")
                    )
                }],
                "update": format!(
                    "{}{}{}? {{unit: \"\", fields: tuple_fields, values: [{}{}{}]}} : null",
                    cond.if_x(&grid_x_name, ""),
                    cond.if_xy(" && "),
                    cond.if_y(&grid_y_name, ""),
                    cond.if_x(&grid_x_name, ""),
                    cond.if_xy(","),
                    cond.if_y(&grid_y_name, "")
                )
            }]
        }),
        json!({
            "name": "grid_translate_anchor",
            "value": {},
            "on": [{
                "events": [{"source": "scope", "type": "mousedown"}],
                "update": format!(
                    "{{x: x(unit), y: y(unit){}{}}}",
                    cond.if_x(&format!(", extent_x: domain(\"{x_scale}\")"), ""),
                    cond.if_y(&format!(", extent_y: domain(\"{y_scale}\")"), "")
                )
            }]
        }),
        json!({
            "name": "grid_translate_delta",
            "value": {},
            "on": [{
                "events": [{
                    "source": "window",
                    "type": "mousemove",
                    "consume": true,
                    "between": [
                        {"source": "scope", "type": "mousedown"},
                        {"source": "window", "type": "mouseup"}
                    ]
                }],
                "update": "{x: grid_translate_anchor.x - x(unit), y: grid_translate_anchor.y - y(unit)}"
            }]
        }),
        json!({
            "name": "grid_zoom_anchor",
            "on": [{
                "events": [{"source": "scope", "type": "wheel", "consume": true}],
                "update": format!(
                    "{{{}{}{}}}",
                    cond.if_x(&format!("x: invert(\"{x_scale}\", x(unit))"), ""),
                    cond.if_xy(", "),
                    cond.if_y(&format!("y: invert(\"{y_scale}\", y(unit))"), "")
                )
            }]
        }),
        json!({
            "name": "grid_zoom_delta",
            "on": [{
                "events": [{"source": "scope", "type": "wheel", "consume": true}],
                "force": true,
                "update": "pow(1.001, event.deltaY * pow(16, event.deltaMode))"
            }]
        }),
        json!({
            "name": "grid_modify",
            "update": format!("modify(\"{grid}\", grid_tuple, true)")
        }),
        json!({"name": "points", "update": format!("vlSelectionResolve(\"{points}\")")}),
        json!({
            "name": "points_tuple",
            "on": [
                {
                    "events": [{"source": "scope", "type": "click"}],
                    "update": "datum && !datum.manipulator && item().mark.marktype !== 'group' ? {unit: \"layer_0\", fields: points_tuple_fields, values: [(item().isVoronoi ? datum.datum : datum)[\"_vgsid_\"]]} : null",
                    "force": true
                },
                {"events": [{"source": "scope", "type": "dblclick"}], "update": "null"}
            ]
        }),
        json!({
            "name": "points_tuple_fields",
            "value": [{"type": "E", "field": "_vgsid_"}]
        }),
        json!({"name": "points_toggle", "init": false}),
        json!({
            "name": "points_modify",
            "update": format!(
                "modify(\"{points}\", points_toggle ? null : points_tuple, points_toggle ? null : true, points_toggle ? points_tuple : null)"
            )
        }),
    ];

    let existing = crate::util::take_array(group_spec, "signals");
    let mut merged = existing;
    merged.append(&mut signals);
    group_spec["signals"] = Value::Array(merged);
}

fn scale_trigger_events(info: &ScaleInfo) -> Value {
    let mut events = Vec::new();
    if info.has_x() {
        events.push(json!({"scale": "x"}));
    }
    if info.has_y() {
        events.push(json!({"scale": "y"}));
    }
    Value::Array(events)
}

fn tuple_fields(info: &ScaleInfo, x_field: &str, y_field: &str) -> Value {
    let mut fields = Vec::new();
    if info.has_x() {
        fields.push(json!({"field": x_field, "channel": "x", "type": "R"}));
    }
    if info.has_y() {
        fields.push(json!({"field": y_field, "channel": "y", "type": "R"}));
    }
    Value::Array(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vizier_doc::encode::EncodeValue;
    use vizier_doc::marks::{Mark, MarkType};
    use vizier_doc::scale::{DomainRef, Scale, ScaleRange, ScaleType};
    use vizier_doc::{DatasetId, ScaleId, Store};

    fn group_with_x_scale() -> (Store, MarkId) {
        let mut store = Store::new();
        let scene = store.create_scene();
        let mut group = Mark::new(MarkId(0), MarkType::Group);
        group.parent = Some(scene);
        group.name = Some("Group 1".into());
        let group_id = store.add_mark(group);

        let mut scale = Scale::new(ScaleId(0), "x", ScaleType::Linear, Some(ScaleRange::Width));
        scale.domain.push(DomainRef {
            data: DatasetId(50),
            field: "price".into(),
        });
        let scale_id = store.add_scale(scale);

        let mut rect = Mark::new(MarkId(0), MarkType::Rect);
        rect.parent = Some(group_id);
        rect.encode
            .update
            .insert("x".into(), EncodeValue::scaled_field(scale_id, "price"));
        store.add_mark(rect);
        (store, group_id)
    }

    #[test]
    fn demonstrations_require_a_usable_scale() {
        let mut store = Store::new();
        let scene = store.create_scene();
        let mut group = Mark::new(MarkId(0), MarkType::Group);
        group.parent = Some(scene);
        let group_id = store.add_mark(group);

        let spec = json!({"name": "Group_1", "marks": [], "signals": []});
        let out = demonstrations(spec.clone(), group_id, &store.snapshot());
        assert_eq!(out, spec);
    }

    #[test]
    fn demonstrations_add_brush_marks_and_signals() {
        let (store, group_id) = group_with_x_scale();
        let spec = json!({"name": "Group_1", "marks": [], "signals": []});
        let out = demonstrations(spec, group_id, &store.snapshot());

        let marks = out["marks"].as_array().unwrap();
        let names: Vec<&str> = marks.iter().map(|m| m["name"].as_str().unwrap()).collect();
        assert_eq!(names, ["vz_brush_brush_bg", "vz_brush_brush"]);

        let signal_names: Vec<&str> = out["signals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["name"].as_str().unwrap())
            .collect();
        assert!(signal_names.contains(&"brush_x"));
        assert!(signal_names.contains(&"brush_price_x"));
        assert!(signal_names.contains(&"grid_price_x"));
        assert!(signal_names.contains(&"brush_y_field_undefined"));
        assert!(signal_names.contains(&"points_modify"));
    }

    #[test]
    fn manipulator_groups_pass_through() {
        let (store, group_id) = group_with_x_scale();
        let spec = json!({"marks": [], "signals": []});
        let out = demonstrations(spec.clone(), group_id, &store.snapshot());
        assert_eq!(out, spec);
    }

    #[test]
    fn stores_are_appended_per_group() {
        let mut spec = json!({
            "data": [{"name": "cars"}],
            "marks": [
                {"name": "Group_1", "type": "group"},
                {"type": "rect"}
            ]
        });
        demonstration_datasets(&mut spec);
        let names: Vec<&str> = spec["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(
            names,
            [
                "cars",
                "brush_store_Group_1",
                "grid_store_Group_1",
                "points_store_Group_1"
            ]
        );
    }
}
