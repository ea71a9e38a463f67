//! Value-tree rewrite helpers shared across the engine

use serde_json::Value;

/// Apply `rewrite` to every top-level mark of the scene that is the named
/// group.
pub(crate) fn map_group(spec: &mut Value, group_name: &str, rewrite: impl Fn(&mut Value)) {
    let Some(marks) = spec.get_mut("marks").and_then(Value::as_array_mut) else {
        return;
    };
    for mark in marks {
        if is_named_group(mark, group_name) {
            rewrite(mark);
        }
    }
}

/// True for a group mark carrying the given name. Manipulator groups have
/// no name and are never matched.
pub(crate) fn is_named_group(mark: &Value, group_name: &str) -> bool {
    mark.get("type").and_then(Value::as_str) == Some("group")
        && mark.get("name").and_then(Value::as_str) == Some(group_name)
}

/// Push a value onto an array-valued key, creating the array if needed.
pub(crate) fn push_onto(spec: &mut Value, key: &str, value: Value) {
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

/// Take an array-valued key, defaulting to empty.
pub(crate) fn take_array(spec: &mut Value, key: &str) -> Vec<Value> {
    match spec.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    }
}
