//! Deep merge, unset stripping and path helpers over JSON trees
//!
//! `Value::Null` and a missing key both mean "unset". Arrays are leaves.

use serde_json::{Map, Value};

/// Merge `overlay` into `base`. Records merge key by key at every depth,
/// every other defined overlay value replaces the base value wholesale.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    let Value::Object(entries) = overlay else {
        if !overlay.is_null() {
            *base = overlay.clone();
        }
        return;
    };

    if !base.is_object() {
        *base = Value::Object(Map::new());
    }
    if let Value::Object(target) = base {
        for (key, value) in entries {
            match value {
                Value::Null => {}
                Value::Object(_) => {
                    let slot = target
                        .entry(key.clone())
                        .or_insert_with(|| Value::Object(Map::new()));
                    deep_merge(slot, value);
                }
                _ => {
                    target.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

/// Remove every unset value, then every record left empty by that removal.
///
/// Returns `None` when nothing defined survives.
pub fn strip_unset(value: Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::Object(entries) => {
            let kept: Map<String, Value> = entries
                .into_iter()
                .filter_map(|(key, value)| strip_unset(value).map(|value| (key, value)))
                .collect();
            if kept.is_empty() {
                None
            } else {
                Some(Value::Object(kept))
            }
        }
        other => Some(other),
    }
}

/// Dotted paths of every leaf under `value`, in key order.
pub fn leaf_paths(value: &Value) -> Vec<String> {
    let mut paths = Vec::new();
    collect_leaves(value, "", &mut paths);
    paths
}

fn collect_leaves(value: &Value, prefix: &str, out: &mut Vec<String>) {
    match value {
        Value::Object(entries) => {
            for (key, child) in entries {
                collect_leaves(child, &join_path(prefix, key), out);
            }
        }
        _ if prefix.is_empty() => {}
        _ => out.push(prefix.to_string()),
    }
}

/// Look up a dotted path.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(root, |node, segment| node.as_object()?.get(segment))
}

/// Write `value` at a dotted path, creating intermediate records.
pub fn set_path(root: &mut Value, path: &str, value: Value) {
    match path.split_once('.') {
        Some((head, rest)) => {
            let child = as_record(root)
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            set_path(child, rest, value);
        }
        None => {
            as_record(root).insert(path.to_string(), value);
        }
    }
}

fn as_record(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(entries) => entries,
        _ => unreachable!("value was just replaced with a record"),
    }
}

pub(crate) fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}
