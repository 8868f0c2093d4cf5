//! Structural diff between two JSON snapshots.
//!
//! Walks the keys of the new value against the old one and keeps only what
//! changed or was added. Keys present only in the old value are not reported,
//! so a delta is a partial update, not a full state transition.

use serde_json::{Map, Value};

/// Changes from `old` to `new`, or `None` when they are equal.
///
/// Arrays are compared element by element and reported whole when any
/// element differs. A type change reports the new value whole.
pub fn deep_diff(old: &Value, new: &Value) -> Option<Value> {
    match (old, new) {
        (Value::Object(old), Value::Object(new)) => {
            let mut delta = Map::new();
            for (key, new_value) in new {
                let change = match old.get(key) {
                    Some(old_value) => deep_diff(old_value, new_value),
                    None => Some(new_value.clone()),
                };
                if let Some(change) = change {
                    delta.insert(key.clone(), change);
                }
            }
            (!delta.is_empty()).then_some(Value::Object(delta))
        }
        (Value::Array(old), Value::Array(new)) => {
            (old.len() != new.len() || old.iter().zip(new).any(|(a, b)| a != b))
                .then(|| Value::Array(new.clone()))
        }
        _ => (old != new).then(|| new.clone()),
    }
}
