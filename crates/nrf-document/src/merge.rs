//! Overlay merge for partial updates
//!
//! Objects are merged key by key. A null or absent overlay value keeps the
//! base value. Arrays and scalars in the overlay replace the base wholesale.

use serde_json::Value;

/// Overlay `patch` onto `base`
#[must_use]
pub fn overlay(base: &Value, patch: &Value) -> Value {
    match (base, patch) {
        (_, Value::Null) => base.clone(),
        (Value::Object(base_map), Value::Object(patch_map)) => {
            let mut merged = base_map.clone();
            for (key, patch_value) in patch_map {
                let next = match merged.get(key) {
                    Some(base_value) => overlay(base_value, patch_value),
                    None if patch_value.is_null() => continue,
                    None => patch_value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Object(merged)
        }
        _ => patch.clone(),
    }
}
