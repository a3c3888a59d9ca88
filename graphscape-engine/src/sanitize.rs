// Non-finite float scrubbing ahead of serialization boundaries

use serde_json::Value;

/// JSON has no NaN or Infinity; any non-finite float becomes 0.0 before a
/// value crosses a serialization boundary.
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

/// Recursively replace non-finite numbers with 0.0 through nested objects
/// and arrays.
pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::Number(number) => {
            if let Some(float) = number.as_f64() {
                if !float.is_finite() {
                    *value = Value::from(0.0);
                }
            }
        }
        Value::Array(items) => {
            for item in items.iter_mut() {
                sanitize_value(item);
            }
        }
        Value::Object(map) => {
            for item in map.values_mut() {
                sanitize_value(item);
            }
        }
        _ => {}
    }
}
