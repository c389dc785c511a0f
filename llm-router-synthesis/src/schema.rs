use serde_json::{json, Map, Value};

/// Describes the shape of `value` by type name, recursively.
///
/// Arrays are described by their first element.
pub fn derive_schema(value: &Value) -> Value {
    match value {
        Value::Null => json!({"type": "null"}),
        Value::Bool(_) => json!({"type": "boolean"}),
        Value::Number(n) if n.is_f64() => json!({"type": "number"}),
        Value::Number(_) => json!({"type": "integer"}),
        Value::String(_) => json!({"type": "string"}),
        Value::Array(items) => json!({
            "type": "array",
            "items": items.first().map(derive_schema).unwrap_or_else(|| json!({})),
        }),
        Value::Object(map) => {
            let properties: Map<String, Value> = map
                .iter()
                .map(|(key, value)| (key.clone(), derive_schema(value)))
                .collect();
            json!({"type": "object", "properties": properties})
        }
    }
}
