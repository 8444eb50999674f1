use serde_json::Value;

/// Render a scalar field as text: strings verbatim, other values as compact JSON.
/// Missing and `null` are `None`.
pub fn field_as_string(v: Option<&Value>) -> Option<String> {
    match v {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

/// Pass an opaque field through, collapsing `null` to `None`.
pub fn field_passthrough(v: Option<&Value>) -> Option<Value> {
    match v {
        None | Some(Value::Null) => None,
        Some(other) => Some(other.clone()),
    }
}

/// Non-null value at `key`.
pub fn non_null<'a>(v: &'a Value, key: &str) -> Option<&'a Value> {
    v.get(key).filter(|x| !x.is_null())
}
