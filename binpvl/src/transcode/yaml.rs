//! YAML output for label trees.
//!
//! Mapping:
//!   - Value::Integer      -> YAML integer (string when beyond i64/u64)
//!   - Value::Real         -> YAML float
//!   - Value::String       -> YAML string
//!   - Value::List         -> YAML sequence
//!   - Value::Quantity     -> mapping `{value, unit}`
//!   - Group               -> mapping led by `_type` and `_container_name`

use libpvl::{Group, Value};
use num_traits::ToPrimitive;

/// Encode a label tree as a YAML string.
pub fn encode(label: &Group) -> Result<String, String> {
    let yaml_value = group_to_yaml(label);
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn key(s: &str) -> serde_yaml::Value {
    serde_yaml::Value::String(s.to_string())
}

fn group_to_yaml(group: &Group) -> serde_yaml::Value {
    let mut map = serde_yaml::Mapping::new();
    if let Some(kind) = group.kind() {
        map.insert(key("_type"), key(kind.as_str()));
    }
    if let Some(name) = group.container_name() {
        map.insert(key("_container_name"), key(name));
    }
    for (k, v) in group.iter() {
        map.insert(key(k), value_to_yaml(v));
    }
    serde_yaml::Value::Mapping(map)
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Integer(n) => {
            if let Some(i) = n.to_i64() {
                serde_yaml::Value::Number(serde_yaml::Number::from(i))
            } else if let Some(u) = n.to_u64() {
                serde_yaml::Value::Number(serde_yaml::Number::from(u))
            } else {
                serde_yaml::Value::String(n.to_string())
            }
        }
        Value::Real(f) => serde_yaml::Value::Number(serde_yaml::Number::from(*f)),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::List(items) => serde_yaml::Value::Sequence(items.iter().map(value_to_yaml).collect()),
        Value::Quantity(q) => {
            let mut map = serde_yaml::Mapping::new();
            map.insert(key("value"), value_to_yaml(&q.value));
            map.insert(key("unit"), key(&q.unit));
            serde_yaml::Value::Mapping(map)
        }
        Value::Group(g) => group_to_yaml(g),
    }
}
