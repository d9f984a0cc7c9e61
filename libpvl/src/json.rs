//! JSON view of a parsed label.
//!
//! Blocks become objects whose first members are `_type` (`"group"` or
//! `"object"`) and `_container_name`, followed by the children in label
//! order. Quantities become `{"value": ..., "unit": ...}`.

use num_traits::ToPrimitive;
use serde_json::{Map, Number, Value as Json};

use crate::value::{Group, Value};

impl Group {
    /// Convert the tree to JSON.
    pub fn to_json(&self) -> Json {
        let mut obj = Map::new();
        if let Some(kind) = self.kind() {
            obj.insert("_type".to_string(), Json::from(kind.as_str()));
        }
        if let Some(name) = self.container_name() {
            obj.insert("_container_name".to_string(), Json::from(name));
        }
        for (key, value) in self.iter() {
            obj.insert(key.to_string(), value.to_json());
        }
        Json::Object(obj)
    }
}

impl Value {
    /// Convert the value to JSON.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Integer(n) => {
                if let Some(i) = n.to_i64() {
                    Json::from(i)
                } else if let Some(u) = n.to_u64() {
                    Json::from(u)
                } else {
                    Json::String(n.to_string())
                }
            }
            Value::Real(f) => Number::from_f64(*f).map_or(Json::Null, Json::Number),
            Value::String(s) => Json::String(s.clone()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Quantity(q) => {
                let mut obj = Map::new();
                obj.insert("value".to_string(), q.value.to_json());
                obj.insert("unit".to_string(), Json::from(q.unit.as_str()));
                Json::Object(obj)
            }
            Value::Group(g) => g.to_json(),
        }
    }
}
