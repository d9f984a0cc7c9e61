//! TOML output for label trees.
//!
//! Mapping:
//!   - Value::Integer      -> TOML integer (if fits in i64, otherwise error)
//!   - Value::Real         -> TOML float
//!   - Value::String       -> TOML string
//!   - Value::List         -> TOML array
//!   - Value::Quantity     -> inline table `{ value, unit }`
//!   - Group               -> TOML table led by `_type` and `_container_name`
//!
//! Lossy edges:
//!   - TOML integers are i64; larger label integers error.
//!   - Blocks inside lists cannot occur, so arrays only hold values and
//!     inline tables.

use libpvl::{Group, Value};
use num_traits::ToPrimitive;
use toml_edit::{DocumentMut, Formatted, InlineTable, Item, Table};

/// Encode a label tree as a TOML string.
pub fn encode(label: &Group) -> Result<String, String> {
    let table = group_to_table(label)?;
    let mut doc = DocumentMut::new();
    for (key, item) in table.iter() {
        doc[key] = item.clone();
    }
    Ok(doc.to_string())
}

fn group_to_table(group: &Group) -> Result<Table, String> {
    let mut table = Table::new();
    if let Some(kind) = group.kind() {
        table.insert("_type", toml_edit::value(kind.as_str()));
    }
    if let Some(name) = group.container_name() {
        table.insert("_container_name", toml_edit::value(name));
    }
    for (k, v) in group.iter() {
        let item = match v {
            Value::Group(child) => Item::Table(group_to_table(child)?),
            other => Item::Value(value_to_toml(other)?),
        };
        table.insert(k, item);
    }
    Ok(table)
}

fn value_to_toml(value: &Value) -> Result<toml_edit::Value, String> {
    match value {
        Value::Integer(n) => {
            let i = n
                .to_i64()
                .ok_or_else(|| format!("Integer {} too large for TOML (i64)", n))?;
            Ok(toml_edit::Value::Integer(Formatted::new(i)))
        }
        Value::Real(f) => Ok(toml_edit::Value::Float(Formatted::new(*f))),
        Value::String(s) => Ok(toml_edit::Value::String(Formatted::new(s.clone()))),
        Value::List(items) => {
            let mut arr = toml_edit::Array::new();
            for v in items {
                arr.push(value_to_toml(v)?);
            }
            Ok(toml_edit::Value::Array(arr))
        }
        Value::Quantity(q) => {
            let mut inline = InlineTable::new();
            inline.insert("value", value_to_toml(&q.value)?);
            inline.insert("unit", toml_edit::Value::from(q.unit.as_str()));
            Ok(toml_edit::Value::InlineTable(inline))
        }
        Value::Group(g) => {
            let mut inline = InlineTable::new();
            for (k, item) in group_to_table(g)?.iter() {
                if let Item::Value(v) = item {
                    inline.insert(k, v.clone());
                }
            }
            Ok(toml_edit::Value::InlineTable(inline))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_tables() {
        let reader =
            libpvl::parse("A = 1\nOBJECT = Core\n  Bands = (1, 2)\nEND_OBJECT\nEND\n").unwrap();
        let toml = encode(reader.tree().unwrap()).unwrap();
        let doc: DocumentMut = toml.parse().unwrap();
        assert_eq!(doc["A"].as_integer(), Some(1));
        assert_eq!(doc["Core"]["_type"].as_str(), Some("object"));
        assert_eq!(doc["Core"]["Bands"].as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_huge_integer_is_rejected() {
        let reader = libpvl::parse("N = 99999999999999999999999\nEND\n").unwrap();
        assert!(encode(reader.tree().unwrap()).is_err());
    }
}
