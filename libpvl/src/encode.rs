//! Encode parsed labels back to text.
//!
//! PVL output re-parses to an equal tree. JSON output is the
//! [`Group::to_json`] view, pretty-printed.

use crate::tokenizer::parse_number;
use crate::value::{ContainerKind, Group, Value};

/// Output format for encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// PVL label text ending in `End`.
    Pvl,
    /// Pretty-printed JSON.
    Json,
}

/// Encode a label tree in the specified format.
pub fn encode(label: &Group, format: Format) -> String {
    match format {
        Format::Pvl => encode_pvl(label),
        Format::Json => format!("{:#}\n", label.to_json()),
    }
}

// =============================================================================
// PVL Encoder
// =============================================================================

fn encode_pvl(root: &Group) -> String {
    let mut out = String::new();
    encode_pvl_group(&mut out, root, 0);
    out.push_str("End\n");
    out
}

fn encode_pvl_group(out: &mut String, group: &Group, indent: usize) {
    let pad = "  ".repeat(indent);
    // Align `=` across the keywords of one block.
    let width = group
        .iter()
        .filter(|(_, v)| !matches!(v, Value::Group(_)))
        .map(|(k, _)| k.len())
        .max()
        .unwrap_or(0);

    for (key, value) in group.iter() {
        match value {
            Value::Group(child) => {
                let name = child.container_name().unwrap_or(key);
                let (open, close) = match child.kind() {
                    Some(ContainerKind::Object) => ("Object", "End_Object"),
                    _ => ("Group", "End_Group"),
                };
                out.push_str(&format!(
                    "{}{} = {}\n",
                    pad,
                    open,
                    encode_pvl_string(name)
                ));
                encode_pvl_group(out, child, indent + 1);
                out.push_str(&format!("{}{}\n", pad, close));
            }
            _ => {
                out.push_str(&format!(
                    "{}{:<width$} = {}\n",
                    pad,
                    key,
                    encode_pvl_value(value),
                    width = width
                ));
            }
        }
    }
}

fn encode_pvl_value(value: &Value) -> String {
    match value {
        Value::Integer(n) => n.to_string(),
        Value::Real(f) => encode_pvl_real(*f),
        Value::String(s) => encode_pvl_string(s),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(encode_pvl_value).collect();
            format!("({})", items.join(", "))
        }
        Value::Quantity(q) => format!("{} <{}>", encode_pvl_value(&q.value), q.unit),
        Value::Group(g) => encode_pvl_value(&Value::String(
            g.container_name().unwrap_or_default().to_string(),
        )),
    }
}

fn encode_pvl_real(f: f64) -> String {
    let s = format!("{}", f);
    if s.contains('.') || s.contains('e') || !f.is_finite() {
        s
    } else {
        format!("{}.0", s)
    }
}

fn encode_pvl_string(s: &str) -> String {
    if !needs_quotes(s) {
        return s.to_string();
    }
    if s.contains('"') && !s.contains('\'') {
        format!("'{}'", s)
    } else {
        format!("\"{}\"", s)
    }
}

/// Whether a bare word would read back as something else.
fn needs_quotes(s: &str) -> bool {
    s.is_empty()
        || parse_number(s).is_some()
        || s.ends_with('-')
        || s.starts_with("/*")
        || s.starts_with('#')
        || s.chars().any(|c| {
            c.is_whitespace() || matches!(c, '=' | '(' | ')' | '{' | '}' | ',' | '<' | '>' | '"' | '\'')
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Quantity;

    fn sample() -> Group {
        let mut pixels = Group::new(ContainerKind::Group, "Pixels");
        pixels.insert_unique("Type", Value::from("Real"));
        pixels.insert_unique("Base", Value::Real(0.0));
        let mut core = Group::new(ContainerKind::Object, "Core");
        core.insert_unique("StartByte", Value::from(65537));
        core.insert_container(pixels);
        let mut root = Group::root();
        root.insert_unique("Note", Value::from("two words"));
        root.insert_unique(
            "Scale",
            Value::from(Quantity::new(Value::Real(4.0), "KM/PIXEL")),
        );
        root.insert_unique("Bands", Value::List(vec![Value::from(1), Value::from("B")]));
        root.insert_container(core);
        root
    }

    #[test]
    fn test_encode_pvl() {
        let expected = "\
Note  = \"two words\"
Scale = 4.0 <KM/PIXEL>
Bands = (1, B)
Object = Core
  StartByte = 65537
  Group = Pixels
    Type = Real
    Base = 0.0
  End_Group
End_Object
End
";
        assert_eq!(encode(&sample(), Format::Pvl), expected);
    }

    #[test]
    fn test_encode_json_is_pretty() {
        let out = encode(&sample(), Format::Json);
        assert!(out.starts_with("{\n"));
        let back: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back, sample().to_json());
    }

    #[test]
    fn test_string_quoting() {
        assert_eq!(encode_pvl_string("MARS"), "MARS");
        assert_eq!(encode_pvl_string("42"), "\"42\"");
        assert_eq!(encode_pvl_string(""), "\"\"");
        assert_eq!(encode_pvl_string("say \"hi\""), "'say \"hi\"'");
        assert_eq!(encode_pvl_string("#tag"), "\"#tag\"");
        assert_eq!(encode_pvl_string("a#b"), "a#b");
        assert_eq!(encode_pvl_real(1.0), "1.0");
        assert_eq!(encode_pvl_real(0.25), "0.25");
    }

    #[test]
    fn test_block_names_are_quoted_when_needed() {
        let mut spaced = Group::new(ContainerKind::Group, "two words");
        spaced.insert_unique("A", Value::from(1));
        let mut root = Group::root();
        root.insert_container(spaced);
        root.insert_unique("Note", Value::from("#tag"));

        let text = encode(&root, Format::Pvl);
        assert!(text.starts_with("Group = \"two words\"\n"));

        let mut reader = crate::parse(&text).unwrap();
        let back = reader.steal_tree().unwrap();
        assert_eq!(back.to_json(), root.to_json());
        assert_eq!(
            back.lookup_keys(["two words", "A"]).and_then(Value::as_i64),
            Some(1)
        );
        assert_eq!(back.get("Note").and_then(Value::as_str), Some("#tag"));
    }
}
