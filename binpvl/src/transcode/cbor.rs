//! CBOR output for label trees.
//!
//! Mapping:
//!   - Value::Integer  -> CBOR integer (smallest encoding that fits)
//!   - Value::Real     -> CBOR float64 (always 9 bytes, never downgraded)
//!   - Value::String   -> CBOR text string
//!   - Value::List     -> CBOR array
//!   - Value::Quantity -> CBOR map `{"value": ..., "unit": ...}`
//!   - Group           -> CBOR map led by `_type` and `_container_name`,
//!                        then the children in label order
//!
//! Integers beyond CBOR's native range (-2^64 to 2^64-1) are an error.

use ciborium::value::Value as CborValue;
use libpvl::{Group, Value};
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use std::fmt::{self, Write as FmtWrite};

// ---------------------------------------------------------------------------
// Encode
//
// Bytes are written by hand because ciborium shrinks float64 values that
// fit in fewer bytes; label reals stay float64.
// ---------------------------------------------------------------------------

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;
const FLOAT64: u8 = 0xfb;

/// Encode a label tree as CBOR bytes.
pub fn encode(label: &Group) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    write_group(&mut buf, label)?;
    Ok(buf)
}

fn write_group(buf: &mut Vec<u8>, group: &Group) -> Result<(), String> {
    let kind = group.kind().map(|k| k.as_str());
    let name = group.container_name();
    let len = group.len() + usize::from(kind.is_some()) + usize::from(name.is_some());
    write_head(buf, MAJOR_MAP, len as u64);
    if let Some(kind) = kind {
        write_text(buf, "_type");
        write_text(buf, kind);
    }
    if let Some(name) = name {
        write_text(buf, "_container_name");
        write_text(buf, name);
    }
    for (key, value) in group.iter() {
        write_text(buf, key);
        write_value(buf, value)?;
    }
    Ok(())
}

fn write_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), String> {
    match value {
        Value::Integer(n) => write_integer(buf, n)?,
        Value::Real(f) => {
            buf.push(FLOAT64);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        Value::String(s) => write_text(buf, s),
        Value::List(items) => {
            write_head(buf, MAJOR_ARRAY, items.len() as u64);
            for item in items {
                write_value(buf, item)?;
            }
        }
        Value::Quantity(q) => {
            write_head(buf, MAJOR_MAP, 2);
            write_text(buf, "value");
            write_value(buf, &q.value)?;
            write_text(buf, "unit");
            write_text(buf, &q.unit);
        }
        Value::Group(g) => write_group(buf, g)?,
    }
    Ok(())
}

fn write_text(buf: &mut Vec<u8>, s: &str) {
    write_head(buf, MAJOR_TEXT, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Write a major type and its argument in the shortest form: inline for
/// 0-23, otherwise a 1, 2, 4, or 8 byte big-endian argument.
fn write_head(buf: &mut Vec<u8>, major: u8, arg: u64) {
    let high = major << 5;
    if arg < 24 {
        buf.push(high | arg as u8);
    } else if let Ok(b) = u8::try_from(arg) {
        buf.extend_from_slice(&[high | 24, b]);
    } else if let Ok(h) = u16::try_from(arg) {
        buf.push(high | 25);
        buf.extend_from_slice(&h.to_be_bytes());
    } else if let Ok(w) = u32::try_from(arg) {
        buf.push(high | 26);
        buf.extend_from_slice(&w.to_be_bytes());
    } else {
        buf.push(high | 27);
        buf.extend_from_slice(&arg.to_be_bytes());
    }
}

/// Major type 0 holds n; major type 1 holds -1 - n.
fn write_integer(buf: &mut Vec<u8>, n: &BigInt) -> Result<(), String> {
    let (major, arg) = if n.sign() == Sign::Minus {
        (MAJOR_NEGATIVE, (-n - 1u32).to_u64())
    } else {
        (MAJOR_UNSIGNED, n.to_u64())
    };
    let arg = arg.ok_or_else(|| format!("integer {} is outside CBOR's integer range", n))?;
    write_head(buf, major, arg);
    Ok(())
}

// ---------------------------------------------------------------------------
// Diagnostic notation (RFC 8949 §8)
// ---------------------------------------------------------------------------

/// Render CBOR bytes as diagnostic notation.
///
/// Works from the encoded bytes so the output shows what is on the wire.
pub fn diagnostic(input: &[u8]) -> Result<String, String> {
    let cbor: CborValue =
        ciborium::de::from_reader(input).map_err(|e| format!("CBOR decode error: {}", e))?;
    let mut out = String::new();
    Diag { out: &mut out }
        .value(&cbor, 0)
        .map_err(|e| format!("CBOR diagnostic error: {}", e))?;
    out.push('\n');
    Ok(out)
}

struct Diag<'a> {
    out: &'a mut String,
}

impl Diag<'_> {
    fn value(&mut self, val: &CborValue, indent: usize) -> fmt::Result {
        match val {
            CborValue::Null => self.out.push_str("null"),
            CborValue::Bool(b) => write!(self.out, "{}", b)?,
            CborValue::Integer(i) => write!(self.out, "{}", i128::from(*i))?,
            CborValue::Float(f) => self.float(*f)?,
            CborValue::Text(s) => self.text(s)?,
            CborValue::Bytes(b) => {
                self.out.push_str("h'");
                for byte in b {
                    write!(self.out, "{:02x}", byte)?;
                }
                self.out.push('\'');
            }
            CborValue::Array(items) => self.array(items, indent)?,
            CborValue::Map(pairs) => self.map(pairs, indent)?,
            CborValue::Tag(tag, inner) => {
                write!(self.out, "{}(", tag)?;
                self.value(inner, indent)?;
                self.out.push(')');
            }
            other => write!(self.out, "<?unknown {:?}>", other)?,
        }
        Ok(())
    }

    fn float(&mut self, f: f64) -> fmt::Result {
        if f.is_nan() {
            self.out.push_str("NaN");
        } else if f.is_infinite() {
            self.out.push_str(if f > 0.0 { "Infinity" } else { "-Infinity" });
        } else if f.fract() == 0.0 && f.abs() < 1e18 {
            write!(self.out, "{:.1}", f)?;
        } else {
            write!(self.out, "{}", f)?;
        }
        Ok(())
    }

    fn text(&mut self, s: &str) -> fmt::Result {
        self.out.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if c.is_control() => write!(self.out, "\\u{:04x}", c as u32)?,
                c => self.out.push(c),
            }
        }
        self.out.push('"');
        Ok(())
    }

    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat(' ').take(indent));
    }

    fn array(&mut self, items: &[CborValue], indent: usize) -> fmt::Result {
        if items.is_empty() {
            self.out.push_str("[]");
            return Ok(());
        }
        // Short runs of scalars stay on one line.
        if items.len() <= 5 && items.iter().all(is_scalar) {
            self.out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                self.value(item, indent)?;
            }
            self.out.push(']');
            return Ok(());
        }
        self.out.push_str("[\n");
        for (i, item) in items.iter().enumerate() {
            self.pad(indent + 2);
            self.value(item, indent + 2)?;
            if i + 1 < items.len() {
                self.out.push(',');
            }
            self.out.push('\n');
        }
        self.pad(indent);
        self.out.push(']');
        Ok(())
    }

    fn map(&mut self, pairs: &[(CborValue, CborValue)], indent: usize) -> fmt::Result {
        if pairs.is_empty() {
            self.out.push_str("{}");
            return Ok(());
        }
        self.out.push_str("{\n");
        for (i, (k, v)) in pairs.iter().enumerate() {
            self.pad(indent + 2);
            self.value(k, indent + 2)?;
            self.out.push_str(": ");
            self.value(v, indent + 2)?;
            if i + 1 < pairs.len() {
                self.out.push(',');
            }
            self.out.push('\n');
        }
        self.pad(indent);
        self.out.push('}');
        Ok(())
    }
}

fn is_scalar(val: &CborValue) -> bool {
    matches!(
        val,
        CborValue::Null
            | CborValue::Bool(_)
            | CborValue::Integer(_)
            | CborValue::Float(_)
            | CborValue::Text(_)
            | CborValue::Bytes(_)
    )
}
