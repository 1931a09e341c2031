//! Canonical JSON: the one byte encoding every digest is computed over.
//!
//! Result records, trace lines, run configurations and artifact manifests are
//! all built as `serde_json::Value` and written here.
//!
//! # Encoding
//!
//! - Object keys in byte order, at every depth. Arrays keep their order.
//! - No whitespace between tokens.
//! - Strings escape `"`, `\`, `\n`, `\r`, `\t` by name and every other control
//!   character as `\u00XX`; everything else is emitted as raw UTF-8.
//! - Integers in decimal. Reals in the shortest form that round-trips
//!   (`4.0`, `0.9`, `1e-7`), with `-0.0` folded into `0.0`.
//! - NaN and infinities are not representable. Reals enter a record through
//!   [`finite_number`] (rejects them) or [`number_or_null`] (writes `null`).

use std::io::Write;

use serde_json::{Number, Value};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CanonError {
    #[error("non-finite number in canonical JSON: {raw}")]
    NonFiniteNumber { raw: String },
}

/// A real as a JSON number.
///
/// `serde_json` quietly turns non-finite floats into `null`; here that is an
/// error instead.
///
/// # Errors
///
/// [`CanonError::NonFiniteNumber`] for NaN and both infinities.
pub fn finite_number(x: f64) -> Result<Value, CanonError> {
    let folded = if x == 0.0 { 0.0 } else { x };
    Number::from_f64(folded)
        .map(Value::Number)
        .ok_or_else(|| CanonError::NonFiniteNumber { raw: x.to_string() })
}

/// A real as a JSON number, or `null` when it is not finite.
///
/// For fields where `null` means unbounded, such as the cost of a search that
/// found no path.
#[must_use]
pub fn number_or_null(x: f64) -> Value {
    finite_number(x).unwrap_or(Value::Null)
}

/// Encode `value` canonically.
#[must_use]
pub fn canonical_json_bytes(value: &Value) -> Vec<u8> {
    let mut out = Vec::with_capacity(128);
    encode(&mut out, value);
    out
}

fn encode(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Null => out.extend_from_slice(b"null"),
        Value::Bool(true) => out.extend_from_slice(b"true"),
        Value::Bool(false) => out.extend_from_slice(b"false"),
        Value::Number(n) => encode_number(out, n),
        Value::String(s) => encode_string(out, s),
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                encode(out, item);
            }
            out.push(b']');
        }
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.push(b'{');
            for (i, (key, item)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(b',');
                }
                encode_string(out, key);
                out.push(b':');
                encode(out, item);
            }
            out.push(b'}');
        }
    }
}

fn encode_number(out: &mut Vec<u8>, n: &Number) {
    // Writes into a Vec cannot fail.
    if let Some(i) = n.as_i64() {
        let _ = write!(out, "{i}");
    } else if let Some(u) = n.as_u64() {
        let _ = write!(out, "{u}");
    } else if n.as_f64() == Some(0.0) {
        out.extend_from_slice(b"0.0");
    } else {
        // serde_json prints reals with ryu, which is platform independent.
        let _ = write!(out, "{n}");
    }
}

fn encode_string(out: &mut Vec<u8>, s: &str) {
    out.push(b'"');
    let mut utf8 = [0u8; 4];
    for ch in s.chars() {
        match ch {
            '"' => out.extend_from_slice(br#"\""#),
            '\\' => out.extend_from_slice(br"\\"),
            '\n' => out.extend_from_slice(br"\n"),
            '\r' => out.extend_from_slice(br"\r"),
            '\t' => out.extend_from_slice(br"\t"),
            c if u32::from(c) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", u32::from(c));
            }
            c => out.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes()),
        }
    }
    out.push(b'"');
}
