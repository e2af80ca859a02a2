//! Order-independent canonical serialization of JSON values.
//!
//! Two values are treated as the same definition iff their canonical strings
//! are equal. Object keys are sorted, and array elements are canonicalized
//! individually and then sorted, so neither key insertion order nor array
//! element order is significant.
//!
//! # Trade-off
//!
//! Export tooling reorders sibling tag arrays between runs without changing
//! meaning, so array order is discarded. An array whose order *is*
//! meaningful (e.g. a list of alarm priorities by rank) will compare equal
//! to any permutation of itself.

use std::fmt::Write as _;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Length of the hex prefix returned by [`signature_digest`].
pub const DIGEST_LEN: usize = 12;

/// Serialize `value` into its canonical, order-independent form.
///
/// Deterministic and total over JSON values.
#[must_use]
pub fn canonicalize(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(key, out);
                out.push(':');
                write_canonical(&map[key.as_str()], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            let mut parts: Vec<String> = items.iter().map(canonicalize).collect();
            parts.sort();
            out.push('[');
            out.push_str(&parts.join(","));
            out.push(']');
        }
        scalar => {
            // `Display` for scalars is compact JSON and cannot fail.
            let _ = write!(out, "{scalar}");
        }
    }
}

fn write_json_string(s: &str, out: &mut String) {
    let _ = write!(out, "{}", Value::from(s));
}

/// Recursively sort object keys and array elements, returning a new value.
///
/// The result is meant for rendering: two canonically-equal definitions
/// normalize to identical-looking documents. `canonicalize` of the result
/// always equals `canonicalize` of the input.
#[must_use]
pub fn normalize_for_display(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut normalized = Map::new();
            for key in keys {
                normalized.insert(key.clone(), normalize_for_display(&map[key.as_str()]));
            }
            Value::Object(normalized)
        }
        Value::Array(items) => {
            let mut keyed: Vec<(String, Value)> = items
                .iter()
                .map(|item| (canonicalize(item), normalize_for_display(item)))
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Array(keyed.into_iter().map(|(_, v)| v).collect())
        }
        scalar => scalar.clone(),
    }
}

/// Short, stable hex handle for a canonical signature.
///
/// First [`DIGEST_LEN`] hex characters of SHA-256 over the signature bytes.
#[must_use]
pub fn signature_digest(signature: &str) -> String {
    let digest = Sha256::digest(signature.as_bytes());
    let mut hex = String::with_capacity(DIGEST_LEN);
    for b in digest.iter().take(DIGEST_LEN / 2) {
        let _ = write!(hex, "{b:02x}");
    }
    hex
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
