//! # Canonicalization
//!
//! Reduces an arbitrary semi-structured record to one deterministic shape so
//! that hashing is stable across field order, transient bookkeeping fields,
//! and timezone notation. An inconsistent canonicalizer silently breaks all
//! tamper detection, so this is the one place in the crate where every rule
//! lives.
//!
//! Rules, applied recursively at every nesting level:
//!
//! 1. Storage-layer bookkeeping keys (`_id`, `id`, `__v`, `createdAt`,
//!    `updatedAt`) are dropped.
//! 2. A key named exactly `timestamp` whose value is a date is dropped: it is
//!    re-stamped on every verification read and would fail every re-check.
//! 3. Date-valued strings are re-emitted as UTC RFC-3339 with millisecond
//!    precision and a `Z` suffix, so the same instant canonicalizes
//!    identically regardless of offset notation.
//! 4. Arrays keep their element order; they are ordered sequences.
//! 5. Object keys are emitted in sorted order in the canonical text form.
//! 6. Primitives pass through unchanged.
//!
//! Nesting depth is bounded; exceeding the bound is a
//! [`CanonicalizationError`], never a silent truncation.

use chrono::{DateTime, SecondsFormat, Utc};
use ledger_types::CanonicalizationError;
use serde_json::{Map, Value};

/// Default bound on record nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Keys that never participate in business-data hashing.
const VOLATILE_KEYS: [&str; 5] = ["_id", "id", "__v", "createdAt", "updatedAt"];

/// Canonicalize a record with the default depth bound.
pub fn canonicalize(value: &Value) -> Result<Value, CanonicalizationError> {
    canonicalize_with_depth(value, DEFAULT_MAX_DEPTH)
}

/// Canonicalize a record, bounding nesting at `max_depth` levels.
pub fn canonicalize_with_depth(
    value: &Value,
    max_depth: usize,
) -> Result<Value, CanonicalizationError> {
    walk(value, 0, max_depth)
}

fn walk(value: &Value, depth: usize, max_depth: usize) -> Result<Value, CanonicalizationError> {
    if depth > max_depth {
        return Err(CanonicalizationError::TooDeep { max: max_depth });
    }

    match value {
        Value::String(s) => Ok(Value::String(
            normalize_date_string(s).unwrap_or_else(|| s.clone()),
        )),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                out.push(walk(item, depth + 1, max_depth)?);
            }
            Ok(Value::Array(out))
        }
        Value::Object(fields) => {
            let mut out = Map::new();
            for (key, val) in fields {
                if VOLATILE_KEYS.contains(&key.as_str()) {
                    continue;
                }
                if key == "timestamp" && is_date_value(val) {
                    continue;
                }
                out.insert(key.clone(), walk(val, depth + 1, max_depth)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

/// Whether a value is a date for the purposes of the `timestamp` rule.
fn is_date_value(value: &Value) -> bool {
    matches!(value, Value::String(s) if DateTime::parse_from_rfc3339(s).is_ok())
}

/// Re-emit an RFC-3339 string in the fixed canonical form, or `None` when the
/// string is not a date.
fn normalize_date_string(s: &str) -> Option<String> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Render a (typically canonicalized) value as the stable JSON text form:
/// object keys sorted at every level, no insignificant whitespace.
pub fn to_canonical_json(value: &Value) -> Result<String, CanonicalizationError> {
    let mut out = String::new();
    write_value(value, &mut out)?;
    Ok(out)
}

fn write_value(value: &Value, out: &mut String) -> Result<(), CanonicalizationError> {
    match value {
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(item, out)?;
            }
            out.push(']');
        }
        Value::Object(fields) => {
            let mut keys: Vec<&String> = fields.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_leaf(&Value::String((*key).clone()), out)?;
                out.push(':');
                write_value(&fields[key.as_str()], out)?;
            }
            out.push('}');
        }
        leaf => write_leaf(leaf, out)?,
    }
    Ok(())
}

fn write_leaf(value: &Value, out: &mut String) -> Result<(), CanonicalizationError> {
    let text = serde_json::to_string(value)
        .map_err(|e| CanonicalizationError::Serialize(e.to_string()))?;
    out.push_str(&text);
    Ok(())
}
