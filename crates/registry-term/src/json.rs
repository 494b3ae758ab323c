//! JSON bridge.
//!
//! Lossy in both directions: JSON has no atoms, tuples or non-text keys.
//! Binaries that are not UTF-8 travel as `{"$binary": "<base64>"}`.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::{Map, Number, Value};

use crate::term::{BigInt, Term, TermMap};

const BINARY_KEY: &str = "$binary";

/// Render a term as JSON.
///
/// - atoms become strings, tuples become arrays
/// - an improper list becomes an array ending with its tail
/// - map keys that are not text are rendered in inspect form
/// - bignums become decimal strings
/// - bitstrings and handles become their inspect string
pub fn to_json(term: &Term) -> Value {
    match term {
        Term::Nil => Value::Null,
        Term::Bool(b) => Value::Bool(*b),
        Term::Int(v) => Value::from(*v),
        Term::BigInt(big) => Value::String(big.to_string()),
        Term::Float(v) => Number::from_f64(*v).map_or(Value::Null, Value::Number),
        Term::Binary(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => Value::String(text.to_string()),
            Err(_) => {
                let mut object = Map::new();
                object.insert(BINARY_KEY.to_string(), Value::String(BASE64.encode(bytes)));
                Value::Object(object)
            }
        },
        Term::Atom(atom) => Value::String(atom.as_str().to_string()),
        Term::List(items) | Term::Tuple(items) => Value::Array(items.iter().map(to_json).collect()),
        Term::ImproperList { elements, tail } => Value::Array(
            elements
                .iter()
                .chain(std::iter::once(tail.as_ref()))
                .map(to_json)
                .collect(),
        ),
        Term::Map(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (key_text(k), to_json(v)))
                .collect(),
        ),
        other => Value::String(other.to_string()),
    }
}

fn key_text(key: &Term) -> String {
    match key.as_str() {
        Some(text) => text.to_string(),
        None => key.to_string(),
    }
}

/// Build a term from JSON.
///
/// Objects become maps with text keys, strings become text binaries,
/// integers become `Int` (or a bignum above `i64::MAX`) and other numbers
/// become `Float`. A single-key `{"$binary": ...}` object holding valid
/// base64 becomes a raw binary.
pub fn from_json(value: &Value) -> Term {
    match value {
        Value::Null => Term::Nil,
        Value::Bool(b) => Term::Bool(*b),
        Value::Number(n) => number(n),
        Value::String(s) => Term::text(s.as_str()),
        Value::Array(items) => Term::List(items.iter().map(from_json).collect()),
        Value::Object(object) => {
            if let Some(bytes) = binary_object(object) {
                return Term::Binary(bytes);
            }
            Term::Map(
                object
                    .iter()
                    .map(|(k, v)| (Term::text(k.as_str()), from_json(v)))
                    .collect::<TermMap>(),
            )
        }
    }
}

fn number(n: &Number) -> Term {
    if let Some(v) = n.as_i64() {
        Term::Int(v)
    } else if let Some(v) = n.as_u64() {
        Term::BigInt(BigInt::from_u64(v))
    } else {
        Term::Float(n.as_f64().unwrap_or_default())
    }
}

fn binary_object(object: &Map<String, Value>) -> Option<Vec<u8>> {
    if object.len() != 1 {
        return None;
    }
    match object.get(BINARY_KEY)? {
        Value::String(encoded) => BASE64.decode(encoded).ok(),
        _ => None,
    }
}
