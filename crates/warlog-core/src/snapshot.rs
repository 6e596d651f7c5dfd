//! The decoded upstream document and lenient field access over it.
//!
//! Upstream payloads are noisy: sections disappear between polls, scalars
//! arrive as `null`, and numbers flip between integer and float encodings.
//! Field access never fails; every accessor falls back to a default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

// ─── Snapshot ────────────────────────────────────────────────────────────────

/// One fetched, decoded document describing the war at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Value);

impl Snapshot {
  /// Parse a snapshot from raw JSON text. The root must be an object.
  pub fn from_json(raw: &str) -> Result<Self> {
    let value: Value = serde_json::from_str(raw)?;
    match value {
      Value::Object(_) => Ok(Self(value)),
      Value::Null => Err(Error::NotAnObject("null")),
      Value::Bool(_) => Err(Error::NotAnObject("a boolean")),
      Value::Number(_) => Err(Error::NotAnObject("a number")),
      Value::String(_) => Err(Error::NotAnObject("a string")),
      Value::Array(_) => Err(Error::NotAnObject("an array")),
    }
  }

  /// A top-level section, if present and shaped as an object.
  pub fn object(&self, name: &str) -> Option<&Map<String, Value>> {
    self.0.get(name).and_then(Value::as_object)
  }

  /// A top-level section, if present and shaped as an array. Anything else
  /// reads as empty.
  pub fn array(&self, name: &str) -> &[Value] {
    self.0.get(name).map(as_slice).unwrap_or(&[])
  }

  pub fn as_value(&self) -> &Value { &self.0 }

  pub fn into_value(self) -> Value { self.0 }
}

impl From<Value> for Snapshot {
  fn from(value: Value) -> Self { Self(value) }
}

// ─── Lenient access ──────────────────────────────────────────────────────────

/// Field accessors that substitute defaults instead of failing.
///
/// Implemented for JSON objects; the normaliser only ever calls these on
/// values it has already checked to be objects.
pub trait Lenient {
  fn field(&self, key: &str) -> Option<&Value>;

  /// Integer field; floats are truncated, anything else reads as `0`.
  fn int(&self, key: &str) -> i64 { self.field(key).and_then(as_int).unwrap_or(0) }

  /// Integer field that distinguishes "absent or unusable" from `0`.
  fn opt_int(&self, key: &str) -> Option<i64> { self.field(key).and_then(as_int) }

  fn float(&self, key: &str) -> f64 {
    self.field(key).and_then(Value::as_f64).unwrap_or(0.0)
  }

  fn text(&self, key: &str) -> String {
    self
      .field(key)
      .and_then(Value::as_str)
      .map(str::to_owned)
      .unwrap_or_default()
  }

  fn flag(&self, key: &str) -> bool {
    self.field(key).and_then(Value::as_bool).unwrap_or(false)
  }

  fn list(&self, key: &str) -> &[Value] { self.field(key).map(as_slice).unwrap_or(&[]) }

  fn object(&self, key: &str) -> Option<&Map<String, Value>> {
    self.field(key).and_then(Value::as_object)
  }
}

impl Lenient for Map<String, Value> {
  fn field(&self, key: &str) -> Option<&Value> { self.get(key) }
}

/// Read any JSON number as an `i64`, truncating floats.
pub fn as_int(value: &Value) -> Option<i64> {
  value.as_i64().or_else(|| value.as_f64().map(|f| f as i64))
}

/// Read a JSON array as a slice; any other shape reads as empty.
pub fn as_slice(value: &Value) -> &[Value] {
  value.as_array().map(Vec::as_slice).unwrap_or(&[])
}
