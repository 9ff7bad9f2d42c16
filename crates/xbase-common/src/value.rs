//! Decoded field values and records.

use bytes::Bytes;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// A single decoded field value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Logically absent value.
    Null,
    /// Logical (`L`) field.
    Bool(bool),
    /// Integral numeric (`N`/`F` without decimals, `I`).
    Int(i64),
    /// Fractional numeric (`N`/`F` with decimals, `Y`).
    Float(f64),
    /// Character data and text memos.
    Text(String),
    /// Date (`D`) as `YYYYMMDD`.
    Date(String),
    /// Datetime (`T`, `@`) as `YYYYMMDDHHMMSS`.
    DateTime(String),
    /// Picture and OLE memo payloads.
    Binary(Bytes),
}

impl Value {
    /// Returns true if the value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the value as a string slice for text-like variants.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) | Value::Date(s) | Value::DateTime(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Returns the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

/// One decoded table row.
///
/// Fields keep the table's column order. Column names are lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    deleted: bool,
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Creates an empty record with room for `capacity` fields.
    pub fn with_capacity(deleted: bool, capacity: usize) -> Self {
        Self {
            deleted,
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Returns true if the row carries the deletion marker.
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    /// Appends a field.
    pub fn push(&mut self, name: impl Into<String>, value: Value) {
        self.fields.push((name.into(), value));
    }

    /// Looks up a field by column name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Returns a mutable reference to the field at `index`.
    pub fn value_at_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.fields.get_mut(index).map(|(_, v)| v)
    }

    /// Iterates fields in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry("deleted", &self.deleted)?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut record = Record::with_capacity(false, 3);
        record.push("name", Value::Text("Ann".to_string()));
        record.push("age", Value::Int(41));
        record.push("born", Value::Date("19830102".to_string()));
        record
    }

    #[test]
    fn test_record_lookup() {
        let record = sample();
        assert_eq!(record.len(), 3);
        assert!(!record.is_deleted());
        assert_eq!(record.get("name").and_then(Value::as_str), Some("Ann"));
        assert_eq!(record.get("age").and_then(Value::as_i64), Some(41));
        assert!(record.get("missing").is_none());
    }

    #[test]
    fn test_record_preserves_order() {
        let record = sample();
        let names: Vec<&str> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["name", "age", "born"]);
    }

    #[test]
    fn test_value_at_mut() {
        let mut record = sample();
        *record.value_at_mut(1).unwrap() = Value::Null;
        assert!(record.get("age").unwrap().is_null());
        assert!(record.value_at_mut(9).is_none());
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(2).as_f64(), Some(2.0));
        assert_eq!(Value::Float(1.5).as_i64(), None);
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::DateTime("20240101120000".into()).as_str(), Some("20240101120000"));
        assert!(Value::Binary(Bytes::from_static(b"\x00")).as_str().is_none());
    }

    #[test]
    fn test_record_serializes_as_object() {
        let mut record = sample();
        record.push("note", Value::Null);
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"deleted":false,"name":"Ann","age":41,"born":"19830102","note":null}"#
        );
    }
}
