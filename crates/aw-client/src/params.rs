//! Request parameter bag and its wire encodings.
//!
//! Parameters are an insertion-ordered map of [`Value`]s. GET requests and
//! multipart forms need them flattened into bracketed key paths
//! (`queries[0]`, `data[name]`), JSON bodies use them as-is.

use bytes::Bytes;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// A single parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Params),
    File(FilePayload),
}

/// In-memory file content travelling as a multipart file part.
#[derive(Debug, Clone, PartialEq)]
pub struct FilePayload {
    pub bytes: Bytes,
    pub filename: String,
    pub mime_type: Option<String>,
}

impl FilePayload {
    /// File content with the name used in the multipart disposition.
    pub fn new(bytes: impl Into<Bytes>, filename: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            filename: filename.into(),
            mime_type: None,
        }
    }

    /// Set the content type of the file part.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// A flattened parameter, ready for a query string or a form field.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatValue {
    Text(String),
    File(FilePayload),
}

/// Insertion-ordered parameter map.
///
/// Re-inserting an existing key replaces its value but keeps its position,
/// so the wire order never depends on how a façade assembled the bag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value under the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
        self
    }

    /// Builder-style [`Params::insert`].
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert only when a value is present. Optional façade arguments use this.
    pub fn with_opt<V: Into<Value>>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    /// Look up a top-level value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove a key, closing the gap in the ordering.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Flatten nested arrays and objects into bracketed key paths.
    ///
    /// `{"queries": ["a", "b"], "data": {"x": 1}}` becomes
    /// `queries[0]=a`, `queries[1]=b`, `data[x]=1`.
    pub fn flatten(&self) -> Vec<(String, FlatValue)> {
        let mut out = Vec::new();
        for (key, value) in &self.entries {
            flatten_into(key.clone(), value, &mut out);
        }
        out
    }

    /// Flattened text pairs for a query string. File values contribute their filename.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.flatten()
            .into_iter()
            .map(|(key, value)| match value {
                FlatValue::Text(text) => (key, text),
                FlatValue::File(file) => (key, file.filename),
            })
            .collect()
    }
}

fn flatten_into(key: String, value: &Value, out: &mut Vec<(String, FlatValue)>) {
    match value {
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_into(format!("{}[{}]", key, index), item, out);
            }
        }
        Value::Object(params) => {
            for (child, item) in params.iter() {
                flatten_into(format!("{}[{}]", key, child), item, out);
            }
        }
        Value::File(file) => out.push((key, FlatValue::File(file.clone()))),
        scalar => out.push((key, FlatValue::Text(scalar.to_text()))),
    }
}

impl Value {
    /// Render a scalar the way it appears in query strings and form fields.
    fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::File(file) => file.filename.clone(),
            Value::Array(_) | Value::Object(_) => String::new(),
        }
    }

    /// The string content of a `String` value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(params) => params.serialize(serializer),
            // Files only travel in multipart bodies
            Value::File(file) => serializer.serialize_str(&file.filename),
        }
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value.into())
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value.into())
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Params> for Value {
    fn from(value: Params) -> Self {
        Value::Object(value)
    }
}

impl From<FilePayload> for Value {
    fn from(value: FilePayload) -> Self {
        Value::File(value)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or_default()),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                let mut params = Params::new();
                for (key, item) in map {
                    params.insert(key, Value::from(item));
                }
                Value::Object(params)
            }
        }
    }
}
