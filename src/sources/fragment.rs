//! Partial configuration mapping produced by a single source.

use crate::error::{ConfigError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// An unmerged configuration mapping from one source.
///
/// `null` is never stored: inserting a `null` value removes the key, so a key
/// being present always means the source set it explicitly. Falsy values such
/// as `false`, `0` or `""` are present like any other value.
///
/// Keys are kept in sorted order so iteration never depends on hashing.
///
/// # Examples
///
/// ```rust
/// use cloud_profile::sources::Fragment;
/// use serde_json::json;
///
/// let fragment = Fragment::new()
///     .with("region_name", "test-region")
///     .with("auth", json!({ "username": "alice" }))
///     .with("ignored", serde_json::Value::Null);
///
/// assert_eq!(fragment.len(), 2);
/// assert!(!fragment.contains_key("ignored"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Fragment(BTreeMap<String, Value>);

impl Fragment {
    /// Create an empty fragment.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a fragment from an arbitrary JSON value.
    ///
    /// `null` yields an empty fragment. Any other non-object value is a
    /// [`ConfigError::MalformedFragment`] attributed to `source_name`.
    pub fn from_value(source_name: &str, value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(ConfigError::malformed(
                source_name,
                "<root>",
                format!("must be a mapping, found {}", kind_of(&other)),
            )),
        }
    }

    /// Insert a value, returning the previous one.
    ///
    /// Inserting `null` removes the key instead.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        match value.into() {
            Value::Null => self.0.remove(&key),
            value => self.0.insert(key, value),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert `key` inside the nested mapping stored under `section`.
    ///
    /// The section is created when missing and replaced when it holds a
    /// non-mapping value.
    pub fn insert_nested(
        &mut self,
        section: &str,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) {
        let value = value.into();
        if value.is_null() {
            return;
        }
        let entry = self
            .0
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(map) = entry {
            map.insert(key.into(), value);
        }
    }

    /// Get a value by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string value by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Get a nested mapping by key, if the key holds one.
    pub fn get_map(&self, key: &str) -> Option<&Map<String, Value>> {
        self.0.get(key).and_then(Value::as_object)
    }

    /// Remove a key, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Whether the key is explicitly set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of keys set.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no key is set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterate entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Convert into a JSON object.
    pub fn into_value(self) -> Value {
        Value::Object(self.0.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for Fragment {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut fragment = Fragment::new();
        for (key, value) in iter {
            fragment.insert(key, value);
        }
        fragment
    }
}

impl IntoIterator for Fragment {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Map<String, Value>> for Fragment {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

/// Short name of a JSON value's kind, for error messages.
pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}
