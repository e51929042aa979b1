//! The resolved, read-only cloud profile.

use crate::core::defaults::{DEFAULT_AUTH_TYPE, DEFAULT_CACHE_MAX_AGE};
use crate::error::{ConfigError, Result};
use crate::sources::Fragment;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::ops::Index;
use std::path::PathBuf;
use std::sync::LazyLock;

static NULL: Value = Value::Null;
static EMPTY_MAP: LazyLock<Map<String, Value>> = LazyLock::new(Map::new);

/// Cache settings exposed for consumption by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSettings {
    /// Lifetime of cached entries in seconds.
    pub max_age: u64,
    /// Cache directory.
    pub path: PathBuf,
}

impl CacheSettings {
    /// Read cache settings from a `cache` mapping.
    ///
    /// `max_age` may be an integer or a numeric string.
    pub(crate) fn from_map(map: &Map<String, Value>) -> Option<Self> {
        let max_age = match map.get("max_age")? {
            Value::Number(n) => n.as_u64()?,
            Value::String(s) => s.trim().parse().ok()?,
            _ => return None,
        };
        let path = map.get("path")?.as_str()?;
        Some(Self {
            max_age,
            path: PathBuf::from(path),
        })
    }
}

/// A fully resolved cloud profile.
///
/// Guarantees: `auth` is a mapping, `auth_type` is a string and `cache` is a
/// mapping holding `max_age` and `path`. The profile is never modified after
/// resolution.
///
/// Fields can be read mapping-style ([`get`](Self::get), `profile["key"]`)
/// or through the typed accessors. Absent fields read as `None` (or
/// `Value::Null` when indexing), never as a panic.
///
/// # Examples
///
/// ```rust
/// use cloud_profile::prelude::*;
/// use cloud_profile::sources::CloudsDocument;
///
/// let config = CloudConfig::builder()
///     .with_user_document(CloudsDocument::new().with_cloud(
///         "mycloud",
///         Fragment::new().with("region_name", "r1"),
///     ))
///     .with_defaults(Defaults::bare().with_cache_path("/tmp/cache"))
///     .build()?;
///
/// let profile = config.get_cloud("mycloud")?;
/// assert_eq!(profile.name(), Some("mycloud"));
/// assert_eq!(profile.region_name(), Some("r1"));
/// assert_eq!(profile["region_name"], "r1");
/// assert_eq!(profile.get("snack_type"), None);
/// assert_eq!(profile.auth_type(), "password");
/// # Ok::<(), cloud_profile::error::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloudProfile {
    name: Option<String>,
    config: Fragment,
}

impl CloudProfile {
    pub(crate) fn new(name: Option<String>, config: Fragment) -> Self {
        Self { name, config }
    }

    /// The cloud name, or `None` for an override-only profile.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Get a field by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.config.get(key)
    }

    /// Get a string field by key.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.config.get_str(key)
    }

    /// Whether the field is set.
    pub fn contains_key(&self, key: &str) -> bool {
        self.config.contains_key(key)
    }

    /// Field names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.config.keys()
    }

    /// The `cloud` field.
    pub fn cloud(&self) -> Option<&str> {
        self.get_str("cloud")
    }

    /// The `region_name` field.
    pub fn region_name(&self) -> Option<&str> {
        self.get_str("region_name")
    }

    /// The `auth_type` field.
    pub fn auth_type(&self) -> &str {
        self.get_str("auth_type").unwrap_or(DEFAULT_AUTH_TYPE)
    }

    /// The `auth` mapping.
    pub fn auth(&self) -> &Map<String, Value> {
        self.config.get_map("auth").unwrap_or(&EMPTY_MAP)
    }

    /// A string value from the `auth` mapping.
    pub fn auth_value(&self, key: &str) -> Option<&str> {
        self.auth().get(key).and_then(Value::as_str)
    }

    /// The cache settings.
    pub fn cache(&self) -> CacheSettings {
        self.config
            .get_map("cache")
            .and_then(CacheSettings::from_map)
            .unwrap_or_else(|| CacheSettings {
                max_age: DEFAULT_CACHE_MAX_AGE,
                path: PathBuf::new(),
            })
    }

    /// Deserialize the profile into a caller-defined type.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DeserializationError`] if the fields do not fit `T`.
    pub fn deserialize_into<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.config.clone().into_value())
            .map_err(|e| ConfigError::DeserializationError(e.to_string()))
    }

    /// The underlying resolved fragment.
    pub fn as_fragment(&self) -> &Fragment {
        &self.config
    }

    /// Consume the profile, returning the resolved fragment.
    pub fn into_inner(self) -> Fragment {
        self.config
    }
}

impl Index<&str> for CloudProfile {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.config.get(key).unwrap_or(&NULL)
    }
}
