//! Built-in defaults seeded at the bottom of every precedence chain.

use crate::sources::Fragment;
use directories::ProjectDirs;
use serde_json::json;
use std::path::PathBuf;

/// Auth type used when no source sets one.
pub const DEFAULT_AUTH_TYPE: &str = "password";

/// Cache lifetime in seconds when no source sets one. Zero disables caching.
pub const DEFAULT_CACHE_MAX_AGE: u64 = 0;

/// Built-in default settings.
///
/// `Defaults::default()` uses the conventional values and a per-user cache
/// directory. Use the `with_*` methods to adjust them.
#[derive(Debug, Clone, PartialEq)]
pub struct Defaults {
    auth_type: String,
    cache_max_age: u64,
    cache_path: Option<PathBuf>,
    values: Fragment,
}

impl Defaults {
    /// Defaults with no cache path and no extra values.
    ///
    /// Resolution fails with `MissingDefault` unless some source supplies
    /// `cache.path`.
    pub fn bare() -> Self {
        Self {
            auth_type: DEFAULT_AUTH_TYPE.to_string(),
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            cache_path: None,
            values: Fragment::new(),
        }
    }

    /// Set the auth type applied when none is resolved.
    pub fn with_auth_type(mut self, auth_type: impl Into<String>) -> Self {
        self.auth_type = auth_type.into();
        self
    }

    /// Set the default cache lifetime in seconds.
    pub fn with_cache_max_age(mut self, max_age: u64) -> Self {
        self.cache_max_age = max_age;
        self
    }

    /// Set the default cache directory.
    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    /// Add or replace a default top-level value.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(key, value);
        self
    }

    /// Auth type applied when none is resolved.
    pub fn auth_type(&self) -> &str {
        &self.auth_type
    }

    /// Default cache lifetime in seconds.
    pub fn cache_max_age(&self) -> u64 {
        self.cache_max_age
    }

    /// Default cache directory, if one could be determined.
    pub fn cache_path(&self) -> Option<&PathBuf> {
        self.cache_path.as_ref()
    }

    /// The defaults as the lowest-priority fragment.
    ///
    /// `auth_type` is not included; it is applied after merging so that a
    /// legacy `auth_plugin` from any layer can still supply it.
    pub fn to_fragment(&self) -> Fragment {
        let mut fragment = self.values.clone();
        fragment.insert_nested("cache", "max_age", self.cache_max_age);
        if let Some(path) = &self.cache_path {
            fragment.insert_nested("cache", "path", path.to_string_lossy().into_owned());
        }
        fragment
    }
}

impl Default for Defaults {
    fn default() -> Self {
        let standard = Self::bare()
            .with_value("interface", "public")
            .with_value("identity_api_version", "2.0")
            .with_value("compute_api_version", "2")
            .with_value("image_api_version", "1")
            .with_value("volume_api_version", "1")
            .with_value("network_api_version", "2")
            .with_value("auth", json!({}));

        match ProjectDirs::from("org", "OpenStack", "openstack") {
            Some(dirs) => standard.with_cache_path(dirs.cache_dir()),
            None => standard,
        }
    }
}
