//! Parsed clouds documents.

use super::{Fragment, kind_of};
use crate::error::{ConfigError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// Which kind of file a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    /// User-authored config, clouds listed under `clouds`.
    User,
    /// Distributor-supplied defaults, clouds listed under `public-clouds`.
    Vendor,
}

impl DocumentKind {
    /// Top-level keys holding the cloud table, in lookup order.
    fn cloud_keys(self) -> &'static [&'static str] {
        match self {
            DocumentKind::User => &["clouds"],
            DocumentKind::Vendor => &["public-clouds", "clouds"],
        }
    }
}

/// A parsed configuration document: named cloud fragments plus global settings.
///
/// # Examples
///
/// ```rust
/// use cloud_profile::sources::{CloudsDocument, Fragment};
///
/// let doc = CloudsDocument::new()
///     .with_cloud("mycloud", Fragment::new().with("region_name", "r1"))
///     .with_default_cloud("mycloud");
///
/// assert!(doc.contains("mycloud"));
/// assert_eq!(doc.default_cloud(), Some("mycloud"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloudsDocument {
    clouds: BTreeMap<String, Fragment>,
    cache: Option<Fragment>,
    default_cloud: Option<String>,
}

impl CloudsDocument {
    /// An empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Interpret a whole-file fragment as a document of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MalformedFragment`] when the cloud table, a
    /// cloud entry or the `cache` section is not a mapping, or when
    /// `default_cloud` is not a string.
    pub fn from_fragment(source_name: &str, kind: DocumentKind, mut root: Fragment) -> Result<Self> {
        let mut doc = CloudsDocument::new();

        let table_key = kind
            .cloud_keys()
            .iter()
            .copied()
            .find(|key| root.contains_key(key));
        if let Some(table_key) = table_key {
            let table = root.remove(table_key).unwrap_or(Value::Null);
            let table = match table {
                Value::Object(map) => map,
                other => {
                    return Err(ConfigError::malformed(
                        source_name,
                        table_key,
                        format!("must be a mapping, found {}", kind_of(&other)),
                    ));
                }
            };
            for (name, entry) in table {
                let fragment = match entry {
                    Value::Null => Fragment::new(),
                    Value::Object(map) => Fragment::from(map),
                    other => {
                        return Err(ConfigError::malformed(
                            source_name,
                            format!("{}.{}", table_key, name),
                            format!("must be a mapping, found {}", kind_of(&other)),
                        ));
                    }
                };
                doc.clouds.insert(name, fragment);
            }
        }

        if kind == DocumentKind::User {
            if let Some(cache) = root.remove("cache") {
                match cache {
                    Value::Object(map) => doc.cache = Some(Fragment::from(map)),
                    other => {
                        return Err(ConfigError::malformed(
                            source_name,
                            "cache",
                            format!("must be a mapping, found {}", kind_of(&other)),
                        ));
                    }
                }
            }
            if let Some(default) = root.remove("default_cloud") {
                match default {
                    Value::String(name) => doc.default_cloud = Some(name),
                    other => {
                        return Err(ConfigError::malformed(
                            source_name,
                            "default_cloud",
                            format!("must be a string, found {}", kind_of(&other)),
                        ));
                    }
                }
            }
        }

        Ok(doc)
    }

    /// Add or replace a cloud entry.
    pub fn with_cloud(mut self, name: impl Into<String>, fragment: Fragment) -> Self {
        self.clouds.insert(name.into(), fragment);
        self
    }

    /// Set the top-level cache settings.
    pub fn with_cache(mut self, cache: Fragment) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the default cloud hint.
    pub fn with_default_cloud(mut self, name: impl Into<String>) -> Self {
        self.default_cloud = Some(name.into());
        self
    }

    /// The fragment for a named cloud.
    pub fn cloud(&self, name: &str) -> Option<&Fragment> {
        self.clouds.get(name)
    }

    /// Whether the document defines the named cloud.
    pub fn contains(&self, name: &str) -> bool {
        self.clouds.contains_key(name)
    }

    /// Defined cloud names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clouds.keys().map(String::as_str)
    }

    /// Whether no clouds are defined.
    pub fn is_empty(&self) -> bool {
        self.clouds.is_empty()
    }

    /// Top-level cache settings.
    pub fn cache(&self) -> Option<&Fragment> {
        self.cache.as_ref()
    }

    /// The default cloud hint.
    pub fn default_cloud(&self) -> Option<&str> {
        self.default_cloud.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root(value: Value) -> Fragment {
        Fragment::from_value("test", value).unwrap()
    }

    #[test]
    fn test_user_document() {
        let doc = CloudsDocument::from_fragment(
            "test",
            DocumentKind::User,
            root(json!({
                "clouds": {
                    "_test_cloud_": { "region_name": "test-region" },
                    "empty": null,
                },
                "cache": { "max_age": 900 },
                "default_cloud": "_test_cloud_",
            })),
        )
        .unwrap();

        assert_eq!(doc.names().collect::<Vec<_>>(), vec!["_test_cloud_", "empty"]);
        assert_eq!(
            doc.cloud("_test_cloud_").and_then(|c| c.get_str("region_name")),
            Some("test-region")
        );
        assert!(doc.cloud("empty").is_some_and(Fragment::is_empty));
        assert_eq!(doc.cache().and_then(|c| c.get("max_age")), Some(&json!(900)));
        assert_eq!(doc.default_cloud(), Some("_test_cloud_"));
    }

    #[test]
    fn test_vendor_document_uses_public_clouds() {
        let doc = CloudsDocument::from_fragment(
            "test",
            DocumentKind::Vendor,
            root(json!({
                "public-clouds": { "acme": { "auth": { "auth_url": "https://acme" } } },
                "cache": { "max_age": 1 },
            })),
        )
        .unwrap();

        assert!(doc.contains("acme"));
        assert!(doc.cache().is_none());
    }

    #[test]
    fn test_vendor_document_accepts_clouds() {
        let doc = CloudsDocument::from_fragment(
            "test",
            DocumentKind::Vendor,
            root(json!({ "clouds": { "acme": {} } })),
        )
        .unwrap();
        assert!(doc.contains("acme"));
    }

    #[test]
    fn test_missing_table_is_empty() {
        let doc = CloudsDocument::from_fragment("test", DocumentKind::User, Fragment::new())
            .unwrap();
        assert!(doc.is_empty());
    }

    #[test]
    fn test_scalar_cloud_entry_is_malformed() {
        let err = CloudsDocument::from_fragment(
            "test",
            DocumentKind::User,
            root(json!({ "clouds": { "bad": "value" } })),
        )
        .unwrap_err();
        match err {
            ConfigError::MalformedFragment { key, .. } => assert_eq!(key, "clouds.bad"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_scalar_cache_is_malformed() {
        let result = CloudsDocument::from_fragment(
            "test",
            DocumentKind::User,
            root(json!({ "cache": 5 })),
        );
        assert!(matches!(result, Err(ConfigError::MalformedFragment { .. })));
    }
}
