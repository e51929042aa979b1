//! Command-line argument extraction.
//!
//! The argument parser itself is external. Its parsed result is consumed
//! through the small [`ArgSource`] capability, and only attributes named in
//! an [`AllowList`] are ever read.

use super::{AUTH_KEYS, Fragment};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// Prefix argument parsers commonly give to cloud options (`--os-username`).
const ARG_PREFIX: &str = "os_";

/// Top-level attributes recognized by [`AllowList::standard`].
const STANDARD_TOP_LEVEL: &[&str] = &[
    "region_name",
    "auth_type",
    "interface",
    "endpoint_type",
    "identity_api_version",
    "compute_api_version",
    "image_api_version",
    "volume_api_version",
    "network_api_version",
    "api_timeout",
    "cacert",
    "cert",
    "key",
    "verify",
    "insecure",
];

/// Read access to a parsed set of command-line attributes.
///
/// Return `None` when the attribute was not given. A value that was given
/// but is falsy (`false`, `0`, `""`) must be returned as `Some`.
pub trait ArgSource {
    /// Look up one attribute by name.
    fn get(&self, name: &str) -> Option<Value>;
}

impl<T: ArgSource + ?Sized> ArgSource for &T {
    fn get(&self, name: &str) -> Option<Value> {
        (**self).get(name)
    }
}

impl ArgSource for BTreeMap<String, Value> {
    fn get(&self, name: &str) -> Option<Value> {
        BTreeMap::get(self, name).cloned()
    }
}

impl ArgSource for HashMap<String, Value> {
    fn get(&self, name: &str) -> Option<Value> {
        HashMap::get(self, name).cloned()
    }
}

impl ArgSource for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<Value> {
        BTreeMap::get(self, name).cloned().map(Value::String)
    }
}

impl ArgSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<Value> {
        HashMap::get(self, name).cloned().map(Value::String)
    }
}

impl ArgSource for Fragment {
    fn get(&self, name: &str) -> Option<Value> {
        Fragment::get(self, name).cloned()
    }
}

/// Where a recognized attribute lands in the fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetField {
    /// A top-level key.
    Top(String),
    /// A key inside the nested `auth` mapping.
    Auth(String),
}

/// Table of recognized attribute names and their target fields.
///
/// # Examples
///
/// ```rust
/// use cloud_profile::sources::AllowList;
/// use serde_json::{Value, json};
/// use std::collections::BTreeMap;
///
/// let mut args: BTreeMap<String, Value> = BTreeMap::new();
/// args.insert("region_name".into(), json!("other-test-region"));
/// args.insert("os_username".into(), json!("bob"));
/// args.insert("verbose".into(), json!(true));
///
/// let fragment = AllowList::standard().extract(Some(&args));
/// assert_eq!(fragment.get_str("region_name"), Some("other-test-region"));
/// assert_eq!(fragment.get("auth"), Some(&json!({ "username": "bob" })));
/// assert!(!fragment.contains_key("verbose"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AllowList {
    entries: Vec<(String, TargetField)>,
}

impl AllowList {
    /// An allow-list that recognizes nothing.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The standard allow-list: every auth key plus common connection options.
    pub fn standard() -> Self {
        let auth = AUTH_KEYS
            .iter()
            .map(|key| (key.to_string(), TargetField::Auth(key.to_string())));
        let top = STANDARD_TOP_LEVEL
            .iter()
            .map(|key| (key.to_string(), TargetField::Top(key.to_string())));
        Self {
            entries: auth.chain(top).collect(),
        }
    }

    /// Recognize `attribute`, storing it under `target`.
    ///
    /// A later entry for the same attribute replaces the earlier one.
    pub fn with(mut self, attribute: impl Into<String>, target: TargetField) -> Self {
        let attribute = attribute.into();
        self.entries.retain(|(name, _)| *name != attribute);
        self.entries.push((attribute, target));
        self
    }

    /// Recognize `attribute` as a top-level key of the same name.
    pub fn with_top_level(self, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        let target = TargetField::Top(attribute.clone());
        self.with(attribute, target)
    }

    /// Whether `attribute` is recognized.
    pub fn contains(&self, attribute: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == attribute)
    }

    /// Number of recognized attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is recognized.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Extract recognized, explicitly given attributes.
    ///
    /// Each attribute is looked up under its own name first, then with an
    /// `os_` prefix. Attributes that are missing or `null` are omitted, so
    /// lower-priority values stay intact. No source yields an empty fragment.
    pub fn extract(&self, args: Option<&dyn ArgSource>) -> Fragment {
        let mut fragment = Fragment::new();
        let Some(args) = args else {
            return fragment;
        };

        for (attribute, target) in &self.entries {
            let value = args
                .get(attribute)
                .filter(|v| !v.is_null())
                .or_else(|| args.get(&format!("{}{}", ARG_PREFIX, attribute)))
                .filter(|v| !v.is_null());
            let Some(value) = value else {
                continue;
            };

            match target {
                TargetField::Top(key) => {
                    fragment.insert(key.clone(), value);
                }
                TargetField::Auth(key) => fragment.insert_nested("auth", key.clone(), value),
            }
        }

        fragment
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(pairs: &[(&str, Value)]) -> BTreeMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_no_source_yields_empty_fragment() {
        assert!(AllowList::standard().extract(None).is_empty());
    }

    #[test]
    fn test_unrecognized_attributes_are_ignored() {
        let bag = args(&[
            ("region_name", json!("other-test-region")),
            ("snack_type", json!("cookie")),
        ]);
        let fragment = AllowList::standard().extract(Some(&bag));
        assert_eq!(fragment.get_str("region_name"), Some("other-test-region"));
        assert!(!fragment.contains_key("snack_type"));
    }

    #[test]
    fn test_extended_allow_list_exposes_custom_field() {
        let bag = args(&[("snack_type", json!("cookie"))]);
        let list = AllowList::standard().with_top_level("snack_type");
        assert!(list.contains("snack_type"));
        assert_eq!(list.extract(Some(&bag)).get_str("snack_type"), Some("cookie"));
    }

    #[test]
    fn test_null_attributes_are_absent() {
        let bag = args(&[("region_name", Value::Null)]);
        assert!(AllowList::standard().extract(Some(&bag)).is_empty());
    }

    #[test]
    fn test_falsy_attributes_are_present() {
        let bag = args(&[("verify", json!(false)), ("api_timeout", json!(0))]);
        let fragment = AllowList::standard().extract(Some(&bag));
        assert_eq!(fragment.get("verify"), Some(&json!(false)));
        assert_eq!(fragment.get("api_timeout"), Some(&json!(0)));
    }

    #[test]
    fn test_prefixed_attribute_names() {
        let bag = args(&[
            ("os_password", json!("secret")),
            ("os_region_name", json!("r2")),
        ]);
        let fragment = AllowList::standard().extract(Some(&bag));
        assert_eq!(fragment.get_str("region_name"), Some("r2"));
        assert_eq!(fragment.get("auth"), Some(&json!({ "password": "secret" })));
    }

    #[test]
    fn test_unprefixed_name_wins() {
        let bag = args(&[
            ("region_name", json!("plain")),
            ("os_region_name", json!("prefixed")),
        ]);
        let fragment = AllowList::standard().extract(Some(&bag));
        assert_eq!(fragment.get_str("region_name"), Some("plain"));
    }

    #[test]
    fn test_custom_target_field() {
        let bag = args(&[("user", json!("carol"))]);
        let list = AllowList::empty().with("user", TargetField::Auth("username".into()));
        assert_eq!(
            list.extract(Some(&bag)).get("auth"),
            Some(&json!({ "username": "carol" }))
        );
    }

    #[test]
    fn test_with_replaces_existing_entry() {
        let list = AllowList::empty()
            .with("region", TargetField::Top("a".into()))
            .with("region", TargetField::Top("b".into()));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_string_map_source() {
        let mut bag: HashMap<String, String> = HashMap::new();
        bag.insert("region_name".into(), "r3".into());
        let fragment = AllowList::standard().extract(Some(&bag));
        assert_eq!(fragment.get_str("region_name"), Some("r3"));
    }
}
