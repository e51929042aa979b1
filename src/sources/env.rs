//! Environment variable configuration source.

use super::{ConfigSource, Fragment};
use crate::core::DEEP_MERGE_KEYS;
use crate::error::Result;
use std::collections::BTreeMap;

/// Prefix recognized when none is configured.
pub const DEFAULT_ENV_PREFIX: &str = "OS_";

/// Name of the synthetic cloud built from environment variables.
pub const DEFAULT_ENV_CLOUD_NAME: &str = "envvars";

/// Keys that belong inside the nested `auth` mapping rather than at the top level.
pub const AUTH_KEYS: &[&str] = &[
    "auth_url",
    "username",
    "password",
    "user_id",
    "user_domain_id",
    "user_domain_name",
    "project_id",
    "project_name",
    "project_domain_id",
    "project_domain_name",
    "domain_id",
    "domain_name",
    "tenant_id",
    "tenant_name",
    "token",
    "trust_id",
    "default_domain",
];

/// Selects the cloud to use when the caller names none.
const CLOUD_VAR: &str = "CLOUD";
/// Renames the synthetic environment cloud.
const CLOUD_NAME_VAR: &str = "CLOUD_NAME";

/// Environment variable configuration source.
///
/// Works on a snapshot taken once at construction, so the process
/// environment is never read during resolution and never mutated.
///
/// `OS_REGION_NAME=r1` becomes `region_name = "r1"`; variables named in
/// [`AUTH_KEYS`] are routed into `auth`, so `OS_USERNAME=alice` becomes
/// `auth.username = "alice"`. Empty or whitespace-only values are unset.
/// Variables naming a nested section themselves (`OS_AUTH`, `OS_CACHE`) are
/// ignored.
///
/// # Examples
///
/// ```rust
/// use cloud_profile::sources::EnvSource;
///
/// let env = EnvSource::from_snapshot([
///     ("OS_USERNAME", "alice"),
///     ("OS_REGION_NAME", "r1"),
///     ("HOME", "/home/alice"),
/// ]);
///
/// let fragment = env.fragment();
/// assert_eq!(fragment.get_str("region_name"), Some("r1"));
/// assert!(!fragment.contains_key("home"));
/// ```
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    vars: BTreeMap<String, String>,
}

impl EnvSource {
    /// Create a source over an explicit environment snapshot.
    pub fn from_snapshot<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            prefix: DEFAULT_ENV_PREFIX.to_string(),
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Snapshot the current process environment.
    ///
    /// Variables whose name or value is not valid unicode are skipped.
    pub fn from_process() -> Self {
        Self::from_snapshot(std::env::vars_os().filter_map(|(k, v)| {
            Some((k.into_string().ok()?, v.into_string().ok()?))
        }))
    }

    /// An empty environment.
    pub fn empty() -> Self {
        Self::from_snapshot(std::iter::empty::<(String, String)>())
    }

    /// Use a different variable prefix (default `OS_`).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// The recognized prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Cloud selected by `<PREFIX>CLOUD`, if set.
    pub fn default_cloud(&self) -> Option<String> {
        self.control_var(CLOUD_VAR)
    }

    /// Name under which the environment is exposed as a cloud.
    pub fn cloud_name(&self) -> String {
        self.control_var(CLOUD_NAME_VAR)
            .unwrap_or_else(|| DEFAULT_ENV_CLOUD_NAME.to_string())
    }

    /// Translate the snapshot into a fragment.
    pub fn fragment(&self) -> Fragment {
        let mut fragment = Fragment::new();

        for (name, value) in &self.vars {
            let Some(suffix) = name.strip_prefix(&self.prefix) else {
                continue;
            };
            if suffix.is_empty() || suffix == CLOUD_VAR || suffix == CLOUD_NAME_VAR {
                continue;
            }
            let Some(value) = non_empty(value) else {
                continue;
            };

            let key = suffix.to_lowercase();
            if DEEP_MERGE_KEYS.contains(&key.as_str()) {
                tracing::warn!(
                    variable = %name,
                    "ignoring environment variable that would replace a nested section"
                );
                continue;
            }
            if AUTH_KEYS.contains(&key.as_str()) {
                fragment.insert_nested("auth", key, value);
            } else {
                fragment.insert(key, value);
            }
        }

        tracing::trace!(
            prefix = %self.prefix,
            keys = fragment.len(),
            "translated environment snapshot"
        );
        fragment
    }

    fn control_var(&self, suffix: &str) -> Option<String> {
        self.vars
            .get(&format!("{}{}", self.prefix, suffix))
            .map(String::as_str)
            .and_then(non_empty)
            .map(str::to_string)
    }
}

impl ConfigSource for EnvSource {
    fn load(&self) -> Result<Fragment> {
        Ok(self.fragment())
    }

    fn name(&self) -> String {
        format!("env:{}*", self.prefix)
    }
}

/// Trimmed value, or `None` when empty or whitespace-only.
fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_name() {
        let source = EnvSource::empty();
        assert_eq!(source.name(), "env:OS_*");
        assert_eq!(source.with_prefix("APP_").name(), "env:APP_*");
    }

    #[test]
    fn test_section_variables_are_ignored() {
        let source = EnvSource::from_snapshot([
            ("OS_AUTH", "x"),
            ("OS_CACHE", "y"),
            ("OS_USERNAME", "alice"),
        ]);
        let fragment = source.fragment();
        assert_eq!(fragment.get("auth"), Some(&json!({ "username": "alice" })));
        assert!(!fragment.contains_key("cache"));

        let only_sections = EnvSource::from_snapshot([("OS_AUTH", "x")]);
        assert!(only_sections.fragment().is_empty());
    }

    #[test]
    fn test_load_empty() {
        let source = EnvSource::from_snapshot([("HOME", "/root"), ("PATH", "/bin")]);
        assert!(source.load().unwrap().is_empty());
    }

    #[test]
    fn test_flat_and_auth_keys() {
        let source = EnvSource::from_snapshot([
            ("OS_AUTH_URL", "http://example.com/v2"),
            ("OS_USERNAME", "alice"),
            ("OS_PASSWORD", "secret"),
            ("OS_REGION_NAME", "test-region"),
            ("OS_INTERFACE", "internal"),
        ]);

        let fragment = source.fragment();
        assert_eq!(fragment.get_str("region_name"), Some("test-region"));
        assert_eq!(fragment.get_str("interface"), Some("internal"));
        assert_eq!(
            fragment.get("auth"),
            Some(&json!({
                "auth_url": "http://example.com/v2",
                "username": "alice",
                "password": "secret",
            }))
        );
        assert!(!fragment.contains_key("username"));
    }

    #[test]
    fn test_blank_values_are_unset() {
        let source = EnvSource::from_snapshot([("OS_REGION_NAME", "  "), ("OS_USERNAME", "")]);
        assert!(source.fragment().is_empty());
    }

    #[test]
    fn test_values_are_trimmed() {
        let source = EnvSource::from_snapshot([("OS_REGION_NAME", " r1 ")]);
        assert_eq!(source.fragment().get_str("region_name"), Some("r1"));
    }

    #[test]
    fn test_control_vars_are_not_config() {
        let source = EnvSource::from_snapshot([
            ("OS_CLOUD", "mycloud"),
            ("OS_CLOUD_NAME", "fromenv"),
        ]);
        assert!(source.fragment().is_empty());
        assert_eq!(source.default_cloud().as_deref(), Some("mycloud"));
        assert_eq!(source.cloud_name(), "fromenv");
    }

    #[test]
    fn test_default_cloud_name() {
        assert_eq!(EnvSource::empty().cloud_name(), DEFAULT_ENV_CLOUD_NAME);
        assert_eq!(EnvSource::empty().default_cloud(), None);
    }

    #[test]
    fn test_custom_prefix() {
        let source = EnvSource::from_snapshot([("OS_REGION_NAME", "r1"), ("MY_REGION_NAME", "r2")])
            .with_prefix("MY_");
        assert_eq!(source.fragment().get_str("region_name"), Some("r2"));
    }

    #[test]
    fn test_prefix_match_is_case_sensitive() {
        let source = EnvSource::from_snapshot([("os_region_name", "r1")]);
        assert!(source.fragment().is_empty());
    }
}
