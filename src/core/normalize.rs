//! Post-merge validation and normalization.
//!
//! Runs once on the merged fragment. After it succeeds the fragment is
//! wrapped in a [`CloudProfile`] and never touched again.

use crate::core::defaults::Defaults;
use crate::core::profile::{CacheSettings, CloudProfile};
use crate::error::{ConfigError, Result};
use crate::sources::{Fragment, kind_of};
use serde_json::{Map, Value};

/// Key naming the vendor entry a user cloud builds on.
pub(crate) const PROFILE_KEY: &str = "profile";

/// Legacy `auth` keys and their replacements.
const LEGACY_AUTH_KEYS: &[(&str, &str)] = &[
    ("tenant_name", "project_name"),
    ("tenant_id", "project_id"),
];

/// Fail unless a named cloud was found in a file-backed source.
///
/// Override-only resolution (no name) never reaches this check.
pub(crate) fn require_known(name: &str, known: bool) -> Result<()> {
    if known {
        return Ok(());
    }
    tracing::debug!(cloud = name, "cloud not defined by any source");
    Err(ConfigError::NotFound {
        cloud: name.to_string(),
    })
}

/// Turn a merged fragment into a profile.
///
/// # Errors
///
/// - [`ConfigError::MalformedFragment`] if `cache` holds unusable values.
/// - [`ConfigError::MissingDefault`] if the cache path cannot be defaulted.
pub(crate) fn normalize(
    name: Option<&str>,
    mut merged: Fragment,
    defaults: &Defaults,
) -> Result<CloudProfile> {
    if let Some(plugin) = merged.remove("auth_plugin") {
        if !merged.contains_key("auth_type") {
            merged.insert("auth_type", plugin);
        }
    }
    if !merged.contains_key("auth_type") {
        merged.insert("auth_type", defaults.auth_type());
    }

    let mut auth = match merged.remove("auth") {
        Some(Value::Object(auth)) => auth,
        _ => Map::new(),
    };
    for (legacy, current) in LEGACY_AUTH_KEYS {
        if let Some(value) = auth.remove(*legacy) {
            auth.entry(current.to_string()).or_insert(value);
        }
    }
    merged.insert("auth", Value::Object(auth));

    if let Some(insecure) = merged.remove("insecure") {
        if !merged.contains_key("verify") {
            merged.insert("verify", !is_truthy(&insecure));
        }
    }

    let cache = normalize_cache(merged.remove("cache"), defaults)?;
    merged.insert("cache", cache);

    merged.remove(PROFILE_KEY);
    match name {
        Some(name) => merged.insert("cloud", name),
        None => merged.remove("cloud"),
    };

    Ok(CloudProfile::new(name.map(str::to_string), merged))
}

fn normalize_cache(cache: Option<Value>, defaults: &Defaults) -> Result<Value> {
    let mut cache = match cache {
        None => Map::new(),
        Some(Value::Object(cache)) => cache,
        Some(other) => {
            return Err(ConfigError::malformed(
                "merged",
                "cache",
                format!("must be a mapping, found {}", kind_of(&other)),
            ));
        }
    };

    cache
        .entry("max_age")
        .or_insert_with(|| defaults.cache_max_age().into());
    if !cache.contains_key("path") {
        let path = defaults
            .cache_path()
            .ok_or(ConfigError::MissingDefault("cache.path"))?;
        cache.insert("path".into(), path.to_string_lossy().into_owned().into());
    }

    let settings = CacheSettings::from_map(&cache).ok_or_else(|| {
        ConfigError::malformed(
            "merged",
            "cache",
            "needs a non-negative integer max_age and a string path",
        )
    })?;
    cache.insert("max_age".into(), settings.max_age.into());

    Ok(Value::Object(cache))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Value::Null => false,
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
