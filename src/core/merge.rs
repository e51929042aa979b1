//! Precedence chain and the merge fold.
//!
//! Fragments are folded lowest priority first. Ordinary keys are replaced
//! wholesale by later layers; keys listed in [`DEEP_MERGE_KEYS`] are merged
//! per inner key so a later layer can override `auth.username` without
//! dropping `auth.password` from an earlier one.

use crate::error::{ConfigError, Result};
use crate::sources::{Fragment, kind_of};
use serde_json::{Map, Value};
use std::fmt;

/// Keys whose mapping values are merged per inner key instead of replaced.
pub const DEEP_MERGE_KEYS: &[&str] = &["auth", "cache"];

/// A slot in the precedence chain, declared lowest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Layer {
    /// Built-in defaults and global document settings.
    Defaults,
    /// Vendor file entry for the cloud.
    Vendor,
    /// User file entry for the cloud.
    User,
    /// Environment-derived fragment.
    Environment,
    /// Explicit programmatic overrides.
    Overrides,
    /// Command-line arguments.
    Arguments,
}

impl Layer {
    /// Every layer in ascending priority.
    pub const ALL: [Layer; 6] = [
        Layer::Defaults,
        Layer::Vendor,
        Layer::User,
        Layer::Environment,
        Layer::Overrides,
        Layer::Arguments,
    ];

    /// Lower-case layer name.
    pub fn as_str(self) -> &'static str {
        match self {
            Layer::Defaults => "defaults",
            Layer::Vendor => "vendor",
            Layer::User => "user",
            Layer::Environment => "environment",
            Layer::Overrides => "overrides",
            Layer::Arguments => "arguments",
        }
    }

    /// Whether the layer comes from a configuration file.
    pub fn is_file_backed(self) -> bool {
        matches!(self, Layer::Vendor | Layer::User)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One optional fragment per [`Layer`]; iteration order is fixed.
///
/// # Examples
///
/// ```rust
/// use cloud_profile::core::{Layer, PrecedenceChain, resolve};
/// use cloud_profile::sources::Fragment;
///
/// let chain = PrecedenceChain::new()
///     .with(Layer::Arguments, Fragment::new().with("region_name", "cli"))
///     .with(Layer::User, Fragment::new().with("region_name", "file"));
///
/// let merged = resolve(&chain).unwrap();
/// assert_eq!(merged.get_str("region_name"), Some("cli"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrecedenceChain {
    layers: [Option<Fragment>; 6],
}

impl PrecedenceChain {
    /// An empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fragment for a layer, replacing any previous one.
    pub fn set(&mut self, layer: Layer, fragment: Fragment) {
        self.layers[layer as usize] = Some(fragment);
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, layer: Layer, fragment: Fragment) -> Self {
        self.set(layer, fragment);
        self
    }

    /// The fragment for a layer, if set.
    pub fn get(&self, layer: Layer) -> Option<&Fragment> {
        self.layers[layer as usize].as_ref()
    }

    /// Set layers in ascending priority.
    pub fn iter(&self) -> impl Iterator<Item = (Layer, &Fragment)> {
        Layer::ALL
            .into_iter()
            .filter_map(|layer| self.get(layer).map(|fragment| (layer, fragment)))
    }
}

/// Fold the chain into a single fragment.
///
/// # Errors
///
/// Returns [`ConfigError::MalformedFragment`] when a layer sets a
/// deep-merge key to something other than a mapping.
pub fn resolve(chain: &PrecedenceChain) -> Result<Fragment> {
    let mut merged = Fragment::new();
    for (layer, fragment) in chain.iter() {
        tracing::trace!(%layer, keys = fragment.len(), "merging layer");
        merge_layer(&mut merged, layer, fragment)?;
    }
    Ok(merged)
}

fn merge_layer(acc: &mut Fragment, layer: Layer, fragment: &Fragment) -> Result<()> {
    for (key, value) in fragment.iter() {
        if value.is_null() {
            continue;
        }

        if !DEEP_MERGE_KEYS.contains(&key) {
            acc.insert(key, value.clone());
            continue;
        }

        let Value::Object(incoming) = value else {
            return Err(ConfigError::malformed(
                layer.as_str(),
                key,
                format!("must be a mapping, found {}", kind_of(value)),
            ));
        };

        let mut target = match acc.remove(key) {
            Some(Value::Object(existing)) => existing,
            _ => Map::new(),
        };
        deep_merge(&mut target, incoming);
        acc.insert(key, Value::Object(target));
    }
    Ok(())
}

/// Last-write-wins per key, recursing where both sides hold mappings.
fn deep_merge(target: &mut Map<String, Value>, incoming: &Map<String, Value>) {
    for (key, value) in incoming {
        match value {
            Value::Null => {}
            Value::Object(nested) => {
                if let Some(Value::Object(existing)) = target.get_mut(key) {
                    deep_merge(existing, nested);
                } else {
                    let mut fresh = Map::new();
                    deep_merge(&mut fresh, nested);
                    target.insert(key.clone(), Value::Object(fresh));
                }
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}
