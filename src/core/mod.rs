//! Core resolution types.

mod builder;
mod cloud_config;
mod defaults;
mod loader;
mod merge;
mod normalize;
mod profile;

pub use builder::CloudConfigBuilder;
pub use cloud_config::{CloudConfig, DEFAULTS_CLOUD_NAME};
pub use defaults::{DEFAULT_AUTH_TYPE, DEFAULT_CACHE_MAX_AGE, Defaults};
pub use merge::{DEEP_MERGE_KEYS, Layer, PrecedenceChain, resolve};
pub use profile::{CacheSettings, CloudProfile};
