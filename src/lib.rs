//! # cloud-profile
//!
//! Layered resolution of named cloud connection profiles.
//!
//! ## Overview
//!
//! A command-line client usually needs one fully-populated connection
//! profile ("cloud"), but the settings for it are spread over several places.
//! `cloud-profile` merges them in a fixed order, lowest priority first:
//!
//! 1. built-in defaults (plus the user document's global `cache` section)
//! 2. the vendor file entry for the cloud
//! 3. the user file entry for the cloud
//! 4. `OS_*` environment variables
//! 5. explicit programmatic overrides
//! 6. command-line arguments
//!
//! Later layers replace earlier values key by key. The nested `auth` and
//! `cache` mappings are merged per inner key, so overriding `auth.username`
//! keeps `auth.password` from a lower layer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cloud_profile::prelude::*;
//! use serde_json::json;
//!
//! # fn example() -> Result<()> {
//! let config = CloudConfig::builder()
//!     .with_config_file("clouds.yaml")
//!     .with_vendor_file("clouds-public.yaml")
//!     .with_process_env()
//!     .build()?;
//!
//! let profile = config.get_one_cloud(
//!     Some("mycloud"),
//!     Fragment::new().with("auth", json!({ "username": "bob" })),
//!     None,
//! )?;
//!
//! println!("region: {:?}", profile.region_name());
//! println!("user: {:?}", profile.auth_value("username"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Failure modes
//!
//! Asking for a cloud no file defines is an error
//! ([`ConfigError::NotFound`](error::ConfigError::NotFound)); resolving
//! without a name never is, since the caller supplied everything explicitly.
//!
//! ## Feature Flags
//!
//! - `yaml` (default), `json` (default), `toml`: file formats accepted by
//!   [`sources::FileSource`].

#![warn(missing_docs, rust_2024_compatibility)]
#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod sources;

/// Convenient re-exports for common usage patterns.
pub mod prelude {
    pub use crate::core::{CloudConfig, CloudConfigBuilder, CloudProfile, Defaults};
    pub use crate::error::{ConfigError, Result, ValidationError};
    pub use crate::sources::{AllowList, ArgSource, Fragment};
}
