//! Configuration source implementations.
//!
//! Every source turns some external input into a [`Fragment`]:
//!
//! - [`FileSource`] reads the first existing file of a search list and parses
//!   it into a [`CloudsDocument`].
//! - [`EnvSource`] translates a snapshot of environment variables.
//! - [`AllowList`] extracts recognized attributes from an [`ArgSource`].

mod args;
mod config_source;
mod document;
mod env;
mod file;
mod fragment;

pub use args::{AllowList, ArgSource, TargetField};
pub use config_source::ConfigSource;
pub use document::{CloudsDocument, DocumentKind};
pub use env::{AUTH_KEYS, DEFAULT_ENV_CLOUD_NAME, DEFAULT_ENV_PREFIX, EnvSource};
pub use file::FileSource;
pub use fragment::Fragment;

pub(crate) use fragment::kind_of;
