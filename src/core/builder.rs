//! Builder for constructing CloudConfig instances.

use crate::core::cloud_config::{CloudConfig, EnvState, Validator};
use crate::core::defaults::Defaults;
use crate::core::loader::{DocumentLoader, DocumentSource};
use crate::core::profile::CloudProfile;
use crate::error::{Result, ValidationError};
use crate::sources::{AllowList, CloudsDocument, DocumentKind, EnvSource, FileSource, TargetField};
use std::path::PathBuf;
use std::sync::Arc;

/// Builder for constructing a [`CloudConfig`].
///
/// Nothing is read until [`build`](Self::build). The environment is not
/// consulted unless [`with_process_env`](Self::with_process_env) or
/// [`with_env_snapshot`](Self::with_env_snapshot) is called.
///
/// # Examples
///
/// ```rust,no_run
/// use cloud_profile::prelude::*;
///
/// # fn example() -> Result<()> {
/// let config = CloudConfig::builder()
///     .with_config_file("clouds.yaml")
///     .with_config_file("/etc/openstack/clouds.yaml")
///     .with_vendor_file("/etc/openstack/clouds-public.yaml")
///     .with_process_env()
///     .with_argument("snack_type")
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct CloudConfigBuilder {
    config_files: Vec<PathBuf>,
    vendor_files: Vec<PathBuf>,
    user_document: Option<CloudsDocument>,
    vendor_document: Option<CloudsDocument>,
    env: Option<EnvSource>,
    env_prefix: Option<String>,
    defaults: Defaults,
    allow_list: AllowList,
    validators: Vec<Validator>,
}

impl CloudConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config_files: Vec::new(),
            vendor_files: Vec::new(),
            user_document: None,
            vendor_document: None,
            env: None,
            env_prefix: None,
            defaults: Defaults::default(),
            allow_list: AllowList::standard(),
            validators: Vec::new(),
        }
    }

    /// Add a candidate user config file.
    ///
    /// Candidates form a search list: the first one that exists is used.
    pub fn with_config_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_files.push(path.into());
        self
    }

    /// Add a candidate vendor file.
    ///
    /// Candidates form a search list: the first one that exists is used.
    pub fn with_vendor_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.vendor_files.push(path.into());
        self
    }

    /// Use an already-parsed user document instead of files.
    pub fn with_user_document(mut self, document: CloudsDocument) -> Self {
        self.user_document = Some(document);
        self
    }

    /// Use an already-parsed vendor document instead of files.
    pub fn with_vendor_document(mut self, document: CloudsDocument) -> Self {
        self.vendor_document = Some(document);
        self
    }

    /// Read environment variables from an explicit snapshot.
    pub fn with_env_snapshot<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = Some(EnvSource::from_snapshot(vars));
        self
    }

    /// Snapshot the process environment at build time.
    pub fn with_process_env(mut self) -> Self {
        self.env = Some(EnvSource::from_process());
        self
    }

    /// Use a different environment prefix (default `OS_`).
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = Some(prefix.into());
        self
    }

    /// Replace the built-in defaults.
    pub fn with_defaults(mut self, defaults: Defaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Replace the argument allow-list.
    pub fn with_allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    /// Recognize an extra command-line attribute as a top-level field.
    pub fn with_argument(mut self, attribute: impl Into<String>) -> Self {
        self.allow_list = self.allow_list.with_top_level(attribute);
        self
    }

    /// Recognize an extra command-line attribute with an explicit target.
    pub fn with_argument_target(mut self, attribute: impl Into<String>, target: TargetField) -> Self {
        self.allow_list = self.allow_list.with(attribute, target);
        self
    }

    /// Add a validation function every resolved profile must pass.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cloud_profile::prelude::*;
    ///
    /// let builder = CloudConfig::builder().with_validation(|profile: &CloudProfile| {
    ///     if profile.region_name().is_none() {
    ///         return Err(ValidationError::invalid_field("region_name", "is required"));
    ///     }
    ///     Ok(())
    /// });
    /// ```
    pub fn with_validation<F>(mut self, validator: F) -> Self
    where
        F: Fn(&CloudProfile) -> std::result::Result<(), ValidationError> + Send + Sync + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    /// Build the configuration handle.
    ///
    /// Loads the documents once and snapshots the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing file cannot be parsed or has the
    /// wrong shape.
    pub fn build(self) -> Result<CloudConfig> {
        let user = match self.user_document {
            Some(document) => DocumentSource::Fixed(document),
            None => DocumentSource::File(FileSource::search(DocumentKind::User, self.config_files)),
        };
        let vendor = match self.vendor_document {
            Some(document) => DocumentSource::Fixed(document),
            None => {
                DocumentSource::File(FileSource::search(DocumentKind::Vendor, self.vendor_files))
            }
        };

        let mut env = self.env.unwrap_or_else(EnvSource::empty);
        if let Some(prefix) = self.env_prefix {
            env = env.with_prefix(prefix);
        }
        let env = EnvState {
            fragment: env.fragment(),
            cloud_name: env.cloud_name(),
            default_cloud: env.default_cloud(),
        };

        CloudConfig::from_parts(
            DocumentLoader::new(user, vendor),
            env,
            self.allow_list,
            self.defaults,
            self.validators,
        )
    }
}

impl Default for CloudConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CloudConfig {
    /// Create a new builder for constructing a configuration handle.
    pub fn builder() -> CloudConfigBuilder {
        CloudConfigBuilder::new()
    }
}
