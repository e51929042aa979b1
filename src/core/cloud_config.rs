//! The configuration handle that resolves named clouds.

use crate::core::defaults::Defaults;
use crate::core::loader::{DocumentLoader, Documents};
use crate::core::merge::{Layer, PrecedenceChain, resolve};
use crate::core::normalize::{PROFILE_KEY, normalize, require_known};
use crate::core::profile::{CacheSettings, CloudProfile};
use crate::error::{Result, ValidationError};
use crate::sources::{AllowList, ArgSource, Fragment};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Name of the synthetic cloud available when the user document defines none.
pub const DEFAULTS_CLOUD_NAME: &str = "defaults";

/// Type alias for validator functions.
pub(crate) type Validator =
    Arc<dyn Fn(&CloudProfile) -> std::result::Result<(), ValidationError> + Send + Sync>;

/// Environment-derived state, fixed when the handle is built.
#[derive(Debug, Clone)]
pub(crate) struct EnvState {
    pub(crate) fragment: Fragment,
    pub(crate) cloud_name: String,
    pub(crate) default_cloud: Option<String>,
}

/// Resolves cloud profiles from layered sources.
///
/// Documents are kept in an `arc-swap` snapshot. Each resolution loads the
/// current snapshot once, so resolving from many threads needs no locking and
/// a concurrent [`reload`](Self::reload) never produces a mixed result.
///
/// # Examples
///
/// ```rust,no_run
/// use cloud_profile::prelude::*;
///
/// # fn example() -> Result<()> {
/// let config = CloudConfig::builder()
///     .with_config_file("clouds.yaml")
///     .with_vendor_file("clouds-public.yaml")
///     .with_process_env()
///     .build()?;
///
/// let profile = config.get_one_cloud(Some("mycloud"), Fragment::new(), None)?;
/// println!("region: {:?}", profile.region_name());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CloudConfig {
    documents: Arc<ArcSwap<Documents>>,
    loader: Arc<DocumentLoader>,
    env: Arc<EnvState>,
    allow_list: Arc<AllowList>,
    defaults: Arc<Defaults>,
    validators: Arc<Vec<Validator>>,
}

impl CloudConfig {
    pub(crate) fn from_parts(
        loader: DocumentLoader,
        env: EnvState,
        allow_list: AllowList,
        defaults: Defaults,
        validators: Vec<Validator>,
    ) -> Result<Self> {
        let documents = loader.load()?;
        Ok(Self {
            documents: Arc::new(ArcSwap::from_pointee(documents)),
            loader: Arc::new(loader),
            env: Arc::new(env),
            allow_list: Arc::new(allow_list),
            defaults: Arc::new(defaults),
            validators: Arc::new(validators),
        })
    }

    /// Resolve one cloud.
    ///
    /// `cloud` of `None` or `""` means no name was supplied: the default
    /// cloud (`OS_CLOUD`, then the document's `default_cloud`) is used if one
    /// is configured, otherwise only defaults, environment, `overrides` and
    /// `args` contribute.
    ///
    /// Precedence, lowest first: defaults, vendor entry, user entry,
    /// environment, `overrides`, `args`. `auth` and `cache` are merged per
    /// inner key.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::NotFound`](crate::error::ConfigError::NotFound) if a named cloud is not defined anywhere.
    /// - [`ConfigError::MalformedFragment`](crate::error::ConfigError::MalformedFragment) if a source has the wrong shape.
    /// - [`ConfigError::MissingDefault`](crate::error::ConfigError::MissingDefault) if no cache path can be determined.
    /// - [`ConfigError::ValidationError`](crate::error::ConfigError::ValidationError) if a registered validator fails.
    pub fn get_one_cloud(
        &self,
        cloud: Option<&str>,
        overrides: Fragment,
        args: Option<&dyn ArgSource>,
    ) -> Result<CloudProfile> {
        let documents = self.documents.load_full();
        let name = self.requested_name(cloud, &documents);

        let mut chain = PrecedenceChain::new();
        chain.set(Layer::Defaults, self.base_fragment(&documents));

        if let Some(name) = name.as_deref() {
            let user = documents.user.cloud(name);
            let vendor_name = user
                .and_then(|fragment| fragment.get_str(PROFILE_KEY))
                .unwrap_or(name);
            let vendor = documents.vendor.cloud(vendor_name);
            if vendor.is_none() && vendor_name != name {
                tracing::warn!(
                    cloud = name,
                    profile = vendor_name,
                    "vendor profile referenced by cloud is not defined"
                );
            }

            if let Some(vendor) = vendor {
                chain.set(Layer::Vendor, vendor.clone());
            }
            if let Some(user) = user {
                chain.set(Layer::User, user.clone());
            }

            let known = chain.iter().any(|(layer, _)| layer.is_file_backed())
                || self.is_env_cloud(name)
                || (name == DEFAULTS_CLOUD_NAME && documents.user.is_empty());
            require_known(name, known)?;
        }

        chain.set(Layer::Environment, self.env.fragment.clone());
        chain.set(Layer::Overrides, overrides);
        chain.set(Layer::Arguments, self.allow_list.extract(args));

        let merged = resolve(&chain)?;
        let profile = normalize(name.as_deref(), merged, &self.defaults)?;

        for validator in self.validators.iter() {
            validator(&profile)?;
        }

        tracing::debug!(
            cloud = profile.name().unwrap_or("<none>"),
            keys = profile.keys().count(),
            "resolved cloud profile"
        );
        Ok(profile)
    }

    /// Resolve a named cloud with no overrides or arguments.
    pub fn get_cloud(&self, name: &str) -> Result<CloudProfile> {
        self.get_one_cloud(Some(name), Fragment::new(), None)
    }

    /// Resolve every cloud in [`cloud_names`](Self::cloud_names).
    pub fn get_all_clouds(&self) -> Result<Vec<CloudProfile>> {
        self.cloud_names()
            .iter()
            .map(|name| self.get_cloud(name))
            .collect()
    }

    /// Names of the clouds the user can select.
    ///
    /// The user document's clouds, or `defaults` when it defines none, plus
    /// the environment cloud when environment configuration exists. Vendor
    /// entries are building blocks and are not listed.
    pub fn cloud_names(&self) -> Vec<String> {
        let documents = self.documents.load();
        let mut names: Vec<String> = if documents.user.is_empty() {
            vec![DEFAULTS_CLOUD_NAME.to_string()]
        } else {
            documents.user.names().map(str::to_string).collect()
        };
        if !self.env.fragment.is_empty() && !names.contains(&self.env.cloud_name) {
            names.push(self.env.cloud_name.clone());
        }
        names
    }

    /// The cloud used when a caller supplies no name, if any.
    pub fn default_cloud(&self) -> Option<String> {
        self.default_cloud_in(&self.documents.load())
    }

    /// Effective global cache settings: built-in defaults overlaid with the
    /// user document's `cache` section.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings are malformed or no cache path is known.
    pub fn cache_settings(&self) -> Result<CacheSettings> {
        let documents = self.documents.load();
        let chain = PrecedenceChain::new().with(Layer::Defaults, self.base_fragment(&documents));
        let profile = normalize(None, resolve(&chain)?, &self.defaults)?;
        Ok(profile.cache())
    }

    /// Re-read file-backed documents and swap them in atomically.
    ///
    /// On failure the previous documents stay in place.
    ///
    /// # Errors
    ///
    /// Returns an error if a document cannot be read or parsed.
    pub fn reload(&self) -> Result<()> {
        let documents = self.loader.load()?;
        self.documents.store(Arc::new(documents));
        tracing::debug!("reloaded cloud documents");
        Ok(())
    }

    fn requested_name(&self, cloud: Option<&str>, documents: &Documents) -> Option<String> {
        match cloud {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ => self.default_cloud_in(documents),
        }
    }

    fn default_cloud_in(&self, documents: &Documents) -> Option<String> {
        self.env
            .default_cloud
            .clone()
            .or_else(|| documents.user.default_cloud().map(str::to_string))
    }

    fn is_env_cloud(&self, name: &str) -> bool {
        !self.env.fragment.is_empty() && name == self.env.cloud_name
    }

    /// Built-in defaults with the document's global cache section applied.
    fn base_fragment(&self, documents: &Documents) -> Fragment {
        let mut base = self.defaults.to_fragment();
        if let Some(cache) = documents.user.cache() {
            for (key, value) in cache.iter() {
                base.insert_nested("cache", key, value.clone());
            }
        }
        base
    }
}

impl std::fmt::Debug for CloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudConfig")
            .field("clouds", &self.cloud_names())
            .field("env_cloud", &self.env.cloud_name)
            .field("validators", &self.validators.len())
            .finish()
    }
}
