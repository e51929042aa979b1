//! File-based configuration source.

use super::{CloudsDocument, ConfigSource, DocumentKind, Fragment};
use crate::error::{ConfigError, Result};
use config::{File, Source, ValueKind};
use std::path::{Path, PathBuf};

/// File-based configuration source.
///
/// Holds a search list of candidate paths. Loading uses the first candidate
/// that exists; when none exists the source is empty, not an error. Format is
/// detected from the file extension and parsing is done by the `config` crate.
///
/// # Examples
///
/// ```rust,no_run
/// use cloud_profile::sources::{DocumentKind, FileSource};
///
/// let source = FileSource::search(
///     DocumentKind::User,
///     ["./clouds.yaml", "/etc/openstack/clouds.yaml"],
/// );
/// let document = source.load_document().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct FileSource {
    candidates: Vec<PathBuf>,
    kind: DocumentKind,
}

impl FileSource {
    /// Create a source for a single path.
    pub fn new(kind: DocumentKind, path: impl Into<PathBuf>) -> Self {
        Self {
            candidates: vec![path.into()],
            kind,
        }
    }

    /// Create a source over a search list; the first existing path wins.
    pub fn search<I, P>(kind: DocumentKind, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            candidates: paths.into_iter().map(Into::into).collect(),
            kind,
        }
    }

    /// The document kind this source produces.
    pub fn kind(&self) -> DocumentKind {
        self.kind
    }

    /// The first candidate that currently exists.
    pub fn locate(&self) -> Option<&Path> {
        self.candidates
            .iter()
            .map(PathBuf::as_path)
            .find(|path| path.is_file())
    }

    /// Load and interpret the located file as a [`CloudsDocument`].
    pub fn load_document(&self) -> Result<CloudsDocument> {
        let root = self.load()?;
        CloudsDocument::from_fragment(&self.name(), self.kind, root)
    }

    /// Validate that the file extension is supported.
    fn validate_extension(path: &Path) -> Result<()> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| {
                ConfigError::LoadError(format!(
                    "Unable to determine file format for: {}",
                    path.display()
                ))
            })?;

        match extension {
            "yaml" | "yml" | "toml" | "json" => Ok(()),
            _ => Err(ConfigError::LoadError(format!(
                "Unsupported file extension: {}. Supported: .yaml, .yml, .toml, .json",
                extension
            ))),
        }
    }
}

impl ConfigSource for FileSource {
    fn load(&self) -> Result<Fragment> {
        let Some(path) = self.locate() else {
            tracing::debug!(source = %self.name(), "no configuration file found");
            return Ok(Fragment::new());
        };

        Self::validate_extension(path)?;

        // `Config::build` lowercases keys; cloud names must keep their case.
        let table = File::from(path.to_path_buf())
            .required(true)
            .collect()
            .map_err(|e| {
                ConfigError::ParseError(format!("Failed to load {}: {}", path.display(), e))
            })?;

        let value = config::Value::new(None, ValueKind::Table(table))
            .try_deserialize::<serde_json::Value>()
            .map_err(|e| {
                ConfigError::ParseError(format!("Failed to parse {}: {}", path.display(), e))
            })?;

        tracing::debug!(path = %path.display(), "loaded configuration file");
        Fragment::from_value(&format!("file:{}", path.display()), value)
    }

    fn name(&self) -> String {
        match self.locate() {
            Some(path) => format!("file:{}", path.display()),
            None => format!("file:<none of {} candidates>", self.candidates.len()),
        }
    }
}
