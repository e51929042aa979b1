//! Loads the user and vendor documents from their sources.

use crate::error::{ConfigError, Result};
use crate::sources::{CloudsDocument, FileSource};

/// Where one document comes from.
#[derive(Debug, Clone)]
pub(crate) enum DocumentSource {
    /// Re-read from disk on every load.
    File(FileSource),
    /// Supplied programmatically; never changes.
    Fixed(CloudsDocument),
}

impl DocumentSource {
    fn load(&self) -> Result<CloudsDocument> {
        match self {
            DocumentSource::File(source) => source.load_document(),
            DocumentSource::Fixed(document) => Ok(document.clone()),
        }
    }
}

/// The parsed documents a resolution works from.
#[derive(Debug, Clone, Default)]
pub(crate) struct Documents {
    pub(crate) user: CloudsDocument,
    pub(crate) vendor: CloudsDocument,
}

/// Loads both documents as one snapshot.
#[derive(Debug, Clone)]
pub(crate) struct DocumentLoader {
    user: DocumentSource,
    vendor: DocumentSource,
}

impl DocumentLoader {
    pub(crate) fn new(user: DocumentSource, vendor: DocumentSource) -> Self {
        Self { user, vendor }
    }

    /// Load both documents.
    ///
    /// # Errors
    ///
    /// Returns an error if either document exists but cannot be parsed.
    pub(crate) fn load(&self) -> Result<Documents> {
        let user = self
            .user
            .load()
            .map_err(|e| source_error("user", e))?;
        let vendor = self
            .vendor
            .load()
            .map_err(|e| source_error("vendor", e))?;

        tracing::debug!(
            user_clouds = user.names().count(),
            vendor_clouds = vendor.names().count(),
            "loaded cloud documents"
        );
        Ok(Documents { user, vendor })
    }
}

/// Prefix load failures with the document they came from; typed shape
/// errors pass through unchanged.
fn source_error(document: &str, err: ConfigError) -> ConfigError {
    match err {
        ConfigError::LoadError(msg) => {
            ConfigError::LoadError(format!("{} config: {}", document, msg))
        }
        ConfigError::ParseError(msg) => {
            ConfigError::ParseError(format!("{} config: {}", document, msg))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::{DocumentKind, Fragment};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_fixed_documents() {
        let loader = DocumentLoader::new(
            DocumentSource::Fixed(CloudsDocument::new().with_cloud("a", Fragment::new())),
            DocumentSource::Fixed(CloudsDocument::new()),
        );
        let docs = loader.load().unwrap();
        assert!(docs.user.contains("a"));
        assert!(docs.vendor.is_empty());
    }

    #[test]
    fn test_file_documents_are_reread() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("clouds.yaml");
        fs::write(&path, "clouds:\n  first: {}\n").unwrap();

        let loader = DocumentLoader::new(
            DocumentSource::File(FileSource::new(DocumentKind::User, &path)),
            DocumentSource::Fixed(CloudsDocument::new()),
        );
        assert!(loader.load().unwrap().user.contains("first"));

        fs::write(&path, "clouds:\n  second: {}\n").unwrap();
        let docs = loader.load().unwrap();
        assert!(docs.user.contains("second"));
        assert!(!docs.user.contains("first"));
    }

    #[test]
    fn test_parse_errors_name_the_document() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("vendor.yaml");
        fs::write(&path, "public-clouds: [broken\n").unwrap();

        let loader = DocumentLoader::new(
            DocumentSource::Fixed(CloudsDocument::new()),
            DocumentSource::File(FileSource::new(DocumentKind::Vendor, &path)),
        );
        match loader.load().unwrap_err() {
            ConfigError::ParseError(msg) => assert!(msg.starts_with("vendor config:")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
