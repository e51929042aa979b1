//! Error types for cloud-profile.

use std::fmt;

/// Result type alias for cloud-profile operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading sources or resolving a cloud.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The requested cloud is not defined by any file-backed source.
    #[error("Cloud '{cloud}' was not found in any configuration source")]
    NotFound {
        /// The cloud name that was requested
        cloud: String,
    },

    /// A source produced a fragment with the wrong shape.
    #[error("Malformed fragment from {source_name}: key '{key}' {reason}")]
    MalformedFragment {
        /// Human-readable name of the offending source
        source_name: String,
        /// The key (or dotted path) with the wrong shape
        key: String,
        /// What was wrong with it
        reason: String,
    },

    /// A required default could not be synthesized.
    #[error("No default available for required setting '{0}'")]
    MissingDefault(&'static str),

    /// Failed to load configuration from a source.
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    /// Failed to parse a configuration file.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Failed to deserialize a resolved profile into a caller type.
    #[error("Failed to deserialize profile: {0}")]
    DeserializationError(String),

    /// Caller-supplied validation rejected the resolved profile.
    #[error("Profile validation failed: {0}")]
    ValidationError(String),
}

impl ConfigError {
    /// Create a malformed-fragment error.
    pub fn malformed(
        source_name: impl Into<String>,
        key: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedFragment {
            source_name: source_name.into(),
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error means the requested cloud does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Validation error returned by caller-supplied profile validators.
#[derive(Debug)]
pub enum ValidationError {
    /// Custom validation error with a message.
    Custom(String),

    /// A specific field has an invalid value.
    InvalidField {
        /// The field name/path
        field: String,
        /// The reason why it's invalid
        reason: String,
    },

    /// Multiple validation errors occurred.
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Create a custom validation error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(msg) => write!(f, "{}", msg),
            Self::InvalidField { field, reason } => {
                write!(f, "Field '{}' is invalid: {}", field, reason)
            }
            Self::Multiple(errors) => {
                writeln!(f, "Multiple validation errors:")?;
                for (i, err) in errors.iter().enumerate() {
                    writeln!(f, "  {}. {}", i + 1, err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        ConfigError::ValidationError(err.to_string())
    }
}
