//! Configuration source trait.

use crate::error::Result;
use crate::sources::Fragment;

/// Trait for configuration sources.
///
/// A source produces a single [`Fragment`]. Where that fragment lands in the
/// precedence chain is decided by the caller, not by the source.
pub trait ConfigSource: Send + Sync {
    /// Load the source as a raw fragment.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be loaded or parsed.
    fn load(&self) -> Result<Fragment>;

    /// Get a human-readable name for this source (for logging/debugging).
    fn name(&self) -> String;
}
