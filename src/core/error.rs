//! Error types for the device discovery layer
//!
//! Operational failures (a backend that cannot enumerate, a scan that runs
//! past its budget) are represented here but are usually absorbed by the
//! aggregation layer and surfaced through the diagnostics channel instead
//! of being propagated to callers.

use thiserror::Error;

/// Main error type for device discovery and selection
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// A bounded enumeration exceeded its time budget.
    ///
    /// The polling engine treats this as "no change", never as a failure.
    #[error("device enumeration timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A backend failed to enumerate its devices
    #[error("backend '{backend}' failed: {message}")]
    Backend { backend: String, message: String },

    /// The external tool a backend depends on is missing or unusable
    #[error("required tool unavailable: {0}")]
    ToolUnavailable(String),

    /// General I/O error
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, DiscoveryError>;

impl DiscoveryError {
    /// Whether this error is a timeout (skipped tick, not a real failure)
    pub fn is_timeout(&self) -> bool {
        matches!(self, DiscoveryError::Timeout(_))
    }
}

impl From<std::io::Error> for DiscoveryError {
    fn from(err: std::io::Error) -> Self {
        DiscoveryError::Io(err.to_string())
    }
}
