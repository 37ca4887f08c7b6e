//! Error types for chartdeck-release

use thiserror::Error;

/// Result type for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Failures reported by a packaging engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No release with this name exists in the namespace
    #[error("release '{name}' not found in namespace '{namespace}'")]
    ReleaseNotFound { name: String, namespace: String },

    /// The release exists but has no such revision
    #[error("release '{name}' has no revision {revision}")]
    RevisionNotFound { name: String, revision: u32 },

    /// Any other engine failure, message kept verbatim
    #[error("{0}")]
    Failed(String),
}

impl EngineError {
    /// Check if this error means the release does not exist
    pub fn is_release_not_found(&self) -> bool {
        matches!(self, EngineError::ReleaseNotFound { .. })
    }
}

/// Errors returned by [`crate::ReleaseOperations`]
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReleaseError {
    /// Release not found
    #[error("release '{name}' not found in namespace '{namespace}'")]
    ReleaseNotFound { name: String, namespace: String },

    /// Install failed
    #[error("failed to install release '{name}' in namespace '{namespace}': {message}")]
    InstallFailed {
        name: String,
        namespace: String,
        message: String,
    },

    /// Upgrade failed
    #[error("failed to upgrade release '{name}' in namespace '{namespace}': {message}")]
    UpgradeFailed {
        name: String,
        namespace: String,
        message: String,
    },

    /// Rollback failed
    #[error("failed to roll back release '{name}' to revision {revision}: {message}")]
    RollbackFailed {
        name: String,
        namespace: String,
        revision: u32,
        message: String,
    },

    /// Arguments rejected before reaching the engine
    #[error("invalid {field}: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// Engine error outside the cases above
    #[error("packaging engine error: {0}")]
    Engine(#[from] EngineError),
}

impl ReleaseError {
    /// Engine or validation message, without the operation prefix
    pub fn message(&self) -> String {
        match self {
            Self::InstallFailed { message, .. }
            | Self::UpgradeFailed { message, .. }
            | Self::RollbackFailed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Check if this error means the release does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ReleaseNotFound { .. })
    }
}
