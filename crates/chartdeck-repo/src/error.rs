//! Error types for repository and catalog operations

use thiserror::Error;

use crate::config::RepositoryType;

/// Repository operation errors
#[derive(Debug, Error)]
pub enum RepoError {
    // ============ Cache Lifecycle ============
    #[error("Repository cache has not been initialized")]
    NotInitialized,

    // ============ Configuration Errors ============
    #[error("Repository not found: {name}")]
    RepositoryNotFound { name: String },

    #[error("Repository already exists: {name}")]
    RepositoryAlreadyExists { name: String },

    #[error("Invalid repository name '{name}': {reason}")]
    InvalidRepositoryName { name: String, reason: String },

    #[error("Invalid repository URL: {url} - {reason}")]
    InvalidRepositoryUrl { url: String, reason: String },

    #[error("Invalid repository configuration: {message}")]
    InvalidConfig { message: String },

    // ============ Index Errors ============
    #[error("No index source can serve {repo_type} repository {name}")]
    NoIndexSource {
        name: String,
        repo_type: RepositoryType,
    },

    #[error("Index not found at {url}")]
    IndexNotFound { url: String },

    #[error("Index parse error: {message}")]
    IndexParseError { message: String },

    // ============ Chart Errors ============
    #[error("Chart not found: {name} in repository {repo}")]
    ChartNotFound { name: String, repo: String },

    #[error("Version not found: {name}@{version} in repository {repo}")]
    VersionNotFound {
        name: String,
        version: String,
        repo: String,
    },

    #[error("Chart archive not found for {name}@{version} in repository {repo}")]
    ArchiveNotFound {
        name: String,
        version: String,
        repo: String,
    },

    #[error("Integrity check failed for {name}: expected {expected}, got {actual}")]
    IntegrityCheckFailed {
        name: String,
        expected: String,
        actual: String,
    },

    // ============ IO Errors ============
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type for repository operations
pub type Result<T> = std::result::Result<T, RepoError>;

impl From<serde_yaml::Error> for RepoError {
    fn from(e: serde_yaml::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(e: serde_json::Error) -> Self {
        RepoError::Serialization(e.to_string())
    }
}

impl From<chartdeck_core::CoreError> for RepoError {
    fn from(e: chartdeck_core::CoreError) -> Self {
        match e {
            chartdeck_core::CoreError::Io(io) => RepoError::Io(io),
            other => RepoError::Serialization(other.to_string()),
        }
    }
}

impl From<tempfile::PersistError> for RepoError {
    fn from(e: tempfile::PersistError) -> Self {
        RepoError::Io(e.error)
    }
}

impl RepoError {
    /// Check if this error means a repository, chart or version does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            RepoError::RepositoryNotFound { .. }
                | RepoError::ChartNotFound { .. }
                | RepoError::VersionNotFound { .. }
        )
    }
}
