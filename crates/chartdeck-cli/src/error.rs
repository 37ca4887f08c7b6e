//! CLI error types with exit code handling
//!
//! Library errors are mapped onto a small set of diagnostics, each carrying
//! the exit code the process ends with.

use chartdeck_repo::RepoError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// User provided invalid input
    #[error("{message}")]
    #[diagnostic(code(chartdeck::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Repository, chart or version does not exist
    #[error("{message}")]
    #[diagnostic(code(chartdeck::cli::not_found))]
    NotFound {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Repository config, index or archive problem
    #[error(transparent)]
    #[diagnostic(code(chartdeck::cli::repo))]
    Repo(RepoError),

    /// Preferences store problem
    #[error("preferences error: {0}")]
    #[diagnostic(code(chartdeck::cli::preferences))]
    Preferences(#[from] chartdeck_core::CoreError),

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {0}")]
    #[diagnostic(code(chartdeck::cli::io))]
    Io(#[from] std::io::Error),

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(chartdeck::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Input { .. } => exit_codes::USAGE_ERROR,
            CliError::NotFound { .. } => exit_codes::NOT_FOUND,
            CliError::Repo(RepoError::Io(_)) | CliError::Io(_) => exit_codes::IO_ERROR,
            CliError::Repo(_) | CliError::Preferences(_) => exit_codes::DATA_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an input error
    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: None,
        }
    }

    /// Create an input error with help text
    pub fn input_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl From<RepoError> for CliError {
    fn from(err: RepoError) -> Self {
        let help = match &err {
            RepoError::RepositoryNotFound { .. } => {
                Some("List configured repositories with 'chartdeck repo list'".to_string())
            }
            RepoError::ChartNotFound { repo, .. } => {
                Some(format!("Search the repository with 'chartdeck search --repo {}'", repo))
            }
            RepoError::VersionNotFound { .. } => {
                Some("Show available versions with 'chartdeck show chart'".to_string())
            }
            _ => None,
        };

        if err.is_not_found() {
            CliError::NotFound {
                message: err.to_string(),
                help,
            }
        } else {
            CliError::Repo(err)
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::internal(err.to_string())
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
