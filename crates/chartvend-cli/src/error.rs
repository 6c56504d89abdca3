//! CLI error types with exit code handling
//!
//! Every failure from the core and repository crates is folded into
//! [`CliError`], which knows the process exit code to report.

use chartvend_core::CoreError;
use chartvend_repo::RepoError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum CliError {
    /// User provided an invalid flag value
    #[error("Invalid input: {message}")]
    #[diagnostic(code(chartvend::cli::input))]
    Input {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// The vendored chart tree is damaged
    #[error("Chart repository is inconsistent: {message}")]
    #[diagnostic(code(chartvend::cli::corruption))]
    Corruption {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// `diff` or `patch` failed
    #[error("External tool failed: {message}")]
    #[diagnostic(
        code(chartvend::cli::tool),
        help("chartvend needs GNU diff and patch on the PATH")
    )]
    Tool { message: String },

    /// IO error (file not found, permissions, etc.)
    #[error("IO error: {message}")]
    #[diagnostic(code(chartvend::cli::io))]
    Io { message: String },

    /// Talking to the chart repository failed
    #[error("Chart repository error: {message}")]
    #[diagnostic(code(chartvend::cli::repository))]
    Repository {
        message: String,
        #[help]
        help: Option<String>,
    },

    /// Internal error (runtime, unexpected failure)
    #[error("Internal error: {message}")]
    #[diagnostic(code(chartvend::cli::internal))]
    Internal { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Input { .. } => exit_codes::INPUT_ERROR,
            CliError::Corruption { .. } => exit_codes::CORRUPTION_ERROR,
            CliError::Tool { .. } => exit_codes::TOOL_ERROR,
            CliError::Io { .. } => exit_codes::IO_ERROR,
            CliError::Repository { .. } => exit_codes::REPOSITORY_ERROR,
            CliError::Internal { .. } => exit_codes::ERROR,
        }
    }

    /// Create an input error (user provided invalid input)
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
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::InvalidVersion { .. } => CliError::input_with_help(
                message,
                "Versions follow semantic versioning, e.g. 1.2.3 or 2.0.0-rc.1",
            ),
            CoreError::InvalidInput { .. } => CliError::input(message),
            CoreError::ProvenanceNotFound { .. } | CoreError::UpstreamSnapshotNotFound { .. } => {
                CliError::Corruption {
                    message,
                    help: Some(
                        "Pull the source version again with --upstream-provenance true".to_string(),
                    ),
                }
            }
            ref e if e.is_corruption() => CliError::Corruption {
                message,
                help: None,
            },
            CoreError::ToolFailed { .. } | CoreError::ToolSpawn { .. } => {
                CliError::Tool { message }
            }
            CoreError::Io { .. } => CliError::Io { message },
            _ => CliError::Internal { message },
        }
    }
}

impl From<RepoError> for CliError {
    fn from(err: RepoError) -> Self {
        let message = err.to_string();
        match err {
            RepoError::InvalidRepositoryUrl { .. } => CliError::input(message),
            RepoError::InvalidConfig { .. } => CliError::Repository {
                message,
                help: Some(
                    "Fix or remove the file given by --repository-config".to_string(),
                ),
            },
            RepoError::ChartNotFound { .. } | RepoError::VersionNotFound { .. } => {
                CliError::Repository {
                    message,
                    help: Some("Check the chart name and version against the repository index".to_string()),
                }
            }
            RepoError::Io(_) => CliError::Io { message },
            RepoError::Serialization(_) => CliError::Internal { message },
            _ => CliError::Repository {
                message,
                help: None,
            },
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;
