//! Core error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    // ============ Invalid input ============
    #[error("Invalid chart version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    // ============ Repository corruption ============
    #[error("Directory {path} is not a valid chart version: {source}")]
    MalformedVersionDir {
        path: PathBuf,
        #[source]
        source: semver::Error,
    },

    #[error("Chart directory {path} not found")]
    ChartDirNotFound { path: PathBuf },

    #[error("Provenance file {path} not found")]
    ProvenanceNotFound { path: PathBuf },

    #[error("Unable to parse provenance file {path}: {message}")]
    InvalidProvenance { path: PathBuf, message: String },

    #[error("Upstream chart directory {path} not found")]
    UpstreamSnapshotNotFound { path: PathBuf },

    #[error("Patch file {path} not found")]
    PatchFileNotFound { path: PathBuf },

    // ============ External tools ============
    #[error("Error running command `{command}` ({status}): {stderr}")]
    ToolFailed {
        command: String,
        status: String,
        /// stderr, or stdout when the tool wrote nothing to stderr
        stderr: String,
    },

    #[error("Unable to run command `{command}`: {source}")]
    ToolSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    // ============ IO ============
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize provenance: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

impl CoreError {
    /// Wrap an IO error with the path it happened on
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error indicates a damaged chart repository rather than bad input
    /// or a failing tool
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            CoreError::MalformedVersionDir { .. }
                | CoreError::ChartDirNotFound { .. }
                | CoreError::ProvenanceNotFound { .. }
                | CoreError::InvalidProvenance { .. }
                | CoreError::UpstreamSnapshotNotFound { .. }
                | CoreError::PatchFileNotFound { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Parse a chart version, reporting invalid input
pub fn parse_version(version: &str) -> Result<semver::Version> {
    semver::Version::parse(version).map_err(|source| CoreError::InvalidVersion {
        version: version.to_string(),
        source,
    })
}
