// src/error.rs

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Core error types for aptpool
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors, always tied to the file or directory being touched
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The outer ar container could not be read
    #[error("Malformed package archive {}: {reason}", path.display())]
    MalformedArchive { path: PathBuf, reason: String },

    /// No `control.tar*` member in the ar container
    #[error("No control archive found in {}", path.display())]
    ControlArchiveNotFound { path: PathBuf },

    /// The control archive uses a compression we do not decode
    #[error("Unsupported compression for member {member} in {}", path.display())]
    UnsupportedCompression { path: PathBuf, member: String },

    /// Gzip or tar decoding of the control archive failed
    #[error("Failed to read control archive {member} in {}: {source}", path.display())]
    ControlArchive {
        path: PathBuf,
        member: String,
        #[source]
        source: std::io::Error,
    },

    /// The control archive has no `control` entry
    #[error("No control file found in {}", path.display())]
    ControlFileNotFound { path: PathBuf },

    /// A mandatory control field is absent or empty
    #[error("Missing {field} field in control file of {}", path.display())]
    MissingField { path: PathBuf, field: &'static str },

    /// Version string that cannot be decomposed
    #[error("Invalid version: {0:?}")]
    InvalidVersion(String),

    /// A package in a bulk scan failed; the whole operation is aborted
    #[error("Failed to process package {}: {source}", path.display())]
    Package {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    /// Repository configuration could not be loaded or is inconsistent
    #[error("Invalid configuration {}: {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    /// Component not listed in the repository configuration
    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    /// The signing collaborator failed
    #[error("Signing failed: {0}")]
    Signing(String),
}

impl Error {
    /// Wrap an I/O error with the path it happened on
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Attach the archive path to an error raised while scanning the pool
    pub fn package(path: impl AsRef<Path>, source: Error) -> Self {
        Self::Package {
            path: path.as_ref().to_path_buf(),
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through bulk-scan wrappers
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Package { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

/// Result type alias using aptpool's Error type
pub type Result<T> = std::result::Result<T, Error>;
