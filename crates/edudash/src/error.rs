//! Error types for edudash.
//!
//! This module defines all error types used throughout the edudash crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed source error for storage failures that can come from I/O or parsing.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The main error type for edudash operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Record Errors ===
    /// No record with the requested id exists.
    #[error("student not found: {id}")]
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// A record failed field validation.
    #[error("validation failed: {}", .problems.join("; "))]
    Validation {
        /// One entry per violated rule.
        problems: Vec<String>,
    },

    /// The request body could not be decoded into a student draft.
    #[error("invalid request body: {message}")]
    InvalidBody {
        /// Description of the decoding failure.
        message: String,
    },

    // === Storage Errors ===
    /// The document exists but could not be read or parsed.
    #[error("failed to read student document at {path}: {source}")]
    StorageRead {
        /// Path to the document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: BoxError,
    },

    /// The document could not be persisted.
    #[error("failed to write student document at {path}: {source}")]
    StorageWrite {
        /// Path to the document.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: BoxError,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

}

/// A specialized Result type for edudash operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a not-found error for the given id.
    #[must_use]
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Create a storage read error.
    #[must_use]
    pub fn storage_read(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::StorageRead {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create a storage write error.
    #[must_use]
    pub fn storage_write(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        Self::StorageWrite {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Create an invalid body error.
    #[must_use]
    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::InvalidBody {
            message: message.into(),
        }
    }

    /// Check if this error means the requested record does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this error was caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidBody { .. })
    }

    /// Check if this error came from the storage layer.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::StorageRead { .. } | Self::StorageWrite { .. })
    }
}
