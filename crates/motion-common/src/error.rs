//! Error types and utilities shared across MotionBot crates.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for MotionBot operations
pub type Result<T> = std::result::Result<T, MotionError>;

/// Main error type for MotionBot operations
#[derive(Error, Debug)]
pub enum MotionError {
    /// A JSON document on disk could not be read or parsed
    #[error("Failed to read {}: {message}", path.display())]
    StorageRead {
        /// Document location.
        path: PathBuf,
        /// What went wrong.
        message: String,
        /// Underlying I/O or parse error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A JSON document could not be written back to disk
    #[error("Failed to write {}: {message}", path.display())]
    StorageWrite {
        /// Document location.
        path: PathBuf,
        /// What went wrong.
        message: String,
        /// Underlying I/O or serialization error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors for user input or data
    #[error("Validation error: {message}")]
    Validation {
        /// Why the input was rejected.
        message: String,
        /// Offending field, if known.
        field: Option<String>,
    },

    /// Generic error with custom message
    #[error("{message}")]
    Generic {
        /// Error description.
        message: String,
        /// Underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl MotionError {
    /// Create a new generic error with a custom message and source
    pub fn with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Generic {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a storage read error for the document at `path`
    pub fn storage_read(
        path: impl Into<PathBuf>,
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StorageRead {
            path: path.into(),
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a storage write error for the document at `path`
    pub fn storage_write(
        path: impl Into<PathBuf>,
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::StorageWrite {
            path: path.into(),
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a new validation error with field name
    pub fn validation_field(msg: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
            field: Some(field.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{error::Error, io};

    #[test]
    fn test_error_display_formatting() {
        let error = MotionError::with_source(
            "test error",
            io::Error::new(io::ErrorKind::Other, "cause"),
        );
        assert_eq!(error.to_string(), "test error");
        assert!(error.source().is_some());

        let validation = MotionError::validation_field("bad color", "primary");
        assert_eq!(validation.to_string(), "Validation error: bad color");
    }

    #[test]
    fn test_storage_errors_keep_path_and_source() {
        let read = MotionError::storage_read(
            "data/stickyMessages.json",
            "malformed JSON",
            io::Error::new(io::ErrorKind::InvalidData, "eof"),
        );
        assert!(matches!(read, MotionError::StorageRead { .. }));
        assert!(read.to_string().contains("data/stickyMessages.json"));
        assert!(read.source().is_some());

        let write = MotionError::storage_write(
            "theme.json",
            "rename failed",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(write.to_string().starts_with("Failed to write theme.json"));
    }
}
