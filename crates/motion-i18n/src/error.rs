//! Error types for internationalization operations

use motion_common::MotionError;
use thiserror::Error;

/// Errors that can occur during internationalization operations
#[derive(Error, Debug)]
pub enum I18nError {
    /// Failed to parse a language identifier
    #[error("Invalid language identifier: {0}")]
    InvalidLanguageId(String),

    /// The requested language has no resource
    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Failed to read a resource file
    #[error("Failed to load resource file {path}: {source}")]
    ResourceLoadError {
        /// File that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a Fluent resource
    #[error("Failed to parse Fluent resource {path}: {errors:?}")]
    FluentParseError {
        /// Resource that failed.
        path: String,
        /// Parser diagnostics.
        errors: Vec<String>,
    },

    /// Failed to persist the language choice
    #[error("Failed to save language settings: {0}")]
    Settings(#[from] MotionError),
}

/// Result type for i18n operations
pub type I18nResult<T> = Result<T, I18nError>;
