//! Error types for the sticky message engine.

use motion_common::MotionError;
use std::time::Duration;
use thiserror::Error;

/// Failure of a [`StickyStore`](crate::StickyStore) call.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing document could not be read or parsed.
    #[error("sticky store read failed: {0}")]
    Read(#[source] MotionError),

    /// The backing document could not be written.
    #[error("sticky store write failed: {0}")]
    Write(#[source] MotionError),
}

/// Failure of a call into the messaging platform.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The message does not exist (any more).
    #[error("message not found")]
    NotFound,

    /// The platform refused or failed the request.
    #[error("message delivery failed: {message}")]
    Failure {
        /// What went wrong.
        message: String,
        /// Underlying client error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The call did not finish within the configured bound.
    #[error("messaging call timed out after {0:?}")]
    Timeout(Duration),
}

impl GatewayError {
    /// A delivery failure without an underlying error.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
            source: None,
        }
    }

    /// A delivery failure caused by `source`.
    pub fn failure_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Failure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether the target message was already gone.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Errors reported by the administrative create and delete operations.
#[derive(Debug, Error)]
pub enum StickyError {
    /// Persisting the change failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The new sticky message could not be posted.
    #[error("failed to publish sticky message: {0}")]
    Publish(#[source] GatewayError),

    /// No record in the guild has the given name.
    #[error("no sticky message named '{0}'")]
    NotFound(String),

    /// The name is empty.
    #[error("sticky name cannot be empty")]
    InvalidName,

    /// The content is empty or too long for an embed.
    #[error("invalid sticky content: {0}")]
    InvalidContent(String),
}
