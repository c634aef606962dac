//! Error types for the motionbake library.

use thiserror::Error;

/// Main error type for recording and baking operations.
#[derive(Error, Debug)]
pub enum Error {
    /// A curve binding could not be resolved to a node during finalization.
    #[error("Curve target not found: '{path}' ({target})")]
    TargetNotFound { path: String, target: String },

    /// A pre-sample observer failed, aborting the current tick.
    #[error("Pre-sample observer failed: {0}")]
    Observer(String),

    /// The artifact sink failed to persist the finalized hierarchy.
    #[error("Persist failed: {0}")]
    Persist(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an "other" error from a string.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Create an observer error from a string.
    pub fn observer(msg: impl Into<String>) -> Self {
        Self::Observer(msg.into())
    }
}

/// Result type alias for motionbake operations.
pub type Result<T> = std::result::Result<T, Error>;
