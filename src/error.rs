//! Error types shared across the crate.

use thiserror::Error;

/// Errors surfaced by text resolution, storage and configuration.
///
/// Missing translation keys and cache misses are not errors: the first is
/// queued as a pending key, the second falls back to the database.
#[derive(Debug, Error)]
pub enum TextError {
    /// Empty locale, scope or key passed to a call that needs one.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Cache or database backend could not serve the request.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Configuration mapping is malformed or inconsistent.
    #[error("invalid configuration: {0}")]
    ConfigurationInvalid(String),
}

/// Result alias used by the library.
pub type TextResult<T> = Result<T, TextError>;

impl TextError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn storage(msg: impl std::fmt::Display) -> Self {
        Self::StorageUnavailable(msg.to_string())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigurationInvalid(msg.into())
    }
}

impl From<mongodb::error::Error> for TextError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::storage(err)
    }
}
