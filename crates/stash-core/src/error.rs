//! Unified error type for the store, facade and configuration layers.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for Stash.
///
/// Store errors are split into [`StashError::Connection`] (the store could
/// not be reached) and [`StashError::Store`] (the store answered with an
/// error) so callers can tell a lost connection from a rejected command.
#[derive(Error, Debug)]
pub enum StashError {
    // ============ Store Errors ============
    /// The store rejected or failed the command
    #[error("Store error: {0}")]
    Store(String),

    /// The store could not be reached (pool exhausted, I/O, timeout)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Operation against a key holding the wrong kind of value
    #[error("Wrong type for key '{0}'")]
    WrongType(String),

    /// The store is disabled by configuration
    #[error("Store is disabled")]
    Disabled,

    // ============ Caller Errors ============
    /// Invalid argument supplied by the caller
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ============ Infrastructure Errors ============
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StashError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Store(_) => "STORE_ERROR",
            Self::Connection(_) => "CONNECTION_ERROR",
            Self::WrongType(_) => "WRONG_TYPE",
            Self::Disabled => "STORE_DISABLED",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a store error.
    #[must_use]
    pub fn store<T: Into<String>>(message: T) -> Self {
        Self::Store(message.into())
    }

    /// Creates a connection error.
    #[must_use]
    pub fn connection<T: Into<String>>(message: T) -> Self {
        Self::Connection(message.into())
    }

    /// Creates an invalid argument error.
    #[must_use]
    pub fn invalid_argument<T: Into<String>>(message: T) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Checks if this error is transient, i.e. the same call may succeed later.
    ///
    /// Nothing in this workspace retries; the classification is for callers.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

/// Serializable error description, printed by `stash --json` on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Whether retrying may help
    pub transient: bool,
}

impl From<&StashError> for ErrorReport {
    fn from(error: &StashError) -> Self {
        Self {
            code: error.error_code().to_string(),
            message: error.to_string(),
            transient: error.is_transient(),
        }
    }
}
