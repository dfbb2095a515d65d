//! Shared Error Types
//!
//! This module defines the single error taxonomy every operation of the
//! session and favorites layer resolves to.
//!
//! # Error Categories
//!
//! - `Network` - no response was received from the remote service
//! - `Auth` - invalid credentials or an expired/invalid token
//! - `Validation` - input rejected by the server, with per-field messages
//! - `Server` - unexpected server-side or unrecognized failure
//! - `Precondition` - a call made without the local state it needs
//! - `Storage` - the local persistent store could not be written
//!
//! # Usage
//!
//! ```rust
//! use myflix_sync::shared::error::{ApiError, ErrorKind};
//!
//! let error = ApiError::precondition("movie id must not be empty");
//! assert_eq!(error.kind(), ErrorKind::Precondition);
//! ```
//!
//! # Thread Safety
//!
//! All error types are `Send + Sync` and can be safely shared across thread boundaries.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message shown when a failure carries nothing more specific.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something bad happened; please try again later.";

/// A single field-level message from a rejected request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field (e.g. `Username`)
    pub field: String,
    /// Human-readable error message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Taxonomy tag of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Auth,
    Validation,
    Server,
    Precondition,
    Storage,
}

/// Error returned by every gateway, session and favorites operation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// No connectivity or no response
    #[error("Network error: {message}")]
    Network {
        /// Human-readable error message
        message: String,
    },

    /// Invalid credentials or expired/invalid token
    #[error("Authentication error: {message}")]
    Auth {
        /// Human-readable error message
        message: String,
    },

    /// Malformed input rejected by the server
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable error message
        message: String,
        /// Per-field messages, empty when the server sent none
        field_errors: Vec<FieldError>,
    },

    /// Unexpected server-side failure
    #[error("Server error: {message}")]
    Server {
        /// Human-readable error message
        message: String,
    },

    /// Call made with missing required local state
    #[error("Precondition failed: {message}")]
    Precondition {
        /// Human-readable error message
        message: String,
    },

    /// Local persistent store could not be written
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
}

impl ApiError {
    /// Create a new network error
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(message: impl Into<String>, field_errors: Vec<FieldError>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors,
        }
    }

    /// Create a new server error
    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
        }
    }

    /// Create a new precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition {
            message: message.into(),
        }
    }

    /// Precondition error for calls that need a signed-in user.
    pub fn not_authenticated() -> Self {
        Self::precondition("Not authenticated")
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Server { .. } => ErrorKind::Server,
            Self::Precondition { .. } => ErrorKind::Precondition,
            Self::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Text for a transient user-facing notification.
    ///
    /// Field-level validation messages are joined with `", "`; any other
    /// failure shows its own message, or the generic fallback when it has none.
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Validation { field_errors, .. } if !field_errors.is_empty() => {
                return field_errors
                    .iter()
                    .map(|e| e.message.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
            }
            Self::Network { message }
            | Self::Auth { message }
            | Self::Validation { message, .. }
            | Self::Server { message }
            | Self::Precondition { message } => message.as_str(),
            Self::Storage(_) => "",
        };

        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message.to_string()
        }
    }
}

/// Failure of the client-local key-value store.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    /// Filesystem failure while writing the store
    #[error("I/O error: {message}")]
    Io {
        /// Human-readable error message
        message: String,
    },

    /// Value could not be encoded for storage
    #[error("Serialization error: {message}")]
    Serialization {
        /// Human-readable error message
        message: String,
    },
}

impl StoreError {
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
