//! Error types for the sesame libraries.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, unexpected API responses, and storage
//! failures.

use std::fmt;
use thiserror::Error;

/// The unified error type for sesame operations.
///
/// This error type covers all possible failure modes in the libraries,
/// with explicit variants to allow callers to handle specific cases.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, HTTP plumbing).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors (rejected credentials, expired tokens).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Unexpected API responses (non-2xx statuses outside the auth rules).
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// Credential storage errors (I/O, serialization).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// Input validation errors (invalid base URL).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP transport error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The server rejected the supplied credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The access or refresh token is expired or no longer accepted.
    #[error("token expired")]
    TokenExpired,

    /// An operation requiring a session was attempted without one.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The extended profile could not be fetched.
    ///
    /// Non-fatal: the session stays authenticated with the basic user's
    /// permissions in effect.
    #[error("profile fetch failed: {0}")]
    ProfileFetchFailed(String),
}

/// An unexpected response from the identity API.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Machine-readable error code (if present).
    pub code: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref code) = self.code {
            write!(f, " [{}]", code)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, code: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            code,
            message,
        }
    }

    /// Check if this response rejected the caller's authentication.
    pub fn is_auth_rejection(&self) -> bool {
        self.status == 400 || self.status == 401 || self.status == 403
    }
}

/// Credential storage errors.
///
/// A storage failure while writing is fatal for the current session:
/// the caller clears all persisted keys rather than leave a partially
/// written state behind.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem or I/O failure.
    #[error("I/O failure: {message}")]
    Io { message: String },

    /// The persisted document could not be serialized or parsed.
    #[error("serialization failure: {message}")]
    Serialize { message: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialize {
            message: err.to_string(),
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },
}
