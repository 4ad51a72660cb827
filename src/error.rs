//! Error types for askdocs
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for askdocs operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration loading, authentication, and calls to the document
/// chat backend.
#[derive(Error, Debug)]
pub enum AskdocsError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input (bad email, unsupported file, unknown session)
    #[error("Invalid input: {0}")]
    Input(String),

    /// Backend rejected a request with a non-success status
    ///
    /// The display output is the response body text alone so callers
    /// surface exactly what the backend said. An empty body is replaced
    /// with a generic message at construction time.
    #[error("{message}")]
    Backend {
        /// HTTP status code of the rejected request
        status: u16,
        /// Response body text, or a generic message when the body was empty
        message: String,
    },

    /// No usable credentials: never logged in, or the session expired and
    /// could not be refreshed
    #[error("Authentication required. Please log in with `askdocs login`")]
    SessionExpired,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for askdocs operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
