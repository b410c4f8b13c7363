//! Crate error type.

use std::io;
use thiserror::Error;

/// Result type for calendar and classification operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while fetching, parsing or writing artifacts.
#[derive(Debug, Error)]
pub enum Error {
    /// File system error (cache, feeds, output documents).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed JSON (feeds, cache document, configuration).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport-level HTTP failure, including timeouts.
    #[error("HTTP request failed: {0}")]
    Http(#[from] ureq::Error),

    /// Upstream answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// Fetched standings table failed validation.
    #[error("Invalid classification table: {reason}")]
    InvalidTable { reason: String },

    /// Calendar document could not be parsed.
    #[error("ICS parse error: {message}")]
    Ics { message: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    pub fn invalid_table(reason: impl Into<String>) -> Self {
        Self::InvalidTable { reason: reason.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}
