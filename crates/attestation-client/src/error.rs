//! Error types for the attestations client

use thiserror::Error;

/// Errors that can occur while listing attestations
#[derive(Error, Debug)]
pub enum Error {
    /// The API answered with a non-success status
    #[error("failed to get {url}: {status}")]
    Retrieval { url: String, status: u16 },

    /// Transport-level failure (connection, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A configured value cannot be sent as a request header
    #[error("invalid {name} header: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    /// A next page was announced but could not be followed
    #[error("pagination error: {0}")]
    Pagination(String),

    /// The configured API URL cannot be used as a base URL
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Repository is not in `owner/repo` form
    #[error("invalid repository {0:?}: expected owner/repo")]
    InvalidRepository(String),

    /// Response body is not a valid listing
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for attestations client operations
pub type Result<T> = std::result::Result<T, Error>;
