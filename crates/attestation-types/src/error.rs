//! Error types for attestation data

use thiserror::Error;

/// Errors that can occur when building or parsing attestation data
#[derive(Error, Debug)]
pub enum Error {
    /// Hash algorithm is not one this crate can compute
    #[error("unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    /// Digest string is not `algorithm:hex` or has the wrong length
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Payload is not a shape this crate understands
    #[error("unsupported payload type: {0}")]
    UnsupportedPayload(String),
}

/// Result type for attestation data operations
pub type Result<T> = std::result::Result<T, Error>;
