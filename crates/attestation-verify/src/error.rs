//! Error types for attestation verification
//!
//! Two levels of failure exist. [`Error`] aborts a whole verification run.
//! [`CandidateError`] rejects a single attestation and is recorded while the
//! remaining candidates are still evaluated.

use std::fmt;
use thiserror::Error;

/// Errors that abort a verification run
#[derive(Error, Debug)]
pub enum Error {
    /// Required policy input is missing
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The artifact could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    UnsupportedAlgorithm(#[from] attestation_types::Error),

    /// Listing attestations failed
    #[error(transparent)]
    Client(#[from] attestation_client::Error),

    /// The trusted root could not be loaded
    #[error("failed to load trusted root: {0}")]
    TrustRoot(String),

    /// Every candidate attestation was rejected
    #[error("no matching attestation found for {artifact}{}", summarize(.rejections))]
    NoMatchingAttestation {
        artifact: String,
        rejections: Vec<Rejection>,
    },
}

/// Result type for verification operations
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed DER in a certificate extension
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtensionError {
    #[error("failed to parse DER value: {0}")]
    Parse(String),

    /// Declared length plus header does not cover the input exactly
    #[error("declared length {declared} does not match input length {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("unexpected tag {0}, expected PrintableString or UTF8String")]
    UnexpectedTag(String),

    #[error("invalid string content: {0}")]
    InvalidString(String),
}

/// Why a single attestation was rejected
#[derive(Error, Debug)]
pub enum CandidateError {
    /// Bundle, envelope, or certificate does not have the expected structure
    #[error("format error: {0}")]
    Format(String),

    /// A Fulcio extension is not a well-formed DER string
    #[error("malformed extension {oid}: {source}")]
    MalformedExtension {
        oid: String,
        #[source]
        source: ExtensionError,
    },

    /// Cryptographic rejection by the trust engine
    #[error("verification failed: {0}")]
    Verification(String),

    /// Digest, owner, or repository did not match
    #[error("policy mismatch: {0}")]
    PolicyMismatch(String),
}

/// Coarse classification of a [`CandidateError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RejectionCategory {
    Format,
    Verification,
    Policy,
}

impl RejectionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectionCategory::Format => "format",
            RejectionCategory::Verification => "verification",
            RejectionCategory::Policy => "policy",
        }
    }
}

impl fmt::Display for RejectionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CandidateError {
    pub fn category(&self) -> RejectionCategory {
        match self {
            CandidateError::Format(_) | CandidateError::MalformedExtension { .. } => {
                RejectionCategory::Format
            }
            CandidateError::Verification(_) => RejectionCategory::Verification,
            CandidateError::PolicyMismatch(_) => RejectionCategory::Policy,
        }
    }
}

impl From<attestation_types::Error> for CandidateError {
    fn from(err: attestation_types::Error) -> Self {
        CandidateError::Format(err.to_string())
    }
}

/// A rejected attestation and its position in the listing
#[derive(Debug)]
pub struct Rejection {
    pub index: usize,
    pub error: CandidateError,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "attestation #{}: {}", self.index, self.error)
    }
}

/// Render per-category counts, e.g. ` (3 rejected: 1 format, 2 policy)`
fn summarize(rejections: &[Rejection]) -> String {
    if rejections.is_empty() {
        return String::new();
    }
    let mut counts = std::collections::BTreeMap::new();
    for rejection in rejections {
        *counts.entry(rejection.error.category()).or_insert(0usize) += 1;
    }
    let parts: Vec<String> = counts
        .iter()
        .map(|(category, count)| format!("{} {}", count, category))
        .collect();
    format!(" ({} rejected: {})", rejections.len(), parts.join(", "))
}
