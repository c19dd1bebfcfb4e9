//! In-toto attestation types
//!
//! GitHub artifact attestations carry an in-toto statement inside a DSSE
//! envelope. The statement binds a predicate (usually SLSA provenance) to one
//! or more subjects identified by digest.
//!
//! Specification: https://github.com/in-toto/attestation/blob/main/spec/v1/statement.md

use crate::hash::Digest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Statement type for in-toto v1
pub const STATEMENT_TYPE_V1: &str = "https://in-toto.io/Statement/v1";

/// Statement type for in-toto v0.1, still emitted by older signers
pub const STATEMENT_TYPE_V01: &str = "https://in-toto.io/Statement/v0.1";

/// Digests of a subject, keyed by algorithm name (e.g. `sha256`)
pub type DigestSet = BTreeMap<String, String>;

/// In-toto statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    /// Statement type URI
    #[serde(rename = "_type")]
    pub type_: String,
    /// Subjects being attested about, in the order the signer listed them
    pub subject: Vec<Subject>,
    /// Type URI of the predicate (e.g. `https://slsa.dev/provenance/v1`)
    pub predicate_type: String,
    /// Predicate content; its shape depends on `predicate_type`
    #[serde(default)]
    pub predicate: serde_json::Value,
}

/// Subject of an in-toto statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Name of the artifact
    #[serde(default)]
    pub name: String,
    /// Digests of the artifact
    pub digest: DigestSet,
}

impl Statement {
    /// Parse a statement from JSON bytes
    pub fn from_slice(bytes: &[u8]) -> crate::Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Check if any subject carries `digest` under the same algorithm
    pub fn matches_digest(&self, digest: &Digest) -> bool {
        self.subject.iter().any(|subject| subject.matches_digest(digest))
    }
}

impl Subject {
    /// Check if this subject carries `digest` under the same algorithm
    pub fn matches_digest(&self, digest: &Digest) -> bool {
        self.digest
            .get(digest.algorithm().as_str())
            .is_some_and(|value| value.eq_ignore_ascii_case(digest.value()))
    }
}
