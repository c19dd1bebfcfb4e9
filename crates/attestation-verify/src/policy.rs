//! Selecting the attestation that vouches for an artifact

use crate::bundle::{VerificationResult, VerifyBundle};
use crate::error::{CandidateError, Error, Rejection, Result};
use attestation_client::Attestation;
use attestation_types::Digest;

/// Identity an attestation must have been produced by
///
/// When a repository is set it is authoritative: the expected owner is its
/// owner part and `owner` is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    /// Host of the GitHub server, e.g. `github.com`
    pub host: String,
    /// Expected repository owner
    pub owner: Option<String>,
    /// Expected repository, `owner/repo`
    pub repository: Option<String>,
}

impl Policy {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            owner: None,
            repository: None,
        }
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    /// The owner part of the repository, or the explicit owner without one
    pub fn expected_owner(&self) -> Option<&str> {
        match &self.repository {
            Some(repository) => repository.split_once('/').map(|(owner, _)| owner),
            None => self.owner.as_deref(),
        }
    }

    /// Check a verified bundle against the artifact digest and expected identity
    pub fn check(
        &self,
        digest: &Digest,
        result: &VerificationResult,
    ) -> std::result::Result<(), CandidateError> {
        if !result.statement.matches_digest(digest) {
            return Err(CandidateError::PolicyMismatch(format!(
                "digest {} not found in the attestation",
                digest
            )));
        }

        if let Some(owner) = self.expected_owner() {
            let expected = format!("https://{}/{}", self.host, owner);
            let actual = result.extensions.source_repository_owner_uri.as_deref();
            if actual != Some(expected.as_str()) {
                return Err(CandidateError::PolicyMismatch(format!(
                    "source repository owner URI {:?} does not match {}",
                    actual.unwrap_or_default(),
                    expected
                )));
            }
        }

        if let Some(repository) = &self.repository {
            let expected = format!("https://{}/{}", self.host, repository);
            let actual = result.extensions.source_repository_uri.as_deref();
            if actual != Some(expected.as_str()) {
                return Err(CandidateError::PolicyMismatch(format!(
                    "source repository URI {:?} does not match {}",
                    actual.unwrap_or_default(),
                    expected
                )));
            }
        }

        Ok(())
    }
}

/// Return the first attestation that verifies and satisfies `policy`
///
/// Candidates are tried in listing order and evaluation stops at the first
/// match. A rejected candidate never aborts the loop; every rejection is
/// returned inside [`Error::NoMatchingAttestation`] when nothing matches.
pub fn select_attestation<V: VerifyBundle + ?Sized>(
    artifact: &str,
    digest: &Digest,
    attestations: &[Attestation],
    policy: &Policy,
    verifier: &V,
) -> Result<VerificationResult> {
    let mut rejections = Vec::new();

    for (index, attestation) in attestations.iter().enumerate() {
        tracing::debug!(index, "evaluating attestation");

        let outcome = verifier
            .verify_bundle(&attestation.bundle)
            .and_then(|result| policy.check(digest, &result).map(|()| result));

        match outcome {
            Ok(result) => {
                tracing::info!(
                    index,
                    repository = result.extensions.source_repository_uri.as_deref().unwrap_or_default(),
                    "found matching attestation for {}",
                    artifact
                );
                return Ok(result);
            }
            Err(error) => {
                tracing::warn!(
                    index,
                    category = %error.category(),
                    "rejected attestation: {}",
                    error
                );
                rejections.push(Rejection { index, error });
            }
        }
    }

    Err(Error::NoMatchingAttestation {
        artifact: artifact.to_string(),
        rejections,
    })
}
