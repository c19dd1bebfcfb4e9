//! Verifying a local artifact end to end

use crate::bundle::{BundleVerifier, VerificationResult, VerifyBundle};
use crate::digest::compute_digest;
use crate::engine::{SigstoreEngine, TrustRootSource};
use crate::error::{Error, Result};
use crate::policy::{select_attestation, Policy};
use attestation_client::{Attestation, AttestationClient, ClientConfig};
use attestation_types::{Digest, HashAlgorithm};
use std::path::Path;

/// Environment variable consulted for an API token
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Options for [`verify`]
///
/// At least one of `owner` or `repository` must be set. When both are,
/// `repository` decides which attestations are listed and accepted and
/// `owner` is ignored.
#[derive(Debug, Clone, Default)]
pub struct VerifyOptions {
    /// Digest algorithm used to look up attestations
    pub algorithm: HashAlgorithm,
    /// API token; overrides `client.token` when set
    pub github_token: Option<String>,
    /// Expected repository owner
    pub owner: Option<String>,
    /// Expected repository, `owner/repo`
    pub repository: Option<String>,
    pub client: ClientConfig,
    pub trust_root: TrustRootSource,
}

impl VerifyOptions {
    /// Default options with the token taken from `GITHUB_TOKEN`
    pub fn from_env() -> Self {
        Self {
            github_token: std::env::var(GITHUB_TOKEN_ENV)
                .ok()
                .filter(|token| !token.is_empty()),
            ..Default::default()
        }
    }

    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn with_repository(mut self, repository: impl Into<String>) -> Self {
        self.repository = Some(repository.into());
        self
    }

    pub fn with_client(mut self, client: ClientConfig) -> Self {
        self.client = client;
        self
    }

    pub fn with_trust_root(mut self, trust_root: TrustRootSource) -> Self {
        self.trust_root = trust_root;
        self
    }

    fn client_config(&self) -> ClientConfig {
        let mut config = self.client.clone();
        if let Some(token) = &self.github_token {
            config.token = Some(token.clone());
        }
        config
    }

    fn policy(&self) -> Result<Policy> {
        let host = self.client.server_host().ok_or_else(|| {
            Error::Configuration(format!("invalid API URL: {}", self.client.api_url))
        })?;
        let policy = Policy::new(host);
        match (&self.repository, &self.owner) {
            (Some(repository), _) => Ok(policy.with_repository(repository.clone())),
            (None, Some(owner)) => Ok(policy.with_owner(owner.clone())),
            (None, None) => Err(Error::Configuration(
                "either owner or repository must be set".to_string(),
            )),
        }
    }
}

/// Everything needed to pick an attestation, gathered before any bundle is checked
struct Candidates {
    artifact: String,
    digest: Digest,
    policy: Policy,
    attestations: Vec<Attestation>,
}

impl Candidates {
    /// Check the options, hash the file, and list its attestations, in that order
    async fn retrieve(path: &Path, options: &VerifyOptions) -> Result<Self> {
        let policy = options.policy()?;

        let digest = compute_digest(path, options.algorithm).await?;
        tracing::debug!(%digest, "computed digest of {}", path.display());

        let client = AttestationClient::new(options.client_config())?;
        let attestations = match (&policy.repository, &policy.owner) {
            (Some(repository), _) => client.get_by_repository(repository, &digest).await?,
            (None, Some(owner)) => client.get_by_owner(owner, &digest).await?,
            (None, None) => {
                return Err(Error::Configuration(
                    "either owner or repository must be set".to_string(),
                ))
            }
        };
        tracing::debug!(count = attestations.len(), "retrieved attestations");

        Ok(Self {
            artifact: path.display().to_string(),
            digest,
            policy,
            attestations,
        })
    }

    fn select<V: VerifyBundle + ?Sized>(&self, verifier: &V) -> Result<VerificationResult> {
        select_attestation(
            &self.artifact,
            &self.digest,
            &self.attestations,
            &self.policy,
            verifier,
        )
    }
}

/// Verify `path` against the attestations GitHub holds for it
///
/// Returns the first attestation that is validly signed by a GitHub Actions
/// workflow of the expected owner or repository and names the file's digest.
///
/// The trusted root is only loaded once there is at least one attestation
/// to check.
pub async fn verify(path: impl AsRef<Path>, options: &VerifyOptions) -> Result<VerificationResult> {
    let candidates = Candidates::retrieve(path.as_ref(), options).await?;
    if candidates.attestations.is_empty() {
        return Err(Error::NoMatchingAttestation {
            artifact: candidates.artifact,
            rejections: Vec::new(),
        });
    }

    let verifier = BundleVerifier::new(SigstoreEngine::load(&options.trust_root).await?);
    candidates.select(&verifier)
}

/// [`verify`] with a caller-supplied bundle verifier
pub async fn verify_with<V: VerifyBundle + ?Sized>(
    path: impl AsRef<Path>,
    options: &VerifyOptions,
    verifier: &V,
) -> Result<VerificationResult> {
    Candidates::retrieve(path.as_ref(), options)
        .await?
        .select(verifier)
}
