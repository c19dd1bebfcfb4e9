//! Delegated cryptographic verification
//!
//! Signature, certificate chain, and transparency log checks belong to the
//! Sigstore verifier. [`TrustEngine`] is the seam between it and the rest of
//! this crate.

use crate::error::{CandidateError, Error, Result};
use attestation_types::Statement;
use sigstore_trust_root::{TrustedRoot, SIGSTORE_PRODUCTION_TRUSTED_ROOT};
use sigstore_verify::types::{Bundle, Sha256Hash};
use sigstore_verify::VerificationPolicy;
use std::path::PathBuf;

/// Cryptographic verification of a single bundle
pub trait TrustEngine {
    /// Accept or reject `bundle`, requiring its certificate to be issued for
    /// `required_issuer`
    ///
    /// `statement` is the in-toto statement decoded from the bundle's envelope.
    fn verify(
        &self,
        bundle: &Bundle,
        statement: &Statement,
        required_issuer: &str,
    ) -> std::result::Result<(), CandidateError>;
}

impl<T: TrustEngine + ?Sized> TrustEngine for &T {
    fn verify(
        &self,
        bundle: &Bundle,
        statement: &Statement,
        required_issuer: &str,
    ) -> std::result::Result<(), CandidateError> {
        (**self).verify(bundle, statement, required_issuer)
    }
}

/// Where the Sigstore trusted root comes from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TrustRootSource {
    /// Fetch the public-good trusted root through TUF
    #[default]
    Tuf,
    /// Use the copy embedded in `sigstore-trust-root`; works offline but may be stale
    Embedded,
    /// Load a trusted root JSON file
    File(PathBuf),
}

impl TrustRootSource {
    /// Load the trusted root
    pub async fn load(&self) -> Result<TrustedRoot> {
        match self {
            TrustRootSource::Tuf => TrustedRoot::from_tuf()
                .await
                .map_err(|e| Error::TrustRoot(e.to_string())),
            TrustRootSource::Embedded => parse_trusted_root(SIGSTORE_PRODUCTION_TRUSTED_ROOT),
            TrustRootSource::File(path) => {
                let json = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|e| Error::TrustRoot(format!("{}: {}", path.display(), e)))?;
                parse_trusted_root(&json)
            }
        }
    }
}

fn parse_trusted_root(json: &str) -> Result<TrustedRoot> {
    serde_json::from_str(json).map_err(|e| Error::TrustRoot(e.to_string()))
}

/// [`TrustEngine`] backed by `sigstore-verify`
///
/// The verifier binds a DSSE bundle to a sha256 digest, so only statements
/// with a sha256 subject can be accepted. A statement listing only sha384 or
/// sha512 subjects is rejected as a format error whatever algorithm the
/// artifact was looked up with.
pub struct SigstoreEngine {
    trusted_root: TrustedRoot,
}

impl SigstoreEngine {
    pub fn new(trusted_root: TrustedRoot) -> Self {
        Self { trusted_root }
    }

    /// Load the trusted root from `source` and build an engine around it
    pub async fn load(source: &TrustRootSource) -> Result<Self> {
        tracing::debug!(?source, "loading trusted root");
        Ok(Self::new(source.load().await?))
    }
}

impl TrustEngine for SigstoreEngine {
    fn verify(
        &self,
        bundle: &Bundle,
        statement: &Statement,
        required_issuer: &str,
    ) -> std::result::Result<(), CandidateError> {
        // The envelope signs the statement, not the artifact. Binding the
        // statement to the artifact is the policy's digest check.
        let subject = statement_sha256(statement)?;

        let policy = VerificationPolicy::default().require_issuer(required_issuer.to_string());
        let result = sigstore_verify::verify(subject, bundle, &policy, &self.trusted_root)
            .map_err(|e| CandidateError::Verification(e.to_string()))?;
        if !result.success {
            return Err(CandidateError::Verification(
                "bundle was not accepted by the verifier".to_string(),
            ));
        }
        Ok(())
    }
}

/// First sha256 subject digest of the statement
fn statement_sha256(statement: &Statement) -> std::result::Result<Sha256Hash, CandidateError> {
    let hex = statement
        .subject
        .iter()
        .find_map(|subject| subject.digest.get("sha256"))
        .ok_or_else(|| CandidateError::Format("statement has no sha256 subject".to_string()))?;
    Sha256Hash::from_hex(hex)
        .map_err(|e| CandidateError::Format(format!("invalid subject digest: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{bundle_statement, parse_bundle, GITHUB_ACTIONS_ISSUER};
    use crate::test_support::{bundle_json, github_certificate, statement};
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    const SHA256: &str = "7452a6cd31d8a5588919c8806f425e37ad95752a4c148f2247e91d4451a91021";

    fn parsed(raw: &serde_json::Value) -> (Bundle, Statement) {
        let bundle = parse_bundle(raw).unwrap();
        let statement = bundle_statement(&bundle).unwrap();
        (bundle, statement)
    }

    /// Flip one bit of the first DSSE signature
    fn tamper_signature(raw: &mut serde_json::Value) {
        let sig = raw["dsseEnvelope"]["signatures"][0]["sig"].as_str().unwrap();
        let mut bytes = STANDARD.decode(sig).unwrap();
        bytes[0] ^= 0x01;
        raw["dsseEnvelope"]["signatures"][0]["sig"] = STANDARD.encode(bytes).into();
    }

    #[tokio::test]
    async fn test_embedded_trust_root() {
        assert!(TrustRootSource::Embedded.load().await.is_ok());
    }

    #[tokio::test]
    async fn test_trust_root_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("trusted_root.json");
        std::fs::write(&path, SIGSTORE_PRODUCTION_TRUSTED_ROOT).unwrap();
        assert!(TrustRootSource::File(path).load().await.is_ok());

        let missing = TrustRootSource::File(dir.path().join("missing.json"));
        assert!(matches!(missing.load().await, Err(Error::TrustRoot(_))));

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "not json").unwrap();
        assert!(matches!(
            TrustRootSource::File(garbage).load().await,
            Err(Error::TrustRoot(_))
        ));
    }

    #[test]
    fn test_statement_sha256() {
        let raw = bundle_json(&github_certificate("github.com", "octo/hello"), &statement(SHA256));
        let (_, st) = parsed(&raw);
        assert!(statement_sha256(&st).is_ok());

        let raw = bundle_json(&github_certificate("github.com", "octo/hello"), &statement("zz"));
        let (_, st) = parsed(&raw);
        assert!(matches!(
            statement_sha256(&st),
            Err(CandidateError::Format(_))
        ));
    }

    #[test]
    fn test_statement_without_sha256_subject() {
        let mut st = statement("00");
        st["subject"][0]["digest"] = serde_json::json!({ "sha512": "00" });
        let raw = bundle_json(&github_certificate("github.com", "octo/hello"), &st);
        let (_, st) = parsed(&raw);
        let err = statement_sha256(&st).unwrap_err();
        assert!(matches!(err, CandidateError::Format(_)), "{err}");
        assert!(err.to_string().contains("sha256"));
    }

    #[tokio::test]
    async fn test_unsigned_bundle_is_rejected_by_the_verifier() {
        let engine = SigstoreEngine::load(&TrustRootSource::Embedded).await.unwrap();
        let raw = bundle_json(&github_certificate("github.com", "octo/hello"), &statement(SHA256));
        let (bundle, st) = parsed(&raw);

        let err = engine
            .verify(&bundle, &st, GITHUB_ACTIONS_ISSUER)
            .unwrap_err();
        assert!(matches!(err, CandidateError::Verification(_)), "{err}");
    }

    #[tokio::test]
    async fn test_tampered_signature_is_rejected_by_the_verifier() {
        let engine = SigstoreEngine::load(&TrustRootSource::Embedded).await.unwrap();
        let mut raw =
            bundle_json(&github_certificate("github.com", "octo/hello"), &statement(SHA256));
        tamper_signature(&mut raw);
        let (bundle, st) = parsed(&raw);

        let err = engine
            .verify(&bundle, &st, GITHUB_ACTIONS_ISSUER)
            .unwrap_err();
        assert!(matches!(err, CandidateError::Verification(_)), "{err}");
    }

    /// A bundle published by GitHub for a real artifact
    ///
    /// `ATTESTATION_BUNDLE` names the bundle JSON file, `ATTESTATION_OWNER`
    /// the owner that produced it.
    #[tokio::test]
    #[ignore = "needs a published attestation bundle and network access for TUF"]
    async fn test_published_bundle() {
        use crate::bundle::BundleVerifier;
        use crate::policy::Policy;
        use attestation_types::Digest;

        let path = std::env::var("ATTESTATION_BUNDLE").unwrap();
        let owner = std::env::var("ATTESTATION_OWNER").unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();

        let engine = SigstoreEngine::load(&TrustRootSource::Tuf).await.unwrap();
        let (bundle, st) = parsed(&raw);
        engine.verify(&bundle, &st, GITHUB_ACTIONS_ISSUER).unwrap();

        let result = BundleVerifier::new(&engine).verify(&raw).unwrap();
        let digest: Digest = format!("sha256:{}", st.subject[0].digest["sha256"])
            .parse()
            .unwrap();
        let policy = Policy::new("github.com").with_owner(owner);
        policy.check(&digest, &result).unwrap();
        assert!(matches!(
            Policy::new("github.com")
                .with_owner("not-the-owner")
                .check(&digest, &result),
            Err(CandidateError::PolicyMismatch(_))
        ));

        let mut tampered = raw.clone();
        tamper_signature(&mut tampered);
        let (bundle, st) = parsed(&tampered);
        assert!(matches!(
            engine.verify(&bundle, &st, GITHUB_ACTIONS_ISSUER),
            Err(CandidateError::Verification(_))
        ));
    }
}
