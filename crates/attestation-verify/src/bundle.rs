//! Verification of a single attestation bundle

use crate::engine::TrustEngine;
use crate::error::CandidateError;
use crate::extension::extensions_from_certificate;
use attestation_types::{Extensions, Payload, Statement};
use serde::Serialize;
use sigstore_verify::types::{Bundle, BundleExt, VerificationMaterialContent};

/// OIDC issuer of GitHub Actions workflow tokens
pub const GITHUB_ACTIONS_ISSUER: &str = "https://token.actions.githubusercontent.com";

/// A bundle that passed cryptographic verification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationResult {
    /// The signed in-toto statement
    pub statement: Statement,
    /// Claims of the workflow that signed it
    pub extensions: Extensions,
}

/// Turns a raw bundle into a [`VerificationResult`]
pub trait VerifyBundle {
    fn verify_bundle(
        &self,
        raw: &serde_json::Value,
    ) -> Result<VerificationResult, CandidateError>;
}

/// Parse bundle JSON as returned by the attestations API
pub fn parse_bundle(raw: &serde_json::Value) -> Result<Bundle, CandidateError> {
    serde_json::from_value(raw.clone())
        .map_err(|e| CandidateError::Format(format!("invalid bundle: {}", e)))
}

/// The in-toto statement carried by the bundle's DSSE envelope
pub fn bundle_statement(bundle: &Bundle) -> Result<Statement, CandidateError> {
    if bundle.is_message_signature() {
        return Err(CandidateError::Format(
            "expected a DSSE envelope, found a message signature".to_string(),
        ));
    }
    let envelope = bundle
        .dsse_envelope()
        .ok_or_else(|| CandidateError::Format("bundle has no DSSE envelope".to_string()))?;
    Ok(Payload::decode(&envelope.payload_type, &envelope.payload)?.into_statement()?)
}

/// DER of the leaf signing certificate
fn signing_certificate(bundle: &Bundle) -> Result<&[u8], CandidateError> {
    let content = bundle
        .verification_material
        .as_ref()
        .and_then(|material| material.content.as_ref());
    match content {
        Some(VerificationMaterialContent::Certificate(cert)) => Ok(cert.raw_bytes.as_slice()),
        Some(VerificationMaterialContent::X509CertificateChain(chain)) => chain
            .certificates
            .first()
            .map(|cert| cert.raw_bytes.as_slice())
            .ok_or_else(|| CandidateError::Format("certificate chain is empty".to_string())),
        Some(VerificationMaterialContent::PublicKey(_)) => Err(CandidateError::Format(
            "bundle is signed with a public key, not a certificate".to_string(),
        )),
        None => Err(CandidateError::Format(
            "bundle has no verification material".to_string(),
        )),
    }
}

/// Bundle verifier delegating cryptography to a [`TrustEngine`]
///
/// Stateless between calls: verifying the same bundle twice gives the same
/// answer.
pub struct BundleVerifier<E> {
    engine: E,
    required_issuer: String,
}

impl<E: TrustEngine> BundleVerifier<E> {
    /// Create a verifier requiring certificates issued to GitHub Actions
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            required_issuer: GITHUB_ACTIONS_ISSUER.to_string(),
        }
    }

    /// Require a different OIDC issuer
    pub fn with_required_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.required_issuer = issuer.into();
        self
    }

    /// Verify one bundle
    pub fn verify(&self, raw: &serde_json::Value) -> Result<VerificationResult, CandidateError> {
        let bundle = parse_bundle(raw)?;
        let statement = bundle_statement(&bundle)?;

        self.engine
            .verify(&bundle, &statement, &self.required_issuer)?;

        let extensions = extensions_from_certificate(signing_certificate(&bundle)?)?;
        if extensions.issuer.as_deref() != Some(self.required_issuer.as_str()) {
            return Err(CandidateError::Verification(format!(
                "certificate issuer {:?} is not {}",
                extensions.issuer.as_deref().unwrap_or_default(),
                self.required_issuer
            )));
        }

        Ok(VerificationResult {
            statement,
            extensions,
        })
    }
}

impl<E: TrustEngine> VerifyBundle for BundleVerifier<E> {
    fn verify_bundle(
        &self,
        raw: &serde_json::Value,
    ) -> Result<VerificationResult, CandidateError> {
        self.verify(raw)
    }
}
