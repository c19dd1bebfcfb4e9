//! Fulcio certificate extensions
//!
//! Certificates issued to GitHub Actions workflows carry the claims of the
//! workflow's OIDC token as X.509 extensions under the Sigstore private
//! enterprise arc `1.3.6.1.4.1.57264.1`. Each claim is a DER-encoded string.
//!
//! | OID suffix | Field |
//! |-----------|-------|
//! | `.1.8`  | Issuer |
//! | `.1.9`  | Build Signer URI |
//! | `.1.10` | Build Signer Digest |
//! | `.1.11` | Runner Environment |
//! | `.1.12` | Source Repository URI |
//! | `.1.13` | Source Repository Digest |
//! | `.1.14` | Source Repository Ref |
//! | `.1.15` | Source Repository Identifier |
//! | `.1.16` | Source Repository Owner URI |
//! | `.1.17` | Source Repository Owner Identifier |
//! | `.1.18` | Build Config URI |
//! | `.1.19` | Build Config Digest |
//! | `.1.20` | Build Trigger |
//! | `.1.21` | Run Invocation URI |
//! | `.1.22` | Source Repository Visibility At Signing |
//!
//! See <https://github.com/sigstore/fulcio/blob/main/docs/oid-info.md>.

use serde::{Deserialize, Serialize};

/// Deprecated issuer extension (`1.3.6.1.4.1.57264.1.1`)
///
/// Unlike the other extensions its value is the raw issuer URL, not a DER string.
pub const LEGACY_ISSUER_OID: &str = "1.3.6.1.4.1.57264.1.1";

/// A field of [`Extensions`], each bound to one fixed OID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtensionField {
    Issuer,
    BuildSignerUri,
    BuildSignerDigest,
    RunnerEnvironment,
    SourceRepositoryUri,
    SourceRepositoryDigest,
    SourceRepositoryRef,
    SourceRepositoryIdentifier,
    SourceRepositoryOwnerUri,
    SourceRepositoryOwnerIdentifier,
    BuildConfigUri,
    BuildConfigDigest,
    BuildTrigger,
    RunInvocationUri,
    SourceRepositoryVisibilityAtSigning,
}

impl ExtensionField {
    /// Every field, in OID order
    pub const ALL: [ExtensionField; 15] = [
        ExtensionField::Issuer,
        ExtensionField::BuildSignerUri,
        ExtensionField::BuildSignerDigest,
        ExtensionField::RunnerEnvironment,
        ExtensionField::SourceRepositoryUri,
        ExtensionField::SourceRepositoryDigest,
        ExtensionField::SourceRepositoryRef,
        ExtensionField::SourceRepositoryIdentifier,
        ExtensionField::SourceRepositoryOwnerUri,
        ExtensionField::SourceRepositoryOwnerIdentifier,
        ExtensionField::BuildConfigUri,
        ExtensionField::BuildConfigDigest,
        ExtensionField::BuildTrigger,
        ExtensionField::RunInvocationUri,
        ExtensionField::SourceRepositoryVisibilityAtSigning,
    ];

    /// Dotted OID of the extension carrying this field
    pub fn oid(&self) -> &'static str {
        match self {
            ExtensionField::Issuer => "1.3.6.1.4.1.57264.1.8",
            ExtensionField::BuildSignerUri => "1.3.6.1.4.1.57264.1.9",
            ExtensionField::BuildSignerDigest => "1.3.6.1.4.1.57264.1.10",
            ExtensionField::RunnerEnvironment => "1.3.6.1.4.1.57264.1.11",
            ExtensionField::SourceRepositoryUri => "1.3.6.1.4.1.57264.1.12",
            ExtensionField::SourceRepositoryDigest => "1.3.6.1.4.1.57264.1.13",
            ExtensionField::SourceRepositoryRef => "1.3.6.1.4.1.57264.1.14",
            ExtensionField::SourceRepositoryIdentifier => "1.3.6.1.4.1.57264.1.15",
            ExtensionField::SourceRepositoryOwnerUri => "1.3.6.1.4.1.57264.1.16",
            ExtensionField::SourceRepositoryOwnerIdentifier => "1.3.6.1.4.1.57264.1.17",
            ExtensionField::BuildConfigUri => "1.3.6.1.4.1.57264.1.18",
            ExtensionField::BuildConfigDigest => "1.3.6.1.4.1.57264.1.19",
            ExtensionField::BuildTrigger => "1.3.6.1.4.1.57264.1.20",
            ExtensionField::RunInvocationUri => "1.3.6.1.4.1.57264.1.21",
            ExtensionField::SourceRepositoryVisibilityAtSigning => "1.3.6.1.4.1.57264.1.22",
        }
    }

    /// Look up the field bound to a dotted OID
    pub fn from_oid(oid: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.oid() == oid)
    }
}

/// Decoded Fulcio extensions of a signing certificate
///
/// Every field is optional: a certificate only carries the claims its issuer
/// knew about, and absence is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extensions {
    #[serde(rename = "issuer", skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(rename = "buildSignerURI", skip_serializing_if = "Option::is_none")]
    pub build_signer_uri: Option<String>,
    #[serde(rename = "buildSignerDigest", skip_serializing_if = "Option::is_none")]
    pub build_signer_digest: Option<String>,
    #[serde(rename = "runnerEnvironment", skip_serializing_if = "Option::is_none")]
    pub runner_environment: Option<String>,
    #[serde(rename = "sourceRepositoryURI", skip_serializing_if = "Option::is_none")]
    pub source_repository_uri: Option<String>,
    #[serde(rename = "sourceRepositoryDigest", skip_serializing_if = "Option::is_none")]
    pub source_repository_digest: Option<String>,
    #[serde(rename = "sourceRepositoryRef", skip_serializing_if = "Option::is_none")]
    pub source_repository_ref: Option<String>,
    #[serde(rename = "sourceRepositoryIdentifier", skip_serializing_if = "Option::is_none")]
    pub source_repository_identifier: Option<String>,
    #[serde(rename = "sourceRepositoryOwnerURI", skip_serializing_if = "Option::is_none")]
    pub source_repository_owner_uri: Option<String>,
    #[serde(rename = "sourceRepositoryOwnerIdentifier", skip_serializing_if = "Option::is_none")]
    pub source_repository_owner_identifier: Option<String>,
    #[serde(rename = "buildConfigURI", skip_serializing_if = "Option::is_none")]
    pub build_config_uri: Option<String>,
    #[serde(rename = "buildConfigDigest", skip_serializing_if = "Option::is_none")]
    pub build_config_digest: Option<String>,
    #[serde(rename = "buildTrigger", skip_serializing_if = "Option::is_none")]
    pub build_trigger: Option<String>,
    #[serde(rename = "runInvocationURI", skip_serializing_if = "Option::is_none")]
    pub run_invocation_uri: Option<String>,
    #[serde(
        rename = "sourceRepositoryVisibilityAtSigning",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_repository_visibility_at_signing: Option<String>,
}

impl Extensions {
    /// Get the value of a field
    pub fn get(&self, field: ExtensionField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    /// Set the value of a field
    pub fn set(&mut self, field: ExtensionField, value: Option<String>) {
        *self.slot_mut(field) = value;
    }

    fn slot(&self, field: ExtensionField) -> &Option<String> {
        match field {
            ExtensionField::Issuer => &self.issuer,
            ExtensionField::BuildSignerUri => &self.build_signer_uri,
            ExtensionField::BuildSignerDigest => &self.build_signer_digest,
            ExtensionField::RunnerEnvironment => &self.runner_environment,
            ExtensionField::SourceRepositoryUri => &self.source_repository_uri,
            ExtensionField::SourceRepositoryDigest => &self.source_repository_digest,
            ExtensionField::SourceRepositoryRef => &self.source_repository_ref,
            ExtensionField::SourceRepositoryIdentifier => &self.source_repository_identifier,
            ExtensionField::SourceRepositoryOwnerUri => &self.source_repository_owner_uri,
            ExtensionField::SourceRepositoryOwnerIdentifier => {
                &self.source_repository_owner_identifier
            }
            ExtensionField::BuildConfigUri => &self.build_config_uri,
            ExtensionField::BuildConfigDigest => &self.build_config_digest,
            ExtensionField::BuildTrigger => &self.build_trigger,
            ExtensionField::RunInvocationUri => &self.run_invocation_uri,
            ExtensionField::SourceRepositoryVisibilityAtSigning => {
                &self.source_repository_visibility_at_signing
            }
        }
    }

    fn slot_mut(&mut self, field: ExtensionField) -> &mut Option<String> {
        match field {
            ExtensionField::Issuer => &mut self.issuer,
            ExtensionField::BuildSignerUri => &mut self.build_signer_uri,
            ExtensionField::BuildSignerDigest => &mut self.build_signer_digest,
            ExtensionField::RunnerEnvironment => &mut self.runner_environment,
            ExtensionField::SourceRepositoryUri => &mut self.source_repository_uri,
            ExtensionField::SourceRepositoryDigest => &mut self.source_repository_digest,
            ExtensionField::SourceRepositoryRef => &mut self.source_repository_ref,
            ExtensionField::SourceRepositoryIdentifier => &mut self.source_repository_identifier,
            ExtensionField::SourceRepositoryOwnerUri => &mut self.source_repository_owner_uri,
            ExtensionField::SourceRepositoryOwnerIdentifier => {
                &mut self.source_repository_owner_identifier
            }
            ExtensionField::BuildConfigUri => &mut self.build_config_uri,
            ExtensionField::BuildConfigDigest => &mut self.build_config_digest,
            ExtensionField::BuildTrigger => &mut self.build_trigger,
            ExtensionField::RunInvocationUri => &mut self.run_invocation_uri,
            ExtensionField::SourceRepositoryVisibilityAtSigning => {
                &mut self.source_repository_visibility_at_signing
            }
        }
    }
}
