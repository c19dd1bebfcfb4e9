//! GitHub artifact attestation verification
//!
//! Hashes a local file, lists the attestations GitHub stores for that digest,
//! and returns the first one that is validly signed by a GitHub Actions
//! workflow of the expected owner or repository.
//!
//! # Example
//!
//! ```no_run
//! use attestation_verify::{verify, VerifyOptions};
//!
//! # async fn example() -> Result<(), attestation_verify::Error> {
//! let options = VerifyOptions::from_env().with_repository("shogo82148/s3cli-mini");
//! let result = verify("s3cli-mini_linux_amd64.tar.gz", &options).await?;
//! println!(
//!     "built by {}",
//!     result.extensions.source_repository_uri.unwrap_or_default()
//! );
//! # Ok(())
//! # }
//! ```

pub mod bundle;
pub mod digest;
pub mod engine;
pub mod error;
pub mod extension;
pub mod policy;
mod verify;

#[cfg(test)]
mod test_support;

pub use attestation_client as client;
pub use attestation_types as types;

pub use bundle::{
    bundle_statement, parse_bundle, BundleVerifier, VerificationResult, VerifyBundle,
    GITHUB_ACTIONS_ISSUER,
};
pub use digest::compute_digest;
pub use engine::{SigstoreEngine, TrustEngine, TrustRootSource};
pub use error::{CandidateError, Error, ExtensionError, Rejection, RejectionCategory, Result};
pub use extension::{decode_extension_string, extensions_from_certificate};
pub use policy::{select_attestation, Policy};
pub use verify::{verify, verify_with, VerifyOptions, GITHUB_TOKEN_ENV};
