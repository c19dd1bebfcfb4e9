//! Core types for GitHub artifact attestations
//!
//! This crate provides the data structures shared by the attestation client and
//! verifier: artifact digests, in-toto statements carried in DSSE envelopes, and
//! the Fulcio certificate extensions that describe the CI run which produced an
//! artifact.

pub mod error;
pub mod extensions;
pub mod hash;
pub mod intoto;
pub mod payload;

pub use error::{Error, Result};
pub use extensions::{ExtensionField, Extensions, LEGACY_ISSUER_OID};
pub use hash::{Digest, HashAlgorithm};
pub use intoto::{DigestSet, Statement, Subject, STATEMENT_TYPE_V01, STATEMENT_TYPE_V1};
pub use payload::{Payload, IN_TOTO_PAYLOAD_TYPE};
