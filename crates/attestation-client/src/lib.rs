//! Client for the GitHub artifact attestations API
//!
//! Lists the Sigstore bundles GitHub stores for an artifact digest, either
//! within a single repository or across an organization/user, following
//! `link` header pagination until the last page.
//!
//! # Example
//!
//! ```no_run
//! use attestation_client::{AttestationClient, ClientConfig};
//! use attestation_types::Digest;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = AttestationClient::new(ClientConfig::default())?;
//! let digest: Digest =
//!     "sha256:7452a6cd31d8a5588919c8806f425e37ad95752a4c148f2247e91d4451a91021".parse()?;
//! let attestations = client
//!     .get_by_repository("shogo82148/s3cli-mini", &digest)
//!     .await?;
//! println!("found {} attestations", attestations.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod link;
#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use client::{Attestation, AttestationClient};
pub use config::{ClientConfig, DEFAULT_API_URL, DEFAULT_API_VERSION, GITHUB_API_VERSION_HEADER};
pub use error::{Error, Result};
pub use link::{next_link, parse_link_header, Link};
