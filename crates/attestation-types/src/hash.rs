//! Hash algorithms and artifact digests
//!
//! A [`Digest`] is rendered as `algorithm:hex`, the form used both in the
//! attestations API path and in log output.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Hash algorithms supported for artifact digests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-256
    #[default]
    Sha256,
    /// SHA-384
    Sha384,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// Name used in digest strings and in-toto subject digests
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    /// Length of the raw digest in bytes
    pub fn output_len(&self) -> usize {
        match self {
            HashAlgorithm::Sha256 => 32,
            HashAlgorithm::Sha384 => 48,
            HashAlgorithm::Sha512 => 64,
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" => Ok(HashAlgorithm::Sha256),
            "sha384" => Ok(HashAlgorithm::Sha384),
            "sha512" => Ok(HashAlgorithm::Sha512),
            _ => Err(Error::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Digest of an artifact
///
/// The value is always lower-case hex of exactly [`HashAlgorithm::output_len`] bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Digest {
    algorithm: HashAlgorithm,
    value: String,
}

impl Digest {
    /// Create a digest from raw hash output
    pub fn from_bytes(algorithm: HashAlgorithm, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != algorithm.output_len() {
            return Err(Error::InvalidDigest(format!(
                "{} digest must be {} bytes, got {}",
                algorithm,
                algorithm.output_len(),
                bytes.len()
            )));
        }
        Ok(Self {
            algorithm,
            value: hex::encode(bytes),
        })
    }

    /// Create a digest from a hex string
    pub fn from_hex(algorithm: HashAlgorithm, value: &str) -> Result<Self> {
        let bytes = hex::decode(value)
            .map_err(|e| Error::InvalidDigest(format!("invalid hex value: {}", e)))?;
        Self::from_bytes(algorithm, &bytes)
    }

    /// The hash algorithm
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Lower-case hex value
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl FromStr for Digest {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (algorithm, value) = s
            .split_once(':')
            .ok_or_else(|| Error::InvalidDigest(format!("missing algorithm prefix: {}", s)))?;
        Self::from_hex(algorithm.parse()?, value)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.algorithm, self.value)
    }
}

impl Serialize for Digest {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
