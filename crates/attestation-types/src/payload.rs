//! Typed view of a DSSE envelope payload
//!
//! DSSE is a signature envelope format for arbitrary payloads, tagged with a
//! payload type. Attestations use the in-toto payload type; anything else is
//! kept as [`Payload::Unsupported`] so callers reject it explicitly.
//!
//! Specification: https://github.com/secure-systems-lab/dsse

use crate::error::{Error, Result};
use crate::intoto::Statement;

/// Payload type of an in-toto statement
pub const IN_TOTO_PAYLOAD_TYPE: &str = "application/vnd.in-toto+json";

/// Decoded DSSE payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// An in-toto statement
    InToto(Statement),
    /// A payload type this crate does not interpret
    Unsupported {
        /// The envelope's declared payload type
        payload_type: String,
    },
}

impl Payload {
    /// Decode an envelope payload according to its payload type
    ///
    /// Fails only if the payload claims to be in-toto but is not a valid statement.
    pub fn decode(payload_type: &str, payload: &[u8]) -> Result<Self> {
        if payload_type != IN_TOTO_PAYLOAD_TYPE {
            return Ok(Payload::Unsupported {
                payload_type: payload_type.to_string(),
            });
        }
        Ok(Payload::InToto(Statement::from_slice(payload)?))
    }

    /// Take the in-toto statement, rejecting any other payload
    pub fn into_statement(self) -> Result<Statement> {
        match self {
            Payload::InToto(statement) => Ok(statement),
            Payload::Unsupported { payload_type } => Err(Error::UnsupportedPayload(payload_type)),
        }
    }
}
