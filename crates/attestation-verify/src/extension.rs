//! Fulcio certificate extension decoding
//!
//! Each extension value must be exactly one DER `PrintableString` or
//! `UTF8String`. Anything else, including trailing bytes after the value, is
//! rejected rather than coerced.

use crate::error::{CandidateError, ExtensionError};
use attestation_types::{ExtensionField, Extensions, LEGACY_ISSUER_OID};
use std::collections::HashMap;
use x509_cert::der::asn1::{PrintableStringRef, Utf8StringRef};
use x509_cert::der::{Decode, Encode, Header, SliceReader, Tag};
use x509_cert::Certificate;

/// Decode a DER string extension value; absent input decodes to `None`
pub fn decode_extension_string(raw: Option<&[u8]>) -> Result<Option<String>, ExtensionError> {
    let Some(raw) = raw else {
        return Ok(None);
    };

    let mut reader = SliceReader::new(raw).map_err(|e| ExtensionError::Parse(e.to_string()))?;
    let header = Header::decode(&mut reader).map_err(|e| ExtensionError::Parse(e.to_string()))?;

    let header_len = header
        .encoded_len()
        .and_then(usize::try_from)
        .map_err(|e| ExtensionError::Parse(e.to_string()))?;
    let value_len = usize::try_from(header.length).map_err(|e| ExtensionError::Parse(e.to_string()))?;
    let declared = header_len + value_len;
    if declared != raw.len() {
        return Err(ExtensionError::LengthMismatch {
            declared,
            actual: raw.len(),
        });
    }

    let value = &raw[header_len..];
    let decoded = match header.tag {
        Tag::PrintableString => PrintableStringRef::new(value)
            .map_err(|e| ExtensionError::InvalidString(e.to_string()))?
            .as_str()
            .to_string(),
        Tag::Utf8String => Utf8StringRef::new(value)
            .map_err(|e| ExtensionError::InvalidString(e.to_string()))?
            .as_str()
            .to_string(),
        other => return Err(ExtensionError::UnexpectedTag(other.to_string())),
    };
    Ok(Some(decoded))
}

/// Decode the Fulcio extensions of a DER certificate
///
/// The issuer comes from `1.3.6.1.4.1.57264.1.8`, falling back to the
/// deprecated `1.3.6.1.4.1.57264.1.1` whose value is the bare issuer URL.
pub fn extensions_from_certificate(der: &[u8]) -> Result<Extensions, CandidateError> {
    let certificate = Certificate::from_der(der)
        .map_err(|e| CandidateError::Format(format!("failed to parse certificate: {}", e)))?;

    let raw: HashMap<String, &[u8]> = certificate
        .tbs_certificate
        .extensions
        .iter()
        .flatten()
        .map(|ext| (ext.extn_id.to_string(), ext.extn_value.as_bytes()))
        .collect();

    let mut extensions = Extensions::default();
    for field in ExtensionField::ALL {
        let value = decode_extension_string(raw.get(field.oid()).copied()).map_err(|source| {
            CandidateError::MalformedExtension {
                oid: field.oid().to_string(),
                source,
            }
        })?;
        extensions.set(field, value);
    }

    if extensions.issuer.is_none() {
        if let Some(legacy) = raw.get(LEGACY_ISSUER_OID) {
            let issuer = std::str::from_utf8(legacy).map_err(|e| {
                CandidateError::MalformedExtension {
                    oid: LEGACY_ISSUER_OID.to_string(),
                    source: ExtensionError::InvalidString(e.to_string()),
                }
            })?;
            extensions.issuer = Some(issuer.to_string());
        }
    }

    Ok(extensions)
}
