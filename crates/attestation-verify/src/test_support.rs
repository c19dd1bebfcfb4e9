//! Fixtures shared by the unit tests

use base64::{engine::general_purpose::STANDARD, Engine as _};
use const_oid::db::rfc5912::{ECDSA_WITH_SHA_256, ID_EC_PUBLIC_KEY};
use const_oid::ObjectIdentifier;
use serde_json::json;
use std::str::FromStr;
use std::time::Duration;
use x509_cert::der::asn1::{BitString, OctetString, UtcTime};
use x509_cert::der::Encode;
use x509_cert::ext::Extension;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, SubjectPublicKeyInfoOwned};
use x509_cert::time::{Time, Validity};
use x509_cert::{Certificate, TbsCertificate, Version};

pub const GITHUB_ISSUER: &str = "https://token.actions.githubusercontent.com";

/// DER encoding of a short string with the given tag
pub fn der_string(tag: u8, value: &str) -> Vec<u8> {
    assert!(value.len() < 128);
    let mut out = vec![tag, value.len() as u8];
    out.extend_from_slice(value.as_bytes());
    out
}

/// Unsigned leaf certificate carrying the given extensions
pub fn certificate_der(extensions: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let signature_algorithm = AlgorithmIdentifierOwned {
        oid: ECDSA_WITH_SHA_256,
        parameters: None,
    };
    let not_before = UtcTime::from_unix_duration(Duration::from_secs(1_700_000_000)).unwrap();
    let not_after = UtcTime::from_unix_duration(Duration::from_secs(1_700_000_600)).unwrap();

    let extensions = extensions
        .iter()
        .map(|(oid, value)| Extension {
            extn_id: ObjectIdentifier::new_unwrap(oid),
            critical: false,
            extn_value: OctetString::new(value.clone()).unwrap(),
        })
        .collect();

    let tbs_certificate = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(&[0x01]).unwrap(),
        signature: signature_algorithm.clone(),
        issuer: Name::from_str("CN=sigstore-intermediate,O=sigstore.dev").unwrap(),
        validity: Validity {
            not_before: Time::UtcTime(not_before),
            not_after: Time::UtcTime(not_after),
        },
        subject: Name::default(),
        subject_public_key_info: SubjectPublicKeyInfoOwned {
            algorithm: AlgorithmIdentifierOwned {
                oid: ID_EC_PUBLIC_KEY,
                parameters: None,
            },
            subject_public_key: BitString::from_bytes(&[0x04; 65]).unwrap(),
        },
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: Some(extensions),
    };

    Certificate {
        tbs_certificate,
        signature_algorithm,
        signature: BitString::from_bytes(&[0u8; 64]).unwrap(),
    }
    .to_der()
    .unwrap()
}

/// Certificate as GitHub Actions would have it issued for `owner/repo`
pub fn github_certificate(host: &str, repository: &str) -> Vec<u8> {
    use attestation_types::ExtensionField;

    let owner = repository.split('/').next().unwrap();
    certificate_der(&[
        (ExtensionField::Issuer.oid(), der_string(0x0c, GITHUB_ISSUER)),
        (
            ExtensionField::SourceRepositoryUri.oid(),
            der_string(0x0c, &format!("https://{host}/{repository}")),
        ),
        (
            ExtensionField::SourceRepositoryOwnerUri.oid(),
            der_string(0x0c, &format!("https://{host}/{owner}")),
        ),
        (
            ExtensionField::SourceRepositoryRef.oid(),
            der_string(0x0c, "refs/heads/main"),
        ),
    ])
}

/// In-toto statement naming one subject by sha256
pub fn statement(sha256: &str) -> serde_json::Value {
    json!({
        "_type": "https://in-toto.io/Statement/v1",
        "subject": [{ "name": "app.tar.gz", "digest": { "sha256": sha256 } }],
        "predicateType": "https://slsa.dev/provenance/v1",
        "predicate": {}
    })
}

/// Bundle v0.3 JSON signed with the given certificate
pub fn bundle_json(certificate: &[u8], statement: &serde_json::Value) -> serde_json::Value {
    bundle_with_material(
        json!({
            "certificate": { "rawBytes": STANDARD.encode(certificate) },
            "tlogEntries": []
        }),
        statement,
    )
}

pub fn bundle_with_material(
    material: serde_json::Value,
    statement: &serde_json::Value,
) -> serde_json::Value {
    json!({
        "mediaType": "application/vnd.dev.sigstore.bundle.v0.3+json",
        "verificationMaterial": material,
        "dsseEnvelope": {
            "payload": STANDARD.encode(statement.to_string()),
            "payloadType": "application/vnd.in-toto+json",
            "signatures": [{ "keyid": "", "sig": STANDARD.encode([0x30, 0x44]) }]
        }
    })
}
