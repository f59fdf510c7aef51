//! Strict parsing of native artifacts
//!
//! DER certificates must hold exactly one X.509 certificate. PKCS#12
//! containers are checked for the outer PFX shape before decryption so
//! that malformed bytes and wrong passwords are told apart.

use crate::utils::{fs, ExportError, Result};
use p12_keystore::{KeyStore, KeyStoreEntry, PrivateKeyChain};
use sha2::Digest;
use std::path::Path;
use x509_parser::der_parser::ber::BerObject;
use x509_parser::prelude::*;

/// PFX version mandated by RFC 7292
const PFX_VERSION: u32 = 3;
/// pkcs7-data, the authSafe content type for password integrity mode
const PKCS7_DATA_OID: &str = "1.2.840.113549.1.7.1";
/// pkcs7-signedData, the authSafe content type for public-key integrity mode
const PKCS7_SIGNED_DATA_OID: &str = "1.2.840.113549.1.7.2";

/// Identifying fields of a certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateSummary {
    /// Serial number as colon-separated hex
    pub serial: String,
    pub subject: String,
    pub issuer: String,
    /// SHA-256 over the DER encoding
    pub fingerprint: String,
}

/// Parse `data` as exactly one DER-encoded X.509 certificate.
///
/// Trailing bytes after the certificate are an error.
pub fn parse_der_certificate(data: &[u8]) -> std::result::Result<X509Certificate<'_>, String> {
    let (rest, cert) =
        X509Certificate::from_der(data).map_err(|e| format!("malformed certificate: {:?}", e))?;

    if !rest.is_empty() {
        return Err(format!(
            "{} trailing bytes after the certificate",
            rest.len()
        ));
    }

    Ok(cert)
}

/// Summarize a DER-encoded certificate
pub fn summarize_certificate(der: &[u8]) -> std::result::Result<CertificateSummary, String> {
    let cert = parse_der_certificate(der)?;

    let serial = cert
        .raw_serial()
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":");

    let fingerprint = sha2::Sha256::digest(der)
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(":");

    Ok(CertificateSummary {
        serial,
        subject: cert.subject().to_string(),
        issuer: cert.issuer().to_string(),
        fingerprint,
    })
}

/// Check that `data` has the outer structure of a PKCS#12 PFX:
/// `SEQUENCE { INTEGER 3, ContentInfo, [MacData] }` with a PKCS#7
/// content type. Nothing is decrypted.
pub fn check_pfx_structure(data: &[u8]) -> std::result::Result<(), String> {
    let (rest, pfx) = x509_parser::der_parser::parse_ber(data)
        .map_err(|e| format!("not an ASN.1 structure: {:?}", e))?;

    if !rest.is_empty() {
        return Err(format!("{} trailing bytes after the PFX", rest.len()));
    }

    let fields = pfx
        .as_sequence()
        .map_err(|_| "PFX is not a SEQUENCE".to_string())?;

    let version = fields
        .first()
        .and_then(|v| v.as_u32().ok())
        .ok_or_else(|| "PFX version is missing".to_string())?;
    if version != PFX_VERSION {
        return Err(format!("unsupported PFX version {}", version));
    }

    let content_type = fields
        .get(1)
        .and_then(content_info_type)
        .ok_or_else(|| "PFX authSafe is not a ContentInfo".to_string())?;

    if content_type != PKCS7_DATA_OID && content_type != PKCS7_SIGNED_DATA_OID {
        return Err(format!("unexpected authSafe content type {}", content_type));
    }

    Ok(())
}

fn content_info_type(obj: &BerObject<'_>) -> Option<String> {
    let items = obj.as_sequence().ok()?;
    let oid = items.first()?.as_oid().ok()?;
    Some(oid.to_id_string())
}

/// Decrypt PKCS#12 bytes.
///
/// Bytes without the PFX shape are `InvalidContainer`; a well-formed PFX
/// that fails to open with `password` is `DecryptionFailure`.
pub fn open_pkcs12(data: &[u8], password: &str, origin: &Path) -> Result<KeyStore> {
    check_pfx_structure(data).map_err(|message| ExportError::InvalidContainer {
        path: origin.display().to_string(),
        message,
    })?;

    KeyStore::from_pkcs12(data, password).map_err(|e| ExportError::DecryptionFailure {
        path: origin.display().to_string(),
        message: e.to_string(),
    })
}

/// The private key chain with the lowest alias, if any
pub fn first_private_key_chain<'a>(
    keystore: &'a KeyStore,
    origin: &Path,
) -> Option<&'a PrivateKeyChain> {
    let mut chains: Vec<_> = keystore
        .entries()
        .filter_map(|(alias, entry)| match entry {
            KeyStoreEntry::PrivateKeyChain(chain) => Some((alias.to_string(), chain)),
            _ => None,
        })
        .collect();
    chains.sort_by(|a, b| a.0.cmp(&b.0));

    if chains.len() > 1 {
        tracing::warn!(
            "{} holds {} private keys, using the one named {:?}",
            origin.display(),
            chains.len(),
            chains[0].0
        );
    }

    chains.into_iter().next().map(|(_, chain)| chain)
}

/// Read a file and summarize the certificate it holds
pub fn summarize_certificate_file(path: &Path) -> Result<CertificateSummary> {
    let data = fs::read_artifact(path)?;
    summarize_certificate(&data).map_err(|message| ExportError::InvalidEncoding {
        path: path.display().to_string(),
        message,
    })
}
