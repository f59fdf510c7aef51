//! Native to PEM conversion
//!
//! Converts a DER certificate and the private key of a PKCS#12 container
//! into PEM. Output files are created only after decoding succeeds.

use crate::cert_ops::reader;
use crate::cert_ops::validate::{self, DER_EXTENSION, P12_EXTENSION, PEM_EXTENSION};
use crate::utils::fs::{self, PRIVATE_FILE_MODE};
use crate::utils::{ExportError, Result};
use ::pem::{EncodeConfig, LineEnding};
use std::path::{Path, PathBuf};

/// Default file name for the extracted private key
pub const DEFAULT_KEY_PEM: &str = "key.pem";

const CERTIFICATE_TAG: &str = "CERTIFICATE";
const PRIVATE_KEY_TAG: &str = "PRIVATE KEY";
const BUFFER_ORIGIN: &str = "<buffer>";

/// PEM armor with 64-column Base64 lines and LF line endings
fn encode_pem(tag: &str, contents: Vec<u8>) -> String {
    let block = ::pem::Pem::new(tag, contents);
    ::pem::encode_config(&block, EncodeConfig::new().set_line_ending(LineEnding::LF))
}

fn certificate_to_pem(der: &[u8], origin: &Path) -> Result<String> {
    reader::parse_der_certificate(der).map_err(|message| ExportError::InvalidEncoding {
        path: origin.display().to_string(),
        message,
    })?;

    Ok(encode_pem(CERTIFICATE_TAG, der.to_vec()))
}

fn private_key_to_pem(data: &[u8], password: &str, origin: &Path) -> Result<String> {
    let keystore = reader::open_pkcs12(data, password, origin)?;

    let key = reader::first_private_key_chain(&keystore, origin)
        .map(|chain| chain.key())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| ExportError::MissingKey {
            path: origin.display().to_string(),
        })?;

    Ok(encode_pem(PRIVATE_KEY_TAG, key.to_vec()))
}

/// Convert DER certificate bytes to PEM text
pub fn der_cert_to_pem_string(der: &[u8]) -> Result<String> {
    certificate_to_pem(der, Path::new(BUFFER_ORIGIN))
}

/// Extract the private key of PKCS#12 bytes as unencrypted PEM text
pub fn p12_private_key_to_pem_string(data: &[u8], password: &str) -> Result<String> {
    private_key_to_pem(data, password, Path::new(BUFFER_ORIGIN))
}

/// Convert a `.der` certificate file to PEM.
///
/// The output is written next to the input as `<stem>.pem`, where the stem
/// is the file name up to its first `.`. The input is left in place.
pub fn der_cert_to_pem(input: &Path) -> Result<PathBuf> {
    validate::ensure_extension(input, DER_EXTENSION)?;

    let stem = validate::base_stem(input).ok_or_else(|| ExportError::InvalidArgument {
        name: input.display().to_string(),
        message: "certificate file has no base name".to_string(),
    })?;
    let output = input.with_file_name(format!("{}.{}", stem, PEM_EXTENSION));

    let data = fs::read_artifact(input)?;
    let pem = certificate_to_pem(&data, input)?;
    fs::write_artifact(&output, pem.as_bytes(), None)?;

    tracing::debug!("Converted {} to {}", input.display(), output.display());
    Ok(output)
}

/// Extract the private key of a `.p12` file into `key.pem` in the current
/// directory.
///
/// The key is written unencrypted. See [`p12_private_key_to_pem_at`].
pub fn p12_private_key_to_pem(input: &Path, password: &str) -> Result<PathBuf> {
    let output = PathBuf::from(DEFAULT_KEY_PEM);
    p12_private_key_to_pem_at(input, password, &output, Some(PRIVATE_FILE_MODE))?;
    Ok(output)
}

/// Extract the private key of a `.p12` file into `output`.
///
/// The PEM key is NOT encrypted. On Unix, `mode` is applied when the file
/// is created; pass [`PRIVATE_FILE_MODE`] unless the caller restricts
/// access some other way.
pub fn p12_private_key_to_pem_at(
    input: &Path,
    password: &str,
    output: &Path,
    mode: Option<u32>,
) -> Result<()> {
    validate::ensure_extension(input, P12_EXTENSION)?;
    validate::ensure_extension(output, PEM_EXTENSION)?;

    let data = fs::read_artifact(input)?;
    let pem = private_key_to_pem(&data, password, input)?;
    fs::write_artifact(output, pem.as_bytes(), mode)?;

    tracing::debug!(
        "Extracted private key from {} to {}",
        input.display(),
        output.display()
    );
    Ok(())
}
