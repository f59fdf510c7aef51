//! Format contract checks
//!
//! File names carry the format: `.der` for certificates, `.p12` for key
//! containers. These checks run before any bytes are read or written.

use crate::utils::{ExportError, Result};
use std::path::Path;

/// Extension of a binary X.509 certificate
pub const DER_EXTENSION: &str = "der";
/// Extension of a PKCS#12 key container
pub const P12_EXTENSION: &str = "p12";
/// Extension of PEM output
pub const PEM_EXTENSION: &str = "pem";

/// Confirm that the file name of `path` ends with `.<extension>`
pub fn ensure_extension(path: &Path, extension: &str) -> Result<()> {
    let matches = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(&format!(".{}", extension)));

    if matches {
        Ok(())
    } else {
        Err(ExportError::FormatMismatch {
            path: path.display().to_string(),
            expected: extension.to_string(),
        })
    }
}

/// Confirm that a caller-supplied base name has no extension component.
///
/// The pipeline appends `.der`, `.p12` and `.pem` itself.
pub fn ensure_base_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ExportError::InvalidArgument {
            name: name.to_string(),
            message: "file base name must not be empty".to_string(),
        });
    }

    if name.contains('.') {
        return Err(ExportError::InvalidArgument {
            name: name.to_string(),
            message: "pass names for certificate and key files without extensions".to_string(),
        });
    }

    Ok(())
}

/// File name text before the first `.`
pub fn base_stem(path: &Path) -> Option<&str> {
    path.file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| name.split('.').next())
        .filter(|stem| !stem.is_empty())
}
