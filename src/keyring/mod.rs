//! Key store access
//!
//! The export pipeline depends on the [`KeyringExport`] trait, not on a
//! concrete store. A RACF keyring binding lives outside this crate and
//! implements the trait on z/OS; [`KeyDatabase`] implements it over a
//! password-protected PKCS#12 file so the pipeline runs anywhere.

mod key_database;

pub use key_database::KeyDatabase;

use crate::utils::Result;
use std::path::Path;

/// Capability to export a labelled key pair from a key store into files.
///
/// The handle is borrowed mutably for one export, so a single handle never
/// serves two exports at once.
pub trait KeyringExport {
    /// Write the private key and certificate of `label` to `path` as a
    /// PKCS#12 container encrypted with `password`.
    ///
    /// # Errors
    ///
    /// Returns `StoreAccess` if:
    /// - `label` has no associated private key
    /// - the caller lacks access rights to the record
    fn export_key_to_file(&mut self, path: &Path, password: &str, label: &str) -> Result<()>;

    /// Write the certificate of `label` to `path` as binary DER.
    ///
    /// # Errors
    ///
    /// Same label and access conditions as [`export_key_to_file`](Self::export_key_to_file).
    fn export_cert_to_file(&mut self, path: &Path, label: &str) -> Result<()>;
}

impl<T: KeyringExport + ?Sized> KeyringExport for &mut T {
    fn export_key_to_file(&mut self, path: &Path, password: &str, label: &str) -> Result<()> {
        (**self).export_key_to_file(path, password, label)
    }

    fn export_cert_to_file(&mut self, path: &Path, label: &str) -> Result<()> {
        (**self).export_cert_to_file(path, label)
    }
}
