//! PKCS#12-backed key database
//!
//! Each entry of the container is a record and its alias is the record
//! label. Labels are matched exactly, case included.

use crate::cert_ops::{reader, validate, validate::P12_EXTENSION};
use crate::keyring::KeyringExport;
use crate::utils::fs::{self, PRIVATE_FILE_MODE};
use crate::utils::{ExportError, Result, StoreError};
use p12_keystore::{Certificate, KeyStore, KeyStoreEntry, PrivateKeyChain};
use sha2::Digest;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A key database held in memory
pub struct KeyDatabase {
    store: KeyStore,
    origin: Option<PathBuf>,
}

impl KeyDatabase {
    /// An empty database
    pub fn create() -> Self {
        Self {
            store: KeyStore::new(),
            origin: None,
        }
    }

    /// Open the database stored at `path`
    pub fn open(path: &Path, password: &str) -> Result<Self> {
        let data = std::fs::read(path).map_err(|e| StoreError::InvalidDatabase {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let store = reader::open_pkcs12(&data, password, path).map_err(|e| match e {
            ExportError::DecryptionFailure { .. } => StoreError::AccessDenied {
                message: format!("wrong password for key database {}", path.display()),
            },
            other => StoreError::InvalidDatabase {
                path: path.display().to_string(),
                message: other.to_string(),
            },
        })?;

        tracing::info!(
            "Opened key database {} with {} records",
            path.display(),
            store.entries().count()
        );

        Ok(Self {
            store,
            origin: Some(path.to_path_buf()),
        })
    }

    fn record(&self, label: &str) -> Option<&KeyStoreEntry> {
        self.store
            .entries()
            .find(|(alias, _)| alias.to_string() == label)
            .map(|(_, entry)| entry)
    }

    /// All record labels, sorted
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self
            .store
            .entries()
            .map(|(alias, _)| alias.to_string())
            .collect();
        labels.sort();
        labels
    }

    /// Whether `label` names a record holding a private key
    pub fn has_private_key(&self, label: &str) -> bool {
        matches!(
            self.record(label),
            Some(KeyStoreEntry::PrivateKeyChain(_))
        )
    }

    /// Import the private key and certificate chain of a PKCS#12 file as a
    /// new record named `label`
    pub fn import_key(&mut self, p12_path: &Path, password: &str, label: &str) -> Result<()> {
        validate::ensure_extension(p12_path, P12_EXTENSION)?;

        if self.record(label).is_some() {
            return Err(StoreError::DuplicateLabel {
                label: label.to_string(),
            }
            .into());
        }

        let data = fs::read_artifact(p12_path)?;
        let source = reader::open_pkcs12(&data, password, p12_path)?;
        let chain = reader::first_private_key_chain(&source, p12_path).ok_or_else(|| {
            ExportError::MissingKey {
                path: p12_path.display().to_string(),
            }
        })?;

        let copy = copy_chain(chain)?;
        self.store
            .add_entry(label, KeyStoreEntry::PrivateKeyChain(copy));

        tracing::info!("Imported {} as {:?}", p12_path.display(), label);
        Ok(())
    }

    fn to_pkcs12(&self, path: &Path, password: &str) -> Result<Vec<u8>> {
        let data = self
            .store
            .writer(password)
            .write()
            .map_err(|e| StoreError::InvalidDatabase {
                path: path.display().to_string(),
                message: format!("Failed to serialize key database: {}", e),
            })?;
        Ok(data)
    }

    /// Write the database to a new file at `path`, encrypted with `password`
    pub fn save(&self, path: &Path, password: &str) -> Result<()> {
        let data = self.to_pkcs12(path, password)?;
        fs::write_artifact(path, &data, Some(PRIVATE_FILE_MODE))
    }

    /// Replace the file the database was opened from.
    ///
    /// The contents are staged in a temporary file next to the original and
    /// renamed over it, so a failed save leaves the old database in place.
    /// Returns the path written.
    pub fn save_in_place(&self, password: &str) -> Result<&Path> {
        let path = self
            .origin
            .as_deref()
            .ok_or_else(|| ExportError::InvalidArgument {
                name: "database".to_string(),
                message: "database was created in memory; use save with a path".to_string(),
            })?;
        let data = self.to_pkcs12(path, password)?;

        let write_error = |message: String| ExportError::FileWrite {
            path: path.display().to_string(),
            message,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        // Temporary files are created owner-only on Unix
        let mut staged = tempfile::Builder::new()
            .prefix(".keyring-")
            .suffix(".tmp")
            .tempfile_in(dir)
            .map_err(|e| write_error(e.to_string()))?;
        staged
            .write_all(&data)
            .and_then(|_| staged.as_file().sync_all())
            .map_err(|e| write_error(e.to_string()))?;
        staged
            .persist(path)
            .map_err(|e| write_error(e.to_string()))?;

        tracing::info!("Saved key database {}", path.display());
        Ok(path)
    }

    /// Export the record `label` as PKCS#12 bytes encrypted with `password`
    pub fn export_key_to_buffer(&self, password: &str, label: &str) -> Result<Vec<u8>> {
        let chain = match self.record(label) {
            Some(KeyStoreEntry::PrivateKeyChain(chain)) => chain,
            Some(_) => {
                return Err(StoreError::NoPrivateKey {
                    label: label.to_string(),
                }
                .into())
            }
            None => {
                return Err(StoreError::LabelNotFound {
                    label: label.to_string(),
                }
                .into())
            }
        };

        let mut exported = KeyStore::new();
        exported.add_entry(label, KeyStoreEntry::PrivateKeyChain(copy_chain(chain)?));

        let data = exported
            .writer(password)
            .write()
            .map_err(|e| StoreError::Backend {
                code: -1,
                message: format!("Failed to serialize PKCS#12 for {:?}: {}", label, e),
            })?;

        tracing::debug!("Exported key {:?} ({} bytes)", label, data.len());
        Ok(data)
    }

    /// Export the certificate of record `label` as DER bytes
    pub fn export_cert_to_buffer(&self, label: &str) -> Result<Vec<u8>> {
        let der = match self.record(label) {
            Some(KeyStoreEntry::PrivateKeyChain(chain)) => {
                chain.chain().first().map(|cert| cert.as_der().to_vec())
            }
            Some(KeyStoreEntry::Certificate(cert)) => Some(cert.as_der().to_vec()),
            None => {
                return Err(StoreError::LabelNotFound {
                    label: label.to_string(),
                }
                .into())
            }
        };

        let der = der.ok_or_else(|| StoreError::NoCertificate {
            label: label.to_string(),
        })?;

        tracing::debug!("Exported certificate {:?} ({} bytes)", label, der.len());
        Ok(der)
    }

    /// Add a certificate-only record
    pub fn add_certificate(&mut self, label: &str, der: &[u8]) -> Result<()> {
        if self.record(label).is_some() {
            return Err(StoreError::DuplicateLabel {
                label: label.to_string(),
            }
            .into());
        }

        let cert = Certificate::from_der(der).map_err(|e| ExportError::InvalidEncoding {
            path: label.to_string(),
            message: e.to_string(),
        })?;
        self.store.add_entry(label, KeyStoreEntry::Certificate(cert));
        Ok(())
    }
}

impl Default for KeyDatabase {
    fn default() -> Self {
        Self::create()
    }
}

impl KeyringExport for KeyDatabase {
    fn export_key_to_file(&mut self, path: &Path, password: &str, label: &str) -> Result<()> {
        let data = self.export_key_to_buffer(password, label)?;
        fs::write_artifact(path, &data, Some(PRIVATE_FILE_MODE))
    }

    fn export_cert_to_file(&mut self, path: &Path, label: &str) -> Result<()> {
        let data = self.export_cert_to_buffer(label)?;
        fs::write_artifact(path, &data, None)
    }
}

/// Rebuild a key chain for another container.
///
/// The local key ID is the SHA-256 of the leaf certificate, or of the key
/// when the chain is empty.
fn copy_chain(chain: &PrivateKeyChain) -> Result<PrivateKeyChain> {
    let certs = chain
        .chain()
        .iter()
        .map(|cert| Certificate::from_der(cert.as_der()))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| StoreError::Backend {
            code: -1,
            message: format!("Failed to copy certificate chain: {}", e),
        })?;

    let local_key_id = {
        let mut hasher = sha2::Sha256::new();
        match certs.first() {
            Some(leaf) => hasher.update(leaf.as_der()),
            None => hasher.update(chain.key()),
        }
        hasher.finalize().to_vec()
    };

    Ok(PrivateKeyChain::new(
        chain.key().to_vec(),
        &local_key_id,
        certs,
    ))
}
