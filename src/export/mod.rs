//! Key pair export orchestration
//!
//! Runs the full pipeline for one labelled key pair:
//!
//! 1. validate the caller's base names
//! 2. have the key store write `<key>.p12` and `<cert>.der`
//! 3. convert `<cert>.der` to `<cert>.pem`
//! 4. extract the private key of `<key>.p12` to `key.pem`
//!
//! Steps run strictly in order and the first failure aborts the run. By
//! default artifacts written before the failure stay on disk; set
//! `rollback_on_failure` to remove them.

use crate::cert_ops::{
    convert,
    validate::{self, DER_EXTENSION, P12_EXTENSION, PEM_EXTENSION},
};
use crate::config::ExportSettings;
use crate::keyring::KeyringExport;
use crate::utils::{fs, ExportError, Password, Result};
use std::path::{Path, PathBuf};

/// One export of a labelled key pair
#[derive(Debug, Clone)]
pub struct ExportRequest {
    /// Certificate file name without extension
    pub cert_name: String,
    /// Key container file name without extension
    pub key_name: String,
    /// Password protecting the exported `.p12` container
    pub key_password: Password,
    /// Record label in the key store
    pub label: String,
}

impl ExportRequest {
    pub fn new(
        cert_name: impl Into<String>,
        key_name: impl Into<String>,
        key_password: impl Into<Password>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            cert_name: cert_name.into(),
            key_name: key_name.into(),
            key_password: key_password.into(),
            label: label.into(),
        }
    }
}

/// The four files of a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedArtifacts {
    /// `<key>.p12`, password-encrypted
    pub key_container: PathBuf,
    /// `<cert>.der`
    pub certificate_der: PathBuf,
    /// `<cert>.pem`
    pub certificate_pem: PathBuf,
    /// `key.pem`, NOT encrypted
    pub private_key_pem: PathBuf,
}

impl ExportedArtifacts {
    /// All artifacts in the order they are written
    pub fn paths(&self) -> [&Path; 4] {
        [
            &self.key_container,
            &self.certificate_der,
            &self.certificate_pem,
            &self.private_key_pem,
        ]
    }
}

/// Runs exports with a fixed set of settings
#[derive(Debug, Clone, Default)]
pub struct KeyPairExporter {
    settings: ExportSettings,
}

impl KeyPairExporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Validate `request` and compute its artifact paths.
    ///
    /// Touches neither the key store nor the file system.
    pub fn plan(&self, request: &ExportRequest) -> Result<ExportedArtifacts> {
        validate::ensure_base_name(&request.cert_name)?;
        validate::ensure_base_name(&request.key_name)?;

        let dir = &self.settings.output_dir;
        let artifacts = ExportedArtifacts {
            key_container: dir.join(format!("{}.{}", request.key_name, P12_EXTENSION)),
            certificate_der: dir.join(format!("{}.{}", request.cert_name, DER_EXTENSION)),
            certificate_pem: dir.join(format!("{}.{}", request.cert_name, PEM_EXTENSION)),
            private_key_pem: self.settings.key_pem_path(),
        };

        if artifacts.certificate_pem == artifacts.private_key_pem {
            return Err(ExportError::InvalidArgument {
                name: request.cert_name.clone(),
                message: format!(
                    "certificate PEM would overwrite the private key output {}",
                    self.settings.key_pem_name
                ),
            });
        }

        Ok(artifacts)
    }

    /// Export `request.label` from `keyring` and convert it to PEM
    pub fn export<K>(&self, keyring: &mut K, request: &ExportRequest) -> Result<ExportedArtifacts>
    where
        K: KeyringExport + ?Sized,
    {
        let artifacts = self.plan(request)?;
        for path in artifacts.paths() {
            fs::ensure_absent(path)?;
        }

        tracing::info!(
            "Exporting {:?} to {}",
            request.label,
            self.settings.output_dir.display()
        );

        match self.run(keyring, request, &artifacts) {
            Ok(()) => {
                tracing::info!(
                    "Export of {:?} complete; {} holds an unencrypted private key",
                    request.label,
                    artifacts.private_key_pem.display()
                );
                Ok(artifacts)
            }
            Err(e) => {
                if self.settings.rollback_on_failure {
                    rollback(&artifacts);
                }
                Err(e)
            }
        }
    }

    fn run<K>(
        &self,
        keyring: &mut K,
        request: &ExportRequest,
        artifacts: &ExportedArtifacts,
    ) -> Result<()>
    where
        K: KeyringExport + ?Sized,
    {
        let password = request.key_password.as_str();

        keyring.export_key_to_file(&artifacts.key_container, password, &request.label)?;
        tracing::debug!("Key container written to {}", artifacts.key_container.display());

        keyring.export_cert_to_file(&artifacts.certificate_der, &request.label)?;
        tracing::debug!("Certificate written to {}", artifacts.certificate_der.display());

        let certificate_pem = convert::der_cert_to_pem(&artifacts.certificate_der)?;
        debug_assert_eq!(certificate_pem, artifacts.certificate_pem);

        convert::p12_private_key_to_pem_at(
            &artifacts.key_container,
            password,
            &artifacts.private_key_pem,
            Some(self.settings.key_file_mode),
        )?;

        Ok(())
    }
}

/// Remove whatever the failed run left behind.
///
/// Every planned path was absent when the run started, so anything found
/// there now belongs to this run.
fn rollback(artifacts: &ExportedArtifacts) {
    for path in artifacts.paths() {
        if !path.exists() {
            continue;
        }
        match std::fs::remove_file(path) {
            Ok(()) => tracing::warn!("Rolled back {}", path.display()),
            Err(e) => tracing::warn!("Failed to roll back {}: {}", path.display(), e),
        }
    }
}

/// Export `label` with default settings: artifacts in the current
/// directory, private key in `key.pem`, no rollback.
pub fn export_key_pair<K>(
    keyring: &mut K,
    cert_name: &str,
    key_name: &str,
    key_password: &str,
    label: &str,
) -> Result<ExportedArtifacts>
where
    K: KeyringExport + ?Sized,
{
    let request = ExportRequest::new(cert_name, key_name, key_password, label);
    KeyPairExporter::default().export(keyring, &request)
}
