//! keyring-pem Library
//!
//! Exports a labelled key pair from a key store and converts it to PEM:
//! - key store access behind the [`keyring::KeyringExport`] trait
//! - a portable PKCS#12 key database adapter
//! - strict DER certificate and PKCS#12 private key conversion
//! - the four-artifact export pipeline
//!
//! # Usage
//!
//! ```rust,ignore
//! use keyring_pem::export::export_key_pair;
//! use keyring_pem::keyring::KeyDatabase;
//! use std::path::Path;
//!
//! let mut database = KeyDatabase::open(Path::new("keyring.p12"), "storepass")?;
//! let artifacts = export_key_pair(&mut database, "mycert", "mykey", "changeit", "TESTKEY")?;
//! // mykey.p12, mycert.der, mycert.pem and key.pem now exist
//! ```
//!
//! `key.pem` holds the private key WITHOUT encryption. It is created with
//! mode 0600 on Unix; callers should still delete it as soon as possible.

pub mod cert_ops;
pub mod cli;
pub mod config;
pub mod export;
pub mod keyring;
pub mod runner;
pub mod utils;

// Re-export commonly used types
pub use cli::Cli;
pub use config::{ExportSettings, Settings};
pub use export::{export_key_pair, ExportRequest, ExportedArtifacts, KeyPairExporter};
pub use keyring::{KeyDatabase, KeyringExport};
pub use utils::{ExportError, Password, Result, StoreError};
