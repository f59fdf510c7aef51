//! Shared fixtures for integration tests
#![allow(dead_code)]

use keyring_pem::{KeyDatabase, KeyringExport, Result};
use p12_keystore::{Certificate, KeyStore, KeyStoreEntry, PrivateKeyChain};
use std::path::{Path, PathBuf};

pub const TEST_CERT_DER: &[u8] = include_bytes!("../fixtures/test-cert.der");
pub const TEST_CERT_PEM: &str = include_str!("../fixtures/test-cert.pem");
pub const TEST_KEY_PEM: &str = include_str!("../fixtures/test-key.pem");
pub const OTHER_CERT_PEM: &str = include_str!("../fixtures/other-cert.pem");
pub const OTHER_KEY_PEM: &str = include_str!("../fixtures/other-key.pem");

pub const LABEL: &str = "TESTKEY";
pub const KEY_PASSWORD: &str = "changeit";
pub const DATABASE_PASSWORD: &str = "storepass";

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// PKCS#8 DER of the test private key
pub fn test_key_der() -> Vec<u8> {
    pem::parse(TEST_KEY_PEM).unwrap().into_contents()
}

fn key_chain(cert_pem: &str, key_pem: &str) -> PrivateKeyChain {
    let cert_der = pem::parse(cert_pem).unwrap().into_contents();
    let key_der = pem::parse(key_pem).unwrap().into_contents();
    let local_key_id = {
        use sha2::Digest;
        sha2::Sha256::digest(&cert_der).to_vec()
    };
    let cert = Certificate::from_der(&cert_der).unwrap();
    PrivateKeyChain::new(key_der, &local_key_id, vec![cert])
}

/// A PKCS#12 container holding the test key pair under `alias`
pub fn test_p12(password: &str, alias: &str) -> Vec<u8> {
    let mut keystore = KeyStore::new();
    keystore.add_entry(
        alias,
        KeyStoreEntry::PrivateKeyChain(key_chain(TEST_CERT_PEM, TEST_KEY_PEM)),
    );
    keystore.writer(password).write().unwrap()
}

/// A PKCS#12 container holding only a trusted certificate
pub fn certificate_only_p12(password: &str) -> Vec<u8> {
    let mut keystore = KeyStore::new();
    keystore.add_entry(
        "ca",
        KeyStoreEntry::Certificate(Certificate::from_der(TEST_CERT_DER).unwrap()),
    );
    keystore.writer(password).write().unwrap()
}

/// A key database with TESTKEY, OTHERKEY and a certificate-only CAONLY record
pub fn test_database(scratch: &Path) -> KeyDatabase {
    let test_p12_path = scratch.join("import-test.p12");
    std::fs::write(&test_p12_path, test_p12("import", "imported")).unwrap();

    let mut other = KeyStore::new();
    other.add_entry(
        "other",
        KeyStoreEntry::PrivateKeyChain(key_chain(OTHER_CERT_PEM, OTHER_KEY_PEM)),
    );
    let other_p12_path = scratch.join("import-other.p12");
    std::fs::write(&other_p12_path, other.writer("import").write().unwrap()).unwrap();

    let mut database = KeyDatabase::create();
    database.import_key(&test_p12_path, "import", LABEL).unwrap();
    database
        .import_key(&other_p12_path, "import", "OTHERKEY")
        .unwrap();
    database.add_certificate("CAONLY", TEST_CERT_DER).unwrap();

    std::fs::remove_file(test_p12_path).unwrap();
    std::fs::remove_file(other_p12_path).unwrap();
    database
}

/// Files in `dir`, sorted by name
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// A key store stand-in that serves fixed bytes and records every call
#[derive(Default)]
pub struct RecordingKeyring {
    pub key_container: Vec<u8>,
    pub certificate: Vec<u8>,
    pub calls: Vec<String>,
}

impl RecordingKeyring {
    pub fn new(key_container: Vec<u8>, certificate: Vec<u8>) -> Self {
        Self {
            key_container,
            certificate,
            calls: Vec::new(),
        }
    }
}

impl KeyringExport for RecordingKeyring {
    fn export_key_to_file(&mut self, path: &Path, _password: &str, label: &str) -> Result<()> {
        self.calls.push(format!("key:{}", label));
        std::fs::write(path, &self.key_container).unwrap();
        Ok(())
    }

    fn export_cert_to_file(&mut self, path: &Path, label: &str) -> Result<()> {
        self.calls.push(format!("cert:{}", label));
        std::fs::write(path, &self.certificate).unwrap();
        Ok(())
    }
}
