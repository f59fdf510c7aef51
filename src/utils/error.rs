//! Custom error types for keyring-pem
//!
//! This module defines domain-specific error types using `thiserror` for
//! the failure modes of the export-and-convert pipeline, the key store
//! adapters and configuration loading.

use thiserror::Error;

/// Top-level error type for an export run
///
/// Every variant aborts the current export. Nothing is retried.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Invalid argument {name:?}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("File {path} must be of .{expected} type")]
    FormatMismatch { path: String, expected: String },

    #[error("Invalid DER certificate in {path}: {message}")]
    InvalidEncoding { path: String, message: String },

    #[error("Invalid PKCS#12 container in {path}: {message}")]
    InvalidContainer { path: String, message: String },

    #[error("Failed to decrypt PKCS#12 container {path} (wrong password?): {message}")]
    DecryptionFailure { path: String, message: String },

    #[error("PKCS#12 container {path} holds no private key")]
    MissingKey { path: String },

    #[error("Key store access failed: {0}")]
    StoreAccess(#[from] StoreError),

    #[error("Refusing to overwrite existing artifact: {path}")]
    ArtifactExists { path: String },

    #[error("Failed to read {path}: {message}")]
    FileRead { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    FileWrite { path: String, message: String },
}

/// Errors raised by a key store adapter
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("No record found for label {label:?}")]
    LabelNotFound { label: String },

    #[error("Record {label:?} has no private key")]
    NoPrivateKey { label: String },

    #[error("Record {label:?} has no certificate")]
    NoCertificate { label: String },

    #[error("Label {label:?} already exists in the key database")]
    DuplicateLabel { label: String },

    #[error("Access denied: {message}")]
    AccessDenied { message: String },

    #[error("Invalid key database {path}: {message}")]
    InvalidDatabase { path: String, message: String },

    #[error("Key store error {code}: {message}")]
    Backend { code: i32, message: String },
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to parse configuration: {message}")]
    ParseError { message: String },

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias using ExportError
pub type Result<T> = std::result::Result<T, ExportError>;
