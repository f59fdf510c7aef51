//! Certificate and key container operations
//!
//! Validates native file formats and converts DER certificates and
//! PKCS#12 private keys to PEM.

pub mod convert;
pub mod reader;
pub mod validate;

pub use convert::{
    der_cert_to_pem, der_cert_to_pem_string, p12_private_key_to_pem, p12_private_key_to_pem_at,
    p12_private_key_to_pem_string, DEFAULT_KEY_PEM,
};
pub use reader::{summarize_certificate, CertificateSummary};
pub use validate::{ensure_base_name, ensure_extension};
