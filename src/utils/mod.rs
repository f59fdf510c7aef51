//! Utility modules for keyring-pem
//!
//! This module contains error types, the write-once artifact helper and
//! the password wrapper.

pub mod error;
pub mod fs;
pub mod secret;

pub use error::{ConfigError, ExportError, Result, StoreError};
pub use secret::Password;
