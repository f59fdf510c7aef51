//! Configuration module for keyring-pem
//!
//! Handles loading export settings from TOML files.

pub mod settings;

pub use settings::{ExportSettings, Settings};

use crate::utils::ConfigError;
use std::path::Path;

/// Load settings from `path`, or from the default location when `None`
pub fn load_config(path: Option<&Path>) -> Result<Settings, ConfigError> {
    match path {
        Some(path) => Settings::load_from_file(path),
        None => Settings::load_default(),
    }
}
