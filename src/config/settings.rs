//! Application settings configuration
//!
//! Defines where export artifacts are written and how the unencrypted
//! private key is protected.

use crate::cert_ops::{validate::PEM_EXTENSION, DEFAULT_KEY_PEM};
use crate::utils::fs::PRIVATE_FILE_MODE;
use crate::utils::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Export pipeline settings
#[derive(Debug, Clone, Deserialize)]
pub struct ExportSettings {
    /// Directory that receives all four artifacts
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// File name of the extracted private key
    #[serde(default = "default_key_pem_name")]
    pub key_pem_name: String,
    /// Unix permission bits for the extracted private key
    #[serde(default = "default_key_file_mode")]
    pub key_file_mode: u32,
    /// Remove the artifacts of a failed run
    #[serde(default)]
    pub rollback_on_failure: bool,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_key_pem_name() -> String {
    DEFAULT_KEY_PEM.to_string()
}

fn default_key_file_mode() -> u32 {
    PRIVATE_FILE_MODE
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            key_pem_name: default_key_pem_name(),
            key_file_mode: default_key_file_mode(),
            rollback_on_failure: false,
        }
    }
}

impl ExportSettings {
    /// Path of the extracted private key
    pub fn key_pem_path(&self) -> PathBuf {
        self.output_dir.join(&self.key_pem_name)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let bare_name = Path::new(&self.key_pem_name)
            .file_name()
            .is_some_and(|name| name == self.key_pem_name.as_str());
        if !bare_name {
            return Err(ConfigError::InvalidValue {
                key: "export.key_pem_name".to_string(),
                message: "must be a file name without directories".to_string(),
            });
        }

        if !self.key_pem_name.ends_with(&format!(".{}", PEM_EXTENSION)) {
            return Err(ConfigError::InvalidValue {
                key: "export.key_pem_name".to_string(),
                message: format!("must end with .{}", PEM_EXTENSION),
            });
        }

        if self.key_file_mode > 0o777 {
            return Err(ConfigError::InvalidValue {
                key: "export.key_file_mode".to_string(),
                message: format!("{:o} is not a permission mode", self.key_file_mode),
            });
        }

        Ok(())
    }
}

/// Application settings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub export: ExportSettings,
}

impl Settings {
    /// Load settings from the default config file
    pub fn load_default() -> Result<Self, ConfigError> {
        let config_path = Path::new("config/default.toml");
        if config_path.exists() {
            Self::load_from_file(config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load settings from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        Self::from_toml(&content)
    }

    /// Parse and validate settings from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        settings.export.validate()?;
        Ok(settings)
    }
}
