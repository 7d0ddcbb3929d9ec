use std::ffi::OsStr;
use std::fs::read_to_string;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::diff::DiffOptions;

/// Settings for a diff report. Every key is optional in the TOML file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    /// Sequence name used in the variant labels.
    pub sequence: String,
    /// Added to every reported position.
    pub offset: usize,
    /// Aligner budget in milliseconds.
    pub timeout_ms: Option<u64>,
    /// Report VCF-style left-padded alleles.
    pub pad_left: bool,
    /// Upper-case both sequences before diffing.
    pub uppercase: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            sequence: String::from("seq"),
            offset: 0,
            timeout_ms: None,
            pad_left: false,
            uppercase: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing or invalid file extension in report config file. It must be `toml`")]
    InvalidFileType,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl ReportConfig {
    ///
    /// Load a report config from a `.toml` file.
    /// # Arguments
    /// * `path` - path to the config file
    ///
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        match path.extension().and_then(OsStr::to_str) {
            Some("toml") => ReportConfig::try_from(path),
            _ => Err(ConfigError::InvalidFileType),
        }
    }

    pub fn diff_options(&self) -> DiffOptions {
        DiffOptions {
            timeout: self.timeout_ms.map(Duration::from_millis),
        }
    }
}

impl TryFrom<&Path> for ReportConfig {
    type Error = ConfigError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config = toml::from_str(&toml_str)?;
        Ok(config)
    }
}
