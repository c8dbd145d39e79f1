//! Configuration handling.
//!
//! Settings come from an optional TOML file; every field has a default so a
//! partial file (or none at all) is fine. Command-line flags override file
//! values in `main`.
//!
//! ```toml
//! [scoring]
//! match_score = 2.0
//! mismatch_score = -1.0
//! gap_open = -0.5
//! gap_extend = -0.1
//!
//! [limits]
//! max_sequence_length = 20000
//! max_payload_bytes = 16777216
//! allowed_extensions = ["fasta", "fa", "txt"]
//!
//! [output]
//! line_width = 60
//! fancy_glyphs = false
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::align::Scoring;

/// Errors that can occur while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid config file: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scoring: Scoring,
    pub limits: LimitsConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Longest sequence accepted by the aligner (unbounded when unset)
    pub max_sequence_length: Option<usize>,

    /// Largest input file accepted, in bytes
    pub max_payload_bytes: u64,

    /// File extensions accepted for sequence files (case-insensitive)
    pub allowed_extensions: Vec<String>,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_sequence_length: None,
            max_payload_bytes: 16 * 1024 * 1024,
            allowed_extensions: vec!["fasta".to_string(), "fa".to_string(), "txt".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Alignment columns per block in the text report
    pub line_width: usize,

    /// Use Unicode glyphs instead of plain ASCII
    pub fancy_glyphs: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            line_width: 60,
            fancy_glyphs: false,
        }
    }
}

impl Config {
    /// Loads and validates a TOML configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses and validates TOML configuration text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that the scoring scheme and limits make sense.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.scoring;
        s.check().map_err(ConfigError::Invalid)?;
        if s.match_score <= 0.0 {
            return Err(ConfigError::Invalid("match_score must be positive".into()));
        }
        if s.mismatch_score > 0.0 {
            return Err(ConfigError::Invalid("mismatch_score must not be positive".into()));
        }
        if s.gap_open > 0.0 || s.gap_extend > 0.0 {
            return Err(ConfigError::Invalid("gap penalties must not be positive".into()));
        }
        if self.limits.max_sequence_length == Some(0) {
            return Err(ConfigError::Invalid("max_sequence_length must be at least 1".into()));
        }
        if self.output.line_width == 0 {
            return Err(ConfigError::Invalid("line_width must be at least 1".into()));
        }
        Ok(())
    }
}
