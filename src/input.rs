//! Loading raw sequence text from files, stdin, or the command line.
//!
//! This is the container-level validation done before any parsing: file
//! extension allow-list, payload size limit and UTF-8 decoding.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::LimitsConfig;

/// Errors that can occur while reading an input.
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Unsupported file type: {path} (allowed: {allowed})")]
    UnsupportedExtension { path: String, allowed: String },

    #[error("{path} is too large ({size} bytes, limit {limit} bytes)")]
    TooLarge { path: String, size: u64, limit: u64 },

    #[error("{path} is not valid UTF-8 text")]
    InvalidUtf8 { path: String },

    #[error("Two sequences are required ({path} is empty)")]
    Empty { path: String },

    #[error("Only one input can be read from stdin")]
    StdinUsedTwice,
}

/// Where a raw sequence comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A sequence file on disk
    File(PathBuf),
    /// Standard input (`-` on the command line)
    Stdin,
    /// Literal sequence text
    Raw(String),
}

impl InputSource {
    /// Interprets a command-line argument. With `raw`, the argument itself is
    /// the sequence text.
    pub fn from_arg(arg: &str, raw: bool) -> Self {
        if raw {
            InputSource::Raw(arg.to_string())
        } else if arg == "-" {
            InputSource::Stdin
        } else {
            InputSource::File(PathBuf::from(arg))
        }
    }

    /// Short name for messages.
    pub fn label(&self) -> String {
        match self {
            InputSource::File(path) => path.display().to_string(),
            InputSource::Stdin => "<stdin>".to_string(),
            InputSource::Raw(_) => "<argument>".to_string(),
        }
    }
}

/// Checks a file name against the extension allow-list.
pub fn has_allowed_extension<P: AsRef<Path>>(path: P, allowed: &[String]) -> bool {
    path.as_ref()
        .extension()
        .and_then(OsStr::to_str)
        .map(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Reads the text of one input, enforcing the configured limits.
pub fn read_input(source: &InputSource, limits: &LimitsConfig) -> Result<String, InputError> {
    let label = source.label();
    let content = match source {
        InputSource::Raw(text) => text.clone(),
        InputSource::Stdin => read_limited(io::stdin().lock(), &label, limits.max_payload_bytes)?,
        InputSource::File(path) => {
            if !has_allowed_extension(path, &limits.allowed_extensions) {
                return Err(InputError::UnsupportedExtension {
                    path: label,
                    allowed: limits.allowed_extensions.join(", "),
                });
            }
            let io_err = |source| InputError::IoError {
                path: label.clone(),
                source,
            };
            let file = File::open(path).map_err(io_err)?;
            let size = file.metadata().map_err(io_err)?.len();
            if size > limits.max_payload_bytes {
                return Err(InputError::TooLarge {
                    path: label,
                    size,
                    limit: limits.max_payload_bytes,
                });
            }
            read_limited(BufReader::new(file), &label, limits.max_payload_bytes)?
        }
    };

    if content.trim().is_empty() {
        return Err(InputError::Empty { path: label });
    }
    Ok(content)
}

/// Reads both inputs of a comparison.
pub fn read_pair(
    first: &InputSource,
    second: &InputSource,
    limits: &LimitsConfig,
) -> Result<(String, String), InputError> {
    if *first == InputSource::Stdin && *second == InputSource::Stdin {
        return Err(InputError::StdinUsedTwice);
    }
    Ok((read_input(first, limits)?, read_input(second, limits)?))
}

/// Reads at most `limit` bytes and decodes them as UTF-8.
fn read_limited<R: Read>(reader: R, label: &str, limit: u64) -> Result<String, InputError> {
    let mut bytes = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut bytes)
        .map_err(|source| InputError::IoError {
            path: label.to_string(),
            source,
        })?;
    if bytes.len() as u64 > limit {
        return Err(InputError::TooLarge {
            path: label.to_string(),
            size: bytes.len() as u64,
            limit,
        });
    }
    String::from_utf8(bytes).map_err(|_| InputError::InvalidUtf8 {
        path: label.to_string(),
    })
}
