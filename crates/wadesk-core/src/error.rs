//! Error types for wadesk core.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A stored or user-supplied name matched none of an enum's variants.
    #[error("Unknown {kind}: '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

impl Error {
    pub(crate) fn unknown(kind: &'static str, value: &str) -> Self {
        Self::UnknownVariant {
            kind,
            value: value.to_string(),
        }
    }
}

/// Problems loading, writing or validating the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("JSON5 parse error: {0}")]
    Json5(String),

    #[error("Could not serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Every validation problem, joined with `; `.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No home directory; set WADESK_HOME")]
    NoHomeDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
