//! Error types for configuration discovery and parsing.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while discovering, parsing, or writing configuration.
///
/// Filesystem unavailability (missing file, permission denied, not a file)
/// is handled internally during discovery and never surfaces from the read
/// paths; only genuinely broken configuration does.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Every known format was tried and none produced a mapping.
    #[error("bad configuration file: {path}")]
    BadConfig {
        /// The offending file.
        path: PathBuf,
    },

    /// An rc-file override variable (`<PROJECT>RC`) names a missing file.
    #[error("rc file from ${var} not found: {path}")]
    RcFileMissing {
        /// The environment variable that was set.
        var: String,
        /// The path it pointed at.
        path: PathBuf,
    },

    /// A file parsed but its requested section is not a mapping.
    #[error("configuration in {path} is not a mapping")]
    NotAMapping {
        /// The offending file.
        path: PathBuf,
    },

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("toml parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("toml serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("ini parse error: {0}")]
    Ini(#[from] ini::ParseError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
