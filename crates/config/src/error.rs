//! Error types for configuration operations.
//!
//! Any failure here is fatal for the invocation: every command depends on a
//! consistent view of the merged configuration.

use std::path::PathBuf;

/// Errors that can occur while loading, merging or persisting configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("failed to read config file at {path}: {source}")]
    ReadFile {
        /// The path that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a configuration file.
    #[error("failed to write config file at {path}: {source}")]
    WriteFile {
        /// The path that could not be written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A configuration file contains malformed JSON.
    #[error("failed to parse config file at {path}: {source}")]
    Parse {
        /// The file that failed to parse.
        path: PathBuf,
        /// The parser error.
        #[source]
        source: serde_json5::Error,
    },

    /// The packaged default configuration is malformed.
    #[error("failed to parse packaged default config: {0}")]
    ParseDefault(#[source] serde_json5::Error),

    /// A configuration file parsed, but its top level is not a JSON object.
    #[error("config file at {path} must contain a JSON object")]
    NotAnObject {
        /// The offending file.
        path: PathBuf,
    },

    /// Failed to serialize configuration to JSON.
    #[error("failed to serialize config: {0}")]
    SerializeJson(#[from] serde_json::Error),

    /// A dotted key path was empty or contained an empty segment.
    #[error("invalid config key path: {0:?}")]
    InvalidKeyPath(String),

    /// Failed to determine home directory.
    #[error("could not determine home directory")]
    NoHomeDirectory,
}

/// A specialized Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
