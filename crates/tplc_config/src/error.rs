//! Error types for configuration loading and validation.

use std::path::PathBuf;

/// Errors that can occur when loading or validating a `tplc.toml` configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading the configuration file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing from the configuration.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The explicitly configured search directory does not exist.
    #[error("directory does not exist: {path} (configured value is relative to {base})")]
    MissingDirectory {
        /// The resolved directory path.
        path: PathBuf,
        /// The configuration directory the value was resolved against.
        base: PathBuf,
    },

    /// A path resolved outside of the directory it must be contained in.
    #[error("{path} is not contained in {root}")]
    Containment {
        /// The offending path.
        path: PathBuf,
        /// The containment root it escaped.
        root: PathBuf,
    },
}
