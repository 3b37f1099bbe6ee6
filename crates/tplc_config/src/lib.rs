//! Parsing and validation of `tplc.toml` workspace configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`TplcConfig`], then resolves it against the configuration directory into a
//! [`Workspace`] that enforces path containment and maps report sources to
//! their compiled build files.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod paths;
pub mod types;
pub mod workspace;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
pub use workspace::Workspace;
