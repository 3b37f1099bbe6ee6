//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::TplcConfig;
use std::path::Path;

/// Name of the configuration file looked up in a configuration directory.
pub const CONFIG_FILE_NAME: &str = "tplc.toml";

/// Loads and validates a `tplc.toml` configuration from a configuration directory.
///
/// Reads `<config_dir>/tplc.toml`, parses it, and validates field values.
pub fn load_config(config_dir: &Path) -> Result<TplcConfig, ConfigError> {
    let config_path = config_dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a `tplc.toml` configuration from a string.
///
/// Useful for testing without filesystem dependencies.
pub fn load_config_from_str(content: &str) -> Result<TplcConfig, ConfigError> {
    let config: TplcConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Validates that configuration values are usable.
fn validate_config(config: &TplcConfig) -> Result<(), ConfigError> {
    validate_extension("builder.source_extension", &config.builder.source_extension)?;
    validate_extension(
        "builder.artifact_extension",
        &config.builder.artifact_extension,
    )?;
    if config.builder.source_extension == config.builder.artifact_extension {
        return Err(ConfigError::ValidationError(
            "builder.source_extension and builder.artifact_extension must differ".to_string(),
        ));
    }
    if config.workspace.build_dir.is_empty() {
        return Err(ConfigError::MissingField("workspace.build_dir".to_string()));
    }
    if let Some(command) = &config.compiler.command {
        if command.first().is_none_or(|program| program.is_empty()) {
            return Err(ConfigError::MissingField("compiler.command".to_string()));
        }
    }
    Ok(())
}

fn validate_extension(field: &str, ext: &str) -> Result<(), ConfigError> {
    if ext.is_empty() {
        return Err(ConfigError::MissingField(field.to_string()));
    }
    if ext.starts_with('.') || ext.contains(['/', '\\']) {
        return Err(ConfigError::ValidationError(format!(
            "{field} must be a bare extension such as \"jrxml\", got \"{ext}\""
        )));
    }
    Ok(())
}
