//! Locating and loading the workspace configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tplc_config::{Workspace, CONFIG_FILE_NAME};

use crate::GlobalArgs;

/// Walks up from `start` looking for the nearest directory containing `tplc.toml`.
pub fn find_config_dir(start: &Path) -> Result<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(CONFIG_FILE_NAME).exists() {
            return Ok(current);
        }
        if !current.pop() {
            anyhow::bail!(
                "could not find {CONFIG_FILE_NAME} in {} or any parent directory",
                start.display()
            );
        }
    }
}

/// Resolves the configuration directory from global CLI args.
///
/// If `--config` is specified, uses that path (file → parent dir, dir → itself).
/// Otherwise walks up from the current directory looking for `tplc.toml`.
pub fn resolve_config_dir(global: &GlobalArgs) -> Result<PathBuf> {
    match &global.config {
        Some(path) if path.is_file() => Ok(path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))),
        Some(path) => Ok(path.clone()),
        None => find_config_dir(&std::env::current_dir()?),
    }
}

/// Loads the workspace, optionally overriding the search directory.
pub fn load_workspace(global: &GlobalArgs, dir: Option<&str>) -> Result<Workspace> {
    let config_dir = resolve_config_dir(global)?;
    let config = tplc_config::load_config(&config_dir)
        .with_context(|| format!("loading {}", config_dir.join(CONFIG_FILE_NAME).display()))?;
    let mut workspace = Workspace::new(&config_dir, config)?;
    if let Some(dir) = dir {
        workspace.set_directory(dir)?;
    }
    Ok(workspace)
}
