//! Workspace resolution: turning a parsed configuration into absolute paths.
//!
//! The configuration directory is the containment root for report sources,
//! and the build root is the containment root for compiled artifacts. Both
//! are fixed here, at configuration time, before any source is located.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::paths::{ensure_contained, normalize_lexically};
use crate::types::TplcConfig;

/// A configuration resolved against its configuration directory.
#[derive(Debug, Clone)]
pub struct Workspace {
    /// Canonical configuration directory; no source may resolve outside it.
    root: PathBuf,
    /// Directory searched for report sources.
    search_dir: PathBuf,
    /// Root of the compiled artifact tree.
    build_dir: PathBuf,
    /// Extension identifying sources, without the dot.
    source_extension: String,
    /// Extension given to artifacts, without the dot.
    artifact_extension: String,
    /// Whether subdirectories of the search directory are walked.
    recursive: bool,
    /// External compile command template, if configured.
    compiler_command: Option<Vec<String>>,
}

impl Workspace {
    /// Resolves `config` against `config_dir`.
    ///
    /// Fails if the configuration directory cannot be canonicalized, or if an
    /// explicit `builder.directory` does not exist or lies outside the
    /// configuration directory.
    pub fn new(config_dir: &Path, config: TplcConfig) -> Result<Self, ConfigError> {
        let root = dunce::canonicalize(config_dir)?;

        let build_dir = Path::new(&config.workspace.build_dir);
        let build_dir = if build_dir.is_absolute() {
            normalize_lexically(build_dir)
        } else {
            normalize_lexically(&root.join(build_dir))
        };

        let mut workspace = Self {
            search_dir: root.clone(),
            root,
            build_dir,
            source_extension: config.builder.source_extension,
            artifact_extension: config.builder.artifact_extension,
            recursive: config.builder.recursive,
            compiler_command: config.compiler.command,
        };
        if let Some(directory) = &config.builder.directory {
            workspace.set_directory(directory)?;
        }
        Ok(workspace)
    }

    /// Sets the search directory, relative to the configuration directory.
    ///
    /// The directory must exist and must be contained in the configuration
    /// directory once symlinks and `..` are resolved.
    pub fn set_directory(&mut self, directory: &str) -> Result<(), ConfigError> {
        let candidate = self.root.join(directory);
        if !candidate.is_dir() {
            return Err(ConfigError::MissingDirectory {
                path: candidate,
                base: self.root.clone(),
            });
        }
        let resolved = dunce::canonicalize(&candidate)?;
        ensure_contained(&resolved, &self.root)?;
        self.search_dir = resolved;
        Ok(())
    }

    /// Returns the compiled artifact path for a source file.
    ///
    /// The source's directory relative to the configuration directory is
    /// mirrored under the build root and its extension is replaced, so
    /// `<root>/a/b.jrxml` maps to `<build>/a/b.jasper`.
    pub fn build_file_for(&self, source: &Path) -> Result<PathBuf, ConfigError> {
        let source = normalize_lexically(source);
        ensure_contained(&source, &self.root)?;

        let relative = source
            .strip_prefix(&self.root)
            .map_err(|_| ConfigError::Containment {
                path: source.clone(),
                root: self.root.clone(),
            })?;
        let stem = relative.file_stem().ok_or_else(|| {
            ConfigError::ValidationError(format!("{} has no file name", source.display()))
        })?;

        let mut file_name = stem.to_os_string();
        file_name.push(".");
        file_name.push(&self.artifact_extension);

        let mut build_file = self.build_dir.clone();
        if let Some(parent) = relative.parent() {
            build_file.push(parent);
        }
        build_file.push(file_name);

        let build_file = normalize_lexically(&build_file);
        ensure_contained(&build_file, &self.build_dir)?;
        Ok(build_file)
    }

    /// The containment root for sources (the canonical configuration directory).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory searched for sources.
    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    /// The root of the compiled artifact tree.
    pub fn build_dir(&self) -> &Path {
        &self.build_dir
    }

    /// Extension identifying report sources.
    pub fn source_extension(&self) -> &str {
        &self.source_extension
    }

    /// Extension given to compiled artifacts.
    pub fn artifact_extension(&self) -> &str {
        &self.artifact_extension
    }

    /// Whether subdirectories of the search directory are walked.
    pub fn recursive(&self) -> bool {
        self.recursive
    }

    /// The external compile command template, if one is configured.
    pub fn compiler_command(&self) -> Option<&[String]> {
        self.compiler_command.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    fn workspace(dir: &Path, toml: &str) -> Result<Workspace, ConfigError> {
        Workspace::new(dir, load_config_from_str(toml)?)
    }

    #[test]
    fn defaults_search_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path(), "").unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        assert_eq!(ws.root(), root);
        assert_eq!(ws.search_dir(), root);
        assert_eq!(ws.build_dir(), root.join("build"));
        assert!(ws.recursive());
    }

    #[test]
    fn explicit_directory_is_resolved() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("reports")).unwrap();
        let ws = workspace(dir.path(), "[builder]\ndirectory = \"reports\"\n").unwrap();
        let root = dunce::canonicalize(dir.path()).unwrap();
        assert_eq!(ws.search_dir(), root.join("reports"));
    }

    #[test]
    fn missing_directory_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = workspace(dir.path(), "[builder]\ndirectory = \"nope\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingDirectory { .. }));
    }

    #[test]
    fn directory_outside_root_errors() {
        let outer = tempfile::tempdir().unwrap();
        let config_dir = outer.path().join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        std::fs::create_dir_all(outer.path().join("elsewhere")).unwrap();

        let err = workspace(&config_dir, "[builder]\ndirectory = \"../elsewhere\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Containment { .. }));
    }

    #[test]
    fn build_file_mirrors_relative_directory() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path(), "").unwrap();
        let source = ws.root().join("sub").join("invoice.jrxml");
        let build = ws.build_file_for(&source).unwrap();
        assert_eq!(build, ws.build_dir().join("sub").join("invoice.jasper"));
    }

    #[test]
    fn build_file_for_top_level_source() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path(), "[builder]\nartifact_extension = \"bin\"\n").unwrap();
        let build = ws.build_file_for(&ws.root().join("a.jrxml")).unwrap();
        assert_eq!(build, ws.build_dir().join("a.bin"));
    }

    #[test]
    fn build_file_is_stable() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path(), "").unwrap();
        let source = ws.root().join("a.jrxml");
        assert_eq!(
            ws.build_file_for(&source).unwrap(),
            ws.build_file_for(&source).unwrap()
        );
    }

    #[test]
    fn build_file_for_outside_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path(), "").unwrap();
        let err = ws
            .build_file_for(&ws.root().join("..").join("escape.jrxml"))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Containment { .. }));
    }

    #[test]
    fn absolute_build_dir_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let build = tempfile::tempdir().unwrap();
        let toml = format!(
            "[workspace]\nbuild_dir = {:?}\n",
            build.path().display().to_string()
        );
        let ws = workspace(dir.path(), &toml).unwrap();
        assert_eq!(ws.build_dir(), normalize_lexically(build.path()));
    }
}
