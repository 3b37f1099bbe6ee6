//! Configuration types deserialized from `tplc.toml`.

use serde::Deserialize;

/// Default extension of report template sources.
pub const DEFAULT_SOURCE_EXTENSION: &str = "jrxml";

/// Default extension of compiled report artifacts.
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "jasper";

/// Default build root, relative to the configuration directory.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// The top-level configuration parsed from `tplc.toml`.
///
/// Every section is optional; an empty file describes a workspace that
/// compiles every `.jrxml` file below the configuration directory into
/// `build/`.
#[derive(Debug, Default, Deserialize)]
pub struct TplcConfig {
    /// Workspace layout (build output location).
    #[serde(default)]
    pub workspace: WorkspaceConfig,
    /// Report builder settings (search directory, extensions).
    #[serde(default)]
    pub builder: BuilderConfig,
    /// External compiler invocation.
    #[serde(default)]
    pub compiler: CompilerConfig,
}

/// Where compiled artifacts are written.
#[derive(Debug, Deserialize)]
pub struct WorkspaceConfig {
    /// Build root. Relative paths are resolved against the configuration
    /// directory.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            build_dir: default_build_dir(),
        }
    }
}

/// Which sources are located and how their artifacts are named.
#[derive(Debug, Deserialize)]
pub struct BuilderConfig {
    /// Explicit search directory, relative to the configuration directory.
    /// When absent the configuration directory itself is searched.
    #[serde(default)]
    pub directory: Option<String>,
    /// File extension (without the dot) identifying report sources.
    #[serde(default = "default_source_extension")]
    pub source_extension: String,
    /// File extension (without the dot) given to compiled artifacts.
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,
    /// Whether subdirectories of the search directory are walked.
    #[serde(default = "default_recursive")]
    pub recursive: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            directory: None,
            source_extension: default_source_extension(),
            artifact_extension: default_artifact_extension(),
            recursive: default_recursive(),
        }
    }
}

/// The external compile command.
///
/// `command` is an argv template; the placeholders `{source}` and `{output}`
/// are replaced with the absolute source path and the temporary output path.
#[derive(Debug, Default, Deserialize)]
pub struct CompilerConfig {
    /// Program followed by its arguments.
    #[serde(default)]
    pub command: Option<Vec<String>>,
}

fn default_build_dir() -> String {
    DEFAULT_BUILD_DIR.to_string()
}

fn default_source_extension() -> String {
    DEFAULT_SOURCE_EXTENSION.to_string()
}

fn default_artifact_extension() -> String {
    DEFAULT_ARTIFACT_EXTENSION.to_string()
}

fn default_recursive() -> bool {
    true
}
