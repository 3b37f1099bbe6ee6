//! Error types for locating, compiling, and publishing artifacts.

use std::path::PathBuf;

use tplc_config::ConfigError;

/// Boxed cause attached to a [`CompileError`].
type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced by the cache.
///
/// Every variant aborts the current run. The only failure the cache
/// recovers from locally is removing a leftover temporary file, which is
/// logged and otherwise ignored.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// A search directory, source, or artifact path lies outside its
    /// containment root. Raised before any traversal or filesystem mutation.
    #[error("all files and directories must be contained in {root}: {path} is not")]
    Configuration {
        /// The offending path.
        path: PathBuf,
        /// The containment root it escaped.
        root: PathBuf,
    },

    /// The external compiler rejected a source.
    #[error("failed to compile {path} after {elapsed_ms}ms: {error}")]
    Compile {
        /// The source that failed to compile.
        path: PathBuf,
        /// Time spent in the compiler before it failed.
        elapsed_ms: u64,
        /// The compiler's diagnostic.
        #[source]
        error: CompileError,
    },

    /// An I/O error occurred while listing sources, creating the temporary
    /// file, or renaming it into place.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The build-path resolver could not map a source to an artifact path.
    #[error("cannot resolve build file for {path}: {error}")]
    Resolve {
        /// The source being resolved.
        path: PathBuf,
        /// The resolver's error.
        #[source]
        error: ConfigError,
    },
}

impl CacheError {
    /// Wraps an I/O error with the path it occurred at.
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| CacheError::Io { path, source }
    }

    /// Converts a resolver error for `path`, keeping containment violations
    /// distinguishable from other resolution failures.
    pub fn from_config(path: impl Into<PathBuf>, error: ConfigError) -> Self {
        match error {
            ConfigError::Containment { path, root } => CacheError::Configuration { path, root },
            error => CacheError::Resolve {
                path: path.into(),
                error,
            },
        }
    }
}

/// The external compiler failed on a source.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CompileError {
    /// Human-readable diagnostic from the compiler.
    pub message: String,
    /// Underlying cause, if the compiler surfaced one.
    #[source]
    pub cause: Option<BoxedCause>,
}

impl CompileError {
    /// Creates a compile error carrying only a diagnostic message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a compile error wrapping an underlying cause.
    pub fn with_cause(
        message: impl Into<String>,
        cause: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }
}
