//! Compile-and-install of a single artifact.
//!
//! The compiler writes into a uniquely named temporary file next to the
//! artifact, and the temporary file is renamed over the artifact path once
//! the compile succeeds. Readers of the artifact path see either the old
//! artifact or the complete new one. Two callers racing on the same stale
//! source both compile; the last rename wins, and both outputs are
//! equivalent. No lock is taken.

use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tempfile::{PathPersistError, TempPath};
use tracing::{debug, info, warn};

use crate::error::{CacheError, CompileError};
use crate::freshness;
use crate::observer::{BuildObserver, NoopObserver};
use crate::source::{ArtifactPath, SourceFile};

/// Prefix of temporary files created next to artifacts while compiling.
pub const TEMP_PREFIX: &str = "temp_";

/// Compiles a source into a destination file.
///
/// Implementations must either fully write `dest` and return `Ok`, or
/// return an error; a partially written `dest` is discarded by the caller.
pub trait Compiler {
    /// Compiles `source` into `dest`.
    fn compile(&self, source: &Path, dest: &Path) -> Result<(), CompileError>;
}

impl<F> Compiler for F
where
    F: Fn(&Path, &Path) -> Result<(), CompileError> + ?Sized,
{
    fn compile(&self, source: &Path, dest: &Path) -> Result<(), CompileError> {
        self(source, dest)
    }
}

/// What a publish did for one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildOutcome {
    /// The artifact was already up to date; nothing was written.
    Fresh(ArtifactPath),
    /// The source was compiled and the artifact replaced.
    Rebuilt {
        /// The published artifact.
        artifact: ArtifactPath,
        /// Time spent in the compiler.
        duration_ms: u64,
    },
}

impl BuildOutcome {
    /// The artifact this outcome refers to.
    pub fn artifact(&self) -> &ArtifactPath {
        match self {
            BuildOutcome::Fresh(artifact) => artifact,
            BuildOutcome::Rebuilt { artifact, .. } => artifact,
        }
    }

    /// Returns `true` if the source was compiled.
    pub fn is_rebuilt(&self) -> bool {
        matches!(self, BuildOutcome::Rebuilt { .. })
    }
}

/// Performs the freshness check, compile, and atomic install for a source.
#[derive(Clone)]
pub struct ArtifactPublisher {
    observer: Arc<dyn BuildObserver>,
}

impl Default for ArtifactPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ArtifactPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactPublisher").finish_non_exhaustive()
    }
}

impl ArtifactPublisher {
    /// Creates a publisher that reports to no observer.
    pub fn new() -> Self {
        Self {
            observer: Arc::new(NoopObserver),
        }
    }

    /// Reports compile timings and fresh hits to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn BuildObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// The observer receiving build events.
    pub fn observer(&self) -> &Arc<dyn BuildObserver> {
        &self.observer
    }

    /// Brings `artifact` up to date with `source`.
    ///
    /// Returns [`BuildOutcome::Fresh`] without touching the filesystem when
    /// the artifact is current. Otherwise compiles into a temporary file in
    /// the artifact's directory and renames it into place. On failure the
    /// temporary file is removed and any previous artifact is left as it was.
    pub fn publish<C>(
        &self,
        source: &SourceFile,
        artifact: &ArtifactPath,
        compiler: &C,
    ) -> Result<BuildOutcome, CacheError>
    where
        C: Compiler + ?Sized,
    {
        if !freshness::needs_build(source, artifact) {
            debug!(
                artifact = %artifact.path().display(),
                "destination file is already up to date"
            );
            self.observer.on_fresh(source.path());
            return Ok(BuildOutcome::Fresh(artifact.clone()));
        }

        let temp = create_temp_file(artifact)?;

        info!(source = %source.path().display(), "building report");
        debug!(to = %artifact.path().display(), temp = %temp.display(), "compiling");

        let started = Instant::now();
        let compiled = compiler.compile(source.path(), &temp);
        let elapsed = started.elapsed();
        let elapsed_ms = elapsed.as_millis() as u64;

        if let Err(error) = compiled {
            warn!(
                source = %source.path().display(),
                elapsed_ms,
                error = %error,
                "report failed to compile"
            );
            discard(temp);
            return Err(CacheError::Compile {
                path: source.path().to_path_buf(),
                elapsed_ms,
                error,
            });
        }
        info!(source = %source.path().display(), elapsed_ms, "report built");

        temp.persist(artifact.path())
            .map_err(|PathPersistError { error, path }| {
                discard(path);
                CacheError::Io {
                    path: artifact.path().to_path_buf(),
                    source: error,
                }
            })?;

        self.observer.on_compiled(source.path(), elapsed);
        Ok(BuildOutcome::Rebuilt {
            artifact: artifact.clone(),
            duration_ms: elapsed_ms,
        })
    }
}

/// Creates an empty, closed temporary file beside the artifact.
///
/// The name is `temp_<random>.<artifact extension>`, and the file lives in
/// the artifact's own directory so the final rename never crosses a
/// filesystem boundary.
fn create_temp_file(artifact: &ArtifactPath) -> Result<TempPath, CacheError> {
    let dir = artifact
        .path()
        .parent()
        .ok_or_else(|| CacheError::Configuration {
            path: artifact.path().to_path_buf(),
            root: artifact.containment_root().to_path_buf(),
        })?;
    std::fs::create_dir_all(dir).map_err(CacheError::io(dir))?;

    let suffix = artifact
        .path()
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();

    let file = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(CacheError::io(dir))?;
    Ok(file.into_temp_path())
}

/// Removes a temporary file, logging rather than returning any failure.
fn discard(temp: TempPath) {
    let path = temp.to_path_buf();
    if let Err(err) = temp.close() {
        if err.kind() != ErrorKind::NotFound {
            warn!(path = %path.display(), error = %err, "failed to remove temporary build file");
        }
    }
}
