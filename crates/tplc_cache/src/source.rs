//! Report sources and the artifact paths they compile to.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use tplc_config::paths::is_contained;

use crate::error::CacheError;

/// A report template source discovered on disk.
///
/// Identity is the absolute path. The modification time is captured once,
/// when the source is discovered, and never refreshed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
    modified: SystemTime,
    containment_root: PathBuf,
}

impl SourceFile {
    /// Reads the modification time of `path` and checks that it lies within
    /// `containment_root`.
    ///
    /// Both the path as given and the file it resolves to must be contained,
    /// so a symlink pointing outside the root is rejected.
    pub fn from_path(
        path: impl Into<PathBuf>,
        containment_root: impl Into<PathBuf>,
    ) -> Result<Self, CacheError> {
        let path = path.into();
        let containment_root = containment_root.into();
        if !is_contained(&path, &containment_root) {
            return Err(CacheError::Configuration {
                path,
                root: containment_root,
            });
        }
        let resolved = dunce::canonicalize(&path).map_err(CacheError::io(&path))?;
        let canonical_root =
            dunce::canonicalize(&containment_root).unwrap_or_else(|_| containment_root.clone());
        if !is_contained(&resolved, &canonical_root) {
            return Err(CacheError::Configuration {
                path,
                root: containment_root,
            });
        }
        let modified = std::fs::metadata(&path)
            .and_then(|meta| meta.modified())
            .map_err(CacheError::io(&path))?;
        Ok(Self {
            path,
            modified,
            containment_root,
        })
    }

    /// Absolute path of the source.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Modification time observed at discovery.
    pub fn modified(&self) -> SystemTime {
        self.modified
    }

    /// The directory this source is required to stay within.
    pub fn containment_root(&self) -> &Path {
        &self.containment_root
    }
}

/// The canonical location of a compiled artifact.
///
/// Construction fails unless the path lies within its containment root, so
/// every `ArtifactPath` in circulation is safe to write to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPath {
    path: PathBuf,
    #[serde(skip)]
    containment_root: PathBuf,
}

impl ArtifactPath {
    /// Creates an artifact path, enforcing containment within `containment_root`.
    pub fn new(
        path: impl Into<PathBuf>,
        containment_root: impl Into<PathBuf>,
    ) -> Result<Self, CacheError> {
        let path = path.into();
        let containment_root = containment_root.into();
        if !is_contained(&path, &containment_root) || path == containment_root {
            return Err(CacheError::Configuration {
                path,
                root: containment_root,
            });
        }
        Ok(Self {
            path,
            containment_root,
        })
    }

    /// Absolute path of the artifact.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The directory this artifact is required to stay within.
    pub fn containment_root(&self) -> &Path {
        &self.containment_root
    }

    /// Current modification time of the artifact, or `None` if it does not
    /// exist.
    ///
    /// Existence and timestamp come from a single metadata call, so an
    /// artifact deleted concurrently simply reads as absent.
    pub fn modified(&self) -> Option<SystemTime> {
        std::fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .ok()
    }
}
