//! Mapping sources to their canonical artifact paths.

use tplc_config::Workspace;

use crate::error::CacheError;
use crate::source::{ArtifactPath, SourceFile};

/// Computes the canonical artifact path for a source.
///
/// Must return the same path for the same source on every call.
pub trait ArtifactResolver {
    /// Resolves the artifact path for `source`.
    fn resolve(&self, source: &SourceFile) -> Result<ArtifactPath, CacheError>;
}

impl ArtifactResolver for Workspace {
    fn resolve(&self, source: &SourceFile) -> Result<ArtifactPath, CacheError> {
        let build_file = self
            .build_file_for(source.path())
            .map_err(|error| CacheError::from_config(source.path(), error))?;
        ArtifactPath::new(build_file, self.build_dir())
    }
}

impl<F> ArtifactResolver for F
where
    F: Fn(&SourceFile) -> Result<ArtifactPath, CacheError>,
{
    fn resolve(&self, source: &SourceFile) -> Result<ArtifactPath, CacheError> {
        self(source)
    }
}
