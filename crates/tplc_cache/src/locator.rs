//! Source discovery below a search directory.

use std::fs::FileType;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tplc_config::paths::is_contained;
use tracing::debug;

use crate::error::CacheError;
use crate::source::SourceFile;

/// Finds report sources by file extension.
///
/// Each call to [`SourceLocator::locate`] walks the tree again; nothing is
/// cached between calls.
#[derive(Debug, Clone)]
pub struct SourceLocator {
    search_dir: PathBuf,
    containment_root: PathBuf,
    suffix: String,
    recursive: bool,
}

impl SourceLocator {
    /// Creates a locator for files ending in `.<extension>` below `search_dir`.
    ///
    /// Subdirectories are walked by default; see [`SourceLocator::recursive`].
    pub fn new(
        search_dir: impl Into<PathBuf>,
        containment_root: impl Into<PathBuf>,
        extension: &str,
    ) -> Self {
        Self {
            search_dir: search_dir.into(),
            containment_root: containment_root.into(),
            suffix: format!(".{extension}"),
            recursive: true,
        }
    }

    /// Sets whether subdirectories are walked. When `false` only the direct
    /// children of the search directory are considered.
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// The directory being searched.
    pub fn search_dir(&self) -> &Path {
        &self.search_dir
    }

    /// The directory no source may lie outside of.
    pub fn containment_root(&self) -> &Path {
        &self.containment_root
    }

    /// Returns `true` if `path` has a source file name.
    ///
    /// Names are compared as raw bytes, so non-UTF-8 names still match.
    pub fn matches(&self, path: &Path) -> bool {
        let suffix = self.suffix.as_bytes();
        path.file_name()
            .map(|name| name.as_encoded_bytes())
            .is_some_and(|name| name.len() > suffix.len() && name.ends_with(suffix))
    }

    /// Starts a walk of the search directory.
    ///
    /// Containment is checked here, before anything is read. The returned
    /// iterator is lazy: each directory is listed when the walk reaches it,
    /// and entries are visited in lexicographic order.
    pub fn locate(&self) -> Result<SourceIter, CacheError> {
        if !is_contained(&self.search_dir, &self.containment_root) {
            return Err(CacheError::Configuration {
                path: self.search_dir.clone(),
                root: self.containment_root.clone(),
            });
        }
        Ok(SourceIter {
            locator: self.clone(),
            pending_root: Some(self.search_dir.clone()),
            frames: Vec::new(),
        })
    }
}

/// Lazy depth-first walk yielded by [`SourceLocator::locate`].
pub struct SourceIter {
    locator: SourceLocator,
    pending_root: Option<PathBuf>,
    /// Sorted, not yet visited entries of each open directory.
    frames: Vec<std::vec::IntoIter<(PathBuf, FileType)>>,
}

impl SourceIter {
    fn open(&mut self, dir: &Path) -> Result<(), CacheError> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(CacheError::io(dir))? {
            let entry = entry.map_err(CacheError::io(dir))?;
            let file_type = entry.file_type().map_err(CacheError::io(entry.path()))?;
            entries.push((entry.path(), file_type));
        }
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        self.frames.push(entries.into_iter());
        Ok(())
    }

    /// Symlinks count as files when they resolve to one; symlinked
    /// directories are not followed. Where the link points is checked
    /// against the containment root by [`SourceFile::from_path`].
    fn is_file(path: &Path, file_type: FileType) -> bool {
        if file_type.is_symlink() {
            std::fs::metadata(path).is_ok_and(|meta| meta.is_file())
        } else {
            file_type.is_file()
        }
    }
}

impl Iterator for SourceIter {
    type Item = Result<SourceFile, CacheError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.pending_root.take() {
            if let Err(err) = self.open(&root) {
                return Some(Err(err));
            }
        }

        loop {
            let frame = self.frames.last_mut()?;
            let Some((path, file_type)) = frame.next() else {
                self.frames.pop();
                continue;
            };

            if file_type.is_dir() {
                if self.locator.recursive {
                    if let Err(err) = self.open(&path) {
                        return Some(Err(err));
                    }
                }
                continue;
            }

            if !self.locator.matches(&path) || !Self::is_file(&path, file_type) {
                continue;
            }

            match SourceFile::from_path(&path, &self.locator.containment_root) {
                Ok(source) => return Some(Ok(source)),
                Err(CacheError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "source vanished during walk, skipping");
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
