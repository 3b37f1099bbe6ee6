//! Path containment helpers.
//!
//! Containment is decided component-wise on lexically normalized paths, so
//! `/srv/print-other` is not inside `/srv/print` and `/srv/print/../etc`
//! is rejected even when it does not exist yet.

use std::path::{Component, Path, PathBuf};

use crate::error::ConfigError;

/// Resolves `.` and `..` components without touching the filesystem.
///
/// A `..` that would climb above the root (or above the start of a relative
/// path) is kept, which makes the result fail any containment check against
/// a root it was supposed to stay in.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(out.components().next_back(), Some(Component::Normal(_)))
                    && out.pop();
                if !popped {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Returns `true` if `path` is `root` or a descendant of it.
pub fn is_contained(path: &Path, root: &Path) -> bool {
    normalize_lexically(path).starts_with(normalize_lexically(root))
}

/// Fails with [`ConfigError::Containment`] unless `path` lies within `root`.
pub fn ensure_contained(path: &Path, root: &Path) -> Result<(), ConfigError> {
    if is_contained(path, root) {
        Ok(())
    } else {
        Err(ConfigError::Containment {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
        })
    }
}
