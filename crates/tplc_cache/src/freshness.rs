//! Staleness detection for compiled artifacts.
//!
//! An artifact needs rebuilding when it is missing or when its source was
//! modified strictly later than it. Timestamps are compared at millisecond
//! resolution and a tie counts as fresh, which avoids rebuild loops on
//! filesystems with coarse clocks.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::source::{ArtifactPath, SourceFile};

/// Freshness of an artifact relative to its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The artifact does not exist.
    Missing,
    /// The source is newer than the artifact.
    Stale,
    /// The artifact is at least as new as the source.
    Fresh,
}

impl Freshness {
    /// Classifies a source timestamp against an optional artifact timestamp.
    pub fn classify(source: SystemTime, artifact: Option<SystemTime>) -> Self {
        match artifact {
            None => Freshness::Missing,
            Some(artifact) if epoch_millis(source) > epoch_millis(artifact) => Freshness::Stale,
            Some(_) => Freshness::Fresh,
        }
    }

    /// Returns `true` unless the artifact is fresh.
    pub fn needs_build(self) -> bool {
        self != Freshness::Fresh
    }

    /// Lowercase label used in status listings.
    pub fn as_str(self) -> &'static str {
        match self {
            Freshness::Missing => "missing",
            Freshness::Stale => "stale",
            Freshness::Fresh => "fresh",
        }
    }
}

/// Checks the artifact on disk against `source`.
pub fn check(source: &SourceFile, artifact: &ArtifactPath) -> Freshness {
    Freshness::classify(source.modified(), artifact.modified())
}

/// Returns `true` if `artifact` must be (re)built from `source`.
pub fn needs_build(source: &SourceFile, artifact: &ArtifactPath) -> bool {
    check(source, artifact).needs_build()
}

/// Milliseconds since the Unix epoch, negative for earlier times.
fn epoch_millis(time: SystemTime) -> i128 {
    match time.duration_since(UNIX_EPOCH) {
        Ok(after) => after.as_millis() as i128,
        Err(before) => -(before.duration().as_millis() as i128),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn at(millis: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_millis(millis)
    }

    #[test]
    fn missing_artifact_needs_build() {
        assert_eq!(Freshness::classify(at(100), None), Freshness::Missing);
        assert!(Freshness::Missing.needs_build());
    }

    #[test]
    fn newer_source_is_stale() {
        assert_eq!(Freshness::classify(at(200), Some(at(150))), Freshness::Stale);
    }

    #[test]
    fn older_source_is_fresh() {
        assert_eq!(Freshness::classify(at(100), Some(at(150))), Freshness::Fresh);
    }

    #[test]
    fn equal_timestamps_are_fresh() {
        assert_eq!(Freshness::classify(at(150), Some(at(150))), Freshness::Fresh);
        assert!(!Freshness::Fresh.needs_build());
    }

    #[test]
    fn sub_millisecond_difference_is_fresh() {
        let artifact = at(150);
        let source = artifact + Duration::from_micros(400);
        assert_eq!(Freshness::classify(source, Some(artifact)), Freshness::Fresh);
    }

    #[test]
    fn one_millisecond_newer_is_stale() {
        assert_eq!(Freshness::classify(at(151), Some(at(150))), Freshness::Stale);
    }

    #[test]
    fn labels() {
        assert_eq!(Freshness::Missing.as_str(), "missing");
        assert_eq!(Freshness::Stale.as_str(), "stale");
        assert_eq!(Freshness::Fresh.as_str(), "fresh");
    }

    #[test]
    fn needs_build_reads_artifact_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.jrxml");
        let out = dir.path().join("a.jasper");
        std::fs::write(&src, "<jasperReport/>").unwrap();
        filetime::set_file_mtime(&src, filetime::FileTime::from_unix_time(100, 0)).unwrap();

        let source = SourceFile::from_path(&src, dir.path()).unwrap();
        let artifact = ArtifactPath::new(&out, dir.path()).unwrap();
        assert!(needs_build(&source, &artifact));

        std::fs::write(&out, b"compiled").unwrap();
        filetime::set_file_mtime(&out, filetime::FileTime::from_unix_time(100, 0)).unwrap();
        assert!(!needs_build(&source, &artifact));

        filetime::set_file_mtime(&out, filetime::FileTime::from_unix_time(99, 0)).unwrap();
        assert!(needs_build(&source, &artifact));
    }
}
