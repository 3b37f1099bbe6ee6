//! `tplc status` — list sources and the freshness of their artifacts.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use tplc_cache::{Freshness, Orchestrator};

use crate::project::load_workspace;
use crate::{GlobalArgs, ReportFormat, StatusArgs};

/// One line of the status listing.
#[derive(Debug, Serialize)]
struct StatusEntry {
    source: PathBuf,
    artifact: PathBuf,
    status: &'static str,
}

/// Runs the `tplc status` command.
///
/// Nothing is compiled or written. Returns exit code 0 when every artifact
/// is fresh and 1 when at least one needs a build.
pub fn run(args: &StatusArgs, global: &GlobalArgs) -> Result<i32> {
    let workspace = load_workspace(global, args.dir.as_deref())?;
    let statuses = Orchestrator::from_workspace(&workspace).status()?;

    let entries: Vec<StatusEntry> = statuses
        .iter()
        .map(|s| StatusEntry {
            source: s.source.path().to_path_buf(),
            artifact: s.artifact.path().to_path_buf(),
            status: s.freshness.as_str(),
        })
        .collect();

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
        ReportFormat::Text => {
            for entry in &entries {
                let name = entry
                    .source
                    .strip_prefix(workspace.root())
                    .unwrap_or(&entry.source);
                println!("{:>8} {}", entry.status, name.display());
            }
        }
    }

    let stale = statuses
        .iter()
        .filter(|s| s.freshness != Freshness::Fresh)
        .count();
    if stale > 0 && !global.quiet {
        eprintln!("   {stale} of {} report(s) need a build", statuses.len());
    }
    Ok(if stale == 0 { 0 } else { 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (tempfile::TempDir, GlobalArgs) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tplc.toml"), "").unwrap();
        std::fs::write(dir.path().join("a.jrxml"), "<jasperReport/>").unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(dir.path().to_path_buf()),
        };
        (dir, global)
    }

    #[test]
    fn missing_artifact_needs_build() {
        let (_dir, global) = setup();
        let args = StatusArgs {
            dir: None,
            format: ReportFormat::Json,
        };
        assert_eq!(run(&args, &global).unwrap(), 1);
    }

    #[test]
    fn fresh_artifact_is_clean() {
        let (dir, global) = setup();
        std::fs::create_dir_all(dir.path().join("build")).unwrap();
        std::fs::write(dir.path().join("build").join("a.jasper"), b"compiled").unwrap();
        let args = StatusArgs {
            dir: None,
            format: ReportFormat::Text,
        };
        assert_eq!(run(&args, &global).unwrap(), 0);
    }
}
