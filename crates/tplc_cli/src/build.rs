//! `tplc build` — compile every stale report in the workspace.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tplc_cache::{
    BuildOutcome, BuildStats, CancelSignal, Deadline, NeverCancel, Orchestrator, RunOutcome,
    RunSummary, SourceOutcome,
};
use tplc_config::Workspace;

use crate::compiler::CommandCompiler;
use crate::project::load_workspace;
use crate::{BuildArgs, GlobalArgs, ReportFormat, EXIT_CANCELLED};

/// Runs the `tplc build` command.
///
/// Returns exit code 0 when every artifact is up to date, and
/// [`EXIT_CANCELLED`] when `--timeout` stopped the run early. Compile and
/// I/O failures are returned as errors.
pub fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32> {
    let workspace = load_workspace(global, args.dir.as_deref())?;
    let command = workspace
        .compiler_command()
        .context("no [compiler] command configured in tplc.toml")?;
    let compiler = CommandCompiler::new(command)?;

    let stats = Arc::new(BuildStats::new());
    let orchestrator = Orchestrator::from_workspace(&workspace).with_observer(stats.clone());

    let cancel: Box<dyn CancelSignal> = match args.timeout {
        Some(secs) => Box::new(Deadline::after(Duration::from_secs(secs))),
        None => Box::new(NeverCancel),
    };

    let outcome = if args.files.is_empty() {
        orchestrator.run(&compiler, cancel.as_ref())?
    } else {
        build_files(&orchestrator, &workspace, &args.files, &compiler, cancel.as_ref())?
    };

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&outcome)?),
        ReportFormat::Text if !global.quiet => print_text(&workspace, &outcome, &stats, global.verbose),
        ReportFormat::Text => {}
    }

    Ok(if outcome.is_cancelled() { EXIT_CANCELLED } else { 0 })
}

/// Builds only the named sources, in the order given, checking `cancel`
/// before each one.
fn build_files(
    orchestrator: &Orchestrator<Workspace>,
    workspace: &Workspace,
    files: &[std::path::PathBuf],
    compiler: &CommandCompiler,
    cancel: &dyn CancelSignal,
) -> Result<RunOutcome> {
    let started = std::time::Instant::now();
    let mut summary = RunSummary::default();
    for file in files {
        if cancel.is_cancelled() {
            summary.elapsed_ms = started.elapsed().as_millis() as u64;
            return Ok(RunOutcome::Cancelled(summary));
        }
        let source = dunce::canonicalize(file)
            .with_context(|| format!("resolving {}", file.display()))?;
        if !orchestrator.locator().matches(&source) {
            anyhow::bail!(
                "{} is not a .{} source",
                file.display(),
                workspace.source_extension()
            );
        }
        let outcome = orchestrator.compile_one(&source, compiler)?;
        summary.outcomes.push(SourceOutcome { source, outcome });
    }
    summary.elapsed_ms = started.elapsed().as_millis() as u64;
    Ok(RunOutcome::Completed(summary))
}

fn print_text(workspace: &Workspace, outcome: &RunOutcome, stats: &BuildStats, verbose: bool) {
    let summary = outcome.summary();
    for entry in &summary.outcomes {
        let name = display_relative(&entry.source, workspace.root());
        match &entry.outcome {
            BuildOutcome::Rebuilt {
                artifact,
                duration_ms,
            } => {
                eprintln!("   Compiled {name} ({duration_ms}ms)");
                if verbose {
                    eprintln!("         -> {}", artifact.path().display());
                }
            }
            BuildOutcome::Fresh(_) if verbose => eprintln!("     Fresh {name}"),
            BuildOutcome::Fresh(_) => {}
        }
    }

    if outcome.is_cancelled() {
        eprintln!(
            "   Cancelled after {} report(s); remaining reports were not built",
            summary.outcomes.len()
        );
    } else {
        eprintln!(
            "   Finished {} compiled ({}ms in compiler), {} up to date in {}ms",
            summary.rebuilt(),
            stats.compile_ms(),
            summary.fresh(),
            summary.elapsed_ms
        );
    }
}

fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root).unwrap_or(path).display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn display_relative_strips_root() {
        assert_eq!(
            display_relative(Path::new("/srv/print/sub/a.jrxml"), Path::new("/srv/print")),
            PathBuf::from("sub").join("a.jrxml").display().to_string()
        );
    }

    #[test]
    fn display_relative_keeps_foreign_paths() {
        assert_eq!(
            display_relative(Path::new("/elsewhere/a.jrxml"), Path::new("/srv/print")),
            "/elsewhere/a.jrxml"
        );
    }

    #[cfg(unix)]
    #[test]
    fn build_compiles_and_then_reports_fresh() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tplc.toml"),
            "[compiler]\ncommand = [\"cp\", \"{source}\", \"{output}\"]\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("a.jrxml"), "<jasperReport/>").unwrap();

        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(dir.path().to_path_buf()),
        };
        let args = BuildArgs {
            files: Vec::new(),
            dir: None,
            timeout: None,
            format: ReportFormat::Text,
        };

        assert_eq!(run(&args, &global).unwrap(), 0);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("build").join("a.jasper")).unwrap(),
            "<jasperReport/>"
        );
        assert_eq!(run(&args, &global).unwrap(), 0);
    }

    #[test]
    fn build_without_compiler_command_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tplc.toml"), "").unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(dir.path().to_path_buf()),
        };
        let args = BuildArgs {
            files: Vec::new(),
            dir: None,
            timeout: None,
            format: ReportFormat::Text,
        };
        let err = run(&args, &global).unwrap_err();
        assert!(err.to_string().contains("no [compiler] command"));
    }

    #[cfg(unix)]
    #[test]
    fn zero_timeout_cancels_before_first_report() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tplc.toml"),
            "[compiler]\ncommand = [\"cp\", \"{source}\", \"{output}\"]\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("a.jrxml"), "<jasperReport/>").unwrap();

        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(dir.path().to_path_buf()),
        };
        let args = BuildArgs {
            files: Vec::new(),
            dir: None,
            timeout: Some(0),
            format: ReportFormat::Text,
        };
        assert_eq!(run(&args, &global).unwrap(), EXIT_CANCELLED);
        assert!(!dir.path().join("build").join("a.jasper").exists());
    }

    #[cfg(unix)]
    #[test]
    fn zero_timeout_cancels_named_files_too() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tplc.toml"),
            "[compiler]\ncommand = [\"cp\", \"{source}\", \"{output}\"]\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("a.jrxml"), "<jasperReport/>").unwrap();

        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: Some(dir.path().to_path_buf()),
        };
        let args = BuildArgs {
            files: vec![dir.path().join("a.jrxml")],
            dir: None,
            timeout: Some(0),
            format: ReportFormat::Text,
        };
        assert_eq!(run(&args, &global).unwrap(), EXIT_CANCELLED);
        assert!(!dir.path().join("build").join("a.jasper").exists());
    }
}
