//! Driving the locate → check → publish cycle over every source.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tplc_config::Workspace;
use tracing::info;

use crate::cancel::CancelSignal;
use crate::error::CacheError;
use crate::freshness::{self, Freshness};
use crate::locator::SourceLocator;
use crate::observer::BuildObserver;
use crate::publish::{ArtifactPublisher, BuildOutcome, Compiler};
use crate::resolver::ArtifactResolver;
use crate::source::{ArtifactPath, SourceFile};

/// The outcome recorded for one source during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceOutcome {
    /// The source that was processed.
    pub source: PathBuf,
    /// What was done for it.
    pub outcome: BuildOutcome,
}

/// Sources processed by a run, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Per-source outcomes.
    pub outcomes: Vec<SourceOutcome>,
    /// Wall-clock time of the run.
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Number of sources that were compiled.
    pub fn rebuilt(&self) -> usize {
        self.outcomes.iter().filter(|o| o.outcome.is_rebuilt()).count()
    }

    /// Number of sources whose artifact was already fresh.
    pub fn fresh(&self) -> usize {
        self.outcomes.len() - self.rebuilt()
    }
}

/// How a run ended when no error occurred.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", content = "summary", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every located source was processed.
    Completed(RunSummary),
    /// A stop was requested; sources after the last one listed were not
    /// touched.
    Cancelled(RunSummary),
}

impl RunOutcome {
    /// The sources processed before the run ended.
    pub fn summary(&self) -> &RunSummary {
        match self {
            RunOutcome::Completed(summary) | RunOutcome::Cancelled(summary) => summary,
        }
    }

    /// Returns `true` if the run stopped early on request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunOutcome::Cancelled(_))
    }
}

/// A source, its artifact, and the artifact's freshness, as reported by
/// [`Orchestrator::status`].
#[derive(Debug, Clone)]
pub struct SourceStatus {
    /// The located source.
    pub source: SourceFile,
    /// Its canonical artifact.
    pub artifact: ArtifactPath,
    /// Whether the artifact needs a build.
    pub freshness: Freshness,
}

/// Runs the publisher over every located source.
///
/// The orchestrator is sequential and holds no mutable state, so several
/// orchestrators (or threads sharing one) may run over the same sources at
/// once; the publisher makes their writes safe.
#[derive(Debug)]
pub struct Orchestrator<R> {
    locator: SourceLocator,
    resolver: R,
    publisher: ArtifactPublisher,
}

impl Orchestrator<Workspace> {
    /// Builds an orchestrator from a resolved workspace: its search
    /// directory, extension, and recursion setting drive the locator, and
    /// the workspace itself resolves build paths.
    pub fn from_workspace(workspace: &Workspace) -> Self {
        let locator = SourceLocator::new(
            workspace.search_dir(),
            workspace.root(),
            workspace.source_extension(),
        )
        .recursive(workspace.recursive());
        Self::new(locator, workspace.clone())
    }
}

impl<R: ArtifactResolver> Orchestrator<R> {
    /// Creates an orchestrator with a default publisher.
    pub fn new(locator: SourceLocator, resolver: R) -> Self {
        Self {
            locator,
            resolver,
            publisher: ArtifactPublisher::new(),
        }
    }

    /// Reports build events to `observer`.
    pub fn with_observer(mut self, observer: Arc<dyn BuildObserver>) -> Self {
        self.publisher = self.publisher.with_observer(observer);
        self
    }

    /// The locator used to find sources.
    pub fn locator(&self) -> &SourceLocator {
        &self.locator
    }

    /// Processes every located source in order.
    ///
    /// `cancel` is checked before each located source, never after the
    /// last one; once it reports a stop the run ends with
    /// [`RunOutcome::Cancelled`] and later sources are left alone. The first
    /// error ends the run and is returned.
    pub fn run<C, S>(&self, compiler: &C, cancel: &S) -> Result<RunOutcome, CacheError>
    where
        C: Compiler + ?Sized,
        S: CancelSignal + ?Sized,
    {
        let started = Instant::now();
        let result = self.run_sources(compiler, cancel, started);
        self.publisher.observer().on_run_finished(started.elapsed());
        result
    }

    fn run_sources<C, S>(
        &self,
        compiler: &C,
        cancel: &S,
        started: Instant,
    ) -> Result<RunOutcome, CacheError>
    where
        C: Compiler + ?Sized,
        S: CancelSignal + ?Sized,
    {
        let sources = self.locator.locate()?;
        let mut summary = RunSummary::default();

        for source in sources {
            if cancel.is_cancelled() {
                summary.elapsed_ms = started.elapsed().as_millis() as u64;
                info!(
                    processed = summary.outcomes.len(),
                    "build cancelled, remaining reports skipped"
                );
                return Ok(RunOutcome::Cancelled(summary));
            }
            let source = source?;
            let outcome = self.build(&source, compiler)?;
            summary.outcomes.push(SourceOutcome {
                source: source.path().to_path_buf(),
                outcome,
            });
        }

        summary.elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            rebuilt = summary.rebuilt(),
            fresh = summary.fresh(),
            elapsed_ms = summary.elapsed_ms,
            "reports up to date"
        );
        Ok(RunOutcome::Completed(summary))
    }

    /// Brings the artifact of a single source up to date.
    ///
    /// The source must lie within the locator's containment root.
    pub fn compile_one<C>(&self, source: &Path, compiler: &C) -> Result<BuildOutcome, CacheError>
    where
        C: Compiler + ?Sized,
    {
        let source = SourceFile::from_path(source, self.locator.containment_root())?;
        self.build(&source, compiler)
    }

    /// Lists every located source with its artifact's freshness, without
    /// compiling anything.
    pub fn status(&self) -> Result<Vec<SourceStatus>, CacheError> {
        self.locator
            .locate()?
            .map(|source| {
                let source = source?;
                let artifact = self.resolver.resolve(&source)?;
                let freshness = freshness::check(&source, &artifact);
                Ok(SourceStatus {
                    source,
                    artifact,
                    freshness,
                })
            })
            .collect()
    }

    fn build<C>(&self, source: &SourceFile, compiler: &C) -> Result<BuildOutcome, CacheError>
    where
        C: Compiler + ?Sized,
    {
        let artifact = self.resolver.resolve(source)?;
        self.publisher.publish(source, &artifact, compiler)
    }
}
