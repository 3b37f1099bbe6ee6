//! Build-artifact cache for compiled report templates.
//!
//! This crate locates report template sources below a search directory,
//! decides per source whether its compiled artifact is stale, and rebuilds
//! stale artifacts by compiling into a private temporary file that is then
//! atomically renamed over the canonical artifact path. Concurrent callers
//! building the same source may compile redundantly, but the canonical path
//! never exposes a partially written artifact and is never locked.

#![warn(missing_docs)]

pub mod cancel;
pub mod error;
pub mod freshness;
pub mod locator;
pub mod observer;
pub mod orchestrator;
pub mod publish;
pub mod resolver;
pub mod source;

pub use cancel::{CancelSignal, Deadline, NeverCancel};
pub use error::{CacheError, CompileError};
pub use freshness::{needs_build, Freshness};
pub use locator::{SourceIter, SourceLocator};
pub use observer::{BuildObserver, BuildStats, NoopObserver};
pub use orchestrator::{Orchestrator, RunOutcome, RunSummary, SourceOutcome, SourceStatus};
pub use publish::{ArtifactPublisher, BuildOutcome, Compiler, TEMP_PREFIX};
pub use resolver::ArtifactResolver;
pub use source::{ArtifactPath, SourceFile};
