//! Build observation hooks.
//!
//! Timing and counters are reported through a [`BuildObserver`] so callers
//! can forward them to whatever metrics system they use.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Receives build events. All methods default to doing nothing.
pub trait BuildObserver: Send + Sync {
    /// A source was compiled and its artifact published.
    fn on_compiled(&self, _source: &Path, _elapsed: Duration) {}

    /// A source's artifact was already up to date.
    fn on_fresh(&self, _source: &Path) {}

    /// A run ended, whatever its outcome.
    fn on_run_finished(&self, _elapsed: Duration) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl BuildObserver for NoopObserver {}

/// Thread-safe counters accumulated across runs.
#[derive(Debug, Default)]
pub struct BuildStats {
    compiled: AtomicU64,
    fresh: AtomicU64,
    compile_ms: AtomicU64,
    runs: AtomicU64,
    run_ms: AtomicU64,
}

impl BuildStats {
    /// Creates zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sources compiled.
    pub fn compiled(&self) -> u64 {
        self.compiled.load(Ordering::Relaxed)
    }

    /// Number of sources found up to date.
    pub fn fresh(&self) -> u64 {
        self.fresh.load(Ordering::Relaxed)
    }

    /// Total milliseconds spent in the compiler.
    pub fn compile_ms(&self) -> u64 {
        self.compile_ms.load(Ordering::Relaxed)
    }

    /// Number of finished runs.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::Relaxed)
    }

    /// Total milliseconds spent in runs.
    pub fn run_ms(&self) -> u64 {
        self.run_ms.load(Ordering::Relaxed)
    }
}

impl BuildObserver for BuildStats {
    fn on_compiled(&self, _source: &Path, elapsed: Duration) {
        self.compiled.fetch_add(1, Ordering::Relaxed);
        self.compile_ms
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }

    fn on_fresh(&self, _source: &Path) {
        self.fresh.fetch_add(1, Ordering::Relaxed);
    }

    fn on_run_finished(&self, elapsed: Duration) {
        self.runs.fetch_add(1, Ordering::Relaxed);
        self.run_ms
            .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
    }
}
