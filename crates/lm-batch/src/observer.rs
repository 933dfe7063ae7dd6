//! Batch observer trait for progress reporting.

use crate::BatchSummary;

/// Callbacks invoked by [`BatchMatcher::run`][crate::BatchMatcher::run].
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.  Callbacks always run on the thread
/// that called `run`, between chunks, even with the `parallel` feature.
pub trait BatchObserver {
    /// Called after every `progress_interval` locations, and once more after
    /// a trailing partial chunk.
    fn on_progress(&mut self, _processed: usize, _matched: usize) {}

    /// Called once after the last location.
    fn on_batch_end(&mut self, _summary: &BatchSummary) {}
}

/// A [`BatchObserver`] that does nothing.
pub struct NoopObserver;

impl BatchObserver for NoopObserver {}

/// Logs progress and the final summary through `tracing` at INFO.
#[derive(Default)]
pub struct LoggingObserver {
    total: usize,
}

impl LoggingObserver {
    /// `total` is only used to log a percentage; pass 0 if unknown.
    pub fn new(total: usize) -> Self {
        Self { total }
    }
}

impl BatchObserver for LoggingObserver {
    fn on_progress(&mut self, processed: usize, matched: usize) {
        if self.total > 0 {
            let percent = processed as f64 * 100.0 / self.total as f64;
            tracing::info!(processed, matched, percent = %format!("{percent:.1}"), "batch progress");
        } else {
            tracing::info!(processed, matched, "batch progress");
        }
    }

    fn on_batch_end(&mut self, summary: &BatchSummary) {
        tracing::info!(
            processed = summary.processed,
            matched = summary.matched,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "batch finished"
        );
    }
}
