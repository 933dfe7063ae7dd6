//! The batch matcher: one network, many locations.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use lm_match::{LineMatcher, Location, LocationMatch, MatchConfig, StartToEndMatcher};
use lm_network::RoadNetwork;

use crate::observer::BatchObserver;
use crate::{BatchError, BatchResult};

// ── BatchConfig ───────────────────────────────────────────────────────────────

/// Configuration of a [`BatchMatcher`].
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Matcher parameters shared by every location.
    pub matching: MatchConfig,

    /// Locations between two [`BatchObserver::on_progress`] calls.  Also the
    /// chunk size handed to the thread pool with the `parallel` feature.
    pub progress_interval: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { matching: MatchConfig::default(), progress_interval: 1_000 }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> BatchResult<()> {
        if self.progress_interval == 0 {
            return Err(BatchError::Config("progress_interval must be > 0".into()));
        }
        self.matching.validate()?;
        Ok(())
    }
}

// ── BatchSummary ──────────────────────────────────────────────────────────────

/// Totals of one [`BatchMatcher::run`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    /// Results with status `MATCH`.
    pub matched: usize,
    pub elapsed: Duration,
}

// ── BatchMatcher ──────────────────────────────────────────────────────────────

/// Matches batches of [`Location`]s against one borrowed network.
///
/// The `processed` and `matched` counters are atomics so that the parallel
/// path can update them from worker threads.  They are reset at the start of
/// every [`run`](Self::run).
pub struct BatchMatcher<'a> {
    line:              LineMatcher<'a>,
    start_to_end:      StartToEndMatcher<'a>,
    progress_interval: usize,
    processed:         AtomicUsize,
    matched:           AtomicUsize,
}

impl<'a> BatchMatcher<'a> {
    pub fn new(network: &'a RoadNetwork, config: BatchConfig) -> BatchResult<Self> {
        config.validate()?;
        Ok(Self {
            line:              LineMatcher::new(network, config.matching.clone())?,
            start_to_end:      StartToEndMatcher::new(network, config.matching)?,
            progress_interval: config.progress_interval,
            processed:         AtomicUsize::new(0),
            matched:           AtomicUsize::new(0),
        })
    }

    /// Locations processed so far in the current or last run.
    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::Relaxed)
    }

    /// Results with status `MATCH` so far in the current or last run.
    pub fn matched(&self) -> usize {
        self.matched.load(Ordering::Relaxed)
    }

    /// Match a single location with the matcher for its kind.
    pub fn match_location(&self, location: &Location) -> LocationMatch {
        let result = match location {
            Location::Line(line) => self.line.match_line(line),
            Location::StartToEnd(s2e) => self.start_to_end.match_start_to_end(s2e),
        };
        self.processed.fetch_add(1, Ordering::Relaxed);
        if result.is_match() {
            self.matched.fetch_add(1, Ordering::Relaxed);
        }
        result
    }

    /// Match every location.  Results are in input order, one per location.
    pub fn run<O: BatchObserver>(&self, locations: &[Location], observer: &mut O) -> Vec<LocationMatch> {
        let started = Instant::now();
        self.processed.store(0, Ordering::Relaxed);
        self.matched.store(0, Ordering::Relaxed);

        let mut results: Vec<LocationMatch> = Vec::with_capacity(locations.len());
        for chunk in locations.chunks(self.progress_interval) {
            #[cfg(feature = "parallel")]
            {
                use rayon::prelude::*;
                results.par_extend(chunk.par_iter().map(|location| self.match_location(location)));
            }
            #[cfg(not(feature = "parallel"))]
            results.extend(chunk.iter().map(|location| self.match_location(location)));

            observer.on_progress(self.processed(), self.matched());
        }

        let summary = BatchSummary {
            processed: self.processed(),
            matched:   self.matched(),
            elapsed:   started.elapsed(),
        };
        tracing::debug!(processed = summary.processed, matched = summary.matched, "batch run complete");
        observer.on_batch_end(&summary);
        results
    }
}
