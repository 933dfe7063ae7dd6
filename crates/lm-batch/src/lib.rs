//! `lm-batch` — matching many locations against one network.
//!
//! The batch layer is thin: it routes each [`Location`] to the matching
//! entry point, keeps atomic `processed` / `matched` counters, and reports
//! progress to a [`BatchObserver`].  Per-location failures are statuses on
//! the results; the batch never stops early.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`batch`]    | `BatchConfig`, `BatchMatcher`, `BatchSummary`                |
//! | [`observer`] | `BatchObserver` trait, `NoopObserver`, `LoggingObserver`     |
//! | [`loader`]   | CSV location loader                                          |
//! | [`writer`]   | CSV result writer                                            |
//! | [`error`]    | `BatchError`, `BatchResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Matches each progress chunk on the Rayon thread pool.      |
//!
//! [`Location`]: lm_match::Location

pub mod batch;
pub mod error;
pub mod loader;
pub mod observer;
pub mod writer;

#[cfg(test)]
mod tests;

pub use batch::{BatchConfig, BatchMatcher, BatchSummary};
pub use error::{BatchError, BatchResult};
pub use loader::{load_locations_csv, load_locations_reader};
pub use observer::{BatchObserver, LoggingObserver, NoopObserver};
pub use writer::CsvResultWriter;
