//! `lm-reach` — bounded reachability ("isochrone") search.
//!
//! One generic, label-correcting Dijkstra ([`ReachabilitySearch`]) is
//! parameterised by an [`Admission`] rule that decides which labels may be
//! expanded further.  Labels are always ordered by cumulative **weight**,
//! whatever metric the admission rule looks at.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`label`]     | `IsoLabel`, `Metric`, `TraversalMode`                    |
//! | [`admission`] | `Admission` trait, `SearchLimit`, `RegionFilter`         |
//! | [`search`]    | `ReachabilitySearch` — the single-use search engine      |
//! | [`isochrone`] | `isochrone`, `accessible_links` convenience wrappers     |
//! | [`error`]     | `ReachError`, `ReachResult<T>`                           |
//!
//! # Partial inclusion
//!
//! A metric-limited search admits a label when its *parent* is still
//! strictly inside the bound.  The edge that crosses the bound is therefore
//! emitted, and callers crop it (see [`ReachedEdge::reachable_fraction`]).

pub mod admission;
pub mod error;
pub mod isochrone;
pub mod label;
pub mod search;

#[cfg(test)]
mod tests;

pub use admission::{Admission, RegionFilter, SearchLimit};
pub use error::{ReachError, ReachResult};
pub use isochrone::{ReachedEdge, accessible_links, isochrone};
pub use label::{IsoLabel, Metric, TraversalMode};
pub use search::ReachabilitySearch;
