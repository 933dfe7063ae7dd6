//! `lm-match` — matching location references onto a road network.
//!
//! Two matchers share the same result type and scoring utilities:
//!
//! - [`LineMatcher`] matches an ordered trace with an HMM (Viterbi) over
//!   directed edge candidates.
//! - [`StartToEndMatcher`] matches a bare start/end pair with an expected
//!   length by scoring every candidate route between the two snaps.
//!
//! Neither matcher returns an error per location: every failure becomes a
//! [`MatchStatus`] on the returned [`LocationMatch`].  Only misconfiguration
//! is an `Err`, at construction time.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                   |
//! |-------------------|------------------------------------------------------------|
//! | [`config`]        | `MatchConfig` with defaults and validation                 |
//! | [`location`]      | Input locations, `IsochroneSpec`, `ReliabilityMode`        |
//! | [`result`]        | `LocationMatch`, `MatchedLink`, `MatchStatus`              |
//! | [`hmm`]           | Candidate layers and the Viterbi search                    |
//! | [`line`]          | `LineMatcher` — the line-string pipeline                   |
//! | [`start_to_end`]  | `StartToEndMatcher`                                        |
//! | [`reliability`]   | Geometry and point-observation reliability scores          |
//! | [`path`]          | Edge sequence → matched links, fractions, path geometry    |
//! | [`context`]       | Upstream / downstream link context via `lm-reach`          |
//! | [`error`]         | `MatchError`, `MatchResult<T>`                             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on inputs and results.     |

pub mod config;
pub mod context;
pub mod error;
pub mod hmm;
pub mod line;
pub mod location;
pub mod path;
pub mod reliability;
pub mod result;
pub mod start_to_end;


pub use config::MatchConfig;
pub use error::{MatchError, MatchResult};
pub use line::LineMatcher;
pub use location::{IsochroneSpec, LineStringLocation, Location, ReliabilityMode, StartToEndLocation};
pub use result::{LineStringMatch, LocationMatch, MatchStatus, MatchedLink, StartToEndMatch};
pub use start_to_end::StartToEndMatcher;
