//! Match results.

use std::fmt;

use lm_core::LinkId;

use crate::path::MatchedPath;

/// Terminal state of one match call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchStatus {
    Match,
    /// Too few usable observations, or the matched path is empty.
    NoMatch,
    /// No route connects any start candidate with any end candidate.
    NoPath,
    /// The input failed a plausibility check.
    InvalidInput,
    /// An unexpected failure inside the search; logged, never propagated.
    Exception,
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchStatus::Match => "MATCH",
            MatchStatus::NoMatch => "NO_MATCH",
            MatchStatus::NoPath => "NO_PATH",
            MatchStatus::InvalidInput => "INVALID_INPUT",
            MatchStatus::Exception => "EXCEPTION",
        })
    }
}

/// One link of a matched path, with the covered part of it measured along
/// the travel direction.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchedLink {
    pub link_id: LinkId,
    /// Travelled against the link's digitisation direction.
    pub reversed: bool,
    pub start_fraction: f64,
    pub end_fraction: f64,
}

/// The outcome of matching one location.
///
/// Everything except `id` and `status` is empty or zero unless `status` is
/// [`MatchStatus::Match`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocationMatch {
    pub id: String,
    pub status: MatchStatus,
    pub matched_links: Vec<MatchedLink>,
    /// Position on the first matched link, in `[0, 1]`.
    pub start_fraction: f64,
    /// Position on the last matched link, in `[0, 1]`.
    pub end_fraction: f64,
    /// Confidence in `[0, 100]`.
    pub reliability: f64,
    /// Length of the matched part of the path in metres.
    pub path_length: f64,
    pub upstream_link_ids: Option<Vec<LinkId>>,
    pub downstream_link_ids: Option<Vec<LinkId>>,
}

/// Result of [`LineMatcher::match_line`](crate::LineMatcher::match_line).
pub type LineStringMatch = LocationMatch;

/// Result of [`StartToEndMatcher::match_start_to_end`](crate::StartToEndMatcher::match_start_to_end).
pub type StartToEndMatch = LocationMatch;

impl LocationMatch {
    /// A result without a path.
    pub fn empty(id: impl Into<String>, status: MatchStatus) -> Self {
        Self {
            id: id.into(),
            status,
            matched_links: Vec::new(),
            start_fraction: 0.0,
            end_fraction: 0.0,
            reliability: 0.0,
            path_length: 0.0,
            upstream_link_ids: None,
            downstream_link_ids: None,
        }
    }

    pub(crate) fn matched(id: impl Into<String>, path: MatchedPath, reliability: f64) -> Self {
        Self {
            id: id.into(),
            status: MatchStatus::Match,
            matched_links: path.links,
            start_fraction: path.start_fraction,
            end_fraction: path.end_fraction,
            reliability: reliability.clamp(0.0, 100.0),
            path_length: path.length,
            upstream_link_ids: None,
            downstream_link_ids: None,
        }
    }

    pub fn is_match(&self) -> bool {
        self.status == MatchStatus::Match
    }

    /// Ids of the matched links in travel order.
    pub fn link_ids(&self) -> Vec<LinkId> {
        self.matched_links.iter().map(|l| l.link_id).collect()
    }
}
