//! Location references: the inputs to the matchers.

use lm_core::Point;
use lm_reach::{Metric, ReachResult, SearchLimit};

/// How the reliability of a line match is scored.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReliabilityMode {
    /// Compare the matched path geometry with the input line.
    #[default]
    Geometry,
    /// Score the distances of the literal input coordinates to the path.
    PointObservations,
}

/// A bounded reachability request attached to a location, used to report
/// the links upstream or downstream of the match.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IsochroneSpec {
    pub metric: Metric,
    pub bound:  f64,
}

impl IsochroneSpec {
    pub fn new(metric: Metric, bound: f64) -> Self {
        Self { metric, bound }
    }

    /// Validated search limit.
    pub fn limit(&self) -> ReachResult<SearchLimit> {
        SearchLimit::new(self.metric, self.bound)
    }
}

/// An ordered trace to match.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineStringLocation {
    pub id: String,
    pub geometry: Vec<Point>,
    /// Expected length; the geometry's own length when absent.
    pub length: Option<f64>,
    /// Per-request measurement error; the matcher default when absent.
    pub sigma: Option<f64>,
    pub reliability_mode: ReliabilityMode,
    pub upstream: Option<IsochroneSpec>,
    pub downstream: Option<IsochroneSpec>,
}

impl LineStringLocation {
    pub fn new(id: impl Into<String>, geometry: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            geometry,
            length: None,
            sigma: None,
            reliability_mode: ReliabilityMode::default(),
            upstream: None,
            downstream: None,
        }
    }
}

/// A start and end point with the expected length between them.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StartToEndLocation {
    pub id: String,
    pub start: Point,
    pub end: Point,
    pub length: f64,
    pub upstream: Option<IsochroneSpec>,
    pub downstream: Option<IsochroneSpec>,
}

impl StartToEndLocation {
    pub fn new(id: impl Into<String>, start: Point, end: Point, length: f64) -> Self {
        Self { id: id.into(), start, end, length, upstream: None, downstream: None }
    }
}

/// Either kind of location, as read from a batch input.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Location {
    Line(LineStringLocation),
    StartToEnd(StartToEndLocation),
}

impl Location {
    pub fn id(&self) -> &str {
        match self {
            Location::Line(l) => &l.id,
            Location::StartToEnd(l) => &l.id,
        }
    }
}
