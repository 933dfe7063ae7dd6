//! Search-tree labels and the metrics they carry.

use std::fmt;
use std::str::FromStr;

use lm_core::{EdgeId, LabelId, NodeId};

use crate::ReachError;

/// One node of the search tree.
///
/// The label arena of a search holds these by [`LabelId`]; `parent` links
/// form a tree rooted at the start label.  With non-negative edge weights,
/// `weight` never decreases along a parent chain.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IsoLabel {
    pub id: LabelId,
    /// Node reached by this label.
    pub node: NodeId,
    /// Edge traversed to reach `node`; `EdgeId::INVALID` for the root.
    pub edge: EdgeId,
    pub weight: f64,
    /// Cumulative travel time in seconds.
    pub time: f64,
    /// Cumulative distance in metres.
    pub distance: f64,
    pub parent: Option<LabelId>,
}

impl IsoLabel {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

/// Which cumulative value a [`SearchLimit`](crate::SearchLimit) bounds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    Time,
    Distance,
    Weight,
}

impl Metric {
    /// Select this metric's value from a label.
    #[inline]
    pub fn of(self, label: &IsoLabel) -> f64 {
        match self {
            Metric::Time => label.time,
            Metric::Distance => label.distance,
            Metric::Weight => label.weight,
        }
    }
}

impl FromStr for Metric {
    type Err = ReachError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "time" => Ok(Metric::Time),
            "distance" => Ok(Metric::Distance),
            "weight" => Ok(Metric::Weight),
            _ => Err(ReachError::UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Time => "time",
            Metric::Distance => "distance",
            Metric::Weight => "weight",
        })
    }
}

/// What identifies a distinct visit in the search.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum TraversalMode {
    /// One label per node.  Turn costs still apply to the transition.
    #[default]
    NodeBased,
    /// One label per directed edge, so the same node may be settled once per
    /// arriving edge.  Required for exact turn restrictions.
    EdgeBased,
}

/// Key of the label lookup map.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum TraversalId {
    Node(NodeId),
    Edge(EdgeId),
}

impl TraversalMode {
    #[inline]
    pub(crate) fn traversal_id(self, node: NodeId, edge: EdgeId) -> TraversalId {
        match self {
            TraversalMode::NodeBased => TraversalId::Node(node),
            TraversalMode::EdgeBased => TraversalId::Edge(edge),
        }
    }
}
