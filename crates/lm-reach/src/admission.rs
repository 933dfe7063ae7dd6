//! Admission rules: which newly created labels may be enqueued.

use lm_core::EdgeId;
use lm_network::RoutingGraph;

use crate::label::{IsoLabel, Metric};
use crate::{ReachError, ReachResult};

/// Decides whether a freshly created label is enqueued for expansion.
///
/// `parent` is the label being expanded, `label` the candidate created by
/// walking `edge`.  A rejected label is still recorded for its traversal id,
/// it is just never emitted or expanded.
///
/// Any `Fn(&G, EdgeId, &IsoLabel, &IsoLabel) -> bool` closure is an
/// admission rule.
pub trait Admission<G: RoutingGraph> {
    fn admit(&self, graph: &G, edge: EdgeId, parent: &IsoLabel, label: &IsoLabel) -> bool;
}

impl<G, F> Admission<G> for F
where
    G: RoutingGraph,
    F: Fn(&G, EdgeId, &IsoLabel, &IsoLabel) -> bool,
{
    fn admit(&self, graph: &G, edge: EdgeId, parent: &IsoLabel, label: &IsoLabel) -> bool {
        self(graph, edge, parent, label)
    }
}

/// Numeric bound on one metric.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SearchLimit {
    pub metric: Metric,
    pub bound:  f64,
}

impl SearchLimit {
    /// Validate and build a limit.  The bound must be positive and finite.
    pub fn new(metric: Metric, bound: f64) -> ReachResult<Self> {
        if bound.is_finite() && bound > 0.0 {
            Ok(Self { metric, bound })
        } else {
            Err(ReachError::InvalidLimit(bound))
        }
    }
}

impl<G: RoutingGraph> Admission<G> for SearchLimit {
    /// Admit while the edge's *origin* is strictly within budget, even if
    /// `label` itself ends beyond it.
    #[inline]
    fn admit(&self, _graph: &G, _edge: EdgeId, parent: &IsoLabel, _label: &IsoLabel) -> bool {
        self.bound - self.metric.of(parent) > 0.0
    }
}

/// Discrete admission: only edges whose link lies in `region`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RegionFilter {
    pub region: u32,
}

impl<G: RoutingGraph> Admission<G> for RegionFilter {
    #[inline]
    fn admit(&self, graph: &G, edge: EdgeId, _parent: &IsoLabel, _label: &IsoLabel) -> bool {
        graph.link_attributes(edge).region == Some(self.region)
    }
}
