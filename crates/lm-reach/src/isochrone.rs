//! Convenience wrappers over [`ReachabilitySearch`] for the two admission
//! modes: metric-limited isochrones and region accessibility.

use rustc_hash::FxHashSet;

use lm_core::{EdgeId, LinkId, NodeId};
use lm_network::{Direction, RoutingGraph};

use crate::admission::{RegionFilter, SearchLimit};
use crate::search::ReachabilitySearch;
use crate::ReachResult;

/// One edge reached by an isochrone search.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReachedEdge {
    pub edge: EdgeId,
    pub link: LinkId,
    pub reversed: bool,
    /// Share of the edge, measured from the end the search entered it,
    /// that lies within the bound.  `1.0` unless this is a boundary edge.
    pub reachable_fraction: f64,
    /// Limited metric at the far end of the edge.  May exceed the bound on
    /// boundary edges.
    pub metric_value: f64,
}

/// Every edge reachable from `start` within `limit`, in settle order.
///
/// Edges that cross the bound are included with a `reachable_fraction`
/// below one, interpolated linearly over the limited metric.
pub fn isochrone<G: RoutingGraph>(
    graph:     &G,
    start:     NodeId,
    limit:     SearchLimit,
    direction: Direction,
) -> ReachResult<Vec<ReachedEdge>> {
    let mut reached = Vec::new();
    let mut search = ReachabilitySearch::new(graph, limit, direction);
    search.search(start, |label, parent| {
        let Some(parent) = parent else { return };
        let value = limit.metric.of(label);
        let origin = limit.metric.of(parent);
        let reachable_fraction = if value <= limit.bound || value <= origin {
            1.0
        } else {
            ((limit.bound - origin) / (value - origin)).clamp(0.0, 1.0)
        };
        reached.push(ReachedEdge {
            edge: label.edge,
            link: graph.edge_link(label.edge),
            reversed: graph.edge_reversed(label.edge),
            reachable_fraction,
            metric_value: value,
        });
    })?;

    tracing::debug!(%start, metric = %limit.metric, bound = limit.bound, edges = reached.len(), "isochrone");
    Ok(reached)
}

/// Sorted ids of the links reachable from `start` without leaving `region`.
pub fn accessible_links<G: RoutingGraph>(
    graph:     &G,
    start:     NodeId,
    region:    u32,
    direction: Direction,
) -> ReachResult<Vec<LinkId>> {
    let mut links: FxHashSet<LinkId> = FxHashSet::default();
    let mut search = ReachabilitySearch::new(graph, RegionFilter { region }, direction);
    search.search(start, |label, _| {
        if label.edge.is_valid() {
            links.insert(graph.edge_link(label.edge));
        }
    })?;

    let mut links: Vec<LinkId> = links.into_iter().collect();
    links.sort_unstable();
    Ok(links)
}
