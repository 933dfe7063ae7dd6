//! Upstream and downstream link context of a match.

use lm_core::{EdgeId, LinkId};
use lm_network::{Direction, RoadNetwork, RoutingGraph};
use lm_reach::isochrone;

use crate::location::IsochroneSpec;
use crate::MatchResult;

/// Links reachable within `spec` before the first edge (`Direction::Reverse`)
/// or after the last edge (`Direction::Forward`) of `edges`.
///
/// The result is sorted, deduplicated, and excludes the matched links.
/// The search is seeded at the edge end node; the position of the match on
/// that edge is not taken into account.
pub fn link_context(
    network:   &RoadNetwork,
    edges:     &[EdgeId],
    spec:      &IsochroneSpec,
    direction: Direction,
) -> MatchResult<Vec<LinkId>> {
    let seed = match direction {
        Direction::Reverse => edges.first().map(|&e| network.edge_from(e)),
        Direction::Forward => edges.last().map(|&e| network.edge_to(e)),
    };
    let Some(seed) = seed else {
        return Ok(Vec::new());
    };

    let matched: Vec<LinkId> = edges.iter().map(|&e| network.edge_link(e)).collect();
    let mut links: Vec<LinkId> = isochrone(network, seed, spec.limit()?, direction)?
        .into_iter()
        .map(|reached| reached.link)
        .filter(|link| !matched.contains(link))
        .collect();
    links.sort_unstable();
    links.dedup();
    Ok(links)
}

/// Fill in the requested context lists of a matched result.
pub(crate) fn attach(
    network:    &RoadNetwork,
    edges:      &[EdgeId],
    upstream:   Option<&IsochroneSpec>,
    downstream: Option<&IsochroneSpec>,
) -> MatchResult<(Option<Vec<LinkId>>, Option<Vec<LinkId>>)> {
    let up = upstream
        .map(|spec| link_context(network, edges, spec, Direction::Reverse))
        .transpose()?;
    let down = downstream
        .map(|spec| link_context(network, edges, spec, Direction::Forward))
        .transpose()?;
    Ok((up, down))
}
