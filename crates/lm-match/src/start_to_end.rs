//! Matching a start point and an end point with an expected length.
//!
//! Both points are snapped to every accessible link within the snap radius.
//! Snaps that resolve to the same graph node are reduced to the closest one.
//! All snaps share one [`QueryGraph`], and every start × end pair is routed
//! with the configured [`Router`].  Each route is scored with
//! [`route_score`]; the highest score wins and becomes the reliability.

use rustc_hash::FxHashSet;

use lm_core::{EdgeId, Point};
use lm_network::{BidirectionalRouter, NetworkError, QueryGraph, RoadNetwork, Router, RoutingGraph, Snap, SnapNode};

use crate::context;
use crate::location::StartToEndLocation;
use crate::path::resolve_path;
use crate::reliability::route_score;
use crate::result::{LocationMatch, MatchStatus, StartToEndMatch};
use crate::{MatchConfig, MatchResult};

/// The straight start–end distance may exceed the expected length by at
/// most this factor, or by [`LENGTH_SLACK_M`], whichever is larger.
const LENGTH_FACTOR: f64 = 2.0;
const LENGTH_SLACK_M: f64 = 50.0;

/// Matches start/end locations onto a borrowed [`RoadNetwork`].
pub struct StartToEndMatcher<'a, R: Router = BidirectionalRouter> {
    network: &'a RoadNetwork,
    config:  MatchConfig,
    router:  R,
}

impl<'a> StartToEndMatcher<'a, BidirectionalRouter> {
    pub fn new(network: &'a RoadNetwork, config: MatchConfig) -> MatchResult<Self> {
        Self::with_router(network, config, BidirectionalRouter)
    }
}

/// A scored route between one start snap and one end snap.
struct Candidate {
    edges: Vec<EdgeId>,
    score: f64,
}

impl<'a, R: Router> StartToEndMatcher<'a, R> {
    pub fn with_router(network: &'a RoadNetwork, config: MatchConfig, router: R) -> MatchResult<Self> {
        config.validate()?;
        Ok(Self { network, config, router })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match `location`.  Never fails: problems are reported as a status.
    pub fn match_start_to_end(&self, location: &StartToEndLocation) -> StartToEndMatch {
        let expected = location.length;
        let straight = location.start.distance(location.end);
        let plausible = (expected * LENGTH_FACTOR).max(expected + LENGTH_SLACK_M);
        if !(expected.is_finite() && expected >= 0.0) || straight > plausible {
            tracing::debug!(id = %location.id, straight, expected, "implausible start/end distance");
            return LocationMatch::empty(&location.id, MatchStatus::InvalidInput);
        }

        match self.run(location) {
            Ok(result) => {
                tracing::debug!(
                    id = %location.id,
                    status = %result.status,
                    reliability = result.reliability,
                    "start-to-end matched"
                );
                result
            }
            Err(err) => {
                tracing::warn!(id = %location.id, error = %err, "start-to-end match failed");
                LocationMatch::empty(&location.id, MatchStatus::Exception)
            }
        }
    }

    fn run(&self, location: &StartToEndLocation) -> MatchResult<StartToEndMatch> {
        let starts = self.snap(location.start);
        let ends = self.snap(location.end);
        if starts.is_empty() || ends.is_empty() {
            return Ok(LocationMatch::empty(&location.id, MatchStatus::NoPath));
        }

        let snaps: Vec<Snap> = starts.iter().chain(ends.iter()).copied().collect();
        let graph = QueryGraph::new(self.network, &snaps);

        let mut best: Option<Candidate> = None;
        for i in 0..starts.len() {
            for j in 0..ends.len() {
                let from = graph.snap_node(i);
                let to = graph.snap_node(starts.len() + j);
                let route = match self.router.route(&graph, from, to) {
                    Ok(route) if !route.is_trivial() => route,
                    Ok(_) | Err(NetworkError::NoRoute { .. }) => continue,
                    Err(err) => return Err(err.into()),
                };

                let score = route_score(
                    location.start,
                    location.end,
                    graph.node_position(from),
                    graph.node_position(to),
                    route.distance_m,
                    location.length,
                );
                if best.as_ref().is_none_or(|b| score > b.score) {
                    best = Some(Candidate { edges: graph.base_path(&route.edges), score });
                }
            }
        }

        let Some(best) = best else {
            return Ok(LocationMatch::empty(&location.id, MatchStatus::NoPath));
        };
        let Some(path) = resolve_path(self.network, &best.edges, location.start, location.end) else {
            return Ok(LocationMatch::empty(&location.id, MatchStatus::NoPath));
        };

        let (upstream, downstream) = context::attach(
            self.network,
            &best.edges,
            location.upstream.as_ref(),
            location.downstream.as_ref(),
        )?;
        let mut result = LocationMatch::matched(&location.id, path, best.score);
        result.upstream_link_ids = upstream;
        result.downstream_link_ids = downstream;
        Ok(result)
    }

    /// Accessible snaps of `point`, closest first, one per graph node.
    fn snap(&self, point: Point) -> Vec<Snap> {
        let mut seen: FxHashSet<SnapNode> = FxHashSet::default();
        self.network
            .find_nearest_links(point, self.config.snap_radius)
            .into_iter()
            .filter(|snap| seen.insert(snap.closest_node(self.network)))
            .collect()
    }
}
