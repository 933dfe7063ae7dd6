//! Unit tests for lm-reach.

#[cfg(test)]
pub(crate) mod helpers {
    use lm_core::{LinkId, NodeId, Point};
    use lm_network::{Access, LinkSpec, RoadNetwork, RoadNetworkBuilder};

    /// Straight road along the x axis:
    ///
    /// ```text
    ///   0 ──(1) 150── 1 ──(2) 80── 2 ──(3) 100── 3
    /// ```
    pub fn straight_road(access: [Access; 3]) -> (RoadNetwork, [NodeId; 4]) {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(Point::new(0.0, 0.0));
        let n1 = b.add_node(Point::new(150.0, 0.0));
        let n2 = b.add_node(Point::new(230.0, 0.0));
        let n3 = b.add_node(Point::new(330.0, 0.0));
        b.add_link(LinkSpec::new(LinkId(1), n0, n1).access(access[0]).region(7));
        b.add_link(LinkSpec::new(LinkId(2), n1, n2).access(access[1]).region(8));
        b.add_link(LinkSpec::new(LinkId(3), n2, n3).access(access[2]).region(7));
        (b.build().unwrap(), [n0, n1, n2, n3])
    }
}

// ── Metric-limited search ─────────────────────────────────────────────────────

#[cfg(test)]
mod limited {
    use lm_core::{LinkId, NodeId};
    use lm_network::{Access, Direction, RoutingGraph};

    use crate::{IsoLabel, Metric, ReachabilitySearch, SearchLimit, isochrone};

    fn emitted(limit: SearchLimit) -> Vec<(IsoLabel, Option<IsoLabel>)> {
        let (net, [n0, ..]) = super::helpers::straight_road([Access::BOTH; 3]);
        let mut out = Vec::new();
        let mut search = ReachabilitySearch::new(&net, limit, Direction::Forward);
        search.search(n0, |l, p| out.push((*l, p.copied()))).unwrap();
        out
    }

    #[test]
    fn root_is_emitted_first_without_parent() {
        let out = emitted(SearchLimit::new(Metric::Distance, 10.0).unwrap());
        let (root, parent) = out[0];
        assert!(root.is_root());
        assert!(parent.is_none());
        assert_eq!(root.weight, 0.0);
        assert_eq!(root.distance, 0.0);
    }

    #[test]
    fn boundary_edge_is_emitted_when_parent_is_inside() {
        // Parent at 150 m, edge adds 80 m: 230 > 200 but 200 - 150 > 0.
        let out = emitted(SearchLimit::new(Metric::Distance, 200.0).unwrap());
        let nodes: Vec<NodeId> = out.iter().map(|(l, _)| l.node).collect();
        assert_eq!(nodes, vec![NodeId(0), NodeId(1), NodeId(2)]);

        let (label, parent) = out[2];
        assert_eq!(label.distance, 230.0);
        assert_eq!(parent.unwrap().distance, 150.0);
    }

    #[test]
    fn label_beyond_bound_is_not_expanded() {
        let out = emitted(SearchLimit::new(Metric::Distance, 200.0).unwrap());
        assert!(out.iter().all(|(l, _)| l.node != NodeId(3)));
    }

    #[test]
    fn isochrone_crops_boundary_edge() {
        let (net, [n0, ..]) = super::helpers::straight_road([Access::BOTH; 3]);
        let limit = SearchLimit::new(Metric::Distance, 200.0).unwrap();
        let reached = isochrone(&net, n0, limit, Direction::Forward).unwrap();

        assert_eq!(reached.len(), 2);
        assert_eq!(reached[0].link, LinkId(1));
        assert_eq!(reached[0].reachable_fraction, 1.0);
        assert!(!reached[0].reversed);
        assert_eq!(reached[1].link, LinkId(2));
        assert_eq!(reached[1].metric_value, 230.0);
        assert!((reached[1].reachable_fraction - 0.625).abs() < 1e-12);
    }

    #[test]
    fn time_metric_uses_edge_time() {
        // 50 km/h: 150 m takes 10.8 s.
        let (net, [n0, ..]) = super::helpers::straight_road([Access::BOTH; 3]);
        let limit = SearchLimit::new(Metric::Time, 5.0).unwrap();
        let reached = isochrone(&net, n0, limit, Direction::Forward).unwrap();
        assert_eq!(reached.len(), 1);
        let first = net.link_edge(LinkId(1), false).unwrap();
        assert!((reached[0].metric_value - net.edge_time(first)).abs() < 1e-9);
        assert!((reached[0].reachable_fraction - 5.0 / 10.8).abs() < 1e-9);
    }

    #[test]
    fn reverse_search_follows_incoming_edges() {
        // Link 1 is one-way 0 → 1: reachable downstream, not upstream.
        let (net, [n0, _, _, n3]) =
            super::helpers::straight_road([Access::FORWARD, Access::BOTH, Access::BOTH]);
        let limit = SearchLimit::new(Metric::Distance, 1_000.0).unwrap();

        let downstream = isochrone(&net, n0, limit, Direction::Forward).unwrap();
        assert_eq!(downstream.len(), 3);

        let upstream = isochrone(&net, n0, limit, Direction::Reverse).unwrap();
        assert!(upstream.is_empty());

        let upstream = isochrone(&net, n3, limit, Direction::Reverse).unwrap();
        let links: Vec<LinkId> = upstream.iter().map(|r| r.link).collect();
        assert_eq!(links, vec![LinkId(3), LinkId(2), LinkId(1)]);
        // Upstream of node 3 the search walks the forward edges backwards.
        assert!(upstream.iter().all(|r| !r.reversed));
    }

    #[test]
    fn closed_links_are_not_traversed() {
        let (net, [n0, ..]) =
            super::helpers::straight_road([Access::BOTH, Access::NONE, Access::BOTH]);
        let limit = SearchLimit::new(Metric::Distance, 1_000.0).unwrap();
        let reached = isochrone(&net, n0, limit, Direction::Forward).unwrap();
        assert_eq!(reached.len(), 1);
        assert_eq!(reached[0].link, LinkId(1));
    }
}

// ── Region accessibility ──────────────────────────────────────────────────────

#[cfg(test)]
mod region {
    use lm_core::{EdgeId, LinkId};
    use lm_network::{Access, Direction, RoadNetwork, RoutingGraph};

    use crate::{IsoLabel, ReachabilitySearch, accessible_links};

    #[test]
    fn expansion_stops_at_foreign_region() {
        let (net, [n0, ..]) = super::helpers::straight_road([Access::BOTH; 3]);
        let links = accessible_links(&net, n0, 7, Direction::Forward).unwrap();
        assert_eq!(links, vec![LinkId(1)]);
    }

    #[test]
    fn start_inside_other_region_reaches_nothing() {
        let (net, [n0, ..]) = super::helpers::straight_road([Access::BOTH; 3]);
        assert!(accessible_links(&net, n0, 8, Direction::Forward).unwrap().is_empty());
    }

    #[test]
    fn middle_region_from_its_own_node() {
        let (net, [_, n1, ..]) = super::helpers::straight_road([Access::BOTH; 3]);
        let links = accessible_links(&net, n1, 8, Direction::Forward).unwrap();
        assert_eq!(links, vec![LinkId(2)]);
    }

    #[test]
    fn closures_are_admission_rules() {
        let (net, [n0, ..]) = super::helpers::straight_road([Access::BOTH; 3]);
        let only_link_one =
            |g: &RoadNetwork, e: EdgeId, _: &IsoLabel, _: &IsoLabel| g.edge_link(e) == LinkId(1);
        let mut count = 0;
        let mut search = ReachabilitySearch::new(&net, only_link_one, Direction::Forward);
        let emitted = search.search(n0, |_, _| count += 1).unwrap();
        assert_eq!(emitted, 2);
        assert_eq!(count, 2);
    }
}

// ── Traversal modes and turn costs ────────────────────────────────────────────

#[cfg(test)]
mod traversal {
    use lm_core::{EdgeId, LinkId, NodeId, Point};
    use lm_network::{Direction, LinkSpec, RoadNetwork, RoadNetworkBuilder};

    use crate::{IsoLabel, ReachabilitySearch, TraversalMode};

    /// ```text
    ///        3
    ///      /   \
    ///   (3)     (4)
    ///   /         \
    ///  0 ───(1)─── 1 ───(2)─── 2
    /// ```
    /// The turn 1 → 2 at node 1 is forbidden; 4 → 2 is allowed.
    fn restricted_junction() -> (RoadNetwork, [NodeId; 4]) {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(Point::new(0.0, 0.0));
        let n1 = b.add_node(Point::new(100.0, 0.0));
        let n2 = b.add_node(Point::new(200.0, 0.0));
        let n3 = b.add_node(Point::new(50.0, 50.0));
        b.add_link(LinkSpec::new(LinkId(1), n0, n1));
        b.add_link(LinkSpec::new(LinkId(2), n1, n2));
        b.add_link(LinkSpec::new(LinkId(3), n0, n3));
        b.add_link(LinkSpec::new(LinkId(4), n3, n1));
        b.add_turn_restriction(n1, LinkId(1), LinkId(2));
        (b.build().unwrap(), [n0, n1, n2, n3])
    }

    fn reached_nodes(mode: TraversalMode) -> Vec<IsoLabel> {
        let (net, [n0, ..]) = restricted_junction();
        let unbounded = |_: &RoadNetwork, _: EdgeId, _: &IsoLabel, _: &IsoLabel| true;
        let mut out = Vec::new();
        let mut search = ReachabilitySearch::new(&net, unbounded, Direction::Forward).traversal_mode(mode);
        search.search(n0, |l, _| out.push(*l)).unwrap();
        out
    }

    #[test]
    fn node_based_loses_the_detour() {
        // Node 1 is settled via link 1; the restricted turn then blocks 2.
        let labels = reached_nodes(TraversalMode::NodeBased);
        assert!(labels.iter().all(|l| l.node != NodeId(2)));
    }

    #[test]
    fn edge_based_finds_the_detour() {
        let labels = reached_nodes(TraversalMode::EdgeBased);
        let to_two = labels.iter().find(|l| l.node == NodeId(2)).unwrap();
        let detour = 2.0 * 50.0 * 2f64.sqrt() + 100.0;
        assert!((to_two.distance - detour).abs() < 1e-9);
    }

    #[test]
    fn turn_cost_adds_to_weight_and_time() {
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(Point::new(0.0, 0.0));
        let n1 = b.add_node(Point::new(100.0, 0.0));
        let n2 = b.add_node(Point::new(200.0, 0.0));
        b.add_link(LinkSpec::new(LinkId(1), n0, n1));
        b.add_link(LinkSpec::new(LinkId(2), n1, n2));
        b.add_turn_cost(n1, LinkId(1), LinkId(2), 30.0);
        let net = b.build().unwrap();

        let unbounded = |_: &RoadNetwork, _: EdgeId, _: &IsoLabel, _: &IsoLabel| true;
        let mut last = None;
        let mut search = ReachabilitySearch::new(&net, unbounded, Direction::Forward);
        search.search(n0, |l, _| if l.node == n2 { last = Some(*l) }).unwrap();

        let label = last.unwrap();
        let plain = 200.0 / (50.0 / 3.6);
        assert!((label.weight - (plain + 30.0)).abs() < 1e-9);
        assert!((label.time - (plain + 30.0)).abs() < 1e-9);
        assert_eq!(label.distance, 200.0);
    }

    #[test]
    fn reverse_turn_cost_uses_travel_order() {
        // Walking upstream from 2, the transition 2 ← 1 ← 0 is the forward
        // turn 1 → 2, which is forbidden.
        let mut b = RoadNetworkBuilder::new();
        let n0 = b.add_node(Point::new(0.0, 0.0));
        let n1 = b.add_node(Point::new(100.0, 0.0));
        let n2 = b.add_node(Point::new(200.0, 0.0));
        b.add_link(LinkSpec::new(LinkId(1), n0, n1));
        b.add_link(LinkSpec::new(LinkId(2), n1, n2));
        b.add_turn_restriction(n1, LinkId(1), LinkId(2));
        let net = b.build().unwrap();

        let unbounded = |_: &RoadNetwork, _: EdgeId, _: &IsoLabel, _: &IsoLabel| true;
        let mut nodes = Vec::new();
        let mut search = ReachabilitySearch::new(&net, unbounded, Direction::Reverse);
        search.search(n2, |l, _| nodes.push(l.node)).unwrap();
        assert_eq!(nodes, vec![n2, n1]);
    }
}

// ── Preconditions ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod preconditions {
    use lm_core::NodeId;
    use lm_network::{Access, Direction};

    use crate::{Metric, ReachError, ReachabilitySearch, SearchLimit};

    #[test]
    fn search_is_single_use() {
        let (net, [n0, ..]) = super::helpers::straight_road([Access::BOTH; 3]);
        let limit = SearchLimit::new(Metric::Distance, 100.0).unwrap();
        let mut search = ReachabilitySearch::new(&net, limit, Direction::Forward);
        search.search(n0, |_, _| {}).unwrap();
        let created = search.labels().len();

        let again = search.search(n0, |_, _| panic!("must not emit"));
        assert!(matches!(again, Err(ReachError::AlreadySearched)));
        assert_eq!(search.labels().len(), created);
    }

    #[test]
    fn unknown_start_node() {
        let (net, _) = super::helpers::straight_road([Access::BOTH; 3]);
        let limit = SearchLimit::new(Metric::Distance, 100.0).unwrap();
        let mut search = ReachabilitySearch::new(&net, limit, Direction::Forward);
        let res = search.search(NodeId(99), |_, _| {});
        assert!(matches!(res, Err(ReachError::NodeNotFound(NodeId(99)))));
    }

    #[test]
    fn limit_must_be_positive_and_finite() {
        assert!(matches!(SearchLimit::new(Metric::Time, 0.0), Err(ReachError::InvalidLimit(_))));
        assert!(matches!(SearchLimit::new(Metric::Time, -5.0), Err(ReachError::InvalidLimit(_))));
        assert!(SearchLimit::new(Metric::Time, f64::NAN).is_err());
        assert!(SearchLimit::new(Metric::Time, f64::INFINITY).is_err());
    }

    #[test]
    fn metric_parsing() {
        assert_eq!("time".parse::<Metric>().unwrap(), Metric::Time);
        assert_eq!(" Distance ".parse::<Metric>().unwrap(), Metric::Distance);
        assert_eq!(Metric::Weight.to_string().parse::<Metric>().unwrap(), Metric::Weight);
        assert!(matches!("speed".parse::<Metric>(), Err(ReachError::UnknownMetric(_))));
    }
}

// ── Properties ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod properties {
    use proptest::prelude::*;
    use rustc_hash::FxHashSet;

    use lm_core::{EdgeId, LinkId, NodeId, Point};
    use lm_network::{Direction, LinkSpec, RoadNetwork, RoadNetworkBuilder, RoutingGraph};

    use crate::{IsoLabel, ReachabilitySearch, TraversalMode};

    fn random_network(points: &[(f64, f64)], links: &[(usize, usize)]) -> RoadNetwork {
        let mut b = RoadNetworkBuilder::with_capacity(points.len(), links.len());
        let nodes: Vec<NodeId> = points.iter().map(|&(x, y)| b.add_node(Point::new(x, y))).collect();
        for (i, &(a, c)) in links.iter().enumerate() {
            let (a, c) = (a % nodes.len(), c % nodes.len());
            if a != c {
                b.add_link(LinkSpec::new(LinkId(i as u64), nodes[a], nodes[c]));
            }
        }
        b.build().unwrap()
    }

    fn reachable(net: &RoadNetwork, start: NodeId) -> FxHashSet<NodeId> {
        let mut seen = FxHashSet::default();
        let mut stack = vec![start];
        seen.insert(start);
        while let Some(node) = stack.pop() {
            for e in net.edges(node, Direction::Forward) {
                let next = net.edge_to(e);
                if seen.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen
    }

    fn any_mode() -> impl Strategy<Value = TraversalMode> {
        prop_oneof![Just(TraversalMode::NodeBased), Just(TraversalMode::EdgeBased)]
    }

    proptest! {
        #[test]
        fn weights_never_decrease(
            points in prop::collection::vec((0.0..1_000.0f64, 0.0..1_000.0f64), 2..12),
            links in prop::collection::vec((0usize..12, 0usize..12), 1..30),
            mode in any_mode(),
        ) {
            let net = random_network(&points, &links);
            let unbounded = |_: &RoadNetwork, _: EdgeId, _: &IsoLabel, _: &IsoLabel| true;
            let mut search = ReachabilitySearch::new(&net, unbounded, Direction::Forward).traversal_mode(mode);
            let mut last = 0.0f64;
            let mut ok = true;
            search.search(NodeId(0), |label, parent| {
                ok &= label.weight >= last;
                last = label.weight;
                if let Some(parent) = parent {
                    ok &= label.weight >= parent.weight;
                    ok &= label.parent == Some(parent.id);
                }
            }).unwrap();
            prop_assert!(ok);
        }

        #[test]
        fn every_traversal_id_emitted_once(
            points in prop::collection::vec((0.0..1_000.0f64, 0.0..1_000.0f64), 2..12),
            links in prop::collection::vec((0usize..12, 0usize..12), 1..30),
            mode in any_mode(),
        ) {
            let net = random_network(&points, &links);
            let unbounded = |_: &RoadNetwork, _: EdgeId, _: &IsoLabel, _: &IsoLabel| true;
            let mut search = ReachabilitySearch::new(&net, unbounded, Direction::Forward).traversal_mode(mode);
            let mut emitted: Vec<IsoLabel> = Vec::new();
            search.search(NodeId(0), |label, _| emitted.push(*label)).unwrap();

            let reachable = reachable(&net, NodeId(0));
            let nodes: FxHashSet<NodeId> = emitted.iter().map(|l| l.node).collect();
            prop_assert_eq!(&nodes, &reachable);
            prop_assert_eq!(emitted.iter().filter(|l| l.is_root()).count(), 1);

            match mode {
                TraversalMode::NodeBased => {
                    prop_assert_eq!(nodes.len(), emitted.len());
                }
                TraversalMode::EdgeBased => {
                    let edges: Vec<EdgeId> = emitted.iter().filter(|l| !l.is_root()).map(|l| l.edge).collect();
                    let distinct: FxHashSet<EdgeId> = edges.iter().copied().collect();
                    prop_assert_eq!(distinct.len(), edges.len());

                    // Every edge leaving a reachable node is traversed.
                    let expected: FxHashSet<EdgeId> = reachable
                        .iter()
                        .flat_map(|&n| net.edges(n, Direction::Forward).collect::<Vec<_>>())
                        .collect();
                    prop_assert_eq!(distinct, expected);
                }
            }
        }
    }
}
