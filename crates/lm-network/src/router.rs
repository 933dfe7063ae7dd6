//! Routing trait and distance-weighted shortest-path searches.
//!
//! # Pluggability
//!
//! The start-to-end matcher calls routing via the [`Router`] trait so the
//! search algorithm can be swapped without touching the matcher.  The
//! default is [`BidirectionalRouter`]; [`DijkstraRouter`] is the plain
//! one-sided search and serves as its reference.
//!
//! # Cost units
//!
//! Routers minimise **distance in metres** over accessible edges (finite
//! weight).  Turn costs are not applied; node-based searches cannot express
//! them exactly and the matchers only need geometric plausibility.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashMap;

use lm_core::{Cost, EdgeId, NodeId};

use crate::graph::{Direction, RoutingGraph};
use crate::{NetworkError, NetworkResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// The result of a routing query: an ordered list of edges and its length.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Edges to traverse in order, from source to destination.
    pub edges: Vec<EdgeId>,
    /// Sum of edge distances in metres.
    pub distance_m: f64,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable point-to-point routing engine.
///
/// Implementations must be `Send + Sync` so they can be shared across Rayon
/// worker threads during parallel batch matching.
pub trait Router: Send + Sync {
    /// Compute the shortest route from `from` to `to`.
    ///
    /// `from == to` yields an empty (trivial) route rather than an error.
    fn route<G: RoutingGraph>(&self, graph: &G, from: NodeId, to: NodeId) -> NetworkResult<Route>;
}

/// Standard one-sided Dijkstra.
pub struct DijkstraRouter;

/// Dijkstra from both ends, meeting in the middle.
///
/// Settles roughly half the nodes of [`DijkstraRouter`] on road networks.
pub struct BidirectionalRouter;

impl Router for DijkstraRouter {
    fn route<G: RoutingGraph>(&self, graph: &G, from: NodeId, to: NodeId) -> NetworkResult<Route> {
        check_node(graph, from)?;
        check_node(graph, to)?;
        if from == to {
            return Ok(Route { edges: vec![], distance_m: 0.0 });
        }

        let tree = grow_tree(graph, from, Direction::Forward, f64::INFINITY, Some(to));
        match tree.path_to(graph, to) {
            Some(edges) => Ok(Route { edges, distance_m: tree.dist[&to] }),
            None => Err(NetworkError::NoRoute { from, to }),
        }
    }
}

impl Router for BidirectionalRouter {
    fn route<G: RoutingGraph>(&self, graph: &G, from: NodeId, to: NodeId) -> NetworkResult<Route> {
        check_node(graph, from)?;
        check_node(graph, to)?;
        if from == to {
            return Ok(Route { edges: vec![], distance_m: 0.0 });
        }
        bidirectional(graph, from, to).ok_or(NetworkError::NoRoute { from, to })
    }
}

fn check_node<G: RoutingGraph>(graph: &G, node: NodeId) -> NetworkResult<()> {
    if node.index() < graph.node_count() {
        Ok(())
    } else {
        Err(NetworkError::NodeNotFound(node))
    }
}

// ── One-to-many tree ──────────────────────────────────────────────────────────

/// A distance-bounded shortest-path tree from one source node.
pub struct ShortestPathTree {
    pub source: NodeId,
    /// Best known distance to every labelled node.
    dist: FxHashMap<NodeId, f64>,
    /// Edge that reached each labelled node (absent for the source).
    prev: FxHashMap<NodeId, EdgeId>,
}

impl ShortestPathTree {
    pub fn distance_to(&self, node: NodeId) -> Option<f64> {
        self.dist.get(&node).copied()
    }

    /// Edges from the source to `node`, or `None` if `node` was not reached.
    pub fn path_to<G: RoutingGraph>(&self, graph: &G, node: NodeId) -> Option<Vec<EdgeId>> {
        if !self.dist.contains_key(&node) {
            return None;
        }
        let mut edges = Vec::new();
        let mut cur = node;
        while let Some(&e) = self.prev.get(&cur) {
            edges.push(e);
            cur = graph.edge_from(e);
        }
        edges.reverse();
        Some(edges)
    }
}

/// Forward shortest-path tree from `source` over all nodes within
/// `max_distance` metres.
///
/// Used by the HMM matcher to evaluate many transitions from one candidate
/// with a single search.
pub fn shortest_path_tree<G: RoutingGraph>(graph: &G, source: NodeId, max_distance: f64) -> ShortestPathTree {
    grow_tree(graph, source, Direction::Forward, max_distance, None)
}

fn grow_tree<G: RoutingGraph>(
    graph:        &G,
    source:       NodeId,
    direction:    Direction,
    max_distance: f64,
    target:       Option<NodeId>,
) -> ShortestPathTree {
    let mut dist: FxHashMap<NodeId, f64> = FxHashMap::default();
    let mut prev: FxHashMap<NodeId, EdgeId> = FxHashMap::default();
    dist.insert(source, 0.0);

    // Min-heap: (cost, node).  Reverse makes BinaryHeap (max) behave as a
    // min-heap; the NodeId secondary key makes tie-breaking deterministic.
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(0.0), source)));

    while let Some(Reverse((Cost(cost), node))) = heap.pop() {
        if Some(node) == target {
            break;
        }
        // Skip stale heap entries.
        if cost > dist[&node] {
            continue;
        }

        for edge in graph.edges(node, direction) {
            if !graph.is_accessible(edge) {
                continue;
            }
            let next = graph.edge_adjacent(edge, direction);
            let new_cost = cost + graph.edge_distance(edge);
            if new_cost > max_distance {
                continue;
            }
            if dist.get(&next).is_none_or(|&d| new_cost < d) {
                dist.insert(next, new_cost);
                prev.insert(next, edge);
                heap.push(Reverse((Cost(new_cost), next)));
            }
        }
    }

    ShortestPathTree { source, dist, prev }
}

// ── Bidirectional internals ───────────────────────────────────────────────────

struct Side {
    direction: Direction,
    dist: FxHashMap<NodeId, f64>,
    prev: FxHashMap<NodeId, EdgeId>,
    heap: BinaryHeap<Reverse<(Cost, NodeId)>>,
}

impl Side {
    fn new(direction: Direction, root: NodeId) -> Self {
        let mut side = Side {
            direction,
            dist: FxHashMap::default(),
            prev: FxHashMap::default(),
            heap: BinaryHeap::new(),
        };
        side.dist.insert(root, 0.0);
        side.heap.push(Reverse((Cost(0.0), root)));
        side
    }

    fn top(&self) -> f64 {
        self.heap.peek().map_or(f64::INFINITY, |Reverse((c, _))| c.0)
    }
}

fn bidirectional<G: RoutingGraph>(graph: &G, from: NodeId, to: NodeId) -> Option<Route> {
    let mut fwd = Side::new(Direction::Forward, from);
    let mut bwd = Side::new(Direction::Reverse, to);
    let mut best = f64::INFINITY;
    let mut meet: Option<NodeId> = None;

    // Stop once no unsettled pair of labels can beat the best meeting point.
    while fwd.top() + bwd.top() < best {
        let (side, other) = if fwd.top() <= bwd.top() {
            (&mut fwd, &bwd)
        } else {
            (&mut bwd, &fwd)
        };
        let Some(Reverse((Cost(cost), node))) = side.heap.pop() else { break };
        if cost > side.dist[&node] {
            continue;
        }

        for edge in graph.edges(node, side.direction) {
            if !graph.is_accessible(edge) {
                continue;
            }
            let next = graph.edge_adjacent(edge, side.direction);
            let new_cost = cost + graph.edge_distance(edge);
            if side.dist.get(&next).is_none_or(|&d| new_cost < d) {
                side.dist.insert(next, new_cost);
                side.prev.insert(next, edge);
                side.heap.push(Reverse((Cost(new_cost), next)));
            }
            if let Some(&back) = other.dist.get(&next) {
                let total = side.dist[&next] + back;
                if total < best {
                    best = total;
                    meet = Some(next);
                }
            }
        }
    }

    let meet = meet?;

    // Forward half: walk prev edges back to `from`.
    let mut edges = Vec::new();
    let mut cur = meet;
    while let Some(&e) = fwd.prev.get(&cur) {
        edges.push(e);
        cur = graph.edge_from(e);
    }
    edges.reverse();

    // Backward half: walk prev edges on to `to`.
    let mut cur = meet;
    while let Some(&e) = bwd.prev.get(&cur) {
        edges.push(e);
        cur = graph.edge_to(e);
    }

    Some(Route { edges, distance_m: best })
}
