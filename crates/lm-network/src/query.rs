//! Query graph: the base network with links split at snap points.
//!
//! A [`QueryGraph`] borrows a [`RoadNetwork`] and overlays *virtual* nodes
//! at every interior snap, connected by *virtual* edges that replace the
//! split links' base edges.  Virtual ids continue after the base ids:
//!
//! ```text
//! NodeId:  0 .. base.node_count()  |  base.node_count() .. + virtual nodes
//! EdgeId:  0 .. base.edge_count()  |  base.edge_count() .. + virtual edges
//! ```
//!
//! One query graph is built per match call and shared by all the searches of
//! that call.  The base network is never modified.

use std::borrow::Cow;

use rustc_hash::{FxHashMap, FxHashSet};

use lm_core::geo::{point_at_fraction, sub_polyline};
use lm_core::{EdgeId, LinkId, NodeId, Point};

use crate::graph::{Direction, RoutingGraph};
use crate::network::LinkAttributes;
use crate::snap::{Snap, SnapNode};
use crate::RoadNetwork;

/// A piece of a base edge between two consecutive split points.
struct VirtualEdge {
    from: NodeId,
    to:   NodeId,
    base: EdgeId,
    /// Start and end of the piece, as fractions along the base edge.
    start: f64,
    end:   f64,
}

impl VirtualEdge {
    #[inline]
    fn share(&self) -> f64 {
        self.end - self.start
    }
}

/// The base network plus virtual nodes at snap points.
pub struct QueryGraph<'a> {
    base: &'a RoadNetwork,
    virtual_pos:   Vec<Point>,
    virtual_edges: Vec<VirtualEdge>,
    virtual_out:   FxHashMap<NodeId, Vec<EdgeId>>,
    virtual_in:    FxHashMap<NodeId, Vec<EdgeId>>,
    /// Base edges hidden because their link was split.
    replaced:      FxHashSet<EdgeId>,
    /// The node each input snap resolved to, in input order.
    snap_nodes:    Vec<NodeId>,
}

impl<'a> QueryGraph<'a> {
    /// Split the links of `snaps` and create one virtual node per distinct
    /// interior snap position.  Snaps on a link end reuse the tower node.
    pub fn new(base: &'a RoadNetwork, snaps: &[Snap]) -> Self {
        let mut snap_nodes = vec![NodeId::INVALID; snaps.len()];

        // Group interior snaps per link, keeping first-seen link order so
        // virtual ids are deterministic.
        let mut link_order: Vec<LinkId> = Vec::new();
        let mut by_link: FxHashMap<LinkId, Vec<(f64, usize)>> = FxHashMap::default();
        for (i, snap) in snaps.iter().enumerate() {
            match snap.closest_node(base) {
                SnapNode::Tower(node) => snap_nodes[i] = node,
                SnapNode::Interior(link) => {
                    by_link
                        .entry(link)
                        .or_insert_with(|| {
                            link_order.push(link);
                            Vec::new()
                        })
                        .push((snap.fraction, i));
                }
            }
        }

        let mut graph = QueryGraph {
            base,
            virtual_pos:   Vec::new(),
            virtual_edges: Vec::new(),
            virtual_out:   FxHashMap::default(),
            virtual_in:    FxHashMap::default(),
            replaced:      FxHashSet::default(),
            snap_nodes:    Vec::new(),
        };

        for link in link_order {
            let mut splits = by_link.remove(&link).unwrap_or_default();
            splits.sort_by(|a, b| a.0.total_cmp(&b.0));
            let snap = &snaps[splits[0].1];
            graph.split_link(snap.forward_edge, snap.backward_edge, &splits, &mut snap_nodes);
        }

        graph.snap_nodes = snap_nodes;
        tracing::debug!(
            snaps = snaps.len(),
            virtual_nodes = graph.virtual_pos.len(),
            virtual_edges = graph.virtual_edges.len(),
            "query graph built"
        );
        graph
    }

    fn split_link(
        &mut self,
        forward:    EdgeId,
        backward:   EdgeId,
        splits:     &[(f64, usize)],
        snap_nodes: &mut [NodeId],
    ) {
        let base = self.base;
        let geometry = base.edge_geometry(forward);

        // Chain of (fraction, node) from the link start to its end.
        let mut chain: Vec<(f64, NodeId)> = vec![(0.0, base.edge_from(forward))];
        for &(fraction, snap_idx) in splits {
            let same_as_last = chain.len() > 1 && chain[chain.len() - 1].0 == fraction;
            if !same_as_last {
                let node = NodeId((base.node_count() + self.virtual_pos.len()) as u32);
                let pos = point_at_fraction(&geometry, fraction).unwrap_or_default();
                self.virtual_pos.push(pos);
                chain.push((fraction, node));
            }
            snap_nodes[snap_idx] = chain[chain.len() - 1].1;
        }
        chain.push((1.0, base.edge_to(forward)));

        for pair in chain.windows(2) {
            let ((f0, n0), (f1, n1)) = (pair[0], pair[1]);
            self.push_virtual_edge(VirtualEdge { from: n0, to: n1, base: forward, start: f0, end: f1 });
        }
        for pair in chain.windows(2).rev() {
            let ((f0, n0), (f1, n1)) = (pair[0], pair[1]);
            self.push_virtual_edge(VirtualEdge {
                from:  n1,
                to:    n0,
                base:  backward,
                start: 1.0 - f1,
                end:   1.0 - f0,
            });
        }

        self.replaced.insert(forward);
        self.replaced.insert(backward);
    }

    fn push_virtual_edge(&mut self, edge: VirtualEdge) {
        let id = EdgeId((self.base.edge_count() + self.virtual_edges.len()) as u32);
        self.virtual_out.entry(edge.from).or_default().push(id);
        self.virtual_in.entry(edge.to).or_default().push(id);
        self.virtual_edges.push(edge);
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn base(&self) -> &'a RoadNetwork {
        self.base
    }

    /// The node that input snap `i` resolved to.
    pub fn snap_node(&self, i: usize) -> NodeId {
        self.snap_nodes[i]
    }

    pub fn virtual_node_count(&self) -> usize {
        self.virtual_pos.len()
    }

    #[inline]
    fn virtual_edge(&self, edge: EdgeId) -> Option<&VirtualEdge> {
        edge.index()
            .checked_sub(self.base.edge_count())
            .map(|i| &self.virtual_edges[i])
    }

    /// The base edge `edge` is a piece of (itself for base edges).
    pub fn base_edge(&self, edge: EdgeId) -> EdgeId {
        self.virtual_edge(edge).map_or(edge, |v| v.base)
    }

    /// Translate a query-graph path into base edges, merging consecutive
    /// pieces of the same base edge.
    pub fn base_path(&self, edges: &[EdgeId]) -> Vec<EdgeId> {
        let mut path: Vec<EdgeId> = Vec::with_capacity(edges.len());
        for &edge in edges {
            let base = self.base_edge(edge);
            if path.last() != Some(&base) {
                path.push(base);
            }
        }
        path
    }
}

impl RoutingGraph for QueryGraph<'_> {
    fn node_count(&self) -> usize {
        self.base.node_count() + self.virtual_pos.len()
    }

    fn edge_count(&self) -> usize {
        self.base.edge_count() + self.virtual_edges.len()
    }

    fn node_position(&self, node: NodeId) -> Point {
        match node.index().checked_sub(self.base.node_count()) {
            Some(i) => self.virtual_pos[i],
            None => self.base.node_position(node),
        }
    }

    fn edges(&self, node: NodeId, direction: Direction) -> impl Iterator<Item = EdgeId> + '_ {
        let base_edges = (node.index() < self.base.node_count())
            .then(|| self.base.edges(node, direction))
            .into_iter()
            .flatten()
            .filter(move |e| !self.replaced.contains(e));
        let adjacency = match direction {
            Direction::Forward => &self.virtual_out,
            Direction::Reverse => &self.virtual_in,
        };
        let virtual_edges = adjacency.get(&node).into_iter().flatten().copied();
        base_edges.chain(virtual_edges)
    }

    fn edge_from(&self, edge: EdgeId) -> NodeId {
        self.virtual_edge(edge).map_or_else(|| self.base.edge_from(edge), |v| v.from)
    }

    fn edge_to(&self, edge: EdgeId) -> NodeId {
        self.virtual_edge(edge).map_or_else(|| self.base.edge_to(edge), |v| v.to)
    }

    fn edge_distance(&self, edge: EdgeId) -> f64 {
        match self.virtual_edge(edge) {
            Some(v) => self.base.edge_distance(v.base) * v.share(),
            None => self.base.edge_distance(edge),
        }
    }

    fn edge_time(&self, edge: EdgeId) -> f64 {
        match self.virtual_edge(edge) {
            Some(v) => self.base.edge_time(v.base) * v.share(),
            None => self.base.edge_time(edge),
        }
    }

    fn edge_weight(&self, edge: EdgeId) -> f64 {
        match self.virtual_edge(edge) {
            Some(v) => {
                let weight = self.base.edge_weight(v.base);
                if weight.is_finite() { weight * v.share() } else { f64::INFINITY }
            }
            None => self.base.edge_weight(edge),
        }
    }

    /// Turning around at a virtual node is forbidden; elsewhere the base
    /// network's turn cost of the underlying edges applies.
    fn turn_cost(&self, incoming: EdgeId, outgoing: EdgeId, via: NodeId) -> f64 {
        let (base_in, base_out) = (self.base_edge(incoming), self.base_edge(outgoing));
        if via.index() >= self.base.node_count() {
            let u_turn = self.base.edge_link(base_in) == self.base.edge_link(base_out)
                && base_in != base_out;
            if u_turn { f64::INFINITY } else { 0.0 }
        } else {
            self.base.turn_cost(base_in, base_out, via)
        }
    }

    fn edge_link(&self, edge: EdgeId) -> LinkId {
        self.base.edge_link(self.base_edge(edge))
    }

    fn edge_reversed(&self, edge: EdgeId) -> bool {
        self.base.edge_reversed(self.base_edge(edge))
    }

    fn link_attributes(&self, edge: EdgeId) -> &LinkAttributes {
        self.base.link_attributes(self.base_edge(edge))
    }

    fn edge_geometry(&self, edge: EdgeId) -> Cow<'_, [Point]> {
        match self.virtual_edge(edge) {
            Some(v) => Cow::Owned(sub_polyline(&self.base.edge_geometry(v.base), v.start, v.end)),
            None => self.base.edge_geometry(edge),
        }
    }
}
