//! The routing-graph capability shared by searches and matchers.
//!
//! # Pluggability
//!
//! Reachability search, routers, and the matchers are generic over
//! [`RoutingGraph`], so they run unchanged on the base [`RoadNetwork`] and on
//! a [`QueryGraph`] overlay with virtual nodes.
//!
//! [`RoadNetwork`]: crate::RoadNetwork
//! [`QueryGraph`]: crate::QueryGraph

use std::borrow::Cow;

use lm_core::{EdgeId, LinkId, NodeId, Point};

use crate::network::LinkAttributes;

/// Which way a search walks the directed edges.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Follow edges from source to target (downstream).
    #[default]
    Forward,
    /// Follow edges from target back to source (upstream).
    Reverse,
}

/// Read-only view of a directed road graph.
///
/// Every edge belongs to exactly one link and has a travel direction along
/// it (`edge_reversed`).  Inaccessible directions report an infinite
/// [`edge_weight`](Self::edge_weight) and must be skipped by searches.
///
/// # Thread safety
///
/// Implementations must be `Sync` so a single graph can back concurrent
/// matcher calls in a batch.
pub trait RoutingGraph: Sync {
    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    /// Position of `node`.
    fn node_position(&self, node: NodeId) -> Point;

    /// Edges adjacent to `node`: outgoing for [`Direction::Forward`],
    /// incoming for [`Direction::Reverse`].
    fn edges(&self, node: NodeId, direction: Direction) -> impl Iterator<Item = EdgeId> + '_;

    fn edge_from(&self, edge: EdgeId) -> NodeId;

    fn edge_to(&self, edge: EdgeId) -> NodeId;

    /// The node reached by walking `edge` in `direction`.
    #[inline]
    fn edge_adjacent(&self, edge: EdgeId, direction: Direction) -> NodeId {
        match direction {
            Direction::Forward => self.edge_to(edge),
            Direction::Reverse => self.edge_from(edge),
        }
    }

    /// Length in metres.
    fn edge_distance(&self, edge: EdgeId) -> f64;

    /// Travel time in seconds.
    fn edge_time(&self, edge: EdgeId) -> f64;

    /// Search weight; `f64::INFINITY` when the edge may not be traversed.
    fn edge_weight(&self, edge: EdgeId) -> f64;

    /// Extra weight for moving from `incoming` onto `outgoing` at `via`.
    /// `f64::INFINITY` forbids the turn.
    fn turn_cost(&self, incoming: EdgeId, outgoing: EdgeId, via: NodeId) -> f64;

    fn edge_link(&self, edge: EdgeId) -> LinkId;

    /// `true` when the edge runs against its link's digitisation direction.
    fn edge_reversed(&self, edge: EdgeId) -> bool;

    fn link_attributes(&self, edge: EdgeId) -> &LinkAttributes;

    /// Ordered coordinates of `edge` in its travel direction.
    fn edge_geometry(&self, edge: EdgeId) -> Cow<'_, [Point]>;

    #[inline]
    fn is_accessible(&self, edge: EdgeId) -> bool {
        self.edge_weight(edge).is_finite()
    }
}
