//! Road network representation and builder.
//!
//! # Data layout
//!
//! Every link contributes exactly two directed edges: forward (along the
//! digitised geometry) and reversed.  Both are always present; a direction
//! that may not be driven reports an infinite weight.  Toggling access with
//! [`RoadNetwork::set_link_access`] therefore never changes the topology.
//!
//! The graph uses **Compressed Sparse Row (CSR)** format.  Edges are sorted
//! by source node, so the outgoing edges of node `n` are the contiguous
//! `EdgeId`s `node_out_start[n] .. node_out_start[n+1]`.  A second row
//! pointer (`node_in_start`) indexes `in_edges`, which lists edge ids sorted
//! by target node, for upstream searches.
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) holds every link *segment*, so snapping finds the
//! true perpendicular distance to a link rather than the distance to its
//! nearest vertex.

use std::borrow::Cow;

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::{FxHashMap, FxHashSet};

use lm_core::geo::segment_fraction;
use lm_core::{EdgeId, LinkId, NodeId, Point, polyline_length, project_onto_polyline};

use crate::graph::{Direction, RoutingGraph};
use crate::snap::Snap;
use crate::{NetworkError, NetworkResult};

// ── Link description ──────────────────────────────────────────────────────────

/// Which travel directions of a link are open.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Access {
    pub forward:  bool,
    pub backward: bool,
}

impl Access {
    pub const BOTH:     Access = Access { forward: true,  backward: true  };
    pub const FORWARD:  Access = Access { forward: true,  backward: false };
    pub const BACKWARD: Access = Access { forward: false, backward: true  };
    pub const NONE:     Access = Access { forward: false, backward: false };

    #[inline]
    pub fn allows(self, reversed: bool) -> bool {
        if reversed { self.backward } else { self.forward }
    }

    #[inline]
    pub fn any(self) -> bool {
        self.forward || self.backward
    }
}

impl Default for Access {
    fn default() -> Self {
        Self::BOTH
    }
}

/// Discrete per-link attributes, exposed through a fixed schema.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkAttributes {
    /// Administrative region code (e.g. a municipality), if known.
    pub region: Option<u32>,
    /// Functional road class; 0 is the most important.
    pub road_class: u8,
}

/// Input description of one link for [`RoadNetworkBuilder::add_link`].
#[derive(Clone, Debug)]
pub struct LinkSpec {
    pub id:         LinkId,
    pub from:       NodeId,
    pub to:         NodeId,
    /// Intermediate shape points between `from` and `to` (may be empty).
    pub shape:      Vec<Point>,
    pub access:     Access,
    pub speed_kmh:  f64,
    pub attributes: LinkAttributes,
}

impl LinkSpec {
    /// A straight, two-way link at 50 km/h with default attributes.
    pub fn new(id: LinkId, from: NodeId, to: NodeId) -> Self {
        Self {
            id,
            from,
            to,
            shape:      Vec::new(),
            access:     Access::BOTH,
            speed_kmh:  50.0,
            attributes: LinkAttributes::default(),
        }
    }

    pub fn shape(mut self, shape: Vec<Point>) -> Self {
        self.shape = shape;
        self
    }

    pub fn access(mut self, access: Access) -> Self {
        self.access = access;
        self
    }

    pub fn speed_kmh(mut self, speed_kmh: f64) -> Self {
        self.speed_kmh = speed_kmh;
        self
    }

    pub fn region(mut self, region: u32) -> Self {
        self.attributes.region = Some(region);
        self
    }

    pub fn road_class(mut self, road_class: u8) -> Self {
        self.attributes.road_class = road_class;
        self
    }
}

// ── R-tree segment entry ──────────────────────────────────────────────────────

/// One straight segment of a link's geometry.
#[derive(Clone)]
struct SegmentEntry {
    a:    [f64; 2],
    b:    [f64; 2],
    link: u32,
}

impl RTreeObject for SegmentEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.a, self.b)
    }
}

impl PointDistance for SegmentEntry {
    /// Squared perpendicular distance to the segment (clamped to its ends).
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let (a, b) = (Point::new(self.a[0], self.a[1]), Point::new(self.b[0], self.b[1]));
        let p = Point::new(point[0], point[1]);
        let d = p.distance(a.lerp(b, segment_fraction(p, a, b)));
        d * d
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed road graph in CSR format plus a segment index for snapping.
///
/// All fields are `pub` for direct indexed access on hot paths.  Do not
/// construct directly; use [`RoadNetworkBuilder`].
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    /// Position of each node.  Indexed by `NodeId`.
    pub node_pos: Vec<Point>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    /// Outgoing edges of node `n` are `node_out_start[n] .. node_out_start[n+1]`.
    pub node_out_start: Vec<u32>,

    /// Incoming edges of node `n` are `in_edges[node_in_start[n] .. node_in_start[n+1]]`.
    pub node_in_start: Vec<u32>,

    /// Edge ids sorted by target node.
    pub in_edges: Vec<EdgeId>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    pub edge_from: Vec<NodeId>,
    pub edge_to:   Vec<NodeId>,

    /// Index into the link arrays below.
    pub edge_link: Vec<u32>,

    /// `true` for the edge running against the link geometry.
    pub edge_reversed: Vec<bool>,

    /// Travel time in seconds, regardless of access.
    pub edge_time_s: Vec<f64>,

    // ── Link data (indexed by link index) ─────────────────────────────────
    pub link_ids:        Vec<LinkId>,
    /// Full geometry including both end nodes.
    pub link_geometry:   Vec<Vec<Point>>,
    pub link_length_m:   Vec<f64>,
    pub link_access:     Vec<Access>,
    pub link_attributes: Vec<LinkAttributes>,
    /// `[forward, reversed]` edge of each link.
    pub link_edges:      Vec<[EdgeId; 2]>,

    link_index: FxHashMap<LinkId, u32>,
    turn_costs: FxHashMap<(EdgeId, EdgeId), f64>,
    spatial_idx: RTree<SegmentEntry>,
}

impl RoadNetwork {
    /// Construct an empty network with no nodes or links.
    pub fn empty() -> Self {
        // An empty builder cannot fail validation.
        match RoadNetworkBuilder::new().build() {
            Ok(network) => network,
            Err(_) => unreachable!("empty network is always valid"),
        }
    }

    pub fn link_count(&self) -> usize {
        self.link_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    // ── Link lookups ──────────────────────────────────────────────────────

    fn link_idx(&self, link: LinkId) -> NetworkResult<usize> {
        self.link_index
            .get(&link)
            .map(|&i| i as usize)
            .ok_or(NetworkError::LinkNotFound(link))
    }

    /// The directed edge travelling `link` forward or reversed.
    pub fn link_edge(&self, link: LinkId, reversed: bool) -> NetworkResult<EdgeId> {
        let i = self.link_idx(link)?;
        Ok(self.link_edges[i][reversed as usize])
    }

    pub fn link_access(&self, link: LinkId) -> NetworkResult<Access> {
        Ok(self.link_access[self.link_idx(link)?])
    }

    pub fn link_length(&self, link: LinkId) -> NetworkResult<f64> {
        Ok(self.link_length_m[self.link_idx(link)?])
    }

    /// Restrict or lift access on `link`.  Returns the previous access.
    ///
    /// Requires `&mut self`, so it can never race with a running search.
    pub fn set_link_access(&mut self, link: LinkId, access: Access) -> NetworkResult<Access> {
        let i = self.link_idx(link)?;
        let previous = std::mem::replace(&mut self.link_access[i], access);
        tracing::debug!(%link, ?previous, ?access, "link access changed");
        Ok(previous)
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// All links with at least one open direction that pass within `radius`
    /// of `point`, projected onto their full geometry.
    ///
    /// Sorted by ascending distance, then by link id.
    pub fn find_nearest_links(&self, point: Point, radius: f64) -> Vec<Snap> {
        let mut seen: FxHashSet<u32> = FxHashSet::default();
        let mut snaps: Vec<Snap> = self
            .spatial_idx
            .locate_within_distance(point.as_array(), radius * radius)
            .filter(|seg| seen.insert(seg.link))
            .filter(|seg| self.link_access[seg.link as usize].any())
            .filter_map(|seg| self.snap_to_link(point, seg.link as usize))
            .filter(|snap| snap.distance <= radius)
            .collect();
        snaps.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.link.cmp(&b.link)));
        snaps
    }

    /// Distance to the nearest open link within `radius`, if any.
    pub fn nearest_link_distance(&self, point: Point, radius: f64) -> Option<f64> {
        self.find_nearest_links(point, radius).first().map(|s| s.distance)
    }

    fn snap_to_link(&self, point: Point, link: usize) -> Option<Snap> {
        let projection = project_onto_polyline(point, &self.link_geometry[link])?;
        let [forward_edge, backward_edge] = self.link_edges[link];
        Some(Snap {
            link: self.link_ids[link],
            forward_edge,
            backward_edge,
            point: projection.point,
            distance: projection.distance,
            fraction: projection.fraction,
        })
    }
}

impl RoutingGraph for RoadNetwork {
    fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    #[inline]
    fn node_position(&self, node: NodeId) -> Point {
        self.node_pos[node.index()]
    }

    /// Contiguous CSR scan — no heap allocation.
    #[inline]
    fn edges(&self, node: NodeId, direction: Direction) -> impl Iterator<Item = EdgeId> + '_ {
        let row = match direction {
            Direction::Forward => &self.node_out_start,
            Direction::Reverse => &self.node_in_start,
        };
        let start = row[node.index()] as usize;
        let end   = row[node.index() + 1] as usize;
        (start..end).map(move |i| match direction {
            Direction::Forward => EdgeId(i as u32),
            Direction::Reverse => self.in_edges[i],
        })
    }

    #[inline]
    fn edge_from(&self, edge: EdgeId) -> NodeId {
        self.edge_from[edge.index()]
    }

    #[inline]
    fn edge_to(&self, edge: EdgeId) -> NodeId {
        self.edge_to[edge.index()]
    }

    #[inline]
    fn edge_distance(&self, edge: EdgeId) -> f64 {
        self.link_length_m[self.edge_link[edge.index()] as usize]
    }

    #[inline]
    fn edge_time(&self, edge: EdgeId) -> f64 {
        self.edge_time_s[edge.index()]
    }

    /// Fastest-route weighting: travel time, or infinity when closed.
    #[inline]
    fn edge_weight(&self, edge: EdgeId) -> f64 {
        let link = self.edge_link[edge.index()] as usize;
        if self.link_access[link].allows(self.edge_reversed[edge.index()]) {
            self.edge_time_s[edge.index()]
        } else {
            f64::INFINITY
        }
    }

    fn turn_cost(&self, incoming: EdgeId, outgoing: EdgeId, _via: NodeId) -> f64 {
        self.turn_costs.get(&(incoming, outgoing)).copied().unwrap_or(0.0)
    }

    #[inline]
    fn edge_link(&self, edge: EdgeId) -> LinkId {
        self.link_ids[self.edge_link[edge.index()] as usize]
    }

    #[inline]
    fn edge_reversed(&self, edge: EdgeId) -> bool {
        self.edge_reversed[edge.index()]
    }

    #[inline]
    fn link_attributes(&self, edge: EdgeId) -> &LinkAttributes {
        &self.link_attributes[self.edge_link[edge.index()] as usize]
    }

    fn edge_geometry(&self, edge: EdgeId) -> Cow<'_, [Point]> {
        let geometry = &self.link_geometry[self.edge_link[edge.index()] as usize];
        if self.edge_reversed[edge.index()] {
            Cow::Owned(geometry.iter().rev().copied().collect())
        } else {
            Cow::Borrowed(geometry)
        }
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// # Example
///
/// ```
/// use lm_core::{LinkId, Point};
/// use lm_network::{LinkSpec, RoadNetworkBuilder, RoutingGraph};
///
/// let mut b = RoadNetworkBuilder::new();
/// let a = b.add_node(Point::new(0.0, 0.0));
/// let c = b.add_node(Point::new(120.0, 0.0));
/// b.add_link(LinkSpec::new(LinkId(1), a, c));
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 2); // one edge per direction
/// ```
pub struct RoadNetworkBuilder {
    nodes: Vec<Point>,
    links: Vec<LinkSpec>,
    turns: Vec<RawTurn>,
}

struct RawTurn {
    via:  NodeId,
    from: LinkId,
    to:   LinkId,
    cost: f64,
}

struct RawEdge {
    from:     NodeId,
    to:       NodeId,
    link:     u32,
    reversed: bool,
    time_s:   f64,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), links: Vec::new(), turns: Vec::new() }
    }

    pub fn with_capacity(nodes: usize, links: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            links: Vec::with_capacity(links),
            turns: Vec::new(),
        }
    }

    /// Add a node and return its `NodeId` (sequential from 0).
    pub fn add_node(&mut self, pos: Point) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        id
    }

    pub fn add_link(&mut self, link: LinkSpec) {
        self.links.push(link);
    }

    /// Add a turn cost (seconds) for driving from `from` onto `to` at `via`.
    pub fn add_turn_cost(&mut self, via: NodeId, from: LinkId, to: LinkId, cost: f64) {
        self.turns.push(RawTurn { via, from, to, cost });
    }

    /// Forbid driving from `from` onto `to` at `via`.
    pub fn add_turn_restriction(&mut self, via: NodeId, from: LinkId, to: LinkId) {
        self.add_turn_cost(via, from, to, f64::INFINITY);
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn link_count(&self) -> usize { self.links.len() }

    /// Validate the links, then build the CSR arrays and bulk-load the
    /// segment R-tree.
    ///
    /// Time complexity: O(E log E) for the edge sorts + O(S log S) for the
    /// R-tree bulk load, where S is the number of link segments.
    pub fn build(self) -> NetworkResult<RoadNetwork> {
        let node_count = self.nodes.len();

        // ── Links ─────────────────────────────────────────────────────────
        let mut link_index: FxHashMap<LinkId, u32> = FxHashMap::default();
        let mut link_ids        = Vec::with_capacity(self.links.len());
        let mut link_geometry   = Vec::with_capacity(self.links.len());
        let mut link_length_m   = Vec::with_capacity(self.links.len());
        let mut link_access     = Vec::with_capacity(self.links.len());
        let mut link_attributes = Vec::with_capacity(self.links.len());
        let mut raw: Vec<RawEdge> = Vec::with_capacity(self.links.len() * 2);

        for (i, spec) in self.links.into_iter().enumerate() {
            for node in [spec.from, spec.to] {
                if node.index() >= node_count {
                    return Err(NetworkError::NodeNotFound(node));
                }
            }
            if !(spec.speed_kmh.is_finite() && spec.speed_kmh > 0.0) {
                return Err(NetworkError::InvalidLink {
                    link:   spec.id,
                    reason: format!("speed must be positive, got {}", spec.speed_kmh),
                });
            }
            if link_index.insert(spec.id, i as u32).is_some() {
                return Err(NetworkError::DuplicateLink(spec.id));
            }

            let mut geometry = Vec::with_capacity(spec.shape.len() + 2);
            geometry.push(self.nodes[spec.from.index()]);
            geometry.extend_from_slice(&spec.shape);
            geometry.push(self.nodes[spec.to.index()]);
            let length = polyline_length(&geometry);
            let time_s = length / (spec.speed_kmh / 3.6);

            raw.push(RawEdge { from: spec.from, to: spec.to, link: i as u32, reversed: false, time_s });
            raw.push(RawEdge { from: spec.to, to: spec.from, link: i as u32, reversed: true, time_s });

            link_ids.push(spec.id);
            link_geometry.push(geometry);
            link_length_m.push(length);
            link_access.push(spec.access);
            link_attributes.push(spec.attributes);
        }

        // ── CSR by source node (stable, so link order breaks ties) ────────
        raw.sort_by_key(|e| e.from.0);
        let edge_count = raw.len();

        let edge_from:     Vec<NodeId> = raw.iter().map(|e| e.from).collect();
        let edge_to:       Vec<NodeId> = raw.iter().map(|e| e.to).collect();
        let edge_link:     Vec<u32>    = raw.iter().map(|e| e.link).collect();
        let edge_reversed: Vec<bool>   = raw.iter().map(|e| e.reversed).collect();
        let edge_time_s:   Vec<f64>    = raw.iter().map(|e| e.time_s).collect();

        let mut link_edges = vec![[EdgeId::INVALID; 2]; link_ids.len()];
        for (i, e) in raw.iter().enumerate() {
            link_edges[e.link as usize][e.reversed as usize] = EdgeId(i as u32);
        }

        let node_out_start = row_pointer(node_count, edge_from.iter());
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // ── Reverse CSR by target node ────────────────────────────────────
        let mut in_edges: Vec<EdgeId> = (0..edge_count as u32).map(EdgeId).collect();
        in_edges.sort_by_key(|e| edge_to[e.index()].0);
        let node_in_start = row_pointer(node_count, edge_to.iter());

        // ── Turn costs ────────────────────────────────────────────────────
        let mut turn_costs: FxHashMap<(EdgeId, EdgeId), f64> = FxHashMap::default();
        for turn in self.turns {
            let edge_of = |link: LinkId| -> NetworkResult<[EdgeId; 2]> {
                link_index
                    .get(&link)
                    .map(|&i| link_edges[i as usize])
                    .ok_or(NetworkError::LinkNotFound(link))
            };
            let incoming = edge_of(turn.from)?
                .into_iter()
                .find(|e| edge_to[e.index()] == turn.via);
            let outgoing = edge_of(turn.to)?
                .into_iter()
                .find(|e| edge_from[e.index()] == turn.via);
            match (incoming, outgoing) {
                (Some(i), Some(o)) => {
                    turn_costs.insert((i, o), turn.cost);
                }
                _ => {
                    return Err(NetworkError::InvalidTurn { from: turn.from, to: turn.to, via: turn.via });
                }
            }
        }

        // ── Segment R-tree ────────────────────────────────────────────────
        let segments: Vec<SegmentEntry> = link_geometry
            .iter()
            .enumerate()
            .flat_map(|(i, geometry)| {
                geometry.windows(2).map(move |s| SegmentEntry {
                    a:    s[0].as_array(),
                    b:    s[1].as_array(),
                    link: i as u32,
                })
            })
            .collect();
        let spatial_idx = RTree::bulk_load(segments);

        tracing::debug!(nodes = node_count, links = link_ids.len(), edges = edge_count, "road network built");

        Ok(RoadNetwork {
            node_pos: self.nodes,
            node_out_start,
            node_in_start,
            in_edges,
            edge_from,
            edge_to,
            edge_link,
            edge_reversed,
            edge_time_s,
            link_ids,
            link_geometry,
            link_length_m,
            link_access,
            link_attributes,
            link_edges,
            link_index,
            turn_costs,
            spatial_idx,
        })
    }
}

impl Default for RoadNetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// CSR row pointer from the per-edge key node (source or target).
fn row_pointer<'a>(node_count: usize, keys: impl Iterator<Item = &'a NodeId>) -> Vec<u32> {
    let mut start = vec![0u32; node_count + 1];
    for node in keys {
        start[node.index() + 1] += 1;
    }
    for i in 1..=node_count {
        start[i] += start[i - 1];
    }
    start
}
