//! Projections of external points onto network links.

use lm_core::{EdgeId, LinkId, NodeId, Point};

use crate::RoadNetwork;

/// Snapped positions closer than this to a link end are treated as lying on
/// the end node itself.
const TOWER_TOLERANCE_M: f64 = 1e-6;

/// The projection of a point onto one link.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snap {
    pub link: LinkId,
    /// Edge travelling the link along its geometry.
    pub forward_edge: EdgeId,
    /// Edge travelling the link against its geometry.
    pub backward_edge: EdgeId,
    /// The snapped position on the link.
    pub point: Point,
    /// Distance from the query point to `point`.
    pub distance: f64,
    /// Position along the link geometry, in `[0, 1]`.
    pub fraction: f64,
}

/// The graph node a snap resolves to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SnapNode {
    /// The snap lies on an existing junction/end node.
    Tower(NodeId),
    /// The snap lies strictly inside the link; a query graph gives it a
    /// virtual node.
    Interior(LinkId),
}

impl Snap {
    /// The directed edge for the requested travel direction.
    #[inline]
    pub fn edge(&self, reversed: bool) -> EdgeId {
        if reversed { self.backward_edge } else { self.forward_edge }
    }

    /// The snap position measured along the directed edge.
    #[inline]
    pub fn directed_fraction(&self, reversed: bool) -> f64 {
        if reversed { 1.0 - self.fraction } else { self.fraction }
    }

    /// Resolve to the closest graph node.  Two snaps of the same point that
    /// share a tower node reach the same set of paths.
    pub fn closest_node(&self, network: &RoadNetwork) -> SnapNode {
        let edge = self.forward_edge.index();
        let length = network.link_length_m[network.edge_link[edge] as usize];
        if self.fraction * length <= TOWER_TOLERANCE_M {
            SnapNode::Tower(network.edge_from[edge])
        } else if (1.0 - self.fraction) * length <= TOWER_TOLERANCE_M {
            SnapNode::Tower(network.edge_to[edge])
        } else {
            SnapNode::Interior(self.link)
        }
    }
}
