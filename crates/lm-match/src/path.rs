//! Turning a matched edge sequence into links, fractions, and geometry.

use lm_core::geo::sub_polyline;
use lm_core::{EdgeId, Point, project_onto_polyline};
use lm_network::{RoadNetwork, RoutingGraph};

use crate::result::MatchedLink;

/// A matched edge sequence cut to the input's extent.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchedPath {
    pub links: Vec<MatchedLink>,
    pub start_fraction: f64,
    pub end_fraction: f64,
    /// Geometry of the covered part, in travel order.
    pub geometry: Vec<Point>,
    pub length: f64,
}

/// Cut `edges` at the projections of `first` onto the first edge and `last`
/// onto the last edge.
///
/// On a single-edge path the end fraction never precedes the start fraction.
/// Returns `None` for an empty edge sequence.
pub fn resolve_path(network: &RoadNetwork, edges: &[EdgeId], first: Point, last: Point) -> Option<MatchedPath> {
    let (&head, &tail) = (edges.first()?, edges.last()?);

    let start_fraction = directed_fraction(network, head, first);
    let mut end_fraction = directed_fraction(network, tail, last);
    if edges.len() == 1 {
        end_fraction = end_fraction.max(start_fraction);
    }

    let mut links = Vec::with_capacity(edges.len());
    let mut geometry: Vec<Point> = Vec::new();
    let mut length = 0.0;
    let last_index = edges.len() - 1;

    for (i, &edge) in edges.iter().enumerate() {
        let from = if i == 0 { start_fraction } else { 0.0 };
        let to = if i == last_index { end_fraction } else { 1.0 };

        links.push(MatchedLink {
            link_id: network.edge_link(edge),
            reversed: network.edge_reversed(edge),
            start_fraction: from,
            end_fraction: to,
        });
        length += network.edge_distance(edge) * (to - from);

        let piece = sub_polyline(&network.edge_geometry(edge), from, to);
        let skip = usize::from(geometry.last().is_some_and(|p| piece.first() == Some(p)));
        geometry.extend(piece.into_iter().skip(skip));
    }

    Some(MatchedPath { links, start_fraction, end_fraction, geometry, length })
}

/// Fraction of `point` projected onto `edge`, along its travel direction.
fn directed_fraction(network: &RoadNetwork, edge: EdgeId, point: Point) -> f64 {
    project_onto_polyline(point, &network.edge_geometry(edge)).map_or(0.0, |p| p.fraction)
}
