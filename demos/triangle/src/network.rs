//! Shared demo network.
//!
//! A triangle A–B–C with a one-way spur B→D:
//!
//! ```text
//!            C
//!          /   \
//!      (2)       (3)
//!      /           \
//!     A ────(1)───── B ──(4)──► D
//! ```
//!
//! A–B is 324 m; the detour A–C–B is 225 m + 225 m.  Links 1–3 lie in
//! region 1, the spur in region 2.

use lm_core::{LinkId, NodeId, Point};
use lm_network::{Access, LinkSpec, RoadNetwork, RoadNetworkBuilder};

pub const DIRECT: LinkId = LinkId(1);

/// Returns `(network, [a, b, c, d])`.
pub fn build_network() -> anyhow::Result<(RoadNetwork, [NodeId; 4])> {
    let mut b = RoadNetworkBuilder::with_capacity(4, 4);

    let a = b.add_node(Point::new(0.0, 0.0));
    let bb = b.add_node(Point::new(324.0, 0.0));
    let c = b.add_node(Point::new(162.0, 24_381f64.sqrt()));
    let d = b.add_node(Point::new(524.0, 0.0));

    b.add_link(LinkSpec::new(DIRECT, a, bb).region(1));
    b.add_link(LinkSpec::new(LinkId(2), a, c).region(1));
    b.add_link(LinkSpec::new(LinkId(3), c, bb).region(1));
    b.add_link(LinkSpec::new(LinkId(4), bb, d).access(Access::FORWARD).region(2));

    Ok((b.build()?, [a, bb, c, d]))
}
