//! `lm-network` — road network, link snapping, query graphs, and routing.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                      |
//! |-------------|---------------------------------------------------------------|
//! | [`graph`]   | `RoutingGraph` trait, `Direction`                             |
//! | [`network`] | `RoadNetwork` (CSR + segment R-tree), `RoadNetworkBuilder`    |
//! | [`snap`]    | `Snap`, `SnapNode` — projections of points onto links         |
//! | [`query`]   | `QueryGraph` — virtual nodes at snap points                   |
//! | [`router`]  | `Router` trait, `Route`, Dijkstra and bidirectional routers   |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public value types.     |

pub mod error;
pub mod graph;
pub mod network;
pub mod query;
pub mod router;
pub mod snap;


pub use error::{NetworkError, NetworkResult};
pub use graph::{Direction, RoutingGraph};
pub use network::{Access, LinkAttributes, LinkSpec, RoadNetwork, RoadNetworkBuilder};
pub use query::QueryGraph;
pub use router::{BidirectionalRouter, DijkstraRouter, Route, Router, ShortestPathTree, shortest_path_tree};
pub use snap::{Snap, SnapNode};
