//! `lm-core` — foundational types for the `linkmatch` workspace.
//!
//! This crate is a dependency of every other `lm-*` crate.  It has no `lm-*`
//! dependencies and only `thiserror` (plus optional `serde`) externally.
//!
//! # What lives here
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`ids`]      | `NodeId`, `EdgeId`, `LinkId`, `LabelId`                    |
//! | [`cost`]     | `Cost` — totally ordered `f64` heap key                    |
//! | [`geo`]      | `Point`, point-to-polyline projection, polyline utilities  |
//! | [`simplify`] | Douglas–Peucker polyline simplification                    |
//! | [`error`]    | `CoreError` (point parsing), `CoreResult`                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod cost;
pub mod error;
pub mod geo;
pub mod ids;
pub mod simplify;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use cost::Cost;
pub use error::{CoreError, CoreResult};
pub use geo::{Point, Projection, polyline_length, project_onto_polyline};
pub use ids::{EdgeId, LabelId, LinkId, NodeId};
pub use simplify::simplify;
