//! `dm-network` — population-weighted adjacency graph and polygon/edge
//! position sampling for the disaster-mobility simulation framework.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                    |
//! |-------------|-------------------------------------------------------------|
//! | [`network`] | `Node`, `Edge`, `Network`, `NetworkBuilder`                  |
//! | [`sampler`] | `NodeSamples`, `EdgeSamples`, `initial_device_positions`     |
//! | [`error`]   | `NetworkError`, `NetworkResult<T>`                          |
//!
//! Real road routing is explicitly out of scope: edges model geometric
//! adjacency for the mobility model's neighbor choice, not a weighted
//! shortest-path graph. There is no `Router` trait here.
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                    |
//! |------------|------------------------------------------------------------|
//! | `serde`    | Derives `Serialize`/`Deserialize` on public types.         |
//! | `parallel` | Enables Rayon-parallel bulk polygon sampling.              |

pub mod error;
pub mod network;
pub mod sampler;


pub use error::{NetworkError, NetworkResult};
pub use network::{
    BoundingBox, BuildingPolygon, Edge, Network, NetworkBuilder, Node, Place, RasterCell, RoadLine,
};
pub use sampler::{initial_device_positions, EdgeSamples, NodeSamples, CITY_NOISE, ROAD_NOISE};
