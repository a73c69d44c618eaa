//! `dm-core` — foundational types for the disaster-mobility simulation
//! framework.
//!
//! This crate is a dependency of every other `dm-*` crate. It intentionally
//! has no `dm-*` dependencies.
//!
//! # What lives here
//!
//! | Module        | Contents                                              |
//! |---------------|---------------------------------------------------------|
//! | [`ids`]       | `DeviceId`, `NodeId`, `EdgeId`                        |
//! | [`geo`]       | `GeoPoint`, haversine distance, bearing, polygon ops  |
//! | [`quadkey`]   | Bing-tile quadkey codec at fixed zoom level           |
//! | [`time`]      | `Tick`, `SimClock`, `SimConfig`                       |
//! | [`rng`]       | `DeviceRng` (per-device), `SimRng` (global)           |
//! | [`config`]    | `Config` — folder layout                              |
//! | [`error_sink`]| `ErrorSink` — append-only warning/error log           |
//! | [`error`]     | `DmError`, `DmResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|-------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod error_sink;
pub mod geo;
pub mod ids;
pub mod quadkey;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::Config;
pub use error::{DmError, DmResult};
pub use error_sink::{ErrorSink, Severity};
pub use geo::{GeoPoint, DEGREE_EQUIVALENT_IN_KM};
pub use ids::{DeviceId, EdgeId, NodeId};
pub use rng::{DeviceRng, SimRng};
pub use time::{SimClock, SimConfig, Tick};
