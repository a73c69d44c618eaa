//! `dm-mobility` — per-tick force computation, transition decisions, and
//! position sampling for the disaster-mobility simulation framework.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|----------------------------------------------------------|
//! | [`forces`]    | `update_forces` — attract/repel/final per node             |
//! | [`transition`]| `decide_transition` — at-rest softmax / in-transit p_reach  |
//! | [`position`]  | `sample_position` — noisy convex-combination placement      |
//! | [`engine`]    | `MobilityEngine` — ties the three together for dm-sim       |
//! | [`error`]     | `MobilityError`, `MobilityResult<T>`                        |
//!
//! # Movement model
//!
//! Unlike the framework this crate is descended from, there is no
//! teleport-at-arrival route cache here. Every device is always either at
//! rest in a node or "in transit" between exactly two adjacent nodes, and
//! every tick resolves fully: at rest, a device either stays or commits to a
//! neighbor; in transit, a single probabilistic draw decides arrival or
//! turning back. There is no multi-tick route state to carry.

pub mod engine;
pub mod error;
pub mod forces;
pub mod position;
pub mod transition;

pub use engine::{MobilityEngine, StepOutcome};
pub use error::{MobilityError, MobilityResult};
pub use forces::update_forces;
pub use position::sample_position;
pub use transition::decide_transition;
