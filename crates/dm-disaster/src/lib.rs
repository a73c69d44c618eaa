//! `dm-disaster` — parametric disaster fields and their timelines.
//!
//! Grounded on the original generator's
//! `disasters/generic/{normal_disaster_dist,uniform_disaster_dist,earthquake}.py`:
//! a disaster is a time-indexed family of 2-D scalar fields exposing
//! intensity and bearing, generated by decaying an initial amplitude over a
//! fixed step schedule and optionally handing off to a residual field past a
//! continuity timestamp.

pub mod error;
pub mod field;
pub mod timeline;

pub use error::{DisasterError, DisasterResult};
pub use field::{DisasterField, GaussianField, UniformDiskField};
pub use timeline::{DecayMethod, Timeline, TimelineBuilder};
