//! `dm-sim` — tick loop orchestrator for the disaster-mobility simulation
//! framework.
//!
//! # Four-phase tick loop
//!
//! ```text
//! for tick in 0..config.end_tick():
//!   ① Force update  — query the disaster timeline at this tick's date,
//!                      recompute every node's attract/repel/final force.
//!   ② Transition     — per device (parallel with the `parallel` feature):
//!                      decide the next (current_node, target_node) pair
//!                      and sample a new (lon, lat).
//!   ③ Apply          — sequential, ascending DeviceId: write each
//!                      device's computed outcome into DeviceStore.
//!   ④ Export         — SimObserver::on_tick_end hands the tick's date
//!                      string and the store to the observer.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                              |
//! |------------|------------------------------------------------------|
//! | `parallel` | Runs the transition-decision phase on Rayon's pool.  |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use dm_network::NetworkBuilder;
//! use dm_sim::{NoopObserver, SimBuilder};
//!
//! let network = NetworkBuilder::new(&cache, "city").build(&raster, &places, None, None, bbox)?;
//! let mut sim = SimBuilder::new(config, network, 10_000).build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver, SimOutputObserver};
pub use sim::Sim;
