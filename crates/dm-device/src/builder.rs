//! Fluent builder for constructing `DeviceStore` + `DeviceRngs` in one step.
//!
//! # Usage
//!
//! ```rust
//! use dm_device::DeviceStoreBuilder;
//!
//! #[derive(Default)]
//! struct HealthState { infected: bool }
//!
//! let (mut store, mut rngs) = DeviceStoreBuilder::new(10_000, /*seed=*/ 42)
//!     .register_component::<HealthState>()
//!     .build();
//!
//! assert_eq!(store.count, 10_000);
//! assert_eq!(rngs.len(),  10_000);
//!
//! // Fill in actual values from the node/edge sampler after building.
//! // (All arrays start at sentinel / Default values.)
//! ```

use crate::{ComponentMap, DeviceRngs, DeviceStore};

/// Fluent builder for [`DeviceStore`] + [`DeviceRngs`].
///
/// All arrays are pre-allocated at construction time so later field writes
/// (from the sampler's `initial_device_positions`) are simple indexed
/// assignments, not pushes.
pub struct DeviceStoreBuilder {
    count: usize,
    seed: u64,
    components: ComponentMap,
}

impl DeviceStoreBuilder {
    /// Create a builder for `count` devices using `seed` as the global RNG seed.
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            count,
            seed,
            components: ComponentMap::new(),
        }
    }

    /// Register an application-defined component type `T`.
    ///
    /// Every device will start with `T::default()`. Must be called before
    /// [`build`](Self::build) — components cannot be added after the store
    /// is constructed.
    ///
    /// Calling this twice for the same `T` is harmless (second call is a
    /// no-op).
    pub fn register_component<T: Default + Send + Sync + 'static>(mut self) -> Self {
        self.components.register::<T>(0);
        self
    }

    /// Construct `DeviceStore` and `DeviceRngs`.
    ///
    /// All SoA arrays are allocated and filled with sentinel / `Default`
    /// values. Applications write actual initial state (from
    /// `initial_device_positions`) directly to the `pub` fields of the
    /// returned `DeviceStore`.
    pub fn build(mut self) -> (DeviceStore, DeviceRngs) {
        for _ in 0..self.count {
            self.components.push_defaults();
        }

        let store = DeviceStore::new(self.count, self.components);
        let rngs = DeviceRngs::new(self.count, self.seed);

        (store, rngs)
    }
}
