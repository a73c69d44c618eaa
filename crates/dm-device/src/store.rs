//! Core device storage: `DeviceStore` (SoA data) and `DeviceRngs` (per-device RNG).
//!
//! # Why two structs?
//!
//! The parallel transition-decision phase needs `&mut DeviceRngs` (exclusive
//! mutable access to each device's RNG) and `&DeviceStore` (shared read
//! access to world state) simultaneously. Rust's borrow checker forbids this
//! if both live inside a single struct. Keeping RNGs in a separate
//! `DeviceRngs` struct resolves the conflict cleanly:
//!
//! ```ignore
//! // dm-sim tick loop (simplified):
//! let store: &DeviceStore = &sim.store;
//! let decisions = sim.rngs.inner
//!     .par_iter_mut()
//!     .enumerate()
//!     .map(|(i, rng)| mobility.decide(DeviceId(i as u32), store, rng))
//!     .collect::<Vec<_>>();
//! ```

use dm_core::{DeviceId, DeviceRng, EdgeId, NodeId};

use crate::component::ComponentMap;

// ── DeviceRngs ────────────────────────────────────────────────────────────────

/// Per-device deterministic RNG state, separated from [`DeviceStore`] to
/// enable simultaneous `&mut DeviceRngs` + `&DeviceStore` borrows in the
/// parallel phase.
///
/// `DeviceRngs` is `Send` (the inner `SmallRng` is `Send`) but intentionally
/// not `Sync` — per-device RNG state must never be shared between threads.
/// Rayon's `par_iter_mut()` handles the exclusive-per-thread access pattern.
pub struct DeviceRngs {
    pub inner: Vec<DeviceRng>,
}

impl DeviceRngs {
    /// Allocate and seed `count` per-device RNGs from `global_seed`.
    pub(crate) fn new(count: usize, global_seed: u64) -> Self {
        let inner = (0..count as u32)
            .map(|i| DeviceRng::new(global_seed, DeviceId(i)))
            .collect();
        Self { inner }
    }

    /// Mutable reference to one device's RNG.
    #[inline]
    pub fn get_mut(&mut self, device: DeviceId) -> &mut DeviceRng {
        &mut self.inner[device.index()]
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Return mutable references to the RNGs for a set of devices.
    ///
    /// # Precondition (enforced by caller)
    ///
    /// `devices` must contain no duplicate `DeviceId`s and all indices must
    /// be in-bounds. Both invariants hold when iterating every device in the
    /// store exactly once, which is how `dm-sim` drives the transition phase.
    pub fn get_many_mut(&mut self, devices: &[DeviceId]) -> Vec<&mut DeviceRng> {
        let ptr = self.inner.as_mut_ptr();
        // SAFETY: Every `DeviceId` in `devices` is unique (caller invariant) and
        // within bounds (simulation invariant). Each pointer therefore aliases
        // a distinct element of `self.inner`, so no two references overlap.
        devices
            .iter()
            .map(|d| unsafe { &mut *ptr.add(d.index()) })
            .collect()
    }
}

// ── DeviceStore ───────────────────────────────────────────────────────────────

/// Structure-of-Arrays storage for all device state.
///
/// Every `Vec` field has exactly `count` elements; the `DeviceId` value is
/// the index into all of them:
///
/// ```ignore
/// let pos = (store.lon[device.index()], store.lat[device.index()]);
/// ```
///
/// Application-defined state lives in [`ComponentMap`] and is accessed via
/// [`DeviceStore::component`] / [`DeviceStore::component_mut`].
pub struct DeviceStore {
    /// Number of devices. Equals the length of every SoA `Vec`.
    pub count: usize,

    /// Node the device is currently "at" — the start of its current edge
    /// traversal, or the node it is at rest in when `current_node ==
    /// target_node`.
    pub current_node: Vec<NodeId>,

    /// Node the device is travelling towards. Equal to `current_node` when
    /// the device is at rest.
    pub target_node: Vec<NodeId>,

    /// Current position, WGS-84 degrees.
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,

    /// Reported positional accuracy, when a consumer supplies one. Always
    /// `None` in this implementation — no accuracy model is specified — but
    /// kept as a real column since output rows reserve space for it.
    pub accuracy: Vec<Option<f64>>,

    // ── Application components ────────────────────────────────────────────
    components: ComponentMap,
}

impl DeviceStore {
    /// `true` if there are no devices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterator over all `DeviceId`s in ascending index order.
    pub fn device_ids(&self) -> impl Iterator<Item = DeviceId> + '_ {
        (0..self.count as u32).map(DeviceId)
    }

    /// `true` if the device is at rest in a node (not between nodes).
    #[inline]
    pub fn is_at_rest(&self, device: DeviceId) -> bool {
        self.current_node[device.index()] == self.target_node[device.index()]
    }

    /// `true` if the device is currently in transit between nodes.
    #[inline]
    pub fn is_in_transit(&self, device: DeviceId) -> bool {
        !self.is_at_rest(device)
    }

    /// Current `(lon, lat)` for `device`.
    #[inline]
    pub fn position(&self, device: DeviceId) -> (f64, f64) {
        (self.lon[device.index()], self.lat[device.index()])
    }

    // ── Component access ──────────────────────────────────────────────────

    /// Read-only slice of application component `T`.
    ///
    /// Returns `None` if `T` was not registered before the store was built.
    /// Index by `device.index()` to access a specific device's value.
    pub fn component<T: Default + Send + Sync + 'static>(&self) -> Option<&[T]> {
        self.components.get::<T>()
    }

    /// Mutable reference to the component `Vec<T>`.
    ///
    /// Returns `None` if `T` was not registered. Only call this during the
    /// apply phase (single-threaded write).
    pub fn component_mut<T: Default + Send + Sync + 'static>(&mut self) -> Option<&mut Vec<T>> {
        self.components.get_mut::<T>()
    }

    /// Reference to the whole `ComponentMap` (e.g. for passing to output writers).
    pub fn components(&self) -> &ComponentMap {
        &self.components
    }

    /// Mutable reference to the `ComponentMap` (e.g. for the apply phase).
    pub fn components_mut(&mut self) -> &mut ComponentMap {
        &mut self.components
    }

    // ── Package-private constructor used by DeviceStoreBuilder ────────────

    pub(crate) fn new(count: usize, components: ComponentMap) -> Self {
        Self {
            count,
            current_node: vec![NodeId::INVALID; count],
            target_node: vec![NodeId::INVALID; count],
            lon: vec![0.0; count],
            lat: vec![0.0; count],
            accuracy: vec![None; count],
            components,
        }
    }
}
