//! The `Sim` struct and its four-phase tick loop.

use dm_core::{DeviceId, GeoPoint, SimClock, SimConfig, Tick};
use dm_device::{DeviceRngs, DeviceStore};
use dm_disaster::Timeline;
use dm_mobility::{MobilityEngine, StepOutcome};
use dm_network::Network;

use crate::{SimObserver, SimResult};

/// The main simulation runner.
///
/// Holds all simulation state and drives the four-phase tick loop:
///
/// 1. **Force update**: query the disaster timeline at the current tick's
///    timestamp and recompute every node's `attractive_force`/
///    `repelling_force`/`final_force`.
/// 2. **Transition decision** (parallel with the `parallel` feature, one
///    [`MobilityEngine::step`] call per device): decide the next
///    `(current_node, target_node)` pair and sample a new position.
/// 3. **Apply** (sequential, ascending `DeviceId` for determinism): write
///    each device's computed outcome into [`DeviceStore`].
/// 4. **Export**: [`SimObserver::on_tick_end`] is handed the tick's date
///    string and the updated store; an observer backed by `dm-output`
///    writes the per-tick file.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    /// Global configuration (start/end, seed, tick duration, …).
    pub config: SimConfig,

    /// Simulation clock — tracks the current tick and maps it to a date.
    pub clock: SimClock,

    /// Population-weighted adjacency graph. Forces are recomputed on its
    /// nodes every tick; never mutated otherwise.
    pub network: Network,

    /// Disaster timeline queried once per tick. `None` means no disaster is
    /// ever active during this run.
    pub timeline: Option<Timeline>,

    /// Device positions and trajectories (`current_node`, `target_node`,
    /// `lon`, `lat`).
    pub devices: DeviceStore,

    /// Per-device deterministic RNGs.
    pub rngs: DeviceRngs,
}

impl Sim {
    // ── Public API ──────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary. Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        loop {
            let now = self.clock.current_tick;
            if now >= self.config.end_tick() {
                break;
            }

            observer.on_tick_start(now);
            self.process_tick();
            let date = self.clock.current_date_string();
            observer.on_tick_end(now, &date, &self.devices);

            self.clock.advance();
        }
        observer.on_sim_end(self.clock.current_tick);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            let now = self.clock.current_tick;
            observer.on_tick_start(now);
            self.process_tick();
            let date = self.clock.current_date_string();
            observer.on_tick_end(now, &date, &self.devices);
            self.clock.advance();
        }
        Ok(())
    }

    // ── Core tick processing ───────────────────────────────────────────

    fn process_tick(&mut self) {
        // ── Phase 1: force update ──────────────────────────────────────
        let field = self
            .timeline
            .as_ref()
            .and_then(|timeline| timeline.field_at(self.clock.current_datetime()));
        dm_mobility::update_forces(&mut self.network, field);
        let disaster_active = field.is_some();

        // ── Phase 2: transition decision + position sampling (produce) ──
        //
        // Reads are taken as plain copies before the (possibly parallel)
        // step so the step phase never touches `self.devices` mutably.
        let network = &self.network;
        let rngs = &mut self.rngs;
        let ids: Vec<DeviceId> = self.devices.device_ids().collect();
        let current = self.devices.current_node.clone();
        let target = self.devices.target_node.clone();
        let lon = self.devices.lon.clone();
        let lat = self.devices.lat.clone();

        let engine = MobilityEngine::new(network);

        #[cfg(not(feature = "parallel"))]
        let outcomes: Vec<StepOutcome> = ids
            .iter()
            .map(|&id| {
                let rng = rngs.get_mut(id);
                let prev_pos = GeoPoint::new(lat[id.index()], lon[id.index()]);
                engine.step(current[id.index()], target[id.index()], prev_pos, disaster_active, rng)
            })
            .collect();

        #[cfg(feature = "parallel")]
        let outcomes: Vec<StepOutcome> = {
            use rayon::prelude::*;

            // `get_many_mut` returns disjoint &mut refs indexed by unique DeviceIds.
            let rng_refs = rngs.get_many_mut(&ids);

            ids.par_iter()
                .zip(rng_refs.into_par_iter())
                .map(|(&id, rng)| {
                    let prev_pos = GeoPoint::new(lat[id.index()], lon[id.index()]);
                    engine.step(
                        current[id.index()],
                        target[id.index()],
                        prev_pos,
                        disaster_active,
                        rng,
                    )
                })
                .collect()
        };

        // ── Phase 3: apply (consume) ─────────────────────────────────
        //
        // `ids` is already ascending `DeviceId` order (built from
        // `device_ids()`), so sequential application here is deterministic
        // regardless of whether the step phase ran in parallel.
        for (&id, outcome) in ids.iter().zip(outcomes) {
            self.devices.current_node[id.index()] = outcome.current_node;
            self.devices.target_node[id.index()] = outcome.target_node;
            self.devices.lon[id.index()] = outcome.position.lon;
            self.devices.lat[id.index()] = outcome.position.lat;
        }
    }
}

