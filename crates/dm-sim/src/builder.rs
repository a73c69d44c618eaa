//! Fluent builder for constructing a [`Sim`].

use dm_core::{DeviceId, SimConfig, SimRng};
use dm_device::DeviceStoreBuilder;
use dm_disaster::Timeline;
use dm_network::{sampler, Network};

use crate::{Sim, SimError, SimResult};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`] — start/end, tick duration, seed
/// - A built [`Network`] (nodes, edges, adjacency)
/// - `device_count` — population size
///
/// # Optional inputs
///
/// - [`Timeline`] — if omitted, the force update runs with no active
///   disaster for the whole run
///
/// Initial placement is population-weighted (`dm_network::sampler::
/// initial_device_positions`) — there is no manual `.initial_positions()`
/// override, since the spec defines exactly one placement rule.
pub struct SimBuilder {
    config: SimConfig,
    network: Network,
    device_count: usize,
    timeline: Option<Timeline>,
}

impl SimBuilder {
    pub fn new(config: SimConfig, network: Network, device_count: usize) -> Self {
        Self { config, network, device_count, timeline: None }
    }

    /// Attach a disaster timeline. Queried once per tick during force update.
    pub fn timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = Some(timeline);
        self
    }

    /// Validate inputs, place devices, and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim> {
        if self.network.is_empty() {
            return Err(SimError::Config("network has no nodes".into()));
        }
        if self.device_count == 0 {
            return Err(SimError::Config("device count must be positive".into()));
        }

        let mut sim_rng = SimRng::new(self.config.seed);
        let (mut devices, rngs) =
            DeviceStoreBuilder::new(self.device_count, self.config.seed).build();

        let ids: Vec<DeviceId> = devices.device_ids().collect();
        let placements = sampler::initial_device_positions(&ids, &self.network, &mut sim_rng);
        for (id, node, pos) in placements {
            devices.current_node[id.index()] = node;
            devices.target_node[id.index()] = node;
            devices.lon[id.index()] = pos.lon;
            devices.lat[id.index()] = pos.lat;
        }

        Ok(Sim {
            clock: self.config.make_clock(),
            config: self.config,
            network: self.network,
            timeline: self.timeline,
            devices,
            rngs,
        })
    }
}
