//! `MobilityEngine` — the single entry point dm-sim calls once per device per
//! tick: decide the transition, then sample the resulting position.

use dm_core::{DeviceRng, GeoPoint, NodeId};
use dm_network::Network;

use crate::{position, transition};

/// Borrows the built [`Network`] (with its per-tick forces already updated
/// by [`crate::forces::update_forces`]) and exposes the per-device step.
pub struct MobilityEngine<'a> {
    network: &'a Network,
}

/// The device-visible result of one tick's transition.
pub struct StepOutcome {
    pub current_node: NodeId,
    pub target_node: NodeId,
    pub position: GeoPoint,
}

impl<'a> MobilityEngine<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self { network }
    }

    /// Run the transition decision and position sample for one device.
    ///
    /// `disaster_active` selects whether `final_force` is passed through the
    /// logistic function before being used (see `crate::transition`).
    pub fn step(
        &self,
        current_node: NodeId,
        target_node: NodeId,
        prev_position: GeoPoint,
        disaster_active: bool,
        rng: &mut DeviceRng,
    ) -> StepOutcome {
        let (new_current, new_target) = transition::decide_transition(
            current_node,
            target_node,
            self.network,
            disaster_active,
            rng,
        );
        let position =
            position::sample_position(prev_position, current_node, new_target, self.network, rng);

        StepOutcome { current_node: new_current, target_node: new_target, position }
    }
}
