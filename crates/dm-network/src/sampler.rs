//! Node/edge position sampling: precomputed polygon pools plus on-demand
//! edge interpolation and population-weighted initial placement.

use std::collections::HashMap;

use dm_core::{DeviceId, GeoPoint, NodeId, SimRng};
use rand::seq::SliceRandom;

use crate::network::Network;

/// Noise half-width applied to in-node positions, degrees (~500 m).
pub const CITY_NOISE: f64 = 0.0045;
/// Noise half-width applied to in-transit positions, degrees (~200 m).
pub const ROAD_NOISE: f64 = 0.0018;

const SAMPLE_MAX_PASSES: usize = 10_000;

/// Precomputed pool of points inside each node's polygon, fixed after build.
/// Pool size is at least `node.population`.
pub struct NodeSamples {
    pools: HashMap<NodeId, Vec<GeoPoint>>,
}

impl NodeSamples {
    /// Build one pool per node in `network`.
    ///
    /// With the `parallel` feature, each node's pool is sampled on Rayon's
    /// pool; each node first gets its own deterministic child RNG derived
    /// from `rng` (by node index) so the parallel and sequential builds are
    /// both reproducible and independent of thread scheduling.
    pub fn build(network: &Network, rng: &mut SimRng) -> Self {
        let child_rngs: Vec<SimRng> =
            (0..network.node_count() as u64).map(|i| rng.child(i)).collect();

        #[cfg(not(feature = "parallel"))]
        let pools: HashMap<NodeId, Vec<GeoPoint>> = network
            .nodes
            .iter()
            .zip(child_rngs)
            .enumerate()
            .map(|(i, (node, mut child))| {
                let id = NodeId(i as u32);
                let quota = (node.population as usize).max(1);
                let points = dm_core::geo::sample_points_in_polygon(
                    &node.polygon,
                    child.inner(),
                    quota,
                    SAMPLE_MAX_PASSES,
                );
                (id, points)
            })
            .collect();

        #[cfg(feature = "parallel")]
        let pools: HashMap<NodeId, Vec<GeoPoint>> = {
            use rayon::prelude::*;
            network
                .nodes
                .par_iter()
                .zip(child_rngs.into_par_iter())
                .enumerate()
                .map(|(i, (node, mut child))| {
                    let id = NodeId(i as u32);
                    let quota = (node.population as usize).max(1);
                    let points = dm_core::geo::sample_points_in_polygon(
                        &node.polygon,
                        child.inner(),
                        quota,
                        SAMPLE_MAX_PASSES,
                    );
                    (id, points)
                })
                .collect()
        };

        Self { pools }
    }

    /// Draw `n` points from `node_id`'s pool, with replacement.
    pub fn node_sample(&self, node_id: NodeId, n: usize, rng: &mut SimRng) -> Vec<GeoPoint> {
        match self.pools.get(&node_id) {
            Some(pool) if !pool.is_empty() => (0..n)
                .filter_map(|_| pool.choose(rng.inner()).copied())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn pool_len(&self, node_id: NodeId) -> usize {
        self.pools.get(&node_id).map_or(0, |p| p.len())
    }
}

/// On-demand interpolation between edge endpoints; no precomputed pool.
pub struct EdgeSamples<'a> {
    network: &'a Network,
}

impl<'a> EdgeSamples<'a> {
    pub fn new(network: &'a Network) -> Self {
        Self { network }
    }

    /// Draw `n` points on the segment between `a` and `b`'s centers, at
    /// uniform `t ∈ [0, 1]`: `p = (1−t)·a + t·b`.
    pub fn edge_sample(&self, a: NodeId, b: NodeId, n: usize, rng: &mut SimRng) -> Vec<GeoPoint> {
        let (Ok(na), Ok(nb)) = (self.network.node(a), self.network.node(b)) else {
            return Vec::new();
        };
        (0..n)
            .map(|_| {
                let t: f64 = rng.gen_range(0.0..=1.0);
                interpolate(na.center, nb.center, t)
            })
            .collect()
    }
}

fn interpolate(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    GeoPoint::new(a.lat + (b.lat - a.lat) * t, a.lon + (b.lon - a.lon) * t)
}

/// Assign each device a population-weighted `current_node`, placed at the
/// node's center plus `CITY_NOISE` jitter.
pub fn initial_device_positions(
    ids: &[DeviceId],
    network: &Network,
    rng: &mut SimRng,
) -> Vec<(DeviceId, NodeId, GeoPoint)> {
    if network.is_empty() {
        return Vec::new();
    }
    let total_population: u64 = network.nodes.iter().map(|n| n.population).sum();

    ids.iter()
        .map(|&id| {
            let node = weighted_node_choice(network, total_population, rng);
            let center = network.nodes[node.index()].center;
            let xi_lat: f64 = rng.gen_range(-1.0..=1.0);
            let xi_lon: f64 = rng.gen_range(-1.0..=1.0);
            let pos = GeoPoint::new(
                center.lat + xi_lat * CITY_NOISE,
                center.lon + xi_lon * CITY_NOISE,
            );
            (id, node, pos)
        })
        .collect()
}

fn weighted_node_choice(network: &Network, total_population: u64, rng: &mut SimRng) -> NodeId {
    if total_population == 0 {
        return NodeId(rng.gen_range(0..network.node_count() as u32));
    }
    let mut threshold = rng.gen_range(0..total_population);
    for (i, node) in network.nodes.iter().enumerate() {
        if threshold < node.population {
            return NodeId(i as u32);
        }
        threshold -= node.population;
    }
    NodeId((network.node_count() - 1) as u32)
}
