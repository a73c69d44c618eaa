//! Per-device transition decision: choose a new destination when at rest, or
//! decide arrival/turn-back when in transit.
//!
//! The at-rest and in-transit branches apply the `final` force differently —
//! one through a softmax over the top-K neighbors, the other through a raw
//! accept probability — by design; see `DESIGN.md` for why they are kept as
//! two separate code paths instead of unified.

use dm_core::{DeviceRng, NodeId};
use dm_network::Network;
use tracing::warn;

/// Neighbors considered in the at-rest softmax, at most this many.
const TOP_K: usize = 5;

fn logistic(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Decide the next `(current_node, target_node)` pair for a device.
///
/// `current == target` means the device is at rest; `current != target`
/// means it is in transit. `disaster_active` selects whether `final_force`
/// is passed through `logistic` (`g`) before being used.
pub fn decide_transition(
    current: NodeId,
    target: NodeId,
    network: &Network,
    disaster_active: bool,
    rng: &mut DeviceRng,
) -> (NodeId, NodeId) {
    if current == target {
        let chosen = choose_rest_destination(current, network, disaster_active, rng);
        (current, chosen)
    } else {
        resolve_in_transit(current, target, network, disaster_active, rng)
    }
}

fn choose_rest_destination(
    at: NodeId,
    network: &Network,
    disaster_active: bool,
    rng: &mut DeviceRng,
) -> NodeId {
    let neighbors = network.adjacency_of(at);
    debug_assert!(!neighbors.is_empty(), "adjacency always includes the node itself");

    let mut scored: Vec<(NodeId, f64)> = neighbors
        .iter()
        .map(|&n| (n, network.nodes[n.index()].final_force))
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(TOP_K.min(scored.len()));

    let weights: Vec<f64> = scored
        .iter()
        .map(|&(_, v)| if disaster_active { logistic(v) } else { v })
        .collect();

    let chosen_idx = softmax_choice(&weights, rng);
    scored[chosen_idx].0
}

/// Weighted draw over `softmax(values)`. Stable under negative inputs via the
/// usual max-subtraction trick.
fn softmax_choice(values: &[f64], rng: &mut DeviceRng) -> usize {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = exps.iter().sum();

    let mut threshold: f64 = rng.gen_range(0.0..1.0) * sum;
    for (i, e) in exps.iter().enumerate() {
        if threshold < *e {
            return i;
        }
        threshold -= e;
    }
    exps.len() - 1
}

fn resolve_in_transit(
    start: NodeId,
    end: NodeId,
    network: &Network,
    disaster_active: bool,
    rng: &mut DeviceRng,
) -> (NodeId, NodeId) {
    let g = |v: f64| if disaster_active { logistic(v) } else { v };

    let f_end = g(network.nodes[end.index()].final_force);
    let f_start = g(network.nodes[start.index()].final_force);
    let denom = f_end + f_start;
    let p_reach = if denom == 0.0 {
        warn!(
            start = start.index(),
            end = end.index(),
            "zero-sum p_reach denominator, falling back to 0.5"
        );
        0.5
    } else {
        f_end / denom
    };

    let u: f64 = rng.gen_range(0.0..1.0);
    if u <= p_reach {
        (end, end) // arrived
    } else {
        (start, start) // turned back
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_cache::FileCacheStore;
    use dm_network::{BoundingBox, NetworkBuilder, Place, RasterCell};

    fn small_network() -> Network {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCacheStore::new(dir.path());
        let raster = vec![RasterCell { lon: 0.0, lat: 0.0, z: 500.0 }];
        let places = vec![
            Place { name: "A".into(), lon: 0.0, lat: 0.0 },
            Place { name: "B".into(), lon: 0.0, lat: 0.02 },
            Place { name: "C".into(), lon: 0.02, lat: 0.0 },
        ];
        let bbox = BoundingBox { min_lon: -180.0, min_lat: -90.0, max_lon: 180.0, max_lat: 90.0 };
        NetworkBuilder::new(&cache, "transition-test")
            .build(&raster, &places, None, None, bbox)
            .unwrap()
    }

    #[test]
    fn at_rest_picks_a_neighbor_from_adjacency() {
        let net = small_network();
        let mut rng = DeviceRng::new(1, dm_core::DeviceId(0));
        let start = NodeId(0);
        let (new_current, new_target) = decide_transition(start, start, &net, false, &mut rng);
        assert_eq!(new_current, start);
        assert!(net.adjacency_of(start).contains(&new_target));
    }

    #[test]
    fn in_transit_always_ends_at_rest() {
        let net = small_network();
        let mut rng = DeviceRng::new(2, dm_core::DeviceId(1));
        let (new_current, new_target) = decide_transition(NodeId(0), NodeId(1), &net, true, &mut rng);
        assert_eq!(new_current, new_target);
    }

    #[test]
    fn equal_forces_give_fifty_fifty_p_reach() {
        let net = small_network();
        let mut rng = DeviceRng::new(3, dm_core::DeviceId(2));
        // Both endpoints have identical final_force (0.0, untouched by update_forces).
        let (new_current, new_target) = decide_transition(NodeId(0), NodeId(2), &net, false, &mut rng);
        assert_eq!(new_current, new_target);
        assert!(new_current == NodeId(0) || new_current == NodeId(2));
    }

    /// Property 10: with a flat force field (no disaster, untouched
    /// `final_force` on every node) the at-rest softmax over the top-K
    /// neighbors degenerates to a uniform draw, since every weight is equal.
    /// Over 10 000 Monte-Carlo ticks from a fixed start node, the empirical
    /// distribution over its neighbors must match uniform within ±3%.
    #[test]
    fn rest_choice_is_uniform_over_top_k_with_flat_forces() {
        let net = small_network();
        let start = NodeId(0);
        let neighbors = net.adjacency_of(start).to_vec();
        assert!(neighbors.len() >= 2, "need more than one option for this to be meaningful");

        let mut rng = DeviceRng::new(123, dm_core::DeviceId(0));
        let mut counts = vec![0u64; neighbors.len()];
        const TRIALS: u64 = 10_000;
        for _ in 0..TRIALS {
            let chosen = choose_rest_destination(start, &net, false, &mut rng);
            let idx = neighbors.iter().position(|&n| n == chosen).unwrap();
            counts[idx] += 1;
        }

        let expected_frac = 1.0 / neighbors.len() as f64;
        for count in counts {
            let frac = count as f64 / TRIALS as f64;
            assert!(
                (frac - expected_frac).abs() < 0.03,
                "empirical fraction {frac} too far from uniform {expected_frac}"
            );
        }
    }
}
