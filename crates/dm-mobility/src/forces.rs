//! Per-tick force update: population attraction vs. disaster repulsion.

use dm_disaster::DisasterField;
use dm_network::Network;
use tracing::warn;

/// Recompute `attractive_force`/`repelling_force`/`final_force` on every node
/// of `network`, given the disaster field active at the current tick (`None`
/// if no disaster is active yet).
///
/// `repel[v] = field.intensity(center(v))` or `0` with no active field.
/// `attract[v] = population(v) / Σ population`, then rescaled so the maximum
/// attract value is `1`. `final[v] = attract[v] - repel[v]`.
pub fn update_forces(network: &mut Network, field: Option<&DisasterField>) {
    let total_population: u64 = network.nodes.iter().map(|n| n.population).sum();
    if total_population == 0 {
        warn!("network has zero total population; zeroing all forces for this tick");
        for node in &mut network.nodes {
            node.attractive_force = 0.0;
            node.repelling_force = 0.0;
            node.final_force = 0.0;
        }
        return;
    }

    let mut max_attract = 0.0f64;
    for node in &mut network.nodes {
        node.attractive_force = node.population as f64 / total_population as f64;
        max_attract = max_attract.max(node.attractive_force);
    }
    if max_attract > 0.0 {
        for node in &mut network.nodes {
            node.attractive_force /= max_attract;
        }
    }

    for node in &mut network.nodes {
        node.repelling_force = match field {
            Some(f) => f.intensity(node.center),
            None => 0.0,
        };
        node.final_force = node.attractive_force - node.repelling_force;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dm_cache::FileCacheStore;
    use dm_core::GeoPoint;
    use dm_disaster::GaussianField;
    use dm_network::{BoundingBox, NetworkBuilder, Place, RasterCell};

    fn two_node_network() -> Network {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCacheStore::new(dir.path());
        let raster = vec![
            RasterCell { lon: 0.0, lat: 0.0, z: 100.0 },
            RasterCell { lon: 0.0, lat: 0.01, z: 900.0 },
        ];
        let places = vec![
            Place { name: "A".into(), lon: 0.0, lat: 0.0 },
            Place { name: "B".into(), lon: 0.0, lat: 0.02 },
        ];
        let bbox = BoundingBox { min_lon: -180.0, min_lat: -90.0, max_lon: 180.0, max_lat: 90.0 };
        NetworkBuilder::new(&cache, "forces-test")
            .build(&raster, &places, None, None, bbox)
            .unwrap()
    }

    #[test]
    fn max_attract_is_always_one() {
        let mut net = two_node_network();
        update_forces(&mut net, None);
        let max = net.nodes.iter().map(|n| n.attractive_force).fold(0.0, f64::max);
        assert!((max - 1.0).abs() < 1e-9);
    }

    #[test]
    fn no_disaster_means_zero_repel() {
        let mut net = two_node_network();
        update_forces(&mut net, None);
        for node in &net.nodes {
            assert_eq!(node.repelling_force, 0.0);
            assert_eq!(node.final_force, node.attractive_force);
        }
    }

    #[test]
    fn active_disaster_reduces_final_force() {
        let mut net = two_node_network();
        let field = DisasterField::Gaussian(
            GaussianField::new(GeoPoint::new(0.0, 0.0), 0.01, 0.01, 1.0).unwrap(),
        );
        update_forces(&mut net, None);
        let baseline: Vec<f64> = net.nodes.iter().map(|n| n.final_force).collect();
        update_forces(&mut net, Some(&field));
        for (node, base) in net.nodes.iter().zip(baseline) {
            assert!(node.final_force <= base);
        }
    }
}
