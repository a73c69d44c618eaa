//! Integration tests for dm-sim.

use chrono::NaiveDate;

use dm_cache::FileCacheStore;
use dm_core::{NodeId, SimConfig, Tick};
use dm_device::DeviceStore;
use dm_disaster::{DecayMethod, DisasterField, GaussianField, TimelineBuilder};
use dm_network::{BoundingBox, NetworkBuilder, Network, Place, RasterCell};

use crate::{NoopObserver, SimBuilder, SimObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn dt(y: i32, m: u32, d: u32, h: u32) -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(h, 0, 0).unwrap()
}

fn test_config(hours: i64) -> SimConfig {
    SimConfig {
        start: dt(2026, 1, 1, 0),
        end: dt(2026, 1, 1, 0) + chrono::Duration::hours(hours),
        tick_duration_hours: 1.0,
        seed: 42,
        num_threads: Some(1),
    }
}

/// Three cities in a line, close enough together to be mutually adjacent.
fn line_network(prefix: &str) -> Network {
    let dir = tempfile::tempdir().unwrap();
    let cache = FileCacheStore::new(dir.path());
    let raster = vec![
        RasterCell { lon: 0.0, lat: 0.0, z: 500.0 },
        RasterCell { lon: 0.0, lat: 0.02, z: 2000.0 },
        RasterCell { lon: 0.0, lat: 0.04, z: 500.0 },
    ];
    let places = vec![
        Place { name: "A".into(), lon: 0.0, lat: 0.0 },
        Place { name: "B".into(), lon: 0.0, lat: 0.02 },
        Place { name: "C".into(), lon: 0.0, lat: 0.04 },
    ];
    let bbox = BoundingBox { min_lon: -180.0, min_lat: -90.0, max_lon: 180.0, max_lat: 90.0 };
    NetworkBuilder::new(&cache, prefix).build(&raster, &places, None, None, bbox).unwrap()
}

/// Two equal-population nodes, mutually adjacent.
fn two_equal_node_network(prefix: &str) -> Network {
    let dir = tempfile::tempdir().unwrap();
    let cache = FileCacheStore::new(dir.path());
    let raster = vec![
        RasterCell { lon: 0.0, lat: 0.0, z: 500.0 },
        RasterCell { lon: 0.0, lat: 0.02, z: 500.0 },
    ];
    let places = vec![
        Place { name: "A".into(), lon: 0.0, lat: 0.0 },
        Place { name: "B".into(), lon: 0.0, lat: 0.02 },
    ];
    let bbox = BoundingBox { min_lon: -180.0, min_lat: -90.0, max_lon: 180.0, max_lat: 90.0 };
    NetworkBuilder::new(&cache, prefix).build(&raster, &places, None, None, bbox).unwrap()
}

#[derive(Default)]
struct RecordingObserver {
    tick_starts: Vec<Tick>,
    snapshots: Vec<(Tick, usize)>,
    ended: bool,
}

impl SimObserver for RecordingObserver {
    fn on_tick_start(&mut self, tick: Tick) {
        self.tick_starts.push(tick);
    }

    fn on_tick_end(&mut self, tick: Tick, _date: &str, devices: &DeviceStore) {
        self.snapshots.push((tick, devices.count));
    }

    fn on_sim_end(&mut self, _final_tick: Tick) {
        self.ended = true;
    }
}

// ── SimBuilder validation ───────────────────────────────────────────────────

mod builder_tests {
    use super::*;

    #[test]
    fn builds_successfully_with_placed_devices() {
        let network = line_network("sim-build");
        let sim = SimBuilder::new(test_config(6), network, 50).build().unwrap();
        assert_eq!(sim.devices.count, 50);
        for node in &sim.devices.current_node {
            assert_ne!(*node, dm_core::NodeId::INVALID);
        }
    }

    #[test]
    fn every_device_starts_at_rest() {
        let network = line_network("sim-rest");
        let sim = SimBuilder::new(test_config(6), network, 20).build().unwrap();
        for i in 0..sim.devices.count {
            assert_eq!(sim.devices.current_node[i], sim.devices.target_node[i]);
        }
    }

    #[test]
    fn empty_network_errors() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCacheStore::new(dir.path());
        let bbox = BoundingBox { min_lon: -180.0, min_lat: -90.0, max_lon: 180.0, max_lat: 90.0 };
        let network = NetworkBuilder::new(&cache, "sim-empty").build(&[], &[], None, None, bbox);
        assert!(network.is_err(), "an empty place/raster set should fail to build a network");
    }

    #[test]
    fn zero_devices_errors() {
        let network = line_network("sim-zero-devices");
        let result = SimBuilder::new(test_config(6), network, 0).build();
        assert!(result.is_err());
    }
}

// ── Tick loop ────────────────────────────────────────────────────────────────

mod tick_loop_tests {
    use super::*;

    #[test]
    fn run_advances_clock_to_end_tick() {
        let network = line_network("sim-clock");
        let mut sim = SimBuilder::new(test_config(6), network, 10).build().unwrap();
        sim.run(&mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, sim.config.end_tick());
    }

    #[test]
    fn observer_sees_one_tick_end_per_tick() {
        let network = line_network("sim-observer");
        let mut sim = SimBuilder::new(test_config(4), network, 5).build().unwrap();
        let mut obs = RecordingObserver::default();
        sim.run(&mut obs).unwrap();
        assert_eq!(obs.tick_starts.len(), 4);
        assert_eq!(obs.snapshots.len(), 4);
        assert!(obs.ended);
    }

    #[test]
    fn snapshot_row_count_equals_device_count_every_tick() {
        let network = line_network("sim-conservation");
        let mut sim = SimBuilder::new(test_config(5), network, 17).build().unwrap();
        let mut obs = RecordingObserver::default();
        sim.run(&mut obs).unwrap();
        for (_, count) in &obs.snapshots {
            assert_eq!(*count, 17, "row count must equal device count at every tick");
        }
    }

    #[test]
    fn devices_stay_at_rest_or_in_transit_every_tick() {
        let network = line_network("sim-at-rest-or-transit");
        let mut sim = SimBuilder::new(test_config(8), network, 30).build().unwrap();
        sim.run_ticks(8, &mut NoopObserver).unwrap();
        for i in 0..sim.devices.count {
            let current = sim.devices.current_node[i];
            let target = sim.devices.target_node[i];
            assert!(sim.network.node(current).is_ok());
            assert!(sim.network.node(target).is_ok());
        }
    }

    #[test]
    fn run_ticks_ignores_end_tick() {
        let network = line_network("sim-run-ticks");
        let mut sim = SimBuilder::new(test_config(2), network, 4).build().unwrap();
        sim.run_ticks(10, &mut NoopObserver).unwrap();
        assert_eq!(sim.clock.current_tick, Tick(10));
    }

    /// Scenario e: two equal-population nodes, 10 devices, no disaster, 100
    /// ticks — at every tick the devices are split between the two nodes
    /// (the only two that exist), so their counts must always sum to 10.
    #[test]
    fn two_node_population_is_conserved_across_a_hundred_ticks() {
        let network = two_equal_node_network("sim-scenario-e");
        let mut sim = SimBuilder::new(test_config(100), network, 10).build().unwrap();
        let a = NodeId(0);
        let b = NodeId(1);

        for _ in 0..100 {
            sim.run_ticks(1, &mut NoopObserver).unwrap();
            let at_a = sim.devices.current_node.iter().filter(|&&n| n == a).count();
            let at_b = sim.devices.current_node.iter().filter(|&&n| n == b).count();
            assert_eq!(at_a + at_b, 10);
        }
    }

    /// Scenario f: three-node chain A–B–C, disaster centered on B
    /// (amplitude 10), 1000 devices initially at B, 50 ticks at `Δt = 1h`.
    /// The decay schedule's own `end` is set far past the 50-tick run so the
    /// field stays near its initial amplitude throughout, giving repulsion
    /// from B its full effect for the whole run.
    #[test]
    fn repulsion_pushes_devices_out_of_the_disaster_center_node() {
        let network = line_network("sim-scenario-f");
        let config = test_config(50);
        let b_center = network.nodes[1].center;

        let timeline = TimelineBuilder {
            start: config.start,
            end: config.start + chrono::Duration::hours(500),
            step_hours: 1.0,
            initial_amplitude: 10.0,
            decay: DecayMethod::Linear,
            continuity: None,
            residual: None,
        }
        .build(DisasterField::Gaussian(GaussianField::new(b_center, 0.0004, 0.0004, 10.0).unwrap()));

        let mut sim = SimBuilder::new(config, network, 1000).timeline(timeline).build().unwrap();

        let b = NodeId(1);
        for i in 0..sim.devices.count {
            sim.devices.current_node[i] = b;
            sim.devices.target_node[i] = b;
            sim.devices.lon[i] = b_center.lon;
            sim.devices.lat[i] = b_center.lat;
        }

        let count_at_b = |sim: &crate::Sim| {
            sim.devices.current_node.iter().filter(|&&n| n == b).count()
        };
        let start_count = count_at_b(&sim);
        assert_eq!(start_count, 1000);

        sim.run_ticks(50, &mut NoopObserver).unwrap();
        let end_count = count_at_b(&sim);
        assert!(
            end_count < start_count,
            "expected repulsion to thin B's population, got {end_count} of {start_count}"
        );
    }
}
