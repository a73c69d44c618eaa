//! Position sampling: where a device actually sits after its transition.

use dm_core::{DeviceRng, GeoPoint, NodeId};
use dm_network::{Network, CITY_NOISE, ROAD_NOISE};

/// Compute a device's new `(lon, lat)` after a transition.
///
/// `prev_current` is the device's `current_node` *before* this tick's
/// transition; `new_target` is the `target_node` the transition produced.
/// Equal means the device stayed in (or returned to) a single node this
/// tick — noise is drawn from `CITY_NOISE`. Different means it set out onto
/// an edge — noise is drawn from `ROAD_NOISE`.
///
/// New position is a uniform convex combination of `prev_pos` and
/// `new_target`'s center, plus the noise term.
pub fn sample_position(
    prev_pos: GeoPoint,
    prev_current: NodeId,
    new_target: NodeId,
    network: &Network,
    rng: &mut DeviceRng,
) -> GeoPoint {
    let end_center = network.nodes[new_target.index()].center;
    let noise = if prev_current == new_target { CITY_NOISE } else { ROAD_NOISE };

    let t: f64 = rng.gen_range(0.0..1.0);
    let lat = prev_pos.lat * (1.0 - t) + end_center.lat * t;
    let lon = prev_pos.lon * (1.0 - t) + end_center.lon * t;

    let xi_lat: f64 = rng.gen_range(-1.0..1.0);
    let xi_lon: f64 = rng.gen_range(-1.0..1.0);
    GeoPoint::new(lat + xi_lat * noise, lon + xi_lon * noise)
}
