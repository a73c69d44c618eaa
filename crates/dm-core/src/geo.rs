//! Geographic coordinate type and spatial utilities.
//!
//! `GeoPoint` uses `f64` (double-precision) latitude/longitude. Network
//! builds and cached payloads must reproduce bit-identical coordinates
//! across runs, which rules out the `f32` precision the teacher framework
//! uses for routing-scale agent positions.

use rand::Rng;

/// Mean Earth radius in metres, as used throughout the original mobility
/// generator's `haversine` and bearing calculations.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS-84 geographic coordinate stored as double-precision floats.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    pub fn distance_m(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Approximate bounding-box check, much cheaper than `distance_m` for
    /// quick rejection before a precise distance test.
    #[inline]
    pub fn within_bbox(self, center: GeoPoint, half_deg: f64) -> bool {
        (self.lat - center.lat).abs() <= half_deg
            && (self.lon - center.lon).abs() <= half_deg
    }

    /// Forward azimuth (initial bearing) from `self` to `other`, in degrees,
    /// normalized to `[0, 360)`.
    pub fn bearing_to(self, other: GeoPoint) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        let theta = y.atan2(x);

        (theta.to_degrees() + 360.0) % 360.0
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Ray-casting point-in-polygon test. `polygon` is a closed or open ring;
/// the last vertex is implicitly connected back to the first.
pub fn point_in_polygon(point: GeoPoint, polygon: &[GeoPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let pi = polygon[i];
        let pj = polygon[j];

        let intersects = (pi.lat > point.lat) != (pj.lat > point.lat)
            && point.lon
                < (pj.lon - pi.lon) * (point.lat - pi.lat) / (pj.lat - pi.lat) + pi.lon;
        if intersects {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Degrees-of-latitude per kilometre, used to convert a metric half-width
/// into a degree offset for constructing a trimming rectangle. Matches the
/// original generator's `DEGREE_EQUIVALENT_IN_KM` constant (111.32 km/deg).
pub const DEGREE_EQUIVALENT_IN_KM: f64 = 111.32;

/// Build a rectangle polygon of the given width (metres), centered on the
/// chord from `a` to `b`, with the chord as its long axis. Used to trim an
/// edge's geometry down to the segment actually between two adjacent nodes.
pub fn trim_segment_to_endpoints(a: GeoPoint, b: GeoPoint, width_m: f64) -> Vec<GeoPoint> {
    let half_width_km = (width_m / 1000.0) / 2.0;
    let half_width_deg = half_width_km / DEGREE_EQUIVALENT_IN_KM;

    let bearing = a.bearing_to(b).to_radians();
    // Perpendicular to the chord.
    let normal = bearing + std::f64::consts::FRAC_PI_2;
    let dlat = normal.cos() * half_width_deg;
    let dlon = normal.sin() * half_width_deg;

    vec![
        GeoPoint::new(a.lat + dlat, a.lon + dlon),
        GeoPoint::new(b.lat + dlat, b.lon + dlon),
        GeoPoint::new(b.lat - dlat, b.lon - dlon),
        GeoPoint::new(a.lat - dlat, a.lon - dlon),
    ]
}

/// Rejection-sample `n` points uniformly distributed within `polygon`'s
/// bounding box, keeping only those that fall inside the ring. Bounded to
/// `max_passes` bounding-box samples per accepted point so a degenerate
/// (zero-area or self-intersecting) polygon cannot loop forever.
pub fn sample_points_in_polygon<R: Rng + ?Sized>(
    polygon: &[GeoPoint],
    rng: &mut R,
    n: usize,
    max_passes: usize,
) -> Vec<GeoPoint> {
    if polygon.len() < 3 {
        return Vec::new();
    }

    let (mut min_lat, mut max_lat) = (f64::MAX, f64::MIN);
    let (mut min_lon, mut max_lon) = (f64::MAX, f64::MIN);
    for p in polygon {
        min_lat = min_lat.min(p.lat);
        max_lat = max_lat.max(p.lat);
        min_lon = min_lon.min(p.lon);
        max_lon = max_lon.max(p.lon);
    }

    let mut out = Vec::with_capacity(n);
    for _ in 0..n {
        for _ in 0..max_passes {
            let lat = rng.gen_range(min_lat..=max_lat);
            let lon = rng.gen_range(min_lon..=max_lon);
            let candidate = GeoPoint::new(lat, lon);
            if point_in_polygon(candidate, polygon) {
                out.push(candidate);
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(40.7128, -74.0060);
        let b = GeoPoint::new(34.0522, -118.2437);
        assert!((a.distance_m(b) - b.distance_m(a)).abs() < 1e-6);
    }

    #[test]
    fn distance_zero_for_identical_points() {
        let a = GeoPoint::new(10.0, 20.0);
        assert_eq!(a.distance_m(a), 0.0);
    }

    #[test]
    fn triangle_inequality_holds() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 1.0);
        let c = GeoPoint::new(2.0, 0.5);
        assert!(a.distance_m(c) <= a.distance_m(b) + b.distance_m(c) + 1e-6);
    }

    #[test]
    fn bearing_is_within_range() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(1.0, 1.0);
        let brg = a.bearing_to(b);
        assert!((0.0..360.0).contains(&brg));
    }

    #[test]
    fn point_in_polygon_detects_square() {
        let square = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ];
        assert!(point_in_polygon(GeoPoint::new(0.5, 0.5), &square));
        assert!(!point_in_polygon(GeoPoint::new(2.0, 2.0), &square));
    }

    #[test]
    fn sampled_points_land_inside_polygon() {
        let square = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(0.0, 1.0),
            GeoPoint::new(1.0, 1.0),
            GeoPoint::new(1.0, 0.0),
        ];
        let mut rng = SmallRng::seed_from_u64(7);
        let pts = sample_points_in_polygon(&square, &mut rng, 20, 1000);
        assert_eq!(pts.len(), 20);
        for p in pts {
            assert!(point_in_polygon(p, &square));
        }
    }
}
