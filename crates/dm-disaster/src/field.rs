//! Concrete disaster field shapes.
//!
//! A tagged `DisasterField` enum rather than a trait object: there are
//! exactly two field shapes in this domain, known at compile time, and a
//! `match` over them is cheaper and more transparent than dynamic dispatch.

use dm_core::GeoPoint;

use crate::error::{DisasterError, DisasterResult};

/// `A * exp(-(lon-lon0)^2 / variance_lon - (lat-lat0)^2 / variance_lat)`.
///
/// Matches `disasters/generic/normal_disaster_dist.py::__density` exactly:
/// the denominators are *variances*, not standard deviations, and are not
/// themselves squared again.
#[derive(Clone, Copy, Debug)]
pub struct GaussianField {
    pub mean: GeoPoint,
    pub variance_lat: f64,
    pub variance_lon: f64,
    pub amplitude: f64,
}

impl GaussianField {
    pub fn new(mean: GeoPoint, variance_lat: f64, variance_lon: f64, amplitude: f64) -> DisasterResult<Self> {
        if variance_lat <= 0.0 || variance_lon <= 0.0 {
            return Err(DisasterError::NonPositiveVariance {
                lat: variance_lat,
                lon: variance_lon,
            });
        }
        Ok(Self { mean, variance_lat, variance_lon, amplitude })
    }

    fn intensity(&self, p: GeoPoint) -> f64 {
        let x = (p.lon - self.mean.lon).powi(2) / self.variance_lon;
        let y = (p.lat - self.mean.lat).powi(2) / self.variance_lat;
        self.amplitude * (-x - y).exp()
    }
}

/// `amplitude` within `radius_km` of `mean` (Haversine), `0` outside.
///
/// Matches `disasters/generic/uniform_disaster_dist.py::__density`, except
/// this implementation uses `<=` at the boundary per spec.md §4.6 (the
/// original Python uses strict `<`).
#[derive(Clone, Copy, Debug)]
pub struct UniformDiskField {
    pub mean: GeoPoint,
    pub radius_km: f64,
    pub amplitude: f64,
}

impl UniformDiskField {
    pub fn new(mean: GeoPoint, radius_km: f64, amplitude: f64) -> DisasterResult<Self> {
        if radius_km <= 0.0 {
            return Err(DisasterError::NonPositiveRadius(radius_km));
        }
        Ok(Self { mean, radius_km, amplitude })
    }

    fn intensity(&self, p: GeoPoint) -> f64 {
        let distance_km = self.mean.distance_m(p) / 1000.0;
        if distance_km <= self.radius_km {
            self.amplitude
        } else {
            0.0
        }
    }
}

/// A disaster field at a single point in time.
#[derive(Clone, Copy, Debug)]
pub enum DisasterField {
    Gaussian(GaussianField),
    UniformDisk(UniformDiskField),
}

impl DisasterField {
    fn mean(&self) -> GeoPoint {
        match self {
            DisasterField::Gaussian(g) => g.mean,
            DisasterField::UniformDisk(u) => u.mean,
        }
    }

    pub fn intensity(&self, p: GeoPoint) -> f64 {
        match self {
            DisasterField::Gaussian(g) => g.intensity(p),
            DisasterField::UniformDisk(u) => u.intensity(p),
        }
    }

    /// Forward azimuth in degrees `[0, 360)` from the field's epicenter to `p`.
    pub fn bearing(&self, p: GeoPoint) -> f64 {
        self.mean().bearing_to(p)
    }

    /// Return a copy of this field with its amplitude replaced.
    pub fn with_amplitude(&self, amplitude: f64) -> DisasterField {
        match self {
            DisasterField::Gaussian(g) => DisasterField::Gaussian(GaussianField { amplitude, ..*g }),
            DisasterField::UniformDisk(u) => DisasterField::UniformDisk(UniformDiskField { amplitude, ..*u }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaussian_peaks_at_mean() {
        let mean = GeoPoint::new(10.0, 20.0);
        let field = GaussianField::new(mean, 1.0, 1.0, 5.0).unwrap();
        let at_mean = field.intensity(mean);
        let away = field.intensity(GeoPoint::new(11.0, 21.0));
        assert!((at_mean - 5.0).abs() < 1e-9);
        assert!(away < at_mean);
    }

    #[test]
    fn gaussian_rejects_non_positive_variance() {
        assert!(GaussianField::new(GeoPoint::new(0.0, 0.0), 0.0, 1.0, 1.0).is_err());
    }

    #[test]
    fn uniform_disk_is_zero_outside_radius() {
        let mean = GeoPoint::new(0.0, 0.0);
        let field = UniformDiskField::new(mean, 10.0, 7.0).unwrap();
        let far = GeoPoint::new(1.0, 1.0); // ~157 km away
        assert_eq!(field.intensity(far), 0.0);
        assert_eq!(field.intensity(mean), 7.0);
    }

    #[test]
    fn bearing_is_in_valid_range() {
        let field = DisasterField::Gaussian(
            GaussianField::new(GeoPoint::new(0.0, 0.0), 1.0, 1.0, 1.0).unwrap(),
        );
        let b = field.bearing(GeoPoint::new(1.0, 1.0));
        assert!((0.0..360.0).contains(&b));
    }
}
