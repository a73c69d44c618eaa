//! Error type for malformed disaster-field parameters.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DisasterError {
    #[error("gaussian field variance must be positive, got lat={lat}, lon={lon}")]
    NonPositiveVariance { lat: f64, lon: f64 },

    #[error("uniform-disk field radius must be positive, got {0} km")]
    NonPositiveRadius(f64),
}

pub type DisasterResult<T> = Result<T, DisasterError>;
