//! Error type for flux computation and the field update.

use std::fmt;

/// Rejections raised while configuring flux computation.
#[derive(Clone, Debug, PartialEq)]
pub enum FluxError {
    /// The mobility coefficient is NaN or infinite.
    MobilityNotFinite {
        /// The rejected value.
        value: f64,
    },
    /// The mobility coefficient is negative.
    MobilityNegative {
        /// The rejected value.
        value: f64,
    },
    /// The noise standard deviation is NaN, infinite, or negative.
    VarianceInvalid {
        /// The rejected value.
        value: f64,
    },
    /// Random fluxes cannot be applied while sliding planes are present;
    /// the noise stream is not frame-consistent across a plane.
    PlanesPresent {
        /// Number of planes in the registry.
        count: usize,
    },
}

impl fmt::Display for FluxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MobilityNotFinite { value } => {
                write!(f, "mobility must be finite, got {value}")
            }
            Self::MobilityNegative { value } => {
                write!(f, "mobility must be non-negative, got {value}")
            }
            Self::VarianceInvalid { value } => {
                write!(f, "noise deviation must be finite and non-negative, got {value}")
            }
            Self::PlanesPresent { count } => {
                write!(f, "random fluxes refused: {count} sliding plane(s) present")
            }
        }
    }
}

impl std::error::Error for FluxError {}
