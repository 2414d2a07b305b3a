//! Error type for plane-registry construction.

use std::fmt;

/// Rejections raised while validating a plane set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShearError {
    /// A plane's x-position falls outside the global lattice.
    LocationOutOfRange {
        /// Index of the offending plane in construction order.
        plane: usize,
        /// The rejected x-position.
        location: usize,
        /// Global x extent.
        extent: usize,
    },
    /// Plane positions must be strictly increasing (and therefore distinct).
    LocationsNotIncreasing {
        /// Index of the first plane that is not above its predecessor.
        plane: usize,
    },
    /// A plane velocity is NaN or infinite.
    VelocityNotFinite {
        /// Index of the offending plane.
        plane: usize,
    },
    /// A plane sits on an x subdomain boundary, so the column above it
    /// belongs to another rank and its fluxes cannot be reconciled locally.
    LocationOnRankBoundary {
        /// Index of the offending plane.
        plane: usize,
        /// The rejected x-position.
        location: usize,
    },
}

impl fmt::Display for ShearError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocationOutOfRange {
                plane,
                location,
                extent,
            } => write!(
                f,
                "plane {plane} at x = {location} is outside the lattice (extent {extent})"
            ),
            Self::LocationsNotIncreasing { plane } => {
                write!(f, "plane {plane} is not strictly above its predecessor")
            }
            Self::VelocityNotFinite { plane } => {
                write!(f, "plane {plane} has a non-finite velocity")
            }
            Self::LocationOnRankBoundary { plane, location } => write!(
                f,
                "plane {plane} at x = {location} sits on a subdomain boundary"
            ),
        }
    }
}

impl std::error::Error for ShearError {}
