//! Plane positions, frame displacement, and the interpolation rank map.

use crate::error::ShearError;
use couette_core::RankId;
use couette_lattice::{LatticeGeometry, X, Y};

/// One sliding plane: it sits between x-columns `location` and
/// `location + 1`, and the frame above it moves at `velocity` lattice rows
/// per step relative to the frame below.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShearPlane {
    /// Global x-column immediately below the plane.
    pub location: usize,
    /// Steady transverse (y) velocity jump across the plane.
    pub velocity: f64,
}

/// A frame displacement split for two-point interpolation: the whole-row
/// shift and the leftover weight.
///
/// `fraction` is always in `[0, 1)`; a displacement of exactly zero gives
/// `shift = 0, fraction = 0.0`, which the reconciliation degenerates to a
/// plain average under.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Displacement {
    /// Whole rows of slide, `floor` of the reduced displacement. Negative
    /// when the frame slides backwards.
    pub shift: i64,
    /// Fractional row remainder in `[0, 1)`.
    pub fraction: f64,
}

/// The four ranks one plane transfer touches on the transverse axis.
///
/// The interpolation window starting at a given global row spans at most
/// two subdomains, so there are exactly two sources; the matching reverse
/// transfers make two destinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneRanks {
    /// Ranks this rank receives the window rows from.
    pub recv: [RankId; 2],
    /// Ranks this rank sends its own rows to.
    pub send: [RankId; 2],
}

/// The set of sliding planes over one lattice.
///
/// Positions are fixed for the lifetime of the run; only the displacement
/// is time-dependent, so it is evaluated per call and never cached.
#[derive(Clone, Debug, PartialEq)]
pub struct PlaneRegistry {
    planes: Vec<ShearPlane>,
    geometry: LatticeGeometry,
}

impl PlaneRegistry {
    /// Validate and build a registry.
    ///
    /// Positions must be strictly increasing and inside the global x
    /// extent; velocities must be finite. A plane's upper column
    /// (`location + 1`) must live on the same rank as the plane, so
    /// positions on an x subdomain boundary are rejected.
    pub fn new(
        geometry: &LatticeGeometry,
        planes: Vec<ShearPlane>,
    ) -> Result<Self, ShearError> {
        let extent = geometry.ntotal(X);
        let nlocal_x = geometry.nlocal(X);
        for (p, plane) in planes.iter().enumerate() {
            if plane.location >= extent {
                return Err(ShearError::LocationOutOfRange {
                    plane: p,
                    location: plane.location,
                    extent,
                });
            }
            if plane.location % nlocal_x == nlocal_x - 1 {
                return Err(ShearError::LocationOnRankBoundary {
                    plane: p,
                    location: plane.location,
                });
            }
            if !plane.velocity.is_finite() {
                return Err(ShearError::VelocityNotFinite { plane: p });
            }
            if p > 0 && plane.location <= planes[p - 1].location {
                return Err(ShearError::LocationsNotIncreasing { plane: p });
            }
        }
        Ok(Self {
            planes,
            geometry: geometry.clone(),
        })
    }

    /// A registry with no planes (uniform, non-sheared lattice).
    pub fn none(geometry: &LatticeGeometry) -> Self {
        Self {
            planes: Vec::new(),
            geometry: geometry.clone(),
        }
    }

    /// Number of planes in the whole lattice.
    pub fn plane_count(&self) -> usize {
        self.planes.len()
    }

    /// Global x-column below plane `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` is out of range (programming error).
    pub fn plane_location(&self, p: usize) -> usize {
        self.planes[p].location
    }

    /// Velocity jump across plane `p`.
    ///
    /// # Panics
    ///
    /// Panics if `p` is out of range (programming error).
    pub fn plane_velocity(&self, p: usize) -> f64 {
        self.planes[p].velocity
    }

    /// Planes whose lower x-column lies in this rank's interior, as
    /// `(registry index, local x)` pairs.
    pub fn local_planes(&self) -> Vec<(usize, i32)> {
        let lo = self.geometry.noffset(X);
        let hi = lo + self.geometry.nlocal(X);
        self.planes
            .iter()
            .enumerate()
            .filter(|(_, plane)| plane.location >= lo && plane.location < hi)
            .map(|(p, plane)| (p, (plane.location - lo) as i32))
            .collect()
    }

    /// Displacement of the frame above plane `p` after `elapsed_steps`
    /// whole steps, seen from below (positive velocity slides rows upward).
    ///
    /// At `elapsed_steps == 0` the frames have not yet slid: the shift and
    /// fraction are both exactly zero.
    pub fn displacement_up(&self, p: usize, elapsed_steps: u64) -> Displacement {
        self.split(self.planes[p].velocity * elapsed_steps as f64)
    }

    /// Displacement of the frame below plane `p`, seen from above. The
    /// negation happens before the reduction so the two views use the same
    /// arithmetic.
    pub fn displacement_down(&self, p: usize, elapsed_steps: u64) -> Displacement {
        self.split(-self.planes[p].velocity * elapsed_steps as f64)
    }

    fn split(&self, dy: f64) -> Displacement {
        let ly = self.geometry.ntotal(Y) as f64;
        let dy = dy % ly;
        let shift = dy.floor();
        Displacement {
            shift: shift as i64,
            fraction: dy - shift,
        }
    }

    /// Map the global row a plane transfer's window starts at to the ranks
    /// involved, derived fresh from the current decomposition.
    ///
    /// The two receive ranks own rows `j_start` and `j_start + nlocal_y`;
    /// the send ranks are the mirror image, so that rank `a` lists rank `b`
    /// as a source exactly when `b` lists `a` as a destination.
    ///
    /// # Panics
    ///
    /// Panics if `j_start` is not a reduced global row (programming error).
    pub fn jstart_to_ranks(&self, j_start: usize) -> PlaneRanks {
        let ny = self.geometry.ntotal(Y);
        assert!(j_start < ny, "row {j_start} outside global extent {ny}");
        let cart = self.geometry.cart();
        let nranks = cart.size(Y) as i64;
        let my = cart.coord(Y) as i64;
        let p0 = (j_start / self.geometry.nlocal(Y)) as i64;
        PlaneRanks {
            recv: [
                cart.rank_displaced(Y, p0),
                cart.rank_displaced(Y, p0 + 1),
            ],
            send: [
                cart.rank_displaced(Y, (2 * my - p0).rem_euclid(nranks)),
                cart.rank_displaced(Y, (2 * my - p0 - 1).rem_euclid(nranks)),
            ],
        }
    }
}
