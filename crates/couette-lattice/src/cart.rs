//! Per-axis Cartesian rank topology.

use crate::error::LatticeError;
use couette_core::RankId;

/// A periodic Cartesian grid of ranks and this rank's place in it.
///
/// Linear rank ids are x-major: `rank = (cx * ny + cy) * nz + cz`. Neighbour
/// lookups wrap on every axis (the lattice is periodic).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartComm {
    size: [usize; 3],
    coords: [usize; 3],
}

impl CartComm {
    /// Build the topology for `rank` within a grid of `size` ranks per axis.
    pub fn new(size: [usize; 3], rank: RankId) -> Result<Self, LatticeError> {
        for (axis, &n) in size.iter().enumerate() {
            if n == 0 {
                return Err(LatticeError::EmptyAxis { axis });
            }
        }
        let nranks = size[0] * size[1] * size[2];
        if rank.0 >= nranks {
            return Err(LatticeError::RankOutOfRange {
                rank: rank.0,
                nranks,
            });
        }
        let cz = rank.0 % size[2];
        let cy = (rank.0 / size[2]) % size[1];
        let cx = rank.0 / (size[1] * size[2]);
        Ok(Self {
            size,
            coords: [cx, cy, cz],
        })
    }

    /// A single-rank topology (no decomposition on any axis).
    pub fn single() -> Self {
        Self {
            size: [1, 1, 1],
            coords: [0, 0, 0],
        }
    }

    /// Rank count along `axis`.
    pub fn size(&self, axis: usize) -> usize {
        self.size[axis]
    }

    /// This rank's coordinate along `axis`.
    pub fn coord(&self, axis: usize) -> usize {
        self.coords[axis]
    }

    /// Total number of ranks in the grid.
    pub fn nranks(&self) -> usize {
        self.size[0] * self.size[1] * self.size[2]
    }

    /// This rank's linear id.
    pub fn rank(&self) -> RankId {
        self.rank_of(self.coords)
    }

    /// Linear id of the rank at `coords`.
    ///
    /// # Panics
    ///
    /// Panics if any coordinate is outside the grid (programming error).
    pub fn rank_of(&self, coords: [usize; 3]) -> RankId {
        for axis in 0..3 {
            assert!(
                coords[axis] < self.size[axis],
                "cart coordinate {} out of range on axis {axis}",
                coords[axis]
            );
        }
        RankId((coords[0] * self.size[1] + coords[1]) * self.size[2] + coords[2])
    }

    /// Neighbour rank `step` positions along `axis`, wrapping periodically.
    pub fn neighbour(&self, axis: usize, step: i64) -> RankId {
        self.rank_displaced(axis, self.coords[axis] as i64 + step)
    }

    /// Rank whose `axis` coordinate is `coord` (reduced modulo the axis
    /// size), with the remaining coordinates equal to this rank's.
    pub fn rank_displaced(&self, axis: usize, coord: i64) -> RankId {
        let n = self.size[axis] as i64;
        let wrapped = coord.rem_euclid(n) as usize;
        let mut coords = self.coords;
        coords[axis] = wrapped;
        self.rank_of(coords)
    }
}
