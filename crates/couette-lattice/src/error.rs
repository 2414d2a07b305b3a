//! Error types for lattice construction.

use std::fmt;

/// Errors arising from geometry or decomposition construction.
///
/// All of these are configuration errors: fatal at setup, never retried.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LatticeError {
    /// A global extent is zero.
    ZeroExtent {
        /// The offending axis (0 = x, 1 = y, 2 = z).
        axis: usize,
    },
    /// The halo depth is zero; stencil consumers need at least one layer.
    ZeroHalo,
    /// A global extent does not divide evenly across the axis rank count.
    ///
    /// Per-rank subdomain extents are fixed, so uneven splits are rejected
    /// at construction rather than balanced dynamically.
    ExtentNotDivisible {
        /// The offending axis.
        axis: usize,
        /// Global extent along that axis.
        extent: usize,
        /// Rank count along that axis.
        ranks: usize,
    },
    /// A rank id is outside the decomposition grid.
    RankOutOfRange {
        /// The offending rank.
        rank: usize,
        /// Total rank count in the grid.
        nranks: usize,
    },
    /// An axis has zero ranks.
    EmptyAxis {
        /// The offending axis.
        axis: usize,
    },
}

impl fmt::Display for LatticeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroExtent { axis } => write!(f, "global extent on axis {axis} is zero"),
            Self::ZeroHalo => write!(f, "halo depth must be at least 1"),
            Self::ExtentNotDivisible {
                axis,
                extent,
                ranks,
            } => write!(
                f,
                "global extent {extent} on axis {axis} does not divide across {ranks} ranks"
            ),
            Self::RankOutOfRange { rank, nranks } => {
                write!(f, "rank {rank} outside decomposition of {nranks} ranks")
            }
            Self::EmptyAxis { axis } => write!(f, "axis {axis} has zero ranks"),
        }
    }
}

impl std::error::Error for LatticeError {}
