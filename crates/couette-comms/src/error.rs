//! Error types for transport and halo exchange.

use couette_core::RankId;
use std::fmt;

/// Errors from the transport layer and the halo-swap engine.
///
/// Configuration variants surface before any transport is attempted;
/// transport variants indicate a topology or pairing defect and are fatal —
/// no retry is performed at this layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommsError {
    /// A peer's inbox is gone (the rank panicked or shut down).
    Disconnected {
        /// The unreachable peer.
        peer: RankId,
    },
    /// The requested exchange depth does not fit the geometry's halo.
    DepthMismatch {
        /// Requested exchange depth.
        depth: usize,
        /// Halo depth the geometry was allocated with.
        halo: usize,
    },
    /// The exchange depth exceeds the subdomain extent on a swapped axis,
    /// so a send slab would read unfilled halo sites.
    DepthExceedsExtent {
        /// The offending axis.
        axis: usize,
        /// Requested exchange depth.
        depth: usize,
        /// Interior extent on that axis.
        extent: usize,
    },
    /// The field shape declares zero elements per site.
    ZeroElements,
    /// `run` was called before pack/unpack handlers were installed.
    HandlersMissing,
    /// `run` was called before `commit`.
    NotCommitted,
    /// Installed handlers disagree with the engine's element count.
    HandlerShapeMismatch {
        /// Elements per site the engine was created for.
        engine: usize,
        /// Elements per site the handlers declare.
        handler: usize,
    },
    /// The field slice does not match the committed buffer sizing.
    FieldSizeMismatch {
        /// Expected slice length (sites times elements).
        expected: usize,
        /// Actual slice length.
        got: usize,
    },
    /// A received payload does not match the posted length — a pairing
    /// defect in the rank-mapping logic.
    PayloadSizeMismatch {
        /// Sender of the offending payload.
        source: RankId,
        /// Expected element count.
        expected: usize,
        /// Received element count.
        got: usize,
    },
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disconnected { peer } => write!(f, "rank {peer} is unreachable"),
            Self::DepthMismatch { depth, halo } => {
                write!(f, "exchange depth {depth} exceeds allocated halo {halo}")
            }
            Self::DepthExceedsExtent {
                axis,
                depth,
                extent,
            } => write!(
                f,
                "exchange depth {depth} exceeds extent {extent} on axis {axis}"
            ),
            Self::ZeroElements => write!(f, "field must carry at least one element per site"),
            Self::HandlersMissing => write!(f, "pack/unpack handlers not installed"),
            Self::NotCommitted => write!(f, "halo swap used before commit"),
            Self::HandlerShapeMismatch { engine, handler } => write!(
                f,
                "handlers pack {handler} elements per site, engine expects {engine}"
            ),
            Self::FieldSizeMismatch { expected, got } => {
                write!(f, "field slice has {got} elements, expected {expected}")
            }
            Self::PayloadSizeMismatch {
                source,
                expected,
                got,
            } => write!(
                f,
                "payload from rank {source} has {got} elements, expected {expected}"
            ),
        }
    }
}

impl std::error::Error for CommsError {}
