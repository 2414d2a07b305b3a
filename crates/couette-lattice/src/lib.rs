//! Lattice geometry and Cartesian domain decomposition.
//!
//! This crate defines [`LatticeGeometry`] — the single canonical mapping
//! from (possibly halo-offset) local coordinates to a linear site index —
//! and [`CartComm`], the per-axis rank topology. Every other component
//! addresses lattice data through [`LatticeGeometry::site`]; nothing else
//! recomputes strides on its own.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cart;
pub mod error;
pub mod geometry;

pub use cart::CartComm;
pub use error::LatticeError;
pub use geometry::LatticeGeometry;

/// The x axis (decomposition axis index 0).
pub const X: usize = 0;
/// The y axis (decomposition axis index 1, the sliding-plane transverse axis).
pub const Y: usize = 1;
/// The z axis (decomposition axis index 2).
pub const Z: usize = 2;
