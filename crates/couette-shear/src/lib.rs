//! Sliding-frame shear planes.
//!
//! A [`PlaneRegistry`] holds the fixed x-positions of the sliding planes and
//! the steady transverse velocity either side of each one. It answers the
//! two questions the flux reconciliation asks every step: how far has the
//! far frame slid (an integer row shift plus a fractional interpolation
//! weight), and which ranks own the two rows the interpolation window
//! touches.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod registry;

pub use error::ShearError;
pub use registry::{Displacement, PlaneRanks, PlaneRegistry, ShearPlane};
