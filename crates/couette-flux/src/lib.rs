//! Face fluxes, sliding-plane reconciliation, and the Euler field update.
//!
//! One step of the consumer pipeline: [`OrderParameterUpdate::diffusive_flux`]
//! fills a step-scoped [`FluxBuffers`] from a chemical potential, an optional
//! [`RandomFlux`] adds conserving noise, [`FluxReconciler::fix`] restores
//! east/west face uniqueness across the sliding planes, and
//! [`OrderParameterUpdate::forward_step`] applies the divergence. The
//! reconciler's parallel path reproduces the single-rank result bit for bit.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffers;
pub mod error;
pub mod fluctuation;
pub mod reconcile;
pub mod update;

pub use buffers::FluxBuffers;
pub use error::FluxError;
pub use fluctuation::RandomFlux;
pub use reconcile::FluxReconciler;
pub use update::OrderParameterUpdate;
