//! Core types for the Couette lattice consistency core.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! identifiers shared by the transport and reconciliation layers, the
//! [`FieldAccess`] and [`ChemicalPotential`] collaborator traits through
//! which physics code meets the lattice, and a plain dense [`ScalarField`]
//! backing store.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod field;
pub mod id;
pub mod potential;

pub use field::{FieldAccess, ScalarField};
pub use id::{MessageTag, RankId};
pub use potential::ChemicalPotential;
