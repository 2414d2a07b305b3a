//! Couette: a domain-decomposed lattice consistency core.
//!
//! This is the top-level facade crate re-exporting the public API of the
//! Couette sub-crates. It provides the machinery a lattice PDE solver needs
//! to stay exactly consistent under parallel decomposition: ghost-layer
//! halo exchange with pluggable pack/unpack, Lees-Edwards style sliding
//! planes, and conservative flux reconciliation whose parallel path is
//! bit-identical to the serial one. The physics itself (free energies,
//! collision kernels, time integration) lives outside and meets this core
//! through the narrow traits in [`types`].
//!
//! # Quick start
//!
//! ```rust
//! use couette::prelude::*;
//!
//! // One rank, a periodic 8x8x8 box with a two-deep halo.
//! let geometry = LatticeGeometry::new([8, 8, 8], 2, CartComm::single()).unwrap();
//! let mut comm = Communicator::world(1).remove(0);
//!
//! let mut swap = HaloSwap::new(&geometry, 2, 1).unwrap();
//! swap.set_handlers(Box::new(HostHandlers::new(1)));
//! swap.commit();
//!
//! let mut phi = ScalarField::new(geometry.nsites(), 1);
//! phi.set_scalar(geometry.site(0, 0, 0), 1.0);
//! swap.run(&mut comm, phi.data_mut()).unwrap();
//!
//! // The periodic image of the origin landed in the far ghost corner.
//! assert_eq!(phi.scalar(geometry.site(8, 8, 8)), 1.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `couette-core` | Ids, field storage, collaborator traits |
//! | [`lattice`] | `couette-lattice` | Rank topology and the lattice descriptor |
//! | [`comms`] | `couette-comms` | Rank transport and the halo-swap engine |
//! | [`shear`] | `couette-shear` | Sliding-plane registry |
//! | [`flux`] | `couette-flux` | Face fluxes, reconciliation, Euler update |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Ids, field storage, and the collaborator traits (`couette-core`).
pub use couette_core as types;

/// Rank topology and the lattice descriptor (`couette-lattice`).
pub use couette_lattice as lattice;

/// Rank transport and the halo-swap engine (`couette-comms`).
pub use couette_comms as comms;

/// The sliding-plane registry (`couette-shear`).
pub use couette_shear as shear;

/// Face fluxes, plane reconciliation, and the Euler update (`couette-flux`).
pub use couette_flux as flux;

/// The types most consumers need, importable in one line.
pub mod prelude {
    pub use couette_comms::{Communicator, HaloHandlers, HaloSwap, HostHandlers, RecvBatch};
    pub use couette_core::{
        ChemicalPotential, FieldAccess, MessageTag, RankId, ScalarField,
    };
    pub use couette_flux::{FluxBuffers, FluxReconciler, OrderParameterUpdate, RandomFlux};
    pub use couette_lattice::{CartComm, LatticeGeometry, X, Y, Z};
    pub use couette_shear::{PlaneRegistry, ShearPlane};
}
