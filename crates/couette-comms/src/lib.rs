//! Rank-to-rank transport and the halo-swap engine.
//!
//! [`Communicator`] provides tagged, asynchronous point-to-point messaging
//! between ranks with MPI-style non-overtaking delivery; [`RecvBatch`] is
//! the scoped post-all/wait-all receive batch every suspension point in the
//! core goes through. [`HaloSwap`] drives the ghost-layer exchange for an
//! arbitrary per-site vector field, with the pack/unpack strategy injected
//! through [`HaloHandlers`] so host- and accelerator-resident fields share
//! one protocol.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod halo;
pub mod transport;

pub use error::CommsError;
pub use halo::{HaloHandlers, HaloSwap, HostHandlers};
pub use transport::{Communicator, Packet, RecvBatch};
