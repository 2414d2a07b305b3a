//! Benchmark profiles for the Couette lattice core.
//!
//! Provides the shared lattice setups the criterion benches run against:
//!
//! - [`reference_geometry`]: a 32^3 single-rank box with a two-deep halo
//! - [`seeded_flux`]: deterministic face fluxes identifying each site

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use couette_flux::FluxBuffers;
use couette_lattice::{CartComm, LatticeGeometry, X, Y, Z};

/// The reference benchmark lattice: 32^3, halo depth 2, one rank.
pub fn reference_geometry() -> LatticeGeometry {
    LatticeGeometry::new([32, 32, 32], 2, CartComm::single())
        .expect("reference geometry is valid")
}

/// Flux buffers with deterministic per-site values, so reconciliation
/// benches operate on realistic non-uniform data.
pub fn seeded_flux(geometry: &LatticeGeometry) -> FluxBuffers {
    let mut flux = FluxBuffers::new(geometry, 1);
    for i in 0..geometry.nlocal(X) as i32 {
        for j in 0..geometry.nlocal(Y) as i32 {
            for k in 0..geometry.nlocal(Z) as i32 {
                let idx = geometry.site(i, j, k);
                flux.fe[idx] = (i + 2 * j + 3 * k) as f64;
                flux.fw[idx] = (3 * i + j + 2 * k) as f64;
            }
        }
    }
    flux
}
