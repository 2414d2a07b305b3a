//! Deterministic random face fluxes.
//!
//! Adds a symmetric noise contribution to every face, following the
//! Sumesh et al. construction: each site draws one random vector, and a
//! face takes the average of the two adjoining sites' components. The same
//! value therefore enters once positively and once negatively across the
//! face, so the field total is conserved by construction.
//!
//! Each site draws from its own ChaCha8 stream, keyed by the run seed,
//! the step, and the site's wrapped global coordinate. A halo site and
//! the interior site it mirrors therefore draw identical values on every
//! rank, so the faces shared between subdomains carry one value and the
//! conservation argument survives decomposition. Identical seeds replay
//! identical noise; each step gets a fresh sequence.

use crate::buffers::FluxBuffers;
use crate::error::FluxError;
use couette_lattice::{LatticeGeometry, X, Y, Z};
use couette_shear::PlaneRegistry;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Deterministic random flux generator.
///
/// `deviation` is the standard deviation of each face component; for
/// fluctuating diffusion it is `sqrt(2 kT M)`, supplied by the caller.
#[derive(Clone, Copy, Debug)]
pub struct RandomFlux {
    deviation: f64,
    seed: u64,
}

impl RandomFlux {
    /// Validate the noise deviation.
    pub fn new(deviation: f64, seed: u64) -> Result<Self, FluxError> {
        if !deviation.is_finite() || deviation < 0.0 {
            return Err(FluxError::VarianceInvalid { value: deviation });
        }
        Ok(Self { deviation, seed })
    }

    /// Gaussian sample via Box-Muller, avoiding a distributions dependency.
    fn gaussian(rng: &mut ChaCha8Rng) -> f64 {
        let u1: f64 = rng.random::<f64>().max(1e-300);
        let u2: f64 = rng.random();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Stream for one site, keyed by the run seed, the step, and the
    /// site's global index. Rank-independent: every rank that can see a
    /// site (interior or halo image) draws the same values for it.
    fn site_rng(&self, elapsed_steps: u64, global: u64) -> ChaCha8Rng {
        let mut key = [0u8; 32];
        key[..8].copy_from_slice(&self.seed.to_le_bytes());
        key[8..16].copy_from_slice(&elapsed_steps.to_le_bytes());
        key[16..24].copy_from_slice(&global.to_le_bytes());
        ChaCha8Rng::from_seed(key)
    }

    /// Accumulate random contributions into all four face arrays.
    ///
    /// The draws are keyed by global site coordinate, so the two ranks
    /// either side of a subdomain face add the same value to it and the
    /// field total stays conserved under any decomposition.
    ///
    /// Refuses to run when sliding planes are present: the per-site stream
    /// is not frame-consistent across a plane, so the symmetric-average
    /// construction would not conserve there.
    pub fn accumulate(
        &self,
        geometry: &LatticeGeometry,
        registry: &PlaneRegistry,
        flux: &mut FluxBuffers,
        elapsed_steps: u64,
    ) -> Result<(), FluxError> {
        if registry.plane_count() > 0 {
            return Err(FluxError::PlanesPresent {
                count: registry.plane_count(),
            });
        }

        let nf = flux.elements_per_site();
        let h = geometry.nhalo() as i32;
        let (nx, ny, nz) = (
            geometry.nlocal(X) as i32,
            geometry.nlocal(Y) as i32,
            geometry.nlocal(Z) as i32,
        );
        let (gx, gy, gz) = (
            geometry.ntotal(X) as i64,
            geometry.ntotal(Y) as i64,
            geometry.ntotal(Z) as i64,
        );

        // Per-site draws over the whole envelope; halo sites take the
        // wrapped global coordinate of the interior site they mirror.
        let mut rflux = vec![0.0; 3 * geometry.nsites() * nf];
        for i in -h..nx + h {
            for j in -h..ny + h {
                for k in -h..nz + h {
                    let gi = (geometry.noffset(X) as i64 + i as i64).rem_euclid(gx);
                    let gj = (geometry.noffset(Y) as i64 + j as i64).rem_euclid(gy);
                    let gk = (geometry.noffset(Z) as i64 + k as i64).rem_euclid(gz);
                    let global = ((gi * gy + gj) * gz + gk) as u64;
                    let mut rng = self.site_rng(elapsed_steps, global);
                    let index = geometry.site(i, j, k);
                    for n in 0..nf {
                        for axis in 0..3 {
                            rflux[3 * (index * nf + n) + axis] =
                                self.deviation * Self::gaussian(&mut rng);
                        }
                    }
                }
            }
        }

        let r = |index: usize, axis: usize, n: usize| rflux[3 * (index * nf + n) + axis];

        for i in 0..nx {
            for j in -1..ny {
                for k in -1..nz {
                    let index0 = geometry.site(i, j, k);
                    for n in 0..nf {
                        let a = index0 * nf + n;

                        let index1 = geometry.site(i - 1, j, k);
                        flux.fw[a] += 0.5 * (r(index0, X, n) + r(index1, X, n));

                        let index1 = geometry.site(i + 1, j, k);
                        flux.fe[a] += 0.5 * (r(index0, X, n) + r(index1, X, n));

                        let index1 = geometry.site(i, j + 1, k);
                        flux.fy[a] += 0.5 * (r(index0, Y, n) + r(index1, Y, n));

                        let index1 = geometry.site(i, j, k + 1);
                        flux.fz[a] += 0.5 * (r(index0, Z, n) + r(index1, Z, n));
                    }
                }
            }
        }
        Ok(())
    }
}
